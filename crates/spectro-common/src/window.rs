//! Window functions understood by the spectrogram converter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SpectroError;

/// Window function applied to each analysis frame.
///
/// Names are passed through verbatim to the converter's `-w` flag, so
/// parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowFunction {
    Hann,
    Hamming,
    Bartlett,
    Rectangular,
    #[default]
    Kaiser,
    Dolph,
}

impl WindowFunction {
    /// All supported windows, in the order the upload form lists them.
    pub const ALL: [WindowFunction; 6] = [
        WindowFunction::Hann,
        WindowFunction::Hamming,
        WindowFunction::Bartlett,
        WindowFunction::Rectangular,
        WindowFunction::Kaiser,
        WindowFunction::Dolph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowFunction::Hann => "Hann",
            WindowFunction::Hamming => "Hamming",
            WindowFunction::Bartlett => "Bartlett",
            WindowFunction::Rectangular => "Rectangular",
            WindowFunction::Kaiser => "Kaiser",
            WindowFunction::Dolph => "Dolph",
        }
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowFunction {
    type Err = SpectroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowFunction::ALL
            .iter()
            .copied()
            .find(|w| w.as_str() == s)
            .ok_or(SpectroError::ValidationFailed)
    }
}
