//! Parameter validation for render requests.
//!
//! Runs before any converter process is spawned. The validator never
//! produces an error value; it only answers whether a request is
//! acceptable, and the HTTP layer turns `false` into a 400.

use std::ops::RangeInclusive;

use crate::{RenderRequest, WindowFunction};

/// Inclusive bounds for the numeric request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub width: RangeInclusive<i64>,
    pub height: RangeInclusive<i64>,
    pub dynamic_range: RangeInclusive<i64>,
}

impl Bounds {
    pub const WIDTH_MIN: i64 = 100;
    pub const WIDTH_MAX: i64 = 200_000;
    pub const HEIGHT_MIN: i64 = 100;
    pub const HEIGHT_MAX: i64 = 10_000;
    pub const DYNAMIC_RANGE_MIN: i64 = 20;
    pub const DYNAMIC_RANGE_MAX: i64 = 180;
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: Self::WIDTH_MIN..=Self::WIDTH_MAX,
            height: Self::HEIGHT_MIN..=Self::HEIGHT_MAX,
            dynamic_range: Self::DYNAMIC_RANGE_MIN..=Self::DYNAMIC_RANGE_MAX,
        }
    }
}

/// Checks render requests against converter-acceptable bounds.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    bounds: Bounds,
    check_window: bool,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ParameterValidator {
    /// Create a validator.
    ///
    /// With `check_window` off (the fixed-window variant), the window field
    /// is ignored and callers render with [`WindowFunction::Kaiser`].
    pub fn new(check_window: bool) -> Self {
        Self {
            bounds: Bounds::default(),
            check_window,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn checks_window(&self) -> bool {
        self.check_window
    }

    /// Returns false on the first violated rule.
    pub fn validate(&self, req: &RenderRequest) -> bool {
        if !self.bounds.width.contains(&req.x) {
            return false;
        }
        if !self.bounds.height.contains(&req.y) {
            return false;
        }
        if !self.bounds.dynamic_range.contains(&req.z) {
            return false;
        }
        if req.data.is_empty() {
            return false;
        }
        if self.check_window && req.window.parse::<WindowFunction>().is_err() {
            return false;
        }
        true
    }
}
