//! Locating external programs and writing throwaway converter scripts.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use renderer::{ProcessRunner, SoxRenderer};
use tempfile::TempDir;

/// Search `PATH` for an executable named `name`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A shell script in a temporary directory standing in for the converter.
///
/// The script is run as `/bin/sh <script> <converter args...>`, so it
/// sees the converter's arguments as `$@` and the audio on stdin. Running
/// it through the shell rather than executing the file directly avoids
/// `ETXTBSY` races with other tests forking while the file is written.
/// The directory is removed when the value is dropped.
pub struct FakeConverter {
    _dir: TempDir,
    path: PathBuf,
}

impl FakeConverter {
    /// Write `body` as a `/bin/sh` script.
    pub fn new(body: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fake-sox.sh");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "{}", body)?;
        file.sync_all()?;
        Ok(Self { _dir: dir, path })
    }

    /// A converter that copies stdin to stdout.
    pub fn echo() -> std::io::Result<Self> {
        Self::new("exec cat")
    }

    /// A converter that prints its arguments one per line, then
    /// discards its input.
    pub fn print_args() -> std::io::Result<Self> {
        Self::new("for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done\ncat >/dev/null")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A process runner invoking this script.
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new("/bin/sh").with_leading_args([self.path.as_os_str()])
    }

    /// A sox renderer whose converter is this script.
    pub fn renderer(&self, timeout: Option<Duration>) -> SoxRenderer {
        SoxRenderer::from_runner(self.runner().with_timeout(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_program_sh() {
        assert!(find_program("sh").is_some());
        assert!(find_program("definitely-not-installed-program").is_none());
    }

    #[test]
    fn test_fake_converter_script_written() {
        let fake = FakeConverter::echo().unwrap();
        let contents = std::fs::read_to_string(fake.path()).unwrap();
        assert_eq!(contents.trim(), "exec cat");
        assert_eq!(fake.runner().program(), Path::new("/bin/sh"));
    }

    #[test]
    fn test_fake_converter_removed_on_drop() {
        let fake = FakeConverter::echo().unwrap();
        let path = fake.path().to_path_buf();
        drop(fake);
        assert!(!path.exists());
    }
}
