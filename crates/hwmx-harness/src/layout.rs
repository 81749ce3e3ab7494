//! Installation layout and driver discovery.
//!
//! Drivers live under `<install_root>/bin/<kind>_driver`. The install root is
//! taken from, in order: an explicit path, the `HWMX_INSTALL_ROOT` environment
//! variable, `<git toplevel>/install`, and finally `./install`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::kind::NumericKind;

/// Environment variable overriding the install root.
pub const INSTALL_ROOT_ENV: &str = "HWMX_INSTALL_ROOT";

/// Directory name of the install root below the repository root.
pub const INSTALL_DIR: &str = "install";

/// An install tree produced by the build pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    /// Uses `root` as the install root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the install root, see module docs.
    pub fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        if let Ok(path) = std::env::var(INSTALL_ROOT_ENV) {
            if !path.is_empty() {
                return Self::new(path);
            }
        }
        match git_toplevel() {
            Some(top) => Self::new(top.join(INSTALL_DIR)),
            None => Self::new(INSTALL_DIR),
        }
    }

    /// The install root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the driver executables.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Path of the driver for `kind`.
    pub fn driver_path(&self, kind: NumericKind) -> PathBuf {
        self.bin_dir().join(kind.driver_name())
    }

    /// Driver paths for every kind.
    pub fn driver_paths(&self) -> DriverPaths {
        NumericKind::ALL
            .into_iter()
            .map(|kind| (kind, self.driver_path(kind)))
            .collect()
    }
}

/// Driver executable per numeric kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverPaths {
    paths: BTreeMap<NumericKind, PathBuf>,
}

impl DriverPaths {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the driver for `kind`.
    pub fn insert(&mut self, kind: NumericKind, path: impl Into<PathBuf>) {
        self.paths.insert(kind, path.into());
    }

    /// The driver for `kind`, if configured.
    pub fn get(&self, kind: NumericKind) -> Option<&Path> {
        self.paths.get(&kind).map(PathBuf::as_path)
    }
}

impl FromIterator<(NumericKind, PathBuf)> for DriverPaths {
    fn from_iter<I: IntoIterator<Item = (NumericKind, PathBuf)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

fn git_toplevel() -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let top = String::from_utf8(output.stdout).ok()?;
    let top = top.trim_end();
    (!top.is_empty()).then(|| PathBuf::from(top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_driver_paths_follow_naming_convention() {
        let layout = InstallLayout::new("/opt/hwmx");
        let path = layout.driver_path(NumericKind::Int);
        assert_eq!(path.parent().unwrap(), Path::new("/opt/hwmx/bin"));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("int_driver"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let layout = InstallLayout::discover(Some(Path::new("custom/install")));
        assert_eq!(layout.root(), Path::new("custom/install"));
    }

    #[test]
    fn test_driver_paths_cover_all_kinds() {
        let paths = InstallLayout::new("root").driver_paths();
        for kind in NumericKind::ALL {
            assert!(paths.get(kind).is_some());
        }
        assert!(DriverPaths::new().get(NumericKind::Float).is_none());
    }
}
