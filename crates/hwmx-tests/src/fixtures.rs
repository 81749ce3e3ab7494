//! Temporary install trees populated with stub drivers.

use std::fs;
use std::io;
use std::path::Path;

use hwmx_harness::{InstallLayout, NumericKind};
use tempfile::TempDir;

/// A temporary `<root>/bin/<kind>_driver` tree. Removed on drop.
pub struct StubInstall {
    dir: TempDir,
}

impl StubInstall {
    /// Installs the same stub executable as the driver for every kind.
    pub fn uniform(stub: &Path) -> io::Result<Self> {
        let drivers: Vec<_> = NumericKind::ALL.iter().map(|&kind| (kind, stub)).collect();
        Self::with_drivers(&drivers)
    }

    /// Installs a specific stub per kind; kinds not listed get no driver.
    pub fn with_drivers(drivers: &[(NumericKind, &Path)]) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let install = Self { dir };
        fs::create_dir_all(install.layout().bin_dir())?;
        for &(kind, stub) in drivers {
            // fs::copy keeps the executable permission bits.
            fs::copy(stub, install.layout().driver_path(kind))?;
        }
        Ok(install)
    }

    /// Install root path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Layout rooted at the temporary directory.
    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(self.dir.path())
    }
}
