//! Gather a description of the current system: the firmware, processor,
//! memory, storage and network details used for inventory display, and the
//! hardware identifiers used to fingerprint the machine.
//!
//! Everything is read from sysfs and procfs relative to a filesystem root,
//! normally `/`.

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde;

use std::path::{Path, PathBuf};

mod error;
pub mod hwinfo;

pub use crate::error::{Error, Result};
pub use crate::hwinfo::UNAVAILABLE;

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemInfo {
    pub root: PathBuf,
    pub hwinfo: crate::hwinfo::HwInfo,
}

impl SystemInfo {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();

        Self {
            root: root.to_path_buf(),
            hwinfo: crate::hwinfo::HwInfo::new(root),
        }
    }

    /// The inventory as ordered `(parameter, value)` rows.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.hwinfo.entries()
    }
}
