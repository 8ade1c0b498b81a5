use std::ffi::OsStr;
use std::path::Path;

use super::util::*;
use crate::{Error, Result};

// Virtual block devices which carry no hardware identity
const VIRTUAL_PREFIXES: &[&str] = &["loop", "ram", "zram", "dm-", "md", "nbd"];

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Disk {
    // Blocks under /sys/block except virtual devices
    pub name: String,
    pub model: Option<String>,
    pub serial: Option<String>,
}

impl Disk {
    /// The `model serial` description of the disk. Components which are not
    /// exposed are omitted; a disk with neither is described by its name.
    pub fn description(&self) -> String {
        let parts: Vec<&str> = [self.model.as_deref(), self.serial.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        if parts.is_empty() {
            self.name.clone()
        } else {
            parts.join(" ")
        }
    }
}

fn get_disk(root: &Path, name: &OsStr) -> Result<Option<Disk>> {
    let name = name.to_str().ok_or_else(Error::invalid_block_name)?;
    if VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return Ok(None);
    }

    let device = root.join("sys/block").join(name).join("device");

    let model = read_value(device.join("model")).ok();

    // not every transport exposes a serial, nvme and scsi both expose a wwid
    let serial = read_value(device.join("serial"))
        .or_else(|_| read_value(device.join("wwid")))
        .ok();

    Ok(Some(Disk {
        name: name.to_string(),
        model,
        serial,
    }))
}

pub fn get_disks(root: &Path) -> Result<Vec<Disk>> {
    let mut ret = Vec::new();

    for entry in list_dir(root.join("sys/block"))? {
        match get_disk(root, entry.file_name()) {
            Ok(Some(disk)) => ret.push(disk),
            Ok(None) => {}
            Err(e) => debug!("skipping block device: {e}"),
        }
    }

    Ok(ret)
}
