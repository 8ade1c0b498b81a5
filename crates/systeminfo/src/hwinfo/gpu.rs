use std::path::Path;

use super::util::*;
use crate::Result;

// PCI base class for display controllers
const DISPLAY_CLASS: &str = "03";

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gpu {
    pub slot: String,
    pub vendor: String,
    pub device: String,
    pub subsystem_vendor: Option<String>,
    pub subsystem_device: Option<String>,
    pub driver: Option<String>,
}

impl Gpu {
    /// A plug-and-play style device instance id, for example
    /// `PCI\VEN_10DE&DEV_2484&SUBSYS_146B10DE\0000:01:00.0`.
    pub fn device_id(&self) -> String {
        let mut id = format!("PCI\\VEN_{}&DEV_{}", self.vendor, self.device);

        if let (Some(vendor), Some(device)) = (&self.subsystem_vendor, &self.subsystem_device) {
            id.push_str(&format!("&SUBSYS_{device}{vendor}"));
        }

        id.push('\\');
        id.push_str(&self.slot);
        id
    }

    /// Short human readable description.
    pub fn description(&self) -> String {
        match &self.driver {
            Some(driver) => format!("{driver} ({}:{})", self.vendor, self.device),
            None => format!("{}:{}", self.vendor, self.device),
        }
    }
}

fn get_gpu(root: &Path, slot: &str) -> Result<Option<Gpu>> {
    let base = root.join("sys/bus/pci/devices").join(slot);

    let class = read_hex(base.join("class"))?;
    if !class.starts_with(DISPLAY_CLASS) || class.len() != 6 {
        return Ok(None);
    }

    let vendor = read_hex(base.join("vendor"))?;
    let device = read_hex(base.join("device"))?;
    let subsystem_vendor = read_hex(base.join("subsystem_vendor")).ok();
    let subsystem_device = read_hex(base.join("subsystem_device")).ok();

    let driver = std::fs::read_link(base.join("driver"))
        .ok()
        .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string));

    Ok(Some(Gpu {
        slot: slot.to_string(),
        vendor,
        device,
        subsystem_vendor,
        subsystem_device,
        driver,
    }))
}

/// Returns the display controllers on the PCI bus in slot order.
pub fn get_gpus(root: &Path) -> Result<Vec<Gpu>> {
    let mut ret = Vec::new();

    for entry in list_dir(root.join("sys/bus/pci/devices"))? {
        let Some(slot) = entry.file_name().to_str() else {
            continue;
        };

        match get_gpu(root, slot) {
            Ok(Some(gpu)) => ret.push(gpu),
            Ok(None) => {}
            Err(e) => debug!("skipping pci device {slot}: {e}"),
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwinfo::util::fixture;

    fn device(root: &Path, slot: &str, class: &str, vendor: &str, device: &str) {
        let base = format!("sys/bus/pci/devices/{slot}");
        fixture::write(root, &format!("{base}/class"), class);
        fixture::write(root, &format!("{base}/vendor"), vendor);
        fixture::write(root, &format!("{base}/device"), device);
    }

    #[test]
    fn display_controllers_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        device(root, "0000:00:1f.3", "0x040300\n", "0x8086\n", "0xa348\n");
        device(root, "0000:01:00.0", "0x030000\n", "0x10de\n", "0x2484\n");
        fixture::write(
            root,
            "sys/bus/pci/devices/0000:01:00.0/subsystem_vendor",
            "0x10de\n",
        );
        fixture::write(
            root,
            "sys/bus/pci/devices/0000:01:00.0/subsystem_device",
            "0x146b\n",
        );

        let gpus = get_gpus(root).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(
            gpus[0].device_id(),
            "PCI\\VEN_10DE&DEV_2484&SUBSYS_146B10DE\\0000:01:00.0"
        );
        assert_eq!(gpus[0].description(), "10DE:2484");
    }
}
