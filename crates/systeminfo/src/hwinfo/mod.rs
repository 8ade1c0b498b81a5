use std::path::Path;

mod cpu;
mod dmi;
mod gpu;
mod memory;
mod net;
mod os;
mod storage;
mod util;

pub use self::cpu::{processor_id, Cpu};
pub use self::dmi::{board_serial, format_bios_date, Dmi};
pub use self::gpu::{get_gpus, Gpu};
pub use self::memory::Memory;
pub use self::net::{get_interfaces, Interface};
pub use self::os::Os;
pub use self::storage::{get_disks, Disk};

/// Marker shown in place of any value which could not be read.
pub const UNAVAILABLE: &str = "N/A";

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HwInfo {
    pub dmi: Dmi,
    pub os: Os,
    pub cpu: Option<Cpu>,
    pub memory: Option<Memory>,
    pub gpus: Vec<Gpu>,
    pub network: Vec<Interface>,
    pub disks: Vec<Disk>,
}

impl HwInfo {
    /// Gathers everything available beneath `root`. Individual failures are
    /// logged and leave the corresponding value empty.
    pub fn new(root: &Path) -> Self {
        Self {
            dmi: Dmi::new(root),
            os: Os::new(root),
            cpu: Cpu::new(root)
                .map_err(|e| debug!("cpu unavailable: {e}"))
                .ok(),
            memory: Memory::new(root)
                .map_err(|e| debug!("memory unavailable: {e}"))
                .ok(),
            gpus: get_gpus(root)
                .map_err(|e| debug!("gpus unavailable: {e}"))
                .unwrap_or_default(),
            network: get_interfaces(root)
                .map_err(|e| debug!("network unavailable: {e}"))
                .unwrap_or_default(),
            disks: get_disks(root)
                .map_err(|e| debug!("disks unavailable: {e}"))
                .unwrap_or_default(),
        }
    }

    /// The inventory as ordered `(parameter, value)` rows for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let dmi = &self.dmi;
        let cpu = self.cpu.as_ref();

        let text = |value: Option<&String>| {
            value
                .cloned()
                .unwrap_or_else(|| UNAVAILABLE.to_string())
        };
        let count = |value: Option<usize>| {
            value
                .map(|v| v.to_string())
                .unwrap_or_else(|| UNAVAILABLE.to_string())
        };

        let gpu = if self.gpus.is_empty() {
            UNAVAILABLE.to_string()
        } else {
            self.gpus
                .iter()
                .map(|g| g.description())
                .collect::<Vec<_>>()
                .join("\n")
        };

        let adapters = if self.network.is_empty() {
            UNAVAILABLE.to_string()
        } else {
            self.network
                .iter()
                .enumerate()
                .map(|(i, n)| format!("MAC Address {}: {}", i + 1, n.address))
                .collect::<Vec<_>>()
                .join("\n")
        };

        vec![
            ("System Manufacturer", text(dmi.sys_vendor.as_ref())),
            ("System Model", text(dmi.product_name.as_ref())),
            ("System SKU", text(dmi.product_sku.as_ref())),
            ("System Serial Number", text(dmi.product_serial.as_ref())),
            ("OS Name", text(self.os.name.as_ref())),
            ("OS Version", text(self.os.kernel.as_ref())),
            ("OS Architecture", self.os.arch.clone()),
            ("CPU", text(cpu.and_then(|c| c.model_name.as_ref()))),
            ("CPU Cores", count(cpu.and_then(|c| c.cores))),
            ("CPU Threads", count(cpu.and_then(|c| c.threads))),
            (
                "Total Memory",
                self.memory
                    .as_ref()
                    .map(|m| m.total_bytes.to_string())
                    .unwrap_or_else(|| UNAVAILABLE.to_string()),
            ),
            ("GPU", gpu),
            ("Network Adapters", adapters),
            (
                "BIOS Release Date",
                dmi.bios_date
                    .as_deref()
                    .map(format_bios_date)
                    .unwrap_or_else(|| UNAVAILABLE.to_string()),
            ),
            ("BIOS Vendor", text(dmi.bios_vendor.as_ref())),
            ("BIOS Version", text(dmi.bios_version.as_ref())),
            ("SMBIOS Family", text(dmi.product_family.as_ref())),
            ("Product Name", text(self.os.hostname.as_ref())),
            ("Motherboard Manufacturer", text(dmi.board_vendor.as_ref())),
            ("Motherboard Product", text(dmi.board_name.as_ref())),
            ("Chassis Manufacturer", text(dmi.chassis_vendor.as_ref())),
            ("Chassis Serial Number", text(dmi.chassis_serial.as_ref())),
            ("Chassis Version", text(dmi.chassis_version.as_ref())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwinfo::util::fixture;

    #[test]
    fn empty_root_is_all_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let info = HwInfo::new(dir.path());

        for (parameter, value) in info.entries() {
            if parameter == "OS Architecture" {
                assert_eq!(value, std::env::consts::ARCH);
            } else {
                assert_eq!(value, UNAVAILABLE, "{parameter}");
            }
        }
    }

    #[test]
    fn entry_order_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fixture::write(root, "sys/class/dmi/id/sys_vendor", "Dell Inc.\n");
        fixture::write(root, "sys/class/dmi/id/bios_date", "11/02/2022\n");
        fixture::write(root, "proc/meminfo", "MemTotal:       8589934592 kB\n");
        fixture::write(root, "sys/class/net/eth0/device/uevent", "");
        fixture::write(root, "sys/class/net/eth0/operstate", "up\n");
        fixture::write(root, "sys/class/net/eth0/address", "00:11:22:33:44:55\n");
        fixture::write(root, "sys/class/net/eth1/device/uevent", "");
        fixture::write(root, "sys/class/net/eth1/operstate", "up\n");
        fixture::write(root, "sys/class/net/eth1/address", "00:11:22:33:44:56\n");

        let info = HwInfo::new(root);
        let entries = info.entries();

        assert_eq!(entries.len(), 23);
        assert_eq!(entries[0], ("System Manufacturer", "Dell Inc.".to_string()));
        // wider than a 32-bit usize
        assert_eq!(entries[10], ("Total Memory", "8796093022208".to_string()));
        assert_eq!(entries[12].0, "Network Adapters");
        assert_eq!(
            entries[12].1,
            "MAC Address 1: 00:11:22:33:44:55\nMAC Address 2: 00:11:22:33:44:56"
        );
        assert_eq!(entries[13], ("BIOS Release Date", "2022-11-02".to_string()));
        assert_eq!(entries[22].0, "Chassis Version");
    }
}
