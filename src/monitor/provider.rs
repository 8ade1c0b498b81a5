use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;

use std::collections::HashSet;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

/// The hardware attributes tracked for change detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKey {
    MotherboardSerial,
    DiskDrives,
    MacAddresses,
    CpuSerial,
    GpuSerial,
}

impl IdentifierKey {
    /// Every key, in fingerprint order.
    pub const ALL: [IdentifierKey; 5] = [
        IdentifierKey::MotherboardSerial,
        IdentifierKey::DiskDrives,
        IdentifierKey::MacAddresses,
        IdentifierKey::CpuSerial,
        IdentifierKey::GpuSerial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::MotherboardSerial => "motherboard_serial",
            Self::DiskDrives => "disk_drives",
            Self::MacAddresses => "mac_addresses",
            Self::CpuSerial => "cpu_serial",
            Self::GpuSerial => "gpu_serial",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MotherboardSerial => "Motherboard Serial Number",
            Self::DiskDrives => "Disk Drives",
            Self::MacAddresses => "MAC Addresses",
            Self::CpuSerial => "CPU Serial Number",
            Self::GpuSerial => "GPU Serial Number",
        }
    }

    /// For multi-instance keys, the label given to each instance.
    pub fn instance_label(&self) -> Option<&'static str> {
        match self {
            Self::DiskDrives => Some("Disk"),
            Self::MacAddresses => Some("MAC Address"),
            _ => None,
        }
    }
}

impl Display for IdentifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of current hardware identifier values. Implementations hold no
/// state between calls and may fail per key.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current value of a single-instance identifier.
    async fn query(&self, key: IdentifierKey) -> anyhow::Result<String>;

    /// Current values of a multi-instance identifier, in enumeration order.
    async fn query_multi(&self, key: IdentifierKey) -> anyhow::Result<Vec<String>>;
}

type InFlight = Arc<Mutex<HashSet<IdentifierKey>>>;

/// Marks a key as being read on a blocking thread. The thread owns the guard,
/// so the key stays marked until the read returns even if the caller has
/// timed out and moved on.
struct InFlightGuard {
    key: IdentifierKey,
    in_flight: InFlight,
}

impl InFlightGuard {
    fn acquire(in_flight: &InFlight, key: IdentifierKey) -> anyhow::Result<Self> {
        if !in_flight.lock().insert(key) {
            anyhow::bail!("previous {key} query is still running");
        }

        Ok(Self {
            key,
            in_flight: in_flight.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

/// Linux backend reading sysfs and procfs through the `systeminfo` crate.
///
/// A key whose previous read is stuck in the kernel fails fast instead of
/// starting another blocking thread.
pub struct SysfsProvider {
    root: PathBuf,
    in_flight: InFlight,
}

impl SysfsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            in_flight: Default::default(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SysfsProvider {
    async fn query(&self, key: IdentifierKey) -> anyhow::Result<String> {
        let guard = InFlightGuard::acquire(&self.in_flight, key)?;
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            use systeminfo::hwinfo::*;

            let _guard = guard;

            match key {
                IdentifierKey::MotherboardSerial => Ok(board_serial(&root)?),
                IdentifierKey::CpuSerial => Ok(processor_id(&root)?),
                IdentifierKey::GpuSerial => get_gpus(&root)?
                    .first()
                    .map(|gpu| gpu.device_id())
                    .ok_or_else(|| anyhow::anyhow!("no display controller found")),
                _ => Err(anyhow::anyhow!("{key} is a multi-instance identifier")),
            }
        })
        .await?
    }

    async fn query_multi(&self, key: IdentifierKey) -> anyhow::Result<Vec<String>> {
        let guard = InFlightGuard::acquire(&self.in_flight, key)?;
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<String>> {
            use systeminfo::hwinfo::*;

            let _guard = guard;

            match key {
                IdentifierKey::DiskDrives => Ok(get_disks(&root)?
                    .iter()
                    .map(|disk| disk.description())
                    .collect()),
                IdentifierKey::MacAddresses => Ok(get_interfaces(&root)?
                    .into_iter()
                    .map(|interface| interface.address)
                    .collect()),
                _ => Err(anyhow::anyhow!("{key} is a single-instance identifier")),
            }
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &std::path::Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn key_metadata() {
        assert_eq!(IdentifierKey::ALL[0], IdentifierKey::MotherboardSerial);
        assert_eq!(IdentifierKey::DiskDrives.instance_label(), Some("Disk"));
        assert_eq!(IdentifierKey::CpuSerial.instance_label(), None);
        assert_eq!(IdentifierKey::MacAddresses.instance_label(), Some("MAC Address"));
        assert_eq!(IdentifierKey::GpuSerial.to_string(), "gpu_serial");
    }

    #[tokio::test]
    async fn sysfs_queries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "sys/class/dmi/id/board_serial", "ABC123\n");
        write(root, "sys/block/sda/device/model", "Samsung SSD 860\n");
        write(root, "sys/block/sda/device/serial", "SN001\n");
        write(root, "sys/class/net/eth0/device/uevent", "");
        write(root, "sys/class/net/eth0/operstate", "up\n");
        write(root, "sys/class/net/eth0/address", "00:11:22:33:44:55\n");

        let provider = SysfsProvider::new(root);

        assert_eq!(
            provider.query(IdentifierKey::MotherboardSerial).await.unwrap(),
            "ABC123"
        );
        assert_eq!(
            provider.query_multi(IdentifierKey::DiskDrives).await.unwrap(),
            vec!["Samsung SSD 860 SN001".to_string()]
        );
        assert_eq!(
            provider.query_multi(IdentifierKey::MacAddresses).await.unwrap(),
            vec!["00:11:22:33:44:55".to_string()]
        );

        // nothing under proc or the pci bus
        assert!(provider.query(IdentifierKey::CpuSerial).await.is_err());
        assert!(provider.query(IdentifierKey::GpuSerial).await.is_err());

        // asking for the wrong shape is an error rather than a panic
        assert!(provider.query(IdentifierKey::DiskDrives).await.is_err());
    }

    #[test]
    fn in_flight_guard() {
        let in_flight = InFlight::default();

        let guard = InFlightGuard::acquire(&in_flight, IdentifierKey::DiskDrives).unwrap();
        assert!(InFlightGuard::acquire(&in_flight, IdentifierKey::DiskDrives).is_err());

        // other keys are independent
        let other = InFlightGuard::acquire(&in_flight, IdentifierKey::CpuSerial).unwrap();

        drop(guard);
        assert!(InFlightGuard::acquire(&in_flight, IdentifierKey::DiskDrives).is_ok());
        drop(other);
        assert!(in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn stuck_read_is_not_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "sys/class/dmi/id/board_serial", "ABC123\n");
        write(root, "sys/block/sda/device/serial", "SN001\n");

        let provider = SysfsProvider::new(root);

        // stands in for a blocking thread that never came back
        let stuck = InFlightGuard::acquire(&provider.in_flight, IdentifierKey::MotherboardSerial)
            .unwrap();
        let stuck_multi =
            InFlightGuard::acquire(&provider.in_flight, IdentifierKey::DiskDrives).unwrap();

        assert!(provider.query(IdentifierKey::MotherboardSerial).await.is_err());
        assert!(provider.query_multi(IdentifierKey::DiskDrives).await.is_err());

        drop(stuck);
        drop(stuck_multi);

        assert_eq!(
            provider.query(IdentifierKey::MotherboardSerial).await.unwrap(),
            "ABC123"
        );
        assert_eq!(
            provider.query_multi(IdentifierKey::DiskDrives).await.unwrap(),
            vec!["SN001".to_string()]
        );
        assert!(provider.in_flight.lock().is_empty());
    }
}
