use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::util::*;
use crate::{Error, Result};

/// Processor description gathered from `/proc/cpuinfo` and the cpu topology
/// in sysfs. Describes the first processor listed; mixed-model systems are
/// rare enough not to matter for inventory purposes.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cpu {
    pub vendor: Option<String>,
    pub model_name: Option<String>,
    pub family: Option<String>,
    pub model: Option<String>,
    pub stepping: Option<String>,
    pub microcode: Option<String>,
    pub serial: Option<String>,
    pub cores: Option<usize>,
    pub threads: Option<usize>,
}

impl Cpu {
    pub fn new(root: &Path) -> Result<Self> {
        let mut cpu = Self::from_cpuinfo(root.join("proc/cpuinfo"))?;

        match get_topology(root) {
            Ok((cores, threads)) => {
                cpu.cores = Some(cores);
                cpu.threads = Some(threads);
            }
            Err(e) => debug!("cpu topology unavailable: {e}"),
        }

        Ok(cpu)
    }

    fn from_cpuinfo(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::unreadable(e, path))?;
        let mut reader = BufReader::new(file);

        let mut cpu = Self::default();
        let mut processors = 0;
        let mut line = String::new();

        while reader
            .read_line(&mut line)
            .map_err(|e| Error::unreadable(e, path))?
            != 0
        {
            let line = ClearGuard::new(&mut line);
            let parts: Vec<&str> = line.split(':').map(|v| v.trim()).collect();

            if parts.len() != 2 {
                continue;
            }

            let value = Some(parts[1].to_owned());

            match parts[0] {
                "processor" => {
                    processors += 1;
                }
                // the serial is system-wide and typically listed after the
                // processor blocks on the platforms that expose it
                "Serial" => {
                    cpu.serial = value;
                }
                _ if processors > 1 => {}
                "vendor_id" | "CPU implementer" => {
                    cpu.vendor = cpu.vendor.or(value);
                }
                "model name" | "Processor" => {
                    cpu.model_name = cpu.model_name.or(value);
                }
                "cpu family" | "CPU architecture" => {
                    cpu.family = cpu.family.or(value);
                }
                "model" | "CPU part" => {
                    cpu.model = cpu.model.or(value);
                }
                "stepping" | "CPU revision" => {
                    cpu.stepping = cpu.stepping.or(value);
                }
                "microcode" => {
                    cpu.microcode = cpu.microcode.or(value);
                }
                _ => (),
            }
        }

        Ok(cpu)
    }

    /// A stable identifier for the processor. Uses the serial number where
    /// the platform exposes one, otherwise the processor signature.
    pub fn identifier(&self) -> Option<String> {
        if let Some(serial) = self.serial.as_ref().filter(|s| !s.is_empty()) {
            return Some(serial.clone());
        }

        let vendor = self.vendor.as_ref()?;
        let family = self.family.as_deref().unwrap_or("0");
        let model = self.model.as_deref().unwrap_or("0");
        let stepping = self.stepping.as_deref().unwrap_or("0");

        Some(format!("{vendor}-{family}-{model}-{stepping}"))
    }
}

/// Returns the number of physical cores and hardware threads online.
fn get_topology(root: &Path) -> Result<(usize, usize)> {
    let base = root.join("sys/devices/system/cpu");
    let ids = read_list(base.join("online"))?;

    let mut cores = BTreeSet::new();

    for id in &ids {
        let core_id = read_usize(base.join(format!("cpu{id}/topology/core_id")))?;
        let package_id = read_usize(base.join(format!("cpu{id}/topology/physical_package_id")))?;

        cores.insert((package_id, core_id));
    }

    Ok((cores.len(), ids.len()))
}

pub fn processor_id(root: &Path) -> Result<String> {
    let path = root.join("proc/cpuinfo");
    let cpu = Cpu::from_cpuinfo(&path)?;

    cpu.identifier().ok_or_else(|| Error::empty(path))
}
