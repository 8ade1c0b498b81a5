use std::ffi::OsStr;
use std::path::Path;

use super::util::*;
use crate::{Error, Result};

const UNSET_ADDRESS: &str = "00:00:00:00:00:00";

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub address: String,
    pub carrier: bool,
    pub speed: Option<usize>,
    pub mtu: Option<usize>,
}

fn get_interface(root: &Path, name: &OsStr) -> Result<Option<Interface>> {
    let name = name.to_str().ok_or_else(Error::invalid_interface_name)?;
    let base = root.join("sys/class/net").join(name);

    // virtual links such as bridges and veth pairs have no backing device
    if !base.join("device").exists() {
        return Ok(None);
    }

    // skip any that aren't "up"
    let operstate = read_string(base.join("operstate"))?;
    if operstate != "up" {
        return Ok(None);
    }

    let address = read_value(base.join("address"))?.to_ascii_uppercase();
    if address == UNSET_ADDRESS {
        return Ok(None);
    }

    // get metadata we want
    let carrier = read_usize(base.join("carrier")).map(|v| v == 1).unwrap_or(false);
    let speed = read_usize(base.join("speed")).ok();
    let mtu = read_usize(base.join("mtu")).ok();

    Ok(Some(Interface {
        name: name.to_string(),
        address,
        carrier,
        speed,
        mtu,
    }))
}

/// Returns the enabled network interfaces which have a hardware address.
pub fn get_interfaces(root: &Path) -> Result<Vec<Interface>> {
    let mut ret = Vec::new();

    for entry in list_dir(root.join("sys/class/net"))? {
        if entry.file_name() == "lo" {
            continue;
        }

        match get_interface(root, entry.file_name()) {
            Ok(Some(net)) => ret.push(net),
            Ok(None) => {}
            Err(e) => debug!("skipping network interface: {e}"),
        }
    }

    Ok(ret)
}
