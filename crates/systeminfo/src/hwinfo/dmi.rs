use std::path::Path;

use super::util::*;
use crate::Result;

const DMI_ID: &str = "sys/class/dmi/id";

/// Firmware provided identification from the SMBIOS/DMI tables. Every field
/// is optional: some are only readable by root and virtual machines often
/// leave them blank.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dmi {
    pub sys_vendor: Option<String>,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub product_serial: Option<String>,
    pub product_family: Option<String>,
    pub bios_vendor: Option<String>,
    pub bios_version: Option<String>,
    pub bios_date: Option<String>,
    pub board_vendor: Option<String>,
    pub board_name: Option<String>,
    pub board_serial: Option<String>,
    pub chassis_vendor: Option<String>,
    pub chassis_serial: Option<String>,
    pub chassis_version: Option<String>,
}

impl Dmi {
    pub fn new(root: &Path) -> Self {
        let field = |name: &str| match read_field(root, name) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("dmi field {name} unavailable: {e}");
                None
            }
        };

        Self {
            sys_vendor: field("sys_vendor"),
            product_name: field("product_name"),
            product_sku: field("product_sku"),
            product_serial: field("product_serial"),
            product_family: field("product_family"),
            bios_vendor: field("bios_vendor"),
            bios_version: field("bios_version"),
            bios_date: field("bios_date"),
            board_vendor: field("board_vendor"),
            board_name: field("board_name"),
            board_serial: field("board_serial"),
            chassis_vendor: field("chassis_vendor"),
            chassis_serial: field("chassis_serial"),
            chassis_version: field("chassis_version"),
        }
    }
}

fn read_field(root: &Path, name: &str) -> Result<String> {
    read_value(root.join(DMI_ID).join(name))
}

/// The baseboard serial number.
pub fn board_serial(root: &Path) -> Result<String> {
    read_field(root, "board_serial")
}

/// DMI reports the BIOS date as `MM/DD/YYYY`. Returns it as `YYYY-MM-DD`,
/// keeping the raw text if it is in some other form.
pub fn format_bios_date(raw: &str) -> String {
    match chrono::NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(e) => {
            warn!("error converting BIOS date '{raw}': {e}");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwinfo::util::fixture;

    #[test]
    fn fields_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        fixture::write(dir.path(), "sys/class/dmi/id/sys_vendor", "LENOVO\n");
        fixture::write(dir.path(), "sys/class/dmi/id/board_serial", "ABC123\n");
        fixture::write(dir.path(), "sys/class/dmi/id/product_sku", "\n");

        let dmi = Dmi::new(dir.path());
        assert_eq!(dmi.sys_vendor.as_deref(), Some("LENOVO"));
        assert_eq!(dmi.board_serial.as_deref(), Some("ABC123"));
        assert_eq!(dmi.product_sku, None);
        assert_eq!(dmi.chassis_serial, None);

        assert_eq!(board_serial(dir.path()).unwrap(), "ABC123");
    }

    #[test]
    fn missing_board_serial() {
        let dir = tempfile::tempdir().unwrap();
        assert!(board_serial(dir.path()).is_err());
    }

    #[test]
    fn bios_dates() {
        assert_eq!(format_bios_date("03/14/2023"), "2023-03-14");
        assert_eq!(format_bios_date("sometime"), "sometime");
    }
}
