use std::path::Path;

use super::util::*;

#[non_exhaustive]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Os {
    pub name: Option<String>,
    pub kernel: Option<String>,
    pub arch: String,
    pub hostname: Option<String>,
}

impl Os {
    pub fn new(root: &Path) -> Self {
        let name = read_string(root.join("etc/os-release"))
            .ok()
            .and_then(|content| pretty_name(&content))
            .or_else(|| {
                read_string(root.join("usr/lib/os-release"))
                    .ok()
                    .and_then(|content| pretty_name(&content))
            });

        Self {
            name,
            kernel: read_value(root.join("proc/sys/kernel/osrelease")).ok(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: read_value(root.join("proc/sys/kernel/hostname")).ok(),
        }
    }
}

fn pretty_name(content: &str) -> Option<String> {
    let mut name = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let value = value.trim().trim_matches('"').to_string();

        match key.trim() {
            "PRETTY_NAME" => return Some(value),
            "NAME" => name = Some(value),
            _ => {}
        }
    }

    name
}
