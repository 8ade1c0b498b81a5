use super::metrics::INVENTORY_REFRESHES;
use crate::common::render_table;

use async_trait::async_trait;
use ringlog::*;
use systeminfo::SystemInfo;

use std::path::PathBuf;

/// Presentation surface for the full system inventory.
#[async_trait]
pub trait InventoryDisplay: Send + Sync {
    /// Re-collects and re-renders the inventory. Safe to call repeatedly.
    async fn refresh(&self);
}

/// Prints the inventory table to stdout.
pub struct ConsoleDisplay {
    root: PathBuf,
}

impl ConsoleDisplay {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl InventoryDisplay for ConsoleDisplay {
    async fn refresh(&self) {
        let root = self.root.clone();

        let info = match tokio::task::spawn_blocking(move || SystemInfo::new(root)).await {
            Ok(info) => info,
            Err(e) => {
                error!("failed to collect inventory: {e}");
                return;
            }
        };

        INVENTORY_REFRESHES.increment();

        println!("{}", render_table(&info.entries()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_with_nothing_to_read() {
        let dir = tempfile::tempdir().unwrap();
        let display = ConsoleDisplay::new(dir.path());

        display.refresh().await;
        display.refresh().await;
    }
}
