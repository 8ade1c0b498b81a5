use super::*;

/// Writes notifications to the debug log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver_preliminary_alert(&self, alert: &PreliminaryAlert) -> anyhow::Result<()> {
        warn!(
            "Hardware Change Detected at {}: waiting for hardware to settle",
            alert.detected_at.to_rfc3339()
        );
        Ok(())
    }

    async fn deliver_change_detail(&self, event: &ChangeEvent) -> anyhow::Result<()> {
        if event.is_reverted() {
            info!(
                "HWID Change Details: hardware returned to its previous identity after a change detected at {}",
                event.detected_at().to_rfc3339()
            );
        } else {
            warn!(
                "HWID Change Details: change detected at {} confirmed at {}",
                event.detected_at().to_rfc3339(),
                event.timestamp().to_rfc3339()
            );
        }

        info!("old HWID: {}", event.previous());
        info!("new HWID: {}", event.current());

        if event.detected() != event.current() {
            info!("HWID at detection: {}", event.detected());
        }

        for difference in event.differences() {
            info!(
                "{}: {:?} -> {:?}",
                difference.key.display_name(),
                difference.before.as_deref().unwrap_or_default(),
                difference.after.as_deref().unwrap_or_default()
            );
        }

        Ok(())
    }
}
