use super::*;
use crate::monitor::fingerprint::Difference;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Serialize;

use std::path::Path;
use std::time::Duration;

/// The json document posted for every notification.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Payload<'a> {
    Preliminary {
        host: &'a str,
        #[serde(flatten)]
        alert: &'a PreliminaryAlert,
    },
    Change {
        host: &'a str,
        reverted: bool,
        differences: Vec<Difference>,
        #[serde(flatten)]
        event: &'a ChangeEvent,
    },
}

/// POSTs each notification as json to a configured url.
pub struct WebhookNotifier {
    client: Client,
    url: Url,
    host: String,
}

impl WebhookNotifier {
    /// The posted documents name the host found under `root`.
    pub fn new(url: Url, timeout: Duration, root: &Path) -> anyhow::Result<Self> {
        let client = Client::builder().http1_only().timeout(timeout).build()?;

        let host = systeminfo::hwinfo::Os::new(root)
            .hostname
            .unwrap_or_else(|| systeminfo::UNAVAILABLE.to_string());

        Ok(Self { client, url, host })
    }

    async fn post(&self, payload: &Payload<'_>) -> anyhow::Result<()> {
        let body = serde_json::to_vec(payload)?;

        self.client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver_preliminary_alert(&self, alert: &PreliminaryAlert) -> anyhow::Result<()> {
        self.post(&Payload::Preliminary {
            host: &self.host,
            alert,
        })
        .await
    }

    async fn deliver_change_detail(&self, event: &ChangeEvent) -> anyhow::Result<()> {
        self.post(&Payload::Change {
            host: &self.host,
            reverted: event.is_reverted(),
            differences: event.differences(),
            event,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fingerprint::Fingerprint;
    use crate::monitor::provider::IdentifierKey;

    use chrono::Utc;

    #[test]
    fn change_payload() {
        let previous: Fingerprint = [(IdentifierKey::MotherboardSerial, "ABC123".to_string())]
            .into_iter()
            .collect();
        let current: Fingerprint = [(IdentifierKey::MotherboardSerial, "N/A".to_string())]
            .into_iter()
            .collect();
        let event = ChangeEvent::new(previous, current.clone(), current, Utc::now());

        let payload = Payload::Change {
            host: "db01",
            reverted: event.is_reverted(),
            differences: event.differences(),
            event: &event,
        };

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["kind"], "change");
        assert_eq!(json["host"], "db01");
        assert_eq!(json["reverted"], false);
        assert_eq!(json["previous"]["motherboard_serial"], "ABC123");
        assert_eq!(json["current"]["motherboard_serial"], "N/A");
        assert_eq!(json["differences"][0]["key"], "motherboard_serial");
        assert_eq!(json["differences"][0]["after"], "N/A");
    }
}
