use super::*;

use reqwest::Url;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notify {
    // write alerts and change details to the log
    #[serde(default = "enabled")]
    log: bool,

    // print the inventory table to stdout after each confirmed change
    #[serde(default = "enabled")]
    console: bool,

    // POST each notification as json to this url
    #[serde(default)]
    webhook: Option<String>,

    #[serde(default = "webhook_timeout")]
    webhook_timeout: String,
}

impl Default for Notify {
    fn default() -> Self {
        Self {
            log: enabled(),
            console: enabled(),
            webhook: None,
            webhook_timeout: webhook_timeout(),
        }
    }
}

impl Notify {
    pub fn check(&self) -> Result<(), String> {
        if let Some(webhook) = &self.webhook {
            let url = Url::parse(webhook).map_err(|e| format!("notify.webhook is not valid: {e}"))?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err("notify.webhook must be an http or https url".into());
            }
        }

        duration("notify.webhook_timeout", &self.webhook_timeout)?;

        Ok(())
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn console(&self) -> bool {
        self.console
    }

    pub fn webhook(&self) -> Option<Url> {
        self.webhook.as_deref().and_then(|w| Url::parse(w).ok())
    }

    pub fn webhook_timeout(&self) -> Duration {
        duration("notify.webhook_timeout", &self.webhook_timeout).unwrap_or_default()
    }
}
