use super::*;

/// Which fingerprint a change event reports as `current`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Report {
    /// The last fingerprint sampled during the settle window.
    #[default]
    Settled,
    /// The fingerprint captured when the mismatch was first detected.
    Detected,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    // how often the fingerprint is rebuilt and compared
    #[serde(default = "poll_interval")]
    poll_interval: String,

    // how long to keep observing after a mismatch before reporting it
    #[serde(default = "settle_window")]
    settle_window: String,

    // upper bound on any single identifier query
    #[serde(default = "query_timeout")]
    query_timeout: String,

    #[serde(default)]
    report: Report,

    // filesystem root for sysfs and procfs, useful inside containers
    #[serde(default = "root")]
    root: String,

    // optional admin http endpoint
    #[serde(default)]
    listen: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            poll_interval: poll_interval(),
            settle_window: settle_window(),
            query_timeout: query_timeout(),
            report: Report::default(),
            root: root(),
            listen: None,
        }
    }
}

impl General {
    pub fn check(&self) -> Result<(), String> {
        let poll_interval = duration("general.poll_interval", &self.poll_interval)?;
        if poll_interval < Duration::from_millis(10) {
            return Err("general.poll_interval is too short. Minimum interval is: 10ms".into());
        }

        duration("general.settle_window", &self.settle_window)?;

        if duration("general.query_timeout", &self.query_timeout)?.is_zero() {
            return Err("general.query_timeout must be greater than 0".into());
        }

        if let Some(listen) = &self.listen {
            resolve(listen)?;
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        duration("general.poll_interval", &self.poll_interval).unwrap_or_default()
    }

    pub fn settle_window(&self) -> Duration {
        duration("general.settle_window", &self.settle_window).unwrap_or_default()
    }

    pub fn query_timeout(&self) -> Duration {
        duration("general.query_timeout", &self.query_timeout).unwrap_or_default()
    }

    pub fn report(&self) -> Report {
        self.report
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone().into()
    }

    pub fn listen(&self) -> Option<SocketAddr> {
        self.listen.as_deref().and_then(|l| resolve(l).ok())
    }
}

fn resolve(listen: &str) -> Result<SocketAddr, String> {
    listen
        .to_socket_addrs()
        .map_err(|e| format!("bad listen address: {e}"))?
        .next()
        .ok_or_else(|| "could not resolve socket addr".to_string())
}
