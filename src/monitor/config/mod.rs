use clap::ArgMatches;
use ringlog::Level;
use serde::Deserialize;

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod general;
mod log;
mod notify;

pub use general::{General, Report};
use self::log::Log;
pub use notify::Notify;

fn enabled() -> bool {
    true
}

fn poll_interval() -> String {
    "1s".into()
}

fn settle_window() -> String {
    "15s".into()
}

fn query_timeout() -> String {
    "5s".into()
}

fn root() -> String {
    "/".into()
}

fn webhook_timeout() -> String {
    "5s".into()
}

/// Parses a humantime duration for the named setting.
fn duration(name: &str, value: &str) -> Result<Duration, String> {
    value
        .parse::<humantime::Duration>()
        .map(Into::into)
        .map_err(|e| format!("{name} couldn't be parsed: {e}"))
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    log: Log,
    #[serde(default)]
    notify: Notify,
}

impl TryFrom<&ArgMatches> for Config {
    type Error = String;

    fn try_from(args: &ArgMatches) -> Result<Self, Self::Error> {
        match args.get_one::<PathBuf>("CONFIG") {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }
}

impl Config {
    pub fn load(path: &dyn AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("unable to open config file: {e}"))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(content).map_err(|e| format!("failed to parse config file: {e}"))?;

        config.general.check()?;
        config.notify.check()?;

        Ok(config)
    }

    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    pub fn notify(&self) -> &Notify {
        &self.notify
    }
}
