use super::*;

use tokio::sync::{mpsc, watch};

use std::time::Duration;

mod config;
mod detector;
mod display;
mod error;
mod event;
mod fingerprint;
mod http;
mod metrics;
mod notifier;
mod provider;

pub use config::Config;
pub use fingerprint::FingerprintBuilder;
pub use provider::{IdentityProvider, SysfsProvider};

use detector::{ChangeMonitor, Settings};
use display::{ConsoleDisplay, InventoryDisplay};
use notifier::{LogNotifier, Notifier, WebhookNotifier};

pub fn command() -> Command {
    Command::new("monitor")
        .about("Watch the hardware identity and report changes")
        .arg(
            clap::Arg::new("CONFIG")
                .help("hwidwatch configuration file, defaults apply when omitted")
                .value_parser(value_parser!(PathBuf))
                .action(clap::ArgAction::Set)
                .index(1),
        )
}

/// Runs `hwidwatch` in `monitor` mode. A baseline fingerprint is taken at
/// startup and compared against a fresh one every poll interval. When they
/// differ a preliminary alert goes out immediately, and once the settle
/// window has passed the full before and after detail follows and the
/// inventory is re-displayed.
///
/// The first interrupt stops the monitor at its next poll boundary, a
/// second one terminates immediately.
pub fn run(config: Config) {
    let config: Arc<Config> = config.into();

    let mut log = crate::common::debug_log(config.log().level());

    // initialize async runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .thread_name("hwidwatch")
        .build()
        .expect("failed to launch async runtime");

    // spawn logging thread
    rt.spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = log.flush();
        }
    });

    let (shutdown, shutdown_rx) = watch::channel(false);

    ctrlc::set_handler(move || {
        if shutdown.send_replace(true) {
            info!("terminating immediately");
            std::process::exit(2);
        }

        info!("stopping, interrupt again to terminate immediately");
    })
    .expect("failed to set ctrl-c handler");

    let root = config.general().root();

    let provider: Arc<dyn IdentityProvider> = Arc::new(SysfsProvider::new(&root));
    let builder = FingerprintBuilder::new(provider, config.general().query_timeout());

    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if config.notify().log() {
        notifiers.push(Box::new(LogNotifier));
    }

    if let Some(url) = config.notify().webhook() {
        match WebhookNotifier::new(url, config.notify().webhook_timeout(), &root) {
            Ok(webhook) => notifiers.push(Box::new(webhook)),
            Err(e) => {
                eprintln!("failed to initialize webhook notifier: {e}");
                std::process::exit(1);
            }
        }
    }

    let display: Option<Box<dyn InventoryDisplay>> = if config.notify().console() {
        Some(Box::new(ConsoleDisplay::new(&root)))
    } else {
        None
    };

    rt.block_on(async move {
        if let Some(display) = &display {
            display.refresh().await;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(notifier::dispatch(rx, notifiers, display));

        let monitor = ChangeMonitor::start(builder, Settings::from(config.general()), tx).await;

        if let Some(listen) = config.general().listen() {
            let state = http::AppState::new(monitor.subscribe(), root);
            tokio::spawn(http::serve(listen, state));
        }

        if let Err(e) = tokio::spawn(monitor.run(shutdown_rx)).await {
            error!("change monitor task failed: {e}");
        }

        // the monitor has dropped its sender, so this finishes once the
        // queued notifications are delivered
        let _ = dispatcher.await;
    });

    std::thread::sleep(Duration::from_millis(200));
}
