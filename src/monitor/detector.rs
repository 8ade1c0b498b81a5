use super::config::{General, Report};
use super::error::Error;
use super::event::{ChangeEvent, Notification, PreliminaryAlert};
use super::fingerprint::{Fingerprint, FingerprintBuilder};
use super::metrics::*;

use chrono::Utc;
use futures::FutureExt;
use ringlog::*;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Timing and reporting behaviour of the change monitor.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub poll_interval: Duration,
    pub settle_window: Duration,
    pub report: Report,
}

impl From<&General> for Settings {
    fn from(general: &General) -> Self {
        Self {
            poll_interval: general.poll_interval(),
            settle_window: general.settle_window(),
            report: general.report(),
        }
    }
}

enum Outcome {
    Continue,
    Shutdown,
}

enum Settle {
    /// The window elapsed. Holds the last sample, if one was taken.
    Elapsed(Option<Fingerprint>),
    Shutdown,
}

/// Owns the baseline fingerprint and the polling loop which compares fresh
/// fingerprints against it.
///
/// On a mismatch a [`PreliminaryAlert`] is sent immediately, the monitor
/// keeps sampling for the settle window, and then a [`ChangeEvent`] is sent
/// and its `current` fingerprint becomes the new baseline. Notifications are
/// queued on an unbounded channel so delivery never holds up the loop.
pub struct ChangeMonitor {
    builder: FingerprintBuilder,
    settings: Settings,
    baseline: Fingerprint,
    published: watch::Sender<Fingerprint>,
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChangeMonitor {
    /// Takes the initial baseline. No change can be reported before this
    /// returns.
    pub async fn start(
        builder: FingerprintBuilder,
        settings: Settings,
        tx: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        let baseline = builder.build().await;
        info!("baseline established: {baseline}");

        let (published, _) = watch::channel(baseline.clone());

        Self {
            builder,
            settings,
            baseline,
            published,
            tx,
        }
    }

    /// Read-only view of the baseline, updated after every change event.
    pub fn subscribe(&self) -> watch::Receiver<Fingerprint> {
        self.published.subscribe()
    }

    /// Polls until `shutdown` becomes true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let period = self.settings.poll_interval;

        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => break,
                _ = interval.tick() => {}
            }

            let result = AssertUnwindSafe(self.poll_once(&mut interval, &mut shutdown))
                .catch_unwind()
                .await;

            let fault = match result {
                Ok(Ok(Outcome::Continue)) => continue,
                Ok(Ok(Outcome::Shutdown)) => break,
                Ok(Err(e)) => e,
                Err(panic) => Error::LoopIterationFault(panic_message(panic)),
            };

            POLL_FAULTS.increment();
            error!("{fault}");
        }

        info!("change monitor stopped");
    }

    async fn poll_once(
        &mut self,
        interval: &mut Interval,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Outcome, Error> {
        let detected = self.builder.build().await;
        POLLS.increment();

        if detected == self.baseline {
            return Ok(Outcome::Continue);
        }

        let detected_at = Utc::now();
        CHANGES_SUSPECTED.increment();
        warn!(
            "hardware identity differs from baseline, settling for {}",
            humantime::format_duration(self.settings.settle_window)
        );

        self.notify(Notification::Preliminary(PreliminaryAlert { detected_at }))?;

        let settled = match self.settle(interval, shutdown).await {
            Settle::Elapsed(settled) => settled,
            Settle::Shutdown => {
                info!("shutdown requested during settle window, change not reported");
                return Ok(Outcome::Shutdown);
            }
        };

        let current = match (self.settings.report, settled) {
            (Report::Settled, Some(settled)) => settled,
            _ => detected.clone(),
        };

        let previous = std::mem::replace(&mut self.baseline, current.clone());
        self.published.send_replace(current.clone());

        let event = ChangeEvent::new(previous, current, detected, detected_at);

        if event.is_reverted() {
            CHANGES_REVERTED.increment();
            info!("hardware identity returned to baseline within the settle window");
        } else {
            CHANGES_CONFIRMED.increment();
        }

        self.notify(Notification::Change(event))?;

        Ok(Outcome::Continue)
    }

    /// Keeps sampling on the poll interval until the settle window elapses.
    async fn settle(&self, interval: &mut Interval, shutdown: &mut watch::Receiver<bool>) -> Settle {
        let deadline = Instant::now() + self.settings.settle_window;
        let mut last = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => return Settle::Shutdown,
                _ = sleep_until(deadline) => return Settle::Elapsed(last),
                _ = interval.tick() => {}
            }

            last = Some(self.builder.build().await);
            SETTLE_SAMPLES.increment();
        }
    }

    fn notify(&self, notification: Notification) -> Result<(), Error> {
        self.tx
            .send(notification)
            .map_err(|_| Error::LoopIterationFault("notification channel closed".into()))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during poll".to_string()
    }
}
