use super::display::InventoryDisplay;
use super::event::{ChangeEvent, Notification, PreliminaryAlert};
use super::metrics::NOTIFICATION_FAILURES;

use async_trait::async_trait;
use futures::FutureExt;
use ringlog::*;
use tokio::sync::mpsc;

use std::panic::AssertUnwindSafe;

mod log;
mod webhook;

pub use self::log::LogNotifier;
pub use webhook::WebhookNotifier;

/// A sink for hardware change notifications.
///
/// Delivery runs on the dispatcher task, never on the change monitor, so a
/// slow sink delays later notifications but not detection.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// The coarse "a change has been detected" signal.
    async fn deliver_preliminary_alert(&self, alert: &PreliminaryAlert) -> anyhow::Result<()>;

    /// Full before and after detail, once the settle window has elapsed.
    async fn deliver_change_detail(&self, event: &ChangeEvent) -> anyhow::Result<()>;
}

/// Drains the notification channel until the change monitor hangs up.
///
/// Each notification goes to every notifier in order. After a change event
/// has been delivered everywhere the inventory display is refreshed. A sink
/// that errors or panics is counted and skipped for that notification only.
pub async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    notifiers: Vec<Box<dyn Notifier>>,
    display: Option<Box<dyn InventoryDisplay>>,
) {
    while let Some(notification) = rx.recv().await {
        for notifier in &notifiers {
            let delivery = async {
                match &notification {
                    Notification::Preliminary(alert) => {
                        notifier.deliver_preliminary_alert(alert).await
                    }
                    Notification::Change(event) => notifier.deliver_change_detail(event).await,
                }
            };

            match AssertUnwindSafe(delivery).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    NOTIFICATION_FAILURES.increment();
                    error!("{} notifier failed to deliver: {e}", notifier.name());
                }
                Err(_) => {
                    NOTIFICATION_FAILURES.increment();
                    error!("{} notifier panicked during delivery", notifier.name());
                }
            }
        }

        if let (Notification::Change(_), Some(display)) = (&notification, &display) {
            if AssertUnwindSafe(display.refresh()).catch_unwind().await.is_err() {
                NOTIFICATION_FAILURES.increment();
                error!("inventory display panicked during refresh");
            }
        }
    }

    debug!("notification channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fingerprint::Fingerprint;
    use crate::monitor::provider::IdentifierKey;

    use chrono::Utc;
    use parking_lot::Mutex;

    use std::sync::Arc;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn deliver_preliminary_alert(&self, _: &PreliminaryAlert) -> anyhow::Result<()> {
            self.journal.lock().push(format!("{}: alert", self.name));
            if self.fail {
                anyhow::bail!("unreachable");
            }
            Ok(())
        }

        async fn deliver_change_detail(&self, event: &ChangeEvent) -> anyhow::Result<()> {
            let serial = event
                .current()
                .get(IdentifierKey::MotherboardSerial)
                .unwrap_or_default();
            self.journal.lock().push(format!("{}: detail {serial}", self.name));
            if self.fail {
                anyhow::bail!("unreachable");
            }
            Ok(())
        }
    }

    struct Screen {
        journal: Journal,
    }

    #[async_trait]
    impl InventoryDisplay for Screen {
        async fn refresh(&self) {
            self.journal.lock().push("refresh".to_string());
        }
    }

    struct Broken;

    #[async_trait]
    impl Notifier for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn deliver_preliminary_alert(&self, _: &PreliminaryAlert) -> anyhow::Result<()> {
            panic!("alert sink fault");
        }

        async fn deliver_change_detail(&self, _: &ChangeEvent) -> anyhow::Result<()> {
            panic!("detail sink fault");
        }
    }

    #[async_trait]
    impl InventoryDisplay for Broken {
        async fn refresh(&self) {
            panic!("stdout closed");
        }
    }

    fn change(serial: &str) -> Notification {
        let previous: Fingerprint = [(IdentifierKey::MotherboardSerial, "ABC123".to_string())]
            .into_iter()
            .collect();
        let current: Fingerprint = [(IdentifierKey::MotherboardSerial, serial.to_string())]
            .into_iter()
            .collect();

        Notification::Change(ChangeEvent::new(
            previous,
            current.clone(),
            current,
            Utc::now(),
        ))
    }

    fn alert() -> Notification {
        Notification::Preliminary(PreliminaryAlert {
            detected_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn delivery_order() {
        let journal = Journal::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let notifiers: Vec<Box<dyn Notifier>> = vec![
            Box::new(Recorder {
                name: "first",
                journal: journal.clone(),
                fail: true,
            }),
            Box::new(Recorder {
                name: "second",
                journal: journal.clone(),
                fail: false,
            }),
        ];
        let display = Screen {
            journal: journal.clone(),
        };

        tx.send(alert()).unwrap();
        tx.send(change("N/A")).unwrap();
        tx.send(alert()).unwrap();
        tx.send(change("ABC123")).unwrap();
        drop(tx);

        dispatch(rx, notifiers, Some(Box::new(display))).await;

        assert_eq!(
            *journal.lock(),
            vec![
                "first: alert",
                "second: alert",
                "first: detail N/A",
                "second: detail N/A",
                "refresh",
                "first: alert",
                "second: alert",
                "first: detail ABC123",
                "second: detail ABC123",
                "refresh",
            ]
        );
    }

    #[tokio::test]
    async fn panicking_sinks_are_skipped() {
        let journal = Journal::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let notifiers: Vec<Box<dyn Notifier>> = vec![
            Box::new(Broken),
            Box::new(Recorder {
                name: "log",
                journal: journal.clone(),
                fail: false,
            }),
        ];

        let failures = NOTIFICATION_FAILURES.value();

        tx.send(alert()).unwrap();
        tx.send(change("N/A")).unwrap();
        tx.send(alert()).unwrap();
        tx.send(change("XYZ999")).unwrap();
        drop(tx);

        let dispatcher = tokio::spawn(dispatch(rx, notifiers, Some(Box::new(Broken))));
        dispatcher.await.expect("dispatcher died");

        assert_eq!(
            *journal.lock(),
            vec![
                "log: alert",
                "log: detail N/A",
                "log: alert",
                "log: detail XYZ999",
            ]
        );
        // four deliveries and two refreshes
        assert!(NOTIFICATION_FAILURES.value() >= failures + 6);
    }
}
