use super::fingerprint::{Difference, Fingerprint};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The first, coarse signal that the hardware identity no longer matches the
/// baseline. Carries no before/after detail; that follows in a
/// [`ChangeEvent`] once the settle window has elapsed.
#[derive(Clone, Debug, Serialize)]
pub struct PreliminaryAlert {
    pub detected_at: DateTime<Utc>,
}

/// A confirmed divergence from the baseline fingerprint.
///
/// Under the `settled` report mode `current` is the last sample taken in the
/// settle window. If the hardware flapped back during the window the event is
/// still sent, so the earlier preliminary alert gets closed out, but it is
/// reverted: `current` equals `previous` and there are no differences.
#[derive(Clone, Debug, Serialize)]
pub struct ChangeEvent {
    previous: Fingerprint,
    current: Fingerprint,
    detected: Fingerprint,
    detected_at: DateTime<Utc>,
    timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(
        previous: Fingerprint,
        current: Fingerprint,
        detected: Fingerprint,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            previous,
            current,
            detected,
            detected_at,
            timestamp: Utc::now(),
        }
    }

    /// The baseline in effect before this change.
    pub fn previous(&self) -> &Fingerprint {
        &self.previous
    }

    /// The fingerprint reported as the new identity. Becomes the baseline.
    pub fn current(&self) -> &Fingerprint {
        &self.current
    }

    /// The fingerprint captured when the mismatch was first seen.
    pub fn detected(&self) -> &Fingerprint {
        &self.detected
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    /// When the event was emitted, after the settle window.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn differences(&self) -> Vec<Difference> {
        self.previous.diff(&self.current)
    }

    /// True when the hardware settled back to the previous identity before
    /// the settle window elapsed.
    pub fn is_reverted(&self) -> bool {
        self.previous == self.current
    }
}

/// Messages from the change monitor to the notification dispatcher.
#[derive(Clone, Debug)]
pub enum Notification {
    Preliminary(PreliminaryAlert),
    Change(ChangeEvent),
}
