use super::error::Error;
use super::metrics::*;
use super::provider::{IdentifierKey, IdentityProvider};

use ringlog::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use systeminfo::UNAVAILABLE;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Ordered mapping of identifier keys to their values. Two fingerprints are
/// equal when every key maps to an identical string, including the
/// unavailable marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    entries: Vec<(IdentifierKey, String)>,
}

/// A single identifier which differs between two fingerprints.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Difference {
    pub key: IdentifierKey,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl Fingerprint {
    pub fn get(&self, key: IdentifierKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(IdentifierKey, String)] {
        &self.entries
    }

    /// Appends or replaces the value for `key`. Insertion order is the
    /// display order.
    pub fn insert(&mut self, key: IdentifierKey, value: impl Into<String>) {
        let value = value.into();

        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// The identifiers whose values differ from `other`, in this
    /// fingerprint's order followed by any keys only `other` has.
    pub fn diff(&self, other: &Fingerprint) -> Vec<Difference> {
        let mut ret = Vec::new();

        for (key, before) in &self.entries {
            let after = other.get(*key);

            if after != Some(before.as_str()) {
                ret.push(Difference {
                    key: *key,
                    before: Some(before.clone()),
                    after: after.map(str::to_string),
                });
            }
        }

        for (key, after) in &other.entries {
            if self.get(*key).is_none() {
                ret.push(Difference {
                    key: *key,
                    before: None,
                    after: Some(after.clone()),
                });
            }
        }

        ret
    }

    /// Rows of `(display name, value)` for table rendering.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.display_name(), v.clone()))
            .collect()
    }
}

impl FromIterator<(IdentifierKey, String)> for Fingerprint {
    fn from_iter<T: IntoIterator<Item = (IdentifierKey, String)>>(iter: T) -> Self {
        let mut fingerprint = Fingerprint::default();
        for (key, value) in iter {
            fingerprint.insert(key, value);
        }
        fingerprint
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", key.display_name(), value)?;
        }
        f.write_str("}")
    }
}

/// Queries an [`IdentityProvider`] for every [`IdentifierKey`] and assembles
/// the results into a [`Fingerprint`].
#[derive(Clone)]
pub struct FingerprintBuilder {
    provider: Arc<dyn IdentityProvider>,
    timeout: Duration,
}

impl FingerprintBuilder {
    pub fn new(provider: Arc<dyn IdentityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Builds a complete fingerprint. Never fails: any identifier which
    /// cannot be read, or is not read within the query timeout, is recorded
    /// as the unavailable marker.
    pub async fn build(&self) -> Fingerprint {
        let mut fingerprint = Fingerprint::default();

        for key in IdentifierKey::ALL {
            let value = match self.value(key).await {
                Ok(value) => value,
                Err(e) => {
                    debug!("{e}");
                    IDENTIFIER_UNAVAILABLE.increment();
                    UNAVAILABLE.to_string()
                }
            };

            fingerprint.insert(key, value);
        }

        fingerprint
    }

    async fn value(&self, key: IdentifierKey) -> Result<String, Error> {
        let unavailable = |reason: String| Error::IdentifierUnavailable { key, reason };

        if let Some(label) = key.instance_label() {
            let values = tokio::time::timeout(self.timeout, self.provider.query_multi(key))
                .await
                .map_err(|_| {
                    IDENTIFIER_TIMEOUT.increment();
                    unavailable(format!("timed out after {:?}", self.timeout))
                })?
                .map_err(|e| unavailable(e.to_string()))?;

            if values.is_empty() {
                return Err(unavailable("no instances found".to_string()));
            }

            Ok(join_instances(label, &values))
        } else {
            tokio::time::timeout(self.timeout, self.provider.query(key))
                .await
                .map_err(|_| {
                    IDENTIFIER_TIMEOUT.increment();
                    unavailable(format!("timed out after {:?}", self.timeout))
                })?
                .map_err(|e| unavailable(e.to_string()))
        }
    }
}

/// Renders the instances of a multi-instance identifier as numbered lines,
/// for example `Disk 1: ...\nDisk 2: ...`.
pub fn join_instances(label: &str, values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| format!("{label} {}: {value}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use std::collections::HashMap;

    /// How a scripted identifier answers.
    #[derive(Clone, Debug)]
    pub enum Answer {
        Value(String),
        Values(Vec<String>),
        Fail,
        Hang,
        Panic,
    }

    /// A provider whose answers the test can change between polls.
    #[derive(Default)]
    pub struct ScriptedProvider {
        answers: Mutex<HashMap<IdentifierKey, Answer>>,
        queries: Mutex<usize>,
    }

    impl ScriptedProvider {
        /// Provider answering the scenario baseline: a motherboard serial,
        /// one disk, one MAC address, and failures for the rest.
        pub fn baseline() -> Self {
            let provider = Self::default();
            provider.set(
                IdentifierKey::MotherboardSerial,
                Answer::Value("ABC123".into()),
            );
            provider.set(
                IdentifierKey::DiskDrives,
                Answer::Values(vec!["SN001".into()]),
            );
            provider.set(
                IdentifierKey::MacAddresses,
                Answer::Values(vec!["00:11:22:33:44:55".into()]),
            );
            provider
        }

        pub fn set(&self, key: IdentifierKey, answer: Answer) {
            self.answers.lock().insert(key, answer);
        }

        pub fn queries(&self) -> usize {
            *self.queries.lock()
        }

        fn answer(&self, key: IdentifierKey) -> Answer {
            *self.queries.lock() += 1;
            let answer = self.answers.lock().get(&key).cloned().unwrap_or(Answer::Fail);
            if let Answer::Panic = answer {
                panic!("scripted provider fault for {key}");
            }
            answer
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        async fn query(&self, key: IdentifierKey) -> anyhow::Result<String> {
            match self.answer(key) {
                Answer::Value(v) => Ok(v),
                Answer::Hang => std::future::pending().await,
                _ => Err(anyhow::anyhow!("query failed")),
            }
        }

        async fn query_multi(&self, key: IdentifierKey) -> anyhow::Result<Vec<String>> {
            match self.answer(key) {
                Answer::Values(v) => Ok(v),
                Answer::Hang => std::future::pending().await,
                _ => Err(anyhow::anyhow!("query failed")),
            }
        }
    }
}
