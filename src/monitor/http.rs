use super::fingerprint::Fingerprint;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use metriken::Value;
use ringlog::*;
use systeminfo::SystemInfo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppState {
    baseline: watch::Receiver<Fingerprint>,
    root: PathBuf,
}

impl AppState {
    pub fn new(baseline: watch::Receiver<Fingerprint>, root: PathBuf) -> Self {
        Self { baseline, root }
    }
}

pub async fn serve(listen: SocketAddr, state: AppState) {
    let app: Router = app(Arc::new(state));

    let listener = match TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to listen on {listen}: {e}");
            return;
        }
    };

    info!("admin endpoint listening on {listen}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("admin endpoint stopped: {e}");
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/fingerprint", get(fingerprint))
        .route("/inventory", get(inventory))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
}

async fn root() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        "hwidwatch {version}\n\
        /fingerprint - the current baseline fingerprint\n\
        /inventory - a freshly collected system inventory\n\
        /metrics - prometheus metrics\n"
    )
}

async fn fingerprint(State(state): State<Arc<AppState>>) -> Json<Fingerprint> {
    Json(state.baseline.borrow().clone())
}

async fn inventory(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemInfo>, (StatusCode, String)> {
    let root = state.root.clone();

    tokio::task::spawn_blocking(move || SystemInfo::new(root))
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn metrics() -> String {
    prometheus()
}

/// Prometheus text exposition of every initialized counter and gauge.
pub fn prometheus() -> String {
    // metric name -> (type, samples)
    let mut families: BTreeMap<String, (&str, Vec<String>)> = BTreeMap::new();

    for metric in metriken::metrics().iter() {
        let (kind, value) = match metric.value() {
            Some(Value::Counter(value)) => ("counter", value.to_string()),
            Some(Value::Gauge(value)) => ("gauge", value.to_string()),
            _ => continue,
        };

        let name = metric.name().to_string();

        let mut metadata: Vec<String> = metric
            .metadata()
            .iter()
            .map(|(key, value)| format!("{key}=\"{value}\""))
            .collect();
        metadata.sort();

        let sample = if metadata.is_empty() {
            format!("{name} {value}")
        } else {
            format!("{name}{{{}}} {value}", metadata.join(", "))
        };

        families
            .entry(name)
            .or_insert_with(|| (kind, Vec::new()))
            .1
            .push(sample);
    }

    let mut data = String::new();

    for (name, (kind, mut samples)) in families {
        samples.sort();
        data += &format!("# TYPE {name} {kind}\n");
        for sample in samples {
            data += &sample;
            data += "\n";
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::metrics::*;
    use crate::monitor::provider::IdentifierKey;

    #[test]
    fn exposition() {
        POLLS.increment();
        CHANGES_CONFIRMED.increment();
        CHANGES_REVERTED.increment();

        let text = prometheus();

        assert!(text.contains("# TYPE hwidwatch_polls counter\nhwidwatch_polls "));
        assert_eq!(text.matches("# TYPE hwidwatch_changes counter").count(), 1);
        assert!(text.contains("hwidwatch_changes{state=\"confirmed\"} "));
        assert!(text.contains("hwidwatch_changes{state=\"reverted\"} "));
    }

    #[tokio::test]
    async fn handlers() {
        let dir = tempfile::tempdir().unwrap();
        let baseline: Fingerprint = [(IdentifierKey::MotherboardSerial, "ABC123".to_string())]
            .into_iter()
            .collect();
        let (tx, rx) = watch::channel(baseline.clone());
        let state = Arc::new(AppState::new(rx, dir.path().to_path_buf()));

        let Json(served) = fingerprint(State(state.clone())).await;
        assert_eq!(served, baseline);

        let mut changed = baseline.clone();
        changed.insert(IdentifierKey::MotherboardSerial, "N/A");
        tx.send_replace(changed.clone());

        let Json(served) = fingerprint(State(state.clone())).await;
        assert_eq!(served, changed);

        let Json(info) = inventory(State(state)).await.unwrap();
        assert_eq!(info.root, dir.path());

        assert!(root().await.contains("/fingerprint"));
    }
}
