//! # Integration Fixtures
//!
//! An in-process mock upstream, a fully wired relay bound to an ephemeral
//! port, and helpers for building signed publish requests.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use pr_01_permissions::{PermissionApi, PermissionService};
use pr_02_auth_chain::{AuthChainCodec, RelaySigner};
use pr_04_api_gateway::RelayConfig;
use relay_runtime::RelayRuntime;
use reqwest::multipart::{Form, Part};
use shared_types::EntityId;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// =============================================================================
// KEYS AND IDS
// =============================================================================

/// The publishing user's wallet.
pub const USER_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
/// The relay's own key.
pub const RELAY_KEY: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
/// A wallet nobody granted anything to.
pub const STRANGER_KEY: &str = "0x3333333333333333333333333333333333333333333333333333333333333333";

pub const ENTITY_ID: &str = "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku";

pub fn wallet(key: &str) -> RelaySigner {
    RelaySigner::from_hex(key).unwrap()
}

// =============================================================================
// MOCK UPSTREAM
// =============================================================================

#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl ReceivedPart {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Clone, Default)]
pub struct UpstreamState {
    pub uploads: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
    pub origins: Arc<Mutex<Vec<Option<String>>>>,
    pub discovery_paths: Arc<Mutex<Vec<String>>>,
    /// Delay before answering a publish.
    pub delay: Arc<Mutex<Option<Duration>>>,
    /// Status and body to reject publishes with.
    pub reject: Arc<Mutex<Option<(StatusCode, String)>>>,
}

pub struct MockUpstream {
    pub base_url: String,
    pub state: UpstreamState,
}

async fn receive_upload(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            data,
        });
    }
    state.uploads.lock().push(parts);
    state.origins.lock().push(
        headers
            .get("x-upload-origin")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let delay = *state.delay.lock();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let reject = state.reject.lock().clone();
    if let Some((status, body)) = reject {
        return (status, body).into_response();
    }

    Json(serde_json::json!({
        "creationTimestamp": 1700000000000u64,
        "deployedBy": "mock",
    }))
    .into_response()
}

async fn available_content(State(state): State<UpstreamState>, uri: axum::http::Uri) -> Response {
    state
        .discovery_paths
        .lock()
        .push(uri.path_and_query().map(|pq| pq.to_string()).unwrap_or_default());
    (
        StatusCode::OK,
        [
            ("content-type", "application/json"),
            ("access-control-allow-origin", "*"),
            ("set-cookie", "session=upstream"),
            ("x-powered-by", "mock"),
        ],
        r#"[{"cid":"bafy1","available":true}]"#,
    )
        .into_response()
}

async fn record_other(State(state): State<UpstreamState>, uri: axum::http::Uri) -> StatusCode {
    state
        .discovery_paths
        .lock()
        .push(uri.path_and_query().map(|pq| pq.to_string()).unwrap_or_default());
    StatusCode::NOT_FOUND
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = UpstreamState::default();
        let router = Router::new()
            .route("/content/entities", post(receive_upload))
            .route("/content/available-content", get(available_content))
            .fallback(record_other)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn uploads(&self) -> Vec<Vec<ReceivedPart>> {
        self.state.uploads.lock().clone()
    }
}

/// URL of a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// RELAY HARNESS
// =============================================================================

pub struct RelayHarness {
    pub base_url: String,
    pub permissions: Arc<PermissionService>,
    pub authorizations: PathBuf,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<bool>,
    _dir: TempDir,
}

impl RelayHarness {
    /// Start a relay in front of `upstream_url` with `grants` as its
    /// authorization document. `tweak` adjusts the config before startup.
    pub async fn start(
        upstream_url: &str,
        grants: serde_json::Value,
        tweak: impl FnOnce(&mut RelayConfig),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let authorizations = dir.path().join("authorizations.json");
        std::fs::write(&authorizations, grants.to_string()).unwrap();

        let mut config = RelayConfig::default();
        config.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.upstream.base_url = upstream_url.to_string();
        config.permissions.source = authorizations.display().to_string();
        tweak(&mut config);

        let runtime = RelayRuntime::new(config, wallet(RELAY_KEY)).unwrap();
        let permissions = runtime.permissions();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runtime.run(listener, rx).await.is_ok() });

        for _ in 0..100 {
            if permissions.snapshot().generation() >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            base_url: format!("http://{addr}"),
            permissions,
            authorizations,
            shutdown,
            handle,
            _dir: dir,
        }
    }

    pub fn write_authorizations(&self, contents: &str) {
        std::fs::write(&self.authorizations, contents).unwrap();
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signal shutdown and wait for a clean exit.
    pub async fn stop(self) -> bool {
        self.shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap()
    }
}

/// Authorization document granting `plots` to `address`.
pub fn grant(address: &str, plots: &[&str]) -> serde_json::Value {
    serde_json::json!([{
        "name": "Linker grant",
        "desc": "integration",
        "startDate": "2020-01-01T00:00:00Z",
        "endDate": "2999-01-01T00:00:00Z",
        "contactInfo": {"name": "ops"},
        "addresses": [address],
        "plots": plots,
    }])
}

// =============================================================================
// PUBLISH REQUESTS
// =============================================================================

pub fn entity_json(pointers: &[&str]) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "version": "v3",
        "type": "scene",
        "pointers": pointers,
        "timestamp": 1700000000000u64,
        "content": [{"file": "model.glb", "hash": "bafymodel"}],
        "metadata": {"scene": {"base": pointers.first(), "parcels": pointers}},
    }))
    .unwrap()
}

/// A publish body: text fields then file parts.
pub struct Upload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, Vec<u8>)>,
}

impl Upload {
    /// Entity `ENTITY_ID` claiming `pointers`, signed by `signer`. The
    /// SIGNER link carries `declared` instead of the signer's own address
    /// when given.
    pub fn signed(signer: &RelaySigner, pointers: &[&str], declared: Option<&str>) -> Self {
        let (chain, _) = signer.sign(&EntityId::new(ENTITY_ID)).unwrap();
        let mut fields = vec![("entityId".to_string(), ENTITY_ID.to_string())];
        for (name, value) in AuthChainCodec::new().encode_form_fields(&chain) {
            let value = match declared {
                Some(declared) if name == "authChain[0][payload]" => declared.to_string(),
                _ => value,
            };
            fields.push((name, value));
        }

        Self {
            fields,
            files: vec![
                (ENTITY_ID.to_string(), entity_json(pointers)),
                ("bafymodel".to_string(), b"glTF-binary".to_vec()),
            ],
        }
    }

    pub fn without_fields(mut self, prefix: &str) -> Self {
        self.fields.retain(|(name, _)| !name.starts_with(prefix));
        self
    }

    pub fn form(&self) -> Form {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, data) in &self.files {
            form = form.part(name.clone(), Part::bytes(data.clone()).file_name(name.clone()));
        }
        form
    }
}

pub async fn publish(relay: &RelayHarness, upload: &Upload) -> reqwest::Response {
    reqwest::Client::new()
        .post(relay.url("/content/entities"))
        .multipart(upload.form())
        .send()
        .await
        .unwrap()
}

/// Send `GET <target>` verbatim, bypassing client-side path normalisation,
/// and return the response status line.
pub async fn raw_get(relay: &RelayHarness, target: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let addr = relay.base_url.trim_start_matches("http://");
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
