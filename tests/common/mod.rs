//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use tenant_edge::config::{EdgeConfig, HostingConfig};
use tenant_edge::dns::DnsProbe;
use tenant_edge::hosting::HostingApiClient;
use tenant_edge::http::HttpServer;
use tenant_edge::lifecycle::{Services, Shutdown};
use tenant_edge::store::{MemorySiteStore, SiteRecord, SubscriptionTier};

pub const TOKEN: &str = "tok_test";
pub const PROJECT: &str = "prj_test";
pub const TEAM: &str = "team_test";

/// One request as seen by the mock hosting API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string.
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    /// `"METHOD /path"`, without the query.
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path())
    }
}

pub struct MockHostingApi {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHostingApi {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    /// Hosting config pointing at this mock.
    pub fn config(&self) -> HostingConfig {
        HostingConfig {
            api_base_url: self.base_url(),
            token: Some(TOKEN.into()),
            project_id: Some(PROJECT.into()),
            team_id: Some(TEAM.into()),
            timeout_secs: 2,
        }
    }

    pub fn client(&self) -> HostingApiClient {
        HostingApiClient::new(&self.config()).unwrap()
    }
}

/// Start a programmable mock of the hosting REST API on an ephemeral port.
pub async fn start_mock_hosting_api<F, Fut>(f: F) -> MockHostingApi
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        recorded.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockHostingApi { addr, requests }
}

/// Respond with fixed `(status, body)` per `"METHOD /path"`; 404 otherwise.
pub async fn start_routed_hosting_api(routes: Vec<(&str, u16, &str)>) -> MockHostingApi {
    let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
        routes
            .into_iter()
            .map(|(line, status, body)| {
                status_line(status);
                (line.to_string(), (status, body.to_string()))
            })
            .collect(),
    );

    start_mock_hosting_api(move |request| {
        let routes = routes.clone();
        async move {
            routes.get(&request.line()).cloned().unwrap_or((
                404,
                r#"{"error":{"code":"not_found","message":"no such route"}}"#.to_string(),
            ))
        }
    })
    .await
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "content-length" => content_length = value.trim().parse().unwrap_or(0),
            "authorization" => authorization = Some(value.trim().to_string()),
            _ => {}
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        target,
        authorization,
        body,
    })
}

/// Status line for a mock response. Panics on codes without a standard
/// reason phrase so a typo in a test setup cannot pass as success.
pub fn status_line(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_else(|| panic!("mock hosting API cannot answer with status {status}"));
    format!("{status} {reason}")
}

/// DNS answers fixed per domain.
#[derive(Default)]
pub struct StaticDns {
    pub cnames: HashMap<String, Vec<String>>,
    pub addresses: HashMap<String, Vec<Ipv4Addr>>,
}

#[async_trait]
impl DnsProbe for StaticDns {
    async fn lookup_cname(&self, domain: &str) -> Vec<String> {
        self.cnames.get(domain).cloned().unwrap_or_default()
    }

    async fn lookup_a(&self, domain: &str) -> Vec<Ipv4Addr> {
        self.addresses.get(domain).cloned().unwrap_or_default()
    }
}

pub fn site(id: &str, owner: &str, subdomain: &str, tier: SubscriptionTier, domain: Option<&str>) -> SiteRecord {
    SiteRecord {
        site_id: id.into(),
        owner_id: owner.into(),
        subdomain: subdomain.into(),
        tier,
        custom_domain: domain.map(str::to_string),
    }
}

/// A running edge server. Dropping it shuts the server down.
pub struct TestEdge {
    pub addr: SocketAddr,
    pub store: MemorySiteStore,
    pub config_tx: mpsc::UnboundedSender<EdgeConfig>,
    shutdown: Shutdown,
}

impl TestEdge {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestEdge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the edge on an ephemeral port with the given collaborators.
pub async fn start_edge(
    config: EdgeConfig,
    hosting: HostingApiClient,
    dns: StaticDns,
    store: MemorySiteStore,
) -> TestEdge {
    let services = Services::new(&config, Arc::new(hosting), Arc::new(dns), Arc::new(store.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, services);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestEdge {
        addr,
        store,
        config_tx,
        shutdown,
    }
}

/// Non-pooled client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
