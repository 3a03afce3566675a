//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use canary_controller::config::ServiceConfig;
use canary_controller::lifecycle::Shutdown;
use canary_controller::store::ConfigStore;
use canary_controller::{CanaryService, HttpServer};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-key";

pub const STORE: &str = "\
Apps:
- Name: jupyterhub
  Disable: false
  CookieInfo:
    Expiration: 48h
    CanaryPercent: 0.9
    IfSuccessful:
      Key: a
      Value: a
    IfFail:
      Key: b
      Value: b
  View:
    ShowSuccess: true
    ShowFail: true
  Logging:
    Disable: false
- Name: grafana
  Mode: ab-test
  CookieInfo:
    Expiration: 1h
    CanaryPercent: 0.0
    IfSuccessful:
      Key: grafana-release
      Value: next
Port: 8080
";

/// A running controller backed by a scratch store file.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store_path: PathBuf,
    pub shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a controller on an ephemeral port with `store` as the YAML content.
pub async fn start_server(store: &str, auth: bool) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("deployment-controller.yaml");
    std::fs::write(&store_path, store).unwrap();

    let mut config = ServiceConfig::default();
    config.store.path = store_path.display().to_string();
    config.auth.enabled = auth;
    config.auth.api_key = API_KEY.to_string();

    let service = CanaryService::new(
        Arc::new(ConfigStore::from_path(&store_path)),
        Duration::from_millis(config.store.io_timeout_ms),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, service);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestServer {
        addr,
        store_path,
        shutdown,
        _dir: dir,
    }
}
