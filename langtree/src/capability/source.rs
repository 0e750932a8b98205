//! Dynamic module source: fetch a capability initializer on demand.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{registering_initializer, Initializer};
use crate::http::{HttpClient, ReqwestHttpClient};

/// Result of a module fetch. A module that resolved but exposes nothing callable is
/// [`LoadedModule::NotInvocable`].
pub enum LoadedModule {
    Invocable(Initializer),
    NotInvocable(String),
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedModule::Invocable(_) => f.write_str("Invocable(<initializer>)"),
            LoadedModule::NotInvocable(what) => f.debug_tuple("NotInvocable").field(what).finish(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module not found: {0}")]
    NotFound(String),
    #[error("invalid module url: {0}")]
    InvalidUrl(String),
    #[error("module registry returned status {0}")]
    Status(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

/// Fetches modules by name. Abstraction for testing.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn fetch_module(&self, name: &str) -> Result<LoadedModule, ModuleError>;
}

/// Module descriptor served by a plugin registry at `{registry_url}/{name}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Capability names the module registers when initialized.
    #[serde(default)]
    pub provides: Vec<String>,
}

/// Resolves modules from an HTTP plugin registry.
pub struct HttpModuleSource {
    registry_url: String,
    http_client: Arc<dyn HttpClient>,
}

impl HttpModuleSource {
    /// Registry at `registry_url` using a plain reqwest client.
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self::with_client(registry_url, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_client(registry_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            registry_url: registry_url.into(),
            http_client,
        }
    }

    fn manifest_url(&self, name: &str) -> Result<url::Url, ModuleError> {
        let raw = format!("{}/{}.json", self.registry_url.trim_end_matches('/'), name);
        url::Url::parse(&raw).map_err(|e| ModuleError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

#[async_trait]
impl ModuleSource for HttpModuleSource {
    async fn fetch_module(&self, name: &str) -> Result<LoadedModule, ModuleError> {
        let url = self.manifest_url(name)?;
        tracing::debug!(module = name, url = %url, "fetching module manifest");
        let response = self
            .http_client
            .get(url.as_str())
            .await
            .map_err(ModuleError::Transport)?;
        if response.status == 404 {
            return Err(ModuleError::NotFound(name.to_string()));
        }
        if !response.is_success() {
            return Err(ModuleError::Status(response.status));
        }
        let manifest: ModuleManifest = serde_json::from_str(&response.body)
            .map_err(|e| ModuleError::Manifest(e.to_string()))?;
        if manifest.name != name {
            return Err(ModuleError::Manifest(format!(
                "expected module {:?}, registry served {:?}",
                name, manifest.name
            )));
        }
        if manifest.provides.is_empty() {
            return Ok(LoadedModule::NotInvocable(format!(
                "module {} provides no capabilities",
                name
            )));
        }
        Ok(LoadedModule::Invocable(registering_initializer(
            manifest.provides,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{invoke_initializer, CapabilityRegistry, InMemoryRegistry};
    use crate::http::HttpResponse;
    use std::sync::Mutex;

    struct MockHttpClient {
        response: Result<HttpResponse, String>,
        urls: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn new(response: Result<HttpResponse, String>) -> Arc<Self> {
            Arc::new(Self {
                response,
                urls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.urls.lock().unwrap().push(url.to_string());
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn invocable_manifest_registers_provided_capabilities() {
        let client = MockHttpClient::new(Ok(HttpResponse::new(
            200,
            r#"{"name":"networkgraph","version":"11.4.0","provides":["networkgraph"]}"#,
        )));
        let source = HttpModuleSource::with_client("https://plugins.example.com/", client.clone());

        let module = source.fetch_module("networkgraph").await.unwrap();
        let init = match module {
            LoadedModule::Invocable(init) => init,
            other => panic!("expected invocable module, got {:?}", other),
        };
        let registry = InMemoryRegistry::new();
        invoke_initializer(&init, &registry).unwrap();
        assert!(registry.has_capability("networkgraph"));
        assert_eq!(
            client.urls.lock().unwrap().as_slice(),
            ["https://plugins.example.com/networkgraph.json"]
        );
    }

    #[tokio::test]
    async fn empty_provides_is_not_invocable() {
        let client = MockHttpClient::new(Ok(HttpResponse::new(200, r#"{"name":"networkgraph"}"#)));
        let source = HttpModuleSource::with_client("https://plugins.example.com", client);
        let module = source.fetch_module("networkgraph").await.unwrap();
        assert!(matches!(module, LoadedModule::NotInvocable(_)));
    }

    #[tokio::test]
    async fn status_and_transport_errors() {
        let source = HttpModuleSource::with_client(
            "https://plugins.example.com",
            MockHttpClient::new(Ok(HttpResponse::new(404, ""))),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::NotFound(name)) if name == "networkgraph"
        ));

        let source = HttpModuleSource::with_client(
            "https://plugins.example.com",
            MockHttpClient::new(Ok(HttpResponse::new(503, ""))),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::Status(503))
        ));

        let source = HttpModuleSource::with_client(
            "https://plugins.example.com",
            MockHttpClient::new(Err("connection refused".to_string())),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn mismatched_or_garbled_manifest_is_rejected() {
        let source = HttpModuleSource::with_client(
            "https://plugins.example.com",
            MockHttpClient::new(Ok(HttpResponse::new(
                200,
                r#"{"name":"sankey","provides":["sankey"]}"#,
            ))),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::Manifest(_))
        ));

        let source = HttpModuleSource::with_client(
            "https://plugins.example.com",
            MockHttpClient::new(Ok(HttpResponse::new(200, "<html>"))),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::Manifest(_))
        ));
    }

    #[tokio::test]
    async fn invalid_registry_url() {
        let source = HttpModuleSource::with_client(
            "not a url",
            MockHttpClient::new(Ok(HttpResponse::new(200, ""))),
        );
        assert!(matches!(
            source.fetch_module("networkgraph").await,
            Err(ModuleError::InvalidUrl(_))
        ));
    }
}
