//! External resource injection: the remote fallback drops a loader resource into the
//! hosting environment and waits for it to register the capability.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;

use super::CapabilityRegistry;
use crate::http::{HttpClient, ReqwestHttpClient};

/// Handle to one injected resource; pass back to [`ResourceInjector::remove`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: u64,
    url: String,
}

impl ResourceHandle {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("invalid resource url: {0}")]
    InvalidUrl(String),
    #[error("no async runtime to load the resource on")]
    NoRuntime,
    #[error("inject: {0}")]
    Other(String),
}

/// Injects and removes external loader resources.
pub trait ResourceInjector: Send + Sync {
    /// Starts loading `url`. Returns once the resource is in place, not once it has loaded.
    fn inject(&self, url: &str) -> Result<ResourceHandle, InjectError>;

    /// Removes a resource created by [`inject`](Self::inject). Unknown handles are ignored.
    fn remove(&self, handle: &ResourceHandle);
}

struct ActiveResource {
    path: PathBuf,
    task: Option<JoinHandle<()>>,
}

type ActiveMap = Arc<Mutex<HashMap<u64, ActiveResource>>>;

/// Downloads the resource into a directory on a background task and registers the
/// capability once the file has landed.
pub struct DownloadInjector {
    dir: PathBuf,
    capability: String,
    registry: Arc<dyn CapabilityRegistry>,
    http_client: Arc<dyn HttpClient>,
    next_id: AtomicU64,
    active: ActiveMap,
}

impl DownloadInjector {
    pub fn new(
        dir: impl AsRef<Path>,
        capability: impl Into<String>,
        registry: Arc<dyn CapabilityRegistry>,
    ) -> Self {
        Self::with_client(dir, capability, registry, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_client(
        dir: impl AsRef<Path>,
        capability: impl Into<String>,
        registry: Arc<dyn CapabilityRegistry>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            capability: capability.into(),
            registry,
            http_client,
            next_id: AtomicU64::new(1),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Paths of resources injected and not yet removed.
    pub fn active_paths(&self) -> Vec<PathBuf> {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let mut paths: Vec<PathBuf> = active.values().map(|r| r.path.clone()).collect();
        paths.sort();
        paths
    }

    fn file_name(id: u64, url: &url::Url) -> String {
        let last = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("resource.js");
        format!("{}-{}", id, last)
    }
}

impl ResourceInjector for DownloadInjector {
    fn inject(&self, url: &str) -> Result<ResourceHandle, InjectError> {
        let parsed =
            url::Url::parse(url).map_err(|e| InjectError::InvalidUrl(format!("{}: {}", url, e)))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| InjectError::NoRuntime)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| InjectError::Other(format!("create {}: {}", self.dir.display(), e)))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(Self::file_name(id, &parsed));
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                id,
                ActiveResource {
                    path: path.clone(),
                    task: None,
                },
            );

        let active = self.active.clone();
        let registry = self.registry.clone();
        let http_client = self.http_client.clone();
        let capability = self.capability.clone();
        let url_owned = url.to_string();
        let task = runtime.spawn(async move {
            let body = match http_client.get(&url_owned).await {
                Ok(resp) if resp.is_success() => resp.body,
                Ok(resp) => {
                    tracing::warn!(url = %url_owned, status = resp.status, "resource load failed");
                    return;
                }
                Err(e) => {
                    tracing::warn!(url = %url_owned, error = %e, "resource load failed");
                    return;
                }
            };
            // Held across the write so a concurrent remove() cannot leave a stray file.
            let active = active.lock().unwrap_or_else(|e| e.into_inner());
            if !active.contains_key(&id) {
                return;
            }
            if let Err(e) = std::fs::write(&path, body) {
                tracing::warn!(path = %path.display(), error = %e, "resource write failed");
                return;
            }
            registry.register_capability(&capability);
            tracing::debug!(url = %url_owned, path = %path.display(), "resource loaded");
        });

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        match active.get_mut(&id) {
            Some(entry) => entry.task = Some(task),
            None => task.abort(),
        }
        Ok(ResourceHandle::new(id, url))
    }

    fn remove(&self, handle: &ResourceHandle) {
        let entry = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&handle.id);
        let Some(entry) = entry else {
            return;
        };
        if let Some(task) = entry.task {
            task.abort();
        }
        match std::fs::remove_file(&entry.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), error = %e, "resource removal failed")
            }
        }
        tracing::debug!(url = handle.url(), "resource removed");
    }
}
