//! # Plugin Lifecycle
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NotDownloaded ──download──► Downloaded ──install──► Installed         │
//! │        ▲                          ▲                       │             │
//! │        │                          └──────uninstall────────┘             │
//! │        │                             (files kept)                       │
//! │        │                                                                │
//! │        └──────────────── delete (from any state) ───────────────────────│
//! │                          registry cleared, directory removed            │
//! │                                                                         │
//! │   install before download ──► PluginError::NotDownloaded                │
//! │   failed fetch            ──► logged, state unchanged                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The filesystem and the settings registry are written one after the other,
//! never together. Concurrent `install` and `delete` on the same id are not
//! ordered: whichever settings write lands last wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use till_core::validation::validate_plugin_id;
use till_core::PluginRecord;
use till_db::document::write_atomic;
use till_db::SettingsStore;
use tracing::{debug, info, warn};

use crate::error::{PluginError, PluginResult};
use crate::source::BundleSource;
use crate::state::PluginStatus;

/// Name of the single entry-point document in each plugin directory.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Orchestrates plugin bundles on disk and their registry records.
#[derive(Clone)]
pub struct PluginLifecycle {
    settings: Arc<dyn SettingsStore>,
    plugins_dir: PathBuf,
    public_dir: PathBuf,
    http: reqwest::Client,
}

impl std::fmt::Debug for PluginLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLifecycle")
            .field("plugins_dir", &self.plugins_dir)
            .field("public_dir", &self.public_dir)
            .finish_non_exhaustive()
    }
}

impl PluginLifecycle {
    /// Creates a lifecycle rooted at `plugins_dir`.
    ///
    /// `public_dir` is where `/public/...` bundle sources resolve.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        plugins_dir: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
    ) -> PluginResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PluginError::HttpClient(e.to_string()))?;

        Ok(PluginLifecycle {
            settings,
            plugins_dir: plugins_dir.into(),
            public_dir: public_dir.into(),
            http,
        })
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// `<plugins_dir>/<id>`. The id must already be validated.
    pub fn plugin_dir(&self, id: &str) -> PathBuf {
        self.plugins_dir.join(id)
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.plugin_dir(id).join(ENTRY_DOCUMENT)
    }

    async fn is_downloaded(&self, id: &str) -> bool {
        tokio::fs::metadata(self.entry_path(id))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Fetches the entry document for `id` from `source`.
    ///
    /// Only a bad id or source is an error. A failed fetch is logged and the
    /// returned status shows the id still not downloaded; a previously
    /// downloaded document is left untouched.
    pub async fn download(&self, id: &str, source: &str) -> PluginResult<PluginStatus> {
        let id = validate_plugin_id(id)?;
        let source = BundleSource::parse(source, &self.public_dir)?;

        match self.fetch(&source).await {
            Ok(bytes) => {
                let entry = self.entry_path(&id);
                write_atomic(&entry, &bytes).await?;
                info!(id = %id, source = %source, bytes = bytes.len(), "Plugin downloaded");
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Plugin download failed");
            }
        }

        self.status(&id).await
    }

    /// Registers a downloaded plugin. Re-installing overwrites the record.
    ///
    /// Blank `route`/`label` default to `/plug/<id>` and the id.
    pub async fn install(
        &self,
        id: &str,
        route: Option<&str>,
        label: Option<&str>,
    ) -> PluginResult<PluginRecord> {
        let id = validate_plugin_id(id)?;

        if !self.is_downloaded(&id).await {
            return Err(PluginError::NotDownloaded { id });
        }

        let non_blank = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
        let record = PluginRecord {
            route: non_blank(route).unwrap_or_else(|| format!("/plug/{}", id)),
            label: non_blank(label).unwrap_or_else(|| id.clone()),
            local_path: self.plugin_dir(&id).to_string_lossy().into_owned(),
        };

        let mut settings = self.settings.get_all().await;
        settings.register_plugin(&id, record.clone());
        self.settings.set_all(&settings).await?;

        info!(id = %id, route = %record.route, "Plugin installed");
        Ok(record)
    }

    /// Clears the registry record and flag. Downloaded files stay.
    ///
    /// Returns whether anything was registered.
    pub async fn uninstall(&self, id: &str) -> PluginResult<bool> {
        let id = validate_plugin_id(id)?;

        let mut settings = self.settings.get_all().await;
        if !settings.unregister_plugin(&id) {
            debug!(id = %id, "Uninstall: not registered");
            return Ok(false);
        }
        self.settings.set_all(&settings).await?;

        info!(id = %id, "Plugin uninstalled");
        Ok(true)
    }

    /// Clears the registry, then removes the plugin directory recursively.
    pub async fn delete(&self, id: &str) -> PluginResult<()> {
        let id = validate_plugin_id(id)?;

        let mut settings = self.settings.get_all().await;
        if settings.unregister_plugin(&id) {
            self.settings.set_all(&settings).await?;
        }

        let dir = self.plugin_dir(&id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PluginError::io(&dir, e)),
        }

        info!(id = %id, "Plugin deleted");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn status(&self, id: &str) -> PluginResult<PluginStatus> {
        let id = validate_plugin_id(id)?;
        let installed = self.settings.get_all().await.is_installed(&id);
        Ok(PluginStatus {
            downloaded: self.is_downloaded(&id).await,
            installed,
        })
    }

    /// Ids with an entry document on disk, sorted.
    pub async fn downloaded_ids(&self) -> PluginResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.plugins_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PluginError::io(&self.plugins_dir, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PluginError::io(&self.plugins_dir, e))?
        {
            let Some(id) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if self.is_downloaded(&id).await {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Ids whose installed flag is set, sorted.
    pub async fn installed_ids(&self) -> Vec<String> {
        self.settings.get_all().await.installed_ids()
    }

    /// Entry document of a registered plugin, read through its record.
    ///
    /// `None` when the id has no record with a path.
    pub async fn entry_document(&self, id: &str) -> PluginResult<Option<String>> {
        let id = validate_plugin_id(id)?;
        let settings = self.settings.get_all().await;

        let Some(record) = settings
            .plugin_records
            .get(&id)
            .filter(|r| !r.local_path.is_empty())
        else {
            return Ok(None);
        };

        let path = Path::new(&record.local_path).join(ENTRY_DOCUMENT);
        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PluginError::io(&path, e))?;
        Ok(Some(html))
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// One attempt, no retry.
    async fn fetch(&self, source: &BundleSource) -> PluginResult<Vec<u8>> {
        match source {
            BundleSource::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| PluginError::fetch(path.display().to_string(), e)),
            BundleSource::Remote(url) => {
                debug!(url = %url, "Fetching remote bundle");
                let response = self
                    .http
                    .get(url.as_str())
                    .send()
                    .await
                    .map_err(|e| PluginError::fetch(url.as_str(), e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(PluginError::fetch(url.as_str(), format!("HTTP {}", status)));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| PluginError::fetch(url.as_str(), e))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PluginState;
    use till_db::FileSettingsStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const BUNDLE: &str = "<h1>FAQ</h1>";

    struct Fixture {
        dir: tempfile::TempDir,
        settings: Arc<FileSettingsStore>,
        lifecycle: PluginLifecycle,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let settings = Arc::new(FileSettingsStore::new(dir.path().join("settings.json")));
            let lifecycle = PluginLifecycle::new(
                settings.clone(),
                dir.path().join("plugins"),
                dir.path().join("web").join("public"),
            )
            .unwrap();

            let bundle = dir.path().join("web/public/plugins/faq.html");
            tokio::fs::create_dir_all(bundle.parent().unwrap()).await.unwrap();
            tokio::fs::write(&bundle, BUNDLE).await.unwrap();

            Fixture {
                dir,
                settings,
                lifecycle,
            }
        }
    }

    /// Serves exactly one HTTP response, then closes.
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/faq.html", addr)
    }

    #[tokio::test]
    async fn test_install_before_download_fails() {
        let f = Fixture::new().await;
        let err = f.lifecycle.install("p1", None, None).await.unwrap_err();
        assert!(matches!(err, PluginError::NotDownloaded { .. }));
        assert!(f.lifecycle.installed_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let f = Fixture::new().await;
        let l = &f.lifecycle;

        let status = l.download("p1", "/public/plugins/faq.html").await.unwrap();
        assert_eq!(status.state(), PluginState::Downloaded);

        let record = l.install("p1", None, Some("  ")).await.unwrap();
        assert_eq!(record.route, "/plug/p1");
        assert_eq!(record.label, "p1");
        assert_eq!(l.status("p1").await.unwrap().state(), PluginState::Installed);
        assert_eq!(l.entry_document("p1").await.unwrap().as_deref(), Some(BUNDLE));

        // Uninstall keeps files, so reinstall needs no download.
        assert!(l.uninstall("p1").await.unwrap());
        assert_eq!(l.status("p1").await.unwrap().state(), PluginState::Downloaded);
        assert_eq!(l.entry_document("p1").await.unwrap(), None);
        l.install("p1", Some("/faq"), Some("FAQ")).await.unwrap();
        assert_eq!(f.settings.get_all().await.plugin_records["p1"].label, "FAQ");

        l.delete("p1").await.unwrap();
        assert_eq!(l.status("p1").await.unwrap().state(), PluginState::NotDownloaded);
        assert!(!l.plugin_dir("p1").exists());
        assert!(f.settings.get_all().await.plugin_records.is_empty());
        assert!(matches!(
            l.install("p1", None, None).await,
            Err(PluginError::NotDownloaded { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_from_remote_source() {
        let f = Fixture::new().await;
        let url = one_shot_server("200 OK", BUNDLE).await;

        let status = f.lifecycle.download("remote", &url).await.unwrap();
        assert!(status.downloaded);

        let written = tokio::fs::read_to_string(f.lifecycle.plugin_dir("remote").join(ENTRY_DOCUMENT))
            .await
            .unwrap();
        assert_eq!(written, BUNDLE);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_absorbed() {
        let f = Fixture::new().await;

        let url = one_shot_server("500 Internal Server Error", "boom").await;
        let status = f.lifecycle.download("p1", &url).await.unwrap();
        assert_eq!(status.state(), PluginState::NotDownloaded);

        // Nothing is listening on a freshly released port.
        let closed = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let status = f
            .lifecycle
            .download("p1", &format!("http://{}/x.html", closed))
            .await
            .unwrap();
        assert!(!status.downloaded);

        let status = f
            .lifecycle
            .download("p1", "/public/plugins/missing.html")
            .await
            .unwrap();
        assert!(!status.downloaded);
        assert!(f.lifecycle.downloaded_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let f = Fixture::new().await;
        assert!(matches!(
            f.lifecycle.download("", "/public/plugins/faq.html").await,
            Err(PluginError::Validation(_))
        ));
        assert!(matches!(
            f.lifecycle.download("../escape", "/public/plugins/faq.html").await,
            Err(PluginError::Validation(_))
        ));
        assert!(matches!(
            f.lifecycle.download("p1", "  ").await,
            Err(PluginError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_orphaned_when_files_vanish() {
        let f = Fixture::new().await;
        let l = &f.lifecycle;
        l.download("p1", "/public/plugins/faq.html").await.unwrap();
        l.install("p1", None, None).await.unwrap();

        tokio::fs::remove_dir_all(l.plugin_dir("p1")).await.unwrap();
        assert_eq!(l.status("p1").await.unwrap().state(), PluginState::Orphaned);
        assert!(l.entry_document("p1").await.is_err());

        // Delete cleans up from any state, including a missing directory.
        l.delete("p1").await.unwrap();
        assert_eq!(l.status("p1").await.unwrap().state(), PluginState::NotDownloaded);
    }

    #[tokio::test]
    async fn test_listing() {
        let f = Fixture::new().await;
        let l = &f.lifecycle;
        let source = f.dir.path().join("web/public/plugins/faq.html");
        let source = source.to_str().unwrap();

        l.download("b", source).await.unwrap();
        l.download("a", source).await.unwrap();
        l.install("b", None, None).await.unwrap();
        tokio::fs::create_dir_all(l.plugins_dir().join("empty")).await.unwrap();

        assert_eq!(l.downloaded_ids().await.unwrap(), ["a", "b"]);
        assert_eq!(l.installed_ids().await, ["b"]);
    }
}
