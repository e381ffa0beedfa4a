//! # Plugin Commands
//!
//! Thin wrappers over [`PluginLifecycle`](till_plugins::PluginLifecycle) that
//! add the page data the plugin admin and plugin pages render.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  download ──► install ──► uninstall ──► install again                  │
//! │                  │                                                      │
//! │                  └──► /plug/<id> page: entry document + page frame      │
//! │  delete (any state): registry cleared, then files removed               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::PluginRecord;
use till_plugins::{PluginState, PluginStatus};
use tracing::debug;

use crate::commands::settings::{page_frame, PageFrame};
use crate::error::ApiError;
use crate::state::AppState;

/// Observed facts plus the derived state, as the admin page polls them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginStateView {
    pub downloaded: bool,
    pub installed: bool,
    pub state: PluginState,
}

impl From<PluginStatus> for PluginStateView {
    fn from(status: PluginStatus) -> Self {
        PluginStateView {
            downloaded: status.downloaded,
            installed: status.installed,
            state: status.state(),
        }
    }
}

/// Data for the plugin admin page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsOverview {
    #[serde(flatten)]
    pub frame: PageFrame,
    pub installed_ids: Vec<String>,
    pub downloaded_ids: Vec<String>,
}

/// A local plugin's entry document embedded in the page frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginPage {
    #[serde(flatten)]
    pub frame: PageFrame,
    pub plugin_html: String,
}

pub async fn plugin_state(state: &AppState, id: &str) -> Result<PluginStateView, ApiError> {
    Ok(state.plugins.status(id).await?.into())
}

/// Fetches a bundle. A failed fetch is not an error: the answer shows the
/// plugin still not downloaded.
pub async fn download_plugin(
    state: &AppState,
    id: &str,
    bundle_url: &str,
) -> Result<PluginStateView, ApiError> {
    Ok(state.plugins.download(id, bundle_url).await?.into())
}

pub async fn install_plugin(
    state: &AppState,
    id: &str,
    route: Option<&str>,
    label: Option<&str>,
) -> Result<PluginRecord, ApiError> {
    Ok(state.plugins.install(id, route, label).await?)
}

pub async fn uninstall_plugin(state: &AppState, id: &str) -> Result<PluginStateView, ApiError> {
    state.plugins.uninstall(id).await?;
    plugin_state(state, id).await
}

pub async fn delete_plugin(state: &AppState, id: &str) -> Result<PluginStateView, ApiError> {
    state.plugins.delete(id).await?;
    plugin_state(state, id).await
}

pub async fn plugins_overview(state: &AppState) -> Result<PluginsOverview, ApiError> {
    Ok(PluginsOverview {
        frame: page_frame(state, "Plugins").await,
        installed_ids: state.plugins.installed_ids().await,
        downloaded_ids: state.plugins.downloaded_ids().await?,
    })
}

/// The page at a plugin's route. `None` when the id has no registry record
/// (the boundary's 404); an unreadable entry document is an error.
pub async fn plugin_page(state: &AppState, id: &str) -> Result<Option<PluginPage>, ApiError> {
    let label = match state.stores.settings.get_all().await.plugin_records.get(id.trim()) {
        Some(record) => record.label.clone(),
        None => {
            debug!(id = %id, "No plugin record for page");
            return Ok(None);
        }
    };

    let Some(plugin_html) = state.plugins.entry_document(id).await? else {
        return Ok(None);
    };

    Ok(Some(PluginPage {
        frame: page_frame(state, &label).await,
        plugin_html,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;
    use till_db::StorageBackend;

    async fn publish_bundle(state: &AppState, name: &str, html: &str) {
        let dir = state.config.public_dir.join("bundles");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(name), html).await.unwrap();
    }

    #[tokio::test]
    async fn test_full_lifecycle_through_commands() {
        let (_dir, state) = app(StorageBackend::Sqlite).await;
        publish_bundle(&state, "faq.html", "<h1>FAQ</h1>").await;

        let s = plugin_state(&state, "faq").await.unwrap();
        assert_eq!(s.state, PluginState::NotDownloaded);

        let err = install_plugin(&state, "faq", None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PluginError);

        let s = download_plugin(&state, "faq", "/public/bundles/faq.html").await.unwrap();
        assert_eq!(s.state, PluginState::Downloaded);

        let record = install_plugin(&state, "faq", None, Some("Help")).await.unwrap();
        assert_eq!(record.route, "/plug/faq");
        assert_eq!(record.label, "Help");

        let page = plugin_page(&state, "faq").await.unwrap().unwrap();
        assert_eq!(page.frame.title, "Help");
        assert_eq!(page.plugin_html, "<h1>FAQ</h1>");
        assert!(page.frame.menu_items.iter().any(|m| m.href == "/plug/faq"));

        let overview = plugins_overview(&state).await.unwrap();
        assert_eq!(overview.installed_ids, ["faq"]);
        assert_eq!(overview.downloaded_ids, ["faq"]);

        let s = uninstall_plugin(&state, "faq").await.unwrap();
        assert_eq!(s.state, PluginState::Downloaded);
        assert!(plugin_page(&state, "faq").await.unwrap().is_none());

        install_plugin(&state, "faq", None, None).await.unwrap();
        let s = delete_plugin(&state, "faq").await.unwrap();
        assert_eq!(s.state, PluginState::NotDownloaded);
        assert!(plugins_overview(&state).await.unwrap().downloaded_ids.is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_is_not_an_error() {
        let (_dir, state) = app(StorageBackend::Document).await;
        let s = download_plugin(&state, "ghost", "/public/bundles/missing.html")
            .await
            .unwrap();
        assert!(!s.downloaded);

        let err = download_plugin(&state, "../x", "/public/a.html").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = download_plugin(&state, "ok", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
