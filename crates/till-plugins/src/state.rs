//! Derived plugin state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle position of one plugin id, derived from two independent facts.
///
/// ```text
///                    installed = false     installed = true
/// downloaded = false   NotDownloaded          Orphaned
/// downloaded = true    Downloaded             Installed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PluginState {
    NotDownloaded,
    Downloaded,
    Installed,
    /// Registered, but the entry document is gone.
    Orphaned,
}

/// The two observed facts for one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PluginStatus {
    /// Entry document exists under the plugin directory.
    pub downloaded: bool,
    /// Registry record present and installed flag set.
    pub installed: bool,
}

impl PluginStatus {
    pub fn state(&self) -> PluginState {
        match (self.downloaded, self.installed) {
            (false, false) => PluginState::NotDownloaded,
            (true, false) => PluginState::Downloaded,
            (true, true) => PluginState::Installed,
            (false, true) => PluginState::Orphaned,
        }
    }
}
