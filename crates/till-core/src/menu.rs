//! Navigation menu derived from settings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Settings;

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub href: String,
    pub label: String,
}

impl MenuItem {
    fn new(href: &str, label: &str) -> Self {
        MenuItem {
            href: href.to_string(),
            label: label.to_string(),
        }
    }
}

/// Built-in pages, then external menu plugins, then locally installed plugins.
///
/// Entries with a blank route or label are skipped. Each plugin group is in
/// id order.
pub fn menu_items(settings: &Settings) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::new("/", "Home"),
        MenuItem::new("/designer", "Designer"),
        MenuItem::new("/settings", "Settings"),
        MenuItem::new("/plugins", "Plugins"),
    ];

    let external = settings
        .menu_plugins
        .values()
        .map(|p| (p.route.as_str(), p.label.as_str()));
    let local = settings
        .plugin_records
        .values()
        .map(|r| (r.route.as_str(), r.label.as_str()));

    items.extend(
        external
            .chain(local)
            .filter(|(route, label)| !route.is_empty() && !label.is_empty())
            .map(|(route, label)| MenuItem::new(route, label)),
    );
    items
}
