//! # till-plugins: Plugin Lifecycle for Universal Till
//!
//! Extension bundles are single HTML entry documents kept under
//! `<data_dir>/plugins/<id>/index.html` and made discoverable through the
//! plugin registry in settings.
//!
//! ## Modules
//!
//! - [`lifecycle`] - download / install / uninstall / delete and queries
//! - [`source`] - bundle source classification
//! - [`state`] - derived `PluginState`
//! - [`error`] - `PluginError`
//!
//! ## Example
//! ```rust,ignore
//! let plugins = PluginLifecycle::new(stores.settings.clone(), "data/plugins", "web/public")?;
//! plugins.download("faq", "/public/plugins/faq.html").await?;
//! plugins.install("faq", None, None).await?;
//! ```

pub mod error;
pub mod lifecycle;
pub mod source;
pub mod state;

pub use error::{PluginError, PluginResult};
pub use lifecycle::{PluginLifecycle, ENTRY_DOCUMENT};
pub use source::BundleSource;
pub use state::{PluginState, PluginStatus};
