//! # Commands Module
//!
//! Operations a request boundary calls with already-extracted scalars.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── basket.rs    ◄─── scan, tender, basket view
//! ├── buttons.rs   ◄─── quick-sale button admin
//! ├── settings.rs  ◄─── theme, settings save, navigation menu
//! └── plugins.rs   ◄─── plugin lifecycle and plugin pages
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/pos/scan  code=A&qty=2                                       │
//! │         │                                                               │
//! │         │ (boundary parses the form)                                    │
//! │         ▼                                                               │
//! │  commands::basket::scan(&state, "A", Some(2))                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  BasketView { lines, subtotal, tax, total, formatted amounts }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command takes `&AppState` and touches only the parts it needs.

pub mod basket;
pub mod buttons;
pub mod plugins;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support {
    use till_db::StorageBackend;

    use crate::config::EdgeConfig;
    use crate::state::AppState;

    /// App state rooted in a fresh temp dir with the given backend.
    pub async fn app(backend: StorageBackend) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = EdgeConfig {
            data_dir: dir.path().join("data"),
            store: backend,
            env: "test".to_string(),
            public_dir: dir.path().join("web").join("public"),
            currency: None,
        };
        let state = AppState::open(config).await.unwrap();
        (dir, state)
    }
}
