//! # till-db: Persistence Layer for Universal Till
//!
//! Settings and button persistence behind two capability traits, each with
//! two interchangeable backends.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        till-db Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Edge app / till-plugins                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<dyn SettingsStore / ButtonStore>   │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Stores::open(backend, data_dir)                │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────┐      ┌──────────────────────────┐   │   │
//! │  │   │  document/           │      │  repository/             │   │   │
//! │  │   │  settings.json       │      │  settings (key, value)   │   │   │
//! │  │   │  buttons.json        │─────►│  buttons (ordered)       │   │   │
//! │  │   │  RwLock + atomic     │legacy│  SQLite transactions     │   │   │
//! │  │   │  rename              │      │                          │   │   │
//! │  │   └──────────────────────┘      └──────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use till_db::{StorageBackend, Stores};
//!
//! let stores = Stores::open(StorageBackend::Sqlite, "./data".as_ref()).await?;
//! let settings = stores.settings.get_all().await;
//! ```

pub mod backend;
pub mod document;
pub mod error;
pub mod legacy;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod resolver;
pub mod store;

pub use backend::{StorageBackend, Stores, UnknownBackend};
pub use document::{FileButtonStore, FileSettingsStore};
pub use error::{StoreError, StoreResult};
pub use legacy::{migrate_legacy, LegacyPaths, MigrationOutcome, MigrationReport};
pub use pool::{Database, DbConfig};
pub use repository::{SqliteButtonStore, SqliteSettingsStore};
pub use resolver::ButtonPriceResolver;
pub use store::{ButtonStore, SettingsStore};
