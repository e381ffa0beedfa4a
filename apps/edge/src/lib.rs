//! # Universal Till Edge Library
//!
//! Composition root for one edge terminal. A request boundary (pages, htmx
//! handlers, the stdin scanner) calls into [`commands`] with plain scalars.
//!
//! ## Module Organization
//! ```text
//! till_edge/
//! ├── lib.rs          ◄─── You are here (tracing init & bootstrap)
//! ├── config.rs       ◄─── EdgeConfig: defaults < edge.toml < UT_* env
//! ├── error.rs        ◄─── ApiError for commands, StartupError
//! ├── scanner.rs      ◄─── keyboard-wedge line parser
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (stores, basket, display, plugins)
//! │   ├── basket.rs   ◄─── running basket behind a Mutex
//! │   └── display.rs  ◄─── current CurrencyFormat
//! └── commands/
//!     ├── basket.rs   ◄─── scan / tender
//!     ├── buttons.rs  ◄─── button admin
//!     ├── settings.rs ◄─── settings, theme, menu
//!     └── plugins.rs  ◄─── plugin lifecycle & pages
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod scanner;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::EdgeConfig;
use error::StartupError;
use state::AppState;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,till=debug,sqlx=warn";

/// Starts the terminal.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Edge Startup                                      │
/// │                                                                         │
/// │  1. Load Configuration (EdgeConfig::load) ───────────────────────────► │
/// │     • defaults < edge.toml < UT_* environment                           │
/// │                                                                         │
/// │  2. Open Stores ─────────────────────────────────────────────────────► │
/// │     • file: settings.json + buttons.json                                │
/// │     • sqlite: unitill.db, migrations, then one-shot legacy migration    │
/// │                                                                         │
/// │  3. Wire State ──────────────────────────────────────────────────────► │
/// │     • BasketEngine over the button store, tax policy from settings      │
/// │     • Display currency from settings (or UT_CURRENCY)                   │
/// │     • PluginLifecycle under <data_dir>/plugins                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn bootstrap(config: EdgeConfig) -> Result<AppState, StartupError> {
    info!(env = %config.env, "Starting Universal Till edge");
    AppState::open(config).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
