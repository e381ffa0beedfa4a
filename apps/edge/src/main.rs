//! Headless edge terminal.
//!
//! Reads scanner lines from stdin and prints the basket after each one.
//! Logs go to stderr so stdout stays a clean till display.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use till_edge::commands::basket::{self, BasketView};
use till_edge::config::EdgeConfig;
use till_edge::scanner::ScanInput;
use till_edge::{bootstrap, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = EdgeConfig::load().context("loading edge configuration")?;
    let state = bootstrap(config).await.context("starting edge terminal")?;

    print_basket(&basket::get_basket(&state).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading scanner input")? {
        let input = match ScanInput::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = %line.trim(), error = %e, "Rejected scanner input");
                continue;
            }
        };

        if let ScanInput::Tender { method, .. } = &input {
            info!(method = %method, "Tendering");
        }
        print_basket(&input.apply(&state).await);
    }

    if let Some(db) = &state.stores.database {
        db.close().await;
    }
    info!("Scanner input closed, shutting down");
    Ok(())
}

fn print_basket(view: &BasketView) {
    for line in &view.lines {
        println!(
            "{:>4} x {:<24} {:>10} {:>10}",
            line.line.qty, line.line.name, line.unit_price, line.line_total
        );
    }
    println!(
        "items {}  subtotal {}  tax {}  total {}",
        view.item_count, view.subtotal, view.tax, view.total
    );
}
