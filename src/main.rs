use anyhow::Result;
use tracing::info;

use arbor_uci::UciEngine;

fn main() -> Result<()> {
    // stdout carries the UCI protocol, so logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("arbor starting");
    UciEngine::new().run()?;
    Ok(())
}
