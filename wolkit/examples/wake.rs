//! Send one magic packet
//!
//! ```text
//! cargo run --example wake -- AA:BB:CC:DD:EE:FF [target] [port]
//! ```

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use wolkit::{Commands, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let mac = args.next().context("usage: wake <mac> [target] [port]")?;
    let target = args.next();
    let port = args
        .next()
        .map(|p| p.parse::<u16>())
        .transpose()
        .context("port must be a number")?;

    let config = Config::load("wolkit.toml")?;
    let commands = Commands::open(&config).await?;

    match commands.send_wol_packet(&mac, target.as_deref(), port).await {
        Ok(()) => println!("✓ Magic packet sent for {}", mac),
        Err(e) => {
            let report = e.report();
            println!("✗ {:?}: {}", report.kind, report.message);
        }
    }

    Ok(())
}
