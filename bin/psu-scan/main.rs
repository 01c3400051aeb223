use std::path::PathBuf;

use clap::Parser;
use fugit::MillisDurationU32;
use log::info;
use udp3000s_psu::{
    config::load_config, logging::initialize_logging, scan::scan_with,
    system::SystemResourceManager,
};

/// List connected VISA instruments and their *IDN? strings
#[derive(Parser, Debug)]
#[command(name = "psu-scan")]
#[command(about = "List connected VISA instruments and their identification", long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./psu.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Per-resource timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    timeout_ms: Option<u32>,

    /// Extra resource to probe, e.g. TCPIP0::192.168.1.20::5025::SOCKET (repeatable)
    #[arg(short, long = "resource", value_name = "RESOURCE")]
    resources: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    let log_level = args
        .log_level
        .unwrap_or_else(|| config.logging.log_level.clone());
    initialize_logging(&log_level);

    if let Some(timeout_ms) = args.timeout_ms {
        config.transport.timeout_ms = timeout_ms;
    }
    info!(
        "Scanning with {} ms timeout, {} baud",
        config.transport.timeout_ms, config.transport.baud_rate
    );

    let mut manager = SystemResourceManager::new(&config.transport);
    for resource in args.resources {
        manager.add_resource(resource);
    }

    let report = scan_with(
        &mut manager,
        MillisDurationU32::millis(config.transport.timeout_ms),
        |event| print!("{event}"),
    );
    info!("{} instrument(s) identified", report.identified().count());
    Ok(())
}
