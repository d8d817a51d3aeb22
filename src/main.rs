use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use viewcap::pcap_file::open_capture;
use viewcap::report::run;

mod cli;
use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    if let Some(ip4) = args.ip4 {
        debug!(%ip4, "--ip4 has no effect on the trace");
    }

    let config = args.trace_config();
    let mut cap = open_capture(&args.file)
        .with_context(|| format!("Failed to open PCAP file: {}", args.file.display()))?;

    let stdout = io::stdout();
    let summary = run(&config, &mut cap, BufWriter::new(stdout.lock()))
        .context("Failed to write trace")?;
    debug!(?summary, "done");

    Ok(())
}
