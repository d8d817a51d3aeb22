//! Command-line argument definitions.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use viewcap::report::TraceConfig;

/// Print the MAC and IPv4 addresses of each frame in a pcap file.
#[derive(Parser, Debug)]
#[command(name = "viewcap", version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Filename of the source PCAP file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// The MAC address to search for, in AA:BB:CC:DD:EE:FF format
    #[arg(long = "mac", value_name = "MAC", value_parser = parse_mac)]
    pub mac: Option<String>,

    /// The IPv4 address to change (accepted, currently unused)
    #[arg(long = "ip4", value_name = "ADDR")]
    pub ip4: Option<Ipv4Addr>,

    /// Number of matching packets to show (0 shows all)
    #[arg(short = 'h', long = "head", value_name = "N", default_value_t = 0)]
    pub head: u64,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn trace_config(&self) -> TraceConfig {
        TraceConfig {
            target_mac: self.mac.clone(),
            head: (self.head != 0).then_some(self.head),
        }
    }
}

/// Accept only the exact form the trace prints: six uppercase hex pairs.
fn parse_mac(value: &str) -> Result<String, String> {
    let octets: Vec<&str> = value.split(':').collect();
    let valid = octets.len() == 6
        && octets.iter().all(|octet| {
            octet.len() == 2
                && octet
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        });

    if valid {
        Ok(value.to_string())
    } else {
        Err(format!(
            "'{}' is not an uppercase AA:BB:CC:DD:EE:FF MAC address",
            value
        ))
    }
}
