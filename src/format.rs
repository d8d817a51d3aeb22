//! Display formatting for link-layer and IPv4 addresses.

use std::net::Ipv4Addr;

use pnet::datalink::MacAddr;
use tracing::debug;

/// Format a hardware address as six uppercase hex octets joined by colons,
/// e.g. `AA:BB:CC:DD:EE:FF`.
///
/// Filter targets are compared against this exact string, so it must stay
/// uppercase.
pub fn format_mac(mac: MacAddr) -> String {
    let MacAddr(a, b, c, d, e, f) = mac;
    let pretty = format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        a, b, c, d, e, f
    );
    debug!(mac = %pretty, "formatted MAC address");
    pretty
}

/// Format an IPv4 address in dotted-decimal notation.
pub fn format_ipv4(addr: Ipv4Addr) -> String {
    addr.to_string()
}
