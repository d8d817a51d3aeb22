//! Decode and filter a recorded stream of Ethernet frames into a readable
//! MAC/IPv4 trace, tracking 802.1Q and 802.1QinQ encapsulation.

pub mod deframe;
pub mod encap;
pub mod error;
pub mod filter;
pub mod format;
pub mod pcap_file;
pub mod report;
