use std::net::Ipv4Addr;

use pnet::packet::ethernet::{EtherType, EtherTypes};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::datalink::MacAddr;

use crate::encap::{self, Encapsulation};
use crate::error::{field_bytes, FrameError};

/// Destination MAC, 6 bytes at 0. Sits before any VLAN tag.
pub const DST_MAC_OFFSET: usize = 0;
/// Source MAC, 6 bytes at 6. Sits before any VLAN tag.
pub const SRC_MAC_OFFSET: usize = 6;
pub const MAC_LEN: usize = 6;

/// Inner EtherType, 2 bytes at 12 + encapsulation offset.
pub const ETHERTYPE_OFFSET: usize = 12;
pub const ETHERTYPE_LEN: usize = 2;

/// Untagged Ethernet II header length. The network layer starts here
/// plus the encapsulation offset.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Version 4 with a 5-word (20 byte) header, the only IPv4 shape decoded.
pub const IPV4_PLAIN_VERSION_IHL: u8 = 0x45;
pub const IPV4_HEADER_LEN: usize = 20;

/// Link-layer fields of a frame, enough to run the MAC filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub encapsulation: Encapsulation,
    pub ethertype: EtherType,
}

impl LinkHeader {
    /// Start of the network-layer header within the frame.
    pub fn network_offset(&self) -> usize {
        ETHERNET_HEADER_LEN + self.encapsulation.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Addresses {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// Everything printed for one frame. `ipv4` is `None` when the payload is not
/// a plain 20-byte IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeader {
    pub link: LinkHeader,
    pub ipv4: Option<Ipv4Addresses>,
}

fn mac_at(frame: &[u8], field: &'static str, start: usize) -> Result<MacAddr, FrameError> {
    let b = field_bytes(frame, field, start, MAC_LEN)?;
    Ok(MacAddr::new(b[0], b[1], b[2], b[3], b[4], b[5]))
}

/// Read the MAC addresses and the EtherType behind any VLAN tags.
pub fn decode_link(frame: &[u8]) -> Result<LinkHeader, FrameError> {
    let encapsulation = encap::resolve(frame)?;
    let destination = mac_at(frame, "destination MAC", DST_MAC_OFFSET)?;
    let source = mac_at(frame, "source MAC", SRC_MAC_OFFSET)?;

    let ethertype_start = ETHERTYPE_OFFSET + encapsulation.offset();
    let raw = field_bytes(frame, "EtherType", ethertype_start, ETHERTYPE_LEN)?;
    let ethertype = EtherType(u16::from_be_bytes([raw[0], raw[1]]));

    Ok(LinkHeader {
        destination,
        source,
        encapsulation,
        ethertype,
    })
}

/// Read the IPv4 source and destination, if the frame carries a plain IPv4
/// header. Anything else (ARP, IPv6, IPv4 with options) yields `Ok(None)`.
pub fn decode_ipv4(frame: &[u8], link: &LinkHeader) -> Result<Option<Ipv4Addresses>, FrameError> {
    if link.ethertype != EtherTypes::Ipv4 {
        return Ok(None);
    }

    let start = link.network_offset();
    let version_ihl = field_bytes(frame, "IPv4 version/IHL", start, 1)?[0];
    if version_ihl != IPV4_PLAIN_VERSION_IHL {
        return Ok(None);
    }

    let header = field_bytes(frame, "IPv4 header", start, IPV4_HEADER_LEN)?;
    // the slice is exactly IPV4_HEADER_LEN, which Ipv4Packet accepts
    let ipv4 = Ipv4Packet::new(header).ok_or(FrameError::Truncated {
        field: "IPv4 header",
        needed: start + IPV4_HEADER_LEN,
        have: frame.len(),
    })?;

    Ok(Some(Ipv4Addresses {
        source: ipv4.get_source(),
        destination: ipv4.get_destination(),
    }))
}

pub fn decode(frame: &[u8]) -> Result<DecodedHeader, FrameError> {
    let link = decode_link(frame)?;
    let ipv4 = decode_ipv4(frame, &link)?;
    Ok(DecodedHeader { link, ipv4 })
}
