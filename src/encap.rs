//! VLAN encapsulation detection.
//!
//! A VLAN tag sits between the source MAC and the real EtherType, so every
//! header field after byte 12 moves by the size of the tags in front of it.

use pnet::packet::ethernet::{EtherType, EtherTypes};
use tracing::debug;

use crate::error::{field_bytes, FrameError};

/// Offset of the 2-byte tag protocol identifier (the outer EtherType).
/// Fixed; it is the field that decides the encapsulation.
pub const TPID_OFFSET: usize = 12;

/// Width of the tag protocol identifier.
pub const TPID_LEN: usize = 2;

/// Size of one 802.1Q tag (TPID + TCI).
pub const VLAN_TAG_LEN: usize = 4;

/// How a frame is wrapped at the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encapsulation {
    /// Plain Ethernet II.
    None,
    /// A single 802.1Q tag.
    Dot1Q,
    /// 802.1ad double tagging.
    Dot1QinQ,
}

impl Encapsulation {
    /// Bytes to add to every fixed header offset after the source MAC.
    pub fn offset(self) -> usize {
        match self {
            Encapsulation::None => 0,
            Encapsulation::Dot1Q => VLAN_TAG_LEN,
            Encapsulation::Dot1QinQ => 2 * VLAN_TAG_LEN,
        }
    }
}

/// Classify a frame by the tag protocol identifier at bytes 12..14.
pub fn resolve(frame: &[u8]) -> Result<Encapsulation, FrameError> {
    let tpid = field_bytes(frame, "tag protocol identifier", TPID_OFFSET, TPID_LEN)?;

    let encapsulation = match EtherType(u16::from_be_bytes([tpid[0], tpid[1]])) {
        EtherTypes::Vlan => Encapsulation::Dot1Q,
        EtherTypes::PBridge => Encapsulation::Dot1QinQ,
        _ => Encapsulation::None,
    };

    match encapsulation {
        Encapsulation::Dot1Q => debug!("found an 802.1Q frame"),
        Encapsulation::Dot1QinQ => debug!("found an 802.1QinQ frame"),
        Encapsulation::None => {}
    }

    Ok(encapsulation)
}
