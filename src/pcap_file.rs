use std::path::Path;

use chrono::{DateTime, Utc};
use pcap::{Capture, Offline, PacketHeader};
use tracing::{info, warn};

use crate::report::{FrameSource, RawFrame};

/// Open a capture file for reading. The handle is closed when dropped.
pub fn open_capture(path: &Path) -> Result<Capture<Offline>, pcap::Error> {
    let cap = Capture::from_file(path)?;
    info!(path = %path.display(), linktype = ?cap.get_datalink(), "opened capture");
    Ok(cap)
}

/// Convert a pcap record timestamp to UTC. Out-of-range values fall back
/// to the epoch rather than dropping the frame.
pub fn capture_time(header: &PacketHeader) -> DateTime<Utc> {
    let secs = header.ts.tv_sec as i64;
    let nanos = (header.ts.tv_usec as u32).saturating_mul(1_000);
    DateTime::from_timestamp(secs, nanos).unwrap_or_default()
}

impl FrameSource for Capture<Offline> {
    fn next_frame(&mut self) -> Option<RawFrame<'_>> {
        match self.next() {
            Ok(packet) => Some(RawFrame {
                timestamp: capture_time(packet.header),
                data: packet.data,
            }),
            Err(pcap::Error::NoMorePackets) => None,
            Err(err) => {
                // a damaged record ends the read, like hitting EOF
                warn!(%err, "stopped reading capture");
                None
            }
        }
    }
}
