//! The trace loop: pull frames, filter, print, count.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::deframe::{self, Ipv4Addresses};
use crate::encap::Encapsulation;
use crate::filter::FilterCriteria;
use crate::format::{format_ipv4, format_mac};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f UTC";

/// Options for one run, built once by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceConfig {
    /// Only report frames to or from this MAC (`AA:BB:CC:DD:EE:FF`).
    pub target_mac: Option<String>,
    /// Stop after reporting this many matching frames.
    pub head: Option<u64>,
}

impl TraceConfig {
    pub fn filter(&self) -> FilterCriteria {
        match &self.target_mac {
            Some(mac) => FilterCriteria::mac(mac.clone()),
            None => FilterCriteria::any(),
        }
    }
}

/// One captured frame, borrowed from its source for a single iteration.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub timestamp: DateTime<Utc>,
    pub data: &'a [u8],
}

/// An ordered, finite supply of frames. Each frame only lives until the next
/// call, which lets a pcap handle hand out its internal buffer.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RawFrame<'_>>;
}

/// End-of-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: u64,
    pub dot1q: u64,
    pub dot1qinq: u64,
}

/// What happened to a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Matched the filter, counted and printed.
    Reported,
    /// Did not match the filter; nothing changed.
    Filtered,
    /// Too short to decode; nothing changed.
    Skipped,
}

#[derive(Debug)]
struct RunState {
    summary: Summary,
    remaining: Option<u64>,
}

impl RunState {
    fn new(head: Option<u64>) -> Self {
        Self {
            summary: Summary::default(),
            remaining: head,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Only ever called for accepted frames.
    fn record(&mut self, encapsulation: Encapsulation) {
        match encapsulation {
            Encapsulation::Dot1Q => self.summary.dot1q += 1,
            Encapsulation::Dot1QinQ => self.summary.dot1qinq += 1,
            Encapsulation::None => {}
        }
        self.summary.total += 1;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

/// Render one trace line. Frames without a plain IPv4 header get blank,
/// still padded, address columns.
pub fn trace_line(
    timestamp: &DateTime<Utc>,
    source: &str,
    destination: &str,
    ipv4: Option<&Ipv4Addresses>,
) -> String {
    let (source_ip, destination_ip) = match ipv4 {
        Some(addrs) => (format_ipv4(addrs.source), format_ipv4(addrs.destination)),
        None => (String::new(), String::new()),
    };
    format!(
        "{} - {} - {:<15} > {} - {:<15}",
        timestamp.format(TIMESTAMP_FORMAT),
        source,
        source_ip,
        destination,
        destination_ip
    )
}

/// Drives filtering, printing and counting for a single run.
pub struct Reporter<W> {
    filter: FilterCriteria,
    state: RunState,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(config: &TraceConfig, out: W) -> Self {
        Self {
            filter: config.filter(),
            state: RunState::new(config.head),
            out,
        }
    }

    /// True once `head` matching frames have been reported.
    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    pub fn summary(&self) -> Summary {
        self.state.summary
    }

    pub fn process(&mut self, frame: &RawFrame<'_>) -> io::Result<Disposition> {
        let header = match deframe::decode(frame.data) {
            Ok(header) => header,
            Err(err) => {
                debug!(%err, "skipping frame");
                return Ok(Disposition::Skipped);
            }
        };

        let source = format_mac(header.link.source);
        let destination = format_mac(header.link.destination);

        let accepted = self.filter.matches(&source, &destination);
        if !accepted {
            return Ok(Disposition::Filtered);
        }

        self.state.record(header.link.encapsulation);
        writeln!(
            self.out,
            "{}",
            trace_line(&frame.timestamp, &source, &destination, header.ipv4.as_ref())
        )?;

        Ok(Disposition::Reported)
    }

    /// Print the summary and hand back the counters.
    pub fn finish(mut self) -> io::Result<Summary> {
        let summary = self.state.summary;
        writeln!(self.out)?;
        writeln!(self.out, "Total number of packets processed: {}", summary.total)?;
        writeln!(
            self.out,
            "Total number of 802.1Q packets processed: {}",
            summary.dot1q
        )?;
        writeln!(
            self.out,
            "Total number of 802.1QinQ packets processed: {}",
            summary.dot1qinq
        )?;
        self.out.flush()?;
        Ok(summary)
    }
}

/// Trace every frame from `source` into `out`, then print the summary.
///
/// Stops pulling from `source` as soon as the `head` budget is spent.
pub fn run<S, W>(config: &TraceConfig, source: &mut S, out: W) -> io::Result<Summary>
where
    S: FrameSource + ?Sized,
    W: Write,
{
    let mut reporter = Reporter::new(config, out);

    while !reporter.is_exhausted() {
        let frame = match source.next_frame() {
            Some(frame) => frame,
            None => break,
        };
        reporter.process(&frame)?;
    }

    if reporter.is_exhausted() {
        info!(head = ?config.head, "frame limit reached");
    }

    reporter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::net::Ipv4Addr;

    const SRC: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    const DST: [u8; 6] = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 1, 2, 3, 4, 5).unwrap()
    }

    fn ipv4_frame(src: [u8; 6], dst: [u8; 6]) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(&dst);
        frame.extend_from_slice(&src);
        frame.extend_from_slice(&[0x08, 0x00]);
        frame.extend_from_slice(&[0x45, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00]);
        frame.extend_from_slice(&[10, 0, 0, 1]);
        frame.extend_from_slice(&[10, 0, 0, 2]);
        frame
    }

    struct VecSource {
        frames: Vec<Vec<u8>>,
        pulled: usize,
    }

    impl FrameSource for VecSource {
        fn next_frame(&mut self) -> Option<RawFrame<'_>> {
            let data = self.frames.get(self.pulled)?;
            self.pulled += 1;
            Some(RawFrame {
                timestamp: ts(),
                data,
            })
        }
    }

    #[test]
    fn test_trace_line_with_ipv4() {
        let addrs = Ipv4Addresses {
            source: Ipv4Addr::new(10, 0, 0, 1),
            destination: Ipv4Addr::new(192, 168, 100, 200),
        };
        let line = trace_line(&ts(), "00:11:22:33:44:55", "AA:BB:CC:DD:EE:FF", Some(&addrs));
        assert_eq!(
            line,
            "2015-01-02 03:04:05.000000 UTC - 00:11:22:33:44:55 - 10.0.0.1        > AA:BB:CC:DD:EE:FF - 192.168.100.200"
        );
    }

    #[test]
    fn test_trace_line_without_ipv4_is_blank_padded() {
        let line = trace_line(&ts(), "00:11:22:33:44:55", "AA:BB:CC:DD:EE:FF", None);
        let blank = " ".repeat(15);
        assert_eq!(
            line,
            format!(
                "2015-01-02 03:04:05.000000 UTC - 00:11:22:33:44:55 - {blank} > AA:BB:CC:DD:EE:FF - {blank}"
            )
        );
    }

    #[test]
    fn test_filtered_frame_leaves_state_untouched() {
        let config = TraceConfig {
            target_mac: Some("DE:AD:BE:EF:00:01".to_string()),
            head: Some(1),
        };
        let mut out = Vec::new();
        let mut reporter = Reporter::new(&config, &mut out);

        let frame = ipv4_frame(SRC, DST);
        let disposition = reporter
            .process(&RawFrame {
                timestamp: ts(),
                data: &frame,
            })
            .unwrap();

        assert_eq!(disposition, Disposition::Filtered);
        assert_eq!(reporter.summary(), Summary::default());
        assert!(!reporter.is_exhausted());
        drop(reporter);
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncated_frame_leaves_state_untouched() {
        let mut out = Vec::new();
        let mut reporter = Reporter::new(&TraceConfig::default(), &mut out);
        let frame = [0u8; 10];
        let disposition = reporter
            .process(&RawFrame {
                timestamp: ts(),
                data: &frame,
            })
            .unwrap();
        assert_eq!(disposition, Disposition::Skipped);
        assert_eq!(reporter.summary(), Summary::default());
    }

    #[test]
    fn test_head_stops_pulling() {
        let mut source = VecSource {
            frames: (0..5).map(|_| ipv4_frame(SRC, DST)).collect(),
            pulled: 0,
        };
        let config = TraceConfig {
            target_mac: None,
            head: Some(2),
        };
        let mut out = Vec::new();
        let summary = run(&config, &mut source, &mut out).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(source.pulled, 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.contains(" > ")).count(), 2);
    }

    #[test]
    fn test_head_counts_only_matching_frames() {
        let other = [0x02, 0x00, 0x00, 0x00, 0x00, 0x09];
        let mut source = VecSource {
            frames: vec![
                ipv4_frame(other, other),
                ipv4_frame(SRC, DST),
                ipv4_frame(other, other),
                ipv4_frame(other, DST),
                ipv4_frame(SRC, other),
            ],
            pulled: 0,
        };
        let config = TraceConfig {
            target_mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            head: Some(2),
        };
        let summary = run(&config, &mut source, io::sink()).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(source.pulled, 4);
    }

    #[test]
    fn test_zero_head_budget_pulls_nothing() {
        let mut source = VecSource {
            frames: vec![ipv4_frame(SRC, DST)],
            pulled: 0,
        };
        let config = TraceConfig {
            target_mac: None,
            head: Some(0),
        };
        let summary = run(&config, &mut source, io::sink()).unwrap();
        assert_eq!(summary, Summary::default());
        assert_eq!(source.pulled, 0);
    }

    #[test]
    fn test_summary_block() {
        let mut source = VecSource {
            frames: vec![ipv4_frame(SRC, DST)],
            pulled: 0,
        };
        let mut out = Vec::new();
        run(&TraceConfig::default(), &mut source, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(
            "\n\nTotal number of packets processed: 1\n\
             Total number of 802.1Q packets processed: 0\n\
             Total number of 802.1QinQ packets processed: 0\n"
        ));
    }
}
