use serde::Serialize;

use crate::error::ScaleError;

/// One fixed-width telemetry frame from the scale.
///
/// Layout: bytes 0..8 ASCII weight (space padded), bytes 8..11 ASCII unit
/// code (blank while the measurement is unsettled), bytes 11..27 reserved,
/// bytes 27..29 terminator `0x0D 0x0A`.
pub const FRAME_LEN: usize = 29;

pub type RawFrame = [u8; FRAME_LEN];

/// Decoded result of one frame. Replaces the previous last-known reading.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleReading {
    /// Numeric text exactly as the device sent it, padding trimmed.
    pub weight: String,
    /// `None` when the unit field was blank (measurement not settled).
    pub units: Option<String>,
    pub stable: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FrameStep {
    /// Fewer than `FRAME_LEN` bytes buffered; call again after the next read.
    NeedMore,
    /// One complete frame, removed from the buffer. More may follow.
    Frame(RawFrame),
}

/// Tries to pull one complete frame off the front of the accumulator.
///
/// If the candidate window does not end in the terminator, the first byte is
/// discarded and the window slides forward one position. The stream realigns
/// after at most `FRAME_LEN - 1` discarded bytes and a well-formed frame is
/// never lost.
pub fn extract_frame(buf: &mut Vec<u8>) -> FrameStep {
    let mut skipped = 0usize;
    loop {
        if buf.len() < FRAME_LEN {
            if skipped > 0 {
                log::debug!("resync: discarded {skipped} byte(s) without finding a terminator");
            }
            return FrameStep::NeedMore;
        }
        if buf[27] == 0x0D && buf[28] == 0x0A {
            if skipped > 0 {
                log::debug!("resync: discarded {skipped} byte(s) before a valid frame");
            }
            let mut frame = [0u8; FRAME_LEN];
            frame.copy_from_slice(&buf[..FRAME_LEN]);
            buf.drain(..FRAME_LEN);
            return FrameStep::Frame(frame);
        }
        buf.drain(..1);
        skipped += 1;
    }
}

/// Parses a complete frame into a reading.
///
/// Stability is inferred from the unit field: the scale only reports a unit
/// once the measurement has settled.
pub fn parse_reading(frame: &RawFrame) -> Result<ScaleReading, ScaleError> {
    let weight_field = &frame[..8];
    let unit_field = &frame[8..11];
    if !weight_field.is_ascii() || !unit_field.is_ascii() {
        return Err(ScaleError::FrameParse(
            "non-ASCII bytes in weight or unit field".into(),
        ));
    }

    // is_ascii above guarantees valid UTF-8
    let weight = std::str::from_utf8(weight_field)
        .map_err(|e| ScaleError::FrameParse(e.to_string()))?
        .trim()
        .to_string();
    let units = std::str::from_utf8(unit_field)
        .map_err(|e| ScaleError::FrameParse(e.to_string()))?
        .trim();
    let units = if units.is_empty() {
        None
    } else {
        Some(units.to_string())
    };

    Ok(ScaleReading {
        weight,
        stable: units.is_some(),
        units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a frame from a weight field and unit field, padded to width.
    fn frame(weight: &str, units: &str) -> Vec<u8> {
        let mut f = Vec::with_capacity(FRAME_LEN);
        f.extend_from_slice(format!("{weight:>8}").as_bytes());
        f.extend_from_slice(format!("{units:<3}").as_bytes());
        f.extend_from_slice(&[b' '; 16]);
        f.extend_from_slice(&[0x0D, 0x0A]);
        assert_eq!(f.len(), FRAME_LEN);
        f
    }

    fn as_raw(bytes: &[u8]) -> RawFrame {
        let mut raw = [0u8; FRAME_LEN];
        raw.copy_from_slice(bytes);
        raw
    }

    #[test]
    fn short_buffer_is_left_untouched() {
        for len in [0usize, 1, 14, 28] {
            let mut buf: Vec<u8> = vec![b'x'; len];
            let before = buf.clone();
            assert_eq!(extract_frame(&mut buf), FrameStep::NeedMore);
            assert_eq!(buf, before);
        }
    }

    #[test]
    fn extracts_one_frame_and_keeps_remainder() {
        let mut buf = frame("12.345", "kg");
        buf.extend_from_slice(b"  1");
        match extract_frame(&mut buf) {
            FrameStep::Frame(f) => assert_eq!(&f[27..], &[0x0D, 0x0A]),
            other => panic!("expected a frame, got {other:?}"),
        }
        assert_eq!(buf, b"  1");
        assert_eq!(extract_frame(&mut buf), FrameStep::NeedMore);
    }

    #[test]
    fn extracts_consecutive_frames_in_order() {
        let mut buf = frame("1.000", "kg");
        buf.extend_from_slice(&frame("2.000", "kg"));
        let first = match extract_frame(&mut buf) {
            FrameStep::Frame(f) => parse_reading(&f).unwrap(),
            other => panic!("expected a frame, got {other:?}"),
        };
        let second = match extract_frame(&mut buf) {
            FrameStep::Frame(f) => parse_reading(&f).unwrap(),
            other => panic!("expected a frame, got {other:?}"),
        };
        assert_eq!(first.weight, "1.000");
        assert_eq!(second.weight, "2.000");
        assert!(buf.is_empty());
    }

    #[test]
    fn resynchronizes_past_leading_garbage() {
        let mut buf = vec![0xFF, 0x00, 0x13, 0x37, 0xAB];
        buf.extend_from_slice(&frame("12.345", "kg"));
        match extract_frame(&mut buf) {
            FrameStep::Frame(f) => {
                let reading = parse_reading(&f).unwrap();
                assert_eq!(reading.weight, "12.345");
            }
            other => panic!("expected a frame after resync, got {other:?}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn parses_stable_reading_with_units() {
        let raw = as_raw(&frame("  12.345", "kg "));
        let reading = parse_reading(&raw).unwrap();
        assert_eq!(reading.weight, "12.345");
        assert_eq!(reading.units.as_deref(), Some("kg"));
        assert!(reading.stable);
    }

    #[test]
    fn blank_unit_field_means_unstable() {
        let raw = as_raw(&frame("0.120", "   "));
        let reading = parse_reading(&raw).unwrap();
        assert_eq!(reading.weight, "0.120");
        assert_eq!(reading.units, None);
        assert!(!reading.stable);
    }

    #[test]
    fn non_ascii_weight_field_is_a_parse_error() {
        let mut bytes = frame("12.345", "kg");
        bytes[2] = 0xD0;
        let err = parse_reading(&as_raw(&bytes)).unwrap_err();
        assert!(matches!(err, ScaleError::FrameParse(_)));
    }

    #[test]
    fn non_ascii_unit_field_is_a_parse_error() {
        let mut bytes = frame("12.345", "kg");
        bytes[9] = 0xFE;
        let err = parse_reading(&as_raw(&bytes)).unwrap_err();
        assert!(matches!(err, ScaleError::FrameParse(_)));
    }
}
