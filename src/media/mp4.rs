//! Just enough ISO-BMFF walking to accept an MP4 file and read its duration.

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use super::PlaybackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub timescale: u32,
    /// Duration in `timescale` units.
    pub duration_units: u64,
}

impl MediaInfo {
    pub fn duration(&self) -> Duration {
        if self.timescale == 0 {
            return Duration::ZERO;
        }
        let timescale = u64::from(self.timescale);
        let secs = self.duration_units / timescale;
        let rem = u128::from(self.duration_units % timescale);
        let nanos = rem * 1_000_000_000 / u128::from(timescale);
        Duration::new(secs, nanos as u32)
    }
}

struct BoxHeader {
    kind: [u8; 4],
    /// Offset of the first payload byte.
    start: u64,
    /// Offset one past the last byte of the box.
    end: u64,
}

fn fourcc(kind: &[u8; 4]) -> String {
    String::from_utf8_lossy(kind).into_owned()
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u64(b: &[u8]) -> u64 {
    (u64::from(be_u32(&b[..4])) << 32) | u64::from(be_u32(&b[4..8]))
}

fn read_header<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    limit: u64,
) -> Result<BoxHeader, PlaybackError> {
    if limit - offset < 8 {
        return Err(PlaybackError::Malformed(format!(
            "truncated box header at offset {}",
            offset
        )));
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut head = [0u8; 8];
    reader.read_exact(&mut head)?;
    let kind = [head[4], head[5], head[6], head[7]];

    let (header_len, size) = match be_u32(&head[..4]) {
        // 64-bit size follows the type
        1 => {
            if limit - offset < 16 {
                return Err(PlaybackError::Malformed(format!(
                    "truncated large size for box {}",
                    fourcc(&kind)
                )));
            }
            let mut large = [0u8; 8];
            reader.read_exact(&mut large)?;
            (16, be_u64(&large))
        }
        // box runs to the end of its parent
        0 => (8, limit - offset),
        n => (8, u64::from(n)),
    };

    if size < header_len || size > limit - offset {
        return Err(PlaybackError::Malformed(format!(
            "box {} at offset {} has invalid size {}",
            fourcc(&kind),
            offset,
            size
        )));
    }

    Ok(BoxHeader {
        kind,
        start: offset + header_len,
        end: offset + size,
    })
}

fn find_child<R: Read + Seek>(
    reader: &mut R,
    start: u64,
    end: u64,
    kind: &[u8; 4],
) -> Result<Option<BoxHeader>, PlaybackError> {
    let mut offset = start;
    while offset < end {
        let header = read_header(reader, offset, end)?;
        if &header.kind == kind {
            return Ok(Some(header));
        }
        offset = header.end;
    }
    Ok(None)
}

fn read_mvhd<R: Read + Seek>(reader: &mut R, mvhd: &BoxHeader) -> Result<MediaInfo, PlaybackError> {
    let payload = mvhd.end - mvhd.start;
    let truncated = || PlaybackError::Malformed("truncated mvhd box".to_string());

    reader.seek(SeekFrom::Start(mvhd.start))?;
    if payload < 4 {
        return Err(truncated());
    }
    let mut version_flags = [0u8; 4];
    reader.read_exact(&mut version_flags)?;

    let (timescale, duration_units) = match version_flags[0] {
        0 => {
            if payload < 4 + 16 {
                return Err(truncated());
            }
            let mut buf = [0u8; 16];
            reader.read_exact(&mut buf)?;
            (be_u32(&buf[8..12]), u64::from(be_u32(&buf[12..16])))
        }
        1 => {
            if payload < 4 + 28 {
                return Err(truncated());
            }
            let mut buf = [0u8; 28];
            reader.read_exact(&mut buf)?;
            (be_u32(&buf[16..20]), be_u64(&buf[20..28]))
        }
        v => {
            return Err(PlaybackError::Malformed(format!(
                "unknown mvhd version {}",
                v
            )))
        }
    };

    if timescale == 0 {
        return Err(PlaybackError::Malformed("mvhd timescale is zero".to_string()));
    }

    // all ones: duration not known
    let unknown = match version_flags[0] {
        0 => u64::from(u32::MAX),
        _ => u64::MAX,
    };
    if duration_units == unknown {
        return Err(PlaybackError::Malformed("movie duration is unknown".to_string()));
    }

    Ok(MediaInfo {
        timescale,
        duration_units,
    })
}

/// Check that `reader` holds an MP4 file and read its movie header.
pub fn probe<R: Read + Seek>(reader: &mut R) -> Result<MediaInfo, PlaybackError> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < 8 {
        return Err(PlaybackError::UnsupportedContainer(format!(
            "file too small ({} bytes)",
            len
        )));
    }

    reader.seek(SeekFrom::Start(4))?;
    let mut kind = [0u8; 4];
    reader.read_exact(&mut kind)?;
    if &kind != b"ftyp" {
        return Err(PlaybackError::UnsupportedContainer(format!(
            "expected ftyp box, found {:?}",
            fourcc(&kind)
        )));
    }

    let first = read_header(reader, 0, len)?;

    let moov = find_child(reader, first.end, len, b"moov")?
        .ok_or_else(|| PlaybackError::Malformed("missing moov box".to_string()))?;
    let mvhd = find_child(reader, moov.start, moov.end, b"mvhd")?
        .ok_or_else(|| PlaybackError::Malformed("missing mvhd box".to_string()))?;

    read_mvhd(reader, &mvhd)
}
