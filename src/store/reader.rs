//! Frame reads: seek to an offset, validate the header, read the body.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SquishError};
use crate::store::format::{BaseHeader, FrameHeader, FRAME_HEADER_SIZE, FRAME_MAGIC};

/// Read and validate one frame header at the given offset.
pub fn read_frame_header(file: &mut File, path: &Path, offset: u32) -> Result<FrameHeader> {
    file.seek(SeekFrom::Start(u64::from(offset)))
        .map_err(|e| SquishError::io(path, e))?;
    let mut buf = [0u8; FRAME_HEADER_SIZE];
    file.read_exact(&mut buf)
        .map_err(|e| SquishError::io(path, e))?;
    let header =
        FrameHeader::read_from(&mut buf.as_slice()).map_err(|e| SquishError::io(path, e))?;
    if header.magic != FRAME_MAGIC {
        return Err(SquishError::bad_frame(
            offset,
            format!("wrong magic {:08x}", header.magic),
        ));
    }
    Ok(header)
}

/// Read one frame (header and raw body) at the given offset.
///
/// The body length comes from the header's declared message length via
/// the format's fixed overhead arithmetic; a declared length shorter
/// than the header block marks the frame corrupt.
pub fn read_frame(file: &mut File, path: &Path, offset: u32) -> Result<(FrameHeader, Vec<u8>)> {
    let header = read_frame_header(file, path, offset)?;
    let body_len = header.body_len().ok_or_else(|| {
        SquishError::bad_frame(
            offset,
            format!("declared message length {} too short", header.msg_length),
        )
    })?;
    debug!(offset, body_len, "Reading frame");
    let mut body = vec![0u8; body_len as usize];
    file.read_exact(&mut body)
        .map_err(|e| SquishError::io(path, e))?;
    Ok((header, body))
}

/// Read the base header at the start of the data file.
pub fn read_base_header(file: &mut File, path: &Path) -> Result<BaseHeader> {
    file.seek(SeekFrom::Start(0))
        .map_err(|e| SquishError::io(path, e))?;
    BaseHeader::read_from(file).map_err(|e| SquishError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_wrong_magic_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area.sqd");
        let mut header = FrameHeader::default();
        header.magic = 0xdead_beef;
        let mut file = File::create(&path).unwrap();
        header.write_to(&mut file).unwrap();
        file.flush().unwrap();

        let mut file = File::open(&path).unwrap();
        let err = read_frame_header(&mut file, &path, 0).unwrap_err();
        assert!(matches!(
            err,
            SquishError::BadFrame { offset: 0, .. }
        ));
    }

    #[test]
    fn test_read_frame_exact_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area.sqd");
        let body = b"\x00hello\x00";
        let header = FrameHeader {
            msg_length: body.len() as u32 + 266 - 28,
            frame_length: body.len() as u32 + 266 - 28,
            ..FrameHeader::default()
        };
        let mut file = File::create(&path).unwrap();
        header.write_to(&mut file).unwrap();
        file.write_all(body).unwrap();
        // Trailing garbage past the declared length must not leak in.
        file.write_all(b"GARBAGE").unwrap();
        file.flush().unwrap();

        let mut file = File::open(&path).unwrap();
        let (back, read_body) = read_frame(&mut file, &path, 0).unwrap();
        assert_eq!(back.msg_length, header.msg_length);
        assert_eq!(read_body, body);
    }

    #[test]
    fn test_truncated_body_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area.sqd");
        let header = FrameHeader {
            msg_length: 1000 + 266 - 28,
            ..FrameHeader::default()
        };
        let mut file = File::create(&path).unwrap();
        header.write_to(&mut file).unwrap();
        file.write_all(b"short").unwrap();
        file.flush().unwrap();

        let mut file = File::open(&path).unwrap();
        assert!(matches!(
            read_frame(&mut file, &path, 0).unwrap_err(),
            SquishError::Io { .. }
        ));
    }
}
