//! Frame appends: the multi-step data-file mutation behind every save.
//!
//! The sequence is not atomic. A crash between steps can leave the base
//! header, the previous frame's forward link, and the index out of
//! mutual agreement; the format offers no rollback and none is attempted
//! here. Callers serialize writers per area (the façade's mutating
//! methods take `&mut self`).

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SquishError};
use crate::store::format::{BaseHeader, FrameHeader, FRAME_OVERHEAD};
use crate::store::reader;

/// Append a frame to the data file and maintain the chain:
///
/// 1. Read the base header, or default-initialize it when the area is
///    empty (`bootstrap`).
/// 2. If a previous frame exists, patch its forward link to the new
///    frame's offset (header rewritten in place, body untouched).
/// 3. Bump the counters, advance `last_frame`/`end_frame`, rewrite the
///    base header at file start.
/// 4. Write the new frame (header + body) at the previous `end_frame`.
///
/// `header.next_frame` is forced to 0 (the new frame is the chain tail)
/// and `header.prev_frame` must already point at the current last frame
/// (0 when none). Returns the offset the frame was written at.
pub fn append_frame(
    path: &Path,
    header: &mut FrameHeader,
    body: &[u8],
    bootstrap: bool,
) -> Result<u32> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .map_err(|e| SquishError::io(path, e))?;

    let mut base = if bootstrap {
        BaseHeader::bootstrap()
    } else {
        reader::read_base_header(&mut file, path)?
    };

    let offset = base.end_frame;
    header.next_frame = 0;

    if header.prev_frame > 0 {
        let mut prev = reader::read_frame_header(&mut file, path, header.prev_frame)?;
        prev.next_frame = offset;
        file.seek(SeekFrom::Start(u64::from(header.prev_frame)))
            .map_err(|e| SquishError::io(path, e))?;
        prev.write_to(&mut file).map_err(|e| SquishError::io(path, e))?;
    }

    base.num_msg += 1;
    base.high_msg += 1;
    base.uid += 1;
    base.last_frame = offset;
    base.end_frame = offset + header.frame_length + FRAME_OVERHEAD;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| SquishError::io(path, e))?;
    base.write_to(&mut file).map_err(|e| SquishError::io(path, e))?;

    file.seek(SeekFrom::Start(u64::from(offset)))
        .map_err(|e| SquishError::io(path, e))?;
    header.write_to(&mut file).map_err(|e| SquishError::io(path, e))?;
    file.write_all(body).map_err(|e| SquishError::io(path, e))?;

    debug!(
        path = %path.display(),
        offset,
        next_end = base.end_frame,
        umsg_id = header.umsg_id,
        "Frame appended"
    );
    Ok(offset)
}
