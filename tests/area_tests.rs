//! Integration tests for the Squish area engine: save/read round-trips,
//! frame chaining, checksum validation, and last-read tracking.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use squishmb::area::{AreaKind, MessageBase, SquishArea};
use squishmb::index::IndexStore;
use squishmb::model::{Message, NetAddr};
use squishmb::store::format::{FRAME_OVERHEAD, FRAME_HEADER_SIZE};
use squishmb::store::reader;

fn area_at(dir: &Path, kind: AreaKind) -> SquishArea {
    SquishArea::new("test", dir.join("test"), kind)
}

fn sample_message(to: &str, subject: &str, body: &str) -> Message {
    Message {
        from: "Alice".to_string(),
        to: to.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        from_addr: NetAddr::from_parts(2, 5020, 1042, 0),
        date_written: NaiveDate::from_ymd_opt(1997, 6, 15)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap(),
        date_arrived: NaiveDate::from_ymd_opt(1997, 6, 16)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
        ..Message::default()
    }
}

// ─── Test 1: the empty-area bootstrap scenario ──────────────────────

#[test]
fn test_first_save_on_empty_area() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    assert_eq!(area.count(), 0);

    let mut msg = sample_message("Sysop", "Hi", "Hello");
    area.save_message(&mut msg).unwrap();

    assert_eq!(area.count(), 1);
    assert_eq!(area.read_message(1).unwrap().to, "Sysop");
    assert_eq!(area.last_read(), 0, "nothing marked read yet");

    area.set_last_read(1);
    assert_eq!(area.last_read(), 1);
}

// ─── Test 2: full field round-trip ──────────────────────────────────

#[test]
fn test_save_read_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);

    let mut msg = sample_message("Sysop", "Status report", "Hello\nSecond line");
    msg.kludges.push(("MSGID:".to_string(), "2:5020/1042 1a2b3c4d".to_string()));
    msg.kludges.push(("PID:".to_string(), "squishmb 0.1".to_string()));
    area.save_message(&mut msg).unwrap();

    let back = area.read_message(1).unwrap();
    assert!(!back.corrupted);
    assert_eq!(back.from, "Alice");
    assert_eq!(back.to, "Sysop");
    assert_eq!(back.subject, "Status report");
    assert_eq!(back.body, "Hello\nSecond line");
    assert_eq!(back.from_addr, NetAddr::from_parts(2, 5020, 1042, 0));
    assert_eq!(back.kludges, msg.kludges);
    assert_eq!(back.date_written, msg.date_written);
    assert_eq!(back.date_arrived, msg.date_arrived);
    // Locally saved messages carry the Local attribute tag.
    assert!(back.attrs.contains(&"Loc"));
}

// ─── Test 3: message numbers and frame chaining ─────────────────────

#[test]
fn test_two_saves_chain_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);

    let mut first = sample_message("Sysop", "one", "first body");
    let mut second = sample_message("All", "two", "second body, a bit longer");
    area.save_message(&mut first).unwrap();
    area.save_message(&mut second).unwrap();
    assert_eq!(area.count(), 2);

    let sqi = dir.path().join("test.sqi");
    let mut index = IndexStore::new(sqi);
    let entries: Vec<_> = index.entries().to_vec();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message_num, 1);
    assert_eq!(entries[1].message_num, 2);

    // The second frame sits exactly where the first frame ended.
    let sqd = dir.path().join("test.sqd");
    let mut file = std::fs::File::open(&sqd).unwrap();
    let first_header = reader::read_frame_header(&mut file, &sqd, entries[0].offset).unwrap();
    assert_eq!(
        entries[1].offset,
        entries[0].offset + first_header.frame_length + FRAME_OVERHEAD
    );
    // And the forward link of the first frame was patched in place.
    assert_eq!(first_header.next_frame, entries[1].offset);
    assert_eq!(first_header.prev_frame, 0);
    let second_header = reader::read_frame_header(&mut file, &sqd, entries[1].offset).unwrap();
    assert_eq!(second_header.prev_frame, entries[0].offset);
    assert_eq!(second_header.next_frame, 0);

    let base = reader::read_base_header(&mut file, &sqd).unwrap();
    assert_eq!(base.num_msg, 2);
    assert_eq!(base.high_msg, 2);
    assert_eq!(base.last_frame, entries[1].offset);
    assert_eq!(
        base.end_frame,
        entries[1].offset + second_header.frame_length + FRAME_OVERHEAD
    );
}

// ─── Test 4: persistence across handles ─────────────────────────────

#[test]
fn test_reopen_sees_saved_messages() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut area = area_at(dir.path(), AreaKind::Local);
        area.save_message(&mut sample_message("Sysop", "one", "body one")).unwrap();
        area.save_message(&mut sample_message("All", "two", "body two")).unwrap();
        area.set_last_read(2);
    }

    let mut area = area_at(dir.path(), AreaKind::Local);
    assert_eq!(area.count(), 2);
    assert_eq!(area.last_read(), 2);
    assert_eq!(area.read_message(2).unwrap().subject, "two");
    // A third save continues the numbering.
    area.save_message(&mut sample_message("All", "three", "body three")).unwrap();
    let sqi = dir.path().join("test.sqi");
    assert_eq!(IndexStore::new(sqi).last().unwrap().message_num, 3);
}

// ─── Test 5: checksum tamper detection ──────────────────────────────

#[test]
fn test_tampered_index_crc_flags_corrupted() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    area.save_message(&mut sample_message("Sysop", "Hi", "Hello")).unwrap();

    // Flip a bit in the CRC field of the first index record (bytes 8..12).
    let sqi = dir.path().join("test.sqi");
    let mut raw = std::fs::read(&sqi).unwrap();
    raw[8] ^= 0xff;
    std::fs::write(&sqi, &raw).unwrap();

    let mut area = area_at(dir.path(), AreaKind::Local);
    let msg = area.read_message(1).unwrap();
    assert!(msg.corrupted);
    // The message is still fully decoded.
    assert_eq!(msg.to, "Sysop");
    assert_eq!(msg.body, "Hello");
}

// ─── Test 6: empty and out-of-range reads ───────────────────────────

#[test]
fn test_read_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    assert!(matches!(
        area.read_message(1),
        Err(squishmb::error::SquishError::EmptyArea)
    ));

    area.save_message(&mut sample_message("Sysop", "Hi", "Hello")).unwrap();
    assert!(area.read_message(5).is_err());
    // Position 0 reads the first message.
    assert_eq!(area.read_message(0).unwrap().subject, "Hi");
}

// ─── Test 7: destination addressing by area kind ────────────────────

#[test]
fn test_netmail_keeps_to_addr_echo_drops_it() {
    let dir = tempfile::tempdir().unwrap();
    let dest = NetAddr::from_parts(1, 234, 56, 7);

    let mut netmail = SquishArea::new("netmail", dir.path().join("netmail"), AreaKind::Netmail);
    let mut msg = sample_message("Sysop", "direct", "hi");
    msg.to_addr = dest;
    netmail.save_message(&mut msg).unwrap();
    assert_eq!(netmail.read_message(1).unwrap().to_addr, dest);

    let mut echo = SquishArea::new("echo", dir.path().join("echo"), AreaKind::Echo);
    let mut msg = sample_message("Sysop", "broadcast", "hi");
    msg.to_addr = dest;
    echo.save_message(&mut msg).unwrap();
    assert!(echo.read_message(1).unwrap().to_addr.is_empty());
}

// ─── Test 8: summaries listing ──────────────────────────────────────

#[test]
fn test_summaries_compute_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    area.save_message(&mut sample_message("Sysop", "one", "a")).unwrap();
    area.save_message(&mut sample_message("All", "two", "b")).unwrap();

    // The listing is computed against a fresh handle (compute-once).
    let mut area = area_at(dir.path(), AreaKind::Local);
    let summaries = area.summaries().to_vec();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].msg_num, 1);
    assert_eq!(summaries[0].to, "Sysop");
    assert_eq!(summaries[1].subject, "two");
}

// ─── Test 9: stale last-read pointer after a purge ──────────────────

#[test]
fn test_stale_last_read_pointer() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    area.save_message(&mut sample_message("Sysop", "one", "a")).unwrap();
    area.save_message(&mut sample_message("All", "two", "b")).unwrap();

    // Pointer to a message number that no longer exists: fully read.
    std::fs::write(dir.path().join("test.sql"), 999u32.to_le_bytes()).unwrap();
    assert_eq!(area.last_read(), 2);
}

// ─── Test 10: truncated fixed-width fields ──────────────────────────

#[test]
fn test_long_fields_truncate_to_declared_width() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);

    let long_name = "N".repeat(80);
    let long_subject = "S".repeat(100);
    let mut msg = sample_message(&long_name, &long_subject, "body");
    area.save_message(&mut msg).unwrap();

    let back = area.read_message(1).unwrap();
    assert_eq!(back.to, "N".repeat(36));
    assert_eq!(back.subject, "S".repeat(72));
    // Truncation on disk does not corrupt the frame structure.
    assert!(!back.body.is_empty());
}

// ─── Test 11: charset round-trip ────────────────────────────────────

#[test]
fn test_cp866_area_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    area.set_charset(Some("ibm866".to_string()));

    let mut msg = sample_message("Сисоп", "Привет", "Текст сообщения");
    area.save_message(&mut msg).unwrap();

    let back = area.read_message(1).unwrap();
    assert!(!back.corrupted);
    assert_eq!(back.to, "Сисоп");
    assert_eq!(back.subject, "Привет");
    assert_eq!(back.body, "Текст сообщения");
    // The on-disk recipient field is single-byte CP866, not UTF-8.
    let sqd = dir.path().join("test.sqd");
    let mut file = std::fs::File::open(&sqd).unwrap();
    let header = reader::read_frame_header(&mut file, &sqd, 256).unwrap();
    assert_eq!(&header.to[..5], &[0x91, 0xa8, 0xe1, 0xae, 0xaf]);
}

// ─── Test 12: frame geometry constants ──────────────────────────────

#[test]
fn test_declared_lengths_include_overhead() {
    let dir = tempfile::tempdir().unwrap();
    let mut area = area_at(dir.path(), AreaKind::Local);
    area.save_message(&mut sample_message("Sysop", "Hi", "Hello")).unwrap();

    // Body on disk: kludge terminator NUL + "Hello" + NUL = 7 bytes.
    let sqd: PathBuf = dir.path().join("test.sqd");
    let mut file = std::fs::File::open(&sqd).unwrap();
    let header = reader::read_frame_header(&mut file, &sqd, 256).unwrap();
    assert_eq!(
        header.msg_length,
        7 + FRAME_HEADER_SIZE as u32 - FRAME_OVERHEAD
    );
    assert_eq!(header.frame_length, header.msg_length);
    assert_eq!(header.kludge_len, 1);
    assert_eq!(header.umsg_id, 1);
}
