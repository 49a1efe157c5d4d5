//! Hash and date codecs shared with other Squish tools.
//!
//! Both algorithms are part of the external format contract: the hash is
//! the checksum stored in `.sqi` index records, and the packed date is the
//! MS-DOS-style timestamp stored in frame headers. Neither may drift by a
//! single bit.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Case-folding 32-bit hash over the raw bytes of a name field.
///
/// NUL bytes are skipped (fixed-width fields are NUL-padded, and padded
/// and unpadded inputs must hash alike). ASCII bytes are folded to
/// lowercase before mixing; bytes >= 0x7f are mixed as-is. The sign bit of
/// the result is always clear — index records use it as a read-status
/// flag on top of the checksum.
pub fn hash32(data: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &b in data {
        if b == 0 {
            continue;
        }
        let b = if b < 0x7f { b.to_ascii_lowercase() } else { b };
        h = (h << 4).wrapping_add(u32::from(b));
        let g = h & 0xF000_0000;
        if g != 0 {
            h |= g >> 24;
            h |= g;
        }
    }
    h & 0x7fff_ffff
}

/// Bit set in a stored checksum when the message carries the read flag.
pub const HASH_READ_BIT: u32 = 0x8000_0000;

/// Pack a calendar time into the 32-bit MS-DOS layout used in frame
/// headers: day(5) | month(4) | year-1980(7) | sec/2(5) | min(6) | hour(5),
/// low bits first. Seconds lose their low bit (2-second resolution).
pub fn pack_datetime(t: NaiveDateTime) -> u32 {
    let mut rt: u32 = 0;
    rt |= t.day() & 31;
    rt |= (t.month() & 15) << 5;
    rt |= ((t.year() as u32).wrapping_sub(1980) & 127) << 9;
    rt |= ((t.second() / 2) & 31) << 16;
    rt |= (t.minute() & 63) << 21;
    rt |= (t.hour() & 31) << 27;
    rt
}

/// Unpack a 32-bit MS-DOS timestamp.
///
/// Out-of-range fields (a zeroed header says day 0, month 0) fall back to
/// the format epoch, 1980-01-01 00:00:00, rather than failing the read.
pub fn unpack_datetime(t: u32) -> NaiveDateTime {
    let day = t & 31;
    let month = (t >> 5) & 15;
    let year = ((t >> 9) & 127) + 1980;
    let sec = ((t >> 16) & 31) * 2;
    let min = (t >> 21) & 63;
    let hour = (t >> 27) & 31;
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap_or_else(squish_epoch)
}

/// 1980-01-01 00:00:00, the zero point of the packed-date layout.
pub fn squish_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1980, 1, 1)
        .expect("valid constant date")
        .and_hms_opt(0, 0, 0)
        .expect("valid constant time")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_hash_case_fold_invariance() {
        assert_eq!(hash32(b"Sysop"), hash32(b"SYSOP"));
        assert_eq!(hash32(b"Sysop"), hash32(b"sysop"));
        assert_eq!(hash32(b"John Doe"), hash32(b"jOhN dOe"));
    }

    #[test]
    fn test_hash_sign_bit_clear() {
        for name in [
            &b"Sysop"[..],
            b"All",
            b"A very long recipient name that keeps the mixer folding",
            b"\xa0\xa1\xa2\xff",
        ] {
            assert_eq!(hash32(name) & 0x8000_0000, 0);
        }
    }

    #[test]
    fn test_hash_skips_nul_padding() {
        let mut padded = [0u8; 36];
        padded[..5].copy_from_slice(b"Sysop");
        assert_eq!(hash32(&padded), hash32(b"Sysop"));
    }

    #[test]
    fn test_hash_empty() {
        assert_eq!(hash32(b""), 0);
        assert_eq!(hash32(&[0, 0, 0]), 0);
    }

    #[test]
    fn test_high_bytes_not_folded() {
        // 0x80.. bytes pass through unfolded; 'a'..'z' range shifted by
        // 0x20 must not collide with them.
        assert_ne!(hash32(&[0xc1]), hash32(&[0xe1]));
    }

    #[test]
    fn test_date_roundtrip_even_seconds() {
        let t = NaiveDate::from_ymd_opt(1997, 6, 15)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap();
        assert_eq!(unpack_datetime(pack_datetime(t)), t);
    }

    #[test]
    fn test_date_odd_seconds_truncated() {
        let t = NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 31)
            .unwrap();
        let back = unpack_datetime(pack_datetime(t));
        assert_eq!(back, t.with_second(30).unwrap());
    }

    #[test]
    fn test_date_epoch() {
        let epoch = squish_epoch();
        assert_eq!(unpack_datetime(pack_datetime(epoch)), epoch);
    }

    #[test]
    fn test_zeroed_timestamp_falls_back_to_epoch() {
        assert_eq!(unpack_datetime(0), squish_epoch());
    }

    #[test]
    fn test_date_bit_layout() {
        // 1980-01-01 00:00:00 packs day=1, month=1, everything else 0.
        assert_eq!(pack_datetime(squish_epoch()), 1 | (1 << 5));
    }
}
