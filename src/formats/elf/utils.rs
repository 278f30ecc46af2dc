//! Utility functions for ELF parsing

use crate::formats::elf::types::ElfData;

/// Reading fixed-width integers with endianness support.
///
/// Every read is bounds-checked and yields `None` rather than panicking when
/// the value would extend past the end of the slice.
pub trait EndianRead {
    fn read_u16(&self, offset: usize, data: ElfData) -> Option<u16>;
    fn read_u32(&self, offset: usize, data: ElfData) -> Option<u32>;
    fn read_u64(&self, offset: usize, data: ElfData) -> Option<u64>;
    fn read_i32(&self, offset: usize, data: ElfData) -> Option<i32>;
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

impl EndianRead for [u8] {
    fn read_u16(&self, offset: usize, data: ElfData) -> Option<u16> {
        let bytes = take::<2>(self, offset)?;
        Some(match data {
            ElfData::Little => u16::from_le_bytes(bytes),
            ElfData::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize, data: ElfData) -> Option<u32> {
        let bytes = take::<4>(self, offset)?;
        Some(match data {
            ElfData::Little => u32::from_le_bytes(bytes),
            ElfData::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_u64(&self, offset: usize, data: ElfData) -> Option<u64> {
        let bytes = take::<8>(self, offset)?;
        Some(match data {
            ElfData::Little => u64::from_le_bytes(bytes),
            ElfData::Big => u64::from_be_bytes(bytes),
        })
    }

    fn read_i32(&self, offset: usize, data: ElfData) -> Option<i32> {
        let bytes = take::<4>(self, offset)?;
        Some(match data {
            ElfData::Little => i32::from_le_bytes(bytes),
            ElfData::Big => i32::from_be_bytes(bytes),
        })
    }
}

/// Read a NUL-terminated byte string starting at `offset`.
///
/// The terminator is not included. A string that runs to the end of `data`
/// without a terminator is returned whole. `None` if `offset` is past the end.
pub fn read_cstring(data: &[u8], offset: usize) -> Option<&[u8]> {
    let slice = data.get(offset..)?;
    let end = memchr::memchr(0, slice).unwrap_or(slice.len());
    Some(&slice[..end])
}

/// Bytes of a fixed-width text field up to its first NUL.
pub fn trim_nul(field: &[u8]) -> &[u8] {
    let end = memchr::memchr(0, field).unwrap_or(field.len());
    &field[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_read() {
        let data = vec![0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0];

        // Little endian
        assert_eq!(data.read_u16(0, ElfData::Little), Some(0x3412));
        assert_eq!(data.read_u32(0, ElfData::Little), Some(0x78563412));
        assert_eq!(data.read_u64(0, ElfData::Little), Some(0xf0debc9a78563412));

        // Big endian
        assert_eq!(data.read_u16(0, ElfData::Big), Some(0x1234));
        assert_eq!(data.read_u32(0, ElfData::Big), Some(0x12345678));
        assert_eq!(data.read_u64(0, ElfData::Big), Some(0x123456789abcdef0));
    }

    #[test]
    fn test_endian_read_out_of_bounds() {
        let data = [0u8; 6];
        assert_eq!(data.read_u32(2, ElfData::Little), Some(0));
        assert_eq!(data.read_u32(3, ElfData::Little), None);
        assert_eq!(data.read_u64(0, ElfData::Little), None);
        assert_eq!(data.read_u16(usize::MAX, ElfData::Little), None);
    }

    #[test]
    fn test_read_i32_negative() {
        let data = (-2i32).to_le_bytes();
        assert_eq!(data.read_i32(0, ElfData::Little), Some(-2));
        let data = (-2i32).to_be_bytes();
        assert_eq!(data.read_i32(0, ElfData::Big), Some(-2));
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        assert_eq!(read_cstring(data, 0), Some(&b"hello"[..]));
        assert_eq!(read_cstring(data, 6), Some(&b"world"[..]));
        assert_eq!(read_cstring(data, 12), Some(&b""[..]));
        assert_eq!(read_cstring(data, 13), None);

        let data = b"no_null_terminator";
        assert_eq!(read_cstring(data, 0), Some(&data[..]));
    }

    #[test]
    fn test_trim_nul() {
        assert_eq!(trim_nul(b"alpha\0\0\0junk"), b"alpha");
        assert_eq!(trim_nul(b"full"), b"full");
        assert_eq!(trim_nul(b"\0"), b"");
    }
}
