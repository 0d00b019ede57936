//! Variable-length ("packed") integer codec.
//!
//! Most transmitted deltas are small in magnitude, so a packed encoding
//! spends one byte on a small value instead of a fixed two, four or eight.
//!
//! Signed values are first zig-zag mapped (`0,-1,1,-2,2,…` becomes
//! `0,1,2,3,4,…`) so that small magnitudes of either sign map to small
//! unsigned codes; unsigned values skip that step. The unsigned code is
//! then split into 7-bit groups, least-significant group first, and each
//! emitted byte carries 7 value bits plus a continuation flag in its high
//! bit (`1` = more groups follow). Only the minimum number of groups is
//! emitted.

use crate::error::Result;
use crate::stream::BitStream;

const GROUP_BITS: u32 = 7;
const GROUP_MASK: u8 = 0x7F;
const CONTINUE_FLAG: u8 = 0x80;

/// Maps a signed 16-bit value onto the unsigned zig-zag code.
pub(crate) fn zigzag16(value: i16) -> u16 {
    ((value << 1) ^ (value >> 15)) as u16
}

/// Inverts [`zigzag16`].
pub(crate) fn unzigzag16(code: u16) -> i16 {
    ((code >> 1) as i16) ^ -((code & 1) as i16)
}

/// Maps a signed 32-bit value onto the unsigned zig-zag code.
pub(crate) fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverts [`zigzag32`].
pub(crate) fn unzigzag32(code: u32) -> i32 {
    ((code >> 1) as i32) ^ -((code & 1) as i32)
}

/// Maps a signed 64-bit value onto the unsigned zig-zag code.
pub(crate) fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverts [`zigzag64`].
pub(crate) fn unzigzag64(code: u64) -> i64 {
    ((code >> 1) as i64) ^ -((code & 1) as i64)
}

impl BitStream<'_> {
    /// Writes an unsigned 64-bit integer in packed form.
    ///
    /// The value is emitted as 7-bit groups, least-significant first, with
    /// the high bit of each byte flagging a following group. Values below
    /// 128 take a single byte.
    pub fn write_u64_packed(&mut self, value: u64) -> Result<()> {
        let mut rest = value;
        loop {
            let group = (rest as u8) & GROUP_MASK;
            rest >>= GROUP_BITS;
            if rest == 0 {
                return self.write_byte(group);
            }
            self.write_byte(group | CONTINUE_FLAG)?;
        }
    }

    /// Reads a packed unsigned 64-bit integer.
    ///
    /// Consumes byte groups until one without the continuation flag; fails
    /// with [`NetbitError::EndOfStream`](crate::NetbitError::EndOfStream)
    /// if the stream runs out with the flag still set. Groups beyond the
    /// 64-bit domain are consumed but their excess bits discarded.
    pub fn read_u64_packed(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            if shift < u64::BITS {
                value |= u64::from(byte & GROUP_MASK) << shift;
                shift += GROUP_BITS;
            }
            if byte & CONTINUE_FLAG == 0 {
                return Ok(value);
            }
        }
    }

    /// Writes an unsigned 32-bit integer in packed form.
    pub fn write_u32_packed(&mut self, value: u32) -> Result<()> {
        self.write_u64_packed(u64::from(value))
    }

    /// Reads a packed unsigned 32-bit integer.
    pub fn read_u32_packed(&mut self) -> Result<u32> {
        Ok(self.read_u64_packed()? as u32)
    }

    /// Writes an unsigned 16-bit integer in packed form.
    pub fn write_u16_packed(&mut self, value: u16) -> Result<()> {
        self.write_u64_packed(u64::from(value))
    }

    /// Reads a packed unsigned 16-bit integer.
    pub fn read_u16_packed(&mut self) -> Result<u16> {
        Ok(self.read_u64_packed()? as u16)
    }

    /// Writes a signed 64-bit integer in packed form, zig-zag mapped first
    /// so small magnitudes of either sign stay short on the wire.
    pub fn write_i64_packed(&mut self, value: i64) -> Result<()> {
        self.write_u64_packed(zigzag64(value))
    }

    /// Reads a packed signed 64-bit integer.
    pub fn read_i64_packed(&mut self) -> Result<i64> {
        Ok(unzigzag64(self.read_u64_packed()?))
    }

    /// Writes a signed 32-bit integer in packed form.
    pub fn write_i32_packed(&mut self, value: i32) -> Result<()> {
        self.write_u64_packed(u64::from(zigzag32(value)))
    }

    /// Reads a packed signed 32-bit integer.
    pub fn read_i32_packed(&mut self) -> Result<i32> {
        Ok(unzigzag32(self.read_u64_packed()? as u32))
    }

    /// Writes a signed 16-bit integer in packed form.
    pub fn write_i16_packed(&mut self, value: i16) -> Result<()> {
        self.write_u64_packed(u64::from(zigzag16(value)))
    }

    /// Reads a packed signed 16-bit integer.
    pub fn read_i16_packed(&mut self) -> Result<i16> {
        Ok(unzigzag16(self.read_u64_packed()? as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetbitError;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    /// Bytes a minimal encoding of `code` must occupy: one 7-bit group per
    /// started 7 bits of magnitude, at least one.
    fn expected_group_count(code: u64) -> usize {
        let significant = (u64::BITS - code.leading_zeros()).max(1);
        ((significant + GROUP_BITS - 1) / GROUP_BITS) as usize
    }

    #[test]
    fn test_zigzag_maps_small_magnitudes_to_small_codes() {
        assert_eq!(zigzag64(0), 0);
        assert_eq!(zigzag64(-1), 1);
        assert_eq!(zigzag64(1), 2);
        assert_eq!(zigzag64(-2), 3);
        assert_eq!(zigzag64(2), 4);
        assert_eq!(zigzag16(i16::MIN), u16::MAX);
        assert_eq!(zigzag32(i32::MIN), u32::MAX);
        assert_eq!(zigzag64(i64::MIN), u64::MAX);
    }

    #[test]
    fn test_packed_16_round_trip() {
        let mut out = BitStream::new();
        out.write_i16_packed(-31934).unwrap();
        out.write_u16_packed(64893).unwrap();

        let mut input = BitStream::from_buffer(out.buffer_mut());
        assert_eq!(input.read_i16_packed().unwrap(), -31934);
        assert_eq!(input.read_u16_packed().unwrap(), 64893);
    }

    #[test]
    fn test_packed_32_round_trip() {
        let mut out = BitStream::new();
        out.write_i32_packed(-100913642).unwrap();
        out.write_u32_packed(1467867235).unwrap();

        let mut input = BitStream::from_buffer(out.buffer_mut());
        assert_eq!(input.read_i32_packed().unwrap(), -100913642);
        assert_eq!(input.read_u32_packed().unwrap(), 1467867235);
    }

    #[test]
    fn test_packed_64_round_trip_through_shared_buffer() {
        let mut buffer = [0u8; 100];

        let mut out = BitStream::from_buffer(&mut buffer);
        out.write_i64_packed(-1469598103934656037).unwrap();
        out.write_u64_packed(81246971249124124).unwrap();

        let mut input = BitStream::from_buffer(&mut buffer);
        assert_eq!(input.read_i64_packed().unwrap(), -1469598103934656037);
        assert_eq!(input.read_u64_packed().unwrap(), 81246971249124124);
    }

    #[test]
    fn test_packed_extremal_round_trips() {
        let mut stream = BitStream::new();
        stream.write_i16_packed(i16::MIN).unwrap();
        stream.write_i16_packed(i16::MAX).unwrap();
        stream.write_u16_packed(u16::MAX).unwrap();
        stream.write_i32_packed(i32::MIN).unwrap();
        stream.write_i32_packed(i32::MAX).unwrap();
        stream.write_u32_packed(u32::MAX).unwrap();
        stream.write_i64_packed(i64::MIN).unwrap();
        stream.write_i64_packed(i64::MAX).unwrap();
        stream.write_u64_packed(u64::MAX).unwrap();

        let mut payload = stream.to_vec();
        let mut input = BitStream::from_buffer(&mut payload);
        assert_eq!(input.read_i16_packed().unwrap(), i16::MIN);
        assert_eq!(input.read_i16_packed().unwrap(), i16::MAX);
        assert_eq!(input.read_u16_packed().unwrap(), u16::MAX);
        assert_eq!(input.read_i32_packed().unwrap(), i32::MIN);
        assert_eq!(input.read_i32_packed().unwrap(), i32::MAX);
        assert_eq!(input.read_u32_packed().unwrap(), u32::MAX);
        assert_eq!(input.read_i64_packed().unwrap(), i64::MIN);
        assert_eq!(input.read_i64_packed().unwrap(), i64::MAX);
        assert_eq!(input.read_u64_packed().unwrap(), u64::MAX);
    }

    #[test]
    fn test_packed_encoding_is_minimal() {
        let cases: [(u64, usize); 7] = [
            (0, 1),
            (1, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            (u64::MAX, 10),
        ];
        for (value, bytes) in cases {
            let mut stream = BitStream::new();
            stream.write_u64_packed(value).unwrap();
            assert_eq!(stream.len(), bytes, "encoding of {value}");
        }
    }

    #[test]
    fn test_packed_known_encodings() {
        let mut stream = BitStream::new();
        stream.write_u64_packed(0).unwrap();
        stream.write_u64_packed(127).unwrap();
        stream.write_u64_packed(128).unwrap();
        stream.write_u64_packed(300).unwrap();
        assert_eq!(
            stream.to_vec(),
            vec![0x00, 0x7F, 0x80, 0x01, 0xAC, 0x02]
        );
    }

    #[test]
    fn test_truncated_packed_sequence_fails() {
        // continuation flag set, but the stream ends here
        let mut payload = vec![0x80];
        let mut stream = BitStream::from_buffer(&mut payload);
        assert_eq!(
            stream.read_u64_packed(),
            Err(NetbitError::EndOfStream { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_overlong_packed_sequence_is_consumed() {
        // eleven continuation groups exceed the 64-bit domain; the excess
        // bits are dropped but the cursor still walks the whole sequence
        let mut payload = vec![0x81, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00, 0x2A];
        let mut stream = BitStream::from_buffer(&mut payload);
        assert_eq!(stream.read_u64_packed().unwrap(), 1);
        assert_eq!(stream.read_byte().unwrap(), 0x2A);
    }

    #[quickcheck]
    fn prop_zigzag_round_trip(value: i64) -> bool {
        unzigzag64(zigzag64(value)) == value
    }

    #[quickcheck]
    fn prop_zigzag16_round_trip(value: i16) -> bool {
        unzigzag16(zigzag16(value)) == value
    }

    #[quickcheck]
    fn prop_zigzag32_round_trip(value: i32) -> bool {
        unzigzag32(zigzag32(value)) == value
    }

    #[quickcheck]
    fn prop_packed_u64_round_trip(values: Vec<u64>) -> bool {
        let mut stream = BitStream::new();
        for &value in &values {
            stream.write_u64_packed(value).unwrap();
        }

        let mut payload = stream.to_vec();
        let mut input = BitStream::from_buffer(&mut payload);
        values
            .iter()
            .all(|&value| input.read_u64_packed().unwrap() == value)
    }

    #[quickcheck]
    fn prop_packed_i64_round_trip(values: Vec<i64>) -> bool {
        let mut stream = BitStream::new();
        for &value in &values {
            stream.write_i64_packed(value).unwrap();
        }

        let mut payload = stream.to_vec();
        let mut input = BitStream::from_buffer(&mut payload);
        values
            .iter()
            .all(|&value| input.read_i64_packed().unwrap() == value)
    }

    #[quickcheck]
    fn prop_packed_i16_round_trip(value: i16) -> bool {
        let mut stream = BitStream::new();
        stream.write_i16_packed(value).unwrap();
        let mut payload = stream.to_vec();
        let mut input = BitStream::from_buffer(&mut payload);
        input.read_i16_packed().unwrap() == value
    }

    #[quickcheck]
    fn prop_packed_u32_round_trip(value: u32) -> bool {
        let mut stream = BitStream::new();
        stream.write_u32_packed(value).unwrap();
        let mut payload = stream.to_vec();
        let mut input = BitStream::from_buffer(&mut payload);
        input.read_u32_packed().unwrap() == value
    }

    #[quickcheck]
    fn prop_packed_length_is_minimal(value: u64) -> bool {
        let mut stream = BitStream::new();
        stream.write_u64_packed(value).unwrap();
        stream.len() == expected_group_count(value)
    }

    #[quickcheck]
    fn prop_packed_signed_length_is_minimal(value: i64) -> bool {
        let mut stream = BitStream::new();
        stream.write_i64_packed(value).unwrap();
        stream.len() == expected_group_count(zigzag64(value))
    }
}
