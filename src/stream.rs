use crate::error::{NetbitError, Result};
use bytes::Bytes;

/// Capacity given to growable streams created with [`BitStream::new`].
const DEFAULT_CAPACITY: usize = 16;

/// Byte index addressed by a bit cursor.
fn byte_index(cursor: usize) -> usize {
    cursor / 8
}

/// Offset of a bit cursor within its byte; 0 is the least-significant bit.
fn bit_offset(cursor: usize) -> usize {
    cursor % 8
}

/// Smallest byte-aligned cursor at or after `cursor`.
fn align_up(cursor: usize) -> usize {
    (cursor + 7) & !7
}

/// Number of whole bytes needed to contain `bits` bits.
fn bytes_for_bits(bits: usize) -> usize {
    (bits + 7) / 8
}

#[derive(Debug)]
enum Storage<'a> {
    /// Caller-owned buffer. Never reallocated; writes past the end fail.
    Fixed(&'a mut [u8]),
    /// Exclusively owned buffer, zero-filled to physical capacity.
    Growable(Vec<u8>),
}

impl Storage<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Fixed(buf) => buf,
            Storage::Growable(buf) => buf,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Fixed(buf) => buf,
            Storage::Growable(buf) => buf,
        }
    }
}

/// A bit-addressable binary buffer for serializing and deserializing
/// primitive values for network transport.
///
/// A stream operates in one of two modes, chosen at construction:
///
/// - **Fixed**: [`BitStream::from_buffer`] borrows a caller-supplied byte
///   buffer. The buffer is never reallocated and its full size is reported
///   as the stream's length, since it represents an externally-defined
///   payload window.
/// - **Growable**: [`BitStream::new`] / [`BitStream::with_capacity`] own a
///   resizable buffer that doubles on demand. Length tracks only the bytes
///   actually written.
///
/// A single bit-granular cursor is shared by every read and write and only
/// ever advances; there is no seek or rewind.
///
/// # Examples
///
/// ```
/// use netbit::BitStream;
///
/// # fn main() -> netbit::Result<()> {
/// let mut out = BitStream::new();
/// out.write_u16(512)?;
/// out.write_i32_packed(-2)?;
///
/// let mut payload = out.to_vec();
/// let mut input = BitStream::from_buffer(&mut payload);
/// assert_eq!(input.read_u16()?, 512);
/// assert_eq!(input.read_i32_packed()?, -2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BitStream<'a> {
    storage: Storage<'a>,
    /// Logical length in bytes. Fixed mode: always the buffer size.
    /// Growable mode: smallest byte count containing every bit written.
    len: usize,
    /// Absolute bit position of the next read or write.
    cursor: usize,
}

impl<'a> BitStream<'a> {
    /// Creates a fixed-mode stream over a caller-supplied buffer.
    ///
    /// The buffer is treated as a fully-used payload window: `len()` equals
    /// the buffer size no matter how many bits are written afterwards. The
    /// stream never reallocates; a write past the end fails with
    /// [`NetbitError::CapacityExceeded`], which for an empty buffer means
    /// every write fails.
    ///
    /// ```
    /// use netbit::BitStream;
    ///
    /// let mut buffer = [0u8; 4];
    /// let mut writer = BitStream::from_buffer(&mut buffer);
    /// writer.write_u16(512).unwrap();
    ///
    /// let mut reader = BitStream::from_buffer(&mut buffer);
    /// assert_eq!(reader.read_u16().unwrap(), 512);
    /// ```
    pub fn from_buffer(buffer: &'a mut [u8]) -> Self {
        let len = buffer.len();
        BitStream {
            storage: Storage::Fixed(buffer),
            len,
            cursor: 0,
        }
    }

    /// Creates an empty growable stream with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        BitStream {
            storage: Storage::Growable(vec![0; capacity]),
            len: 0,
            cursor: 0,
        }
    }

    /// Creates an empty growable stream with a small default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Logical length of the stream in bytes.
    ///
    /// Fixed mode reports the borrowed buffer's full size; growable mode
    /// reports the smallest byte count containing every bit written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no byte of the stream is readable.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Physical size of the underlying storage in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// The live underlying buffer, trailing capacity included.
    ///
    /// In growable mode this may be longer than [`len`](Self::len); the
    /// extra bytes are never produced by writes, so a reader that sticks to
    /// the written operations will not consume them.
    pub fn buffer(&self) -> &[u8] {
        self.storage.as_slice()
    }

    /// Mutable view of the live underlying buffer, for zero-copy hand-off
    /// into another stream's [`from_buffer`](Self::from_buffer).
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.storage.as_mut_slice()
    }

    /// Copies the first [`len`](Self::len) bytes into a fresh vector,
    /// trimmed to logical length rather than physical capacity. This is the
    /// canonical finished-payload extraction.
    pub fn to_vec(&self) -> Vec<u8> {
        self.storage.as_slice()[..self.len].to_vec()
    }

    /// Consumes the stream and returns the finished payload as [`Bytes`],
    /// trimmed like [`to_vec`](Self::to_vec), for hand-off to a transport
    /// layer.
    pub fn into_bytes(self) -> Bytes {
        match self.storage {
            Storage::Fixed(buf) => Bytes::copy_from_slice(&buf[..self.len]),
            Storage::Growable(mut buf) => {
                buf.truncate(self.len);
                Bytes::from(buf)
            }
        }
    }

    /// Writes a single bit at the cursor and advances it by one.
    ///
    /// Bit 0 of each byte is its least-significant bit. A newly touched
    /// byte has its remaining bits left as 0. Growable streams grow on
    /// demand; fixed streams fail with [`NetbitError::CapacityExceeded`]
    /// once the borrowed buffer is full.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        let index = byte_index(self.cursor);
        let mask = 1u8 << bit_offset(self.cursor);
        self.ensure_writable(index + 1)?;
        let buf = self.storage.as_mut_slice();
        if bit {
            buf[index] |= mask;
        } else {
            buf[index] &= !mask;
        }
        self.cursor += 1;
        self.update_len();
        Ok(())
    }

    /// Reads a single bit at the cursor and advances it by one.
    ///
    /// Fails with [`NetbitError::EndOfStream`] once the cursor passes the
    /// last readable byte.
    ///
    /// ```
    /// use netbit::BitStream;
    ///
    /// let mut buffer = [0u8; 1];
    /// let mut writer = BitStream::from_buffer(&mut buffer);
    /// writer.write_bit(true).unwrap();
    /// writer.write_bit(false).unwrap();
    /// writer.write_bit(true).unwrap();
    ///
    /// let mut reader = BitStream::from_buffer(&mut buffer);
    /// assert!(reader.read_bit().unwrap());
    /// assert!(!reader.read_bit().unwrap());
    /// assert!(reader.read_bit().unwrap());
    /// ```
    pub fn read_bit(&mut self) -> Result<bool> {
        let index = byte_index(self.cursor);
        if index >= self.len {
            return Err(NetbitError::EndOfStream {
                index,
                len: self.len,
            });
        }
        let bit = (self.storage.as_slice()[index] >> bit_offset(self.cursor)) & 1;
        self.cursor += 1;
        Ok(bit == 1)
    }

    /// Writes one byte at the byte-aligned cursor.
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    /// Reads one byte at the byte-aligned cursor.
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Writes a byte slice at the byte-aligned cursor.
    ///
    /// If the cursor sits mid-byte it is first advanced to the next byte
    /// boundary; the unwritten trailing bits of the partial byte keep
    /// whatever [`write_bit`](Self::write_bit) left there.
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.cursor = align_up(self.cursor);
        let start = byte_index(self.cursor);
        self.ensure_writable(start + src.len())?;
        self.storage.as_mut_slice()[start..start + src.len()].copy_from_slice(src);
        self.cursor += src.len() * 8;
        self.update_len();
        Ok(())
    }

    /// Reads `len` bytes from the byte-aligned cursor into a fresh vector.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Writes an unsigned 16-bit integer, little-endian.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads an unsigned 16-bit integer, little-endian.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Writes a signed 16-bit integer, little-endian.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads a signed 16-bit integer, little-endian.
    pub fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Writes an unsigned 32-bit integer, little-endian.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads an unsigned 32-bit integer, little-endian.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Writes a signed 32-bit integer, little-endian.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads a signed 32-bit integer, little-endian.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Writes an unsigned 64-bit integer, little-endian.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads an unsigned 64-bit integer, little-endian.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Writes a signed 64-bit integer, little-endian.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads a signed 64-bit integer, little-endian.
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Writes a 32-bit float as its IEEE-754 bit pattern, little-endian.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads a 32-bit float as its IEEE-754 bit pattern, little-endian.
    pub fn read_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Writes a 64-bit float as its IEEE-754 bit pattern, little-endian.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Reads a 64-bit float as its IEEE-754 bit pattern, little-endian.
    pub fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Copies the first `len` bytes of `source`'s storage into this stream
    /// at the byte-aligned cursor, growing under the normal mode rules.
    ///
    /// `source`'s own cursor is not consumed or mutated. Fails with
    /// [`NetbitError::EndOfStream`] if `source` holds fewer than `len`
    /// readable bytes.
    ///
    /// ```
    /// use netbit::BitStream;
    ///
    /// # fn main() -> netbit::Result<()> {
    /// let mut head = BitStream::new();
    /// head.write_byte(56)?;
    /// head.write_byte(24)?;
    ///
    /// let mut tail = BitStream::new();
    /// tail.write_byte(27)?;
    /// tail.write_byte(100)?;
    ///
    /// head.copy_from(&tail, 2)?;
    /// assert_eq!(head.to_vec(), vec![56, 24, 27, 100]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn copy_from(&mut self, source: &BitStream<'_>, len: usize) -> Result<()> {
        if len > source.len() {
            return Err(NetbitError::EndOfStream {
                index: len.saturating_sub(1),
                len: source.len(),
            });
        }
        self.write_bytes(&source.buffer()[..len])
    }

    /// Reads exactly `dst.len()` bytes from the byte-aligned cursor.
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.cursor = align_up(self.cursor);
        let start = byte_index(self.cursor);
        let end = start + dst.len();
        if end > self.len {
            return Err(NetbitError::EndOfStream {
                index: end.saturating_sub(1),
                len: self.len,
            });
        }
        dst.copy_from_slice(&self.storage.as_slice()[start..end]);
        self.cursor += dst.len() * 8;
        Ok(())
    }

    /// Makes the first `required` bytes of storage writable, growing a
    /// growable stream geometrically and refusing on a fixed one.
    fn ensure_writable(&mut self, required: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Fixed(buf) => {
                if required > buf.len() {
                    return Err(NetbitError::CapacityExceeded {
                        index: required - 1,
                        capacity: buf.len(),
                    });
                }
                Ok(())
            }
            Storage::Growable(buf) => {
                if required > buf.len() {
                    let new_capacity = required.max(buf.len() * 2).max(DEFAULT_CAPACITY);
                    log::trace!(
                        "growing stream buffer from {} to {} bytes",
                        buf.len(),
                        new_capacity
                    );
                    buf.resize(new_capacity, 0);
                }
                Ok(())
            }
        }
    }

    /// Recomputes the logical length after a write. Fixed-mode length is
    /// pinned to the buffer size and never changes.
    fn update_len(&mut self) {
        if let Storage::Growable(_) = self.storage {
            self.len = self.len.max(bytes_for_bits(self.cursor));
        }
    }
}

impl Default for BitStream<'_> {
    fn default() -> Self {
        Self::new()
    }
}
