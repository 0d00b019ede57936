#![doc(html_root_url = "https://docs.rs/netbit/0.1.0")]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # netbit - bit-addressable network serialization buffer
//!
//! `netbit` provides [`BitStream`], a bit-addressable binary read/write
//! buffer used to serialize and deserialize primitive values for network
//! transport. It is the byte-payload workhorse underneath a networked-object
//! or RPC layer: that layer decides *which* fields to send, `netbit` turns
//! them into bytes and back.
//!
//! ## Features
//!
//! ### Two buffer modes
//! - **Fixed**: operate over a caller-supplied buffer that is never
//!   reallocated, for deserializing a known payload window
//! - **Growable**: operate over an internally owned buffer that doubles on
//!   demand, for serializing a new payload
//!
//! ### Codecs
//! - Single-bit reads and writes with a bit-granular cursor
//! - Fixed-width integers and floats, little-endian
//! - Variable-length "packed" integers (zig-zag + 7-bit continuation
//!   groups) that spend one byte on small values instead of two, four or
//!   eight
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! netbit = "0.1.0"
//! ```
//!
//! ### Serializing a payload
//!
//! ```rust
//! use netbit::BitStream;
//!
//! fn main() -> netbit::Result<()> {
//!     let mut stream = BitStream::new();
//!     stream.write_bit(true)?;
//!     stream.write_byte(0x2A)?;
//!     stream.write_i32_packed(-3)?;
//!
//!     // trimmed to the bytes actually written
//!     let mut payload = stream.to_vec();
//!
//!     let mut input = BitStream::from_buffer(&mut payload);
//!     assert!(input.read_bit()?);
//!     assert_eq!(input.read_byte()?, 0x2A);
//!     assert_eq!(input.read_i32_packed()?, -3);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `stream`: the [`BitStream`] core - construction, bit- and byte-level
//!   primitives, fixed-width codecs, buffer management, growth policy
//! - `packed`: the variable-length integer codec (zig-zag mapping plus
//!   7-bit continuation-flag byte groups)
//! - `error`: error types and the crate [`Result`] alias

/// Error types and utilities
pub mod error;

/// Variable-length ("packed") integer codec
pub mod packed;

/// The bit-addressable stream core
pub mod stream;

pub use error::{NetbitError, Result};
pub use stream::BitStream;
