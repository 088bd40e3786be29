//! # Wire Format Constants and Primitives
//!
//! This module centralizes the wire-level constants of the table format and
//! the checked little-endian read helpers the decoder is built on. Constants
//! that depend on each other are co-located and enforced with compile-time
//! assertions so they cannot drift apart.
//!
//! ## Offset Kinds
//!
//! | Kind    | Width | Signed | Points                                    |
//! |---------|-------|--------|-------------------------------------------|
//! | uoffset | 4     | no     | forward, from its own location            |
//! | soffset | 4     | yes    | backward from a table start to its vtable |
//! | voffset | 2     | no     | from a table start to a field in its body |
//!
//! ## Vtable Layout
//!
//! ```text
//! [vtable_bytes: u16][table_bytes: u16][slot 0: u16][slot 1: u16]...
//! ```
//!
//! `vtable_bytes` covers the two metadata words plus the slot entries, so a
//! vtable is never smaller than `VTABLE_HEADER_BYTES`. A slot entry of 0
//! means the field was elided at encode time.

use eyre::{ensure, Result};

/// Width of an unsigned forward offset (references, root pointer).
pub const SIZE_UOFFSET: usize = 4;

/// Width of the signed table-to-vtable offset.
pub const SIZE_SOFFSET: usize = 4;

/// Width of a vtable entry.
pub const SIZE_VOFFSET: usize = 2;

/// Width of the optional total-size framing prefix.
pub const SIZE_SIZE_PREFIX: usize = 4;

/// Bytes of vtable metadata preceding the slot entries.
pub const VTABLE_HEADER_BYTES: usize = 2 * SIZE_VOFFSET;

/// Maximum depth of nested tables accepted at decode time. Prevents stack
/// exhaustion on recursive or malicious input.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Largest alignment any scalar field requires.
pub const MAX_SCALAR_ALIGN: usize = 8;

// The root pointer and every stored reference share one width; the reader
// resolves both with the same arithmetic.
const _: () = assert!(SIZE_UOFFSET == SIZE_SOFFSET);
const _: () = assert!(SIZE_SIZE_PREFIX == SIZE_UOFFSET);
const _: () = assert!(MAX_SCALAR_ALIGN.is_power_of_two());

/// Reads a `u16` at `pos`, failing instead of slicing out of bounds.
#[inline]
pub fn read_u16(buf: &[u8], pos: usize) -> Result<u16> {
    ensure!(
        pos + SIZE_VOFFSET <= buf.len(),
        "corrupt buffer: u16 read at {} past end {}",
        pos,
        buf.len()
    );
    Ok(u16::from_le_bytes([buf[pos], buf[pos + 1]]))
}

/// Reads a `u32` at `pos`, failing instead of slicing out of bounds.
#[inline]
pub fn read_u32(buf: &[u8], pos: usize) -> Result<u32> {
    ensure!(
        pos + SIZE_UOFFSET <= buf.len(),
        "corrupt buffer: u32 read at {} past end {}",
        pos,
        buf.len()
    );
    Ok(u32::from_le_bytes([
        buf[pos],
        buf[pos + 1],
        buf[pos + 2],
        buf[pos + 3],
    ]))
}

/// Reads an `i32` at `pos`, failing instead of slicing out of bounds.
#[inline]
pub fn read_i32(buf: &[u8], pos: usize) -> Result<i32> {
    ensure!(
        pos + SIZE_SOFFSET <= buf.len(),
        "corrupt buffer: i32 read at {} past end {}",
        pos,
        buf.len()
    );
    Ok(i32::from_le_bytes([
        buf[pos],
        buf[pos + 1],
        buf[pos + 2],
        buf[pos + 3],
    ]))
}
