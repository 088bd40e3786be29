//! # TableView - Zero-Copy Record Access
//!
//! This module provides `TableView` for lazy, bounds-checked reads of one
//! record inside a shared buffer, and `TableMut` for in-place mutation of
//! fixed-width scalar fields.
//!
//! ## Usage
//!
//! ```ignore
//! let view = TableView::root(buf)?;
//! let id: i64 = view.scalar_at(0, 0)?;          // absent slot -> default
//! let child = view.table_at(3)?;                // absent slot -> None
//! ```
//!
//! ## Thread Safety
//!
//! `TableView` borrows immutably and is `Copy`; any number of views may
//! read the same buffer concurrently. `TableMut` takes an exclusive borrow,
//! so mutation cannot race readers by construction.
//!
//! ## Corrupt Input
//!
//! Construction validates the table's vtable (location, declared length,
//! table body bounds) once; every subsequent field access re-checks the
//! resolved value range. Malformed input surfaces as an error, never as an
//! out-of-bounds read. Nested table access is depth-limited to keep hostile
//! recursive buffers from exhausting the stack.

use eyre::{ensure, Result};

use crate::format::{
    read_i32, read_u16, read_u32, MAX_NESTING_DEPTH, SIZE_SIZE_PREFIX, SIZE_SOFFSET,
    SIZE_UOFFSET, SIZE_VOFFSET, VTABLE_HEADER_BYTES,
};
use crate::tables::types::Scalar;

/// Resolves a field slot to the absolute position of its value, or `None`
/// when the slot lies beyond the encoded vtable (an older record) or its
/// entry is 0 (elided field).
#[inline]
fn resolve_field(buf: &[u8], pos: usize, vt_pos: usize, vt_len: u16, slot: u16) -> Option<usize> {
    let entry_at = VTABLE_HEADER_BYTES + slot as usize * SIZE_VOFFSET;
    if entry_at + SIZE_VOFFSET > vt_len as usize {
        return None;
    }
    let at = vt_pos + entry_at;
    let entry = u16::from_le_bytes([buf[at], buf[at + 1]]);
    if entry == 0 {
        None
    } else {
        Some(pos + entry as usize)
    }
}

/// Validates the vtable reachable from a table at `pos` and returns its
/// position and declared byte length.
fn check_table(buf: &[u8], pos: usize) -> Result<(usize, u16)> {
    let soffset = read_i32(buf, pos)?;
    let vt = pos as i64 - soffset as i64;
    ensure!(
        vt >= 0 && vt as usize + VTABLE_HEADER_BYTES <= buf.len(),
        "corrupt buffer: vtable position {} out of range for table at {}",
        vt,
        pos
    );
    let vt_pos = vt as usize;
    let vt_len = read_u16(buf, vt_pos)?;
    ensure!(
        vt_len as usize >= VTABLE_HEADER_BYTES && vt_len % SIZE_VOFFSET as u16 == 0,
        "corrupt buffer: malformed vtable length {} at {}",
        vt_len,
        vt_pos
    );
    ensure!(
        vt_pos + vt_len as usize <= buf.len(),
        "corrupt buffer: vtable at {} (length {}) past end {}",
        vt_pos,
        vt_len,
        buf.len()
    );
    let table_len = read_u16(buf, vt_pos + SIZE_VOFFSET)?;
    ensure!(
        table_len as usize >= SIZE_SOFFSET && pos + table_len as usize <= buf.len(),
        "corrupt buffer: table at {} (length {}) past end {}",
        pos,
        table_len,
        buf.len()
    );
    Ok((vt_pos, vt_len))
}

#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    buf: &'a [u8],
    pos: usize,
    vt_pos: usize,
    vt_len: u16,
    depth: usize,
}

impl<'a> TableView<'a> {
    /// Binds a view to the root record of a finished buffer.
    pub fn root(buf: &'a [u8]) -> Result<Self> {
        let off = read_u32(buf, 0)? as usize;
        Self::new(buf, off, 0)
    }

    /// Binds a view to the root record of a size-prefixed buffer.
    pub fn size_prefixed_root(buf: &'a [u8]) -> Result<Self> {
        let size = read_u32(buf, 0)? as usize;
        ensure!(
            SIZE_SIZE_PREFIX + size <= buf.len(),
            "corrupt buffer: size prefix {} exceeds remaining {} bytes",
            size,
            buf.len().saturating_sub(SIZE_SIZE_PREFIX)
        );
        let off = read_u32(buf, SIZE_SIZE_PREFIX)? as usize;
        Self::new(&buf[..SIZE_SIZE_PREFIX + size], SIZE_SIZE_PREFIX + off, 0)
    }

    /// Binds a view to a table at `pos`. O(1) apart from vtable validation;
    /// no field is parsed until accessed.
    pub fn new(buf: &'a [u8], pos: usize, depth: usize) -> Result<Self> {
        ensure!(
            depth < MAX_NESTING_DEPTH,
            "table nesting depth {} exceeds maximum {}",
            depth,
            MAX_NESTING_DEPTH
        );
        let (vt_pos, vt_len) = check_table(buf, pos)?;
        Ok(Self {
            buf,
            pos,
            vt_pos,
            vt_len,
            depth,
        })
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Vtable slot entries carried by this record. Older records may carry
    /// fewer entries than the current schema declares.
    pub fn vtable_entries(&self) -> usize {
        (self.vt_len as usize - VTABLE_HEADER_BYTES) / SIZE_VOFFSET
    }

    /// Absolute position of a field's value, or `None` when absent.
    pub fn field_offset(&self, slot: u16) -> Option<usize> {
        resolve_field(self.buf, self.pos, self.vt_pos, self.vt_len, slot)
    }

    pub fn is_present(&self, slot: u16) -> bool {
        self.field_offset(slot).is_some()
    }

    /// Reads a scalar field, substituting `default` when the slot is absent.
    pub fn scalar_at<T: Scalar>(&self, slot: u16, default: T) -> Result<T> {
        match self.field_offset(slot) {
            None => Ok(default),
            Some(at) => {
                ensure!(
                    at + T::SIZE <= self.buf.len(),
                    "corrupt buffer: scalar field at {} past end {}",
                    at,
                    self.buf.len()
                );
                Ok(T::read_le(&self.buf[at..]))
            }
        }
    }

    /// Follows a stored forward reference at `at`.
    fn indirect(&self, at: usize) -> Result<usize> {
        let rel = read_u32(self.buf, at)? as usize;
        let target = at
            .checked_add(rel)
            .ok_or_else(|| eyre::eyre!("corrupt buffer: reference at {} overflows", at))?;
        ensure!(
            target <= self.buf.len(),
            "corrupt buffer: reference at {} points to {} past end {}",
            at,
            target,
            self.buf.len()
        );
        Ok(target)
    }

    /// Reads a nested-table field. Absent slots yield `None`.
    pub fn table_at(&self, slot: u16) -> Result<Option<TableView<'a>>> {
        let Some(at) = self.field_offset(slot) else {
            return Ok(None);
        };
        let target = self.indirect(at)?;
        Ok(Some(TableView::new(self.buf, target, self.depth + 1)?))
    }

    /// Reads a byte-vector field. Absent slots yield `None`.
    pub fn bytes_at(&self, slot: u16) -> Result<Option<&'a [u8]>> {
        let Some(at) = self.field_offset(slot) else {
            return Ok(None);
        };
        let target = self.indirect(at)?;
        let len = read_u32(self.buf, target)? as usize;
        let start = target + SIZE_UOFFSET;
        ensure!(
            start + len <= self.buf.len(),
            "corrupt buffer: payload at {} (length {}) past end {}",
            start,
            len,
            self.buf.len()
        );
        Ok(Some(&self.buf[start..start + len]))
    }

    /// Reads a string field. Absent slots yield `None`.
    pub fn str_at(&self, slot: u16) -> Result<Option<&'a str>> {
        let Some(bytes) = self.bytes_at(slot)? else {
            return Ok(None);
        };
        let s = std::str::from_utf8(bytes)
            .map_err(|e| eyre::eyre!("corrupt buffer: invalid UTF-8 in string field: {}", e))?;
        Ok(Some(s))
    }
}

/// Exclusive-access counterpart of [`TableView`] for in-place mutation.
///
/// Mutation is partial by contract: only fields that were physically written
/// at encode time have space reserved. Mutating an elided field returns
/// `Ok(false)` and leaves the buffer untouched; callers that need guaranteed
/// mutability must populate those fields at build time even when the value
/// equals the default.
#[derive(Debug)]
pub struct TableMut<'a> {
    buf: &'a mut [u8],
    pos: usize,
    vt_pos: usize,
    vt_len: u16,
}

impl<'a> TableMut<'a> {
    pub fn root(buf: &'a mut [u8]) -> Result<Self> {
        let off = read_u32(buf, 0)? as usize;
        Self::new(buf, off)
    }

    pub fn size_prefixed_root(buf: &'a mut [u8]) -> Result<Self> {
        let size = read_u32(buf, 0)? as usize;
        ensure!(
            SIZE_SIZE_PREFIX + size <= buf.len(),
            "corrupt buffer: size prefix {} exceeds remaining {} bytes",
            size,
            buf.len().saturating_sub(SIZE_SIZE_PREFIX)
        );
        let off = read_u32(buf, SIZE_SIZE_PREFIX)? as usize;
        let (frame, _) = buf.split_at_mut(SIZE_SIZE_PREFIX + size);
        Self::new(frame, SIZE_SIZE_PREFIX + off)
    }

    pub fn new(buf: &'a mut [u8], pos: usize) -> Result<Self> {
        let (vt_pos, vt_len) = check_table(buf, pos)?;
        Ok(Self {
            buf,
            pos,
            vt_pos,
            vt_len,
        })
    }

    /// Overwrites a scalar field in place. Returns `Ok(false)` when the
    /// field was elided at encode time, so there is no space to write into.
    pub fn mutate_scalar<T: Scalar>(&mut self, slot: u16, value: T) -> Result<bool> {
        let Some(at) = resolve_field(self.buf, self.pos, self.vt_pos, self.vt_len, slot) else {
            return Ok(false);
        };
        ensure!(
            at + T::SIZE <= self.buf.len(),
            "corrupt buffer: scalar field at {} past end {}",
            at,
            self.buf.len()
        );
        value.write_le(&mut self.buf[at..]);
        Ok(true)
    }

    /// Descends into a nested-table field for mutation.
    pub fn table_at(self, slot: u16) -> Result<Option<TableMut<'a>>> {
        let Some(at) = resolve_field(self.buf, self.pos, self.vt_pos, self.vt_len, slot) else {
            return Ok(None);
        };
        let rel = read_u32(self.buf, at)? as usize;
        let target = at
            .checked_add(rel)
            .ok_or_else(|| eyre::eyre!("corrupt buffer: reference at {} overflows", at))?;
        ensure!(
            target <= self.buf.len(),
            "corrupt buffer: reference at {} points to {} past end {}",
            at,
            target,
            self.buf.len()
        );
        Ok(Some(TableMut::new(self.buf, target)?))
    }
}
