//! # TableBuilder - Back-to-Front Buffer Construction
//!
//! This module provides `TableBuilder` for serializing a tree of records
//! into one contiguous buffer. The buffer grows from the back toward the
//! front, so children are always finished before the parent that references
//! them and every stored reference is a forward offset.
//!
//! ## Usage
//!
//! ```
//! use tablebuf::TableBuilder;
//!
//! let mut builder = TableBuilder::new();
//! builder.start_table(2);
//! builder.push_i64_slot(0, 42, 0);
//! builder.push_i32_slot(1, 7, 0);
//! let root = builder.end_table();
//! builder.finish(root);
//! assert!(!builder.finished_data().is_empty());
//!
//! // Reuse the builder for the next record
//! builder.reset();
//! ```
//!
//! ## Construction Discipline
//!
//! Building is unchecked by design: slots must stay below the count given to
//! `start_table`, table construction must not be interleaved, and strings or
//! vectors must be created outside any open table. Violations are caught by
//! assertions rather than surfaced as recoverable errors, because a buffer
//! built out of order is unusable either way.
//!
//! ## Offsets During Construction
//!
//! While the buffer grows, absolute positions are unknown - the front moves
//! with every write. Finished items are therefore tracked as *reverse*
//! offsets (distance from the buffer end, which never moves). A [`WipOffset`]
//! is such a reverse offset; it is converted into a relative forward offset
//! at the moment a referencing field is written.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::format::{SIZE_SIZE_PREFIX, SIZE_UOFFSET, SIZE_VOFFSET, VTABLE_HEADER_BYTES};
use crate::tables::types::Scalar;

const DEFAULT_CAPACITY: usize = 1024;

/// Reverse offset of a finished object in a buffer under construction.
///
/// Only meaningful for the builder that produced it; resolved into a wire
/// offset when stored into a field slot or the root position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipOffset(u32);

impl WipOffset {
    #[cfg(test)]
    pub(crate) fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldLoc {
    /// Reverse offset of the field value.
    off: u32,
    slot: u16,
}

pub struct TableBuilder {
    /// Backing storage; written region is `buf[head..]`.
    buf: Vec<u8>,
    head: usize,
    field_locs: SmallVec<[FieldLoc; 16]>,
    /// Interned vtables: bytes -> reverse offset of the first occurrence.
    vtable_cache: HashMap<Vec<u8>, u32>,
    table_start: u32,
    declared_fields: u16,
    min_align: usize,
    nested: bool,
    finished: bool,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(SIZE_UOFFSET);
        Self {
            buf: vec![0u8; capacity],
            head: capacity,
            field_locs: SmallVec::new(),
            vtable_cache: HashMap::new(),
            table_start: 0,
            declared_fields: 0,
            min_align: 1,
            nested: false,
            finished: false,
        }
    }

    /// Clears all state for reuse without releasing the backing buffer.
    pub fn reset(&mut self) {
        let len = self.buf.len();
        self.buf[self.head..].fill(0);
        self.head = len;
        self.field_locs.clear();
        self.vtable_cache.clear();
        self.table_start = 0;
        self.declared_fields = 0;
        self.min_align = 1;
        self.nested = false;
        self.finished = false;
    }

    /// Bytes written so far, i.e. the reverse offset of the write cursor.
    #[inline]
    fn used_space(&self) -> usize {
        self.buf.len() - self.head
    }

    fn grow(&mut self) {
        let old_len = self.buf.len();
        let used = self.used_space();
        let old_head = self.head;
        let new_len = old_len.max(32) * 2;
        self.buf.resize(new_len, 0);
        self.buf.copy_within(old_head..old_len, new_len - used);
        self.buf[old_head..old_len].fill(0);
        self.head = new_len - used;
    }

    #[inline]
    fn ensure_space(&mut self, bytes: usize) {
        while self.head < bytes {
            self.grow();
        }
    }

    /// Pads with zeros so that after pushing `len` more bytes the write
    /// cursor sits at a multiple of `alignment` from the buffer end. The
    /// final buffer is sized to a multiple of the largest alignment seen,
    /// which turns end-relative alignment into absolute alignment.
    fn align_before(&mut self, len: usize, alignment: usize) {
        debug_assert!(alignment.is_power_of_two());
        self.min_align = self.min_align.max(alignment);
        let pad = alignment.wrapping_sub(self.used_space() + len) & (alignment - 1);
        if pad > 0 {
            self.ensure_space(pad);
            self.head -= pad;
            self.buf[self.head..self.head + pad].fill(0);
        }
    }

    fn push_bytes_unaligned(&mut self, bytes: &[u8]) {
        self.ensure_space(bytes.len());
        self.head -= bytes.len();
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
    }

    fn push_scalar<T: Scalar>(&mut self, value: T) {
        self.align_before(T::SIZE, T::SIZE);
        self.ensure_space(T::SIZE);
        self.head -= T::SIZE;
        value.write_le(&mut self.buf[self.head..]);
    }

    /// Begins a record with room for `declared_fields` vtable slots, all
    /// initially absent.
    pub fn start_table(&mut self, declared_fields: u16) {
        assert!(!self.nested, "start_table while another table is open");
        assert!(!self.finished, "start_table after finish");
        self.nested = true;
        self.declared_fields = declared_fields;
        self.field_locs.clear();
        self.table_start = self.used_space() as u32;
    }

    /// Writes a scalar field slot. Fields equal to their default are elided:
    /// the vtable entry stays 0 and decoders reproduce the default.
    pub fn push_scalar_slot<T: Scalar>(&mut self, slot: u16, value: T, default: T) {
        debug_assert!(self.nested, "slot write outside start_table/end_table");
        debug_assert!(
            slot < self.declared_fields,
            "slot {} beyond declared field count {}",
            slot,
            self.declared_fields
        );
        if value == default {
            return;
        }
        self.push_scalar(value);
        self.field_locs.push(FieldLoc {
            off: self.used_space() as u32,
            slot,
        });
    }

    scalar_slot_methods! {
        bool: bool,
        i8: i8,
        u8: u8,
        i16: i16,
        u16: u16,
        i32: i32,
        u32: u32,
        i64: i64,
        u64: u64,
        f32: f32,
        f64: f64,
    }

    /// Writes a reference field slot. `None` encodes an absent child: the
    /// vtable entry stays 0 and decoders see no object.
    pub fn push_offset_slot(&mut self, slot: u16, value: Option<WipOffset>) {
        debug_assert!(self.nested, "slot write outside start_table/end_table");
        debug_assert!(
            slot < self.declared_fields,
            "slot {} beyond declared field count {}",
            slot,
            self.declared_fields
        );
        let Some(target) = value else { return };
        debug_assert!(
            (target.0 as usize) <= self.used_space(),
            "offset slot references an object not yet built"
        );
        self.align_before(SIZE_UOFFSET, SIZE_UOFFSET);
        self.ensure_space(SIZE_UOFFSET);
        self.head -= SIZE_UOFFSET;
        let rel = self.used_space() as u32 - target.0;
        self.buf[self.head..self.head + SIZE_UOFFSET].copy_from_slice(&rel.to_le_bytes());
        self.field_locs.push(FieldLoc {
            off: self.used_space() as u32,
            slot,
        });
    }

    /// Finishes the open record: writes (or reuses) its vtable and patches
    /// the table's vtable offset. Returns the record's location.
    pub fn end_table(&mut self) -> WipOffset {
        assert!(self.nested, "end_table without start_table");

        // The table body starts with the signed offset to its vtable,
        // patched below once the vtable location is known.
        self.push_scalar(0i32);
        let object_rev = self.used_space() as u32;
        let table_size = object_rev - self.table_start;
        debug_assert!(table_size <= u16::MAX as u32, "table body exceeds u16 size");

        let entries = self
            .field_locs
            .iter()
            .map(|f| f.slot as usize + 1)
            .max()
            .unwrap_or(0);
        let vt_len = VTABLE_HEADER_BYTES + entries * SIZE_VOFFSET;
        let mut vtable = vec![0u8; vt_len];
        vtable[0..2].copy_from_slice(&(vt_len as u16).to_le_bytes());
        vtable[2..4].copy_from_slice(&(table_size as u16).to_le_bytes());
        for loc in &self.field_locs {
            let entry = object_rev - loc.off;
            debug_assert!(entry <= u16::MAX as u32);
            let at = VTABLE_HEADER_BYTES + loc.slot as usize * SIZE_VOFFSET;
            vtable[at..at + SIZE_VOFFSET].copy_from_slice(&(entry as u16).to_le_bytes());
        }

        // Identical vtables are shared across records; the soffset may then
        // point forward (negative value), which readers handle uniformly.
        let cached = self.vtable_cache.get(vtable.as_slice()).copied();
        let vtable_rev = match cached {
            Some(rev) => rev,
            None => {
                self.align_before(vt_len, SIZE_VOFFSET);
                self.push_bytes_unaligned(&vtable);
                let rev = self.used_space() as u32;
                self.vtable_cache.insert(vtable, rev);
                rev
            }
        };

        let soffset = vtable_rev as i64 - object_rev as i64;
        let at = self.buf.len() - object_rev as usize;
        self.buf[at..at + 4].copy_from_slice(&(soffset as i32).to_le_bytes());

        self.nested = false;
        self.field_locs.clear();
        WipOffset(object_rev)
    }

    /// Writes a length-prefixed, NUL-terminated UTF-8 string payload. The
    /// terminator is excluded from the stored length.
    pub fn create_string(&mut self, value: &str) -> WipOffset {
        self.create_payload(value.as_bytes(), true)
    }

    /// Writes a length-prefixed byte vector payload.
    pub fn create_byte_vector(&mut self, value: &[u8]) -> WipOffset {
        self.create_payload(value, false)
    }

    fn create_payload(&mut self, data: &[u8], nul_terminated: bool) -> WipOffset {
        assert!(!self.nested, "create_* while a table is open");
        assert!(!self.finished, "create_* after finish");
        let tail = usize::from(nul_terminated);
        self.align_before(data.len() + tail, SIZE_UOFFSET);
        if nul_terminated {
            self.push_bytes_unaligned(&[0]);
        }
        self.push_bytes_unaligned(data);
        self.push_scalar(data.len() as u32);
        WipOffset(self.used_space() as u32)
    }

    /// Records the root object at the front of the buffer.
    pub fn finish(&mut self, root: WipOffset) {
        self.finish_with(root, false);
    }

    /// Like [`finish`](Self::finish), but prepends the total byte size for
    /// streaming framing. The prefix itself is excluded from the size.
    pub fn finish_size_prefixed(&mut self, root: WipOffset) {
        self.finish_with(root, true);
    }

    fn finish_with(&mut self, root: WipOffset, size_prefixed: bool) {
        assert!(!self.nested, "finish while a table is open");
        assert!(!self.finished, "finish called twice");
        let prologue = SIZE_UOFFSET + if size_prefixed { SIZE_SIZE_PREFIX } else { 0 };
        let alignment = self.min_align.max(SIZE_UOFFSET);
        self.align_before(prologue, alignment);

        self.ensure_space(SIZE_UOFFSET);
        self.head -= SIZE_UOFFSET;
        let rel = self.used_space() as u32 - root.0;
        self.buf[self.head..self.head + SIZE_UOFFSET].copy_from_slice(&rel.to_le_bytes());

        if size_prefixed {
            let size = self.used_space() as u32;
            self.ensure_space(SIZE_SIZE_PREFIX);
            self.head -= SIZE_SIZE_PREFIX;
            self.buf[self.head..self.head + SIZE_SIZE_PREFIX]
                .copy_from_slice(&size.to_le_bytes());
        }
        self.finished = true;
    }

    /// The completed buffer. Only valid after [`finish`](Self::finish) or
    /// [`finish_size_prefixed`](Self::finish_size_prefixed).
    pub fn finished_data(&self) -> &[u8] {
        assert!(self.finished, "finished_data before finish");
        &self.buf[self.head..]
    }
}
