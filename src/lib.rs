//! # tablebuf - Schema-Driven Binary Table Codec
//!
//! tablebuf encodes variable-shaped records into a single contiguous byte
//! buffer and reads them back without parsing the buffer up front. Records
//! are *tables*: schema-defined field sets where every field is optional on
//! the wire and addressed through a per-record vtable.
//!
//! ## Buffer Layout
//!
//! ```text
//! +--------------+=====================+==========+=============+
//! | root uoffset |  ... vtables ...    |  tables  | string/vec  |
//! | (u32, LE)    |  [len][size][slots] |  bodies  | payloads    |
//! +--------------+=====================+==========+=============+
//!  low addresses  ------------------------------->  high addresses
//! ```
//!
//! Buffers are built back-to-front: children are finished before their
//! parents, so every stored reference is a forward offset (toward higher
//! addresses). A table body starts with a signed offset to its vtable; the
//! vtable maps field slots to byte offsets within the body, with entry 0
//! meaning "field absent, use the schema default".
//!
//! ## Design Goals
//!
//! 1. **Zero-copy reads**: a [`TableView`] is a cursor (buffer + position),
//!    never a copy; getters return values or slices borrowed from the buffer
//! 2. **Sparse, versionable records**: fields equal to their default are
//!    elided; new fields append new slots without invalidating old buffers
//! 3. **Defined decode failures**: every offset dereference is bounds
//!    checked, so corrupt input yields an error instead of wild reads
//! 4. **One generic codec**: typed record wrappers in [`messages`] are thin
//!    shims over a single builder/view pair, not duplicated per-table logic
//!
//! ## Module Overview
//!
//! - [`format`]: wire constants and checked little-endian primitives
//! - [`tables`]: the generic codec - [`TableBuilder`], [`TableView`],
//!   [`TableMut`], [`TableSchema`], structural verification
//! - [`messages`]: concrete record types carried by the stream control
//!   plane (`ReplicaProgress`, `SealRangesResult` with nested `Status` and
//!   `Range`), each with a buffer-independent owned projection
//!
//! ## Quick Start
//!
//! ```
//! use tablebuf::messages::replica_progress::{ReplicaProgress, ReplicaProgressT};
//! use tablebuf::TableBuilder;
//!
//! let progress = ReplicaProgressT {
//!     stream_id: 42,
//!     range_index: 0,
//!     confirm_offset: 1000,
//! };
//!
//! let mut builder = TableBuilder::new();
//! let root = progress.pack(&mut builder);
//! builder.finish(root);
//!
//! let view = ReplicaProgress::root(builder.finished_data()).unwrap();
//! assert_eq!(view.stream_id().unwrap(), 42);
//! assert_eq!(view.unpack().unwrap(), progress);
//! ```
//!
//! ## Concurrency
//!
//! Encode and decode are pure, bounded-time transformations. A [`TableView`]
//! is `Copy` and safe to share across readers of an immutable buffer. A
//! [`TableMut`] takes an exclusive borrow, so in-place mutation cannot race
//! reads. Each encode uses its own [`TableBuilder`] (or a pooled one reset
//! between uses).

#[macro_use]
mod macros;

pub mod format;
pub mod messages;
pub mod tables;

pub use tables::builder::{TableBuilder, WipOffset};
pub use tables::schema::{FieldDef, FieldType, TableSchema};
pub use tables::view::{TableMut, TableView};
