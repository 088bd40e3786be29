//! # Generic Table Codec
//!
//! This module implements the schema-driven table codec: one builder/view
//! pair that every concrete record type is a thin wrapper over.
//!
//! ## Record Binary Layout
//!
//! ```text
//!            soffset
//!          +---------+
//!          |         |
//!          v         |
//! +--------+------+--+-----+----------------+
//! | vtable bytes  | table  | field values   |
//! | [len][sz][..] | start  | (append order) |
//! +---------------+--------+----------------+
//! ```
//!
//! A table starts with a signed offset to its vtable. The vtable maps field
//! slots to byte offsets within the table body; entry 0 marks an elided
//! field. Scalars are stored inline; reference fields store a forward
//! uoffset to a child table, string, or byte vector built earlier in the
//! buffer.
//!
//! ## Why Elision Is a Contract
//!
//! A field whose value equals its schema default is not written at all. The
//! decoder must treat "absent" exactly as "default", which is what makes
//! records sparse and lets new schema revisions append fields without
//! breaking old buffers.
//!
//! ## Module Structure
//!
//! - `types`: field type kinds and the `Scalar` encode/decode trait
//! - `schema`: runtime table schemas with stable slot numbers
//! - `builder`: back-to-front buffer construction with vtable dedup
//! - `view`: zero-copy bounds-checked read access, in-place scalar mutation
//! - `verify`: schema-driven structural validation of untrusted buffers

pub mod builder;
pub mod schema;
pub mod types;
pub mod verify;
pub mod view;

#[cfg(test)]
mod tests;

pub use builder::{TableBuilder, WipOffset};
pub use schema::{FieldDef, FieldType, TableSchema};
pub use types::Scalar;
pub use verify::verify_root;
pub use view::{TableMut, TableView};
