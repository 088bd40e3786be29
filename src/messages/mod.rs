//! # Concrete Message Tables
//!
//! Typed record types carried by the stream control plane, each a thin
//! wrapper over the generic codec in [`crate::tables`]. Every table comes in
//! three forms:
//!
//! - a zero-copy **view** (`ReplicaProgress<'a>`) over a finished buffer,
//!   with per-field accessors that substitute schema defaults for absent
//!   slots
//! - a **mutable view** (`ReplicaProgressMut<'a>`) for in-place scalar
//!   rewrites under the partial-mutability contract
//! - an owned **projection** (`ReplicaProgressT`) that aliases nothing,
//!   with `pack` (projection -> buffer) and `unpack` (view -> projection)
//!
//! Slot numbers are part of the wire contract and never change; see each
//! table's `schema()` for the authoritative field list.

pub mod replica_progress;
pub mod seal_ranges;

pub use replica_progress::{ReplicaProgress, ReplicaProgressMut, ReplicaProgressT};
pub use seal_ranges::{
    Range, RangeMut, RangeT, SealRangesResult, SealRangesResultT, Status, StatusT,
};
