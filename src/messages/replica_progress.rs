//! # ReplicaProgress
//!
//! Per-replica replication progress report: which stream, which range, and
//! the highest offset the replica has confirmed durable.
//!
//! | Field          | Type | Slot | Default |
//! |----------------|------|------|---------|
//! | stream_id      | i64  | 0    | 0       |
//! | range_index    | i32  | 1    | 0       |
//! | confirm_offset | i64  | 2    | 0       |

use eyre::Result;

use crate::tables::builder::{TableBuilder, WipOffset};
use crate::tables::schema::{FieldDef, FieldType, TableSchema};
use crate::tables::view::{TableMut, TableView};

const STREAM_ID: u16 = 0;
const RANGE_INDEX: u16 = 1;
const CONFIRM_OFFSET: u16 = 2;
const FIELD_COUNT: u16 = 3;

/// Zero-copy view of an encoded `ReplicaProgress` record.
#[derive(Debug, Clone, Copy)]
pub struct ReplicaProgress<'a> {
    table: TableView<'a>,
}

impl<'a> ReplicaProgress<'a> {
    pub fn root(buf: &'a [u8]) -> Result<Self> {
        Ok(Self {
            table: TableView::root(buf)?,
        })
    }

    pub fn size_prefixed_root(buf: &'a [u8]) -> Result<Self> {
        Ok(Self {
            table: TableView::size_prefixed_root(buf)?,
        })
    }

    pub fn from_table(table: TableView<'a>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> TableView<'a> {
        self.table
    }

    pub fn stream_id(&self) -> Result<i64> {
        self.table.scalar_at(STREAM_ID, 0)
    }

    pub fn range_index(&self) -> Result<i32> {
        self.table.scalar_at(RANGE_INDEX, 0)
    }

    pub fn confirm_offset(&self) -> Result<i64> {
        self.table.scalar_at(CONFIRM_OFFSET, 0)
    }

    /// Deep-copies the record into an owned projection.
    pub fn unpack(&self) -> Result<ReplicaProgressT> {
        let mut t = ReplicaProgressT::default();
        self.unpack_to(&mut t)?;
        Ok(t)
    }

    pub fn unpack_to(&self, t: &mut ReplicaProgressT) -> Result<()> {
        t.stream_id = self.stream_id()?;
        t.range_index = self.range_index()?;
        t.confirm_offset = self.confirm_offset()?;
        Ok(())
    }
}

/// Mutable view over an encoded `ReplicaProgress` record.
///
/// Each mutator returns `Ok(false)` when the field was elided at encode
/// time; see [`TableMut`] for the partial-mutability contract.
#[derive(Debug)]
pub struct ReplicaProgressMut<'a> {
    table: TableMut<'a>,
}

impl<'a> ReplicaProgressMut<'a> {
    pub fn root(buf: &'a mut [u8]) -> Result<Self> {
        Ok(Self {
            table: TableMut::root(buf)?,
        })
    }

    pub fn size_prefixed_root(buf: &'a mut [u8]) -> Result<Self> {
        Ok(Self {
            table: TableMut::size_prefixed_root(buf)?,
        })
    }

    pub fn mutate_stream_id(&mut self, value: i64) -> Result<bool> {
        self.table.mutate_scalar(STREAM_ID, value)
    }

    pub fn mutate_range_index(&mut self, value: i32) -> Result<bool> {
        self.table.mutate_scalar(RANGE_INDEX, value)
    }

    pub fn mutate_confirm_offset(&mut self, value: i64) -> Result<bool> {
        self.table.mutate_scalar(CONFIRM_OFFSET, value)
    }
}

/// Owned, buffer-independent projection of a `ReplicaProgress` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicaProgressT {
    pub stream_id: i64,
    pub range_index: i32,
    pub confirm_offset: i64,
}

impl ReplicaProgressT {
    /// Encodes the projection, eliding fields equal to their default.
    pub fn pack(&self, builder: &mut TableBuilder) -> WipOffset {
        builder.start_table(FIELD_COUNT);
        builder.push_i64_slot(STREAM_ID, self.stream_id, 0);
        builder.push_i32_slot(RANGE_INDEX, self.range_index, 0);
        builder.push_i64_slot(CONFIRM_OFFSET, self.confirm_offset, 0);
        builder.end_table()
    }
}

/// Runtime schema, for structural verification and introspection.
pub fn schema() -> Result<TableSchema> {
    TableSchema::new(
        "ReplicaProgress",
        vec![
            FieldDef::new("stream_id", STREAM_ID, FieldType::I64),
            FieldDef::new("range_index", RANGE_INDEX, FieldType::I32),
            FieldDef::new("confirm_offset", CONFIRM_OFFSET, FieldType::I64),
        ],
    )
}
