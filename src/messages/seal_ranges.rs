//! # SealRangesResult
//!
//! Outcome of a range-seal request: an optional `Status` (error code,
//! message, opaque detail) and the sealed `Range` as the control plane now
//! sees it. Both children are optional on the wire; an absent child encodes
//! as a zero vtable entry, never as a crash.
//!
//! | Table            | Field     | Type   | Slot | Default |
//! |------------------|-----------|--------|------|---------|
//! | Status           | code      | i16    | 0    | 0       |
//! |                  | message   | string | 1    | absent  |
//! |                  | detail    | bytes  | 2    | absent  |
//! | Range            | stream_id | i64    | 0    | 0       |
//! |                  | index     | i32    | 1    | 0       |
//! |                  | start     | i64    | 2    | 0       |
//! |                  | end       | i64    | 3    | 0       |
//! | SealRangesResult | status    | Status | 0    | absent  |
//! |                  | range     | Range  | 1    | absent  |

use eyre::Result;

use crate::tables::builder::{TableBuilder, WipOffset};
use crate::tables::schema::{FieldDef, FieldType, TableSchema};
use crate::tables::view::{TableMut, TableView};

const STATUS_CODE: u16 = 0;
const STATUS_MESSAGE: u16 = 1;
const STATUS_DETAIL: u16 = 2;
const STATUS_FIELDS: u16 = 3;

const RANGE_STREAM_ID: u16 = 0;
const RANGE_INDEX: u16 = 1;
const RANGE_START: u16 = 2;
const RANGE_END: u16 = 3;
const RANGE_FIELDS: u16 = 4;

const RESULT_STATUS: u16 = 0;
const RESULT_RANGE: u16 = 1;
const RESULT_FIELDS: u16 = 2;

/// Zero-copy view of an encoded `Status` record.
#[derive(Debug, Clone, Copy)]
pub struct Status<'a> {
    table: TableView<'a>,
}

impl<'a> Status<'a> {
    pub fn root(buf: &'a [u8]) -> Result<Self> {
        Ok(Self {
            table: TableView::root(buf)?,
        })
    }

    pub fn from_table(table: TableView<'a>) -> Self {
        Self { table }
    }

    pub fn code(&self) -> Result<i16> {
        self.table.scalar_at(STATUS_CODE, 0)
    }

    pub fn message(&self) -> Result<Option<&'a str>> {
        self.table.str_at(STATUS_MESSAGE)
    }

    pub fn detail(&self) -> Result<Option<&'a [u8]>> {
        self.table.bytes_at(STATUS_DETAIL)
    }

    pub fn unpack(&self) -> Result<StatusT> {
        Ok(StatusT {
            code: self.code()?,
            message: self.message()?.map(str::to_owned),
            detail: self.detail()?.map(<[u8]>::to_vec),
        })
    }
}

/// Zero-copy view of an encoded `Range` record.
#[derive(Debug, Clone, Copy)]
pub struct Range<'a> {
    table: TableView<'a>,
}

impl<'a> Range<'a> {
    pub fn root(buf: &'a [u8]) -> Result<Self> {
        Ok(Self {
            table: TableView::root(buf)?,
        })
    }

    pub fn from_table(table: TableView<'a>) -> Self {
        Self { table }
    }

    pub fn stream_id(&self) -> Result<i64> {
        self.table.scalar_at(RANGE_STREAM_ID, 0)
    }

    pub fn index(&self) -> Result<i32> {
        self.table.scalar_at(RANGE_INDEX, 0)
    }

    pub fn start(&self) -> Result<i64> {
        self.table.scalar_at(RANGE_START, 0)
    }

    pub fn end(&self) -> Result<i64> {
        self.table.scalar_at(RANGE_END, 0)
    }

    pub fn unpack(&self) -> Result<RangeT> {
        Ok(RangeT {
            stream_id: self.stream_id()?,
            index: self.index()?,
            start: self.start()?,
            end: self.end()?,
        })
    }
}

/// Mutable view over an encoded `Range` record.
#[derive(Debug)]
pub struct RangeMut<'a> {
    table: TableMut<'a>,
}

impl<'a> RangeMut<'a> {
    pub fn from_table(table: TableMut<'a>) -> Self {
        Self { table }
    }

    pub fn mutate_stream_id(&mut self, value: i64) -> Result<bool> {
        self.table.mutate_scalar(RANGE_STREAM_ID, value)
    }

    pub fn mutate_index(&mut self, value: i32) -> Result<bool> {
        self.table.mutate_scalar(RANGE_INDEX, value)
    }

    pub fn mutate_start(&mut self, value: i64) -> Result<bool> {
        self.table.mutate_scalar(RANGE_START, value)
    }

    pub fn mutate_end(&mut self, value: i64) -> Result<bool> {
        self.table.mutate_scalar(RANGE_END, value)
    }
}

/// Zero-copy view of an encoded `SealRangesResult` record.
#[derive(Debug, Clone, Copy)]
pub struct SealRangesResult<'a> {
    table: TableView<'a>,
}

impl<'a> SealRangesResult<'a> {
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

    pub fn status(&self) -> Result<Option<Status<'a>>> {
        Ok(self.table.table_at(RESULT_STATUS)?.map(Status::from_table))
    }

    pub fn range(&self) -> Result<Option<Range<'a>>> {
        Ok(self.table.table_at(RESULT_RANGE)?.map(Range::from_table))
    }

    /// Descends into the sealed range for in-place mutation.
    pub fn range_mut(buf: &mut [u8]) -> Result<Option<RangeMut<'_>>> {
        let root = TableMut::root(buf)?;
        Ok(root.table_at(RESULT_RANGE)?.map(RangeMut::from_table))
    }

    /// Deep-copies the record tree into owned projections; the result
    /// aliases no part of the buffer.
    pub fn unpack(&self) -> Result<SealRangesResultT> {
        let mut t = SealRangesResultT::default();
        self.unpack_to(&mut t)?;
        Ok(t)
    }

    pub fn unpack_to(&self, t: &mut SealRangesResultT) -> Result<()> {
        t.status = self.status()?.map(|s| s.unpack()).transpose()?;
        t.range = self.range()?.map(|r| r.unpack()).transpose()?;
        Ok(())
    }
}

/// Owned projection of a `Status` record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusT {
    pub code: i16,
    pub message: Option<String>,
    pub detail: Option<Vec<u8>>,
}

impl StatusT {
    pub fn pack(&self, builder: &mut TableBuilder) -> WipOffset {
        let message = self.message.as_deref().map(|m| builder.create_string(m));
        let detail = self
            .detail
            .as_deref()
            .map(|d| builder.create_byte_vector(d));
        builder.start_table(STATUS_FIELDS);
        builder.push_i16_slot(STATUS_CODE, self.code, 0);
        builder.push_offset_slot(STATUS_MESSAGE, message);
        builder.push_offset_slot(STATUS_DETAIL, detail);
        builder.end_table()
    }
}

/// Owned projection of a `Range` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeT {
    pub stream_id: i64,
    pub index: i32,
    pub start: i64,
    pub end: i64,
}

impl RangeT {
    pub fn pack(&self, builder: &mut TableBuilder) -> WipOffset {
        builder.start_table(RANGE_FIELDS);
        builder.push_i64_slot(RANGE_STREAM_ID, self.stream_id, 0);
        builder.push_i32_slot(RANGE_INDEX, self.index, 0);
        builder.push_i64_slot(RANGE_START, self.start, 0);
        builder.push_i64_slot(RANGE_END, self.end, 0);
        builder.end_table()
    }
}

/// Owned projection of a `SealRangesResult` record. Absent children stay
/// `None` through a pack/unpack round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealRangesResultT {
    pub status: Option<StatusT>,
    pub range: Option<RangeT>,
}

impl SealRangesResultT {
    /// Encodes the projection tree depth-first: children are fully built
    /// before the parent stores offsets to them. An absent child leaves its
    /// vtable entry at 0.
    pub fn pack(&self, builder: &mut TableBuilder) -> WipOffset {
        let status = self.status.as_ref().map(|s| s.pack(builder));
        let range = self.range.as_ref().map(|r| r.pack(builder));
        builder.start_table(RESULT_FIELDS);
        builder.push_offset_slot(RESULT_STATUS, status);
        builder.push_offset_slot(RESULT_RANGE, range);
        builder.end_table()
    }
}

pub fn status_schema() -> Result<TableSchema> {
    TableSchema::new(
        "Status",
        vec![
            FieldDef::new("code", STATUS_CODE, FieldType::I16),
            FieldDef::new("message", STATUS_MESSAGE, FieldType::Str),
            FieldDef::new("detail", STATUS_DETAIL, FieldType::Bytes),
        ],
    )
}

pub fn range_schema() -> Result<TableSchema> {
    TableSchema::new(
        "Range",
        vec![
            FieldDef::new("stream_id", RANGE_STREAM_ID, FieldType::I64),
            FieldDef::new("index", RANGE_INDEX, FieldType::I32),
            FieldDef::new("start", RANGE_START, FieldType::I64),
            FieldDef::new("end", RANGE_END, FieldType::I64),
        ],
    )
}

pub fn schema() -> Result<TableSchema> {
    TableSchema::new(
        "SealRangesResult",
        vec![
            FieldDef::new(
                "status",
                RESULT_STATUS,
                FieldType::Table(Box::new(status_schema()?)),
            ),
            FieldDef::new(
                "range",
                RESULT_RANGE,
                FieldType::Table(Box::new(range_schema()?)),
            ),
        ],
    )
}
