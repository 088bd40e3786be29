//! # Table Schema Definition
//!
//! A [`TableSchema`] is the ordered field list of one table type: each field
//! has a name, a wire type, and a stable numeric slot assigned when the
//! schema was defined. Slots are the compatibility contract - new fields
//! append new slots, existing slots are never renumbered or reordered, so a
//! buffer encoded against an older revision still decodes (missing slots
//! resolve to defaults).
//!
//! Schemas are not consulted on the hot encode/decode path; typed wrappers
//! bake slot numbers and defaults into their accessors. The runtime schema
//! exists for structural verification of untrusted buffers and for tooling
//! that needs to introspect a table type.

use eyre::{ensure, Result};

/// Wire type of one table field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Forward reference to a length-prefixed UTF-8 string.
    Str,
    /// Forward reference to a length-prefixed byte vector.
    Bytes,
    /// Forward reference to a nested table with its own schema.
    Table(Box<TableSchema>),
}

impl FieldType {
    /// Inline width of the field within a table body. Reference kinds store
    /// a uoffset.
    pub fn inline_size(&self) -> usize {
        match self {
            FieldType::Bool | FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32 | FieldType::U32 | FieldType::F32 => 4,
            FieldType::I64 | FieldType::U64 | FieldType::F64 => 8,
            FieldType::Str | FieldType::Bytes | FieldType::Table(_) => {
                crate::format::SIZE_UOFFSET
            }
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldType::Str | FieldType::Bytes | FieldType::Table(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub slot: u16,
    pub ty: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, slot: u16, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            slot,
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl TableSchema {
    /// Builds a schema, rejecting slot numbers that are not strictly
    /// increasing. Gaps are allowed: a removed-in-spirit field keeps its
    /// slot reserved forever.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self> {
        let name = name.into();
        for pair in fields.windows(2) {
            ensure!(
                pair[0].slot < pair[1].slot,
                "schema {}: field {} slot {} not above preceding slot {}",
                name,
                pair[1].name,
                pair[1].slot,
                pair[0].slot
            );
        }
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of vtable entries a fully-populated record of this schema
    /// carries: highest slot plus one.
    pub fn vtable_entries(&self) -> usize {
        self.fields.last().map_or(0, |f| f.slot as usize + 1)
    }

    pub fn field(&self, idx: usize) -> Option<&FieldDef> {
        self.fields.get(idx)
    }
}
