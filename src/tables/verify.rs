//! # Structural Buffer Verification
//!
//! This module walks an untrusted buffer against a [`TableSchema`] and
//! rejects anything malformed before application code touches it: root and
//! vtable bounds, every present field's value range, string UTF-8 validity,
//! and nested tables recursively (depth-limited via the view layer).
//!
//! Verification is deliberately tolerant of *sparse* and *older* records:
//! absent slots and vtables shorter than the schema are valid - that is the
//! forward-compatibility contract. Extra slots beyond the schema (a newer
//! record) are ignored; their contents cannot be interpreted without the
//! newer schema.
//!
//! Per-accessor reads are already bounds-checked, so verification is
//! optional for trusted input; it exists to front-load the full structural
//! check when a buffer crosses a trust boundary.

use eyre::{ensure, Result};

use crate::tables::schema::{FieldType, TableSchema};
use crate::tables::view::TableView;

/// Verifies the root record of `buf` against `schema`.
pub fn verify_root(buf: &[u8], schema: &TableSchema) -> Result<()> {
    let view = TableView::root(buf)?;
    verify_table(&view, schema)
}

/// Verifies the root record of a size-prefixed buffer against `schema`.
pub fn verify_size_prefixed_root(buf: &[u8], schema: &TableSchema) -> Result<()> {
    let view = TableView::size_prefixed_root(buf)?;
    verify_table(&view, schema)
}

/// Verifies one record (and, recursively, its children) against `schema`.
pub fn verify_table(view: &TableView<'_>, schema: &TableSchema) -> Result<()> {
    for field in schema.fields() {
        match &field.ty {
            FieldType::Table(child) => {
                if let Some(nested) = view.table_at(field.slot)? {
                    verify_table(&nested, child)?;
                }
            }
            FieldType::Str => {
                view.str_at(field.slot)?;
            }
            FieldType::Bytes => {
                view.bytes_at(field.slot)?;
            }
            scalar => {
                if let Some(at) = view.field_offset(field.slot) {
                    ensure!(
                        at + scalar.inline_size() <= view.buffer().len(),
                        "corrupt buffer: {}.{} at {} past end {}",
                        schema.name(),
                        field.name,
                        at,
                        view.buffer().len()
                    );
                }
            }
        }
    }
    Ok(())
}
