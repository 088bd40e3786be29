//! Tests for the generic table codec

use super::*;
use crate::format::{SIZE_UOFFSET, VTABLE_HEADER_BYTES};

fn single_field_buffer(value: i64) -> Vec<u8> {
    let mut b = TableBuilder::new();
    b.start_table(1);
    b.push_i64_slot(0, value, 0);
    let root = b.end_table();
    b.finish(root);
    b.finished_data().to_vec()
}

#[test]
fn scalar_slot_round_trips_through_root_view() {
    let data = single_field_buffer(-987_654_321);

    let view = TableView::root(&data).unwrap();
    assert_eq!(view.scalar_at::<i64>(0, 0).unwrap(), -987_654_321);
}

#[test]
fn default_valued_scalar_is_elided() {
    let mut b = TableBuilder::new();
    b.start_table(2);
    b.push_i64_slot(0, 42, 0);
    b.push_i32_slot(1, 0, 0);
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert!(view.is_present(0));
    assert!(!view.is_present(1), "default-valued slot SHOULD be absent");
    assert_eq!(view.scalar_at::<i32>(1, 0).unwrap(), 0);
}

#[test]
fn absent_scalar_decodes_to_caller_default() {
    let data = single_field_buffer(1);

    let view = TableView::root(&data).unwrap();
    assert_eq!(view.scalar_at::<i32>(7, -5).unwrap(), -5);
}

#[test]
fn trailing_absent_slots_are_trimmed_from_vtable() {
    let mut b = TableBuilder::new();
    b.start_table(5);
    b.push_i32_slot(0, 9, 0);
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert_eq!(view.vtable_entries(), 1);
    assert_eq!(view.scalar_at::<i64>(4, 0).unwrap(), 0);
}

#[test]
fn older_record_with_short_vtable_reads_as_defaults() {
    // Encoded against a two-field revision, decoded expecting more slots.
    let mut b = TableBuilder::new();
    b.start_table(2);
    b.push_i64_slot(0, 11, 0);
    b.push_i32_slot(1, 22, 0);
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert_eq!(view.scalar_at::<i64>(0, 0).unwrap(), 11);
    assert_eq!(view.scalar_at::<i32>(1, 0).unwrap(), 22);
    assert_eq!(view.scalar_at::<i64>(2, 0).unwrap(), 0);
    assert!(!view.is_present(3));
}

#[test]
fn string_payload_round_trips() {
    let mut b = TableBuilder::new();
    let s = b.create_string("hello, table");
    b.start_table(1);
    b.push_offset_slot(0, Some(s));
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert_eq!(view.str_at(0).unwrap(), Some("hello, table"));
}

#[test]
fn string_payload_is_nul_terminated_with_length_excluding_nul() {
    let mut b = TableBuilder::new();
    let s = b.create_string("abc");
    b.start_table(1);
    b.push_offset_slot(0, Some(s));
    let root = b.end_table();
    b.finish(root);

    let data = b.finished_data();
    let view = TableView::root(data).unwrap();
    let bytes = view.bytes_at(0).unwrap().unwrap();
    assert_eq!(bytes, b"abc");
    let end = bytes.as_ptr() as usize - data.as_ptr() as usize + bytes.len();
    assert_eq!(data[end], 0, "string SHOULD carry a NUL terminator");
}

#[test]
fn empty_string_and_empty_vector_are_present_not_absent() {
    let mut b = TableBuilder::new();
    let s = b.create_string("");
    let v = b.create_byte_vector(&[]);
    b.start_table(2);
    b.push_offset_slot(0, Some(s));
    b.push_offset_slot(1, Some(v));
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert_eq!(view.str_at(0).unwrap(), Some(""));
    assert_eq!(view.bytes_at(1).unwrap(), Some(&[][..]));
}

#[test]
fn byte_vector_round_trips() {
    let payload: Vec<u8> = (0..=255).collect();

    let mut b = TableBuilder::new();
    let v = b.create_byte_vector(&payload);
    b.start_table(1);
    b.push_offset_slot(0, Some(v));
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert_eq!(view.bytes_at(0).unwrap().unwrap(), payload.as_slice());
}

#[test]
fn absent_offset_slot_reads_as_none() {
    let mut b = TableBuilder::new();
    b.start_table(2);
    b.push_offset_slot(0, None);
    b.push_i32_slot(1, 3, 0);
    let root = b.end_table();
    b.finish(root);

    let view = TableView::root(b.finished_data()).unwrap();
    assert!(view.table_at(0).unwrap().is_none());
    assert!(view.str_at(0).unwrap().is_none());
    assert!(view.bytes_at(0).unwrap().is_none());
}

#[test]
fn nested_table_built_before_parent_round_trips() {
    let mut b = TableBuilder::new();
    b.start_table(1);
    b.push_i64_slot(0, 77, 0);
    let child = b.end_table();

    b.start_table(2);
    b.push_offset_slot(0, Some(child));
    b.push_i32_slot(1, 5, 0);
    let parent = b.end_table();
    b.finish(parent);

    let view = TableView::root(b.finished_data()).unwrap();
    let child_view = view.table_at(0).unwrap().unwrap();
    assert_eq!(child_view.scalar_at::<i64>(0, 0).unwrap(), 77);
    assert_eq!(view.scalar_at::<i32>(1, 0).unwrap(), 5);
}

#[test]
fn identical_vtables_are_shared_between_records() {
    let mut b = TableBuilder::new();
    b.start_table(1);
    b.push_i64_slot(0, 1, 0);
    let first = b.end_table();
    // Vtables are deduplicated by exact bytes, which requires both records
    // to start at the same alignment phase; this payload restores it.
    let spacer = b.create_byte_vector(&[0xaa, 0xbb]);
    b.start_table(1);
    b.push_i64_slot(0, 2, 0);
    let second = b.end_table();
    b.start_table(3);
    b.push_offset_slot(0, Some(first));
    b.push_offset_slot(1, Some(second));
    b.push_offset_slot(2, Some(spacer));
    let root = b.end_table();
    b.finish(root);

    let data = b.finished_data();
    let len = data.len();
    let vtable_pos = |rev: u32| {
        let pos = len - rev as usize;
        let so = i32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        (pos as i64 - so as i64) as usize
    };
    assert_eq!(
        vtable_pos(first.value()),
        vtable_pos(second.value()),
        "records with identical shape SHOULD share one vtable"
    );
}

#[test]
fn scalars_are_naturally_aligned_in_finished_buffer() {
    let mut b = TableBuilder::new();
    b.start_table(2);
    b.push_i8_slot(0, 1, 0);
    b.push_i64_slot(1, 2, 0);
    let root = b.end_table();
    b.finish(root);

    let data = b.finished_data();
    let view = TableView::root(data).unwrap();
    let at = view.field_offset(1).unwrap();
    assert_eq!(at % 8, 0, "i64 field SHOULD be 8-byte aligned");
    assert_eq!(data.len() % 8, 0, "buffer SHOULD pad to max alignment");
}

#[test]
fn slot_write_order_does_not_change_decoded_values() {
    let mut forward = TableBuilder::new();
    forward.start_table(3);
    forward.push_i64_slot(0, 10, 0);
    forward.push_i32_slot(1, 20, 0);
    forward.push_i64_slot(2, 30, 0);
    let root = forward.end_table();
    forward.finish(root);

    let mut reversed = TableBuilder::new();
    reversed.start_table(3);
    reversed.push_i64_slot(2, 30, 0);
    reversed.push_i32_slot(1, 20, 0);
    reversed.push_i64_slot(0, 10, 0);
    let root = reversed.end_table();
    reversed.finish(root);

    for data in [forward.finished_data(), reversed.finished_data()] {
        let view = TableView::root(data).unwrap();
        assert_eq!(view.scalar_at::<i64>(0, 0).unwrap(), 10);
        assert_eq!(view.scalar_at::<i32>(1, 0).unwrap(), 20);
        assert_eq!(view.scalar_at::<i64>(2, 0).unwrap(), 30);
    }
}

#[test]
fn size_prefix_counts_bytes_after_itself() {
    let mut b = TableBuilder::new();
    b.start_table(1);
    b.push_i64_slot(0, 6, 0);
    let root = b.end_table();
    b.finish_size_prefixed(root);

    let data = b.finished_data();
    let size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    assert_eq!(size + SIZE_UOFFSET, data.len());

    let view = TableView::size_prefixed_root(data).unwrap();
    assert_eq!(view.scalar_at::<i64>(0, 0).unwrap(), 6);
}

#[test]
fn reset_builder_produces_identical_bytes() {
    let mut b = TableBuilder::new();
    b.start_table(1);
    b.push_i64_slot(0, 123, 0);
    let root = b.end_table();
    b.finish(root);
    let first = b.finished_data().to_vec();

    b.reset();
    b.start_table(1);
    b.push_i64_slot(0, 123, 0);
    let root = b.end_table();
    b.finish(root);

    assert_eq!(b.finished_data(), first.as_slice());
}

#[test]
fn encoding_is_deterministic_across_builders() {
    let build = || {
        let mut b = TableBuilder::new();
        let s = b.create_string("det");
        b.start_table(2);
        b.push_i64_slot(0, 4, 0);
        b.push_offset_slot(1, Some(s));
        let root = b.end_table();
        b.finish(root);
        b.finished_data().to_vec()
    };
    assert_eq!(build(), build());
}

mod mutation_tests {
    use super::*;

    #[test]
    fn present_scalar_mutates_in_place_and_is_visible_to_fresh_view() {
        let mut data = single_field_buffer(42);

        let mut table = TableMut::root(&mut data).unwrap();
        assert!(table.mutate_scalar(0, 43i64).unwrap());

        let view = TableView::root(&data).unwrap();
        assert_eq!(view.scalar_at::<i64>(0, 0).unwrap(), 43);
    }

    #[test]
    fn elided_scalar_mutation_fails_and_leaves_buffer_unchanged() {
        let mut b = TableBuilder::new();
        b.start_table(2);
        b.push_i64_slot(0, 42, 0);
        b.push_i32_slot(1, 0, 0);
        let root = b.end_table();
        b.finish(root);
        let mut data = b.finished_data().to_vec();
        let before = data.clone();

        let mut table = TableMut::root(&mut data).unwrap();
        assert!(!table.mutate_scalar(1, 5i32).unwrap());
        assert_eq!(data, before);
    }

    #[test]
    fn mutation_reaches_nested_tables() {
        let mut b = TableBuilder::new();
        b.start_table(1);
        b.push_i64_slot(0, 1, 0);
        let child = b.end_table();
        b.start_table(1);
        b.push_offset_slot(0, Some(child));
        let root = b.end_table();
        b.finish(root);
        let mut data = b.finished_data().to_vec();

        let root = TableMut::root(&mut data).unwrap();
        let mut child = root.table_at(0).unwrap().unwrap();
        assert!(child.mutate_scalar(0, 9i64).unwrap());

        let view = TableView::root(&data).unwrap();
        let child = view.table_at(0).unwrap().unwrap();
        assert_eq!(child.scalar_at::<i64>(0, 0).unwrap(), 9);
    }
}

mod corrupt_buffer_tests {
    use super::*;

    #[test]
    fn empty_and_truncated_buffers_are_rejected() {
        assert!(TableView::root(&[]).is_err());
        assert!(TableView::root(&[1, 2]).is_err());
        assert!(TableView::size_prefixed_root(&[0, 0, 0]).is_err());
    }

    #[test]
    fn root_offset_past_end_is_rejected() {
        let data = 1000u32.to_le_bytes();
        assert!(TableView::root(&data).is_err());
    }

    #[test]
    fn vtable_position_out_of_range_is_rejected() {
        // Root at 4, soffset claims a vtable far before the buffer start.
        let mut data = Vec::new();
        data.extend(4u32.to_le_bytes());
        data.extend(1_000_000i32.to_le_bytes());
        assert!(TableView::root(&data).is_err());
    }

    #[test]
    fn vtable_length_smaller_than_header_is_rejected() {
        // Table at 4 pointing back to a "vtable" declaring 2 bytes.
        let mut data = Vec::new();
        data.extend(8u32.to_le_bytes());
        data.extend(2u16.to_le_bytes());
        data.extend(8u16.to_le_bytes());
        data.extend(4i32.to_le_bytes());
        assert!(TableView::root(&data).is_err());
    }

    #[test]
    fn table_body_past_end_is_rejected() {
        // Valid-shaped vtable whose declared table size overruns the buffer.
        let mut data = Vec::new();
        data.extend(8u32.to_le_bytes());
        data.extend(4u16.to_le_bytes());
        data.extend(200u16.to_le_bytes());
        data.extend(4i32.to_le_bytes());
        assert!(TableView::root(&data).is_err());
    }

    #[test]
    fn truncating_a_valid_buffer_fails_decode_not_panics() {
        let data = single_field_buffer(5);
        for cut in 0..data.len() {
            // Either constructing the view or reading the field must fail
            // cleanly once bytes are missing.
            if let Ok(view) = TableView::root(&data[..cut]) {
                let _ = view.scalar_at::<i64>(0, 0);
            }
        }
    }

    #[test]
    fn reference_past_end_is_rejected_at_access() {
        let mut b = TableBuilder::new();
        let s = b.create_string("x");
        b.start_table(1);
        b.push_offset_slot(0, Some(s));
        let root = b.end_table();
        b.finish(root);
        let mut data = b.finished_data().to_vec();

        let view = TableView::root(&data).unwrap();
        let at = view.field_offset(0).unwrap();
        // Overwrite the stored reference so it points past the buffer.
        data[at..at + 4].copy_from_slice(&(u32::MAX / 2).to_le_bytes());
        let view = TableView::root(&data).unwrap();
        assert!(view.str_at(0).is_err());
    }

    #[test]
    fn nesting_depth_limit_stops_recursive_buffers() {
        let mut b = TableBuilder::new();
        let mut child = None;
        for _ in 0..crate::format::MAX_NESTING_DEPTH + 1 {
            b.start_table(1);
            b.push_offset_slot(0, child);
            child = Some(b.end_table());
        }
        b.finish(child.unwrap());

        let mut view = TableView::root(b.finished_data()).unwrap();
        let mut result = Ok(());
        for _ in 0..crate::format::MAX_NESTING_DEPTH + 1 {
            match view.table_at(0) {
                Ok(Some(next)) => view = next,
                Ok(None) => break,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        assert!(result.is_err(), "descent SHOULD hit the depth limit");
    }
}

mod schema_tests {
    use super::*;

    #[test]
    fn schema_rejects_non_increasing_slots() {
        let fields = vec![
            FieldDef::new("a", 1, FieldType::I32),
            FieldDef::new("b", 1, FieldType::I32),
        ];
        assert!(TableSchema::new("Dup", fields).is_err());

        let fields = vec![
            FieldDef::new("a", 2, FieldType::I32),
            FieldDef::new("b", 0, FieldType::I32),
        ];
        assert!(TableSchema::new("Backwards", fields).is_err());
    }

    #[test]
    fn schema_allows_slot_gaps_and_counts_vtable_entries() {
        let schema = TableSchema::new(
            "Gappy",
            vec![
                FieldDef::new("a", 0, FieldType::I64),
                FieldDef::new("b", 4, FieldType::Str),
            ],
        )
        .unwrap();
        assert_eq!(schema.field_count(), 2);
        assert_eq!(schema.vtable_entries(), 5);
    }

    #[test]
    fn reference_kinds_store_a_uoffset_inline() {
        assert_eq!(FieldType::Str.inline_size(), SIZE_UOFFSET);
        assert_eq!(FieldType::Bytes.inline_size(), SIZE_UOFFSET);
        assert_eq!(FieldType::I16.inline_size(), 2);
        assert!(FieldType::Str.is_reference());
        assert!(!FieldType::F64.is_reference());
    }
}

mod verify_tests {
    use super::*;
    use crate::tables::verify::verify_root;

    fn two_field_schema() -> TableSchema {
        TableSchema::new(
            "Sample",
            vec![
                FieldDef::new("id", 0, FieldType::I64),
                FieldDef::new("name", 1, FieldType::Str),
            ],
        )
        .unwrap()
    }

    #[test]
    fn verifier_accepts_valid_and_sparse_buffers() {
        let schema = two_field_schema();

        let mut b = TableBuilder::new();
        let s = b.create_string("ok");
        b.start_table(2);
        b.push_i64_slot(0, 1, 0);
        b.push_offset_slot(1, Some(s));
        let root = b.end_table();
        b.finish(root);
        verify_root(b.finished_data(), &schema).unwrap();

        // All fields elided is still a valid record.
        let mut b = TableBuilder::new();
        b.start_table(2);
        let root = b.end_table();
        b.finish(root);
        verify_root(b.finished_data(), &schema).unwrap();
    }

    #[test]
    fn verifier_rejects_dangling_string_reference() {
        let schema = two_field_schema();

        let mut b = TableBuilder::new();
        let s = b.create_string("dangle");
        b.start_table(2);
        b.push_offset_slot(1, Some(s));
        let root = b.end_table();
        b.finish(root);
        let mut data = b.finished_data().to_vec();

        let view = TableView::root(&data).unwrap();
        let at = view.field_offset(1).unwrap();
        data[at..at + 4].copy_from_slice(&(u32::MAX / 2).to_le_bytes());
        assert!(verify_root(&data, &schema).is_err());
    }

    #[test]
    fn verifier_rejects_invalid_utf8_in_string_field() {
        let schema = two_field_schema();

        let mut b = TableBuilder::new();
        let s = b.create_byte_vector(&[0xff, 0xfe]);
        b.start_table(2);
        b.push_offset_slot(1, Some(s));
        let root = b.end_table();
        b.finish(root);
        assert!(verify_root(b.finished_data(), &schema).is_err());
    }
}

#[test]
fn vtable_wire_layout_matches_declared_format() {
    let data = single_field_buffer(1);
    let view = TableView::root(&data).unwrap();
    let pos = view.position();

    let so = i32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
    let vt = (pos as i64 - so as i64) as usize;
    let vt_len = u16::from_le_bytes([data[vt], data[vt + 1]]) as usize;
    let table_len = u16::from_le_bytes([data[vt + 2], data[vt + 3]]) as usize;
    let entry = u16::from_le_bytes([data[vt + 4], data[vt + 5]]) as usize;

    assert_eq!(vt_len, VTABLE_HEADER_BYTES + 2, "one slot entry");
    assert!(table_len >= 4 + 8, "soffset word plus the i64 value");
    assert_eq!(
        i64::from_le_bytes(data[pos + entry..pos + entry + 8].try_into().unwrap()),
        1
    );
}
