//! Fuzz testing for buffer decoding.
//!
//! This fuzz target feeds arbitrary bytes to every root constructor and
//! accessor to ensure corrupt input always surfaces as an error, never as a
//! panic or out-of-bounds read.

#![no_main]

use libfuzzer_sys::fuzz_target;

use tablebuf::messages::replica_progress::ReplicaProgress;
use tablebuf::messages::seal_ranges::{self, SealRangesResult};
use tablebuf::tables::verify_root;
use tablebuf::TableView;

fuzz_target!(|data: &[u8]| {
    if let Ok(view) = TableView::root(data) {
        for slot in 0..8u16 {
            let _ = view.scalar_at::<i64>(slot, 0);
            let _ = view.str_at(slot);
            let _ = view.bytes_at(slot);
            if let Ok(Some(child)) = view.table_at(slot) {
                let _ = child.scalar_at::<i32>(0, 0);
            }
        }
    }

    let _ = TableView::size_prefixed_root(data);

    if let Ok(view) = ReplicaProgress::root(data) {
        let _ = view.unpack();
    }

    if let Ok(view) = SealRangesResult::root(data) {
        let _ = view.unpack();
    }

    if let Ok(schema) = seal_ranges::schema() {
        let _ = verify_root(data, &schema);
    }
});
