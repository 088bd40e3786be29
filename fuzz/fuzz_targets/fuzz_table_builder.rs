//! Fuzz testing for builder round trips.
//!
//! This fuzz target builds projections from arbitrary field values, packs
//! them, and requires decode to reproduce the projection exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tablebuf::messages::replica_progress::{ReplicaProgress, ReplicaProgressT};
use tablebuf::messages::seal_ranges::{
    RangeT, SealRangesResult, SealRangesResultT, StatusT,
};
use tablebuf::TableBuilder;

#[derive(Debug, Arbitrary)]
struct Input {
    progress: FuzzProgress,
    result: FuzzResult,
    size_prefixed: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzProgress {
    stream_id: i64,
    range_index: i32,
    confirm_offset: i64,
}

#[derive(Debug, Arbitrary)]
struct FuzzResult {
    status: Option<(i16, Option<String>, Option<Vec<u8>>)>,
    range: Option<(i64, i32, i64, i64)>,
}

fuzz_target!(|input: Input| {
    let progress = ReplicaProgressT {
        stream_id: input.progress.stream_id,
        range_index: input.progress.range_index,
        confirm_offset: input.progress.confirm_offset,
    };
    let mut builder = TableBuilder::new();
    let root = progress.pack(&mut builder);
    let view = if input.size_prefixed {
        builder.finish_size_prefixed(root);
        ReplicaProgress::size_prefixed_root(builder.finished_data())
    } else {
        builder.finish(root);
        ReplicaProgress::root(builder.finished_data())
    };
    assert_eq!(view.unwrap().unpack().unwrap(), progress);

    let result = SealRangesResultT {
        status: input
            .result
            .status
            .map(|(code, message, detail)| StatusT {
                code,
                message,
                detail,
            }),
        range: input.result.range.map(|(stream_id, index, start, end)| RangeT {
            stream_id,
            index,
            start,
            end,
        }),
    };
    let mut builder = TableBuilder::new();
    let root = result.pack(&mut builder);
    builder.finish(root);
    let view = SealRangesResult::root(builder.finished_data()).unwrap();
    assert_eq!(view.unpack().unwrap(), result);
});
