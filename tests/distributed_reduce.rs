//! Worker/reducer aggregation: per-shard streams at ε/2 feed their final
//! summaries into one reducer stream at ε.

use gk_quantiles::quantiles::test_helpers::{assert_abs_close, assert_monotone_chain};
use gk_quantiles::quantiles::{Stream, Summary, SummaryEntry};

const EPS: f64 = 0.01;
const NUM_WORKERS: u64 = 10;
const SHARD_SIZE: u64 = 1 << 13;

/// Each worker sees a disjoint contiguous shard of the uniform grid
/// `i / N` for i in 0..N, all with unit weight.
fn worker_summary(worker_id: u64) -> Summary {
    let max_elements = NUM_WORKERS * SHARD_SIZE;
    let mut stream = Stream::new(EPS / 2.0, max_elements).expect("worker stream");
    let start = worker_id * SHARD_SIZE;
    for i in start..start + SHARD_SIZE {
        let x = i as f64 / max_elements as f64;
        stream.push(x, 1.0).expect("worker push");
    }
    stream.finalize().expect("worker finalize");
    stream.final_summary().expect("worker summary").clone()
}

fn check_reducer(worker_order: impl Iterator<Item = u64>) {
    let max_elements = NUM_WORKERS * SHARD_SIZE;
    let mut reducer = Stream::new(EPS, max_elements).expect("reducer stream");
    for worker_id in worker_order {
        let summary = worker_summary(worker_id);
        reducer
            .push_summary(summary.entries())
            .expect("push summary");
    }
    reducer.finalize().expect("reducer finalize");

    let err = reducer
        .approximation_error(Some(0))
        .expect("approximation error");
    assert!(err <= EPS, "reducer error {err} exceeds eps {EPS}");

    let summary = reducer.final_summary().expect("reducer summary");
    assert_abs_close(
        "total weight",
        max_elements as f64,
        summary.total_weight(),
        1e-6,
    );

    let quantiles = reducer.generate_quantiles(10).expect("quantiles");
    assert_monotone_chain("quantiles", &quantiles);
    for (k, q) in quantiles.iter().enumerate() {
        // Rank error eps maps to about eps in value on the uniform grid;
        // allow a little slack for the grid discretization.
        assert_abs_close(&format!("quantile {k}"), k as f64 / 10.0, *q, 1.5 * EPS);
    }
}

#[test]
fn reduce_in_shard_order() {
    check_reducer(0..NUM_WORKERS);
}

#[test]
fn reduce_in_reverse_order() {
    check_reducer((0..NUM_WORKERS).rev());
}

#[test]
fn reduce_interleaved_order() {
    let order = (0..NUM_WORKERS / 2)
        .flat_map(|i| [i, NUM_WORKERS - 1 - i])
        .collect::<Vec<_>>();
    check_reducer(order.into_iter());
}

/// Summaries ship between processes as plain entry lists; a serde round
/// trip must reproduce them bit for bit.
#[test]
fn shipped_entries_round_trip() {
    let summary = worker_summary(3);
    let entries: Vec<SummaryEntry> = summary.entries().to_vec();

    let bytes = bincode::serialize(&entries).expect("serialize entries");
    let decoded: Vec<SummaryEntry> = bincode::deserialize(&bytes).expect("deserialize entries");
    assert_eq!(decoded, entries);

    // The whole summary round-trips too.
    let bytes = bincode::serialize(&summary).expect("serialize summary");
    let decoded: Summary = bincode::deserialize(&bytes).expect("deserialize summary");
    assert_eq!(decoded, summary);

    // A reducer fed the decoded entries behaves like one fed the original.
    let mut reducer = Stream::new(EPS, NUM_WORKERS * SHARD_SIZE).expect("reducer");
    reducer.push_summary(decoded.entries()).expect("push decoded");
    reducer.finalize().expect("finalize");
    assert_abs_close(
        "shard weight",
        SHARD_SIZE as f64,
        reducer
            .final_summary()
            .expect("final summary")
            .total_weight(),
        1e-6,
    );
}
