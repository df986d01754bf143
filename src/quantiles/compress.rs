//! Greedy bounded-error compression of a summary entry list.
//!
//! Contract:
//! - Input is sorted ascending by value with valid rank bounds.
//! - The first and last entries are always retained; kept entries keep their
//!   rank bounds unchanged, so any dropped neighbor stays representable
//!   within `eps_delta` of a retained one.
//! - With `size_hint = n` and an input larger than `n`, the output size
//!   lands in `[n, n + 2]` and the approximation error grows by at most
//!   `max(1/n, min_eps)`.

use crate::quantiles::entries::SummaryEntry;

pub fn compress_entries(entries: &mut Vec<SummaryEntry>, size_hint: usize, min_eps: f64) {
    let size_hint = size_hint.max(2);
    let len = entries.len();
    if len <= size_hint {
        return;
    }

    // Max rank gap tolerated between consecutive retained entries.
    let total_weight = entries[len - 1].max_rank;
    let eps_delta = total_weight * (1.0 / size_hint as f64).max(min_eps);

    // Credit accumulator: every admitted look-ahead step earns `size_hint`,
    // every kept entry costs the input size. Keeps the retained count close
    // to `size_hint` while the rank-gap test keeps the error bounded.
    let add_step = len as i64;
    let mut add_accumulator: i64 = 0;

    let mut wi = 1usize;
    let mut li = wi;
    let mut ri = 0usize;
    while ri + 1 != len {
        let mut ni = ri + 1;
        while ni != len
            && add_accumulator < add_step
            && entries[ni].prev_max_rank() - entries[ri].next_min_rank() <= eps_delta
        {
            add_accumulator += size_hint as i64;
            ni += 1;
        }
        // A stalled look-ahead steps one entry forward; otherwise jump to
        // the last entry of the admitted run.
        ri = if ri == ni - 1 { ri + 1 } else { ni - 1 };
        entries[wi] = entries[ri];
        wi += 1;
        li = ri;
        add_accumulator -= add_step;
    }

    if li + 1 != len {
        entries[wi] = entries[len - 1];
        wi += 1;
    }
    entries.truncate(wi);
}
