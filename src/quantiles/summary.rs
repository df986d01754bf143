use serde::{Deserialize, Serialize};

use crate::quantiles::compress::compress_entries;
use crate::quantiles::entries::{is_sorted_strict_by_value, BufferEntry, SummaryEntry};
use crate::quantiles::merges::merge_entry_lists;

/// An ε-approximate weighted-quantile summary.
///
/// A summary is a run of [`SummaryEntry`] values sorted strictly ascending
/// by value. The first entry's `min_rank` is 0 and the last entry's
/// `max_rank` equals the total weight; every rank query is answered within
/// the summary's [`approximation_error`](Summary::approximation_error)
/// fraction of total weight.
///
/// Summaries are value types: merging and compressing mutate `self`,
/// cloning deep-copies the entry list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    entries: Vec<SummaryEntry>,
}

impl Summary {
    pub fn new() -> Summary {
        Summary {
            entries: Vec::new(),
        }
    }

    /// Replace contents with exact rank bounds accumulated from a drained
    /// buffer list. The input is already sorted and coalesced, so this
    /// yields zero approximation error.
    pub(crate) fn build_from_buffer_entries(&mut self, buffer_entries: Vec<BufferEntry>) {
        self.entries.clear();
        self.entries.reserve(buffer_entries.len());
        let mut cum_weight = 0.0;
        for entry in buffer_entries {
            self.entries.push(SummaryEntry::new(
                entry.value,
                entry.weight,
                cum_weight,
                cum_weight + entry.weight,
            ));
            cum_weight += entry.weight;
        }
        debug_assert!(is_sorted_strict_by_value(&self.entries));
    }

    /// Replace contents with a copy of a pre-formed entry list.
    pub fn build_from_summary_entries(&mut self, entries: &[SummaryEntry]) {
        self.entries = entries.to_vec();
    }

    /// Merge `other` into self while keeping rank bounds valid for the
    /// combined total weight. Linear in the sum of both sizes.
    pub fn merge(&mut self, other: &Summary) {
        if other.entries.is_empty() {
            return;
        }
        if self.entries.is_empty() {
            self.build_from_summary_entries(&other.entries);
            return;
        }
        self.entries = merge_entry_lists(&self.entries, &other.entries);
        debug_assert!(is_sorted_strict_by_value(&self.entries));
    }

    /// Shrink to roughly `size_hint` entries. Adds at most
    /// `max(1/size_hint, min_eps)` to the approximation error; min, max and
    /// total weight are unchanged. No-op when already small enough.
    pub fn compress(&mut self, size_hint: usize, min_eps: f64) {
        compress_entries(&mut self.entries, size_hint, min_eps);
        debug_assert!(is_sorted_strict_by_value(&self.entries));
    }

    /// Emit `max(num_quantiles, 2) + 1` approximate quantile values in a
    /// single scan, or an empty vector for an empty summary.
    ///
    /// Querying n ranks one by one would cost O(n log size); instead the
    /// targets are visited in increasing order against a doubled rank
    /// (`min_rank + max_rank` is the doubled midpoint of an entry's rank
    /// interval, compared without division) so the cursor only ever moves
    /// forward.
    pub fn generate_quantiles(&self, num_quantiles: usize) -> Vec<f64> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let num_quantiles = num_quantiles.max(2);
        let size = self.entries.len();
        let total_weight = self.entries[size - 1].max_rank;

        let mut output = Vec::with_capacity(num_quantiles + 1);
        let mut cur_idx = 0usize;
        for rank in 0..=num_quantiles {
            let d2 = 2.0 * (rank as f64 * total_weight / num_quantiles as f64);
            let mut next_idx = cur_idx + 1;
            while next_idx < size
                && d2 >= self.entries[next_idx].min_rank + self.entries[next_idx].max_rank
            {
                next_idx += 1;
            }
            cur_idx = next_idx - 1;
            // Insertion order between the two straddling entries.
            if next_idx == size
                || d2 < self.entries[cur_idx].next_min_rank() + self.entries[next_idx].prev_max_rank()
            {
                output.push(self.entries[cur_idx].value);
            } else {
                output.push(self.entries[next_idx].value);
            }
        }
        output
    }

    /// Emit a sorted sample of boundary values covering the support.
    ///
    /// Unlike quantiles the boundaries need not be equi-ranked; a soft
    /// compress over a copy yields at least `num_boundaries` distinct values
    /// (capacity permitting) while keeping approximation bounds. The
    /// compression itself adds about `1/num_boundaries` of error, so exactly
    /// that much slack is allowed on top of the current error.
    pub fn generate_boundaries(&self, num_boundaries: usize) -> Vec<f64> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let mut compressed = Summary::new();
        compressed.build_from_summary_entries(&self.entries);
        let compression_eps = self.approximation_error() + 1.0 / num_boundaries as f64;
        compressed.compress(num_boundaries, compression_eps);
        compressed.entries.iter().map(|entry| entry.value).collect()
    }

    /// Worst-case rank error as a fraction of total weight: the widest rank
    /// slack either inside an entry or between two consecutive entries.
    pub fn approximation_error(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }

        let mut max_gap = 0.0f64;
        for w in self.entries.windows(2) {
            let cur = &w[1];
            let inner = cur.max_rank - cur.min_rank - cur.weight;
            let between = cur.prev_max_rank() - w[0].next_min_rank();
            max_gap = max_gap.max(inner).max(between);
        }
        max_gap / self.total_weight()
    }

    pub fn min_value(&self) -> f64 {
        self.entries.first().map_or(0.0, |entry| entry.value)
    }

    pub fn max_value(&self) -> f64 {
        self.entries.last().map_or(0.0, |entry| entry.value)
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.last().map_or(0.0, |entry| entry.max_rank)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read-only view of the entries, e.g. to feed a reducer stream.
    #[inline]
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }
}
