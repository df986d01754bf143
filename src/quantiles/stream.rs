use crate::error::{QuantileError, QuantileResult};
use crate::quantiles::buffer::Buffer;
use crate::quantiles::entries::SummaryEntry;
use crate::quantiles::summary::Summary;

/// Streaming front-end of the weighted-quantile sketch.
///
/// A stream owns one raw-entry buffer, a scratch local [`Summary`] and a
/// stack of per-level summaries. Every time the buffer fills, its contents
/// become a compressed summary that cascades bottom-up through the stack:
/// level ℓ holds at most 2^ℓ buffer-loads' worth of data. `finalize`
/// collapses the stack into one terminal summary, after which only queries
/// are accepted.
///
/// NaN values or weights are not rejected, but their ordering is undefined;
/// callers should filter them out beforehand.
#[derive(Debug, Clone)]
pub struct Stream {
    eps: f64,
    max_levels: usize,
    block_size: usize,
    buffer: Buffer,
    local_summary: Summary,
    summary_levels: Vec<Summary>,
    finalized: bool,
}

impl Stream {
    /// Create a stream targeting approximation error `eps` for up to
    /// `max_elements` observations. `max_elements` is a sizing hint, not a
    /// hard cap; pushing more data keeps working at a slight error penalty.
    pub fn new(eps: f64, max_elements: u64) -> QuantileResult<Stream> {
        if eps <= 0.0 {
            return Err(QuantileError::InvalidArgument {
                context: "eps must be > 0",
            });
        }

        let (max_levels, block_size) = quantile_specs(eps, max_elements)?;
        let buffer = Buffer::new(block_size as u64, max_elements)?;

        Ok(Stream {
            eps,
            max_levels,
            block_size,
            buffer,
            local_summary: Summary::new(),
            summary_levels: Vec::new(),
            finalized: false,
        })
    }

    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of populated levels in the merge-tree spine.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.summary_levels.len()
    }

    /// Push one weighted observation. Observations with weight ≤ 0 are
    /// silently dropped.
    pub fn push(&mut self, value: f64, weight: f64) -> QuantileResult<()> {
        if self.finalized {
            return Err(QuantileError::InvalidState {
                context: "push after finalize",
            });
        }

        self.buffer.push(value, weight)?;
        if self.buffer.is_full() {
            self.push_buffer()?;
        }
        Ok(())
    }

    fn push_buffer(&mut self) -> QuantileResult<()> {
        if self.finalized {
            return Err(QuantileError::InvalidState {
                context: "buffer flush after finalize",
            });
        }
        let list = self.buffer.generate_entry_list();
        self.local_summary.build_from_buffer_entries(list);
        self.local_summary.compress(self.block_size, self.eps);
        self.propagate_local_summary()
    }

    /// Push a whole pre-built summary, e.g. a worker's final summary during
    /// a distributed reduce.
    ///
    /// The entries are deliberately not compressed here: they arrive at the
    /// sender's error level (ε/2 or better by contract) and this stream's
    /// own propagation spends the remaining error budget.
    pub fn push_summary(&mut self, entries: &[SummaryEntry]) -> QuantileResult<()> {
        if self.finalized {
            return Err(QuantileError::InvalidState {
                context: "push_summary after finalize",
            });
        }
        self.local_summary.build_from_summary_entries(entries);
        self.propagate_local_summary()
    }

    /// Cascade the local summary bottom-up through the level stack.
    ///
    /// At each level the existing summary is absorbed into the local one.
    /// The cascade settles as soon as it finds an empty slot or the merged
    /// result is small enough to stay; otherwise the result is compressed,
    /// the slot cleared, and the cascade continues one level up.
    fn propagate_local_summary(&mut self) -> QuantileResult<()> {
        if self.finalized {
            return Err(QuantileError::InvalidState {
                context: "propagate after finalize",
            });
        }
        if self.local_summary.is_empty() {
            return Ok(());
        }

        let mut level = 0usize;
        loop {
            if self.summary_levels.len() <= level {
                self.summary_levels.push(Summary::new());
            }

            self.local_summary.merge(&self.summary_levels[level]);

            if self.summary_levels[level].is_empty()
                || self.local_summary.size() <= self.block_size + 1
            {
                self.summary_levels[level] = std::mem::take(&mut self.local_summary);
                return Ok(());
            }

            self.local_summary.compress(self.block_size, self.eps);
            self.summary_levels[level].clear();
            level += 1;
        }
    }

    /// Flush any buffered observations and collapse all levels into the
    /// terminal summary. After this only queries are accepted.
    pub fn finalize(&mut self) -> QuantileResult<()> {
        if self.finalized {
            return Err(QuantileError::InvalidState {
                context: "finalize called twice",
            });
        }

        // Flush whatever remains in the buffer, full or not.
        self.push_buffer()?;

        self.local_summary.clear();
        let levels = std::mem::take(&mut self.summary_levels);
        for summary in &levels {
            self.local_summary.merge(summary);
        }

        self.finalized = true;
        Ok(())
    }

    /// Generate `max(num_quantiles, 2) + 1` approximate quantile values.
    /// The result can be searched with a binary search to bucket a value.
    pub fn generate_quantiles(&self, num_quantiles: usize) -> QuantileResult<Vec<f64>> {
        if !self.finalized {
            return Err(QuantileError::InvalidState {
                context: "generate_quantiles before finalize",
            });
        }
        Ok(self.local_summary.generate_quantiles(num_quantiles))
    }

    /// Generate a representative sample of boundary values. Boundaries keep
    /// the approximation bounds but are not necessarily equi-ranked; prefer
    /// them when bucket coverage matters more than the quantile positions.
    pub fn generate_boundaries(&self, num_boundaries: usize) -> QuantileResult<Vec<f64>> {
        if !self.finalized {
            return Err(QuantileError::InvalidState {
                context: "generate_boundaries before finalize",
            });
        }
        Ok(self.local_summary.generate_boundaries(num_boundaries))
    }

    /// Approximation error of one level, or of the terminal summary once
    /// finalized. `None` selects the top-most level, which dominates all
    /// lower ones by construction.
    pub fn approximation_error(&self, level: Option<usize>) -> QuantileResult<f64> {
        if self.finalized {
            if matches!(level, Some(l) if l > 0) {
                return Err(QuantileError::InvalidState {
                    context: "only the overall error is available after finalize",
                });
            }
            return Ok(self.local_summary.approximation_error());
        }

        if self.summary_levels.is_empty() {
            // Raw buffer contents carry no approximation error yet.
            return Ok(0.0);
        }

        let level = level.unwrap_or(self.summary_levels.len() - 1);
        let summary = self
            .summary_levels
            .get(level)
            .ok_or(QuantileError::InvalidState {
                context: "level out of range",
            })?;
        Ok(summary.approximation_error())
    }

    /// Read-only view of the terminal summary.
    pub fn final_summary(&self) -> QuantileResult<&Summary> {
        if !self.finalized {
            return Err(QuantileError::InvalidState {
                context: "final_summary before finalize",
            });
        }
        Ok(&self.local_summary)
    }

    /// Quantiles of the data seen so far, without finalizing this stream.
    /// Works on a deep clone, so the stream keeps accepting pushes.
    pub fn quick_quantiles(&self, num_quantiles: usize) -> QuantileResult<Vec<f64>> {
        let mut snapshot = self.clone();
        snapshot.finalize()?;
        snapshot.generate_quantiles(num_quantiles)
    }
}

/// Given the target approximation error and an upper bound on the number of
/// observations, jointly solve for the smallest level count and block size.
///
/// The bottom buffer overflows at most `max_elements / block_size` times,
/// level ℓ at most `max_elements / (2^ℓ · block_size)` times, and the top
/// level at most once, i.e. `2^max_levels · block_size ≥ max_elements`. The
/// level count is grown one at a time with the block size re-derived as
/// `⌈max_levels/eps⌉ + 1` until the inequality holds; solving in closed form
/// instead tends to over-provision.
pub(crate) fn quantile_specs(eps: f64, max_elements: u64) -> QuantileResult<(usize, usize)> {
    if !(0.0..1.0).contains(&eps) {
        return Err(QuantileError::InvalidArgument {
            context: "eps must lie in [0, 1)",
        });
    }
    if max_elements == 0 {
        return Err(QuantileError::InvalidArgument {
            context: "max_elements must be > 0",
        });
    }

    let mut max_levels: u64 = 1;
    let mut block_size: u64 = 2;
    if eps <= f64::MIN_POSITIVE {
        // Exact quantile computation at the expense of RAM.
        block_size = max_elements.max(2);
    } else {
        while (1u64 << max_levels).saturating_mul(block_size) < max_elements {
            block_size = (max_levels as f64 / eps).ceil() as u64 + 1;
            max_levels += 1;
        }
    }
    Ok((max_levels as usize, block_size.max(2) as usize))
}
