use ordered_float::OrderedFloat;

use crate::error::{QuantileError, QuantileResult};
use crate::quantiles::entries::BufferEntry;

/// Fixed-capacity holder for raw weighted observations.
///
/// Entries accumulate in arrival order until the buffer reports full; a
/// drain sorts them ascending by value, coalesces runs of equal values by
/// weight addition, and leaves the buffer empty. Observations with
/// non-positive weight are dropped on push.
#[derive(Debug, Clone)]
pub struct Buffer {
    vec: Vec<BufferEntry>,
    max_size: usize,
}

impl Buffer {
    /// Capacity resolves to `min(block_size * 2, max_elements)` and must be
    /// positive.
    pub fn new(block_size: u64, max_elements: u64) -> QuantileResult<Buffer> {
        let max_size = block_size.saturating_mul(2).min(max_elements);
        if max_size == 0 {
            return Err(QuantileError::InvalidArgument {
                context: "buffer capacity resolved to zero",
            });
        }
        Ok(Buffer {
            vec: Vec::new(),
            max_size: max_size as usize,
        })
    }

    pub fn push(&mut self, value: f64, weight: f64) -> QuantileResult<()> {
        if self.is_full() {
            return Err(QuantileError::BufferFull {
                max_size: self.max_size,
            });
        }
        if weight > 0.0 {
            self.vec.push(BufferEntry { value, weight });
        }
        Ok(())
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.vec.len() >= self.max_size
    }

    /// Drain the buffer: sort ascending by value (total order, so NaN cannot
    /// panic), coalesce equal values, clear, and return the ordered list.
    ///
    /// Callers should minimize how often this runs, ideally only right after
    /// the buffer becomes full.
    pub fn generate_entry_list(&mut self) -> Vec<BufferEntry> {
        let mut drained = std::mem::take(&mut self.vec);
        drained.sort_by_key(|entry| OrderedFloat(entry.value));

        let mut out: Vec<BufferEntry> = Vec::with_capacity(drained.len());
        for entry in drained {
            match out.last_mut() {
                Some(last) if last.value == entry.value => last.weight += entry.weight,
                _ => out.push(entry),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_capacity_specs() {
        assert!(Buffer::new(2, 0).is_err());
        assert!(Buffer::new(0, 2).is_err());
    }

    #[test]
    fn push_below_capacity_drops_zero_weight() {
        let mut buf = Buffer::new(2, 100).expect("buffer");
        buf.push(5.0, 9.0).unwrap();
        buf.push(2.0, 3.0).unwrap();
        buf.push(-1.0, 7.0).unwrap();
        buf.push(3.0, 0.0).unwrap();

        assert!(!buf.is_full());
        assert_eq!(buf.vec.len(), 3);
    }

    #[test]
    fn drain_sorts_and_coalesces() {
        let mut buf = Buffer::new(2, 100).expect("buffer");
        buf.push(5.0, 9.0).unwrap();
        buf.push(2.0, 3.0).unwrap();
        buf.push(-1.0, 7.0).unwrap();
        buf.push(2.0, 1.0).unwrap();
        assert!(buf.is_full());

        let list = buf.generate_entry_list();
        let expected = vec![
            BufferEntry {
                value: -1.0,
                weight: 7.0,
            },
            BufferEntry {
                value: 2.0,
                weight: 4.0,
            },
            BufferEntry {
                value: 5.0,
                weight: 9.0,
            },
        ];
        assert_eq!(list, expected);

        // Drain empties the buffer, so further pushes succeed.
        assert!(buf.vec.is_empty());
        buf.push(6.0, 6.0).unwrap();
    }

    #[test]
    fn push_at_capacity_fails() {
        let mut buf = Buffer::new(2, 100).expect("buffer");
        buf.push(5.0, 9.0).unwrap();
        buf.push(2.0, 3.0).unwrap();
        buf.push(-1.0, 7.0).unwrap();
        buf.push(2.0, 1.0).unwrap();
        assert!(buf.is_full());

        assert_eq!(
            buf.push(6.0, 6.0),
            Err(QuantileError::BufferFull { max_size: 4 })
        );
        // A failed push leaves the contents untouched.
        assert_eq!(buf.vec.len(), 4);
    }

    #[test]
    fn drain_of_identical_values_yields_single_entry() {
        let mut buf = Buffer::new(4, 100).expect("buffer");
        for _ in 0..5 {
            buf.push(1.5, 2.0).unwrap();
        }
        let list = buf.generate_entry_list();
        assert_eq!(
            list,
            vec![BufferEntry {
                value: 1.5,
                weight: 10.0,
            }]
        );
    }

    #[test]
    fn empty_drain_is_empty() {
        let mut buf = Buffer::new(2, 100).expect("buffer");
        assert!(buf.generate_entry_list().is_empty());
    }
}
