//! Greedy pileup packing: place overlapping horizontal intervals into the
//! fewest rows such that no two intervals in a row come closer than the gap
//! tolerance.

/// A pixel-space interval tagged with a stable identifier.
///
/// Callers sort intervals ascending by `start` before packing; ties keep
/// their original insertion order. The packer relies on that ordering for
/// deterministic row assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelInterval {
    pub id: usize,
    pub start: f64,
    pub end: f64,
}

impl PixelInterval {
    pub fn new(id: usize, start: f64, end: f64) -> Self {
        Self { id, start, end }
    }
}

/// Result of a packing pass.
#[derive(Debug, Clone, Default)]
pub struct Packing {
    /// Row index per input interval, in input order. `None` means the
    /// interval overflowed the row limit and was left unplaced.
    pub rows: Vec<Option<usize>>,
    /// Number of rows actually opened.
    pub row_count: usize,
    /// How many intervals overflowed.
    pub overflow: usize,
}

impl Packing {
    /// Row assignment for the interval at input index `i`.
    pub fn row(&self, i: usize) -> Option<usize> {
        self.rows.get(i).copied().flatten()
    }
}

/// Assign each interval to the lowest-indexed row whose last interval ends
/// at least `min_gap` before it starts, opening new rows as needed.
///
/// If opening another row would exceed `max_rows`, the interval is marked
/// overflowed instead; the caller reports the count (e.g. "+N more").
/// Runs in `O(n * rows)`.
pub fn pack_intervals(
    intervals: &[PixelInterval],
    min_gap: f64,
    max_rows: Option<usize>,
) -> Packing {
    debug_assert!(
        intervals.windows(2).all(|w| w[0].start <= w[1].start),
        "intervals must be sorted ascending by start"
    );

    let mut row_ends: Vec<f64> = Vec::new();
    let mut rows: Vec<Option<usize>> = Vec::with_capacity(intervals.len());
    let mut overflow = 0usize;

    for interval in intervals {
        let found = row_ends
            .iter()
            .position(|&end| end + min_gap <= interval.start);

        match found {
            Some(r) => {
                row_ends[r] = interval.end;
                rows.push(Some(r));
            }
            None => {
                if max_rows.is_some_and(|limit| row_ends.len() >= limit) {
                    overflow += 1;
                    rows.push(None);
                } else {
                    row_ends.push(interval.end);
                    rows.push(Some(row_ends.len() - 1));
                }
            }
        }
    }

    Packing {
        rows,
        row_count: row_ends.len(),
        overflow,
    }
}
