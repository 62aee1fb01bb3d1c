//! Column alignment for runs of similar lines
//!
//! Declarations, parameters, record fields and assignments are aligned by
//! padding each line's leading cells to a shared width. A [`Columns`] collects
//! the widths of a run first, then answers where each cell must end.

/// Widths of the aligned cells of a run of lines
#[derive(Debug, Clone, Default)]
pub struct Columns {
    widths: Vec<usize>,
    gap: usize,
}

impl Columns {
    /// Cells are separated by at least `gap` spaces
    #[must_use]
    pub fn new(gap: usize) -> Self {
        Columns {
            widths: Vec::new(),
            gap,
        }
    }

    /// Record the width of cell `index` on one line
    pub fn observe(&mut self, index: usize, width: usize) {
        if self.widths.len() <= index {
            self.widths.resize(index + 1, 0);
        }
        self.widths[index] = self.widths[index].max(width);
    }

    /// Whether any line had a non-empty cell `index`
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        self.widths.get(index).is_some_and(|w| *w > 0)
    }

    /// Offset of the text following cell `index`, relative to the start of cell 0
    #[must_use]
    pub fn offset_after(&self, index: usize) -> usize {
        self.widths
            .iter()
            .take(index + 1)
            .filter(|w| **w > 0)
            .map(|w| w + self.gap)
            .sum()
    }
}

/// Split items into runs of consecutive items accepted by `member`
///
/// Returns `(start, end)` index pairs (end exclusive); items outside every run
/// are not covered.
#[must_use]
pub fn runs<T>(items: &[T], member: impl Fn(&T) -> bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, item) in items.iter().enumerate() {
        match (member(item), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, items.len()));
    }
    runs
}
