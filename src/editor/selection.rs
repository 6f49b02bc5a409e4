#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub anchor: usize,
    pub head: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Editor selection: zero or more ranges in the host's ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn new(ranges: Vec<SelectionRange>) -> Self {
        Self { ranges }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(vec![SelectionRange::cursor(pos)])
    }

    pub fn single(anchor: usize, head: usize) -> Self {
        Self::new(vec![SelectionRange::new(anchor, head)])
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub(crate) fn map(&self, mut f: impl FnMut(usize) -> usize) -> Selection {
        Selection::new(
            self.ranges
                .iter()
                .map(|r| SelectionRange::new(f(r.anchor), f(r.head)))
                .collect(),
        )
    }
}

/// The position used to find "the query under the cursor".
///
/// The head of the *last* range wins, not the primary one; with no ranges
/// the cursor is at 0. For a non-empty range the head is used, never the anchor.
pub fn first_cursor(selection: &Selection) -> usize {
    selection.ranges.last().map(|range| range.head).unwrap_or(0)
}
