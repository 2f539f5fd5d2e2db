/// An unordered pair of line indices as reported to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Non-decreasing `(low, high)` form of the range.
    pub fn normalized(self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    pub fn contains(&self, line: usize) -> bool {
        let (low, high) = self.normalized();
        (low..=high).contains(&line)
    }
}

/// In-progress line-range selection.
///
/// `anchor` is pinned once set; only `current` moves while the range is extended.
/// `active` without an anchor means selecting mode is armed but no range has started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSelection {
    pub anchor: Option<usize>,
    pub current: Option<usize>,
    pub active: bool,
}

impl LineSelection {
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.active && self.anchor.is_none()
    }

    pub fn range(&self) -> Option<LineRange> {
        match (self.anchor, self.current) {
            (Some(anchor), Some(current)) => Some(LineRange::new(anchor, current)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
