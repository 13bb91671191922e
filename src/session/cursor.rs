/// Position of the displayed voice within the visible set.
///
/// Holds `0 <= index < max(1, len)` as long as [`Cursor::clamp`] runs after
/// every change to the visible length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Move one step back; returns false at the first position.
    pub fn step_back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Move one step forward; returns false at the last position.
    pub fn step_forward(&mut self, len: usize) -> bool {
        if !self.can_next(len) {
            return false;
        }
        self.index += 1;
        true
    }

    /// Pull the cursor back into range after the visible set changed.
    pub fn clamp(&mut self, len: usize) {
        self.index = match len {
            0 => 0,
            len => self.index.min(len - 1),
        };
    }

    pub fn can_prev(self) -> bool {
        self.index > 0
    }

    pub fn can_next(self, len: usize) -> bool {
        self.index + 1 < len
    }

    /// One-based `(position, total)` counter, `None` when nothing is visible.
    pub fn counter(self, len: usize) -> Option<(usize, usize)> {
        (len > 0).then(|| (self.index.min(len - 1) + 1, len))
    }
}
