pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<i32> = 0..=200;
pub const CONTRAST_RANGE: std::ops::RangeInclusive<i32> = 0..=200;
pub const SATURATION_RANGE: std::ops::RangeInclusive<i32> = 0..=200;
pub const HUE_RANGE: std::ops::RangeInclusive<i32> = 0..=360;
pub const GRAYSCALE_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edits {
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub hue: i32,
    pub grayscale: i32,
}

impl Default for Edits {
    fn default() -> Self {
        Self { brightness: 100, contrast: 100, saturation: 100, hue: 0, grayscale: 0 }
    }
}

impl Edits {
    pub fn is_identity(&self) -> bool {
        *self == Edits::default()
    }

    pub fn clamp(&mut self) {
        self.brightness = self.brightness.clamp(*BRIGHTNESS_RANGE.start(), *BRIGHTNESS_RANGE.end());
        self.contrast = self.contrast.clamp(*CONTRAST_RANGE.start(), *CONTRAST_RANGE.end());
        self.saturation = self.saturation.clamp(*SATURATION_RANGE.start(), *SATURATION_RANGE.end());
        self.hue = self.hue.clamp(*HUE_RANGE.start(), *HUE_RANGE.end());
        self.grayscale = self.grayscale.clamp(*GRAYSCALE_RANGE.start(), *GRAYSCALE_RANGE.end());
    }
}

// Linear undo model: committing while undone discards the redo branch.
// The active snapshot is always snapshots[cursor].
pub struct EditHistory {
    snapshots: Vec<Edits>,
    cursor: usize,
}

impl EditHistory {
    pub fn open(initial: Edits) -> Self {
        Self { snapshots: vec![initial], cursor: 0 }
    }

    pub fn current(&self) -> Edits {
        self.snapshots[self.cursor]
    }

    pub fn commit(&mut self, edits: Edits) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(edits);
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<Edits> {
        if self.cursor == 0 { return None; }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor])
    }

    pub fn redo(&mut self) -> Option<Edits> {
        if self.cursor + 1 >= self.snapshots.len() { return None; }
        self.cursor += 1;
        Some(self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool { self.cursor > 0 }
    pub fn can_redo(&self) -> bool { self.cursor + 1 < self.snapshots.len() }
    pub fn len(&self) -> usize { self.snapshots.len() }
    pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edits(brightness: i32) -> Edits {
        Edits { brightness, ..Edits::default() }
    }

    #[test]
    fn open_starts_with_single_snapshot() {
        let history: EditHistory = EditHistory::open(Edits::default());
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Edits::default());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_redo_walk_the_sequence() {
        let d0: Edits = Edits::default();
        let d1: Edits = edits(110);
        let d2: Edits = edits(120);

        let mut history: EditHistory = EditHistory::open(d0);
        history.commit(d1);
        history.commit(d2);

        assert_eq!(history.undo(), Some(d1));
        assert_eq!(history.undo(), Some(d0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(d1));
        assert_eq!(history.redo(), Some(d2));
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), d2);
    }

    #[test]
    fn commit_after_undo_discards_redo_branch() {
        let d0: Edits = Edits::default();
        let d1: Edits = edits(110);
        let d2: Edits = edits(120);
        let d3: Edits = edits(130);

        let mut history: EditHistory = EditHistory::open(d0);
        history.commit(d1);
        history.commit(d2);
        history.undo();
        history.undo();
        assert_eq!(history.current(), d0);

        history.commit(d3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), d3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(d0));
    }

    #[test]
    fn clamp_respects_each_slider_range() {
        let mut over: Edits = Edits { brightness: 300, contrast: -5, saturation: 201, hue: 400, grayscale: 101 };
        over.clamp();
        assert_eq!(over, Edits { brightness: 200, contrast: 0, saturation: 200, hue: 360, grayscale: 100 });
    }
}
