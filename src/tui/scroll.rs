use crate::chat::{Entry, Surface};

/// Scroll position of the transcript pane, measured in rows up from the
/// newest line. Any append or text change snaps back to the bottom.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrollState {
    offset_from_bottom: u16,
    // Largest useful offset for the last layout; `None` until the first frame.
    max_offset: Option<u16>,
}

impl ScrollState {
    pub fn follows_tail(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn scroll_up(&mut self, rows: u16) {
        let offset = self.offset_from_bottom.saturating_add(rows);
        self.offset_from_bottom = match self.max_offset {
            Some(max) => offset.min(max),
            None => offset,
        };
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(rows);
    }

    pub fn jump_to_latest(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// Record the size of the current layout: `total` rows of content in a
    /// pane `visible` rows tall. Keeps the offset within the content so
    /// scrolling back down responds immediately.
    pub fn fit(&mut self, total: u16, visible: u16) {
        let max = total.saturating_sub(visible);
        self.max_offset = Some(max);
        self.offset_from_bottom = self.offset_from_bottom.min(max);
    }

    /// First row to show when `total` rows of content go into a pane `visible`
    /// rows tall.
    pub fn top_row(&self, total: u16, visible: u16) -> u16 {
        let max_top = total.saturating_sub(visible);
        max_top.saturating_sub(self.offset_from_bottom)
    }
}

impl Surface for ScrollState {
    fn appended(&mut self, _index: usize, _entry: &Entry) {
        self.jump_to_latest();
    }

    fn updated(&mut self, _index: usize, _entry: &Entry) {
        self.jump_to_latest();
    }
}
