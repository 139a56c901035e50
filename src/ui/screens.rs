use crate::listing::{ListView, Listing, RenderedEntry};

/// Wrapper around the most recent listing plus the selected card.
#[derive(Default)]
pub(crate) struct ListScreen {
    pub(crate) listing: Listing,
    pub(crate) selected: usize,
}

impl ListScreen {
    /// Replace the rendered content wholesale. Selection is clamped rather than
    /// reset so deleting a card keeps the cursor nearby.
    pub(crate) fn set_listing(&mut self, listing: Listing) {
        self.listing = listing;
        self.ensure_in_bounds();
    }

    pub(crate) fn view(&self) -> &ListView {
        &self.listing.view
    }

    pub(crate) fn entries(&self) -> &[RenderedEntry] {
        &self.listing.entries
    }

    pub(crate) fn current_entry(&self) -> Option<&RenderedEntry> {
        self.listing.entries.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.listing.entries.is_empty() {
            return;
        }
        let last = self.listing.entries.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.listing.entries.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.listing.entries.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.listing.entries.len() {
            self.selected = self.listing.entries.len() - 1;
        }
    }
}
