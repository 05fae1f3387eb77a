//! Navigation-related controller methods (sections, search, links)

use std::time::Instant;

use crate::model::ActiveSection;
use crate::model::catalog_client::{deep_link_track, share_link};
use crate::view::listing::build_listing;

use super::{AppController, persist};

impl AppController {
    /// Rebuilds the listing from the selected era and the applied query, and
    /// scrolls it to the top.
    pub(super) fn rebuild_listing(&mut self) {
        self.listing = build_listing(&self.catalog, &self.state, self.search.applied());
        self.ui.track_selected = 0;
        if let Some(position) = self.listing.section_position(&self.state.selected_era) {
            self.ui.section_selected = position;
        }
        tracing::debug!(
            rows = self.listing.rows.len(),
            search = self.listing.is_search(),
            "Listing rebuilt"
        );
    }

    /// Switches to the section view of `era`, clearing any search.
    pub fn select_section(&mut self, era: &str) {
        if !self.catalog.has_era(era) {
            tracing::debug!(era, "Ignoring unknown era");
            return;
        }
        self.search.clear();
        self.state.selected_era = era.to_string();
        persist("selected era", self.session.save_selected_era(era));
        self.rebuild_listing();
    }

    pub fn cycle_section_forward(&mut self) {
        self.ui.active_section = self.ui.active_section.next();
    }

    pub fn cycle_section_backward(&mut self) {
        self.ui.active_section = self.ui.active_section.prev();
    }

    pub fn focus(&mut self, section: ActiveSection) {
        self.ui.active_section = section;
    }

    pub fn move_selection_up(&mut self) {
        match self.ui.active_section {
            ActiveSection::Sections => {
                self.ui.section_selected = self.ui.section_selected.saturating_sub(1);
            }
            ActiveSection::Tracks => {
                self.ui.track_selected = self.ui.track_selected.saturating_sub(1);
            }
            ActiveSection::Search => {}
        }
    }

    pub fn move_selection_down(&mut self) {
        match self.ui.active_section {
            ActiveSection::Sections => {
                let last = self.listing.sections.len().saturating_sub(1);
                self.ui.section_selected = (self.ui.section_selected + 1).min(last);
            }
            ActiveSection::Tracks => {
                let last = self.listing.rows.len().saturating_sub(1);
                self.ui.track_selected = (self.ui.track_selected + 1).min(last);
            }
            ActiveSection::Search => {}
        }
    }

    /// Enter on the focused pane: open a section or activate a row.
    pub fn activate_selected(&mut self) {
        match self.ui.active_section {
            ActiveSection::Sections => {
                if let Some(era) = self
                    .listing
                    .sections
                    .get(self.ui.section_selected)
                    .map(|s| s.era.clone())
                {
                    self.select_section(&era);
                    self.ui.active_section = ActiveSection::Tracks;
                }
            }
            ActiveSection::Tracks => {
                if let Some(intent) = self.listing.rows.get(self.ui.track_selected).map(|r| r.intent()) {
                    self.dispatch(intent);
                }
            }
            ActiveSection::Search => self.search_submit(),
        }
    }

    pub fn search_push(&mut self, c: char, now: Instant) {
        self.search.push(c, now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.search.backspace(now);
    }

    /// Applies the typed query without waiting and moves focus to the rows.
    pub fn search_submit(&mut self) {
        if self.search.flush() {
            self.rebuild_listing();
        }
        self.ui.active_section = ActiveSection::Tracks;
    }

    /// Clears the query, returning to the selected era.
    pub fn search_cancel(&mut self) {
        if self.search.clear() {
            self.rebuild_listing();
        }
        self.ui.active_section = ActiveSection::Tracks;
    }

    pub fn has_search(&self) -> bool {
        self.search.is_active() || !self.search.input().is_empty()
    }

    /// Opens the track named by a share link: selects its era, starts it and
    /// scrolls its row into view. Unknown tracks are ignored.
    pub fn open_deep_link(&mut self, link: &str) -> bool {
        let Some(track_id) = deep_link_track(link) else {
            tracing::debug!(link, "Deep link carries no track id");
            return false;
        };
        let Some(era) = self.catalog.get(&track_id).map(|t| t.era.clone()) else {
            tracing::info!(track_id = %track_id, "Deep link names an unknown track, ignoring");
            return false;
        };

        tracing::info!(track_id = %track_id, era = %era, "Opening deep link");
        self.select_section(&era);
        self.play(&track_id);
        self.ui.track_selected = self.listing.position_of(&track_id).unwrap_or(0);
        self.ui.active_section = ActiveSection::Tracks;
        true
    }

    /// Copies a link to the current track to the clipboard.
    pub fn copy_share_link(&mut self) {
        let Some(track_id) = self.state.current_track_id.clone() else {
            return;
        };
        let link = share_link(&self.options.share_base, &track_id);
        match self.clipboard.copy(&link) {
            Ok(()) => {
                tracing::info!(link = %link, "Share link copied");
                self.set_status("Share link copied");
            }
            Err(e) => tracing::warn!(error = %e, link = %link, "Failed to copy share link"),
        }
    }

    pub fn toggle_help(&mut self) {
        self.ui.show_help_popup = !self.ui.show_help_popup;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::tests::{harness, harness_parts, harness_with};
    use crate::model::session::keys;
    use crate::model::{Command, KeyValueStore, MemoryStore};
    use crate::test_support::RecordingClipboard;
    use crate::view::listing::ListingMode;

    fn row_ids(h: &crate::controller::tests::Harness) -> Vec<String> {
        h.controller.listing().rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn starts_in_the_first_section() {
        let h = harness();
        assert_eq!(h.controller.state().selected_era, "First");
        assert_eq!(row_ids(&h), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn selecting_a_section_clears_search_and_persists() {
        let store = MemoryStore::new();
        let mut h = harness_with(store.clone());
        let now = Instant::now();
        h.controller.search_push('l', now);
        h.controller.tick(now + Duration::from_millis(300));
        assert!(h.controller.listing().is_search());

        h.controller.ui.track_selected = 2;
        h.controller.select_section("Second");
        assert_eq!(
            h.controller.listing().mode,
            ListingMode::Section { era: "Second".into() }
        );
        assert_eq!(h.controller.ui_state().search_input, "");
        assert_eq!(h.controller.ui_state().track_selected, 0);
        assert_eq!(store.get(keys::SELECTED_ERA).as_deref(), Some("Second"));
    }

    #[test]
    fn search_is_applied_after_the_debounce_window() {
        let mut h = harness();
        let now = Instant::now();
        for (i, c) in "night".chars().enumerate() {
            h.controller.search_push(c, now + Duration::from_millis(10 * i as u64));
        }
        h.controller.tick(now + Duration::from_millis(100));
        assert!(!h.controller.listing().is_search());
        assert!(h.controller.ui_state().search_pending);

        h.controller.tick(now + Duration::from_millis(400));
        assert_eq!(row_ids(&h), vec!["b1"]);
        assert_eq!(h.controller.listing().rows[0].era_label.as_deref(), Some("Second"));

        h.controller.search_cancel();
        assert_eq!(row_ids(&h), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn playback_never_reorders_rows() {
        let mut h = harness();
        let before = row_ids(&h);
        h.play("a3");
        h.controller.dispatch(Command::SetShuffle(true));
        h.controller.dispatch(Command::Next);
        assert_eq!(row_ids(&h), before);
    }

    #[test]
    fn deep_link_selects_era_and_starts_the_track() {
        let mut h = harness();
        assert!(h.controller.open_deep_link("http://host:5000/?track=b2"));
        assert_eq!(h.controller.state().selected_era, "Second");
        assert_eq!(h.controller.ui_state().track_selected, 1);
        assert_eq!(h.loader.last_audio().map(|(_, id)| id).as_deref(), Some("b2"));
    }

    #[test]
    fn unknown_deep_link_is_ignored() {
        let mut h = harness();
        assert!(!h.controller.open_deep_link("?track=missing"));
        assert_eq!(h.controller.state().selected_era, "First");
        assert!(h.loader.log().audio.is_empty());
    }

    #[test]
    fn enter_on_a_row_activates_it() {
        let mut h = harness();
        h.controller.focus(ActiveSection::Tracks);
        h.controller.move_selection_down();
        h.controller.activate_selected();
        assert_eq!(h.loader.last_audio().map(|(_, id)| id).as_deref(), Some("a2"));
    }

    #[test]
    fn enter_on_a_section_opens_it() {
        let mut h = harness();
        h.controller.focus(ActiveSection::Sections);
        h.controller.move_selection_down();
        h.controller.move_selection_down();
        h.controller.activate_selected();
        assert_eq!(h.controller.state().selected_era, "Second");
        assert_eq!(h.controller.ui_state().active_section, ActiveSection::Tracks);
    }

    #[test]
    fn share_link_is_copied_for_the_current_track() {
        let clipboard = RecordingClipboard::default();
        let mut h = harness_parts(MemoryStore::new(), clipboard.clone());
        h.controller.copy_share_link();
        assert!(clipboard.copied.borrow().is_empty());

        h.play("a2");
        h.controller.copy_share_link();
        assert_eq!(
            *clipboard.copied.borrow(),
            vec!["http://127.0.0.1:5000/?track=a2".to_string()]
        );
        assert!(h.controller.ui_state().status_message.is_some());
    }

    #[test]
    fn clipboard_failure_shows_nothing() {
        let clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        let mut h = harness_parts(MemoryStore::new(), clipboard);
        h.play("a2");
        h.controller.ui.status_message = None;
        h.controller.copy_share_link();
        assert_eq!(h.controller.ui_state().status_message, None);
    }
}
