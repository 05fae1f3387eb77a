//! Pure listing builder: what the track pane and section selector show
//!
//! The listing depends only on the catalog, the selected era and the applied
//! search query. Playback never reorders it; the current track is highlighted
//! at render time.

use crate::model::search;
use crate::model::{Catalog, Command, PlaybackState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingMode {
    /// Tracks of one era, in catalog order.
    Section { era: String },
    /// Matches across every era, in catalog order.
    Search { query: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub track_index: usize,
    pub id: String,
    pub title: String,
    pub credits: String,
    /// Set in search mode, where rows from different eras are mixed.
    pub era_label: Option<String>,
    pub length: Option<String>,
    pub quality: Option<String>,
    /// How much of the track exists (`Full`, `Snippet`, ...).
    pub available: Option<String>,
}

impl Row {
    pub fn intent(&self) -> Command {
        Command::Activate(self.id.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionEntry {
    pub era: String,
    pub total: usize,
    /// Matching tracks while a search is active.
    pub matches: Option<usize>,
    pub selected: bool,
}

impl SectionEntry {
    pub fn label(&self) -> String {
        match self.matches {
            Some(matches) => format!("{} ({}/{})", self.era, matches, self.total),
            None => format!("{} ({})", self.era, self.total),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub mode: ListingMode,
    pub rows: Vec<Row>,
    pub sections: Vec<SectionEntry>,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            mode: ListingMode::Section { era: String::new() },
            rows: Vec::new(),
            sections: Vec::new(),
        }
    }
}

impl Listing {
    pub fn is_search(&self) -> bool {
        matches!(self.mode, ListingMode::Search { .. })
    }

    pub fn position_of(&self, track_id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id == track_id)
    }

    pub fn section_position(&self, era: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.era == era)
    }
}

/// Builds the listing for `state.selected_era`, or the search view when
/// `query` is non-blank.
pub fn build_listing(catalog: &Catalog, state: &PlaybackState, query: &str) -> Listing {
    let query = query.trim();

    if query.is_empty() {
        let era = state.selected_era.clone();
        let rows = catalog
            .era_range(&era)
            .filter_map(|index| row(catalog, index, false))
            .collect();
        let sections = catalog
            .sections()
            .iter()
            .map(|section| SectionEntry {
                era: section.era.clone(),
                total: catalog.era_len(&section.era),
                matches: None,
                selected: section.era == era,
            })
            .collect();
        return Listing {
            mode: ListingMode::Section { era },
            rows,
            sections,
        };
    }

    let matched = search::filter(catalog, query);
    let sections = catalog
        .sections()
        .iter()
        .map(|section| {
            let range = catalog.era_range(&section.era);
            SectionEntry {
                era: section.era.clone(),
                total: range.len(),
                matches: Some(matched.iter().filter(|&&i| range.contains(&i)).count()),
                selected: section.era == state.selected_era,
            }
        })
        .collect();
    let rows = matched
        .into_iter()
        .filter_map(|index| row(catalog, index, true))
        .collect();

    Listing {
        mode: ListingMode::Search {
            query: query.to_string(),
        },
        rows,
        sections,
    }
}

fn row(catalog: &Catalog, index: usize, labeled: bool) -> Option<Row> {
    let track = catalog.track(index)?;
    Some(Row {
        track_index: index,
        id: track.id.clone(),
        title: track.title(),
        credits: track.credits(),
        era_label: labeled.then(|| track.era.clone()),
        length: track.track_length.clone(),
        quality: track.quality.clone(),
        available: track.available_length.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SectionRecord, TrackRecord};

    fn catalog() -> Catalog {
        let records = [
            ("a1", "Alpha One", "Alpha"),
            ("b1", "Beta One", "Beta"),
            ("a2", "Alpha Two (feat. Beta)", "Alpha"),
            ("b2", "Beta Two", "Beta"),
        ]
        .into_iter()
        .map(|(id, name, era)| TrackRecord {
            id: id.into(),
            name: name.into(),
            era: era.into(),
            ..Default::default()
        })
        .collect();
        Catalog::build(
            records,
            vec![
                SectionRecord { era: "Alpha".into() },
                SectionRecord { era: "Beta".into() },
                SectionRecord { era: "Gamma".into() },
            ],
        )
    }

    fn state(era: &str) -> PlaybackState {
        PlaybackState {
            selected_era: era.into(),
            ..Default::default()
        }
    }

    fn ids(listing: &Listing) -> Vec<&str> {
        listing.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn section_view_lists_the_selected_era_in_catalog_order() {
        let listing = build_listing(&catalog(), &state("Alpha"), "");
        assert_eq!(listing.mode, ListingMode::Section { era: "Alpha".into() });
        assert_eq!(ids(&listing), vec!["a1", "a2"]);
        assert!(listing.rows.iter().all(|r| r.era_label.is_none()));
        assert_eq!(listing.sections[0].label(), "Alpha (2)");
        assert!(listing.sections[0].selected);
    }

    #[test]
    fn empty_sections_are_still_listed() {
        let listing = build_listing(&catalog(), &state("Gamma"), "");
        assert!(listing.rows.is_empty());
        assert_eq!(listing.sections[2].label(), "Gamma (0)");
    }

    #[test]
    fn search_view_flattens_eras_and_labels_rows() {
        let listing = build_listing(&catalog(), &state("Alpha"), "  beta ");
        assert!(listing.is_search());
        assert_eq!(ids(&listing), vec!["a2", "b1", "b2"]);
        assert_eq!(listing.rows[0].era_label.as_deref(), Some("Alpha"));
        assert_eq!(listing.sections[0].label(), "Alpha (1/2)");
        assert_eq!(listing.sections[1].label(), "Beta (2/2)");
        assert_eq!(listing.sections[2].label(), "Gamma (0/0)");
    }

    #[test]
    fn rows_do_not_depend_on_shuffle_or_current_track() {
        let c = catalog();
        let plain = build_listing(&c, &state("Beta"), "");
        let busy = PlaybackState {
            shuffle_enabled: true,
            current_track_id: Some("b2".into()),
            current_index: Some(0),
            ..state("Beta")
        };
        assert_eq!(build_listing(&c, &busy, ""), plain);
    }

    #[test]
    fn rows_emit_activate_intents() {
        let listing = build_listing(&catalog(), &state("Beta"), "");
        assert_eq!(listing.rows[1].intent(), Command::Activate("b2".into()));
        assert_eq!(listing.position_of("b2"), Some(1));
        assert_eq!(listing.section_position("Beta"), Some(1));
    }

    #[test]
    fn rows_are_built_only_for_catalog_tracks() {
        let c = catalog();
        let first = row(&c, 0, false).unwrap();
        assert_eq!(first.id, "a1");
        assert_eq!(first.available, None);
        assert!(row(&c, c.len(), true).is_none());
    }
}
