//! Catalog data: tracks grouped into eras and the canonical linear ordering

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use serde::Deserialize;

/// Era used for tracks that arrive without one.
pub const UNKNOWN_ERA: &str = "Unknown Era";

const CREDIT_SEPARATOR: &str = " • ";

/// A track as returned by `GET /api/tracks`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub era: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub track_length: Option<String>,
    #[serde(default)]
    pub available_length: Option<String>,
}

/// An entry of `GET /api/sections`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SectionRecord {
    #[serde(default)]
    pub era: String,
}

/// A catalog track, immutable once the catalog is built
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub era: String,
    pub notes: Option<String>,
    pub quality: Option<String>,
    pub track_length: Option<String>,
    pub available_length: Option<String>,
    /// Lowercased name, era, credits and notes.
    pub search_text: String,
}

impl Track {
    fn from_record(record: TrackRecord, era: String) -> Self {
        let notes = non_empty(record.notes);
        let search_text = build_search_text(&record.name, &era, notes.as_deref());
        Self {
            id: record.id,
            name: record.name,
            era,
            notes,
            quality: non_empty(record.quality),
            track_length: non_empty(record.track_length),
            available_length: non_empty(record.available_length),
            search_text,
        }
    }

    pub fn title(&self) -> String {
        clean_title(&self.name)
    }

    pub fn credits(&self) -> String {
        credits(&self.name)
    }

    /// Listed length in seconds, parsed from `m:ss` or `h:mm:ss`.
    pub fn length_secs(&self) -> Option<f64> {
        self.track_length.as_deref().and_then(parse_clock)
    }
}

/// An era and its position in the display order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub era: String,
    pub rank: usize,
}

/// The loaded catalog.
///
/// Tracks are stored in linear order (eras in canonical order, insertion order
/// within an era), so a track's catalog index is also its linear position.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    sections: Vec<Section>,
    by_id: HashMap<String, usize>,
    era_ranges: HashMap<String, Range<usize>>,
}

impl Catalog {
    pub fn build(records: Vec<TrackRecord>, section_records: Vec<SectionRecord>) -> Self {
        let mut groups: HashMap<String, Vec<TrackRecord>> = HashMap::new();
        let mut seen_ids = HashSet::new();
        for record in records {
            if !seen_ids.insert(record.id.clone()) {
                tracing::warn!(id = %record.id, "Duplicate track id in catalog, keeping the first");
                continue;
            }
            let era = match record.era.trim() {
                "" => UNKNOWN_ERA.to_string(),
                era => era.to_string(),
            };
            groups.entry(era).or_default().push(record);
        }

        let mut era_order: Vec<String> = Vec::new();
        for section in section_records {
            let era = section.era.trim();
            if !era.is_empty() && !era_order.iter().any(|e| e == era) {
                era_order.push(era.to_string());
            }
        }
        let mut uncovered: Vec<String> = groups
            .keys()
            .filter(|era| !era_order.contains(era))
            .cloned()
            .collect();
        uncovered.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
        era_order.extend(uncovered);

        let mut tracks = Vec::new();
        let mut era_ranges = HashMap::new();
        for era in &era_order {
            let start = tracks.len();
            if let Some(group) = groups.remove(era) {
                tracks.extend(group.into_iter().map(|r| Track::from_record(r, era.clone())));
            }
            era_ranges.insert(era.clone(), start..tracks.len());
        }

        let by_id = tracks
            .iter()
            .enumerate()
            .map(|(index, track)| (track.id.clone(), index))
            .collect();
        let sections = era_order
            .into_iter()
            .enumerate()
            .map(|(rank, era)| Section { era, rank })
            .collect();

        Self {
            tracks,
            sections,
            by_id,
            era_ranges,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.index_of(id).and_then(|i| self.tracks.get(i))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn has_era(&self, era: &str) -> bool {
        self.era_ranges.contains_key(era)
    }

    pub fn first_era(&self) -> Option<&str> {
        self.sections.first().map(|s| s.era.as_str())
    }

    /// Catalog indices of an era's tracks; empty for unknown eras.
    pub fn era_range(&self, era: &str) -> Range<usize> {
        self.era_ranges.get(era).cloned().unwrap_or(0..0)
    }

    pub fn era_len(&self, era: &str) -> usize {
        self.era_range(era).len()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn build_search_text(name: &str, era: &str, notes: Option<&str>) -> String {
    let credits = credits(name);
    [name, era, credits.as_str(), notes.unwrap_or_default()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_clock(value: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut parts = 0;
    for part in value.trim().split(':') {
        let n: f64 = part.trim().parse().ok()?;
        total = total * 60.0 + n;
        parts += 1;
    }
    (parts > 1 || total > 0.0).then_some(total)
}

static CREDIT_GROUP: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*(with|feat\.?|ft\.|prod\.?)\s+([^)]+)\)").ok()
});
static VERSION_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]").ok());
static LEADING_GLYPHS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^[^\p{L}\p{N}(\["']+"#).ok());
static ARTIST_TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([^–—-]+?)\s*[–—-]\s+(.+)$").ok());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CreditKind {
    With,
    Feat,
    Prod,
}

impl CreditKind {
    fn parse(marker: &str) -> Self {
        let marker = marker.to_ascii_lowercase();
        if marker == "with" {
            CreditKind::With
        } else if marker.starts_with("prod") {
            CreditKind::Prod
        } else {
            CreditKind::Feat
        }
    }

    fn label(self) -> &'static str {
        match self {
            CreditKind::With => "with",
            CreditKind::Feat => "feat.",
            CreditKind::Prod => "prod.",
        }
    }
}

/// `with X • feat. Y • prod. Z` taken from the name's credit groups.
pub fn credits(name: &str) -> String {
    let Some(re) = CREDIT_GROUP.as_ref() else {
        return String::new();
    };
    let found: Vec<(CreditKind, &str)> = re
        .captures_iter(name)
        .map(|caps| (CreditKind::parse(&caps[1]), caps.get(2).map_or("", |m| m.as_str().trim())))
        .filter(|(_, who)| !who.is_empty())
        .collect();

    [CreditKind::With, CreditKind::Feat, CreditKind::Prod]
        .iter()
        .filter_map(|kind| {
            found
                .iter()
                .find(|(k, _)| k == kind)
                .map(|(_, who)| format!("{} {}", kind.label(), who))
        })
        .collect::<Vec<_>>()
        .join(CREDIT_SEPARATOR)
}

/// First line of the name without leading emoji or decorative glyphs.
fn first_line(name: &str) -> &str {
    let line = name.lines().next().unwrap_or_default().trim();
    match LEADING_GLYPHS.as_ref().and_then(|re| re.find(line)) {
        Some(glyphs) => line[glyphs.end()..].trim_start(),
        None => line,
    }
}

/// `(artist, title)` when the line reads `Artist - Title` (any dash).
fn split_artist(line: &str) -> Option<(&str, &str)> {
    let caps = ARTIST_TITLE.as_ref()?.captures(line)?;
    Some((caps.get(1)?.as_str().trim(), caps.get(2)?.as_str().trim()))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display title: first line, no leading glyphs, version tags or artist
/// prefix. Credit groups stay.
pub fn clean_title(name: &str) -> String {
    let line = first_line(name);
    let title = split_artist(line).map_or(line, |(_, title)| title);
    let cleaned = match VERSION_TAG.as_ref() {
        Some(re) => collapse(&re.replace_all(title, " ")),
        None => collapse(title),
    };
    if cleaned.is_empty() {
        name.trim().to_string()
    } else {
        cleaned
    }
}

/// The lead artist of an `Artist - Title` name, else `fallback`. Feature
/// credits are never part of it.
pub fn primary_artist(name: &str, fallback: &str) -> String {
    split_artist(first_line(name))
        .map(|(artist, _)| match CREDIT_GROUP.as_ref() {
            Some(re) => collapse(&re.replace_all(artist, " ")),
            None => collapse(artist),
        })
        .filter(|artist| !artist.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
