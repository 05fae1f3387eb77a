//! Catalog filtering and search-input debouncing

use std::time::{Duration, Instant};

use super::catalog::Catalog;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Catalog indices (in catalog order) whose search text contains `query`,
/// ignoring case. An empty query matches everything.
pub fn filter(catalog: &Catalog, query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    catalog
        .tracks()
        .iter()
        .enumerate()
        .filter(|(_, track)| needle.is_empty() || track.search_text.contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

/// Search box state: what the user typed, and what the listing reflects.
///
/// Typing only updates `input`; the query is applied once input has been
/// quiet for the debounce delay.
#[derive(Clone, Debug)]
pub struct SearchState {
    input: String,
    applied: String,
    deadline: Option<Instant>,
    delay: Duration,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchState {
    pub fn new(delay: Duration) -> Self {
        Self {
            input: String::new(),
            applied: String::new(),
            deadline: None,
            delay,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The query the listing is currently built from.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn is_active(&self) -> bool {
        !self.applied.trim().is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn set_input(&mut self, input: impl Into<String>, now: Instant) {
        self.input = input.into();
        self.deadline = Some(now + self.delay);
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.deadline = Some(now + self.delay);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Applies pending input once the delay has elapsed. Returns true when the
    /// applied query changed and the listing needs rebuilding.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.apply()
            }
            _ => false,
        }
    }

    /// Applies the current input immediately.
    pub fn flush(&mut self) -> bool {
        self.deadline = None;
        self.apply()
    }

    /// Empties the box and the applied query without waiting.
    pub fn clear(&mut self) -> bool {
        self.input.clear();
        self.flush()
    }

    fn apply(&mut self) -> bool {
        if self.applied == self.input {
            return false;
        }
        self.applied = self.input.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{SectionRecord, TrackRecord};

    fn catalog() -> Catalog {
        let records = [
            ("1", "Bound 2 (feat. Charlie)", "Yeezus"),
            ("2", "Hold My Liquor", "Yeezus"),
            ("3", "Ultralight Beam", "TLOP"),
        ]
        .into_iter()
        .map(|(id, name, era)| TrackRecord {
            id: id.into(),
            name: name.into(),
            era: era.into(),
            ..Default::default()
        })
        .collect();
        Catalog::build(records, vec![SectionRecord { era: "Yeezus".into() }])
    }

    #[test]
    fn empty_query_matches_all() {
        assert_eq!(filter(&catalog(), ""), vec![0, 1, 2]);
        assert_eq!(filter(&catalog(), "   "), vec![0, 1, 2]);
    }

    #[test]
    fn matching_is_case_insensitive_and_covers_era_and_credits() {
        let c = catalog();
        assert_eq!(filter(&c, "BOUND"), vec![0]);
        assert_eq!(filter(&c, "yeezus"), vec![0, 1]);
        assert_eq!(filter(&c, "feat. charlie"), vec![0]);
        assert!(filter(&c, "nothing like this").is_empty());
    }

    #[test]
    fn input_is_applied_only_after_the_delay() {
        let start = Instant::now();
        let mut search = SearchState::new(Duration::from_millis(250));
        search.push('b', start);
        search.push('o', start + Duration::from_millis(100));

        assert!(!search.poll(start + Duration::from_millis(300)));
        assert_eq!(search.applied(), "");
        assert!(search.poll(start + Duration::from_millis(350)));
        assert_eq!(search.applied(), "bo");
        assert!(search.is_active());
        assert!(!search.poll(start + Duration::from_millis(900)));
    }

    #[test]
    fn bursts_produce_a_single_rebuild() {
        let start = Instant::now();
        let mut search = SearchState::new(Duration::from_millis(250));
        let mut rebuilds = 0;
        for (i, c) in "ultralight".chars().enumerate() {
            let now = start + Duration::from_millis(20 * i as u64);
            search.push(c, now);
            if search.poll(now) {
                rebuilds += 1;
            }
        }
        if search.poll(start + Duration::from_secs(1)) {
            rebuilds += 1;
        }
        assert_eq!(rebuilds, 1);
    }

    #[test]
    fn clear_applies_immediately() {
        let now = Instant::now();
        let mut search = SearchState::default();
        search.set_input("x", now);
        assert!(search.flush());
        assert!(search.clear());
        assert!(!search.is_active());
        assert!(!search.is_pending());
    }
}
