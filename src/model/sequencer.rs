//! Track sequencing over the linear and shuffled orderings
//!
//! Orderings hold catalog indices. Because the catalog stores tracks in
//! linear order, the linear ordering is simply `0..len`; the shuffled
//! ordering is a permutation of it. Which one is active depends only on
//! `PlaybackState::shuffle_enabled`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::catalog::Catalog;
use super::playback::PlaybackState;
use super::types::RepeatMode;

/// Elapsed time after which "previous" restarts the current track instead.
pub const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// What the transport should do after a navigation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Start the track at this catalog index.
    Load(usize),
    /// Seek the current track to 0 and keep playing.
    Restart,
    /// End of the ordering: pause and rewind, keeping the selection.
    Stop,
    /// Nothing to navigate.
    Idle,
}

pub struct Sequencer {
    linear: Vec<usize>,
    shuffled: Vec<usize>,
    rng: StdRng,
}

impl Sequencer {
    pub fn new(len: usize) -> Self {
        Self::with_rng(len, StdRng::from_entropy())
    }

    /// Deterministic shuffles, for tests and reproducible sessions.
    pub fn with_seed(len: usize, seed: u64) -> Self {
        Self::with_rng(len, StdRng::seed_from_u64(seed))
    }

    fn with_rng(len: usize, rng: StdRng) -> Self {
        Self {
            linear: (0..len).collect(),
            shuffled: Vec::new(),
            rng,
        }
    }

    pub fn linear(&self) -> &[usize] {
        &self.linear
    }

    pub fn shuffled(&self) -> &[usize] {
        &self.shuffled
    }

    /// The ordering that governs next/previous.
    pub fn active(&self, state: &PlaybackState) -> &[usize] {
        if state.shuffle_enabled && !self.shuffled.is_empty() {
            &self.shuffled
        } else {
            &self.linear
        }
    }

    /// Catalog index of the track at `current_index`.
    pub fn current_track(&self, state: &PlaybackState) -> Option<usize> {
        state
            .current_index
            .and_then(|i| self.active(state).get(i).copied())
    }

    /// Brings the orderings and `current_index` in line with `state` and the
    /// catalog. Without `regenerate` an existing shuffle is kept, so calling
    /// this repeatedly changes nothing.
    pub fn reconcile(&mut self, state: &mut PlaybackState, catalog: &Catalog, regenerate: bool) {
        if self.linear.len() != catalog.len() {
            self.linear = (0..catalog.len()).collect();
            self.shuffled.clear();
        }

        let current = state
            .current_track_id
            .as_deref()
            .and_then(|id| catalog.index_of(id));

        if state.shuffle_enabled {
            if regenerate || self.shuffled.len() != self.linear.len() {
                self.shuffled = self.linear.clone();
                self.shuffled.shuffle(&mut self.rng);
                if let Some(track) = current {
                    if let Some(pos) = self.shuffled.iter().position(|&t| t == track) {
                        self.shuffled.remove(pos);
                        self.shuffled.insert(0, track);
                    }
                }
                tracing::debug!(len = self.shuffled.len(), pinned = ?current, "Generated shuffle order");
            }
        } else {
            self.shuffled.clear();
        }

        let index = current.and_then(|track| self.active(state).iter().position(|&t| t == track));
        state.current_index = index;
    }

    pub fn set_shuffle(&mut self, state: &mut PlaybackState, catalog: &Catalog, enabled: bool) {
        state.shuffle_enabled = enabled;
        self.reconcile(state, catalog, enabled);
    }

    pub fn set_repeat(&self, state: &mut PlaybackState, mode: RepeatMode) {
        state.repeat_mode = mode;
    }

    /// Makes `track` (a catalog index) current within the active ordering.
    pub fn select(&mut self, state: &mut PlaybackState, catalog: &Catalog, track: usize) {
        let Some(found) = catalog.track(track) else {
            return;
        };
        state.current_track_id = Some(found.id.clone());
        self.reconcile(state, catalog, false);
    }

    pub fn next(&self, state: &PlaybackState) -> Step {
        let order = self.active(state);
        if order.is_empty() {
            return Step::Idle;
        }
        let Some(index) = state.current_index else {
            return Step::Load(order[0]);
        };
        if state.repeat_mode == RepeatMode::One {
            return Step::Restart;
        }
        if index + 1 < order.len() {
            Step::Load(order[index + 1])
        } else if state.repeat_mode == RepeatMode::All {
            self.load_unless_current(state, order[0])
        } else {
            Step::Stop
        }
    }

    pub fn previous(&self, state: &PlaybackState, elapsed_secs: f64) -> Step {
        let order = self.active(state);
        let Some(index) = state.current_index.filter(|_| !order.is_empty()) else {
            return Step::Idle;
        };
        if elapsed_secs > RESTART_THRESHOLD_SECS {
            return Step::Restart;
        }
        if index > 0 {
            Step::Load(order[index - 1])
        } else if state.repeat_mode == RepeatMode::All {
            self.load_unless_current(state, order[order.len() - 1])
        } else {
            Step::Restart
        }
    }

    fn load_unless_current(&self, state: &PlaybackState, track: usize) -> Step {
        if self.current_track(state) == Some(track) {
            Step::Restart
        } else {
            Step::Load(track)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::TrackRecord;

    fn catalog(n: usize) -> Catalog {
        let records = (0..n)
            .map(|i| TrackRecord {
                id: format!("t{i}"),
                name: format!("Track {i}"),
                era: "Era".into(),
                ..Default::default()
            })
            .collect();
        Catalog::build(records, vec![])
    }

    fn playing(seq: &mut Sequencer, catalog: &Catalog, track: usize) -> PlaybackState {
        let mut state = PlaybackState::default();
        seq.select(&mut state, catalog, track);
        state
    }

    #[test]
    fn next_advances_then_stops_at_the_end() {
        let c = catalog(3);
        let mut seq = Sequencer::with_seed(3, 1);
        let mut state = playing(&mut seq, &c, 1);
        assert_eq!(state.current_index, Some(1));
        assert_eq!(seq.next(&state), Step::Load(2));
        seq.select(&mut state, &c, 2);
        assert_eq!(seq.next(&state), Step::Stop);
        assert_eq!(state.current_track_id.as_deref(), Some("t2"));
    }

    #[test]
    fn next_wraps_with_repeat_all() {
        let c = catalog(3);
        let mut seq = Sequencer::with_seed(3, 1);
        let mut state = playing(&mut seq, &c, 2);
        seq.set_repeat(&mut state, RepeatMode::All);
        assert_eq!(seq.next(&state), Step::Load(0));
    }

    #[test]
    fn repeat_one_restarts_from_any_index() {
        let c = catalog(4);
        let mut seq = Sequencer::with_seed(4, 1);
        for track in 0..4 {
            let mut state = playing(&mut seq, &c, track);
            state.repeat_mode = RepeatMode::One;
            assert_eq!(seq.next(&state), Step::Restart);
        }
    }

    #[test]
    fn next_without_current_starts_at_the_top() {
        let seq = Sequencer::with_seed(3, 1);
        assert_eq!(seq.next(&PlaybackState::default()), Step::Load(0));
        assert_eq!(Sequencer::with_seed(0, 1).next(&PlaybackState::default()), Step::Idle);
    }

    #[test]
    fn single_track_wrap_is_a_restart() {
        let c = catalog(1);
        let mut seq = Sequencer::with_seed(1, 1);
        let mut state = playing(&mut seq, &c, 0);
        state.repeat_mode = RepeatMode::All;
        assert_eq!(seq.next(&state), Step::Restart);
        assert_eq!(seq.previous(&state, 0.0), Step::Restart);
    }

    #[test]
    fn previous_restarts_after_three_seconds() {
        let c = catalog(3);
        let mut seq = Sequencer::with_seed(3, 1);
        let state = playing(&mut seq, &c, 2);
        assert_eq!(seq.previous(&state, 3.5), Step::Restart);
        assert_eq!(seq.previous(&state, 3.0), Step::Load(1));
    }

    #[test]
    fn previous_at_first_index() {
        let c = catalog(3);
        let mut seq = Sequencer::with_seed(3, 1);
        let mut state = playing(&mut seq, &c, 0);
        assert_eq!(seq.previous(&state, 1.0), Step::Restart);
        state.repeat_mode = RepeatMode::All;
        assert_eq!(seq.previous(&state, 1.0), Step::Load(2));
    }

    #[test]
    fn enabling_shuffle_pins_current_track_first() {
        let c = catalog(20);
        let mut seq = Sequencer::with_seed(20, 7);
        let mut state = playing(&mut seq, &c, 13);
        seq.set_shuffle(&mut state, &c, true);

        assert_eq!(seq.shuffled()[0], 13);
        assert_eq!(state.current_index, Some(0));
        assert_eq!(seq.current_track(&state), Some(13));

        let mut sorted = seq.shuffled().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, seq.linear());
    }

    #[test]
    fn disabling_shuffle_restores_linear_index() {
        let c = catalog(10);
        let mut seq = Sequencer::with_seed(10, 3);
        let mut state = playing(&mut seq, &c, 6);
        seq.set_shuffle(&mut state, &c, true);
        let next = seq.next(&state);
        if let Step::Load(track) = next {
            seq.select(&mut state, &c, track);
        }
        let track = seq.current_track(&state).unwrap();

        seq.set_shuffle(&mut state, &c, false);
        assert!(seq.shuffled().is_empty());
        assert_eq!(state.current_index, Some(track));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let c = catalog(12);
        let mut seq = Sequencer::with_seed(12, 5);
        let mut state = playing(&mut seq, &c, 4);
        seq.set_shuffle(&mut state, &c, true);
        let order = seq.shuffled().to_vec();
        let index = state.current_index;

        seq.reconcile(&mut state, &c, false);
        seq.reconcile(&mut state, &c, false);
        assert_eq!(seq.shuffled(), order.as_slice());
        assert_eq!(state.current_index, index);
    }

    #[test]
    fn unknown_current_track_has_no_index() {
        let c = catalog(3);
        let mut seq = Sequencer::with_seed(3, 1);
        let mut state = PlaybackState {
            current_track_id: Some("missing".into()),
            ..Default::default()
        };
        seq.reconcile(&mut state, &c, false);
        assert_eq!(state.current_index, None);
        assert_eq!(seq.previous(&state, 0.0), Step::Idle);
    }
}
