//! Track selection set.

use tunen_core::TrackId;

/// Set of selected tracks, kept in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    tracks: Vec<TrackId>,
}

impl TrackSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `track`; returns whether it is now selected.
    ///
    /// Toggling the same track twice restores the previous set.
    pub fn toggle(&mut self, track: &TrackId) -> bool {
        if let Some(pos) = self.tracks.iter().position(|t| t == track) {
            self.tracks.remove(pos);
            false
        } else {
            self.tracks.push(track.clone());
            true
        }
    }

    /// Deselect `track` if present
    pub fn remove(&mut self, track: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t != track);
        self.tracks.len() != before
    }

    pub fn contains(&self, track: &TrackId) -> bool {
        self.tracks.contains(track)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = TrackSelection::new();
        let t = TrackId::new("t1");

        assert!(selection.toggle(&t));
        assert!(selection.contains(&t));
        assert!(!selection.toggle(&t));
        assert!(selection.is_empty());
    }

    #[test]
    fn keeps_pick_order() {
        let mut selection = TrackSelection::new();
        for id in ["c", "a", "b"] {
            selection.toggle(&TrackId::new(id));
        }
        let ids: Vec<_> = selection.tracks().iter().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    proptest! {
        #[test]
        fn toggle_twice_is_identity(
            initial in prop::collection::vec("[a-e]", 0..6),
            target in "[a-g]",
        ) {
            let mut selection = TrackSelection::new();
            for id in &initial {
                if !selection.contains(&TrackId::new(id.clone())) {
                    selection.toggle(&TrackId::new(id.clone()));
                }
            }
            let before = selection.clone();
            let target = TrackId::new(target);

            selection.toggle(&target);
            selection.toggle(&target);

            // Same members; a re-added member moves to the end
            let mut a: Vec<_> = before.tracks().to_vec();
            let mut b: Vec<_> = selection.tracks().to_vec();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }
    }
}
