//! Voting overlay
//!
//! A pure transformation from a playlist and a vote to the next playlist
//! value. One vote per viewer per playlist: once `has_voted` is set the
//! overlay refuses further votes.

use crate::error::{Result, TuneError};
use crate::types::{Playlist, VoteType};

/// Apply `vote` to `playlist`, returning the updated copy.
///
/// The input is never modified. Fails with [`TuneError::AlreadyVoted`] when
/// the viewer has already voted.
pub fn apply_vote(playlist: &Playlist, vote: VoteType) -> Result<Playlist> {
    if playlist.has_voted {
        return Err(TuneError::AlreadyVoted(playlist.id.clone()));
    }

    let mut next = playlist.clone();
    match vote {
        VoteType::Upvote => next.upvotes = next.upvotes.saturating_add(1),
        VoteType::Downvote => next.downvotes = next.downvotes.saturating_add(1),
    }
    next.has_voted = true;

    Ok(next)
}

/// Net score shown next to a playlist
pub fn score(playlist: &Playlist) -> i64 {
    i64::from(playlist.upvotes) - i64::from(playlist.downvotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlaylistId, UserId};
    use proptest::prelude::*;

    fn playlist(upvotes: u32, downvotes: u32, has_voted: bool) -> Playlist {
        let mut p = Playlist::new(PlaylistId::new("p1"), "road trip", UserId::new("alice"));
        p.upvotes = upvotes;
        p.downvotes = downvotes;
        p.has_voted = has_voted;
        p
    }

    #[test]
    fn upvote_increments_upvotes() {
        let before = playlist(2, 0, false);
        let after = apply_vote(&before, VoteType::Upvote).unwrap();

        assert_eq!(after.upvotes, 3);
        assert_eq!(after.downvotes, 0);
        assert!(after.has_voted);

        // Input untouched
        assert_eq!(before.upvotes, 2);
        assert!(!before.has_voted);
    }

    #[test]
    fn downvote_after_voting_is_rejected() {
        let before = playlist(5, 1, true);
        let result = apply_vote(&before, VoteType::Downvote);

        match result {
            Err(TuneError::AlreadyVoted(id)) => assert_eq!(id.as_str(), "p1"),
            other => panic!("Expected AlreadyVoted, got {:?}", other),
        }
        assert_eq!(before.upvotes, 5);
        assert_eq!(before.downvotes, 1);
    }

    #[test]
    fn counters_saturate() {
        let before = playlist(u32::MAX, 0, false);
        let after = apply_vote(&before, VoteType::Upvote).unwrap();
        assert_eq!(after.upvotes, u32::MAX);
    }

    #[test]
    fn score_is_signed() {
        assert_eq!(score(&playlist(1, 4, false)), -3);
    }

    proptest! {
        /// Property: a voted playlist never changes under another vote
        #[test]
        fn voted_playlists_are_frozen(up in 0u32..10_000, down in 0u32..10_000, upvote in any::<bool>()) {
            let voted = playlist(up, down, true);
            let vote = if upvote { VoteType::Upvote } else { VoteType::Downvote };

            let is_already_voted = matches!(apply_vote(&voted, vote), Err(TuneError::AlreadyVoted(_)));
            prop_assert!(is_already_voted);
            prop_assert_eq!(voted.upvotes, up);
            prop_assert_eq!(voted.downvotes, down);
        }

        /// Property: a successful vote moves exactly one counter by exactly one
        #[test]
        fn exactly_one_counter_moves(up in 0u32..10_000, down in 0u32..10_000, upvote in any::<bool>()) {
            let fresh = playlist(up, down, false);
            let vote = if upvote { VoteType::Upvote } else { VoteType::Downvote };

            let next = apply_vote(&fresh, vote).unwrap();
            prop_assert_eq!(u64::from(next.upvotes) + u64::from(next.downvotes), u64::from(up) + u64::from(down) + 1);
            prop_assert!(next.upvotes >= up);
            prop_assert!(next.downvotes >= down);
            prop_assert!(next.has_voted);
        }
    }
}
