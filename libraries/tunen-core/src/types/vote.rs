/// Voting and rating types
use serde::{Deserialize, Serialize};
use std::fmt;

/// A viewer's vote on someone else's playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    /// Convert vote to string for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }

    /// Parse vote from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upvote" | "up" => Some(VoteType::Upvote),
            "downvote" | "down" => Some(VoteType::Downvote),
            _ => None,
        }
    }

    /// Past tense used in notices ("Playlist upvoted!")
    pub fn past_tense(&self) -> &'static str {
        match self {
            VoteType::Upvote => "upvoted",
            VoteType::Downvote => "downvoted",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge a viewer can award a playlist; surfaced as a notice only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    BestMusicTaste,
    SmoothTransitions,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::BestMusicTaste => "Best Music Taste",
            Rating::SmoothTransitions => "Smooth Music Transitions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "best-music-taste" | "taste" => Some(Rating::BestMusicTaste),
            "smooth-transitions" | "transitions" => Some(Rating::SmoothTransitions),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_string_conversion() {
        assert_eq!(VoteType::Upvote.as_str(), "upvote");
        assert_eq!(VoteType::parse("down"), Some(VoteType::Downvote));
        assert_eq!(VoteType::parse("sideways"), None);
        assert_eq!(VoteType::Downvote.past_tense(), "downvoted");
    }

    #[test]
    fn rating_labels() {
        assert_eq!(Rating::parse("taste"), Some(Rating::BestMusicTaste));
        assert_eq!(Rating::SmoothTransitions.label(), "Smooth Music Transitions");
    }
}
