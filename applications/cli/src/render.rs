//! Plain-text rendering of screen state

use std::fmt::Write;
use tunen_core::types::{CatalogPlaylist, CatalogUser, Playlist, TrackRef, UserProfile};
use tunen_core::voting::score;
use tunen_playlists::{Notice, NoticeLevel};

pub const NOT_LOGGED_IN: &str = "You are not logged in. Run `tunen login-url`, open the link, \
then run `tunen capture <redirected-url>`.";

/// One line per playlist: id, name, score, song count and vote marker
pub fn playlists(playlists: &[Playlist]) -> String {
    if playlists.is_empty() {
        return "No playlists yet.\n".to_string();
    }

    let mut out = String::new();
    for playlist in playlists {
        let _ = write!(
            out,
            "{}  {}  [{:+}  +{} / -{}]  {} song{}",
            playlist.id,
            playlist.name,
            score(playlist),
            playlist.upvotes,
            playlist.downvotes,
            playlist.track_count(),
            if playlist.track_count() == 1 { "" } else { "s" },
        );
        if playlist.has_voted {
            out.push_str("  (voted)");
        }
        out.push('\n');
    }
    out
}

/// Playlist header followed by its numbered tracks
pub fn playlist_details(playlist: &Playlist, tracks: &[TrackRef]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (by {})", playlist.name, playlist.owner);
    let _ = writeln!(
        out,
        "Score {:+}  created {}",
        score(playlist),
        playlist.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(image) = &playlist.image {
        let _ = writeln!(out, "Image {}", image);
    }
    out.push_str(&self::tracks(tracks));
    out
}

pub fn tracks(tracks: &[TrackRef]) -> String {
    if tracks.is_empty() {
        return "No songs.\n".to_string();
    }

    let mut out = String::new();
    for (index, track) in tracks.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}  ({})", index + 1, track, track.id);
    }
    out
}

pub fn catalog_playlists(playlists: &[CatalogPlaylist]) -> String {
    if playlists.is_empty() {
        return "No catalog playlists.\n".to_string();
    }

    let mut out = String::new();
    for playlist in playlists {
        match playlist.track_total {
            Some(total) => {
                let _ = writeln!(out, "{}  {}  ({} songs)", playlist.id, playlist.name, total);
            }
            None => {
                let _ = writeln!(out, "{}  {}", playlist.id, playlist.name);
            }
        }
    }
    out
}

/// Account header, followers and the notification wall
pub fn profile(user: &CatalogUser, profile: Option<&UserProfile>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", user.display_name.as_deref().unwrap_or(&user.id));
    if let Some(email) = &user.email {
        let _ = writeln!(out, "Email: {}", email);
    }

    let Some(profile) = profile else {
        return out;
    };

    let _ = writeln!(out, "Followers: {}", profile.followers.len());
    for follower in &profile.followers {
        let _ = writeln!(out, "  {}", follower);
    }
    if !profile.messages.is_empty() {
        out.push_str("Notifications:\n");
        for message in &profile.messages {
            let _ = writeln!(out, "  {}", message);
        }
    }
    out
}

pub fn notices(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let marker = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "[{}] {}", marker, notice);
    }
    out
}
