mod ids;
mod playlist;
mod track;
mod user;
mod vote;

pub use ids::{PlaylistId, TrackId, UserId};
pub use playlist::{NewPlaylist, Playlist, PlaylistPatch, PlaylistRecord, StoredPlaylist};
pub use track::{CatalogPlaylist, CatalogUser, SearchKind, SearchResults, TrackRef};
pub use user::UserProfile;
pub use vote::{Rating, VoteType};
