//! Command handlers
//!
//! Each handler opens the screen it needs, performs one action and returns
//! the text to print, followed by whatever notices the screen posted.

use crate::app::App;
use crate::error::{CliError, Result};
use crate::render;
use tracing::debug;
use tunen_core::types::{PlaylistId, Rating, TrackId, UserId, VoteType};
use tunen_core::{CatalogGateway, TuneError};
use tunen_playlists::{resolve_tracks, Outcome, PlaylistViewModel};

pub fn login_url(app: &App, code_flow: bool) -> Result<String> {
    let url = app.authorize_url(code_flow)?;
    Ok(format!(
        "Open this URL, approve access, then run `tunen capture <redirected-url>`:\n{}\n",
        url
    ))
}

pub async fn capture(app: &mut App, redirected: &str) -> Result<String> {
    let user = app.capture(redirected).await?;
    Ok(format!(
        "Logged in as {}\n",
        user.display_name.as_deref().unwrap_or(&user.id)
    ))
}

pub fn logout(app: &mut App) -> Result<String> {
    Ok(if app.logout()? {
        "Logged out.\n".to_string()
    } else {
        "Nobody was logged in.\n".to_string()
    })
}

/// Search tracks; optionally select some results and append them to a
/// catalog playlist.
pub async fn search(
    app: &App,
    query: &str,
    select: &[String],
    add_to: Option<&str>,
) -> Result<String> {
    let search = app.track_search()?;

    let result = async {
        let mut out = String::new();
        if search.search(query).await? == Outcome::Superseded {
            return Ok(out);
        }
        out.push_str(&render::tracks(&search.results().await));

        for id in select {
            search.toggle(&TrackId::new(id.as_str())).await?;
        }
        if let Some(playlist_id) = add_to {
            search.add_selected(playlist_id).await?;
        }
        Ok::<_, CliError>(out)
    }
    .await;

    let notices = search.notices().await;
    search.dispose();
    finish(result, &notices)
}

pub async fn playlists(app: &App, owner: Option<&str>) -> Result<String> {
    let view = open_playlists(app, owner).await?;
    let out = render::playlists(&view.playlists().await);
    close(&view, Ok(out)).await
}

pub async fn create(
    app: &App,
    name: &str,
    tracks: &[String],
    image: Option<String>,
    on_catalog: bool,
) -> Result<String> {
    let view = app.view_model()?;
    let tracks: Vec<TrackId> = tracks.iter().map(|id| TrackId::new(id.as_str())).collect();

    let result = async {
        let id = view
            .create(name, tracks, image, view.viewer().clone())
            .await?;
        let mut out = format!("Created {}\n", id);

        if on_catalog {
            let session = &app.auth().account()?.session;
            let catalog = app.catalog();
            let created = session
                .with_refresh(|| catalog.create_playlist(session, name))
                .await?;
            out.push_str(&format!("Catalog playlist {}\n", created.id));
        }
        Ok::<_, CliError>(out)
    }
    .await;

    close(&view, result).await
}

pub async fn remove(app: &App, id: &str) -> Result<String> {
    let view = open_playlists(app, None).await?;
    let id = PlaylistId::new(id);
    let result = view
        .remove(&id)
        .await
        .map(|()| format!("Removed {}\n", id))
        .map_err(CliError::from);
    close(&view, result).await
}

/// Append tracks to one of the viewer's stored playlists.
pub async fn add_songs(app: &App, playlist: &str, tracks: &[String]) -> Result<String> {
    let view = open_playlists(app, None).await?;

    let result = async {
        for id in tracks {
            view.toggle_track_selection(&TrackId::new(id.as_str())).await?;
        }
        let playlist = view.append_selected(&PlaylistId::new(playlist)).await?;
        Ok::<_, CliError>(render::playlists(std::slice::from_ref(&playlist)))
    }
    .await;

    close(&view, result).await
}

pub async fn vote(app: &App, id: &str, vote: VoteType, owner: Option<&str>) -> Result<String> {
    let view = open_playlists(app, owner).await?;
    let result = view
        .vote(&PlaylistId::new(id), vote)
        .await
        .map(|playlist| render::playlists(std::slice::from_ref(&playlist)))
        .map_err(CliError::from);
    close(&view, result).await
}

pub async fn rate(app: &App, id: &str, rating: Rating, owner: Option<&str>) -> Result<String> {
    let view = open_playlists(app, owner).await?;
    // The rating notice is the whole output
    let result = view
        .rate(&PlaylistId::new(id), rating)
        .await
        .map(|_| String::new())
        .map_err(CliError::from);
    close(&view, result).await
}

pub async fn details(app: &App, id: &str, owner: Option<&str>) -> Result<String> {
    let view = open_playlists(app, owner).await?;
    let id = PlaylistId::new(id);

    let result = async {
        let playlist = view
            .playlist(&id)
            .await
            .ok_or_else(|| TuneError::not_found("Playlist", id.as_str()))?;
        let session = &app.auth().account()?.session;
        let tracks = resolve_tracks(app.catalog(), session, &playlist).await?;
        Ok::<_, CliError>(render::playlist_details(&playlist, &tracks))
    }
    .await;

    close(&view, result).await
}

/// Catalog profile plus the follower document from the store.
pub async fn profile(app: &App) -> Result<String> {
    let session = &app.auth().account()?.session;
    let catalog = app.catalog();
    let user = session
        .with_refresh(|| async {
            catalog
                .current_user(session)
                .await
                .map_err(TuneError::from)
        })
        .await?;

    let profile = match &user.email {
        Some(email) => app.store().find_user(email).await?,
        None => None,
    };
    Ok(render::profile(&user, profile.as_ref()))
}

pub async fn catalog_playlists(app: &App) -> Result<String> {
    let search = app.track_search()?;
    let result = search
        .target_playlists()
        .await
        .map(|playlists| render::catalog_playlists(&playlists))
        .map_err(CliError::from);
    let notices = search.notices().await;
    search.dispose();
    finish(result, &notices)
}

/// View-model with `owner`'s playlists loaded; the viewer's by default.
async fn open_playlists(app: &App, owner: Option<&str>) -> Result<PlaylistViewModel> {
    let view = app.view_model()?;
    let owner = owner.map_or_else(|| view.viewer().clone(), UserId::new);
    debug!(owner = %owner, "Opening playlists");

    if let Err(e) = view.load(&owner).await {
        view.dispose();
        return Err(e.into());
    }
    Ok(view)
}

async fn close(view: &PlaylistViewModel, result: Result<String>) -> Result<String> {
    let notices = view.notices().await;
    view.dispose();
    finish(result, &notices)
}

/// Append notices to successful output. On failure the error is returned
/// as is; its notice carries the same message.
fn finish(result: Result<String>, notices: &[tunen_playlists::Notice]) -> Result<String> {
    let mut out = result?;
    out.push_str(&render::notices(notices));
    Ok(out)
}
