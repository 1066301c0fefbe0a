/// Tune'n - playlist curation from the terminal
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunen_cli::{commands, render, App, CliError, TunenConfig};
use tunen_core::types::{Rating, VoteType};

#[derive(Parser)]
#[command(name = "tunen")]
#[command(about = "Curate, share and vote on playlists", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./tunen.toml)
    #[arg(short, long, global = true, env = "TUNEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the catalog authorization URL
    LoginUrl {
        /// Use the authorization-code flow instead of the implicit grant
        #[arg(long)]
        code: bool,
    },
    /// Finish login with the URL the browser was redirected to
    Capture {
        url: String,
    },
    /// Forget the stored credential
    Logout,
    /// Search catalog tracks
    Search {
        query: String,
        /// Track ids to select from the results
        #[arg(long = "select")]
        select: Vec<String>,
        /// Catalog playlist that receives the selected tracks
        #[arg(long, requires = "select")]
        add_to: Option<String>,
    },
    /// List playlists
    Playlists {
        /// Whose playlists to show (defaults to you)
        #[arg(long)]
        owner: Option<String>,
    },
    /// Create a playlist
    Create {
        name: String,
        /// Initial track ids
        #[arg(long = "track")]
        tracks: Vec<String>,
        #[arg(long)]
        image: Option<String>,
        /// Also create an empty playlist on the catalog account
        #[arg(long)]
        on_catalog: bool,
    },
    /// Delete one of your playlists
    Remove {
        id: String,
    },
    /// Append tracks to one of your playlists
    AddSongs {
        playlist: String,
        #[arg(required = true)]
        tracks: Vec<String>,
    },
    /// Vote on a playlist
    Vote {
        id: String,
        /// up or down
        #[arg(value_parser = parse_vote)]
        vote: VoteType,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Award a playlist a badge
    Rate {
        id: String,
        /// best-music-taste or smooth-transitions
        #[arg(value_parser = parse_rating)]
        rating: Rating,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show a playlist with its tracks
    Details {
        id: String,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show your account and followers
    Profile,
    /// List playlists on your catalog account
    CatalogPlaylists,
}

fn parse_vote(s: &str) -> Result<VoteType, String> {
    VoteType::parse(s).ok_or_else(|| format!("unknown vote: {}", s))
}

fn parse_rating(s: &str) -> Result<Rating, String> {
    Rating::parse(s).ok_or_else(|| format!("unknown rating: {}", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tunen_cli=info,tunen_catalog=info,tunen_docstore=info,tunen_playlists=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = TunenConfig::load(cli.config.as_deref())?;
    let mut app = App::new(config).await?;

    let output = match run(&mut app, cli.command).await {
        Ok(output) => output,
        Err(CliError::NotLoggedIn) => format!("{}\n", render::NOT_LOGGED_IN),
        Err(e) => return Err(e.into()),
    };
    print!("{}", output);

    if app.persist_session().await? {
        tracing::info!("Stored credential renewed");
    }

    Ok(())
}

async fn run(app: &mut App, command: Commands) -> tunen_cli::Result<String> {
    match command {
        Commands::LoginUrl { code } => commands::login_url(app, code),
        Commands::Capture { url } => commands::capture(app, &url).await,
        Commands::Logout => commands::logout(app),
        Commands::Search {
            query,
            select,
            add_to,
        } => commands::search(app, &query, &select, add_to.as_deref()).await,
        Commands::Playlists { owner } => commands::playlists(app, owner.as_deref()).await,
        Commands::Create {
            name,
            tracks,
            image,
            on_catalog,
        } => commands::create(app, &name, &tracks, image, on_catalog).await,
        Commands::Remove { id } => commands::remove(app, &id).await,
        Commands::AddSongs { playlist, tracks } => {
            commands::add_songs(app, &playlist, &tracks).await
        }
        Commands::Vote { id, vote, owner } => {
            commands::vote(app, &id, vote, owner.as_deref()).await
        }
        Commands::Rate { id, rating, owner } => {
            commands::rate(app, &id, rating, owner.as_deref()).await
        }
        Commands::Details { id, owner } => commands::details(app, &id, owner.as_deref()).await,
        Commands::Profile => commands::profile(app).await,
        Commands::CatalogPlaylists => commands::catalog_playlists(app).await,
    }
}
