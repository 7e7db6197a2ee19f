//! CLI entry point for the playlist profiler.
//!
//! Provides subcommands for comparing audio features across playlist
//! categories and for deriving a recommendation query from a baseline
//! category's statistics.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use playlist_profiler::analysis::{self, Group};
use playlist_profiler::collect::{self, Track};
use playlist_profiler::enrich::{self, EnrichError};
use playlist_profiler::infra::spotify::client::SpotifyClient;
use playlist_profiler::input::PlaylistSet;
use playlist_profiler::output;
use playlist_profiler::rank;
use playlist_profiler::recommend;
use playlist_profiler::services::music_api::MusicApi;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "playlist_profiler")]
#[command(about = "Statistical comparison of categorized playlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare audio features across playlist categories
    Analyze {
        /// CSV file with category,link rows
        #[arg(short, long, default_value = "playlists.csv")]
        input: String,

        /// Category every other category is tested against
        #[arg(short, long, default_value = "happy")]
        baseline: String,

        /// Audio features to analyze
        #[arg(short, long, value_delimiter = ',', default_values_t = default_features())]
        features: Vec<String>,

        /// CSV file to append descriptive summaries to
        #[arg(long, default_value = "summaries.csv")]
        summary_output: String,

        /// CSV file to append hypothesis test results to
        #[arg(long, default_value = "tests.csv")]
        test_output: String,
    },
    /// Derive and run a recommendation query from the baseline category
    Recommend {
        /// CSV file with category,link rows
        #[arg(short, long, default_value = "playlists.csv")]
        input: String,

        /// Category whose statistics seed the recommendation
        #[arg(short, long, default_value = "happy")]
        baseline: String,

        /// Audio features to derive bounds for
        #[arg(short, long, value_delimiter = ',', default_values_t = default_features())]
        features: Vec<String>,

        /// Number of seed genres to include
        #[arg(short, long, default_value_t = rank::DEFAULT_SEED_COUNT)]
        seeds: usize,
    },
}

fn default_features() -> Vec<String> {
    [
        "tempo",
        "loudness",
        "energy",
        "danceability",
        "speechiness",
        "valence",
    ]
    .map(str::to_string)
    .to_vec()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/playlist_profiler.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("playlist_profiler.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            baseline,
            features,
            summary_output,
            test_output,
        } => {
            analyze(&input, &baseline, &features, &summary_output, &test_output).await?;
        }
        Commands::Recommend {
            input,
            baseline,
            features,
            seeds,
        } => {
            recommend_from_baseline(&input, &baseline, &features, seeds).await?;
        }
    }

    Ok(())
}

/// One fully loaded category: deduplicated tracks plus their feature group.
struct CategoryData {
    name: String,
    tracks: Vec<Track>,
    group: Group,
}

async fn spotify_client() -> Result<SpotifyClient> {
    let client_id = std::env::var("SPOTIFY_CLIENT_ID").context("SPOTIFY_CLIENT_ID must be set")?;
    let client_secret =
        std::env::var("SPOTIFY_CLIENT_SECRET").context("SPOTIFY_CLIENT_SECRET must be set")?;
    SpotifyClient::new(&client_id, &client_secret).await
}

/// Collects, deduplicates and enriches every track of one category.
async fn load_category<C: MusicApi>(
    api: &C,
    name: &str,
    playlist_ids: &HashSet<String>,
) -> Result<CategoryData> {
    let raw = collect::collect_tracks(api, playlist_ids).await?;
    let tracks = collect::dedup_tracks(raw);
    info!(category = name, tracks = tracks.len(), "tracks retrieved");

    let ids = collect::track_ids(&tracks);
    let features = match enrich::fetch_features_chunked(api, &ids).await {
        Ok(features) => features,
        Err(EnrichError::EmptyInput) => {
            warn!(category = name, "category has no enrichable tracks");
            HashMap::new()
        }
        Err(EnrichError::Io(e)) => return Err(e),
    };

    Ok(CategoryData {
        name: name.to_string(),
        group: analysis::group_from_tracks(name, &tracks, &features),
        tracks,
    })
}

/// Runs the full comparison pipeline: collect every category, summarize each
/// (group, feature) pair, then Welch-test every other category against the
/// baseline and correct the whole family at once.
async fn analyze(
    input: &str,
    baseline: &str,
    features: &[String],
    summary_output: &str,
    test_output: &str,
) -> Result<()> {
    let playlists = PlaylistSet::load(input)?;
    if playlists.get(baseline).is_none() {
        bail!("baseline category {baseline:?} not present in {input}");
    }

    let api = spotify_client().await?;

    let mut categories = Vec::new();
    for (name, ids) in playlists.iter() {
        categories.push(load_category(&api, name, ids).await?);
    }

    let mut summaries = Vec::new();
    for data in &categories {
        for feature in features {
            summaries.push(analysis::describe(&data.group, feature)?);
        }
    }
    output::append_summary_records(summary_output, &summaries)?;

    let baseline_data = categories
        .iter()
        .find(|c| c.name == baseline)
        .context("baseline category missing after load")?;
    let comparisons: Vec<&Group> = categories
        .iter()
        .filter(|c| c.name != baseline)
        .map(|c| &c.group)
        .collect();

    let results = analysis::run_pairwise_tests(&baseline_data.group, &comparisons, features)?;
    output::append_test_records(test_output, &results)?;

    info!(
        summaries = summaries.len(),
        tests = results.len(),
        "analysis complete"
    );
    Ok(())
}

/// Derives feature bounds and seed genres from the baseline category and
/// runs the recommendation query.
async fn recommend_from_baseline(
    input: &str,
    baseline: &str,
    features: &[String],
    seeds: usize,
) -> Result<()> {
    let playlists = PlaylistSet::load(input)?;
    let Some(ids) = playlists.get(baseline) else {
        bail!("baseline category {baseline:?} not present in {input}");
    };

    let api = spotify_client().await?;
    let data = load_category(&api, baseline, ids).await?;

    let mut summaries = Vec::new();
    for feature in features {
        summaries.push(analysis::describe(&data.group, feature)?);
    }

    let artist_ids = rank::referenced_artist_ids(&data.tracks);
    let artists = match enrich::fetch_artists_chunked(&api, &artist_ids).await {
        Ok(artists) => artists,
        Err(EnrichError::EmptyInput) => {
            warn!(category = baseline, "no artist references to rank");
            HashMap::new()
        }
        Err(EnrichError::Io(e)) => return Err(e),
    };

    // Counting follows first-reference order so genre ties rank
    // deterministically.
    let ordered: Vec<&serde_json::Value> =
        artist_ids.iter().filter_map(|id| artists.get(id)).collect();
    let counts = rank::count_genres(ordered);
    let allowed = api.fetch_allowed_genres().await?;
    let seed_genres = rank::top_genres(counts, &allowed, seeds);

    let query = recommend::build_query(&summaries, seed_genres);
    output::print_json(&query)?;

    let tracks = api.query_recommendations(&query).await?;
    info!(count = tracks.len(), "recommendations received");
    output::print_recommendations(&tracks);

    Ok(())
}
