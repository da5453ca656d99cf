//! mgc - command-line front end for the music genre classifier
//!
//! Plays the part of the web UI: classify a file (falling back to the
//! simulated classifier when the API is down), rate a prediction, show
//! rating statistics and re-send ratings queued while the API was away.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mgc_client::config::{
    default_pending_path, ClientConfig, DEFAULT_ANALYZE_TIMEOUT, DEFAULT_API_URL,
};
use mgc_client::flow::{ApiStatus, Classification, ClassificationFlow};
use mgc_client::pending::{submit_or_queue, PendingRatings};
use mgc_client::{ApiClient, AudioFile, Degradable, RatingDraft};
use mgc_common::logging::{directives_for, init_tracing};
use mgc_common::GenreLabel;

#[derive(Parser, Debug)]
#[command(name = "mgc", version, about = "Music genre classifier client")]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "NEXT_PUBLIC_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    /// Timeout for audio analysis requests in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_ANALYZE_TIMEOUT.as_secs())]
    analyze_timeout_secs: u64,

    /// Queue file for ratings not yet delivered
    #[arg(long, global = true, env = "MGC_PENDING_FILE")]
    pending_file: Option<PathBuf>,

    /// Log level for mgc crates
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the API is reachable
    Health,

    /// Classify an audio file
    Classify {
        file: PathBuf,

        /// Skip the API and use the simulated classifier
        #[arg(long)]
        simulate: bool,

        /// Write the returned spectrogram PNG here
        #[arg(long)]
        spectrogram_out: Option<PathBuf>,

        /// Pause before a simulated result, in milliseconds
        #[arg(long, default_value_t = 1500)]
        simulated_delay_ms: u64,
    },

    /// Rate a prediction
    #[command(group(ArgGroup::new("verdict").required(true).args(["correct", "incorrect"])))]
    Rate {
        #[arg(long)]
        audio_id: String,

        #[arg(long)]
        predicted: GenreLabel,

        /// The prediction was right
        #[arg(long)]
        correct: bool,

        /// The prediction was wrong; give --actual
        #[arg(long)]
        incorrect: bool,

        /// Actual genre when the prediction was wrong
        #[arg(long)]
        actual: Option<GenreLabel>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Show rating statistics
    Stats,

    /// Re-send queued ratings
    FlushPending,

    /// List genre labels
    Genres,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&directives_for(&cli.log_level, &["mgc_client", "mgc_common"]));

    let config = ClientConfig::new(cli.api_url.as_str())
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_analyze_timeout(Duration::from_secs(cli.analyze_timeout_secs));
    let client = ApiClient::new(config).context("Failed to build HTTP client")?;
    let pending = PendingRatings::new(cli.pending_file.unwrap_or_else(default_pending_path));

    match cli.command {
        Command::Health => health(&client).await,
        Command::Classify {
            file,
            simulate,
            spectrogram_out,
            simulated_delay_ms,
        } => {
            classify(
                client,
                &file,
                simulate,
                spectrogram_out.as_deref(),
                Duration::from_millis(simulated_delay_ms),
            )
            .await
        }
        Command::Rate {
            audio_id,
            predicted,
            correct,
            actual,
            comment,
            ..
        } => {
            let mut draft = RatingDraft::new(audio_id, predicted);
            if correct {
                draft.mark_correct();
            } else {
                draft.mark_incorrect(actual);
            }
            if let Some(comment) = comment {
                draft.set_comment(comment);
            }
            rate(&client, &pending, &draft).await
        }
        Command::Stats => stats(&client).await,
        Command::FlushPending => flush(&client, &pending).await,
        Command::Genres => {
            for genre in GenreLabel::ALL {
                println!("{:<10} {}", genre.as_str(), genre.description());
            }
            Ok(())
        }
    }
}

async fn health(client: &ApiClient) -> Result<()> {
    let health = client
        .check_health()
        .await
        .with_context(|| format!("API at {} is not reachable", client.base_url()))?;

    println!("{}: {}", health.status, health.message);
    if !health.version.is_empty() {
        println!("{} v{} (up {}s)", health.module, health.version, health.uptime_seconds);
    }
    Ok(())
}

async fn classify(
    client: ApiClient,
    path: &Path,
    simulate: bool,
    spectrogram_out: Option<&Path>,
    simulated_delay: Duration,
) -> Result<()> {
    let file = AudioFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut flow = ClassificationFlow::new(client).with_simulated_delay(simulated_delay);
    if !simulate {
        if let ApiStatus::Unavailable(message) = flow.connect().await {
            eprintln!("{}", message);
        }
    }

    flow.select_file(file)?;
    let selected_size = flow
        .selected_file()
        .map(|file| file.size_label())
        .unwrap_or_default();
    println!("Analyzing {} ({})...", path.display(), selected_size);

    let classification = flow.analyze().await?;
    print_classification(&classification);

    if let Some(out) = spectrogram_out {
        match classification.result.spectrogram.as_deref() {
            Some(encoded) => {
                write_spectrogram(encoded, out)?;
                println!("Spectrogram written to {}", out.display());
            }
            None => eprintln!("No spectrogram available for this result"),
        }
    }
    Ok(())
}

fn print_classification(classification: &Classification) {
    let result = &classification.result;

    if let Some(notice) = &classification.notice {
        println!("{}", notice);
    }
    println!(
        "Genre: {} ({:.1}% confidence)",
        result.genre,
        result.confidence * 100.0
    );
    println!("{}", result.genre.description());
    println!("Top genres:");
    for (rank, (genre, confidence)) in result
        .top_genres
        .iter()
        .zip(&result.top_confidences)
        .enumerate()
    {
        println!("  {}. {:<10} {:>5.1}%", rank + 1, genre, confidence * 100.0);
    }
}

/// Decode a base64 PNG, with or without a `data:` URL prefix
fn write_spectrogram(encoded: &str, out: &Path) -> Result<()> {
    let payload = encoded
        .split_once(";base64,")
        .map(|(_, data)| data)
        .unwrap_or(encoded);
    let png = STANDARD
        .decode(payload.trim())
        .context("Spectrogram is not valid base64")?;
    std::fs::write(out, png).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(())
}

async fn rate(client: &ApiClient, pending: &PendingRatings, draft: &RatingDraft) -> Result<()> {
    let submission = draft.to_submission()?;

    let (outcome, queued) = submit_or_queue(client, pending, &submission).await?;
    match outcome {
        Degradable::Live(response) => {
            println!("{}", response.message);
            if let Some(total) = response.total_ratings {
                println!("Total ratings: {}", total);
            }
            Ok(())
        }
        Degradable::Degraded { fallback, cause } => {
            if cause.is_rejection() {
                bail!("Rating rejected: {}", cause);
            }
            println!("{}", fallback.message);
            if let Some(count) = queued {
                println!("Queued ratings: {} ({})", count, pending.path().display());
            }
            Ok(())
        }
    }
}

async fn stats(client: &ApiClient) -> Result<()> {
    let outcome = client.get_rating_stats().await;
    if let Some(cause) = outcome.cause() {
        eprintln!("Statistics unavailable: {}", cause);
    }

    let stats = outcome.value();
    println!("Total ratings: {}", stats.total_ratings);
    println!("Correct predictions: {}", stats.correct_predictions);
    println!("Accuracy: {:.1}%", stats.accuracy_rate * 100.0);
    for (genre, genre_stats) in &stats.genre_stats {
        println!(
            "  {:<10} {:>4}/{:<4} {:>5.1}%",
            genre,
            genre_stats.correct,
            genre_stats.total,
            genre_stats.rate * 100.0
        );
    }
    Ok(())
}

async fn flush(client: &ApiClient, pending: &PendingRatings) -> Result<()> {
    let report = pending
        .flush(client)
        .await
        .with_context(|| format!("Failed to flush {}", pending.path().display()))?;

    println!(
        "Delivered: {}, rejected: {}, still queued: {}",
        report.delivered, report.rejected, report.remaining
    );
    Ok(())
}
