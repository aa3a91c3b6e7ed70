//! Keepmark CLI - mirror a remote notes service into local markdown files
//!
//! One invocation runs one reconciliation pass and reports the tally.

mod error;

use std::path::PathBuf;

use clap::Parser;
use keepmark_core::{run_sync, HttpRemoteClient, SyncOptions, SyncSummary};

use error::CliError;

#[derive(Parser)]
#[command(name = "keepmark")]
#[command(about = "Sync remote notes into a local directory of markdown files")]
#[command(version)]
struct Cli {
    /// Output directory for exported notes
    #[arg(short, long, value_name = "PATH", default_value = "./keepmark-export")]
    directory: PathBuf,

    /// Base URL of the notes bridge API
    #[arg(long, env = "KEEPMARK_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Access token for the notes bridge
    #[arg(long, env = "KEEPMARK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Delete local notes and media that no longer exist remotely
    #[arg(long)]
    delete_local: bool,

    /// Rename local files when a note's title changes remotely
    #[arg(long)]
    rename_local: bool,

    /// Prefix filenames with the note's creation date instead of a counter
    #[arg(long)]
    date_prefix: bool,

    /// Re-fetch media even when the local copy's digest already matches
    #[arg(long)]
    no_skip_existing_media: bool,

    /// Omit the frontmatter header (such files cannot be matched on later
    /// runs and will be exported again next to themselves)
    #[arg(long)]
    no_header: bool,

    /// Print the summary as JSON instead of the text tally
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keepmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let api_url = cli.api_url.ok_or(CliError::MissingApiUrl)?;
    let token = cli.token.ok_or(CliError::MissingToken)?;
    let client = HttpRemoteClient::new(api_url, token)?;

    let options = SyncOptions {
        delete_local: cli.delete_local,
        rename_local: cli.rename_local,
        date_prefix_naming: cli.date_prefix,
        skip_existing_media: !cli.no_skip_existing_media,
        include_header: !cli.no_header,
    };

    println!("Notes directory: {}", cli.directory.display());
    let summary = run_sync(&client, &cli.directory, &options).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_tally(&summary);
    }

    Ok(())
}

fn print_tally(summary: &SyncSummary) {
    println!("Finished syncing.");
    println!(
        "Notes: {} unchanged, {} updated, {} new, {} renamed, {} deleted, {} orphaned kept, {} failed",
        summary.unchanged,
        summary.updated,
        summary.created,
        summary.renamed,
        summary.notes_deleted,
        summary.orphans_kept,
        summary.notes_failed
    );
    println!(
        "Media: {} downloaded, {} skipped, {} deleted",
        summary.media_downloaded, summary.media_skipped, summary.media_deleted
    );
    for warning in &summary.warnings {
        eprintln!("Warning: {warning}");
    }
}
