//! mythlink CLI
//!
//! Links MythTV recordings into a Show/Season/Episode tree named after
//! TheTVDB, with commercial skip list sidecars.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mythlink::cli::args::{Cli, Mode};
use mythlink::cli::commands::{link, resync};
use mythlink::core::synchronizer::{SyncOptions, Synchronizer};
use mythlink::models::config::load_config;
use mythlink::preflight::{self, Collaborators};
use mythlink::services::kodi::KodiClient;
use mythlink::services::mythtv::MythtvClient;
use mythlink::services::skiplist::CommandSkipList;
use mythlink::services::tvdb::TvdbClient;
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    let Some(dest) = cli.dest.clone().or_else(|| config.sync.dest.clone()) else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "Must specify an output directory! (--dest or [sync].dest)",
            )
            .exit();
    };

    let backend = MythtvClient::new(config.backend.clone())?;
    let tvdb = match TvdbClient::from_config(&config.tvdb) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };
    let skiplist = CommandSkipList::new(&config.skiplist);
    let write_sidecars = config.skiplist.enabled && !cli.no_skiplist;
    let kodi = if cli.no_scan {
        None
    } else {
        KodiClient::from_config(&config.kodi)?
    };

    // Run preflight checks unless skipped
    if !cli.skip_preflight {
        let collaborators = Collaborators {
            backend: &backend,
            tvdb: tvdb.as_ref(),
            skiplist: write_sidecars.then_some(&skiplist),
            kodi: kodi.as_ref(),
        };
        run_preflight_checks(&collaborators).await?;
    }

    let options = SyncOptions {
        excluded_groups: config.sync.excluded_groups.clone(),
        write_sidecars,
        jobs: cli.jobs.unwrap_or(config.sync.jobs).max(1),
        progress: std::io::stderr().is_terminal() && !cli.verbose,
    };
    let sync = Synchronizer::new(backend, tvdb, skiplist, options);

    // Run the appropriate mode
    match cli.mode() {
        Mode::Single { chan_id, start_time } => {
            link::link_one(&sync, chan_id, start_time, &dest, kodi.as_ref()).await?;
        }
        Mode::Resync => {
            resync::resync(&sync, &dest, cli.all, kodi.as_ref()).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mythlink=debug")
    } else {
        EnvFilter::new("mythlink=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if a required one fails.
async fn run_preflight_checks(collaborators: &Collaborators<'_>) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(collaborators).await;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
