use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotpipe::{
    cli::{self, RunContext},
    config, error,
    fetch::CancellationToken,
    logging, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Bucket holding the pipeline documents
    #[clap(long, global = true, env = "SPOTPIPE_BUCKET", default_value = config::DEFAULT_BUCKET)]
    bucket: String,

    /// Where dry runs write their output
    #[clap(long, global = true, default_value = ".")]
    dry_run_dir: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Enrich the seed artist ranking with Spotify data
    Artists(ArtistsOptions),

    /// Fetch the discography of every artist
    Albums(AlbumsOptions),

    /// Fetch the track listing of every full-length album
    Songs(SongsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
struct RunOptions {
    /// Ranking page the artists were scraped from
    #[clap(long, default_value_t = 1)]
    page_number: u32,

    /// Write into --dry-run-dir instead of the bucket
    #[clap(long)]
    dry_run: bool,

    /// Stop at the first artist or album that fails
    #[clap(long)]
    fail_fast: bool,
}

#[derive(Parser, Debug, Clone)]
struct ArtistsOptions {
    #[clap(flatten)]
    run: RunOptions,
}

#[derive(Parser, Debug, Clone)]
struct AlbumsOptions {
    #[clap(flatten)]
    run: RunOptions,

    /// Only process the first N artists (0 = all)
    #[clap(long, default_value_t = 0)]
    num_artists: usize,
}

#[derive(Parser, Debug, Clone)]
struct SongsOptions {
    #[clap(flatten)]
    run: RunOptions,

    /// 1-based batch of artists to process
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    batch_number: u64,

    /// Artists per batch (0 = all artists in one batch)
    #[clap(long, default_value_t = 0)]
    batch_size: usize,
}

#[derive(Parser, Debug, Clone)]
struct CompletionsOption {
    shell: Shell,
}

fn context(cli: &Cli, run: &RunOptions, shutdown: &CancellationToken) -> RunContext {
    RunContext {
        bucket: cli.bucket.clone(),
        dry_run: run.dry_run,
        dry_run_dir: cli.dry_run_dir.clone(),
        fail_fast: run.fail_fast,
        shutdown: shutdown.clone(),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        warning!("Cannot initialize logging. Err: {}", e);
    }

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning!("Interrupted, stopping after the current request");
            trigger.cancel();
        }
    });

    match &cli.command {
        Command::Artists(opt) => {
            cli::artists(&context(&cli, &opt.run, &shutdown), opt.run.page_number).await
        }
        Command::Albums(opt) => {
            cli::albums(
                &context(&cli, &opt.run, &shutdown),
                opt.run.page_number,
                opt.num_artists,
            )
            .await
        }
        Command::Songs(opt) => {
            cli::songs(
                &context(&cli, &opt.run, &shutdown),
                opt.run.page_number,
                opt.batch_number as usize,
                opt.batch_size,
            )
            .await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn songs_flags_parse() {
        let cli = Cli::try_parse_from([
            "spotpipe",
            "songs",
            "--page-number",
            "3",
            "--batch-number",
            "2",
            "--batch-size",
            "25",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Songs(opt) => {
                assert_eq!(opt.run.page_number, 3);
                assert_eq!(opt.batch_number, 2);
                assert_eq!(opt.batch_size, 25);
                assert!(opt.run.dry_run);
                assert!(!opt.run.fail_fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn batch_number_must_be_positive() {
        assert!(Cli::try_parse_from(["spotpipe", "songs", "--batch-number", "0"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "spotpipe",
            "albums",
            "--num-artists",
            "10",
            "--bucket",
            "scratch",
            "--dry-run-dir",
            "/tmp/out",
        ])
        .unwrap();

        assert_eq!(cli.bucket, "scratch");
        assert_eq!(cli.dry_run_dir, PathBuf::from("/tmp/out"));
        match cli.command {
            Command::Albums(opt) => {
                assert_eq!(opt.num_artists, 10);
                assert_eq!(opt.run.page_number, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
