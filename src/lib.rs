//! Spotify catalog acquisition pipeline.
//!
//! Walks an artist ranking through three stages (artists, albums, songs),
//! enriching each level from the Spotify Web API and storing the results as
//! JSON documents in an object store. Every outbound call goes through a
//! bounded retry with exponential backoff, so rate limiting and transient
//! server errors do not abort a long run.
//!
//! # Modules
//!
//! - `cli` - Stage commands behind the `spotpipe` binary
//! - `config` - Configuration management and environment variables
//! - `fetch` - Retrying HTTP fetcher with exponential backoff
//! - `logging` - `tracing` subscriber setup
//! - `management` - Blob layout and failure manifests
//! - `pipeline` - The artists, albums and songs stages
//! - `spotify` - Spotify Web API endpoints
//! - `storage` - Object store abstraction with local and dry-run backends
//! - `types` - API payloads and stored records
//! - `utils` - Record mapping and batching helpers
//!
//! # Example
//!
//! ```
//! use spotpipe::{config, fetch::RetryingFetcher, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> spotpipe::Res<()> {
//!     config::load_env().await?;
//!     let fetcher = RetryingFetcher::new(config::retry_policy()?);
//!     let client = SpotifyClient::new(
//!         fetcher,
//!         &config::spotify_apiurl(),
//!         &config::spotify_access_token()?,
//!     );
//!     let found = client.several_artists(&["0TnOYISbd1XYRBk9myaseg".to_string()]).await?;
//!     println!("{:?}", found);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod management;
pub mod pipeline;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

/// Boxed-error result used by CLI glue, where errors are only displayed.
///
/// Library seams return typed errors (`FetchError`, `SpotifyError`,
/// `StoreError`, `PipelineError`); this alias collects them (and plain
/// `String` configuration errors) behind `?`.
///
/// ```
/// use spotpipe::Res;
///
/// fn token() -> Res<String> {
///     Ok(spotpipe::config::spotify_access_token()?)
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a progress line on stdout, prefixed with a blue `o`.
///
/// ```
/// info!("Enriching artists from {}", key);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line on stdout, prefixed with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line prefixed with a red `!` and exits with status 1.
///
/// Diverges, so it can stand in for a value in a `match` arm:
///
/// ```
/// let client = match cli::build_client(&shutdown) {
///     Ok(client) => client,
///     Err(e) => error!("Cannot set up the Spotify client. Err: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line prefixed with a yellow `!`; execution continues.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
