//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{
        Config, RetryPolicy, ANONYMOUS, DEFAULT_HOST, LISTING_ATTEMPTS, LISTING_BACKOFF_SECS,
    },
    error::Result,
    product::{Resolution, Variable},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get daily data
    Daily(DailyArgs),
    /// Get monthly data
    Monthly(MonthlyArgs),
    /// Get 30-year normals
    Normals(NormalsArgs),
    /// Catalog rasters already downloaded
    Catalog(CatalogArgs),
}

#[derive(Args)]
/// Where and how to reach the repository.
pub struct RemoteArgs {
    /// Repository root
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, default_value = ANONYMOUS)]
    pub user: String,

    #[arg(long, default_value = "")]
    pub password: String,

    /// Existing directory to download into
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,

    /// Delete archives once unpacked
    #[arg(long)]
    pub discard_zip: bool,

    /// Folder listing attempts before giving up
    #[arg(long, default_value_t = LISTING_ATTEMPTS)]
    pub attempts: u32,

    /// Pause before retrying a folder listing
    #[arg(long, default_value_t = LISTING_BACKOFF_SECS)]
    pub backoff_secs: u64,
}

impl RemoteArgs {
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::new(&self.dest)?;
        config.host.clone_from(&self.host);
        config.user.clone_from(&self.user);
        config.password.clone_from(&self.password);
        config.keep_zip = !self.discard_zip;
        config.listing_retry =
            RetryPolicy::new(self.attempts, Duration::from_secs(self.backoff_secs));

        Ok(config)
    }
}

#[derive(Args)]
pub struct DailyArgs {
    /// tmean, tmax, tmin, ppt, vpdmin or vpdmax
    pub variable: Variable,

    /// First day, YYYY-MM-DD
    #[arg(long, requires = "max", conflicts_with = "dates")]
    pub min: Option<String>,

    /// Last day, YYYY-MM-DD
    #[arg(long, requires = "min", conflicts_with = "dates")]
    pub max: Option<String>,

    /// Specific days, YYYY-MM-DD
    #[arg(long, value_delimiter = ',')]
    pub dates: Vec<String>,

    /// Only report days that are not available
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args)]
pub struct MonthlyArgs {
    /// tmean, tmax, tmin, ppt, vpdmin or vpdmax
    pub variable: Variable,

    #[arg(long, value_delimiter = ',', requires = "months", conflicts_with = "dates")]
    pub years: Vec<i32>,

    #[arg(long, value_delimiter = ',', requires = "years", conflicts_with = "dates")]
    pub months: Vec<u32>,

    /// Specific months, YYYY-MM
    #[arg(long, value_delimiter = ',')]
    pub dates: Vec<String>,

    /// Only report months that are not available
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args)]
pub struct NormalsArgs {
    /// tmean, tmax, tmin, ppt, vpdmin or vpdmax
    pub variable: Variable,

    /// 4km or 800m
    #[arg(long, default_value = "4km")]
    pub resolution: Resolution,

    /// Months of the year, all when omitted
    #[arg(long, value_delimiter = ',', conflicts_with = "annual")]
    pub months: Vec<u32>,

    /// Annual normal instead of monthly normals
    #[arg(long)]
    pub annual: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Directory holding downloaded rasters
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Search the whole directory tree
    #[arg(short, long)]
    pub recursive: bool,

    /// Parquet file to write, defaults to one in the home directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size).with_message(message).with_style(style)
}

// -- Tests -------------------------------------------------------------------
