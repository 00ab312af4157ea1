//! Session configuration and defaults.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{PrismError, Result};

pub const DEFAULT_HOST: &str = "https://ftp.prism.oregonstate.edu";
pub const ANONYMOUS: &str = "anonymous";

pub const LISTING_ATTEMPTS: u32 = 5;
pub const LISTING_BACKOFF_SECS: u64 = 300;
pub const TRANSFER_ATTEMPTS: u32 = 2;
pub const TRANSFER_PAUSE_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded retry with a fixed pause before every retry.
pub struct RetryPolicy {
    pub attempts: u32,
    pub pause: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, pause: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            pause,
        }
    }

    pub fn listing() -> Self {
        RetryPolicy::new(LISTING_ATTEMPTS, Duration::from_secs(LISTING_BACKOFF_SECS))
    }

    pub fn transfer() -> Self {
        RetryPolicy::new(TRANSFER_ATTEMPTS, Duration::from_secs(TRANSFER_PAUSE_SECS))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Existing directory archives are fetched into and unpacked in.
    pub dest_path: PathBuf,
    pub keep_zip: bool,
    pub listing_retry: RetryPolicy,
    pub transfer_retry: RetryPolicy,
}

impl Config {
    /// Anonymous access to the public host, keeping archives. Fails if the
    /// destination does not exist.
    pub fn new(dest_path: impl AsRef<Path>) -> Result<Self> {
        let dest_path = dest_path.as_ref();
        if !dest_path.is_dir() {
            return Err(PrismError::MissingDestination(dest_path.to_path_buf()));
        }

        Ok(Config {
            host: DEFAULT_HOST.to_string(),
            user: ANONYMOUS.to_string(),
            password: String::new(),
            dest_path: dest_path.canonicalize()?,
            keep_zip: true,
            listing_retry: RetryPolicy::listing(),
            transfer_retry: RetryPolicy::transfer(),
        })
    }

    pub fn is_anonymous(&self) -> bool {
        self.user == ANONYMOUS
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn should_default_to_anonymous_access() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path()).unwrap();

        assert!(config.is_anonymous());
        assert!(config.keep_zip);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.listing_retry.attempts, 5);
        assert_eq!(config.listing_retry.pause, Duration::from_secs(300));
        assert_eq!(config.transfer_retry.attempts, 2);
    }

    #[test]
    fn should_reject_missing_destination() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            Config::new(&missing),
            Err(PrismError::MissingDestination(p)) if p == missing
        ));
    }

    #[test]
    fn should_allow_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
