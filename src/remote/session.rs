//! One batch's worth of remote work: a single connection, a folder cache, and
//! the retry policies for listings and transfers.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use super::{FolderCache, Remote};
use crate::{
    config::{Config, RetryPolicy},
    download::extract_zip,
    error::{PrismError, Result},
    filename::{self, normals_file_name, raster_file_name, Status},
    job::Job,
    product::{Period, Product, Target},
};

#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Extracted rasters, in job order.
    pub downloaded: Vec<PathBuf>,
    pub unavailable: Vec<Target>,
    pub failed: Vec<(Target, String)>,
}

pub struct Session<R: Remote> {
    remote: R,
    cache: FolderCache,
    listing_retry: RetryPolicy,
    transfer_retry: RetryPolicy,
    dest_path: PathBuf,
    keep_zip: bool,
}

impl<R: Remote> Session<R> {
    /// Opens the connection used for the whole batch.
    pub async fn connect(mut remote: R, config: &Config) -> Result<Self> {
        remote.connect().await?;

        Ok(Session {
            remote,
            cache: FolderCache::new(),
            listing_retry: config.listing_retry,
            transfer_retry: config.transfer_retry,
            dest_path: config.dest_path.clone(),
            keep_zip: config.keep_zip,
        })
    }

    pub async fn close(mut self) {
        self.remote.close().await;
    }

    /// Listing of `folder`, queried remotely the first time only.
    pub async fn list_folder(&mut self, folder: &str) -> Result<&[String]> {
        if !self.cache.contains(folder) {
            let listing = self.query_folder(folder).await?;
            self.cache.insert(folder, listing);
        }

        Ok(self.cache.get(folder).unwrap_or_default())
    }

    async fn query_folder(&mut self, folder: &str) -> Result<Vec<String>> {
        let attempts = self.listing_retry.attempts;

        for attempt in 1..=attempts {
            match self.remote.list(folder).await {
                Ok(listing) => {
                    debug!(folder, files = listing.len(), attempt, "folder listed");
                    return Ok(listing);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        folder,
                        attempt,
                        error = %e,
                        retry_in_secs = self.listing_retry.pause.as_secs(),
                        "cannot query PRISM folder, reconnecting and retrying"
                    );
                    self.remote.close().await;
                    tokio::time::sleep(self.listing_retry.pause).await;
                    if let Err(e) = self.remote.connect().await {
                        warn!(error = %e, "reconnect failed");
                    }
                }
                Err(e) => error!(folder, attempt, error = %e, "cannot query PRISM folder"),
            }
        }

        Err(PrismError::Connectivity {
            folder: folder.to_string(),
            attempts,
        })
    }

    /// Remote path of the target, or `None` when it is not published.
    pub async fn resolve(&mut self, target: &Target) -> Result<Option<String>> {
        let folder = target.folder();

        match (target.product(), target.period()) {
            (Product::Normals(resolution), Period::Normals(period)) => {
                Ok(period.is_published().then(|| {
                    let name = normals_file_name(target.variable(), resolution, period);
                    format!("{}{}", folder, name)
                }))
            }
            _ => {
                let Some(token) = target.search_token() else {
                    return Ok(None);
                };
                let listing = self.list_folder(&folder).await?;
                match_listing(&folder, listing, &token)
            }
        }
    }

    /// Status of the file currently published for the target.
    pub async fn date_status(&mut self, target: &Target) -> Result<Option<Status>> {
        let Some(path) = self.resolve(target).await? else {
            return Ok(None);
        };
        let file_name = path.rsplit('/').next().unwrap_or(path.as_str());

        Ok(filename::decode(file_name).status().cloned())
    }

    pub async fn is_available(&mut self, target: &Target) -> Result<bool> {
        Ok(self.resolve(target).await?.is_some())
    }

    /// Every target of the job that has no published file.
    pub async fn check_availability(&mut self, job: &Job) -> Result<Vec<Target>> {
        let mut missing = Vec::new();
        for target in job.targets() {
            if !self.is_available(target).await? {
                missing.push(*target);
            }
        }

        Ok(missing)
    }

    /// Downloads and unpacks every available target, one at a time. Missing
    /// targets are skipped and a failed transfer does not stop the batch;
    /// both are listed in the report.
    pub async fn download(&mut self, job: &Job, progress: &ProgressBar) -> Result<DownloadReport> {
        let mut report = DownloadReport::default();
        progress.set_length(job.targets().len() as u64);

        for target in job.targets() {
            progress.set_message(format!("{} {}", target.variable(), target.period()));

            match self.resolve(target).await? {
                None => {
                    info!(period = %target.period(), "not available, skipping");
                    report.unavailable.push(*target);
                }
                Some(path) => match self.download_file(&path).await {
                    Ok(raster) => report.downloaded.push(raster),
                    Err(e) => {
                        error!(path = %path, error = %e, "download failed");
                        report.failed.push((*target, e.to_string()));
                    }
                },
            }

            progress.inc(1);
        }

        Ok(report)
    }

    async fn download_file(&mut self, remote_path: &str) -> Result<PathBuf> {
        let archive_name = remote_path.rsplit('/').next().unwrap_or(remote_path);

        // Discarded archives are staged in a directory removed on drop
        let staging = match self.keep_zip {
            true => None,
            false => Some(TempDir::new_in(&self.dest_path)?),
        };
        let archive_dir = staging
            .as_ref()
            .map(TempDir::path)
            .unwrap_or(self.dest_path.as_path());
        let archive_path = archive_dir.join(archive_name);

        self.fetch_with_retry(remote_path, &archive_path).await?;
        let extracted = extract_zip(&archive_path, &self.dest_path)?;

        let raster = self.dest_path.join(raster_file_name(archive_name));
        if !extracted.contains(&raster) {
            return Err(PrismError::Archive {
                path: archive_path,
                reason: format!("no raster named {}", raster_file_name(archive_name)),
            });
        }
        info!(raster = %raster.display(), "downloaded");

        Ok(raster)
    }

    async fn fetch_with_retry(&mut self, remote_path: &str, dest: &Path) -> Result<u64> {
        let attempts = self.transfer_retry.attempts;
        let mut attempt = 1;

        loop {
            match self.remote.fetch(remote_path, dest).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < attempts => {
                    warn!(
                        path = remote_path,
                        attempt,
                        error = %e,
                        "transfer failed, retrying"
                    );
                    tokio::time::sleep(self.transfer_retry.pause).await;
                    attempt += 1;
                }
                Err(e) => {
                    discard_partial(dest);
                    return Err(PrismError::Transfer {
                        path: remote_path.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "partial archive removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "cannot remove partial archive"),
    }
}

/// The single listing entry containing `token`. More than one match means the
/// remote folder is inconsistent.
fn match_listing(folder: &str, listing: &[String], token: &str) -> Result<Option<String>> {
    let matching: Vec<&String> = listing.iter().filter(|f| f.contains(token)).collect();

    match matching.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some((*only).clone())),
        _ => Err(PrismError::AmbiguousListing {
            folder: folder.to_string(),
            token: token.to_string(),
            matches: matching.len(),
        }),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        download::tests::zip_fixture,
        product::{NormalsPeriod, Resolution, Variable},
    };

    /// In-memory repository that can fail a number of listing or fetch calls.
    #[derive(Default)]
    struct FakeRemote {
        folders: HashMap<String, Vec<String>>,
        files: HashMap<String, Vec<u8>>,
        failing_lists: u32,
        failing_fetches: u32,
        list_calls: u32,
        fetch_calls: u32,
        connects: u32,
        closes: u32,
    }

    impl FakeRemote {
        fn with_folder(mut self, folder: &str, names: &[&str]) -> Self {
            let listing = names.iter().map(|n| format!("{}{}", folder, n)).collect();
            self.folders.insert(folder.to_string(), listing);
            self
        }

        fn with_file(mut self, path: &str, raster: &str) -> Self {
            let archive = zip_fixture(&[(raster, b"raster".as_slice())]);
            self.files.insert(path.to_string(), archive);
            self
        }
    }

    impl Remote for FakeRemote {
        async fn connect(&mut self) -> Result<()> {
            self.connects += 1;
            Ok(())
        }

        async fn close(&mut self) {
            self.closes += 1;
        }

        // Unknown folders list as empty, as a 404 does over HTTP
        async fn list(&mut self, folder: &str) -> Result<Vec<String>> {
            self.list_calls += 1;
            if self.failing_lists > 0 {
                self.failing_lists -= 1;
                return Err(PrismError::NotConnected("fake".to_string()));
            }

            Ok(self.folders.get(folder).cloned().unwrap_or_default())
        }

        async fn fetch(&mut self, path: &str, dest: &Path) -> Result<u64> {
            self.fetch_calls += 1;
            if self.failing_fetches > 0 {
                self.failing_fetches -= 1;
                std::fs::write(dest, b"partial")?;
                return Err(PrismError::NotConnected("fake".to_string()));
            }

            let bytes = self.files.get(path).ok_or_else(|| PrismError::Transfer {
                path: path.to_string(),
                reason: "404".to_string(),
            })?;
            std::fs::write(dest, bytes)?;

            Ok(bytes.len() as u64)
        }
    }

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::new(dir.path()).unwrap();
        config.listing_retry = RetryPolicy::new(5, Duration::ZERO);
        config.transfer_retry = RetryPolicy::new(2, Duration::ZERO);
        config
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DAILY_2017: &str = "daily/tmean/2017/";

    fn daily_remote() -> FakeRemote {
        FakeRemote::default().with_folder(
            DAILY_2017,
            &[
                "PRISM_tmean_stable_4kmD2_20170101_bil.zip",
                "PRISM_tmean_provisional_4kmD2_20170102_bil.zip",
                "PRISM_tmean_early_4kmD2_20170103_bil.zip",
            ],
        )
    }

    #[tokio::test]
    async fn should_resolve_single_match() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();

        let path = session
            .resolve(&Target::daily(Variable::Tmean, date(2017, 1, 2)))
            .await
            .unwrap();

        assert_eq!(
            path.as_deref(),
            Some("daily/tmean/2017/PRISM_tmean_provisional_4kmD2_20170102_bil.zip")
        );
    }

    #[tokio::test]
    async fn should_report_missing_date_as_unavailable() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();
        let target = Target::daily(Variable::Tmean, date(2017, 1, 9));

        assert_eq!(session.resolve(&target).await.unwrap(), None);
        assert!(!session.is_available(&target).await.unwrap());
        assert_eq!(session.date_status(&target).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_fail_on_ambiguous_listing() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote::default().with_folder(
            "monthly/ppt/2015/",
            &[
                "PRISM_ppt_stable_4kmM3_201505_bil.zip",
                "PRISM_ppt_provisional_4kmM3_201505_bil.zip",
            ],
        );
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let result = session
            .resolve(&Target::monthly(Variable::Ppt, date(2015, 5, 1)))
            .await;

        assert!(matches!(
            result,
            Err(PrismError::AmbiguousListing { matches: 2, .. })
        ));
    }

    #[test]
    fn should_match_exact_token_only() {
        let listing = vec![
            "PRISM_ppt_stable_4kmD2_20150501_bil.zip".to_string(),
            "PRISM_ppt_stable_4kmD2_20150502_bil.zip".to_string(),
        ];

        assert_eq!(
            match_listing("f/", &listing, "20150502").unwrap().as_deref(),
            Some("PRISM_ppt_stable_4kmD2_20150502_bil.zip")
        );
        assert_eq!(match_listing("f/", &listing, "20150503").unwrap(), None);
        assert!(match_listing("f/", &listing, "201505").is_err());
    }

    #[tokio::test]
    async fn should_read_status_from_resolved_file() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();

        let statuses = [
            (date(2017, 1, 1), Status::Stable),
            (date(2017, 1, 2), Status::Provisional),
            (date(2017, 1, 3), Status::Early),
        ];
        for (day, expected) in statuses {
            let status = session
                .date_status(&Target::daily(Variable::Tmean, day))
                .await
                .unwrap();
            assert_eq!(status, Some(expected));
        }
    }

    #[tokio::test]
    async fn should_list_each_folder_once() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();

        for day in 1..=5 {
            session
                .resolve(&Target::daily(Variable::Tmean, date(2017, 1, day)))
                .await
                .unwrap();
        }
        session
            .resolve(&Target::daily(Variable::Tmean, date(2016, 12, 31)))
            .await
            .unwrap();

        assert_eq!(session.remote.list_calls, 2);
        assert_eq!(session.cache.len(), 2);
    }

    #[tokio::test]
    async fn should_recover_from_transient_listing_failures() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote {
            failing_lists: 4,
            ..daily_remote()
        };
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let listing = session.list_folder(DAILY_2017).await.unwrap().to_vec();

        assert_eq!(listing.len(), 3);
        assert_eq!(session.remote.list_calls, 5);
        assert_eq!(session.remote.closes, 4);
        assert_eq!(session.remote.connects, 5);
    }

    #[tokio::test]
    async fn should_give_up_after_listing_budget() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote {
            failing_lists: 5,
            ..daily_remote()
        };
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let result = session.list_folder(DAILY_2017).await;

        assert!(matches!(
            result,
            Err(PrismError::Connectivity { attempts: 5, .. })
        ));
        assert_eq!(session.remote.list_calls, 5);
        assert!(!session.cache.contains(DAILY_2017));
    }

    #[tokio::test]
    async fn should_address_normals_without_listing() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(FakeRemote::default(), &config(&dir))
            .await
            .unwrap();

        let june = Target::normals(Variable::Ppt, Resolution::FourKm, NormalsPeriod::Month(6));
        let annual = Target::normals(
            Variable::Tmean,
            Resolution::EightHundredMeters,
            NormalsPeriod::Annual,
        );
        let bogus = Target::normals(Variable::Ppt, Resolution::FourKm, NormalsPeriod::Month(13));

        assert_eq!(
            session.resolve(&june).await.unwrap().as_deref(),
            Some("normals_4km/ppt/PRISM_ppt_30yr_normal_4kmM2_06_bil.zip")
        );
        assert_eq!(
            session.resolve(&annual).await.unwrap().as_deref(),
            Some("normals_800m/tmean/PRISM_tmean_30yr_normal_800mM2_annual_bil.zip")
        );
        assert_eq!(session.resolve(&bogus).await.unwrap(), None);
        assert_eq!(session.date_status(&june).await.unwrap(), Some(Status::Stable));
        assert_eq!(session.remote.list_calls, 0);
    }

    #[tokio::test]
    async fn should_collect_all_missing_targets() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();
        let job = Job::daily_range(Variable::Tmean, "2017-01-02", "2017-01-05").unwrap();

        let missing = session.check_availability(&job).await.unwrap();

        assert_eq!(
            missing,
            vec![
                Target::daily(Variable::Tmean, date(2017, 1, 5)),
                Target::daily(Variable::Tmean, date(2017, 1, 4)),
            ]
        );
    }

    #[tokio::test]
    async fn should_download_available_and_skip_missing() {
        let dir = TempDir::new().unwrap();
        let remote = daily_remote()
            .with_file(
                "daily/tmean/2017/PRISM_tmean_stable_4kmD2_20170101_bil.zip",
                "PRISM_tmean_stable_4kmD2_20170101_bil.bil",
            )
            .with_file(
                "daily/tmean/2017/PRISM_tmean_provisional_4kmD2_20170102_bil.zip",
                "PRISM_tmean_provisional_4kmD2_20170102_bil.bil",
            );
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();
        let job = Job::daily(
            Variable::Tmean,
            vec![date(2017, 1, 1), date(2017, 1, 7), date(2017, 1, 2)],
        );

        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        let dest = dir.path().canonicalize().unwrap();
        assert_eq!(
            report.downloaded,
            vec![
                dest.join("PRISM_tmean_stable_4kmD2_20170101_bil.bil"),
                dest.join("PRISM_tmean_provisional_4kmD2_20170102_bil.bil"),
            ]
        );
        assert!(report.downloaded.iter().all(|p| p.exists()));
        assert_eq!(
            report.unavailable,
            vec![Target::daily(Variable::Tmean, date(2017, 1, 7))]
        );
        assert!(report.failed.is_empty());
        assert!(dest.join("PRISM_tmean_stable_4kmD2_20170101_bil.zip").exists());
    }

    #[tokio::test]
    async fn should_discard_archives_when_asked() {
        let dir = TempDir::new().unwrap();
        let remote = daily_remote().with_file(
            "daily/tmean/2017/PRISM_tmean_stable_4kmD2_20170101_bil.zip",
            "PRISM_tmean_stable_4kmD2_20170101_bil.bil",
        );
        let mut config = config(&dir);
        config.keep_zip = false;
        let mut session = Session::connect(remote, &config).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1)]);
        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.downloaded.len(), 1);
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["PRISM_tmean_stable_4kmD2_20170101_bil.bil"]);
    }

    #[tokio::test]
    async fn should_retry_transfer_once() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote {
            failing_fetches: 1,
            ..daily_remote().with_file(
                "daily/tmean/2017/PRISM_tmean_stable_4kmD2_20170101_bil.zip",
                "PRISM_tmean_stable_4kmD2_20170101_bil.bil",
            )
        };
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1)]);
        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(session.remote.fetch_calls, 2);
    }

    #[tokio::test]
    async fn should_continue_batch_after_failed_transfer() {
        let dir = TempDir::new().unwrap();
        // The first file is listed but never served
        let remote = daily_remote().with_file(
            "daily/tmean/2017/PRISM_tmean_provisional_4kmD2_20170102_bil.zip",
            "PRISM_tmean_provisional_4kmD2_20170102_bil.bil",
        );
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1), date(2017, 1, 2)]);
        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Target::daily(Variable::Tmean, date(2017, 1, 1)));
        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(session.remote.fetch_calls, 3);
    }

    #[tokio::test]
    async fn should_abort_batch_on_connectivity_loss() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote {
            failing_lists: 10,
            ..daily_remote()
        };
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1)]);
        let result = session.download(&job, &ProgressBar::hidden()).await;

        assert!(matches!(result, Err(PrismError::Connectivity { .. })));
    }

    #[tokio::test]
    async fn should_remove_partial_archive_after_last_attempt() {
        let dir = TempDir::new().unwrap();
        let remote = FakeRemote {
            failing_fetches: 2,
            ..daily_remote().with_file(
                "daily/tmean/2017/PRISM_tmean_stable_4kmD2_20170101_bil.zip",
                "PRISM_tmean_stable_4kmD2_20170101_bil.bil",
            )
        };
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1)]);
        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(!dir
            .path()
            .join("PRISM_tmean_stable_4kmD2_20170101_bil.zip")
            .exists());
    }

    #[tokio::test]
    async fn should_report_archive_without_expected_raster() {
        let dir = TempDir::new().unwrap();
        let remote = daily_remote().with_file(
            "daily/tmean/2017/PRISM_tmean_stable_4kmD2_20170101_bil.zip",
            "something_else.bil",
        );
        let mut session = Session::connect(remote, &config(&dir)).await.unwrap();

        let job = Job::daily(Variable::Tmean, vec![date(2017, 1, 1)]);
        let report = session.download(&job, &ProgressBar::hidden()).await.unwrap();

        assert!(report.downloaded.is_empty());
        assert!(report.failed[0].1.contains("no raster named"));
    }

    #[tokio::test]
    async fn should_treat_missing_year_folder_as_unavailable() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::connect(daily_remote(), &config(&dir)).await.unwrap();
        let future = Target::daily(Variable::Tmean, date(2030, 1, 1));
        let job = Job::daily(Variable::Tmean, vec![date(2030, 1, 1), date(2017, 1, 1)]);

        assert_eq!(session.resolve(&future).await.unwrap(), None);
        assert_eq!(session.check_availability(&job).await.unwrap(), vec![future]);
        assert_eq!(session.remote.connects, 1);
    }
}
