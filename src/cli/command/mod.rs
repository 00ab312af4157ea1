pub mod catalog;
pub mod daily;
pub mod monthly;
pub mod normals;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local};
use tracing::info;

pub use catalog::catalog;
pub use daily::daily;
pub use monthly::monthly;
pub use normals::normals;

use crate::{
    cli::{create_progress_bar, create_spinner, RemoteArgs},
    job::Job,
    remote::{DownloadReport, HttpRemote, Remote, Session},
};

/// Downloads the job, or with `check` only reports what is published.
async fn run(job: Job, remote: &RemoteArgs, check: bool) -> Result<String> {
    let config = remote.config()?;
    info!(host = %config.host, dest = %config.dest_path.display(), "starting session");

    let mut session = Session::connect(HttpRemote::new(&config), &config).await?;

    let outcome = if check {
        let bar = create_spinner(format!("Checking {} {}...", job.targets().len(), job.variable()));
        let availability = check_job(&mut session, &job).await;
        bar.finish_and_clear();
        availability
    } else {
        let bar = create_progress_bar(job.targets().len() as u64, "Downloading...".to_string());
        let report = session.download(&job, &bar).await;
        bar.finish_with_message("Done");
        report.map(|report| summarise(&report))
    };

    session.close().await;

    Ok(outcome?)
}

/// Status of every available target, then the missing ones together.
async fn check_job<R: Remote>(session: &mut Session<R>, job: &Job) -> crate::error::Result<String> {
    let missing = session.check_availability(job).await?;

    let mut lines = Vec::new();
    for target in job.targets().iter().filter(|t| !missing.contains(t)) {
        let status = session
            .date_status(target)
            .await?
            .map(|s| s.to_string())
            .unwrap_or_default();
        lines.push(format!("{} {}", target.period(), status));
    }

    if missing.is_empty() {
        lines.push("All dates specified are available".to_string());
    } else {
        let periods: Vec<String> = missing.iter().map(|t| t.period().to_string()).collect();
        lines.push(format!("The following dates are not available: {}", periods.join(", ")));
    }

    Ok(lines.join("\n"))
}

fn summarise(report: &DownloadReport) -> String {
    let mut lines = vec![format!("{} file(s) saved", report.downloaded.len())];
    for path in &report.downloaded {
        lines.push(format!("  {}", path.display()));
    }
    if !report.unavailable.is_empty() {
        let periods: Vec<String> = report
            .unavailable
            .iter()
            .map(|t| t.period().to_string())
            .collect();
        lines.push(format!("Not available: {}", periods.join(", ")));
    }
    for (target, reason) in &report.failed {
        lines.push(format!("Failed {}: {}", target.period(), reason));
    }

    lines.join("\n")
}

pub fn make_parquet_file_name(name: &str) -> Result<PathBuf> {
    let today = Local::now();
    let file_name = format!(
        "prism-{}-{}-{:02}-{:02}.parquet",
        name,
        today.year(),
        today.month(),
        today.day()
    );
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot locate home directory"))?;

    Ok(home.join(file_name))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, RetryPolicy},
        product::{Target, Variable},
    };
    use chrono::NaiveDate;
    use std::{path::Path, time::Duration};
    use tempfile::TempDir;

    /// Serves one fixed folder listing.
    struct StaticRemote(Vec<String>);

    impl Remote for StaticRemote {
        async fn connect(&mut self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn close(&mut self) {}

        async fn list(&mut self, _folder: &str) -> crate::error::Result<Vec<String>> {
            Ok(self.0.clone())
        }

        async fn fetch(&mut self, _path: &str, _dest: &Path) -> crate::error::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn should_list_status_of_available_dates_and_missing_ones() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path()).unwrap();
        config.listing_retry = RetryPolicy::new(1, Duration::ZERO);
        let remote = StaticRemote(vec![
            "daily/ppt/2018/PRISM_ppt_stable_4kmD2_20180520_bil.zip".to_string(),
            "daily/ppt/2018/PRISM_ppt_provisional_4kmD2_20180521_bil.zip".to_string(),
        ]);
        let mut session = Session::connect(remote, &config).await.unwrap();
        let job = Job::daily_range(Variable::Ppt, "2018-05-20", "2018-05-22").unwrap();

        let output = check_job(&mut session, &job).await.unwrap();

        assert_eq!(
            output,
            "2018-05-21 provisional\n2018-05-20 stable\n\
             The following dates are not available: 2018-05-22"
        );
    }

    #[test]
    fn should_summarise_report() {
        let report = DownloadReport {
            downloaded: vec![PathBuf::from("/data/PRISM_ppt_stable_4kmD2_20180520_bil.bil")],
            unavailable: vec![Target::daily(
                Variable::Ppt,
                NaiveDate::from_ymd_opt(2018, 5, 21).unwrap(),
            )],
            failed: vec![],
        };

        let summary = summarise(&report);

        assert!(summary.starts_with("1 file(s) saved"));
        assert!(summary.contains("PRISM_ppt_stable_4kmD2_20180520_bil.bil"));
        assert!(summary.contains("Not available: 2018-05-21"));
    }

    #[test]
    fn should_name_parquet_file_by_day() {
        if let Ok(path) = make_parquet_file_name("catalog") {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("prism-catalog-"));
            assert!(name.ends_with(".parquet"));
        }
    }
}
