//! Builds the ordered list of targets for one batch.

use chrono::{Duration, NaiveDate};

use crate::{
    error::{PrismError, Result},
    product::{NormalsPeriod, Resolution, Target, Variable},
};

#[derive(Debug, Clone)]
pub struct Job {
    variable: Variable,
    targets: Vec<Target>,
}

impl Job {
    /// Explicit days, in the order given.
    pub fn daily(variable: Variable, dates: Vec<NaiveDate>) -> Self {
        let targets = dates.into_iter().map(|d| Target::daily(variable, d)).collect();

        Job { variable, targets }
    }

    /// Every day from `min_date` to `max_date` inclusive, newest first.
    pub fn daily_range(variable: Variable, min_date: &str, max_date: &str) -> Result<Self> {
        let min = parse_date(min_date)?;
        let max = parse_date(max_date)?;
        if max < min {
            return Err(PrismError::InvalidRange {
                min: min_date.to_string(),
                max: max_date.to_string(),
            });
        }

        let days = (max - min).num_days();
        let dates = (0..=days).map(|x| max - Duration::days(x)).collect();

        Ok(Job::daily(variable, dates))
    }

    /// Explicit months, in the order given. Only year and month are used.
    pub fn monthly_dates(variable: Variable, dates: Vec<NaiveDate>) -> Self {
        let targets = dates
            .into_iter()
            .map(|d| Target::monthly(variable, d))
            .collect();

        Job { variable, targets }
    }

    /// Every combination of the years and months, year by year.
    pub fn monthly(variable: Variable, years: &[i32], months: &[u32]) -> Result<Self> {
        let mut dates = Vec::with_capacity(years.len() * months.len());
        for &year in years {
            for &month in months {
                let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    PrismError::InvalidSelection(format!("no such month: {}-{}", year, month))
                })?;
                dates.push(date);
            }
        }

        Ok(Job::monthly_dates(variable, dates))
    }

    /// Normals for the given months (all twelve when none are given), or the
    /// annual normal alone when `annual` is set.
    pub fn normals(
        variable: Variable,
        resolution: Resolution,
        months: Option<Vec<u32>>,
        annual: bool,
    ) -> Result<Self> {
        let periods: Vec<NormalsPeriod> = if annual {
            vec![NormalsPeriod::Annual]
        } else {
            months
                .unwrap_or_else(|| (1..=12).collect())
                .into_iter()
                .map(NormalsPeriod::Month)
                .collect()
        };

        if let Some(period) = periods.iter().find(|p| !p.is_published()) {
            return Err(PrismError::InvalidSelection(format!(
                "no such month of the year: {}",
                period.token()
            )));
        }

        let targets = periods
            .into_iter()
            .map(|p| Target::normals(variable, resolution, p))
            .collect();

        Ok(Job { variable, targets })
    }

    pub fn variable(&self) -> Variable {
        self.variable
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| PrismError::InvalidDate(s.to_string()))
}

/// `YYYY-MM`, anchored on the first of the month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| PrismError::InvalidDate(s.to_string()))
}

// -- Tests -------------------------------------------------------------------
