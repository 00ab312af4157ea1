use anyhow::Result;

use crate::{
    cli::MonthlyArgs,
    error::PrismError,
    job::{parse_month, Job},
};

use super::run;

pub async fn monthly(args: &MonthlyArgs) -> Result<String> {
    let job = job(args)?;

    run(job, &args.remote, args.check).await
}

fn job(args: &MonthlyArgs) -> Result<Job> {
    if !args.dates.is_empty() {
        let dates = args
            .dates
            .iter()
            .map(|d| parse_month(d))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Job::monthly_dates(args.variable, dates));
    }

    if args.years.is_empty() || args.months.is_empty() {
        return Err(PrismError::InvalidSelection(
            "give either --dates or both --years and --months".to_string(),
        )
        .into());
    }

    Ok(Job::monthly(args.variable, &args.years, &args.months)?)
}

// -- Tests -------------------------------------------------------------------
