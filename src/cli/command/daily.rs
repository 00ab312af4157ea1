use anyhow::Result;

use crate::{
    cli::DailyArgs,
    error::PrismError,
    job::{parse_date, Job},
};

use super::run;

pub async fn daily(args: &DailyArgs) -> Result<String> {
    let job = job(args)?;

    run(job, &args.remote, args.check).await
}

fn job(args: &DailyArgs) -> Result<Job> {
    if !args.dates.is_empty() {
        let dates = args
            .dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Job::daily(args.variable, dates));
    }

    match (&args.min, &args.max) {
        (Some(min), Some(max)) => Ok(Job::daily_range(args.variable, min, max)?),
        _ => Err(PrismError::InvalidSelection(
            "give either --dates or both --min and --max".to_string(),
        )
        .into()),
    }
}

// -- Tests -------------------------------------------------------------------
