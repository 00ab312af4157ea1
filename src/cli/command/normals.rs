use anyhow::Result;

use crate::{cli::NormalsArgs, job::Job};

use super::run;

pub async fn normals(args: &NormalsArgs) -> Result<String> {
    let months = if args.months.is_empty() {
        None
    } else {
        Some(args.months.clone())
    };
    let job = Job::normals(args.variable, args.resolution, months, args.annual)?;

    run(job, &args.remote, false).await
}

// -- Tests -------------------------------------------------------------------
