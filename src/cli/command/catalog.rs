use anyhow::Result;

use crate::{
    catalog::scan,
    cli::{create_spinner, CatalogArgs},
    parquet,
};

use super::make_parquet_file_name;

pub async fn catalog(args: &CatalogArgs) -> Result<String> {
    let file_path = match &args.output {
        Some(path) => path.clone(),
        None => make_parquet_file_name("catalog")?,
    };

    let bar = create_spinner(format!("Scanning {}...", args.path.display()));
    let entries = scan(&args.path, args.recursive)?;
    bar.set_message(format!("Saving {} rasters...", entries.len()));
    parquet::save_catalog(&entries, &file_path)?;
    bar.finish_and_clear();

    Ok(format!(
        "{} rasters catalogued to `{}`",
        entries.len(),
        file_path.to_string_lossy()
    ))
}

// -- Tests -------------------------------------------------------------------
