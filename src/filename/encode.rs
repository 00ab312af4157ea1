//! Builds PRISM filenames.
//!
//! Only normals names are built from parts; daily and monthly names carry a
//! status and revision code that are only known from the remote listing.

use crate::product::{NormalsPeriod, Resolution, Variable};

/// `PRISM_{variable}_30yr_normal_{resolution}M2_{token}_bil.zip`
pub fn normals_file_name(variable: Variable, resolution: Resolution, period: NormalsPeriod) -> String {
    format!(
        "PRISM_{}_30yr_normal_{}M2_{}_bil.zip",
        variable,
        resolution,
        period.token()
    )
}

/// Name of the raster unpacked from an archive: the archive's base name up to
/// its first extension, with a `.bil` extension.
pub fn raster_file_name(archive_path: &str) -> String {
    let base = archive_path.rsplit('/').next().unwrap_or(archive_path);
    let stem = base.split('.').next().unwrap_or(base);

    format!("{}.bil", stem)
}

// -- Tests -------------------------------------------------------------------
