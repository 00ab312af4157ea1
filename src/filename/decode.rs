//! Decodes PRISM filenames into [`FileMetadata`].
//!
//! ```text
//!   0     1     2      3       4     5
//! PRISM_tmax_stable_4kmM2_201601_bil.zip      daily / monthly
//! PRISM_tmax_30yr_normal_800mM2_05_bil.bil    normals
//! ```
//!
//! Daily and monthly names differ only in the length of the date token, so
//! every date decoder checks the exact token shape before parsing it.

use chrono::NaiveDate;

use super::metadata::{DateDetails, FileMetadata, ParseFailure, ParsedName, Status, TemporalKind};
use crate::product::Resolution;

const ARCHIVE_MARKER: &str = "PRISM";
const NORMALS_MARKER: &str = "normal";
const CANONICAL_PARTS: usize = 6;

/// Normals have no real observation date; they are anchored in this year.
const NORMALS_YEAR: i32 = 2000;

type DateDecoder = fn(&[&str]) -> Option<(TemporalKind, NaiveDate)>;

/// Tried in order, first match wins.
const DATE_DECODERS: [DateDecoder; 4] = [daily_date, monthly_date, normals_month_date, annual_normals_date];

/// Decodes a filename. Never fails: unrecognized names come back as
/// [`FileMetadata::Unparsable`] with the reason.
pub fn decode(file_name: &str) -> FileMetadata {
    match parse(file_name) {
        Ok(parsed) => FileMetadata::Parsed(parsed),
        Err(reason) => FileMetadata::Unparsable(reason),
    }
}

fn parse(file_name: &str) -> Result<ParsedName, ParseFailure> {
    if !file_name.contains(ARCHIVE_MARKER) {
        return Err(ParseFailure::NotArchive);
    }

    let stem = file_name.split('.').next().unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();
    let is_normals = file_name.contains(NORMALS_MARKER);

    // Normals names vary in length
    if parts.len() != CANONICAL_PARTS && !is_normals {
        return Err(ParseFailure::UnrecognizedStructure);
    }

    let (temporal_kind, date) = DATE_DECODERS
        .iter()
        .find_map(|decoder| decoder(&parts))
        .ok_or(ParseFailure::UnrecognizedDate)?;

    let variable = parts
        .get(1)
        .ok_or(ParseFailure::UnrecognizedStructure)?
        .to_string();

    let status = if is_normals {
        Status::Stable
    } else {
        Status::from_part(parts.get(2).ok_or(ParseFailure::UnrecognizedStructure)?)
    };

    Ok(ParsedName {
        variable,
        temporal_kind,
        resolution: resolution(file_name),
        status,
        date,
        date_details: DateDetails::for_kind(temporal_kind, date),
    })
}

fn resolution(file_name: &str) -> Option<Resolution> {
    if file_name.contains("4km") {
        Some(Resolution::FourKm)
    } else if file_name.contains("800m") {
        Some(Resolution::EightHundredMeters)
    } else {
        None
    }
}

// `YYYYMMDD` in part 4
fn daily_date(parts: &[&str]) -> Option<(TemporalKind, NaiveDate)> {
    let token = digits(parts.get(4)?, 8)?;
    let date = NaiveDate::from_ymd_opt(
        token[0..4].parse().ok()?,
        token[4..6].parse().ok()?,
        token[6..8].parse().ok()?,
    )?;

    Some((TemporalKind::Daily, date))
}

// `YYYYMM` in part 4
fn monthly_date(parts: &[&str]) -> Option<(TemporalKind, NaiveDate)> {
    let token = digits(parts.get(4)?, 6)?;
    let date = NaiveDate::from_ymd_opt(token[0..4].parse().ok()?, token[4..6].parse().ok()?, 1)?;

    Some((TemporalKind::Monthly, date))
}

// `normal` in part 3, `MM` in part 5
fn normals_month_date(parts: &[&str]) -> Option<(TemporalKind, NaiveDate)> {
    if parts.get(3) != Some(&NORMALS_MARKER) {
        return None;
    }
    let token = digits(parts.get(5)?, 2)?;
    let date = NaiveDate::from_ymd_opt(NORMALS_YEAR, token.parse().ok()?, 1)?;

    Some((TemporalKind::MonthlyNormals, date))
}

// `normal` in part 3, `annual` in part 5
fn annual_normals_date(parts: &[&str]) -> Option<(TemporalKind, NaiveDate)> {
    if parts.get(3) != Some(&NORMALS_MARKER) || parts.get(5) != Some(&"annual") {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(NORMALS_YEAR, 1, 1)?;

    Some((TemporalKind::AnnualNormals, date))
}

fn digits<'a>(token: &'a str, len: usize) -> Option<&'a str> {
    (token.len() == len && token.bytes().all(|b| b.is_ascii_digit())).then_some(token)
}

// -- Tests -------------------------------------------------------------------
