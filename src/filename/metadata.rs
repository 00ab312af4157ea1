//! Metadata recovered from a PRISM filename.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::product::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Daily,
    Monthly,
    MonthlyNormals,
    AnnualNormals,
}

impl TemporalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalKind::Daily => "daily",
            TemporalKind::Monthly => "monthly",
            TemporalKind::MonthlyNormals => "monthly_normals",
            TemporalKind::AnnualNormals => "annual_normals",
        }
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Revision maturity of an observation. Anything PRISM adds later is kept as
/// `Other` rather than rejected.
pub enum Status {
    Stable,
    Provisional,
    Early,
    Other(String),
}

impl Status {
    pub fn from_part(part: &str) -> Self {
        match part {
            "stable" => Status::Stable,
            "provisional" => Status::Provisional,
            "early" => Status::Early,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Stable => "stable",
            Status::Provisional => "provisional",
            Status::Early => "early",
            Status::Other(s) => s,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The date components that are meaningful for each temporal kind.
pub enum DateDetails {
    Day { day: u32, month: u32, year: i32 },
    Month { month: u32, year: i32 },
    NormalsMonth { month: u32 },
    Annual,
}

impl DateDetails {
    pub fn for_kind(kind: TemporalKind, date: NaiveDate) -> Self {
        match kind {
            TemporalKind::Daily => DateDetails::Day {
                day: date.day(),
                month: date.month(),
                year: date.year(),
            },
            TemporalKind::Monthly => DateDetails::Month {
                month: date.month(),
                year: date.year(),
            },
            TemporalKind::MonthlyNormals => DateDetails::NormalsMonth {
                month: date.month(),
            },
            TemporalKind::AnnualNormals => DateDetails::Annual,
        }
    }

    pub fn day(&self) -> Option<u32> {
        match self {
            DateDetails::Day { day, .. } => Some(*day),
            _ => None,
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            DateDetails::Day { month, .. }
            | DateDetails::Month { month, .. }
            | DateDetails::NormalsMonth { month } => Some(*month),
            DateDetails::Annual => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            DateDetails::Day { year, .. } | DateDetails::Month { year, .. } => Some(*year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    NotArchive,
    UnrecognizedStructure,
    UnrecognizedDate,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ParseFailure::NotArchive => "not a recognized archive file",
            ParseFailure::UnrecognizedStructure => "unrecognized filename structure",
            ParseFailure::UnrecognizedDate => "unrecognized date encoding",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub variable: String,
    pub temporal_kind: TemporalKind,
    pub resolution: Option<Resolution>,
    pub status: Status,
    /// Normals carry a placeholder in the year 2000.
    pub date: NaiveDate,
    pub date_details: DateDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of decoding a filename. Either every domain field is known or none
/// is and the failure says why.
pub enum FileMetadata {
    Parsed(ParsedName),
    Unparsable(ParseFailure),
}

impl FileMetadata {
    pub fn is_parsable(&self) -> bool {
        matches!(self, FileMetadata::Parsed(_))
    }

    pub fn parsed(&self) -> Option<&ParsedName> {
        match self {
            FileMetadata::Parsed(p) => Some(p),
            FileMetadata::Unparsable(_) => None,
        }
    }

    pub fn parse_failure(&self) -> Option<ParseFailure> {
        match self {
            FileMetadata::Parsed(_) => None,
            FileMetadata::Unparsable(reason) => Some(*reason),
        }
    }

    pub fn variable(&self) -> Option<&str> {
        self.parsed().map(|p| p.variable.as_str())
    }

    pub fn temporal_kind(&self) -> Option<TemporalKind> {
        self.parsed().map(|p| p.temporal_kind)
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.parsed().and_then(|p| p.resolution)
    }

    pub fn status(&self) -> Option<&Status> {
        self.parsed().map(|p| &p.status)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed().map(|p| p.date)
    }

    /// `YYYY-MM-DD`
    pub fn iso_date(&self) -> Option<String> {
        self.date().map(|d| d.format("%Y-%m-%d").to_string())
    }

    pub fn date_details(&self) -> Option<DateDetails> {
        self.parsed().map(|p| p.date_details)
    }
}
