//! Variables, resolutions and the product descriptor that routes a target to
//! its remote folder.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::error::PrismError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Climate variables published by PRISM.
pub enum Variable {
    Tmean,
    Tmax,
    Tmin,
    Ppt,
    Vpdmin,
    Vpdmax,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Tmean,
        Variable::Tmax,
        Variable::Tmin,
        Variable::Ppt,
        Variable::Vpdmin,
        Variable::Vpdmax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Tmean => "tmean",
            Variable::Tmax => "tmax",
            Variable::Tmin => "tmin",
            Variable::Ppt => "ppt",
            Variable::Vpdmin => "vpdmin",
            Variable::Vpdmax => "vpdmax",
        }
    }
}

impl FromStr for Variable {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| PrismError::UnknownVariable(s.to_string()))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Spatial resolution of a raster.
pub enum Resolution {
    FourKm,
    EightHundredMeters,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::FourKm => "4km",
            Resolution::EightHundredMeters => "800m",
        }
    }
}

impl FromStr for Resolution {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4km" => Ok(Resolution::FourKm),
            "800m" => Ok(Resolution::EightHundredMeters),
            _ => Err(PrismError::UnknownResolution(s.to_string())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A 30-year normals period: a month of the year or the annual average.
pub enum NormalsPeriod {
    Month(u32),
    Annual,
}

impl NormalsPeriod {
    /// `01`..`12` or `annual`.
    pub fn token(&self) -> String {
        match self {
            NormalsPeriod::Month(m) => format!("{:02}", m),
            NormalsPeriod::Annual => "annual".to_string(),
        }
    }

    /// Normals are published for every month and the annual average only.
    pub fn is_published(&self) -> bool {
        match self {
            NormalsPeriod::Month(m) => (1..=12).contains(m),
            NormalsPeriod::Annual => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Selects the remote folder layout and the search token of a target.
pub enum Product {
    Daily,
    Monthly,
    Normals(Resolution),
}

impl Product {
    fn base_dir(&self) -> String {
        match self {
            Product::Daily => "daily".to_string(),
            Product::Monthly => "monthly".to_string(),
            Product::Normals(resolution) => format!("normals_{}", resolution),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Date(NaiveDate),
    Normals(NormalsPeriod),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Normals(period) => f.write_str(&period.token()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A single remote file to look for. Constructors keep product and period
/// consistent: dates for daily and monthly, normals periods for normals.
pub struct Target {
    variable: Variable,
    product: Product,
    period: Period,
}

impl Target {
    pub fn daily(variable: Variable, date: NaiveDate) -> Self {
        Target {
            variable,
            product: Product::Daily,
            period: Period::Date(date),
        }
    }

    pub fn monthly(variable: Variable, date: NaiveDate) -> Self {
        Target {
            variable,
            product: Product::Monthly,
            period: Period::Date(date),
        }
    }

    pub fn normals(variable: Variable, resolution: Resolution, period: NormalsPeriod) -> Self {
        Target {
            variable,
            product: Product::Normals(resolution),
            period: Period::Normals(period),
        }
    }

    pub fn variable(&self) -> Variable {
        self.variable
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Remote folder holding the target. Daily and monthly folders are
    /// partitioned by year, normals folders are flat.
    pub fn folder(&self) -> String {
        match self.period {
            Period::Date(date) => format!(
                "{}/{}/{}/",
                self.product.base_dir(),
                self.variable,
                date.year()
            ),
            Period::Normals(_) => format!("{}/{}/", self.product.base_dir(), self.variable),
        }
    }

    /// Substring identifying the target within its folder listing. Normals are
    /// addressed directly and have none.
    pub fn search_token(&self) -> Option<String> {
        match (self.product, self.period) {
            (Product::Daily, Period::Date(date)) => Some(date.format("%Y%m%d").to_string()),
            (Product::Monthly, Period::Date(date)) => Some(date.format("%Y%m").to_string()),
            _ => None,
        }
    }
}

// -- Tests -------------------------------------------------------------------
