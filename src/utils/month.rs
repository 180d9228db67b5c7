use crate::error::ScoringError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})-(\d{1,2})\s*$").expect("valid month regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: u16,
    month: u8,
}

impl Month {
    /// Sorts before every real month. Stands in for a missing effective month.
    pub const EPOCH: Month = Month { year: 0, month: 0 };

    pub fn new(year: u16, month: u8) -> Result<Self, ScoringError> {
        if !(1..=12).contains(&month) {
            return Err(ScoringError::InvalidMonth {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    pub fn parse(value: &str) -> Result<Self, ScoringError> {
        let invalid = || ScoringError::InvalidMonth {
            value: value.to_string(),
        };

        let caps = MONTH_RE.captures(value).ok_or_else(invalid)?;
        let year = caps[1].parse::<u16>().map_err(|_| invalid())?;
        let month = caps[2].parse::<u8>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn parse_or_epoch(value: Option<&str>) -> Result<Self, ScoringError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::EPOCH),
            Some(raw) => Self::parse(raw),
        }
    }

    pub fn is_epoch(self) -> bool {
        self == Self::EPOCH
    }

    pub fn year(self) -> u16 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
