//! Types that validate API request input as it's deserialized.

use std::{
    fmt::{self, Formatter},
    str::FromStr,
};

use derive_more::derive::{AsRef, Deref, Display};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use time::{
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
    Date,
};

/// The earliest date DataLab has search trend data for.
pub const EARLIEST_TREND_DATE: Date = date!(2016 - 01 - 01);

/// The `yyyy-mm-dd` format trend dates are written in.
const TREND_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A search keyword that isn't blank.
#[derive(Deref, AsRef, Display, Deserialize, Serialize, Clone, PartialEq, Eq, Hash, Debug)]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Consumes the [`Keyword`], returning the wrapped [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// An error constructing a [`Keyword`].
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeywordError {
    /// The keyword was empty or only whitespace.
    #[error("keyword must not be empty")]
    Blank,
}

impl TryFrom<String> for Keyword {
    type Error = KeywordError;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        if string.trim().is_empty() {
            return Err(KeywordError::Blank);
        }

        Ok(Self(string))
    }
}

/// A list of [`Keyword`]s with at least one element.
#[derive(Deref, AsRef, Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
#[as_ref(forward)]
#[serde(try_from = "Vec<Keyword>")]
pub struct Keywords(Vec<Keyword>);

/// An error constructing [`Keywords`].
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeywordsError {
    /// The list had no keywords.
    #[error("keywords must contain at least one keyword")]
    Empty,
}

impl TryFrom<Vec<Keyword>> for Keywords {
    type Error = KeywordsError;

    fn try_from(keywords: Vec<Keyword>) -> Result<Self, Self::Error> {
        if keywords.is_empty() {
            return Err(KeywordsError::Empty);
        }

        Ok(Self(keywords))
    }
}

/// A calendar date written as `yyyy-mm-dd` that DataLab has trend data for.
#[derive(
    DeserializeFromStr, SerializeDisplay, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug,
)]
pub struct TrendDate(Date);

impl TrendDate {
    /// Gets the wrapped [`Date`].
    pub fn date(self) -> Date {
        self.0
    }
}

/// An error parsing a [`TrendDate`].
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum TrendDateError {
    /// The string wasn't shaped like `yyyy-mm-dd`.
    #[error("invalid date {0:?}, expected the format yyyy-mm-dd")]
    Format(String),

    /// The string was shaped right but named a day that doesn't exist, like `2021-02-30`.
    #[error("invalid date {0:?}, expected a real calendar date")]
    Calendar(String),

    /// The date was before [`EARLIEST_TREND_DATE`].
    #[error("date {0} is before {EARLIEST_TREND_DATE}, the earliest date with trend data")]
    TooEarly(Date),
}

impl FromStr for TrendDate {
    type Err = TrendDateError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        // `time` tolerates things like a leading `+` on the year, so the shape is checked first.
        let well_formed = str.len() == 10
            && str.bytes().enumerate().all(|(index, byte)| match index {
                4 | 7 => byte == b'-',
                _ => byte.is_ascii_digit(),
            });

        if !well_formed {
            return Err(TrendDateError::Format(str.into()));
        }

        let date = Date::parse(str, TREND_DATE_FORMAT)
            .map_err(|_| TrendDateError::Calendar(str.into()))?;

        if date < EARLIEST_TREND_DATE {
            return Err(TrendDateError::TooEarly(date));
        }

        Ok(Self(date))
    }
}

impl From<Date> for TrendDate {
    /// Wraps a date computed by the server. Unlike parsing, this doesn't check the date against
    /// [`EARLIEST_TREND_DATE`].
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl fmt::Display for TrendDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(TREND_DATE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

/// The granularity DataLab buckets a trend series into.
#[derive(Serialize, Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// One point per day.
    #[default]
    Date,

    /// One point per week.
    Week,

    /// One point per month.
    Month,

    /// One point per year.
    Year,
}

impl TimeUnit {
    /// Looks up a time unit by the name DataLab uses for it.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Date),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Deserializes a [`TimeUnit`], substituting the default for any value that isn't a recognized
    /// name rather than failing.
    ///
    /// # Errors
    ///
    /// Fails only if the input isn't valid JSON.
    pub fn deserialize_or_default<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        Ok(match value.as_str().and_then(Self::from_name) {
            Some(time_unit) => time_unit,
            None => {
                if !value.is_null() {
                    tracing::debug!(%value, "unrecognized time unit, using the default");
                }

                Self::default()
            }
        })
    }
}
