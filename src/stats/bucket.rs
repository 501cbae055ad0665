use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the histogram buckets in a statistics report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BucketWidth {
    #[default]
    Hourly,
    Daily,
    /// Hour of the day across all dates, for spotting busy times.
    HourOfDay,
}

impl BucketWidth {
    pub fn label(&self, ts: DateTime<Utc>) -> String {
        let format = match self {
            BucketWidth::Hourly => "%Y-%m-%d %H:00",
            BucketWidth::Daily => "%Y-%m-%d",
            BucketWidth::HourOfDay => "%H:00",
        };
        ts.format(format).to_string()
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BucketWidth::Hourly => "hourly",
            BucketWidth::Daily => "daily",
            BucketWidth::HourOfDay => "hour-of-day",
        })
    }
}
