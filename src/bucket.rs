//! Calendar bucketing of timestamped records.
//!
//! Records carry UTC instants; every grouping here happens on the local
//! calendar date in the configured time zone.

use crate::models::{DrinkLogRecord, MoodRecord};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for DrinkLogRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for MoodRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Weekly,
    Monthly,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("period must be 'weekly' or 'monthly', got {0:?}")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

/// Bucket identity. Ordering follows the calendar in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Week(NaiveDate),
    Month { year: i32, month: u32 },
}

impl BucketKey {
    /// Human-readable chart label, e.g. `Wk of Jan 7` or `January 2024`.
    pub fn label(&self) -> String {
        match self {
            Self::Week(start) => format!("Wk of {}", start.format("%b %-d")),
            Self::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(first) => first.format("%B %Y").to_string(),
                None => self.to_string(),
            },
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week(start) => write!(f, "{}", start.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

#[derive(Debug)]
pub struct Bucket<'a, T> {
    pub key: BucketKey,
    pub records: Vec<&'a T>,
}

/// Time zone plus week-start convention used for every day-level decision.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    pub tz: Tz,
    pub week_start: Weekday,
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz, week_start: Weekday) -> Self {
        Self { tz, week_start }
    }

    pub fn local_date(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.tz).date_naive()
    }

    pub fn week_start_of(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(offset))
    }

    pub fn bucket_key(&self, timestamp: &DateTime<Utc>, period: Period) -> BucketKey {
        let date = self.local_date(timestamp);
        match period {
            Period::Weekly => BucketKey::Week(self.week_start_of(date)),
            Period::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// Partitions `records` into ascending buckets. Empty input yields no buckets.
    pub fn bucket<'a, T: Timestamped>(&self, records: &'a [T], period: Period) -> Vec<Bucket<'a, T>> {
        let mut grouped: BTreeMap<BucketKey, Vec<&'a T>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(self.bucket_key(&record.timestamp(), period))
                .or_default()
                .push(record);
        }

        grouped
            .into_iter()
            .map(|(key, records)| Bucket { key, records })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn mood(ts: &str) -> MoodRecord {
        MoodRecord {
            id: ts.to_string(),
            timestamp: at(ts),
            mood_level: 3,
            notes: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn weekly_key_starts_on_sunday_by_default() {
        let calendar = Calendar::new(Utc, Weekday::Sun);
        // 2024-01-03 is a Wednesday.
        let key = calendar.bucket_key(&at("2024-01-03T22:15:00Z"), Period::Weekly);
        assert_eq!(key.to_string(), "2023-12-31");
        assert_eq!(key.label(), "Wk of Dec 31");
    }

    #[test]
    fn weekly_key_honours_monday_start() {
        let calendar = Calendar::new(Utc, Weekday::Mon);
        let key = calendar.bucket_key(&at("2024-01-07T10:00:00Z"), Period::Weekly);
        assert_eq!(key.to_string(), "2024-01-01");

        let sunday_start = Calendar::new(Utc, Weekday::Sun);
        let key = sunday_start.bucket_key(&at("2024-01-07T10:00:00Z"), Period::Weekly);
        assert_eq!(key.to_string(), "2024-01-07");
    }

    #[test]
    fn monthly_key_uses_local_date() {
        let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let calendar = Calendar::new(plus_two, Weekday::Sun);
        let key = calendar.bucket_key(&at("2024-01-31T23:30:00Z"), Period::Monthly);
        assert_eq!(key.to_string(), "2024-02");
        assert_eq!(key.label(), "February 2024");

        let again = calendar.bucket_key(&at("2024-01-31T23:30:00Z"), Period::Monthly);
        assert_eq!(key, again);
    }

    #[test]
    fn buckets_are_sorted_chronologically() {
        let calendar = Calendar::new(Utc, Weekday::Sun);
        let records = vec![
            mood("2024-03-05T08:00:00Z"),
            mood("2023-12-30T08:00:00Z"),
            mood("2024-01-15T08:00:00Z"),
            mood("2024-01-02T08:00:00Z"),
        ];

        let keys: Vec<String> = calendar
            .bucket(&records, Period::Monthly)
            .iter()
            .map(|bucket| bucket.key.to_string())
            .collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);

        let weekly = calendar.bucket(&records, Period::Weekly);
        let keys: Vec<String> = weekly.iter().map(|b| b.key.to_string()).collect();
        assert_eq!(keys, vec!["2023-12-24", "2023-12-31", "2024-01-14", "2024-03-03"]);
        let total: usize = weekly.iter().map(|b| b.records.len()).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let calendar = Calendar::new(Utc, Weekday::Sun);
        let records: Vec<MoodRecord> = Vec::new();
        assert!(calendar.bucket(&records, Period::Weekly).is_empty());
    }

    #[test]
    fn period_parses_query_values() {
        assert_eq!("weekly".parse::<Period>(), Ok(Period::Weekly));
        assert_eq!(" Monthly ".parse::<Period>(), Ok(Period::Monthly));
        assert!("daily".parse::<Period>().is_err());
    }
}
