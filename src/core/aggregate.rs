//! Attendance aggregation business logic.
//!
//! This module turns validated attendance records into period buckets, presence
//! percentages and per-subject conducted/attended tallies. Every function is pure and
//! framework-agnostic; the report layer formats the returned structures.
//!
//! Week buckets use the day of the month (`ceil(day / 7)`), not ISO weeks. A week
//! that spans a month boundary is split in two and days 29-31 form a fifth week. This
//! matches the numbering already shown to users and is kept as-is.

use crate::{
    errors::Error,
    models::{AttendanceRecord, RawAttendanceRecord},
};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, warn};

/// Period size used when bucketing attendance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per record
    #[default]
    Day,
    /// Day-of-month week: `{year}-W{ceil(day/7)}`
    Week,
    /// Calendar month: `{year}-{month}`
    Month,
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(Error::validation(format!("unknown granularity {other:?}"))),
        }
    }
}

impl Granularity {
    /// Bucket key of `date` at this granularity.
    #[must_use]
    pub fn key_for(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => format!("{}-W{}", date.year(), date.day().div_ceil(7)),
            Self::Month => format!("{}-{}", date.year(), date.month()),
        }
    }
}

/// A named group of records sharing a period key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket<'a> {
    /// Period key, e.g. `"2024-W2"`
    pub key: String,
    /// Records in the period, in input order
    pub records: Vec<&'a AttendanceRecord>,
}

impl Bucket<'_> {
    /// Presence percentage of the bucket, formatted to two decimals.
    #[must_use]
    pub fn percentage(&self) -> String {
        percentage(self.records.iter().copied())
    }

    /// Number of records in the bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the bucket holds no records. Buckets produced by [`group_by_period`]
    /// never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lazy iterator over period buckets, in first-encounter order of their keys.
///
/// Cloning the iterator yields an independent cursor, so a grouping can be walked
/// any number of times.
#[derive(Debug, Clone)]
pub struct Buckets<'a> {
    records: &'a [AttendanceRecord],
    granularity: Granularity,
    cursor: usize,
    emitted: HashSet<String>,
}

impl<'a> Iterator for Buckets<'a> {
    type Item = Bucket<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.records;
        let granularity = self.granularity;

        if granularity == Granularity::Day {
            let record = records.get(self.cursor)?;
            self.cursor += 1;
            return Some(Bucket {
                key: granularity.key_for(record.date),
                records: vec![record],
            });
        }

        while let Some(record) = records.get(self.cursor) {
            self.cursor += 1;
            let key = granularity.key_for(record.date);
            if self.emitted.contains(&key) {
                continue;
            }

            let members: Vec<&'a AttendanceRecord> = std::iter::once(record)
                .chain(
                    records[self.cursor..]
                        .iter()
                        .filter(|r| granularity.key_for(r.date) == key),
                )
                .collect();
            self.emitted.insert(key.clone());
            return Some(Bucket {
                key,
                records: members,
            });
        }
        None
    }
}

/// Groups records into period buckets.
///
/// `Day` returns one bucket per record with no merging, even for records sharing a
/// date. `Week` and `Month` merge records with equal keys; buckets come out in the
/// order their key first appears in `records`, not chronologically.
#[must_use]
pub fn group_by_period(records: &[AttendanceRecord], granularity: Granularity) -> Buckets<'_> {
    Buckets {
        records,
        granularity,
        cursor: 0,
        emitted: HashSet::new(),
    }
}

/// Counts `(present, total)` over the records.
pub fn presence_counts<'a, I>(records: I) -> (usize, usize)
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .fold((0, 0), |(present, total), r| {
            (present + usize::from(r.is_present()), total + 1)
        })
}

/// Formats `attended / conducted` as a percentage with `decimals` places.
///
/// Returns zero at the requested precision when nothing was conducted.
#[must_use]
pub fn format_ratio(attended: usize, conducted: usize, decimals: usize) -> String {
    if conducted == 0 {
        return format!("{:.decimals$}", 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let value = attended as f64 / conducted as f64 * 100.0;
    format!("{value:.decimals$}")
}

/// Presence percentage with two decimals; `"0.00"` for an empty set.
///
/// # Example
/// `[present, absent, present]` gives `"66.67"`.
pub fn percentage<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    percentage_with_precision(records, 2)
}

/// Presence percentage with a caller-chosen number of decimals.
///
/// The parent overview shows one decimal (`"0.0"` when empty).
pub fn percentage_with_precision<'a, I>(records: I, decimals: usize) -> String
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let (present, total) = presence_counts(records);
    format_ratio(present, total, decimals)
}

/// Conducted and attended periods for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTally {
    /// Subject name
    pub subject: String,
    /// All recorded periods
    pub conducted: usize,
    /// Periods marked present
    pub attended: usize,
}

impl SubjectTally {
    /// Presence percentage for the subject, two decimals.
    #[must_use]
    pub fn percentage(&self) -> String {
        format_ratio(self.attended, self.conducted, 2)
    }
}

/// Per-subject tallies plus grand totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSummary {
    /// Tallies in order of each subject's first appearance
    pub subjects: Vec<SubjectTally>,
    /// Sum of `conducted` over all subjects
    pub total_conducted: usize,
    /// Sum of `attended` over all subjects
    pub total_attended: usize,
}

impl SubjectSummary {
    /// Overall presence percentage across subjects; `"0.00"` when empty.
    #[must_use]
    pub fn overall_percentage(&self) -> String {
        format_ratio(self.total_attended, self.total_conducted, 2)
    }

    /// Tally for one subject, if it appears in the records.
    #[must_use]
    pub fn get(&self, subject: &str) -> Option<&SubjectTally> {
        self.subjects.iter().find(|t| t.subject == subject)
    }
}

/// Tallies conducted and attended periods per subject.
///
/// Records with a blank subject are skipped.
pub fn subject_summary<'a, I>(records: I) -> SubjectSummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut summary = SubjectSummary::default();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if record.subject.trim().is_empty() {
            continue;
        }
        let slot = *index.entry(record.subject.as_str()).or_insert_with(|| {
            summary.subjects.push(SubjectTally {
                subject: record.subject.clone(),
                conducted: 0,
                attended: 0,
            });
            summary.subjects.len() - 1
        });

        let tally = &mut summary.subjects[slot];
        tally.conducted += 1;
        summary.total_conducted += 1;
        if record.is_present() {
            tally.attended += 1;
            summary.total_attended += 1;
        }
    }

    summary
}

/// Weekday filter of the student attendance screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayFilter {
    /// Every record
    #[default]
    All,
    /// Records held on one weekday
    On(Weekday),
}

/// Keeps the records matching `filter`.
#[must_use]
pub fn filter_by_weekday(records: &[AttendanceRecord], filter: DayFilter) -> Vec<&AttendanceRecord> {
    match filter {
        DayFilter::All => records.iter().collect(),
        DayFilter::On(day) => records.iter().filter(|r| r.day == day).collect(),
    }
}

/// Result of validating a raw attendance feed.
#[derive(Debug, Default)]
pub struct Ingested {
    /// Records fit for aggregation, in feed order
    pub records: Vec<AttendanceRecord>,
    /// One [`Error::MalformedRecord`] per excluded entry
    pub rejected: Vec<Error>,
}

/// Validates a raw feed, setting malformed entries aside instead of failing.
pub fn ingest(raw: Vec<RawAttendanceRecord>) -> Ingested {
    let mut ingested = Ingested::default();
    for (position, entry) in raw.into_iter().enumerate() {
        match entry.into_record(position) {
            Ok(record) => ingested.records.push(record),
            Err(e) => {
                warn!("Excluding attendance entry from aggregation: {}", e);
                ingested.rejected.push(e);
            }
        }
    }
    debug!(
        "Ingested {} attendance records ({} rejected)",
        ingested.records.len(),
        ingested.rejected.len()
    );
    ingested
}
