//! Attendance records - one entry per student per class period.
//!
//! The collaborator delivers attendance as permissive JSON where any field may be
//! missing. [`RawAttendanceRecord`] mirrors that wire shape; [`AttendanceRecord`] is
//! the validated form the aggregator works on.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence mark for one student in one class period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Student attended the period
    Present,
    /// Student missed the period
    Absent,
}

impl AttendanceStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    /// The opposite mark, used by the capture toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }

    /// Parses a wire status, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// English weekday name (`"Monday"`), independent of the host locale.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses a full or abbreviated English weekday name.
#[must_use]
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse::<Weekday>().ok()
}

/// Extracts the calendar date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Only the leading date part is read, so `2024-03-05T18:30:00.000Z` is the 5th.
#[must_use]
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Serde adapter for dates the API sends either bare or as timestamps.
///
/// Use with `#[serde(with = "calendar_date")]`; dates are written back as `YYYY-MM-DD`.
pub mod calendar_date {
    use super::parse_calendar_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Writes `date` as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    /// Reads a bare date or the date part of a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_calendar_date(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid calendar date {value:?}")))
    }
}

/// Attendance entry exactly as the collaborator sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceRecord {
    /// Record identifier (`_id` in the API payload)
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    /// Student the mark belongs to
    #[serde(default)]
    pub student_id: Option<String>,
    /// Subject taught in the period
    #[serde(default)]
    pub subject: Option<String>,
    /// Calendar date or timestamp of the period
    #[serde(default)]
    pub date: Option<String>,
    /// Weekday name as entered by the teacher
    #[serde(default)]
    pub day: Option<String>,
    /// Period label, e.g. `"10:00 AM - 11:00 AM"`
    #[serde(default, alias = "time")]
    pub time_slot: Option<String>,
    /// `"present"` or `"absent"`
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated, immutable attendance record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Record identifier
    pub id: String,
    /// Student the mark belongs to
    pub student_id: String,
    /// Subject taught in the period
    pub subject: String,
    /// Calendar date of the period
    pub date: NaiveDate,
    /// Day of week of the period
    pub day: Weekday,
    /// Period label, when the collaborator supplied one
    pub time_slot: Option<String>,
    /// Presence mark
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Whether the student was marked present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}

fn required(value: Option<String>, field: &str, id: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MalformedRecord {
            id: id.to_string(),
            reason: format!("missing {field}"),
        }),
    }
}

impl RawAttendanceRecord {
    /// Validates the wire record into an [`AttendanceRecord`].
    ///
    /// `position` identifies the record in error reports when it has no id.
    /// A missing or unparseable `day` is derived from the date.
    pub fn into_record(self, position: usize) -> Result<AttendanceRecord> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(Error::MalformedRecord {
                    id: format!("#{position}"),
                    reason: "missing id".to_string(),
                });
            }
        };

        let student_id = required(self.student_id, "studentId", &id)?;
        let subject = required(self.subject, "subject", &id)?;
        let raw_date = required(self.date, "date", &id)?;
        let date = parse_calendar_date(&raw_date).ok_or_else(|| Error::MalformedRecord {
            id: id.clone(),
            reason: format!("unreadable date {raw_date:?}"),
        })?;
        let raw_status = required(self.status, "status", &id)?;
        let status = AttendanceStatus::parse(&raw_status).ok_or_else(|| Error::MalformedRecord {
            id: id.clone(),
            reason: format!("unknown status {raw_status:?}"),
        })?;

        let day = self
            .day
            .as_deref()
            .and_then(parse_weekday)
            .unwrap_or_else(|| date.weekday());

        let time_slot = self.time_slot.filter(|t| !t.trim().is_empty());

        Ok(AttendanceRecord {
            id,
            student_id,
            subject,
            date,
            day,
            time_slot,
            status,
        })
    }
}

/// One student's mark inside a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    /// Roster member the mark is for
    pub student_id: String,
    /// Presence mark
    pub status: AttendanceStatus,
}

/// Attendance for a whole class session, submitted in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBatch {
    /// Date the session was held
    pub date: NaiveDate,
    /// Weekday name derived from `date`
    pub day: String,
    /// Subject taught
    pub subject: String,
    /// Year of study
    pub year: u32,
    /// Section letter
    pub section: String,
    /// Branch of study
    pub branch: String,
    /// Period label
    pub time_slot: String,
    /// Exactly one entry per roster member, in roster order
    pub entries: Vec<BatchEntry>,
}

/// A teacher's one-off mark for a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleEntry {
    /// Student being marked
    pub student_id: String,
    /// Subject taught
    pub subject: String,
    /// Presence mark
    pub status: AttendanceStatus,
    /// Weekday name, e.g. `"Monday"`
    pub day: String,
    /// Period label, e.g. `"10:00 - 11:00"`
    #[serde(rename = "time")]
    pub time_slot: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn raw() -> RawAttendanceRecord {
        RawAttendanceRecord {
            id: Some("a1".to_string()),
            student_id: Some("s1".to_string()),
            subject: Some("Math".to_string()),
            date: Some("2024-03-05".to_string()),
            day: None,
            time_slot: Some("10:00 AM - 11:00 AM".to_string()),
            status: Some("present".to_string()),
        }
    }

    #[test]
    fn test_weekday_name_is_english() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(weekday_name(date.weekday()), "Tuesday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }

    #[test]
    fn test_parse_calendar_date_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_calendar_date("2024-03-05"), expected);
        assert_eq!(parse_calendar_date("2024-03-05T18:30:00.000Z"), expected);
        assert_eq!(parse_calendar_date("05/03/2024"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn test_status_parse_and_toggle() {
        assert_eq!(AttendanceStatus::parse(" Present "), Some(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::parse("ABSENT"), Some(AttendanceStatus::Absent));
        assert_eq!(AttendanceStatus::parse("late"), None);
        assert_eq!(AttendanceStatus::Present.toggled(), AttendanceStatus::Absent);
    }

    #[test]
    fn test_into_record_derives_missing_day() {
        let record = raw().into_record(0).unwrap();
        assert_eq!(record.day, Weekday::Tue);
        assert!(record.is_present());
        assert_eq!(record.time_slot.as_deref(), Some("10:00 AM - 11:00 AM"));
    }

    #[test]
    fn test_into_record_keeps_entered_day() {
        let mut r = raw();
        r.day = Some("Monday".to_string());
        let record = r.into_record(0).unwrap();
        assert_eq!(record.day, Weekday::Mon);
    }

    #[test]
    fn test_into_record_rejects_missing_fields() {
        let mut no_date = raw();
        no_date.date = None;
        let err = no_date.into_record(3).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref id, ref reason } if id == "a1" && reason == "missing date"));

        let mut no_id = raw();
        no_id.id = None;
        let err = no_id.into_record(7).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref id, .. } if id == "#7"));

        let mut bad_status = raw();
        bad_status.status = Some("late".to_string());
        assert!(bad_status.into_record(0).is_err());
    }

    #[test]
    fn test_raw_record_reads_api_field_names() {
        let json = r#"{"_id":"x","studentId":"s9","subject":"Physics","date":"2024-01-02T00:00:00.000Z","day":"Tuesday","time":"1:00 PM - 2:00 PM","status":"absent"}"#;
        let raw: RawAttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id.as_deref(), Some("x"));
        assert_eq!(raw.time_slot.as_deref(), Some("1:00 PM - 2:00 PM"));
        let record = raw.into_record(0).unwrap();
        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
