//! Roster and class-schedule shapes supplied by the timetable collaborator.

use serde::{Deserialize, Serialize};

/// One teachable unit on a given date. Used only as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    /// Subject taught
    pub subject: String,
    /// Year of study
    pub year: u32,
    /// Section letter, e.g. `"A"`
    pub section: String,
    /// Branch, e.g. `"CSE"`
    pub branch: String,
    /// Period label, e.g. `"10:00 AM - 11:00 AM"`
    #[serde(alias = "time")]
    pub time_slot: String,
}

impl ClassSession {
    /// Short label for logs and pickers: `"DBMS (CSE 2-A, 10:00 AM - 11:00 AM)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} ({} {}-{}, {})",
            self.subject, self.branch, self.year, self.section, self.time_slot
        )
    }
}

/// A timetable slot: the session held every week on `day`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    /// Weekday name, e.g. `"Monday"`
    pub day: String,
    /// The session held in the slot
    #[serde(flatten)]
    pub session: ClassSession,
    /// Name of the teacher holding the session
    #[serde(default, alias = "teacherName")]
    pub teacher: Option<String>,
}

/// A student enrolled in a class session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    /// Student identifier (`_id` in the API payload)
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name
    #[serde(alias = "studentName")]
    pub name: String,
    /// Roll number, when the institution assigns one
    #[serde(default)]
    pub roll_no: Option<String>,
}

/// A student row in linked-student listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListing {
    /// Display name
    #[serde(default, alias = "studentName")]
    pub name: Option<String>,
    /// Branch of study
    #[serde(default)]
    pub branch: Option<String>,
    /// Year of study
    #[serde(default)]
    pub year: Option<u32>,
    /// Section letter
    #[serde(default)]
    pub section: Option<String>,
}
