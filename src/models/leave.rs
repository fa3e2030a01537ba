//! Leave requests and their two-actor approval fields.

use super::attendance::calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision state of a leave request, per actor and overall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// No decision recorded yet
    #[default]
    Pending,
    /// Leave granted
    Approved,
    /// Leave refused
    Rejected,
}

impl LeaveStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is deciding on a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproverRole {
    /// The student's linked parent
    Parent,
    /// Head of department
    Hod,
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str("parent"),
            Self::Hod => f.write_str("hod"),
        }
    }
}

/// Which leave list to fetch from the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveScope {
    /// Requests filed by one student
    Student(String),
    /// Requests awaiting an approver's attention
    Approver(ApproverRole),
}

/// A student's leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Request identifier (`_id` in the API payload)
    #[serde(alias = "_id")]
    pub id: String,
    /// Student who filed the request
    pub student_id: String,
    /// First day of leave
    #[serde(with = "calendar_date")]
    pub from_date: NaiveDate,
    /// Last day of leave
    #[serde(with = "calendar_date")]
    pub to_date: NaiveDate,
    /// Reason given by the student
    pub reason: String,
    /// Parent's decision
    #[serde(default)]
    pub parent_status: LeaveStatus,
    /// HOD's decision
    #[serde(default)]
    pub hod_status: LeaveStatus,
    /// Status shown to the student; mirrors the most recent decision
    #[serde(default)]
    pub final_status: LeaveStatus,
}

impl LeaveRequest {
    /// The decision field owned by `role`.
    #[must_use]
    pub const fn status_for(&self, role: ApproverRole) -> LeaveStatus {
        match role {
            ApproverRole::Parent => self.parent_status,
            ApproverRole::Hod => self.hod_status,
        }
    }
}

/// A new leave request as entered by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    /// Student filing the request
    pub student_id: String,
    /// First day of leave
    #[serde(with = "calendar_date")]
    pub from_date: NaiveDate,
    /// Last day of leave
    #[serde(with = "calendar_date")]
    pub to_date: NaiveDate,
    /// Reason for the leave
    pub reason: String,
}
