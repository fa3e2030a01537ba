//! Collaborator seam - the remote records API as seen by the engine.
//!
//! Transport, authentication and persistence live behind this trait. Every method is a
//! single request: failures come back as [`crate::errors::Error::CollaboratorUnavailable`]
//! and are never retried here.

use crate::{
    errors::Result,
    models::{
        ApproverRole, AttendanceBatch, ClassSession, GradeRecord, LeaveApplication, LeaveRequest,
        LeaveScope, LeaveStatus, RawAttendanceRecord, RosterMember, SingleEntry,
    },
};
use chrono::NaiveDate;

/// JSON snapshot implementation used by the binary and tests
pub mod feed;

pub use feed::{FeedApi, FeedSnapshot, SessionRoster};

/// Calls the engine makes against the academic records API.
// Callers drive the engine from one task, so the futures need no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait RecordsApi {
    /// Class sessions the current teacher holds on `date`.
    async fn fetch_sessions_for_date(&self, date: NaiveDate) -> Result<Vec<ClassSession>>;

    /// Students enrolled in the session's year, section and branch.
    async fn fetch_roster_for(&self, session: &ClassSession) -> Result<Vec<RosterMember>>;

    /// Records attendance for a whole session in one request.
    async fn submit_attendance_batch(&self, batch: &AttendanceBatch) -> Result<()>;

    /// Records a single student's attendance.
    async fn submit_attendance_entry(&self, entry: &SingleEntry) -> Result<()>;

    /// Raw attendance records, for one student or for everyone visible to the caller.
    async fn fetch_attendance(&self, student_id: Option<&str>) -> Result<Vec<RawAttendanceRecord>>;

    /// Published grades of one student.
    async fn fetch_grades(&self, student_id: &str) -> Result<GradeRecord>;

    /// Leave requests in `scope`.
    async fn fetch_leaves(&self, scope: &LeaveScope) -> Result<Vec<LeaveRequest>>;

    /// Records one approver's decision on a leave request.
    async fn decide_leave(&self, id: &str, role: ApproverRole, status: LeaveStatus) -> Result<()>;

    /// Files a new leave request and returns it as stored.
    async fn apply_leave(&self, application: &LeaveApplication) -> Result<LeaveRequest>;
}
