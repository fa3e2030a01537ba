//! Snapshot-backed records API.
//!
//! Serves the three collaborator feeds from a JSON snapshot (as exported from the
//! records API) and keeps submissions and leave decisions in memory, so a whole
//! capture or approval round can run without a server. `fail_next` makes the next
//! call fail the way an unreachable API would.

use super::RecordsApi;
use crate::{
    core::leave::apply_decision,
    errors::{Error, Result},
    models::{
        ApproverRole, AttendanceBatch, ClassSession, GradeRecord, LeaveApplication, LeaveRequest,
        LeaveScope, LeaveStatus, RawAttendanceRecord, RosterMember, ScheduledSession, SingleEntry,
        StudentListing, weekday_name,
    },
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Enrolment of one year/section/branch group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoster {
    /// Year of study
    pub year: u32,
    /// Section letter
    pub section: String,
    /// Branch of study
    pub branch: String,
    /// Enrolled students, in roll order
    #[serde(default)]
    pub students: Vec<RosterMember>,
}

impl SessionRoster {
    fn serves(&self, session: &ClassSession) -> bool {
        self.year == session.year
            && self.section.eq_ignore_ascii_case(&session.section)
            && self.branch.eq_ignore_ascii_case(&session.branch)
    }
}

/// Everything the API would serve, as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Attendance records as stored by the API
    #[serde(default)]
    pub attendance: Vec<RawAttendanceRecord>,
    /// Published grades, one record per student
    #[serde(default)]
    pub grades: Vec<GradeRecord>,
    /// Leave requests
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
    /// Weekly timetable of the teacher
    #[serde(default)]
    pub timetable: Vec<ScheduledSession>,
    /// Enrolment per class group
    #[serde(default)]
    pub rosters: Vec<SessionRoster>,
    /// Linked students, for listings
    #[serde(default)]
    pub students: Vec<StudentListing>,
}

impl FeedSnapshot {
    /// Reads a snapshot from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!("Reading records snapshot from {:?}", path_ref);
        let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
            message: format!("Failed to read records snapshot {path_ref:?}: {e}"),
        })?;
        serde_json::from_str(&contents).map_err(Into::into)
    }
}

#[derive(Debug, Default)]
struct FeedState {
    snapshot: FeedSnapshot,
    batches: Vec<AttendanceBatch>,
    entries: Vec<SingleEntry>,
    outage: Option<String>,
}

impl FeedState {
    fn check_outage(&mut self, operation: &'static str) -> Result<()> {
        match self.outage.take() {
            Some(message) => {
                warn!("Simulated outage on {}: {}", operation, message);
                Err(Error::unavailable(operation, message))
            }
            None => Ok(()),
        }
    }
}

/// [`RecordsApi`] served from a [`FeedSnapshot`].
#[derive(Debug, Default)]
pub struct FeedApi {
    state: RwLock<FeedState>,
}

impl FeedApi {
    /// Serves `snapshot`.
    #[must_use]
    pub fn new(snapshot: FeedSnapshot) -> Self {
        Self {
            state: RwLock::new(FeedState {
                snapshot,
                ..FeedState::default()
            }),
        }
    }

    /// Loads and serves a JSON snapshot file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshot = FeedSnapshot::from_path(path)?;
        info!(
            "Records snapshot loaded: {} attendance entries, {} grade records, {} leaves",
            snapshot.attendance.len(),
            snapshot.grades.len(),
            snapshot.leaves.len()
        );
        Ok(Self::new(snapshot))
    }

    /// Makes the next call fail with [`Error::CollaboratorUnavailable`].
    pub async fn fail_next(&self, message: &str) {
        self.state.write().await.outage = Some(message.to_string());
    }

    /// Batches accepted so far, oldest first.
    pub async fn submitted_batches(&self) -> Vec<AttendanceBatch> {
        self.state.read().await.batches.clone()
    }

    /// Single entries accepted so far, oldest first.
    pub async fn submitted_entries(&self) -> Vec<SingleEntry> {
        self.state.read().await.entries.clone()
    }

    /// Linked students, for roster listings.
    pub async fn students(&self) -> Vec<StudentListing> {
        self.state.read().await.snapshot.students.clone()
    }

    /// The full weekly timetable, for timetable exports.
    pub async fn timetable(&self) -> Vec<ScheduledSession> {
        self.state.read().await.snapshot.timetable.clone()
    }
}

impl RecordsApi for FeedApi {
    #[instrument(skip(self))]
    async fn fetch_sessions_for_date(&self, date: NaiveDate) -> Result<Vec<ClassSession>> {
        let mut state = self.state.write().await;
        state.check_outage("fetch sessions")?;
        let day = weekday_name(date.weekday());
        let sessions: Vec<ClassSession> = state
            .snapshot
            .timetable
            .iter()
            .filter(|slot| slot.day.eq_ignore_ascii_case(day))
            .map(|slot| slot.session.clone())
            .collect();
        debug!("{} sessions scheduled on {}", sessions.len(), day);
        Ok(sessions)
    }

    #[instrument(skip(self), fields(session = %session.label()))]
    async fn fetch_roster_for(&self, session: &ClassSession) -> Result<Vec<RosterMember>> {
        let mut state = self.state.write().await;
        state.check_outage("fetch roster")?;
        Ok(state
            .snapshot
            .rosters
            .iter()
            .find(|r| r.serves(session))
            .map(|r| r.students.clone())
            .unwrap_or_default())
    }

    #[instrument(skip(self, batch), fields(entries = batch.entries.len()))]
    async fn submit_attendance_batch(&self, batch: &AttendanceBatch) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_outage("submit batch")?;

        for entry in &batch.entries {
            let record = RawAttendanceRecord {
                id: Some(format!(
                    "{}-{}-{}-{}",
                    batch.date, batch.subject, batch.time_slot, entry.student_id
                )),
                student_id: Some(entry.student_id.clone()),
                subject: Some(batch.subject.clone()),
                date: Some(batch.date.to_string()),
                day: Some(batch.day.clone()),
                time_slot: Some(batch.time_slot.clone()),
                status: Some(entry.status.to_string()),
            };
            state.snapshot.attendance.push(record);
        }
        state.batches.push(batch.clone());
        info!(
            "Stored attendance batch for {} on {}",
            batch.subject, batch.date
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn submit_attendance_entry(&self, entry: &SingleEntry) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_outage("mark attendance")?;

        let today = Utc::now().date_naive();
        let position = state.snapshot.attendance.len();
        state.snapshot.attendance.push(RawAttendanceRecord {
            id: Some(format!("single-{position}")),
            student_id: Some(entry.student_id.clone()),
            subject: Some(entry.subject.clone()),
            date: Some(today.to_string()),
            day: Some(entry.day.clone()),
            time_slot: Some(entry.time_slot.clone()),
            status: Some(entry.status.to_string()),
        });
        state.entries.push(entry.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_attendance(&self, student_id: Option<&str>) -> Result<Vec<RawAttendanceRecord>> {
        let mut state = self.state.write().await;
        state.check_outage("fetch attendance")?;
        Ok(state
            .snapshot
            .attendance
            .iter()
            .filter(|r| student_id.is_none_or(|id| r.student_id.as_deref() == Some(id)))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn fetch_grades(&self, student_id: &str) -> Result<GradeRecord> {
        let mut state = self.state.write().await;
        state.check_outage("fetch grades")?;
        Ok(state
            .snapshot
            .grades
            .iter()
            .find(|g| g.student_id == student_id)
            .cloned()
            .unwrap_or_else(|| GradeRecord {
                student_id: student_id.to_string(),
                ..GradeRecord::default()
            }))
    }

    #[instrument(skip(self))]
    async fn fetch_leaves(&self, scope: &LeaveScope) -> Result<Vec<LeaveRequest>> {
        let mut state = self.state.write().await;
        state.check_outage("fetch leaves")?;
        let leaves = &state.snapshot.leaves;
        Ok(match scope {
            LeaveScope::Student(id) => leaves
                .iter()
                .filter(|l| &l.student_id == id)
                .cloned()
                .collect(),
            LeaveScope::Approver(_) => leaves.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn decide_leave(&self, id: &str, role: ApproverRole, status: LeaveStatus) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_outage("decide leave")?;
        let leave = state
            .snapshot
            .leaves
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::validation(format!("no leave request with id {id}")))?;
        apply_decision(leave, role, status)
    }

    #[instrument(skip(self))]
    async fn apply_leave(&self, application: &LeaveApplication) -> Result<LeaveRequest> {
        let mut state = self.state.write().await;
        state.check_outage("apply leave")?;
        let leave = LeaveRequest {
            id: format!("leave-{}", state.snapshot.leaves.len() + 1),
            student_id: application.student_id.clone(),
            from_date: application.from_date,
            to_date: application.to_date,
            reason: application.reason.clone(),
            parent_status: LeaveStatus::Pending,
            hod_status: LeaveStatus::Pending,
            final_status: LeaveStatus::Pending,
        };
        state.snapshot.leaves.push(leave.clone());
        Ok(leave)
    }
}
