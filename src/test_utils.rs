//! Shared test utilities for the records engine.
//!
//! Builders for attendance, grade and leave records with sensible defaults, and a
//! small in-memory records feed covering every collaborator call.

use crate::{
    collaborator::{FeedApi, FeedSnapshot, SessionRoster},
    models::{
        AttendanceRecord, AttendanceStatus, ClassSession, GradeRecord, LeaveRequest, LeaveStatus,
        RawAttendanceRecord, RosterMember, ScheduledSession, Semester, StudentListing,
        SubjectGrade,
    },
};
use chrono::{Datelike, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// 2024-03-04, a Monday.
#[must_use]
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default()
}

/// Creates a validated record for student `s1`.
///
/// # Arguments
/// * `date` - `YYYY-MM-DD`
/// * `subject` - Subject name
/// * `status` - Presence mark
///
/// # Defaults
/// * `id`: unique per call
/// * `time_slot`: `10:00 AM - 11:00 AM`
#[must_use]
pub fn record_on(date: &str, subject: &str, status: AttendanceStatus) -> AttendanceRecord {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or_default();
    AttendanceRecord {
        id: format!("rec-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)),
        student_id: "s1".to_string(),
        subject: subject.to_string(),
        date,
        day: date.weekday(),
        time_slot: Some("10:00 AM - 11:00 AM".to_string()),
        status,
    }
}

/// Creates a well-formed wire record for student `s1` on 2024-03-04.
#[must_use]
pub fn raw_record(id: &str, subject: &str, status: &str) -> RawAttendanceRecord {
    RawAttendanceRecord {
        id: Some(id.to_string()),
        student_id: Some("s1".to_string()),
        subject: Some(subject.to_string()),
        date: Some("2024-03-04".to_string()),
        day: Some("Monday".to_string()),
        time_slot: Some("10:00 AM - 11:00 AM".to_string()),
        status: Some(status.to_string()),
    }
}

/// Two months of records: March first, then April. Subjects first appear in the
/// order Math, Physics, Chemistry.
#[must_use]
pub fn sample_month_records() -> Vec<AttendanceRecord> {
    use AttendanceStatus::{Absent, Present};
    [
        ("2024-03-04", "Math", Present),
        ("2024-03-04", "Physics", Present),
        ("2024-03-05", "Math", Absent),
        ("2024-03-06", "Chemistry", Present),
        ("2024-03-12", "Physics", Absent),
        ("2024-03-19", "Math", Present),
        ("2024-03-29", "Chemistry", Absent),
        ("2024-04-01", "Math", Present),
        ("2024-04-02", "Physics", Present),
        ("2024-04-09", "Chemistry", Present),
        ("2024-03-26", "Math", Absent),
    ]
    .into_iter()
    .map(|(date, subject, status)| record_on(date, subject, status))
    .collect()
}

fn subject(name: &str, grade: &str, credits: u32) -> SubjectGrade {
    SubjectGrade {
        name: name.to_string(),
        grade: grade.to_string(),
        credits,
    }
}

/// Grades for `s1` with CGPA 8.4 and semesters stored out of order (3, 1, 2).
#[must_use]
pub fn sample_grades() -> GradeRecord {
    GradeRecord {
        student_id: "s1".to_string(),
        cgpa: Some(8.4),
        semesters: vec![
            Semester {
                number: 3,
                sgpa: Some(8.0),
                subjects: vec![subject("OS", "A", 4)],
            },
            Semester {
                number: 1,
                sgpa: Some(8.7),
                subjects: vec![subject("Maths-I", "A+", 4), subject("Physics", "A", 3)],
            },
            Semester {
                number: 2,
                sgpa: Some(8.1),
                subjects: vec![subject("DBMS", "A", 4), subject("DSA", "B+", 4)],
            },
        ],
    }
}

/// A leave request no approver has acted on.
#[must_use]
pub fn pending_leave(id: &str, student_id: &str) -> LeaveRequest {
    LeaveRequest {
        id: id.to_string(),
        student_id: student_id.to_string(),
        from_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap_or_default(),
        to_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap_or_default(),
        reason: "Family function".to_string(),
        parent_status: LeaveStatus::Pending,
        hod_status: LeaveStatus::Pending,
        final_status: LeaveStatus::Pending,
    }
}

#[must_use]
pub fn roster_member(id: &str, name: &str) -> RosterMember {
    RosterMember {
        id: id.to_string(),
        name: name.to_string(),
        roll_no: None,
    }
}

/// DBMS for CSE 2-A, held Mondays 10-11.
#[must_use]
pub fn dbms_session() -> ClassSession {
    ClassSession {
        subject: "DBMS".to_string(),
        year: 2,
        section: "A".to_string(),
        branch: "CSE".to_string(),
        time_slot: "10:00 AM - 11:00 AM".to_string(),
    }
}

fn os_session() -> ClassSession {
    ClassSession {
        subject: "OS".to_string(),
        year: 3,
        section: "B".to_string(),
        branch: "CSE".to_string(),
        time_slot: "11:00 AM - 12:00 PM".to_string(),
    }
}

/// A timetable slot held by `teacher`.
#[must_use]
pub fn slot(day: &str, session: ClassSession, teacher: Option<&str>) -> ScheduledSession {
    ScheduledSession {
        day: day.to_string(),
        session,
        teacher: teacher.map(ToString::to_string),
    }
}

fn raw_for(student: &str, id: &str, subject: &str, status: &str) -> RawAttendanceRecord {
    RawAttendanceRecord {
        student_id: Some(student.to_string()),
        ..raw_record(id, subject, status)
    }
}

/// Snapshot behind [`sample_feed`].
///
/// * timetable: DBMS (CSE 2-A) and OS (CSE 3-B) on Mondays, DBMS again on Tuesdays
/// * rosters: CSE 2-A has `s1` Asha Rao, `s2` Bilal Khan, `s3` Chen Wei; CSE 3-B has
///   no enrolment
/// * attendance for `s1` and `s2`, grades for `s1`, one pending leave `leave-1` of `s1`
#[must_use]
pub fn sample_snapshot() -> FeedSnapshot {
    let mut tuesday_dbms = dbms_session();
    tuesday_dbms.time_slot = "2:00 PM - 3:00 PM".to_string();

    FeedSnapshot {
        attendance: vec![
            raw_for("s1", "a1", "DBMS", "present"),
            raw_for("s1", "a2", "OS", "absent"),
            raw_for("s2", "a3", "DBMS", "present"),
        ],
        grades: vec![sample_grades()],
        leaves: vec![pending_leave("leave-1", "s1")],
        timetable: vec![
            slot("Monday", dbms_session(), Some("R. Iyer")),
            slot("Monday", os_session(), None),
            slot("Tuesday", tuesday_dbms, Some("R. Iyer")),
        ],
        rosters: vec![SessionRoster {
            year: 2,
            section: "A".to_string(),
            branch: "CSE".to_string(),
            students: vec![
                roster_member("s1", "Asha Rao"),
                roster_member("s2", "Bilal Khan"),
                roster_member("s3", "Chen Wei"),
            ],
        }],
        students: vec![StudentListing {
            name: Some("Asha Rao".to_string()),
            branch: Some("CSE".to_string()),
            year: Some(2),
            section: Some("A".to_string()),
        }],
    }
}

/// A records feed serving [`sample_snapshot`].
#[must_use]
pub fn sample_feed() -> FeedApi {
    FeedApi::new(sample_snapshot())
}
