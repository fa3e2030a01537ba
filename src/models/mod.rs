//! Record model - canonical shapes for the three collaborator feeds.
//! Wire shapes mirror the API's camelCase JSON; validated shapes carry typed fields.

pub mod attendance;
pub mod grade;
pub mod leave;
pub mod roster;

pub use attendance::{
    AttendanceBatch, AttendanceRecord, AttendanceStatus, BatchEntry, RawAttendanceRecord,
    SingleEntry, calendar_date, parse_calendar_date, parse_weekday, weekday_name,
};
pub use grade::{GradeRecord, Semester, SubjectGrade};
pub use leave::{ApproverRole, LeaveApplication, LeaveRequest, LeaveScope, LeaveStatus};
pub use roster::{ClassSession, RosterMember, ScheduledSession, StudentListing};
