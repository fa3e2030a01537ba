//! Bulk attendance capture business logic.
//!
//! A teacher records attendance for a whole class session in three steps: pick a date,
//! pick one of the sessions held that day, then mark the roster. The workflow is one
//! [`CaptureState`] value; data belonging to a later step cannot survive a move back to
//! an earlier one.
//!
//! Each collaborator round trip is split into `begin_*` (validate, mark the call in
//! flight, hand out the request) and `finish_*` (apply the response). While a call is
//! in flight every other transition fails with [`Error::Busy`], so one batch can never
//! be submitted twice concurrently. The async helpers (`select_date`, `select_session`,
//! `submit`) run both halves against a [`RecordsApi`]. Nothing is retried.

use crate::{
    collaborator::RecordsApi,
    errors::{Error, Result},
    models::{
        AttendanceBatch, AttendanceStatus, BatchEntry, ClassSession, RosterMember, SingleEntry,
        parse_calendar_date, parse_weekday, weekday_name,
    },
};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Parses the date picker's value; blank input is rejected.
pub fn parse_date_input(input: &str) -> Result<NaiveDate> {
    if input.trim().is_empty() {
        return Err(Error::validation("select a date first"));
    }
    parse_calendar_date(input)
        .ok_or_else(|| Error::validation(format!("{input:?} is not a YYYY-MM-DD date")))
}

/// One roster member and the mark currently recorded for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMark {
    /// The student
    pub member: RosterMember,
    /// Current mark
    pub status: AttendanceStatus,
}

/// Marks being entered for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterCapture {
    date: NaiveDate,
    sessions: Vec<ClassSession>,
    session: ClassSession,
    marks: Vec<RosterMark>,
    filter: String,
}

impl RosterCapture {
    fn new(
        date: NaiveDate,
        sessions: Vec<ClassSession>,
        session: ClassSession,
        roster: Vec<RosterMember>,
    ) -> Self {
        let marks = roster
            .into_iter()
            .map(|member| RosterMark {
                member,
                status: AttendanceStatus::Present,
            })
            .collect();
        Self {
            date,
            sessions,
            session,
            marks,
            filter: String::new(),
        }
    }

    /// Date of the session.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The session being captured.
    #[must_use]
    pub const fn session(&self) -> &ClassSession {
        &self.session
    }

    /// Every roster member with their mark, in roster order.
    #[must_use]
    pub fn marks(&self) -> &[RosterMark] {
        &self.marks
    }

    /// Current name filter.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Members whose name contains the filter text, ignoring case.
    #[must_use]
    pub fn visible(&self) -> Vec<&RosterMark> {
        let needle = self.filter.trim().to_lowercase();
        self.marks
            .iter()
            .filter(|m| needle.is_empty() || m.member.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Mark of one student.
    #[must_use]
    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.marks
            .iter()
            .find(|m| m.member.id == student_id)
            .map(|m| m.status)
    }

    /// Number of members currently marked absent.
    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| m.status == AttendanceStatus::Absent)
            .count()
    }

    fn mark_mut(&mut self, student_id: &str) -> Result<&mut RosterMark> {
        self.marks
            .iter_mut()
            .find(|m| m.member.id == student_id)
            .ok_or_else(|| Error::validation(format!("student {student_id} is not on this roster")))
    }

    /// Builds the batch, checking it covers every roster member exactly once.
    fn to_batch(&self) -> Result<AttendanceBatch> {
        if self.marks.is_empty() {
            return Err(Error::validation("cannot submit an empty roster"));
        }
        let mut seen = HashSet::new();
        let entries: Vec<BatchEntry> = self
            .marks
            .iter()
            .map(|m| {
                if seen.insert(m.member.id.as_str()) {
                    Ok(BatchEntry {
                        student_id: m.member.id.clone(),
                        status: m.status,
                    })
                } else {
                    Err(Error::validation(format!(
                        "student {} appears twice in the batch",
                        m.member.id
                    )))
                }
            })
            .collect::<Result<_>>()?;

        Ok(AttendanceBatch {
            date: self.date,
            day: weekday_name(self.date.weekday()).to_string(),
            subject: self.session.subject.clone(),
            year: self.session.year,
            section: self.session.section.clone(),
            branch: self.session.branch.clone(),
            time_slot: self.session.time_slot.clone(),
            entries,
        })
    }
}

/// Step of the capture workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    /// Waiting for a date
    #[default]
    SelectDate,
    /// Sessions held on `date` were fetched; waiting for a pick
    SelectSession {
        /// Chosen date
        date: NaiveDate,
        /// Sessions held that day
        sessions: Vec<ClassSession>,
    },
    /// Roster loaded; marks are being entered
    CaptureRoster(RosterCapture),
}

impl CaptureState {
    /// Name of the step, for errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectDate => "SelectDate",
            Self::SelectSession { .. } => "SelectSession",
            Self::CaptureRoster(_) => "CaptureRoster",
        }
    }
}

/// Collaborator call currently awaiting a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InFlight {
    /// Sessions for a date
    Sessions(NaiveDate),
    /// Roster for a session
    Roster(ClassSession),
    /// Batch submission
    Submission,
}

impl InFlight {
    const fn operation(&self) -> &'static str {
        match self {
            Self::Sessions(_) => "fetch sessions",
            Self::Roster(_) => "fetch roster",
            Self::Submission => "submit batch",
        }
    }
}

/// What picking a date led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    /// Sessions were found; the workflow moved to session selection
    SessionsLoaded(usize),
    /// No sessions are held that day; the workflow stays on date selection
    NoSessions,
}

/// Receipt for an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    /// The batch as sent
    pub batch: AttendanceBatch,
}

/// The bulk capture state machine.
#[derive(Debug, Default)]
pub struct CaptureWorkflow {
    state: CaptureState,
    in_flight: Option<InFlight>,
}

impl CaptureWorkflow {
    /// A workflow waiting for a date.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    #[must_use]
    pub const fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Whether a collaborator call is outstanding. UIs disable input and show a
    /// loading indicator while this is true.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The outstanding call, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// Sessions available for picking, when on session selection.
    #[must_use]
    pub fn sessions(&self) -> Option<&[ClassSession]> {
        match &self.state {
            CaptureState::SelectSession { sessions, .. } => Some(sessions),
            _ => None,
        }
    }

    /// The roster being marked, when on roster capture.
    #[must_use]
    pub const fn capture(&self) -> Option<&RosterCapture> {
        match &self.state {
            CaptureState::CaptureRoster(capture) => Some(capture),
            _ => None,
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.in_flight {
            Some(call) => Err(Error::Busy {
                operation: call.operation(),
            }),
            None => Ok(()),
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    fn capture_mut(&mut self, action: &'static str) -> Result<&mut RosterCapture> {
        self.ensure_idle()?;
        let state = self.state.name();
        match &mut self.state {
            CaptureState::CaptureRoster(capture) => Ok(capture),
            _ => Err(Error::InvalidTransition { state, action }),
        }
    }

    /// Abandons the outstanding call, e.g. when the UI drops its future. The state is
    /// left where it was before the call began.
    pub fn cancel_in_flight(&mut self) {
        if let Some(call) = self.in_flight.take() {
            debug!("Abandoned in-flight {}", call.operation());
        }
    }

    /// Starts the date step: returns the date whose sessions must be fetched.
    pub fn begin_date(&mut self, date: NaiveDate) -> Result<NaiveDate> {
        self.ensure_idle()?;
        if !matches!(self.state, CaptureState::SelectDate) {
            return Err(self.invalid("select a date"));
        }
        self.in_flight = Some(InFlight::Sessions(date));
        Ok(date)
    }

    /// Applies the sessions response.
    ///
    /// Zero sessions is a dead end: the workflow stays on date selection and reports
    /// [`DateOutcome::NoSessions`].
    pub fn finish_date(&mut self, response: Result<Vec<ClassSession>>) -> Result<DateOutcome> {
        let Some(InFlight::Sessions(date)) = self.in_flight.clone() else {
            return Err(self.invalid("receive sessions"));
        };
        self.in_flight = None;

        let sessions = response?;
        if sessions.is_empty() {
            info!("No sessions held on {}", date);
            return Ok(DateOutcome::NoSessions);
        }

        let count = sessions.len();
        self.state = CaptureState::SelectSession { date, sessions };
        debug!("{} sessions available on {}", count, date);
        Ok(DateOutcome::SessionsLoaded(count))
    }

    /// Index of `session` among the fetched sessions, for pickers that hold values.
    pub fn session_index(&self, session: &ClassSession) -> Result<usize> {
        self.sessions()
            .and_then(|sessions| sessions.iter().position(|s| s == session))
            .ok_or_else(|| {
                Error::validation(format!(
                    "{} is not held on the selected date",
                    session.label()
                ))
            })
    }

    /// Starts the session step: returns the session whose roster must be fetched.
    pub fn begin_session(&mut self, index: usize) -> Result<ClassSession> {
        self.ensure_idle()?;
        let CaptureState::SelectSession { sessions, .. } = &self.state else {
            return Err(self.invalid("select a session"));
        };
        let session = sessions.get(index).cloned().ok_or_else(|| {
            Error::validation(format!(
                "session {index} is out of range ({} available)",
                sessions.len()
            ))
        })?;
        self.in_flight = Some(InFlight::Roster(session.clone()));
        Ok(session)
    }

    /// Applies the roster response, marking every member present.
    ///
    /// An empty roster or a roster listing a student twice cannot produce a valid
    /// batch; the workflow then stays on session selection.
    pub fn finish_session(&mut self, response: Result<Vec<RosterMember>>) -> Result<usize> {
        let Some(InFlight::Roster(session)) = self.in_flight.clone() else {
            return Err(self.invalid("receive a roster"));
        };
        self.in_flight = None;

        let roster = response?;
        if roster.is_empty() {
            return Err(Error::validation(format!(
                "no students enrolled in {}",
                session.label()
            )));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = roster.iter().find(|m| !ids.insert(m.id.as_str())) {
            return Err(Error::validation(format!(
                "roster lists student {} more than once",
                dup.id
            )));
        }

        let CaptureState::SelectSession { date, sessions } = std::mem::take(&mut self.state)
        else {
            return Err(self.invalid("receive a roster"));
        };
        let size = roster.len();
        self.state = CaptureState::CaptureRoster(RosterCapture::new(date, sessions, session, roster));
        Ok(size)
    }

    /// Sets the display filter. The submitted batch ignores it.
    pub fn set_filter(&mut self, text: &str) -> Result<()> {
        self.capture_mut("filter the roster")?.filter = text.to_string();
        Ok(())
    }

    /// Flips one student's mark and returns the new one.
    pub fn toggle(&mut self, student_id: &str) -> Result<AttendanceStatus> {
        let mark = self.capture_mut("toggle a mark")?.mark_mut(student_id)?;
        mark.status = mark.status.toggled();
        Ok(mark.status)
    }

    /// Sets one student's mark.
    pub fn set_status(&mut self, student_id: &str, status: AttendanceStatus) -> Result<()> {
        self.capture_mut("set a mark")?.mark_mut(student_id)?.status = status;
        Ok(())
    }

    /// Sets every member's mark, filtered out or not.
    pub fn mark_all(&mut self, status: AttendanceStatus) -> Result<()> {
        for mark in &mut self.capture_mut("mark everyone")?.marks {
            mark.status = status;
        }
        Ok(())
    }

    /// Steps back: roster capture returns to session selection (dropping the marks),
    /// session selection returns to date selection (dropping the sessions).
    pub fn back(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.state = match std::mem::take(&mut self.state) {
            CaptureState::CaptureRoster(capture) => {
                debug!("Discarding {} unsubmitted marks", capture.marks.len());
                CaptureState::SelectSession {
                    date: capture.date,
                    sessions: capture.sessions,
                }
            }
            CaptureState::SelectSession { .. } | CaptureState::SelectDate => {
                CaptureState::SelectDate
            }
        };
        Ok(())
    }

    /// Starts submission: validates the batch locally and returns it for sending.
    pub fn begin_submit(&mut self) -> Result<AttendanceBatch> {
        let batch = self.capture_mut("submit")?.to_batch()?;
        self.in_flight = Some(InFlight::Submission);
        Ok(batch)
    }

    /// Applies the submission response. Success clears everything and returns to date
    /// selection; failure keeps the marks so the user can retry.
    pub fn finish_submit(&mut self, response: Result<()>) -> Result<Submitted> {
        if self.in_flight != Some(InFlight::Submission) {
            return Err(self.invalid("receive a submission result"));
        }
        self.in_flight = None;

        if let Err(e) = response {
            warn!("Attendance batch was not accepted: {}", e);
            return Err(e);
        }

        let CaptureState::CaptureRoster(capture) = std::mem::take(&mut self.state) else {
            return Err(self.invalid("receive a submission result"));
        };
        let batch = capture.to_batch()?;
        info!(
            "Attendance submitted for {} on {}: {} entries, {} absent",
            capture.session.label(),
            capture.date,
            batch.entries.len(),
            capture.absent_count()
        );
        Ok(Submitted { batch })
    }

    /// Picks a date and fetches its sessions.
    #[instrument(skip(self, api))]
    pub async fn select_date<A: RecordsApi>(
        &mut self,
        api: &A,
        date: NaiveDate,
    ) -> Result<DateOutcome> {
        let date = self.begin_date(date)?;
        let response = api.fetch_sessions_for_date(date).await;
        self.finish_date(response)
    }

    /// Picks a session by index and loads its roster.
    #[instrument(skip(self, api))]
    pub async fn select_session<A: RecordsApi>(&mut self, api: &A, index: usize) -> Result<usize> {
        let session = self.begin_session(index)?;
        let response = api.fetch_roster_for(&session).await;
        self.finish_session(response)
    }

    /// Sends the batch.
    #[instrument(skip(self, api))]
    pub async fn submit<A: RecordsApi>(&mut self, api: &A) -> Result<Submitted> {
        let batch = self.begin_submit()?;
        let response = api.submit_attendance_batch(&batch).await;
        self.finish_submit(response)
    }
}

/// Checks a single-student mark: every field is required and `day` must name a
/// weekday.
pub fn validate_single_entry(entry: &SingleEntry) -> Result<()> {
    let fields = [
        ("student", &entry.student_id),
        ("subject", &entry.subject),
        ("day", &entry.day),
        ("time", &entry.time_slot),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(Error::validation(format!("{name} is required")));
    }
    if parse_weekday(&entry.day).is_none() {
        return Err(Error::validation(format!(
            "{:?} is not a weekday",
            entry.day
        )));
    }
    Ok(())
}

/// Validates and records a single student's mark.
#[instrument(skip(api))]
pub async fn mark_single<A: RecordsApi>(api: &A, entry: &SingleEntry) -> Result<()> {
    validate_single_entry(entry)?;
    api.submit_attendance_entry(entry).await?;
    info!(
        "Marked {} {} for {}",
        entry.student_id, entry.status, entry.subject
    );
    Ok(())
}
