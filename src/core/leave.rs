//! Leave approval business logic.
//!
//! A leave request carries one decision field per approver (parent, HOD) and a final
//! status shown to the student. Either approver may act in any order. The final status
//! always mirrors the decision applied last, whichever actor made it; it is not the
//! conjunction of both fields. A parent approval followed by an HOD rejection reads
//! "rejected", and an HOD rejection followed by a parent approval reads "approved".

use crate::{
    collaborator::RecordsApi,
    errors::{Error, Result},
    models::{ApproverRole, LeaveApplication, LeaveRequest, LeaveScope, LeaveStatus},
};
use tracing::{info, instrument};

/// Writes `role`'s decision and mirrors it into the final status.
///
/// Re-applying overwrites the actor's earlier decision. The other actor's field is
/// neither read nor changed. `Pending` is not a decision.
pub fn apply_decision(
    leave: &mut LeaveRequest,
    role: ApproverRole,
    status: LeaveStatus,
) -> Result<()> {
    if status == LeaveStatus::Pending {
        return Err(Error::validation("a leave decision must approve or reject"));
    }

    match role {
        ApproverRole::Parent => leave.parent_status = status,
        ApproverRole::Hod => leave.hod_status = status,
    }
    leave.final_status = status;
    Ok(())
}

/// Requests still awaiting `role`'s decision, in input order.
#[must_use]
pub fn pending_for(role: ApproverRole, leaves: &[LeaveRequest]) -> Vec<&LeaveRequest> {
    leaves
        .iter()
        .filter(|l| l.status_for(role) == LeaveStatus::Pending)
        .collect()
}

/// Checks a student's leave application before it is filed.
pub fn validate_application(application: &LeaveApplication) -> Result<()> {
    if application.student_id.trim().is_empty() {
        return Err(Error::validation("leave application has no student"));
    }
    if application.reason.trim().is_empty() {
        return Err(Error::validation("leave reason cannot be empty"));
    }
    if application.to_date < application.from_date {
        return Err(Error::validation(format!(
            "leave ends ({}) before it starts ({})",
            application.to_date, application.from_date
        )));
    }
    Ok(())
}

/// Validates and files a leave application.
#[instrument(skip(api))]
pub async fn submit_application<A: RecordsApi>(
    api: &A,
    application: &LeaveApplication,
) -> Result<LeaveRequest> {
    validate_application(application)?;
    let leave = api.apply_leave(application).await?;
    info!("Leave {} filed for student {}", leave.id, leave.student_id);
    Ok(leave)
}

/// An approver's or student's list of leave requests.
#[derive(Debug, Clone, Default)]
pub struct LeaveBoard {
    leaves: Vec<LeaveRequest>,
}

impl LeaveBoard {
    /// Wraps an already fetched list.
    #[must_use]
    pub const fn new(leaves: Vec<LeaveRequest>) -> Self {
        Self { leaves }
    }

    /// Fetches the requests in `scope`.
    pub async fn load<A: RecordsApi>(api: &A, scope: &LeaveScope) -> Result<Self> {
        let leaves = api.fetch_leaves(scope).await?;
        Ok(Self::new(leaves))
    }

    /// All requests on the board.
    #[must_use]
    pub fn leaves(&self) -> &[LeaveRequest] {
        &self.leaves
    }

    /// Requests still awaiting `role`.
    #[must_use]
    pub fn pending_for(&self, role: ApproverRole) -> Vec<&LeaveRequest> {
        pending_for(role, &self.leaves)
    }

    /// Sends `role`'s decision and, once the collaborator accepts it, updates the
    /// local copy the same way the server does.
    #[instrument(skip(self, api))]
    pub async fn decide<A: RecordsApi>(
        &mut self,
        api: &A,
        id: &str,
        role: ApproverRole,
        status: LeaveStatus,
    ) -> Result<&LeaveRequest> {
        if status == LeaveStatus::Pending {
            return Err(Error::validation("a leave decision must approve or reject"));
        }
        let position = self
            .leaves
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::validation(format!("leave {id} is not on this board")))?;

        api.decide_leave(id, role, status).await?;

        let leave = &mut self.leaves[position];
        apply_decision(leave, role, status)?;
        info!("Leave {} marked {} by {}", id, status, role);
        Ok(leave)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parent_then_hod_final_is_hod() {
        let mut leave = pending_leave("l1", "s1");
        apply_decision(&mut leave, ApproverRole::Parent, LeaveStatus::Approved).unwrap();
        apply_decision(&mut leave, ApproverRole::Hod, LeaveStatus::Rejected).unwrap();
        assert_eq!(leave.parent_status, LeaveStatus::Approved);
        assert_eq!(leave.hod_status, LeaveStatus::Rejected);
        assert_eq!(leave.final_status, LeaveStatus::Rejected);
    }

    #[test]
    fn test_parent_only_final_is_parent() {
        let mut leave = pending_leave("l1", "s1");
        apply_decision(&mut leave, ApproverRole::Parent, LeaveStatus::Rejected).unwrap();
        assert_eq!(leave.final_status, LeaveStatus::Rejected);
        assert_eq!(leave.hod_status, LeaveStatus::Pending);
    }

    #[test]
    fn test_late_parent_decision_overrides_hod() {
        let mut leave = pending_leave("l1", "s1");
        apply_decision(&mut leave, ApproverRole::Hod, LeaveStatus::Rejected).unwrap();
        apply_decision(&mut leave, ApproverRole::Parent, LeaveStatus::Approved).unwrap();
        assert_eq!(leave.final_status, LeaveStatus::Approved);
    }

    #[test]
    fn test_reapplying_overwrites_same_actor() {
        let mut leave = pending_leave("l1", "s1");
        apply_decision(&mut leave, ApproverRole::Hod, LeaveStatus::Approved).unwrap();
        apply_decision(&mut leave, ApproverRole::Hod, LeaveStatus::Rejected).unwrap();
        assert_eq!(leave.hod_status, LeaveStatus::Rejected);
        assert_eq!(leave.final_status, LeaveStatus::Rejected);
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        let mut leave = pending_leave("l1", "s1");
        let result = apply_decision(&mut leave, ApproverRole::Parent, LeaveStatus::Pending);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_pending_queues_per_role() {
        let mut decided = pending_leave("l2", "s1");
        apply_decision(&mut decided, ApproverRole::Parent, LeaveStatus::Approved).unwrap();
        let leaves = vec![pending_leave("l1", "s1"), decided];

        let parent_queue = pending_for(ApproverRole::Parent, &leaves);
        assert_eq!(parent_queue.len(), 1);
        assert_eq!(parent_queue[0].id, "l1");
        assert_eq!(pending_for(ApproverRole::Hod, &leaves).len(), 2);
    }

    #[test]
    fn test_validate_application() {
        let date = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let mut application = LeaveApplication {
            student_id: "s1".to_string(),
            from_date: date(4),
            to_date: date(6),
            reason: "Family function".to_string(),
        };
        assert!(validate_application(&application).is_ok());

        application.reason = "  ".to_string();
        assert!(validate_application(&application).is_err());

        application.reason = "Fever".to_string();
        application.to_date = date(3);
        assert!(matches!(
            validate_application(&application),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_board_decision_updates_local_copy() -> Result<()> {
        let api = sample_feed();
        let mut board = LeaveBoard::load(&api, &LeaveScope::Approver(ApproverRole::Parent)).await?;
        assert_eq!(board.pending_for(ApproverRole::Parent).len(), 1);

        let leave = board
            .decide(&api, "leave-1", ApproverRole::Parent, LeaveStatus::Approved)
            .await?;
        assert_eq!(leave.final_status, LeaveStatus::Approved);
        assert!(board.pending_for(ApproverRole::Parent).is_empty());

        let stored = api.fetch_leaves(&LeaveScope::Student("s1".to_string())).await?;
        assert_eq!(stored[0].parent_status, LeaveStatus::Approved);
        Ok(())
    }

    #[tokio::test]
    async fn test_board_keeps_copy_when_collaborator_fails() -> Result<()> {
        let api = sample_feed();
        let mut board = LeaveBoard::load(&api, &LeaveScope::Approver(ApproverRole::Hod)).await?;
        api.fail_next("HTTP 503").await;

        let result = board
            .decide(&api, "leave-1", ApproverRole::Hod, LeaveStatus::Approved)
            .await;
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(board.leaves()[0].hod_status, LeaveStatus::Pending);
        assert_eq!(board.leaves()[0].final_status, LeaveStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_application_files_pending_leave() -> Result<()> {
        let api = sample_feed();
        let application = LeaveApplication {
            student_id: "s2".to_string(),
            from_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            reason: "Medical appointment".to_string(),
        };
        let leave = submit_application(&api, &application).await?;
        assert_eq!(leave.student_id, "s2");
        assert_eq!(leave.final_status, LeaveStatus::Pending);

        let mine = api.fetch_leaves(&LeaveScope::Student("s2".to_string())).await?;
        assert_eq!(mine.len(), 1);
        Ok(())
    }
}
