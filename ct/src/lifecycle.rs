//! Lifecycle mutator: every discrete state change an issue can undergo.
//!
//! Each operation targets exactly one issue by id, applies the change in
//! memory, then writes the full issue collection back. A missing id is a
//! typed `IssueNotFound` error, never a silent no-op. Bulk operations apply
//! the whole batch to the in-memory copy and persist once.

use chrono::{NaiveDate, Utc};
use std::str::FromStr;

use crate::activity::{log_activity, log_admin_action, log_admin_batch};
use crate::error::CtError;
use crate::state::AppState;
use crate::types::{
    ActivityKind, AdminActionKind, Contact, ImageBlob, Issue, Site, SiteDetail, Status, Urgency,
};

/// Fields of a new report, before ids and timestamps are assigned.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: Site,
    pub specific_location: Option<SiteDetail>,
    pub urgency: Urgency,
    pub anonymous: bool,
    pub first_observed: Option<NaiveDate>,
    pub recurring: Option<String>,
    pub safety_hazard: bool,
    pub images: Vec<ImageBlob>,
    pub video_url: Option<String>,
    pub contact: Option<Contact>,
}

/// Creates a new issue at the front of the store.
///
/// Anonymous reports (and reports filed without a session, which have no
/// owning-user reference to tie contact details to) never carry contact
/// info. Validation failure aborts with no state change.
pub fn create(state: &mut AppState, new: NewIssue) -> Result<Issue, CtError> {
    let now = Utc::now();

    let session = state.session.clone();
    let reporter_id = if new.anonymous {
        None
    } else {
        session.as_ref().map(|s| s.id.clone())
    };
    let reporter = if new.anonymous {
        "Anonymous".to_string()
    } else {
        new.contact
            .as_ref()
            .map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| session.as_ref().map(|s| s.username.clone()))
            .unwrap_or_else(|| "User".to_string())
    };
    let contact = if reporter_id.is_some() { new.contact } else { None };

    let mut issue = Issue {
        id: String::new(),
        title: new.title,
        description: new.description,
        category: new.category,
        location: new.location,
        specific_location: new.specific_location,
        status: Status::Reported,
        urgency: new.urgency,
        upvotes: 0,
        flags: 0,
        reporter,
        reporter_id,
        date: now,
        resolved_date: None,
        first_observed: new.first_observed,
        recurring: new.recurring,
        safety_hazard: new.safety_hazard,
        images: new.images,
        video_url: new.video_url,
        contact,
    };
    // Validate before anything is written, so a rejected report leaves no trace
    issue.validate().map_err(CtError::InvalidIssue)?;
    issue.id = state.next_issue_id(&issue.title, &now)?;

    state.issues.insert(0, issue.clone());
    state.persist_issues()?;
    log_activity(
        state,
        ActivityKind::ReportedIssue,
        format!("Reported: {}", issue.title),
    )?;

    Ok(issue)
}

/// Record of one status transition, for display.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub issue_id: String,
    pub old: Status,
    pub new: Status,
}

/// Sets an issue's status. Entering Resolved stamps `resolved_date`;
/// leaving it does not clear the stamp.
pub fn update_status(
    state: &mut AppState,
    id: &str,
    new_status: Status,
    note: Option<&str>,
) -> Result<StatusChange, CtError> {
    let issue = state
        .find_issue_mut(id)
        .ok_or_else(|| CtError::IssueNotFound(id.to_string()))?;

    let old = issue.status;
    issue.status = new_status;
    if new_status == Status::Resolved && old != Status::Resolved {
        issue.resolved_date = Some(Utc::now());
    }
    state.persist_issues()?;

    let mut description = format!("Status changed from {old} to {new_status}");
    if let Some(note) = note.filter(|n| !n.is_empty()) {
        description.push_str(": ");
        description.push_str(note);
    }
    log_admin_action(state, id, AdminActionKind::StatusUpdate, description)?;

    Ok(StatusChange {
        issue_id: id.to_string(),
        old,
        new: new_status,
    })
}

/// Urgency the upvote ladder calls for at a given count, if any.
pub fn ladder(upvotes: u32) -> Option<Urgency> {
    if upvotes >= 20 {
        Some(Urgency::Critical)
    } else if upvotes >= 10 {
        Some(Urgency::High)
    } else if upvotes >= 5 {
        Some(Urgency::Medium)
    } else {
        None
    }
}

/// Increments an issue's upvote counter and applies the urgency ladder.
/// The ladder only ever raises urgency; it never lowers a level that was
/// set higher by another operation.
pub fn upvote(state: &mut AppState, id: &str) -> Result<Issue, CtError> {
    let issue = state
        .find_issue_mut(id)
        .ok_or_else(|| CtError::IssueNotFound(id.to_string()))?;

    issue.upvotes += 1;
    if let Some(target) = ladder(issue.upvotes) {
        if target > issue.urgency {
            issue.urgency = target;
        }
    }
    let snapshot = issue.clone();
    state.persist_issues()?;
    log_activity(
        state,
        ActivityKind::UpvotedIssue,
        format!("Upvoted issue: {}", snapshot.title),
    )?;

    Ok(snapshot)
}

/// Increments an issue's flag counter. No threshold consequence follows.
pub fn flag(state: &mut AppState, id: &str) -> Result<Issue, CtError> {
    let issue = state
        .find_issue_mut(id)
        .ok_or_else(|| CtError::IssueNotFound(id.to_string()))?;

    issue.flags += 1;
    let snapshot = issue.clone();
    state.persist_issues()?;

    let is_admin = state.session.as_ref().is_some_and(|s| s.is_admin());
    if is_admin {
        log_admin_action(state, id, AdminActionKind::Flagged, "Issue flagged for review")?;
    } else {
        log_activity(
            state,
            ActivityKind::FlaggedIssue,
            format!("Flagged issue: {}", snapshot.title),
        )?;
    }

    Ok(snapshot)
}

/// Admin override of an issue's urgency; may set any level, including one
/// below what the ladder would pick.
pub fn set_urgency(state: &mut AppState, id: &str, urgency: Urgency) -> Result<Issue, CtError> {
    let issue = state
        .find_issue_mut(id)
        .ok_or_else(|| CtError::IssueNotFound(id.to_string()))?;

    issue.urgency = urgency;
    let snapshot = issue.clone();
    state.persist_issues()?;
    log_admin_action(
        state,
        id,
        AdminActionKind::UrgencyUpdate,
        format!("Urgency set to {urgency}"),
    )?;

    Ok(snapshot)
}

/// Permanently removes an issue. Deleting an id that is already gone
/// reports `IssueNotFound` and leaves the store unchanged.
pub fn delete(state: &mut AppState, id: &str) -> Result<(), CtError> {
    let position = state
        .issues
        .iter()
        .position(|issue| issue.id == id)
        .ok_or_else(|| CtError::IssueNotFound(id.to_string()))?;

    state.issues.remove(position);
    state.persist_issues()?;
    log_admin_action(state, id, AdminActionKind::Deleted, "Issue permanently deleted")?;
    Ok(())
}

/// Operations a bulk batch can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkInProgress,
    MarkResolved,
    Delete,
}

impl FromStr for BulkAction {
    type Err = CtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "in progress" | "mark in progress" => Ok(BulkAction::MarkInProgress),
            "resolved" | "mark resolved" => Ok(BulkAction::MarkResolved),
            "delete" => Ok(BulkAction::Delete),
            _ => Err(CtError::InvalidStatus(s.to_string())),
        }
    }
}

/// Per-id result of a bulk batch.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub applied: Vec<String>,
    pub missing: Vec<String>,
}

/// Applies one action across a set of ids as a unit: all mutations land on
/// the in-memory copy, the issue collection is persisted once, and the
/// admin trail records one entry per touched issue in a single write.
pub fn bulk(state: &mut AppState, ids: &[String], action: BulkAction) -> Result<BulkOutcome, CtError> {
    let mut outcome = BulkOutcome::default();
    let mut trail: Vec<(String, AdminActionKind, String)> = Vec::new();
    let now = Utc::now();

    for id in ids {
        let Some(issue) = state.find_issue_mut(id) else {
            outcome.missing.push(id.clone());
            continue;
        };
        match action {
            BulkAction::MarkInProgress => {
                issue.status = Status::InProgress;
                trail.push((
                    id.clone(),
                    AdminActionKind::StatusUpdate,
                    "Marked as In Progress".to_string(),
                ));
            }
            BulkAction::MarkResolved => {
                if issue.status != Status::Resolved {
                    issue.resolved_date = Some(now);
                }
                issue.status = Status::Resolved;
                trail.push((
                    id.clone(),
                    AdminActionKind::StatusUpdate,
                    "Marked as Resolved".to_string(),
                ));
            }
            BulkAction::Delete => {
                trail.push((
                    id.clone(),
                    AdminActionKind::Deleted,
                    "Issue deleted".to_string(),
                ));
            }
        }
        outcome.applied.push(id.clone());
    }

    if action == BulkAction::Delete {
        let doomed: Vec<&String> = outcome.applied.iter().collect();
        state
            .issues
            .retain(|issue| !doomed.iter().any(|id| **id == issue.id));
    }

    if !outcome.applied.is_empty() {
        state.persist_issues()?;
        log_admin_batch(state, trail)?;
    }

    Ok(outcome)
}
