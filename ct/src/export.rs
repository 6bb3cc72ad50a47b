//! JSON export of issues and per-user data bundles.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::activity::{log_activity, recent_activities};
use crate::state::AppState;
use crate::types::{ActivityEntry, ActivityKind, Issue, Session};

/// Writes one issue as pretty-printed JSON and returns the path.
pub fn export_issue(issue: &Issue, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!(
        "issue_{}_{}.json",
        issue.id,
        Utc::now().format("%Y%m%d%H%M%S")
    ));
    write_json(&path, issue)?;
    Ok(path)
}

/// Everything a user can take with them.
#[derive(Debug, Serialize)]
pub struct UserExport {
    pub user_profile: Session,
    pub reported_issues: Vec<Issue>,
    pub activity_history: Vec<ActivityEntry>,
    pub export_date: DateTime<Utc>,
}

/// Writes the logged-in user's profile, reports, and activity history as
/// one JSON bundle and returns the path.
pub fn export_user_data(state: &mut AppState, dir: &Path) -> Result<PathBuf> {
    let session = state.require_session()?.clone();

    let reported_issues: Vec<Issue> = state
        .issues
        .iter()
        .filter(|i| i.reporter_id.as_deref() == Some(session.id.as_str()))
        .cloned()
        .collect();
    let activity_history = recent_activities(state, None)?;

    let bundle = UserExport {
        user_profile: session.clone(),
        reported_issues,
        activity_history,
        export_date: Utc::now(),
    };

    let path = dir.join(format!(
        "civictrack_data_{}_{}.json",
        session.username,
        Utc::now().format("%Y%m%d%H%M%S")
    ));
    write_json(&path, &bundle)?;

    log_activity(
        state,
        ActivityKind::DownloadedData,
        "Downloaded personal data export",
    )?;
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write export to {path:?}"))
}
