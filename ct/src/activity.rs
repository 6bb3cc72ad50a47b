//! Side logs: the admin action trail and per-user activity history.
//!
//! Both are newest-first with a fixed retention cap: the most recent N
//! entries are kept and the oldest discarded. Neither log is authoritative
//! over issue state.

use chrono::Utc;

use crate::error::CtError;
use crate::state::AppState;
use crate::storage::{keys, load_doc, save_doc};
use crate::types::{ActivityEntry, ActivityKind, AdminAction, AdminActionKind};

/// Appends one admin-action entry and persists the capped log.
pub fn log_admin_action(
    state: &mut AppState,
    issue_id: &str,
    action: AdminActionKind,
    description: impl Into<String>,
) -> Result<(), CtError> {
    log_admin_batch(state, vec![(issue_id.to_string(), action, description.into())])
}

/// Appends several admin-action entries in one read-modify-write.
pub fn log_admin_batch(
    state: &mut AppState,
    entries: Vec<(String, AdminActionKind, String)>,
) -> Result<(), CtError> {
    if entries.is_empty() {
        return Ok(());
    }

    let (admin_id, admin_name) = match &state.session {
        Some(s) => (Some(s.id.clone()), Some(s.username.clone())),
        None => (None, None),
    };

    let mut log: Vec<AdminAction> = load_doc(state.storage(), keys::ADMIN_ACTIONS)?;
    for (issue_id, action, description) in entries {
        let id = state.next_record_id("admin_action")?;
        log.insert(
            0,
            AdminAction {
                id,
                admin_id: admin_id.clone(),
                admin_name: admin_name.clone(),
                issue_id,
                action,
                description,
                timestamp: Utc::now(),
            },
        );
    }
    log.truncate(state.config.admin_log_cap);
    save_doc(state.storage(), keys::ADMIN_ACTIONS, &log)?;
    Ok(())
}

/// Appends one entry to the user activity history and persists the capped
/// log. The entry is attributed to the current session when one exists.
pub fn log_activity(
    state: &mut AppState,
    action: ActivityKind,
    description: impl Into<String>,
) -> Result<(), CtError> {
    let id = state.next_record_id("activity")?;
    let user_id = state.session.as_ref().map(|s| s.id.clone());

    let mut log: Vec<ActivityEntry> = load_doc(state.storage(), keys::ACTIVITIES)?;
    log.insert(
        0,
        ActivityEntry {
            id,
            user_id,
            action,
            description: description.into(),
            timestamp: Utc::now(),
        },
    );
    log.truncate(state.config.activity_log_cap);
    save_doc(state.storage(), keys::ACTIVITIES, &log)?;
    Ok(())
}

/// The most recent admin actions, newest first.
pub fn recent_admin_actions(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<AdminAction>, CtError> {
    let mut log: Vec<AdminAction> = load_doc(state.storage(), keys::ADMIN_ACTIONS)?;
    if let Some(limit) = limit {
        log.truncate(limit);
    }
    Ok(log)
}

/// The current user's recent activity (all activity when no session),
/// newest first.
pub fn recent_activities(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<ActivityEntry>, CtError> {
    let mut log: Vec<ActivityEntry> = load_doc(state.storage(), keys::ACTIVITIES)?;
    if let Some(session) = &state.session {
        log.retain(|entry| entry.user_id.as_deref() == Some(session.id.as_str()));
    }
    if let Some(limit) = limit {
        log.truncate(limit);
    }
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::memory::MemoryStorage;

    fn small_cap_state() -> AppState {
        let config = AppConfig {
            admin_log_cap: 3,
            activity_log_cap: 2,
            ..AppConfig::default()
        };
        AppState::open(Box::new(MemoryStorage::new()), config).unwrap()
    }

    #[test]
    fn admin_log_keeps_most_recent_entries() {
        let mut state = small_cap_state();
        for i in 0..5 {
            log_admin_action(
                &mut state,
                "ct-1",
                AdminActionKind::StatusUpdate,
                format!("update {i}"),
            )
            .unwrap();
        }

        let log = recent_admin_actions(&state, None).unwrap();
        assert_eq!(log.len(), 3);
        // Newest first; the two oldest were discarded
        assert_eq!(log[0].description, "update 4");
        assert_eq!(log[2].description, "update 2");
    }

    #[test]
    fn activity_log_is_capped_and_newest_first() {
        let mut state = small_cap_state();
        for i in 0..4 {
            log_activity(&mut state, ActivityKind::ReportedIssue, format!("r{i}")).unwrap();
        }

        let log = recent_activities(&state, None).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].description, "r3");
    }

    #[test]
    fn admin_batch_is_one_write() {
        use crate::storage::keys;
        use std::sync::Arc;

        let storage = Arc::new(MemoryStorage::new());
        let mut state =
            AppState::open(Box::new(Arc::clone(&storage)), AppConfig::default()).unwrap();

        log_admin_batch(
            &mut state,
            vec![
                ("a".to_string(), AdminActionKind::Deleted, "x".to_string()),
                ("b".to_string(), AdminActionKind::Deleted, "y".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(storage.write_count(keys::ADMIN_ACTIONS), 1);
        assert_eq!(recent_admin_actions(&state, None).unwrap().len(), 2);
    }
}
