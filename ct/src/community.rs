//! Community feed: posts, likes, and comments.
//!
//! Same discipline as the issue store: load the full post collection,
//! mutate in memory, write it back whole. Post images live under their own
//! storage keys so the post document stays small.

use chrono::Utc;

use crate::activity::log_activity;
use crate::error::CtError;
use crate::query;
use crate::state::AppState;
use crate::storage::{keys, load_doc, save_doc, Storage};
use crate::types::{ActivityKind, CommunityPost, PostComment, User};

/// Creates a post at the front of the feed. Requires a session and at
/// least content or an image.
pub fn create_post(
    state: &mut AppState,
    content: &str,
    image_data: Option<String>,
    attach_location: bool,
) -> Result<CommunityPost, CtError> {
    let session = state.require_session()?.clone();
    let content = content.trim();
    if content.is_empty() && image_data.is_none() {
        return Err(CtError::EmptyPost);
    }

    let id = state.next_record_id("post")?;
    let image = match image_data {
        Some(data) => {
            let key = keys::post_image(&id);
            state
                .storage()
                .put(&key, &data)
                .map_err(|e| CtError::Storage(e.to_string()))?;
            Some(key)
        }
        None => None,
    };

    let post = CommunityPost {
        id,
        user_id: session.id.clone(),
        user_name: session.display_name(),
        user_role: session.role,
        content: content.to_string(),
        image,
        location: attach_location.then(|| format!("Near {}", state.viewer_location())),
        timestamp: Utc::now(),
        likes: 0,
        comments: Vec::new(),
    };

    let mut posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;
    posts.insert(0, post.clone());
    save_doc(state.storage(), keys::POSTS, &posts)?;
    log_activity(
        state,
        ActivityKind::CreatedPost,
        "Shared a post in community",
    )?;

    Ok(post)
}

/// Increments a post's like counter.
pub fn like_post(state: &mut AppState, post_id: &str) -> Result<CommunityPost, CtError> {
    state.require_session()?;

    let mut posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| CtError::PostNotFound(post_id.to_string()))?;
    post.likes += 1;
    let snapshot = post.clone();
    save_doc(state.storage(), keys::POSTS, &posts)?;
    Ok(snapshot)
}

/// Appends a comment under a post.
pub fn add_comment(
    state: &mut AppState,
    post_id: &str,
    content: &str,
) -> Result<PostComment, CtError> {
    let session = state.require_session()?.clone();
    let content = content.trim();
    if content.is_empty() {
        return Err(CtError::EmptyComment);
    }

    let comment = PostComment {
        id: state.next_record_id("comment")?,
        user_id: session.id.clone(),
        user_name: session.display_name(),
        content: content.to_string(),
        timestamp: Utc::now(),
    };

    let mut posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| CtError::PostNotFound(post_id.to_string()))?;
    post.comments.push(comment.clone());
    save_doc(state.storage(), keys::POSTS, &posts)?;
    Ok(comment)
}

/// Deletes a post. Only the author (or an admin) may; the post's image
/// blob goes with it.
pub fn delete_post(state: &mut AppState, post_id: &str) -> Result<(), CtError> {
    let session = state.require_session()?.clone();

    let mut posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;
    let post = posts
        .iter()
        .find(|p| p.id == post_id)
        .ok_or_else(|| CtError::PostNotFound(post_id.to_string()))?;
    if post.user_id != session.id && !session.is_admin() {
        return Err(CtError::NotPostAuthor);
    }

    if let Some(image_key) = post.image.clone() {
        state
            .storage()
            .delete(&image_key)
            .map_err(|e| CtError::Storage(e.to_string()))?;
    }
    posts.retain(|p| p.id != post_id);
    save_doc(state.storage(), keys::POSTS, &posts)?;
    Ok(())
}

/// The full feed, newest first.
pub fn list_posts(state: &AppState) -> Result<Vec<CommunityPost>, CtError> {
    Ok(load_doc(state.storage(), keys::POSTS)?)
}

/// Counters for the community page header.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommunityStats {
    pub members: usize,
    pub posts: usize,
    pub resolved_this_week: usize,
}

pub fn community_stats(state: &AppState) -> Result<CommunityStats, CtError> {
    let users: Vec<User> = load_doc(state.storage(), keys::USERS)?;
    let posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;
    Ok(CommunityStats {
        members: users.iter().filter(|u| u.is_active).count(),
        posts: posts.len(),
        resolved_this_week: query::resolved_within_days(&state.issues, 7, Utc::now()),
    })
}

/// One row of the top-contributors panel.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Contributor {
    pub user_id: String,
    pub name: String,
    pub issues: usize,
    pub posts: usize,
    pub score: usize,
}

/// Scores every user (issues count double) and returns the top five.
pub fn top_contributors(state: &AppState) -> Result<Vec<Contributor>, CtError> {
    let users: Vec<User> = load_doc(state.storage(), keys::USERS)?;
    let posts: Vec<CommunityPost> = load_doc(state.storage(), keys::POSTS)?;

    let mut contributors: Vec<Contributor> = users
        .iter()
        .map(|user| {
            let issues = state
                .issues
                .iter()
                .filter(|i| i.reporter_id.as_deref() == Some(user.id.as_str()))
                .count();
            let post_count = posts.iter().filter(|p| p.user_id == user.id).count();
            Contributor {
                user_id: user.id.clone(),
                name: if user.first_name.is_empty() {
                    user.username.clone()
                } else {
                    format!("{} {}", user.first_name, user.last_name)
                        .trim()
                        .to_string()
                },
                issues,
                posts: post_count,
                score: issues * 2 + post_count,
            }
        })
        .collect();

    contributors.sort_by(|a, b| b.score.cmp(&a.score));
    contributors.truncate(5);
    Ok(contributors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{self, NewUser};
    use crate::config::AppConfig;
    use crate::storage::memory::MemoryStorage;
    use crate::types::Role;

    fn logged_in_state(username: &str) -> AppState {
        let mut state =
            AppState::open(Box::new(MemoryStorage::new()), AppConfig::default()).unwrap();
        auth::signup(
            &mut state,
            NewUser {
                username: username.to_string(),
                password: "letmein99".to_string(),
                role: Role::Citizen,
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{username}@example.com"),
            },
        )
        .unwrap();
        state
    }

    #[test]
    fn posting_requires_a_session() {
        let mut state =
            AppState::open(Box::new(MemoryStorage::new()), AppConfig::default()).unwrap();
        assert!(matches!(
            create_post(&mut state, "hello", None, false),
            Err(CtError::NotLoggedIn)
        ));
    }

    #[test]
    fn post_like_comment_flow() {
        let mut state = logged_in_state("riya");
        let post = create_post(&mut state, "Streetlight fixed!", None, false).unwrap();

        let liked = like_post(&mut state, &post.id).unwrap();
        assert_eq!(liked.likes, 1);

        let comment = add_comment(&mut state, &post.id, "Great news").unwrap();
        assert_eq!(comment.content, "Great news");

        let posts = list_posts(&state).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].comments.len(), 1);
    }

    #[test]
    fn empty_posts_are_rejected() {
        let mut state = logged_in_state("riya");
        assert!(matches!(
            create_post(&mut state, "   ", None, false),
            Err(CtError::EmptyPost)
        ));
    }

    #[test]
    fn posts_are_newest_first() {
        let mut state = logged_in_state("riya");
        create_post(&mut state, "first", None, false).unwrap();
        create_post(&mut state, "second", None, false).unwrap();
        let posts = list_posts(&state).unwrap();
        assert_eq!(posts[0].content, "second");
    }

    #[test]
    fn only_the_author_can_delete() {
        let mut state = logged_in_state("riya");
        let post = create_post(&mut state, "mine", None, false).unwrap();

        auth::logout(&mut state).unwrap();
        auth::signup(
            &mut state,
            NewUser {
                username: "arjun".to_string(),
                password: "letmein99".to_string(),
                role: Role::Citizen,
                first_name: String::new(),
                last_name: String::new(),
                email: "arjun@example.com".to_string(),
            },
        )
        .unwrap();

        assert!(matches!(
            delete_post(&mut state, &post.id),
            Err(CtError::NotPostAuthor)
        ));

        auth::login(&mut state, "riya", "letmein99").unwrap();
        delete_post(&mut state, &post.id).unwrap();
        assert!(list_posts(&state).unwrap().is_empty());
    }

    #[test]
    fn deleting_a_post_removes_its_image_blob() {
        let mut state = logged_in_state("riya");
        let post = create_post(
            &mut state,
            "with photo",
            Some("data:image/png;base64,AAAA".to_string()),
            false,
        )
        .unwrap();
        let image_key = post.image.clone().unwrap();
        assert!(state.storage().get(&image_key).unwrap().is_some());

        delete_post(&mut state, &post.id).unwrap();
        assert!(state.storage().get(&image_key).unwrap().is_none());
    }

    #[test]
    fn contributors_are_scored_and_capped() {
        let mut state = logged_in_state("riya");
        create_post(&mut state, "p1", None, false).unwrap();
        create_post(&mut state, "p2", None, false).unwrap();

        let top = top_contributors(&state).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].posts, 2);
        assert_eq!(top[0].score, 2);
    }
}
