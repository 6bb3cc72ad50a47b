//! Local account handling: plaintext-credential matching against a stored
//! user list. This is demo glue, not an authentication system; there is no
//! hashing and no security model.

use chrono::Utc;

use crate::activity::log_activity;
use crate::error::CtError;
use crate::state::AppState;
use crate::storage::{keys, load_doc, save_doc};
use crate::types::{ActivityKind, Role, Session, User};

/// Fields of a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Creates an account and logs it in.
pub fn signup(state: &mut AppState, new: NewUser) -> Result<Session, CtError> {
    if new.username.trim().is_empty() || new.password.is_empty() {
        return Err(CtError::InvalidCredentials);
    }
    if !new.email.is_empty() && !valid_email(&new.email) {
        return Err(CtError::InvalidEmail(new.email));
    }

    let mut users: Vec<User> = load_doc(state.storage(), keys::USERS)?;
    if users.iter().any(|u| u.username == new.username) {
        return Err(CtError::UsernameTaken(new.username));
    }
    if !new.email.is_empty() && users.iter().any(|u| u.email == new.email) {
        return Err(CtError::EmailTaken(new.email));
    }

    let user = User {
        id: state.next_record_id("user")?,
        username: new.username,
        password: new.password,
        role: new.role,
        first_name: new.first_name,
        last_name: new.last_name,
        email: new.email,
        join_date: Utc::now(),
        is_active: true,
    };
    users.push(user.clone());
    save_doc(state.storage(), keys::USERS, &users)?;

    let session = Session::from(&user);
    state.set_session(Some(session.clone()))?;
    Ok(session)
}

/// Matches username and password verbatim against the stored list. A miss
/// is `InvalidCredentials`; no account is created implicitly.
pub fn login(state: &mut AppState, username: &str, password: &str) -> Result<Session, CtError> {
    let users: Vec<User> = load_doc(state.storage(), keys::USERS)?;
    let user = users
        .iter()
        .find(|u| u.username == username && u.password == password)
        .ok_or(CtError::InvalidCredentials)?;

    let session = Session::from(user);
    state.set_session(Some(session.clone()))?;
    Ok(session)
}

/// Clears the current session.
pub fn logout(state: &mut AppState) -> Result<(), CtError> {
    state.set_session(None)
}

/// Editable profile fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Updates the logged-in user's profile in the user list and the session.
pub fn update_profile(state: &mut AppState, update: ProfileUpdate) -> Result<Session, CtError> {
    let session = state.require_session()?.clone();

    if let Some(email) = &update.email {
        if !valid_email(email) {
            return Err(CtError::InvalidEmail(email.clone()));
        }
    }

    let mut users: Vec<User> = load_doc(state.storage(), keys::USERS)?;
    if let Some(email) = &update.email {
        if users.iter().any(|u| u.email == *email && u.id != session.id) {
            return Err(CtError::EmailTaken(email.clone()));
        }
    }

    let user = users
        .iter_mut()
        .find(|u| u.id == session.id)
        .ok_or_else(|| CtError::UserNotFound(session.username.clone()))?;
    if let Some(first_name) = update.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = update.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    let refreshed = Session::from(&*user);
    save_doc(state.storage(), keys::USERS, &users)?;

    state.set_session(Some(refreshed.clone()))?;
    log_activity(
        state,
        ActivityKind::UpdatedProfile,
        "Profile information updated",
    )?;
    Ok(refreshed)
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && !domain.contains(char::is_whitespace)
}
