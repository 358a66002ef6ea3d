use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use super::{created, fail, invalid, ok};
use crate::devserver::auth::{authenticate, issue_tokens};
use crate::devserver::state::{AppState, StoredUser};
use crate::models::{
    AuthResponseData, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    UpdateProfileRequest, User,
};

fn session_response(state: &AppState, user: User) -> Result<AuthResponseData, HttpResponse> {
    match issue_tokens(state, &user) {
        Ok(tokens) => Ok(AuthResponseData { user, tokens }),
        Err(err) => {
            warn!(error = %err, "failed to sign access token");
            Err(fail(500, "TOKEN_ERROR", "Failed to issue tokens"))
        }
    }
}

pub async fn register(
    data: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let req = data.into_inner();
    if let Err(err) = req.validate() {
        return invalid(err);
    }
    if state.store().user_by_email(&req.email).is_some() {
        return fail(409, "EMAIL_EXISTS", "User already exists");
    }

    let password_hash = match bcrypt::hash(&req.password, state.settings.bcrypt_cost) {
        Ok(hash) => hash,
        Err(_) => return fail(500, "HASH_ERROR", "Password hashing failed"),
    };

    let user = {
        let mut store = state.store();
        // another registration may have won while we were hashing
        if store.user_by_email(&req.email).is_some() {
            return fail(409, "EMAIL_EXISTS", "User already exists");
        }
        let id = store.next_id();
        let user = User {
            id,
            email: req.email.trim().to_string(),
            name: req.name,
            user_type: req.user_type,
            phone: req.phone,
            location: req.location,
            bio: None,
            avatar_url: None,
            is_active: true,
            created_at: Some(Utc::now()),
        };
        store.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        user
    };

    info!(user_id = user.id, "user registered");
    match session_response(&state, user) {
        Ok(data) => created(data),
        Err(resp) => resp,
    }
}

pub async fn login(data: web::Json<LoginRequest>, state: web::Data<AppState>) -> HttpResponse {
    let req = data.into_inner();
    let found = state
        .store()
        .user_by_email(&req.email)
        .map(|u| (u.user.clone(), u.password_hash.clone()));

    let Some((user, hash)) = found else {
        return fail(401, "INVALID_CREDENTIALS", "Invalid credentials");
    };
    if !bcrypt::verify(&req.password, &hash).unwrap_or(false) {
        return fail(401, "INVALID_CREDENTIALS", "Invalid credentials");
    }
    if !user.is_active {
        return fail(403, "ACCOUNT_DISABLED", "Account is disabled");
    }

    match session_response(&state, user) {
        Ok(data) => ok(data),
        Err(resp) => resp,
    }
}

/// Rotates the refresh token: the presented one stops working.
pub async fn refresh(data: web::Json<RefreshRequest>, state: web::Data<AppState>) -> HttpResponse {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if !state.settings.refresh_delay.is_zero() {
        tokio::time::sleep(state.settings.refresh_delay).await;
    }

    let user = {
        let mut store = state.store();
        let Some(user_id) = store.sessions.remove(&data.refresh_token) else {
            return fail(401, "INVALID_REFRESH_TOKEN", "Refresh token is invalid or revoked");
        };
        match store.users.get(&user_id) {
            Some(stored) if stored.user.is_active => stored.user.clone(),
            _ => return fail(401, "INVALID_REFRESH_TOKEN", "Refresh token is invalid or revoked"),
        }
    };

    match issue_tokens(&state, &user) {
        Ok(tokens) => ok(serde_json::json!({ "tokens": tokens })),
        Err(_) => fail(500, "TOKEN_ERROR", "Failed to issue tokens"),
    }
}

pub async fn logout(data: web::Json<RefreshRequest>, state: web::Data<AppState>) -> HttpResponse {
    state.store().sessions.remove(&data.refresh_token);
    ok(serde_json::Value::Null)
}

pub async fn get_profile(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match authenticate(&req, &state) {
        Ok(user) => ok(user),
        Err(resp) => resp,
    }
}

pub async fn update_profile(
    req: HttpRequest,
    data: web::Json<UpdateProfileRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let changes = data.into_inner();
    if matches!(&changes.name, Some(name) if name.trim().is_empty()) {
        return fail(400, "VALIDATION_ERROR", "name cannot be blank");
    }

    let mut store = state.store();
    let Some(stored) = store.users.get_mut(&user.id) else {
        return fail(404, "NOT_FOUND", "User not found");
    };
    let profile = &mut stored.user;
    if let Some(name) = changes.name {
        profile.name = name;
    }
    if changes.phone.is_some() {
        profile.phone = changes.phone;
    }
    if changes.location.is_some() {
        profile.location = changes.location;
    }
    if changes.bio.is_some() {
        profile.bio = changes.bio;
    }
    if changes.avatar_url.is_some() {
        profile.avatar_url = changes.avatar_url;
    }
    ok(profile.clone())
}

pub async fn change_password(
    req: HttpRequest,
    data: web::Json<ChangePasswordRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user = match authenticate(&req, &state) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let body = data.into_inner();
    if let Err(err) = body.validate() {
        return invalid(err);
    }

    let current_hash = match state.store().users.get(&user.id) {
        Some(stored) => stored.password_hash.clone(),
        None => return fail(404, "NOT_FOUND", "User not found"),
    };
    if !bcrypt::verify(&body.current_password, &current_hash).unwrap_or(false) {
        return fail(400, "INVALID_PASSWORD", "Current password is incorrect");
    }
    let new_hash = match bcrypt::hash(&body.new_password, state.settings.bcrypt_cost) {
        Ok(hash) => hash,
        Err(_) => return fail(500, "HASH_ERROR", "Password hashing failed"),
    };

    if let Some(stored) = state.store().users.get_mut(&user.id) {
        stored.password_hash = new_hash;
    }
    ok(serde_json::Value::Null)
}
