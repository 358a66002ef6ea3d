use actix_web::{http::header, HttpRequest, HttpResponse};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::handlers::fail;
use super::state::AppState;
use crate::models::{AuthTokens, User, UserType};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub gen: u64,
    pub exp: i64,
    pub iat: i64,
}

/// Mints an access token plus a fresh refresh token and records the session.
pub fn issue_tokens(state: &AppState, user: &User) -> Result<AuthTokens, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let ttl = state.settings.access_ttl.as_secs();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        user_type: user.user_type,
        gen: state.generation(),
        exp: now + ttl as i64,
        iat: now,
    };
    let access_token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )?;
    let refresh_token = Uuid::new_v4().to_string();
    state.store().sessions.insert(refresh_token.clone(), user.id);

    Ok(AuthTokens {
        access_token,
        refresh_token: Some(refresh_token),
        token_type: "bearer".to_string(),
        expires_in: Some(ttl),
    })
}

/// Resolves the bearer token to an active user, or the 401/403 to send back.
pub fn authenticate(req: &HttpRequest, state: &AppState) -> Result<User, HttpResponse> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| fail(401, "UNAUTHORIZED", "Missing bearer token"))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| fail(401, "INVALID_TOKEN", "Invalid or expired token"))?
    .claims;

    if claims.gen != state.generation() {
        return Err(fail(401, "INVALID_TOKEN", "Invalid or expired token"));
    }

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| fail(401, "INVALID_TOKEN", "Invalid or expired token"))?;
    let store = state.store();
    let stored = store
        .users
        .get(&user_id)
        .ok_or_else(|| fail(401, "INVALID_TOKEN", "User no longer exists"))?;
    if !stored.user.is_active {
        return Err(fail(403, "ACCOUNT_DISABLED", "Account is disabled"));
    }
    Ok(stored.user.clone())
}

pub fn require_admin(user: &User) -> Result<(), HttpResponse> {
    if user.user_type == UserType::Admin {
        Ok(())
    } else {
        Err(fail(403, "FORBIDDEN", "Admin access required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devserver::state::{DevSettings, StoredUser};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use std::sync::atomic::Ordering;

    fn state_with(user_type: UserType, is_active: bool) -> (AppState, User) {
        let state = AppState::new(DevSettings::default());
        let user = User {
            id: 1,
            email: "ivy@example.com".into(),
            name: "Ivy".into(),
            user_type,
            phone: None,
            location: None,
            bio: None,
            avatar_url: None,
            is_active,
            created_at: None,
        };
        state.store().users.insert(
            1,
            StoredUser {
                user: user.clone(),
                password_hash: String::new(),
            },
        );
        (state, user)
    }

    fn bearer(token: &str) -> HttpRequest {
        TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request()
    }

    #[test]
    fn issued_token_authenticates_until_generation_bump() {
        let (state, user) = state_with(UserType::Shelter, true);
        let tokens = issue_tokens(&state, &user).unwrap();
        let refresh = tokens.refresh_token.clone().unwrap();
        assert_eq!(state.store().sessions.get(&refresh), Some(&1));

        let req = bearer(&tokens.access_token);
        assert_eq!(authenticate(&req, &state).unwrap().id, 1);

        state.token_generation.fetch_add(1, Ordering::SeqCst);
        let resp = authenticate(&req, &state).unwrap_err();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_or_foreign_tokens_are_rejected() {
        let (state, _) = state_with(UserType::Adopter, true);
        let no_header = TestRequest::default().to_http_request();
        assert_eq!(
            authenticate(&no_header, &state).unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            authenticate(&bearer("a.b.c"), &state).unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn disabled_accounts_get_forbidden() {
        let (state, user) = state_with(UserType::Adopter, false);
        let tokens = issue_tokens(&state, &user).unwrap();
        let resp = authenticate(&bearer(&tokens.access_token), &state).unwrap_err();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(require_admin(&user).is_err());
    }
}
