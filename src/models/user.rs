use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Adopter,
    Shelter,
    Individual,
    Admin,
}

impl UserType {
    /// Shelters and individuals may list pets.
    pub fn can_list_pets(self) -> bool {
        matches!(self, UserType::Shelter | UserType::Individual | UserType::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(rename = "type", alias = "user_type", default)]
    pub user_type: UserType,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponseData {
    pub user: User,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name is required".into()));
        }
        if self.user_type == UserType::Admin {
            return Err(ApiError::Validation(
                "admin accounts cannot be self-registered".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ApiError::Validation("password is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        validate_password(&self.new_password)?;
        if self.current_password == self.new_password {
            return Err(ApiError::Validation(
                "new password must differ from the current one".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::Validation(format!("'{}' is not an email address", email)));
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ApiError::Validation(format!("'{}' is not an email address", email)));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_uses_type_key() {
        let user: User = serde_json::from_str(
            r#"{"id":3,"email":"a@b.io","name":"Ann","type":"individual"}"#,
        )
        .unwrap();
        assert_eq!(user.user_type, UserType::Individual);
        assert!(user.is_active);

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], "individual");
    }

    #[test]
    fn register_validation() {
        let mut req = RegisterRequest {
            email: "cat.lover@example.com".into(),
            password: "whiskers123".into(),
            name: "Cat Lover".into(),
            user_type: UserType::Adopter,
            phone: None,
            location: None,
        };
        assert!(req.validate().is_ok());

        req.email = "cat.lover@example".into();
        assert!(req.validate().is_err());

        req.email = "cat.lover@example.com".into();
        req.password = "short".into();
        assert!(req.validate().is_err());

        req.password = "whiskers123".into();
        req.user_type = UserType::Admin;
        assert!(req.validate().is_err());
    }

    #[test]
    fn auth_tokens_default_fields() {
        let tokens: AuthTokens = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.refresh_token, None);
    }
}
