use tracing::{info, warn};

use crate::error::Result;
use crate::http::{ApiClient, ApiRequest, SessionEvent};
use crate::models::{
    AuthResponseData, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    UpdateProfileRequest, User,
};

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponseData> {
        request.validate()?;
        let data: AuthResponseData = self
            .client
            .execute(ApiRequest::post("/auth/register").json(request)?.public())
            .await?;
        self.persist_session(&data).await?;
        info!(user_id = data.user.id, "registered");
        Ok(data)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponseData> {
        request.validate()?;
        let data: AuthResponseData = self
            .client
            .execute(ApiRequest::post("/auth/login").json(request)?.public())
            .await?;
        self.persist_session(&data).await?;
        info!(user_id = data.user.id, "logged in");
        Ok(data)
    }

    /// Tells the server to drop the refresh token, then forgets the session
    /// locally whatever the server said.
    pub async fn logout(&self) -> Result<()> {
        let storage = self.client.storage();
        if let Some(refresh_token) = storage.get_refresh_token().await? {
            let request = ApiRequest::post("/auth/logout")
                .json(&RefreshRequest { refresh_token })?
                .public();
            if let Err(err) = self.client.execute_unit(request).await {
                warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }
        storage.clear_all().await?;
        self.client.emit(SessionEvent::LoggedOut);
        info!("logged out");
        Ok(())
    }

    pub async fn profile(&self) -> Result<User> {
        let user: User = self.client.get("/auth/profile").await?;
        self.client.storage().save_user(&user).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User> {
        let user: User = self.client.put("/auth/profile", request).await?;
        self.client.storage().save_user(&user).await?;
        Ok(user)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        request.validate()?;
        self.client
            .execute_unit(ApiRequest::put("/auth/password").json(request)?)
            .await
    }

    /// The user cached at login, without a network call.
    pub async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.client.storage().get_user().await?)
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.client.storage().is_authenticated().await?)
    }

    async fn persist_session(&self, data: &AuthResponseData) -> Result<()> {
        let storage = self.client.storage();
        let refresh = data.tokens.refresh_token.as_deref().unwrap_or_default();
        storage.save_tokens(&data.tokens.access_token, refresh).await?;
        storage.save_user(&data.user).await?;
        self.client.emit(SessionEvent::LoggedIn {
            user_id: data.user.id,
        });
        Ok(())
    }
}
