use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::refresh::{RefreshFailure, RefreshGate, Ticket};
use super::request::{ApiRequest, Body};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::models::{AuthTokens, RefreshRequest};
use crate::storage::{KeyValueStore, StorageService};
use crate::token;

pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: i64 },
    TokensRefreshed,
    LoggedOut,
    /// Refresh failed and local auth state was wiped; send the user to login.
    Expired { reason: String },
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: ClientConfig,
    storage: StorageService,
    gate: RefreshGate,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshPayload {
    Nested { tokens: AuthTokens },
    Flat(AuthTokens),
}

impl ApiClient {
    pub fn new(config: ClientConfig, storage: StorageService) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let (events, _) = broadcast::channel(32);
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                storage,
                gate: RefreshGate::new(),
                events,
            }),
        })
    }

    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let storage = StorageService::new(store, config.storage_keys.clone());
        Self::new(config, storage)
    }

    pub fn in_memory(config: ClientConfig) -> Result<Self> {
        let storage = StorageService::in_memory(config.storage_keys.clone());
        Self::new(config, storage)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_refreshing()
    }

    pub async fn access_token_expiry(&self) -> Result<Option<DateTime<Utc>>> {
        let access = self.inner.storage.get_access_token().await?;
        Ok(access.as_deref().and_then(token::expires_at))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute_unit(ApiRequest::delete(path)).await
    }

    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(&request).await?;
        decode_response(response).await
    }

    /// For endpoints whose body the caller does not need.
    pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        let response = self.send(&request).await?;
        ensure_success(response).await.map(|_| ())
    }

    /// Sends `request` with the stored bearer token. A 401 on a protected
    /// request is recovered at most once; whatever the replay returns goes
    /// back to the caller as is.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let sent_with = self.inner.storage.get_access_token().await?;
        let response = self.dispatch(request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.public {
            return Ok(response);
        }

        debug!(method = %request.method, path = %request.path, "got 401, recovering token");
        let Some(fresh) = self.recover_token(sent_with.as_deref()).await? else {
            return Ok(response);
        };

        let replay = self.dispatch(request, Some(&fresh)).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            warn!(method = %request.method, path = %request.path, "still unauthorized after refresh");
        }
        Ok(replay)
    }

    async fn recover_token(&self, sent_with: Option<&str>) -> Result<Option<String>> {
        let lease = loop {
            match self.inner.gate.enter() {
                Ticket::Leader(lease) => break lease,
                Ticket::Waiter(rx) => {
                    debug!("refresh already in flight, queued");
                    match rx.await {
                        Ok(Ok(token)) => return Ok(token),
                        Ok(Err(RefreshFailure(reason))) => {
                            return Err(ApiError::SessionExpired { reason })
                        }
                        // leader was cancelled before it settled
                        Err(_) => debug!("refresh leader went away, entering again"),
                    }
                }
            }
        };

        // Another caller may have rotated the token after this request left.
        let current = self.inner.storage.get_access_token().await?;
        if let Some(current) = &current {
            if sent_with != Some(current.as_str()) {
                debug!("access token already rotated, replaying");
                lease.settle(Ok(Some(current.clone())));
                return Ok(Some(current.clone()));
            }
        }

        let Some(refresh_token) = self.inner.storage.get_refresh_token().await? else {
            if sent_with.is_none() {
                lease.settle(Ok(None));
                return Ok(None);
            }
            if current.is_none() {
                // a late 401 from before the session was cleared
                let reason = "session already cleared".to_string();
                lease.settle(Err(RefreshFailure::new(reason.clone())));
                return Err(ApiError::SessionExpired { reason });
            }
            let reason = "no refresh token stored".to_string();
            self.expire_session(&reason).await;
            lease.settle(Err(RefreshFailure::new(reason.clone())));
            return Err(ApiError::SessionExpired { reason });
        };

        match self.refresh_with(&refresh_token).await {
            Ok(access) => {
                info!("access token refreshed");
                let woken = lease.settle(Ok(Some(access.clone())));
                debug!(woken, "released queued requests");
                self.emit(SessionEvent::TokensRefreshed);
                Ok(Some(access))
            }
            Err(err) => {
                let reason = err.to_string();
                self.expire_session(&reason).await;
                lease.settle(Err(RefreshFailure::new(reason.clone())));
                Err(ApiError::SessionExpired { reason })
            }
        }
    }

    async fn expire_session(&self, reason: &str) {
        warn!(reason, "session expired, clearing stored credentials");
        if let Err(err) = self.inner.storage.clear_all().await {
            warn!(error = %err, "failed to clear stored credentials");
        }
        self.emit(SessionEvent::Expired {
            reason: reason.to_string(),
        });
    }

    /// Calls the refresh endpoint directly and persists the new pair. A
    /// response without a refresh token keeps the current one.
    async fn refresh_with(&self, refresh_token: &str) -> Result<String> {
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })?
            .public();
        let response = self.dispatch(&request, None).await?;
        let tokens = match decode_response::<RefreshPayload>(response).await? {
            RefreshPayload::Nested { tokens } | RefreshPayload::Flat(tokens) => tokens,
        };
        let storage = &self.inner.storage;
        match tokens.refresh_token.as_deref() {
            Some(next_refresh) => storage.save_tokens(&tokens.access_token, next_refresh).await?,
            None => storage.save_access_token(&tokens.access_token).await?,
        }
        Ok(tokens.access_token)
    }

    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Response> {
        let url = self.inner.config.url(&request.path);
        let mut builder = self.inner.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(body) => builder.multipart(body.to_form()?),
        };

        debug!(method = %request.method, path = %request.path, authenticated = bearer.is_some(), "sending request");
        let response = builder.send().await?;
        debug!(method = %request.method, path = %request.path, status = response.status().as_u16(), "response received");
        Ok(response)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_body(
        status.as_u16(),
        status.canonical_reason(),
        &body,
    ))
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    decode_payload(&bytes)
}

/// Accepts both bare bodies and `{"data": ...}` envelopes.
pub(crate) fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes)?
    };
    let inner = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pet;

    #[test]
    fn envelope_and_bare_bodies_decode() {
        let wrapped: Pet = decode_payload(
            br#"{"success":true,"data":{"id":1,"name":"Tofu","owner_id":4}}"#,
        )
        .unwrap();
        let bare: Pet = decode_payload(br#"{"id":1,"name":"Tofu","owner_id":4}"#).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn empty_body_decodes_as_unit_or_option() {
        decode_payload::<()>(b"").unwrap();
        let none: Option<Pet> = decode_payload(b"  ").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn refresh_payload_shapes() {
        let nested: RefreshPayload =
            serde_json::from_str(r#"{"tokens":{"access_token":"a","refresh_token":"r"}}"#).unwrap();
        assert!(matches!(nested, RefreshPayload::Nested { .. }));
        let flat: RefreshPayload = serde_json::from_str(r#"{"access_token":"a"}"#).unwrap();
        assert!(matches!(flat, RefreshPayload::Flat(_)));
    }

    #[test]
    fn mismatched_body_is_decode_error() {
        let err = decode_payload::<Pet>(br#"{"data":{"id":"x"}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
