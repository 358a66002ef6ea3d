//! In-process stand-in for the OnlyCats backend.
//!
//! Serves the same routes and response envelope as the production API from
//! memory, so the client can be exercised end to end without a database.

pub mod auth;
pub mod handlers;
pub mod state;

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::Ordering;

use actix_cors::Cors;
use actix_web::dev::ServerHandle;
use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

pub use state::{AppState, DevSettings, StoredUser};

use crate::models::{User, UserType};

pub struct DevServer {
    addr: SocketAddr,
    state: web::Data<AppState>,
    handle: ServerHandle,
    task: JoinHandle<io::Result<()>>,
}

impl DevServer {
    /// Binds and starts serving in the background. Use port 0 for an
    /// ephemeral port and read it back with [`DevServer::base_url`].
    pub async fn start(settings: DevSettings, addr: impl ToSocketAddrs) -> io::Result<Self> {
        let workers = settings.workers.max(1);
        let state = web::Data::new(AppState::new(settings));
        let app_state = state.clone();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(NormalizePath::trim())
                .wrap(Cors::permissive())
                .app_data(app_state.clone())
                .configure(handlers::routes)
        })
        .workers(workers)
        .disable_signals()
        .bind(addr)?;

        let addr = server.addrs().first().copied().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "server bound no address")
        })?;
        let server = server.run();
        let handle = server.handle();
        let task = tokio::spawn(server);

        info!(%addr, "dev server listening");
        Ok(Self {
            addr,
            state,
            handle,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn refresh_calls(&self) -> u64 {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Every access token issued so far stops validating. Refresh tokens keep
    /// working.
    pub fn expire_access_tokens(&self) {
        self.state.token_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Forgets every refresh token, so the next refresh attempt fails.
    pub fn revoke_sessions(&self) {
        self.state.store().sessions.clear();
    }

    /// Admins cannot sign up through the API; this inserts one directly.
    pub fn seed_admin(&self, email: &str, password: &str, name: &str) -> Result<User, bcrypt::BcryptError> {
        let password_hash = bcrypt::hash(password, self.state.settings.bcrypt_cost)?;
        let mut store = self.state.store();
        let id = store.next_id();
        let user = User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            user_type: UserType::Admin,
            phone: None,
            location: None,
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
        Ok(user)
    }

    /// Runs until the server exits on its own.
    pub async fn wait(self) -> io::Result<()> {
        self.task
            .await
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
        let _ = self.task.await;
    }
}
