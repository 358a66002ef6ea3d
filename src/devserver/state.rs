use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

use crate::models::{Favorite, Inquiry, Notification, Pet, User};

#[derive(Debug, Clone)]
pub struct DevSettings {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    /// Artificial latency on `/auth/refresh`, so tests can pile requests up
    /// behind an in-flight refresh.
    pub refresh_delay: Duration,
    pub bcrypt_cost: u32,
    pub workers: usize,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "onlycats-dev-secret".to_string(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_delay: Duration::ZERO,
            bcrypt_cost: 4,
            workers: 2,
        }
    }
}

impl DevSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(secret) = std::env::var("DEV_JWT_SECRET") {
            settings.jwt_secret = secret;
        }
        if let Some(secs) = env_u64("DEV_ACCESS_TTL_SECS") {
            settings.access_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = env_u64("DEV_REFRESH_DELAY_MS") {
            settings.refresh_delay = Duration::from_millis(ms);
        }
        settings
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct StoredImage {
    pub pet_id: i64,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    pub users: BTreeMap<i64, StoredUser>,
    /// refresh token -> user id
    pub sessions: HashMap<String, i64>,
    pub pets: BTreeMap<i64, Pet>,
    pub images: HashMap<i64, StoredImage>,
    pub favorites: Vec<Favorite>,
    pub inquiries: BTreeMap<i64, Inquiry>,
    pub notifications: BTreeMap<i64, Notification>,
}

impl Store {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users
            .values()
            .find(|u| u.user.email.eq_ignore_ascii_case(email))
    }

    pub fn notify(
        &mut self,
        user_id: i64,
        kind: &str,
        title: impl Into<String>,
        related_id: Option<i64>,
    ) {
        let id = self.next_id();
        self.notifications.insert(
            id,
            Notification {
                id,
                user_id,
                kind: kind.to_string(),
                title: title.into(),
                body: None,
                read: false,
                related_id,
                created_at: Some(Utc::now()),
            },
        );
    }

    /// Drops a pet with its images, favorites and inquiries.
    pub fn remove_pet(&mut self, pet_id: i64) -> Option<Pet> {
        let pet = self.pets.remove(&pet_id)?;
        self.images.retain(|_, img| img.pet_id != pet_id);
        self.favorites.retain(|f| f.pet_id != pet_id);
        self.inquiries.retain(|_, i| i.pet_id != pet_id);
        Some(pet)
    }
}

pub struct AppState {
    pub settings: DevSettings,
    store: Mutex<Store>,
    pub refresh_calls: AtomicU64,
    /// Access tokens minted under an older generation are rejected.
    pub token_generation: AtomicU64,
}

impl AppState {
    pub fn new(settings: DevSettings) -> Self {
        Self {
            settings,
            store: Mutex::new(Store::default()),
            refresh_calls: AtomicU64::new(0),
            token_generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn generation(&self) -> u64 {
        self.token_generation.load(Ordering::SeqCst)
    }
}
