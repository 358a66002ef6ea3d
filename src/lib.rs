//! Client for the OnlyCats pet-adoption API.
//!
//! [`ApiClient`] owns the HTTP connection, the token store and the refresh
//! gate; the per-resource services hang off it:
//!
//! ```no_run
//! # async fn demo() -> onlycats::Result<()> {
//! use onlycats::{ApiClient, ClientConfig, models::PetQuery};
//!
//! let client = ApiClient::in_memory(ClientConfig::from_env()?)?;
//! let page = client.pets().list(&PetQuery::default().page(1, 20)).await?;
//! println!("{} cats", page.pets.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod devserver;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod token;

pub use config::{ClientConfig, StorageProfile};
pub use error::{ApiError, Result, StorageError};
pub use http::{ApiClient, ApiRequest, SessionEvent};
pub use services::FavoritesCache;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageKeys, StorageService};
