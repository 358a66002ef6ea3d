//! Authenticated transport shared by every service module.

mod client;
mod refresh;
mod request;

pub use client::{ApiClient, SessionEvent, REFRESH_PATH};
pub use refresh::{RefreshFailure, RefreshGate, RefreshLease, RefreshOutcome, Ticket};
pub use request::{ApiRequest, Body, FilePart, MultipartBody};
