//! Typed wrappers around the marketplace REST endpoints.
//!
//! Each service borrows the shared [`ApiClient`], so every call goes through
//! the same bearer injection and refresh handling.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod favorites;
pub mod inquiries;
pub mod messages;
pub mod notifications;
pub mod pets;
pub mod reviews;

pub use admin::AdminService;
pub use applications::ApplicationService;
pub use auth::AuthService;
pub use favorites::{FavoriteService, FavoritesCache};
pub use inquiries::InquiryService;
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use pets::PetService;
pub use reviews::ReviewService;

use crate::http::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn pets(&self) -> PetService<'_> {
        PetService::new(self)
    }

    pub fn favorites(&self) -> FavoriteService<'_> {
        FavoriteService::new(self)
    }

    pub fn inquiries(&self) -> InquiryService<'_> {
        InquiryService::new(self)
    }

    pub fn messages(&self) -> MessageService<'_> {
        MessageService::new(self)
    }

    pub fn notifications(&self) -> NotificationService<'_> {
        NotificationService::new(self)
    }

    pub fn reviews(&self) -> ReviewService<'_> {
        ReviewService::new(self)
    }

    pub fn applications(&self) -> ApplicationService<'_> {
        ApplicationService::new(self)
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self)
    }
}
