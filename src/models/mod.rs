pub mod admin;
pub mod application;
pub mod favorite;
pub mod inquiry;
pub mod message;
pub mod notification;
pub mod pet;
pub mod review;
pub mod user;

pub use admin::{AdminStats, SetUserActiveRequest};
pub use application::{
    Application, ApplicationStatus, SubmitApplicationRequest, UpdateApplicationStatusRequest,
};
pub use favorite::{AddFavoriteRequest, Favorite};
pub use inquiry::{
    CreateInquiryRequest, Inquiry, InquiryReply, InquiryReplyRequest, InquiryStatus,
    UpdateInquiryStatusRequest,
};
pub use message::{Message, SendMessageRequest};
pub use notification::{Notification, UnreadCount};
pub use pet::{
    AgeInfo, CreatePetRequest, ImageUpload, MedicalInfo, Pet, PetGender, PetImage, PetList,
    PetQuery, PetSize, PetStatus, UpdatePetRequest,
};
pub use review::{CreateReviewRequest, Review};
pub use user::{
    AuthResponseData, AuthTokens, ChangePasswordRequest, LoginRequest, RefreshRequest,
    RegisterRequest, UpdateProfileRequest, User, UserType,
};
