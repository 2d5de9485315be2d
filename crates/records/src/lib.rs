//! Domain entities and repositories for the Homeboy admin backend.
//!
//! Entities are plain documents in the platform's document store; the
//! repositories here shape them into typed records and keep the collection
//! names in one place.

pub mod entities;
pub mod error;
pub mod repos;

pub use entities::{
    inquiry::Inquiry,
    listing::{CreateListingRequest, Listing},
    notification::{CreateNotificationRecord, NotificationRecord},
    status::ReviewStatus,
    user::UserProfile,
};
pub use error::{RecordError, RecordResult};
pub use repos::{
    InquiryRepository, ListingRepository, NotificationRepository, UserRepository,
};
