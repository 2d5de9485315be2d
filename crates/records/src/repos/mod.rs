pub mod inquiry_repository;
pub mod listing_repository;
pub mod notification_repository;
pub mod user_repository;

pub use inquiry_repository::InquiryRepository;
pub use listing_repository::ListingRepository;
pub use notification_repository::NotificationRepository;
pub use user_repository::UserRepository;
