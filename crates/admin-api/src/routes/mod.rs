pub mod auth;
pub mod health;
pub mod inquiries;
pub mod listings;
pub mod notifications;
pub mod stats;
