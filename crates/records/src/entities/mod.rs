pub mod inquiry;
pub mod listing;
pub mod notification;
pub mod status;
pub mod user;
