pub mod notify;
pub mod review;
pub mod stats;
