pub mod collector;
pub mod coordinator;
pub mod error;
