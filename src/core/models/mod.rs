pub mod audit;
pub mod message;
pub mod summary;
pub mod transaction;
pub mod user;
