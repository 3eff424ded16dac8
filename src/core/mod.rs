pub mod clock;
pub mod constants;
pub mod conversation;
pub mod errors;
pub mod flows;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod parsing;
pub mod scheduler;
pub mod services;
