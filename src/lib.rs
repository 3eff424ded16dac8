pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::conversation::ConversationService;
pub use crate::core::errors::FinanceError;
pub use crate::core::notifications::NotificationService;
pub use crate::core::scheduler::Scheduler;
pub use crate::core::services::FinanceService;

#[cfg(test)]
mod tests;
