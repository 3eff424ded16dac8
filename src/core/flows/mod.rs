//! Multi-turn conversations. Each flow is a value: a transition consumes the
//! current state and returns the next one, so a step can only touch the
//! fields it has already collected.

pub mod entry;
pub mod payment;

pub use entry::{EntryFlow, EntryOutcome, EntryStep, TransactionDraft};
pub use payment::{PaymentFlow, PaymentOutcome};

/// The active flow of one user, kept by the session store between turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Session {
    Entry(EntryFlow),
    Payment(PaymentFlow),
}
