use crate::core::messages;
use crate::core::models::message::OutgoingMessage;
use crate::core::models::transaction::Transaction;
use crate::core::parsing::parse_date;
use chrono::NaiveDate;

/// Waits for the payment date of an already validated expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentFlow {
    pub transaction: Transaction,
}

#[derive(Debug)]
pub enum PaymentOutcome {
    Rejected(PaymentFlow, OutgoingMessage),
    Complete { transaction: Transaction, paid_on: NaiveDate },
}

impl PaymentFlow {
    pub fn start(transaction: Transaction) -> (Self, OutgoingMessage) {
        let flow = PaymentFlow { transaction };
        let prompt = flow.prompt();
        (flow, prompt)
    }

    pub fn prompt(&self) -> OutgoingMessage {
        OutgoingMessage::text(messages::ask_payment_date(&self.transaction))
    }

    pub fn on_text(self, input: &str, today: NaiveDate) -> PaymentOutcome {
        match parse_date(input, today) {
            Ok(paid_on) => PaymentOutcome::Complete {
                transaction: self.transaction,
                paid_on,
            },
            Err(_) => PaymentOutcome::Rejected(self, OutgoingMessage::text(messages::invalid_date())),
        }
    }

    pub fn on_choice(self, _value: &str) -> PaymentOutcome {
        let prompt = self.prompt();
        PaymentOutcome::Rejected(self, prompt)
    }
}
