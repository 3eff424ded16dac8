use crate::core::constants::{INSTALLMENT_NO, INSTALLMENT_YES};
use crate::core::messages;
use crate::core::models::message::OutgoingMessage;
use crate::core::models::transaction::{InstallmentInfo, NewTransaction, TransactionKind};
use crate::core::parsing::{parse_amount, parse_date, parse_installment_count};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftBasics {
    pub category: String,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStep {
    AwaitCategory,
    AwaitDescription {
        category: String,
    },
    AwaitAmount {
        category: String,
        description: String,
    },
    AwaitDate(DraftBasics),
    AwaitInstallmentChoice {
        basics: DraftBasics,
        due_date: NaiveDate,
    },
    AwaitInstallmentCount {
        basics: DraftBasics,
        due_date: NaiveDate,
    },
    AwaitInstallmentAmount {
        basics: DraftBasics,
        due_date: NaiveDate,
        installments: u32,
    },
}

/// A fully collected entry, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub installment: Option<InstallmentInfo>,
}

impl TransactionDraft {
    pub fn into_new_transaction(self, user_id: &str, created_at: DateTime<Utc>) -> NewTransaction {
        NewTransaction {
            user_id: user_id.to_string(),
            kind: self.kind,
            category: self.category,
            description: self.description,
            amount: self.amount,
            due_date: self.due_date,
            installment: self.installment,
            created_at,
        }
    }

    fn from_basics(
        kind: TransactionKind,
        basics: DraftBasics,
        due_date: NaiveDate,
        installment: Option<InstallmentInfo>,
    ) -> Self {
        TransactionDraft {
            kind,
            category: basics.category,
            description: basics.description,
            amount: basics.amount,
            due_date,
            installment,
        }
    }
}

#[derive(Debug)]
pub enum EntryOutcome {
    /// Input accepted; the flow moved to its next step.
    Advanced(EntryFlow, OutgoingMessage),
    /// Input rejected; the flow stays on the same step.
    Rejected(EntryFlow, OutgoingMessage),
    Complete(TransactionDraft),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFlow {
    pub kind: TransactionKind,
    pub step: EntryStep,
}

impl EntryFlow {
    pub fn start(kind: TransactionKind) -> (Self, OutgoingMessage) {
        let flow = EntryFlow {
            kind,
            step: EntryStep::AwaitCategory,
        };
        let prompt = flow.prompt();
        (flow, prompt)
    }

    /// The question for the current step.
    pub fn prompt(&self) -> OutgoingMessage {
        match &self.step {
            EntryStep::AwaitCategory => OutgoingMessage::text(messages::ask_category(self.kind)),
            EntryStep::AwaitDescription { category } => {
                OutgoingMessage::text(messages::ask_description(self.kind, category))
            }
            EntryStep::AwaitAmount { description, .. } => {
                OutgoingMessage::text(messages::ask_amount(self.kind, description))
            }
            EntryStep::AwaitDate(basics) => OutgoingMessage::text(messages::ask_date(self.kind, basics.amount)),
            EntryStep::AwaitInstallmentChoice { due_date, .. } => messages::ask_installment_choice(*due_date),
            EntryStep::AwaitInstallmentCount { .. } => OutgoingMessage::text(messages::ask_installment_count()),
            EntryStep::AwaitInstallmentAmount { installments, .. } => {
                OutgoingMessage::text(messages::ask_installment_amount(*installments))
            }
        }
    }

    fn advance(kind: TransactionKind, step: EntryStep) -> EntryOutcome {
        let flow = EntryFlow { kind, step };
        let prompt = flow.prompt();
        EntryOutcome::Advanced(flow, prompt)
    }

    fn reject(self, message: OutgoingMessage) -> EntryOutcome {
        EntryOutcome::Rejected(self, message)
    }

    /// Free-text answer. `today` is the date the input was received and backs
    /// the `hoje` literal.
    pub fn on_text(self, input: &str, today: NaiveDate) -> EntryOutcome {
        let kind = self.kind;
        match self.step {
            EntryStep::AwaitCategory => Self::advance(
                kind,
                EntryStep::AwaitDescription {
                    category: input.to_string(),
                },
            ),
            EntryStep::AwaitDescription { category } => Self::advance(
                kind,
                EntryStep::AwaitAmount {
                    category,
                    description: input.to_string(),
                },
            ),
            EntryStep::AwaitAmount { category, description } => match parse_amount(input) {
                Ok(amount) => Self::advance(
                    kind,
                    EntryStep::AwaitDate(DraftBasics {
                        category,
                        description,
                        amount,
                    }),
                ),
                Err(_) => EntryFlow {
                    kind,
                    step: EntryStep::AwaitAmount { category, description },
                }
                .reject(OutgoingMessage::text(messages::invalid_amount())),
            },
            EntryStep::AwaitDate(basics) => match parse_date(input, today) {
                Ok(due_date) => match kind {
                    TransactionKind::Income => {
                        EntryOutcome::Complete(TransactionDraft::from_basics(kind, basics, due_date, None))
                    }
                    TransactionKind::Expense => {
                        Self::advance(kind, EntryStep::AwaitInstallmentChoice { basics, due_date })
                    }
                },
                Err(_) => EntryFlow {
                    kind,
                    step: EntryStep::AwaitDate(basics),
                }
                .reject(OutgoingMessage::text(messages::invalid_date())),
            },
            step @ EntryStep::AwaitInstallmentChoice { .. } => {
                EntryFlow { kind, step }.reject(messages::pick_installment_option())
            }
            EntryStep::AwaitInstallmentCount { basics, due_date } => match parse_installment_count(input) {
                Ok(installments) => Self::advance(
                    kind,
                    EntryStep::AwaitInstallmentAmount {
                        basics,
                        due_date,
                        installments,
                    },
                ),
                Err(_) => EntryFlow {
                    kind,
                    step: EntryStep::AwaitInstallmentCount { basics, due_date },
                }
                .reject(OutgoingMessage::text(messages::invalid_installment_count())),
            },
            EntryStep::AwaitInstallmentAmount {
                basics,
                due_date,
                installments,
            } => match parse_amount(input) {
                Ok(per_installment) => EntryOutcome::Complete(TransactionDraft::from_basics(
                    kind,
                    basics,
                    due_date,
                    Some(InstallmentInfo::first_of(installments, per_installment)),
                )),
                Err(_) => EntryFlow {
                    kind,
                    step: EntryStep::AwaitInstallmentAmount {
                        basics,
                        due_date,
                        installments,
                    },
                }
                .reject(OutgoingMessage::text(messages::invalid_amount())),
            },
        }
    }

    /// Answer picked from the options of the previous prompt.
    pub fn on_choice(self, value: &str) -> EntryOutcome {
        let kind = self.kind;
        match self.step {
            EntryStep::AwaitInstallmentChoice { basics, due_date } => match value {
                INSTALLMENT_YES => Self::advance(kind, EntryStep::AwaitInstallmentCount { basics, due_date }),
                INSTALLMENT_NO => EntryOutcome::Complete(TransactionDraft::from_basics(kind, basics, due_date, None)),
                _ => EntryFlow {
                    kind,
                    step: EntryStep::AwaitInstallmentChoice { basics, due_date },
                }
                .reject(messages::pick_installment_option()),
            },
            step => {
                let flow = EntryFlow { kind, step };
                let prompt = flow.prompt();
                flow.reject(prompt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn feed(flow: EntryFlow, input: &str) -> EntryFlow {
        match flow.on_text(input, today()) {
            EntryOutcome::Advanced(next, _) => next,
            other => panic!("expected the flow to advance, got {:?}", other),
        }
    }

    fn expense_at_choice() -> EntryFlow {
        let (flow, _) = EntryFlow::start(TransactionKind::Expense);
        let flow = feed(flow, "Eletrônicos");
        let flow = feed(flow, "Notebook");
        let flow = feed(flow, "1200,00");
        feed(flow, "20/03/2024")
    }

    #[test]
    fn income_completes_after_date() {
        let (flow, prompt) = EntryFlow::start(TransactionKind::Income);
        assert!(prompt.text.contains("Receita"));
        let flow = feed(flow, "Salário");
        let flow = feed(flow, "Março");
        let flow = feed(flow, "5000.00");
        match flow.on_text("hoje", today()) {
            EntryOutcome::Complete(draft) => {
                assert_eq!(draft.kind, TransactionKind::Income);
                assert_eq!(draft.category, "Salário");
                assert_eq!(draft.description, "Março");
                assert_eq!(draft.amount, dec!(5000.00));
                assert_eq!(draft.due_date, today());
                assert_eq!(draft.installment, None);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn invalid_amount_keeps_step() {
        let (flow, _) = EntryFlow::start(TransactionKind::Expense);
        let flow = feed(flow, "Mercado");
        let flow = feed(flow, "Compras");
        let before = flow.clone();
        match flow.on_text("abc", today()) {
            EntryOutcome::Rejected(same, message) => {
                assert_eq!(same, before);
                assert!(message.text.contains("Valor inválido"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn invalid_date_keeps_step() {
        let (flow, _) = EntryFlow::start(TransactionKind::Income);
        let flow = feed(flow, "Vendas");
        let flow = feed(flow, "Bolo");
        let flow = feed(flow, "80");
        match flow.on_text("32/01/2024", today()) {
            EntryOutcome::Rejected(same, _) => assert!(matches!(same.step, EntryStep::AwaitDate(_))),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn expense_asks_about_installments_with_options() {
        let (flow, _) = EntryFlow::start(TransactionKind::Expense);
        let flow = feed(flow, "Eletrônicos");
        let flow = feed(flow, "Notebook");
        let flow = feed(flow, "1200,00");
        match flow.on_text("20/03/2024", today()) {
            EntryOutcome::Advanced(next, prompt) => {
                assert!(matches!(next.step, EntryStep::AwaitInstallmentChoice { .. }));
                assert_eq!(prompt.options.len(), 2);
            }
            other => panic!("expected installment question, got {:?}", other),
        }
    }

    #[test]
    fn declining_installments_completes_without_info() {
        match expense_at_choice().on_choice(INSTALLMENT_NO) {
            EntryOutcome::Complete(draft) => {
                assert_eq!(draft.kind, TransactionKind::Expense);
                assert_eq!(draft.amount, dec!(1200.00));
                assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
                assert!(draft.installment.is_none());
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn installment_path_collects_count_and_amount() {
        let flow = match expense_at_choice().on_choice(INSTALLMENT_YES) {
            EntryOutcome::Advanced(next, _) => next,
            other => panic!("expected count question, got {:?}", other),
        };
        let flow = match flow.on_text("0", today()) {
            EntryOutcome::Rejected(same, _) => same,
            other => panic!("zero installments must be rejected, got {:?}", other),
        };
        let flow = feed(flow, "12");
        match flow.on_text("100,00", today()) {
            EntryOutcome::Complete(draft) => {
                assert_eq!(draft.installment, Some(InstallmentInfo::first_of(12, dec!(100.00))));
                assert_eq!(draft.installment.unwrap().current_installment, 1);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn free_text_at_choice_reprompts_with_options() {
        match expense_at_choice().on_text("sim", today()) {
            EntryOutcome::Rejected(same, message) => {
                assert!(matches!(same.step, EntryStep::AwaitInstallmentChoice { .. }));
                assert_eq!(message.options.len(), 2);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn stray_choice_repeats_current_question() {
        let (flow, _) = EntryFlow::start(TransactionKind::Income);
        match flow.on_choice(INSTALLMENT_YES) {
            EntryOutcome::Rejected(same, message) => {
                assert_eq!(same.step, EntryStep::AwaitCategory);
                assert!(message.text.contains("categoria"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
