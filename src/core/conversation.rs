//! Routes one chat turn: commands start or query, free text and option
//! choices feed the user's active flow.

use crate::core::constants::RECENT_TRANSACTIONS_LIMIT;
use crate::core::errors::FinanceError;
use crate::core::flows::{EntryFlow, EntryOutcome, PaymentFlow, PaymentOutcome, Session, TransactionDraft};
use crate::core::messages;
use crate::core::models::message::{IncomingUpdate, OutgoingMessage, UserInput};
use crate::core::models::transaction::{Transaction, TransactionKind};
use crate::core::services::FinanceService;
use crate::infrastructure::delivery::Delivery;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::sessions::SessionStore;
use crate::infrastructure::storage::Storage;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct ConversationService<L: LoggingService, S: Storage, C: SessionStore> {
    finance: Arc<FinanceService<L, S>>,
    sessions: C,
    delivery: Arc<dyn Delivery>,
}

impl<L: LoggingService, S: Storage, C: SessionStore> ConversationService<L, S, C> {
    pub fn new(finance: Arc<FinanceService<L, S>>, sessions: C, delivery: Arc<dyn Delivery>) -> Self {
        ConversationService {
            finance,
            sessions,
            delivery,
        }
    }

    /// Computes the reply to one update and pushes it to the update's
    /// endpoint, if any. Internal failures become a generic error reply.
    pub async fn handle(&self, update: IncomingUpdate) -> OutgoingMessage {
        let reply = match self.reply(&update).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id = %update.user_id, error = %e, "Failed to handle update");
                OutgoingMessage::text(messages::generic_error())
            }
        };
        if let Some(endpoint) = update.endpoint.as_deref() {
            if let Err(e) = self.delivery.send(endpoint, &reply).await {
                warn!(user_id = %update.user_id, endpoint = %endpoint, error = %e, "Failed to deliver reply");
            }
        }
        reply
    }

    pub async fn reply(&self, update: &IncomingUpdate) -> Result<OutgoingMessage, FinanceError> {
        let user_id = update.user_id.as_str();
        match &update.input {
            UserInput::Command { name, args } => self.on_command(update, name, args).await,
            UserInput::Text(text) => match self.sessions.take(user_id).await? {
                Some(Session::Entry(flow)) => {
                    let outcome = flow.on_text(text, self.finance.today());
                    self.continue_entry(user_id, outcome).await
                }
                Some(Session::Payment(flow)) => {
                    let outcome = flow.on_text(text, self.finance.today());
                    self.continue_payment(user_id, outcome).await
                }
                None => Ok(OutgoingMessage::text(messages::no_active_flow())),
            },
            UserInput::Choice(value) => match self.sessions.take(user_id).await? {
                Some(Session::Entry(flow)) => self.continue_entry(user_id, flow.on_choice(value)).await,
                Some(Session::Payment(flow)) => self.continue_payment(user_id, flow.on_choice(value)).await,
                None => Ok(OutgoingMessage::text(messages::no_active_flow())),
            },
        }
    }

    async fn on_command(
        &self,
        update: &IncomingUpdate,
        name: &str,
        args: &[String],
    ) -> Result<OutgoingMessage, FinanceError> {
        let user_id = update.user_id.as_str();
        debug!(user_id = %user_id, command = %name, "Handling command");
        match name {
            "start" => {
                self.finance
                    .register_user(user_id, update.display_name.as_deref(), update.endpoint.as_deref())
                    .await?;
                self.sessions.take(user_id).await?;
                Ok(OutgoingMessage::text(messages::welcome(update.display_name.as_deref())))
            }
            "help" | "ajuda" => Ok(OutgoingMessage::text(messages::help())),
            "receita" | "income" => self.start_entry(user_id, TransactionKind::Income).await,
            "despesa" | "expense" => self.start_entry(user_id, TransactionKind::Expense).await,
            "listar" | "list" => {
                let recent = self.finance.list_recent(user_id, RECENT_TRANSACTIONS_LIMIT).await?;
                Ok(OutgoingMessage::text(messages::transaction_list(&recent)))
            }
            "pagar" | "pay" => self.start_payment(user_id, args.first().map(String::as_str)).await,
            "categorias" | "categories" => {
                let categories = self.finance.categories(user_id).await?;
                Ok(OutgoingMessage::text(messages::categories(&categories)))
            }
            "relatorio" | "report" => {
                let today = self.finance.today();
                let summary = self.finance.monthly_report(user_id, today.year(), today.month()).await?;
                Ok(OutgoingMessage::text(messages::monthly_report(
                    &summary,
                    today.year(),
                    today.month(),
                )))
            }
            "cancel" | "cancelar" => {
                if self.sessions.take(user_id).await?.is_some() {
                    debug!(user_id = %user_id, "Discarded active flow");
                }
                Ok(OutgoingMessage::text(messages::cancelled()))
            }
            _ => Ok(OutgoingMessage::text(messages::no_active_flow())),
        }
    }

    async fn start_entry(&self, user_id: &str, kind: TransactionKind) -> Result<OutgoingMessage, FinanceError> {
        let (flow, prompt) = EntryFlow::start(kind);
        self.sessions.save(user_id, Session::Entry(flow)).await?;
        Ok(prompt)
    }

    async fn start_payment(&self, user_id: &str, transaction_id: Option<&str>) -> Result<OutgoingMessage, FinanceError> {
        let Some(transaction_id) = transaction_id else {
            return Ok(OutgoingMessage::text(messages::payment_usage()));
        };
        let transaction = match self.finance.find_payable(user_id, transaction_id).await {
            Ok(transaction) => transaction,
            Err(FinanceError::TransactionNotFound(_)) => return Ok(OutgoingMessage::text(messages::payment_not_found())),
            Err(FinanceError::NotAnExpense(_)) => return Ok(OutgoingMessage::text(messages::payment_not_expense())),
            Err(FinanceError::TransactionAlreadyPaid(_)) => {
                return Ok(OutgoingMessage::text(messages::payment_already_paid()));
            }
            Err(e) => return Err(e),
        };
        let (flow, prompt) = PaymentFlow::start(transaction);
        self.sessions.save(user_id, Session::Payment(flow)).await?;
        Ok(prompt)
    }

    async fn continue_entry(&self, user_id: &str, outcome: EntryOutcome) -> Result<OutgoingMessage, FinanceError> {
        match outcome {
            EntryOutcome::Advanced(flow, message) | EntryOutcome::Rejected(flow, message) => {
                self.sessions.save(user_id, Session::Entry(flow)).await?;
                Ok(message)
            }
            EntryOutcome::Complete(draft) => Ok(self.finalize_entry(user_id, draft).await),
        }
    }

    /// The session was already taken, so the flow ends here whatever the
    /// insert does.
    async fn finalize_entry(&self, user_id: &str, draft: TransactionDraft) -> OutgoingMessage {
        let kind = draft.kind;
        match self.finance.record_transaction(user_id, draft).await {
            Ok(transaction) => OutgoingMessage::text(messages::entry_confirmation(&transaction)),
            Err(e) => {
                error!(user_id = %user_id, kind = %kind, error = %e, "Failed to record transaction");
                OutgoingMessage::text(messages::entry_failure(kind))
            }
        }
    }

    async fn continue_payment(&self, user_id: &str, outcome: PaymentOutcome) -> Result<OutgoingMessage, FinanceError> {
        match outcome {
            PaymentOutcome::Rejected(flow, message) => {
                self.sessions.save(user_id, Session::Payment(flow)).await?;
                Ok(message)
            }
            PaymentOutcome::Complete { transaction, paid_on } => {
                Ok(self.finalize_payment(user_id, &transaction, paid_on).await)
            }
        }
    }

    async fn finalize_payment(&self, user_id: &str, transaction: &Transaction, paid_on: NaiveDate) -> OutgoingMessage {
        match self.finance.mark_paid(user_id, &transaction.id, paid_on).await {
            Ok(true) => OutgoingMessage::text(messages::payment_confirmation(transaction, paid_on)),
            Ok(false) => OutgoingMessage::text(messages::payment_failure()),
            Err(e) => {
                error!(user_id = %user_id, transaction_id = %transaction.id, error = %e, "Failed to mark transaction as paid");
                OutgoingMessage::text(messages::payment_failure())
            }
        }
    }

    pub async fn active_session(&self, user_id: &str) -> Result<Option<Session>, FinanceError> {
        self.sessions.get(user_id).await
    }
}
