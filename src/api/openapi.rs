use utoipa::OpenApi;

use crate::{
    api::models::{ErrorResponse, UpdateRequest},
    core::{
        models::{
            audit::AppLog,
            message::{OutgoingMessage, ReplyOption},
            summary::{Categories, MonthlySummary},
            transaction::{InstallmentInfo, Transaction, TransactionKind, TransactionStatus},
            user::User,
        },
        notifications::{Job, JobReport},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::post_update,
        super::handlers::list_transactions,
        super::handlers::get_categories,
        super::handlers::get_monthly_summary,
        super::handlers::run_job,
        super::handlers::get_app_logs
    ),
    components(schemas(
        UpdateRequest,
        ErrorResponse,
        OutgoingMessage,
        ReplyOption,
        Transaction,
        TransactionKind,
        TransactionStatus,
        InstallmentInfo,
        Categories,
        MonthlySummary,
        User,
        AppLog,
        Job,
        JobReport
    )),
    info(
        title = "Fintrack API",
        description = "Chat webhook and read API for the personal finance bot",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
