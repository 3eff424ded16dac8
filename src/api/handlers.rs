use crate::{
    api::models::*,
    core::{
        conversation::ConversationService,
        models::{
            audit::AppLog,
            message::{IncomingUpdate, OutgoingMessage},
            summary::{Categories, MonthlySummary},
            transaction::{Transaction, TransactionFilter},
        },
        notifications::{Job, JobReport, NotificationService},
        services::FinanceService,
    },
    infrastructure::{
        logging::in_memory::InMemoryLogging, sessions::in_memory::InMemorySessionStore,
        storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use std::sync::Arc;

pub type Finance = FinanceService<InMemoryLogging, InMemoryStorage>;
pub type Conversations = ConversationService<InMemoryLogging, InMemoryStorage, InMemorySessionStore>;
pub type Notifications = NotificationService<InMemoryLogging, InMemoryStorage>;

#[derive(Clone)]
pub struct AppState {
    pub finance: Arc<Finance>,
    pub conversations: Arc<Conversations>,
    pub notifications: Arc<Notifications>,
}

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/updates", axum::routing::post(post_update))
        .route("/users/{user_id}/transactions", axum::routing::get(list_transactions))
        .route("/users/{user_id}/categories", axum::routing::get(get_categories))
        .route(
            "/users/{user_id}/summary/{year}/{month}",
            axum::routing::get(get_monthly_summary),
        )
        .route("/jobs/{job}/run", axum::routing::post(run_job))
        .route("/logs", axum::routing::get(get_app_logs))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/updates",
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Reply computed and delivered to the endpoint", body = OutgoingMessage),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub(crate) async fn post_update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<OutgoingMessage>, ApiError> {
    let update = IncomingUpdate::try_from(req)?;
    Ok(Json(state.conversations.handle(update).await))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/transactions",
    params(
        ("user_id" = String, Path, description = "Owner of the transactions"),
        ("kind" = Option<String>, Query, description = "income or expense"),
        ("status" = Option<String>, Query, description = "open or paid"),
        ("category" = Option<String>, Query, description = "Exact category name")
    ),
    responses(
        (status = 200, description = "Transactions, newest first", body = [Transaction]),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state.finance.list_transactions(&user_id, &filter).await?;
    Ok(Json(transactions))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/categories",
    params(
        ("user_id" = String, Path, description = "Owner of the categories")
    ),
    responses(
        (status = 200, description = "Categories used so far", body = Categories),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn get_categories(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Categories>, ApiError> {
    let categories = state.finance.categories(&user_id).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/summary/{year}/{month}",
    params(
        ("user_id" = String, Path, description = "Owner of the transactions"),
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1 to 12")
    ),
    responses(
        (status = 200, description = "Totals of transactions created in the month", body = MonthlySummary),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn get_monthly_summary(
    State(state): State<AppState>,
    Path((user_id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let summary = state.finance.monthly_report(&user_id, year, month).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{job}/run",
    params(
        ("job" = String, Path, description = "due-check, daily-summary or weekly-report")
    ),
    responses(
        (status = 200, description = "Job ran to completion", body = JobReport),
        (status = 400, description = "Unknown job", body = ErrorResponse),
        (status = 500, description = "Job aborted by a query failure", body = ErrorResponse)
    )
)]
pub(crate) async fn run_job(State(state): State<AppState>, Path(job): Path<String>) -> Result<Json<JobReport>, ApiError> {
    let job: Job = job.parse()?;
    let report = state.notifications.run(job).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Audit log", body = [AppLog]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn get_app_logs(State(state): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = state.finance.get_app_logs().await?;
    Ok(Json(logs))
}
