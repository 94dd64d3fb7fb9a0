//! carnet-api - HTTP API server for carnet

use std::net::SocketAddr;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use carnet_api::services::{
    CategoryResponse, CategoryService, CreateCategoryDto, CreateNoteDto, NoteResponse,
    NoteService, UpdateCategoryDto, UpdateNoteDto,
};
use carnet_db::{log_pool_metrics, Database, PoolConfig};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carnet API",
        version = "1.0.0",
        description = "Notes backend with archive toggling and user-defined categories"
    ),
    paths(
        create_note,
        list_notes,
        get_note,
        update_note,
        delete_note,
        archive_note,
        unarchive_note,
        add_category_to_note,
        remove_category_from_note,
        create_category,
        list_categories,
        get_category,
        update_category,
        delete_category,
    ),
    components(schemas(
        CreateNoteDto,
        UpdateNoteDto,
        NoteResponse,
        CreateCategoryDto,
        UpdateCategoryDto,
        CategoryResponse,
    )),
    tags(
        (name = "Notes", description = "Note CRUD, archiving, and category membership"),
        (name = "Categories", description = "Category management"),
        (name = "System", description = "Health checks and system info")
    )
)]
struct ApiDoc;

// =============================================================================
// CORS CONFIGURATION HELPER
// =============================================================================

/// Parse allowed origins from the comma-separated `ALLOWED_ORIGINS`
/// environment variable. Defaults to the local frontend dev server.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string());

    if origins_str.trim().is_empty() {
        return vec![HeaderValue::from_static("http://localhost:5173")];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// APP STATE AND ROUTER
// =============================================================================

/// Shared application state.
#[derive(Clone)]
struct AppState {
    notes: NoteService,
    categories: CategoryService,
}

impl AppState {
    fn new(db: Database) -> Self {
        Self {
            notes: NoteService::new(db.clone()),
            categories: CategoryService::new(db),
        }
    }
}

/// Build the full application router with middleware.
fn app(state: AppState) -> Router {
    Router::new()
        // System
        .route("/", get(root))
        .route("/health", get(health_check))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Notes CRUD
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/notes/:id/archive", patch(archive_note))
        .route("/api/notes/:id/unarchive", patch(unarchive_note))
        .route(
            "/api/notes/:id/categories/:category_id",
            post(add_category_to_note).delete(remove_category_from_note),
        )
        // Categories CRUD
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1 MB
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "carnet_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "carnet_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/carnet".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .unwrap_or(8000);

    // Connect to database. Pool sizing and timeouts come from the DB_*
    // variables read by PoolConfig::from_env, defaulted when unset.
    info!("Connecting to database...");
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    log_pool_metrics(&db.pool);
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let state = AppState::new(db);
    let app = app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// SYSTEM HANDLERS
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Carnet API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs"
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

/// Query parameters for listing notes.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
struct ListNotesQuery {
    /// Filter by archived status; unset returns all notes.
    archived: Option<bool>,
    /// Restrict to notes joined to this category.
    category_id: Option<Uuid>,
}

/// Create a new note.
#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    request_body = CreateNoteDto,
    responses(
        (status = 201, description = "Created", body = NoteResponse),
        (status = 422, description = "Validation failure")))]
async fn create_note(
    State(state): State<AppState>,
    Json(dto): Json<CreateNoteDto>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.create(dto).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// List notes, newest first, with optional archive/category filters.
#[utoipa::path(get, path = "/api/notes", tag = "Notes",
    params(ListNotesQuery),
    responses((status = 200, description = "All matching notes", body = [NoteResponse])))]
async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.list(query.archived, query.category_id).await?;
    Ok(Json(notes))
}

/// Get a single note by ID.
#[utoipa::path(get, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "Note not found")))]
async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.get(id).await?;
    Ok(Json(note))
}

/// Update a note's title and/or content.
#[utoipa::path(put, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = UpdateNoteDto,
    responses(
        (status = 200, description = "Updated note", body = NoteResponse),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Validation failure")))]
async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateNoteDto>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.update(id, dto).await?;
    Ok(Json(note))
}

/// Delete a note permanently.
#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Note not found")))]
async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.notes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Archive a note.
#[utoipa::path(patch, path = "/api/notes/{id}/archive", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Archived note", body = NoteResponse),
        (status = 404, description = "Note not found")))]
async fn archive_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.archive(id).await?;
    Ok(Json(note))
}

/// Unarchive a note.
#[utoipa::path(patch, path = "/api/notes/{id}/unarchive", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Unarchived note", body = NoteResponse),
        (status = 404, description = "Note not found")))]
async fn unarchive_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.unarchive(id).await?;
    Ok(Json(note))
}

/// Attach a category to a note (idempotent).
#[utoipa::path(post, path = "/api/notes/{id}/categories/{category_id}", tag = "Notes",
    params(
        ("id" = Uuid, Path, description = "Note ID"),
        ("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Note with updated categories", body = NoteResponse),
        (status = 404, description = "Note or category not found")))]
async fn add_category_to_note(
    State(state): State<AppState>,
    Path((id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.add_category(id, category_id).await?;
    Ok(Json(note))
}

/// Detach a category from a note (idempotent).
#[utoipa::path(delete, path = "/api/notes/{id}/categories/{category_id}", tag = "Notes",
    params(
        ("id" = Uuid, Path, description = "Note ID"),
        ("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Note with updated categories", body = NoteResponse),
        (status = 404, description = "Note or category not found")))]
async fn remove_category_from_note(
    State(state): State<AppState>,
    Path((id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.remove_category(id, category_id).await?;
    Ok(Json(note))
}

// =============================================================================
// CATEGORY HANDLERS
// =============================================================================

/// Create a new category.
#[utoipa::path(post, path = "/api/categories", tag = "Categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Created", body = CategoryResponse),
        (status = 400, description = "Name already exists"),
        (status = 422, description = "Validation failure")))]
async fn create_category(
    State(state): State<AppState>,
    Json(dto): Json<CreateCategoryDto>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.create(dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List all categories ordered by name.
#[utoipa::path(get, path = "/api/categories", tag = "Categories",
    responses((status = 200, description = "All categories", body = [CategoryResponse])))]
async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories))
}

/// Get a single category by ID.
#[utoipa::path(get, path = "/api/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "Category not found")))]
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.get(id).await?;
    Ok(Json(category))
}

/// Update a category's name and/or color.
#[utoipa::path(put, path = "/api/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Name already exists"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation failure")))]
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateCategoryDto>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.update(id, dto).await?;
    Ok(Json(category))
}

/// Delete a category; memberships are removed from every note.
#[utoipa::path(delete, path = "/api/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Category not found")))]
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(carnet_core::Error),
    NotFound(String),
    BadRequest(String),
    Validation(String),
}

impl From<carnet_core::Error> for ApiError {
    fn from(err: carnet_core::Error) -> Self {
        match err {
            carnet_core::Error::NoteNotFound(_) | carnet_core::Error::CategoryNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            carnet_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            // Duplicate names are a user error on this API, not a 409.
            carnet_core::Error::DuplicateCategoryName(_) => ApiError::BadRequest(err.to_string()),
            carnet_core::Error::InvalidInput(msg) => ApiError::Validation(msg),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
