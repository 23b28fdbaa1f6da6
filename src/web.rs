//! HTTP surface: login plus owner/asset CRUD under the /integrations prefix.
//! Handlers stay thin; validation lives in `validate`, persistence in
//! `storage`, and every failure path is an `AppError` mapped to a status.

use crate::errors::AppError;
use crate::settings::Settings;
use crate::storage;
use crate::tokens::TokenSigner;
use crate::validate;
use axum::extract::{Form, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub tokens: TokenSigner,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/owner", post(create_owner))
        .route(
            "/owner/{id}",
            get(get_owner).put(update_owner).delete(delete_owner),
        )
        .route("/owners", get(list_owners))
        .route("/asset", post(create_asset))
        .route(
            "/asset/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/assets", get(list_assets))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let api = Router::new().route("/auth", post(login)).merge(protected);

    Router::new()
        .route("/", get(root))
        .nest("/integrations", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(
    settings: Settings,
    db: DatabaseConnection,
    tokens: TokenSigner,
) -> miette::Result<()> {
    let state = AppState {
        settings: Arc::new(settings),
        db,
        tokens,
    };
    let addr = state.settings.listen_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.into_diagnostic()?;
    tracing::info!(%addr, "API listening");
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

/// Bearer gate for the data routes. An absent or malformed Authorization
/// header is rejected before any token inspection; a present token that
/// fails verification is rejected by the token service.
async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Forbidden("not authenticated".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Forbidden("not authenticated".to_string()))?;

    let claims = state.tokens.verify(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the EyesOnAsset API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Authentication

#[derive(Debug, Deserialize)]
struct LoginForm {
    login: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let auth = &state.settings.auth;
    if form.login != auth.login || form.password != auth.password {
        return Err(AppError::Unauthenticated("invalid credentials".to_string()));
    }

    let ttl = state.tokens.ttl();
    let access_token = state.tokens.issue(&form.login, ttl)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: ttl.as_secs(),
    }))
}

// Owners

#[derive(Debug, Deserialize)]
struct CreateOwnerRequest {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Deserialize)]
struct UpdateOwnerRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct OwnerResponse {
    id: String,
    name: String,
    email: String,
    phone: String,
}

impl From<storage::Owner> for OwnerResponse {
    fn from(owner: storage::Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name,
            email: owner.email,
            phone: owner.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Pagination {
    skip: Option<u64>,
    limit: Option<u64>,
}

async fn create_owner(
    State(state): State<AppState>,
    Json(req): Json<CreateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate::ensure(validate::owner_create(&req.name, &req.email, &req.phone))?;

    let owner = storage::create_owner(
        &state.db,
        storage::NewOwner {
            name: req.name,
            email: req.email,
            phone: req.phone,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(OwnerResponse::from(owner))))
}

async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OwnerResponse>, AppError> {
    let owner = storage::get_owner(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("owner with id {} not found", id)))?;

    Ok(Json(OwnerResponse::from(owner)))
}

async fn list_owners(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<OwnerResponse>>, AppError> {
    let owners = storage::list_owners(
        &state.db,
        page.skip.unwrap_or(0),
        page.limit.unwrap_or(100),
    )
    .await?;

    Ok(Json(owners.into_iter().map(OwnerResponse::from).collect()))
}

async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOwnerRequest>,
) -> Result<Json<OwnerResponse>, AppError> {
    validate::ensure(validate::owner_update(
        req.name.as_deref(),
        req.email.as_deref(),
        req.phone.as_deref(),
    ))?;

    let owner = storage::update_owner(
        &state.db,
        &id,
        storage::OwnerPatch {
            name: req.name,
            email: req.email,
            phone: req.phone,
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("owner with id {} not found", id)))?;

    Ok(Json(OwnerResponse::from(owner)))
}

async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = storage::delete_owner(&state.db, &id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("owner with id {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

// Assets

#[derive(Debug, Deserialize)]
struct CreateAssetRequest {
    name: String,
    category: String,
    owner: String,
}

#[derive(Debug, Deserialize)]
struct UpdateAssetRequest {
    name: Option<String>,
    category: Option<String>,
    owner: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssetResponse {
    id: String,
    name: String,
    category: String,
    owner: String,
}

impl From<storage::Asset> for AssetResponse {
    fn from(asset: storage::Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            category: asset.category,
            owner: asset.owner_id,
        }
    }
}

async fn create_asset(
    State(state): State<AppState>,
    Json(req): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate::ensure(validate::asset_create(&req.name, &req.category, &req.owner))?;

    // The referenced owner must exist before the insert
    if storage::get_owner(&state.db, &req.owner).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "owner with id {} not found",
            req.owner
        )));
    }

    let asset = storage::create_asset(
        &state.db,
        storage::NewAsset {
            name: req.name,
            category: req.category,
            owner_id: req.owner,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}

async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    let asset = storage::get_asset(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("asset with id {} not found", id)))?;

    Ok(Json(AssetResponse::from(asset)))
}

async fn list_assets(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<AssetResponse>>, AppError> {
    let assets = storage::list_assets(
        &state.db,
        page.skip.unwrap_or(0),
        page.limit.unwrap_or(100),
    )
    .await?;

    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}

async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, AppError> {
    validate::ensure(validate::asset_update(
        req.name.as_deref(),
        req.category.as_deref(),
        req.owner.as_deref(),
    ))?;

    // Owner existence is re-checked only when the owner field is supplied;
    // an update that leaves the owner alone skips the lookup entirely.
    if let Some(owner) = &req.owner {
        if storage::get_owner(&state.db, owner).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "owner with id {} not found",
                owner
            )));
        }
    }

    let asset = storage::update_asset(
        &state.db,
        &id,
        storage::AssetPatch {
            name: req.name,
            category: req.category,
            owner_id: req.owner,
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("asset with id {} not found", id)))?;

    Ok(Json(AssetResponse::from(asset)))
}

async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = storage::delete_asset(&state.db, &id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("asset with id {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
