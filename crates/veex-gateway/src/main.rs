use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use veex_core::{
    CatalogSnapshot, FixedCost, LedgerEntry, Model, ProductionRecord, RawMaterial, VariableCost,
    YearMonth,
};
use veex_costing::{
    ModelCost, ProductionDraft, ProductionError, cost_model, filter_history, model_cost_summaries,
    record_production, simulate_across_margins, suggested_price,
};
use veex_finance::{Dashboard, SalesReport, dashboard, entries_in_period, sales_report, summarize};
use veex_inventory::{StockAlert, StockLevel, low_stock_alerts, stock_level};
use veex_platform::{
    CatalogReplaceResponse, LedgerListResponse, PriceRequest, PriceResponse,
    ProductionListResponse, ServiceConfig, SimulateRequest, SimulateResponse, VolumeRequest,
    VolumeResponse,
};
use veex_store::{CatalogRepository, InMemoryCatalogStore, StoreError};

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
struct AppState {
    repository: CatalogRepository,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    model_id: Option<String>,
    period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaterialView {
    #[serde(flatten)]
    material: RawMaterial,
    stock_level: StockLevel,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "veex_gateway=info,veex_store=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let snapshot = config.load_catalog()?;
    let store = Arc::new(InMemoryCatalogStore::new(snapshot));

    let state = AppState {
        repository: CatalogRepository::new(store),
    };

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("veex gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/catalog", get(get_catalog).put(replace_catalog))
        .route("/materials", get(list_materials).post(save_material))
        .route("/materials/alerts", get(stock_alerts))
        .route("/materials/{id}", delete(delete_material))
        .route("/models", post(save_model))
        .route("/models/costs", get(list_model_costs))
        .route("/models/{id}", delete(delete_model))
        .route("/models/{id}/cost", get(get_model_cost))
        .route("/fixed-costs", post(save_fixed_cost))
        .route("/fixed-costs/{id}", delete(delete_fixed_cost))
        .route("/variable-costs", post(save_variable_cost))
        .route("/variable-costs/{id}", delete(delete_variable_cost))
        .route("/config/volume", put(set_volume))
        .route("/costing/price", post(price))
        .route("/costing/simulate", post(simulate))
        .route("/production", get(list_production).post(save_production))
        .route("/production/{id}", delete(delete_production))
        .route("/ledger", get(list_ledger).post(save_ledger_entry))
        .route("/ledger/{id}", delete(delete_ledger_entry))
        .route("/dashboard", get(get_dashboard))
        .route("/reports/sales", get(get_sales_report))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_catalog(State(state): State<AppState>) -> ApiResult<CatalogSnapshot> {
    state.repository.snapshot().await.map(Json).map_err(store_error)
}

async fn replace_catalog(
    State(state): State<AppState>,
    Json(snapshot): Json<CatalogSnapshot>,
) -> ApiResult<CatalogReplaceResponse> {
    let revision = state
        .repository
        .replace(snapshot)
        .await
        .map_err(store_error)?;
    Ok(Json(CatalogReplaceResponse { revision }))
}

async fn list_materials(State(state): State<AppState>) -> ApiResult<Vec<MaterialView>> {
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    let items = snapshot
        .materials
        .into_iter()
        .map(|material| MaterialView {
            stock_level: stock_level(&material),
            material,
        })
        .collect();
    Ok(Json(items))
}

async fn save_material(
    State(state): State<AppState>,
    Json(material): Json<RawMaterial>,
) -> ApiResult<RawMaterial> {
    let saved = state
        .repository
        .save_material(material)
        .await
        .map_err(store_error)?;
    info!(material_id = %saved.id, "material saved");
    Ok(Json(saved))
}

async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RawMaterial> {
    let removed = state
        .repository
        .delete_material(&id)
        .await
        .map_err(store_error)?;
    info!(material_id = %removed.id, "material deleted");
    Ok(Json(removed))
}

async fn stock_alerts(State(state): State<AppState>) -> ApiResult<Vec<StockAlert>> {
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    Ok(Json(low_stock_alerts(&snapshot.materials)))
}

async fn save_model(State(state): State<AppState>, Json(model): Json<Model>) -> ApiResult<Model> {
    let saved = state
        .repository
        .save_model(model)
        .await
        .map_err(store_error)?;
    info!(model_id = %saved.id, lines = saved.recipe_lines.len(), "model saved");
    Ok(Json(saved))
}

async fn delete_model(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Model> {
    let removed = state
        .repository
        .delete_model(&id)
        .await
        .map_err(store_error)?;
    info!(model_id = %removed.id, "model deleted");
    Ok(Json(removed))
}

async fn list_model_costs(State(state): State<AppState>) -> ApiResult<Vec<ModelCost>> {
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    Ok(Json(model_cost_summaries(&snapshot, None)))
}

async fn get_model_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ModelCost> {
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    cost_model(&snapshot, &id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("model `{id}` not found")))
}

async fn save_fixed_cost(
    State(state): State<AppState>,
    Json(cost): Json<FixedCost>,
) -> ApiResult<FixedCost> {
    let saved = state
        .repository
        .save_fixed_cost(cost)
        .await
        .map_err(store_error)?;
    info!(fixed_cost_id = %saved.id, amount = %saved.monthly_amount, "fixed cost saved");
    Ok(Json(saved))
}

async fn delete_fixed_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FixedCost> {
    state
        .repository
        .delete_fixed_cost(&id)
        .await
        .map(Json)
        .map_err(store_error)
}

async fn save_variable_cost(
    State(state): State<AppState>,
    Json(cost): Json<VariableCost>,
) -> ApiResult<VariableCost> {
    let saved = state
        .repository
        .save_variable_cost(cost)
        .await
        .map_err(store_error)?;
    info!(variable_cost_id = %saved.id, amount = %saved.per_unit_amount, "variable cost saved");
    Ok(Json(saved))
}

async fn delete_variable_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<VariableCost> {
    state
        .repository
        .delete_variable_cost(&id)
        .await
        .map(Json)
        .map_err(store_error)
}

async fn set_volume(
    State(state): State<AppState>,
    Json(payload): Json<VolumeRequest>,
) -> ApiResult<VolumeResponse> {
    let requested = payload.expected_monthly_volume.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "expectedMonthlyVolume must be an integer".to_string(),
        )
    })?;

    let applied = state
        .repository
        .set_expected_volume(requested)
        .await
        .map_err(store_error)?;
    if applied != requested {
        warn!(requested, applied, "non-positive volume ignored");
    }

    Ok(Json(VolumeResponse {
        expected_monthly_volume: applied,
    }))
}

async fn price(Json(payload): Json<PriceRequest>) -> ApiResult<PriceResponse> {
    let unit_cost = validate_unit_cost(payload.unit_cost)?;
    Ok(Json(PriceResponse {
        unit_cost,
        suggestion: suggested_price(unit_cost, payload.margin_percent),
    }))
}

async fn simulate(Json(payload): Json<SimulateRequest>) -> ApiResult<SimulateResponse> {
    let unit_cost = validate_unit_cost(payload.unit_cost)?;
    Ok(Json(SimulateResponse {
        unit_cost,
        results: simulate_across_margins(unit_cost, payload.margins.candidates()),
    }))
}

async fn list_production(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<ProductionListResponse> {
    let period = parse_period(query.period.as_deref())?;
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;

    let model_id = query.model_id.as_deref().filter(|id| !id.is_empty());
    let items = filter_history(&snapshot.production_history, model_id, period)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ProductionListResponse { items }))
}

async fn save_production(
    State(state): State<AppState>,
    Json(draft): Json<ProductionDraft>,
) -> ApiResult<ProductionRecord> {
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    let record = record_production(&snapshot, draft).map_err(production_error)?;

    let saved = state
        .repository
        .save_production(record)
        .await
        .map_err(store_error)?;
    info!(
        record_id = %saved.id,
        model_id = %saved.model_id,
        quantity = saved.quantity,
        total_cost = %saved.total_cost,
        "production recorded"
    );
    Ok(Json(saved))
}

async fn delete_production(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProductionRecord> {
    state
        .repository
        .delete_production(&id)
        .await
        .map(Json)
        .map_err(store_error)
}

async fn list_ledger(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<LedgerListResponse> {
    let period = parse_period(query.period.as_deref())?;
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;

    Ok(Json(LedgerListResponse {
        summary: summarize(&snapshot.ledger, period),
        items: entries_in_period(&snapshot.ledger, period)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

async fn save_ledger_entry(
    State(state): State<AppState>,
    Json(entry): Json<LedgerEntry>,
) -> ApiResult<LedgerEntry> {
    let saved = state
        .repository
        .save_ledger_entry(entry)
        .await
        .map_err(store_error)?;
    info!(entry_id = %saved.id, kind = ?saved.kind, amount = %saved.amount, "ledger entry saved");
    Ok(Json(saved))
}

async fn delete_ledger_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LedgerEntry> {
    state
        .repository
        .delete_ledger_entry(&id)
        .await
        .map(Json)
        .map_err(store_error)
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Dashboard> {
    let period = parse_period(query.period.as_deref())?
        .unwrap_or_else(|| YearMonth::of(Utc::now().date_naive()));
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    Ok(Json(dashboard(&snapshot, period)))
}

async fn get_sales_report(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<SalesReport> {
    let period = parse_period(query.period.as_deref())?;
    let snapshot = state.repository.snapshot().await.map_err(store_error)?;
    Ok(Json(sales_report(&snapshot, period)))
}

fn validate_unit_cost(unit_cost: Option<Decimal>) -> Result<Decimal, ApiError> {
    match unit_cost {
        Some(cost) if cost >= Decimal::ZERO => Ok(cost),
        _ => Err((
            StatusCode::BAD_REQUEST,
            "unitCost must be a non-negative number".to_string(),
        )),
    }
}

fn parse_period(raw: Option<&str>) -> Result<Option<YearMonth>, ApiError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map(Some)
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string())),
        None => Ok(None),
    }
}

fn production_error(err: ProductionError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Invalid { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Backend(err) => internal_error(err),
    }
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!("request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
