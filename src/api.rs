//! HTTP surface: a stateless preview of the combinations an attribute set yields.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationError};
use crate::config::EditorConfig;
use crate::domain::aggregates::{AttributeSet, EmittedCombination, SeedCombination, VariantEditor};
use crate::domain::previews::InMemoryPreviews;
use crate::domain::value_objects::Price;
use crate::VariantError;

#[derive(Clone, Debug)]
pub struct AppState { pub editor: EditorConfig }

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-variants"})) }))
        .route("/api/v1/variants/combinations", post(preview_combinations))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CombinationPreviewRequest {
    #[validate(custom = "non_negative")]
    pub base_price: Decimal,
    #[validate]
    pub attributes: Vec<AttributeInput>,
    #[serde(default)]
    pub seed: Vec<SeedCombination>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttributeInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CombinationPreviewResponse {
    pub show_editor: bool,
    pub total: usize,
    pub combinations: Vec<EmittedCombination>,
}

fn non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() { return Err(ValidationError::new("negative")); }
    Ok(())
}

fn unprocessable(e: VariantError) -> (StatusCode, String) {
    if e.is_validation() { return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()); }
    tracing::error!(error = %e, "combination preview failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

async fn preview_combinations(
    State(s): State<AppState>,
    Json(r): Json<CombinationPreviewRequest>,
) -> Result<Json<CombinationPreviewResponse>, (StatusCode, String)> {
    r.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let base_price = Price::new(r.base_price).map_err(unprocessable)?;
    let attributes = AttributeSet::from_pairs(r.attributes.into_iter().map(|a| (a.name, a.values))).map_err(unprocessable)?;
    let editor = VariantEditor::for_existing(&s.editor, base_price, attributes, r.seed, Box::new(InMemoryPreviews::new()))
        .map_err(unprocessable)?;
    tracing::debug!(total = editor.combinations().len(), "combination preview built");
    Ok(Json(CombinationPreviewResponse {
        show_editor: editor.should_show_combination_editor(),
        total: editor.combinations().len(),
        combinations: editor.selected_for_emit(),
    }))
}
