use axum::{Json, extract::State};

use crate::{AppState, cache::DisplayPrice, error::AppError};

#[axum::debug_handler]
pub async fn get_eth_price(State(state): State<AppState>) -> Result<Json<DisplayPrice>, AppError> {
    let price = state.prices.get_display_price().await?;
    Ok(Json(price))
}
