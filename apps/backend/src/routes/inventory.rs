//! Shop inventory endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::{
    InventoryResponse, PurchaseItemRequest, PurchaseResponse, StatusResponse,
    UpdateInventoryRequest,
};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/user/inventory
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<InventoryResponse>> {
    let inventory = state.users.inventory(auth.user_id).await?;
    Ok(Json(InventoryResponse { inventory }))
}

/// POST /api/user/inventory/purchase
pub async fn purchase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<PurchaseItemRequest>,
) -> Result<Json<PurchaseResponse>> {
    let profile = state
        .users
        .purchase_item(auth.user_id, payload.item_id)
        .await?;
    Ok(Json(PurchaseResponse {
        status: "success".to_string(),
        profile,
    }))
}

/// PUT /api/user/inventory/item
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> Result<Json<StatusResponse>> {
    state
        .users
        .update_inventory_item(auth.user_id, &payload)
        .await?;
    Ok(Json(StatusResponse::ok()))
}
