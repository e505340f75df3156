//! The folder RPC endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::Value;
use tracing::debug;

use medianest_entity::action::ActionResponse;

use crate::error::ApiError;
use crate::extractors::{Caller, RpcAction};
use crate::state::AppState;

use super::folder::dispatch;

/// POST /api/rpc
pub async fn rpc(
    State(state): State<AppState>,
    caller: Caller,
    RpcAction(action): RpcAction,
) -> Result<Json<ActionResponse<Value>>, ApiError> {
    debug!(
        request_id = %caller.request_id,
        action = action.name(),
        principal = %caller.principal.label(),
        "RPC request"
    );
    let data = dispatch(&state.folders, &caller, action).await?;
    Ok(Json(ActionResponse::ok(data)))
}
