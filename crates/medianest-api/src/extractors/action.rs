//! `RpcAction` extractor: JSON body parsed into a folder action, with
//! malformed bodies reported through the failure envelope.

use axum::Json;
use axum::extract::{FromRequest, Request};

use medianest_core::error::AppError;
use medianest_entity::action::FolderAction;

use crate::error::ApiError;
use crate::state::AppState;

/// A decoded RPC request body.
#[derive(Debug, Clone)]
pub struct RpcAction(pub FolderAction);

impl FromRequest<AppState> for RpcAction {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(action) = Json::<FolderAction>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(format!("Invalid request: {}", rejection.body_text()))
            })?;
        Ok(RpcAction(action))
    }
}
