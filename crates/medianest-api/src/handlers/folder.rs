//! Folder actions and the dispatcher that routes decoded RPC requests to
//! them.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use medianest_core::result::AppResult;
use medianest_core::types::{FolderFilter, FolderId, ItemId};
use medianest_entity::action::{
    ActionResponse, AssignOutcome, DeleteOutcome, FolderAction, FolderContents, FolderMutation,
};
use medianest_entity::folder::FolderSnapshot;
use medianest_service::{FolderService, RequestContext};

use crate::error::ApiError;
use crate::extractors::Caller;
use crate::state::AppState;

/// Run one decoded action and serialize its payload.
pub async fn dispatch(
    service: &FolderService,
    ctx: &RequestContext,
    action: FolderAction,
) -> AppResult<Value> {
    let value = match action {
        FolderAction::GetFolders => serde_json::to_value(get_folders(service, ctx).await?)?,
        FolderAction::CreateFolder { name, parent } => {
            serde_json::to_value(create_folder(service, ctx, &name, parent).await?)?
        }
        FolderAction::RenameFolder { folder_id, name } => {
            serde_json::to_value(rename_folder(service, ctx, folder_id, &name).await?)?
        }
        FolderAction::DeleteFolder {
            folder_id,
            reassign,
        } => serde_json::to_value(delete_folder(service, ctx, folder_id, reassign).await?)?,
        FolderAction::MoveFolder {
            folder_id,
            new_parent,
        } => serde_json::to_value(move_folder(service, ctx, folder_id, new_parent).await?)?,
        FolderAction::AssignMedia { item_ids, folder_id } => {
            serde_json::to_value(assign_media(service, ctx, &item_ids, folder_id).await?)?
        }
        FolderAction::GetFolderContents {
            folder_id,
            page,
            per_page,
        } => serde_json::to_value(
            get_folder_contents(service, ctx, folder_id, page, per_page).await?,
        )?,
    };
    Ok(value)
}

/// getFolders
pub async fn get_folders(
    service: &FolderService,
    ctx: &RequestContext,
) -> AppResult<FolderSnapshot> {
    service.get_folders(ctx).await
}

/// createFolder
pub async fn create_folder(
    service: &FolderService,
    ctx: &RequestContext,
    name: &str,
    parent: FolderId,
) -> AppResult<FolderMutation> {
    service.create_folder(ctx, name, parent).await
}

/// renameFolder
pub async fn rename_folder(
    service: &FolderService,
    ctx: &RequestContext,
    folder_id: FolderId,
    name: &str,
) -> AppResult<FolderMutation> {
    service.rename_folder(ctx, folder_id, name).await
}

/// deleteFolder
pub async fn delete_folder(
    service: &FolderService,
    ctx: &RequestContext,
    folder_id: FolderId,
    reassign: bool,
) -> AppResult<DeleteOutcome> {
    service.delete_folder(ctx, folder_id, reassign).await
}

/// moveFolder
pub async fn move_folder(
    service: &FolderService,
    ctx: &RequestContext,
    folder_id: FolderId,
    new_parent: FolderId,
) -> AppResult<FolderMutation> {
    service.move_folder(ctx, folder_id, new_parent).await
}

/// assignMedia
pub async fn assign_media(
    service: &FolderService,
    ctx: &RequestContext,
    item_ids: &[ItemId],
    folder_id: FolderId,
) -> AppResult<AssignOutcome> {
    service.assign_items(ctx, item_ids, folder_id).await
}

/// getFolderContents
pub async fn get_folder_contents(
    service: &FolderService,
    ctx: &RequestContext,
    folder_id: FolderFilter,
    page: Option<u64>,
    per_page: Option<u64>,
) -> AppResult<FolderContents> {
    service.folder_contents(ctx, folder_id, page, per_page).await
}

/// Query parameters for `GET /api/folders/contents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentsQuery {
    /// Selected folder (`-1`/`all` for everything)
    #[serde(default)]
    pub folder_id: Option<String>,
    /// 1-based page
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// GET /api/folders
pub async fn list_folders(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ActionResponse<FolderSnapshot>>, ApiError> {
    let snapshot = get_folders(&state.folders, &caller).await?;
    Ok(Json(ActionResponse::ok(snapshot)))
}

/// GET /api/folders/contents
pub async fn list_contents(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<ActionResponse<FolderContents>>, ApiError> {
    let filter = match query.folder_id.as_deref() {
        Some(raw) => FolderFilter::parse(raw)?,
        None => FolderFilter::Unfiltered,
    };
    let contents =
        get_folder_contents(&state.folders, &caller, filter, query.page, query.per_page).await?;
    Ok(Json(ActionResponse::ok(contents)))
}
