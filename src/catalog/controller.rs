use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::catalog::command::add_item_cmd::{AddItemCommand, AddItemCommandRequest, AddItemCommandResponse};
use crate::catalog::command::get_item_cmd::{GetItemCommand, GetItemCommandRequest, GetItemCommandResponse};
use crate::catalog::command::item_stats_cmd::{ItemStatsCommand, ItemStatsCommandRequest, ItemStatsCommandResponse};
use crate::catalog::command::query_items_cmd::{QueryItemsCommand, QueryItemsCommandRequest, QueryItemsCommandResponse};
use crate::catalog::command::remove_item_cmd::{RemoveItemCommand, RemoveItemCommandRequest, RemoveItemCommandResponse};
use crate::catalog::command::restore_item_cmd::{RestoreItemCommand, RestoreItemCommandRequest, RestoreItemCommandResponse};
use crate::catalog::command::update_item_cmd::{UpdateItemCommand, UpdateItemCommandRequest, UpdateItemCommandResponse};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::ItemChanges;
use crate::catalog::factory;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};

fn build_service(state: &AppState) -> Arc<dyn CatalogStore> {
    factory::create_catalog_store(&state.context)
}

pub async fn add_item(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<AddItemCommandResponse>, ServerError> {
    let req: AddItemCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = AddItemCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_item_by_id(
    State(state): State<AppState>,
    Path(item_id): Path<String>) -> Result<Json<GetItemCommandResponse>, ServerError> {
    let req = GetItemCommandRequest::new(item_id);
    let res = GetItemCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn query_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<QueryItemsCommandResponse>, ServerError> {
    let req = QueryItemsCommandRequest::from_params(params);
    let res = QueryItemsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    json: Json<Value>) -> Result<Json<UpdateItemCommandResponse>, ServerError> {
    let changes: ItemChanges = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let req = UpdateItemCommandRequest::new(item_id.as_str(), changes);
    let res = UpdateItemCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>) -> Result<Json<RemoveItemCommandResponse>, ServerError> {
    let req = RemoveItemCommandRequest::new(item_id);
    let res = RemoveItemCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn restore_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>) -> Result<Json<RestoreItemCommandResponse>, ServerError> {
    let req = RestoreItemCommandRequest { item_id };
    let res = RestoreItemCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn item_stats(
    State(state): State<AppState>) -> Result<Json<ItemStatsCommandResponse>, ServerError> {
    let res = ItemStatsCommand::new(build_service(&state)).execute(ItemStatsCommandRequest::default()).await?;
    Ok(Json(res))
}
