use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::lending::command::borrow_cmd::{BorrowCommand, BorrowCommandRequest, BorrowCommandResponse};
use crate::lending::command::borrowed_stats_cmd::{BorrowedStatsCommand, BorrowedStatsCommandRequest, BorrowedStatsCommandResponse};
use crate::lending::command::delete_borrow_cmd::{DeleteBorrowCommand, DeleteBorrowCommandRequest, DeleteBorrowCommandResponse};
use crate::lending::command::delete_return_cmd::{DeleteReturnCommand, DeleteReturnCommandRequest, DeleteReturnCommandResponse};
use crate::lending::command::extend_cmd::{ExtendCommand, ExtendCommandRequest, ExtendCommandResponse};
use crate::lending::command::get_ticket_cmd::{GetTicketCommand, GetTicketCommandRequest, GetTicketCommandResponse};
use crate::lending::command::query_tickets_cmd::{QueryTicketsCommand, QueryTicketsCommandRequest, QueryTicketsCommandResponse};
use crate::lending::command::return_cmd::{ReturnItemsCommand, ReturnItemsCommandRequest, ReturnItemsCommandResponse};
use crate::lending::command::update_borrow_cmd::{UpdateBorrowCommand, UpdateBorrowCommandRequest, UpdateBorrowCommandResponse};
use crate::lending::command::update_return_cmd::{UpdateReturnCommand, UpdateReturnCommandRequest, UpdateReturnCommandResponse};
use crate::lending::domain::LendingEngine;
use crate::lending::factory;

fn build_service(state: &AppState) -> Arc<dyn LendingEngine> {
    factory::create_lending_engine(&state.context)
}

// the id from the path wins over one given in the body
fn with_path_id(json: Json<Value>, key: &str, id: String) -> Value {
    let mut body = json.0;
    if let Some(obj) = body.as_object_mut() {
        obj.insert(key.to_string(), Value::String(id));
    }
    body
}

pub async fn borrow(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<BorrowCommandResponse>, ServerError> {
    let req: BorrowCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = BorrowCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_ticket_by_id(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>) -> Result<Json<GetTicketCommandResponse>, ServerError> {
    let req = GetTicketCommandRequest::new(ticket_id);
    let res = GetTicketCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn query_tickets(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>) -> Result<Json<QueryTicketsCommandResponse>, ServerError> {
    params.entry("filter".to_string()).or_insert_with(|| "unreturned".to_string());
    let json = serde_json::to_value(params).map_err(json_to_server_error)?;
    let req: QueryTicketsCommandRequest = serde_json::from_value(json).map_err(json_to_server_error)?;
    let res = QueryTicketsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_borrow(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    json: Json<Value>) -> Result<Json<UpdateBorrowCommandResponse>, ServerError> {
    let body = with_path_id(json, "ticket_id", ticket_id);
    let req: UpdateBorrowCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = UpdateBorrowCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn delete_borrow(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>) -> Result<Json<DeleteBorrowCommandResponse>, ServerError> {
    let req = DeleteBorrowCommandRequest::new(ticket_id);
    let res = DeleteBorrowCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn return_items(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    json: Json<Value>) -> Result<Json<ReturnItemsCommandResponse>, ServerError> {
    let body = with_path_id(json, "ticket_id", ticket_id);
    let req: ReturnItemsCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = ReturnItemsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_return(
    State(state): State<AppState>,
    Path(return_id): Path<String>,
    json: Json<Value>) -> Result<Json<UpdateReturnCommandResponse>, ServerError> {
    let body = with_path_id(json, "return_id", return_id);
    let req: UpdateReturnCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = UpdateReturnCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn delete_return(
    State(state): State<AppState>,
    Path(return_id): Path<String>) -> Result<Json<DeleteReturnCommandResponse>, ServerError> {
    let req = DeleteReturnCommandRequest::new(return_id);
    let res = DeleteReturnCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn extend(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>) -> Result<Json<ExtendCommandResponse>, ServerError> {
    let req = ExtendCommandRequest::new(ticket_id);
    let res = ExtendCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn borrowed_stats(
    State(state): State<AppState>) -> Result<Json<BorrowedStatsCommandResponse>, ServerError> {
    let res = BorrowedStatsCommand::new(build_service(&state)).execute(BorrowedStatsCommandRequest::default()).await?;
    Ok(Json(res))
}
