use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::patrons::command::add_patron_cmd::{AddPatronCommand, AddPatronCommandRequest, AddPatronCommandResponse};
use crate::patrons::command::get_patron_cmd::{GetPatronCommand, GetPatronCommandRequest, GetPatronCommandResponse};
use crate::patrons::command::list_patrons_cmd::{ListPatronsCommand, ListPatronsCommandRequest, ListPatronsCommandResponse};
use crate::patrons::command::membership_cmd::{MembershipCommand, MembershipCommandRequest, MembershipCommandResponse};
use crate::patrons::command::patron_stats_cmd::{PatronStatsCommand, PatronStatsCommandRequest, PatronStatsCommandResponse};
use crate::patrons::command::remove_patron_cmd::{RemovePatronCommand, RemovePatronCommandRequest, RemovePatronCommandResponse};
use crate::patrons::command::update_patron_cmd::{UpdatePatronCommand, UpdatePatronCommandRequest, UpdatePatronCommandResponse};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::factory;

fn build_service(state: &AppState) -> Arc<dyn PatronRegistry> {
    factory::create_patron_registry(&state.context)
}

pub async fn add_patron(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<AddPatronCommandResponse>, ServerError> {
    let req: AddPatronCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = AddPatronCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_patron_by_id(
    State(state): State<AppState>,
    Path(patron_id): Path<String>) -> Result<Json<GetPatronCommandResponse>, ServerError> {
    let req = GetPatronCommandRequest::new(patron_id);
    let res = GetPatronCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn update_patron(
    State(state): State<AppState>,
    Path(patron_id): Path<String>,
    json: Json<Value>) -> Result<Json<UpdatePatronCommandResponse>, ServerError> {
    let mut body = json.0;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("patron_id".to_string(), Value::String(patron_id));
    }
    let req: UpdatePatronCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = UpdatePatronCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn remove_patron(
    State(state): State<AppState>,
    Path(patron_id): Path<String>) -> Result<Json<RemovePatronCommandResponse>, ServerError> {
    let req = RemovePatronCommandRequest::new(patron_id);
    let res = RemovePatronCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn change_membership(
    State(state): State<AppState>,
    Path(patron_id): Path<String>,
    json: Json<Value>) -> Result<Json<MembershipCommandResponse>, ServerError> {
    let mut body = json.0;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("patron_id".to_string(), Value::String(patron_id));
    }
    let req: MembershipCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = MembershipCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn patron_report(
    State(state): State<AppState>,
    Path(report): Path<String>) -> Result<Json<ListPatronsCommandResponse>, ServerError> {
    let req: ListPatronsCommandRequest = serde_json::from_value(json!({ "report": report })).map_err(json_to_server_error)?;
    let res = ListPatronsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn patron_stats(
    State(state): State<AppState>,
    Path(stats): Path<String>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<PatronStatsCommandResponse>, ServerError> {
    let mut body = json!({ "stats": stats });
    if let Some(limit) = params.get("limit") {
        let limit: usize = limit.parse().map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid limit {}", limit)))?;
        body["limit"] = json!(limit);
    }
    let req: PatronStatsCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let res = PatronStatsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}
