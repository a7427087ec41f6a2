use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::reservations::command::cancel_reservation_cmd::{CancelReservationCommand, CancelReservationCommandRequest, CancelReservationCommandResponse};
use crate::reservations::command::complete_reservation_cmd::{CompleteReservationCommand, CompleteReservationCommandRequest, CompleteReservationCommandResponse};
use crate::reservations::command::expire_cmd::{ExpireReservationsCommand, ExpireReservationsCommandRequest, ExpireReservationsCommandResponse};
use crate::reservations::command::get_reservation_cmd::{GetReservationCommand, GetReservationCommandRequest, GetReservationCommandResponse};
use crate::reservations::command::list_reservations_cmd::{ListReservationsCommand, ListReservationsCommandRequest, ListReservationsCommandResponse};
use crate::reservations::command::notify_cmd::{NotifyReadyCommand, NotifyReadyCommandRequest, NotifyReadyCommandResponse};
use crate::reservations::command::reserve_cmd::{ReserveCommand, ReserveCommandRequest, ReserveCommandResponse};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::factory;

fn build_service(state: &AppState) -> Arc<dyn ReservationQueue> {
    factory::create_reservation_queue(&state.context)
}

pub async fn reserve(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<ReserveCommandResponse>, ServerError> {
    let req: ReserveCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = ReserveCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_reservation_by_id(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>) -> Result<Json<GetReservationCommandResponse>, ServerError> {
    let req = GetReservationCommandRequest::new(reservation_id);
    let res = GetReservationCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>) -> Result<Json<ListReservationsCommandResponse>, ServerError> {
    params.entry("list".to_string()).or_insert_with(|| "pending".to_string());
    let json = serde_json::to_value(params).map_err(json_to_server_error)?;
    let req: ListReservationsCommandRequest = serde_json::from_value(json).map_err(json_to_server_error)?;
    let res = ListReservationsCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>) -> Result<Json<CancelReservationCommandResponse>, ServerError> {
    let req = CancelReservationCommandRequest::new(reservation_id);
    let res = CancelReservationCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn complete_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<String>) -> Result<Json<CompleteReservationCommandResponse>, ServerError> {
    let req = CompleteReservationCommandRequest::new(reservation_id);
    let res = CompleteReservationCommand::new(build_service(&state)).execute(req).await?;
    Ok(Json(res))
}

pub async fn notify_ready(
    State(state): State<AppState>) -> Result<Json<NotifyReadyCommandResponse>, ServerError> {
    let res = NotifyReadyCommand::new(build_service(&state)).execute(NotifyReadyCommandRequest::default()).await?;
    Ok(Json(res))
}

pub async fn expire_lapsed(
    State(state): State<AppState>) -> Result<Json<ExpireReservationsCommandResponse>, ServerError> {
    let res = ExpireReservationsCommand::new(build_service(&state)).execute(ExpireReservationsCommandRequest::default()).await?;
    Ok(Json(res))
}
