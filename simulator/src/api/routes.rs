use crate::api::store::{
    available_models, now, read_state, write_state, SharedState, StoreError, DEFAULT_HISTORY_HOURS,
};
use crowdcore::api_interface::{RoomCreate, RoomUpdate, SettingsUpdate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    hours: Option<u32>,
}

fn json_reply<T: Serialize>(value: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

fn error_reply(status: StatusCode, detail: impl Into<String>) -> Response {
    json_reply(
        &ErrorBody {
            detail: detail.into(),
        },
        status,
    )
}

fn store_error(err: StoreError) -> Response {
    let status = match err {
        StoreError::RoomNotFound | StoreError::NoPreview => StatusCode::NOT_FOUND,
        StoreError::Duplicate => StatusCode::BAD_REQUEST,
        StoreError::Invalid(_) | StoreError::Settings(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_reply(status, err.to_string())
}

fn respond<T: Serialize>(result: Result<T, StoreError>, status: StatusCode) -> Result<Response, Infallible> {
    Ok(match result {
        Ok(value) => json_reply(&value, status),
        Err(err) => store_error(err),
    })
}

fn with_state(state: SharedState) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Every endpoint of the backend contract, plus `/health`.
pub fn routes(state: SharedState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "ok" })));

    let list = warp::path!("api" / "rooms")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_rooms);
    let create = warp::path!("api" / "rooms")
        .and(warp::post())
        .and(json_body::<RoomCreate>())
        .and(with_state(state.clone()))
        .and_then(create_room);
    let get = warp::path!("api" / "rooms" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_room);
    let update = warp::path!("api" / "rooms" / String)
        .and(warp::put())
        .and(json_body::<RoomUpdate>())
        .and(with_state(state.clone()))
        .and_then(update_room);
    let delete = warp::path!("api" / "rooms" / String)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(delete_room);
    let current = warp::path!("api" / "rooms" / String / "current")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(current_count);
    let history = warp::path!("api" / "rooms" / String / "history")
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(with_state(state.clone()))
        .and_then(count_history);
    let preview = warp::path!("api" / "rooms" / String / "preview")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(preview_frame);

    let get_settings = warp::path!("api" / "settings")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(read_settings);
    let put_settings = warp::path!("api" / "settings")
        .and(warp::put())
        .and(json_body::<SettingsUpdate>())
        .and(with_state(state.clone()))
        .and_then(write_settings);
    let models = warp::path!("api" / "models")
        .and(warp::get())
        .map(|| warp::reply::json(&available_models()));
    let status = warp::path!("api" / "status")
        .and(warp::get())
        .and(with_state(state))
        .and_then(system_status);

    health
        .or(list)
        .or(create)
        .or(get)
        .or(update)
        .or(delete)
        .or(current)
        .or(history)
        .or(preview)
        .or(get_settings)
        .or(put_settings)
        .or(models)
        .or(status)
        .recover(handle_rejection)
}

async fn list_rooms(state: SharedState) -> Result<Response, Infallible> {
    let rooms = read_state(&state).list_rooms();
    Ok(json_reply(&rooms, StatusCode::OK))
}

async fn create_room(body: RoomCreate, state: SharedState) -> Result<Response, Infallible> {
    let result = write_state(&state).create_room(body, now());
    if let Ok(room) = &result {
        info!("created room {} ({})", room.id, room.name);
    }
    respond(result, StatusCode::CREATED)
}

async fn get_room(room_id: String, state: SharedState) -> Result<Response, Infallible> {
    let result = read_state(&state).get_room(&room_id);
    respond(result, StatusCode::OK)
}

async fn update_room(
    room_id: String,
    body: RoomUpdate,
    state: SharedState,
) -> Result<Response, Infallible> {
    let result = write_state(&state).update_room(&room_id, &body);
    respond(result, StatusCode::OK)
}

async fn delete_room(room_id: String, state: SharedState) -> Result<Response, Infallible> {
    let result = write_state(&state).delete_room(&room_id);
    Ok(match result {
        Ok(()) => {
            info!("deleted room {}", room_id);
            warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response()
        }
        Err(err) => store_error(err),
    })
}

async fn current_count(room_id: String, state: SharedState) -> Result<Response, Infallible> {
    let result = read_state(&state).current(&room_id);
    respond(result, StatusCode::OK)
}

async fn count_history(
    room_id: String,
    query: HistoryQuery,
    state: SharedState,
) -> Result<Response, Infallible> {
    let hours = query.hours.unwrap_or(DEFAULT_HISTORY_HOURS);
    let result = read_state(&state).history(&room_id, hours, now());
    respond(result, StatusCode::OK)
}

async fn preview_frame(room_id: String, state: SharedState) -> Result<Response, Infallible> {
    let result = read_state(&state).preview(&room_id);
    respond(result, StatusCode::OK)
}

async fn read_settings(state: SharedState) -> Result<Response, Infallible> {
    let settings = read_state(&state).settings().clone();
    Ok(json_reply(&settings, StatusCode::OK))
}

async fn write_settings(body: SettingsUpdate, state: SharedState) -> Result<Response, Infallible> {
    let result = write_state(&state).update_settings(&body);
    if let Ok(settings) = &result {
        info!(
            "settings updated: model {} confidence {} alpha {}",
            settings.model, settings.confidence_threshold, settings.smoothing_alpha
        );
    }
    respond(result, StatusCode::OK)
}

async fn system_status(state: SharedState) -> Result<Response, Infallible> {
    let status = read_state(&state).status(now());
    Ok(json_reply(&status, StatusCode::OK))
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }
    if let Some(cause) = err.find::<BodyDeserializeError>() {
        return Ok(error_reply(StatusCode::UNPROCESSABLE_ENTITY, cause.to_string()));
    }
    if let Some(cause) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(StatusCode::UNPROCESSABLE_ENTITY, cause.to_string()));
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }
    warn!("unhandled rejection: {:?}", err);
    Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
}
