use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::codec::{self, flat, ModelView};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::*;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Vehicle models
// ============================================================

/// Query parameters selecting the document shape for model endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: ModelView,
}

pub async fn list_models(
    State(db): State<Database>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<Value>>> {
    let models = db.get_all_models()?;
    let docs = models
        .iter()
        .map(|m| codec::encode_model(&db, m, query.view))
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(docs))
}

pub async fn get_model(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Value>> {
    let model = db
        .get_model(id)?
        .ok_or_else(|| Error::not_found(format!("vehicle model {id} not found")))?;
    Ok(Json(codec::encode_model(&db, &model, query.view)?))
}

pub async fn create_model(
    State(db): State<Database>,
    Query(query): Query<ViewQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let draft = codec::decode_model(&db, &body, query.view, false)?;
    let model = db.create_vehicle_model(draft)?;
    let doc = codec::encode_model(&db, &model, query.view)?;
    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn replace_model(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Query(query): Query<ViewQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    update_model(&db, id, query.view, &body, false).map(Json)
}

pub async fn patch_model(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Query(query): Query<ViewQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    update_model(&db, id, query.view, &body, true).map(Json)
}

fn update_model(
    db: &Database,
    id: i64,
    view: ModelView,
    body: &Value,
    partial: bool,
) -> Result<Value> {
    let existing = db
        .get_model(id)?
        .ok_or_else(|| Error::not_found(format!("vehicle model {id} not found")))?;
    let draft = codec::decode_model(db, body, view, partial)?;
    let updated = db.update_vehicle_model(existing, draft)?;
    codec::encode_model(db, &updated, view)
}

pub async fn delete_model(State(db): State<Database>, Path(id): Path<i64>) -> Result<StatusCode> {
    if db.delete_model(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("vehicle model {id} not found")))
    }
}

// ============================================================
// Manufacturers
// ============================================================

pub async fn list_manufacturers(State(db): State<Database>) -> Result<Json<Vec<Manufacturer>>> {
    db.get_all_manufacturers().map(Json)
}

pub async fn get_manufacturer(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Manufacturer>> {
    db.get_manufacturer(id)?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("manufacturer {id} not found")))
}

pub async fn create_manufacturer(
    State(db): State<Database>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Manufacturer>)> {
    let input = flat::decode_manufacturer(&body)?;
    let maker = db.create_manufacturer(input)?;
    Ok((StatusCode::CREATED, Json(maker)))
}

pub async fn delete_manufacturer(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if db.delete_manufacturer(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("manufacturer {id} not found")))
    }
}

// ============================================================
// Engines
// ============================================================

pub async fn list_engines(State(db): State<Database>) -> Result<Json<Vec<Engine>>> {
    db.get_all_engines().map(Json)
}

pub async fn get_engine(State(db): State<Database>, Path(id): Path<i64>) -> Result<Json<Engine>> {
    db.get_engine(id)?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("engine {id} not found")))
}

pub async fn create_engine(
    State(db): State<Database>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Engine>)> {
    let input = flat::decode_engine(&body)?;
    let engine = db.create_engine(input)?;
    Ok((StatusCode::CREATED, Json(engine)))
}

pub async fn delete_engine(State(db): State<Database>, Path(id): Path<i64>) -> Result<StatusCode> {
    if db.delete_engine(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("engine {id} not found")))
    }
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(db): State<Database>) -> Result<Json<Vec<Project>>> {
    db.get_all_projects().map(Json)
}

pub async fn get_project(State(db): State<Database>, Path(id): Path<i64>) -> Result<Json<Project>> {
    db.get_project(id)?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("project {id} not found")))
}

pub async fn create_project(
    State(db): State<Database>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Project>)> {
    let input = flat::decode_project(&body)?;
    let project = db.create_project(input)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn delete_project(State(db): State<Database>, Path(id): Path<i64>) -> Result<StatusCode> {
    if db.delete_project(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("project {id} not found")))
    }
}

// ============================================================
// Vehicles
// ============================================================

pub async fn list_vehicles(State(db): State<Database>) -> Result<Json<Vec<Vehicle>>> {
    db.get_all_vehicles().map(Json)
}

pub async fn get_vehicle(State(db): State<Database>, Path(id): Path<i64>) -> Result<Json<Vehicle>> {
    db.get_vehicle(id)?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("vehicle {id} not found")))
}

pub async fn create_vehicle(
    State(db): State<Database>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vehicle>)> {
    let input = flat::decode_vehicle(&body)?;
    let vehicle = db.create_vehicle(input)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn delete_vehicle(State(db): State<Database>, Path(id): Path<i64>) -> Result<StatusCode> {
    if db.delete_vehicle(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("vehicle {id} not found")))
    }
}

// ============================================================
// Engineers
// ============================================================

pub async fn list_engineers(State(db): State<Database>) -> Result<Json<Vec<Engineer>>> {
    db.get_all_engineers().map(Json)
}

pub async fn get_engineer(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Engineer>> {
    db.get_engineer(id)?
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("engineer {id} not found")))
}

pub async fn create_engineer(
    State(db): State<Database>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Engineer>)> {
    let input = flat::decode_engineer(&body)?;
    let engineer = db.create_engineer(input)?;
    Ok((StatusCode::CREATED, Json(engineer)))
}

pub async fn delete_engineer(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if db.delete_engineer(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found(format!("engineer {id} not found")))
    }
}
