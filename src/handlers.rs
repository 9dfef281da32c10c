use crate::db::{Db, Row};
use crate::error::ApiError;
use crate::models::{from_row, Message, User, UserPayload, Video, VideoPayload};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

const USER_NOT_FOUND: &str = "User not found";
const VIDEO_NOT_FOUND: &str = "Video not found";

fn first<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Option<T>, ApiError> {
    match rows.into_iter().next() {
        Some(row) => Ok(Some(from_row(row)?)),
        None => Ok(None),
    }
}

fn all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, ApiError> {
    Ok(rows
        .into_iter()
        .map(from_row)
        .collect::<Result<Vec<T>, _>>()?)
}

pub async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "UP" }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found")
}

pub async fn create_user(
    State(db): State<Db>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let user = payload.validate()?;
    let now = Utc::now().to_rfc3339();

    let rows = db
        .execute(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING *",
            vec![user.name.into(), user.email.into(), now.into()],
        )
        .await?;

    let created: User = first(rows)?.ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    tracing::debug!(user_id = created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(State(db): State<Db>) -> Result<Json<Vec<User>>, ApiError> {
    let rows = db
        .execute("SELECT * FROM users ORDER BY id DESC", vec![])
        .await?;
    Ok(Json(all(rows)?))
}

pub async fn get_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let rows = db
        .execute("SELECT * FROM users WHERE id = ?1", vec![id.into()])
        .await?;
    first(rows)?
        .map(Json)
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))
}

pub async fn update_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(payload) = payload?;
    let user = payload.validate()?;

    let rows = db
        .execute(
            "UPDATE users SET name = ?1, email = ?2, updated_at = ?3 WHERE id = ?4 RETURNING *",
            vec![
                user.name.into(),
                user.email.into(),
                Utc::now().to_rfc3339().into(),
                id.into(),
            ],
        )
        .await?;

    let updated: User = first(rows)?.ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    tracing::debug!(user_id = updated.id, "user updated");
    Ok(Json(updated))
}

pub async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let rows = db
        .execute("DELETE FROM users WHERE id = ?1 RETURNING id", vec![id.clone().into()])
        .await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    tracing::debug!(user_id = %id, "user deleted");
    Ok(Json(Message {
        message: "User deleted successfully".to_string(),
    }))
}

pub async fn create_video(
    State(db): State<Db>,
    payload: Result<Json<VideoPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let video = payload.validate()?;
    let now = Utc::now().to_rfc3339();

    let rows = db
        .execute(
            "INSERT INTO videos (title, url, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING *",
            vec![
                video.title.into(),
                video.url.into(),
                video.description.into(),
                now.into(),
            ],
        )
        .await?;

    let created: Video = first(rows)?.ok_or(ApiError::NotFound(VIDEO_NOT_FOUND))?;
    tracing::debug!(video_id = created.id, "video created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_videos(State(db): State<Db>) -> Result<Json<Vec<Video>>, ApiError> {
    let rows = db
        .execute("SELECT * FROM videos ORDER BY id DESC", vec![])
        .await?;
    Ok(Json(all(rows)?))
}

pub async fn get_video(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Video>, ApiError> {
    let rows = db
        .execute("SELECT * FROM videos WHERE id = ?1", vec![id.into()])
        .await?;
    first(rows)?
        .map(Json)
        .ok_or(ApiError::NotFound(VIDEO_NOT_FOUND))
}

pub async fn update_video(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<VideoPayload>, JsonRejection>,
) -> Result<Json<Video>, ApiError> {
    let Json(payload) = payload?;
    let video = payload.validate()?;

    let rows = db
        .execute(
            "UPDATE videos SET title = ?1, url = ?2, description = ?3, updated_at = ?4 WHERE id = ?5 RETURNING *",
            vec![
                video.title.into(),
                video.url.into(),
                video.description.into(),
                Utc::now().to_rfc3339().into(),
                id.into(),
            ],
        )
        .await?;

    let updated: Video = first(rows)?.ok_or(ApiError::NotFound(VIDEO_NOT_FOUND))?;
    tracing::debug!(video_id = updated.id, "video updated");
    Ok(Json(updated))
}

pub async fn delete_video(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let rows = db
        .execute("DELETE FROM videos WHERE id = ?1 RETURNING id", vec![id.clone().into()])
        .await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(VIDEO_NOT_FOUND));
    }

    tracing::debug!(video_id = %id, "video deleted");
    Ok(Json(Message {
        message: "Video deleted successfully".to_string(),
    }))
}
