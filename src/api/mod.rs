use axum::Json;
use axum::extract::{Path, State};
use axum::{Router, http::StatusCode, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let healthy = state.courses.check_health().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthStatus { healthy }))
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.courses.get_courses().await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses.get_course(id).await?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses.create_course(req).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses.update_course(id, req).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let ok = state.courses.delete_course(id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
