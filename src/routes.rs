use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::WithRejection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Movie, MoviePatch, MoviePayload, TitleQuery},
    validation::{self, DUPLICATE_TITLE},
};

type MovieId = WithRejection<Path<i32>, AppError>;
type Body<T> = WithRejection<Json<T>, AppError>;
type Params<T> = WithRejection<Query<T>, AppError>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movie", get(search_title).post(create_movie))
        .route(
            "/movie/{id}",
            get(get_movie).put(update_movie).patch(patch_movie).delete(delete_movie),
        )
        .route("/movie/{id}/like", get(like_movie))
        .route("/movie/{id}/dislike", get(dislike_movie))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): Body<MoviePayload>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    if let Some(title) = payload.title.as_deref() {
        if state.store.find_by_title(title).await?.is_some() {
            return Err(AppError::conflict(DUPLICATE_TITLE));
        }
    }

    let new = validation::into_new_movie(payload)?;
    let movie = state.store.insert(new).await?;
    debug!(id = movie.id, title = %movie.title, "movie created");

    Ok((StatusCode::CREATED, Json(movie.into())))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<Json<Movie>> {
    let movie = state.store.find(id).await?.ok_or_else(AppError::not_found)?;
    Ok(Json(movie.into()))
}

pub async fn search_title(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(q), _): Params<TitleQuery>,
) -> AppResult<Json<Movie>> {
    let Some(title) = q.title else {
        return Err(AppError::not_found());
    };
    let movie = state.store.find_by_title(&title).await?.ok_or_else(AppError::not_found)?;
    Ok(Json(movie.into()))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
    WithRejection(Json(payload), _): Body<MoviePayload>,
) -> AppResult<Json<Movie>> {
    let current = state.store.find(id).await?.ok_or_else(AppError::not_found)?;

    let new = validation::into_new_movie(payload)?;
    let movie = state.store.replace(current, new).await?;
    debug!(id, "movie replaced");

    Ok(Json(movie.into()))
}

pub async fn patch_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
    WithRejection(Json(patch), _): Body<MoviePatch>,
) -> AppResult<Json<Movie>> {
    let current = state.store.find(id).await?.ok_or_else(AppError::not_found)?;

    let changes = validation::apply_patch(current, patch)?;
    let movie = state.store.save(changes).await?;
    debug!(id, "movie patched");

    Ok(Json(movie.into()))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<StatusCode> {
    if !state.store.delete(id).await? {
        return Err(AppError::not_found());
    }
    debug!(id, "movie deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<Json<Movie>> {
    vote(&state, id, 1).await
}

pub async fn dislike_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): MovieId,
) -> AppResult<Json<Movie>> {
    vote(&state, id, -1).await
}

async fn vote(state: &AppState, id: i32, delta: i64) -> AppResult<Json<Movie>> {
    let movie = state.store.adjust_rating(id, delta).await?.ok_or_else(AppError::not_found)?;
    debug!(id, delta, rating = movie.rating, "vote recorded");
    Ok(Json(movie.into()))
}
