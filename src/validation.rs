use sea_orm::Set;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{IntField, MoviePatch, MoviePayload, NewMovie},
};

pub const DEFAULT_DESCRIPTION: &str = "No description provided";

pub const MOVIE_NOT_FOUND: &str = "Movie not found";
pub const DUPLICATE_TITLE: &str = "Movie already exists in the database";
pub const INVALID_RELEASE_YEAR: &str = "release_year needs to be a positive 4-integer value";
pub const INVALID_DURATION: &str = "duration_minutes needs to be an integer greater than 0";
pub const INVALID_RATING: &str = "rating needs to be an integer";

const TITLE_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 250;

pub fn is_invalid_release_year(value: Option<&IntField>) -> bool {
    match value {
        None => false,
        Some(IntField::Int(year)) => !(1000..=9999).contains(year),
        Some(IntField::Invalid(_)) => true,
    }
}

pub fn is_invalid_duration_minutes(value: Option<&IntField>) -> bool {
    match value {
        None => false,
        Some(IntField::Int(minutes)) => *minutes <= 0,
        Some(IntField::Invalid(_)) => true,
    }
}

pub fn is_invalid_rating(value: Option<&IntField>) -> bool {
    matches!(value, Some(IntField::Invalid(_)))
}

/// Runs the three numeric predicates in order and reports the first failure.
fn check_numbers(
    release_year: Option<&IntField>,
    duration_minutes: Option<&IntField>,
    rating: Option<&IntField>,
) -> AppResult<()> {
    if is_invalid_release_year(release_year) {
        return Err(AppError::conflict(INVALID_RELEASE_YEAR));
    }
    if is_invalid_duration_minutes(duration_minutes) {
        return Err(AppError::conflict(INVALID_DURATION));
    }
    if is_invalid_rating(rating) {
        return Err(AppError::conflict(INVALID_RATING));
    }
    Ok(())
}

fn check_lengths(title: Option<&str>, description: Option<&str>) -> AppResult<()> {
    if title.is_some_and(|t| t.chars().count() > TITLE_MAX_CHARS) {
        return Err(AppError::conflict(format!(
            "title needs to be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(AppError::conflict(format!(
            "description needs to be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Narrows a release year that already passed `is_invalid_release_year`.
fn year_of(value: Option<&IntField>) -> Option<i32> {
    value.and_then(IntField::as_int).and_then(|year| i32::try_from(year).ok())
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::conflict(format!("{field} is required")))
}

/// Validates a create/replace payload and fills in the column defaults.
pub fn into_new_movie(payload: MoviePayload) -> AppResult<NewMovie> {
    check_numbers(
        payload.release_year.as_ref(),
        payload.duration_minutes.as_ref(),
        payload.rating.as_ref(),
    )?;

    let title = required(payload.title, "title")?;
    let release_year = required(year_of(payload.release_year.as_ref()), "release_year")?;
    let duration_minutes = required(
        payload.duration_minutes.as_ref().and_then(IntField::as_int),
        "duration_minutes",
    )?;
    let description = payload.description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let rating = payload.rating.as_ref().and_then(IntField::as_int).unwrap_or(0);

    check_lengths(Some(title.as_str()), Some(description.as_str()))?;

    Ok(NewMovie { title, description, release_year, duration_minutes, rating })
}

/// Folds a partial update into the stored movie.
///
/// Strings and the two required numbers are only written when truthy; rating
/// is written whenever it is an integer, so `0` is kept. Nothing is written
/// if any field fails validation.
pub fn apply_patch(current: movie::Model, patch: MoviePatch) -> AppResult<movie::ActiveModel> {
    check_numbers(
        patch.release_year.as_ref(),
        patch.duration_minutes.as_ref(),
        patch.rating.as_ref(),
    )?;

    let title = patch.title.filter(|t| !t.is_empty());
    let description = patch.description.filter(|d| !d.is_empty());
    check_lengths(title.as_deref(), description.as_deref())?;

    let mut active: movie::ActiveModel = current.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(year) = year_of(patch.release_year.as_ref()).filter(|y| *y != 0) {
        active.release_year = Set(year);
    }
    if let Some(minutes) =
        patch.duration_minutes.as_ref().and_then(IntField::as_int).filter(|m| *m != 0)
    {
        active.duration_minutes = Set(minutes);
    }
    if let Some(rating) = patch.rating.as_ref().and_then(IntField::as_int) {
        active.rating = Set(rating);
    }
    Ok(active)
}
