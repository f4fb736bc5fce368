use crate::bucket::Period;
use crate::correlate::{correlate, CorrelationResult};
use crate::errors::AppError;
use crate::models::{
    DashboardResponse, DrinkLogRecord, HealthPoint, MoodPoint, MoodRecord, PeriodQuery,
    SavedDrink, SpendingPoint,
};
use crate::normalize::{
    normalize_drink, normalize_mood, normalize_saved_drink, RawDrinkLog, RawMoodRecord,
    RawSavedDrink,
};
use crate::state::AppState;
use crate::stats::{build_dashboard, health_series, mood_series, spending_series};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Utc;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.store.snapshot().await;
    let dashboard = build_dashboard(&data, &state.calendar);
    let mut recent = data.drinks;
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Html(render_index(&dashboard, &recent, &state.calendar))
}

pub async fn list_drinks(State(state): State<AppState>) -> Json<Vec<DrinkLogRecord>> {
    let mut drinks = state.store.list_drinks().await;
    drinks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Json(drinks)
}

pub async fn create_drink(
    State(state): State<AppState>,
    Json(payload): Json<RawDrinkLog>,
) -> Result<(StatusCode, Json<DrinkLogRecord>), AppError> {
    let record = normalize_drink(payload, Utc::now())?;
    let stored = state.store.append_drink(record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store.remove_drink(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no drink log with id {id}")))
    }
}

pub async fn list_moods(State(state): State<AppState>) -> Json<Vec<MoodRecord>> {
    let mut moods = state.store.list_moods().await;
    moods.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Json(moods)
}

pub async fn save_mood(
    State(state): State<AppState>,
    Json(payload): Json<RawMoodRecord>,
) -> Result<Json<MoodRecord>, AppError> {
    let record = normalize_mood(payload, Utc::now())?;
    let stored = state.store.upsert_mood(record, &state.calendar).await?;
    Ok(Json(stored))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store.remove_mood(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no mood entry with id {id}")))
    }
}

pub async fn list_saved_drinks(State(state): State<AppState>) -> Json<Vec<SavedDrink>> {
    Json(state.store.list_saved_drinks().await)
}

pub async fn save_drink(
    State(state): State<AppState>,
    Json(payload): Json<RawSavedDrink>,
) -> Result<Json<SavedDrink>, AppError> {
    let candidate = normalize_saved_drink(payload, Utc::now())?;
    let saved = state.store.save_drink(candidate).await?;
    Ok(Json(saved))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let data = state.store.snapshot().await;
    Json(build_dashboard(&data, &state.calendar))
}

pub async fn spending_chart(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<SpendingPoint>>, AppError> {
    let period = parse_period(query)?;
    let drinks = state.store.list_drinks().await;
    Ok(Json(spending_series(&drinks, period, &state.calendar)))
}

pub async fn health_chart(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<HealthPoint>>, AppError> {
    let period = parse_period(query)?;
    let drinks = state.store.list_drinks().await;
    Ok(Json(health_series(&drinks, period, &state.calendar)))
}

pub async fn mood_chart(State(state): State<AppState>) -> Json<Vec<MoodPoint>> {
    let moods = state.store.list_moods().await;
    Json(mood_series(&moods, Utc::now(), &state.calendar))
}

pub async fn get_correlation(State(state): State<AppState>) -> Json<CorrelationResult> {
    let data = state.store.snapshot().await;
    Json(correlate(&data.drinks, &data.moods, &state.calendar))
}

fn parse_period(query: PeriodQuery) -> Result<Period, AppError> {
    match query.period {
        Some(value) => Ok(value.parse::<Period>()?),
        None => Ok(Period::default()),
    }
}
