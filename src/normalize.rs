//! Turns loosely-shaped JSON (form posts, older data files) into well-typed
//! records. This is the only place numeric fields are coerced; everything
//! downstream assumes finite, non-negative amounts.

use crate::models::{AppData, DrinkLogRecord, MoodRecord, SavedDrink};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub const DEFAULT_QUANTITY: u32 = 1;
pub const NEUTRAL_MOOD: u8 = 3;
pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("stored entry has no timestamp")]
    MissingTimestamp,
    #[error("drink needs a name")]
    MissingName,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDrinkLog {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub brand: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default, alias = "volume")]
    pub volume_ml: Value,
    #[serde(default, alias = "abv")]
    pub abv_percent: Value,
    #[serde(default)]
    pub calories: Value,
    #[serde(default, alias = "carbs")]
    pub carbs_g: Value,
    #[serde(default, alias = "sugar")]
    pub sugar_g: Value,
    #[serde(default, alias = "price")]
    pub unit_price: Value,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default, alias = "date")]
    pub timestamp: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMoodRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default, alias = "date")]
    pub timestamp: Value,
    #[serde(default, alias = "mood")]
    pub mood_level: Value,
    #[serde(default)]
    pub notes: Value,
    #[serde(default)]
    pub tags: Value,
}

/// A catalog entry as posted by a client; usage timestamps are server-side.
#[derive(Debug, Default, Deserialize)]
pub struct RawSavedDrink {
    #[serde(default)]
    pub brand: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default, rename = "type")]
    pub drink_type: Value,
    #[serde(default, alias = "volume")]
    pub volume_ml: Value,
    #[serde(default, alias = "abv", alias = "alcohol_percentage")]
    pub abv_percent: Value,
    #[serde(default)]
    pub calories: Value,
    #[serde(default, alias = "carbs")]
    pub carbs_g: Value,
    #[serde(default, alias = "sugar")]
    pub sugar_g: Value,
    #[serde(default, alias = "price", alias = "cost")]
    pub unit_price: Value,
}

/// On-disk shape before validation. Entries stay as raw values so one bad
/// entry cannot fail the whole file.
#[derive(Debug, Default, Deserialize)]
pub struct RawAppData {
    #[serde(default)]
    pub drinks: Vec<Value>,
    #[serde(default)]
    pub moods: Vec<Value>,
    #[serde(default)]
    pub saved_drinks: Vec<Value>,
}

/// Result of validating a data file. `repaired` counts entries whose id had
/// to be generated; the caller writes those back so ids stay stable.
#[derive(Debug, Default)]
pub struct NormalizedData {
    pub data: AppData,
    pub repaired: usize,
    pub skipped: usize,
}

/// Validates a submitted drink. A missing timestamp means "logged now".
pub fn normalize_drink(raw: RawDrinkLog, now: DateTime<Utc>) -> Result<DrinkLogRecord, NormalizeError> {
    build_drink(raw, Some(now))
}

/// Validates a submitted mood. A missing timestamp means "now".
pub fn normalize_mood(raw: RawMoodRecord, now: DateTime<Utc>) -> Result<MoodRecord, NormalizeError> {
    build_mood(raw, Some(now))
}

pub fn normalize_saved_drink(raw: RawSavedDrink, now: DateTime<Utc>) -> Result<SavedDrink, NormalizeError> {
    let name = text(&raw.name);
    if name.is_empty() {
        return Err(NormalizeError::MissingName);
    }

    Ok(SavedDrink {
        id: Uuid::new_v4().to_string(),
        brand: text(&raw.brand),
        name,
        drink_type: text(&raw.drink_type),
        volume_ml: amount(&raw.volume_ml),
        abv_percent: amount(&raw.abv_percent),
        calories: amount(&raw.calories),
        carbs_g: amount(&raw.carbs_g),
        sugar_g: amount(&raw.sugar_g),
        unit_price: amount(&raw.unit_price),
        created_at: now,
        last_used_at: now,
    })
}

/// Validates every stored entry, dropping the ones that cannot be repaired.
/// Stored entries must carry their own timestamp; there is no "now" to fall
/// back on when reading history.
pub fn normalize_data(raw: RawAppData) -> NormalizedData {
    let mut repaired = 0;
    let mut skipped = 0;

    let mut drinks = Vec::with_capacity(raw.drinks.len());
    for value in raw.drinks {
        let parsed = serde_json::from_value::<RawDrinkLog>(value)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                let needs_id = text(&raw.id).is_empty();
                build_drink(raw, None)
                    .map(|record| (record, needs_id))
                    .map_err(|err| err.to_string())
            });
        match parsed {
            Ok((record, needs_id)) => {
                repaired += usize::from(needs_id);
                drinks.push(record);
            }
            Err(err) => {
                skipped += 1;
                warn!("skipping stored drink log: {err}");
            }
        }
    }

    let mut moods = Vec::with_capacity(raw.moods.len());
    for value in raw.moods {
        let parsed = serde_json::from_value::<RawMoodRecord>(value)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                let needs_id = text(&raw.id).is_empty();
                build_mood(raw, None)
                    .map(|record| (record, needs_id))
                    .map_err(|err| err.to_string())
            });
        match parsed {
            Ok((record, needs_id)) => {
                repaired += usize::from(needs_id);
                moods.push(record);
            }
            Err(err) => {
                skipped += 1;
                warn!("skipping stored mood entry: {err}");
            }
        }
    }

    let mut saved_drinks = Vec::with_capacity(raw.saved_drinks.len());
    for value in raw.saved_drinks {
        match serde_json::from_value::<SavedDrink>(value) {
            Ok(saved) => saved_drinks.push(saved),
            Err(err) => {
                skipped += 1;
                warn!("skipping saved drink: {err}");
            }
        }
    }

    NormalizedData {
        data: AppData {
            drinks,
            moods,
            saved_drinks,
        },
        repaired,
        skipped,
    }
}

fn build_drink(raw: RawDrinkLog, now: Option<DateTime<Utc>>) -> Result<DrinkLogRecord, NormalizeError> {
    let name = text(&raw.name);
    if name.is_empty() {
        return Err(NormalizeError::MissingName);
    }

    Ok(DrinkLogRecord {
        id: identifier(&raw.id),
        brand: text(&raw.brand),
        name,
        volume_ml: amount(&raw.volume_ml),
        abv_percent: amount(&raw.abv_percent),
        calories: amount(&raw.calories),
        carbs_g: amount(&raw.carbs_g),
        sugar_g: amount(&raw.sugar_g),
        unit_price: amount(&raw.unit_price),
        quantity: quantity(&raw.quantity),
        timestamp: timestamp(&raw.timestamp, now)?,
    })
}

fn build_mood(raw: RawMoodRecord, now: Option<DateTime<Utc>>) -> Result<MoodRecord, NormalizeError> {
    let notes = text(&raw.notes);

    Ok(MoodRecord {
        id: identifier(&raw.id),
        timestamp: timestamp(&raw.timestamp, now)?,
        mood_level: mood_level(&raw.mood_level),
        notes: (!notes.is_empty()).then_some(notes),
        tags: tags(&raw.tags),
    })
}

/// Finite number from a JSON number or numeric string.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn amount(value: &Value) -> f64 {
    number(value).filter(|n| *n > 0.0).unwrap_or(0.0)
}

fn quantity(value: &Value) -> u32 {
    match number(value) {
        Some(n) if n >= 1.0 => n.floor().min(f64::from(u32::MAX)) as u32,
        _ => DEFAULT_QUANTITY,
    }
}

fn mood_level(value: &Value) -> u8 {
    match number(value) {
        Some(n) => n.round().clamp(f64::from(MIN_MOOD), f64::from(MAX_MOOD)) as u8,
        None => NEUTRAL_MOOD,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn identifier(value: &Value) -> String {
    let id = text(value);
    if id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id
    }
}

fn tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn timestamp(value: &Value, now: Option<DateTime<Utc>>) -> Result<DateTime<Utc>, NormalizeError> {
    match value {
        Value::Null => now.ok_or(NormalizeError::MissingTimestamp),
        Value::String(s) if s.trim().is_empty() => now.ok_or(NormalizeError::MissingTimestamp),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| NormalizeError::InvalidTimestamp(s.clone())),
        other => Err(NormalizeError::InvalidTimestamp(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn drink_from(value: Value) -> Result<DrinkLogRecord, NormalizeError> {
        normalize_drink(serde_json::from_value(value).unwrap(), now())
    }

    #[test]
    fn corrupt_quantity_and_price_contribute_no_spend() {
        let record = drink_from(json!({ "name": "Mystery", "quantity": "abc", "price": null })).unwrap();
        assert_eq!(record.quantity, DEFAULT_QUANTITY);
        assert_eq!(record.unit_price, 0.0);

        let totals = summarize(&[record]);
        assert_eq!(totals.total_spend, 0.0);
        assert!(totals.total_calories.is_finite());
    }

    #[test]
    fn numeric_strings_are_accepted_and_junk_is_zeroed() {
        let record = drink_from(json!({
            "brand": "  Heineken ",
            "name": "Lager",
            "volume": "330",
            "abv": 5,
            "calories": "NaN",
            "carbs": -4,
            "sugar": { "g": 1 },
            "price": "2.50",
            "quantity": 2.9
        }))
        .unwrap();

        assert_eq!(record.brand, "Heineken");
        assert_eq!(record.volume_ml, 330.0);
        assert_eq!(record.abv_percent, 5.0);
        assert_eq!(record.calories, 0.0);
        assert_eq!(record.carbs_g, 0.0);
        assert_eq!(record.sugar_g, 0.0);
        assert_eq!(record.unit_price, 2.5);
        assert_eq!(record.quantity, 2);
        assert_eq!(record.timestamp, now());
        assert!(!record.id.is_empty());
    }

    #[test]
    fn drink_without_name_is_rejected() {
        assert_eq!(drink_from(json!({ "price": 4 })), Err(NormalizeError::MissingName));
        assert_eq!(
            drink_from(json!({ "brand": "Guinness", "name": "  " })),
            Err(NormalizeError::MissingName)
        );
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let err = drink_from(json!({ "name": "Cider", "date": "yesterday-ish" })).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidTimestamp("yesterday-ish".into()));
    }

    #[test]
    fn offset_timestamps_are_stored_as_utc() {
        let record = drink_from(json!({ "name": "Cider", "timestamp": "2024-01-01T02:00:00+02:00" })).unwrap();
        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn mood_defaults_to_neutral_and_clamps() {
        let mood = |value: Value| normalize_mood(serde_json::from_value(value).unwrap(), now()).unwrap();

        assert_eq!(mood(json!({})).mood_level, NEUTRAL_MOOD);
        assert_eq!(mood(json!({ "mood": "great" })).mood_level, NEUTRAL_MOOD);
        assert_eq!(mood(json!({ "mood": 9 })).mood_level, MAX_MOOD);
        assert_eq!(mood(json!({ "mood_level": 0 })).mood_level, MIN_MOOD);

        let entry = mood(json!({
            "id": "m1",
            "mood": 4,
            "notes": "   ",
            "tags": ["Social", 7, " ", "Social"]
        }));
        assert_eq!(entry.id, "m1");
        assert_eq!(entry.notes, None);
        assert_eq!(entry.tags, vec!["Social".to_string(), "Social".to_string()]);
    }

    #[test]
    fn stored_data_skips_unrepairable_entries() {
        let raw: RawAppData = serde_json::from_value(json!({
            "drinks": [
                { "id": "a", "name": "Porter", "price": 6, "quantity": 1, "date": "2024-05-01T20:00:00Z" },
                { "id": "b", "name": "Porter", "date": "not a date" },
                42
            ],
            "moods": [
                { "id": "m", "mood": 2, "date": "2024-05-01T08:00:00Z" }
            ]
        }))
        .unwrap();

        let loaded = normalize_data(raw);
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.repaired, 0);
        let data = loaded.data;
        assert_eq!(data.drinks.len(), 1);
        assert_eq!(data.drinks[0].id, "a");
        assert_eq!(data.moods.len(), 1);
        assert_eq!(data.moods[0].mood_level, 2);
    }

    #[test]
    fn stored_entries_need_their_own_timestamp() {
        let raw: RawAppData = serde_json::from_value(json!({
            "drinks": [
                { "name": "Old Ale", "price": 4 },
                { "name": "Bitter", "date": "2024-05-02T19:00:00Z" }
            ],
            "moods": [
                { "mood": 4 }
            ]
        }))
        .unwrap();

        let loaded = normalize_data(raw);
        assert_eq!(loaded.data.drinks.len(), 1);
        assert_eq!(loaded.data.drinks[0].name, "Bitter");
        assert!(loaded.data.moods.is_empty());
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.repaired, 1);
    }

    #[test]
    fn saved_drink_requires_name_and_stamps_usage() {
        let saved = normalize_saved_drink(
            serde_json::from_value(json!({ "name": "Pilsner", "type": "beer", "price": "3.5" })).unwrap(),
            now(),
        )
        .unwrap();
        assert_eq!(saved.drink_type, "beer");
        assert_eq!(saved.unit_price, 3.5);
        assert_eq!(saved.created_at, now());
        assert_eq!(saved.last_used_at, now());

        let err = normalize_saved_drink(serde_json::from_value(json!({ "type": "wine" })).unwrap(), now());
        assert_eq!(err, Err(NormalizeError::MissingName));
    }
}
