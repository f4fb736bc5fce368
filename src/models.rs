use crate::aggregate::DrinkTotals;
use crate::correlate::CorrelationResult;
use crate::stats::TrendCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkLogRecord {
    pub id: String,
    pub brand: String,
    pub name: String,
    pub volume_ml: f64,
    pub abv_percent: f64,
    pub calories: f64,
    pub carbs_g: f64,
    pub sugar_g: f64,
    pub unit_price: f64,
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
}

impl DrinkLogRecord {
    pub fn spend(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    pub fn total_calories(&self) -> f64 {
        self.calories * f64::from(self.quantity)
    }

    /// Brand and name joined for display, skipping whichever is empty.
    pub fn display_name(&self) -> String {
        match (self.brand.is_empty(), self.name.is_empty()) {
            (false, false) => format!("{} {}", self.brand, self.name),
            (false, true) => self.brand.clone(),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub mood_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Catalog entry for a drink the user logs repeatedly. One entry per
/// (name, type); logging it again only bumps `last_used_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDrink {
    pub id: String,
    pub brand: String,
    pub name: String,
    #[serde(rename = "type")]
    pub drink_type: String,
    pub volume_ml: f64,
    pub abv_percent: f64,
    pub calories: f64,
    pub carbs_g: f64,
    pub sugar_g: f64,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub drinks: Vec<DrinkLogRecord>,
    pub moods: Vec<MoodRecord>,
    #[serde(default)]
    pub saved_drinks: Vec<SavedDrink>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpendingPoint {
    pub key: String,
    pub label: String,
    pub spending: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthPoint {
    pub key: String,
    pub label: String,
    pub calories_from_alcohol: f64,
    pub calories_from_carbs: f64,
    pub calories_from_sugar: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodPoint {
    pub date: String,
    pub label: String,
    pub mood: u8,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub totals: DrinkTotals,
    pub drink_entries: usize,
    pub average_mood: Option<f64>,
    pub mood_entries: usize,
    pub trends: Vec<TrendCard>,
    pub correlation: CorrelationResult,
}
