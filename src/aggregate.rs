//! Numeric rollups over drink logs and mood entries.
//!
//! Inputs are expected to be normalized already (finite, non-negative
//! amounts, quantity >= 1), see [`crate::normalize`].

use crate::models::{DrinkLogRecord, MoodRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Roughly 3500 kcal per pound of body fat. An approximation, not a measurement.
pub const KCAL_PER_POUND: f64 = 3500.0;

/// Both sugar and other carbohydrates are counted at 4 kcal per gram.
pub const KCAL_PER_GRAM_CARB: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DrinkTotals {
    pub total_quantity: u64,
    pub total_spend: f64,
    pub total_calories: f64,
    pub estimated_weight_gain_lbs: f64,
}

impl DrinkTotals {
    fn add(&mut self, record: &DrinkLogRecord) {
        self.total_quantity = self.total_quantity.saturating_add(u64::from(record.quantity));
        self.total_spend += record.spend();
        self.total_calories += record.total_calories();
        self.estimated_weight_gain_lbs = self.total_calories / KCAL_PER_POUND;
    }
}

pub fn summarize<'a, I>(records: I) -> DrinkTotals
where
    I: IntoIterator<Item = &'a DrinkLogRecord>,
{
    let mut totals = DrinkTotals::default();
    for record in records {
        totals.add(record);
    }
    totals
}

/// Totals for records logged in the half-open range `[start, end)`.
pub fn totals_between(
    records: &[DrinkLogRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DrinkTotals {
    summarize(
        records
            .iter()
            .filter(|record| record.timestamp >= start && record.timestamp < end),
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CalorieBreakdown {
    pub sugar_calories: f64,
    pub other_carb_calories: f64,
    pub alcohol_or_other_calories: f64,
}

impl CalorieBreakdown {
    pub fn of(record: &DrinkLogRecord) -> Self {
        let quantity = f64::from(record.quantity);
        let sugar_calories = record.sugar_g * quantity * KCAL_PER_GRAM_CARB;
        let carb_calories = record.carbs_g * quantity * KCAL_PER_GRAM_CARB;
        // Declared calories can be lower than declared carbs imply; never chart a negative segment.
        let alcohol_or_other_calories = (record.total_calories() - carb_calories).max(0.0);

        Self {
            sugar_calories,
            other_carb_calories: carb_calories - sugar_calories,
            alcohol_or_other_calories,
        }
    }

    pub fn total(&self) -> f64 {
        self.sugar_calories + self.other_carb_calories + self.alcohol_or_other_calories
    }
}

pub fn calorie_breakdown<'a, I>(records: I) -> CalorieBreakdown
where
    I: IntoIterator<Item = &'a DrinkLogRecord>,
{
    records
        .into_iter()
        .map(CalorieBreakdown::of)
        .fold(CalorieBreakdown::default(), |acc, part| CalorieBreakdown {
            sugar_calories: acc.sugar_calories + part.sugar_calories,
            other_carb_calories: acc.other_carb_calories + part.other_carb_calories,
            alcohol_or_other_calories: acc.alcohol_or_other_calories
                + part.alcohol_or_other_calories,
        })
}

/// Mean mood level, or `None` for an empty set.
pub fn average_mood<'a, I>(moods: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a MoodRecord>,
{
    let (sum, count) = moods
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), mood| {
            (sum + u64::from(mood.mood_level), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
