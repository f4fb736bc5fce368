//! Mood on drinking days versus dry days.

use crate::bucket::Calendar;
use crate::models::{DrinkLogRecord, MoodRecord};
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// `correlation_strength` is the plain difference of the two averages
/// (`with - without`), not a Pearson coefficient. Its scale is mood points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub average_mood_with_drinks: f64,
    pub average_mood_without_drinks: f64,
    pub correlation_strength: f64,
    pub days_analyzed: usize,
}

pub fn correlate<Tz: TimeZone>(
    drinks: &[DrinkLogRecord],
    moods: &[MoodRecord],
    calendar: &Calendar<Tz>,
) -> CorrelationResult {
    if moods.is_empty() {
        return CorrelationResult::default();
    }

    let drink_days: BTreeSet<NaiveDate> = drinks
        .iter()
        .map(|drink| calendar.local_date(&drink.timestamp))
        .collect();

    let mut per_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for mood in moods {
        let entry = per_day
            .entry(calendar.local_date(&mood.timestamp))
            .or_default();
        entry.0 += u32::from(mood.mood_level);
        entry.1 += 1;
    }

    let mut drinking = Vec::new();
    let mut dry = Vec::new();
    for (day, (sum, count)) in per_day {
        let day_average = f64::from(sum) / f64::from(count);
        if drink_days.contains(&day) {
            drinking.push(day_average);
        } else {
            dry.push(day_average);
        }
    }

    let with_drinks = mean(&drinking);
    let without_drinks = mean(&dry);

    CorrelationResult {
        average_mood_with_drinks: with_drinks,
        average_mood_without_drinks: without_drinks,
        correlation_strength: with_drinks - without_drinks,
        days_analyzed: drinking.len() + dry.len(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};

    fn calendar() -> Calendar<Utc> {
        Calendar::new(Utc, Weekday::Sun)
    }

    fn drink(day: u32) -> DrinkLogRecord {
        DrinkLogRecord {
            id: format!("drink-{day}"),
            brand: "Brand".into(),
            name: "IPA".into(),
            volume_ml: 355.0,
            abv_percent: 6.5,
            calories: 200.0,
            carbs_g: 15.0,
            sugar_g: 1.0,
            unit_price: 5.0,
            quantity: 2,
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 20, 0, 0).unwrap(),
        }
    }

    fn mood(day: u32, hour: u32, level: u8) -> MoodRecord {
        MoodRecord {
            id: format!("mood-{day}-{hour}"),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(),
            mood_level: level,
            notes: None,
            tags: vec!["Work".into()],
        }
    }

    #[test]
    fn no_moods_means_nothing_analyzed() {
        let result = correlate(&[drink(1)], &[], &calendar());
        assert_eq!(result, CorrelationResult::default());
        assert_eq!(result.days_analyzed, 0);
    }

    #[test]
    fn drinking_day_versus_dry_day() {
        let drinks = vec![drink(1), drink(3)];
        let moods = vec![mood(1, 9, 4), mood(2, 9, 2)];

        let spend: f64 = drinks.iter().map(DrinkLogRecord::spend).sum();
        assert_eq!(spend, 20.0);

        let result = correlate(&drinks, &moods, &calendar());
        assert_eq!(result.average_mood_with_drinks, 4.0);
        assert_eq!(result.average_mood_without_drinks, 2.0);
        assert_eq!(result.correlation_strength, 2.0);
        assert_eq!(result.days_analyzed, 2);
    }

    #[test]
    fn same_day_moods_are_averaged_first() {
        // Day 1 has three entries (avg 3), day 5 one entry of 5; both drinking days.
        let drinks = vec![drink(1), drink(5)];
        let moods = vec![mood(1, 8, 1), mood(1, 12, 3), mood(1, 22, 5), mood(5, 9, 5)];

        let result = correlate(&drinks, &moods, &calendar());
        assert_eq!(result.average_mood_with_drinks, 4.0);
        assert_eq!(result.average_mood_without_drinks, 0.0);
        assert_eq!(result.correlation_strength, 4.0);
        assert_eq!(result.days_analyzed, 2);
    }

    #[test]
    fn days_use_local_dates() {
        // 20:00 UTC on Jan 1 is already Jan 2 at UTC+5.
        let plus_five = chrono::FixedOffset::east_opt(5 * 3600).unwrap();
        let calendar = Calendar::new(plus_five, Weekday::Sun);
        let result = correlate(&[drink(1)], &[mood(2, 3, 5), mood(1, 9, 1)], &calendar);
        assert_eq!(result.average_mood_with_drinks, 5.0);
        assert_eq!(result.average_mood_without_drinks, 1.0);
        assert_eq!(result.correlation_strength, 4.0);
    }
}
