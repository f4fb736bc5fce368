use crate::aggregate::{average_mood, calorie_breakdown, summarize};
use crate::bucket::{Calendar, Period};
use crate::correlate::correlate;
use crate::models::{
    AppData, DashboardResponse, DrinkLogRecord, HealthPoint, MoodPoint, MoodRecord, SpendingPoint,
};
use crate::trend::{drink_windows, mood_windows, trend, Assessment, Polarity, TrendResult};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

pub const MOOD_CHART_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Drinks,
    Spend,
    Calories,
    WeightGain,
    Mood,
}

impl TrendMetric {
    pub fn title(self) -> &'static str {
        match self {
            Self::Drinks => "Drinks",
            Self::Spend => "Spent",
            Self::Calories => "Calories",
            Self::WeightGain => "Est. Weight Gain",
            Self::Mood => "Mood",
        }
    }

    /// Less drinking is an improvement; a higher mood is.
    pub fn polarity(self) -> Polarity {
        match self {
            Self::Mood => Polarity::HigherIsBetter,
            _ => Polarity::LowerIsBetter,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendCard {
    pub metric: TrendMetric,
    pub current: f64,
    pub previous: f64,
    pub trend: TrendResult,
    pub polarity: Polarity,
    pub assessment: Assessment,
}

impl TrendCard {
    fn new(metric: TrendMetric, current: f64, previous: f64) -> Self {
        let trend = trend(current, previous);
        let polarity = metric.polarity();
        Self {
            metric,
            current,
            previous,
            trend,
            polarity,
            assessment: trend.assess(polarity),
        }
    }
}

pub fn build_dashboard<Tz: TimeZone>(data: &AppData, calendar: &Calendar<Tz>) -> DashboardResponse {
    build_dashboard_at(Utc::now(), data, calendar)
}

pub fn build_dashboard_at<Tz: TimeZone>(
    now: DateTime<Utc>,
    data: &AppData,
    calendar: &Calendar<Tz>,
) -> DashboardResponse {
    let windows = drink_windows(&data.drinks, now);
    let (current, previous) = (windows.current, windows.previous);
    let moods = mood_windows(&data.moods);

    let trends = vec![
        TrendCard::new(
            TrendMetric::Drinks,
            current.total_quantity as f64,
            previous.total_quantity as f64,
        ),
        TrendCard::new(TrendMetric::Spend, current.total_spend, previous.total_spend),
        TrendCard::new(
            TrendMetric::Calories,
            current.total_calories,
            previous.total_calories,
        ),
        TrendCard::new(
            TrendMetric::WeightGain,
            current.estimated_weight_gain_lbs,
            previous.estimated_weight_gain_lbs,
        ),
        TrendCard::new(TrendMetric::Mood, moods.current, moods.previous),
    ];

    DashboardResponse {
        totals: summarize(&data.drinks),
        drink_entries: data.drinks.len(),
        average_mood: average_mood(&data.moods),
        mood_entries: data.moods.len(),
        trends,
        correlation: correlate(&data.drinks, &data.moods, calendar),
    }
}

pub fn spending_series<Tz: TimeZone>(
    drinks: &[DrinkLogRecord],
    period: Period,
    calendar: &Calendar<Tz>,
) -> Vec<SpendingPoint> {
    calendar
        .bucket(drinks, period)
        .into_iter()
        .map(|bucket| SpendingPoint {
            key: bucket.key.to_string(),
            label: bucket.key.label(),
            spending: round_cents(summarize(bucket.records.iter().copied()).total_spend),
        })
        .collect()
}

pub fn health_series<Tz: TimeZone>(
    drinks: &[DrinkLogRecord],
    period: Period,
    calendar: &Calendar<Tz>,
) -> Vec<HealthPoint> {
    calendar
        .bucket(drinks, period)
        .into_iter()
        .map(|bucket| {
            let parts = calorie_breakdown(bucket.records.iter().copied());
            HealthPoint {
                key: bucket.key.to_string(),
                label: bucket.key.label(),
                calories_from_alcohol: parts.alcohol_or_other_calories.round(),
                calories_from_carbs: parts.other_carb_calories.round(),
                calories_from_sugar: parts.sugar_calories.round(),
            }
        })
        .collect()
}

/// Mood entries from the last 30 days, oldest first.
pub fn mood_series<Tz: TimeZone>(
    moods: &[MoodRecord],
    now: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> Vec<MoodPoint> {
    let since = now - Duration::days(MOOD_CHART_DAYS);
    let mut recent: Vec<&MoodRecord> = moods.iter().filter(|mood| mood.timestamp >= since).collect();
    recent.sort_by_key(|mood| mood.timestamp);

    recent
        .into_iter()
        .map(|mood| {
            let date = calendar.local_date(&mood.timestamp);
            MoodPoint {
                date: date.to_string(),
                label: date.format("%b %-d").to_string(),
                mood: mood.mood_level,
                notes: mood.notes.clone(),
                tags: mood.tags.clone(),
            }
        })
        .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::TrendDirection;
    use chrono::Weekday;

    fn calendar() -> Calendar<Utc> {
        Calendar::new(Utc, Weekday::Sun)
    }

    fn drink(ts: DateTime<Utc>, unit_price: f64, quantity: u32) -> DrinkLogRecord {
        DrinkLogRecord {
            id: ts.to_rfc3339(),
            brand: "Sierra Nevada".into(),
            name: "Pale Ale".into(),
            volume_ml: 355.0,
            abv_percent: 5.6,
            calories: 175.0,
            carbs_g: 14.0,
            sugar_g: 2.0,
            unit_price,
            quantity,
            timestamp: ts,
        }
    }

    fn mood(ts: DateTime<Utc>, level: u8) -> MoodRecord {
        MoodRecord {
            id: ts.to_rfc3339(),
            timestamp: ts,
            mood_level: level,
            notes: Some("after work".into()),
            tags: vec!["Work".into()],
        }
    }

    #[test]
    fn dashboard_on_empty_data() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let dashboard = build_dashboard_at(now, &AppData::default(), &calendar());

        assert_eq!(dashboard.totals.total_quantity, 0);
        assert_eq!(dashboard.average_mood, None);
        assert_eq!(dashboard.trends.len(), 5);
        assert!(dashboard
            .trends
            .iter()
            .all(|card| card.trend.direction == TrendDirection::Stable
                && card.assessment == Assessment::Neutral));
        assert_eq!(dashboard.correlation.days_analyzed, 0);
    }

    #[test]
    fn dashboard_trend_polarity_per_metric() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        let data = AppData {
            drinks: vec![
                drink(now - Duration::days(2), 6.0, 2),
                drink(now - Duration::days(10), 6.0, 1),
            ],
            moods: vec![mood(now - Duration::days(1), 4)],
            ..AppData::default()
        };

        let dashboard = build_dashboard_at(now, &data, &calendar());
        let card = |metric: TrendMetric| {
            dashboard
                .trends
                .iter()
                .find(|card| card.metric == metric)
                .expect("missing metric")
        };

        let drinks = card(TrendMetric::Drinks);
        assert_eq!(drinks.trend.direction, TrendDirection::Up);
        assert_eq!(drinks.trend.percent_change, 100.0);
        assert_eq!(drinks.assessment, Assessment::Unfavorable);

        let spend = card(TrendMetric::Spend);
        assert_eq!((spend.current, spend.previous), (12.0, 6.0));

        let mood = card(TrendMetric::Mood);
        assert_eq!(mood.trend.direction, TrendDirection::Up);
        assert_eq!(mood.assessment, Assessment::Favorable);

        assert_eq!(dashboard.totals.total_quantity, 3);
        assert_eq!(dashboard.totals.total_spend, 18.0);
        assert_eq!(dashboard.average_mood, Some(4.0));
    }

    #[test]
    fn spending_series_rounds_to_cents_per_bucket() {
        let calendar = calendar();
        let drinks = vec![
            drink(Utc.with_ymd_and_hms(2024, 1, 3, 20, 0, 0).unwrap(), 3.333, 3),
            drink(Utc.with_ymd_and_hms(2024, 2, 9, 20, 0, 0).unwrap(), 5.0, 1),
        ];

        let monthly = spending_series(&drinks, Period::Monthly, &calendar);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].key, "2024-01");
        assert_eq!(monthly[0].label, "January 2024");
        assert_eq!(monthly[0].spending, 10.0);
        assert_eq!(monthly[1].spending, 5.0);

        let weekly = spending_series(&drinks, Period::Weekly, &calendar);
        assert_eq!(weekly[0].key, "2023-12-31");
        assert_eq!(weekly[1].key, "2024-02-04");

        assert!(spending_series(&[], Period::Weekly, &calendar).is_empty());
    }

    #[test]
    fn health_series_splits_calories() {
        let drinks = vec![drink(Utc.with_ymd_and_hms(2024, 1, 3, 20, 0, 0).unwrap(), 5.0, 1)];
        let points = health_series(&drinks, Period::Monthly, &calendar());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].calories_from_sugar, 8.0);
        assert_eq!(points[0].calories_from_carbs, 48.0);
        assert_eq!(points[0].calories_from_alcohol, 119.0);
    }

    #[test]
    fn mood_series_keeps_last_30_days_in_order() {
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        let moods = vec![
            mood(now - Duration::days(1), 5),
            mood(now - Duration::days(45), 1),
            mood(now - Duration::days(10), 2),
        ];

        let points = mood_series(&moods, now, &calendar());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].mood, 2);
        assert_eq!(points[0].date, "2024-05-21");
        assert_eq!(points[0].label, "May 21");
        assert_eq!(points[1].mood, 5);
    }
}
