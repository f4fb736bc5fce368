use crate::bucket::Calendar;
use crate::errors::AppError;
use crate::models::{AppData, DrinkLogRecord, MoodRecord, SavedDrink};
use crate::normalize::{normalize_data, NormalizedData, RawAppData};
use chrono::TimeZone;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{error, info, warn};

/// JSON-file repository for drink logs, mood entries and the saved-drink
/// catalog.
///
/// Every read hands out an owned snapshot. A mutation is applied to a copy,
/// written to disk, and only then becomes visible; a failed write leaves the
/// store as it was.
#[derive(Clone)]
pub struct RecordStore {
    path: PathBuf,
    data: Arc<Mutex<AppData>>,
}

impl RecordStore {
    pub async fn open(path: PathBuf) -> Self {
        let NormalizedData {
            data,
            repaired,
            skipped,
        } = load_data(&path).await;
        info!(
            drinks = data.drinks.len(),
            moods = data.moods.len(),
            saved_drinks = data.saved_drinks.len(),
            skipped,
            "loaded records from {}",
            path.display()
        );

        // Generated ids must be written back or they change on every start.
        if repaired > 0 {
            match persist_data(&path, &data).await {
                Ok(()) => info!(repaired, "assigned ids to stored records"),
                Err(err) => warn!(repaired, "could not write repaired records: {}", err.message),
            }
        }

        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn snapshot(&self) -> AppData {
        self.data.lock().await.clone()
    }

    pub async fn list_drinks(&self) -> Vec<DrinkLogRecord> {
        self.data.lock().await.drinks.clone()
    }

    pub async fn append_drink(&self, record: DrinkLogRecord) -> Result<DrinkLogRecord, AppError> {
        self.commit(|data| {
            data.drinks.push(record.clone());
            true
        })
        .await?;
        info!(id = %record.id, quantity = record.quantity, "logged drink");
        Ok(record)
    }

    /// Returns `false` when no drink has this id.
    pub async fn remove_drink(&self, id: &str) -> Result<bool, AppError> {
        let removed = self
            .commit(|data| {
                let before = data.drinks.len();
                data.drinks.retain(|drink| drink.id != id);
                data.drinks.len() != before
            })
            .await?;
        if removed {
            info!(%id, "removed drink");
        }
        Ok(removed)
    }

    pub async fn list_moods(&self) -> Vec<MoodRecord> {
        self.data.lock().await.moods.clone()
    }

    /// Stores `record` as the mood for its local day. An existing entry for
    /// that day is overwritten in place and keeps its id.
    pub async fn upsert_mood<Tz: TimeZone>(
        &self,
        mut record: MoodRecord,
        calendar: &Calendar<Tz>,
    ) -> Result<MoodRecord, AppError> {
        let day = calendar.local_date(&record.timestamp);
        let mut replaced = false;

        self.commit(|data| {
            match data
                .moods
                .iter_mut()
                .find(|mood| calendar.local_date(&mood.timestamp) == day)
            {
                Some(existing) => {
                    record.id = existing.id.clone();
                    *existing = record.clone();
                    replaced = true;
                }
                None => data.moods.push(record.clone()),
            }
            true
        })
        .await?;

        if replaced {
            info!(id = %record.id, %day, "replaced mood");
        } else {
            info!(id = %record.id, %day, "recorded mood");
        }
        Ok(record)
    }

    pub async fn remove_mood(&self, id: &str) -> Result<bool, AppError> {
        let removed = self
            .commit(|data| {
                let before = data.moods.len();
                data.moods.retain(|mood| mood.id != id);
                data.moods.len() != before
            })
            .await?;
        if removed {
            info!(%id, "removed mood");
        }
        Ok(removed)
    }

    /// Catalog entries, most recently used first.
    pub async fn list_saved_drinks(&self) -> Vec<SavedDrink> {
        let mut saved = self.data.lock().await.saved_drinks.clone();
        saved.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        saved
    }

    /// Adds `candidate` to the catalog. If an entry with the same name and
    /// type exists, that entry is returned instead with its `last_used_at`
    /// moved to the candidate's.
    pub async fn save_drink(&self, candidate: SavedDrink) -> Result<SavedDrink, AppError> {
        let mut saved = candidate;
        let mut reused = false;

        self.commit(|data| {
            match data
                .saved_drinks
                .iter_mut()
                .find(|entry| entry.name == saved.name && entry.drink_type == saved.drink_type)
            {
                Some(existing) => {
                    existing.last_used_at = saved.last_used_at;
                    saved = existing.clone();
                    reused = true;
                }
                None => data.saved_drinks.push(saved.clone()),
            }
            true
        })
        .await?;

        info!(id = %saved.id, name = %saved.name, reused, "saved drink");
        Ok(saved)
    }

    /// Applies `change` to a copy of the data and swaps it in once the copy
    /// is on disk. `change` returns whether it modified anything; untouched
    /// data is not rewritten.
    async fn commit(&self, change: impl FnOnce(&mut AppData) -> bool) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(true)
    }
}

pub async fn load_data(path: &Path) -> NormalizedData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<RawAppData>(&bytes) {
            Ok(raw) => normalize_data(raw),
            Err(err) => {
                error!("failed to parse data file: {err}");
                NormalizedData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => NormalizedData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            NormalizedData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
