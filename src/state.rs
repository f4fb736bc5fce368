use crate::bucket::Calendar;
use crate::storage::RecordStore;
use chrono::{Local, Weekday};

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub calendar: Calendar<Local>,
}

impl AppState {
    pub fn new(store: RecordStore, week_start: Weekday) -> Self {
        Self {
            store,
            calendar: Calendar::new(Local, week_start),
        }
    }
}
