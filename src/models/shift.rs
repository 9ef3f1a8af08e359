use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Shift {
    pub id: String,
    pub dealership_id: String,
    pub user_id: String,
    pub shift_start: DateTime<Utc>,
    /// `None` while the shift is open.
    pub shift_end: Option<DateTime<Utc>>,
    pub archived_tasks_processed: bool,
}

impl Shift {
    pub fn is_closed(&self) -> bool {
        self.shift_end.is_some()
    }
}
