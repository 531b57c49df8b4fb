use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::timestamp_serde;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInMethod {
    Qr,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub activity_id: String,
    pub user_id: String,
    pub status: AttendanceStatus,
    #[serde(with = "timestamp_serde")]
    pub checked_in_at: DateTime<Utc>,
    pub method: CheckInMethod,
}

impl AttendanceRecord {
    pub fn qr_check_in(activity_id: &str, user_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            activity_id: activity_id.to_string(),
            user_id: user_id.to_string(),
            status: AttendanceStatus::Present,
            checked_in_at: at,
            method: CheckInMethod::Qr,
        }
    }
}

/// Attendance records keyed by `(activity_id, user_id)`.
pub trait AttendanceStore: Send + Sync {
    /// Stores `record` unless one already exists for the same activity and
    /// user. Returns whichever record is stored afterwards.
    fn record(&self, record: AttendanceRecord) -> Result<AttendanceRecord>;

    fn get(&self, activity_id: &str, user_id: &str) -> Result<Option<AttendanceRecord>>;

    /// Ordered by check-in time, then user id.
    fn list_for_activity(&self, activity_id: &str) -> Result<Vec<AttendanceRecord>>;
}

#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    records: RwLock<HashMap<(String, String), AttendanceRecord>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn record(&self, record: AttendanceRecord) -> Result<AttendanceRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("attendance store lock was poisoned"))?;
        let key = (record.activity_id.clone(), record.user_id.clone());
        Ok(records.entry(key).or_insert(record).clone())
    }

    fn get(&self, activity_id: &str, user_id: &str) -> Result<Option<AttendanceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("attendance store lock was poisoned"))?;
        Ok(records
            .get(&(activity_id.to_string(), user_id.to_string()))
            .cloned())
    }

    fn list_for_activity(&self, activity_id: &str) -> Result<Vec<AttendanceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("attendance store lock was poisoned"))?;
        let mut listed: Vec<_> = records
            .values()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| {
            a.checked_in_at
                .cmp(&b.checked_in_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(listed)
    }
}
