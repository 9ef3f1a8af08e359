use chrono::Weekday;
use serde::Serialize;

use crate::error::ShiftopsError;

#[derive(Debug, Clone, Serialize)]
pub struct Setting {
    /// `None` for the global scope.
    pub dealership_id: Option<String>,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AutoArchiveEnabled,
    AutoArchiveDayOfWeek,
    TaskArchiveDays,
    ArchiveOverdueHoursAfterShift,
    ArchiveCompletionCooldownMinutes,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        Self::AutoArchiveEnabled,
        Self::AutoArchiveDayOfWeek,
        Self::TaskArchiveDays,
        Self::ArchiveOverdueHoursAfterShift,
        Self::ArchiveCompletionCooldownMinutes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoArchiveEnabled => "auto_archive_enabled",
            Self::AutoArchiveDayOfWeek => "auto_archive_day_of_week",
            Self::TaskArchiveDays => "task_archive_days",
            Self::ArchiveOverdueHoursAfterShift => "archive_overdue_hours_after_shift",
            Self::ArchiveCompletionCooldownMinutes => "archive_completion_cooldown_minutes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Archival knobs for one dealership after per-dealership → global → default fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSettings {
    pub auto_archive_enabled: bool,
    /// `None` means the completion sweep may run on any day.
    pub auto_archive_day_of_week: Option<Weekday>,
    pub task_archive_days: i64,
    pub archive_overdue_hours_after_shift: i64,
    pub completion_cooldown_minutes: i64,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            auto_archive_enabled: true,
            auto_archive_day_of_week: None,
            task_archive_days: 30,
            archive_overdue_hours_after_shift: 2,
            completion_cooldown_minutes: 5,
        }
    }
}

impl ArchiveSettings {
    /// Build from a lookup that already applies the scope fallback.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ShiftopsError>
    where
        F: FnMut(SettingKey) -> Result<Option<String>, ShiftopsError>,
    {
        let mut settings = Self::default();
        for key in SettingKey::ALL {
            let Some(raw) = lookup(key)? else { continue };
            let value = raw.trim();
            match key {
                SettingKey::AutoArchiveEnabled => {
                    settings.auto_archive_enabled = parse_bool(value)
                        .ok_or_else(|| ShiftopsError::invalid_setting(key.as_str(), value))?;
                }
                SettingKey::AutoArchiveDayOfWeek => {
                    settings.auto_archive_day_of_week = parse_day_of_week(value)
                        .ok_or_else(|| ShiftopsError::invalid_setting(key.as_str(), value))?;
                }
                SettingKey::TaskArchiveDays => {
                    settings.task_archive_days = parse_bounded(key, value, MAX_ARCHIVE_DAYS)?;
                }
                SettingKey::ArchiveOverdueHoursAfterShift => {
                    settings.archive_overdue_hours_after_shift = parse_bounded(key, value, MAX_SHIFT_GRACE_HOURS)?;
                }
                SettingKey::ArchiveCompletionCooldownMinutes => {
                    settings.completion_cooldown_minutes = parse_bounded(key, value, MAX_COOLDOWN_MINUTES)?;
                }
            }
        }
        Ok(settings)
    }

    /// Effective value of `key` in its stored text form.
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::AutoArchiveEnabled => self.auto_archive_enabled.to_string(),
            SettingKey::AutoArchiveDayOfWeek => match self.auto_archive_day_of_week {
                Some(day) => day.number_from_monday().to_string(),
                None => "*".to_string(),
            },
            SettingKey::TaskArchiveDays => self.task_archive_days.to_string(),
            SettingKey::ArchiveOverdueHoursAfterShift => self.archive_overdue_hours_after_shift.to_string(),
            SettingKey::ArchiveCompletionCooldownMinutes => self.completion_cooldown_minutes.to_string(),
        }
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `Some(None)` for "any day" (`*` or empty), `Some(Some(day))` for a concrete day.
/// Accepts ISO numbers 1..=7, 0 as Sunday, and English day names.
pub fn parse_day_of_week(value: &str) -> Option<Option<Weekday>> {
    let value = value.to_ascii_lowercase();
    if value.is_empty() || value == "*" {
        return Some(None);
    }
    let day = match value.as_str() {
        "1" | "mon" | "monday" => Weekday::Mon,
        "2" | "tue" | "tuesday" => Weekday::Tue,
        "3" | "wed" | "wednesday" => Weekday::Wed,
        "4" | "thu" | "thursday" => Weekday::Thu,
        "5" | "fri" | "friday" => Weekday::Fri,
        "6" | "sat" | "saturday" => Weekday::Sat,
        "0" | "7" | "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(Some(day))
}

/// Upper bounds keep every derived duration and deadline offset representable.
pub const MAX_ARCHIVE_DAYS: i64 = 36_500;
pub const MAX_SHIFT_GRACE_HOURS: i64 = 8_760;
pub const MAX_COOLDOWN_MINUTES: i64 = 525_600;

fn parse_bounded(key: SettingKey, value: &str, max: i64) -> Result<i64, ShiftopsError> {
    value
        .parse::<i64>()
        .ok()
        .filter(|v| (0..=max).contains(v))
        .ok_or_else(|| ShiftopsError::invalid_setting(key.as_str(), value))
}
