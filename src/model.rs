use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const ID_PREFIX: &str = "MTIJ-";

const DAY_NAMES: [&str; 7] = ["Ahad", "Isnin", "Selasa", "Rabu", "Khamis", "Jumaat", "Sabtu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SALAH LAKU RINGAN")]
    Ringan,
    #[serde(rename = "SALAH LAKU SEDERHANA")]
    Sederhana,
    #[serde(rename = "SALAH LAKU BERAT")]
    Berat,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Ringan, Category::Sederhana, Category::Berat];

    pub fn label(self) -> &'static str {
        match self {
            Category::Ringan => "SALAH LAKU RINGAN",
            Category::Sederhana => "SALAH LAKU SEDERHANA",
            Category::Berat => "SALAH LAKU BERAT",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn demerit(self) -> i32 {
        match self {
            Category::Berat => -20,
            Category::Sederhana => -10,
            Category::Ringan => -5,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One discipline case. Replaced wholesale on edit, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineRecord {
    pub id: String,
    pub student_name: String,
    pub date: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub time: String,
    pub student_class: String,
    pub category: Category,
    pub violation_type: String,
    pub demerit: i32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub reported_by: String,
    #[serde(default)]
    pub action_taken: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: "Maahad Tahfiz Integrasi Jerantut".to_string(),
            address: "Jalan Benta, 27000 Jerantut, Pahang Darul Makmur".to_string(),
            phone: "09-266 0000".to_string(),
            email: "pentadbiran@mtij.edu.my".to_string(),
        }
    }
}

/// Enumerated values offered by the entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionLists {
    pub students: Vec<String>,
    pub classes: Vec<String>,
    pub violations: Vec<String>,
    pub actions: Vec<String>,
    pub locations: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for OptionLists {
    fn default() -> Self {
        Self {
            students: owned(&[
                "Ahmad Danial bin Rosli",
                "Muhammad Aiman bin Hakim",
                "Nur Aisyah binti Kamal",
                "Siti Khadijah binti Yusof",
            ]),
            classes: owned(&["1 Al-Farabi", "2 Al-Ghazali", "3 Ibnu Sina", "4 Al-Khawarizmi"]),
            violations: owned(&[
                "Lewat ke kelas",
                "Tidak hadir solat berjemaah",
                "Ponteng kelas",
                "Membawa telefon bimbit",
                "Bergaduh",
            ]),
            actions: owned(&[
                "Nasihat / Teguran",
                "Amaran Lisan",
                "Khidmat Masyarakat",
                "Panggilan Ibu Bapa",
                "Gantung Asrama",
            ]),
            locations: owned(&["Kelas", "Asrama", "Surau", "Dewan Makan", "Padang"]),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sila pastikan Nama Pelajar dan Nama Pelapor diisi.")]
    MissingRequired,
    #[error("tarikh tidak sah: {0} (format YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("masa tidak sah: {0} (format HH:MM)")]
    InvalidTime(String),
}

/// Every user-editable field of a record, as entered on the form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInput {
    pub student_name: String,
    pub student_class: String,
    pub date: String,
    pub time: String,
    pub category: Category,
    pub violation_type: String,
    pub location: String,
    pub reported_by: String,
    pub action_taken: String,
    pub details: String,
}

impl RecordInput {
    /// Blank form: first option of each list, today's date, 08:00.
    pub fn with_defaults(options: &OptionLists, today: NaiveDate) -> Self {
        let first = |list: &[String]| list.first().cloned().unwrap_or_default();
        Self {
            student_name: String::new(),
            student_class: first(&options.classes),
            date: today.format("%Y-%m-%d").to_string(),
            time: "08:00".to_string(),
            category: Category::Ringan,
            violation_type: first(&options.violations),
            location: first(&options.locations),
            reported_by: String::new(),
            action_taken: first(&options.actions),
            details: String::new(),
        }
    }

    /// Pre-filled form for editing an existing record.
    pub fn from_record(record: &DisciplineRecord) -> Self {
        Self {
            student_name: record.student_name.clone(),
            student_class: record.student_class.clone(),
            date: record.date.clone(),
            time: record.time.clone(),
            category: record.category,
            violation_type: record.violation_type.clone(),
            location: record.location.clone(),
            reported_by: record.reported_by.clone(),
            action_taken: record.action_taken.clone(),
            details: record.details.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.student_name.trim().is_empty() || self.reported_by.trim().is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        if parse_date(&self.date).is_none() {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        if NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() {
            return Err(ValidationError::InvalidTime(self.time.clone()));
        }
        Ok(())
    }

    /// Logs values that fall outside the configured option lists.
    pub fn warn_unlisted(&self, options: &OptionLists) {
        let checks: [(&str, &str, &[String]); 5] = [
            ("pelajar", self.student_name.as_str(), options.students.as_slice()),
            ("kelas", self.student_class.as_str(), options.classes.as_slice()),
            ("salah laku", self.violation_type.as_str(), options.violations.as_slice()),
            ("tindakan", self.action_taken.as_str(), options.actions.as_slice()),
            ("lokasi", self.location.as_str(), options.locations.as_slice()),
        ];
        for (field, value, list) in checks {
            if !list.is_empty() && !list.iter().any(|v| v == value) {
                log::warn!("{} '{}' tiada dalam senarai pilihan", field, value);
            }
        }
    }

    /// Builds a fresh record, assigning an id not present in `taken`.
    pub fn into_record(
        self,
        taken: &HashSet<&str>,
        created_at: i64,
    ) -> Result<DisciplineRecord, ValidationError> {
        self.validate()?;
        let mut id = generate_id();
        while taken.contains(id.as_str()) {
            id = generate_id();
        }
        Ok(self.apply(id, created_at))
    }

    /// Replaces every editable field of `existing`, keeping its id and creation time.
    pub fn replace(self, existing: &DisciplineRecord) -> Result<DisciplineRecord, ValidationError> {
        self.validate()?;
        Ok(self.apply(existing.id.clone(), existing.created_at))
    }

    fn apply(self, id: String, created_at: i64) -> DisciplineRecord {
        let day = weekday_name(&self.date).unwrap_or_default().to_string();
        DisciplineRecord {
            id,
            day,
            demerit: self.category.demerit(),
            student_name: self.student_name,
            date: self.date,
            time: self.time,
            student_class: self.student_class,
            category: self.category,
            violation_type: self.violation_type,
            location: self.location,
            reported_by: self.reported_by,
            action_taken: self.action_taken,
            details: self.details,
            created_at,
        }
    }
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Malay weekday name of a `YYYY-MM-DD` date, `None` when it does not parse.
pub fn weekday_name(date: &str) -> Option<&'static str> {
    parse_date(date).map(|d| DAY_NAMES[d.weekday().num_days_from_sunday() as usize])
}

pub fn generate_id() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", ID_PREFIX, &raw[..5])
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RecordInput {
        RecordInput {
            student_name: "Nur Aisyah binti Kamal".to_string(),
            student_class: "2 Al-Ghazali".to_string(),
            date: "2024-03-01".to_string(),
            time: "10:15".to_string(),
            category: Category::Sederhana,
            violation_type: "Ponteng kelas".to_string(),
            location: "Kelas".to_string(),
            reported_by: "Ustaz Hamdan".to_string(),
            action_taken: "Amaran Lisan".to_string(),
            details: String::new(),
        }
    }

    #[test]
    fn demerit_follows_category() {
        assert_eq!(Category::Berat.demerit(), -20);
        assert_eq!(Category::Sederhana.demerit(), -10);
        assert_eq!(Category::Ringan.demerit(), -5);
    }

    #[test]
    fn weekday_is_derived_from_date() {
        // 2024-03-01 was a Friday, 2024-03-03 a Sunday.
        assert_eq!(weekday_name("2024-03-01"), Some("Jumaat"));
        assert_eq!(weekday_name("2024-03-03"), Some("Ahad"));
        assert_eq!(weekday_name("2024-03-04"), Some("Isnin"));
        assert_eq!(weekday_name("01/03/2024"), None);
        assert_eq!(weekday_name(""), None);
    }

    #[test]
    fn new_record_derives_day_and_demerit() {
        let taken = HashSet::new();
        let rec = input().into_record(&taken, 1_700_000_000_000).unwrap();
        assert!(rec.id.starts_with(ID_PREFIX));
        assert_eq!(rec.id.len(), ID_PREFIX.len() + 5);
        assert_eq!(rec.day, "Jumaat");
        assert_eq!(rec.demerit, -10);
        assert_eq!(rec.created_at, 1_700_000_000_000);
    }

    #[test]
    fn replace_keeps_identity_and_rederives() {
        let taken = HashSet::new();
        let rec = input().into_record(&taken, 42).unwrap();
        let mut edited = RecordInput::from_record(&rec);
        edited.category = Category::Berat;
        edited.date = "2024-03-03".to_string();
        let replaced = edited.replace(&rec).unwrap();
        assert_eq!(replaced.id, rec.id);
        assert_eq!(replaced.created_at, 42);
        assert_eq!(replaced.demerit, -20);
        assert_eq!(replaced.day, "Ahad");
    }

    #[test]
    fn missing_names_are_rejected() {
        let mut form = input();
        form.reported_by = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingRequired));

        let mut form = input();
        form.student_name.clear();
        assert_eq!(form.validate(), Err(ValidationError::MissingRequired));
    }

    #[test]
    fn malformed_date_and_time_are_rejected() {
        let mut form = input();
        form.date = "2024-13-40".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::InvalidDate(_))));

        let mut form = input();
        form.time = "8am".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::InvalidTime(_))));
    }

    #[test]
    fn defaults_take_first_option() {
        let options = OptionLists::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let form = RecordInput::with_defaults(&options, today);
        assert_eq!(form.date, "2026-01-05");
        assert_eq!(form.time, "08:00");
        assert_eq!(form.student_class, options.classes[0]);
        assert_eq!(form.category, Category::Ringan);
    }

    #[test]
    fn category_serializes_with_malay_label() {
        let json = serde_json::to_string(&Category::Berat).unwrap();
        assert_eq!(json, "\"SALAH LAKU BERAT\"");
        assert_eq!(
            Category::from_label("salah laku sederhana"),
            Some(Category::Sederhana)
        );
        assert_eq!(Category::from_label("LAIN-LAIN"), None);
    }
}
