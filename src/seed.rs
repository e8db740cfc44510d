use crate::model::{Category, DisciplineRecord, weekday_name};

struct SeedCase {
    id: &'static str,
    student_name: &'static str,
    student_class: &'static str,
    date: &'static str,
    time: &'static str,
    category: Category,
    violation_type: &'static str,
    location: &'static str,
    reported_by: &'static str,
    action_taken: &'static str,
    details: &'static str,
    created_at: i64,
}

const SEED: [SeedCase; 3] = [
    SeedCase {
        id: "REC-001",
        student_name: "Ahmad Danial bin Rosli",
        student_class: "1 Al-Farabi",
        date: "2026-01-12",
        time: "07:45",
        category: Category::Ringan,
        violation_type: "Lewat ke kelas",
        location: "Kelas",
        reported_by: "Ustaz Hamdan",
        action_taken: "Nasihat / Teguran",
        details: "Lewat 20 minit selepas perhimpunan.",
        created_at: 1_768_176_300_000,
    },
    SeedCase {
        id: "REC-002",
        student_name: "Muhammad Aiman bin Hakim",
        student_class: "3 Ibnu Sina",
        date: "2026-01-14",
        time: "21:30",
        category: Category::Sederhana,
        violation_type: "Membawa telefon bimbit",
        location: "Asrama",
        reported_by: "Warden Rizal",
        action_taken: "Panggilan Ibu Bapa",
        details: "Telefon dirampas semasa pemeriksaan asrama.",
        created_at: 1_768_397_400_000,
    },
    SeedCase {
        id: "REC-003",
        student_name: "Ahmad Danial bin Rosli",
        student_class: "1 Al-Farabi",
        date: "2026-01-20",
        time: "13:10",
        category: Category::Berat,
        violation_type: "Bergaduh",
        location: "Dewan Makan",
        reported_by: "Ustazah Salmah",
        action_taken: "Gantung Asrama",
        details: "",
        created_at: 1_768_885_800_000,
    },
];

/// Baseline records backfilled into the store when their ids are missing.
pub fn seed_records() -> Vec<DisciplineRecord> {
    SEED.iter()
        .map(|s| DisciplineRecord {
            id: s.id.to_string(),
            student_name: s.student_name.to_string(),
            date: s.date.to_string(),
            day: weekday_name(s.date).unwrap_or_default().to_string(),
            time: s.time.to_string(),
            student_class: s.student_class.to_string(),
            category: s.category,
            violation_type: s.violation_type.to_string(),
            demerit: s.category.demerit(),
            location: s.location.to_string(),
            reported_by: s.reported_by.to_string(),
            action_taken: s.action_taken.to_string(),
            details: s.details.to_string(),
            created_at: s.created_at,
        })
        .collect()
}
