//! Placeholder figures for dashboard widgets that have no data source yet.
//! Everything here is random and flagged `synthetic` on the wire.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

pub const ACTIVITY_DAYS: usize = 30;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DashboardDemo {
    pub synthetic: bool,
    pub weekly_growth: u32,
    pub critical_issues: u32,
    pub ai_insights: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: String,
    pub tests: u32,
    pub passed: u32,
    pub failed: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ReportDemo {
    pub synthetic: bool,
    pub daily_activity: Vec<DailyActivity>,
}

pub fn dashboard_demo<R: Rng + ?Sized>(rng: &mut R) -> DashboardDemo {
    DashboardDemo {
        synthetic: true,
        weekly_growth: rng.random_range(8..33),
        critical_issues: rng.random_range(1..6),
        ai_insights: rng.random_range(3..15),
    }
}

/// One entry per day, oldest first, ending on `today`.
pub fn daily_activity<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate, days: usize) -> Vec<DailyActivity> {
    (0..days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back as i64);
            DailyActivity {
                date: date.format("%b %-d").to_string(),
                tests: rng.random_range(5..25),
                passed: rng.random_range(3..18),
                failed: rng.random_range(0..5),
            }
        })
        .collect()
}

pub fn report_demo<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> ReportDemo {
    ReportDemo {
        synthetic: true,
        daily_activity: daily_activity(rng, today, ACTIVITY_DAYS),
    }
}
