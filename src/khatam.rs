use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::{
	time::weekday_name,
	types::{KhatamGoal, TOTAL_PAGES},
};

/// Daily target when there is no goal or no reading history to go on.
pub const DEFAULT_DAILY_PAGES: i64 = 20;
pub const DEFAULT_GOAL_DAYS: i64 = 30;
pub const PACE_WINDOW_DAYS: i64 = 7;

/// Pages logged within the pace window.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct Pace {
	pub log_count: i64,
	pub min_page: Option<i64>,
	pub max_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
	pub last_page_recited: i64,
	pub remaining_pages: i64,
	pub daily_target: i64,
	pub pages_to_complete_today: i64,
	pub estimated_completion_date: NaiveDate,
	pub estimated_completion_day: &'static str,
	pub goal_type: Option<KhatamGoal>,
	pub current_date: NaiveDate,
}

fn div_ceil(a: i64, b: i64) -> i64 {
	(a + b - 1) / b
}

fn after(today: NaiveDate, days: i64) -> NaiveDate {
	today.checked_add_days(Days::new(days.max(0) as u64)).unwrap_or(today)
}

/// Fixed goals spread the whole mushaf over their days; `free` follows the recent pace.
pub fn project(last_page: i64, goal: Option<KhatamGoal>, pace: Pace, today: NaiveDate) -> Projection {
	let remaining = TOTAL_PAGES - last_page;

	let (daily_target, estimate) = match goal {
		Some(KhatamGoal::Free) => match (pace.log_count, pace.min_page, pace.max_page) {
			(count, Some(min), Some(max)) if count > 0 => {
				let read = (max - min).max(0);
				let daily = match div_ceil(read, PACE_WINDOW_DAYS) {
					0 => DEFAULT_DAILY_PAGES,
					pages => pages,
				};
				let estimate = if remaining > 0 { after(today, div_ceil(remaining, daily)) } else { today };
				(daily, estimate)
			}
			_ => (DEFAULT_DAILY_PAGES, today),
		},
		Some(goal) => {
			let days = goal.days().unwrap_or(DEFAULT_GOAL_DAYS);
			(div_ceil(TOTAL_PAGES, days), after(today, days))
		}
		None => (DEFAULT_DAILY_PAGES, after(today, DEFAULT_GOAL_DAYS)),
	};

	Projection {
		last_page_recited: last_page,
		remaining_pages: remaining,
		daily_target,
		pages_to_complete_today: if remaining > 0 { daily_target.min(remaining) } else { 0 },
		estimated_completion_date: estimate,
		estimated_completion_day: weekday_name(chrono::Datelike::weekday(&estimate)),
		goal_type: goal,
		current_date: today,
	}
}

pub fn completion_percentage(last_page: i64) -> i64 {
	(last_page as f64 / TOTAL_PAGES as f64 * 100.0).round() as i64
}
