use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

pub type Uid = i64;
/// Surah ids are chapter numbers; decimals (`2.1`, `2.2`) mark sub-sections.
pub type SurahId = f64;

pub const TOTAL_PAGES: i64 = 604;
pub const SECTIONS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
	pub message: String,
}

impl Message {
	pub fn new(message: impl Into<String>) -> Self {
		Message { message: message.into() }
	}
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
	pub id: Uid,
	pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
	pub name: String,
	pub pin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registered {
	pub message: String,
	pub user: User,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemorizedSurah {
	pub id: SurahId,
	pub parent_id: Option<SurahId>,
	pub chapter_name: String,
	pub total_verse: i64,
	pub verse_memorized: i64,
	pub juz: i64,
	pub note: Option<String>,
	pub murajaah_counter: i64,
	pub user_id: Uid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurahForm {
	pub id: Option<SurahId>,
	pub parent_id: Option<SurahId>,
	pub chapter_name: String,
	pub total_verse: i64,
	#[serde(default)]
	pub verse_memorized: i64,
	pub juz: i64,
	pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MurajaahForm {
	pub surah_id: SurahId,
}

#[derive(Debug, Clone, Serialize)]
pub struct MurajaahLog {
	pub id: i64,
	pub user_id: Uid,
	pub date_time: DateTime<FixedOffset>,
	pub surah_id: Vec<SurahId>,
	pub completion_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateParam {
	pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRate {
	pub day: String,
	pub rate: String,
}

/// Sunday-first week as the review chart draws it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyProgress {
	pub sunday: DayRate,
	pub monday: DayRate,
	pub tuesday: DayRate,
	pub wednesday: DayRate,
	pub thursday: DayRate,
	pub friday: DayRate,
	pub saturday: DayRate,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SabaqRecord {
	pub id: i64,
	pub user_id: Uid,
	pub date: NaiveDate,
	pub chapter_number: i64,
	pub chapter_name: String,
	pub page: i64,
	pub section: i64,
	pub verse: String,
	pub number_of_readings: i64,
	pub complete_memorization: bool,
	pub murajaah_20_times: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SabaqForm {
	pub chapter_number: i64,
	pub chapter_name: String,
	pub page: i64,
	pub section: i64,
	pub verse: String,
	#[serde(default)]
	pub number_of_readings: i64,
	#[serde(default)]
	pub complete_memorization: bool,
	#[serde(default)]
	pub murajaah_20_times: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TahajjudForm {
	pub current_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TahajjudStreak {
	pub id: i64,
	pub dates: Vec<NaiveDate>,
	pub streak_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TahajjudSummary {
	pub highest_streak: i64,
	pub current_streak: i64,
	pub total_in_current_month: i64,
	pub total_in_current_year: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KhatamGoal {
	OnceMonth,
	OnceTwoMonths,
	Free,
}

impl KhatamGoal {
	pub fn as_str(&self) -> &'static str {
		match self {
			KhatamGoal::OnceMonth => "once_month",
			KhatamGoal::OnceTwoMonths => "once_two_months",
			KhatamGoal::Free => "free",
		}
	}

	/// Days allotted for one full reading, `None` for a pace-based goal.
	pub fn days(&self) -> Option<i64> {
		match self {
			KhatamGoal::OnceMonth => Some(30),
			KhatamGoal::OnceTwoMonths => Some(60),
			KhatamGoal::Free => None,
		}
	}
}

impl FromStr for KhatamGoal {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"once_month" => Ok(KhatamGoal::OnceMonth),
			"once_two_months" => Ok(KhatamGoal::OnceTwoMonths),
			"free" => Ok(KhatamGoal::Free),
			other => Err(format!("invalid goal type: {other}")),
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct TilawahStatus {
	pub last_page_recited: i64,
	pub last_update_date: NaiveDate,
	pub last_update_time: DateTime<FixedOffset>,
	pub goal_type: Option<KhatamGoal>,
	pub target_completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TilawahUpdateForm {
	pub page_number: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TilawahUpdated {
	pub success: bool,
	pub page_number: i64,
	pub update_date: NaiveDate,
	pub update_time: DateTime<FixedOffset>,
	pub message: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TilawahLogEntry {
	pub id: i64,
	pub page_number: i64,
	pub update_date: NaiveDate,
	pub update_time: DateTime<FixedOffset>,
	pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsParam {
	pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KhatamGoalForm {
	pub goal_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KhatamGoalRecord {
	pub id: i64,
	pub user_id: Uid,
	pub goal_type: KhatamGoal,
	pub target_completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KhatamGoalSet {
	pub success: bool,
	pub goal: KhatamGoalRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct KhatamInfo {
	pub goal_type: KhatamGoal,
	pub target_completion_date: Option<NaiveDate>,
	pub pages_completed: i64,
	pub pages_remaining: i64,
	pub completion_percentage: i64,
	pub total_pages: i64,
}
