use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
	pub port: u16,
	pub database_url: String,
	pub max_connections: u32,
	pub utc_offset: FixedOffset,
	pub allowed_origins: Vec<String>,
}

impl Config {
	pub fn load() -> Result<Self> {
		let offset_hours: i32 = try_load("UTC_OFFSET_HOURS", "8")?;
		let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
			.ok_or_else(|| anyhow!("UTC_OFFSET_HOURS out of range: {offset_hours}"))?;

		let origins: String = try_load("ALLOWED_ORIGINS", "http://localhost:3000")?;

		Ok(Self {
			port: try_load("PORT", "8080")?,
			database_url: try_load("DATABASE_URL", "sqlite://murajaah.db")?,
			max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
			utc_offset,
			allowed_origins: split_origins(&origins),
		})
	}

	pub fn now(&self) -> DateTime<FixedOffset> {
		Utc::now().with_timezone(&self.utc_offset)
	}

	pub fn today(&self) -> NaiveDate {
		self.now().date_naive()
	}
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
	T::Err: Display,
{
	let raw = env::var(key).unwrap_or_else(|_| {
		info!("{key} not set, using default: {default}");
		default.to_string()
	});

	raw.parse()
		.map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}

fn split_origins(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|origin| !origin.is_empty())
		.map(str::to_string)
		.collect()
}
