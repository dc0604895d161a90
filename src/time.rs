use chrono::{Datelike, Days, FixedOffset, Months, NaiveDate, SecondsFormat, TimeZone, Weekday};

/// The seven days of the Sunday-first week holding `date`, `None` at the calendar's edges.
pub fn sunday_week(date: NaiveDate) -> Option<[NaiveDate; 7]> {
	let start = date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))?;
	let mut week = [start; 7];
	for (i, day) in week.iter_mut().enumerate().skip(1) {
		*day = start.checked_add_days(Days::new(i as u64))?;
	}
	Some(week)
}

/// Monday..Sunday bounds of the ISO week `offset` weeks before the one holding `today`.
pub fn iso_week(today: NaiveDate, offset: i64) -> Option<(NaiveDate, NaiveDate)> {
	let monday = today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))?;
	let shift = Days::new(offset.unsigned_abs().checked_mul(7)?);
	let start = if offset >= 0 {
		monday.checked_sub_days(shift)?
	} else {
		monday.checked_add_days(shift)?
	};
	Some((start, start.checked_add_days(Days::new(6))?))
}

pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
	let first = date.with_day(1).unwrap_or(date);
	let last = first
		.checked_add_months(Months::new(1))
		.and_then(|next| next.pred_opt())
		.unwrap_or(date);
	(first, last)
}

pub fn year_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
	let first = date.with_ordinal(1).unwrap_or(date);
	let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
	(first, last)
}

/// RFC 3339 timestamp of local midnight, e.g. `2024-03-03T00:00:00+08:00`.
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> String {
	date.and_hms_opt(0, 0, 0)
		.and_then(|naive| offset.from_local_datetime(&naive).single())
		.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
		.unwrap_or_else(|| date.to_string())
}

pub fn weekday_name(day: Weekday) -> &'static str {
	match day {
		Weekday::Mon => "Monday",
		Weekday::Tue => "Tuesday",
		Weekday::Wed => "Wednesday",
		Weekday::Thu => "Thursday",
		Weekday::Fri => "Friday",
		Weekday::Sat => "Saturday",
		Weekday::Sun => "Sunday",
	}
}
