//! Splitting a mushaf page into memorization sections.
//!
//! A page is cut into at most [`SECTIONS_PER_PAGE`] runs of whole ayahs with
//! roughly equal Arabic letter counts. Sections are never empty, so a page
//! with few ayahs simply yields fewer sections.

use serde::{Deserialize, Serialize};

use crate::{error::AppError, types::SECTIONS_PER_PAGE};

#[derive(Debug, Clone, Deserialize)]
pub struct PageAyahForm {
	pub surah: i64,
	pub verse: i64,
	pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionRequest {
	pub chapter_number: i64,
	pub section: Option<i64>,
	pub verse: Option<String>,
	pub ayahs: Vec<PageAyahForm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAyah {
	pub surah: i64,
	pub verse: i64,
	pub letters: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AyahRef {
	pub surah: i64,
	pub verse: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	pub ayahs: Vec<PageAyah>,
	pub letters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
	pub number: usize,
	pub first: AyahRef,
	pub last: AyahRef,
	pub ayah_count: usize,
	pub letters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionPlan {
	pub chapter_number: i64,
	pub section: usize,
	pub verse: String,
	pub verse_begin: i64,
	pub verse_end: i64,
	pub total_letters: usize,
	pub sections: Vec<SectionSummary>,
}

fn is_diacritic(c: char) -> bool {
	matches!(c,
		'\u{0610}'..='\u{061A}'
		| '\u{064B}'..='\u{065F}'
		| '\u{0670}'
		| '\u{06D6}'..='\u{06ED}')
}

/// Letters of the Arabic block, ignoring harakat, Quranic marks and tatweel.
pub fn count_arabic_letters(text: &str) -> usize {
	text.chars()
		.filter(|&c| ('\u{0600}'..='\u{06FF}').contains(&c))
		.filter(|&c| c != '\u{0640}' && !is_diacritic(c))
		.count()
}

pub fn divide_page(ayahs: &[PageAyah]) -> Vec<Section> {
	let n = ayahs.len();
	if n == 0 {
		return Vec::new();
	}

	let total: usize = ayahs.iter().map(|a| a.letters).sum();
	let mut sections = Vec::with_capacity(SECTIONS_PER_PAGE);
	let mut start = 0;
	let mut used = 0;

	for cut in 1..SECTIONS_PER_PAGE {
		if start >= n {
			break;
		}
		let sections_after = SECTIONS_PER_PAGE - cut;
		// every later section needs at least one ayah
		if n - start <= sections_after {
			break;
		}

		let target = (total - used) as f64 / (sections_after + 1) as f64;
		let mut end = start;
		let mut sum = ayahs[end].letters;
		while end + 1 < n && (sum as f64) < target && n - (end + 1) > sections_after {
			end += 1;
			sum += ayahs[end].letters;
		}

		sections.push(Section { ayahs: ayahs[start..=end].to_vec(), letters: sum });
		used += sum;
		start = end + 1;
	}

	if start < n {
		let tail = ayahs[start..].to_vec();
		let letters = tail.iter().map(|a| a.letters).sum();
		sections.push(Section { ayahs: tail, letters });
	}

	sections.truncate(SECTIONS_PER_PAGE);
	sections
}

/// Index of the section whose first and last ayah span `begin..=end` of `surah`.
pub fn find_section_by_range(sections: &[Section], surah: i64, begin: i64, end: i64) -> Option<usize> {
	sections.iter().position(|section| match (section.ayahs.first(), section.ayahs.last()) {
		(Some(first), Some(last)) => first.surah == surah && first.verse <= begin && last.verse >= end,
		_ => false,
	})
}

/// Parses `"3 - 7"` (or a lone `"3"`) into an inclusive verse range.
pub fn parse_verse_range(raw: &str) -> Option<(i64, i64)> {
	let mut parts = raw.split('-').map(str::trim);
	let begin = parts.next()?.parse().ok()?;
	let end = match parts.next() {
		Some(end) if !end.is_empty() => end.parse().ok()?,
		_ => begin,
	};
	Some((begin, end))
}

pub fn plan(request: &SectionRequest) -> Result<SectionPlan, AppError> {
	if request.ayahs.is_empty() {
		return Err(AppError::bad_request("Page has no ayahs"));
	}

	let ayahs: Vec<PageAyah> = request
		.ayahs
		.iter()
		.map(|a| PageAyah { surah: a.surah, verse: a.verse, letters: count_arabic_letters(&a.text) })
		.collect();
	let chapter = request.chapter_number;

	let on_page: Vec<&PageAyah> = ayahs.iter().filter(|a| a.surah == chapter).collect();
	let (Some(page_first), Some(page_last)) = (on_page.first(), on_page.last()) else {
		return Err(AppError::not_found(format!("Chapter {chapter} does not appear on this page")));
	};

	let sections = divide_page(&ayahs);

	let mut number = request.section.filter(|&s| s > 0).unwrap_or(1) as usize;
	if let Some((begin, end)) = request.verse.as_deref().and_then(parse_verse_range) {
		number = find_section_by_range(&sections, chapter, begin, end).unwrap_or(0) + 1;
	}
	number = number.clamp(1, sections.len().max(1));

	let has_chapter = |section: &Section| section.ayahs.iter().any(|a| a.surah == chapter);
	if !has_chapter(&sections[number - 1]) {
		if let Some(index) = sections.iter().position(has_chapter) {
			number = index + 1;
		}
	}

	let in_section: Vec<&PageAyah> =
		sections[number - 1].ayahs.iter().filter(|a| a.surah == chapter).collect();
	let (verse_begin, verse_end) = match (in_section.first(), in_section.last()) {
		(Some(first), Some(last)) => (first.verse, last.verse),
		_ => (page_first.verse, page_last.verse),
	};

	let summaries = sections
		.iter()
		.enumerate()
		.filter_map(|(i, section)| {
			let first = section.ayahs.first()?;
			let last = section.ayahs.last()?;
			Some(SectionSummary {
				number: i + 1,
				first: AyahRef { surah: first.surah, verse: first.verse },
				last: AyahRef { surah: last.surah, verse: last.verse },
				ayah_count: section.ayahs.len(),
				letters: section.letters,
			})
		})
		.collect();

	Ok(SectionPlan {
		chapter_number: chapter,
		section: number,
		verse: format!("{verse_begin} - {verse_end}"),
		verse_begin,
		verse_end,
		total_letters: ayahs.iter().map(|a| a.letters).sum(),
		sections: summaries,
	})
}
