//! Relative time expressions in queries
//!
//! Detects phrases like "from 6 months ago" or "two weeks ago" inside a
//! query and turns them into a lower-bound cutoff timestamp. The recognized
//! grammar lives in the tables below; nothing else is guessed. Units are
//! nominal (a month is 30 days), not calendar-accurate.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Unit word -> nominal length in days.
const UNIT_DAYS: &[(&str, i64)] = &[("day", 1), ("week", 7), ("month", 30), ("year", 365)];

/// Spelled-out quantities accepted in place of digits.
const WORD_QUANTITIES: &[(&str, i64)] = &[
	("a", 1),
	("an", 1),
	("one", 1),
	("two", 2),
	("three", 3),
	("four", 4),
	("five", 5),
	("six", 6),
	("seven", 7),
	("eight", 8),
	("nine", 9),
	("ten", 10),
];

static TIME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
	let words: Vec<&str> = WORD_QUANTITIES.iter().map(|(w, _)| *w).collect();
	let units: Vec<&str> = UNIT_DAYS.iter().map(|(u, _)| *u).collect();
	let pattern = format!(
		r"(?i)\b(?:from\s+)?(\d+|{})\s+({})s?\s+ago\b",
		words.join("|"),
		units.join("|"),
	);
	Regex::new(&pattern).expect("failed to build time grammar regex")
});

/// Residual query text plus an optional cutoff, consumed once per search.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
	pub text: String,
	pub cutoff: Option<DateTime<Utc>>,
}

/// Split raw query text into residual text and an optional cutoff computed
/// against `now`. Without a recognized phrase the text passes through
/// unchanged and the time filter is unbounded.
pub fn parse_query(raw: &str, now: DateTime<Utc>) -> QueryPlan {
	let Some(caps) = TIME_PHRASE.captures(raw) else {
		return QueryPlan { text: raw.trim().to_string(), cutoff: None };
	};

	let quantity = parse_quantity(&caps[1]);
	let unit_days = lookup_unit(&caps[2]);
	// Quantities large enough to overflow the date range would exclude
	// nothing anyway; the bound is dropped rather than clamped.
	let cutoff = quantity
		.checked_mul(unit_days)
		.and_then(Duration::try_days)
		.and_then(|days| now.checked_sub_signed(days));

	let cleaned = TIME_PHRASE.replace(raw, " ");
	let text = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

	QueryPlan { text, cutoff }
}

fn parse_quantity(token: &str) -> i64 {
	if token.chars().all(|c| c.is_ascii_digit()) {
		// Digit runs too long for i64 saturate; the overflow check in
		// parse_query turns them into an unbounded filter.
		return token.parse().unwrap_or(i64::MAX);
	}
	WORD_QUANTITIES
		.iter()
		.find(|(word, _)| word.eq_ignore_ascii_case(token))
		.map(|(_, n)| *n)
		.unwrap_or(0)
}

fn lookup_unit(token: &str) -> i64 {
	UNIT_DAYS
		.iter()
		.find(|(unit, _)| unit.eq_ignore_ascii_case(token))
		.map(|(_, days)| *days)
		.unwrap_or(0)
}
