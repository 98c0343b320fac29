//! Ticket urgency classifier
//!
//! Maps a ticket's category, subcategory and submission time to a discrete
//! urgency level. Deterministic and side-effect free: same inputs always
//! yield the same output, safe to call from any thread.

use crate::models::UrgencyLevel;
use crate::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Base score per ticket category; unknown categories fall back to the default.
const CATEGORY_SCORES: &[(&str, i32)] = &[
    ("Payments & Transfers", 35),
    ("IT Support", 32),
    ("Digital Banking", 30),
    ("Card Services", 28),
    ("Accounts & Deposits", 22),
    ("Loans & Mortgages", 20),
    ("General Inquiry", 12),
    ("Customer Support", 10),
];

const DEFAULT_CATEGORY_SCORE: i32 = 15;

/// Exact subcategory multipliers. Consulted before the substring patterns so
/// a specific rule always wins over a generic one.
const SUBCATEGORY_MULTIPLIERS: &[(&str, f32)] = &[
    ("System Outage", 1.30),
    ("Security Concerns", 1.25),
    ("Failed Transactions", 1.25),
    ("Card Blocking", 1.20),
    ("Account Access", 1.15),
    ("General Question", 0.90),
    ("Feedback", 0.80),
];

/// Substring fallbacks for subcategories without an exact entry.
const SUBCATEGORY_PATTERNS: &[(&str, f32)] = &[
    ("Fraud", 1.35),
    ("Outage", 1.20),
    ("Urgent", 1.20),
    ("Failed", 1.15),
];

// Score thresholds
const CRITICAL_THRESHOLD: i32 = 65;
const HIGH_THRESHOLD: i32 = 45;
const MEDIUM_THRESHOLD: i32 = 25;

/// Local submission timestamps, second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Urgency classifier
pub struct UrgencyClassifier;

impl UrgencyClassifier {
    /// Classify from a raw local timestamp string.
    ///
    /// A malformed timestamp is a hard error rather than a silent default:
    /// mis-classified urgency drives the wrong routing and SLA.
    pub fn classify(
        category: &str,
        sub_category: &str,
        submitted_at: &str,
    ) -> Result<UrgencyLevel> {
        let ts = NaiveDateTime::parse_from_str(submitted_at, TIMESTAMP_FORMAT)?;
        Ok(Self::classify_at(category, sub_category, ts))
    }

    /// Classify from an already-parsed submission time.
    pub fn classify_at(
        category: &str,
        sub_category: &str,
        submitted_at: NaiveDateTime,
    ) -> UrgencyLevel {
        if is_critical_override(category, sub_category, submitted_at) {
            return UrgencyLevel::Critical;
        }

        let base = category_score(category);
        let multiplier = subcategory_multiplier(sub_category);
        let mut score = (base as f32 * multiplier) as i32;
        score += time_adjustments(submitted_at);

        match score {
            s if s >= CRITICAL_THRESHOLD => UrgencyLevel::Critical,
            s if s >= HIGH_THRESHOLD => UrgencyLevel::High,
            s if s >= MEDIUM_THRESHOLD => UrgencyLevel::Medium,
            _ => UrgencyLevel::Low,
        }
    }
}

/// Combinations that route straight to Critical, bypassing the score.
fn is_critical_override(category: &str, sub_category: &str, submitted_at: NaiveDateTime) -> bool {
    match (category, sub_category) {
        ("Digital Banking", "Security Concerns") => true,
        ("IT Support", "System Outage") => true,
        ("Card Services", "Card Blocking") => true,
        ("Digital Banking", sub) if sub.contains("Fraud") => true,
        // A failed transfer with no banking staff available to reverse it.
        ("Payments & Transfers", "Failed Transactions") => !is_banking_hours(submitted_at),
        _ => false,
    }
}

fn category_score(category: &str) -> i32 {
    CATEGORY_SCORES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_CATEGORY_SCORE)
}

fn subcategory_multiplier(sub_category: &str) -> f32 {
    if let Some((_, multiplier)) = SUBCATEGORY_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == sub_category)
    {
        return *multiplier;
    }

    SUBCATEGORY_PATTERNS
        .iter()
        .find(|(pattern, _)| sub_category.contains(pattern))
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// Additive adjustments from the submission time. Each rule is evaluated
/// independently; several can apply to the same timestamp.
fn time_adjustments(ts: NaiveDateTime) -> i32 {
    let weekday = is_weekday(ts);
    let hour = ts.hour();
    let day = ts.day();
    let last_day = days_in_month(ts.year(), ts.month());

    let mut adjustment = 0;

    // Weekday submissions outside 09:00-17:00.
    if weekday && !(9..17).contains(&hour) {
        adjustment += 20;
    }
    // Late-afternoon settlement crunch.
    if weekday && (16..18).contains(&hour) {
        adjustment += 15;
    }
    // Month-end closing window, last 3 calendar days.
    if day > last_day.saturating_sub(3) {
        adjustment += 15;
    }
    if !weekday {
        adjustment += 12;
    }
    // Early-morning prep before branches open.
    if weekday && (6..8).contains(&hour) {
        adjustment += 10;
    }
    // Month-start processing, days 1-3.
    if weekday && day <= 3 {
        adjustment += 8;
    }
    // Fiscal quarter end: last 6 days of March/June/September/December.
    if matches!(ts.month(), 3 | 6 | 9 | 12) && day > last_day.saturating_sub(6) {
        adjustment += 10;
    }

    adjustment
}

/// Weekday 09:00-17:00 local.
fn is_banking_hours(ts: NaiveDateTime) -> bool {
    is_weekday(ts) && (9..17).contains(&ts.hour())
}

fn is_weekday(ts: NaiveDateTime) -> bool {
    !matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_system_outage_always_critical() {
        // Override rule fires regardless of submission time.
        let cases = vec![
            "2024-05-15T10:00:00", // Wednesday, banking hours
            "2024-06-15T11:00:00", // Saturday
            "2024-12-31T23:59:59", // quarter end, late night
        ];

        for ts in cases {
            assert_eq!(
                UrgencyClassifier::classify("IT Support", "System Outage", ts).unwrap(),
                UrgencyLevel::Critical
            );
        }
    }

    #[test]
    fn test_remaining_overrides() {
        let wednesday = at("2024-05-15T10:00:00");

        assert_eq!(
            UrgencyClassifier::classify_at("Digital Banking", "Security Concerns", wednesday),
            UrgencyLevel::Critical
        );
        assert_eq!(
            UrgencyClassifier::classify_at("Card Services", "Card Blocking", wednesday),
            UrgencyLevel::Critical
        );
        assert_eq!(
            UrgencyClassifier::classify_at("Digital Banking", "Suspected Fraud", wednesday),
            UrgencyLevel::Critical
        );
    }

    #[test]
    fn test_failed_transactions_override_needs_off_hours() {
        // During banking hours the score path applies: trunc(35 * 1.25) = 43.
        assert_eq!(
            UrgencyClassifier::classify_at(
                "Payments & Transfers",
                "Failed Transactions",
                at("2024-05-15T10:00:00")
            ),
            UrgencyLevel::Medium
        );

        // Weekend counts as outside banking hours.
        assert_eq!(
            UrgencyClassifier::classify_at(
                "Payments & Transfers",
                "Failed Transactions",
                at("2024-06-15T11:00:00")
            ),
            UrgencyLevel::Critical
        );
    }

    #[test]
    fn test_weekend_feedback_is_low() {
        // Saturday: trunc(10 * 0.8) + 12 = 20, below the Medium threshold.
        assert_eq!(
            UrgencyClassifier::classify("Customer Support", "Feedback", "2024-06-15T11:00:00")
                .unwrap(),
            UrgencyLevel::Low
        );
    }

    #[test]
    fn test_score_thresholds() {
        // trunc(30 * 1.15) = 34, late afternoon +15 => 49 -> High.
        assert_eq!(
            UrgencyClassifier::classify_at(
                "Digital Banking",
                "Account Access",
                at("2024-05-15T16:30:00")
            ),
            UrgencyLevel::High
        );

        // 34, outside hours +20, late afternoon +15 => 69 -> Critical.
        assert_eq!(
            UrgencyClassifier::classify_at(
                "Digital Banking",
                "Account Access",
                at("2024-05-15T17:30:00")
            ),
            UrgencyLevel::Critical
        );

        // 34 with no adjustments -> Medium.
        assert_eq!(
            UrgencyClassifier::classify_at(
                "Digital Banking",
                "Account Access",
                at("2024-05-15T10:00:00")
            ),
            UrgencyLevel::Medium
        );
    }

    #[test]
    fn test_unknown_category_defaults() {
        // trunc(15 * 1.0) = 15 with no adjustments -> Low.
        assert_eq!(
            UrgencyClassifier::classify_at("Branch Lobby", "Other", at("2024-05-15T10:00:00")),
            UrgencyLevel::Low
        );
    }

    #[test]
    fn test_exact_match_beats_substring() {
        assert_eq!(subcategory_multiplier("System Outage"), 1.30);
        // No exact entry, so the "Outage" pattern applies.
        assert_eq!(subcategory_multiplier("Network Outage"), 1.20);
        assert_eq!(subcategory_multiplier("Something Else"), 1.0);
    }

    #[test]
    fn test_time_adjustments_accumulate() {
        // Friday 2024-03-29 17:30: outside hours +20, late afternoon +15,
        // month-end +15, quarter-end +10.
        assert_eq!(time_adjustments(at("2024-03-29T17:30:00")), 60);

        // Quiet mid-month weekday morning.
        assert_eq!(time_adjustments(at("2024-05-15T10:00:00")), 0);

        // Saturday mid-month: weekend only.
        assert_eq!(time_adjustments(at("2024-06-15T11:00:00")), 12);

        // Monday the 1st at 07:00: outside hours +20, early morning +10,
        // month-start +8.
        assert_eq!(time_adjustments(at("2024-07-01T07:00:00")), 38);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first =
            UrgencyClassifier::classify("Card Services", "Card Replacement", "2024-05-15T14:00:00")
                .unwrap();
        let second =
            UrgencyClassifier::classify("Card Services", "Card Replacement", "2024-05-15T14:00:00")
                .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_timestamp_is_an_error() {
        assert!(UrgencyClassifier::classify("IT Support", "Slow App", "yesterday").is_err());
        assert!(UrgencyClassifier::classify("IT Support", "Slow App", "2024-13-40T25:00:00").is_err());
    }
}
