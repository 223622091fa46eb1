//! Temporal graph models: events, time-bounded facts, and timeframe resolution.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An instantaneous (or duration-bounded) happening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalEvent {
    pub uuid: Uuid,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
}

impl TemporalEvent {
    pub fn new(description: String, occurred_at: DateTime<Utc>, duration_secs: Option<i64>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            description,
            occurred_at,
            duration_secs,
        }
    }
}

/// A time-bounded (subject, predicate, object) assertion.
///
/// `valid_to` is absent while the fact holds; setting it invalidates the
/// fact as of that instant rather than deleting the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFact {
    pub uuid: Uuid,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub valid_from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl TemporalFact {
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.valid_from && self.valid_to.map_or(true, |end| instant < end)
    }
}

/// A resolved `[from, to]` window, half-open-by-convention on the `to` side
/// for fact validity checks.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// The three ways a caller may express "when" for a timeline query.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timeframe {
    /// A single instant; resolves to `[v-1s, v+1s]`.
    Specific { at: DateTime<Utc> },
    /// A range; resolves to `[from, to ?? now]`.
    Range {
        from: DateTime<Utc>,
        #[serde(default)]
        to: Option<DateTime<Utc>>,
    },
    /// A free-text relative expression, e.g. "last week", "yesterday".
    Relative { expr: String },
}

impl Timeframe {
    /// Resolves this timeframe to a concrete window, per the documented rules.
    pub fn resolve(&self, now: DateTime<Utc>) -> TimeWindow {
        match self {
            Timeframe::Specific { at } => TimeWindow {
                from: *at - Duration::seconds(1),
                to: *at + Duration::seconds(1),
            },
            Timeframe::Range { from, to } => TimeWindow {
                from: *from,
                to: to.unwrap_or(now),
            },
            Timeframe::Relative { expr } => resolve_relative(expr, now),
        }
    }
}

/// Parses phrases like "last hour", "yesterday", "past week", "last month",
/// "last year"; defaults to the last week when unrecognized.
fn resolve_relative(expr: &str, now: DateTime<Utc>) -> TimeWindow {
    let lower = expr.to_lowercase();
    let span = if lower.contains("hour") {
        Duration::hours(1)
    } else if lower.contains("yesterday") || lower.contains("day") {
        Duration::days(1)
    } else if lower.contains("month") {
        Duration::days(30)
    } else if lower.contains("year") {
        Duration::days(365)
    } else {
        Duration::weeks(1)
    };

    TimeWindow {
        from: now - span,
        to: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_resolves_to_one_second_window() {
        let at = Utc::now();
        let window = Timeframe::Specific { at }.resolve(at);
        assert_eq!(window.from, at - Duration::seconds(1));
        assert_eq!(window.to, at + Duration::seconds(1));
    }

    #[test]
    fn range_without_end_defaults_to_now() {
        let now = Utc::now();
        let from = now - Duration::days(3);
        let window = Timeframe::Range { from, to: None }.resolve(now);
        assert_eq!(window.from, from);
        assert_eq!(window.to, now);
    }

    #[test]
    fn range_with_end_keeps_it() {
        let now = Utc::now();
        let from = now - Duration::days(3);
        let to = now - Duration::days(1);
        let window = Timeframe::Range { from, to: Some(to) }.resolve(now);
        assert_eq!(window.to, to);
    }

    #[test]
    fn relative_recognizes_known_phrases() {
        let now = Utc::now();
        let hour = Timeframe::Relative { expr: "past hour".into() }.resolve(now);
        assert_eq!(hour.from, now - Duration::hours(1));

        let yesterday = Timeframe::Relative { expr: "yesterday".into() }.resolve(now);
        assert_eq!(yesterday.from, now - Duration::days(1));

        let month = Timeframe::Relative { expr: "last month".into() }.resolve(now);
        assert_eq!(month.from, now - Duration::days(30));

        let year = Timeframe::Relative { expr: "last year".into() }.resolve(now);
        assert_eq!(year.from, now - Duration::days(365));
    }

    #[test]
    fn relative_defaults_to_last_week_when_unrecognized() {
        let now = Utc::now();
        let window = Timeframe::Relative { expr: "whenever".into() }.resolve(now);
        assert_eq!(window.from, now - Duration::weeks(1));
    }

    #[test]
    fn fact_is_valid_within_window() {
        let from = Utc::now() - Duration::days(1);
        let fact = TemporalFact {
            uuid: Uuid::new_v4(),
            subject: "a".into(),
            predicate: "b".into(),
            object: "c".into(),
            valid_from: from,
            valid_to: None,
        };
        assert!(fact.is_valid_at(Utc::now()));
        assert!(!fact.is_valid_at(from - Duration::seconds(1)));
    }

    #[test]
    fn invalidated_fact_is_not_valid_after_valid_to() {
        let now = Utc::now();
        let fact = TemporalFact {
            uuid: Uuid::new_v4(),
            subject: "a".into(),
            predicate: "b".into(),
            object: "c".into(),
            valid_from: now - Duration::days(2),
            valid_to: Some(now),
        };
        assert!(fact.is_valid_at(now - Duration::days(1)));
        assert!(!fact.is_valid_at(now));
    }
}
