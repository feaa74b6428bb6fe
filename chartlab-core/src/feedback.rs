//! Human-readable feedback lists and the formatting helpers shared by every grader.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Feedback shown to the learner after grading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
}

impl Feedback {
    pub fn correct(&mut self, message: impl Into<String>) {
        self.correct.push(message.into());
    }

    pub fn incorrect(&mut self, message: impl Into<String>) {
        self.incorrect.push(message.into());
    }

    pub fn extend(&mut self, other: Feedback) {
        self.correct.extend(other.correct);
        self.incorrect.extend(other.incorrect);
    }

    pub fn is_empty(&self) -> bool {
        self.correct.is_empty() && self.incorrect.is_empty()
    }
}

/// Unix seconds as `YYYY-MM-DD HH:MM` UTC; out-of-range values print raw.
pub fn format_time(time: i64) -> String {
    DateTime::from_timestamp(time, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| time.to_string())
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_utc_time() {
        assert_eq!(format_time(1_609_459_200), "2021-01-01 00:00");
        assert_eq!(format_time(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn extend_appends_both_lists() {
        let mut a = Feedback::default();
        a.correct("one");
        let mut b = Feedback::default();
        b.incorrect("two");
        a.extend(b);
        assert_eq!(a.correct, vec!["one"]);
        assert_eq!(a.incorrect, vec!["two"]);
        assert_eq!(format_price(10.0), "10.00");
    }
}
