// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise model and the pure scheduling helpers used by listings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of an exercise. Stored explicitly on the document;
/// the only transition is upcoming -> completed via feedback submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStatus {
    Upcoming,
    Completed,
}

/// Stored exercise record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Generated exercise ID (also used as document ID)
    pub exercise_id: String,
    /// Owning athlete uid
    pub athlete_id: String,
    /// Physio uid that assigned the exercise
    pub assigned_by: String,
    /// Exercise title
    pub title: String,
    /// Countdown length in minutes
    pub timer_minutes: u32,
    /// Instruction media. Stored as a storage object name and resolved
    /// to a fetchable URL at read time.
    pub media_url: String,
    /// Due date while upcoming; actual completion time once completed (RFC3339)
    pub completion_date: String,
    pub status: ExerciseStatus,
    /// Athlete feedback, set on completion
    pub feedback: Option<String>,
    /// Reported pain level (0-10), set on completion
    pub pain_level: Option<i64>,
    /// Post-completion rating, set via the feedback edit path
    pub rating: Option<i64>,
    /// When the exercise was assigned
    pub created_at: String,
}

/// Exercise as returned by listings: the stored record plus the derived
/// expiry flag. The flag is only present for non-completed exercises.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseView {
    #[serde(flatten)]
    pub exercise: Exercise,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

/// Exercises for one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    /// Day key in `YYYY-MM-DD` form
    pub date: String,
    pub exercises: Vec<ExerciseView>,
}

/// An athlete's exercises grouped by day, split into upcoming and completed.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSchedule {
    pub upcoming: Vec<DayGroup>,
    pub completed: Vec<DayGroup>,
}

/// Whether a non-completed exercise has slipped past its due date.
///
/// Date-only comparison in UTC. Completed exercises are never classified,
/// and an unparseable date never counts as expired.
pub fn is_expired(status: ExerciseStatus, completion_date: &str, today: NaiveDate) -> bool {
    if status == ExerciseStatus::Completed {
        return false;
    }
    match chrono::DateTime::parse_from_rfc3339(completion_date) {
        Ok(dt) => dt.date_naive() < today,
        Err(_) => false,
    }
}

/// Day bucket key for a stored RFC3339 timestamp.
fn day_key(timestamp: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.date_naive().to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Group exercises into the schedule shape used by the athlete program view.
///
/// Buckets are keyed by the day of `completion_date` and iterated in natural
/// key order. Upcoming entries carry the derived expiry flag; completed
/// entries carry none.
pub fn build_schedule(exercises: Vec<Exercise>, today: NaiveDate) -> ExerciseSchedule {
    let mut upcoming: BTreeMap<String, Vec<ExerciseView>> = BTreeMap::new();
    let mut completed: BTreeMap<String, Vec<ExerciseView>> = BTreeMap::new();

    for exercise in exercises {
        let key = day_key(&exercise.completion_date);
        match exercise.status {
            ExerciseStatus::Upcoming => {
                let expired = is_expired(exercise.status, &exercise.completion_date, today);
                upcoming.entry(key).or_default().push(ExerciseView {
                    exercise,
                    expired: Some(expired),
                });
            }
            ExerciseStatus::Completed => {
                completed.entry(key).or_default().push(ExerciseView {
                    exercise,
                    expired: None,
                });
            }
        }
    }

    let into_groups = |buckets: BTreeMap<String, Vec<ExerciseView>>| {
        buckets
            .into_iter()
            .map(|(date, exercises)| DayGroup { date, exercises })
            .collect()
    };

    ExerciseSchedule {
        upcoming: into_groups(upcoming),
        completed: into_groups(completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, status: ExerciseStatus, completion_date: &str) -> Exercise {
        Exercise {
            exercise_id: id.to_string(),
            athlete_id: "athlete1".to_string(),
            assigned_by: "physio1".to_string(),
            title: format!("Exercise {}", id),
            timer_minutes: 5,
            media_url: "exercises/athlete1/1700000000000".to_string(),
            completion_date: completion_date.to_string(),
            status,
            feedback: None,
            pain_level: None,
            rating: None,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_expired_before_today() {
        assert!(is_expired(
            ExerciseStatus::Upcoming,
            "2026-03-14T23:59:59.000Z",
            today()
        ));
    }

    #[test]
    fn test_not_expired_same_day_or_later() {
        assert!(!is_expired(
            ExerciseStatus::Upcoming,
            "2026-03-15T00:00:00.000Z",
            today()
        ));
        assert!(!is_expired(
            ExerciseStatus::Upcoming,
            "2026-03-16T08:00:00.000Z",
            today()
        ));
    }

    #[test]
    fn test_completed_never_expired() {
        assert!(!is_expired(
            ExerciseStatus::Completed,
            "2020-01-01T00:00:00.000Z",
            today()
        ));
    }

    #[test]
    fn test_unparseable_date_not_expired() {
        assert!(!is_expired(ExerciseStatus::Upcoming, "not-a-date", today()));
    }

    #[test]
    fn test_schedule_groups_by_day_in_order() {
        let schedule = build_schedule(
            vec![
                sample("b", ExerciseStatus::Upcoming, "2026-03-20T10:00:00.000Z"),
                sample("a", ExerciseStatus::Upcoming, "2026-03-18T09:00:00.000Z"),
                sample("c", ExerciseStatus::Upcoming, "2026-03-20T15:00:00.000Z"),
            ],
            today(),
        );

        let dates: Vec<&str> = schedule.upcoming.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-18", "2026-03-20"]);
        assert_eq!(schedule.upcoming[1].exercises.len(), 2);
        assert!(schedule.completed.is_empty());
    }

    #[test]
    fn test_schedule_splits_status_and_flags_expiry() {
        let schedule = build_schedule(
            vec![
                sample("old", ExerciseStatus::Upcoming, "2026-03-10T10:00:00.000Z"),
                sample("done", ExerciseStatus::Completed, "2026-03-12T10:00:00.000Z"),
            ],
            today(),
        );

        assert_eq!(schedule.upcoming.len(), 1);
        assert_eq!(schedule.upcoming[0].exercises[0].expired, Some(true));

        assert_eq!(schedule.completed.len(), 1);
        assert_eq!(schedule.completed[0].exercises[0].expired, None);
    }
}
