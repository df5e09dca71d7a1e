use chrono::{DateTime, TimeZone, Utc};
use derivative::Derivative;
use std::fmt;

// Importance of a task. Ordering follows the declaration order: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Derivative)]
#[derivative(Default)]
pub enum Priority {
    #[derivative(Default)]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    // Position of the priority, which is also the value stored in the database
    pub fn ordinal(self) -> i32 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    // Unknown values fall back to Low
    pub fn from_ordinal(value: i32) -> Priority {
        match value {
            1 => Priority::Medium,
            2 => Priority::High,
            _ => Priority::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    // Cycle LOW -> MEDIUM -> HIGH -> LOW, used by the edit form
    pub fn next(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Option<i32>,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub completed: bool,
}

impl Task {
    // A task that has not been stored yet
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        due_date: DateTime<Utc>,
    ) -> Task {
        Task {
            id: None,
            title: title.into(),
            description: description.into(),
            due_date,
            priority,
            completed: false,
        }
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    // Pending and due on a day before today, as seen from `now`'s time zone.
    // Due dates are calendar days stored at midnight UTC
    pub fn is_overdue<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        !self.completed && self.due_date.date_naive() < now.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn priority_ordinal_roundtrip_and_fallback() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_ordinal(priority.ordinal()), priority);
        }
        assert_eq!(Priority::from_ordinal(7), Priority::Low);
        assert_eq!(Priority::from_ordinal(-1), Priority::Low);
    }

    #[test]
    fn priority_cycles_and_orders() {
        assert_eq!(Priority::default(), Priority::Low);
        assert_eq!(Priority::Low.next(), Priority::Medium);
        assert_eq!(Priority::High.next(), Priority::Low);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn new_task_is_pending_and_unsaved() {
        let task = Task::new("Buy milk", "", Priority::High, Utc::now());
        assert_eq!(task.id, None);
        assert!(!task.completed);
        assert!(!task.has_description());
    }

    #[test]
    fn overdue_means_pending_and_due_before_today() {
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 15, 0, 0).unwrap();
        let mut task = Task::new("t", "", Priority::Low, now - chrono::Duration::days(1));
        assert!(task.is_overdue(&now));

        task.due_date = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();
        assert!(!task.is_overdue(&now));

        task.due_date = now - chrono::Duration::days(3);
        task.completed = true;
        assert!(!task.is_overdue(&now));
    }

    #[test]
    fn due_today_is_not_overdue_west_of_utc_in_the_evening() {
        // 21:00 on 10 April at UTC-7 is already 11 April in UTC
        let evening = FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 4, 10, 21, 0, 0)
            .unwrap();
        let due_today = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();
        let task = Task::new("t", "", Priority::Low, due_today);
        assert!(!task.is_overdue(&evening));

        let next_morning = evening + chrono::Duration::hours(4);
        assert!(task.is_overdue(&next_morning));
    }
}
