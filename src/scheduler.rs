//! Review scheduling.
//!
//! A card moves through a fixed ladder of review intervals, measured in whole
//! days from its creation date. Rescheduling always extends from the creation
//! date, never from "now", so the same inputs always produce the same date.

use chrono::{Days, NaiveDate};

/// One rung of the review ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LadderStep {
    Tomorrow,
    ThreeDays,
    OneWeek,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
}

impl LadderStep {
    pub const ALL: [LadderStep; 6] = [
        LadderStep::Tomorrow,
        LadderStep::ThreeDays,
        LadderStep::OneWeek,
        LadderStep::TwoWeeks,
        LadderStep::OneMonth,
        LadderStep::ThreeMonths,
    ];

    pub fn days(self) -> u64 {
        match self {
            LadderStep::Tomorrow => 1,
            LadderStep::ThreeDays => 3,
            LadderStep::OneWeek => 7,
            LadderStep::TwoWeeks => 14,
            LadderStep::OneMonth => 30,
            LadderStep::ThreeMonths => 90,
        }
    }

    /// The rung whose interval is exactly `days`, if any.
    pub fn from_days(days: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.days() as i64 == days)
    }

    /// The following rung. `ThreeMonths` is terminal and maps to itself.
    pub fn next(self) -> Self {
        match self {
            LadderStep::Tomorrow => LadderStep::ThreeDays,
            LadderStep::ThreeDays => LadderStep::OneWeek,
            LadderStep::OneWeek => LadderStep::TwoWeeks,
            LadderStep::TwoWeeks => LadderStep::OneMonth,
            LadderStep::OneMonth | LadderStep::ThreeMonths => LadderStep::ThreeMonths,
        }
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    // Only overflows at the end of chrono's representable range.
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Review date assigned to a freshly created card.
pub fn initial_review_date(created: NaiveDate) -> NaiveDate {
    add_days(created, LadderStep::Tomorrow.days())
}

/// Move a card one rung up the ladder.
///
/// The current rung is recovered from the distance between `current` and
/// `created`. Distances that are not on the ladder, and distances at or past
/// the last rung, land on the terminal 90-day plateau.
pub fn advance_review_date(created: NaiveDate, current: NaiveDate) -> NaiveDate {
    let elapsed = (current - created).num_days();
    let next = LadderStep::from_days(elapsed)
        .map(LadderStep::next)
        .unwrap_or(LadderStep::ThreeMonths);
    add_days(created, next.days())
}
