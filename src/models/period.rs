use chrono::{Datelike, Duration, NaiveDate};

/// How long a budget runs for. The window is fixed when the budget is
/// created; a new period means a new budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A closed calendar interval [start, end]. Both endpoints count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// The window containing `anchor` for the given period kind.
    ///
    /// Weeks begin on Sunday; months and years follow the calendar.
    pub(crate) fn for_period(period: Period, anchor: NaiveDate) -> Self {
        match period {
            Period::Weekly => {
                let start =
                    anchor - Duration::days(i64::from(anchor.weekday().num_days_from_sunday()));
                Self {
                    start,
                    end: start + Duration::days(6),
                }
            }
            Period::Monthly => Self {
                start: first_of_month(anchor),
                end: last_of_month(anchor),
            },
            Period::Yearly => Self {
                start: NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor),
                end: NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap_or(anchor),
            },
        }
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Closed-interval overlap: touching endpoints count.
    pub(crate) fn overlaps(&self, other: &Window) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}
