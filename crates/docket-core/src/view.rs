use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Task;
use crate::date::{format_day, parse_day, tomorrow, week_bounds};
use crate::error::ValidationError;

/// Top-level task list a user can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Incomplete tasks due today.
    Today,
    /// Incomplete tasks flagged important.
    Important,
    /// Incomplete tasks with a due date, narrowed by a [`PlannedFilter`].
    Planned,
    /// Completed tasks.
    Completed,
    /// Every incomplete task.
    #[default]
    All,
}

impl View {
    /// Every view in navigation order.
    pub const ALL: [Self; 5] = [Self::Today, Self::Important, Self::Planned, Self::Completed, Self::All];

    /// Page title shown above the list.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Important => "Important",
            Self::Planned => "Planned",
            Self::Completed => "Completed",
            Self::All => "All",
        }
    }

    /// Token accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Important => "important",
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::All => "all",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "today" => Ok(Self::Today),
            "important" | "starred" => Ok(Self::Important),
            "planned" => Ok(Self::Planned),
            "completed" | "done" => Ok(Self::Completed),
            "all" | "pending" | "default" => Ok(Self::All),
            _ => Err(ValidationError::UnknownView { token: s.to_owned() }),
        }
    }
}

/// Secondary filter that only applies inside [`View::Planned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlannedFilter {
    /// Every planned task.
    #[default]
    All,
    /// Due today.
    Today,
    /// Due tomorrow.
    Tomorrow,
    /// Due strictly before today.
    Overdue,
    /// Due between Sunday and Saturday of the current week.
    ThisWeek,
    /// Due on a picked day; nothing matches until a day is picked.
    CustomDate(Option<Date>),
}

impl PlannedFilter {
    /// Fixed sub-filters in the order they are offered.
    pub const PRESETS: [Self; 5] = [Self::All, Self::Today, Self::Tomorrow, Self::Overdue, Self::ThisWeek];

    /// Button label for the sub-filter bar.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::All => "All Planned".to_owned(),
            Self::Today => "Today".to_owned(),
            Self::Tomorrow => "Tomorrow".to_owned(),
            Self::Overdue => "Overdue".to_owned(),
            Self::ThisWeek => "This week".to_owned(),
            Self::CustomDate(Some(day)) => format_day(day),
            Self::CustomDate(None) => "Pick a date".to_owned(),
        }
    }

    /// Next preset in cycling order. A custom date cycles back to `All`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Today,
            Self::Today => Self::Tomorrow,
            Self::Tomorrow => Self::Overdue,
            Self::Overdue => Self::ThisWeek,
            Self::ThisWeek | Self::CustomDate(_) => Self::All,
        }
    }

    fn accepts(self, due: Date, today: Date) -> bool {
        match self {
            Self::All => true,
            Self::Today => due == today,
            Self::Tomorrow => tomorrow(today) == Some(due),
            Self::Overdue => due < today,
            Self::ThisWeek => {
                let (start, end) = week_bounds(today);
                start <= due && due <= end
            }
            Self::CustomDate(picked) => picked == Some(due),
        }
    }
}

impl FromStr for PlannedFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "all" | "all_planned" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "overdue" => Ok(Self::Overdue),
            "this_week" | "thisweek" | "week" => Ok(Self::ThisWeek),
            "custom" | "custom_date" | "customdate" => Ok(Self::CustomDate(None)),
            _ => parse_day(s)
                .map(|day| Self::CustomDate(Some(day)))
                .map_err(|_| ValidationError::UnknownPlannedFilter { token: s.to_owned() }),
        }
    }
}

/// Active view plus its transient sub-filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSelection {
    /// Active view.
    pub view: View,
    /// Sub-filter, consulted only for [`View::Planned`].
    pub planned: PlannedFilter,
}

impl ViewSelection {
    /// Select `view` with the sub-filter reset.
    #[must_use]
    pub fn new(view: View) -> Self {
        Self {
            view,
            planned: PlannedFilter::default(),
        }
    }

    /// Replace the sub-filter.
    #[must_use]
    pub const fn with_planned(mut self, planned: PlannedFilter) -> Self {
        self.planned = planned;
        self
    }

    /// Pick a custom day, or fall back to all planned tasks when cleared.
    #[must_use]
    pub const fn with_custom_date(mut self, day: Option<Date>) -> Self {
        self.planned = match day {
            Some(day) => PlannedFilter::CustomDate(Some(day)),
            None => PlannedFilter::All,
        };
        self
    }

    /// Returns true when `task` belongs to this selection on `today`.
    #[must_use]
    pub fn matches(&self, task: &Task, today: Date) -> bool {
        match self.view {
            View::Today => is_due_today(task, today),
            View::Important => is_pending_important(task),
            View::Planned => is_planned(task, self.planned, today),
            View::Completed => task.completed,
            View::All => task.is_pending(),
        }
    }

    /// Human-readable summary, e.g. `Planned / Overdue`.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.view {
            View::Planned => format!("{} / {}", self.view.title(), self.planned.label()),
            other => other.title().to_owned(),
        }
    }
}

fn is_due_today(task: &Task, today: Date) -> bool {
    task.is_pending() && task.is_due_on(today)
}

const fn is_pending_important(task: &Task) -> bool {
    task.important && task.is_pending()
}

fn is_planned(task: &Task, filter: PlannedFilter, today: Date) -> bool {
    if !task.is_pending() {
        return false;
    }
    task.due_date.is_some_and(|due| filter.accepts(due, today))
}

/// Ordered subset of `tasks` visible under `selection` on `today`.
///
/// Relative order is preserved; the input is never modified.
#[must_use]
pub fn select_view<'a>(tasks: &'a [Task], selection: &ViewSelection, today: Date) -> Vec<&'a Task> {
    tasks.iter().filter(|task| selection.matches(task, today)).collect()
}

/// Number of incomplete important tasks, shown as the Important badge.
#[must_use]
pub fn important_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| is_pending_important(task)).count()
}

fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskId;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 03 - 12); // Wednesday

    fn task(id: u64, title: &str) -> Task {
        Task::new(TaskId(id), title)
    }

    fn due(id: u64, day: Date) -> Task {
        let mut t = task(id, "due");
        t.due_date = Some(day);
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id.0).collect()
    }

    fn planned(filter: PlannedFilter) -> ViewSelection {
        ViewSelection::new(View::Planned).with_planned(filter)
    }

    #[test]
    fn today_requires_due_today_and_pending() {
        let mut done = due(2, TODAY);
        done.completed = true;
        let tasks = vec![due(1, TODAY), done, due(3, date!(2025 - 03 - 13)), task(4, "undated")];
        let visible = select_view(&tasks, &ViewSelection::new(View::Today), TODAY);
        assert_eq!(ids(&visible), vec![1]);
    }

    #[test]
    fn important_excludes_completed_tasks() {
        let mut starred = task(1, "starred");
        starred.important = true;
        let mut starred_done = task(2, "starred done");
        starred_done.important = true;
        starred_done.completed = true;
        let tasks = vec![starred, starred_done, task(3, "plain")];
        let visible = select_view(&tasks, &ViewSelection::new(View::Important), TODAY);
        assert_eq!(ids(&visible), vec![1]);
        assert_eq!(important_count(&tasks), 1);
    }

    #[test]
    fn completed_ignores_dates_and_importance() {
        let mut a = due(1, date!(2020 - 01 - 01));
        a.completed = true;
        let mut b = task(2, "b");
        b.completed = true;
        b.important = true;
        let tasks = vec![a, task(3, "open"), b];
        let visible = select_view(&tasks, &ViewSelection::new(View::Completed), TODAY);
        assert_eq!(ids(&visible), vec![1, 2]);
    }

    #[test]
    fn all_lists_pending_tasks_in_input_order() {
        let mut done = task(2, "done");
        done.completed = true;
        let tasks = vec![task(3, "c"), done, task(1, "a")];
        let visible = select_view(&tasks, &ViewSelection::default(), TODAY);
        assert_eq!(ids(&visible), vec![3, 1]);
    }

    #[test]
    fn planned_sub_filters() {
        let tasks = vec![
            due(1, date!(2025 - 03 - 11)), // yesterday
            due(2, TODAY),
            due(3, date!(2025 - 03 - 13)), // tomorrow
            due(4, date!(2025 - 03 - 15)), // saturday
            due(5, date!(2025 - 03 - 16)), // next sunday
            due(6, date!(2025 - 03 - 09)), // this sunday
            task(7, "undated"),
        ];

        let all = select_view(&tasks, &planned(PlannedFilter::All), TODAY);
        assert_eq!(ids(&all), vec![1, 2, 3, 4, 5, 6]);

        let today = select_view(&tasks, &planned(PlannedFilter::Today), TODAY);
        assert_eq!(ids(&today), vec![2]);

        let tomorrow = select_view(&tasks, &planned(PlannedFilter::Tomorrow), TODAY);
        assert_eq!(ids(&tomorrow), vec![3]);

        let overdue = select_view(&tasks, &planned(PlannedFilter::Overdue), TODAY);
        assert_eq!(ids(&overdue), vec![1, 6]);

        let week = select_view(&tasks, &planned(PlannedFilter::ThisWeek), TODAY);
        assert_eq!(ids(&week), vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn due_today_is_never_overdue() {
        let tasks = vec![due(1, TODAY)];
        assert!(select_view(&tasks, &planned(PlannedFilter::Overdue), TODAY).is_empty());
        assert_eq!(select_view(&tasks, &planned(PlannedFilter::Today), TODAY).len(), 1);
    }

    #[test]
    fn custom_date_without_a_day_is_empty() {
        let tasks = vec![due(1, TODAY), due(2, date!(2025 - 04 - 01))];
        assert!(select_view(&tasks, &planned(PlannedFilter::CustomDate(None)), TODAY).is_empty());
        let picked = planned(PlannedFilter::CustomDate(Some(date!(2025 - 04 - 01))));
        assert_eq!(ids(&select_view(&tasks, &picked, TODAY)), vec![2]);
    }

    #[test]
    fn planned_skips_completed_even_when_dated() {
        let mut done = due(1, TODAY);
        done.completed = true;
        let tasks = vec![done];
        assert!(select_view(&tasks, &planned(PlannedFilter::All), TODAY).is_empty());
    }

    #[test]
    fn with_custom_date_switches_sub_filter() {
        let selection = ViewSelection::new(View::Planned).with_custom_date(Some(TODAY));
        assert_eq!(selection.planned, PlannedFilter::CustomDate(Some(TODAY)));
        let cleared = selection.with_custom_date(None);
        assert_eq!(cleared.planned, PlannedFilter::All);
    }

    #[test]
    fn parses_view_tokens() {
        let parse = |token: &str| token.parse::<View>().unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parse(" Today "), View::Today);
        assert_eq!(parse("IMPORTANT"), View::Important);
        assert_eq!(parse("pending"), View::All);
        assert!("someday".parse::<View>().is_err());
    }

    #[test]
    fn parses_planned_filter_tokens() {
        let parse = |token: &str| token.parse::<PlannedFilter>().unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parse("this-week"), PlannedFilter::ThisWeek);
        assert_eq!(parse("This Week"), PlannedFilter::ThisWeek);
        assert_eq!(parse("overdue"), PlannedFilter::Overdue);
        assert_eq!(parse("2025-03-20"), PlannedFilter::CustomDate(Some(date!(2025 - 03 - 20))));
        assert!(matches!(
            "later".parse::<PlannedFilter>(),
            Err(ValidationError::UnknownPlannedFilter { .. })
        ));
    }

    #[test]
    fn cycling_returns_to_all() {
        let mut filter = PlannedFilter::All;
        for _ in 0..PlannedFilter::PRESETS.len() {
            filter = filter.next();
        }
        assert_eq!(filter, PlannedFilter::All);
        assert_eq!(PlannedFilter::CustomDate(Some(TODAY)).next(), PlannedFilter::All);
    }

    #[test]
    fn summary_mentions_sub_filter_only_for_planned() {
        assert_eq!(planned(PlannedFilter::Overdue).summary(), "Planned / Overdue");
        assert_eq!(ViewSelection::new(View::Today).summary(), "Today");
    }
}
