#![allow(missing_docs)]

use docket_core::{
    PlannedFilter, Task, TaskId, View, ViewSelection, important_count, merge_subset_order, move_item,
    select_view,
};
use proptest::prelude::*;
use time::macros::date;
use time::{Date, Duration};

const TODAY: Date = date!(2025 - 03 - 12);

fn task_strategy() -> impl Strategy<Value = (Option<i64>, bool, bool)> {
    (proptest::option::of(-10i64..10), any::<bool>(), any::<bool>())
}

fn tasks_strategy() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec(task_strategy(), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .zip(1u64..)
            .map(|((offset, important, completed), id)| {
                let mut task = Task::new(TaskId(id), format!("task {id}"));
                task.due_date = offset.and_then(|days| TODAY.checked_add(Duration::days(days)));
                task.important = important;
                task.completed = completed;
                task
            })
            .collect()
    })
}

fn filter_strategy() -> impl Strategy<Value = PlannedFilter> {
    prop_oneof![
        Just(PlannedFilter::All),
        Just(PlannedFilter::Today),
        Just(PlannedFilter::Tomorrow),
        Just(PlannedFilter::Overdue),
        Just(PlannedFilter::ThisWeek),
        Just(PlannedFilter::CustomDate(None)),
        (-10i64..10).prop_map(|days| PlannedFilter::CustomDate(TODAY.checked_add(Duration::days(days)))),
    ]
}

fn positions(visible: &[&Task], all: &[Task]) -> Vec<usize> {
    visible
        .iter()
        .filter_map(|task| all.iter().position(|candidate| candidate.id == task.id))
        .collect()
}

proptest! {
    #[test]
    fn fixed_views_respect_their_predicates(tasks in tasks_strategy()) {
        for task in select_view(&tasks, &ViewSelection::new(View::Today), TODAY) {
            prop_assert!(!task.completed);
            prop_assert_eq!(task.due_date, Some(TODAY));
        }
        for task in select_view(&tasks, &ViewSelection::new(View::Important), TODAY) {
            prop_assert!(task.important && !task.completed);
        }
        for task in select_view(&tasks, &ViewSelection::new(View::Completed), TODAY) {
            prop_assert!(task.completed);
        }
    }

    #[test]
    fn planned_views_only_hold_pending_dated_tasks(tasks in tasks_strategy(), filter in filter_strategy()) {
        let selection = ViewSelection::new(View::Planned).with_planned(filter);
        for task in select_view(&tasks, &selection, TODAY) {
            prop_assert!(!task.completed);
            prop_assert!(task.due_date.is_some());
        }
    }

    #[test]
    fn overdue_is_strictly_before_today(tasks in tasks_strategy()) {
        let selection = ViewSelection::new(View::Planned).with_planned(PlannedFilter::Overdue);
        for task in select_view(&tasks, &selection, TODAY) {
            prop_assert!(task.due_date.is_some_and(|due| due < TODAY));
        }
    }

    #[test]
    fn selection_preserves_relative_order(tasks in tasks_strategy(), filter in filter_strategy()) {
        for view in View::ALL {
            let selection = ViewSelection::new(view).with_planned(filter);
            let visible = select_view(&tasks, &selection, TODAY);
            let idx = positions(&visible, &tasks);
            prop_assert!(idx.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn important_count_matches_important_view(tasks in tasks_strategy()) {
        let visible = select_view(&tasks, &ViewSelection::new(View::Important), TODAY);
        prop_assert_eq!(important_count(&tasks), visible.len());
    }

    #[test]
    fn move_item_is_a_permutation(
        mut items in proptest::collection::vec(any::<u16>(), 0..20),
        source in 0usize..25,
        destination in 0usize..25,
    ) {
        let mut before = items.clone();
        let moved = move_item(&mut items, source, destination);
        if !moved {
            prop_assert_eq!(&items, &before);
        }
        let mut after = items.clone();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn merge_keeps_unsubmitted_ids_in_place(
        size in 1u64..30,
        picks in proptest::collection::vec(any::<bool>(), 30),
        seed in any::<u64>(),
    ) {
        let current: Vec<u64> = (1..=size).collect();
        let mut submitted: Vec<u64> = current
            .iter()
            .copied()
            .filter(|id| picks[usize::try_from(*id).unwrap_or(0) - 1])
            .collect();
        if !submitted.is_empty() {
            let len = submitted.len();
            submitted.rotate_left(usize::try_from(seed).unwrap_or(0) % len);
        }

        let merged = merge_subset_order(&current, &submitted);
        prop_assert_eq!(merged.len(), current.len());
        for (slot, id) in current.iter().enumerate() {
            if !submitted.contains(id) {
                prop_assert_eq!(merged[slot], *id);
            }
        }
        let touched: Vec<u64> = merged.iter().copied().filter(|id| submitted.contains(id)).collect();
        prop_assert_eq!(touched, submitted);
    }
}
