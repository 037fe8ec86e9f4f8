#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docket_core::{PlannedFilter, Task, TaskId, View, ViewSelection, merge_subset_order, select_view};
use time::{Date, Duration};
use time::macros::date;

const TODAY: Date = date!(2025 - 03 - 12);

fn build_tasks(count: u64) -> Vec<Task> {
    (0..count)
        .map(|idx| {
            let mut task = Task::new(TaskId(idx + 1), format!("task-{idx}"));
            task.important = idx % 3 == 0;
            task.completed = idx % 5 == 0;
            if idx % 2 == 0 {
                let offset = i64::try_from(idx % 14).unwrap_or_default() - 7;
                task.due_date = TODAY.checked_add(Duration::days(offset));
            }
            task
        })
        .collect()
}

fn select_view_benchmark(c: &mut Criterion) {
    let selections = [
        ("today", ViewSelection::new(View::Today)),
        ("important", ViewSelection::new(View::Important)),
        ("planned_week", ViewSelection::new(View::Planned).with_planned(PlannedFilter::ThisWeek)),
        ("all", ViewSelection::default()),
    ];
    let tasks = build_tasks(2_000);

    let mut group = c.benchmark_group("select_view");
    for (name, selection) in &selections {
        group.bench_with_input(BenchmarkId::from_parameter(name), selection, |b, selection| {
            b.iter(|| black_box(select_view(&tasks, selection, TODAY).len()));
        });
    }
    group.finish();
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_subset_order");
    for &size in &[64u64, 512, 4_096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let current: Vec<u64> = (1..=size).collect();
                    let submitted: Vec<u64> = current.iter().rev().step_by(3).copied().collect();
                    (current, submitted)
                },
                |(current, submitted)| {
                    black_box(merge_subset_order(&current, &submitted));
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, select_view_benchmark, merge_benchmark);
criterion_main!(benches);
