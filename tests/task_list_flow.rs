use chrono::{DateTime, TimeZone, Utc};
use std::time::{Duration, Instant};

use task_manager::app::task_list::PendingKind;
use task_manager::{FilterOption, Priority, SortOption, Storage, TaskList, TaskService};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
}

fn list_with_window(window: Duration) -> TaskList {
    let storage = Storage::open_in_memory().unwrap();
    TaskList::with_items_from_service(TaskService::new(Box::new(storage)), window).unwrap()
}

fn seeded() -> TaskList {
    let mut list = list_with_window(Duration::from_secs(5));
    list.add_task("water plants", "", Priority::Low, day(2)).unwrap();
    list.add_task("Pay rent", "before noon", Priority::High, day(10)).unwrap();
    list.add_task("call mom", "", Priority::Medium, day(1)).unwrap();
    list
}

fn titles(list: &TaskList) -> Vec<&str> {
    list.visible_tasks().iter().map(|t| t.title.as_str()).collect()
}

#[test]
fn starts_sorted_by_priority_showing_everything() {
    let list = seeded();
    assert_eq!(list.sort_option(), SortOption::ByPriority);
    assert_eq!(list.filter_option(), FilterOption::All);
    assert_eq!(titles(&list), vec!["Pay rent", "call mom", "water plants"]);
}

#[test]
fn sort_and_filter_changes_rederive_the_view() {
    let mut list = seeded();

    list.set_sort_option(SortOption::ByDueDate);
    assert_eq!(titles(&list), vec!["call mom", "water plants", "Pay rent"]);

    list.set_sort_option(SortOption::Alphabetically);
    assert_eq!(titles(&list), vec!["call mom", "Pay rent", "water plants"]);

    let rent = list.visible_tasks()[1].id.unwrap();
    list.mark_task_as_complete(rent).unwrap();

    list.set_filter_option(FilterOption::Completed);
    assert_eq!(titles(&list), vec!["Pay rent"]);
    list.set_filter_option(FilterOption::Pending);
    assert_eq!(titles(&list), vec!["call mom", "water plants"]);
}

#[test]
fn completion_percentage_tracks_the_whole_snapshot() {
    let mut list = seeded();
    assert_eq!(list.completion_percentage(), 0.0);

    let first = list.all_tasks()[0].id.unwrap();
    list.mark_task_as_complete(first).unwrap();
    list.set_filter_option(FilterOption::Pending);

    let percent = list.completion_percentage();
    assert!((percent - 100.0 / 3.0).abs() < 1e-9, "{percent}");
}

#[test]
fn unknown_ids_are_ignored() {
    let mut list = seeded();
    list.mark_task_as_complete(999).unwrap();
    list.delete_task(999).unwrap();
    assert_eq!(list.all_tasks().len(), 3);
    assert!(list.task_by_id(999).is_none());
}

#[test]
fn delete_removes_the_row() {
    let mut list = seeded();
    let id = list.all_tasks()[1].id.unwrap();
    list.delete_task(id).unwrap();
    assert!(list.task_by_id(id).is_none());
    assert_eq!(list.all_tasks().len(), 2);
}

#[test]
fn staged_delete_hides_the_task_until_the_window_closes() {
    let mut list = seeded();
    let start = Instant::now();
    list.next();
    let selected = list.get_selected().unwrap().clone();

    list.stage_for_selected(PendingKind::Delete, start).unwrap();
    assert!(!titles(&list).contains(&selected.title.as_str()));
    assert!(list.task_by_id(selected.id.unwrap()).is_some());
    assert_eq!(
        list.pending().unwrap().message(),
        format!("Task deleted: {}", selected.title)
    );

    list.tick(start + Duration::from_secs(1)).unwrap();
    assert!(list.pending().is_some());

    list.tick(start + Duration::from_secs(5)).unwrap();
    assert!(list.pending().is_none());
    assert!(list.task_by_id(selected.id.unwrap()).is_none());
}

#[test]
fn undo_restores_the_staged_task() {
    let mut list = seeded();
    let start = Instant::now();
    list.next();
    let selected = list.get_selected().unwrap().clone();

    list.stage_for_selected(PendingKind::Complete, start).unwrap();
    let undone = list.undo().unwrap();
    assert_eq!(undone.task.id, selected.id);
    assert_eq!(titles(&list).len(), 3);

    list.tick(start + Duration::from_secs(60)).unwrap();
    assert!(!list.task_by_id(selected.id.unwrap()).unwrap().completed);
}

#[test]
fn staging_a_second_action_commits_the_first() {
    let mut list = seeded();
    let now = Instant::now();

    list.next();
    let first = list.get_selected().unwrap().id.unwrap();
    list.stage_for_selected(PendingKind::Complete, now).unwrap();

    list.next();
    let second = list.get_selected().unwrap().id.unwrap();
    assert_ne!(first, second);
    list.stage_for_selected(PendingKind::Delete, now).unwrap();

    assert!(list.task_by_id(first).unwrap().completed);
    assert_eq!(list.pending().unwrap().task.id, Some(second));
}

#[test]
fn selection_wraps_and_stays_in_bounds() {
    let mut list = seeded();
    list.previous();
    list.previous();
    assert_eq!(list.state.selected(), Some(2));
    list.next();
    assert_eq!(list.state.selected(), Some(0));

    list.set_filter_option(FilterOption::Completed);
    assert!(list.get_selected().is_none());
    assert_eq!(list.state.selected(), None);
}

#[test]
fn service_bulk_update_and_lookup() {
    let mut service = TaskService::new(Box::new(Storage::open_in_memory().unwrap()));
    let a = service
        .add_task(&task_manager::Task::new("a", "", Priority::Low, day(3)))
        .unwrap();
    let b = service
        .add_task(&task_manager::Task::new("b", "", Priority::Low, day(4)))
        .unwrap();

    let mut tasks = service.get_tasks().unwrap();
    for task in &mut tasks {
        task.completed = true;
        task.priority = Priority::High;
    }
    service.update_tasks(&tasks).unwrap();

    for id in [a, b] {
        let stored = service.get_task(id).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.priority, Priority::High);
    }
    assert!(matches!(
        service.get_task(b + 1),
        Err(task_manager::StorageError::NotFound(_))
    ));
}
