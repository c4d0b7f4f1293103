//! End-to-end behaviour of the board: intents, ordering, persistence.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use taskboard::io::snapshot::RecordKeys;
use taskboard::io::storage::{FileStore, KeyValueStore, MemoryStore};
use taskboard::model::task::{Priority, TaskDraft};
use taskboard::ops::category_ops::CategoryEdit;
use taskboard::{Board, BoardOptions, Intent, Notice};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_board() -> Board<MemoryStore> {
    Board::open(MemoryStore::new(), BoardOptions::default())
}

fn reopen(board: Board<MemoryStore>) -> Board<MemoryStore> {
    Board::open(board.into_store(), BoardOptions::default())
}

fn find_id(board: &Board<MemoryStore>, title: &str) -> String {
    board
        .tasks()
        .iter()
        .find(|t| t.title == title)
        .map(|t| t.id.clone())
        .unwrap_or_else(|| panic!("no task titled {}", title))
}

// ============================================================================
// Walkthrough
// ============================================================================

#[test]
fn essay_and_milk_walkthrough() {
    let mut board = new_board();

    board.dispatch(Intent::AddTask(
        TaskDraft::new("Finish essay")
            .priority(Priority::High)
            .due(date(2024, 5, 1))
            .category("english"),
    ));
    let view = board.dispatch(Intent::AddTask(TaskDraft::new("Buy milk")));
    assert_eq!(view.titles(), vec!["Finish essay", "Buy milk"]);

    let essay = find_id(&board, "Finish essay");
    let view = board.dispatch(Intent::ToggleTask(essay.clone()));
    assert_eq!(view.titles(), vec!["Buy milk", "Finish essay"]);

    let view = board.dispatch(Intent::SetFilterText("milk".into()));
    assert_eq!(view.titles(), vec!["Buy milk"]);

    board.dispatch(Intent::SetFilterText(String::new()));
    let view = board.dispatch(Intent::DeleteCategory("english".into()));
    assert!(board.take_notices().is_empty());
    let row = view
        .rows
        .iter()
        .find(|r| r.task.id == essay)
        .expect("essay still rendered");
    assert_eq!(row.category, None);
    assert_eq!(row.task.category.as_deref(), Some("english"));
}

#[test]
fn category_filter_reset_on_delete() {
    let mut board = new_board();
    board.dispatch(Intent::AddTask(TaskDraft::new("Essay").category("english")));
    board.dispatch(Intent::AddTask(TaskDraft::new("Lab").category("science")));

    let view = board.dispatch(Intent::SetCategoryFilter(Some("science".into())));
    assert_eq!(view.titles(), vec!["Lab"]);

    let view = board.dispatch(Intent::DeleteCategory("science".into()));
    assert_eq!(view.filter.category, None);
    assert_eq!(view.titles(), vec!["Essay", "Lab"]);
}

#[test]
fn text_filter_matches_category_name() {
    let mut board = new_board();
    board.dispatch(Intent::AddTask(TaskDraft::new("Chapter 4").category("history")));
    board.dispatch(Intent::AddTask(TaskDraft::new("Buy milk")));
    let view = board.dispatch(Intent::SetFilterText("HIST".into()));
    assert_eq!(view.titles(), vec!["Chapter 4"]);
}

// ============================================================================
// Ordering properties
// ============================================================================

#[test]
fn ordering_properties_hold_over_mixed_tasks() {
    let mut board = new_board();
    let priorities = [Priority::None, Priority::Low, Priority::Medium, Priority::High];
    let dates = [None, Some(date(2024, 3, 9)), Some(date(2024, 1, 2)), Some(date(2024, 3, 9))];
    let names = ["delta", "Alpha", "charlie", "bravo", "Echo"];

    for i in 0..40 {
        let mut draft = TaskDraft::new(format!("{} {}", names[i % names.len()], i % 3))
            .priority(priorities[i % priorities.len()]);
        draft.due_date = dates[(i / 2) % dates.len()];
        let id = board.add_task(draft).unwrap();
        if i % 3 == 0 {
            board.toggle_task(&id).unwrap();
        }
    }

    let view = board.view();
    assert_eq!(view.rows.len(), 40);
    let tasks: Vec<_> = view.rows.iter().map(|r| &r.task).collect();

    for pair in tasks.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        // Incomplete before completed
        assert!(!(a.completed && !b.completed), "{} before {}", a.title, b.title);
        if a.completed != b.completed {
            continue;
        }
        // Non-decreasing due date, undated as +infinity
        match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => assert!(x <= y),
            (None, Some(_)) => panic!("undated {} before dated {}", a.title, b.title),
            _ => {}
        }
        if a.due_date == b.due_date {
            assert!(a.priority.rank() >= b.priority.rank());
        }
    }

    // Same view twice is the same order
    let again: Vec<String> = board.view().rows.iter().map(|r| r.task.id.clone()).collect();
    let first: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    assert_eq!(again, first);
}

#[test]
fn high_priority_before_low_when_undated() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Low one").priority(Priority::Low)).unwrap();
    board.add_task(TaskDraft::new("High one").priority(Priority::High)).unwrap();
    assert_eq!(board.view().titles(), vec!["High one", "Low one"]);
}

#[test]
fn apple_before_banana() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Banana")).unwrap();
    board.add_task(TaskDraft::new("Apple")).unwrap();
    assert_eq!(board.view().titles(), vec!["Apple", "Banana"]);
}

// ============================================================================
// Idempotence and validation
// ============================================================================

#[test]
fn delete_twice_is_safe() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Once")).unwrap();
    let keep = board.add_task(TaskDraft::new("Keep")).unwrap();
    let id = find_id(&board, "Once");

    board.dispatch(Intent::DeleteTask(id.clone()));
    let after_first = board.tasks().to_vec();
    let saved = board.store().get("tasks").unwrap();

    board.dispatch(Intent::DeleteTask(id));
    assert_eq!(board.tasks(), after_first.as_slice());
    assert_eq!(board.store().get("tasks").unwrap(), saved);
    assert_eq!(board.tasks()[0].id, keep);
}

#[test]
fn blank_inputs_are_rejected_without_writes() {
    let mut board = new_board();
    let id = board.add_task(TaskDraft::new("Essay")).unwrap();
    let saved = board.store().get("tasks").unwrap();

    board.dispatch(Intent::AddTask(TaskDraft::new("   ")));
    board.dispatch(Intent::AddSubtask {
        task_id: id.clone(),
        text: " ".into(),
    });
    board.dispatch(Intent::RenameCategory {
        id: "english".into(),
        edit: CategoryEdit {
            name: "".into(),
            ..Default::default()
        },
    });

    assert_eq!(board.tasks().len(), 1);
    assert!(board.tasks()[0].subtasks.is_empty());
    assert_eq!(board.category("english").unwrap().name, "English");
    assert_eq!(board.store().get("tasks").unwrap(), saved);
    let notices = board.take_notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| matches!(n, Notice::Info(_))));
}

#[test]
fn update_missing_task_is_noop() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Essay")).unwrap();
    let before = board.tasks().to_vec();
    board.dispatch(Intent::UpdateTask {
        id: "missing".into(),
        update: TaskDraft::new("Other").into(),
    });
    assert_eq!(board.tasks(), before.as_slice());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn state_survives_reopen() {
    let mut board = new_board();
    let essay = board
        .add_task(
            TaskDraft::new("Finish essay")
                .priority(Priority::High)
                .due(date(2024, 5, 1))
                .category("english"),
        )
        .unwrap();
    board.add_task(TaskDraft::new("Buy milk")).unwrap();
    let outline = board.add_subtask(&essay, "outline").unwrap();
    board.add_subtask(&essay, "draft").unwrap();
    board.toggle_subtask(&essay, &outline).unwrap();
    board.toggle_expanded(&essay).unwrap();
    let cat = board.add_category();
    board
        .rename_category(
            &cat,
            CategoryEdit {
                name: "Chores".into(),
                emoji: "🧹".into(),
                symbol: "".into(),
            },
        )
        .unwrap();

    let tasks = board.tasks().to_vec();
    let categories = board.categories().to_vec();
    let board = reopen(board);
    assert_eq!(board.tasks(), tasks.as_slice());
    assert_eq!(board.categories(), categories.as_slice());
    assert_eq!(board.tasks()[0].due_date, Some(date(2024, 5, 1)));
    assert!(board.notices().is_empty());
}

#[test]
fn empty_store_round_trip() {
    let mut board = new_board();
    assert_eq!(board.clear_all_tasks(), 0);
    let board = reopen(board);
    assert!(board.tasks().is_empty());
}

#[test]
fn clear_all_persists() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("a")).unwrap();
    board.add_task(TaskDraft::new("b")).unwrap();
    board.dispatch(Intent::ClearAllTasks);
    let board = reopen(board);
    assert!(board.tasks().is_empty());
    assert_eq!(board.view().empty_message(), Some("No tasks yet."));
}

#[test]
fn corrupt_storage_opens_empty_with_warning() {
    let mut store = MemoryStore::new();
    store.set("tasks", b"{not json").unwrap();
    let mut board = Board::open(store, BoardOptions::default());
    assert!(board.tasks().is_empty());
    let notices = board.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], Notice::Warning(_)));

    // The board stays usable and the unreadable bytes are kept aside
    board.add_task(TaskDraft::new("Fresh start")).unwrap();
    assert_eq!(
        board.store().get("tasks.corrupt").unwrap(),
        Some(b"{not json".to_vec())
    );
}

#[test]
fn duplicate_and_blank_tasks_warn_and_survive_next_save() {
    let raw = br#"[{"id":"1","text":"Essay"},{"id":"1","text":"Lab report"},{"id":"2","text":"   "}]"#;
    let mut store = MemoryStore::new();
    store.set("tasks", raw).unwrap();

    let mut board = Board::open(store, BoardOptions::default());
    assert_eq!(board.view().titles(), vec!["Essay"]);
    let notices = board.take_notices();
    assert!(matches!(notices.as_slice(), [Notice::Warning(_)]));
    assert!(notices[0].message().contains("tasks.corrupt"));

    board.add_task(TaskDraft::new("x")).unwrap();
    let kept = board.store().get("tasks.corrupt").unwrap().unwrap();
    assert!(String::from_utf8(kept).unwrap().contains("Lab report"));
}

#[test]
fn quota_exceeded_keeps_memory_state() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Saved")).unwrap();
    board.store_mut().set_quota(Some(1));

    let view = board.dispatch(Intent::AddTask(TaskDraft::new("Unsaved")));
    assert_eq!(view.rows.len(), 2);
    let notices = board.take_notices();
    assert!(matches!(notices.as_slice(), [Notice::Warning(_)]));

    board.store_mut().set_quota(None);
    let board = reopen(board);
    assert_eq!(board.view().titles(), vec!["Saved"]);
}

#[test]
fn versioned_keys_start_fresh() {
    let mut board = new_board();
    board.add_task(TaskDraft::new("Old data")).unwrap();
    let options = BoardOptions {
        keys: RecordKeys::versioned(Some(2)),
        seed_default_categories: true,
    };
    let mut board = Board::open(board.into_store(), options);
    assert!(board.tasks().is_empty());
    board.add_task(TaskDraft::new("New data")).unwrap();
    assert!(board.store().get("tasks_v2").unwrap().is_some());
    assert!(board.store().get("tasks").unwrap().is_some());
}

#[test]
fn file_store_round_trip() {
    let tmp = TempDir::new().unwrap();
    let mut board = Board::open(FileStore::new(tmp.path()), BoardOptions::default());
    let id = board
        .add_task(TaskDraft::new("On disk").due(date(2025, 1, 31)))
        .unwrap();
    board.add_subtask(&id, "step").unwrap();
    let tasks = board.tasks().to_vec();

    let board = Board::open(FileStore::new(tmp.path()), BoardOptions::default());
    assert_eq!(board.tasks(), tasks.as_slice());
    assert!(tmp.path().join("tasks.json").exists());
    assert!(tmp.path().join("categories.json").exists());
}

#[test]
fn loads_records_written_by_older_builds() {
    let mut store = MemoryStore::new();
    store
        .set(
            "tasks",
            br#"[
                {"id":"1","text":"Old untyped","completed":false,"subtasks":[
                    {"id":"2","text":"step","completed":true,"createdAt":"2024-04-01T09:00:00.000Z"}
                 ],"expanded":false,"dueDate":"2024-04-03","priority":"","categoryId":"math",
                 "createdAt":"2024-04-01T08:00:00.000Z"},
                {"id":"3","title":"Old typed","priority":"high","dueDate":null,"category":""}
            ]"#,
        )
        .unwrap();
    let board = Board::open(store, BoardOptions::default());
    assert!(board.notices().is_empty());
    let view = board.view();
    assert_eq!(view.titles(), vec!["Old untyped", "Old typed"]);
    assert_eq!(view.rows[0].category.as_ref().map(|c| c.name.as_str()), Some("Maths"));
    assert_eq!(view.rows[0].progress.percent(), 100);
    assert_eq!(view.rows[1].task.priority, Priority::High);
}
