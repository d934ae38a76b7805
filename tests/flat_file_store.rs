use std::fs;

use tasktopia::{FlatFile, Task, TaskError, TaskStore};
use tempfile::tempdir;

#[test]
fn reopen_restores_the_same_tasks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");

    let mut store = TaskStore::open(FlatFile::new(&path));
    store.add("Essay", "Draft intro", "09-30-25").unwrap();
    store.add("Quiz", "Chapter 4", "01-01-20").unwrap();
    store.add("Quiz", "Chapter 4", "01-01-20").unwrap();
    store.add("Final", "Review notes", "12-31-99").unwrap();
    let before = store.list_ordered();
    drop(store);

    let reopened = TaskStore::open(FlatFile::new(&path));
    let mut after = reopened.list_ordered();
    let mut expected = before.clone();
    after.sort_by(|a, b| a.title.cmp(&b.title));
    expected.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(after, expected);
    assert_eq!(reopened.list_ordered(), before);
}

#[test]
fn every_mutation_rewrites_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    let mut store = TaskStore::open(FlatFile::new(&path));

    store.add("B", "second", "02-02-20").unwrap();
    store.add("A", "first", "01-01-20").unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "A,first,01-01-20\nB,second,02-02-20\n"
    );

    let done = store.remove_earliest().unwrap();
    assert_eq!(done, Task::new("A", "first", "01-01-20"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "B,second,02-02-20\n");

    store.remove_selected(&[Task::new("B", "second", "02-02-20")]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn failed_operations_leave_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    let mut store = TaskStore::open(FlatFile::new(&path));

    assert!(matches!(
        store.add("", "x", "01-01-20"),
        Err(TaskError::Validation { .. })
    ));
    assert!(matches!(
        store.add("T", "D", "13-40-99"),
        Err(TaskError::InvalidDateFormat { .. })
    ));
    assert!(matches!(store.remove_earliest(), Err(TaskError::EmptyStore)));
    assert!(store.is_empty());
    assert!(!path.exists());
}

#[test]
fn load_skips_lines_with_extra_commas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(
        &path,
        "Essay,Draft intro,09-30-25\na,b,c,d\nQuiz,Chapter 4,01-01-20\nbroken line\n",
    )
    .unwrap();

    let store = TaskStore::open(FlatFile::new(&path));
    assert_eq!(
        store.list_ordered(),
        vec![
            Task::new("Quiz", "Chapter 4", "01-01-20"),
            Task::new("Essay", "Draft intro", "09-30-25"),
        ]
    );
}

#[test]
fn commas_in_fields_are_lost_on_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");

    let mut store = TaskStore::open(FlatFile::new(&path));
    store.add("Read, then write", "Essay", "09-30-25").unwrap();
    store.add("Quiz", "Chapter 4", "01-01-20").unwrap();
    assert_eq!(store.len(), 2);

    let reopened = TaskStore::open(FlatFile::new(&path));
    assert_eq!(
        reopened.list_ordered(),
        vec![Task::new("Quiz", "Chapter 4", "01-01-20")]
    );
}

#[test]
fn unreadable_file_degrades_to_empty_store() {
    let dir = tempdir().unwrap();
    // A directory cannot be read as a task file.
    let store = TaskStore::open(FlatFile::new(dir.path()));
    assert!(store.is_empty());
}

#[test]
fn save_failure_keeps_memory_ahead_of_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("tasks.txt");
    let mut store = TaskStore::open(FlatFile::new(&path));

    store.add("Essay", "Draft intro", "09-30-25").unwrap();
    assert_eq!(store.len(), 1);
    assert!(!store.is_synced());
    assert!(!path.exists());

    fs::create_dir(dir.path().join("missing")).unwrap();
    store.add("Quiz", "Chapter 4", "01-01-20").unwrap();
    assert!(store.is_synced());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Quiz,Chapter 4,01-01-20\nEssay,Draft intro,09-30-25\n"
    );
}

#[test]
fn invalid_utf8_line_does_not_wipe_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(
        &path,
        b"A,one,01-01-20\nB,t\xffo,02-02-20\nC,three,03-03-20\n",
    )
    .unwrap();

    let mut store = TaskStore::open(FlatFile::new(&path));
    assert_eq!(store.len(), 3);
    store.add("D", "four", "04-04-20").unwrap();

    let reopened = TaskStore::open(FlatFile::new(&path));
    let titles: Vec<_> = reopened.iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, ["A", "B", "C", "D"]);
    assert!(fs::read_to_string(&path)
        .unwrap()
        .starts_with("A,one,01-01-20\nB,t\u{FFFD}o,02-02-20\n"));
}
