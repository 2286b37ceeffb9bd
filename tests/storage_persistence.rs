use eduscreen::class::{Class, WidgetKind};
use eduscreen::storage::{DocumentRow, JsonStore, NoteColor, NoteRow};
use tempfile::tempdir;

fn note(id: &str, widget_id: &str, text: &str, created_at: i64) -> NoteRow {
    NoteRow {
        id: id.into(),
        widget_id: widget_id.into(),
        text: text.into(),
        color: NoteColor::Yellow,
        created_at,
    }
}

fn document(id: &str, title: &str, created_at: i64) -> DocumentRow {
    DocumentRow {
        id: id.into(),
        user_id: "local".into(),
        title: title.into(),
        content: "…".into(),
        created_at,
    }
}

#[test]
fn classes_round_trip_with_board_order_and_counters() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    let mut class = Class::with_core_widgets("1", "Math Class");
    class.next_ordinal(WidgetKind::Notes);
    class.widgets.swap(0, 2);
    store.save_classes("local", &[class.clone()]).unwrap();

    let loaded = store.load_classes("local").unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Math Class");
    assert_eq!(loaded[0].theme, "ocean");
    let ids: Vec<_> = loaded[0].widgets.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, ["calculator-1", "timer-1", "youtube-1"]);

    // The spent notes ordinal came back with the class.
    let mut reloaded = loaded.into_iter().next().unwrap();
    assert_eq!(reloaded.next_ordinal(WidgetKind::Notes), 2);
}

#[test]
fn saving_replaces_only_the_users_rows() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    store
        .save_classes("local", &[Class::with_core_widgets("1", "Mine")])
        .unwrap();
    store
        .save_classes("other", &[Class::with_core_widgets("9", "Theirs")])
        .unwrap();

    // A second save that renames the class and drops nothing foreign.
    store
        .save_classes("local", &[Class::with_core_widgets("1", "Mine Renamed")])
        .unwrap();

    let mine = store.load_classes("local").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Mine Renamed");
    let theirs = store.load_classes("other").unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].name, "Theirs");
}

#[test]
fn widget_notes_are_replaced_per_widget() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    store
        .save_widget_notes("notes-1", &[note("n1", "notes-1", "old", 1)])
        .unwrap();
    store
        .save_widget_notes("notes-2", &[note("n2", "notes-2", "kept", 2)])
        .unwrap();
    store
        .save_widget_notes(
            "notes-1",
            &[
                note("n3", "notes-1", "new", 3),
                note("n4", "notes-1", "newer", 4),
            ],
        )
        .unwrap();

    let first = store.notes_for_widget("notes-1").unwrap();
    let texts: Vec<_> = first.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, ["new", "newer"]);
    assert_eq!(store.notes_for_widget("notes-2").unwrap().len(), 1);

    let grouped = store.load_notes().unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["notes-1"].len(), 2);
}

#[test]
fn deleting_a_widget_takes_its_notes_along() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    store
        .save_classes("local", &[Class::with_core_widgets("1", "Math Class")])
        .unwrap();
    store
        .save_widget_notes("notes-1", &[note("n1", "notes-1", "todo", 1)])
        .unwrap();
    store
        .save_widget_notes("notes-9", &[note("n2", "notes-9", "other", 2)])
        .unwrap();

    store.delete_widget("notes-1").unwrap();

    assert!(store.notes_for_widget("notes-1").unwrap().is_empty());
    assert_eq!(store.notes_for_widget("notes-9").unwrap().len(), 1);
}

#[test]
fn deleting_a_class_cascades_to_widgets_notes_and_links() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    store
        .save_classes(
            "local",
            &[
                Class::with_core_widgets("1", "Math Class"),
                Class::with_core_widgets("2", "Science"),
            ],
        )
        .unwrap();
    store
        .save_widget_notes("timer-1", &[note("n1", "timer-1", "doomed", 1)])
        .unwrap();
    store.upsert_document(&document("d1", "Plan", 1), Some("1")).unwrap();
    store.upsert_document(&document("d2", "Other", 2), Some("2")).unwrap();

    store.delete_class("1").unwrap();

    let classes = store.load_classes("local").unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "2");
    assert_eq!(classes[0].widgets.len(), 3, "the other board is untouched");

    // Both seeded classes carry a timer-1; the shared id means the note
    // cascade swept it when class 1 went away.
    assert!(store.notes_for_widget("timer-1").unwrap().is_empty());
    assert!(store.class_documents("1").unwrap().is_empty());
    assert_eq!(store.class_documents("2").unwrap().len(), 1);
    // The documents themselves survive; only the link rows go.
    assert_eq!(store.documents("local").unwrap().len(), 2);
}

#[test]
fn documents_upsert_and_list_newest_first() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    store.upsert_document(&document("d1", "Old", 10), Some("1")).unwrap();
    store.upsert_document(&document("d2", "New", 20), Some("1")).unwrap();

    let listed = store.class_documents("1").unwrap();
    let titles: Vec<_> = listed.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, ["New", "Old"]);

    // Updating in place neither duplicates the row nor the link.
    let mut updated = document("d1", "Old, edited", 10);
    updated.content = "more".into();
    store.upsert_document(&updated, Some("1")).unwrap();
    assert_eq!(store.class_documents("1").unwrap().len(), 2);
    assert_eq!(store.documents("local").unwrap().len(), 2);

    store.delete_document("d1").unwrap();
    assert_eq!(store.class_documents("1").unwrap().len(), 1);
    assert_eq!(store.documents("local").unwrap().len(), 1);
}

#[test]
fn missing_files_read_as_empty_collections() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    assert!(store.load_classes("local").unwrap().is_empty());
    assert!(store.load_notes().unwrap().is_empty());
    assert!(store.documents("local").unwrap().is_empty());
    assert!(store.class_documents("1").unwrap().is_empty());
}

#[test]
fn widget_rows_from_newer_builds_load_as_unknown() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();

    std::fs::write(
        dir.path().join("classes.json"),
        r#"[{"id": "1", "user_id": "local", "name": "Math Class", "theme": "ocean"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("widgets.json"),
        r#"[
            {"id": "sparkline-1", "class_id": "1", "kind": "sparkline", "label": "Sparkline", "size": "1x1", "ord": 0},
            {"id": "timer-1", "class_id": "1", "kind": "timer", "label": "Class Timer", "size": "1x1", "ord": 1}
        ]"#,
    )
    .unwrap();

    let classes = store.load_classes("local").unwrap();
    assert_eq!(classes[0].widgets.len(), 2);
    assert_eq!(classes[0].widgets[0].kind, WidgetKind::Unknown);
    assert_eq!(classes[0].widgets[1].kind, WidgetKind::Timer);
}
