use eduscreen::class::Class;
use eduscreen::storage::{JsonStore, NoteColor, NoteRow, PersistHandle, PersistRequest};
use std::time::{Duration, Instant};
use tempfile::tempdir;

/// Poll until `check` passes or a generous deadline expires. The worker is
/// fire-and-forget, so tests can only observe its writes from the outside.
fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn queued_saves_reach_the_files() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();
    let handle = PersistHandle::spawn(store.clone());

    handle.send(PersistRequest::SaveClasses {
        user_id: "local".into(),
        classes: vec![Class::with_core_widgets("1", "Math Class")],
    });
    handle.send(PersistRequest::SaveNotes {
        widget_id: "notes-1".into(),
        notes: vec![NoteRow {
            id: "n1".into(),
            widget_id: "notes-1".into(),
            text: "hand back quizzes".into(),
            color: NoteColor::Blue,
            created_at: 1,
        }],
    });

    assert!(wait_for(|| {
        store
            .notes_for_widget("notes-1")
            .map(|notes| notes.len() == 1)
            .unwrap_or(false)
    }));
    let classes = store.load_classes("local").unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].widgets.len(), 3);
    assert!(handle.take_errors().is_empty());
}

#[test]
fn requests_are_applied_in_order() {
    let dir = tempdir().unwrap();
    let store = JsonStore::new(dir.path()).unwrap();
    let handle = PersistHandle::spawn(store.clone());

    handle.send(PersistRequest::SaveClasses {
        user_id: "local".into(),
        classes: vec![Class::with_core_widgets("1", "Math Class")],
    });
    handle.send(PersistRequest::SaveNotes {
        widget_id: "timer-1".into(),
        notes: vec![NoteRow {
            id: "n1".into(),
            widget_id: "timer-1".into(),
            text: "doomed".into(),
            color: NoteColor::Yellow,
            created_at: 1,
        }],
    });
    handle.send(PersistRequest::DeleteWidget {
        widget_id: "timer-1".into(),
    });

    // The delete ran last, so the note written just before it is gone and
    // the widget row with it.
    assert!(wait_for(|| {
        store
            .load_classes("local")
            .map(|classes| {
                classes.len() == 1 && classes[0].widgets.iter().all(|w| w.id != "timer-1")
            })
            .unwrap_or(false)
    }));
    assert!(store.notes_for_widget("timer-1").unwrap().is_empty());
}
