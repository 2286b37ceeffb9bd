use crate::class::{Class, GridPos, WidgetInstance, WidgetKind, WidgetSize};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};

const CLASSES_FILE: &str = "classes.json";
const WIDGETS_FILE: &str = "widgets.json";
const NOTES_FILE: &str = "notes.json";
const DOCUMENTS_FILE: &str = "documents.json";
const CLASS_DOCUMENTS_FILE: &str = "class_documents.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Blue,
    Green,
    Pink,
}

impl Default for NoteColor {
    fn default() -> Self {
        NoteColor::Yellow
    }
}

/// Stored class row. Widgets live in their own collection, keyed back by
/// `class_id`; `counters` travels with the class so widget ids stay
/// monotonic across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub theme: String,
    #[serde(default)]
    pub counters: HashMap<String, u32>,
}

/// Stored widget row. `ord` is the board position within the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRow {
    pub id: String,
    pub class_id: String,
    pub kind: WidgetKind,
    pub label: String,
    pub size: WidgetSize,
    #[serde(default)]
    pub position: GridPos,
    #[serde(default)]
    pub is_core: bool,
    #[serde(default)]
    pub ord: u32,
}

impl WidgetRow {
    fn from_instance(class_id: &str, ord: u32, widget: &WidgetInstance) -> Self {
        Self {
            id: widget.id.clone(),
            class_id: class_id.to_string(),
            kind: widget.kind,
            label: widget.label.clone(),
            size: widget.size,
            position: widget.position,
            is_core: widget.is_core,
            ord,
        }
    }

    fn into_instance(self) -> WidgetInstance {
        WidgetInstance {
            id: self.id,
            kind: self.kind,
            label: self.label,
            size: self.size,
            position: self.position,
            is_core: self.is_core,
        }
    }
}

/// Stored quick note, owned by one widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub widget_id: String,
    pub text: String,
    #[serde(default)]
    pub color: NoteColor,
    pub created_at: i64,
}

/// Stored whiteboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
}

/// Link row attaching a document to a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDocumentRow {
    pub class_id: String,
    pub document_id: String,
}

/// JSON-file persistence over five collections in one directory.
///
/// Every collection is a pretty-printed JSON array; a missing or empty file
/// reads as an empty collection. There are no implicit relations: deleting a
/// parent explicitly deletes its dependents first (notes before widgets,
/// widgets before classes, links before documents), in that order, so a
/// failure can leave orphan-free partial progress but never dangling
/// children.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> anyhow::Result<Vec<T>> {
        let content = fs::read_to_string(self.path(file)).unwrap_or_default();
        if content.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write<T: Serialize>(&self, file: &str, rows: &[T]) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(self.path(file), json)?;
        Ok(())
    }

    /// Replace `user_id`'s classes and widgets with the given snapshot.
    /// Rows belonging to other users are left untouched.
    pub fn save_classes(&self, user_id: &str, classes: &[Class]) -> anyhow::Result<()> {
        let mut class_rows: Vec<ClassRow> = self.read(CLASSES_FILE)?;
        let prior: HashSet<String> = class_rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.id.clone())
            .collect();
        class_rows.retain(|r| r.user_id != user_id);
        class_rows.extend(classes.iter().map(|class| ClassRow {
            id: class.id.clone(),
            user_id: user_id.to_string(),
            name: class.name.clone(),
            theme: class.theme.clone(),
            counters: class.counters().clone(),
        }));

        let mut widget_rows: Vec<WidgetRow> = self.read(WIDGETS_FILE)?;
        let current: HashSet<&str> = classes.iter().map(|c| c.id.as_str()).collect();
        widget_rows.retain(|w| !prior.contains(&w.class_id) && !current.contains(w.class_id.as_str()));
        for class in classes {
            widget_rows.extend(
                class
                    .widgets
                    .iter()
                    .enumerate()
                    .map(|(ord, w)| WidgetRow::from_instance(&class.id, ord as u32, w)),
            );
        }

        self.write(CLASSES_FILE, &class_rows)?;
        self.write(WIDGETS_FILE, &widget_rows)?;
        Ok(())
    }

    /// Load `user_id`'s classes with widgets in board order.
    pub fn load_classes(&self, user_id: &str) -> anyhow::Result<Vec<Class>> {
        let class_rows: Vec<ClassRow> = self.read(CLASSES_FILE)?;
        let widget_rows: Vec<WidgetRow> = self.read(WIDGETS_FILE)?;
        Ok(class_rows
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(|row| {
                let mut widgets: Vec<WidgetRow> = widget_rows
                    .iter()
                    .filter(|w| w.class_id == row.id)
                    .cloned()
                    .collect();
                widgets.sort_by_key(|w| w.ord);
                Class::from_parts(
                    row.id,
                    row.name,
                    row.theme,
                    widgets.into_iter().map(WidgetRow::into_instance).collect(),
                    row.counters,
                )
            })
            .collect())
    }

    /// Delete a class: its widgets' notes, its widgets, its document links,
    /// then the class row.
    pub fn delete_class(&self, class_id: &str) -> anyhow::Result<()> {
        let widget_rows: Vec<WidgetRow> = self.read(WIDGETS_FILE)?;
        let owned: HashSet<&str> = widget_rows
            .iter()
            .filter(|w| w.class_id == class_id)
            .map(|w| w.id.as_str())
            .collect();

        let mut notes: Vec<NoteRow> = self.read(NOTES_FILE)?;
        notes.retain(|n| !owned.contains(n.widget_id.as_str()));
        self.write(NOTES_FILE, &notes)?;

        let remaining: Vec<WidgetRow> = widget_rows
            .into_iter()
            .filter(|w| w.class_id != class_id)
            .collect();
        self.write(WIDGETS_FILE, &remaining)?;

        let mut links: Vec<ClassDocumentRow> = self.read(CLASS_DOCUMENTS_FILE)?;
        links.retain(|l| l.class_id != class_id);
        self.write(CLASS_DOCUMENTS_FILE, &links)?;

        let mut class_rows: Vec<ClassRow> = self.read(CLASSES_FILE)?;
        class_rows.retain(|c| c.id != class_id);
        self.write(CLASSES_FILE, &class_rows)?;
        Ok(())
    }

    /// Delete a widget row and its notes, notes first.
    pub fn delete_widget(&self, widget_id: &str) -> anyhow::Result<()> {
        let mut notes: Vec<NoteRow> = self.read(NOTES_FILE)?;
        notes.retain(|n| n.widget_id != widget_id);
        self.write(NOTES_FILE, &notes)?;

        let mut widget_rows: Vec<WidgetRow> = self.read(WIDGETS_FILE)?;
        widget_rows.retain(|w| w.id != widget_id);
        self.write(WIDGETS_FILE, &widget_rows)?;
        Ok(())
    }

    /// Replace the stored notes of one widget.
    pub fn save_widget_notes(&self, widget_id: &str, notes: &[NoteRow]) -> anyhow::Result<()> {
        let mut rows: Vec<NoteRow> = self.read(NOTES_FILE)?;
        rows.retain(|n| n.widget_id != widget_id);
        rows.extend(notes.iter().cloned());
        self.write(NOTES_FILE, &rows)
    }

    pub fn notes_for_widget(&self, widget_id: &str) -> anyhow::Result<Vec<NoteRow>> {
        let mut rows: Vec<NoteRow> = self.read(NOTES_FILE)?;
        rows.retain(|n| n.widget_id == widget_id);
        rows.sort_by_key(|n| n.created_at);
        Ok(rows)
    }

    /// All notes grouped by owning widget, for hydrating the board in one
    /// read.
    pub fn load_notes(&self) -> anyhow::Result<HashMap<String, Vec<NoteRow>>> {
        let mut rows: Vec<NoteRow> = self.read(NOTES_FILE)?;
        rows.sort_by_key(|n| n.created_at);
        let mut grouped: HashMap<String, Vec<NoteRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.widget_id.clone()).or_default().push(row);
        }
        Ok(grouped)
    }

    /// A user's documents, newest first.
    pub fn documents(&self, user_id: &str) -> anyhow::Result<Vec<DocumentRow>> {
        let mut rows: Vec<DocumentRow> = self.read(DOCUMENTS_FILE)?;
        rows.retain(|d| d.user_id == user_id);
        rows.sort_by_key(|d| std::cmp::Reverse(d.created_at));
        Ok(rows)
    }

    /// Documents linked to a class, newest first.
    pub fn class_documents(&self, class_id: &str) -> anyhow::Result<Vec<DocumentRow>> {
        let links: Vec<ClassDocumentRow> = self.read(CLASS_DOCUMENTS_FILE)?;
        let linked: HashSet<&str> = links
            .iter()
            .filter(|l| l.class_id == class_id)
            .map(|l| l.document_id.as_str())
            .collect();
        let mut rows: Vec<DocumentRow> = self.read(DOCUMENTS_FILE)?;
        rows.retain(|d| linked.contains(d.id.as_str()));
        rows.sort_by_key(|d| std::cmp::Reverse(d.created_at));
        Ok(rows)
    }

    /// Insert or update a document; optionally make sure a link row to
    /// `class_id` exists.
    pub fn upsert_document(
        &self,
        row: &DocumentRow,
        class_id: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut docs: Vec<DocumentRow> = self.read(DOCUMENTS_FILE)?;
        match docs.iter_mut().find(|d| d.id == row.id) {
            Some(existing) => *existing = row.clone(),
            None => docs.push(row.clone()),
        }
        self.write(DOCUMENTS_FILE, &docs)?;

        if let Some(class_id) = class_id {
            let mut links: Vec<ClassDocumentRow> = self.read(CLASS_DOCUMENTS_FILE)?;
            let exists = links
                .iter()
                .any(|l| l.class_id == class_id && l.document_id == row.id);
            if !exists {
                links.push(ClassDocumentRow {
                    class_id: class_id.to_string(),
                    document_id: row.id.clone(),
                });
                self.write(CLASS_DOCUMENTS_FILE, &links)?;
            }
        }
        Ok(())
    }

    /// Delete a document, its class links first.
    pub fn delete_document(&self, document_id: &str) -> anyhow::Result<()> {
        let mut links: Vec<ClassDocumentRow> = self.read(CLASS_DOCUMENTS_FILE)?;
        links.retain(|l| l.document_id != document_id);
        self.write(CLASS_DOCUMENTS_FILE, &links)?;

        let mut docs: Vec<DocumentRow> = self.read(DOCUMENTS_FILE)?;
        docs.retain(|d| d.id != document_id);
        self.write(DOCUMENTS_FILE, &docs)
    }
}

/// Work order for the persistence worker.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    SaveClasses {
        user_id: String,
        classes: Vec<Class>,
    },
    SaveNotes {
        widget_id: String,
        notes: Vec<NoteRow>,
    },
    DeleteWidget {
        widget_id: String,
    },
    DeleteClass {
        class_id: String,
    },
    SaveDocument {
        row: DocumentRow,
        class_id: Option<String>,
    },
    DeleteDocument {
        document_id: String,
    },
}

impl PersistRequest {
    fn label(&self) -> &'static str {
        match self {
            PersistRequest::SaveClasses { .. } => "saving classes",
            PersistRequest::SaveNotes { .. } => "saving notes",
            PersistRequest::DeleteWidget { .. } => "removing widget data",
            PersistRequest::DeleteClass { .. } => "removing class data",
            PersistRequest::SaveDocument { .. } => "saving document",
            PersistRequest::DeleteDocument { .. } => "removing document",
        }
    }
}

fn apply(store: &JsonStore, request: PersistRequest) -> anyhow::Result<()> {
    match request {
        PersistRequest::SaveClasses { user_id, classes } => {
            store.save_classes(&user_id, &classes)
        }
        PersistRequest::SaveNotes { widget_id, notes } => {
            store.save_widget_notes(&widget_id, &notes)
        }
        PersistRequest::DeleteWidget { widget_id } => store.delete_widget(&widget_id),
        PersistRequest::DeleteClass { class_id } => store.delete_class(&class_id),
        PersistRequest::SaveDocument { row, class_id } => {
            store.upsert_document(&row, class_id.as_deref())
        }
        PersistRequest::DeleteDocument { document_id } => store.delete_document(&document_id),
    }
}

/// Fire-and-forget front of the persistence worker.
///
/// The UI queues requests and moves on; outcomes never block a frame.
/// Failures are logged and collected so the shell can drain them into
/// toasts.
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::Sender<PersistRequest>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl PersistHandle {
    pub fn spawn(store: JsonStore) -> Self {
        let (tx, rx) = mpsc::channel::<PersistRequest>();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        std::thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let label = request.label();
                if let Err(err) = apply(&store, request) {
                    tracing::error!("{label} failed: {err}");
                    if let Ok(mut sink) = sink.lock() {
                        sink.push(format!("{label} failed: {err}"));
                    }
                }
            }
        });
        Self { tx, errors }
    }

    pub fn send(&self, request: PersistRequest) {
        if self.tx.send(request).is_err() {
            tracing::error!("persistence worker is gone; write dropped");
        }
    }

    /// Drain messages about failed writes.
    pub fn take_errors(&self) -> Vec<String> {
        match self.errors.lock() {
            Ok(mut errors) => errors.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}
