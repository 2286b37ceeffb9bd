use crate::class::{WidgetInstance, WidgetKind};
use crate::layout::{DragController, LayoutStore};
use crate::media::{SearchError, SearchService};
use crate::settings::Settings;
use crate::storage::{DocumentRow, JsonStore, NoteRow, PersistHandle, PersistRequest};
use crate::theme::{self, Palette};
use crate::whiteboard::{TabDocument, TabStrip};
use crate::widgets::{AlarmStyle, Widget, WidgetCtx, WidgetEvent, WidgetSeed};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::collections::{HashMap, HashSet};

/// A live widget body paired with the layout row it belongs to.
struct WidgetRuntime {
    id: String,
    ui: Box<dyn Widget>,
}

/// State for the document editor window. `document_id` is `None` while
/// drafting a brand new document.
struct DocumentEditor {
    document_id: Option<String>,
    title: String,
    content: String,
}

pub struct EduScreenApp {
    settings: Settings,
    files: JsonStore,
    store: LayoutStore,
    persist: PersistHandle,
    search: SearchService,
    whiteboard: TabStrip,
    documents: Vec<DocumentRow>,
    notes: HashMap<String, Vec<NoteRow>>,
    runtimes: Vec<WidgetRuntime>,
    drag: DragController,
    customizing: bool,
    minimized: HashSet<String>,
    class_rename: Option<String>,
    tab_rename: Option<(String, String)>,
    label_edit: Option<(String, String)>,
    editor: Option<DocumentEditor>,
    applied_theme: Option<&'static str>,
    toasts: Toasts,
}

impl EduScreenApp {
    pub fn new(
        settings: Settings,
        files: JsonStore,
        store: LayoutStore,
        persist: PersistHandle,
        search: SearchService,
        notes: HashMap<String, Vec<NoteRow>>,
        documents: Vec<DocumentRow>,
    ) -> Self {
        let toasts = Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]);
        let mut app = Self {
            settings,
            files,
            store,
            persist,
            search,
            whiteboard: TabStrip::new(),
            documents,
            notes,
            runtimes: Vec::new(),
            drag: DragController::new(),
            customizing: false,
            minimized: HashSet::new(),
            class_rename: None,
            tab_rename: None,
            label_edit: None,
            editor: None,
            applied_theme: None,
            toasts,
        };
        app.sync_runtimes();
        app
    }

    fn push_toast(&mut self, kind: ToastKind, text: impl Into<egui::WidgetText>) {
        if !self.settings.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default()
                .duration_in_seconds(self.settings.toast_duration as f64),
        });
    }

    /// Rebuild widget bodies after the layout changed, reusing live state
    /// for rows whose id survived so a running timer keeps running across
    /// an add or a reorder.
    fn sync_runtimes(&mut self) {
        let mut existing: HashMap<String, Box<dyn Widget>> =
            self.runtimes.drain(..).map(|rt| (rt.id, rt.ui)).collect();
        let mut runtimes = Vec::with_capacity(self.store.widgets().len());
        for instance in self.store.widgets() {
            let body = match existing.remove(&instance.id) {
                Some(body) => Some(body),
                None => {
                    let notes = self
                        .notes
                        .get(&instance.id)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    self.store.registry().create(instance, &WidgetSeed { notes })
                }
            };
            if let Some(body) = body {
                runtimes.push(WidgetRuntime {
                    id: instance.id.clone(),
                    ui: body,
                });
            }
        }
        self.runtimes = runtimes;
    }

    fn persist_snapshot(&self) {
        self.persist.send(PersistRequest::SaveClasses {
            user_id: self.settings.user_id.clone(),
            classes: self.store.snapshot(),
        });
    }

    fn refresh_documents(&mut self) {
        match self.files.class_documents(self.store.current_class_id()) {
            Ok(docs) => self.documents = docs,
            Err(err) => {
                tracing::error!("loading documents failed: {err}");
                self.push_toast(ToastKind::Error, format!("Loading documents failed: {err}"));
            }
        }
    }

    fn do_add_widget(&mut self, kind: WidgetKind) {
        if self.store.add_widget(kind).is_some() {
            self.sync_runtimes();
            self.persist_snapshot();
        }
    }

    fn do_remove_widget(&mut self, id: &str) {
        if self.store.remove_widget(id) {
            self.minimized.remove(id);
            self.notes.remove(id);
            self.sync_runtimes();
            self.persist.send(PersistRequest::DeleteWidget {
                widget_id: id.to_string(),
            });
            self.persist_snapshot();
        }
    }

    fn do_switch_class(&mut self, id: &str) {
        if self.store.switch_class(id) {
            self.drag.finish();
            self.label_edit = None;
            self.class_rename = None;
            self.sync_runtimes();
            self.refresh_documents();
        }
    }

    fn do_add_class(&mut self) {
        let name = self.store.add_class().name.clone();
        self.sync_runtimes();
        self.persist_snapshot();
        self.refresh_documents();
        self.push_toast(ToastKind::Success, format!("Added {name}"));
    }

    fn do_remove_class(&mut self) {
        let id = self.store.current_class_id().to_string();
        let name = self.store.current_class().name.clone();
        if self.store.remove_class(&id) {
            self.drag.finish();
            self.label_edit = None;
            self.class_rename = None;
            self.persist
                .send(PersistRequest::DeleteClass { class_id: id });
            self.sync_runtimes();
            self.refresh_documents();
            self.push_toast(ToastKind::Info, format!("Removed {name}"));
        }
    }

    fn handle_widget_event(&mut self, label: &str, event: WidgetEvent) {
        match event {
            WidgetEvent::NotesChanged { widget_id, notes } => {
                self.notes.insert(widget_id.clone(), notes.clone());
                self.persist
                    .send(PersistRequest::SaveNotes { widget_id, notes });
            }
            WidgetEvent::TimerFinished { alarm } => {
                let (kind, text) = match alarm {
                    AlarmStyle::Gentle => (ToastKind::Info, format!("{label}: time is up.")),
                    AlarmStyle::Standard => (ToastKind::Success, format!("{label}: time's up!")),
                    AlarmStyle::Urgent => (ToastKind::Warning, format!("{label}: TIME'S UP!")),
                };
                self.push_toast(kind, text);
            }
            WidgetEvent::SearchFailed(err) => {
                let (kind, text) = match err {
                    SearchError::RateLimited => (
                        ToastKind::Warning,
                        "Search limit reached. Try again in a minute.".to_string(),
                    ),
                    SearchError::Unauthorized => {
                        (ToastKind::Warning, "Sign in to search videos.".to_string())
                    }
                    SearchError::Upstream(msg) | SearchError::Transport(msg) => {
                        (ToastKind::Error, format!("Search failed: {msg}"))
                    }
                };
                self.push_toast(kind, text);
            }
        }
    }

    fn header_ui(&mut self, ctx: &egui::Context, palette: &'static Palette) {
        // Snapshots taken up front so the menu closures below don't have to
        // borrow the store while they mutate it.
        let classes: Vec<(String, String)> = self
            .store
            .classes()
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        let current_id = self.store.current_class_id().to_string();
        let current_name = self.store.current_class().name.clone();
        let kinds: Vec<(WidgetKind, &'static str)> = {
            let registry = self.store.registry();
            registry
                .kinds()
                .into_iter()
                .filter_map(|kind| registry.descriptor(kind).map(|d| (kind, d.display_name())))
                .collect()
        };

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("EduScreen").color(palette.primary).strong());
                ui.separator();

                let mut commit_rename: Option<String> = None;
                let mut cancel_rename = false;
                if let Some(draft) = &mut self.class_rename {
                    let field = ui.add(egui::TextEdit::singleline(draft).desired_width(160.0));
                    if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        commit_rename = Some(draft.clone());
                    }
                    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        cancel_rename = true;
                    }
                } else {
                    ui.menu_button(current_name.clone(), |ui| {
                        for (id, name) in &classes {
                            if ui.selectable_label(*id == current_id, name).clicked() {
                                self.do_switch_class(id);
                                ui.close_menu();
                            }
                        }
                        ui.separator();
                        if ui.button("✚ Add class").clicked() {
                            self.do_add_class();
                            ui.close_menu();
                        }
                        if classes.len() > 1 && ui.button("🗑 Remove class").clicked() {
                            self.do_remove_class();
                            ui.close_menu();
                        }
                    });
                    if ui
                        .small_button("✏")
                        .on_hover_text("Rename class")
                        .clicked()
                    {
                        self.class_rename = Some(current_name.clone());
                    }
                }
                if let Some(name) = commit_rename {
                    self.store.rename_current(&name);
                    self.class_rename = None;
                    self.persist_snapshot();
                }
                if cancel_rename {
                    self.class_rename = None;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let toggle = if self.customizing { "Save Layout" } else { "Customize" };
                    if ui.button(toggle).clicked() {
                        if self.customizing {
                            self.drag.finish();
                            self.label_edit = None;
                            self.persist_snapshot();
                        }
                        self.customizing = !self.customizing;
                    }
                    if self.customizing {
                        ui.menu_button("✚ Add Widget", |ui| {
                            for (kind, name) in &kinds {
                                if ui.button(*name).clicked() {
                                    self.do_add_widget(*kind);
                                    ui.close_menu();
                                }
                            }
                        });
                    }
                });
            });

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Theme:").small().weak());
                for p in &theme::PALETTES {
                    let selected = p.name == palette.name;
                    let stroke = if selected {
                        egui::Stroke::new(2.0, p.text)
                    } else {
                        egui::Stroke::new(1.0, p.border)
                    };
                    let swatch = egui::Button::new("")
                        .fill(p.primary)
                        .stroke(stroke)
                        .min_size(egui::vec2(20.0, 20.0))
                        .rounding(10.0);
                    if ui.add(swatch).on_hover_text(p.name).clicked() && !selected {
                        self.store.set_theme(p.name);
                        self.persist_snapshot();
                    }
                }
            });
            ui.add_space(4.0);
        });
    }

    fn whiteboard_ui(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        let tabs: Vec<(String, String)> = self
            .whiteboard
            .tabs()
            .iter()
            .map(|t| (t.id.clone(), t.title.clone()))
            .collect();
        let active_id = self.whiteboard.active().id.clone();

        let mut switch: Option<String> = None;
        let mut close_tab: Option<String> = None;
        ui.horizontal_wrapped(|ui| {
            for (id, title) in &tabs {
                let resp = ui.selectable_label(*id == active_id, title);
                if resp.double_clicked() {
                    self.tab_rename = Some((id.clone(), title.clone()));
                } else if resp.clicked() {
                    switch = Some(id.clone());
                }
                if tabs.len() > 1 && ui.small_button("✕").on_hover_text("Close screen").clicked()
                {
                    close_tab = Some(id.clone());
                }
            }
            if ui.button("✚").on_hover_text("New screen").clicked() {
                self.whiteboard.add_tab();
            }
        });
        if let Some(id) = switch {
            self.whiteboard.switch_to(&id);
        }
        if let Some(id) = close_tab {
            self.whiteboard.remove_tab(&id);
        }

        let mut commit_tab: Option<(String, String)> = None;
        let mut cancel_tab = false;
        if let Some((id, draft)) = &mut self.tab_rename {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Rename:").small());
                let field = ui.add(egui::TextEdit::singleline(draft).desired_width(140.0));
                if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit_tab = Some((id.clone(), draft.clone()));
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancel_tab = true;
                }
            });
        }
        if let Some((id, title)) = commit_tab {
            self.whiteboard.rename_tab(&id, &title);
            self.tab_rename = None;
        }
        if cancel_tab {
            self.tab_rename = None;
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.strong(self.whiteboard.active().title.clone());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✚ New document").clicked() {
                    self.editor = Some(DocumentEditor {
                        document_id: None,
                        title: String::new(),
                        content: String::new(),
                    });
                }
            });
        });

        egui::ScrollArea::vertical()
            .id_source("whiteboard_documents")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let open_docs: Vec<TabDocument> = self.whiteboard.active().documents.clone();
                if open_docs.is_empty() {
                    ui.label(
                        egui::RichText::new("Nothing open on this screen.").weak().italics(),
                    );
                }
                let mut close_doc: Option<String> = None;
                for doc in &open_docs {
                    ui.horizontal(|ui| {
                        if ui.link(&doc.title).clicked() {
                            self.editor = Some(DocumentEditor {
                                document_id: Some(doc.id.clone()),
                                title: doc.title.clone(),
                                content: doc.content.clone(),
                            });
                        }
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if ui.small_button("✕").on_hover_text("Close").clicked() {
                                    close_doc = Some(doc.id.clone());
                                }
                            },
                        );
                    });
                }
                if let Some(id) = close_doc {
                    self.whiteboard.close_in_active(&id);
                }

                ui.separator();
                ui.strong("Saved documents");
                if self.documents.is_empty() {
                    ui.label(egui::RichText::new("No saved documents yet.").weak().italics());
                }
                let saved = self.documents.clone();
                let mut delete_doc: Option<String> = None;
                for doc in &saved {
                    ui.horizontal(|ui| {
                        if ui.link(&doc.title).clicked() {
                            self.whiteboard.open_document(TabDocument {
                                id: doc.id.clone(),
                                title: doc.title.clone(),
                                content: doc.content.clone(),
                            });
                        }
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                    delete_doc = Some(doc.id.clone());
                                }
                                if let Some(when) =
                                    chrono::DateTime::from_timestamp_millis(doc.created_at)
                                {
                                    ui.label(
                                        egui::RichText::new(when.format("%b %d").to_string())
                                            .small()
                                            .weak(),
                                    );
                                }
                            },
                        );
                    });
                }
                if let Some(id) = delete_doc {
                    self.whiteboard.close_document(&id);
                    self.documents.retain(|d| d.id != id);
                    self.persist
                        .send(PersistRequest::DeleteDocument { document_id: id });
                }
            });
    }

    fn editor_window(&mut self, ctx: &egui::Context) {
        let Some(editor) = &mut self.editor else {
            return;
        };
        let mut open = true;
        let mut save = false;
        let mut delete = false;
        egui::Window::new("Document")
            .open(&mut open)
            .collapsible(false)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Title:");
                    ui.add(
                        egui::TextEdit::singleline(&mut editor.title)
                            .desired_width(f32::INFINITY)
                            .hint_text("Untitled"),
                    );
                });
                ui.add(
                    egui::TextEdit::multiline(&mut editor.content)
                        .desired_rows(12)
                        .desired_width(f32::INFINITY),
                );
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if editor.document_id.is_some() && ui.button("Delete").clicked() {
                        delete = true;
                    }
                });
            });
        let document_id = editor.document_id.clone();
        let title = editor.title.clone();
        let content = editor.content.clone();

        if save {
            let title = if title.trim().is_empty() {
                "Untitled".to_string()
            } else {
                title.trim().to_string()
            };
            let id = document_id
                .clone()
                .unwrap_or_else(|| format!("doc-{}", chrono::Utc::now().timestamp_millis()));
            let created_at = self
                .documents
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.created_at)
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
            let row = DocumentRow {
                id: id.clone(),
                user_id: self.settings.user_id.clone(),
                title: title.clone(),
                content: content.clone(),
                created_at,
            };
            self.whiteboard.update_document(&id, &title, &content);
            self.whiteboard.open_document(TabDocument {
                id: id.clone(),
                title,
                content,
            });
            let class_id = self.store.current_class_id().to_string();
            self.persist.send(PersistRequest::SaveDocument {
                row: row.clone(),
                class_id: Some(class_id),
            });
            match self.documents.iter_mut().find(|d| d.id == id) {
                Some(existing) => *existing = row,
                None => self.documents.insert(0, row),
            }
            self.editor = None;
        } else if delete {
            if let Some(id) = document_id {
                self.whiteboard.close_document(&id);
                self.documents.retain(|d| d.id != id);
                self.persist
                    .send(PersistRequest::DeleteDocument { document_id: id });
            }
            self.editor = None;
        } else if !open {
            self.editor = None;
        }
    }

    fn board_ui(&mut self, ui: &mut egui::Ui, palette: &'static Palette) {
        let instances: Vec<WidgetInstance> = self.store.widgets().to_vec();
        let pointer = ui.input(|i| i.pointer.interact_pos());
        let mut runtimes = std::mem::take(&mut self.runtimes);

        let mut events: Vec<(String, WidgetEvent)> = Vec::new();
        let mut remove: Option<String> = None;
        let mut begin_drag: Option<(usize, String, String)> = None;
        let mut hover_sample: Option<(usize, f32, egui::Rect)> = None;
        let mut label_commit: Option<(String, String)> = None;
        let mut label_cancel = false;

        for (index, instance) in instances.iter().enumerate() {
            let dragging = self.drag.is_dragging(&instance.id);
            let minimized = self.minimized.contains(&instance.id);
            let stroke = if dragging {
                egui::Stroke::new(2.0, palette.primary)
            } else {
                egui::Stroke::new(1.0, palette.border)
            };
            let response = egui::Frame::none()
                .fill(palette.surface)
                .stroke(stroke)
                .rounding(10.0)
                .inner_margin(egui::Margin::same(10.0))
                .outer_margin(egui::Margin::symmetric(0.0, 4.0))
                .show(ui, |ui| {
                    if !minimized {
                        let (_, rows) = instance.size.cells();
                        ui.set_min_height(rows as f32 * 120.0);
                    }
                    ui.horizontal(|ui| {
                        if self.customizing {
                            let handle = ui
                                .add(
                                    egui::Label::new(egui::RichText::new("⠿").size(16.0))
                                        .sense(egui::Sense::drag()),
                                )
                                .on_hover_cursor(egui::CursorIcon::Grab);
                            if handle.drag_started() {
                                begin_drag =
                                    Some((index, instance.id.clone(), instance.label.clone()));
                            }
                        }
                        let editing_this = self
                            .label_edit
                            .as_ref()
                            .is_some_and(|(id, _)| id == &instance.id);
                        if editing_this {
                            if let Some((_, draft)) = &mut self.label_edit {
                                let field =
                                    ui.add(egui::TextEdit::singleline(draft).desired_width(140.0));
                                if field.lost_focus()
                                    && ui.input(|i| i.key_pressed(egui::Key::Enter))
                                {
                                    label_commit = Some((instance.id.clone(), draft.clone()));
                                }
                                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                                    label_cancel = true;
                                }
                            }
                        } else {
                            let label = ui.add(
                                egui::Label::new(
                                    egui::RichText::new(&instance.label).strong(),
                                )
                                .sense(egui::Sense::click()),
                            );
                            if self.customizing && label.double_clicked() {
                                self.label_edit =
                                    Some((instance.id.clone(), instance.label.clone()));
                            }
                        }
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if self.customizing && !instance.is_core {
                                    if ui
                                        .small_button("✕")
                                        .on_hover_text("Remove widget")
                                        .clicked()
                                    {
                                        remove = Some(instance.id.clone());
                                    }
                                }
                                let icon = if minimized { "🗖" } else { "🗕" };
                                if ui.small_button(icon).clicked() {
                                    if minimized {
                                        self.minimized.remove(&instance.id);
                                    } else {
                                        self.minimized.insert(instance.id.clone());
                                    }
                                }
                                if self.customizing {
                                    ui.label(
                                        egui::RichText::new(instance.size.as_str())
                                            .small()
                                            .weak(),
                                    );
                                }
                            },
                        );
                    });
                    if !minimized {
                        ui.separator();
                        match runtimes.iter_mut().find(|rt| rt.id == instance.id) {
                            Some(rt) => {
                                let wctx = WidgetCtx {
                                    palette,
                                    search: &self.search,
                                };
                                if let Some(event) = rt.ui.render(ui, &wctx) {
                                    events.push((instance.label.clone(), event));
                                }
                            }
                            None => {
                                ui.label(
                                    egui::RichText::new(
                                        "This widget is not available in this version.",
                                    )
                                    .weak()
                                    .italics(),
                                );
                            }
                        }
                    }
                })
                .response;

            if self.drag.is_active() {
                if let Some(pos) = pointer {
                    if response.rect.contains(pos) {
                        hover_sample = Some((index, pos.y, response.rect));
                    }
                }
            }
        }
        self.runtimes = runtimes;

        if let Some((index, id, label)) = begin_drag {
            self.drag.begin(self.customizing, index, &id, &label);
        }
        if let Some((hover_index, pointer_y, rect)) = hover_sample {
            self.drag.hover(&mut self.store, hover_index, pointer_y, rect);
        }
        if self.drag.is_active() && ui.input(|i| i.pointer.any_released()) {
            if self.drag.finish() {
                self.persist_snapshot();
            }
        }
        if let Some((id, draft)) = label_commit {
            if self.store.set_label(&id, &draft) {
                self.persist_snapshot();
            }
            self.label_edit = None;
        }
        if label_cancel {
            self.label_edit = None;
        }
        if let Some(id) = remove {
            self.do_remove_widget(&id);
        }
        for (label, event) in events {
            self.handle_widget_event(&label, event);
        }
    }
}

impl eframe::App for EduScreenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for err in self.persist.take_errors() {
            self.push_toast(ToastKind::Error, err);
        }

        let size = ctx.screen_rect().size();
        self.settings.window_size = Some((size.x, size.y));

        let palette = theme::resolve(&self.store.current_class().theme);
        if self.applied_theme != Some(palette.name) {
            ctx.set_visuals(theme::palette_to_visuals(palette));
            self.applied_theme = Some(palette.name);
        }

        self.header_ui(ctx, palette);
        egui::SidePanel::left("whiteboard")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                self.whiteboard_ui(ui);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.board_ui(ui, palette);
                });
        });
        self.editor_window(ctx);

        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.settings.save(crate::settings::SETTINGS_FILE) {
            tracing::warn!("saving settings failed: {err}");
        }
    }
}
