use super::{Widget, WidgetCtx, WidgetEvent};
use crate::storage::{NoteColor, NoteRow};
use eframe::egui;

/// Sticky-note fills are pastel in every theme; the note text is painted in
/// a fixed dark ink so it stays readable on the dark palette too.
fn note_fill(color: NoteColor) -> egui::Color32 {
    match color {
        NoteColor::Yellow => egui::Color32::from_rgb(0xFE, 0xF9, 0xC3),
        NoteColor::Blue => egui::Color32::from_rgb(0xDB, 0xEA, 0xFE),
        NoteColor::Green => egui::Color32::from_rgb(0xDC, 0xFC, 0xE7),
        NoteColor::Pink => egui::Color32::from_rgb(0xFC, 0xE7, 0xF3),
    }
}

const NOTE_INK: egui::Color32 = egui::Color32::from_rgb(0x1E, 0x29, 0x3B);

/// Color-coded quick notes, one list per widget instance.
pub struct NotesWidget {
    widget_id: String,
    notes: Vec<NoteRow>,
    draft: String,
    color: NoteColor,
    seq: u32,
}

impl NotesWidget {
    pub fn new(widget_id: impl Into<String>, notes: Vec<NoteRow>) -> Self {
        Self {
            widget_id: widget_id.into(),
            notes,
            draft: String::new(),
            color: NoteColor::Yellow,
            seq: 0,
        }
    }

    pub fn notes(&self) -> &[NoteRow] {
        &self.notes
    }

    /// Append the draft as a note. Whitespace-only drafts are dropped.
    /// Returns whether the list changed.
    pub fn commit_draft(&mut self) -> bool {
        let text = self.draft.trim();
        if text.is_empty() {
            return false;
        }
        let created_at = chrono::Utc::now().timestamp_millis();
        self.seq += 1;
        self.notes.push(NoteRow {
            id: format!("{}-{}", created_at, self.seq),
            widget_id: self.widget_id.clone(),
            text: text.to_string(),
            color: self.color,
            created_at,
        });
        self.draft.clear();
        true
    }

    pub fn remove_note(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    fn changed_event(&self) -> WidgetEvent {
        WidgetEvent::NotesChanged {
            widget_id: self.widget_id.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl Widget for NotesWidget {
    fn render(&mut self, ui: &mut egui::Ui, _ctx: &WidgetCtx<'_>) -> Option<WidgetEvent> {
        let mut changed = false;
        let mut removed: Option<String> = None;

        egui::ScrollArea::vertical()
            .id_source(("notes", &self.widget_id))
            .max_height(140.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for note in &self.notes {
                    egui::Frame::none()
                        .fill(note_fill(note.color))
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(8.0, 6.0))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(&note.text).color(NOTE_INK),
                                    )
                                    .wrap(true),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("✕").clicked() {
                                            removed = Some(note.id.clone());
                                        }
                                    },
                                );
                            });
                        });
                }
                if self.notes.is_empty() {
                    ui.label(egui::RichText::new("No notes yet").weak().italics());
                }
            });

        if let Some(id) = removed {
            changed |= self.remove_note(&id);
        }

        ui.horizontal(|ui| {
            for color in [
                NoteColor::Yellow,
                NoteColor::Blue,
                NoteColor::Green,
                NoteColor::Pink,
            ] {
                let selected = self.color == color;
                let button = egui::Button::new("  ")
                    .fill(note_fill(color))
                    .stroke(if selected {
                        egui::Stroke::new(2.0, NOTE_INK)
                    } else {
                        egui::Stroke::NONE
                    });
                if ui.add(button).clicked() {
                    self.color = color;
                }
            }
        });
        ui.horizontal(|ui| {
            let field = ui.add(
                egui::TextEdit::singleline(&mut self.draft)
                    .hint_text("Add a note...")
                    .desired_width(ui.available_width() - 48.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Add").clicked() || submitted {
                changed |= self.commit_draft();
            }
        });

        changed.then(|| self.changed_event())
    }
}
