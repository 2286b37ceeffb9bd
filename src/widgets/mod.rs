use crate::media::{SearchError, SearchService};
use crate::storage::NoteRow;
use crate::theme::Palette;
use eframe::egui;

mod calculator;
mod notes;
mod timer;
mod youtube;

pub use calculator::{evaluate, CalcError, CalculatorWidget};
pub use notes::NotesWidget;
pub use timer::{AlarmStyle, TimerWidget};
pub use youtube::YoutubeWidget;

/// Context shared with widgets at render time.
pub struct WidgetCtx<'a> {
    pub palette: &'a Palette,
    pub search: &'a SearchService,
}

/// Stored data a widget constructor can hydrate from.
#[derive(Default)]
pub struct WidgetSeed<'a> {
    /// Notes belonging to the instance being built.
    pub notes: &'a [NoteRow],
}

/// Something a widget wants the app shell to take care of.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The note list changed and should be written through.
    NotesChanged {
        widget_id: String,
        notes: Vec<NoteRow>,
    },
    /// A countdown ran out.
    TimerFinished { alarm: AlarmStyle },
    /// A video search came back with an error.
    SearchFailed(SearchError),
}

/// Runtime state of one widget on the board.
pub trait Widget: Send {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetCtx<'_>) -> Option<WidgetEvent>;
}
