use crate::layout::store::LayoutStore;
use eframe::egui;

/// The widget currently being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    pub id: String,
    pub label: String,
    /// Board index of the dragged widget. Updated after every live reorder
    /// so the hysteresis test always compares against the current position.
    pub index: usize,
    moved: bool,
}

/// What a hover over another widget should do to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    Keep,
    Move { from: usize, to: usize },
}

/// Midpoint hysteresis for drag-to-reorder.
///
/// Dragging downward only displaces the hovered widget once the pointer has
/// passed its vertical midpoint; dragging upward only while the pointer is
/// still above it. In the dead zone between those the order is kept, which
/// stops adjacent widgets from swapping back and forth under a resting
/// pointer.
pub fn hover_outcome(
    drag_index: usize,
    hover_index: usize,
    pointer_y: f32,
    hover_rect: egui::Rect,
) -> HoverOutcome {
    if drag_index == hover_index {
        return HoverOutcome::Keep;
    }
    let midpoint = hover_rect.center().y;
    if drag_index < hover_index && pointer_y < midpoint {
        return HoverOutcome::Keep;
    }
    if drag_index > hover_index && pointer_y > midpoint {
        return HoverOutcome::Keep;
    }
    HoverOutcome::Move {
        from: drag_index,
        to: hover_index,
    }
}

/// Tracks one drag gesture and applies live reorders to the store.
///
/// Reordering happens while the drag is in flight; dropping just ends the
/// gesture. A drag can only start while the board is in customize mode.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragPayload>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag. Refused outside customize mode.
    pub fn begin(&mut self, customizing: bool, index: usize, id: &str, label: &str) -> bool {
        if !customizing {
            return false;
        }
        self.active = Some(DragPayload {
            id: id.to_string(),
            label: label.to_string(),
            index,
            moved: false,
        });
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.active.as_ref().is_some_and(|p| p.id == id)
    }

    /// Feed one hover sample. When the hysteresis threshold is crossed the
    /// store is reordered immediately and the tracked index moves to the
    /// landing slot. Returns whether the board changed.
    pub fn hover(
        &mut self,
        store: &mut LayoutStore,
        hover_index: usize,
        pointer_y: f32,
        hover_rect: egui::Rect,
    ) -> bool {
        let Some(payload) = self.active.as_mut() else {
            return false;
        };
        let len = store.widgets().len();
        if payload.index >= len || hover_index >= len {
            return false;
        }
        match hover_outcome(payload.index, hover_index, pointer_y, hover_rect) {
            HoverOutcome::Keep => false,
            HoverOutcome::Move { from, to } => {
                store.reorder(from, to);
                payload.index = to;
                payload.moved = true;
                true
            }
        }
    }

    /// End the gesture. Returns whether any reorder happened during it, so
    /// the caller knows if there is anything to persist.
    pub fn finish(&mut self) -> bool {
        self.active.take().is_some_and(|p| p.moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::WidgetKind;
    use crate::layout::registry::WidgetRegistry;
    use eframe::egui::{pos2, Rect};

    fn row_rect(index: usize) -> Rect {
        let top = index as f32 * 100.0;
        Rect::from_min_max(pos2(0.0, top), pos2(300.0, top + 100.0))
    }

    fn board_ids(store: &LayoutStore) -> Vec<String> {
        store.widgets().iter().map(|w| w.id.clone()).collect()
    }

    fn four_widget_store() -> LayoutStore {
        let mut store = LayoutStore::new(WidgetRegistry::with_defaults());
        store.add_widget(WidgetKind::Notes);
        store
    }

    #[test]
    fn downward_drag_waits_for_the_midpoint() {
        let rect = row_rect(2);
        assert_eq!(hover_outcome(0, 2, rect.top() + 10.0, rect), HoverOutcome::Keep);
        assert_eq!(
            hover_outcome(0, 2, rect.center().y + 1.0, rect),
            HoverOutcome::Move { from: 0, to: 2 }
        );
    }

    #[test]
    fn upward_drag_fires_before_the_midpoint() {
        let rect = row_rect(0);
        assert_eq!(hover_outcome(2, 0, rect.bottom() - 10.0, rect), HoverOutcome::Keep);
        assert_eq!(
            hover_outcome(2, 0, rect.center().y - 1.0, rect),
            HoverOutcome::Move { from: 2, to: 0 }
        );
    }

    #[test]
    fn hovering_the_dragged_widget_keeps_order() {
        let rect = row_rect(1);
        assert_eq!(hover_outcome(1, 1, rect.center().y + 5.0, rect), HoverOutcome::Keep);
    }

    #[test]
    fn drag_only_starts_in_customize_mode() {
        let mut drag = DragController::new();
        assert!(!drag.begin(false, 0, "timer-1", "Class Timer"));
        assert!(!drag.is_active());
        assert!(drag.begin(true, 0, "timer-1", "Class Timer"));
        assert!(drag.is_dragging("timer-1"));
    }

    #[test]
    fn live_reorder_tracks_the_new_index() {
        let mut store = four_widget_store();
        let mut drag = DragController::new();
        drag.begin(true, 0, "youtube-1", "YouTube Player");

        // Below the midpoint of row 1: the dragged widget moves down one.
        let rect = row_rect(1);
        assert!(drag.hover(&mut store, 1, rect.center().y + 5.0, rect));
        assert_eq!(
            board_ids(&store),
            ["timer-1", "youtube-1", "calculator-1", "notes-1"]
        );
        assert_eq!(drag.payload().map(|p| p.index), Some(1));

        // The same sample again is now a self-hover and does nothing.
        assert!(!drag.hover(&mut store, 1, rect.center().y + 5.0, rect));

        assert!(drag.finish());
        assert!(!drag.is_active());
    }

    #[test]
    fn dead_zone_does_not_thrash() {
        let mut store = four_widget_store();
        let mut drag = DragController::new();
        drag.begin(true, 2, "calculator-1", "Calculator");

        // Dragging up over row 1 but still below its midpoint: nothing moves,
        // no matter how many frames deliver the same sample.
        let rect = row_rect(1);
        for _ in 0..5 {
            assert!(!drag.hover(&mut store, 1, rect.center().y + 20.0, rect));
        }
        assert_eq!(
            board_ids(&store),
            ["youtube-1", "timer-1", "calculator-1", "notes-1"]
        );
        assert!(!drag.finish());
    }

    #[test]
    fn full_gesture_matches_splice_semantics() {
        let mut store = four_widget_store();
        let mut drag = DragController::new();
        drag.begin(true, 0, "youtube-1", "YouTube Player");

        // Drag the first widget all the way past the third row.
        for hover in 1..=2 {
            let rect = row_rect(hover);
            drag.hover(&mut store, hover, rect.bottom() - 5.0, rect);
        }
        assert_eq!(
            board_ids(&store),
            ["timer-1", "calculator-1", "youtube-1", "notes-1"]
        );
        assert!(drag.finish());
    }

    #[test]
    fn stale_indices_are_refused() {
        let mut store = four_widget_store();
        let mut drag = DragController::new();
        drag.begin(true, 9, "ghost", "Ghost");
        let rect = row_rect(0);
        assert!(!drag.hover(&mut store, 0, rect.center().y, rect));
        assert_eq!(store.widgets().len(), 4);
    }
}
