pub mod drag;
pub mod registry;
pub mod store;

pub use drag::{hover_outcome, DragController, DragPayload, HoverOutcome};
pub use registry::{WidgetDescriptor, WidgetRegistry};
pub use store::LayoutStore;
