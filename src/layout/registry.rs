use crate::class::{WidgetInstance, WidgetKind, WidgetSize};
use crate::widgets::{
    CalculatorWidget, NotesWidget, TimerWidget, Widget, WidgetSeed, YoutubeWidget,
};
use std::collections::HashMap;

/// Descriptor for building board widgets from stored instances.
#[derive(Clone)]
pub struct WidgetDescriptor {
    display_name: &'static str,
    default_size: WidgetSize,
    ctor: fn(&WidgetInstance, &WidgetSeed<'_>) -> Box<dyn Widget>,
}

impl WidgetDescriptor {
    pub fn new(
        display_name: &'static str,
        default_size: WidgetSize,
        ctor: fn(&WidgetInstance, &WidgetSeed<'_>) -> Box<dyn Widget>,
    ) -> Self {
        Self {
            display_name,
            default_size,
            ctor,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Size given to freshly added instances of this kind.
    pub fn default_size(&self) -> WidgetSize {
        self.default_size
    }

    pub fn create(&self, instance: &WidgetInstance, seed: &WidgetSeed<'_>) -> Box<dyn Widget> {
        (self.ctor)(instance, seed)
    }
}

/// Registry of available widget kinds.
///
/// Lookups by kind drive both adding (default size and label) and rendering
/// (constructing runtime state). Kinds without an entry, notably
/// [`WidgetKind::Unknown`] from files written by newer builds, resolve to
/// `None` everywhere: they occupy their board slot but draw nothing.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<WidgetKind, WidgetDescriptor>,
}

impl WidgetRegistry {
    /// Registry with the four built-in widgets.
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(
            WidgetKind::Timer,
            WidgetDescriptor::new("Timer", WidgetSize::OneByOne, |instance, _seed| {
                Box::new(TimerWidget::new(&instance.id))
            }),
        );
        reg.register(
            WidgetKind::Notes,
            WidgetDescriptor::new("Quick Notes", WidgetSize::OneByOne, |instance, seed| {
                Box::new(NotesWidget::new(&instance.id, seed.notes.to_vec()))
            }),
        );
        reg.register(
            WidgetKind::Calculator,
            WidgetDescriptor::new("Calculator", WidgetSize::OneByOne, |_instance, _seed| {
                Box::<CalculatorWidget>::default()
            }),
        );
        reg.register(
            WidgetKind::Youtube,
            WidgetDescriptor::new("YouTube Player", WidgetSize::OneByTwo, |_instance, _seed| {
                Box::<YoutubeWidget>::default()
            }),
        );
        reg
    }

    pub fn register(&mut self, kind: WidgetKind, descriptor: WidgetDescriptor) {
        self.map.insert(kind, descriptor);
    }

    pub fn contains(&self, kind: WidgetKind) -> bool {
        self.map.contains_key(&kind)
    }

    pub fn descriptor(&self, kind: WidgetKind) -> Option<&WidgetDescriptor> {
        self.map.get(&kind)
    }

    pub fn default_size(&self, kind: WidgetKind) -> Option<WidgetSize> {
        self.map.get(&kind).map(|d| d.default_size)
    }

    /// Build runtime state for an instance; `None` when the kind is not
    /// registered.
    pub fn create(
        &self,
        instance: &WidgetInstance,
        seed: &WidgetSeed<'_>,
    ) -> Option<Box<dyn Widget>> {
        self.map.get(&instance.kind).map(|d| d.create(instance, seed))
    }

    /// Registered kinds in a stable order for menus.
    pub fn kinds(&self) -> Vec<WidgetKind> {
        let mut kinds: Vec<WidgetKind> = self.map.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::GridPos;

    fn instance(kind: WidgetKind) -> WidgetInstance {
        WidgetInstance {
            id: format!("{kind}-1"),
            kind,
            label: kind.display_name().to_string(),
            size: WidgetSize::OneByOne,
            position: GridPos::default(),
            is_core: false,
        }
    }

    #[test]
    fn defaults_cover_the_builtin_kinds() {
        let reg = WidgetRegistry::with_defaults();
        for kind in [
            WidgetKind::Timer,
            WidgetKind::Notes,
            WidgetKind::Calculator,
            WidgetKind::Youtube,
        ] {
            assert!(reg.contains(kind), "missing {kind}");
            assert!(reg.create(&instance(kind), &WidgetSeed::default()).is_some());
        }
        assert_eq!(reg.kinds().len(), 4);
    }

    #[test]
    fn unknown_kind_resolves_to_nothing() {
        let reg = WidgetRegistry::with_defaults();
        assert!(!reg.contains(WidgetKind::Unknown));
        assert!(reg.default_size(WidgetKind::Unknown).is_none());
        assert!(reg
            .create(&instance(WidgetKind::Unknown), &WidgetSeed::default())
            .is_none());
    }

    #[test]
    fn youtube_defaults_to_a_tall_tile() {
        let reg = WidgetRegistry::with_defaults();
        assert_eq!(reg.default_size(WidgetKind::Youtube), Some(WidgetSize::OneByTwo));
        assert_eq!(reg.default_size(WidgetKind::Timer), Some(WidgetSize::OneByOne));
    }
}
