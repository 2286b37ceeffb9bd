use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a board widget. Stored layouts may come from newer builds, so
/// unrecognized kinds deserialize to [`WidgetKind::Unknown`] instead of
/// failing the whole file; the registry then renders them as nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Timer,
    Notes,
    Calculator,
    Youtube,
    #[serde(other)]
    Unknown,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Timer => "timer",
            WidgetKind::Notes => "notes",
            WidgetKind::Calculator => "calculator",
            WidgetKind::Youtube => "youtube",
            WidgetKind::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WidgetKind::Timer => "Timer",
            WidgetKind::Notes => "Quick Notes",
            WidgetKind::Calculator => "Calculator",
            WidgetKind::Youtube => "YouTube Player",
            WidgetKind::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tile footprint in grid cells, columns x rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetSize {
    #[serde(rename = "1x1")]
    OneByOne,
    #[serde(rename = "1x2")]
    OneByTwo,
    #[serde(rename = "2x1")]
    TwoByOne,
    #[serde(rename = "2x2")]
    TwoByTwo,
}

impl WidgetSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetSize::OneByOne => "1x1",
            WidgetSize::OneByTwo => "1x2",
            WidgetSize::TwoByOne => "2x1",
            WidgetSize::TwoByTwo => "2x2",
        }
    }

    /// (columns, rows) spanned by the tile.
    pub fn cells(&self) -> (u8, u8) {
        match self {
            WidgetSize::OneByOne => (1, 1),
            WidgetSize::OneByTwo => (1, 2),
            WidgetSize::TwoByOne => (2, 1),
            WidgetSize::TwoByTwo => (2, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: f32,
    pub y: f32,
}

pub const GRID_COLUMNS: usize = 2;
pub const GRID_MARGIN: f32 = 20.0;
pub const CELL_PITCH_X: f32 = 380.0;
pub const CELL_PITCH_Y: f32 = 280.0;

/// Default spot for the n-th widget on a board: two columns, row-major.
pub fn tile_position(index: usize) -> GridPos {
    GridPos {
        x: GRID_MARGIN + (index % GRID_COLUMNS) as f32 * CELL_PITCH_X,
        y: GRID_MARGIN + (index / GRID_COLUMNS) as f32 * CELL_PITCH_Y,
    }
}

/// One widget placed on a class board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInstance {
    pub id: String,
    pub kind: WidgetKind,
    pub label: String,
    pub size: WidgetSize,
    #[serde(default)]
    pub position: GridPos,
    /// Core widgets ship with every class and cannot be removed.
    #[serde(default)]
    pub is_core: bool,
}

/// A class: a named board of widgets plus its theme choice.
///
/// The widget list is an ordered sequence; board order is exactly Vec order.
/// `counters` hands out per-kind ordinals for new widget ids and only ever
/// moves forward, so deleting `timer-2` never causes a second `timer-2` to be
/// minted later (stale references in the notes collection stay dead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub widgets: Vec<WidgetInstance>,
    #[serde(default)]
    counters: HashMap<String, u32>,
}

impl Class {
    /// A class seeded with the protected core trio: the big player tile, the
    /// class timer and the calculator.
    pub fn with_core_widgets(id: impl Into<String>, name: impl Into<String>) -> Self {
        let widgets = vec![
            WidgetInstance {
                id: "youtube-1".into(),
                kind: WidgetKind::Youtube,
                label: "YouTube Player".into(),
                size: WidgetSize::TwoByTwo,
                position: tile_position(0),
                is_core: true,
            },
            WidgetInstance {
                id: "timer-1".into(),
                kind: WidgetKind::Timer,
                label: "Class Timer".into(),
                size: WidgetSize::OneByOne,
                position: tile_position(1),
                is_core: true,
            },
            WidgetInstance {
                id: "calculator-1".into(),
                kind: WidgetKind::Calculator,
                label: "Calculator".into(),
                size: WidgetSize::OneByTwo,
                position: tile_position(2),
                is_core: true,
            },
        ];
        let mut class = Self {
            id: id.into(),
            name: name.into(),
            theme: "ocean".into(),
            widgets,
            counters: HashMap::new(),
        };
        class.heal_counters();
        class
    }

    /// Hand out the next ordinal for `kind`; never reissues a spent one.
    pub fn next_ordinal(&mut self, kind: WidgetKind) -> u32 {
        let counter = self.counters.entry(kind.as_str().to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Bring counters up to the highest ordinal present in widget ids.
    ///
    /// Layouts written before counters existed (or edited by hand) load with
    /// empty or stale counters; without this a fresh add could mint an id
    /// that is already on the board.
    pub fn heal_counters(&mut self) {
        for widget in &self.widgets {
            let Some((prefix, ordinal)) = widget.id.rsplit_once('-') else {
                continue;
            };
            let Ok(ordinal) = ordinal.parse::<u32>() else {
                continue;
            };
            let counter = self.counters.entry(prefix.to_string()).or_insert(0);
            if *counter < ordinal {
                *counter = ordinal;
            }
        }
    }

    /// Reassemble a class from stored rows.
    pub fn from_parts(
        id: String,
        name: String,
        theme: String,
        widgets: Vec<WidgetInstance>,
        counters: HashMap<String, u32>,
    ) -> Self {
        let mut class = Self {
            id,
            name,
            theme,
            widgets,
            counters,
        };
        class.heal_counters();
        class
    }

    /// Counter state, persisted alongside the class row.
    pub fn counters(&self) -> &HashMap<String, u32> {
        &self.counters
    }

    pub fn widget(&self, id: &str) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|w| w.id == id)
    }
}
