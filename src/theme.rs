use eframe::egui;

/// One of the fixed display palettes a class can select.
///
/// The palette set is reference data baked into the binary; classes store only
/// the palette name. Eight roles cover everything the board draws: brand
/// colors (`primary`, `secondary`, `accent`), surfaces (`background`,
/// `surface`), and chrome (`text`, `border`, `hover`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub accent: egui::Color32,
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub text: egui::Color32,
    pub border: egui::Color32,
    pub hover: egui::Color32,
}

const fn rgb(r: u8, g: u8, b: u8) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

/// All selectable palettes, in display order. The first entry is the fallback
/// for unknown theme names.
pub const PALETTES: [Palette; 6] = [
    Palette {
        name: "ocean",
        primary: rgb(0x4F, 0x46, 0xE5),
        secondary: rgb(0x81, 0x8C, 0xF8),
        accent: rgb(0x6E, 0xE7, 0xB7),
        background: rgb(0xF8, 0xFA, 0xFC),
        surface: rgb(0xFF, 0xFF, 0xFF),
        text: rgb(0x1E, 0x29, 0x3B),
        border: rgb(0xE2, 0xE8, 0xF0),
        hover: rgb(0xF1, 0xF5, 0xF9),
    },
    Palette {
        name: "sunset",
        primary: rgb(0xF9, 0x73, 0x16),
        secondary: rgb(0xFB, 0x92, 0x3C),
        accent: rgb(0xFB, 0xBF, 0x24),
        background: rgb(0xFF, 0xF7, 0xED),
        surface: rgb(0xFF, 0xFF, 0xFF),
        text: rgb(0x43, 0x14, 0x07),
        border: rgb(0xFE, 0xD7, 0xAA),
        hover: rgb(0xFF, 0xF3, 0xE7),
    },
    Palette {
        name: "forest",
        primary: rgb(0x05, 0x96, 0x69),
        secondary: rgb(0x34, 0xD3, 0x99),
        accent: rgb(0xA7, 0xF3, 0xD0),
        background: rgb(0xF0, 0xFD, 0xF4),
        surface: rgb(0xFF, 0xFF, 0xFF),
        text: rgb(0x06, 0x4E, 0x3B),
        border: rgb(0xD1, 0xFA, 0xE5),
        hover: rgb(0xEC, 0xFD, 0xF5),
    },
    Palette {
        name: "berry",
        primary: rgb(0xDB, 0x27, 0x77),
        secondary: rgb(0xEC, 0x48, 0x99),
        accent: rgb(0xF9, 0xA8, 0xD4),
        background: rgb(0xFD, 0xF2, 0xF8),
        surface: rgb(0xFF, 0xFF, 0xFF),
        text: rgb(0x83, 0x18, 0x43),
        border: rgb(0xFC, 0xE7, 0xF3),
        hover: rgb(0xFD, 0xF2, 0xF8),
    },
    Palette {
        name: "dark",
        primary: rgb(0x63, 0x66, 0xF1),
        secondary: rgb(0x81, 0x8C, 0xF8),
        accent: rgb(0x34, 0xD3, 0x99),
        background: rgb(0x0F, 0x17, 0x2A),
        surface: rgb(0x1E, 0x29, 0x3B),
        text: rgb(0xF8, 0xFA, 0xFC),
        border: rgb(0x33, 0x41, 0x55),
        hover: rgb(0x1E, 0x29, 0x3B),
    },
    Palette {
        name: "minimal",
        primary: rgb(0x47, 0x55, 0x69),
        secondary: rgb(0x64, 0x74, 0x8B),
        accent: rgb(0x94, 0xA3, 0xB8),
        background: rgb(0xFF, 0xFF, 0xFF),
        surface: rgb(0xF8, 0xFA, 0xFC),
        text: rgb(0x0F, 0x17, 0x2A),
        border: rgb(0xE2, 0xE8, 0xF0),
        hover: rgb(0xF1, 0xF5, 0xF9),
    },
];

/// Look up a palette by name. Unknown or stale names resolve to the first
/// palette so a class loaded from an older or newer file always renders.
pub fn resolve(name: &str) -> &'static Palette {
    PALETTES.iter().find(|p| p.name == name).unwrap_or(&PALETTES[0])
}

pub fn palette_names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|p| p.name)
}

/// Build the egui visuals for a palette. The app applies the result at
/// startup and again whenever the active class (or its theme) changes; no
/// styling state lives outside the egui context.
pub fn palette_to_visuals(palette: &Palette) -> egui::Visuals {
    let mut visuals = if palette.name == "dark" {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.window_fill = palette.surface;
    visuals.panel_fill = palette.background;
    visuals.override_text_color = Some(palette.text);
    visuals.hyperlink_color = palette.primary;

    visuals.widgets.noninteractive.bg_fill = palette.background;
    visuals.widgets.noninteractive.bg_stroke.color = palette.border;
    visuals.widgets.inactive.bg_fill = palette.surface;
    visuals.widgets.inactive.bg_stroke.color = palette.border;
    visuals.widgets.hovered.bg_fill = palette.hover;
    visuals.widgets.hovered.bg_stroke.color = palette.secondary;
    visuals.widgets.active.bg_fill = palette.hover;
    visuals.widgets.active.bg_stroke.color = palette.primary;

    visuals.selection.bg_fill = palette.primary.gamma_multiply(0.35);
    visuals.selection.stroke.color = palette.primary;

    visuals
}
