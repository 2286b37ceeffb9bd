use eduscreen::gui::EduScreenApp;
use eduscreen::layout::{LayoutStore, WidgetRegistry};
use eduscreen::media::{SearchClient, SearchService};
use eduscreen::settings::{Settings, SETTINGS_FILE};
use eduscreen::storage::{JsonStore, PersistHandle};

use eframe::egui;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    eduscreen::logging::init(settings.debug_logging);

    let files = JsonStore::new(settings.data_dir())?;
    let classes = files.load_classes(&settings.user_id)?;
    let notes = files.load_notes()?;
    let store = LayoutStore::from_classes(classes, WidgetRegistry::with_defaults());
    let documents = files.class_documents(store.current_class_id())?;

    let search = match &settings.search_endpoint {
        Some(endpoint) => {
            match SearchClient::new(endpoint, settings.user_id.clone(), settings.auth_token.clone())
            {
                Ok(client) => SearchService::new(client),
                Err(err) => {
                    tracing::warn!("ignoring search endpoint: {err}");
                    SearchService::disabled()
                }
            }
        }
        None => SearchService::disabled(),
    };

    let persist = PersistHandle::spawn(files.clone());

    let (width, height) = settings.window_size.unwrap_or((1280.0, 800.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([900.0, 600.0])
            .with_title("EduScreen"),
        ..Default::default()
    };

    let app = EduScreenApp::new(settings, files, store, persist, search, notes, documents);
    eframe::run_native(
        "EduScreen",
        native_options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("failed to start the UI: {err}"))?;
    Ok(())
}
