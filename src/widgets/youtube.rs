use super::{Widget, WidgetCtx, WidgetEvent};
use crate::media::{SearchTask, VideoResult};
use eframe::egui;
use std::time::Duration;

/// Watch page for a video id, safe for ids coming off the wire.
pub fn watch_url(video_id: &str) -> String {
    format!(
        "https://www.youtube.com/watch?v={}",
        urlencoding::encode(video_id)
    )
}

/// Turn an ISO 8601 duration (`PT1H2M3S`) into clock form (`1:02:03`).
/// Anything that does not look like one is shown as-is.
pub fn format_duration(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix("PT") else {
        return raw.to_string();
    };
    let (mut hours, mut minutes, mut seconds) = (0u64, 0u64, 0u64);
    let mut digits = String::new();
    let mut matched = false;
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value = digits.parse::<u64>().unwrap_or(0);
        digits.clear();
        match c {
            'H' => hours = value,
            'M' => minutes = value,
            'S' => seconds = value,
            _ => return raw.to_string(),
        }
        matched = true;
    }
    if !matched || !digits.is_empty() {
        return raw.to_string();
    }
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Video search and playback selection.
///
/// Searches run on a worker thread behind [`SearchTask`]; the widget polls
/// the task each frame and never blocks the UI. Playback itself is handed to
/// the system browser through a watch link.
#[derive(Default)]
pub struct YoutubeWidget {
    query: String,
    task: Option<SearchTask>,
    results: Vec<VideoResult>,
    now_playing: Option<VideoResult>,
    notice: Option<String>,
}

impl YoutubeWidget {
    fn poll_task(&mut self) -> Option<WidgetEvent> {
        let task = self.task.take()?;
        match task.poll() {
            None => {
                self.task = Some(task);
                None
            }
            Some(Ok(results)) => {
                if results.is_empty() {
                    self.notice = Some("No results. Try different keywords.".into());
                }
                self.results = results;
                None
            }
            Some(Err(err)) => {
                self.notice = Some("Search failed.".into());
                Some(WidgetEvent::SearchFailed(err))
            }
        }
    }
}

impl Widget for YoutubeWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetCtx<'_>) -> Option<WidgetEvent> {
        let event = self.poll_task();

        ui.horizontal(|ui| {
            let field = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text("Search videos...")
                    .desired_width((ui.available_width() - 72.0).max(60.0)),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_enabled(self.task.is_none(), egui::Button::new("Search"))
                .clicked();
            let query = self.query.trim();
            if (submitted || clicked) && !query.is_empty() && self.task.is_none() {
                self.notice = None;
                self.results.clear();
                self.task = Some(ctx.search.spawn_search(query.to_string()));
            }
        });

        if self.task.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Searching...").weak());
            });
            ui.ctx().request_repaint_after(Duration::from_millis(150));
        }
        if let Some(notice) = &self.notice {
            ui.label(egui::RichText::new(notice).weak().italics());
        }

        let mut stop = false;
        if let Some(video) = &self.now_playing {
            egui::Frame::none()
                .fill(ctx.palette.hover)
                .rounding(6.0)
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("Now playing").small().weak());
                    ui.hyperlink_to(video.title.as_str(), watch_url(&video.id));
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format_duration(&video.duration)).small().weak(),
                        );
                        if ui.small_button("Stop").clicked() {
                            stop = true;
                        }
                    });
                });
        }
        if stop {
            self.now_playing = None;
        }

        let mut play: Option<usize> = None;
        egui::ScrollArea::vertical()
            .id_source("video_results")
            .max_height(180.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (index, video) in self.results.iter().enumerate() {
                    ui.horizontal(|ui| {
                        if ui.small_button("▶").clicked() {
                            play = Some(index);
                        }
                        ui.add(egui::Label::new(&video.title).truncate(true));
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.label(
                                    egui::RichText::new(format_duration(&video.duration))
                                        .small()
                                        .weak(),
                                );
                            },
                        );
                    });
                }
            });
        if let Some(index) = play {
            self.now_playing = self.results.get(index).cloned();
        }

        event
    }
}
