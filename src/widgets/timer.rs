use super::{Widget, WidgetCtx, WidgetEvent};
use eframe::egui;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

/// Countdowns are capped at one hour.
pub const MAX_DURATION_SECS: u64 = 3600;

static INPUT_FILTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9:]").unwrap());

/// How loudly the timer announces completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmStyle {
    Gentle,
    Standard,
    Urgent,
}

impl AlarmStyle {
    pub const ALL: [AlarmStyle; 3] = [AlarmStyle::Gentle, AlarmStyle::Standard, AlarmStyle::Urgent];

    pub fn label(&self) -> &'static str {
        match self {
            AlarmStyle::Gentle => "Gentle",
            AlarmStyle::Standard => "Standard",
            AlarmStyle::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Running { deadline: Instant, total: Duration },
    Paused { remaining: Duration, total: Duration },
    Finished,
}

/// Classroom countdown timer.
pub struct TimerWidget {
    widget_id: String,
    input: String,
    alarm: AlarmStyle,
    phase: Phase,
}

impl TimerWidget {
    pub fn new(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            input: "5:00".into(),
            alarm: AlarmStyle::Standard,
            phase: Phase::Idle,
        }
    }

    /// Strip everything that is not a digit or the first `:` and cap the
    /// entry at `mm:ss` width, so the field can never hold an unparseable
    /// shape mid-typing.
    pub fn sanitize_input(raw: &str) -> String {
        let filtered = INPUT_FILTER.replace_all(raw, "");
        let mut out = String::with_capacity(filtered.len());
        let mut seen_colon = false;
        for c in filtered.chars() {
            if c == ':' {
                if seen_colon {
                    continue;
                }
                seen_colon = true;
            }
            out.push(c);
            if out.len() >= 5 {
                break;
            }
        }
        out
    }

    /// Interpret a sanitized entry.
    ///
    /// `:ss` is seconds, `mm:ss` is minutes and seconds (either side may be
    /// blank), a bare number is seconds. The result is capped at
    /// [`MAX_DURATION_SECS`]; empty and zero entries arm nothing.
    pub fn parse_duration(input: &str) -> Option<Duration> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let total = if let Some(rest) = input.strip_prefix(':') {
            rest.parse::<u64>().ok()?
        } else if let Some((minutes, seconds)) = input.split_once(':') {
            let minutes = minutes.parse::<u64>().unwrap_or(0);
            let seconds = seconds.parse::<u64>().unwrap_or(0);
            minutes * 60 + seconds
        } else {
            input.parse::<u64>().ok()?
        };
        let total = total.min(MAX_DURATION_SECS);
        if total == 0 {
            return None;
        }
        Some(Duration::from_secs(total))
    }

    pub fn format_clock(remaining: Duration) -> String {
        let secs = remaining.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    fn arm(&mut self) {
        if let Some(total) = Self::parse_duration(&self.input) {
            tracing::debug!(timer = %self.widget_id, secs = total.as_secs(), "countdown armed");
            self.phase = Phase::Running {
                deadline: Instant::now() + total,
                total,
            };
        }
    }

    fn alarm_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Alarm:").small());
            for style in AlarmStyle::ALL {
                if ui
                    .selectable_label(self.alarm == style, egui::RichText::new(style.label()).small())
                    .clicked()
                {
                    self.alarm = style;
                }
            }
        });
    }

    fn clock_label(&self, ui: &mut egui::Ui, ctx: &WidgetCtx<'_>, remaining: Duration) {
        ui.label(
            egui::RichText::new(Self::format_clock(remaining))
                .monospace()
                .size(30.0)
                .color(ctx.palette.primary)
                .strong(),
        );
    }
}

impl Widget for TimerWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetCtx<'_>) -> Option<WidgetEvent> {
        let mut event = None;
        match self.phase {
            Phase::Idle => {
                ui.horizontal(|ui| {
                    let field = ui.add(
                        egui::TextEdit::singleline(&mut self.input)
                            .hint_text("mm:ss")
                            .desired_width(64.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    if field.changed() {
                        self.input = Self::sanitize_input(&self.input);
                    }
                    let submitted =
                        field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Start").clicked() || submitted {
                        self.arm();
                    }
                });
                self.alarm_row(ui);
            }
            Phase::Running { deadline, total } => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    tracing::debug!(timer = %self.widget_id, "countdown finished");
                    self.phase = Phase::Finished;
                    event = Some(WidgetEvent::TimerFinished { alarm: self.alarm });
                } else {
                    self.clock_label(ui, ctx, remaining);
                    ui.add(
                        egui::ProgressBar::new(
                            remaining.as_secs_f32() / total.as_secs_f32().max(1.0),
                        )
                        .fill(ctx.palette.secondary)
                        .desired_width(ui.available_width()),
                    );
                    ui.horizontal(|ui| {
                        if ui.button("Pause").clicked() {
                            self.phase = Phase::Paused { remaining, total };
                        }
                        if ui.button("Reset").clicked() {
                            self.phase = Phase::Idle;
                        }
                    });
                    ui.ctx().request_repaint_after(Duration::from_millis(200));
                }
            }
            Phase::Paused { remaining, total } => {
                self.clock_label(ui, ctx, remaining);
                ui.add(
                    egui::ProgressBar::new(remaining.as_secs_f32() / total.as_secs_f32().max(1.0))
                        .fill(ctx.palette.border)
                        .desired_width(ui.available_width()),
                );
                ui.horizontal(|ui| {
                    if ui.button("Resume").clicked() {
                        self.phase = Phase::Running {
                            deadline: Instant::now() + remaining,
                            total,
                        };
                    }
                    if ui.button("Reset").clicked() {
                        self.phase = Phase::Idle;
                    }
                });
            }
            Phase::Finished => {
                self.clock_label(ui, ctx, Duration::ZERO);
                ui.label(
                    egui::RichText::new("Time's up!")
                        .color(ui.visuals().warn_fg_color)
                        .strong(),
                );
                if ui.button("Reset").clicked() {
                    self.phase = Phase::Idle;
                }
            }
        }
        event
    }
}
