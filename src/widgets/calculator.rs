use super::{Widget, WidgetCtx, WidgetEvent};
use eframe::egui;

/// Keypad rows as displayed; `0` spans two columns in the last row.
pub const KEYPAD: [&[&str]; 5] = [
    &["C", "±", "%", "÷"],
    &["7", "8", "9", "×"],
    &["4", "5", "6", "-"],
    &["1", "2", "3", "+"],
    &["0", ".", "="],
];

const OPERATORS: [char; 4] = ['÷', '×', '-', '+'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    /// The expression does not parse.
    Malformed,
    /// The expression parses but the result is not a finite number, e.g.
    /// after a division by zero.
    NotFinite,
}

/// Evaluate a keypad expression. Display glyphs are mapped to their math
/// operators first; everything else is handed to the expression parser, so
/// there is no code execution path here no matter what ends up in the field.
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let normalized: String = expr
        .chars()
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            c => c,
        })
        .collect();
    let value = exmex::eval_str::<f64>(&normalized).map_err(|_| CalcError::Malformed)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NotFinite)
    }
}

fn format_result(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    value.to_string()
}

/// Byte range of the operand at the end of the expression. Empty when the
/// expression ends in an operator.
fn trailing_operand(expr: &str) -> std::ops::Range<usize> {
    if expr.ends_with(')') {
        let bytes = expr.as_bytes();
        let mut depth = 0usize;
        for i in (0..bytes.len()).rev() {
            match bytes[i] {
                b')' => depth += 1,
                b'(' => {
                    depth -= 1;
                    if depth == 0 {
                        return i..bytes.len();
                    }
                }
                _ => {}
            }
        }
        return 0..bytes.len();
    }
    let mut start = expr.len();
    for (i, c) in expr.char_indices().rev() {
        if c.is_ascii_digit() || c == '.' {
            start = i;
        } else {
            break;
        }
    }
    // A minus at the very front is a sign, not an operator.
    if start == 1 && expr.starts_with('-') {
        start = 0;
    }
    start..expr.len()
}

fn toggle_sign(expr: &str) -> String {
    let span = trailing_operand(expr);
    let token = &expr[span.clone()];
    if token.is_empty() {
        return expr.to_string();
    }
    let head = &expr[..span.start];
    if let Some(inner) = token.strip_prefix("(-").and_then(|t| t.strip_suffix(')')) {
        return format!("{head}{inner}");
    }
    if head.is_empty() {
        if let Some(positive) = token.strip_prefix('-') {
            return positive.to_string();
        }
        if token == "0" {
            return expr.to_string();
        }
        return format!("-{token}");
    }
    format!("{head}(-{token})")
}

fn percent(expr: &str) -> String {
    let span = trailing_operand(expr);
    let token = &expr[span.clone()];
    if token.is_empty() || token == "0" {
        return expr.to_string();
    }
    format!("{}({token}/100)", &expr[..span.start])
}

/// Keypad calculator over a single expression line.
pub struct CalculatorWidget {
    expression: String,
    error: bool,
}

impl Default for CalculatorWidget {
    fn default() -> Self {
        Self {
            expression: "0".into(),
            error: false,
        }
    }
}

impl CalculatorWidget {
    /// Text shown in the display line.
    pub fn display(&self) -> &str {
        if self.error {
            "Error"
        } else {
            &self.expression
        }
    }

    /// Handle one keypad press.
    pub fn press(&mut self, key: &str) {
        if self.error {
            // Any key clears the error; C and = stop there.
            self.error = false;
            self.expression = "0".into();
            if key == "C" || key == "=" {
                return;
            }
        }
        match key {
            "C" => self.expression = "0".into(),
            "=" => match evaluate(&self.expression) {
                Ok(value) => self.expression = format_result(value),
                Err(err) => {
                    tracing::debug!(?err, expr = %self.expression, "evaluation failed");
                    self.error = true;
                }
            },
            "±" => self.expression = toggle_sign(&self.expression),
            "%" => self.expression = percent(&self.expression),
            "÷" | "×" | "-" | "+" => self.press_operator(key),
            "." => self.press_decimal(),
            digit if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) => {
                self.press_digit(digit);
            }
            _ => {}
        }
    }

    fn press_digit(&mut self, digit: &str) {
        if self.expression == "0" {
            self.expression = digit.to_string();
        } else {
            self.expression.push_str(digit);
        }
    }

    fn press_operator(&mut self, op: &str) {
        match self.expression.chars().last() {
            // Two operators in a row replace instead of stacking, so the
            // display stays evaluable.
            Some(last) if OPERATORS.contains(&last) => {
                self.expression.pop();
            }
            Some('.') => {
                self.expression.pop();
            }
            _ => {}
        }
        self.expression.push_str(op);
    }

    fn press_decimal(&mut self) {
        let span = trailing_operand(&self.expression);
        let token = &self.expression[span];
        if token.contains('.') || token.ends_with(')') {
            return;
        }
        if token.is_empty() {
            self.expression.push_str("0.");
        } else {
            self.expression.push('.');
        }
    }
}

impl Widget for CalculatorWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetCtx<'_>) -> Option<WidgetEvent> {
        let display = self.display().to_string();
        egui::Frame::none()
            .fill(ctx.palette.hover)
            .rounding(6.0)
            .inner_margin(egui::Margin::symmetric(8.0, 6.0))
            .show(ui, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = egui::RichText::new(display).monospace().size(22.0);
                    ui.label(if self.error {
                        text.color(ui.visuals().error_fg_color)
                    } else {
                        text
                    });
                });
            });

        let mut pressed: Option<&str> = None;
        let spacing = ui.spacing().item_spacing.x;
        let unit = ((ui.available_width() - spacing * 3.0) / 4.0).max(24.0);
        for row in KEYPAD {
            ui.horizontal(|ui| {
                for key in row {
                    let wide = *key == "0";
                    let width = if wide { unit * 2.0 + spacing } else { unit };
                    let accent = matches!(*key, "÷" | "×" | "-" | "+" | "=");
                    let button = if accent {
                        egui::Button::new(
                            egui::RichText::new(*key).color(egui::Color32::WHITE).strong(),
                        )
                        .fill(ctx.palette.primary)
                    } else {
                        egui::Button::new(*key)
                    }
                    .min_size(egui::vec2(width, 28.0));
                    if ui.add(button).clicked() {
                        pressed = Some(*key);
                    }
                }
            });
        }
        if let Some(key) = pressed {
            self.press(key);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(widget: &mut CalculatorWidget, keys: &str) {
        for key in keys.split_whitespace() {
            widget.press(key);
        }
    }

    #[test]
    fn digits_and_operators_build_an_expression() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "1 2 + 3 ×");
        assert_eq!(calc.display(), "12+3×");
    }

    #[test]
    fn equals_evaluates_with_display_glyphs() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "1 2 + 3 × 4 =");
        assert_eq!(calc.display(), "24");
        press_all(&mut calc, "÷ 8 =");
        assert_eq!(calc.display(), "3");
    }

    #[test]
    fn leading_zero_is_replaced() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "0 0 7");
        assert_eq!(calc.display(), "7");
    }

    #[test]
    fn stacked_operators_replace_the_last_one() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "5 + ×");
        assert_eq!(calc.display(), "5×");
        press_all(&mut calc, "3 =");
        assert_eq!(calc.display(), "15");
    }

    #[test]
    fn division_by_zero_shows_error_and_recovers() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "5 ÷ 0 =");
        assert_eq!(calc.display(), "Error");
        // The next keypress starts a fresh expression.
        press_all(&mut calc, "7");
        assert_eq!(calc.display(), "7");
    }

    #[test]
    fn malformed_expression_errors_without_panicking() {
        let mut broken = CalculatorWidget::default();
        broken.expression = "5+".into();
        broken.press("=");
        assert_eq!(broken.display(), "Error");
    }

    #[test]
    fn percent_divides_the_trailing_operand() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "5 0 %");
        assert_eq!(calc.display(), "(50/100)");
        calc.press("=");
        assert_eq!(calc.display(), "0.5");

        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "2 0 0 × 1 0 % =");
        assert_eq!(calc.display(), "20");
    }

    #[test]
    fn sign_toggle_wraps_and_unwraps() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "5 ±");
        assert_eq!(calc.display(), "-5");
        calc.press("±");
        assert_eq!(calc.display(), "5");

        press_all(&mut calc, "+ 3 ±");
        assert_eq!(calc.display(), "5+(-3)");
        calc.press("±");
        assert_eq!(calc.display(), "5+3");
        calc.press("=");
        assert_eq!(calc.display(), "8");
    }

    #[test]
    fn decimal_applies_to_the_trailing_operand_only() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "1 . 5 + 2 .");
        assert_eq!(calc.display(), "1.5+2.");
        calc.press(".");
        assert_eq!(calc.display(), "1.5+2.");
        press_all(&mut calc, "5 =");
        assert_eq!(calc.display(), "4");
    }

    #[test]
    fn decimal_after_operator_starts_a_zero_operand() {
        let mut calc = CalculatorWidget::default();
        press_all(&mut calc, "1 + .");
        assert_eq!(calc.display(), "1+0.");
    }

    #[test]
    fn evaluate_rejects_garbage() {
        assert_eq!(evaluate("2+2"), Ok(4.0));
        assert_eq!(evaluate("1/0"), Err(CalcError::NotFinite));
        assert!(matches!(evaluate("2+"), Err(CalcError::Malformed)));
        assert!(matches!(evaluate("abc"), Err(CalcError::Malformed)));
    }
}
