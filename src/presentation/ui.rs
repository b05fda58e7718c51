use crate::application::{App, AppMode, Field};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Width of the `label = ` prefix in front of every form field.
const LABEL_WIDTH: u16 = 6;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_results(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "seqcalc - Sequence Calculator | Field: {}",
        app.focused.label()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let editing = matches!(app.mode, AppMode::Editing);

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.focused;
            let value = if focused && editing {
                app.input.as_str()
            } else {
                app.field_value(field)
            };
            let label_style = if focused {
                Style::default().bg(Color::LightBlue).fg(Color::Black)
            } else {
                Style::default().fg(Color::Yellow)
            };
            let value_style = if focused && editing {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<4}", field.label()), label_style),
                Span::raw("= "),
                Span::styled(value.to_string(), value_style),
            ])
        })
        .collect();

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Sequence"));
    f.render_widget(form, area);

    if editing {
        let row = Field::ALL.iter().position(|&field| field == app.focused).unwrap_or(0) as u16;
        let x = area.x + 1 + LABEL_WIDTH + app.cursor_position as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1 + row));
    }
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let lines = app.result_lines();
    let visible_height = area.height.saturating_sub(2) as usize;
    let start_line = app.result_scroll.min(lines.len().saturating_sub(1));
    let end_line = (start_line + visible_height).min(lines.len());

    let failed = app.response.as_ref().is_some_and(|r| r.is_error());
    let style = if failed {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let title = match &app.response {
        Some(response) if !response.is_error() => format!(
            "Result ({} terms, lines {}-{} of {})",
            response.terms.len(),
            start_line + 1,
            end_line,
            lines.len()
        ),
        _ => "Result".to_string(),
    };

    let results = Paragraph::new(lines[start_line..end_line].join("\n"))
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(style);
    f.render_widget(results, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Enter: edit | Tab: next field | c: calculate | Ctrl+S/O: save/load | Ctrl+E: CSV | Ctrl+J: save result | F1/?: help | q: quit".to_string()
            }
        }
        AppMode::Editing => format!(
            "Editing {} (Enter to calculate, Tab for next field, Esc to cancel)",
            app.focused.label()
        ),
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::SaveRequest => format!("Save request as: {} (Enter to save, Esc to cancel)", app.filename_input),
        AppMode::LoadRequest => format!("Load request from: {} (Enter to load, Esc to cancel)", app.filename_input),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::SaveResponse => format!("Save result as: {} (Enter to save, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::SaveRequest | AppMode::LoadRequest | AppMode::SaveResponse => {
                Style::default().fg(Color::Yellow)
            }
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("seqcalc Formula Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"SEQCALC FORMULA REFERENCE

=== BASIC CONCEPTS ===
• A formula describes the term a_k of a sequence in terms of k
• k runs over every integer from m to n (1 <= m <= n)
• The result lists every term, their sum and their product
• k is the only variable; any other name is a syntax error

=== OPERATORS ===
+  -           Addition, subtraction       k + 1, 2 - k
*  /           Multiplication, division    2*k, 1/k
%              Modulo                      k % 3
^  **          Power                       k^2, 2**k
-              Negation                    -k^2 is -(k^2)
!              Factorial                   k!, 1/k!
( )            Grouping                    (k+1)/(k-1)

Implicit multiplication is not supported: write 2*k, not 2k.

=== FUNCTIONS ===
sin cos tan cot sec csc         Trigonometric (radians)
asin acos atan                  Inverse trigonometric
sinh cosh tanh                  Hyperbolic
asinh acosh atanh               Inverse hyperbolic
exp(x)  ln(x)  log(x)           Exponential, natural logarithm
log(x, b)                       Logarithm in base b
sqrt(x)  cbrt(x)                Square and cube root
abs(x)  sign(x)                 Absolute value, sign
floor(x)  ceiling(x)            Rounding
factorial(n)  binomial(n, r)    Combinatorics
Min(a, ...)  Max(a, ...)        Smallest, largest argument

=== CONSTANTS ===
pi             3.14159...
E              2.71828...

=== ERRORS ===
A term that has no real value (1/0, sqrt(-1), log(0), ...) stops
the whole calculation and names the first failing k.

=== EXAMPLES ===
1/k            Harmonic terms
k^2            Squares
2*k + 1        Odd numbers
(-1)^k / k     Alternating series
1/k!           Terms of e

=== KEYS ===
Enter/F2/e     Edit the selected field
Tab/↑↓/jk      Move between fields
c/F5           Calculate
PgUp/PgDn      Scroll the result
Ctrl+S         Save the form to a JSON file
Ctrl+O         Load a form from a JSON file
Ctrl+E         Export the terms to CSV
Ctrl+J         Save the full result as JSON
F1 or ?        Show this help
q              Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
}
