//! Application state management for the terminal calculator.
//!
//! This module contains the main application state and mode management
//! for the terminal user interface.

use super::calculator::{Calculator, CalculatorConfig, SequenceRequest, SequenceResponse};

/// Represents the current mode of the application.
///
/// The mode determines how key presses are interpreted and which prompt the
/// status bar shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    /// Navigation mode - move between fields, scroll results, shortcuts
    Normal,
    /// The focused field is being edited
    Editing,
    /// Help screen is displayed
    Help,
    /// Prompting for a file to save the current request to
    SaveRequest,
    /// Prompting for a request file to load
    LoadRequest,
    /// Prompting for a CSV file to export the terms to
    ExportCsv,
    /// Prompting for a file to save the last response to as JSON
    SaveResponse,
}

/// The input fields of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Formula,
    LowerLimit,
    UpperLimit,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Formula, Field::LowerLimit, Field::UpperLimit];

    pub fn label(self) -> &'static str {
        match self {
            Field::Formula => "a_k",
            Field::LowerLimit => "m",
            Field::UpperLimit => "n",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Field::Formula => Field::LowerLimit,
            Field::LowerLimit => Field::UpperLimit,
            Field::UpperLimit => Field::Formula,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Formula => Field::UpperLimit,
            Field::LowerLimit => Field::Formula,
            Field::UpperLimit => Field::LowerLimit,
        }
    }
}

const DEFAULT_REQUEST_FILE: &str = "sequence.json";
const DEFAULT_RESPONSE_FILE: &str = "sequence-result.json";
const DEFAULT_CSV_FILE: &str = "sequence.csv";

/// Main application state containing the form, the last response and UI
/// state.
///
/// # Examples
///
/// ```
/// use seqcalc::application::{App, Field};
///
/// let app = App::default();
/// assert_eq!(app.focused, Field::Formula);
/// assert_eq!(app.request.formula, "1/k");
/// ```
#[derive(Debug)]
pub struct App {
    /// Current contents of the three form fields
    pub request: SequenceRequest,
    /// Field that navigation and editing act on
    pub focused: Field,
    /// Current application mode
    pub mode: AppMode,
    /// Edit buffer for the focused field (editing mode)
    pub input: String,
    /// Cursor position within the active buffer, in characters
    pub cursor_position: usize,
    /// Response of the last calculation, if any
    pub response: Option<SequenceResponse>,
    /// First visible line of the result pane
    pub result_scroll: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// File the request was last saved to or loaded from
    pub filename: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    calculator: Calculator,
}

impl Default for App {
    fn default() -> Self {
        Self::new(CalculatorConfig::default())
    }
}

impl App {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            request: SequenceRequest::new("1/k", "1", "10"),
            focused: Field::Formula,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            response: None,
            result_scroll: 0,
            help_scroll: 0,
            status_message: None,
            filename: None,
            filename_input: String::new(),
            calculator: Calculator::new(config),
        }
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Formula => &self.request.formula,
            Field::LowerLimit => &self.request.lower_limit,
            Field::UpperLimit => &self.request.upper_limit,
        }
    }

    fn field_value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Formula => &mut self.request.formula,
            Field::LowerLimit => &mut self.request.lower_limit,
            Field::UpperLimit => &mut self.request.upper_limit,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_previous(&mut self) {
        self.focused = self.focused.previous();
    }

    /// Switches to editing mode for the focused field.
    ///
    /// Loads the field into the input buffer and puts the cursor at the end.
    pub fn start_editing(&mut self) {
        self.mode = AppMode::Editing;
        self.input = self.field_value(self.focused).to_string();
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Stores the input buffer in the focused field without leaving editing
    /// mode.
    pub fn commit_input(&mut self) {
        let value = self.input.clone();
        *self.field_value_mut(self.focused) = value;
    }

    /// Commits the edit and moves on to the next field, still editing.
    pub fn edit_next_field(&mut self) {
        self.commit_input();
        self.focus_next();
        self.start_editing();
    }

    /// Completes editing, stores the field and recalculates.
    pub fn finish_editing(&mut self) {
        self.commit_input();
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
        self.calculate();
    }

    /// Cancels editing and returns to normal mode without saving changes.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Runs the calculator on the current form and keeps the response.
    pub fn calculate(&mut self) {
        let response = self.calculator.calculate(&self.request);
        self.status_message = Some(match &response.error {
            Some(_) => "Calculation failed".to_string(),
            None => format!("Calculated {} term(s)", response.terms.len()),
        });
        self.response = Some(response);
        self.result_scroll = 0;
    }

    /// Lines of the result pane.
    pub fn result_lines(&self) -> Vec<&str> {
        match &self.response {
            Some(response) => response.display_text().lines().collect(),
            None => vec!["Press Enter to edit a field, c to calculate."],
        }
    }

    pub fn scroll_results_down(&mut self, lines: usize) {
        let max = self.result_lines().len().saturating_sub(1);
        self.result_scroll = (self.result_scroll + lines).min(max);
    }

    pub fn scroll_results_up(&mut self, lines: usize) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
    }

    /// Buffer that typing goes to in the current mode.
    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.mode {
            AppMode::Editing => Some(&mut self.input),
            AppMode::SaveRequest | AppMode::LoadRequest | AppMode::ExportCsv | AppMode::SaveResponse => {
                Some(&mut self.filename_input)
            }
            AppMode::Normal | AppMode::Help => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer() {
            let at = byte_offset(buffer, cursor);
            buffer.insert(at, c);
            self.cursor_position += 1;
        }
    }

    pub fn delete_before_cursor(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        if let Some(buffer) = self.active_buffer() {
            let at = byte_offset(buffer, cursor - 1);
            buffer.remove(at);
            self.cursor_position -= 1;
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer() {
            if cursor < buffer.chars().count() {
                let at = byte_offset(buffer, cursor);
                buffer.remove(at);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.active_buffer().map(|b| b.chars().count()).unwrap_or(0);
        if self.cursor_position < len {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.active_buffer().map(|b| b.chars().count()).unwrap_or(0);
    }

    fn start_filename_prompt(&mut self, mode: AppMode, default: String) {
        self.mode = mode;
        self.filename_input = default;
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Switches to save mode, pre-filled with the current or default filename.
    pub fn start_save_request(&mut self) {
        let default = self.filename.clone().unwrap_or_else(|| DEFAULT_REQUEST_FILE.to_string());
        self.start_filename_prompt(AppMode::SaveRequest, default);
    }

    pub fn start_load_request(&mut self) {
        let default = self.filename.clone().unwrap_or_else(|| DEFAULT_REQUEST_FILE.to_string());
        self.start_filename_prompt(AppMode::LoadRequest, default);
    }

    pub fn start_csv_export(&mut self) {
        let default = self
            .filename
            .as_ref()
            .map(|f| f.replace(".json", ".csv"))
            .unwrap_or_else(|| DEFAULT_CSV_FILE.to_string());
        self.start_filename_prompt(AppMode::ExportCsv, default);
    }

    pub fn start_save_response(&mut self) {
        self.start_filename_prompt(AppMode::SaveResponse, DEFAULT_RESPONSE_FILE.to_string());
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.finish_filename_prompt();
    }

    fn finish_filename_prompt(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Filename typed at the prompt, or the default for the current mode.
    pub fn prompt_filename(&self) -> String {
        if !self.filename_input.trim().is_empty() {
            return self.filename_input.trim().to_string();
        }
        match self.mode {
            AppMode::ExportCsv => DEFAULT_CSV_FILE,
            AppMode::SaveResponse => DEFAULT_RESPONSE_FILE,
            _ => DEFAULT_REQUEST_FILE,
        }
        .to_string()
    }

    /// Processes the result of saving the request.
    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved to {}", filename));
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
        self.finish_filename_prompt();
    }

    /// Processes the result of loading a request; a loaded request is
    /// calculated right away.
    pub fn set_load_result(&mut self, result: Result<(SequenceRequest, String), String>) {
        self.finish_filename_prompt();
        match result {
            Ok((request, filename)) => {
                self.request = request;
                self.focused = Field::Formula;
                self.calculate();
                self.status_message = Some(format!("Loaded from {}", filename));
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Load failed: {}", error));
            }
        }
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Exported to {}", filename),
            Err(error) => format!("Export failed: {}", error),
        });
        self.finish_filename_prompt();
    }

    pub fn set_save_response_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Result saved to {}", filename),
            Err(error) => format!("Save failed: {}", error),
        });
        self.finish_filename_prompt();
    }
}

/// Byte offset of the `char_index`-th character, or the end of the string.
fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
