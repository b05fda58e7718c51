use crate::application::{App, AppMode};
use crate::infrastructure::{CsvExporter, FileRepository};
use crossterm::event::{KeyCode, KeyModifiers};

const NO_RESULT: &str = "no calculation yet, press c first";

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveRequest
            | AppMode::LoadRequest
            | AppMode::ExportCsv
            | AppMode::SaveResponse => Self::handle_filename_input_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => app.start_save_request(),
                KeyCode::Char('o') => app.start_load_request(),
                KeyCode::Char('e') => app.start_csv_export(),
                KeyCode::Char('j') => app.start_save_response(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                app.status_message = None;
                app.focus_next();
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                app.status_message = None;
                app.focus_previous();
            }
            KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('e') => {
                app.start_editing();
            }
            KeyCode::Char('c') | KeyCode::F(5) => {
                app.calculate();
            }
            KeyCode::PageDown => {
                app.scroll_results_down(10);
            }
            KeyCode::PageUp => {
                app.scroll_results_up(10);
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            KeyCode::Esc => {
                app.status_message = None;
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Tab => app.edit_next_field(),
            _ => Self::handle_text_key(app, key),
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.prompt_filename();
                match app.mode {
                    AppMode::SaveRequest => {
                        let result = FileRepository::save_request(&app.request, &filename);
                        app.set_save_result(result);
                    }
                    AppMode::LoadRequest => {
                        let result = FileRepository::load_request(&filename);
                        app.set_load_result(result);
                    }
                    AppMode::ExportCsv => {
                        let result = match &app.response {
                            Some(response) => CsvExporter::export_terms(response, &filename),
                            None => Err(NO_RESULT.to_string()),
                        };
                        app.set_csv_export_result(result);
                    }
                    AppMode::SaveResponse => {
                        let result = match &app.response {
                            Some(response) => FileRepository::save_response(response, &filename),
                            None => Err(NO_RESULT.to_string()),
                        };
                        app.set_save_response_result(result);
                    }
                    AppMode::Normal | AppMode::Editing | AppMode::Help => {}
                }
            }
            KeyCode::Esc => app.cancel_filename_input(),
            _ => Self::handle_text_key(app, key),
        }
    }

    /// Cursor movement and typing shared by every text prompt.
    fn handle_text_key(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Backspace => app.delete_before_cursor(),
            KeyCode::Delete => app.delete_at_cursor(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Field, SequenceRequest};
    use tempfile::tempdir;

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = App::default();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused, Field::LowerLimit);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.focused, Field::UpperLimit);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused, Field::LowerLimit);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused, Field::Formula);
    }

    #[test]
    fn test_edit_and_calculate_with_keys() {
        let mut app = App::default();

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, AppMode::Editing));
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "k^2");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused, Field::LowerLimit);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "2");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "4");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(app.request, SequenceRequest::new("k^2", "2", "4"));
        let response = app.response.as_ref().unwrap();
        assert_eq!(response.sum, Some(29.0));
        assert_eq!(response.product, Some(576.0));
    }

    #[test]
    fn test_letters_are_typed_while_editing() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "+sqrt(k)");

        assert_eq!(app.input, "1/k+sqrt(k)");
        assert!(matches!(app.mode, AppMode::Editing));
        assert_eq!(app.focused, Field::Formula);
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "+1");
        press(&mut app, KeyCode::Esc);

        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(app.request.formula, "1/k");
        assert!(app.response.is_none());
    }

    #[test]
    fn test_calculate_key() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('c'));

        assert_eq!(app.response.as_ref().map(|r| r.terms.len()), Some(10));
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.result_scroll, 10);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.result_scroll, 0);
    }

    #[test]
    fn test_help_mode_toggle() {
        let mut app = App::default();
        press(&mut app, KeyCode::F(1));
        assert!(matches!(app.mode, AppMode::Help));

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.help_scroll, 6);

        press(&mut app, KeyCode::Char('q'));
        assert!(matches!(app.mode, AppMode::Normal));
    }

    #[test]
    fn test_csv_export_key_binding() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);

        assert!(matches!(app.mode, AppMode::ExportCsv));
        assert_eq!(app.filename_input, "sequence.csv");
    }

    #[test]
    fn test_export_without_result_reports_error() {
        let mut app = App::default();
        app.start_csv_export();
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(
            app.status_message.as_deref(),
            Some("Export failed: no calculation yet, press c first")
        );
    }

    #[test]
    fn test_filename_input_editing() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches!(app.mode, AppMode::SaveRequest));

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.filename_input, "sequence.jsonx");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.filename_input, "sequence.json");

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.filename_input.is_empty());
    }

    #[test]
    fn test_save_then_load_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("form.json");
        let filename = path.to_str().unwrap().to_string();

        let mut app = App::default();
        app.request = SequenceRequest::new("2*k+1", "1", "3");
        app.start_save_request();
        app.filename_input = filename.clone();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.filename.as_deref(), Some(filename.as_str()));

        let mut other = App::default();
        other.start_load_request();
        other.filename_input = filename;
        press(&mut other, KeyCode::Enter);

        assert_eq!(other.request, SequenceRequest::new("2*k+1", "1", "3"));
        assert_eq!(other.response.as_ref().and_then(|r| r.sum), Some(15.0));
    }

    #[test]
    fn test_save_response_key_flow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");

        let mut app = App::default();
        press(&mut app, KeyCode::Char('c'));
        InputHandler::handle_key_event(&mut app, KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert!(matches!(app.mode, AppMode::SaveResponse));
        app.filename_input = path.to_str().unwrap().to_string();
        press(&mut app, KeyCode::Enter);

        assert!(path.exists());
        assert!(app.status_message.unwrap().starts_with("Result saved to"));
    }
}
