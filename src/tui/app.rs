//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Prediction requests, run synchronously on Enter

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::linear::JsonModelLoader;
use crate::adapters::remote::HttpArtifactFetcher;
use crate::application::{
    AcquisitionStrategy, HandleState, ModelProvider, PredictionService, RequestOutcome,
};
use crate::config::{AcquisitionMode, AppConfig};
use crate::domain::RecordSchema;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Prediction service wired to the production adapters.
pub type AdherenceService = PredictionService<JsonModelLoader, HttpArtifactFetcher>;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,

    should_quit: bool,

    service: AdherenceService,

    patient_form_state: PatientFormState,

    /// Outcome of the last request, if any
    result_state: Option<ResultState>,
}

impl App {
    /// Create the application from configuration, acquiring the model.
    ///
    /// Acquisition runs here so a missing local artifact stops startup
    /// before the terminal is touched.
    ///
    /// # Errors
    /// Returns error if the local artifact cannot be loaded.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let strategy = match &config.acquisition {
            AcquisitionMode::Local => AcquisitionStrategy::LocalFile {
                path: config.model_path.clone(),
            },
            AcquisitionMode::Remote { url } => AcquisitionStrategy::RemoteFetch {
                url: url.clone(),
                path: config.model_path.clone(),
            },
        };

        let provider = ModelProvider::new(
            strategy,
            JsonModelLoader::new(),
            HttpArtifactFetcher::new(),
            config.schema_source.fallback(),
            config.schema_source.prefers_artifact(),
        );

        provider.acquire()?;

        let service =
            PredictionService::new(Arc::new(provider), config.max_age, config.show_raw_label);
        Ok(Self::with_dependencies(service))
    }

    /// Create application with an injected service.
    #[must_use]
    pub fn with_dependencies(service: AdherenceService) -> Self {
        let max_age = service.max_age();
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            service,
            patient_form_state: PatientFormState::new(max_age),
            result_state: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn active_schema(&self) -> Option<&RecordSchema> {
        match self.service.provider().acquire() {
            Ok(HandleState::Ready(model)) => model.schema().ok(),
            _ => None,
        }
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match (&self.screen, &self.result_state) {
                    (Screen::Result, Some(result)) => render_result(f, chunks[0], result),
                    _ => render_patient_form(
                        f,
                        chunks[0],
                        &self.patient_form_state,
                        self.active_schema(),
                        self.service.provider().acquisition_error(),
                    ),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        let form = &mut self.patient_form_state;
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => form.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => form.reset(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.screen = Screen::PatientForm,
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state.reset();
                self.screen = Screen::PatientForm;
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        match self.patient_form_state.to_patient_input() {
            Ok(input) => {
                let RequestOutcome { message, record } = self.service.handle_request(&input);
                self.result_state = Some(ResultState { message, record });
                self.screen = Screen::Result;
            }
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
            }
        }
    }
}
