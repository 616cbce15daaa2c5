//! Patient data input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    category_labels, Column, OutcomeMessage, PatientInput, RecordSchema, ART_STATUS_MAPPING,
    SEX_MAPPING, TARGET_GROUP_MAPPING,
};
use crate::tui::styles::{ClinicTheme, APP_NAME};

/// What a field accepts
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Selector over a fixed domain; the first option is the default.
    Choice {
        options: Vec<&'static str>,
        index: usize,
    },
    /// Non-negative whole number, optionally bounded above.
    Count { value: String, max: Option<u32> },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub column: Column,
    pub hint: &'static str,
    pub kind: FieldKind,
}

impl FormField {
    fn choice(column: Column, hint: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            column,
            hint,
            kind: FieldKind::Choice { options, index: 0 },
        }
    }

    fn count(column: Column, hint: &'static str, max: Option<u32>) -> Self {
        Self {
            column,
            hint,
            kind: FieldKind::Count {
                value: "0".to_string(),
                max,
            },
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.column.name()
    }

    /// Text shown in the field box
    #[must_use]
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Choice { options, index } => {
                format!("◀ {} ▶", options.get(*index).copied().unwrap_or_default())
            }
            FieldKind::Count { value, .. } => value.clone(),
        }
    }

    fn selected_option(&self) -> Result<String, String> {
        match &self.kind {
            FieldKind::Choice { options, index } => options
                .get(*index)
                .map(|s| (*s).to_string())
                .ok_or_else(|| format!("{}: No option selected", self.label())),
            FieldKind::Count { .. } => Err(format!("{}: Not a selector", self.label())),
        }
    }

    fn parsed_count(&self) -> Result<u32, String> {
        match &self.kind {
            FieldKind::Count { value, max } => {
                let parsed: u32 = value
                    .parse()
                    .map_err(|_| format!("{}: Enter a whole number", self.label()))?;
                if let Some(max) = max {
                    if parsed > *max {
                        return Err(format!(
                            "{}: Value must be between 0 and {}",
                            self.label(),
                            max
                        ));
                    }
                }
                Ok(parsed)
            }
            FieldKind::Choice { .. } => Err(format!("{}: Not a number field", self.label())),
        }
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    max_age: u32,
}

impl PatientFormState {
    /// Build the form with every field at its default.
    #[must_use]
    pub fn new(max_age: u32) -> Self {
        Self {
            fields: vec![
                FormField::choice(Column::Sex, "Left/Right to change", category_labels(SEX_MAPPING)),
                FormField::choice(
                    Column::TargetGroup,
                    "Left/Right to change",
                    category_labels(TARGET_GROUP_MAPPING),
                ),
                FormField::count(Column::Age, "years", Some(max_age)),
                FormField::choice(
                    Column::CurrentArtStatus,
                    "Left/Right to change",
                    category_labels(ART_STATUS_MAPPING),
                ),
                FormField::count(Column::IitCount, "interruptions", None),
                FormField::count(Column::RefillCount, "refills", None),
                FormField::count(Column::UnsuppressedCount, "unsuppressed results", None),
                FormField::count(Column::ResultCount, "viral load results", None),
                FormField::count(Column::MonthsOnTreatment, "months", None),
                FormField::count(Column::MonthsSinceLastPickup, "months", None),
            ],
            selected_field: 0,
            error_message: None,
            max_age,
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Step the selected selector forward or backward, wrapping around.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldKind::Choice { options, index } = &mut self.fields[self.selected_field].kind {
            let len = options.len();
            if len == 0 {
                return;
            }
            *index = if forward {
                (*index + 1) % len
            } else {
                (*index + len - 1) % len
            };
            self.error_message = None;
        }
    }

    /// Add a digit to the selected number field
    pub fn input_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        if let FieldKind::Count { value, .. } = &mut self.fields[self.selected_field].kind {
            if *value == "0" {
                value.clear();
            }
            if value.len() < 9 {
                value.push(c);
            }
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldKind::Count { value, .. } = &mut self.fields[self.selected_field].kind {
            value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let FieldKind::Count { value, .. } = &mut self.fields[self.selected_field].kind {
            value.zeroize();
        }
    }

    /// Wipe all input buffers and restore defaults.
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            match &mut field.kind {
                FieldKind::Choice { index, .. } => *index = 0,
                FieldKind::Count { value, .. } => {
                    value.zeroize();
                    value.push('0');
                }
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn field(&self, column: Column) -> Result<&FormField, String> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .ok_or_else(|| format!("{column}: Missing field"))
    }

    /// Convert the field values to a [`PatientInput`].
    ///
    /// # Errors
    /// Returns a message naming the first field that does not parse or is
    /// out of range.
    pub fn to_patient_input(&self) -> Result<PatientInput, String> {
        let count = |column| self.field(column).and_then(FormField::parsed_count);
        let option = |column| self.field(column).and_then(FormField::selected_option);

        Ok(PatientInput {
            sex: option(Column::Sex)?,
            target_group: option(Column::TargetGroup)?,
            age: count(Column::Age)?,
            current_art_status: option(Column::CurrentArtStatus)?,
            iit_count: count(Column::IitCount)?,
            refill_count: count(Column::RefillCount)?,
            unsuppressed_count: count(Column::UnsuppressedCount)?,
            result_count: count(Column::ResultCount)?,
            months_on_treatment: count(Column::MonthsOnTreatment)?,
            months_since_last_pickup: count(Column::MonthsSinceLastPickup)?,
        })
    }

    /// Load sample data (an active client, one year on treatment)
    pub fn load_sample_data(&mut self) {
        let sample: [(Column, &str); 10] = [
            (Column::Sex, "Female"),
            (Column::TargetGroup, "PWID"),
            (Column::Age, "34"),
            (Column::CurrentArtStatus, "Active"),
            (Column::IitCount, "1"),
            (Column::RefillCount, "6"),
            (Column::UnsuppressedCount, "0"),
            (Column::ResultCount, "3"),
            (Column::MonthsOnTreatment, "12"),
            (Column::MonthsSinceLastPickup, "1"),
        ];
        for (column, val) in sample {
            if let Some(field) = self.fields.iter_mut().find(|f| f.column == column) {
                match &mut field.kind {
                    FieldKind::Choice { options, index } => {
                        if let Some(pos) = options.iter().position(|o| *o == val) {
                            *index = pos;
                        }
                    }
                    FieldKind::Count { value, .. } => *value = val.to_string(),
                }
            }
        }
        self.error_message = None;
    }

    #[must_use]
    pub fn max_age(&self) -> u32 {
        self.max_age
    }
}

/// Render the patient data input form.
///
/// Fields the active schema does not use are dimmed; they are still collected.
pub fn render_patient_form(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    schema: Option<&RecordSchema>,
    model_warning: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], model_warning);
    render_form_fields(f, chunks[1], state, schema);
    render_form_footer(f, chunks[2], state);
}

/// `model_warning` is the reason remote acquisition left no model.
fn render_form_header(f: &mut Frame, area: Rect, model_warning: Option<&str>) {
    let mut spans = vec![
        Span::styled(format!(" {APP_NAME} "), ClinicTheme::header()),
        Span::styled(" Viral Suppression Prediction", ClinicTheme::title()),
    ];
    if let Some(reason) = model_warning {
        spans.push(Span::styled(
            format!(" │ {}", OutcomeMessage::load_error(reason)),
            ClinicTheme::danger(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    schema: Option<&RecordSchema>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field, schema);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
        schema,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
    schema: Option<&RecordSchema>,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let in_schema = schema.map_or(true, |s| s.columns().contains(&field.column));

        let border_style = if is_selected {
            ClinicTheme::border_focused()
        } else {
            ClinicTheme::border()
        };
        let title_style = match (is_selected, in_schema) {
            (true, _) => ClinicTheme::focused(),
            (false, true) => ClinicTheme::text_secondary(),
            (false, false) => ClinicTheme::text_muted(),
        };
        let value_style = if in_schema {
            ClinicTheme::text()
        } else {
            ClinicTheme::text_muted()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(field.display(), value_style),
            Span::styled(format!("  {}", field.hint), ClinicTheme::text_muted()),
        ];
        if is_selected {
            spans.insert(2, Span::styled("▌", ClinicTheme::cursor()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicTheme::danger()),
            Span::styled(err.clone(), ClinicTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicTheme::key_hint()),
            Span::styled("Navigate ", ClinicTheme::key_desc()),
            Span::styled("[←→] ", ClinicTheme::key_hint()),
            Span::styled("Change ", ClinicTheme::key_desc()),
            Span::styled("[Enter] ", ClinicTheme::key_hint()),
            Span::styled("Predict ", ClinicTheme::key_desc()),
            Span::styled("[S] ", ClinicTheme::key_hint()),
            Span::styled("Sample ", ClinicTheme::key_desc()),
            Span::styled("[R] ", ClinicTheme::key_hint()),
            Span::styled("Reset ", ClinicTheme::key_desc()),
            Span::styled("[Esc] ", ClinicTheme::key_hint()),
            Span::styled("Quit", ClinicTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(state: &mut PatientFormState, column: Column) {
        state.selected_field = state
            .fields
            .iter()
            .position(|f| f.column == column)
            .expect("field");
    }

    #[test]
    fn test_defaults_build_first_options_and_zeros() {
        let state = PatientFormState::new(100);
        let input = state.to_patient_input().expect("defaults");
        assert_eq!(input, PatientInput::default());
        assert_eq!(state.fields.len(), Column::ALL.len());
    }

    #[test]
    fn test_sample_data_matches_reference_record() {
        let mut state = PatientFormState::new(100);
        state.load_sample_data();
        let input = state.to_patient_input().expect("sample");
        let record = crate::domain::PatientRecord::assemble(&input, &RecordSchema::full());
        assert_eq!(record.values(), &[1, 2, 34, 0, 1, 6, 0, 3, 12, 1]);
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let mut state = PatientFormState::new(100);
        select(&mut state, Column::Sex);
        state.cycle_choice(false);
        assert_eq!(state.to_patient_input().expect("input").sex, "Female");
        state.cycle_choice(true);
        assert_eq!(state.to_patient_input().expect("input").sex, "Male");
    }

    #[test]
    fn test_number_input() {
        let mut state = PatientFormState::new(100);
        select(&mut state, Column::Age);
        state.input_char('4');
        state.input_char('x');
        state.input_char('2');
        assert_eq!(state.to_patient_input().expect("input").age, 42);

        state.delete_char();
        assert_eq!(state.to_patient_input().expect("input").age, 4);

        state.clear_field();
        let err = state.to_patient_input().unwrap_err();
        assert!(err.starts_with("Age:"));
    }

    #[test]
    fn test_age_above_limit_is_rejected() {
        let mut state = PatientFormState::new(100);
        select(&mut state, Column::Age);
        for c in "101".chars() {
            state.input_char(c);
        }
        let err = state.to_patient_input().unwrap_err();
        assert_eq!(err, "Age: Value must be between 0 and 100");
        assert_eq!(state.max_age(), 100);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = PatientFormState::new(100);
        state.load_sample_data();
        state.next_field();
        state.error_message = Some("stale".into());

        state.reset();
        assert_eq!(state.selected_field, 0);
        assert!(state.error_message.is_none());
        assert_eq!(
            state.to_patient_input().expect("defaults"),
            PatientInput::default()
        );
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = PatientFormState::new(100);
        state.prev_field();
        assert_eq!(state.selected_field, state.fields.len() - 1);
        state.next_field();
        assert_eq!(state.selected_field, 0);
    }
}
