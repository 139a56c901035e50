use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::listing::RenderedEntry;
use crate::models::{EntryFields, Field, FieldSet};

/// Internal representation of the entry form. Values are kept positionally,
/// aligned with [`FieldSet::fields`].
#[derive(Clone)]
pub(crate) struct EntryForm {
    pub(crate) field_set: FieldSet,
    values: Vec<String>,
    active: usize,
}

impl EntryForm {
    pub(crate) fn new(field_set: FieldSet) -> Self {
        Self {
            field_set,
            values: vec![String::new(); field_set.fields().len()],
            active: 0,
        }
    }

    pub(crate) fn active_field(&self) -> Field {
        self.field_set.fields()[self.active]
    }

    pub(crate) fn active_index(&self) -> usize {
        self.active
    }

    /// Move focus to the next field, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.values.len();
    }

    /// Move focus to the previous field, wrapping at the start.
    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + self.values.len() - 1) % self.values.len();
    }

    /// Append a character to the active field. Every printable character is
    /// accepted; there is no per-field validation.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.values[self.active].push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.values[self.active].pop();
    }

    /// Current raw text of `field`, or `None` if this form does not collect it.
    #[cfg(test)]
    pub(crate) fn value(&self, field: Field) -> Option<&str> {
        self.field_set
            .fields()
            .iter()
            .position(|f| *f == field)
            .map(|idx| self.values[idx].as_str())
    }

    /// Build the record to store, applying the variant's blank-value rule.
    /// Fields this form does not collect stay absent.
    pub(crate) fn to_fields(&self) -> EntryFields {
        let mut fields = EntryFields::default();
        for (field, raw) in self.field_set.fields().iter().zip(&self.values) {
            fields.set(*field, self.field_set.submitted_value(*field, raw));
        }
        fields
    }

    /// Empty every field and focus the first one.
    pub(crate) fn reset(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.active = 0;
    }

    /// Render one field line for the form widget.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let field = self.field_set.fields()[index];
        let value = &self.values[index];
        let is_active = index == self.active;

        let display = if value.is_empty() && !is_active {
            match self.field_set {
                FieldSet::Extended if field.defaults_to_not_available() => "<N/A>".to_string(),
                _ => "<empty>".to_string(),
            }
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Column where the cursor sits on the active line.
    pub(crate) fn cursor_offset(&self) -> usize {
        self.active_field().label().chars().count() + 2 + self.values[self.active].chars().count()
    }
}

/// State for confirming the removal of a single entry.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmDelete {
    /// Build the confirmation state from the card being considered.
    pub(crate) fn from(entry: &RenderedEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.value(Field::Name).unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut EntryForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn extended_form_substitutes_blank_fields() {
        let mut form = EntryForm::new(FieldSet::Extended);
        type_str(&mut form, "Ada");
        form.next_field();
        form.next_field();
        type_str(&mut form, "555");

        let fields = form.to_fields();
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.address, "");
        assert_eq!(fields.phone, "555");
        assert_eq!(fields.email.as_deref(), Some("N/A"));
        assert_eq!(fields.id_expiry.as_deref(), Some("N/A"));
        assert_eq!(fields.result, "");
    }

    #[test]
    fn basic_form_keeps_blanks_and_omits_extended_fields() {
        let mut form = EntryForm::new(FieldSet::Basic);
        form.previous_field();
        assert_eq!(form.active_field(), Field::Result);
        type_str(&mut form, "Pass");

        let fields = form.to_fields();
        assert_eq!(fields.name, "");
        assert_eq!(fields.email.as_deref(), Some(""));
        assert_eq!(fields.result, "Pass");
        assert_eq!(fields.id_type, None);
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut form = EntryForm::new(FieldSet::Basic);
        assert!(!form.push_char('\u{7}'));
        assert!(form.push_char('é'));
        assert_eq!(form.value(Field::Name), Some("é"));
        assert_eq!(form.value(Field::IdNumber), None);
    }

    #[test]
    fn reset_clears_values_and_focus() {
        let mut form = EntryForm::new(FieldSet::Extended);
        type_str(&mut form, "Ada");
        form.next_field();
        type_str(&mut form, "12 Main St");
        form.backspace();
        assert_eq!(form.value(Field::Address), Some("12 Main S"));

        form.reset();
        assert_eq!(form.active_index(), 0);
        assert_eq!(form.value(Field::Name), Some(""));
        assert_eq!(form.value(Field::Address), Some(""));
    }

    #[test]
    fn cursor_tracks_label_and_value() {
        let mut form = EntryForm::new(FieldSet::Basic);
        type_str(&mut form, "Ada");
        assert_eq!(form.cursor_offset(), "Name: Ada".len());
    }
}
