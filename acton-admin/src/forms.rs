//! Edit-form fields and validation
//!
//! An [`EditForm`] lists the model attributes an edit view exposes. It binds
//! an item's current values for display and turns a submitted urlencoded body
//! into repository [`Changes`], or into per-field error messages.

use serde::Serialize;
use serde_json::Value;

use crate::query::QueryParams;
use crate::repository::Changes;

/// Constraint checked against a submitted value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Value must not be blank
    Required,
    /// Value must have at least this many characters
    MinLength(usize),
    /// Value must have at most this many characters
    MaxLength(usize),
}

impl Validator {
    /// Error message for `value`, or `None` if it passes
    ///
    /// Length checks skip blank optional values; `Required` reports those.
    pub fn check(&self, value: &str) -> Option<String> {
        let length = value.chars().count();
        match *self {
            Self::Required if value.trim().is_empty() => Some("This field is required.".into()),
            Self::MinLength(min) if length > 0 && length < min => Some(format!(
                "Field must be at least {} character{} long.",
                min,
                if min == 1 { "" } else { "s" }
            )),
            Self::MaxLength(max) if length > max => Some(format!(
                "Field cannot be longer than {} character{}.",
                max,
                if max == 1 { "" } else { "s" }
            )),
            _ => None,
        }
    }
}

/// How a field's text is stored on the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line string
    Text,
    /// Multi-line string
    TextArea,
    /// Signed integer
    Integer,
}

/// One editable model attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Model attribute and form input name
    pub name: String,
    /// Input label
    pub label: String,
    /// Optional help text
    pub description: Option<String>,
    /// Storage kind
    pub kind: FieldKind,
    /// Checks run on submission, in order
    pub validators: Vec<Validator>,
}

impl FormField {
    /// A single-line text field
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(name, label, FieldKind::Text)
    }

    /// A multi-line text field
    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(name, label, FieldKind::TextArea)
    }

    /// An integer field
    pub fn integer(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(name, label, FieldKind::Integer)
    }

    fn with_kind(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            kind,
            validators: Vec::new(),
        }
    }

    /// Set the help text
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a validator
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Shorthand for [`Validator::Required`]
    #[must_use]
    pub fn required(self) -> Self {
        self.validator(Validator::Required)
    }

    /// Shorthand for [`Validator::MinLength`]
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.validator(Validator::MinLength(min))
    }

    /// Shorthand for [`Validator::MaxLength`]
    #[must_use]
    pub fn max_length(self, max: usize) -> Self {
        self.validator(Validator::MaxLength(max))
    }

    /// Whether the field carries [`Validator::Required`]
    pub fn is_required(&self) -> bool {
        self.validators.contains(&Validator::Required)
    }

    fn convert(&self, raw: &str) -> Result<Value, String> {
        match self.kind {
            FieldKind::Text | FieldKind::TextArea => Ok(Value::String(raw.to_string())),
            FieldKind::Integer if raw.trim().is_empty() => Ok(Value::Null),
            FieldKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Not a valid integer value.".to_string()),
        }
    }

    fn bind(&self, value: String, errors: Vec<String>) -> BoundField {
        BoundField {
            name: self.name.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            kind: self.kind,
            required: self.is_required(),
            value,
            errors,
        }
    }
}

/// A field with its current value, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundField {
    /// Input name
    pub name: String,
    /// Input label
    pub label: String,
    /// Help text
    pub description: Option<String>,
    /// Storage kind, used to pick the input widget
    pub kind: FieldKind,
    /// Whether the input is required
    pub required: bool,
    /// Current value as text
    pub value: String,
    /// Validation messages
    pub errors: Vec<String>,
}

/// Result of validating a submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Every field passed; changes are keyed by attribute name
    Valid(Changes),
    /// At least one field failed; fields echo the submitted values
    Invalid(Vec<BoundField>),
}

/// Ordered set of editable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    fields: Vec<FormField>,
}

impl EditForm {
    /// Create a form from fields in display order
    pub fn new(fields: impl IntoIterator<Item = FormField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Fields in display order
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Whether the form has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Bind the current attribute values of a serialized item
    pub fn bind(&self, item: &Value) -> Vec<BoundField> {
        self.fields
            .iter()
            .map(|field| {
                let value = match item.get(&field.name) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                field.bind(value, Vec::new())
            })
            .collect()
    }

    /// Validate a submitted body
    ///
    /// Missing inputs count as empty strings. Names not declared on the form
    /// are ignored.
    pub fn submit(&self, data: &QueryParams) -> Submission {
        let mut changes = Changes::new();
        let mut bound = Vec::with_capacity(self.fields.len());
        let mut valid = true;

        for field in &self.fields {
            let raw = data.get(&field.name).unwrap_or_default();
            let mut errors: Vec<String> = field
                .validators
                .iter()
                .filter_map(|validator| validator.check(raw))
                .collect();

            if errors.is_empty() {
                match field.convert(raw) {
                    Ok(value) => {
                        changes.insert(field.name.clone(), value);
                    }
                    Err(message) => errors.push(message),
                }
            }

            valid &= errors.is_empty();
            bound.push(field.bind(raw.to_string(), errors));
        }

        if valid {
            Submission::Valid(changes)
        } else {
            Submission::Invalid(bound)
        }
    }
}

impl FromIterator<FormField> for EditForm {
    fn from_iter<I: IntoIterator<Item = FormField>>(iter: I) -> Self {
        Self::new(iter)
    }
}
