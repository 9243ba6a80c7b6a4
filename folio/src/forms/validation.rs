//! Declarative field validation for public forms.
//!
//! A [`Schema`] is a list of [`FieldSpec`]s. Validation trims every value, drops empty optional
//! fields, and runs each field's rules in order until the first failure. All fields are checked
//! in a single pass so every invalid field is reported at once.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw field values as submitted.
pub type RawForm = HashMap<String, String>;

/// A single check applied to a trimmed field value.
#[derive(Debug, Clone)]
pub enum Rule {
    Required { message: &'static str },
    MinLen { min: usize, message: &'static str },
    MaxLen { max: usize, message: &'static str },
    Email { message: &'static str },
    OneOf { allowed: &'static [&'static str], message: &'static str },
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), &'static str> {
        let len = value.chars().count();
        match self {
            Rule::Required { message } if value.is_empty() => Err(*message),
            Rule::MinLen { min, message } if len < *min => Err(*message),
            Rule::MaxLen { max, message } if len > *max => Err(*message),
            Rule::Email { message } if !is_valid_email(value) => Err(*message),
            Rule::OneOf { allowed, message } if !allowed.iter().any(|a| *a == value) => Err(*message),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Optional fields skip their rules when empty and are dropped from the payload
    pub optional: bool,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            optional: true,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

/// Trimmed values of a form that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPayload {
    values: BTreeMap<&'static str, String>,
}

impl ValidatedPayload {
    /// Value of a required field. Empty when the field was not part of the schema.
    pub fn text(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// Value of an optional field, `None` when it was left empty
    pub fn optional(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn validate(&self, raw: &RawForm) -> Result<ValidatedPayload, Vec<FieldError>> {
        let mut payload = ValidatedPayload::default();
        let mut errors = Vec::new();

        for spec in &self.fields {
            let value = raw.get(spec.name).map(|v| v.trim()).unwrap_or_default();

            if spec.optional && value.is_empty() {
                continue;
            }

            match spec.rules.iter().find_map(|rule| rule.check(value).err()) {
                Some(message) => errors.push(FieldError {
                    field: spec.name.to_string(),
                    message: message.to_string(),
                }),
                None => {
                    payload.values.insert(spec.name, value.to_string());
                }
            }
        }

        if errors.is_empty() { Ok(payload) } else { Err(errors) }
    }
}

const LOCAL_PART_SYMBOLS: &str = "!#$%&'*+/=?^_`{|}~-.";

/// Pragmatic address check: one `@`, a dotted local part, and a domain with a
/// alphabetic top-level label of at least two characters.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local.chars().all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    labels_ok && tld_ok
}
