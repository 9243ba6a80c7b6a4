//! Hidden-field bot trap.

use super::validation::RawForm;

/// A field real visitors never see. Anything typed into it came from a bot.
#[derive(Debug, Clone)]
pub struct Honeypot {
    field: String,
}

impl Honeypot {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_tripped(&self, raw: &RawForm) -> bool {
        raw.get(&self.field).is_some_and(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_non_empty_values_trip() {
        let honeypot = Honeypot::new("website");
        let mut raw = RawForm::new();
        assert!(!honeypot.is_tripped(&raw));

        raw.insert("website".to_string(), "  ".to_string());
        assert!(!honeypot.is_tripped(&raw));

        raw.insert("website".to_string(), "http://spam.example".to_string());
        assert!(honeypot.is_tripped(&raw));
    }
}
