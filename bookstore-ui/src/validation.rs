//! Form Validation
//!
//! Declarative per-field rules shared by the login, register and profile
//! forms. Every rule except `required` lets empty values through.

use std::collections::BTreeMap;

/// Shown above a form when submit is blocked by field errors
pub const SUMMARY_MESSAGE: &str = "Check the highlighted fields and fix the errors.";

/// A single field check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Required(&'static str),
    Email,
    MinLength(&'static str, usize),
    Phone,
}

pub fn required(label: &'static str) -> Rule {
    Rule::Required(label)
}

pub fn email() -> Rule {
    Rule::Email
}

pub fn min_length(label: &'static str, length: usize) -> Rule {
    Rule::MinLength(label, length)
}

pub fn phone() -> Rule {
    Rule::Phone
}

impl Rule {
    /// Error message for `value`, if it fails this rule
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            Rule::Required(label) => value.is_empty().then(|| format!("Enter {}", label)),
            _ if value.is_empty() => None,
            Rule::Email => (!is_email(value)).then(|| "Enter a valid email".to_string()),
            Rule::MinLength(label, length) => (value.chars().count() < *length)
                .then(|| format!("{} must be at least {} characters", label, length)),
            Rule::Phone => (!is_phone(value)).then(|| {
                "Phone may contain only digits, spaces, parentheses, + and -".to_string()
            }),
        }
    }
}

/// `local@domain.tld` with no whitespace and a single `@`
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // some dot with text on both sides
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn is_phone(value: &str) -> bool {
    value.chars().count() >= 7
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || "()+-".contains(c))
}

/// Visual state of a form field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Untouched,
    Valid,
    Invalid(String),
}

impl FieldState {
    /// State after validating `value`
    pub fn from_check(value: &str, error: Option<String>) -> Self {
        match error {
            Some(message) => FieldState::Invalid(message),
            None if value.trim().is_empty() => FieldState::Untouched,
            None => FieldState::Valid,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FieldState::Invalid(message) => Some(message),
            _ => None,
        }
    }

    /// Input class list for this state
    pub fn input_class(&self) -> &'static str {
        match self {
            FieldState::Untouched => "input",
            FieldState::Valid => "input input_valid",
            FieldState::Invalid(_) => "input input_error",
        }
    }
}

/// Ordered rules for each field of a form
#[derive(Clone, Debug, Default)]
pub struct FormRules {
    fields: Vec<(&'static str, Vec<Rule>)>,
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push((name, rules));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// First failing rule for the trimmed value; unknown fields pass
    pub fn validate_field(&self, name: &str, value: &str) -> Option<String> {
        let value = value.trim();
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, rules)| rules.iter().find_map(|rule| rule.check(value)))
    }

    /// Validate every field; returns per-field errors and overall validity
    pub fn validate_all(
        &self,
        value_of: impl Fn(&str) -> String,
    ) -> (BTreeMap<&'static str, String>, bool) {
        let errors: BTreeMap<&'static str, String> = self
            .fields
            .iter()
            .filter_map(|(name, _)| {
                self.validate_field(name, &value_of(name))
                    .map(|error| (*name, error))
            })
            .collect();
        let valid = errors.is_empty();
        (errors, valid)
    }
}

/// Login form: email and password
pub fn login_rules() -> FormRules {
    FormRules::new()
        .field("email", vec![required("email"), email()])
        .field("password", vec![required("password"), min_length("Password", 6)])
}

/// Registration form
pub fn register_rules() -> FormRules {
    FormRules::new()
        .field("email", vec![required("email"), email()])
        .field("full_name", vec![required("name"), min_length("Name", 2)])
        .field("phone", vec![phone()])
        .field("password", vec![required("password"), min_length("Password", 6)])
}

/// Profile edit form
pub fn profile_rules() -> FormRules {
    FormRules::new()
        .field("email", vec![required("email"), email()])
        .field("full_name", vec![required("name"), min_length("Name", 2)])
        .field("phone", vec![phone()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_only_fail_required() {
        assert_eq!(required("email").check(""), Some("Enter email".to_string()));
        assert_eq!(email().check(""), None);
        assert_eq!(min_length("Name", 2).check(""), None);
        assert_eq!(phone().check(""), None);
    }

    #[test]
    fn test_email_rule() {
        assert_eq!(email().check("reader@example.com"), None);
        assert!(email().check("reader@example").is_some());
        assert!(email().check("reader example@x.io").is_some());
        assert!(email().check("@example.com").is_some());
        assert!(email().check("a@b@c.com").is_some());
        assert!(email().check("a@.com").is_some());
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert_eq!(min_length("Name", 2).check("Ян"), None);
        assert_eq!(
            min_length("Password", 6).check("abc"),
            Some("Password must be at least 6 characters".to_string())
        );
    }

    #[test]
    fn test_phone_rule() {
        assert_eq!(phone().check("+7 (900) 123-45-67"), None);
        assert!(phone().check("12345").is_some());
        assert!(phone().check("call me 123").is_some());
    }

    #[test]
    fn test_validate_field_uses_first_error_and_trims() {
        let rules = login_rules();
        assert_eq!(
            rules.validate_field("email", "   "),
            Some("Enter email".to_string())
        );
        assert_eq!(
            rules.validate_field("email", " nope "),
            Some("Enter a valid email".to_string())
        );
        assert_eq!(rules.validate_field("email", " a@b.co "), None);
        assert_eq!(rules.validate_field("unknown", ""), None);
    }

    #[test]
    fn test_validate_all() {
        let rules = register_rules();
        let (errors, valid) = rules.validate_all(|name| match name {
            "email" => "reader@example.com".to_string(),
            "full_name" => "A".to_string(),
            "password" => "secret123".to_string(),
            _ => String::new(),
        });
        assert!(!valid);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["full_name"], "Name must be at least 2 characters");

        let (errors, valid) = login_rules().validate_all(|name| match name {
            "email" => "reader@example.com".to_string(),
            _ => "secret123".to_string(),
        });
        assert!(valid);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_field_state() {
        assert_eq!(FieldState::from_check("", None), FieldState::Untouched);
        assert_eq!(FieldState::from_check("x", None), FieldState::Valid);
        let invalid = FieldState::from_check("x", Some("bad".into()));
        assert_eq!(invalid.error(), Some("bad"));
        assert_eq!(invalid.input_class(), "input input_error");
    }
}
