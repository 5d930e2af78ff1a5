//! Validated Forms
//!
//! Reactive wrapper around [`FormRules`]: one value signal per field, the
//! visual state of each field and the summary box above the form.

use leptos::*;
use std::collections::BTreeMap;

use crate::validation::{FieldState, FormRules, SUMMARY_MESSAGE};

/// Reactive state of one validated form
#[derive(Clone, Copy)]
pub struct FormState {
    rules: StoredValue<FormRules>,
    values: StoredValue<BTreeMap<&'static str, RwSignal<String>>>,
    fields: RwSignal<BTreeMap<&'static str, FieldState>>,
    /// Summary shown above the form; also carries server errors
    pub summary: RwSignal<Option<String>>,
}

impl FormState {
    pub fn new(rules: FormRules) -> Self {
        let values = rules
            .names()
            .map(|name| (name, create_rw_signal(String::new())))
            .collect();
        Self {
            rules: store_value(rules),
            values: store_value(values),
            fields: create_rw_signal(BTreeMap::new()),
            summary: create_rw_signal(None),
        }
    }

    /// Value signal of a field; unknown names get a detached signal
    pub fn signal(&self, name: &str) -> RwSignal<String> {
        self.values
            .with_value(|values| values.get(name).copied())
            .unwrap_or_else(|| create_rw_signal(String::new()))
    }

    /// Trimmed current value, untracked
    pub fn value(&self, name: &str) -> String {
        self.signal(name).get_untracked().trim().to_string()
    }

    /// Trimmed value, `None` when empty
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.value(name)).filter(|value| !value.is_empty())
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.signal(name).set(value.into());
    }

    pub fn field_state(&self, name: &str) -> FieldState {
        self.fields
            .with(|fields| fields.get(name).cloned())
            .unwrap_or_default()
    }

    /// Validate one field and update its state
    pub fn validate(&self, name: &'static str) -> bool {
        let value = self.signal(name).get_untracked();
        let error = self
            .rules
            .with_value(|rules| rules.validate_field(name, &value));
        let valid = error.is_none();
        self.fields.update(|fields| {
            fields.insert(name, FieldState::from_check(&value, error));
        });
        if self.fields.with_untracked(|f| f.values().all(|s| s.error().is_none())) {
            self.summary.set(None);
        }
        valid
    }

    /// Validate every field; shows the summary when anything fails
    pub fn validate_all(&self) -> bool {
        let (errors, valid) = self.rules.with_value(|rules| {
            rules.validate_all(|name| self.signal(name).get_untracked())
        });
        let names: Vec<&'static str> = self.rules.with_value(|rules| rules.names().collect());
        self.fields.update(|fields| {
            for name in names {
                let value = self.signal(name).get_untracked();
                fields.insert(name, FieldState::from_check(&value, errors.get(name).cloned()));
            }
        });
        self.summary
            .set((!valid).then(|| SUMMARY_MESSAGE.to_string()));
        valid
    }

    pub fn show_error(&self, message: impl Into<String>) {
        self.summary.set(Some(message.into()));
    }

    /// Empty every field and forget its state
    pub fn reset(&self) {
        self.values.with_value(|values| {
            for value in values.values() {
                value.set(String::new());
            }
        });
        self.fields.set(BTreeMap::new());
        self.summary.set(None);
    }
}

/// Labelled input bound to a [`FormState`] field
#[component]
pub fn FormField(
    form: FormState,
    name: &'static str,
    label: &'static str,
    #[prop(default = "text")]
    input_type: &'static str,
    #[prop(default = "off")]
    autocomplete: &'static str,
) -> impl IntoView {
    let value = form.signal(name);
    let input_id = format!("field-{}", name);
    let error_id = format!("field-{}-error", name);

    view! {
        <div class="field">
            <label class="field__label" for=input_id.clone()>{label}</label>
            <input
                id=input_id
                name=name
                type=input_type
                autocomplete=autocomplete
                class=move || form.field_state(name).input_class()
                aria-invalid=move || form.field_state(name).error().is_some().to_string()
                aria-describedby=error_id.clone()
                prop:value=value
                on:input=move |ev| {
                    value.set(event_target_value(&ev));
                    if form.field_state(name) != FieldState::Untouched {
                        form.validate(name);
                    }
                }
                on:blur=move |_| {
                    form.validate(name);
                }
            />
            <p class="field__error" id=error_id>
                {move || form.field_state(name).error().map(str::to_string)}
            </p>
        </div>
    }
}

/// Error summary box of a form
#[component]
pub fn FormSummary(form: FormState) -> impl IntoView {
    view! {
        {move || form.summary.get().map(|message| view! {
            <div class="form-summary" role="alert">{message}</div>
        })}
    }
}
