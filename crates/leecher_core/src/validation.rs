use std::fmt;

use leecher_logging::leecher_trace;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A field an entity knows how to validate.
pub trait Field: Copy + Eq + fmt::Debug + 'static {
    /// Stable identifier used as the key in [`ValidationErrors`].
    fn name(self) -> &'static str;
}

/// Field-scoped error messages, kept in insertion order.
///
/// A field absent from the map has no error. Clearing the last message of a
/// field removes the field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    entries: Vec<(&'static str, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to `field`, creating the entry on first use.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    pub fn clear_field(&mut self, field: &str) {
        self.entries.retain(|(name, _)| *name != field);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields carrying at least one message.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(name, messages)| (*name, messages.as_slice()))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, messages) in &self.entries {
            map.serialize_entry(name, messages)?;
        }
        map.end()
    }
}

/// Capability shared by every entity with field-scoped validation.
///
/// Implementors describe their fields, the static dependency table, and how a
/// single field is checked. Recomputation is provided here: setters call
/// [`Validatable::field_changed`], which re-checks the field and then every
/// field listed as depending on it.
pub trait Validatable {
    type Field: Field;

    /// Every validated field, in evaluation order.
    const FIELDS: &'static [Self::Field];

    /// `(changed, dependents)`: fields to recompute after `changed` is set.
    const DEPENDENCIES: &'static [(Self::Field, &'static [Self::Field])];

    fn errors(&self) -> &ValidationErrors;

    fn errors_mut(&mut self) -> &mut ValidationErrors;

    /// Appends the messages for `field` given the current state. Must not
    /// depend on anything but `self`.
    fn check(&self, field: Self::Field, errors: &mut ValidationErrors);

    /// Clears and recomputes `field`, or every field when `None`.
    fn validate(&mut self, field: Option<Self::Field>) {
        let mut errors = std::mem::take(self.errors_mut());
        match field {
            Some(field) => {
                errors.clear_field(field.name());
                self.check(field, &mut errors);
                if let Some(messages) = errors.get(field.name()) {
                    leecher_trace!("{} invalid: {:?}", field.name(), messages);
                }
            }
            None => {
                errors.clear();
                for &field in Self::FIELDS {
                    self.check(field, &mut errors);
                }
                if !errors.is_empty() {
                    leecher_trace!(
                        "validation failed for {:?}",
                        errors.fields().collect::<Vec<_>>()
                    );
                }
            }
        }
        *self.errors_mut() = errors;
    }

    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    fn add_error(&mut self, field: Self::Field, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.errors_mut().add(field.name(), message);
    }

    /// Recomputes `field` and then every field that depends on it.
    fn field_changed(&mut self, field: Self::Field) {
        self.validate(Some(field));
        for dependent in dependents_of(Self::DEPENDENCIES, field) {
            if dependent != field {
                self.validate(Some(dependent));
            }
        }
    }
}

fn dependents_of<F: Field>(
    table: &'static [(F, &'static [F])],
    changed: F,
) -> impl Iterator<Item = F> {
    table
        .iter()
        .filter(move |(source, _)| *source == changed)
        .flat_map(|(_, dependents)| dependents.iter().copied())
}
