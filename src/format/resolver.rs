//! Key-based access to a configuration instance.

use std::collections::BTreeSet;

use tracing::trace;

use super::field::FieldDescriptor;
use super::model::{Configurable, FieldModel};
use crate::error::{AppError, AppResult};
use crate::services::{MESSAGE_KEY, Params};

/// Reads and writes a configuration by external key.
///
/// The resolver borrows the instance for its own lifetime and remembers
/// which fields were set through it, so [`apply_defaults`] never replaces an
/// explicit value.
///
/// [`apply_defaults`]: ConfigResolver::apply_defaults
pub struct ConfigResolver<'a, C: Configurable> {
    config: &'a mut C,
    model: &'static FieldModel<C>,
    explicit: BTreeSet<usize>,
}

impl<'a, C: Configurable> ConfigResolver<'a, C> {
    pub fn new(config: &'a mut C) -> Self {
        Self {
            config,
            model: C::model(),
            explicit: BTreeSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> AppResult<String> {
        self.model.get(&*self.config, key)
    }

    pub fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let index = self.model.set(self.config, key, value)?;
        self.explicit.insert(index);
        Ok(())
    }

    /// Assigns defaults to every field not set through this resolver that
    /// still holds its zero value. Applying twice is the same as once.
    pub fn apply_defaults(&mut self) -> AppResult<()> {
        for (index, entry) in self.model.entries() {
            let Some(default) = entry.descriptor.default else {
                continue;
            };
            if self.explicit.contains(&index) || !entry.is_zero(&*self.config) {
                continue;
            }
            trace!(key = entry.descriptor.key, default, "Applying field default");
            entry.write(self.config, default)?;
        }
        Ok(())
    }

    /// Fails on the first required field that still holds its zero value
    pub fn check_required(&self) -> AppResult<()> {
        for (_, entry) in self.model.entries() {
            if entry.descriptor.required && entry.is_zero(&*self.config) {
                return Err(AppError::MissingRequiredField {
                    field: entry.descriptor.key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies every param naming a declared field; other keys are ignored
    pub fn update_from_params(&mut self, params: &Params) -> AppResult<()> {
        for (key, value) in params.iter() {
            if key.eq_ignore_ascii_case(MESSAGE_KEY) || self.model.find(key).is_none() {
                continue;
            }
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Field descriptors in declaration order
    pub fn list_fields(&self) -> Vec<&'static FieldDescriptor> {
        self.model.descriptors().collect()
    }

    /// Enum-bearing field descriptors in declaration order
    pub fn list_enums(&self) -> Vec<&'static FieldDescriptor> {
        self.model.descriptors().filter(|d| d.is_enum()).collect()
    }
}
