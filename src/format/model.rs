//! Declarative field metadata for configuration types.
//!
//! A [`FieldModel`] is built once per configuration type (normally inside a
//! `LazyLock`) from accessor pairs, so the mapping engine can read and write
//! any declared field by its external key without runtime type inspection.

use super::field::FieldDescriptor;
use super::value::FieldValue;
use crate::error::{AppError, AppResult};

type Getter<C> = Box<dyn Fn(&C) -> String + Send + Sync>;
type Setter<C> = Box<dyn Fn(&mut C, &str) -> Result<(), String> + Send + Sync>;
type ZeroCheck<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;
type SameCheck<C> = Box<dyn Fn(&C, &C) -> bool + Send + Sync>;

/// A configuration type with a cached field model
pub trait Configurable: Default + Sized + 'static {
    fn model() -> &'static FieldModel<Self>;
}

/// Borrowing lens from a configuration to one of its fields
pub struct Accessor<C, T> {
    get: fn(&C) -> &T,
    get_mut: fn(&mut C) -> &mut T,
}

impl<C, T> Accessor<C, T> {
    pub fn new(get: fn(&C) -> &T, get_mut: fn(&mut C) -> &mut T) -> Self {
        Self { get, get_mut }
    }
}

/// Builds an [`Accessor`] for a named struct field.
///
/// ```ignore
/// accessor!(JoinConfig, devices)
/// ```
#[macro_export]
macro_rules! accessor {
    ($config:ty, $field:ident) => {
        $crate::format::Accessor::new(
            |c: &$config| &c.$field,
            |c: &mut $config| &mut c.$field,
        )
    };
}

pub(crate) struct FieldEntry<C> {
    pub(crate) descriptor: FieldDescriptor,
    get: Getter<C>,
    set: Setter<C>,
    is_zero: ZeroCheck<C>,
    same: SameCheck<C>,
}

impl<C> FieldEntry<C> {
    pub(crate) fn read(&self, config: &C) -> String {
        (self.get)(config)
    }

    /// Parses first, so a rejected value leaves the config untouched
    pub(crate) fn write(&self, config: &mut C, raw: &str) -> AppResult<()> {
        (self.set)(config, raw)
            .map_err(|reason| AppError::invalid_value(self.descriptor.key, raw, reason))
    }

    pub(crate) fn is_zero(&self, config: &C) -> bool {
        (self.is_zero)(config)
    }

    /// Typed comparison; `[""]` and `[]` print alike but differ here
    pub(crate) fn same(&self, a: &C, b: &C) -> bool {
        (self.same)(a, b)
    }
}

/// Ordered field metadata for configuration type `C`
pub struct FieldModel<C> {
    fields: Vec<FieldEntry<C>>,
    allow_extensions: bool,
}

impl<C: 'static> FieldModel<C> {
    pub fn builder() -> FieldModelBuilder<C> {
        FieldModelBuilder {
            fields: Vec::new(),
            allow_extensions: false,
        }
    }

    /// Field descriptors in declaration order
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|entry| &entry.descriptor)
    }

    /// Whether undeclared, unprefixed query keys are kept as extensions
    pub fn allows_extensions(&self) -> bool {
        self.allow_extensions
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finds a field by primary key or alias, case-insensitively
    pub fn find(&self, key: &str) -> Option<&FieldDescriptor> {
        self.position(key).map(|index| &self.fields[index].descriptor)
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|entry| entry.descriptor.matches(key))
    }

    pub(crate) fn entry(&self, index: usize) -> &FieldEntry<C> {
        &self.fields[index]
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, &FieldEntry<C>)> {
        self.fields.iter().enumerate()
    }

    /// Current external string form of the field named `key`
    pub fn get(&self, config: &C, key: &str) -> AppResult<String> {
        let index = self.position(key).ok_or_else(|| AppError::unknown_key(key))?;
        Ok(self.fields[index].read(config))
    }

    /// Parses `raw` into the field named `key`, returning the field index
    pub fn set(&self, config: &mut C, key: &str, raw: &str) -> AppResult<usize> {
        let index = self.position(key).ok_or_else(|| AppError::unknown_key(key))?;
        let entry = &self.fields[index];
        if !entry.descriptor.importable {
            return Err(AppError::invalid_value(
                entry.descriptor.key,
                raw,
                "field cannot be set",
            ));
        }
        entry.write(config, raw)?;
        Ok(index)
    }
}

/// Builder for [`FieldModel`].
///
/// Modifier methods (`description`, `default_value`, ...) apply to the most
/// recently declared field.
pub struct FieldModelBuilder<C> {
    fields: Vec<FieldEntry<C>>,
    allow_extensions: bool,
}

impl<C: 'static> FieldModelBuilder<C> {
    /// Declares a field stored in the location described by `accessor`
    pub fn field<T: FieldValue>(mut self, key: &'static str, accessor: Accessor<C, T>) -> Self {
        let Accessor { get, get_mut } = accessor;
        self.fields.push(FieldEntry {
            descriptor: FieldDescriptor::new(key, T::KIND, T::enum_names()),
            get: Box::new(move |config: &C| get(config).format_field()),
            set: Box::new(move |config: &mut C, raw: &str| {
                let value = T::parse_field(raw)?;
                *get_mut(config) = value;
                Ok(())
            }),
            is_zero: Box::new(move |config: &C| *get(config) == T::default()),
            same: Box::new(move |a: &C, b: &C| get(a) == get(b)),
        });
        self
    }

    pub fn description(self, text: &'static str) -> Self {
        self.modify(|d| d.description = text)
    }

    pub fn default_value(self, value: &'static str) -> Self {
        self.modify(|d| d.default = Some(value))
    }

    pub fn alias(self, alias: &'static str) -> Self {
        self.modify(|d| d.aliases.push(alias))
    }

    pub fn required(self) -> Self {
        self.modify(|d| d.required = true)
    }

    /// Accepted on decode but never written on encode
    pub fn write_only(self) -> Self {
        self.modify(|d| d.exportable = false)
    }

    /// Exported for display but rejected by `set`
    pub fn read_only(self) -> Self {
        self.modify(|d| d.importable = false)
    }

    pub fn always_export(self) -> Self {
        self.modify(|d| d.always_export = true)
    }

    /// Keep undeclared query keys as free-form extensions instead of failing
    pub fn allow_extensions(mut self) -> Self {
        self.allow_extensions = true;
        self
    }

    pub fn build(self) -> FieldModel<C> {
        debug_assert!(
            self.fields.iter().enumerate().all(|(i, entry)| {
                self.fields[..i].iter().all(|earlier| {
                    !earlier.descriptor.matches(entry.descriptor.key)
                        && entry
                            .descriptor
                            .aliases
                            .iter()
                            .all(|alias| !earlier.descriptor.matches(alias))
                })
            }),
            "field keys must be unique"
        );

        FieldModel {
            fields: self.fields,
            allow_extensions: self.allow_extensions,
        }
    }

    fn modify(mut self, apply: impl FnOnce(&mut FieldDescriptor)) -> Self {
        if let Some(entry) = self.fields.last_mut() {
            apply(&mut entry.descriptor);
        }
        self
    }
}
