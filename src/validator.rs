//! Reusable field validators.
//!
//! Any `Fn(&T) -> Result<(), ValidationError>` works as a validator through
//! [`FieldHandle::ensure`](crate::FieldHandle::ensure); types implementing
//! [`Validator`] can be shared between fields with
//! [`FieldHandle::ensure_with`](crate::FieldHandle::ensure_with).

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use crate::error::ValidationError;

pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

impl<T: ?Sized, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Rejects empty strings and collections. `None` passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

fn non_empty(is_empty: bool) -> Result<(), ValidationError> {
    if is_empty {
        Err(ValidationError::new("value can't be empty"))
    } else {
        Ok(())
    }
}

impl Validator<String> for NotEmpty {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        non_empty(value.is_empty())
    }
}

impl<T> Validator<Vec<T>> for NotEmpty {
    fn validate(&self, value: &Vec<T>) -> Result<(), ValidationError> {
        non_empty(value.is_empty())
    }
}

impl<K, V> Validator<BTreeMap<K, V>> for NotEmpty {
    fn validate(&self, value: &BTreeMap<K, V>) -> Result<(), ValidationError> {
        non_empty(value.is_empty())
    }
}

impl<K, V, S> Validator<HashMap<K, V, S>> for NotEmpty {
    fn validate(&self, value: &HashMap<K, V, S>) -> Result<(), ValidationError> {
        non_empty(value.is_empty())
    }
}

impl<T> Validator<Option<T>> for NotEmpty
where
    NotEmpty: Validator<T>,
{
    fn validate(&self, value: &Option<T>) -> Result<(), ValidationError> {
        match value {
            Some(inner) => Validator::<T>::validate(self, inner),
            None => Ok(()),
        }
    }
}

/// Accepts values within `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct InRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> InRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd + Display> Validator<T> for InRange<T> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if *value < self.min || *value > self.max {
            Err(ValidationError::new(format!(
                "value {value} is out of range [{}, {}]",
                self.min, self.max
            )))
        } else {
            Ok(())
        }
    }
}
