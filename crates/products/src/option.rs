//! Product options: named axes of variation and their value lists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ValueObject};

/// A named axis of variation with an ordered list of values (e.g. `Size: S/M/L`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<String>,
}

impl ProductOption {
    /// Build an option from already-split values, trimming names and values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let option = Self {
            name: name.into().trim().to_string(),
            values: values
                .into_iter()
                .map(|v| v.into().trim().to_string())
                .collect(),
        };
        option.validate()?;
        Ok(option)
    }

    /// Build an option from a comma separated value list (`"S, M, L"`).
    ///
    /// Blank entries are dropped; at least one value must remain.
    pub fn parse(name: &str, raw_values: &str) -> DomainResult<Self> {
        if name.trim().is_empty() || raw_values.trim().is_empty() {
            return Err(DomainError::validation(
                "option name and values are required",
            ));
        }

        let values: Vec<&str> = raw_values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();

        if values.is_empty() {
            return Err(DomainError::validation(
                "option must have at least one value",
            ));
        }

        Self::new(name, values)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("option name cannot be empty"));
        }
        if self.values.is_empty() {
            return Err(DomainError::validation(format!(
                "option '{}' must have at least one value",
                self.name
            )));
        }

        let mut seen = HashSet::with_capacity(self.values.len());
        for value in &self.values {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "option '{}' contains an empty value",
                    self.name
                )));
            }
            if !seen.insert(value.as_str()) {
                return Err(DomainError::validation(format!(
                    "option '{}' lists value '{}' more than once",
                    self.name, value
                )));
            }
        }
        Ok(())
    }
}

impl ValueObject for ProductOption {}

/// Check a product's option list: every option valid, names unique.
pub fn validate_options(options: &[ProductOption]) -> DomainResult<()> {
    let mut names = HashSet::with_capacity(options.len());
    for option in options {
        option.validate()?;
        if !names.insert(option.name.as_str()) {
            return Err(DomainError::validation(format!(
                "option '{}' is declared more than once",
                option.name
            )));
        }
    }
    Ok(())
}

/// Number of combinations the options expand to.
///
/// An empty option list counts as one (the single default variant). Returns
/// `None` if the product overflows `usize`.
pub fn combination_count(options: &[ProductOption]) -> Option<usize> {
    options
        .iter()
        .try_fold(1usize, |acc, option| acc.checked_mul(option.values.len()))
}

/// How alarming a variant count is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantCountLevel {
    Normal,
    /// Above the warning threshold; generation may take a moment.
    Large,
    /// Above the flag threshold.
    Excessive,
}

/// Thresholds guarding variant expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantLimits {
    pub warn_above: usize,
    pub flag_above: usize,
    /// Hard ceiling; expansion beyond this is rejected.
    pub max: usize,
}

impl Default for VariantLimits {
    fn default() -> Self {
        Self {
            warn_above: 50,
            flag_above: 100,
            max: 1000,
        }
    }
}

impl VariantLimits {
    pub fn assess(&self, count: usize) -> VariantCountLevel {
        if count > self.flag_above {
            VariantCountLevel::Excessive
        } else if count > self.warn_above {
            VariantCountLevel::Large
        } else {
            VariantCountLevel::Normal
        }
    }

    /// Compute the combination count and reject it if it exceeds `max`.
    pub fn check(&self, options: &[ProductOption]) -> DomainResult<usize> {
        let count = combination_count(options)
            .ok_or_else(|| DomainError::validation("too many variant combinations"))?;
        if count > self.max {
            return Err(DomainError::validation(format!(
                "{count} variants exceed the limit of {}",
                self.max
            )));
        }
        Ok(count)
    }
}
