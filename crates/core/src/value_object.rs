//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: they are defined entirely by their
//! attribute values. In the catalog, an option such as `Size: S/M/L`, a single
//! combination of option values, or a price in minor units are value objects,
//! while products and variants are entities.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (two `Size: S/M/L` options are the same option)
/// - **Entity**: has identity (two variants with the same attributes but
///   different ids are different variants)
///
/// To "modify" a value object, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct ProductOption {
///     name: String,
///     values: Vec<String>,
/// }
///
/// impl ValueObject for ProductOption {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
