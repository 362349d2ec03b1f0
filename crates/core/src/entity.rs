//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products and variants are entities: a variant whose price changes is still
/// the same variant.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
