//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Draft lines and catalog products are entities: a line keeps its identity
/// while its quantity and fields change, and two snapshots of the same
/// product refer to the same thing even when the stock level differs.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
