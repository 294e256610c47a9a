/// A domain object that keeps its identity while its state changes.
///
/// Stores key documents on `id()`.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
