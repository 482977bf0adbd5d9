/// Trait for types that can be kept in a [`KeyedStore`](crate::KeyedStore).
///
/// The only structural requirement is a stable string identifier. Two values
/// with the same `id()` occupy the same slot; a later write replaces the
/// earlier one.
///
/// Usually derived:
///
/// ```ignore
/// use keyed_store::Record;
///
/// #[derive(Clone, Record)]
/// struct Pokemon {
///     #[record(id)]
///     pub name: String,
///     pub attack: u32,
/// }
/// ```
pub trait Record: Clone + Send + Sync + 'static {
    /// Returns the unique identifier for this record.
    fn id(&self) -> &str;
}
