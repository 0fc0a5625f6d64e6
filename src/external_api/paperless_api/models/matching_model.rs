/// Shared shape of taxonomy-like entities (tags, correspondents, custom fields...)
pub trait MatchingModel {
    /// Assigned by the server, `None` until the entity is created
    fn id(&self) -> Option<u32>;
    fn name(&self) -> &str;
}
