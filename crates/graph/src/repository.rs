use crate::error::Result;
use crate::types::{Entity, Relationship, TypeDefinition};

/// Read access to the metadata repository.
///
/// Absence is `Ok(None)` / an empty vector; `Err` means the repository could
/// not be asked (authorization or transport failure) and aborts the build.
pub trait RepositoryAccessor {
    /// Fetch an entity of `type_name` (or one of its subtypes)
    fn entity_by_guid(&self, user_id: &str, guid: &str, type_name: &str) -> Result<Option<Entity>>;

    /// Relationships of `relationship_type` with `guid` at either end
    fn relationships_by_type(
        &self,
        user_id: &str,
        guid: &str,
        relationship_type: &str,
        entity_type: &str,
    ) -> Result<Vec<Relationship>>;

    /// Every known type definition
    fn type_definitions(&self, user_id: &str) -> Result<Vec<TypeDefinition>>;
}
