//! Managed-property model for metawriter.
//!
//! Defines the types an edit session works with before anything is sent:
//! - [`ChangeSet`]: folds incremental add/remove/override edits of managed
//!   properties into one consistent patch
//! - [`RemovalScope`]: whether removal keys match across namespaces
//! - [`EntityDescriptor`]: the attributes that locate an entity in the catalog
//! - [`EntityEdit`]: one entity's pending alias, description, tags,
//!   user properties and managed properties
//!
//! Nothing in this crate performs I/O. Submission lives in `metawriter-client`.

mod changeset;
mod descriptor;
mod edit;
mod error;

pub use changeset::{ChangeSet, NAMESPACE_SEPARATOR, RemovalScope};
pub use descriptor::{EntityDescriptor, EntityType, SourceType};
pub use edit::{EntityEdit, FieldEdit, TagEdit, UserPropertyEdit};
pub use error::{ModelError, ModelResult};
