//! Merge instruction artifacts for cfx.
//!
//! Produces the documents a downstream configuration build tool consumes
//! after a merge: the merge settings document, the object list document,
//! and the changed-files list. Also patches a configuration's root
//! descriptor to register newly introduced objects.
//!
//! This crate works on plain names and paths and knows nothing about the
//! configuration model.
//!
//! # Key Types
//!
//! - [`MergeSettings`] / [`ObjectEntry`] -- Merge rules per object
//! - [`ObjectList`] -- Objects to lock and commit
//! - [`ChangedFiles`] -- Files for the partial load
//! - [`ArtifactBundle`] / [`ArtifactPaths`] -- Batch writing of one run's artifacts
//! - [`register_child_objects`] / [`ChildObject`] -- Root descriptor patching

pub mod bundle;
pub mod changed_files;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod object_list;
pub mod paths;
pub mod settings;

pub use bundle::ArtifactBundle;
pub use changed_files::ChangedFiles;
pub use config::ArtifactConfig;
pub use descriptor::{patch_child_objects, register_child_objects, ChildObject};
pub use error::{ArtifactError, ArtifactResult};
pub use object_list::{ObjectList, OBJECTS_NAMESPACE};
pub use paths::ArtifactPaths;
pub use settings::{MergeSettings, ObjectEntry, MERGE_RULE, SETTINGS_NAMESPACE};
