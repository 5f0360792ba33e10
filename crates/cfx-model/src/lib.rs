//! Configuration model for cfx.
//!
//! Loads configuration export trees (a root descriptor plus per-object
//! descriptors and BSL module sources) into an in-memory object graph, and
//! models each module as an ordered list of text blocks and subprogram
//! definitions that the merge engine can splice and persist.
//!
//! # Key Types
//!
//! - [`Configuration`] / [`ConfObject`] / [`Form`] -- The export tree and its top-level objects
//! - [`ObjectType`] -- Closed set of metadata object types
//! - [`Module`] / [`Element`] / [`TextBlock`] -- Module source as ordered elements
//! - [`Subprogram`] / [`ExtensionDirective`] / [`DirectiveMode`] -- Procedures, functions and their extension directives
//! - [`TextRange`] -- Line-range bookkeeping, renumbered after every insertion

pub mod configuration;
pub mod descriptor;
pub mod element;
pub mod error;
pub mod module;
pub mod object_type;
mod parser;
pub mod range;
pub mod subprogram;

pub use configuration::{form_module_name, form_of_module, ConfObject, Configuration, Form, EXT_DIR, FORMS_DIR};
pub use descriptor::{RootDescriptor, ROOT_DESCRIPTOR};
pub use element::{Element, TextBlock, REGION_END, REGION_START};
pub use error::{ModelError, ModelResult};
pub use module::Module;
pub use object_type::ObjectType;
pub use range::TextRange;
pub use subprogram::{Dialect, DirectiveMode, ExtensionDirective, Subprogram, SubprogramKind};
