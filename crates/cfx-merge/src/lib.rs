//! Merge engine for cfx.
//!
//! Merges a configuration extension export into a base export: pairs
//! objects by identity, splices extension subprograms into base modules
//! according to their directives, imports objects the base lacks, and
//! writes the merge artifacts for the downstream build tool.
//!
//! # Key Types
//!
//! - [`Merger`] -- One extension's merge run
//! - [`ModuleMerger`] / [`Splicer`] -- Module pairing and directive application
//! - [`MergeRecord`] -- Accumulator turned into the artifact bundle
//! - [`Diagnostics`] -- Explicit event sink passed into a run
//! - [`MergeError`] / [`EngineError`] -- Domain and run-level errors

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod importer;
pub mod matcher;
pub mod module_merger;
pub mod record;
pub mod splicer;

pub use config::{MergeOptions, DEFAULT_ALIAS_PREFIX};
pub use diagnostics::{CollectingDiagnostics, Diagnostics, MergeEvent, TracingDiagnostics};
pub use engine::{MergeSummary, Merger};
pub use error::{EngineError, EngineResult, MergeError};
pub use importer::import_object;
pub use matcher::{classify, MatchOutcome, SkipReason};
pub use module_merger::ModuleMerger;
pub use record::MergeRecord;
pub use splicer::{
    module_region_name, region_name, variables_region_name, SpliceOutcome, Splicer,
    CONTINUE_CALL_MARKERS,
};
