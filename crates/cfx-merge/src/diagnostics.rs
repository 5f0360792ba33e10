//! The diagnostics sink a merge run reports to.
//!
//! The engine never logs through process-wide state; callers hand it a
//! [`Diagnostics`] implementation. [`TracingDiagnostics`] forwards to
//! `tracing`, [`CollectingDiagnostics`] keeps events for inspection.

use std::path::PathBuf;
use std::sync::Mutex;

use cfx_model::DirectiveMode;
use tracing::{debug, info};

use crate::matcher::SkipReason;
use crate::splicer::SpliceOutcome;

/// Something that happened during a merge run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeEvent {
    ObjectSkipped {
        full_name: String,
        reason: SkipReason,
    },
    ObjectMerged {
        full_name: String,
    },
    ObjectImported {
        full_name: String,
        files: usize,
    },
    ModuleSpliced {
        module: String,
        path: PathBuf,
    },
    ModuleCopied {
        module: String,
        path: PathBuf,
    },
    DirectiveApplied {
        subprogram: String,
        target: String,
        mode: DirectiveMode,
        outcome: SpliceOutcome,
    },
    DescriptorPatched {
        path: PathBuf,
        added: usize,
    },
    ArtifactsWritten {
        extension: String,
        objects: usize,
        changed_files: usize,
    },
}

/// Receiver of merge events.
pub trait Diagnostics: Send + Sync {
    fn report(&self, event: MergeEvent);
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, event: MergeEvent) {
        match event {
            MergeEvent::ObjectSkipped { full_name, reason } => {
                debug!(object = %full_name, %reason, "object skipped");
            }
            MergeEvent::ObjectMerged { full_name } => {
                info!(object = %full_name, "object merged");
            }
            MergeEvent::ObjectImported { full_name, files } => {
                info!(object = %full_name, files, "object imported");
            }
            MergeEvent::ModuleSpliced { module, path } => {
                debug!(module = %module, path = %path.display(), "module spliced");
            }
            MergeEvent::ModuleCopied { module, path } => {
                debug!(module = %module, path = %path.display(), "module copied");
            }
            MergeEvent::DirectiveApplied {
                subprogram,
                target,
                mode,
                outcome,
            } => {
                debug!(%subprogram, %target, %mode, ?outcome, "directive applied");
            }
            MergeEvent::DescriptorPatched { path, added } => {
                debug!(path = %path.display(), added, "root descriptor patched");
            }
            MergeEvent::ArtifactsWritten {
                extension,
                objects,
                changed_files,
            } => {
                info!(%extension, objects, changed_files, "merge complete");
            }
        }
    }
}

/// Keeps every event in order.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<MergeEvent>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MergeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, event: MergeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
