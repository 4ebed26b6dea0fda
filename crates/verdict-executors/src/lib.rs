// crates/verdict-executors/src/lib.rs
// ============================================================================
// Module: Verdict Executors
// Description: Step execution backends and the kind-dispatch registry.
// Purpose: Implement the executor capability set the runtime dispatches to.
// Dependencies: serde_json, verdict-core
// ============================================================================

//! ## Overview
//! One backend per executor kind: `function` invokes registered in-process
//! closures under a watchdog, `process` runs argv commands with captured
//! streams, `static` rejects steps by definition, and `audio-render` is a
//! stub that always reports not-implemented. The [`ExecutorRegistry`]
//! implements the runtime's factory interface and hands out a fresh
//! backend per run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod audio;
pub mod function;
pub mod process;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::analysis::StaticExecutor;
pub use crate::audio::AudioRenderExecutor;
pub use crate::function::FunctionExecutor;
pub use crate::function::FunctionTable;
pub use crate::function::StepFn;
pub use crate::process::ProcessExecutor;
pub use crate::registry::ExecutorRegistry;
