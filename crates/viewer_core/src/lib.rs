//! viewer_core: renderer-free navigation core for the dome viewer.
//!
//! Input intents, drag-look integration, and the walkable-surface constrained
//! movement resolver live here so the platform loop stays a thin adapter and
//! tests can drive frames without a window.

#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::doc_markdown
)]

pub mod input;
pub mod rig;
pub mod systems;
pub mod walkable;
