//! Diagnostic creation, severity management, and rendering.
//!
//! Every stage of the floorplanner reports progress and problems as structured
//! [`Diagnostic`] values. The thread-safe [`DiagnosticSink`] accumulates them
//! while placement workers run concurrently, and [`DiagnosticRenderer`]
//! implementations format them for the terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
