//! Shared foundational types used across the partplace floorplanner.
//!
//! This crate provides grid and continuous coordinates, shaping directions,
//! and the internal-error result type used to surface logic bugs.

#![warn(missing_docs)]

pub mod geometry;
pub mod result;

pub use geometry::{Direction, GridPoint, Point, ShapeAction};
pub use result::{InternalError, PlanResult};
