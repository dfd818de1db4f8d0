//! Immutable input model for partial-reconfiguration floorplanning.
//!
//! A [`Design`] bundles the device [`Board`] (a grid of [`BlockType`] cells
//! with an O(1) rectangle resource index), the objective [`Costs`], the
//! ordered list of requested [`Region`]s, and the inter-region wire matrix.
//! Designs are read from the plain-text format handled by [`parse_design`].
//!
//! Everything in this crate is immutable after construction and shared by
//! reference across solver threads.

#![warn(missing_docs)]

pub mod block;
pub mod board;
pub mod costs;
pub mod design;
pub mod error;
pub mod ids;
pub mod parser;
pub mod region;

pub use block::{BlockType, Resources};
pub use board::Board;
pub use costs::Costs;
pub use design::Design;
pub use error::{BoardError, DesignError, DesignParseError, InfeasibleDesign, ResourceShortage};
pub use ids::RegionId;
pub use parser::{load_design, parse_design};
pub use region::{IoConn, Region, RegionKind};
