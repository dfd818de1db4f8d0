//! Floorplan search for partial-reconfiguration designs.
//!
//! The solver assigns every [`Region`](partplace_device::Region) of a
//! [`Design`](partplace_device::Design) a rectangle ([`Area`]) on the board
//! such that each area covers its region's resources, areas do not collide,
//! and reconfigurable areas sit on legal column boundaries and claim whole
//! tile rows. The total cost (resources wasted, area, weighted wire length)
//! is minimized.
//!
//! # Architecture
//!
//! - [`AreaPlacer`] finds a rectangle for one region in the current
//!   [`Floorplan`], using an [`AreaReducer`] to shrink free islands.
//! - [`AreaDisruptor`] evicts confirmed areas when a region does not fit.
//! - [`CenterOracle`] suggests ideal centers from the wire graph.
//! - [`Solver`] drives the first placement and the parallel improvement
//!   rounds, reporting progress to a
//!   [`DiagnosticSink`](partplace_diagnostics::DiagnosticSink) and honoring
//!   a shared [`CancelToken`].
//!
//! # Usage
//!
//! ```ignore
//! use partplace_solver::{solve, CancelToken};
//!
//! let plan = solve(&design, &config, &sink, &CancelToken::new())?;
//! plan.write_solution(&mut std::io::stdout())?;
//! ```

#![warn(missing_docs)]

pub mod area;
pub mod cancel;
pub mod centers;
pub mod disruptor;
pub mod error;
pub mod floorplan;
pub mod optimizer;
pub mod placer;
pub mod reducer;

pub use area::Area;
pub use cancel::CancelToken;
pub use centers::{build_oracle, CenterOracle, NoOracle, WeightedMedianOracle};
pub use disruptor::{AreaDisruptor, CommonResourcesDisruptor};
pub use error::{AreaError, FloorplanError, PlaceError, SolveError};
pub use floorplan::{Floorplan, SolutionRow};
pub use optimizer::{solve, SolvePhase, Solver};
pub use placer::{AreaPlacer, IslandPlacer};
pub use reducer::{build_reducer, AreaReducer, CostModel, PrReducer, RatioReducer};
