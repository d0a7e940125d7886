//! Valuation engine
//!
//! Pure functions that turn per-share history and user assumptions into
//! five-year projections, discounted present values and a verdict. Nothing in
//! here performs I/O or holds state.

pub mod bounds;
pub mod calculations;
pub mod formatters;
pub mod insights;
pub mod pipeline;

pub use bounds::AssumptionBounds;
pub use calculations::*;
pub use insights::{MethodComparison, PbAssessment, PriceToBookInsight, RoeTrend};
pub use pipeline::{project, BookValueProjection, EarningsProjection, ProjectionInputs, Projections};
