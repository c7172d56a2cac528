//! Low-level building blocks for custom matching pipelines.
//!
//! These types expose edge tables, pairing state, and the block and binary
//! grids used during extraction. Most users should prefer the top-level
//! `Extractor`, `Matcher`, and `match_score` APIs.

pub use crate::angle::{atan_byte, to_polar, PolarPoint};
pub use crate::grid::{BinaryMap, BlockMap, Matrix};
pub use crate::matching::{
    EdgeLookupConfig, EdgePair, EdgeShape, EdgeTable, EdgeTableConfig, MatchAnalysis,
    MinutiaPair, NeighborEdge, PairSelector, Pairing, ScoringConfig,
};
pub use crate::params::{dpi_ratio, Parameter, REFERENCE_DPI};
