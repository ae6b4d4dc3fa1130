//! Exploratory analysis of shellfish growing-area E. coli monitoring data.
//!
//! Pipeline: `ingest::loader` reads the CSV into a `RawTable`, `normalize`
//! produces a typed `SampleTable`, then `report` and `plots` read it.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod plots;
pub mod report;
pub mod standards;
