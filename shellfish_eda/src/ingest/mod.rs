/// Input stage for the shellfish report.
///
/// Submodules:
/// - `loader` — reads the monitoring CSV into a `RawTable`.

pub mod loader;
