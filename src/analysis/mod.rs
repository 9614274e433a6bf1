/// Sequence analysis for the ROLL extraction service.
///
/// Everything in here is pure: it takes an in-memory table and parameters
/// and returns derived data, with no I/O or logging.
///
/// Submodules:
/// - `sequences` — finds qualifying runs and assembles the tagged output.

pub mod sequences;
