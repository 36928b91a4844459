//! Persisted state with schema-version gating
//!
//! Features:
//! - Global version marker, purged on mismatch ([`VersionGate`])
//! - Versioned JSON envelope per store slice
//! - Lazy hydration, synchronous write-back after every mutation ([`PersistedSlice`])
//! - Storage faults are logged and swallowed; state stays in memory

pub mod gate;
pub mod slice;

pub use gate::{GateOutcome, GatedStorage, VersionGate};
pub use slice::PersistedSlice;
