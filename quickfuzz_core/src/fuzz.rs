/// Contains the settings of a fuzzer run
pub mod config;

/// Contains the fuzzer which dispatches the payloads to the target
pub mod engine;

/// Contains the outcome counters collected during a run
pub mod stats;
