//! Recommendation engine for rigmate.
//!
//! Hosts the compatibility rule engine, the build assembler, the agent
//! output reconciler, and the public pipeline operations that tie parsing,
//! scoring, and the catalog together.

pub mod agent;
pub mod assemble;
pub mod compat;
pub mod pipeline;

pub use agent::AgentInput;
pub use assemble::AssemblyInput;
pub use compat::{CompatRule, RULES, evaluate};
pub use pipeline::{IngestResult, check_compatibility, get_build, ingest, reconcile_agent_output};
