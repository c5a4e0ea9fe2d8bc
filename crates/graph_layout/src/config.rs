use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of the layout framework
///
/// Every section has defaults, so a partial configuration file only needs
/// the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub validation: ValidationConfig,
    pub script: ScriptConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of items with a value inspected to classify an attribute
    pub sample_size: usize,
    /// Maximum number of distinct values of a qualitative attribute
    pub qualitative_max_distinct: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            qualitative_max_distinct: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Number of nodes a script function is tried on before acceptance
    pub sample_size: usize,
    /// Iterations allowed to one loop of a single call of the function
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            sample_size: 5,
            loop_iteration_limit: 1_000_000,
            recursion_limit: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Emit a snapshot every this many algorithm steps
    pub emit_every: usize,
    /// Pause between two steps, in milliseconds
    pub idle_ms: u64,
}

impl WorkerConfig {
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            emit_every: 10,
            idle_ms: 0,
        }
    }
}
