use thiserror::Error;

/// Errors raised while loading a scenario.
#[derive(Error, Debug)]
pub enum SimError {
    /// The scenario could not be read or deserialized.
    #[error("Scenario config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Two allocations share an identifier.
    #[error("Allocation {0} is declared twice")]
    DuplicateAllocation(String),

    /// A step refers to a task the allocation does not declare.
    #[error("Allocation {alloc_id} has no task named {task}")]
    UnknownTask { alloc_id: String, task: String },
}

/// A specialized Result type for scenario operations.
pub type Result<T> = std::result::Result<T, SimError>;
