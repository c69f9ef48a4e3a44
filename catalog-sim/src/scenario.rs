//! Scenario files: which allocations run, what they declare, what happens to them.
//!
//! ```toml
//! query_mode = "registered"
//!
//! [[allocations]]
//! id = "alloc-1"
//! steps = [{ action = "start" }, { action = "check_health" }, { action = "stop" }]
//!
//! [[allocations.tasks]]
//! name = "web"
//! services = [{ name = "web", port_label = "http", checks = ["alive"] }]
//! ```

use crate::error::{Result, SimError};
use catalog::{
    AllocRegistration, CheckState, CheckStatus, ServiceRegistration, ServiceSpec, TaskServices,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Prefix of the environment variables overriding scenario keys.
pub const ENV_PREFIX: &str = "CATALOG_SIM";

/// How the recording client answers registration queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Nothing is registered.
    #[default]
    Empty,
    /// Every query fails as if the catalog agent were down.
    Fail,
    /// Every declared service is registered with passing checks.
    Registered,
}

/// One lifecycle event applied to an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Start,
    /// Replaces the tags of every service of `task`.
    Update {
        task: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    CheckHealth,
    Stop,
}

fn default_steps() -> Vec<Step> {
    vec![Step::Start, Step::CheckHealth, Step::Stop]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskScenario {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationScenario {
    pub id: String,
    #[serde(default)]
    pub tasks: Vec<TaskScenario>,
    #[serde(default = "default_steps")]
    pub steps: Vec<Step>,
}

impl AllocationScenario {
    /// The tasks of this allocation as the catalog client sees them.
    pub fn task_services(&self) -> Vec<TaskServices> {
        self.tasks
            .iter()
            .map(|t| TaskServices {
                alloc_id: self.id.clone(),
                name: t.name.clone(),
                services: t.services.clone(),
            })
            .collect()
    }

    /// What a healthy catalog would report for this allocation.
    pub fn registered(&self) -> AllocRegistration {
        let mut reg = AllocRegistration::new();
        for task in &self.tasks {
            // The index keeps ids unique when a task declares one name on several ports.
            for (idx, service) in task.services.iter().enumerate() {
                let id = format!("_alloc-{}-{}-{}-{}", self.id, task.name, service.name, idx);
                let registration = service.checks.iter().fold(
                    ServiceRegistration::new(id, service.name.as_str()),
                    |r, check| r.with_check(CheckStatus::new(check.as_str(), CheckState::Passing)),
                );
                reg.insert(task.name.as_str(), registration);
            }
        }
        reg
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub query_mode: QueryMode,
    #[serde(default)]
    pub allocations: Vec<AllocationScenario>,
}

impl Scenario {
    /// Loads a scenario file, overlaid by `CATALOG_SIM__*` environment variables.
    ///
    /// # Arguments
    ///
    /// * `path` - The scenario file. Its extension selects the format.
    ///
    /// # Returns
    ///
    /// * `Ok(Scenario)` if it parses and validates.
    /// * `Err(SimError)` otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));
        Self::from_builder(builder)
    }

    /// Parses a scenario from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::from_builder(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let scenario: Scenario = builder.build()?.try_deserialize()?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks allocation ids are unique and every update step targets a declared task.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for alloc in &self.allocations {
            if !seen.insert(alloc.id.as_str()) {
                return Err(SimError::DuplicateAllocation(alloc.id.clone()));
            }
            for step in &alloc.steps {
                if let Step::Update { task, .. } = step {
                    if !alloc.tasks.iter().any(|t| &t.name == task) {
                        return Err(SimError::UnknownTask {
                            alloc_id: alloc.id.clone(),
                            task: task.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
