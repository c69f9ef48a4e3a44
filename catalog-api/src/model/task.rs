//! Services a task asks the catalog to publish.

use serde::{Deserialize, Serialize};

/// A single discoverable service declared by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Name the service is discoverable under.
    pub name: String,
    /// Label of the allocation port the service advertises, if any.
    #[serde(default)]
    pub port_label: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Names of the health checks attached to the service.
    #[serde(default)]
    pub checks: Vec<String>,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port_label: None,
            tags: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn with_port_label(mut self, label: impl Into<String>) -> Self {
        self.port_label = Some(label.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.checks.push(check.into());
        self
    }
}

/// The set of services one task of an allocation registers.
///
/// This is the argument of every registration call made against a
/// [`crate::CatalogServiceClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskServices {
    /// Identifier of the allocation the task belongs to.
    pub alloc_id: String,
    /// Name of the task within the allocation.
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

impl TaskServices {
    /// Creates a task with no declared services.
    ///
    /// # Arguments
    ///
    /// * `alloc_id` - The allocation identifier (opaque, may be empty).
    /// * `name` - The task name.
    pub fn new(alloc_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alloc_id: alloc_id.into(),
            name: name.into(),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }
}
