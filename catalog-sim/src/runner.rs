use crate::scenario::{AllocationScenario, QueryMode, Scenario, Step};
use anyhow::{Context, Result};
use catalog::{AllocRegistration, CatalogError, CatalogServiceClient};
use catalog_core::health::{self, AllocHealth};
use catalog_core::hooks::TaskServicesHook;
use catalog_core::testing::{MockCatalogOp, MockCatalogServiceClient};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of one `check_health` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthOutcome {
    Healthy,
    Pending { reason: String },
    Unhealthy { reason: String },
    Error { message: String },
}

impl From<Result<AllocHealth, CatalogError>> for HealthOutcome {
    fn from(result: Result<AllocHealth, CatalogError>) -> Self {
        match result {
            Ok(AllocHealth::Healthy) => Self::Healthy,
            Ok(AllocHealth::Pending { reason }) => Self::Pending { reason },
            Ok(AllocHealth::Unhealthy { reason }) => Self::Unhealthy { reason },
            Err(e) => Self::Error {
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub alloc_id: String,
    pub health: Vec<HealthOutcome>,
}

/// Everything a replay produced: the ledger and the per-allocation health.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub ops: Vec<MockCatalogOp>,
    pub allocations: Vec<AllocationReport>,
}

/// Builds the recording client answering queries as `scenario.query_mode` says.
pub fn build_client(scenario: &Scenario) -> MockCatalogServiceClient {
    let client = MockCatalogServiceClient::new();
    match scenario.query_mode {
        QueryMode::Empty => client,
        QueryMode::Fail => client.with_alloc_registrations_fn(|alloc_id| {
            Err(CatalogError::unavailable(format!(
                "simulated outage while querying {}",
                alloc_id
            )))
        }),
        QueryMode::Registered => {
            let table: HashMap<String, AllocRegistration> = scenario
                .allocations
                .iter()
                .map(|a| (a.id.clone(), a.registered()))
                .collect();
            client.with_alloc_registrations_fn(move |alloc_id| Ok(table.get(alloc_id).cloned()))
        }
    }
}

/// Replays the steps of one allocation, blocking the calling thread.
pub fn replay_allocation(
    client: Arc<dyn CatalogServiceClient>,
    alloc: &AllocationScenario,
) -> AllocationReport {
    let hooks: Vec<TaskServicesHook> = alloc
        .task_services()
        .into_iter()
        .map(|t| TaskServicesHook::new(client.clone(), t))
        .collect();
    let mut report = AllocationReport {
        alloc_id: alloc.id.clone(),
        health: Vec::new(),
    };

    for step in &alloc.steps {
        match step {
            Step::Start => {
                for hook in &hooks {
                    if let Err(e) = hook.poststart() {
                        warn!("Sim: Start of alloc '{}' incomplete: {}", alloc.id, e);
                    }
                }
            }
            Step::Update { task, tags } => {
                for hook in hooks.iter().filter(|h| &h.task().name == task) {
                    let mut new = hook.task();
                    for service in &mut new.services {
                        service.tags = tags.clone();
                    }
                    if let Err(e) = hook.update(new) {
                        warn!("Sim: Update of '{}/{}' failed: {}", alloc.id, task, e);
                    }
                }
            }
            Step::CheckHealth => {
                let tasks: Vec<_> = hooks.iter().map(|h| h.task()).collect();
                let outcome = HealthOutcome::from(health::evaluate(
                    client.as_ref(),
                    &alloc.id,
                    &tasks,
                ));
                info!("Sim: Alloc '{}' health: {:?}", alloc.id, outcome);
                report.health.push(outcome);
            }
            Step::Stop => {
                for hook in &hooks {
                    hook.pre_kill();
                    hook.exited();
                }
            }
        }
    }

    report
}

/// Replays every allocation concurrently against one shared recording client.
///
/// Each allocation runs on its own blocking task, so calls from different
/// allocations interleave in the ledger while each allocation's own calls
/// keep their order.
pub async fn run(scenario: Scenario) -> Result<SimReport> {
    let client = Arc::new(build_client(&scenario));

    let mut replays = JoinSet::new();
    for alloc in scenario.allocations {
        let client: Arc<dyn CatalogServiceClient> = client.clone();
        replays.spawn_blocking(move || replay_allocation(client, &alloc));
    }

    let mut allocations = Vec::new();
    while let Some(joined) = replays.join_next().await {
        allocations.push(joined.context("Allocation replay panicked")?);
    }
    allocations.sort_by(|a, b| a.alloc_id.cmp(&b.alloc_id));

    Ok(SimReport {
        ops: client.ops(),
        allocations,
    })
}
