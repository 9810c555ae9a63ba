//! Side-by-side scenario comparison over a shared historical base

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::LedgerHistory;
use crate::drivers::DriverSet;
use crate::error::{EngineError, Result};
use crate::kpi::{compute_kpis, KpiSet};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// Projection plus derived KPIs for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub result: ProjectionResult,
    pub kpis: KpiSet,
}

impl ScenarioOutcome {
    pub fn label(&self) -> &str {
        &self.result.scenario_label
    }
}

/// Comparison output, ordered as the driver sets were supplied so display
/// order is deterministic and independent of label sort order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioComparison {
    pub fn get(&self, label: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.label() == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.label())
    }
}

/// Run the projection engine and KPI calculator once per driver set against
/// the same historical base.
///
/// All validation happens before any projection runs: duplicate labels and
/// malformed driver sets fail the whole call with no partial results. The
/// per-scenario runs have no data dependency on each other and execute on
/// the rayon worker pool; outputs are collected positionally, so insertion
/// order never depends on scheduling.
pub fn compare(
    history: &LedgerHistory,
    driver_sets: &[DriverSet],
    horizon_months: u32,
) -> Result<ScenarioComparison> {
    if driver_sets.is_empty() {
        return Err(EngineError::validation(
            "driver_sets",
            "at least one scenario is required",
        ));
    }

    let mut seen = HashSet::new();
    for drivers in driver_sets {
        drivers.validate()?;
        if !seen.insert(drivers.label.as_str()) {
            return Err(EngineError::validation(
                "driver_sets",
                format!("duplicate scenario label: {}", drivers.label),
            ));
        }
    }

    log::info!(
        "comparing {} scenarios over {} months",
        driver_sets.len(),
        horizon_months
    );

    let outcomes = driver_sets
        .par_iter()
        .map(|drivers| {
            let result =
                ProjectionEngine::new(drivers.clone()).project(history, horizon_months)?;
            let kpis = compute_kpis(&result);
            Ok(ScenarioOutcome { result, kpis })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScenarioComparison { outcomes })
}
