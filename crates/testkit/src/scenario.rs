//! Step-based snapshot scenarios.
//!
//! A scenario applies the same operation to some state a fixed number of
//! times (one damage point, one inventory tick, one craft) and snapshots the
//! state after each step. The report is compared against a golden JSON file
//! (or rewritten when `STACKCRAFT_UPDATE_SNAPSHOTS=1` is set).

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Human-readable name (written into the snapshot report).
    pub name: String,
    /// Number of steps (the report also holds the initial frame).
    pub steps: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// State captured after a step.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioFrame<S> {
    /// Step number; 0 is the initial state.
    pub step: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Full scenario report.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport<S> {
    /// Scenario name.
    pub name: String,
    /// Frames in step order.
    pub frames: Vec<ScenarioFrame<S>>,
}

/// Step `state` and collect `steps + 1` frames without touching disk.
pub fn record_scenario<State, Snapshot, StepFn, SnapFn>(
    name: impl Into<String>,
    steps: u64,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> ScenarioReport<Snapshot>
where
    StepFn: FnMut(u64, &mut State),
    SnapFn: FnMut(u64, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(steps as usize + 1);
    frames.push(ScenarioFrame {
        step: 0,
        snapshot: snapshot(0, state),
    });
    for index in 1..=steps {
        step(index, state);
        frames.push(ScenarioFrame {
            step: index,
            snapshot: snapshot(index, state),
        });
    }
    ScenarioReport {
        name: name.into(),
        frames,
    }
}

/// Run a scenario and assert (or update) its golden file.
pub fn run_scenario<State, Snapshot, StepFn, SnapFn>(
    config: ScenarioConfig,
    mut state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(u64, &mut State),
    SnapFn: FnMut(u64, &State) -> Snapshot,
{
    let report = record_scenario(config.name, config.steps, &mut state, step, snapshot);
    assert_json_snapshot(config.snapshot_path, &report)
}
