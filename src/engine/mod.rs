use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    rng::{RngManager, SystemRng},
    systems::{DisruptionEvent, GrowthTally, ResourcePools},
    world::City,
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub max_steps: u64,
    /// Report every N steps; 0 disables periodic reports.
    pub refresh_rate: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
            step: 0,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
    step: u64,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn run(&mut self, city: &mut City) -> Result<RunSummary> {
        self.run_with_hook(city, |_, _| {})
    }

    /// Step until the step limit or a population fixed point, calling `hook` after every step.
    pub fn run_with_hook<F>(&mut self, city: &mut City, mut hook: F) -> Result<RunSummary>
    where
        F: FnMut(&StepReport, &City),
    {
        tracing::info!(
            scenario = %self.settings.scenario_name,
            max_steps = self.settings.max_steps,
            width = city.width(),
            height = city.height(),
            "starting run"
        );
        let mut summary = RunSummary {
            steps: 0,
            termination: Termination::StepLimit,
            pools: ResourcePools::default(),
        };
        while self.step < self.settings.max_steps {
            let report = self.step(city)?;
            hook(&report, city);
            summary.steps = report.step;
            summary.pools = report.pools;
            if !report.changed {
                summary.termination = Termination::FixedPoint;
                break;
            }
        }
        tracing::info!(
            steps = summary.steps,
            termination = ?summary.termination,
            "run finished"
        );
        Ok(summary)
    }

    /// Advance exactly one step, regardless of limits.
    pub fn step(&mut self, city: &mut City) -> Result<StepReport> {
        self.step += 1;
        let before = city.populations();
        let mut frame = StepFrame::new(self.step);
        let mut timings = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let start = Instant::now();
            system
                .run(&mut frame, city, &mut rng_stream)
                .with_context(|| format!("system '{}' failed at step {}", system.name(), self.step))?;
            let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
            tracing::debug!(system = system.name(), step = self.step, duration_ms, "system ran");
            timings.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms,
            });
        }
        let changed = city.populations() != before;
        let refresh = self.settings.refresh_rate > 0 && self.step % self.settings.refresh_rate == 0;
        Ok(StepReport {
            step: self.step,
            pools: frame.pools,
            growth: frame.growth,
            disruption: frame.disruption,
            changed,
            refresh,
            systems: timings,
        })
    }
}

/// Step-scoped state threaded through the systems. Built fresh every step, so nothing
/// in it survives into the next one.
#[derive(Debug, Clone, Default)]
pub struct StepFrame {
    pub step: u64,
    pub pools: ResourcePools,
    pub growth: GrowthTally,
    pub disruption: Option<DisruptionEvent>,
}

impl StepFrame {
    pub fn new(step: u64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        frame: &mut StepFrame,
        city: &mut City,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub step: u64,
    /// Pools left at the end of the step.
    pub pools: ResourcePools,
    pub growth: GrowthTally,
    pub disruption: Option<DisruptionEvent>,
    /// Whether any cell population differs from the start of the step.
    pub changed: bool,
    /// Whether this step falls on the refresh interval.
    pub refresh: bool,
    pub systems: Vec<SystemRunReport>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    StepLimit,
    FixedPoint,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub termination: Termination,
    pub pools: ResourcePools,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;

    struct CountingSystem {
        calls: u64,
    }

    impl System for CountingSystem {
        fn name(&self) -> &str {
            "counting"
        }

        fn run(
            &mut self,
            frame: &mut StepFrame,
            _city: &mut City,
            _rng: &mut SystemRng<'_>,
        ) -> Result<()> {
            self.calls += 1;
            assert_eq!(frame.step, self.calls);
            Ok(())
        }
    }

    fn settings(max_steps: u64, refresh_rate: u64) -> EngineSettings {
        EngineSettings {
            scenario_name: "test".into(),
            seed: 1,
            max_steps,
            refresh_rate,
        }
    }

    #[test]
    fn idle_city_stops_at_first_step() {
        let mut city = layout::decode("-,-\nT,P").unwrap();
        let mut engine = EngineBuilder::new(settings(50, 1))
            .with_system(CountingSystem { calls: 0 })
            .build();
        let summary = engine.run(&mut city).unwrap();
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.termination, Termination::FixedPoint);
    }

    #[test]
    fn zero_step_limit_runs_nothing() {
        let mut city = layout::decode("R").unwrap();
        let mut engine = EngineBuilder::new(settings(0, 1)).build();
        let summary = engine.run(&mut city).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.termination, Termination::StepLimit);
    }

    #[test]
    fn refresh_flag_follows_interval() {
        let mut city = layout::decode("R").unwrap();
        let mut engine = EngineBuilder::new(settings(10, 3)).build();
        let flags: Vec<bool> = (0..6)
            .map(|_| engine.step(&mut city).unwrap().refresh)
            .collect();
        assert_eq!(flags, vec![false, false, true, false, false, true]);

        let mut engine = EngineBuilder::new(settings(10, 0)).build();
        assert!(!engine.step(&mut city).unwrap().refresh);
    }
}
