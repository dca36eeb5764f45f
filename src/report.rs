//! Text and JSON rendering of run output. Nothing here touches stdout directly.

use std::fmt::Write;

use serde::Serialize;

use crate::{
    analysis::{AreaReport, RegionTotals},
    engine::{RunSummary, StepReport},
    systems::DisruptionEvent,
    world::City,
};

/// One line per row: the zone glyph for empty cells, the population digit otherwise.
pub fn render_grid(city: &City) -> String {
    let mut out = String::new();
    for row in city.rows() {
        let cells: Vec<String> = row.iter().map(|cell| cell.render()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

pub fn render_pollution(city: &City) -> String {
    let mut out = String::new();
    for row in city.pollution().rows() {
        let levels: Vec<String> = row.iter().map(u32::to_string).collect();
        out.push_str(&levels.join(","));
        out.push('\n');
    }
    out
}

pub fn initial_state(city: &City) -> String {
    format!("Initial region state:\n{}", render_grid(city))
}

pub fn refresh(report: &StepReport, city: &City) -> String {
    format!(
        "Time step: {}\nAvailable workers: {}\nAvailable goods: {}\n{}",
        report.step,
        report.pools.workers,
        report.pools.goods,
        render_grid(city)
    )
}

pub fn disruption(event: &DisruptionEvent) -> String {
    let mut out = format!("Disruption struck at {}!\n", event.site);
    for change in &event.reductions {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "Population reduced at {} from {} to {}",
            change.coord, change.from, change.to
        );
    }
    out
}

pub fn final_stats(city: &City) -> String {
    let totals = RegionTotals::of(city);
    format!(
        "Final Stats:\n\
         Total Residential Population: {}\n\
         Total Industrial Population: {}\n\
         Total Commercial Population: {}\n\
         Total Pollution: {}\n\
         \n\
         Pollution Map:\n{}",
        totals.residential,
        totals.industrial,
        totals.commercial,
        totals.pollution,
        render_pollution(city)
    )
}

pub fn area(report: &AreaReport) -> String {
    format!(
        "Area Analysis Results:\n\
         Residential Population: {}\n\
         Industrial Population: {}\n\
         Commercial Population: {}\n\
         Total Pollution: {}\n\
         Disrupted Cells: {}\n",
        report.residential,
        report.industrial,
        report.commercial,
        report.pollution,
        report.disrupted_cells
    )
}

/// End-of-run document for `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub summary: RunSummary,
    pub totals: RegionTotals,
    pub grid: Vec<String>,
    pub pollution: Vec<Vec<u32>>,
    pub disruptions: Vec<DisruptionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaReport>,
}

impl RunReport {
    pub fn new(scenario: &str, summary: RunSummary, city: &City) -> Self {
        Self {
            scenario: scenario.to_string(),
            summary,
            totals: RegionTotals::of(city),
            grid: render_grid(city).lines().map(str::to_string).collect(),
            pollution: city.pollution().rows().map(<[u32]>::to_vec).collect(),
            disruptions: Vec::new(),
            area: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
