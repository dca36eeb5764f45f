use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use zonegrid::{
    analysis::{analyze, Area},
    report::{self, RunReport},
    scenario::ScenarioLoader,
    world::City,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Zoned urban growth simulator")]
struct Cli {
    /// Scenario YAML or line config file (prompted for when omitted)
    config: Option<PathBuf>,

    /// Override the step limit
    #[arg(long)]
    steps: Option<u64>,

    /// Override the refresh interval; 0 disables periodic reports
    #[arg(long)]
    refresh: Option<u64>,

    /// Override the disruption seed
    #[arg(long)]
    seed: Option<u64>,

    /// Run without random disruptions
    #[arg(long)]
    no_disruptions: bool,

    /// Analyze this area once instead of prompting
    #[arg(
        long,
        num_args = 4,
        value_names = ["X1", "Y1", "X2", "Y2"],
        allow_negative_numbers = true
    )]
    area: Option<Vec<i64>>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.config.clone() {
        Some(path) => path,
        None => {
            let Some(line) = prompt("Enter simulation configuration file: ")? else {
                bail!("no configuration file given");
            };
            PathBuf::from(line.trim())
        }
    };

    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&config)?;
    init_tracing(&scenario.logging.level);
    tracing::info!(
        scenario = %scenario.name,
        config = %config.display(),
        layout = %scenario.layout_path().display(),
        "scenario loaded"
    );

    if let Some(steps) = cli.steps {
        scenario.max_steps = steps;
    }
    if let Some(refresh) = cli.refresh {
        scenario.refresh_rate = refresh;
    }
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if cli.no_disruptions {
        scenario.disruptions = false;
    }
    tracing::info!(
        scenario = %scenario.name,
        max_steps = scenario.max_steps,
        refresh_rate = scenario.refresh_rate,
        seed = scenario.seed,
        disruptions = scenario.disruptions,
        "configuration resolved"
    );

    let mut city = scenario.build_city()?;
    let mut engine = scenario.build_engine();
    let text = cli.format == OutputFormat::Text;

    if text {
        println!("{}", report::initial_state(&city));
    }
    let mut disruptions = Vec::new();
    let summary = engine.run_with_hook(&mut city, |step, city| {
        if let Some(event) = &step.disruption {
            if text {
                print!("{}", report::disruption(event));
            }
            disruptions.push(event.clone());
        }
        if text && step.refresh {
            println!("{}", report::refresh(step, city));
        }
    })?;

    if !text {
        let mut run_report = RunReport::new(&scenario.name, summary, &city);
        run_report.disruptions = disruptions;
        if let Some(area) = requested_area(&cli) {
            run_report.area = Some(analyze(&city, area)?);
        }
        println!("{}", run_report.to_json()?);
        return Ok(());
    }

    print!("{}", report::final_stats(&city));
    match requested_area(&cli) {
        Some(area) => {
            let area_report = analyze(&city, area)?;
            print!("\n{}", report::area(&area_report));
        }
        None => analyze_interactively(&city)?,
    }
    Ok(())
}

/// `RUST_LOG` wins over the scenario's `logging.level` when it is set and non-empty.
fn filter_directive(rust_log: Option<String>, scenario_level: &str) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| scenario_level.to_string())
}

fn init_tracing(scenario_level: &str) {
    let directive = filter_directive(std::env::var("RUST_LOG").ok(), scenario_level);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_writer(io::stderr)
        .init();
}

fn requested_area(cli: &Cli) -> Option<Area> {
    match cli.area.as_deref() {
        Some(&[x1, y1, x2, y2]) => Some(Area::new(x1, y1, x2, y2)),
        _ => None,
    }
}

/// Keep asking until the operator gives an in-bounds rectangle.
fn analyze_interactively(city: &City) -> Result<()> {
    loop {
        let Some(line) = prompt("\nEnter coordinates for area analysis (x1 y1 x2 y2): ")? else {
            bail!("input closed before a valid area was entered");
        };
        let values: Result<Vec<i64>, _> = line.split_whitespace().map(str::parse).collect();
        let area = match values.as_deref() {
            Ok(&[x1, y1, x2, y2]) => Area::new(x1, y1, x2, y2),
            _ => {
                println!("Please enter four integers.");
                continue;
            }
        };
        match analyze(city, area) {
            Ok(area_report) => {
                print!("\n{}", report::area(&area_report));
                return Ok(());
            }
            Err(err) => println!("{err}. Please try again."),
        }
    }
}

/// Print `message` and read one line. `None` once stdin is exhausted.
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok((read > 0).then_some(line))
}
