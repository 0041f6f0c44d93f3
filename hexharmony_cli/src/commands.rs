// Subcommand implementations. Each builds an engine from the loaded config,
// drives it through commands, and prints plain-text tables (or JSON).

use anyhow::{Context, Result, bail};
use hexharmony_engine::lattice::AxialCoord;
use hexharmony_engine::reference::reference_intervals;
use hexharmony_engine::{EngineCommand, EngineConfig, HarmonicEngine};
use std::collections::BTreeMap;
use std::path::Path;

fn engine_for(config: EngineConfig, edo: u32) -> Result<HarmonicEngine> {
    if config.preset(edo).is_none() {
        let known: Vec<String> = config.presets.keys().map(u32::to_string).collect();
        bail!("no preset for {edo} EDO (configured: {})", known.join(", "));
    }
    let mut engine = HarmonicEngine::new(config).context("engine config rejected")?;
    engine.apply(EngineCommand::SetTuningPreset { edo });
    Ok(engine)
}

pub fn lut(config: EngineConfig, edo: u32, weight: Option<f64>, bandwidth: Option<f64>) -> Result<()> {
    let mut engine = engine_for(config, edo)?;
    if let Some(weight) = weight {
        engine.apply(EngineCommand::SetComplexityWeight { weight });
    }
    if let Some(scale) = bandwidth {
        engine.apply(EngineCommand::SetBandwidth { scale });
    }

    let lut = engine.lut();
    println!(
        "{}: weight {}, bandwidth {}",
        engine.tuning().name,
        lut.complexity_weight(),
        lut.bandwidth_scale()
    );
    println!("{:>5} {:>8} {:>9} {:>8} {:>5} {:>10}", "steps", "cents", "ratio", "error", "limit", "roughness");
    for (steps, entry) in lut.entries().iter().enumerate() {
        let cents = engine.tuning().step_cents(steps as i64);
        match entry.harmonic {
            Some(h) => println!(
                "{steps:>5} {cents:>8.1} {:>9} {:>+8.1} {:>5} {:>10.4}",
                h.label(),
                h.error_cents,
                h.limit,
                entry.roughness
            ),
            None => println!(
                "{steps:>5} {cents:>8.1} {:>9} {:>8} {:>5} {:>10.4}",
                "-", "-", "-", entry.roughness
            ),
        }
    }
    Ok(())
}

pub fn heatmap(
    config: EngineConfig,
    edo: u32,
    steps: &[i64],
    weight: Option<f64>,
    gain: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut engine = engine_for(config, edo)?;
    if let Some(weight) = weight {
        engine.apply(EngineCommand::SetComplexityWeight { weight });
    }
    if let Some(gain) = gain {
        engine.apply(EngineCommand::SetGain { gain });
    }
    for &step in steps {
        let coord = first_cell_with_step(&engine, step)
            .with_context(|| format!("pitch step {step} is outside the lattice"))?;
        engine.apply(EngineCommand::SetCellActive { coord, active: true });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        return Ok(());
    }

    // One line per distinct pitch step; cells sharing a step share a visual.
    let mut by_step = BTreeMap::new();
    for cell in engine.lattice().cells() {
        if let Some(visual) = cell.visual() {
            by_step.entry(cell.pitch_step).or_insert((cell.coord, visual.clone()));
        }
    }
    println!("{}: sounding steps {:?}", engine.tuning().name, steps);
    for (step, (coord, visual)) in by_step {
        let cents = engine.tuning().step_cents(step);
        let label = visual.label.as_deref().unwrap_or("-");
        println!(
            "{step:>5} {cents:>8.1}¢ {:>7} {:<16} {label}",
            coord.to_string(),
            visual.color.to_string()
        );
    }
    Ok(())
}

fn first_cell_with_step(engine: &HarmonicEngine, step: i64) -> Option<AxialCoord> {
    engine
        .lattice()
        .cells()
        .iter()
        .find(|c| c.pitch_step == step)
        .map(|c| c.coord)
}

pub fn reference(config: &EngineConfig, max_limit: u64, max_denominator: u64) -> Result<()> {
    for interval in reference_intervals(max_limit, max_denominator, &config.palette) {
        println!(
            "{:>7} {:>8.2}¢ limit {:>2} {}",
            interval.label(),
            interval.cents,
            interval.limit,
            interval.color
        );
    }
    Ok(())
}

pub fn dump_config(config: &EngineConfig, out: Option<&Path>) -> Result<()> {
    let json = config.to_json_pretty()?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "config written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
