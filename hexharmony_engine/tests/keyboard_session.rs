// End-to-end session through the public engine API.
//
// Drives a `HarmonicEngine` the way the front ends do (commands in, events
// and cached visuals out) and checks the recompute chain, the listener
// registry, preset switching and config loading from disk.

use hexharmony_engine::chord_bank::SlotId;
use hexharmony_engine::color::Rgb;
use hexharmony_engine::filters::Factor;
use hexharmony_engine::lattice::AxialCoord;
use hexharmony_engine::{EngineCommand, EngineConfig, EngineEvent, HarmonicEngine};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn engine() -> HarmonicEngine {
    HarmonicEngine::new(EngineConfig::default()).unwrap()
}

/// First cell (in lattice order) at a pitch step.
fn coord_for_step(engine: &HarmonicEngine, step: i64) -> AxialCoord {
    engine
        .lattice()
        .cells()
        .iter()
        .find(|c| c.pitch_step == step)
        .map(|c| c.coord)
        .unwrap()
}

#[test]
fn fifth_dyad_in_twelve_edo() {
    let mut engine = engine();
    let root = coord_for_step(&engine, 0);
    let fifth = coord_for_step(&engine, 7);
    engine.apply(EngineCommand::SetCellActive { coord: root, active: true });
    engine.apply(EngineCommand::SetCellActive { coord: fifth, active: true });

    // A fifth above the fifth.
    let partner = coord_for_step(&engine, 14);
    let visual = engine.cell_visual(partner).unwrap();
    assert_eq!(visual.label.as_deref(), Some("3/2 (Err: -2.0¢)"));
    assert_ne!(visual.color, Rgb::BLACK);

    let reading = engine.reading(partner).unwrap();
    assert!(reading.consonance > 0.4);

    // Every cell sharing a sounding pitch is itself inactive and labelled.
    let octave_up = coord_for_step(&engine, 12);
    let label = engine.cell_visual(octave_up).unwrap().label.clone().unwrap();
    assert!(label.starts_with("1/1"));
}

#[test]
fn recompute_is_idempotent() {
    let mut engine = engine();
    engine.apply(EngineCommand::ToggleCell { coord: AxialCoord::ORIGIN });
    engine.apply(EngineCommand::ToggleCell { coord: AxialCoord::new(2, 0) });
    let before = engine.snapshot();

    // Bounce the gain to force two recomputes that end in the same state.
    engine.apply(EngineCommand::SetGain { gain: 3.0 });
    engine.apply(EngineCommand::SetGain { gain: 8.0 });
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn listeners_see_the_chain_in_order() {
    let mut engine = engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    engine.apply(EngineCommand::ToggleCell { coord: AxialCoord::ORIGIN });
    engine.apply(EngineCommand::SetTuningPreset { edo: 19 });

    {
        let seen = seen.lock().unwrap();
        assert!(matches!(seen[0], EngineEvent::CellToggled { active: true, .. }));
        assert!(matches!(seen[1], EngineEvent::RecomputeCompleted { active: 1, .. }));
        assert!(matches!(seen[2], EngineEvent::TuningChanged { edo: 19, .. }));
        assert!(matches!(seen[3], EngineEvent::LutRebuilt { edo: 19, entries: 76, .. }));
        assert!(matches!(seen[4], EngineEvent::RecomputeCompleted { .. }));
        assert_eq!(seen.len(), 5);
    }

    assert!(engine.unsubscribe(id));
    engine.apply(EngineCommand::SetSlot { slot: SlotId(3) });
    assert_eq!(seen.lock().unwrap().len(), 5);
}

#[test]
fn every_preset_builds_a_sane_table() {
    let mut engine = engine();
    for edo in [12, 19, 31, 53, 72] {
        engine.apply(EngineCommand::SetTuningPreset { edo });
        let lut = engine.lut();
        assert_eq!(lut.len(), 4 * edo as usize);
        let unison = lut.lookup(0).harmonic.unwrap();
        assert_eq!((unison.numerator, unison.denominator), (1, 1));
        assert!(lut.lookup(0).roughness < lut.lookup(1).roughness);
        for entry in lut.entries() {
            assert!(entry.roughness.is_finite() && entry.roughness >= 0.0);
        }
    }
}

#[test]
fn disabling_every_factor_keeps_visuals_defined() {
    let mut engine = engine();
    engine.apply(EngineCommand::ToggleCell { coord: AxialCoord::ORIGIN });
    for factor in Factor::ALL {
        engine.apply(EngineCommand::SetFactor { factor, enabled: false });
    }
    for cell in engine.lattice().cells() {
        if cell.coord == AxialCoord::ORIGIN {
            continue;
        }
        let reading = engine.reading(cell.coord).unwrap();
        assert_eq!(reading.strength, 1.0);
        assert!(cell.visual().is_some());
    }
}

#[test]
fn config_loads_from_disk() {
    let config = EngineConfig {
        default_edo: 31,
        lattice_radius: 5,
        ..EngineConfig::default()
    };
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hexharmony.json");
    std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let engine = HarmonicEngine::new(loaded).unwrap();
    assert_eq!(engine.tuning().edo_divisions, 31);
    assert_eq!(engine.lattice().len(), 91);
}

#[test]
fn midi_style_lookup_finds_tuned_cells() {
    let mut engine = engine();
    engine.apply(EngineCommand::SetTuningPreset { edo: 31 });
    // A just major third above the base lands on 10 steps of 31-EDO.
    let cell = engine.closest_cell_by_frequency(261.63 * 1.25).unwrap();
    assert_eq!(cell.note_index, 10);
}
