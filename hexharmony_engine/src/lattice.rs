// The hex note lattice.
//
// Cells live in a radius-bounded hexagonal region of axial coordinates
// `(q, r)` (with `s = -q - r`). Every cell carries values derived from the
// active `TuningConfig`: pitch step, note index within the octave, frequency,
// and white-key flag. It also holds the cached heatmap visual written by
// `heatmap::recompute`.
//
// Generation order is fixed: q ascending from -R to R, and within each q,
// r ascending over the valid band `max(-R, -q-R) ..= min(R, -q+R)`. Two lookups
// depend on that order:
// - `cell_by_steps` returns the *last* generated cell with a given pitch step
//   (many cells share a step in an isomorphic layout);
// - `closest_cell_by_frequency` returns the *first* cell at the minimum
//   absolute Hz distance.
//
// Derived fields are never patched one at a time. `retune` recomputes all of
// them and drops every cached visual; a radius change regenerates the lattice.
//
// `HexLayout` is the pointy-top pixel mapping used at the pointer boundary.
//
// See also: `tuning.rs` for the step arithmetic, `chord_bank.rs` for which
// cells are sounding, `heatmap.rs` for the visuals.

use crate::heatmap::CellVisual;
use crate::tuning::TuningConfig;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

/// The six axial neighbor offsets, counter-clockwise from +q.
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl AxialCoord {
    pub const ORIGIN: AxialCoord = AxialCoord { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate; `q + r + s == 0`.
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn neighbors(&self) -> [AxialCoord; 6] {
        DIRECTIONS.map(|(dq, dr)| AxialCoord::new(self.q + dq, self.r + dr))
    }

    /// Hex (cube) distance.
    pub fn distance(&self, other: AxialCoord) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// Every coordinate within `radius` of the origin, in generation order.
    /// Empty when the radius does not fit a coordinate.
    pub fn region(radius: u32) -> Vec<AxialCoord> {
        let Ok(radius) = i32::try_from(radius) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                out.push(AxialCoord::new(q, r));
            }
        }
        out
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeCell {
    pub coord: AxialCoord,
    pub pitch_step: i64,
    /// `pitch_step` folded into `[0, edo)`.
    pub note_index: u32,
    pub frequency_hz: f64,
    pub white_key: bool,
    visual: Option<CellVisual>,
}

impl LatticeCell {
    fn derive(coord: AxialCoord, tuning: &TuningConfig, base_hz: f64) -> Self {
        let pitch_step = tuning.pitch_step(coord.q, coord.r);
        let note_index = tuning.note_index(pitch_step);
        Self {
            coord,
            pitch_step,
            note_index,
            frequency_hz: tuning.frequency(pitch_step, base_hz),
            white_key: tuning.is_white_key(note_index),
            visual: None,
        }
    }

    /// Heatmap output from the last recompute. `None` for active cells and
    /// whenever nothing is sounding.
    pub fn visual(&self) -> Option<&CellVisual> {
        self.visual.as_ref()
    }

    pub(crate) fn set_visual(&mut self, visual: Option<CellVisual>) {
        self.visual = visual;
    }
}

// ---------------------------------------------------------------------------
// Lattice
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Lattice {
    radius: u32,
    cells: Vec<LatticeCell>,
    by_coord: FxHashMap<AxialCoord, usize>,
    /// Pitch step → index of the last generated cell with that step.
    by_step: BTreeMap<i64, usize>,
}

impl Lattice {
    pub fn generate(radius: u32, tuning: &TuningConfig, base_hz: f64) -> Self {
        let cells: Vec<LatticeCell> = AxialCoord::region(radius)
            .into_iter()
            .map(|coord| LatticeCell::derive(coord, tuning, base_hz))
            .collect();
        let by_coord = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell.coord, i))
            .collect();
        let mut lattice = Self {
            radius,
            cells,
            by_coord,
            by_step: BTreeMap::new(),
        };
        lattice.index_steps();
        lattice
    }

    /// Recompute every derived field for a new tuning or base frequency.
    /// Cached visuals are dropped.
    pub fn retune(&mut self, tuning: &TuningConfig, base_hz: f64) {
        for cell in &mut self.cells {
            *cell = LatticeCell::derive(cell.coord, tuning, base_hz);
        }
        self.index_steps();
    }

    fn index_steps(&mut self) {
        self.by_step.clear();
        for (i, cell) in self.cells.iter().enumerate() {
            self.by_step.insert(cell.pitch_step, i);
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: AxialCoord) -> bool {
        self.by_coord.contains_key(&coord)
    }

    pub fn cell(&self, coord: AxialCoord) -> Option<&LatticeCell> {
        self.by_coord.get(&coord).map(|&i| &self.cells[i])
    }

    /// Last generated cell with this pitch step.
    pub fn cell_by_steps(&self, pitch_step: i64) -> Option<&LatticeCell> {
        self.by_step.get(&pitch_step).map(|&i| &self.cells[i])
    }

    /// Cell whose frequency is nearest `hz` in absolute Hz. Earlier cells win
    /// ties. `None` for an empty lattice or a non-finite target.
    pub fn closest_cell_by_frequency(&self, hz: f64) -> Option<&LatticeCell> {
        if !hz.is_finite() {
            return None;
        }
        self.cells
            .iter()
            .fold(None::<(&LatticeCell, f64)>, |best, cell| {
                let diff = (cell.frequency_hz - hz).abs();
                match best {
                    Some((_, best_diff)) if best_diff <= diff => best,
                    _ => Some((cell, diff)),
                }
            })
            .map(|(cell, _)| cell)
    }

    /// All cells in generation order.
    pub fn cells(&self) -> &[LatticeCell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [LatticeCell] {
        &mut self.cells
    }
}

// ---------------------------------------------------------------------------
// Pixel layout
// ---------------------------------------------------------------------------

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Pointy-top hex layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Center-to-corner distance in pixels.
    pub size: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl HexLayout {
    pub fn new(size: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            size,
            origin_x,
            origin_y,
        }
    }

    /// Pixel center of a cell.
    pub fn hex_to_pixel(&self, coord: AxialCoord) -> (f64, f64) {
        let q = coord.q as f64;
        let r = coord.r as f64;
        let x = self.size * (SQRT_3 * q + SQRT_3 / 2.0 * r);
        let y = self.size * (1.5 * r);
        (x + self.origin_x, y + self.origin_y)
    }

    /// The cell containing a pixel.
    pub fn pixel_to_hex(&self, x: f64, y: f64) -> AxialCoord {
        let px = (x - self.origin_x) / self.size;
        let py = (y - self.origin_y) / self.size;
        let q = SQRT_3 / 3.0 * px - py / 3.0;
        let r = 2.0 / 3.0 * py;
        cube_round(q, r)
    }
}

/// Round fractional axial coordinates to the nearest cell.
fn cube_round(qf: f64, rf: f64) -> AxialCoord {
    let sf = -qf - rf;
    let (mut q, mut r, s) = (qf.round(), rf.round(), sf.round());
    let dq = (q - qf).abs();
    let dr = (r - rf).abs();
    let ds = (s - sf).abs();
    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    AxialCoord::new(q as i32, r as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twelve(radius: u32) -> Lattice {
        Lattice::generate(radius, &TuningConfig::edo_12(), 261.63)
    }

    #[test]
    fn region_size_and_order() {
        for radius in 0..6u32 {
            let region = AxialCoord::region(radius);
            assert_eq!(region.len() as u32, 3 * radius * (radius + 1) + 1);
            assert!(region.iter().all(|c| c.distance(AxialCoord::ORIGIN) <= radius));
        }
        let r1 = AxialCoord::region(1);
        assert_eq!(
            r1,
            vec![
                AxialCoord::new(-1, 0),
                AxialCoord::new(-1, 1),
                AxialCoord::new(0, -1),
                AxialCoord::new(0, 0),
                AxialCoord::new(0, 1),
                AxialCoord::new(1, -1),
                AxialCoord::new(1, 0),
            ]
        );
    }

    #[test]
    fn region_rejects_radii_beyond_the_coordinate_range() {
        assert!(AxialCoord::region(u32::MAX).is_empty());
        assert!(AxialCoord::region(i32::MAX as u32 + 1).is_empty());
    }

    #[test]
    fn neighbors_are_at_distance_one() {
        let c = AxialCoord::new(2, -3);
        for n in c.neighbors() {
            assert_eq!(c.distance(n), 1);
            assert_eq!(n.q + n.r + n.s(), 0);
        }
        assert_eq!(AxialCoord::new(3, -1).to_string(), "3,-1");
    }

    #[test]
    fn derived_fields() {
        let lattice = twelve(3);
        let cell = lattice.cell(AxialCoord::new(3, 1)).unwrap();
        assert_eq!(cell.pitch_step, 7);
        assert_eq!(cell.note_index, 7);
        assert!(cell.white_key);
        assert!((cell.frequency_hz - 261.63 * 2f64.powf(7.0 / 12.0)).abs() < 1e-9);

        let below = lattice.cell(AxialCoord::new(-1, 0)).unwrap();
        assert_eq!(below.pitch_step, -2);
        assert_eq!(below.note_index, 10);
        assert!(!below.white_key);
        assert!(lattice.cell(AxialCoord::new(4, 0)).is_none());
    }

    #[test]
    fn last_generated_cell_wins_a_step() {
        let lattice = twelve(10);
        assert_eq!(lattice.cell_by_steps(7).unwrap().coord, AxialCoord::new(8, -9));
        assert!(lattice.cell_by_steps(10_000).is_none());
    }

    #[test]
    fn closest_frequency_prefers_first_seen() {
        let lattice = twelve(10);
        let cell = lattice.closest_cell_by_frequency(261.63).unwrap();
        assert_eq!(cell.pitch_step, 0);
        assert_eq!(cell.coord, AxialCoord::new(-5, 10));

        // Slightly sharp of the fifth still lands on step 7.
        let fifth = lattice.closest_cell_by_frequency(261.63 * 1.51).unwrap();
        assert_eq!(fifth.pitch_step, 7);

        assert!(lattice.closest_cell_by_frequency(f64::NAN).is_none());
    }

    #[test]
    fn retune_recomputes_everything() {
        let mut lattice = twelve(4);
        lattice.cells_mut()[0].set_visual(Some(CellVisual {
            color: crate::color::Rgb::WHITE,
            label: None,
        }));
        let tuning = TuningConfig::edo_31();
        lattice.retune(&tuning, 440.0);
        let fresh = Lattice::generate(4, &tuning, 440.0);
        assert_eq!(lattice.cells(), fresh.cells());
        assert!(lattice.cells().iter().all(|c| c.visual().is_none()));
        assert_eq!(
            lattice.cell_by_steps(8).map(|c| c.coord),
            fresh.cell_by_steps(8).map(|c| c.coord)
        );
    }

    #[test]
    fn pixel_round_trip() {
        let layout = HexLayout::new(30.0, 400.0, 300.0);
        for coord in AxialCoord::region(5) {
            let (x, y) = layout.hex_to_pixel(coord);
            assert_eq!(layout.pixel_to_hex(x, y), coord);
            // A few pixels off center stays inside the cell.
            assert_eq!(layout.pixel_to_hex(x + 5.0, y - 5.0), coord);
        }
        assert_eq!(layout.hex_to_pixel(AxialCoord::ORIGIN), (400.0, 300.0));
    }
}
