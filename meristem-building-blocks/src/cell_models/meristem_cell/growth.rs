use super::Cell;
use crate::parameters::{GrowthDirectionPolicy, MorphogenSignal, Parameters};

use meristem_concepts::{CellHandle, Cycle, CycleEvent, DivisionError};

use itertools::Itertools;
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Information about a cell which is ready to divide.
///
/// Returned by [Cell::division_check] and recorded by the tissue for every division.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DivisionData {
    /// Rank of the dividing cell
    pub rank: CellHandle,
    /// Area enclosed by the wall ring
    pub area: f64,
    /// Cell progress at the time of the check
    pub progress: f64,
    /// WUS concentration
    pub wus: f64,
    /// CK concentration
    pub ck: f64,
    /// Number of steps since the cell was created
    pub life_length: usize,
    /// Center of the cell
    pub center: Vector2<f64>,
}

fn exponential_decay(
    pos: &Vector2<f64>,
    center: &Vector2<f64>,
    peak: f64,
    decay_length: f64,
) -> f64 {
    if decay_length > 0.0 {
        peak * (-(pos - center).norm() / decay_length).exp()
    } else {
        0.0
    }
}

fn hill(x: f64, half_saturation: f64, coefficient: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let xn = x.powf(coefficient);
    xn / (half_saturation.max(0.0).powf(coefficient) + xn)
}

impl Cell {
    /// Area enclosed by the wall ring calculated with the shoelace formula.
    pub fn calc_area(&self) -> f64 {
        0.5 * self
            .ring_positions()
            .iter()
            .circular_tuple_windows::<(_, _)>()
            .map(|(p, q)| p.x * q.y - q.x * p.y)
            .sum::<f64>()
    }

    /// Determines and stores the WUS concentration at the center of the cell.
    pub fn calc_wus(&mut self, signal: &MorphogenSignal) -> f64 {
        self.wuschel = match signal {
            MorphogenSignal::Organizer {
                wus_center,
                wus_peak,
                wus_decay_length,
                ..
            } => exponential_decay(&self.cell_center, wus_center, *wus_peak, *wus_decay_length),
            MorphogenSignal::Supplied { wus, .. } => *wus,
        }
        .max(0.0);
        self.wuschel
    }

    /// Determines and stores the CK concentration at the center of the cell.
    pub fn calc_ck(&mut self, signal: &MorphogenSignal) -> f64 {
        self.cytokinin = match signal {
            MorphogenSignal::Organizer {
                ck_center,
                ck_peak,
                ck_decay_length,
                ..
            } => exponential_decay(&self.cell_center, ck_center, *ck_peak, *ck_decay_length),
            MorphogenSignal::Supplied { ck, .. } => *ck,
        }
        .max(0.0);
        self.cytokinin
    }

    /// Sets the growth rate from the current morphogen concentrations
    /// \\begin{equation}
    ///     r = r_\text{max}\frac{w^h}{K^h + w^h}\left(1 + g c\right)
    /// \\end{equation}
    /// where $w$ is the WUS and $c$ the CK concentration.
    ///
    /// With `init` the growth rate never drops below its current value.
    /// This is used right after division when the concentrations of a daughter have not yet
    /// been recalculated.
    pub fn set_growth_rate(&mut self, init: bool, params: &Parameters) {
        let g = &params.growth;
        let rate = g.max_growth_rate
            * hill(self.wuschel, g.wus_half_saturation, g.hill_coefficient)
            * (1.0 + g.ck_gain * self.cytokinin);
        self.growth_rate = if init {
            rate.max(self.growth_rate)
        } else {
            rate
        };
    }

    /// Recalculates both morphogen concentrations and the growth rate which follows from
    /// them.
    ///
    /// A cell which has not yet lived a single step keeps at least the growth rate it was
    /// created with, see [set_growth_rate](Cell::set_growth_rate).
    pub fn update_morphogens(&mut self, signal: &MorphogenSignal, params: &Parameters) {
        self.calc_wus(signal);
        self.calc_ck(signal);
        self.set_growth_rate(self.life_length == 0, params);
    }

    /// Stores the normalized growth direction.
    ///
    /// A vanishing vector removes the growth direction.
    pub fn set_growth_direction(&mut self, gd: Vector2<f64>) {
        self.growth_direction = gd.try_normalize(0.0).unwrap_or_else(Vector2::zeros);
    }

    /// Advances the cell by one step of its cycle.
    ///
    /// 1. Increments the life length
    /// 2. Increases the progress by growth rate times time increment up to
    ///    [max_progress](crate::DivisionParameters::max_progress)
    /// 3. Updates the growth direction according to the
    ///    [GrowthDirectionPolicy](crate::GrowthDirectionPolicy)
    /// 4. Adds cytoplasm nodes proportional to the progress
    /// 5. Inserts and deletes wall nodes
    /// 6. Relaxes the rest angles
    pub fn update_cell_progress<R: Rng + ?Sized>(
        &mut self,
        step: usize,
        rng: &mut R,
        params: &Parameters,
    ) {
        self.update_life_length();
        let max_progress = params.division.max_progress;
        self.cell_progress =
            (self.cell_progress + self.growth_rate * params.mechanics.dt).clamp(0.0, max_progress);

        match params.growth.growth_direction_policy {
            GrowthDirectionPolicy::TensileStress => {
                let gd = self.compute_direction_of_highest_tensile_stress(params);
                self.set_growth_direction(gd);
            }
            GrowthDirectionPolicy::External => (),
        }

        let target_cyt_nodes = params.growth.init_cyt_nodes
            + (self.cell_progress * params.growth.cyt_nodes_per_cycle as f64).floor() as usize;
        while self.num_cyt_nodes < target_cyt_nodes {
            self.add_cyt_node(rng, params);
        }

        self.add_wall_node_check(step, params);
        self.delete_wall_node_check(step, params);
        self.update_wall_equi_angles(params);
    }

    /// Reports whether the cell has reached the progress required for division.
    pub fn division_check(&self, params: &Parameters) -> Option<DivisionData> {
        if self.cell_progress < params.division.max_progress {
            return None;
        }
        Some(DivisionData {
            rank: self.rank,
            area: self.calc_area(),
            progress: self.cell_progress,
            wus: self.wuschel,
            ck: self.cytokinin,
            life_length: self.life_length,
            center: self.cell_center,
        })
    }
}

impl Cycle<Cell, Parameters> for Cell {
    fn update_cycle(
        rng: &mut rand_chacha::ChaCha8Rng,
        step: usize,
        params: &Parameters,
        cell: &mut Cell,
    ) -> Option<CycleEvent> {
        cell.update_cell_progress(step, rng, params);
        cell.division_check(params).map(|_| CycleEvent::Division)
    }

    fn divide(
        params: &Parameters,
        cell: &mut Cell,
        daughter: CellHandle,
    ) -> Result<Cell, DivisionError> {
        let (mut parent, mut daughter) = cell.division(params, daughter)?;
        parent.refine_division_wall(params)?;
        daughter.refine_division_wall(params)?;
        *cell = parent;
        Ok(daughter)
    }
}

#[cfg(test)]
mod test {
    use super::super::test_utils::*;
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn area_of_regular_polygon() {
        let params = Parameters::default();
        let cell = seed_cell(0, [4.0, 4.0], 1.0, &params);
        let n = cell.get_wall_count() as f64;
        let expected = 0.5 * n * (2.0 * std::f64::consts::PI / n).sin();
        assert_abs_diff_eq!(cell.calc_area(), expected, epsilon = 1e-10);
    }

    #[test]
    fn organizer_concentrations_decay() {
        let params = Parameters::default();
        let mut near = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let mut far = seed_cell(1, [6.0, 8.0], 1.0, &params);
        let signal = MorphogenSignal::default();
        let w_near = near.calc_wus(&signal);
        let w_far = far.calc_wus(&signal);
        assert!(w_near > w_far);
        assert_abs_diff_eq!(w_far, 2.0 * (-10.0f64 / 5.0).exp(), epsilon = 1e-10);
        assert_abs_diff_eq!(far.calc_ck(&signal), (-2.0f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn zero_wus_gives_zero_growth() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let signal = MorphogenSignal::Supplied { wus: 0.0, ck: 3.0 };
        cell.update_morphogens(&signal, &params);
        assert_eq!(cell.get_growth_rate(), 0.0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        for step in 0..500 {
            cell.update_cell_progress(step, &mut rng, &params);
            assert!(cell.division_check(&params).is_none());
        }
        assert_eq!(cell.get_cell_progress(), 0.0);
        assert_eq!(cell.get_life_length(), 500);
    }

    #[test]
    fn growth_rate_follows_hill_function() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        cell.update_morphogens(&MorphogenSignal::Supplied { wus: 1.0, ck: 0.0 }, &params);
        assert_abs_diff_eq!(
            cell.get_growth_rate(),
            0.5 * params.growth.max_growth_rate,
            epsilon = 1e-12
        );
        cell.update_morphogens(&MorphogenSignal::Supplied { wus: 1.0, ck: 2.0 }, &params);
        assert_abs_diff_eq!(
            cell.get_growth_rate(),
            0.5 * params.growth.max_growth_rate * (1.0 + 2.0 * params.growth.ck_gain),
            epsilon = 1e-12
        );
        // The initial growth rate never drops below the inherited one
        let before = cell.get_growth_rate();
        cell.calc_wus(&MorphogenSignal::Supplied { wus: 0.0, ck: 0.0 });
        cell.set_growth_rate(true, &params);
        assert_eq!(cell.get_growth_rate(), before);
        cell.set_growth_rate(false, &params);
        assert_eq!(cell.get_growth_rate(), 0.0);
    }

    #[test]
    fn daughters_keep_inherited_rate_until_first_step() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        cell.update_morphogens(&MorphogenSignal::Supplied { wus: 1e3, ck: 0.0 }, &params);
        let inherited = cell.get_growth_rate();
        assert!(inherited > 0.0);
        cell.cell_progress = params.division.max_progress;
        let daughter = Cell::divide(&params, &mut cell, CellHandle(1)).unwrap();

        let signal = MorphogenSignal::Supplied { wus: 0.0, ck: 0.0 };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
        for mut c in [cell, daughter] {
            assert_eq!(c.get_life_length(), 0);
            c.update_morphogens(&signal, &params);
            assert_eq!(c.get_growth_rate(), inherited);
            c.update_cell_progress(1, &mut rng, &params);
            c.update_morphogens(&signal, &params);
            assert_eq!(c.get_growth_rate(), 0.0);
        }
    }

    #[test]
    fn progress_saturates_and_adds_cytoplasm() {
        let mut params = Parameters::default();
        params.growth.max_growth_rate = 50.0;
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        cell.update_morphogens(&MorphogenSignal::Supplied { wus: 100.0, ck: 0.0 }, &params);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2);
        let mut steps = 0;
        while cell.division_check(&params).is_none() {
            cell.update_cell_progress(steps, &mut rng, &params);
            steps += 1;
            assert!(steps < 100);
        }
        assert_eq!(cell.get_cell_progress(), params.division.max_progress);
        assert_eq!(
            cell.get_cyt_count(),
            params.growth.init_cyt_nodes + params.growth.cyt_nodes_per_cycle
        );
        let data = cell.division_check(&params).unwrap();
        assert_eq!(data.rank, cell.get_rank());
        assert_eq!(data.life_length, steps);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn external_growth_direction_is_kept() {
        let mut params = Parameters::default();
        params.growth.growth_direction_policy = GrowthDirectionPolicy::External;
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        cell.set_growth_direction(Vector2::new(3.0, 4.0));
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        cell.update_cell_progress(1, &mut rng, &params);
        assert_abs_diff_eq!(cell.get_growth_direction(), Vector2::new(0.6, 0.8));
    }
}
