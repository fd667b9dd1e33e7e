use crate::config::{SeedCell, Settings};
use crate::errors::SimulationError;

use meristem_building_blocks::{
    Cell, CellSummary, DivisionData, MorphogenSignal, NodeForces, Parameters, TissueView,
};
use meristem_concepts::{
    format_error_message, CalcError, CellHandle, Cycle, CycleEvent, IndexError, InvariantError,
    SetupError,
};

use kdam::BarExt;
use nalgebra::Vector2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "spans")]
use tracing::instrument;

/// Successful division which happened while updating the tissue.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DivisionRecord {
    /// Step at which the division happened
    pub step: usize,
    /// Handle of the newly created cell
    pub daughter: CellHandle,
    /// State of the parent right before dividing
    pub data: DivisionData,
}

/// Arena of all cells which drives them step by step.
///
/// Every cell is stored at the index given by its rank.
/// Cells refer to each other only by their [CellHandle].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tissue {
    cells: Vec<Cell>,
    parameters: Parameters,
    morphogens: MorphogenSignal,
    rng: ChaCha8Rng,
    division_log: Vec<DivisionRecord>,
    n_steps: usize,
    current_step: usize,
    show_progressbar: bool,
}

impl Tissue {
    /// Creates the tissue and places all seed cells.
    ///
    /// Neighbor sets and adhesion springs of the seed cells are calculated right away.
    pub fn new(settings: Settings) -> Result<Self, SimulationError> {
        let Settings {
            parameters,
            morphogens,
            seed_cells,
            n_steps,
            rng_seed,
            show_progressbar,
        } = settings;
        let mut tissue = Self {
            cells: Vec::with_capacity(seed_cells.len()),
            parameters,
            morphogens,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            division_log: Vec::new(),
            n_steps,
            current_step: 0,
            show_progressbar,
        };
        for seed in seed_cells.iter() {
            tissue.insert_seed_cell(seed)?;
        }
        tissue.update_contacts();
        Ok(tissue)
    }

    /// Inserts a new initial cell and returns its handle.
    ///
    /// The neighbor sets are only refreshed with the next [Tissue::update].
    pub fn insert_seed_cell(&mut self, seed: &SeedCell) -> Result<CellHandle, SetupError> {
        let rank = CellHandle(self.cells.len());
        let mut cell = Cell::new(
            rank,
            Vector2::from(seed.center),
            seed.radius,
            seed.layer,
            seed.boundary,
            seed.stem,
            &self.parameters,
        )?;
        if let Some([x, y]) = seed.div_plane {
            cell.set_div_plane(x, y);
        }
        cell.update_morphogens(&self.morphogens, &self.parameters);
        self.cells.push(cell);
        Ok(rank)
    }

    /// Advances all cells by one step.
    ///
    /// 1. Morphogen concentrations and growth rates
    /// 2. Forces of all cells followed by the new node positions
    /// 3. Cell cycle of every cell
    /// 4. Divisions of all cells which are ready
    /// 5. Neighbor sets and adhesion springs
    #[cfg_attr(feature = "spans", instrument(skip(self)))]
    pub fn update(&mut self, step: usize) -> Result<(), SimulationError> {
        self.update_morphogens();
        self.update_mechanics()?;
        let ready = self.update_cycles(step);
        self.update_divisions(step, ready);
        self.update_contacts();
        self.current_step = step + 1;

        #[cfg(debug_assertions)]
        self.check_invariants()?;
        Ok(())
    }

    /// Performs the configured number of steps starting from the current one.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        let mut bar = if self.show_progressbar {
            Some(initialize_bar(self.n_steps)?)
        } else {
            None
        };
        let start = self.current_step;
        for step in start..start + self.n_steps {
            self.update(step)?;
            if let Some(bar) = bar.as_mut() {
                bar.update(1)?;
            }
        }
        Ok(())
    }

    fn update_morphogens(&mut self) {
        let morphogens = &self.morphogens;
        let params = &self.parameters;
        self.cells
            .par_iter_mut()
            .for_each(|cell| cell.update_morphogens(morphogens, params));
    }

    #[cfg_attr(feature = "spans", instrument(skip_all))]
    fn update_mechanics(&mut self) -> Result<(), CalcError> {
        let params = &self.parameters;
        let cells = &self.cells;
        let forces = cells
            .par_iter()
            .map(|cell| cell.compute_forces(cells, params))
            .collect::<Result<Vec<NodeForces>, CalcError>>()?;
        self.cells
            .par_iter_mut()
            .zip(forces)
            .try_for_each(|(cell, forces)| {
                cell.apply_forces(forces);
                cell.update_node_locations(params)
            })
    }

    fn update_cycles(&mut self, step: usize) -> Vec<(usize, DivisionData)> {
        let params = &self.parameters;
        let rng = &mut self.rng;
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(|(index, cell)| match Cell::update_cycle(rng, step, params, cell) {
                Some(CycleEvent::Division) => cell.division_check(params).map(|data| (index, data)),
                None => None,
            })
            .collect()
    }

    #[cfg_attr(feature = "spans", instrument(skip(self, ready)))]
    fn update_divisions(&mut self, step: usize, ready: Vec<(usize, DivisionData)>) {
        for (index, data) in ready {
            let daughter_rank = CellHandle(self.cells.len());
            match Cell::divide(&self.parameters, &mut self.cells[index], daughter_rank) {
                Ok(daughter) => {
                    self.cells.push(daughter);
                    self.division_log.push(DivisionRecord {
                        step,
                        daughter: daughter_rank,
                        data,
                    });
                }
                Err(error) => {
                    tracing::warn!(cell = index, %error, "division failed, retrying next step")
                }
            }
        }
    }

    fn update_contacts(&mut self) {
        let params = &self.parameters;

        let cells = &self.cells;
        let neighbors: Vec<_> = cells
            .par_iter()
            .map(|cell| cell.find_neighbor_cells(cells, params))
            .collect();
        self.cells
            .par_iter_mut()
            .zip(neighbors)
            .for_each(|(cell, neighbors)| cell.set_neighbor_cells(neighbors));

        let cells = &self.cells;
        let springs: Vec<_> = cells
            .par_iter()
            .map(|cell| cell.find_adhesion_springs(cells, params))
            .collect();
        self.cells
            .par_iter_mut()
            .zip(springs)
            .for_each(|(cell, springs)| cell.set_adhesion_springs(springs));
    }

    /// Cell stored under the given handle
    pub fn get_cell(&self, handle: CellHandle) -> Result<&Cell, IndexError> {
        self.cells.get(handle.0).ok_or_else(|| {
            IndexError(format!(
                "tissue holds {} cells but cell {handle} was requested",
                self.cells.len()
            ))
        })
    }

    /// All cells ordered by their rank.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All divisions which happened so far in chronological order.
    pub fn division_log(&self) -> &[DivisionRecord] {
        &self.division_log
    }

    /// Parameters shared by all cells
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The step which will be performed next by [Tissue::run]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Separates two cells by removing them from each others neighbor sets and dropping
    /// all adhesion springs between them.
    ///
    /// Cells which are still in contact become neighbors again during the next
    /// [Tissue::update].
    pub fn peel_pair(&mut self, a: CellHandle, b: CellHandle) -> Result<(), IndexError> {
        self.get_cell(a)?;
        self.get_cell(b)?;
        self.cells[a.0].peel(b);
        self.cells[b.0].peel(a);
        Ok(())
    }

    /// Checks the invariants of all cells and that neighbor relations are symmetric.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (index, cell) in self.cells.iter().enumerate() {
            if cell.get_rank() != CellHandle(index) {
                return Err(InvariantError(format_error_message!(
                    "rank does not match index",
                    format!("cell {} is stored at index {index}", cell.get_rank())
                )));
            }
            cell.check_invariants()?;
            for neighbor in cell.get_neighbor_cells() {
                let symmetric = self
                    .cells
                    .get(neighbor.0)
                    .map(|other| other.get_neighbor_cells().contains(&cell.get_rank()))
                    .unwrap_or(false);
                if !symmetric {
                    return Err(InvariantError(format_error_message!(
                        "asymmetric neighbors",
                        format!(
                            "cell {} lists cell {neighbor} as neighbor but not vice versa",
                            cell.get_rank()
                        )
                    )));
                }
            }
        }
        Ok(())
    }

    /// Summaries of all cells ordered by their rank.
    pub fn summaries(&self) -> Vec<CellSummary> {
        self.cells.iter().map(|cell| cell.summary()).collect()
    }
}

impl TissueView for Tissue {
    fn get_cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.cells.get_cell(handle)
    }

    fn cells<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Cell> + 'a> {
        TissueView::cells(&self.cells)
    }
}

fn initialize_bar(total: usize) -> Result<kdam::Bar, SetupError> {
    let bar_format = "\
    {desc}{percentage:3.0}%|{animation}| \
    {count}/{total} \
    [{elapsed}, \
    {rate:.2}{unit}/s{postfix}]";
    kdam::BarBuilder::default()
        .total(total)
        .bar_format(bar_format)
        .dynamic_ncols(true)
        .build()
        .map_err(SetupError)
}
