use meristem::prelude::*;

use nalgebra::Vector2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Grows a cell with saturated WUS until it reports that it is ready to divide.
fn grown_cell(params: &Parameters) -> Cell {
    let mut cell =
        Cell::new(CellHandle(2), Vector2::new(3.0, 3.0), 1.0, 1, false, true, params).unwrap();
    cell.update_morphogens(&MorphogenSignal::Supplied { wus: 1e3, ck: 0.0 }, params);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut step = 1;
    while cell.division_check(params).is_none() {
        cell.update_cell_progress(step, &mut rng, params);
        step += 1;
        assert!(step < 10_000);
    }
    cell
}

fn ring(cell: &Cell) -> Vec<Vector2<f64>> {
    cell.wall_nodes().map(|(_, node)| node.pos()).collect()
}

fn edges(cell: &Cell) -> Vec<(Vector2<f64>, Vector2<f64>)> {
    let ring = ring(cell);
    (0..ring.len())
        .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
        .collect()
}

fn segments_cross(a: &(Vector2<f64>, Vector2<f64>), b: &(Vector2<f64>, Vector2<f64>)) -> bool {
    let orient = |p: &Vector2<f64>, q: &Vector2<f64>, r: &Vector2<f64>| (q - p).perp(&(r - p));
    orient(&a.0, &a.1, &b.0) * orient(&a.0, &a.1, &b.1) < 0.0
        && orient(&b.0, &b.1, &a.0) * orient(&b.0, &b.1, &a.1) < 0.0
}

/// Whether no two non-adjacent edges of the wall ring cross each other.
fn ring_is_simple(cell: &Cell) -> bool {
    let edges = edges(cell);
    let n = edges.len();
    (0..n).all(|i| {
        (i + 2..n)
            .filter(|&j| !(i == 0 && j == n - 1))
            .all(|j| !segments_cross(&edges[i], &edges[j]))
    })
}

fn fast_parameters() -> Parameters {
    let mut params = Parameters::default();
    params.growth.max_growth_rate = 20.0;
    // Keep the ring unchanged while growing
    params.growth.wall_check_interval = 0;
    params
}

#[test]
fn isotropic_cell_divides_into_two() -> Result<(), Box<dyn std::error::Error>> {
    let params = fast_parameters();
    let cell = grown_cell(&params);
    let n = cell.get_wall_count();
    let (parent, daughter) = cell.division(&params, CellHandle(9))?;

    assert_eq!(parent.get_wall_count() + daughter.get_wall_count(), n + 2);
    assert!(parent.get_wall_count() < n);
    assert!(daughter.get_wall_count() < n);
    parent.check_invariants()?;
    daughter.check_invariants()?;

    assert_eq!(parent.get_rank(), CellHandle(2));
    assert_eq!(daughter.get_rank(), CellHandle(9));
    assert_eq!(daughter.get_ancestry().parent(), Some(CellHandle(2)));
    assert_eq!(daughter.get_layer(), 1);
    assert!(daughter.is_stem());

    let on_wall = |c: &Cell| c.wall_nodes().filter(|(_, n)| n.is_on_division_wall()).count();
    assert_eq!(on_wall(&parent), 2);
    assert_eq!(on_wall(&daughter), 2);
    Ok(())
}

#[test]
fn division_through_the_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let params = fast_parameters();
    let mut cell = grown_cell(&params);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let n = cell.get_wall_count();
    assert_eq!(
        Cell::update_cycle(&mut rng, 1, &params, &mut cell),
        Some(CycleEvent::Division)
    );
    let daughter = Cell::divide(&params, &mut cell, CellHandle(3))?;
    // The division wall is subdivided right away
    assert!(cell.get_wall_count() + daughter.get_wall_count() > n + 2);
    for c in [&cell, &daughter] {
        c.check_invariants()?;
        for (p, q) in edges(c) {
            assert!((q - p).norm() <= params.growth.membrane_threshold);
        }
    }
    assert_eq!(cell.get_cell_progress(), 0.0);
    assert!(cell.division_check(&params).is_none());
    Ok(())
}

#[test]
fn divided_cells_relax_without_self_intersection() -> Result<(), Box<dyn std::error::Error>> {
    let mut cell = grown_cell(&fast_parameters());
    let params = Parameters::default();
    let area = cell.calc_area();
    let n = cell.get_wall_count();
    let daughter = Cell::divide(&params, &mut cell, CellHandle(3))?;
    let mut cells = vec![cell, daughter];

    let signal = MorphogenSignal::Supplied { wus: 0.0, ck: 0.0 };
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for step in 0..400 {
        for cell in cells.iter_mut() {
            cell.update_morphogens(&signal, &params);
        }
        let forces = cells
            .iter()
            .map(|cell| cell.compute_forces(&cells, &params))
            .collect::<Result<Vec<_>, _>>()?;
        for (cell, forces) in cells.iter_mut().zip(forces) {
            cell.apply_forces(forces);
            cell.update_node_locations(&params)?;
            assert_eq!(Cell::update_cycle(&mut rng, step, &params, cell), None);
        }
        for cell in cells.iter() {
            assert!(
                ring_is_simple(cell),
                "wall of cell {} crosses itself at step {step}",
                cell.get_rank()
            );
        }
    }

    let total: f64 = cells.iter().map(|cell| cell.calc_area()).sum();
    assert!(total < 2.5 * area, "area grew from {area} to {total}");
    for cell in cells.iter() {
        cell.check_invariants()?;
        assert!(cell.get_wall_count() < 2 * n);
        assert!(cell.get_cell_progress() < params.division.max_progress);
    }
    Ok(())
}

#[test]
fn failed_division_changes_nothing() {
    let mut params = fast_parameters();
    let cell = grown_cell(&params);
    // Neither half of the ring could hold this many nodes
    params.growth.min_wall_nodes = cell.get_wall_count();
    let before = cell.summary();
    for _ in 0..3 {
        assert!(cell.division(&params, CellHandle(1)).is_err());
        assert_eq!(cell.summary(), before);
    }
    assert_eq!(cell.get_cell_progress(), params.division.max_progress);
    assert!(cell.division_check(&params).is_some());
}

#[test]
fn unready_cell_does_not_divide() {
    let params = Parameters::default();
    let cell = Cell::new(CellHandle(0), Vector2::zeros(), 1.0, 0, false, false, &params).unwrap();
    assert!(cell.division_check(&params).is_none());
    assert!(cell.division(&params, CellHandle(1)).is_err());
}
