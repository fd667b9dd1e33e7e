use meristem::prelude::*;
use nalgebra::Vector2;

fn cell(radius: f64, params: &Parameters) -> Result<Cell, SetupError> {
    Cell::new(CellHandle(0), Vector2::new(1.0, -2.0), radius, 0, false, false, params)
}

fn assert_ring_closed(cell: &Cell) {
    cell.check_invariants().unwrap();
    let mut key = cell.get_left_corner();
    for _ in 0..cell.get_wall_count() {
        key = cell.wall_node(key).unwrap().right();
    }
    assert_eq!(key, cell.get_left_corner());
    assert_eq!(cell.wall_nodes().count(), cell.get_wall_count());
}

#[test]
fn insertion_and_deletion_keep_the_ring_closed() -> Result<(), Box<dyn std::error::Error>> {
    let params = Parameters::default();
    let mut cell = cell(1.0, &params)?;
    assert_ring_closed(&cell);
    let n = cell.get_wall_count();
    let corner = cell.get_left_corner();

    let new = cell.add_wall_node(corner)?;
    assert_ring_closed(&cell);
    assert_eq!(cell.get_wall_count(), n + 1);
    assert_eq!(cell.wall_node(corner).unwrap().right(), new);

    cell.delete_wall_node(new, &params)?;
    assert_ring_closed(&cell);
    assert_eq!(cell.get_wall_count(), n);
    assert_eq!(cell.get_left_corner(), corner);
    assert!(cell.wall_node(new).is_none());
    Ok(())
}

#[test]
fn deleting_the_left_corner_moves_it_right() -> Result<(), Box<dyn std::error::Error>> {
    let params = Parameters::default();
    let mut cell = cell(1.0, &params)?;
    let corner = cell.get_left_corner();
    let right = cell.wall_node(corner).unwrap().right();
    cell.delete_wall_node(corner, &params)?;
    assert_eq!(cell.get_left_corner(), right);
    assert_ring_closed(&cell);
    Ok(())
}

#[test]
fn ring_never_drops_below_minimum() -> Result<(), Box<dyn std::error::Error>> {
    let mut params = Parameters::default();
    params.growth.min_wall_nodes = 5;
    params.mechanics.membrane_rest_length = 1.0;
    let mut cell = cell(1.0, &params)?;
    assert_eq!(cell.get_wall_count(), 6);
    cell.delete_wall_node(cell.get_left_corner(), &params)?;
    assert_eq!(cell.get_wall_count(), 5);
    assert!(cell.delete_wall_node(cell.get_left_corner(), &params).is_err());
    assert_eq!(cell.get_wall_count(), 5);
    assert_ring_closed(&cell);
    Ok(())
}

#[test]
fn ring_is_counter_clockwise() -> Result<(), Box<dyn std::error::Error>> {
    let params = Parameters::default();
    let cell = cell(2.0, &params)?;
    assert!(cell.calc_area() > 0.0);
    let center = cell.get_cell_center();
    for (key, node) in cell.wall_nodes() {
        let next = cell.wall_node_position(node.right()).unwrap();
        let own = cell.wall_node_position(key).unwrap();
        let cross = (own - center).perp(&(next - center));
        assert!(cross > 0.0);
    }
    Ok(())
}
