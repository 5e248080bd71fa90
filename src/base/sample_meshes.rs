use gemlab::mesh::{Cell, Mesh, Point};
use gemlab::shapes::GeoKind;

/// Holds sample meshes of triangles (Tri3)
pub struct SampleMeshes {}

impl SampleMeshes {
    /// Generates a structured mesh of the unit square with `2 nx ny` triangles
    pub fn unit_square(nx: usize, ny: usize) -> Mesh {
        SampleMeshes::rectangle(0.0, 1.0, 0.0, 1.0, nx, ny)
    }

    /// Generates a structured mesh of a rectangle with `2 nx ny` triangles
    ///
    /// Each rectangular block is split along its diagonal from the lower-left to the upper-right corner:
    ///
    /// ```text
    ///  d-----c
    ///  | [1]/|
    ///  |  /  |
    ///  |/ [0]|
    ///  a-----b
    /// ```
    ///
    /// The points are numbered row by row, starting at (xmin, ymin).
    /// All cells are counterclockwise and have attribute 1.
    pub fn rectangle(xmin: f64, xmax: f64, ymin: f64, ymax: f64, nx: usize, ny: usize) -> Mesh {
        let (nx, ny) = (usize::max(nx, 1), usize::max(ny, 1));
        let (dx, dy) = ((xmax - xmin) / (nx as f64), (ymax - ymin) / (ny as f64));
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..(ny + 1) {
            for i in 0..(nx + 1) {
                // use exact values at the far sides to make the boundary search robust
                let x = if i == nx { xmax } else { xmin + (i as f64) * dx };
                let y = if j == ny { ymax } else { ymin + (j as f64) * dy };
                let id = points.len();
                points.push(Point {
                    id,
                    marker: 0,
                    coords: vec![x, y],
                });
            }
        }
        let mut cells = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let a = i + j * (nx + 1);
                let b = a + 1;
                let c = b + nx + 1;
                let d = a + nx + 1;
                for tri in [[a, b, c], [a, c, d]] {
                    let id = cells.len();
                    cells.push(Cell {
                        id,
                        attribute: 1,
                        kind: GeoKind::Tri3,
                        points: tri.to_vec(),
                    });
                }
            }
        }
        Mesh { ndim: 2, points, cells }
    }

    /// Returns a mesh of the unit square with two triangles
    #[rustfmt::skip]
    pub fn two_tri3() -> Mesh {
        //      y
        //      ^
        // 1.0  3------------2
        //      |        .'  |    [#] indicates id
        //      |  [1] .'    |    (#) indicates attribute
        //      |  (1).'     |
        //      |   .'  [0]  |
        //      | .'    (1)  |
        //      |'           |
        // 0.0  0------------1 -> x
        //     0.0          1.0
        Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Tri3, points: vec![0, 1, 2] },
                Cell { id: 1, attribute: 1, kind: GeoKind::Tri3, points: vec![0, 2, 3] },
            ],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleMeshes;

    #[test]
    fn unit_square_works() {
        let mesh = SampleMeshes::unit_square(2, 3);
        assert_eq!(mesh.ndim, 2);
        assert_eq!(mesh.points.len(), 12);
        assert_eq!(mesh.cells.len(), 12);
        assert_eq!(mesh.points[11].coords, &[1.0, 1.0]);
        assert_eq!(mesh.points[3].coords[1], 1.0 / 3.0);
        assert_eq!(mesh.cells[0].points, &[0, 1, 4]);
        assert_eq!(mesh.cells[1].points, &[0, 4, 3]);
        // all cells are counterclockwise
        for cell in &mesh.cells {
            let x0 = &mesh.points[cell.points[0]].coords;
            let x1 = &mesh.points[cell.points[1]].coords;
            let x2 = &mesh.points[cell.points[2]].coords;
            let det = (x1[0] - x0[0]) * (x2[1] - x0[1]) - (x2[0] - x0[0]) * (x1[1] - x0[1]);
            assert!(det > 0.0);
        }
    }

    #[test]
    fn two_tri3_covers_unit_square() {
        let mesh = SampleMeshes::two_tri3();
        let mut area = 0.0;
        for cell in &mesh.cells {
            let x0 = &mesh.points[cell.points[0]].coords;
            let x1 = &mesh.points[cell.points[1]].coords;
            let x2 = &mesh.points[cell.points[2]].coords;
            area += 0.5 * ((x1[0] - x0[0]) * (x2[1] - x0[1]) - (x2[0] - x0[0]) * (x1[1] - x0[1]));
        }
        assert_eq!(area, 1.0);
    }
}
