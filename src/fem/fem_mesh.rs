use super::{edge_vertices, CellGeometry, FieldLayout, N_LOCAL_EQ};
use crate::base::{Config, Mobility, Segment, SimError, SEGMENT_TOLERANCE};
use gemlab::mesh::Mesh;
use gemlab::shapes::GeoKind;
use std::collections::HashMap;

/// Holds the data of an edge shared by one or two cells
#[derive(Clone, Debug)]
pub struct EdgeData {
    /// Endpoint ids sorted in ascending order
    pub points: [usize; 2],

    /// Cells sharing this edge (one or two)
    pub cells: Vec<usize>,

    /// Fixed (global) unit normal: the tangent from points[0] to points[1] rotated clockwise
    pub normal: [f64; 2],
}

/// Holds the data of an edge on the boundary of the domain
#[derive(Clone, Debug)]
pub struct BoundaryFacet {
    /// Index of the edge in `FemMesh::edges`
    pub edge: usize,

    /// Cell owning this facet
    pub cell: usize,

    /// Local edge index (0, 1, or 2) in the owning cell
    pub local_edge: usize,

    /// Boundary segment containing this facet
    pub segment: Segment,
}

/// Holds the mesh and the derived finite element data
///
/// Points, edges, and cells are numbered from zero. The ownership of the mesh stays with the caller.
pub struct FemMesh<'a> {
    /// Holds the mesh
    pub mesh: &'a Mesh,

    /// Holds the ids of the edges of each cell (local edge k connects local vertices k and (k+1)%3)
    pub cell_edges: Vec<[usize; 3]>,

    /// Holds all edges (sorted by endpoint ids)
    pub edges: Vec<EdgeData>,

    /// Holds the geometry and BDM basis of each cell
    pub geometry: Vec<CellGeometry>,

    /// Holds all boundary facets sorted by (segment, edge)
    pub boundary: Vec<BoundaryFacet>,

    /// Holds the numbering of the coupled unknown vector
    pub layout: FieldLayout,

    /// Holds the local-to-global maps of each cell
    pub local_to_global: Vec<Vec<usize>>,
}

impl<'a> FemMesh<'a> {
    /// Allocates a new instance
    ///
    /// The configuration is validated here and thus before any assembly takes place.
    pub fn new(mesh: &'a Mesh, config: &Config) -> Result<Self, SimError> {
        // check the configuration
        if let Some(msg) = config.validate() {
            return Err(SimError::Configuration(msg));
        }
        Mobility::new(config.mu_rel)?;
        if config.degree != 1 {
            return Err(SimError::Configuration(format!(
                "degree = {} is not available; only degree = 1 is implemented",
                config.degree
            )));
        }

        // check the mesh
        if mesh.ndim != 2 {
            return Err(SimError::Geometry("the mesh must be two-dimensional".to_string()));
        }
        if mesh.cells.is_empty() {
            return Err(SimError::Geometry("the mesh must have at least one cell".to_string()));
        }
        for (i, point) in mesh.points.iter().enumerate() {
            if point.id != i || point.coords.len() != 2 {
                return Err(SimError::Geometry(format!("point {} is inconsistent", i)));
            }
        }
        for (i, cell) in mesh.cells.iter().enumerate() {
            if cell.id != i || cell.kind != GeoKind::Tri3 || cell.points.len() != 3 {
                return Err(SimError::Geometry(format!("cell {} must be a Tri3 with id = {}", i, i)));
            }
            if cell.points.iter().any(|p| *p >= mesh.points.len()) {
                return Err(SimError::Geometry(format!("cell {} has an out-of-bounds point id", i)));
            }
        }

        // find the edges
        let mut map: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for cell in &mesh.cells {
            for k in 0..3 {
                let (i, j) = edge_vertices(k);
                let (a, b) = (cell.points[i], cell.points[j]);
                let key = if a < b { (a, b) } else { (b, a) };
                map.entry(key).or_insert_with(Vec::new).push(cell.id);
            }
        }
        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort();
        let mut edge_index = HashMap::new();
        let mut edges = Vec::with_capacity(keys.len());
        for (e, key) in keys.iter().enumerate() {
            let cells = map[key].clone();
            if cells.len() > 2 {
                return Err(SimError::Geometry(format!(
                    "edge ({}, {}) is shared by more than two cells",
                    key.0, key.1
                )));
            }
            let xa = &mesh.points[key.0].coords;
            let xb = &mesh.points[key.1].coords;
            let (tx, ty) = (xb[0] - xa[0], xb[1] - xa[1]);
            let len = f64::sqrt(tx * tx + ty * ty);
            if !(len > 0.0) {
                return Err(SimError::Geometry(format!("edge ({}, {}) has zero length", key.0, key.1)));
            }
            edge_index.insert(*key, e);
            edges.push(EdgeData {
                points: [key.0, key.1],
                cells,
                normal: [ty / len, -tx / len],
            });
        }

        // cell data
        let n_point = mesh.points.len();
        let n_cell = mesh.cells.len();
        let layout = FieldLayout::new(config.degree, edges.len(), n_cell, n_point);
        let mut cell_edges = Vec::with_capacity(n_cell);
        let mut geometry = Vec::with_capacity(n_cell);
        let mut local_to_global = Vec::with_capacity(n_cell);
        for cell in &mesh.cells {
            let mut ids = [0; 3];
            let mut normals = [[0.0; 2]; 3];
            for k in 0..3 {
                let (i, j) = edge_vertices(k);
                let (a, b) = (cell.points[i], cell.points[j]);
                let key = if a < b { (a, b) } else { (b, a) };
                ids[k] = edge_index[&key];
                normals[k] = edges[ids[k]].normal;
            }
            let coords = [0, 1, 2].map(|m| {
                let x = &mesh.points[cell.points[m]].coords;
                [x[0], x[1]]
            });
            let geo = CellGeometry::new(coords, &normals)
                .map_err(|e| SimError::Geometry(format!("cell {}: {}", cell.id, e)))?;
            let mut l2g = vec![0; N_LOCAL_EQ];
            for k in 0..3 {
                for a in [2 * k, 2 * k + 1] {
                    let p = cell.points[geo.bdm_vertex[a]];
                    let end = if p == edges[ids[k]].points[0] { 0 } else { 1 };
                    l2g[a] = layout.eq_u(ids[k], end);
                }
            }
            l2g[6] = layout.eq_p(cell.id);
            for m in 0..3 {
                l2g[7 + m] = layout.eq_s(cell.points[m]);
            }
            cell_edges.push(ids);
            geometry.push(geo);
            local_to_global.push(l2g);
        }

        // boundary facets
        let (xmin, xmax, ymin, ymax) = bounding_box(mesh);
        let tol = SEGMENT_TOLERANCE * f64::max(1.0, f64::max(xmax - xmin, ymax - ymin));
        let on = |v: f64, w: f64| f64::abs(v - w) <= tol;
        let mut boundary = Vec::new();
        for (e, edge) in edges.iter().enumerate() {
            if edge.cells.len() != 1 {
                continue;
            }
            let xa = &mesh.points[edge.points[0]].coords;
            let xb = &mesh.points[edge.points[1]].coords;
            let segment = if on(xa[0], xmin) && on(xb[0], xmin) {
                Segment::Left
            } else if on(xa[0], xmax) && on(xb[0], xmax) {
                Segment::Right
            } else if on(xa[1], ymin) && on(xb[1], ymin) {
                Segment::Bottom
            } else if on(xa[1], ymax) && on(xb[1], ymax) {
                Segment::Top
            } else {
                return Err(SimError::Geometry(format!(
                    "boundary edge ({}, {}) does not lie on any segment",
                    edge.points[0], edge.points[1]
                )));
            };
            let cell = edge.cells[0];
            let local_edge = match cell_edges[cell].iter().position(|id| *id == e) {
                Some(k) => k,
                None => return Err(SimError::Geometry(format!("cannot find edge {} in cell {}", e, cell))),
            };
            boundary.push(BoundaryFacet {
                edge: e,
                cell,
                local_edge,
                segment,
            });
        }
        boundary.sort_by_key(|f| (f.segment, f.edge));

        // done
        Ok(FemMesh {
            mesh,
            cell_edges,
            edges,
            geometry,
            boundary,
            layout,
            local_to_global,
        })
    }

    /// Returns the boundary facets on a segment
    pub fn facets_on(&self, segment: Segment) -> impl Iterator<Item = &BoundaryFacet> {
        self.boundary.iter().filter(move |f| f.segment == segment)
    }
}

/// Returns (xmin, xmax, ymin, ymax)
fn bounding_box(mesh: &Mesh) -> (f64, f64, f64, f64) {
    let mut bbox = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for point in &mesh.points {
        bbox.0 = f64::min(bbox.0, point.coords[0]);
        bbox.1 = f64::max(bbox.1, point.coords[0]);
        bbox.2 = f64::min(bbox.2, point.coords[1]);
        bbox.3 = f64::max(bbox.3, point.coords[1]);
    }
    bbox
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
