//! Hexahedral cell geometry: faces, centers and ray intersections

use serde::{Deserialize, Serialize};

use crate::types::Vec3;

/// Tolerance for ray/triangle tests and for merging hits on shared edges
const RAY_EPSILON: f64 = 1e-9;

/// One of the six faces of a structured-grid cell.
///
/// Corner numbering follows the IJK bits of each corner:
/// `0:(i,j,k) 1:(i+1,j,k) 2:(i+1,j+1,k) 3:(i,j+1,k)`, corners 4-7 repeat the
/// pattern at `k+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellFace {
    IPos,
    INeg,
    JPos,
    JNeg,
    KPos,
    KNeg,
}

impl CellFace {
    pub const ALL: [Self; 6] = [
        Self::IPos,
        Self::INeg,
        Self::JPos,
        Self::JNeg,
        Self::KPos,
        Self::KNeg,
    ];

    /// Corner indices of this face, in loop order.
    #[must_use]
    pub const fn corner_indices(self) -> [usize; 4] {
        match self {
            Self::IPos => [1, 2, 6, 5],
            Self::INeg => [0, 4, 7, 3],
            Self::JPos => [3, 7, 6, 2],
            Self::JNeg => [0, 1, 5, 4],
            Self::KPos => [4, 5, 6, 7],
            Self::KNeg => [0, 3, 2, 1],
        }
    }

    /// IJK step to the neighbor across this face
    #[must_use]
    pub const fn ijk_offset(self) -> [isize; 3] {
        match self {
            Self::IPos => [1, 0, 0],
            Self::INeg => [-1, 0, 0],
            Self::JPos => [0, 1, 0],
            Self::JNeg => [0, -1, 0],
            Self::KPos => [0, 0, 1],
            Self::KNeg => [0, 0, -1],
        }
    }
}

/// A ray hit on a cell boundary. `distance` is measured along the unit ray direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f64,
}

/// A single hexahedral grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub corners: [Vec3; 8],
    /// Local index of the host cell in the parent grid, for LGR cells
    #[serde(default)]
    pub parent_cell_index: Option<usize>,
    /// Index of the LGR refining this cell, if any
    #[serde(default)]
    pub sub_grid_index: Option<usize>,
}

impl Cell {
    #[must_use]
    pub const fn new(corners: [Vec3; 8]) -> Self {
        Self {
            corners,
            parent_cell_index: None,
            sub_grid_index: None,
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3::centroid(&self.corners)
    }

    #[must_use]
    pub fn face_corners(&self, face: CellFace) -> [Vec3; 4] {
        face.corner_indices().map(|i| self.corners[i])
    }

    #[must_use]
    pub fn face_center(&self, face: CellFace) -> Vec3 {
        Vec3::centroid(&self.face_corners(face))
    }

    /// Distance from the center to corner 0
    #[must_use]
    pub fn characteristic_size(&self) -> f64 {
        (self.corners[0] - self.center()).length()
    }

    /// All boundary crossings of the ray `origin + t * direction`, `t > 0`,
    /// sorted by distance. Hits that coincide (a ray through a face diagonal
    /// or a cell edge) are reported once.
    #[must_use]
    pub fn intersections(&self, origin: Vec3, direction: Vec3) -> Vec<RayHit> {
        let Some(dir) = direction.normalized() else {
            return Vec::new();
        };

        let mut hits: Vec<RayHit> = Vec::new();
        for face in CellFace::ALL {
            let [a, b, c, d] = self.face_corners(face);
            for tri in [[a, b, c], [a, c, d]] {
                if let Some(t) = ray_triangle_intersection(origin, dir, tri) {
                    hits.push(RayHit {
                        point: origin + dir * t,
                        distance: t,
                    });
                }
            }
        }

        hits.sort_by(|l, r| l.distance.total_cmp(&r.distance));
        hits.dedup_by(|l, r| (l.distance - r.distance).abs() < RAY_EPSILON.sqrt());
        hits
    }

    /// Odd number of boundary crossings on a ray toward the cell center.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        let center = self.center();
        let direction = center - point;
        if direction.length_squared() < RAY_EPSILON {
            return true;
        }
        self.intersections(point, direction).len() % 2 == 1
    }

    /// Where the straight line from the cell center toward `target` crosses
    /// the cell boundary. `None` if `target` is inside the cell or the line is
    /// degenerate.
    #[must_use]
    pub fn boundary_point_towards(&self, target: Vec3) -> Option<Vec3> {
        let center = self.center();
        let span = (target - center).length();
        self.intersections(center, target - center)
            .into_iter()
            .find(|hit| hit.distance <= span + RAY_EPSILON)
            .map(|hit| hit.point)
    }
}

/// Möller–Trumbore, two sided. Returns the ray parameter of the hit.
fn ray_triangle_intersection(origin: Vec3, dir: Vec3, tri: [Vec3; 3]) -> Option<f64> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - tri[0];
    let u = inv_det * s.dot(h);
    if !(-RAY_EPSILON..=1.0 + RAY_EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * dir.dot(q);
    if v < -RAY_EPSILON || u + v > 1.0 + RAY_EPSILON {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    (t > RAY_EPSILON).then_some(t)
}
