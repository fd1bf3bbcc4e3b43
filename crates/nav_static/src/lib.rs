//! nav_static: walkable-surface triangles + nearest-point queries.
//!
//! The index is a flat triangle soup with per-triangle AABBs. A query takes
//! a point and a search half-extent, prefilters triangles by AABB overlap,
//! computes the closest point on each survivor, and returns the nearest one
//! that still lies inside the search box. Queries are synchronous and
//! idempotent; there is no partial result beyond "nearest or nothing".

use glam::Vec3;
use smallvec::SmallVec;
use viewer_core::walkable::WalkableQuery;

#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn around(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    #[must_use]
    pub fn of_triangle(t: &Triangle) -> Self {
        Self {
            min: t.a.min(t.b).min(t.c),
            max: t.a.max(t.b).max(t.c),
        }
    }

    #[must_use]
    pub fn overlaps(&self, o: &Aabb) -> bool {
        !(self.max.x < o.min.x
            || self.min.x > o.max.x
            || self.max.y < o.min.y
            || self.min.y > o.max.y
            || self.max.z < o.min.z
            || self.min.z > o.max.z)
    }

    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Closest point on the triangle to `p` (vertex/edge/face regions).
    #[must_use]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = p - self.a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        let bp = p - self.b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v;
        }

        let cp = p - self.c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }
}

/// Walkable-surface index over a triangle soup.
#[derive(Clone, Debug, Default)]
pub struct WalkableIndex {
    tris: Vec<Triangle>,
    aabbs: Vec<Aabb>,
}

impl WalkableIndex {
    pub fn insert(&mut self, t: Triangle) {
        self.aabbs.push(Aabb::of_triangle(&t));
        self.tris.push(t);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tris.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// Build from an indexed mesh, keeping only triangles flat enough to
    /// stand on: unit normal Y at or above `cos(max_slope_deg)`. Degenerate
    /// triangles are skipped.
    #[must_use]
    pub fn from_mesh(positions: &[[f32; 3]], indices: &[u32], max_slope_deg: f32) -> Self {
        let min_ny = max_slope_deg.to_radians().cos();
        let mut idx = Self::default();
        for tri in indices.chunks_exact(3) {
            let fetch = |i: u32| positions.get(i as usize).map(|p| Vec3::from_array(*p));
            let (Some(a), Some(b), Some(c)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
                continue;
            };
            let t = Triangle { a, b, c };
            let n = t.normal();
            if n == Vec3::ZERO || n.y < min_ny {
                continue;
            }
            idx.insert(t);
        }
        idx
    }

    fn gather_in_box(&self, query: &Aabb, out: &mut SmallVec<[usize; 16]>) {
        for (i, bb) in self.aabbs.iter().enumerate() {
            if bb.overlaps(query) {
                out.push(i);
            }
        }
    }

    /// Nearest walkable point to `point` within the axis-aligned search box
    /// of the given half-extent, or `None` if no candidate lies inside.
    #[must_use]
    pub fn nearest_in_box(&self, point: Vec3, half_extent: Vec3) -> Option<Vec3> {
        let query = Aabb::around(point, half_extent);
        let mut hits: SmallVec<[usize; 16]> = SmallVec::new();
        self.gather_in_box(&query, &mut hits);

        let mut best: Option<(f32, Vec3)> = None;
        for i in hits {
            let cp = self.tris[i].closest_point(point);
            if !query.contains(cp) {
                continue;
            }
            let d2 = cp.distance_squared(point);
            if best.is_none_or(|(bd, _)| d2 < bd) {
                best = Some((d2, cp));
            }
        }
        best.map(|(_, p)| p)
    }
}

impl WalkableQuery for WalkableIndex {
    fn nearest_walkable(&self, point: Vec3, half_extent: Vec3) -> Option<Vec3> {
        self.nearest_in_box(point, half_extent)
    }
}
