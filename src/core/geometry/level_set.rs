use crate::core::math::{Aabb, Vec3};

use super::Implicit;

/// Cell-centered uniform grid.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    min: Vec3,
    max: Vec3,
    counts: [usize; 3],
    dx: Vec3,
}

impl UniformGrid {
    /// Grid covering `[min, max]` with `counts` cells per axis, then padded by
    /// `ghost_cells` extra cells on every side.
    pub fn new(min: Vec3, max: Vec3, counts: [usize; 3], ghost_cells: usize) -> Self {
        let counts = [counts[0].max(1), counts[1].max(1), counts[2].max(1)];
        let dx = (max - min) / Vec3::new(counts[0] as f32, counts[1] as f32, counts[2] as f32);
        let pad = dx * ghost_cells as f32;
        Self {
            min: min - pad,
            max: max + pad,
            counts: [
                counts[0] + 2 * ghost_cells,
                counts[1] + 2 * ghost_cells,
                counts[2] + 2 * ghost_cells,
            ],
            dx,
        }
    }

    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    pub fn dx(&self) -> Vec3 {
        self.dx
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    pub fn cell_count(&self) -> usize {
        self.counts[0] * self.counts[1] * self.counts[2]
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.counts[1] + j) * self.counts[0] + i
    }

    #[inline]
    pub fn center(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.min + self.dx * Vec3::new(i as f32 + 0.5, j as f32 + 0.5, k as f32 + 0.5)
    }
}

/// Signed distance sampled on a uniform grid.
#[derive(Clone, Debug)]
pub struct LevelSet {
    grid: UniformGrid,
    phi: Vec<f32>,
}

impl LevelSet {
    /// Voxelize `object` by sampling its signed distance at every cell center.
    pub fn from_implicit(grid: UniformGrid, object: &Implicit) -> Self {
        let [nx, ny, nz] = grid.counts();
        let mut phi = vec![0.0f32; grid.cell_count()];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    phi[grid.index(i, j, k)] = object.signed_distance(grid.center(i, j, k));
                }
            }
        }
        Self { grid, phi }
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    /// Trilinear interpolation of the sampled field; points outside the grid add
    /// their distance to the grid box.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        let bounds = self.grid.bounds();
        let clamped = p.clamp(bounds.min, bounds.max);
        let outside = (p - clamped).length();

        let [nx, ny, nz] = self.grid.counts();
        let local = (clamped - bounds.min) / self.grid.dx() - Vec3::splat(0.5);
        let axis = |v: f32, n: usize| -> (usize, usize, f32) {
            let v = v.clamp(0.0, (n - 1) as f32);
            let i0 = v.floor() as usize;
            let i1 = (i0 + 1).min(n - 1);
            (i0, i1, v - i0 as f32)
        };
        let (i0, i1, fx) = axis(local.x, nx);
        let (j0, j1, fy) = axis(local.y, ny);
        let (k0, k1, fz) = axis(local.z, nz);

        let at = |i: usize, j: usize, k: usize| self.phi[self.grid.index(i, j, k)];
        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

        let c00 = lerp(at(i0, j0, k0), at(i1, j0, k0), fx);
        let c10 = lerp(at(i0, j1, k0), at(i1, j1, k0), fx);
        let c01 = lerp(at(i0, j0, k1), at(i1, j0, k1), fx);
        let c11 = lerp(at(i0, j1, k1), at(i1, j1, k1), fx);
        let c0 = lerp(c00, c10, fy);
        let c1 = lerp(c01, c11, fy);

        lerp(c0, c1, fz) + outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_cells_pad_grid() {
        let g = UniformGrid::new(Vec3::ZERO, Vec3::splat(10.0), [5, 5, 5], 1);
        assert_eq!(g.counts(), [7, 7, 7]);
        assert!((g.bounds().min.x + 2.0).abs() < 1e-5);
        assert!((g.dx().x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn sphere_level_set_is_close_to_analytic() {
        let sphere = Implicit::Sphere { center: Vec3::ZERO, radius: 5.0 };
        let grid = UniformGrid::new(Vec3::splat(-6.0), Vec3::splat(6.0), [12, 12, 12], 1);
        let ls = LevelSet::from_implicit(grid, &sphere);

        assert!(ls.signed_distance(Vec3::ZERO) < -4.0);
        assert!(ls.signed_distance(Vec3::new(5.0, 0.0, 0.0)).abs() < 0.5);
        assert!(ls.signed_distance(Vec3::new(20.0, 0.0, 0.0)) > 10.0);
    }
}
