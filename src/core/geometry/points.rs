use std::collections::HashMap;

use crate::core::math::Vec3;

/// Collapse points closer than `snap_distance` to an already kept point.
///
/// Keeps the first point of every cluster in input order. A non-positive snap
/// distance keeps everything.
pub fn clean_collision_points(points: &[Vec3], snap_distance: f32) -> Vec<Vec3> {
    if snap_distance <= 0.0 {
        return points.to_vec();
    }

    let inv_cell = 1.0 / snap_distance;
    let snap2 = snap_distance * snap_distance;
    let mut buckets: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();
    let mut kept: Vec<Vec3> = Vec::with_capacity(points.len());

    for &p in points {
        let cell = (
            (p.x * inv_cell).floor() as i32,
            (p.y * inv_cell).floor() as i32,
            (p.z * inv_cell).floor() as i32,
        );

        let mut duplicate = false;
        'search: for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let key = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    if let Some(ids) = buckets.get(&key) {
                        if ids.iter().any(|&id| kept[id].distance_squared(p) < snap2) {
                            duplicate = true;
                            break 'search;
                        }
                    }
                }
            }
        }

        if !duplicate {
            buckets.entry(cell).or_default().push(kept.len());
            kept.push(p);
        }
    }

    kept
}
