use crate::core::geometry::{
    clean_collision_points, Geometry, GeometryHandle, ImplicitKind, Implicit, LevelSet, UniformGrid,
};
use crate::core::math::{RigidTransform, Vec3};
use crate::domain::ClusteringConfig;

/// One child as seen from the cluster frame.
pub(crate) struct ChildShape<'a> {
    pub geometry: Option<&'a GeometryHandle>,
    /// Child frame relative to the cluster frame.
    pub frame: RigidTransform,
    pub points: Option<&'a [Vec3]>,
}

pub(crate) struct UnifiedGeometry {
    pub geometry: Geometry,
    /// Deduplicated collision points in the cluster frame.
    pub points: Vec<Vec3>,
}

/// Union the children's shapes and points into one cluster-local geometry.
pub(crate) fn unify_children(config: &ClusteringConfig, children: &[ChildShape<'_>]) -> UnifiedGeometry {
    debug_assert!(!children.is_empty(), "cluster geometry built from no children");

    let mut objects = Vec::with_capacity(children.len());
    let mut raw_points = Vec::new();
    let mut opaque = false;

    for child in children {
        if let Some(handle) = child.geometry {
            opaque |= handle.kind() == ImplicitKind::Opaque;
            objects.push(Implicit::Transformed {
                object: handle.clone(),
                transform: child.frame,
            });
        }
        if let Some(points) = child.points {
            raw_points.extend(points.iter().map(|&p| child.frame.transform_point(p)));
        }
    }

    let mut points = clean_collision_points(&raw_points, config.snap_distance);
    let union = Implicit::Union(objects);

    let implicit = if config.use_level_set {
        voxelize(config, union, &mut points)
    } else {
        union
    };

    UnifiedGeometry {
        geometry: Geometry { implicit, ignore_analytic_collisions: opaque },
        points,
    }
}

/// Level set for large unions, bounding sphere for small ones.
fn voxelize(config: &ClusteringConfig, union: Implicit, points: &mut Vec<Vec3>) -> Implicit {
    let Some(bounds) = union.bounding_box() else {
        return union;
    };
    let extents = bounds.extents();

    if extents.min_element() < config.min_level_set_size {
        return Implicit::Sphere {
            center: bounds.center(),
            radius: extents.length() * 0.5,
        };
    }

    // Unvalidated configs may carry min > max; the upper bound wins.
    let cells = |extent: f32| -> usize {
        ((extent / config.min_level_set_size) as usize)
            .max(config.min_level_set_dimension)
            .min(config.max_level_set_dimension)
    };
    let grid = UniformGrid::new(
        bounds.min,
        bounds.max,
        [cells(extents.x), cells(extents.y), cells(extents.z)],
        config.level_set_ghost_cells,
    );
    let level_set = LevelSet::from_implicit(grid, &union);

    prune_interior_points(config, &level_set, points);
    Implicit::LevelSet(level_set)
}

/// Drop points deeper than one cell below the surface, never leaving fewer than
/// `min_cleaned_points_before_removing_internals`.
fn prune_interior_points(config: &ClusteringConfig, level_set: &LevelSet, points: &mut Vec<Vec3>) {
    let depth = level_set.grid().dx().max_element();
    let mut budget = points
        .len()
        .saturating_sub(config.min_cleaned_points_before_removing_internals);
    if budget == 0 {
        return;
    }

    let mut drop = vec![false; points.len()];
    for (idx, p) in points.iter().enumerate().rev() {
        if budget == 0 {
            break;
        }
        if level_set.signed_distance(*p) < -depth {
            drop[idx] = true;
            budget -= 1;
        }
    }

    let mut flags = drop.into_iter();
    points.retain(|_| !flags.next().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec3;

    fn cube(half: f32) -> GeometryHandle {
        Geometry::cuboid(Vec3::splat(half)).into_handle()
    }

    #[test]
    fn plain_union_keeps_every_child() {
        let g = cube(1.0);
        let pts = [Vec3::ZERO];
        let children = [
            ChildShape { geometry: Some(&g), frame: RigidTransform::from_translation(Vec3::new(-1.0, 0.0, 0.0)), points: Some(&pts) },
            ChildShape { geometry: Some(&g), frame: RigidTransform::from_translation(Vec3::new(1.0, 0.0, 0.0)), points: Some(&pts) },
        ];
        let out = unify_children(&ClusteringConfig::default(), &children);

        match &out.geometry.implicit {
            Implicit::Union(objects) => assert_eq!(objects.len(), 2),
            other => panic!("expected union, got {:?}", other.kind()),
        }
        assert_eq!(out.points.len(), 2);
        assert!(!out.geometry.ignore_analytic_collisions);
    }

    #[test]
    fn snapped_points_are_merged() {
        let g = cube(1.0);
        let pts = [Vec3::new(1.0, 0.0, 0.0)];
        let children = [
            ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: Some(&pts) },
            ChildShape { geometry: Some(&g), frame: RigidTransform::from_translation(Vec3::new(0.1, 0.0, 0.0)), points: Some(&pts) },
        ];
        let out = unify_children(&ClusteringConfig::default(), &children);
        assert_eq!(out.points.len(), 1);
    }

    #[test]
    fn small_voxelized_union_falls_back_to_sphere() {
        let g = cube(1.0);
        let config = ClusteringConfig { use_level_set: true, ..ClusteringConfig::default() };
        let children = [ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: None }];
        let out = unify_children(&config, &children);

        match out.geometry.implicit {
            Implicit::Sphere { radius, .. } => assert!((radius - 3.0f32.sqrt()).abs() < 1e-4),
            other => panic!("expected sphere, got {:?}", other.kind()),
        }
    }

    #[test]
    fn large_voxelized_union_prunes_interior_points() {
        let g = cube(50.0);
        let config = ClusteringConfig {
            use_level_set: true,
            min_level_set_size: 10.0,
            min_cleaned_points_before_removing_internals: 2,
            ..ClusteringConfig::default()
        };

        // Eight corners plus a grid of deep interior points.
        let mut pts: Vec<Vec3> = (0..8)
            .map(|i| Vec3::new(
                if i & 1 == 0 { -50.0 } else { 50.0 },
                if i & 2 == 0 { -50.0 } else { 50.0 },
                if i & 4 == 0 { -50.0 } else { 50.0 },
            ))
            .collect();
        for x in [-20.0, 0.0, 20.0] {
            for y in [-20.0, 0.0, 20.0] {
                pts.push(Vec3::new(x, y, 0.0));
            }
        }

        let children = [ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: Some(&pts) }];
        let out = unify_children(&config, &children);

        match &out.geometry.implicit {
            Implicit::LevelSet(ls) => {
                // 100 / 10 = 10 cells plus one ghost cell per side.
                assert_eq!(ls.grid().counts(), [12, 12, 12]);
            }
            other => panic!("expected level set, got {:?}", other.kind()),
        }
        assert_eq!(out.points.len(), 8);
    }

    #[test]
    fn inverted_dimension_bounds_use_the_maximum() {
        let g = cube(50.0);
        let config = ClusteringConfig {
            use_level_set: true,
            min_level_set_size: 10.0,
            min_level_set_dimension: 16,
            max_level_set_dimension: 6,
            ..ClusteringConfig::default()
        };
        let children = [ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: None }];
        let out = unify_children(&config, &children);

        match &out.geometry.implicit {
            Implicit::LevelSet(ls) => assert_eq!(ls.grid().counts(), [8, 8, 8]),
            other => panic!("expected level set, got {:?}", other.kind()),
        }
    }

    #[test]
    fn few_points_are_never_pruned() {
        let g = cube(50.0);
        let config = ClusteringConfig {
            use_level_set: true,
            min_level_set_size: 10.0,
            ..ClusteringConfig::default()
        };
        let pts = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)];
        let children = [ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: Some(&pts) }];
        let out = unify_children(&config, &children);
        assert_eq!(out.points.len(), 2);
    }

    #[test]
    fn opaque_child_disables_analytic_collisions() {
        let opaque = Geometry::opaque(None).into_handle();
        let g = cube(1.0);
        let children = [
            ChildShape { geometry: Some(&g), frame: RigidTransform::IDENTITY, points: None },
            ChildShape { geometry: Some(&opaque), frame: RigidTransform::IDENTITY, points: None },
        ];
        let out = unify_children(&ClusteringConfig::default(), &children);
        assert!(out.geometry.ignore_analytic_collisions);
    }
}
