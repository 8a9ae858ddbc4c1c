use super::*;
use crate::core::math::Vec3;

const DT: f32 = 1.0 / 60.0;

fn row_world() -> (WorldCore, Vec<ParticleIndex>, ParticleIndex) {
    let config = ClusteringConfig { contact_thickening: 0.5, ..ClusteringConfig::default() };
    let mut world = WorldCore::with_config(config);
    let children: Vec<ParticleIndex> = [0.0, 2.0, 4.0]
        .iter()
        .map(|&x| world.add_body(BodyDesc::cuboid(Vec3::splat(1.0), 1.0).at(Vec3::new(x, 50.0, 0.0))))
        .collect();
    for &c in &children {
        world.set_strain_threshold(c, 10.0);
    }
    let parent = world.create_cluster(&children).expect("valid cluster");
    (world, children, parent)
}

#[test]
fn falling_box_rests_on_the_ground() {
    let mut world = WorldCore::new();
    let body = world.add_body(BodyDesc::cuboid(Vec3::splat(1.0), 1.0).at(Vec3::new(0.0, 5.0, 0.0)));

    for _ in 0..120 {
        world.step(DT);
    }

    assert_eq!(world.frame(), 120);
    assert!(world.particles().x[body].y >= 1.0 - 1e-3);
    assert!(world.particles().x[body].y < 5.0);
}

#[test]
fn impact_breaks_off_the_struck_child() {
    let (mut world, children, parent) = row_world();
    world.queue_impact(parent, Vec3::new(-1.0, 50.0, 0.0), Vec3::X * 100.0);

    let activated = world.step(DT);

    assert_eq!(activated.len(), 2);
    assert!(activated.contains(&children[0]));
    assert!(world.particles().disabled[parent]);
    assert!(!world.particles().disabled[children[0]]);
    assert!(!world.clustering().is_cluster_parent(parent));

    let internal = activated.iter().copied().find(|&i| i != children[0]).unwrap();
    assert!(world.clustering().is_internal(internal));
    assert_eq!(world.clustering().children(internal), &[children[1], children[2]]);
    assert!((world.particles().m[internal] - 2.0).abs() < 1e-5);
    assert!(world.islands().island_particles[DEFAULT_ISLAND].contains(&internal));
    assert!(!world.islands().island_particles[DEFAULT_ISLAND].contains(&parent));

    let stats = world.get_step_stats();
    assert_eq!(stats.clusters_broken(), 1);
    assert_eq!(stats.children_released(), 1);
    assert_eq!(stats.internal_clusters_created(), 1);
    assert_eq!(stats.islands_rewound(), 1);
}

#[test]
fn quiet_step_changes_nothing() {
    let (mut world, children, parent) = row_world();
    assert!(world.step(DT).is_empty());
    assert!(!world.particles().disabled[parent]);
    for &c in &children {
        assert_eq!(world.clustering().cluster_id(c), Some(parent));
    }
}

#[test]
fn deactivate_returns_sorted_children() {
    let (mut world, children, parent) = row_world();
    assert_eq!(world.deactivate_cluster(parent), children);
    assert!(world.deactivate_cluster(parent).is_empty());
    assert!(world.deactivate_cluster(children[0]).is_empty());
}

#[test]
fn create_cluster_rejects_bad_requests() {
    let (mut world, children, parent) = row_world();
    let loose = world.add_body(BodyDesc::sphere(1.0, 1.0));

    assert!(world.create_cluster(&[]).is_err());
    assert!(world.create_cluster(&[loose, loose]).is_err());
    assert!(world.create_cluster(&[loose, 999]).is_err());
    assert!(world.create_cluster(&[loose, children[0]]).is_err());
    assert!(world.create_cluster(&[loose, parent]).is_ok());
}

#[test]
fn config_round_trips_through_json() {
    let mut world = WorldCore::new();
    world
        .load_config_json(r#"{"use_connectivity": false, "snap_distance": 2.5}"#)
        .expect("valid config");
    assert!(!world.clustering().config().use_connectivity);
    assert!(world.config_json().contains("\"snap_distance\":2.5"));

    assert!(world.load_config_json("{ not json").is_err());
    assert!(world
        .load_config_json(r#"{"min_level_set_dimension": 30, "max_level_set_dimension": 4}"#)
        .is_err());
    assert!(!world.clustering().config().use_connectivity);
}
