use crate::core::geometry::{Geometry, GeometryHandle};
use crate::core::math::{inverse_diagonal, Mat3, Quat, RigidTransform, Vec3};

/// Stable handle into [`ParticleStore`].
pub type ParticleIndex = usize;

/// Rigid particles stored as parallel arrays.
///
/// `x`/`r` hold the transform at the start of the step, `p`/`q` the predicted
/// transform being solved this step. `pre_v`/`pre_w` are the velocities at the
/// start of the step and are what a rewind restores.
#[derive(Default)]
pub struct ParticleStore {
    pub x: Vec<Vec3>,
    pub r: Vec<Quat>,
    pub p: Vec<Vec3>,
    pub q: Vec<Quat>,
    pub v: Vec<Vec3>,
    pub w: Vec<Vec3>,
    pub pre_v: Vec<Vec3>,
    pub pre_w: Vec<Vec3>,
    pub m: Vec<f32>,
    pub inv_m: Vec<f32>,
    /// Principal-frame inertia (diagonal).
    pub i: Vec<Mat3>,
    pub inv_i: Vec<Mat3>,
    pub disabled: Vec<bool>,
    pub sleeping: Vec<bool>,
    pub island: Vec<Option<usize>>,
    pub geometry: Vec<Option<GeometryHandle>>,
    /// Local-space collision points, if the body carries any.
    pub collision_points: Vec<Option<Vec<Vec3>>>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append `n` default particles and return the index of the first one.
    pub fn add_particles(&mut self, n: usize) -> ParticleIndex {
        let first = self.len();
        let new_len = first + n;
        self.x.resize(new_len, Vec3::ZERO);
        self.r.resize(new_len, Quat::IDENTITY);
        self.p.resize(new_len, Vec3::ZERO);
        self.q.resize(new_len, Quat::IDENTITY);
        self.v.resize(new_len, Vec3::ZERO);
        self.w.resize(new_len, Vec3::ZERO);
        self.pre_v.resize(new_len, Vec3::ZERO);
        self.pre_w.resize(new_len, Vec3::ZERO);
        self.m.resize(new_len, 0.0);
        self.inv_m.resize(new_len, 0.0);
        self.i.resize(new_len, Mat3::ZERO);
        self.inv_i.resize(new_len, Mat3::ZERO);
        self.disabled.resize(new_len, false);
        self.sleeping.resize(new_len, false);
        self.island.resize(new_len, None);
        self.geometry.resize(new_len, None);
        self.collision_points.resize(new_len, None);
        first
    }

    /// Size the collision point cloud of `index` to `n` points, creating it if needed.
    pub fn resize_collision_points(&mut self, index: ParticleIndex, n: usize) {
        self.collision_points[index]
            .get_or_insert_with(Vec::new)
            .resize(n, Vec3::ZERO);
    }

    pub fn set_sleeping(&mut self, index: ParticleIndex, sleeping: bool) {
        self.sleeping[index] = sleeping;
    }

    /// Transform at the start of the step.
    pub fn world_transform(&self, index: ParticleIndex) -> RigidTransform {
        RigidTransform::new(self.x[index], self.r[index])
    }

    /// Transform currently being solved.
    pub fn predicted_transform(&self, index: ParticleIndex) -> RigidTransform {
        RigidTransform::new(self.p[index], self.q[index])
    }

    /// Give a body without inverse mass a real one, from its mass and principal inertia.
    pub fn restore_inverse_mass(&mut self, index: ParticleIndex) {
        if self.inv_m[index] == 0.0 && self.m[index] > 0.0 {
            self.inv_m[index] = 1.0 / self.m[index];
            self.inv_i[index] = inverse_diagonal(self.i[index]);
        }
    }

    /// Add a body from a descriptor and return its index.
    pub fn add_body(&mut self, desc: BodyDesc) -> ParticleIndex {
        let index = self.add_particles(1);
        self.x[index] = desc.position;
        self.r[index] = desc.rotation;
        self.p[index] = desc.position;
        self.q[index] = desc.rotation;
        self.v[index] = desc.velocity;
        self.w[index] = desc.angular_velocity;
        self.pre_v[index] = desc.velocity;
        self.pre_w[index] = desc.angular_velocity;
        self.m[index] = desc.mass;
        self.i[index] = Mat3::from_diagonal(desc.inertia);
        if desc.kinematic || desc.mass <= 0.0 {
            self.inv_m[index] = 0.0;
            self.inv_i[index] = Mat3::ZERO;
        } else {
            self.inv_m[index] = 1.0 / desc.mass;
            self.inv_i[index] = inverse_diagonal(self.i[index]);
        }
        self.island[index] = desc.island;
        self.geometry[index] = desc.geometry;
        self.collision_points[index] = desc.collision_points;
        index
    }
}

/// Description of a rigid body to insert into a [`ParticleStore`].
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    /// Principal moments of inertia.
    pub inertia: Vec3,
    /// Zero inverse mass: the body is driven, not simulated.
    pub kinematic: bool,
    pub island: Option<usize>,
    pub geometry: Option<GeometryHandle>,
    pub collision_points: Option<Vec<Vec3>>,
}

impl BodyDesc {
    /// Solid box with its eight corners as collision points.
    pub fn cuboid(half_extents: Vec3, mass: f32) -> Self {
        let h2 = half_extents * half_extents;
        let inertia = Vec3::new(h2.y + h2.z, h2.x + h2.z, h2.x + h2.y) * (mass / 3.0);
        let mut corners = Vec::with_capacity(8);
        for i in 0..8 {
            corners.push(Vec3::new(
                if i & 1 == 0 { -half_extents.x } else { half_extents.x },
                if i & 2 == 0 { -half_extents.y } else { half_extents.y },
                if i & 4 == 0 { -half_extents.z } else { half_extents.z },
            ));
        }
        Self {
            mass,
            inertia,
            geometry: Some(Geometry::cuboid(half_extents).into_handle()),
            collision_points: Some(corners),
            ..Self::empty()
        }
    }

    /// Solid sphere with six axis-extreme collision points.
    pub fn sphere(radius: f32, mass: f32) -> Self {
        let inertia = Vec3::splat(0.4 * mass * radius * radius);
        let points = vec![
            Vec3::X * radius,
            -Vec3::X * radius,
            Vec3::Y * radius,
            -Vec3::Y * radius,
            Vec3::Z * radius,
            -Vec3::Z * radius,
        ];
        Self {
            mass,
            inertia,
            geometry: Some(Geometry::sphere(Vec3::ZERO, radius).into_handle()),
            collision_points: Some(points),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            inertia: Vec3::ONE,
            kinematic: false,
            island: None,
            geometry: None,
            collision_points: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn in_island(mut self, island: usize) -> Self {
        self.island = Some(island);
        self
    }

    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryHandle) -> Self {
        self.geometry = Some(geometry);
        self
    }
}
