//! Entity factory: builds the eight court bodies (two hippos, ball, net,
//! four screen edges) with their shapes, materials and collision filters.

use glam::Vec2;
use rapier2d::prelude::{Group, InteractionGroups};

use crate::config::{
    self, MatchConfig, BALL_DENSITY, BALL_RESTITUTION, HIPPO_DENSITY, HIPPO_RESTITUTION,
    NET_RESTITUTION, NET_SCALE, WALL_RESTITUTION,
};
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
use crate::types::{BodyRole, Side};

/// Collision categories. Hippos never collide with each other: the hippo
/// filter admits only the ball and the world.
pub const HIPPO_GROUP: Group = Group::GROUP_1;
pub const BALL_GROUP: Group = Group::GROUP_2;
pub const WORLD_GROUP: Group = Group::GROUP_3;

const HIPPO_FILTER: InteractionGroups =
    InteractionGroups::new(HIPPO_GROUP, BALL_GROUP.union(WORLD_GROUP));
const BALL_FILTER: InteractionGroups =
    InteractionGroups::new(BALL_GROUP, HIPPO_GROUP.union(WORLD_GROUP));
const NET_FILTER: InteractionGroups =
    InteractionGroups::new(WORLD_GROUP, BALL_GROUP.union(HIPPO_GROUP));
const EDGE_FILTER: InteractionGroups = InteractionGroups::new(WORLD_GROUP, Group::ALL);

/// Hippo serve position, measured in sprite widths/heights from center court.
const HIPPO_START_X_SPRITES: f32 = 4.0;
const HIPPO_START_Y_SPRITES: f32 = 5.1;
/// Bottom of the net sprite, pixels from center court.
const NET_BASE_Y_PX: f32 = -525.0;

/// The court's rigid bodies. Created once at match construction; only their
/// transforms and velocities are reset between rounds.
pub struct Court {
    left_hippo: PhysicsBody,
    right_hippo: PhysicsBody,
    ball: PhysicsBody,
    net: PhysicsBody,
    floor: PhysicsBody,
    ceiling: PhysicsBody,
    left_wall: PhysicsBody,
    right_wall: PhysicsBody,
    left_hippo_start: Vec2,
    right_hippo_start: Vec2,
}

impl Court {
    /// Build all court bodies in the given physics world.
    pub fn build(physics: &mut PhysicsWorld, cfg: &MatchConfig) -> Court {
        let ppm = cfg.pixels_per_meter;
        let half_w = cfg.half_width();
        let half_h = cfg.half_height();
        let floor_y = cfg.floor_y();

        let hippo_half = Vec2::new(cfg.hippo_width, cfg.hippo_height) / ppm / 2.0;
        let right_hippo_start = Vec2::new(
            cfg.hippo_width * HIPPO_START_X_SPRITES / ppm,
            -cfg.hippo_height * HIPPO_START_Y_SPRITES / ppm,
        );
        let left_hippo_start = Vec2::new(-right_hippo_start.x, right_hippo_start.y);

        let hippo_material = ColliderMaterial {
            restitution: HIPPO_RESTITUTION,
            friction: config::SURFACE_FRICTION,
            density: HIPPO_DENSITY,
        };
        let hippo_shape = ColliderDesc::Cuboid {
            half_width: hippo_half.x,
            half_height: hippo_half.y,
        };

        let right_hippo = physics.create_body(
            BodyRole::RightHippo,
            &BodyDesc::dynamic(hippo_shape)
                .with_position(right_hippo_start)
                .with_fixed_rotation(true)
                .with_groups(HIPPO_FILTER),
            hippo_material,
        );
        let left_hippo = physics.create_body(
            BodyRole::LeftHippo,
            &BodyDesc::dynamic(hippo_shape)
                .with_position(left_hippo_start)
                .with_fixed_rotation(true)
                .with_groups(HIPPO_FILTER),
            hippo_material,
        );

        let ball = physics.create_body(
            BodyRole::Ball,
            &BodyDesc::dynamic(ColliderDesc::Ball {
                radius: cfg.ball_diameter / 2.0 / ppm,
            })
            .with_groups(BALL_FILTER),
            ColliderMaterial {
                restitution: BALL_RESTITUTION,
                friction: config::SURFACE_FRICTION,
                density: BALL_DENSITY,
            },
        );

        let net = physics.create_body(
            BodyRole::Net,
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: cfg.net_width * NET_SCALE / 2.0 / ppm,
                half_height: cfg.net_height * NET_SCALE / 2.0 / ppm,
            })
            .with_position(Vec2::new(0.0, (NET_BASE_Y_PX + cfg.net_height / 2.0) / ppm))
            .with_groups(NET_FILTER),
            ColliderMaterial {
                restitution: NET_RESTITUTION,
                ..ColliderMaterial::default()
            },
        );

        let edge = |a: Vec2, b: Vec2| BodyDesc::fixed(ColliderDesc::Segment { a, b }).with_groups(EDGE_FILTER);
        let wall_material = ColliderMaterial {
            restitution: WALL_RESTITUTION,
            ..ColliderMaterial::default()
        };

        // The floor is the scoring trigger; it and the ceiling carry no
        // restitution, the side walls absorb half the velocity.
        let floor = physics.create_body(
            BodyRole::Floor,
            &edge(Vec2::new(-half_w, floor_y), Vec2::new(half_w, floor_y)),
            ColliderMaterial::default(),
        );
        let ceiling = physics.create_body(
            BodyRole::Ceiling,
            &edge(Vec2::new(half_w, half_h), Vec2::new(-half_w, half_h)),
            ColliderMaterial::default(),
        );
        let left_wall = physics.create_body(
            BodyRole::LeftWall,
            &edge(Vec2::new(-half_w, -half_h), Vec2::new(-half_w, half_h)),
            wall_material,
        );
        let right_wall = physics.create_body(
            BodyRole::RightWall,
            &edge(Vec2::new(half_w, half_h), Vec2::new(half_w, -half_h)),
            wall_material,
        );

        Court {
            left_hippo,
            right_hippo,
            ball,
            net,
            floor,
            ceiling,
            left_wall,
            right_wall,
            left_hippo_start,
            right_hippo_start,
        }
    }

    pub fn hippo(&self, side: Side) -> &PhysicsBody {
        match side {
            Side::Left => &self.left_hippo,
            Side::Right => &self.right_hippo,
        }
    }

    /// Deterministic serve position for a hippo.
    pub fn hippo_start(&self, side: Side) -> Vec2 {
        match side {
            Side::Left => self.left_hippo_start,
            Side::Right => self.right_hippo_start,
        }
    }

    pub fn ball(&self) -> &PhysicsBody {
        &self.ball
    }

    pub fn net(&self) -> &PhysicsBody {
        &self.net
    }

    pub fn body(&self, role: BodyRole) -> &PhysicsBody {
        match role {
            BodyRole::LeftHippo => &self.left_hippo,
            BodyRole::RightHippo => &self.right_hippo,
            BodyRole::Ball => &self.ball,
            BodyRole::Net => &self.net,
            BodyRole::Floor => &self.floor,
            BodyRole::Ceiling => &self.ceiling,
            BodyRole::LeftWall => &self.left_wall,
            BodyRole::RightWall => &self.right_wall,
        }
    }
}
