//! Held-key state and force application for the two hippos.
//!
//! Key-down applies a one-off force and sets a held flag; while a flag stays
//! set, every simulation tick adds an incremental force, clamped by the max
//! horizontal speed or the accumulated jump cap.

use glam::Vec2;

use crate::config::{
    HORIZONTAL_FORCE, JUMP_HOLD_FORCE, JUMP_IMPULSE, MAX_HORIZONTAL_SPEED, MAX_JUMP_HEIGHT,
};
use crate::court::Court;
use crate::core::physics::PhysicsWorld;
use crate::types::Side;

// Grounded heuristic for jump eligibility: vertical velocity inside this
// window and the body below the altitude gate. A crude proxy, not true
// contact detection; kept because changing it changes gameplay feel.
const GROUND_VEL_MIN: f32 = 0.0;
const GROUND_VEL_MAX: f32 = 1.0;
const GROUND_LEVEL_Y: f32 = -2.0;

/// Held-key state for one player.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControls {
    pub left_held: bool,
    pub right_held: bool,
    pub up_held: bool,
    /// Accumulated jump impulse for the current jump, capped at
    /// `MAX_JUMP_HEIGHT`.
    pub jump_height: f32,
}

/// Maps key transitions to forces on the two hippo bodies.
pub struct InputTracker {
    left: PlayerControls,
    right: PlayerControls,
    movement_allowed: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            left: PlayerControls::default(),
            right: PlayerControls::default(),
            movement_allowed: true,
        }
    }

    fn controls_mut(&mut self, side: Side) -> &mut PlayerControls {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn controls(&self, side: Side) -> &PlayerControls {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Whether gameplay keys are currently acknowledged. Cleared while the
    /// match is paused, transitioning between rounds, or finished.
    pub fn movement_allowed(&self) -> bool {
        self.movement_allowed
    }

    pub fn set_movement_allowed(&mut self, allowed: bool) {
        self.movement_allowed = allowed;
    }

    /// Left-move key down: apply the initial force and arm the held flag.
    /// Ignored while movement is disabled.
    pub fn press_left(&mut self, side: Side, physics: &mut PhysicsWorld, court: &Court) {
        if !self.movement_allowed {
            return;
        }
        physics.apply_force(court.hippo(side), Vec2::new(-HORIZONTAL_FORCE, 0.0));
        self.controls_mut(side).left_held = true;
    }

    /// Right-move key down.
    pub fn press_right(&mut self, side: Side, physics: &mut PhysicsWorld, court: &Court) {
        if !self.movement_allowed {
            return;
        }
        physics.apply_force(court.hippo(side), Vec2::new(HORIZONTAL_FORCE, 0.0));
        self.controls_mut(side).right_held = true;
    }

    /// Jump key down. Only starts a jump when the grounded heuristic passes.
    pub fn press_jump(&mut self, side: Side, physics: &mut PhysicsWorld, court: &Court) {
        if !self.movement_allowed {
            return;
        }
        let hippo = court.hippo(side);
        let vel = physics.velocity(hippo);
        let (pos, _) = physics.body_position(hippo);
        let grounded =
            vel.y >= GROUND_VEL_MIN && vel.y <= GROUND_VEL_MAX && pos.y < GROUND_LEVEL_Y;
        if grounded {
            physics.apply_force(hippo, Vec2::new(0.0, JUMP_IMPULSE));
            let controls = self.controls_mut(side);
            // Fresh jump: restart the accumulator and credit the initial impulse.
            controls.jump_height = 0.0;
            controls.jump_height += JUMP_IMPULSE;
            controls.up_held = true;
        }
    }

    /// A key went up: clear the matching held flag. Release is honored even
    /// while movement is disabled so no flag can stick across a pause.
    pub fn release_left(&mut self, side: Side) {
        self.controls_mut(side).left_held = false;
    }

    pub fn release_right(&mut self, side: Side) {
        self.controls_mut(side).right_held = false;
    }

    pub fn release_jump(&mut self, side: Side) {
        self.controls_mut(side).up_held = false;
    }

    /// Clear all held flags, used by round resets.
    pub fn clear_held(&mut self) {
        self.left = PlayerControls::default();
        self.right = PlayerControls::default();
    }

    /// Apply incremental forces for held keys. Called once per simulation
    /// tick, not per input event.
    pub fn apply_held_forces(&mut self, physics: &mut PhysicsWorld, court: &Court) {
        for side in [Side::Left, Side::Right] {
            let hippo = *court.hippo(side);
            let vel = physics.velocity(&hippo);
            let controls = self.controls_mut(side);

            if controls.right_held && vel.x <= MAX_HORIZONTAL_SPEED {
                physics.apply_force(&hippo, Vec2::new(HORIZONTAL_FORCE, 0.0));
            }
            if controls.left_held && vel.x >= -MAX_HORIZONTAL_SPEED {
                physics.apply_force(&hippo, Vec2::new(-HORIZONTAL_FORCE, 0.0));
            }
            if controls.up_held && controls.jump_height < MAX_JUMP_HEIGHT {
                physics.apply_force(&hippo, Vec2::new(0.0, JUMP_HOLD_FORCE));
                controls.jump_height += JUMP_HOLD_FORCE;
            }
        }
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
