use bytemuck::{Pod, Zeroable};

/// Which player's half of the court. The net sits at `x == 0`; the left
/// player's half is negative x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Logical role of a rigid body in the simulation.
/// Stored in the body's rapier `user_data` so collision events can be
/// resolved back to roles without handle bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    LeftHippo,
    RightHippo,
    Ball,
    Net,
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
}

impl BodyRole {
    pub(crate) fn to_user_data(self) -> u128 {
        match self {
            BodyRole::LeftHippo => 1,
            BodyRole::RightHippo => 2,
            BodyRole::Ball => 3,
            BodyRole::Net => 4,
            BodyRole::Floor => 5,
            BodyRole::Ceiling => 6,
            BodyRole::LeftWall => 7,
            BodyRole::RightWall => 8,
        }
    }

    pub(crate) fn from_user_data(data: u128) -> Option<BodyRole> {
        match data {
            1 => Some(BodyRole::LeftHippo),
            2 => Some(BodyRole::RightHippo),
            3 => Some(BodyRole::Ball),
            4 => Some(BodyRole::Net),
            5 => Some(BodyRole::Floor),
            6 => Some(BodyRole::Ceiling),
            7 => Some(BodyRole::LeftWall),
            8 => Some(BodyRole::RightWall),
            _ => None,
        }
    }

    /// The hippo body for a given player side.
    pub fn hippo(side: Side) -> BodyRole {
        match side {
            Side::Left => BodyRole::LeftHippo,
            Side::Right => BodyRole::RightHippo,
        }
    }

    /// If this role is a hippo, which side it belongs to.
    pub fn hippo_side(self) -> Option<Side> {
        match self {
            BodyRole::LeftHippo => Some(Side::Left),
            BodyRole::RightHippo => Some(Side::Right),
            _ => None,
        }
    }
}

/// A sound cue emitted by the game logic. Playback is the harness's job;
/// the core only reports which cue fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Grunt,
    Splash1,
    Splash2,
    Roar,
}

impl SoundCue {
    pub(crate) const ALL: [SoundCue; 4] =
        [SoundCue::Grunt, SoundCue::Splash1, SoundCue::Splash2, SoundCue::Roar];
}

/// Lifecycle event reported to the harness, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// A point was scored; carries the updated totals for HUD text.
    PointScored { side: Side, left: u32, right: u32 },
    /// A new round has been armed and its start countdown is running.
    RoundStarted { round: u32, serving: Side },
    /// The match reached its win condition and entered `Finished`.
    MatchFinished { winner: Side },
}

/// Position + rotation of one body, laid out flat for the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyPose {
    /// X position in meters.
    pub x: f32,
    /// Y position in meters.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
}

impl BodyPose {
    pub const FLOATS: usize = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_user_data_round_trip() {
        let roles = [
            BodyRole::LeftHippo,
            BodyRole::RightHippo,
            BodyRole::Ball,
            BodyRole::Net,
            BodyRole::Floor,
            BodyRole::Ceiling,
            BodyRole::LeftWall,
            BodyRole::RightWall,
        ];
        for role in roles {
            assert_eq!(BodyRole::from_user_data(role.to_user_data()), Some(role));
        }
        assert_eq!(BodyRole::from_user_data(0), None);
        assert_eq!(BodyRole::from_user_data(99), None);
    }

    #[test]
    fn opponent_is_involutive() {
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent().opponent(), Side::Right);
    }

    #[test]
    fn hippo_roles_map_to_sides() {
        assert_eq!(BodyRole::hippo(Side::Left).hippo_side(), Some(Side::Left));
        assert_eq!(BodyRole::hippo(Side::Right).hippo_side(), Some(Side::Right));
        assert_eq!(BodyRole::Ball.hippo_side(), None);
    }
}
