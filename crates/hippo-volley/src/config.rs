use glam::Vec2;
use serde::{Deserialize, Serialize};

// Hippo calibrations
pub const HIPPO_DENSITY: f32 = 1.25;
/// No bounce on collision with the ground.
pub const HIPPO_RESTITUTION: f32 = 0.0;
/// Force applied while pressing or holding a horizontal movement key.
pub const HORIZONTAL_FORCE: f32 = 25.0;
/// Max horizontal speed; held-key force stops adding beyond this.
pub const MAX_HORIZONTAL_SPEED: f32 = 6.75;
/// Initial upward force on a fresh jump.
pub const JUMP_IMPULSE: f32 = 100.0;
/// Incremental upward force while the jump key stays held.
pub const JUMP_HOLD_FORCE: f32 = 75.0;
/// Accumulated-impulse cap that stops hippos from floating up forever.
pub const MAX_JUMP_HEIGHT: f32 = 400.0;

// Other calibrations
pub const BALL_DENSITY: f32 = 1.0;
/// Unlike the hippos, the ball bounces off everything.
pub const BALL_RESTITUTION: f32 = 0.65;
/// Hippos and the ball lose half of their velocity against the side walls.
pub const WALL_RESTITUTION: f32 = 0.5;
/// The net keeps almost all velocity on contact.
pub const NET_RESTITUTION: f32 = 0.95;
pub const NET_SCALE: f32 = 0.75;
pub const SURFACE_FRICTION: f32 = 0.2;
/// Seconds after a point lands before the next round is fully underway.
/// Half is spent waiting to reset, half counting down to serve.
pub const TIME_TO_NEXT_ROUND: f32 = 2.0;
/// Serve spin, radians per second.
pub const SERVE_SPIN: f32 = 1.0;
/// How far above the serving hippo the ball is placed, meters.
pub const SERVE_DROP: f32 = 3.0;
/// The floor sits this many pixels above the bottom of the screen.
pub const FLOOR_RAISE_PX: f32 = 50.0;
/// Step applied by the runtime ball-bounciness tweak.
pub const BALL_RESTITUTION_STEP: f32 = 0.1;

/// Match configuration, provided by the harness at construction.
/// Sprite dimensions are in pixels; `pixels_per_meter` maps them into the
/// physics world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub pixels_per_meter: f32,
    /// Gravity in m/s^2; y-up, so downward gravity is negative y.
    pub gravity: Vec2,
    /// Least score a player must reach to win.
    pub score_to_win: u32,
    /// Required lead over the opponent to win once the threshold is met.
    pub score_margin: u32,
    pub hippo_width: f32,
    pub hippo_height: f32,
    pub ball_diameter: f32,
    pub net_width: f32,
    pub net_height: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            screen_width: 950.0,
            screen_height: 768.0,
            pixels_per_meter: 100.0,
            gravity: Vec2::new(0.0, -15.0),
            score_to_win: 15,
            score_margin: 2,
            hippo_width: 100.0,
            hippo_height: 64.0,
            ball_diameter: 50.0,
            net_width: 80.0,
            net_height: 400.0,
        }
    }
}

impl MatchConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Half the playfield width in meters.
    pub fn half_width(&self) -> f32 {
        self.screen_width / self.pixels_per_meter / 2.0
    }

    /// Half the playfield height in meters.
    pub fn half_height(&self) -> f32 {
        self.screen_height / self.pixels_per_meter / 2.0
    }

    /// Y coordinate of the floor, meters. The floor is raised off the screen
    /// bottom so it stays visible in a debug overlay.
    pub fn floor_y(&self) -> f32 {
        -(self.screen_height - FLOOR_RAISE_PX) / self.pixels_per_meter / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_calibration() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.score_to_win, 15);
        assert_eq!(cfg.score_margin, 2);
        assert_eq!(cfg.gravity, Vec2::new(0.0, -15.0));
        assert!((cfg.half_width() - 4.75).abs() < 1e-6);
        assert!((cfg.half_height() - 3.84).abs() < 1e-6);
        // 50 px raise: (768 - 50) / 100 / 2
        assert!((cfg.floor_y() + 3.59).abs() < 1e-6);
    }

    #[test]
    fn parse_config_from_json() {
        let json = r#"{
            "screen_width": 800.0,
            "screen_height": 600.0,
            "pixels_per_meter": 100.0,
            "gravity": [0.0, -10.0],
            "score_to_win": 5,
            "score_margin": 1,
            "hippo_width": 100.0,
            "hippo_height": 64.0,
            "ball_diameter": 50.0,
            "net_width": 80.0,
            "net_height": 400.0
        }"#;
        let cfg = MatchConfig::from_json(json).unwrap();
        assert_eq!(cfg.score_to_win, 5);
        assert_eq!(cfg.gravity, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MatchConfig::from_json("{").is_err());
    }
}
