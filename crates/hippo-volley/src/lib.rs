pub mod config;
pub mod contact;
pub mod core;
pub mod court;
pub mod game;
pub mod input;
pub mod score;
pub mod types;

// Re-export key types at crate root for convenience
pub use crate::config::MatchConfig;
pub use crate::contact::ContactObserver;
pub use crate::core::physics::{
    BodyDesc, BodyKind, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsBody, PhysicsWorld,
};
pub use crate::core::time::FixedTimestep;
pub use crate::court::Court;
pub use crate::game::{MatchContext, MatchPhase, MatchSnapshot, VolleyMatch, FIXED_DT};
pub use crate::input::queue::{GameKey, InputEvent, InputQueue};
pub use crate::input::tracker::{InputTracker, PlayerControls};
pub use crate::score::Scoreboard;
pub use crate::types::{BodyPose, BodyRole, MatchEvent, Side, SoundCue};
