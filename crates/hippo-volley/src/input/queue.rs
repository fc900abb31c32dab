use crate::types::Side;

/// The keys the match core understands, already mapped from raw key codes by
/// the harness (the original binding: WASD for the left hippo, arrows for the
/// right, Escape/Enter/Space/comma/period for the toggles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    MoveLeft(Side),
    MoveRight(Side),
    Jump(Side),
    TogglePause,
    ToggleDebugOverlay,
    ToggleSprites,
    BallBounceDown,
    BallBounceUp,
}

/// A discrete key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: GameKey },
    KeyUp { key: GameKey },
}

/// A queue of input events. The harness writes events as they arrive; the
/// match core drains them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    /// Push a new input event.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
