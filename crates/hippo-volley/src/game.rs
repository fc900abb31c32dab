//! Round/match state machine and the per-frame tick loop.

use glam::Vec2;

use crate::config::{MatchConfig, BALL_RESTITUTION_STEP, SERVE_DROP, SERVE_SPIN, TIME_TO_NEXT_ROUND};
use crate::contact::ContactObserver;
use crate::core::physics::{CollisionPair, PhysicsWorld};
use crate::core::time::FixedTimestep;
use crate::court::Court;
use crate::input::queue::{GameKey, InputEvent, InputQueue};
use crate::input::tracker::InputTracker;
use crate::score::Scoreboard;
use crate::types::{BodyPose, BodyRole, MatchEvent, Side, SoundCue};

/// Simulation advances one fixed step per 60 Hz tick.
pub const FIXED_DT: f32 = 1.0 / 60.0;

const CUE_SEED: u64 = 42;

/// Match state machine phases. `Finished` is terminal until the harness
/// starts a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Run,
    Pause,
    Finished,
}

/// Shared match state mutated by the contact observer and the state machine.
/// Body transforms are deliberately not reachable from here; only round
/// resets move bodies.
pub struct MatchContext {
    pub scoreboard: Scoreboard,
    /// Who serves the next round: the side that took the last point.
    pub serving_side: Side,
    /// Latched on the first floor contact of a round; later contacts in the
    /// same round are ignored.
    pub ball_landed: bool,
    pub winner: Option<Side>,
    /// Sound cues for the harness, drained once per frame.
    pub sounds: Vec<SoundCue>,
    /// Lifecycle events for the harness, drained once per frame.
    pub events: Vec<MatchEvent>,
}

impl MatchContext {
    pub fn new(score_to_win: u32, score_margin: u32) -> Self {
        Self {
            scoreboard: Scoreboard::new(score_to_win, score_margin),
            serving_side: Side::Right,
            ball_landed: false,
            winner: None,
            sounds: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// Everything the renderer needs for one frame: body poses for sprite
/// placement plus HUD state and transient signals.
#[derive(Debug, Clone, Copy)]
pub struct MatchSnapshot {
    pub left_hippo: BodyPose,
    pub right_hippo: BodyPose,
    pub ball: BodyPose,
    pub net: BodyPose,
    pub phase: MatchPhase,
    pub left_score: u32,
    pub right_score: u32,
    pub round: u32,
    pub ball_landed: bool,
    pub next_round_starting: bool,
    pub winner: Option<Side>,
    pub draw_debug: bool,
    pub draw_sprites: bool,
}

/// The match core: owns the physics world, the court bodies, input state and
/// the round/match lifecycle. One instance is one match; abandoning a match
/// means dropping it.
pub struct VolleyMatch {
    config: MatchConfig,
    physics: PhysicsWorld,
    court: Court,
    input: InputTracker,
    observer: ContactObserver,
    ctx: MatchContext,
    phase: MatchPhase,
    timestep: FixedTimestep,
    /// Frame-time since the ball landed; at `TIME_TO_NEXT_ROUND/2` the round
    /// resets (or the match finishes).
    time_since_landing: f32,
    /// Countdown until a freshly armed round un-pauses.
    time_until_start: f32,
    /// While true, pause/resume requests are rejected.
    next_round_starting: bool,
    draw_debug: bool,
    draw_sprites: bool,
    collisions: Vec<CollisionPair>,
}

impl VolleyMatch {
    /// Build the world and court and arm the first round, right hippo
    /// serving.
    pub fn new(config: MatchConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.gravity);
        physics.set_dt(FIXED_DT);
        let court = Court::build(&mut physics, &config);
        let ctx = MatchContext::new(config.score_to_win, config.score_margin);

        let mut game = Self {
            config,
            physics,
            court,
            input: InputTracker::new(),
            observer: ContactObserver::new(CUE_SEED),
            ctx,
            phase: MatchPhase::Pause,
            timestep: FixedTimestep::new(FIXED_DT),
            time_since_landing: 0.0,
            time_until_start: 0.0,
            next_round_starting: false,
            draw_debug: true,
            draw_sprites: true,
            collisions: Vec::new(),
        };
        game.start_new_game();
        game
    }

    /// Reset scores, round count and winner, then arm round one with the
    /// right hippo serving. Also the way out of `Finished`.
    pub fn start_new_game(&mut self) {
        self.ctx.scoreboard.reset();
        self.ctx.winner = None;
        self.ctx.serving_side = Side::Right;
        self.pause();
        log::info!(
            "new match: first to {} with a margin of {}",
            self.config.score_to_win,
            self.config.score_margin
        );
        self.start_new_round(Side::Right);
    }

    /// Reposition both hippos and the ball to their deterministic start
    /// coordinates, clear held input and the landing latch, and arm the
    /// serve countdown. Movement stays disabled until it elapses.
    pub fn start_new_round(&mut self, serving: Side) {
        self.time_until_start = TIME_TO_NEXT_ROUND / 2.0;
        self.next_round_starting = true;
        let round = self.ctx.scoreboard.begin_round();

        for side in [Side::Left, Side::Right] {
            let hippo = *self.court.hippo(side);
            self.physics.set_velocity(&hippo, Vec2::ZERO);
            self.physics.set_angular_velocity(&hippo, 0.0);
            self.physics.set_transform(&hippo, self.court.hippo_start(side), 0.0);
        }

        // Stale held flags would leak forces into the new round.
        self.input.clear_held();

        self.ctx.ball_landed = false;
        self.time_since_landing = 0.0;
        let ball = *self.court.ball();
        let serve_from = self.court.hippo_start(serving) + Vec2::new(0.0, SERVE_DROP);
        self.physics.set_velocity(&ball, Vec2::ZERO);
        self.physics.set_angular_velocity(&ball, SERVE_SPIN);
        self.physics.set_transform(&ball, serve_from, 0.0);

        self.ctx.events.push(MatchEvent::RoundStarted { round, serving });
        log::info!("round {round} armed, {serving:?} hippo serving");
    }

    /// One frame: held-key forces and fixed physics steps while running,
    /// then the frame-time round transition timers.
    pub fn advance(&mut self, frame_dt: f32) {
        if self.phase == MatchPhase::Run {
            let steps = self.timestep.accumulate(frame_dt);
            for _ in 0..steps {
                self.input.apply_held_forces(&mut self.physics, &self.court);
                self.collisions.clear();
                self.physics.step_into(&mut self.collisions);
                let ball_x = self.physics.body_position(self.court.ball()).0.x;
                for pair in &self.collisions {
                    self.observer.observe(pair, ball_x, &mut self.ctx);
                }
            }
        }

        // The transition timers run on frame time, independent of the fixed
        // simulation cadence.
        if self.ctx.ball_landed && self.phase != MatchPhase::Finished {
            self.time_since_landing += frame_dt;
            if self.time_since_landing >= TIME_TO_NEXT_ROUND / 2.0 {
                self.pause();
                if let Some(winner) = self.ctx.winner {
                    self.phase = MatchPhase::Finished;
                    self.ctx.events.push(MatchEvent::MatchFinished { winner });
                    log::info!("match over, {winner:?} hippo wins");
                } else {
                    self.start_new_round(self.ctx.serving_side);
                }
            }
        }

        if self.next_round_starting && self.phase != MatchPhase::Finished {
            self.time_until_start -= frame_dt;
            if self.time_until_start <= 0.0 {
                self.next_round_starting = false;
                self.resume();
            }
        }
    }

    /// Drain and apply pending input events. Gameplay keys act on press;
    /// the toggles act on release, as the original bindings did.
    pub fn handle_input(&mut self, queue: &mut InputQueue) {
        for event in queue.drain() {
            match event {
                InputEvent::KeyDown { key } => match key {
                    GameKey::MoveLeft(side) => {
                        self.input.press_left(side, &mut self.physics, &self.court)
                    }
                    GameKey::MoveRight(side) => {
                        self.input.press_right(side, &mut self.physics, &self.court)
                    }
                    GameKey::Jump(side) => {
                        self.input.press_jump(side, &mut self.physics, &self.court)
                    }
                    _ => {}
                },
                InputEvent::KeyUp { key } => match key {
                    GameKey::MoveLeft(side) => self.input.release_left(side),
                    GameKey::MoveRight(side) => self.input.release_right(side),
                    GameKey::Jump(side) => self.input.release_jump(side),
                    GameKey::TogglePause => self.toggle_pause(),
                    GameKey::ToggleDebugOverlay => self.toggle_debug_overlay(),
                    GameKey::ToggleSprites => self.toggle_sprites(),
                    GameKey::BallBounceDown => {
                        self.adjust_ball_restitution(-BALL_RESTITUTION_STEP)
                    }
                    GameKey::BallBounceUp => self.adjust_ball_restitution(BALL_RESTITUTION_STEP),
                },
            }
        }
    }

    /// Pause or resume on request. Rejected while the ball-landed sequence
    /// or a round-start countdown is in progress, and once finished.
    pub fn toggle_pause(&mut self) {
        if self.ctx.ball_landed || self.next_round_starting {
            return;
        }
        match self.phase {
            MatchPhase::Run => {
                self.pause();
                log::debug!("paused on request");
            }
            MatchPhase::Pause => {
                self.resume();
                log::debug!("resumed on request");
            }
            MatchPhase::Finished => {}
        }
    }

    fn pause(&mut self) {
        self.phase = MatchPhase::Pause;
        self.input.set_movement_allowed(false);
    }

    fn resume(&mut self) {
        self.phase = MatchPhase::Run;
        self.input.set_movement_allowed(true);
        // Time spent paused must not turn into catch-up simulation.
        self.timestep.reset();
    }

    // -- Non-gameplay toggles and tweaks --

    /// Flip the debug collider overlay. At least one of the overlay and the
    /// sprite pass always stays on so the screen never goes blank.
    pub fn toggle_debug_overlay(&mut self) {
        self.draw_debug = !self.draw_debug;
        if !self.draw_debug && !self.draw_sprites {
            self.draw_sprites = true;
        }
    }

    /// Flip sprite drawing, with the same never-both-off guard.
    pub fn toggle_sprites(&mut self) {
        self.draw_sprites = !self.draw_sprites;
        if !self.draw_debug && !self.draw_sprites {
            self.draw_debug = true;
        }
    }

    /// Nudge the ball's bounciness at runtime.
    pub fn adjust_ball_restitution(&mut self, delta: f32) {
        let ball = *self.court.ball();
        let restitution = self.physics.restitution(&ball) + delta;
        self.physics.set_restitution(&ball, restitution);
        log::debug!("ball restitution now {restitution:.2}");
    }

    pub fn ball_restitution(&self) -> f32 {
        self.physics.restitution(self.court.ball())
    }

    // -- Queries for the harness --

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn score(&self, side: Side) -> u32 {
        self.ctx.scoreboard.score(side)
    }

    pub fn round_count(&self) -> u32 {
        self.ctx.scoreboard.round_count()
    }

    pub fn winner(&self) -> Option<Side> {
        self.ctx.winner
    }

    pub fn ball_landed(&self) -> bool {
        self.ctx.ball_landed
    }

    pub fn is_round_transitioning(&self) -> bool {
        self.next_round_starting
    }

    pub fn serving_side(&self) -> Side {
        self.ctx.serving_side
    }

    pub fn movement_allowed(&self) -> bool {
        self.input.movement_allowed()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Sound cues emitted since the last [`clear_frame_data`](Self::clear_frame_data).
    pub fn sounds(&self) -> &[SoundCue] {
        &self.ctx.sounds
    }

    /// Lifecycle events emitted since the last [`clear_frame_data`](Self::clear_frame_data).
    pub fn events(&self) -> &[MatchEvent] {
        &self.ctx.events
    }

    /// Clear per-frame transient data. The harness calls this after it has
    /// consumed sounds and events for the frame.
    pub fn clear_frame_data(&mut self) {
        self.ctx.sounds.clear();
        self.ctx.events.clear();
    }

    /// Everything the renderer needs for this frame.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            left_hippo: self.pose(BodyRole::LeftHippo),
            right_hippo: self.pose(BodyRole::RightHippo),
            ball: self.pose(BodyRole::Ball),
            net: self.pose(BodyRole::Net),
            phase: self.phase,
            left_score: self.ctx.scoreboard.score(Side::Left),
            right_score: self.ctx.scoreboard.score(Side::Right),
            round: self.ctx.scoreboard.round_count(),
            ball_landed: self.ctx.ball_landed,
            next_round_starting: self.next_round_starting,
            winner: self.ctx.winner,
            draw_debug: self.draw_debug,
            draw_sprites: self.draw_sprites,
        }
    }

    fn pose(&self, role: BodyRole) -> BodyPose {
        let (pos, rotation) = self.physics.body_position(self.court.body(role));
        BodyPose {
            x: pos.x,
            y: pos.y,
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_match() -> VolleyMatch {
        VolleyMatch::new(MatchConfig::default())
    }

    /// Advance frames until the current round is live (running with the
    /// landing latch clear), or the match has finished.
    fn advance_to_live_round(game: &mut VolleyMatch) {
        for _ in 0..1000 {
            if game.phase() == MatchPhase::Finished {
                return;
            }
            if game.phase() == MatchPhase::Run && !game.ball_landed() {
                return;
            }
            game.advance(FIXED_DT);
        }
        panic!("match never reached a live round");
    }

    /// Feed the observer a fabricated floor contact at the given ball x.
    fn land_ball(game: &mut VolleyMatch, ball_x: f32) {
        let pair = CollisionPair {
            role_a: BodyRole::Ball,
            role_b: BodyRole::Floor,
            started: true,
        };
        game.observer.observe(&pair, ball_x, &mut game.ctx);
    }

    #[test]
    fn fresh_match_is_paused_with_round_one_armed() {
        let game = new_match();
        assert_eq!(game.phase(), MatchPhase::Pause);
        assert_eq!(game.round_count(), 1);
        assert!(game.is_round_transitioning());
        assert!(!game.movement_allowed());
        assert_eq!(game.serving_side(), Side::Right);
        assert!(game
            .events()
            .contains(&MatchEvent::RoundStarted { round: 1, serving: Side::Right }));
    }

    #[test]
    fn serve_countdown_elapses_into_run() {
        let mut game = new_match();
        // TIME_TO_NEXT_ROUND/2 = 1 s of frames
        for _ in 0..70 {
            game.advance(FIXED_DT);
        }
        assert_eq!(game.phase(), MatchPhase::Run);
        assert!(!game.is_round_transitioning());
        assert!(game.movement_allowed());
    }

    #[test]
    fn round_reset_is_deterministic() {
        let mut game = new_match();
        advance_to_live_round(&mut game);

        game.start_new_round(Side::Left);
        let first = game.snapshot();

        // Disturb the world, then reset again.
        for _ in 0..120 {
            game.advance(FIXED_DT);
        }
        let ball = *game.court.ball();
        game.physics.set_transform(&ball, Vec2::new(2.0, 1.0), 0.4);
        game.physics.set_velocity(&ball, Vec2::new(3.0, 3.0));
        game.input.press_right(Side::Right, &mut game.physics, &game.court);

        game.start_new_round(Side::Left);
        let second = game.snapshot();

        assert_eq!(first.left_hippo, second.left_hippo);
        assert_eq!(first.right_hippo, second.right_hippo);
        assert_eq!(first.ball, second.ball);
        assert_eq!(game.physics.velocity(game.court.ball()), Vec2::ZERO);
        assert_eq!(game.physics.velocity(game.court.hippo(Side::Left)), Vec2::ZERO);
        assert!(!game.input.controls(Side::Right).right_held);
        assert!(!game.ball_landed());
    }

    #[test]
    fn serve_places_ball_above_serving_hippo() {
        let mut game = new_match();
        game.start_new_round(Side::Left);
        let snap = game.snapshot();
        let start = game.court.hippo_start(Side::Left);
        assert!((snap.ball.x - start.x).abs() < 1e-5);
        assert!(snap.ball.y > start.y);
    }

    #[test]
    fn pause_requests_rejected_during_transitions() {
        let mut game = new_match();

        // Fresh match: round-start countdown in progress.
        assert!(game.is_round_transitioning());
        game.toggle_pause();
        assert_eq!(game.phase(), MatchPhase::Pause);
        assert!(!game.movement_allowed());

        // Live round: toggling works both ways.
        advance_to_live_round(&mut game);
        game.toggle_pause();
        assert_eq!(game.phase(), MatchPhase::Pause);
        game.toggle_pause();
        assert_eq!(game.phase(), MatchPhase::Run);

        // Ball-landed sequence: rejected again.
        land_ball(&mut game, -1.0);
        assert!(game.ball_landed());
        game.toggle_pause();
        assert_eq!(game.phase(), MatchPhase::Run);
    }

    #[test]
    fn landing_hands_the_serve_to_the_scorer() {
        let mut game = new_match();
        advance_to_live_round(&mut game);

        land_ball(&mut game, 3.0); // right half: left scores
        assert_eq!(game.score(Side::Left), 1);
        assert_eq!(game.serving_side(), Side::Left);

        advance_to_live_round(&mut game);
        assert_eq!(game.round_count(), 2);
        assert!(!game.ball_landed());
    }

    #[test]
    fn shutout_finishes_the_match_on_the_final_landing() {
        let mut game = new_match();

        for _ in 0..15 {
            advance_to_live_round(&mut game);
            land_ball(&mut game, -1.0); // left half: right scores
        }
        assert_eq!(game.score(Side::Right), 15);
        assert_eq!(game.winner(), Some(Side::Right));

        // The finish transition happens when the landing timer expires.
        for _ in 0..200 {
            if game.phase() == MatchPhase::Finished {
                break;
            }
            game.advance(FIXED_DT);
        }
        assert_eq!(game.phase(), MatchPhase::Finished);
        assert!(!game.movement_allowed());
        assert!(game
            .events()
            .contains(&MatchEvent::MatchFinished { winner: Side::Right }));
        // 15 rounds played; no 16th was armed.
        assert_eq!(game.round_count(), 15);
    }

    #[test]
    fn threshold_without_margin_keeps_the_match_alive() {
        let mut cfg = MatchConfig::default();
        cfg.score_to_win = 3;
        cfg.score_margin = 2;
        let mut game = VolleyMatch::new(cfg);

        // Trade points to 2–2, then right reaches 3–2: margin short by one.
        for x in [-1.0, 1.0, -1.0, 1.0, -1.0] {
            advance_to_live_round(&mut game);
            land_ball(&mut game, x);
        }
        assert_eq!(game.score(Side::Right), 3);
        assert_eq!(game.score(Side::Left), 2);
        assert_eq!(game.winner(), None);

        // 4–2 decides it.
        advance_to_live_round(&mut game);
        land_ball(&mut game, -1.0);
        assert_eq!(game.winner(), Some(Side::Right));
    }

    #[test]
    fn rapid_double_contact_scores_once() {
        let mut game = new_match();
        advance_to_live_round(&mut game);

        land_ball(&mut game, -1.0);
        land_ball(&mut game, -1.0);
        assert_eq!(game.score(Side::Right), 1);
        assert_eq!(game.score(Side::Left), 0);
    }

    #[test]
    fn served_ball_eventually_lands_and_scores_for_real() {
        let mut game = new_match();

        let mut total = 0;
        for _ in 0..3600 {
            game.advance(FIXED_DT);
            total = game.score(Side::Left) + game.score(Side::Right);
            if total > 0 {
                break;
            }
        }
        assert_eq!(total, 1, "served ball never landed");

        // And the next round gets armed off the landing timer.
        for _ in 0..200 {
            if game.round_count() >= 2 {
                break;
            }
            game.advance(FIXED_DT);
        }
        assert_eq!(game.round_count(), 2);
    }

    #[test]
    fn input_queue_routing() {
        let mut game = new_match();
        advance_to_live_round(&mut game);

        let mut queue = InputQueue::new();
        queue.push(InputEvent::KeyDown { key: GameKey::MoveRight(Side::Right) });
        game.handle_input(&mut queue);
        assert!(game.input.controls(Side::Right).right_held);

        queue.push(InputEvent::KeyUp { key: GameKey::MoveRight(Side::Right) });
        // Pause toggles on release, not press.
        queue.push(InputEvent::KeyDown { key: GameKey::TogglePause });
        game.handle_input(&mut queue);
        assert!(!game.input.controls(Side::Right).right_held);
        assert_eq!(game.phase(), MatchPhase::Run);

        queue.push(InputEvent::KeyUp { key: GameKey::TogglePause });
        game.handle_input(&mut queue);
        assert_eq!(game.phase(), MatchPhase::Pause);
    }

    #[test]
    fn restitution_tweak_keys_step_by_tenths() {
        let mut game = new_match();
        let base = game.ball_restitution();

        let mut queue = InputQueue::new();
        queue.push(InputEvent::KeyUp { key: GameKey::BallBounceUp });
        game.handle_input(&mut queue);
        assert!((game.ball_restitution() - (base + 0.1)).abs() < 1e-5);

        queue.push(InputEvent::KeyUp { key: GameKey::BallBounceDown });
        queue.push(InputEvent::KeyUp { key: GameKey::BallBounceDown });
        game.handle_input(&mut queue);
        assert!((game.ball_restitution() - (base - 0.1)).abs() < 1e-5);
    }

    #[test]
    fn draw_toggles_never_both_off() {
        let mut game = new_match();
        assert!(game.snapshot().draw_debug && game.snapshot().draw_sprites);

        game.toggle_debug_overlay();
        game.toggle_sprites();
        let snap = game.snapshot();
        assert!(snap.draw_debug || snap.draw_sprites);

        game.toggle_debug_overlay();
        game.toggle_sprites();
        let snap = game.snapshot();
        assert!(snap.draw_debug || snap.draw_sprites);
    }

    #[test]
    fn new_game_resets_a_finished_match() {
        let mut cfg = MatchConfig::default();
        cfg.score_to_win = 1;
        cfg.score_margin = 1;
        let mut game = VolleyMatch::new(cfg);

        advance_to_live_round(&mut game);
        land_ball(&mut game, 1.0);
        for _ in 0..200 {
            if game.phase() == MatchPhase::Finished {
                break;
            }
            game.advance(FIXED_DT);
        }
        assert_eq!(game.phase(), MatchPhase::Finished);

        game.start_new_game();
        assert_eq!(game.phase(), MatchPhase::Pause);
        assert_eq!(game.score(Side::Left), 0);
        assert_eq!(game.score(Side::Right), 0);
        assert_eq!(game.round_count(), 1);
        assert_eq!(game.winner(), None);
        assert_eq!(game.serving_side(), Side::Right);
    }

    #[test]
    fn clear_frame_data_drops_sounds_and_events() {
        let mut game = new_match();
        assert!(!game.events().is_empty());
        game.clear_frame_data();
        assert!(game.events().is_empty());
        assert!(game.sounds().is_empty());
    }
}
