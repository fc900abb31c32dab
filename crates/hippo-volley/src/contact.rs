//! Contact observer: turns raw collision pairs into scoring and sound cues.
//!
//! Runs synchronously inside the physics step loop and mutates match state
//! only; body transforms are never touched here (round resets do that on the
//! next frame).

use crate::core::physics::CollisionPair;
use crate::game::MatchContext;
use crate::types::{BodyRole, MatchEvent, Side, SoundCue};

/// Seedable xorshift64 generator for picking hippo-contact sound cues.
/// Deterministic so replays and tests stay reproducible.
#[derive(Debug, Clone)]
struct CueRng {
    state: u64,
}

impl CueRng {
    fn new(seed: u64) -> Self {
        CueRng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_index(&mut self, upper_bound: u32) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % upper_bound as u64) as u32
    }
}

/// Reacts to contacts the round cares about; everything else is ignored.
pub struct ContactObserver {
    rng: CueRng,
}

impl ContactObserver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: CueRng::new(seed),
        }
    }

    /// Inspect one collision pair. `ball_x` is the ball's horizontal position
    /// at the time of the contact, used to pick the scoring side.
    pub fn observe(&mut self, pair: &CollisionPair, ball_x: f32, ctx: &mut MatchContext) {
        if !pair.started {
            return;
        }

        if pair.involves(BodyRole::Ball, BodyRole::Floor) {
            self.ball_landed(ball_x, ctx);
        } else if self.hippo_touching_ball(pair).is_some() {
            // Sound cue only; hippo contact never affects scoring.
            let cue = SoundCue::ALL[self.rng.next_index(SoundCue::ALL.len() as u32) as usize];
            ctx.sounds.push(cue);
        }
    }

    /// The ball touched the floor. Counts at most once per round; the side
    /// whose half the ball is NOT on takes the point. A landing dead on the
    /// center line scores nobody but still ends the round.
    fn ball_landed(&mut self, ball_x: f32, ctx: &mut MatchContext) {
        if ctx.ball_landed {
            return;
        }

        let scoring_side = if ball_x < 0.0 {
            Some(Side::Right)
        } else if ball_x > 0.0 {
            Some(Side::Left)
        } else {
            None
        };

        if let Some(side) = scoring_side {
            let winner = ctx.scoreboard.record_point(side);
            ctx.serving_side = side;
            ctx.events.push(MatchEvent::PointScored {
                side,
                left: ctx.scoreboard.score(Side::Left),
                right: ctx.scoreboard.score(Side::Right),
            });
            if let Some(w) = winner {
                ctx.winner = Some(w);
            }
        }

        ctx.ball_landed = true;
    }

    fn hippo_touching_ball(&self, pair: &CollisionPair) -> Option<Side> {
        pair.other(BodyRole::Ball).and_then(BodyRole::hippo_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MatchContext {
        MatchContext::new(15, 2)
    }

    fn landing_pair() -> CollisionPair {
        CollisionPair {
            role_a: BodyRole::Ball,
            role_b: BodyRole::Floor,
            started: true,
        }
    }

    #[test]
    fn landing_on_left_half_scores_right() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        observer.observe(&landing_pair(), -1.5, &mut ctx);
        assert_eq!(ctx.scoreboard.score(Side::Right), 1);
        assert_eq!(ctx.scoreboard.score(Side::Left), 0);
        assert_eq!(ctx.serving_side, Side::Right);
        assert!(ctx.ball_landed);
    }

    #[test]
    fn landing_on_right_half_scores_left() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        observer.observe(&landing_pair(), 2.0, &mut ctx);
        assert_eq!(ctx.scoreboard.score(Side::Left), 1);
        assert_eq!(ctx.serving_side, Side::Left);
    }

    #[test]
    fn landing_order_is_irrelevant() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        let flipped = CollisionPair {
            role_a: BodyRole::Floor,
            role_b: BodyRole::Ball,
            started: true,
        };
        observer.observe(&flipped, 2.0, &mut ctx);
        assert_eq!(ctx.scoreboard.score(Side::Left), 1);
    }

    #[test]
    fn repeated_landings_score_once() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        observer.observe(&landing_pair(), -1.0, &mut ctx);
        observer.observe(&landing_pair(), -1.0, &mut ctx);
        observer.observe(&landing_pair(), 1.0, &mut ctx);
        assert_eq!(ctx.scoreboard.score(Side::Right), 1);
        assert_eq!(ctx.scoreboard.score(Side::Left), 0);
    }

    #[test]
    fn center_line_landing_scores_nobody_but_ends_round() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();
        ctx.serving_side = Side::Left;

        observer.observe(&landing_pair(), 0.0, &mut ctx);
        assert_eq!(ctx.scoreboard.score(Side::Left), 0);
        assert_eq!(ctx.scoreboard.score(Side::Right), 0);
        assert!(ctx.ball_landed);
        // Previous server keeps the serve.
        assert_eq!(ctx.serving_side, Side::Left);
    }

    #[test]
    fn winning_point_sets_match_winner() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = MatchContext::new(2, 1);

        observer.observe(&landing_pair(), 1.0, &mut ctx);
        ctx.ball_landed = false;
        assert_eq!(ctx.winner, None);

        observer.observe(&landing_pair(), 1.0, &mut ctx);
        assert_eq!(ctx.winner, Some(Side::Left));
    }

    #[test]
    fn hippo_contact_emits_one_sound_cue() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        for hippo in [BodyRole::LeftHippo, BodyRole::RightHippo] {
            let pair = CollisionPair {
                role_a: hippo,
                role_b: BodyRole::Ball,
                started: true,
            };
            observer.observe(&pair, 0.5, &mut ctx);
        }
        assert_eq!(ctx.sounds.len(), 2);
        // Scoring state untouched.
        assert_eq!(ctx.scoreboard.score(Side::Left), 0);
        assert!(!ctx.ball_landed);
    }

    #[test]
    fn contact_end_and_unrelated_pairs_are_ignored() {
        let mut observer = ContactObserver::new(7);
        let mut ctx = context();

        observer.observe(
            &CollisionPair {
                role_a: BodyRole::Ball,
                role_b: BodyRole::Floor,
                started: false,
            },
            -1.0,
            &mut ctx,
        );
        observer.observe(
            &CollisionPair {
                role_a: BodyRole::Ball,
                role_b: BodyRole::Net,
                started: true,
            },
            -1.0,
            &mut ctx,
        );
        observer.observe(
            &CollisionPair {
                role_a: BodyRole::LeftHippo,
                role_b: BodyRole::Floor,
                started: true,
            },
            -1.0,
            &mut ctx,
        );
        assert!(!ctx.ball_landed);
        assert!(ctx.sounds.is_empty());
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn cue_sequence_is_deterministic_per_seed() {
        let mut a = CueRng::new(42);
        let mut b = CueRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_index(4), b.next_index(4));
        }
    }
}
