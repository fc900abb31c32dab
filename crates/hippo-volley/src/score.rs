use crate::types::Side;

/// Scores and round counter for one match, plus the win rule.
///
/// A side wins only when it has reached `score_to_win` AND leads the opponent
/// by at least `score_margin`. Near the threshold this extends the match
/// sudden-death style for as long as the lead stays short, on purpose.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    left: u32,
    right: u32,
    round_count: u32,
    score_to_win: u32,
    score_margin: u32,
}

impl Scoreboard {
    pub fn new(score_to_win: u32, score_margin: u32) -> Self {
        Self {
            left: 0,
            right: 0,
            round_count: 0,
            score_to_win,
            score_margin,
        }
    }

    /// Reset scores and round counter for a new match.
    pub fn reset(&mut self) {
        self.left = 0;
        self.right = 0;
        self.round_count = 0;
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    /// Called by `start_new_round`.
    pub fn begin_round(&mut self) -> u32 {
        self.round_count += 1;
        self.round_count
    }

    /// Record a point for `side` and evaluate the win condition.
    /// Returns the winner when the match is decided by this point.
    pub fn record_point(&mut self, side: Side) -> Option<Side> {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
        let scored = self.score(side);
        let opponent = self.score(side.opponent());
        if scored >= self.score_to_win && scored >= opponent + self.score_margin {
            Some(side)
        } else {
            None
        }
    }
}
