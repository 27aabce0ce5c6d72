use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use slingshot_core::engine::CollisionPair;
use slingshot_core::world::{BodyId, BodyLabel, World};

use crate::config::ScoringSettings;

/// Session score. Only ever goes up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState(u32);

impl ScoreState {
    pub fn value(&self) -> u32 {
        self.0
    }

    fn award(&mut self, points: u32) -> u32 {
        self.0 = self.0.saturating_add(points);
        self.0
    }
}

/// A struck target waiting out its flash before leaving the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemoval {
    pub target: BodyId,
    /// Simulated time at which the target is removed.
    pub due: Duration,
}

/// A scored ball–target contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: BodyId,
    /// Score after this hit was awarded.
    pub score: u32,
}

/// Return the target of a ball–target pair, `None` for any other pairing.
pub fn struck_target(world: &World, pair: &CollisionPair) -> Option<BodyId> {
    let la = world.get(pair.a)?.label;
    let lb = world.get(pair.b)?.label;
    match (la, lb) {
        (BodyLabel::Ball, BodyLabel::Target) => Some(pair.b),
        (BodyLabel::Target, BodyLabel::Ball) => Some(pair.a),
        _ => None,
    }
}

/// Turns collision-begin events into score and scheduled target removals.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    award: u32,
    delay: Duration,
    score: ScoreState,
    /// Ordered by `due`: every entry gets the same delay and `now` never
    /// goes backwards, so pushing to the back keeps FIFO order.
    pending: VecDeque<PendingRemoval>,
}

impl CollisionResolver {
    pub fn new(settings: &ScoringSettings) -> Self {
        Self {
            award: settings.hit_award,
            delay: Duration::from_millis(settings.removal_delay_ms),
            score: ScoreState::default(),
            pending: VecDeque::new(),
        }
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingRemoval> {
        self.pending.iter()
    }

    pub fn is_pending(&self, target: BodyId) -> bool {
        self.pending.iter().any(|p| p.target == target)
    }

    /// Score each ball–target pair that begins at simulated time `now`, flag
    /// the target for its one-frame flash and schedule its removal. A target
    /// already waiting for removal is spent and does not score again.
    pub fn resolve(
        &mut self,
        world: &mut World,
        pairs: &[CollisionPair],
        now: Duration,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        for pair in pairs {
            let Some(target) = struck_target(world, pair) else {
                continue;
            };
            if self.is_pending(target) {
                tracing::debug!(%target, "Target already pending removal, hit ignored");
                continue;
            }
            if let Some(body) = world.get_mut(target) {
                body.hit = true;
            }
            let score = self.score.award(self.award);
            let due = now + self.delay;
            self.pending.push_back(PendingRemoval { target, due });
            tracing::debug!(%target, score, due_ms = due.as_millis() as u64, "Target hit");
            hits.push(Hit { target, score });
        }
        hits
    }

    /// Pop every removal whose time has come, oldest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<BodyId> {
        let mut due = Vec::new();
        while let Some(front) = self.pending.front()
            && front.due <= now
        {
            due.push(front.target);
            self.pending.pop_front();
        }
        due
    }

    pub fn reset(&mut self) {
        self.score = ScoreState::default();
        self.pending.clear();
    }
}
