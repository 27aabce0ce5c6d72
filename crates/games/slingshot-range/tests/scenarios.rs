//! End-to-end range scenarios driven through the public session API.

use slingshot_core::engine::PhysicsEngine;
use slingshot_core::test_helpers::RecordingEngine;
use slingshot_core::world::BodyLabel;

use slingshot_range::arena::{Arena, TargetSpec};
use slingshot_range::config::RangeConfig;
use slingshot_range::launch::LaunchState;
use slingshot_range::physics::ArcadeSolver;
use slingshot_range::{RangeEvent, RangeSession, Tick};

fn arena_with(targets: Vec<TargetSpec>) -> Arena {
    Arena {
        name: "Test Lane".to_string(),
        width: 800.0,
        height: 600.0,
        targets,
    }
}

fn recording_session(targets: Vec<TargetSpec>) -> RangeSession<RecordingEngine<ArcadeSolver>> {
    RangeSession::with_arena(
        RecordingEngine::new(ArcadeSolver::new()),
        RangeConfig::default(),
        arena_with(targets),
    )
    .unwrap()
}

/// Tick until a `TargetHit` shows up, returning that tick.
fn tick_until_hit<E: PhysicsEngine>(session: &mut RangeSession<E>, max_ticks: usize) -> Tick {
    for _ in 0..max_ticks {
        let tick = session.tick().unwrap();
        if tick
            .events
            .iter()
            .any(|e| matches!(e, RangeEvent::TargetHit { .. }))
        {
            return tick;
        }
    }
    panic!("no target hit within {max_ticks} ticks");
}

#[test]
fn aim_then_fire_without_targets() {
    let mut session = recording_session(vec![]);
    session.set_aim(45.0, 15.0).unwrap();

    for _ in 0..10 {
        let tick = session.tick().unwrap();
        assert_eq!(tick.snapshot.launch_state, LaunchState::Armed);
        assert_eq!(tick.snapshot.trajectory.len(), 50);
        let first = tick.snapshot.trajectory[0];
        assert!(
            first.distance(tick.snapshot.ball.position) < 15.5,
            "first forecast point {first:?} should be one step from the ball"
        );
    }
    assert!(
        session.engine().velocity_calls.is_empty(),
        "no live velocity before fire"
    );

    session.fire();
    let tick = session.tick().unwrap();
    assert_eq!(tick.snapshot.launch_state, LaunchState::Launched);
    assert!(tick.snapshot.trajectory.is_empty());
    assert_eq!(session.engine().velocity_calls.len(), 1);
    assert_eq!(session.engine().velocity_calls[0].0, session.ball());

    for _ in 0..30 {
        assert!(session.tick().unwrap().snapshot.trajectory.is_empty());
    }
}

#[test]
fn fire_is_gated_outside_armed() {
    let mut session = recording_session(vec![]);

    session.fire();
    let tick = session.tick().unwrap();
    assert_eq!(tick.snapshot.launch_state, LaunchState::Idle);
    assert!(session.engine().velocity_calls.is_empty());
    assert!(
        session
            .world()
            .get(session.ball())
            .unwrap()
            .velocity
            .length()
            < 0.5
    );

    session.set_aim(45.0, 15.0).unwrap();
    session.fire();
    session.tick().unwrap();
    let flying = session.world().get(session.ball()).unwrap().velocity;

    session.fire();
    let tick = session.tick().unwrap();
    assert_eq!(tick.snapshot.launch_state, LaunchState::Launched);
    assert_eq!(session.engine().velocity_calls.len(), 1);
    let after = session.world().get(session.ball()).unwrap().velocity;
    // Only gravity and drag acted on the ball since the launch.
    assert!((after.x - flying.x * 0.99).abs() < 1e-3);
}

#[test]
fn reaim_after_launch_forecasts_from_current_position() {
    let mut session = recording_session(vec![]);
    session.set_aim(45.0, 15.0).unwrap();
    session.fire();
    for _ in 0..10 {
        session.tick().unwrap();
    }

    session.set_aim(60.0, 20.0).unwrap();
    let tick = session.tick().unwrap();

    assert_eq!(tick.snapshot.launch_state, LaunchState::Armed);
    assert_eq!(session.engine().velocity_calls.len(), 1);
    let ball = tick.snapshot.ball.position;
    assert!(ball.x > 150.0, "ball should be mid-flight, at {ball:?}");
    assert!(tick.snapshot.trajectory[0].distance(ball) < 20.5);
}

#[test]
fn strike_scores_flashes_once_and_removes_after_delay() {
    let mut session = recording_session(vec![TargetSpec {
        x: 170.0,
        radius: 20.0,
    }]);
    let target = session.target_ids()[0];
    session.set_aim(10.0, 5.0).unwrap();
    session.fire();

    let hit = tick_until_hit(&mut session, 120);
    let hit_tick = hit.snapshot.tick;
    assert_eq!(hit.snapshot.score, 10);
    assert_eq!(hit.snapshot.targets.len(), 1);
    assert!(hit.snapshot.targets[0].hit, "flash on the hit frame");

    let next = session.tick().unwrap();
    assert_eq!(next.snapshot.targets.len(), 1, "still present at T+1");
    assert!(!next.snapshot.targets[0].hit, "flash lasts one frame");
    assert_eq!(next.snapshot.score, 10);

    // 300 ms at 60 Hz is 18 ticks.
    while session.clock().ticks() < hit_tick + 17 {
        let tick = session.tick().unwrap();
        assert_eq!(tick.snapshot.targets.len(), 1);
        assert!(session.world().contains(target));
    }

    let removal = session.tick().unwrap();
    assert_eq!(removal.snapshot.tick, hit_tick + 18);
    assert!(removal.snapshot.targets.is_empty());
    assert!(!session.world().contains(target));
    assert!(
        removal
            .events
            .contains(&RangeEvent::TargetRemoved { target })
    );
    assert!(removal.events.contains(&RangeEvent::AllTargetsCleared));

    for _ in 0..60 {
        assert_eq!(session.tick().unwrap().snapshot.score, 10);
    }
}

#[test]
fn default_range_invariants_hold_over_a_long_run() {
    let mut session = RangeSession::start(RangeConfig::default()).unwrap();
    session.set_aim(45.0, 15.0).unwrap();
    session.fire();

    let mut last_score = 0;
    let mut last_targets = usize::MAX;
    for _ in 0..1200 {
        let tick = session.tick().unwrap();
        let snap = &tick.snapshot;
        assert!(snap.score >= last_score);
        assert_eq!(snap.score % 10, 0);
        assert!(snap.targets.len() <= last_targets);
        assert!(snap.score as usize <= 10 * 3);
        assert!(snap.trajectory.is_empty());
        last_score = snap.score;
        last_targets = snap.targets.len();
    }
    assert_eq!(session.world().with_label(BodyLabel::Ball).count(), 1);
}
