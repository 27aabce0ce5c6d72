pub mod arena;
pub mod config;
pub mod launch;
pub mod physics;
pub mod scoring;
pub mod trajectory;

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use slingshot_core::engine::PhysicsEngine;
use slingshot_core::error::CoreError;
use slingshot_core::time::SimClock;
use slingshot_core::world::{BodyId, BodyLabel, Shape, Vec2, World};

use arena::{Arena, ArenaBodies};
use config::RangeConfig;
use launch::{AimParameters, LaunchController, LaunchState};
use physics::ArcadeSolver;
use scoring::CollisionResolver;
use trajectory::{PredictionRequest, predict_path};

/// Input from the UI, applied at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SetAim { angle: f32, power: f32 },
    Fire,
    Pause,
    Resume,
    Stop,
}

/// Cloneable handle for delivering commands from another thread.
#[derive(Debug, Clone)]
pub struct CommandSender(mpsc::Sender<Command>);

impl CommandSender {
    /// Queue a command. Fails only once the session has been dropped.
    pub fn send(&self, command: Command) -> Result<(), mpsc::SendError<Command>> {
        self.0.send(command)
    }

    pub fn set_aim(&self, angle: f32, power: f32) -> Result<(), mpsc::SendError<Command>> {
        self.send(Command::SetAim { angle, power })
    }

    pub fn fire(&self) -> Result<(), mpsc::SendError<Command>> {
        self.send(Command::Fire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundView {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub id: BodyId,
    pub position: Vec2,
    pub radius: f32,
    pub hit: bool,
}

/// Immutable per-tick frame handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub ball: BallView,
    pub ground: GroundView,
    /// In draw order.
    pub targets: Vec<TargetView>,
    pub score: u32,
    pub launch_state: LaunchState,
    pub aim: Option<AimParameters>,
    /// Forecast path; empty once launched or before any aim is set.
    pub trajectory: Vec<Vec2>,
    pub paused: bool,
}

impl Snapshot {
    /// MessagePack encoding for handing frames across threads or processes.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

/// Things that happened during a tick, beyond what the snapshot shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeEvent {
    Launched { velocity: Vec2 },
    TargetHit { target: BodyId, score: u32 },
    TargetRemoved { target: BodyId },
    AllTargetsCleared,
    CommandRejected { command: Command, reason: String },
    Stopped,
}

/// Output of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub snapshot: Snapshot,
    pub events: Vec<RangeEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Paused,
    Stopped,
    /// The physics engine failed; the session cannot continue.
    Failed,
}

/// One play session: owns the live world, launch state, score and pending
/// removals, and drives them one fixed step per tick.
///
/// Per tick: apply queued commands, step the world, score new ball–target
/// contacts, remove targets whose flash has elapsed, forecast the shot while
/// not launched, emit the snapshot, then clear hit flags.
pub struct RangeSession<E: PhysicsEngine = ArcadeSolver> {
    config: RangeConfig,
    engine: E,
    arena: Arena,
    world: World,
    bodies: ArenaBodies,
    clock: SimClock,
    launch: LaunchController,
    resolver: CollisionResolver,
    commands_tx: mpsc::Sender<Command>,
    commands_rx: mpsc::Receiver<Command>,
    paused: bool,
    stopped: bool,
    failure: Option<CoreError>,
}

impl RangeSession<ArcadeSolver> {
    /// Start a session on the bundled solver.
    pub fn start(config: RangeConfig) -> Result<Self, CoreError> {
        Self::with_engine(ArcadeSolver::new(), config)
    }
}

impl<E: PhysicsEngine> RangeSession<E> {
    /// Start a session on `engine` with the arena chosen by `config`.
    pub fn with_engine(engine: E, config: RangeConfig) -> Result<Self, CoreError> {
        let arena = arena::from_settings(&config.arena)?;
        Self::with_arena(engine, config, arena)
    }

    /// Start a session on a caller-supplied layout.
    pub fn with_arena(engine: E, config: RangeConfig, arena: Arena) -> Result<Self, CoreError> {
        let (world, bodies) = build_world(&engine, &arena, &config)?;
        let (commands_tx, commands_rx) = mpsc::channel();

        tracing::info!(
            engine = engine.name(),
            arena = %arena.name,
            targets = bodies.targets.len(),
            "Range session started"
        );

        Ok(Self {
            clock: SimClock::from_tick_rate(config.physics.tick_rate_hz),
            launch: LaunchController::new(config.launch.clone()),
            resolver: CollisionResolver::new(&config.scoring),
            config,
            engine,
            arena,
            world,
            bodies,
            commands_tx,
            commands_rx,
            paused: false,
            stopped: false,
            failure: None,
        })
    }

    pub fn command_sender(&self) -> CommandSender {
        CommandSender(self.commands_tx.clone())
    }

    /// Queue a command for the next tick.
    pub fn submit(&self, command: Command) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.commands_tx.send(command);
    }

    /// Validate aim now, reporting bad values to the caller, and queue it.
    pub fn set_aim(&self, angle: f32, power: f32) -> Result<AimParameters, CoreError> {
        let aim = self.launch.validate(angle, power)?;
        self.submit(Command::SetAim { angle, power });
        Ok(aim)
    }

    pub fn fire(&self) {
        self.submit(Command::Fire);
    }

    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            tracing::info!(
                score = self.resolver.score().value(),
                ticks = self.clock.ticks(),
                "Range session stopped"
            );
        }
    }

    /// Rebuild the arena and reset score, launch state and the clock.
    /// Commands still queued are discarded.
    pub fn restart(&mut self) -> Result<(), CoreError> {
        let (world, bodies) = build_world(&self.engine, &self.arena, &self.config)?;
        self.world = world;
        self.bodies = bodies;
        self.clock.reset();
        self.launch.reset();
        self.resolver.reset();
        while self.commands_rx.try_recv().is_ok() {}
        self.paused = false;
        self.stopped = false;
        self.failure = None;
        tracing::info!(arena = %self.arena.name, "Range session restarted");
        Ok(())
    }

    /// Advance the session by one fixed step and produce its frame.
    pub fn tick(&mut self) -> Result<Tick, CoreError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let mut events = Vec::new();
        self.apply_commands(&mut events)?;

        if !self.paused && !self.stopped {
            self.advance(&mut events)?;
        }

        let snapshot = self.snapshot()?;
        for body in self.world.bodies_mut() {
            body.hit = false;
        }
        Ok(Tick { snapshot, events })
    }

    fn apply_commands(&mut self, events: &mut Vec<RangeEvent>) -> Result<(), CoreError> {
        while let Ok(command) = self.commands_rx.try_recv() {
            if self.stopped {
                reject(events, command, "session stopped");
                continue;
            }
            match command {
                Command::SetAim { angle, power } => {
                    if let Err(e) = self.launch.set_aim(angle, power) {
                        reject(events, command, &e.to_string());
                    }
                },
                Command::Fire => {
                    let fired = self
                        .launch
                        .fire(&mut self.engine, &mut self.world, self.bodies.ball)
                        .map_err(|e| self.fail(e))?;
                    if fired {
                        let velocity = self.world.get(self.bodies.ball).map(|b| b.velocity);
                        tracing::info!(aim = ?self.launch.aim(), "Ball launched");
                        events.push(RangeEvent::Launched {
                            velocity: velocity.unwrap_or(Vec2::ZERO),
                        });
                    }
                },
                Command::Pause => self.paused = true,
                Command::Resume => self.paused = false,
                Command::Stop => {
                    self.stop();
                    events.push(RangeEvent::Stopped);
                },
            }
        }
        Ok(())
    }

    fn advance(&mut self, events: &mut Vec<RangeEvent>) -> Result<(), CoreError> {
        let pairs = self
            .engine
            .step(&mut self.world, self.clock.dt_ms())
            .map_err(|e| self.fail(e))?;
        let now = self.clock.advance();

        for hit in self.resolver.resolve(&mut self.world, &pairs, now) {
            events.push(RangeEvent::TargetHit {
                target: hit.target,
                score: hit.score,
            });
        }

        let mut removed_any = false;
        for target in self.resolver.drain_due(now) {
            match self.world.remove_body(target) {
                Ok(_) => {
                    tracing::debug!(%target, "Target removed");
                    removed_any = true;
                    events.push(RangeEvent::TargetRemoved { target });
                },
                Err(e) => tracing::warn!(error = %e, "Pending removal already satisfied"),
            }
        }
        if removed_any && self.world.with_label(BodyLabel::Target).next().is_none() {
            tracing::info!(score = self.resolver.score().value(), "All targets cleared");
            events.push(RangeEvent::AllTargetsCleared);
        }
        Ok(())
    }

    fn forecast(&mut self) -> Result<Vec<Vec2>, CoreError> {
        if self.stopped || self.launch.state() == LaunchState::Launched {
            return Ok(Vec::new());
        }
        let Some(velocity) = self.launch.armed_velocity() else {
            return Ok(Vec::new());
        };
        let Some(request) = PredictionRequest::for_ball(
            &self.world,
            self.bodies.ball,
            velocity,
            self.config.prediction.steps,
            self.clock.dt_ms(),
        ) else {
            return Err(CoreError::NotFound(self.bodies.ball));
        };
        predict_path(&mut self.engine, &request).map_err(|e| self.fail(e))
    }

    fn snapshot(&mut self) -> Result<Snapshot, CoreError> {
        let trajectory = self.forecast()?;

        let ball = self
            .world
            .get(self.bodies.ball)
            .ok_or(CoreError::NotFound(self.bodies.ball))?;
        let ball = BallView {
            position: ball.position,
            radius: ball.radius().unwrap_or_default(),
        };

        let ground = self
            .world
            .get(self.bodies.ground)
            .ok_or(CoreError::NotFound(self.bodies.ground))?;
        let (width, height) = match ground.shape {
            Shape::Rect { width, height } => (width, height),
            Shape::Circle { radius } => (radius * 2.0, radius * 2.0),
        };
        let ground = GroundView {
            center: ground.position,
            width,
            height,
        };

        let targets = self
            .world
            .with_label(BodyLabel::Target)
            .filter_map(|b| {
                Some(TargetView {
                    id: b.id()?,
                    position: b.position,
                    radius: b.radius()?,
                    hit: b.hit,
                })
            })
            .collect();

        Ok(Snapshot {
            tick: self.clock.ticks(),
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
            ball,
            ground,
            targets,
            score: self.resolver.score().value(),
            launch_state: self.launch.state(),
            aim: self.launch.aim(),
            trajectory,
            paused: self.paused,
        })
    }

    /// Record a fatal error so every later tick reports it too.
    fn fail(&mut self, err: CoreError) -> CoreError {
        if err.is_fatal() {
            tracing::error!(error = %err, "Physics adapter failed, session halted");
            self.failure = Some(err.clone());
        }
        err
    }

    pub fn status(&self) -> SessionStatus {
        if self.failure.is_some() {
            SessionStatus::Failed
        } else if self.stopped {
            SessionStatus::Stopped
        } else if self.paused {
            SessionStatus::Paused
        } else {
            SessionStatus::Running
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn ball(&self) -> BodyId {
        self.bodies.ball
    }

    pub fn target_ids(&self) -> &[BodyId] {
        &self.bodies.targets
    }

    pub fn launch_state(&self) -> LaunchState {
        self.launch.state()
    }

    pub fn score(&self) -> u32 {
        self.resolver.score().value()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }
}

fn build_world<E: PhysicsEngine + ?Sized>(
    engine: &E,
    arena: &Arena,
    config: &RangeConfig,
) -> Result<(World, ArenaBodies), CoreError> {
    let physics = &config.physics;
    let mut world = engine.create_world(Vec2::new(physics.gravity_x, physics.gravity_y));
    let bodies = arena.populate(engine, &mut world, physics)?;
    Ok((world, bodies))
}

fn reject(events: &mut Vec<RangeEvent>, command: Command, reason: &str) {
    tracing::warn!(?command, reason, "Command rejected");
    events.push(RangeEvent::CommandRejected {
        command,
        reason: reason.to_string(),
    });
}
