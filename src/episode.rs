use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, trace};

use crate::agent::Agent;
use crate::config::{ConfigError, EpisodeConfig};
use crate::controller::{Controller, Observation};
use crate::ground::Ground;
use crate::mask::Sprites;
use crate::obstacle::{Obstacle, ObstacleGenerator};
use crate::population::{AgentId, Member, Population};
use crate::render::{Frame, NullRenderer, Renderer};
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// No agent left alive.
    Extinct,
    /// Score went past the ceiling.
    Solved,
    /// Stopped from outside.
    Cancelled,
    /// Hit the optional `max_ticks` cap.
    TickLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    Running,
    Terminated(TerminationReason),
}

/// Outcome handed back to the training harness.
#[derive(Clone, Debug, Serialize)]
pub struct EpisodeReport {
    pub generation: u32,
    pub ticks: u64,
    pub score: u32,
    pub reason: TerminationReason,
    /// Indexed like the controllers passed to [`Episode::new`].
    pub fitness: Vec<f32>,
}

/// One evaluation run of a whole population against a shared obstacle course.
pub struct Episode<C> {
    config: EpisodeConfig,
    world: World,
    sprites: Sprites,
    generation: u32,
    population: Population<C>,
    fitness: Vec<f32>,
    obstacles: Vec<Obstacle>,
    generator: ObstacleGenerator,
    ground: Ground,
    score: u32,
    tick_count: u64,
    state: EpisodeState,
}

impl<C: Controller> Episode<C> {
    /// Every controller gets a fresh agent at the start position and a fitness
    /// slot matching its position in `controllers`.
    pub fn new(
        config: EpisodeConfig,
        generation: u32,
        controllers: impl IntoIterator<Item = C>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let controllers: Vec<C> = controllers.into_iter().collect();
        let mut population = Population::new(controllers.len());
        for (slot, controller) in controllers.into_iter().enumerate() {
            population.insert(Member {
                agent: Agent::default(),
                controller,
                fitness_slot: slot,
            });
        }

        let mut generator = ObstacleGenerator::new(&config);
        let mut obstacles = Vec::new();
        if config.seed_obstacle {
            obstacles.push(generator.spawn(config.spawn_x));
        }

        let fitness = vec![0.0; population.len()];
        debug!(
            generation,
            agents = population.len(),
            seed = config.seed,
            "episode started"
        );

        let state = if population.is_empty() {
            EpisodeState::Terminated(TerminationReason::Extinct)
        } else {
            EpisodeState::Running
        };

        Ok(Self {
            config,
            world: World::default(),
            sprites: Sprites::default(),
            generation,
            population,
            fitness,
            obstacles,
            generator,
            ground: Ground::default(),
            score: 0,
            tick_count: 0,
            state,
        })
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EpisodeState::Running
    }

    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn sprites(&self) -> &Sprites {
        &self.sprites
    }

    pub fn population(&self) -> &Population<C> {
        &self.population
    }

    pub fn alive(&self) -> usize {
        self.population.len()
    }

    /// What the controller behind `id` would see right now.
    pub fn observation(&self, id: AgentId) -> Option<Observation> {
        let member = self.population.get(id)?;
        let sentinel = Obstacle::sentinel(&self.config);
        Some(observe(&member.agent, &self.obstacles, &sentinel, &self.sprites))
    }

    /// Ends the episode before the next tick.
    pub fn cancel(&mut self) {
        if self.is_running() {
            self.finish(TerminationReason::Cancelled);
        }
    }

    pub fn tick(&mut self) -> EpisodeState {
        self.tick_with(&mut NullRenderer)
    }

    /// Advances the whole world by one tick and hands the result to `renderer`.
    /// Does nothing once terminated.
    pub fn tick_with(&mut self, renderer: &mut impl Renderer) -> EpisodeState {
        if !self.is_running() {
            return self.state;
        }

        // An empty course gets a real obstacle; the sentinel only covers
        // observations taken before this tick.
        if self.obstacles.is_empty() {
            self.obstacles.push(self.generator.spawn(self.config.spawn_x));
        }

        // Controllers see the world before anything moves
        self.observe_and_decide();

        // Physics
        for (_, member) in self.population.iter_mut() {
            member.agent.advance();
        }

        // Collisions and passes, then the course scrolls
        let spawn = self.resolve_contacts();
        self.advance_obstacles(spawn);

        // Ground and ceiling
        self.cull_out_of_bounds();

        self.tick_count += 1;
        self.check_termination();
        self.ground.advance(self.config.scroll_velocity);

        renderer.draw(&self.frame());
        self.state
    }

    pub fn run(&mut self) -> TerminationReason {
        self.run_with(&mut NullRenderer, &AtomicBool::new(false))
    }

    /// Ticks until terminated. `stop` is polled before every tick.
    pub fn run_with(&mut self, renderer: &mut impl Renderer, stop: &AtomicBool) -> TerminationReason {
        loop {
            if stop.load(Ordering::Relaxed) {
                self.cancel();
            }
            if let EpisodeState::Terminated(reason) = self.tick_with(renderer) {
                return reason;
            }
        }
    }

    pub fn frame(&self) -> Frame<'_, C> {
        Frame {
            generation: self.generation,
            tick: self.tick_count,
            score: self.score,
            population: &self.population,
            obstacles: &self.obstacles,
            ground: &self.ground,
        }
    }

    /// Consumes the episode. A still-running episode is reported as cancelled.
    pub fn into_report(mut self) -> EpisodeReport {
        self.cancel();
        let reason = match self.state {
            EpisodeState::Terminated(reason) => reason,
            EpisodeState::Running => TerminationReason::Cancelled,
        };
        EpisodeReport {
            generation: self.generation,
            ticks: self.tick_count,
            score: self.score,
            reason,
            fitness: self.fitness,
        }
    }

    fn observe_and_decide(&mut self) {
        let sentinel = Obstacle::sentinel(&self.config);
        let threshold = self.config.decision_threshold;
        let bonus = self.config.survival_bonus;

        for (_, member) in self.population.iter_mut() {
            let obs = observe(&member.agent, &self.obstacles, &sentinel, &self.sprites);
            if member.controller.decide(&obs) > threshold {
                member.agent.activate();
            }
            self.fitness[member.fitness_slot] += bonus;
        }
    }

    /// Collision and pass detection for every (obstacle, agent) pair. Colliding
    /// agents leave the population as soon as their obstacle has been checked.
    /// Returns whether a new obstacle was requested.
    fn resolve_contacts(&mut self) -> bool {
        let mut spawn = false;
        let mut hit: Vec<AgentId> = Vec::new();

        for obstacle in self.obstacles.iter_mut() {
            for (id, member) in self.population.iter() {
                if obstacle.collides_with(&member.agent, &self.sprites) {
                    hit.push(id);
                }
                if obstacle.has_passed(member.agent.x()) {
                    spawn = true;
                }
            }
            for id in hit.drain(..) {
                if let Some(member) = self.population.remove(id) {
                    trace!(
                        slot = member.fitness_slot,
                        tick = self.tick_count,
                        y = member.agent.y(),
                        "agent hit obstacle"
                    );
                }
            }
        }
        spawn
    }

    fn advance_obstacles(&mut self, spawn: bool) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(self.config.scroll_velocity);
        }

        if spawn {
            self.score += 1;
            for (_, member) in self.population.iter() {
                self.fitness[member.fitness_slot] += self.config.pass_bonus;
            }
            self.obstacles.push(self.generator.spawn(self.config.spawn_x));
        }

        let world = self.world;
        let width = self.sprites.barrier_width();
        self.obstacles.retain(|o| !world.is_off_left(o.x, width));
    }

    fn cull_out_of_bounds(&mut self) {
        let height = self.sprites.agent_height();
        let out: Vec<AgentId> = self
            .population
            .iter()
            .filter(|(_, m)| self.world.is_out_of_bounds(m.agent.y(), height))
            .map(|(id, _)| id)
            .collect();

        for id in out {
            if let Some(member) = self.population.remove(id) {
                trace!(
                    slot = member.fitness_slot,
                    tick = self.tick_count,
                    y = member.agent.y(),
                    "agent left the screen"
                );
            }
        }
    }

    fn check_termination(&mut self) {
        if self.population.is_empty() {
            self.finish(TerminationReason::Extinct);
        } else if self.score > self.config.score_ceiling {
            self.finish(TerminationReason::Solved);
        } else if self
            .config
            .max_ticks
            .is_some_and(|max| self.tick_count >= max)
        {
            self.finish(TerminationReason::TickLimit);
        }
    }

    fn finish(&mut self, reason: TerminationReason) {
        self.state = EpisodeState::Terminated(reason);
        debug!(
            generation = self.generation,
            ticks = self.tick_count,
            score = self.score,
            alive = self.population.len(),
            ?reason,
            "episode terminated"
        );
    }
}

/// Nearest obstacle whose trailing edge is not yet behind the agent, falling back
/// to the newest one, or `sentinel` when the course is empty.
fn nearest_ahead<'a>(
    agent_x: f32,
    obstacles: &'a [Obstacle],
    sentinel: &'a Obstacle,
    sprites: &Sprites,
) -> &'a Obstacle {
    obstacles
        .iter()
        .find(|o| !o.is_behind(agent_x, sprites))
        .or(obstacles.last())
        .unwrap_or(sentinel)
}

fn observe(agent: &Agent, obstacles: &[Obstacle], sentinel: &Obstacle, sprites: &Sprites) -> Observation {
    let target = nearest_ahead(agent.x(), obstacles, sentinel, sprites);
    let y = agent.y();
    Observation {
        height: y,
        to_top: (y - target.gap_top).abs(),
        to_bottom: (y - target.gap_bottom()).abs(),
    }
}
