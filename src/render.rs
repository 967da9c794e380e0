use crate::agent::Agent;
use crate::ground::Ground;
use crate::obstacle::Obstacle;
use crate::population::Population;

/// Borrowed view of everything a presentation layer needs after a tick.
pub struct Frame<'a, C> {
    pub generation: u32,
    pub tick: u64,
    pub score: u32,
    pub population: &'a Population<C>,
    pub obstacles: &'a [Obstacle],
    pub ground: &'a Ground,
}

impl<'a, C> Frame<'a, C> {
    pub fn agents(&self) -> impl Iterator<Item = &'a Agent> {
        let population: &'a Population<C> = self.population;
        population.agents()
    }

    pub fn alive(&self) -> usize {
        self.population.len()
    }
}

/// Receives one frame per tick. The core never reads anything back.
pub trait Renderer {
    fn draw<C>(&mut self, frame: &Frame<'_, C>);
}

/// Headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw<C>(&mut self, _frame: &Frame<'_, C>) {}
}

/// Emits a `trace` event every `every` ticks; useful when watching a run from a terminal.
#[derive(Clone, Copy, Debug)]
pub struct TraceRenderer {
    pub every: u64,
}

impl Renderer for TraceRenderer {
    fn draw<C>(&mut self, frame: &Frame<'_, C>) {
        if self.every == 0 || frame.tick % self.every != 0 {
            return;
        }
        let lowest = frame
            .agents()
            .map(|a| a.y())
            .fold(f32::NEG_INFINITY, f32::max);
        tracing::trace!(
            generation = frame.generation,
            tick = frame.tick,
            score = frame.score,
            alive = frame.alive(),
            obstacles = frame.obstacles.len(),
            lowest_agent_y = lowest,
            ground_x = frame.ground.x1,
            "frame"
        );
    }
}
