use ::rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::Agent;
use crate::config::EpisodeConfig;
use crate::mask::Sprites;

/// Pair of barriers with a fixed opening, scrolling left.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    /// Left edge of both barriers.
    pub x: f32,
    /// Upper edge of the opening (the top barrier's lower edge).
    pub gap_top: f32,
    pub gap: f32,
    /// Set once by the first agent to cross; gates spawning and the pass bonus.
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            x,
            gap_top,
            gap,
            passed: false,
        }
    }

    /// Placeholder used for observations before any obstacle exists.
    pub fn sentinel(config: &EpisodeConfig) -> Self {
        Self::new(config.spawn_x, config.sentinel_gap_top(), config.gap)
    }

    /// Upper edge of the bottom barrier.
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap
    }

    /// Where the top barrier's sprite starts so that its lower edge meets `gap_top`.
    pub fn top_barrier_y(&self, sprites: &Sprites) -> f32 {
        self.gap_top - sprites.barrier_height()
    }

    pub fn advance(&mut self, velocity: f32) {
        self.x -= velocity;
    }

    /// Marks the obstacle passed the first time its left edge moves behind `agent_x`.
    /// Returns true only on that transition.
    pub fn has_passed(&mut self, agent_x: f32) -> bool {
        if !self.passed && self.x < agent_x {
            self.passed = true;
            return true;
        }
        false
    }

    /// Trailing edge has moved behind `agent_x`.
    pub fn is_behind(&self, agent_x: f32, sprites: &Sprites) -> bool {
        agent_x > self.x + sprites.barrier_width()
    }

    /// Pixel-exact test of the agent silhouette against both barrier silhouettes.
    pub fn collides_with(&self, agent: &Agent, sprites: &Sprites) -> bool {
        let dx = (self.x - agent.x()).round() as i32;
        let agent_y = agent.y().round();
        let top_dy = (self.top_barrier_y(sprites).round() - agent_y) as i32;
        let bottom_dy = (self.gap_bottom().round() - agent_y) as i32;

        sprites
            .agent
            .overlap(&sprites.barrier_bottom, (dx, bottom_dy))
            .is_some()
            || sprites
                .agent
                .overlap(&sprites.barrier_top, (dx, top_dy))
                .is_some()
    }
}

/// Produces obstacles whose gap top is drawn uniformly from `[min, max)`.
pub struct ObstacleGenerator {
    rng: ChaCha8Rng,
    gap_top_min: u32,
    gap_top_max: u32,
    gap: f32,
}

impl ObstacleGenerator {
    pub fn new(config: &EpisodeConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            gap_top_min: config.gap_top_min,
            gap_top_max: config.gap_top_max,
            gap: config.gap,
        }
    }

    pub fn spawn(&mut self, x: f32) -> Obstacle {
        let gap_top = self.rng.gen_range(self.gap_top_min..self.gap_top_max) as f32;
        Obstacle::new(x, gap_top, self.gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use macroquad::math::vec2;

    #[test]
    fn generated_gaps_stay_in_range_with_exact_opening() {
        let config = EpisodeConfig::default();
        let mut gen = ObstacleGenerator::new(&config);
        for _ in 0..2_000 {
            let o = gen.spawn(config.spawn_x);
            assert_eq!(o.gap_bottom() - o.gap_top, config.gap);
            assert!(o.gap_top >= config.gap_top_min as f32);
            assert!(o.gap_top < config.gap_top_max as f32);
            assert_eq!(o.gap_top.fract(), 0.0);
            assert!(!o.passed);
        }
    }

    #[test]
    fn same_seed_yields_same_gap_sequence() {
        let config = EpisodeConfig {
            seed: 99,
            ..EpisodeConfig::default()
        };
        let mut a = ObstacleGenerator::new(&config);
        let mut b = ObstacleGenerator::new(&config);
        for _ in 0..50 {
            assert_eq!(a.spawn(0.0), b.spawn(0.0));
        }
    }

    #[test]
    fn pass_fires_once_per_obstacle() {
        let mut o = Obstacle::new(240.0, 200.0, config::OBSTACLE_GAP);
        assert!(!o.has_passed(230.0));
        o.advance(config::SCROLL_VELOCITY);
        o.advance(config::SCROLL_VELOCITY);
        assert_eq!(o.x, 230.0);
        assert!(!o.has_passed(230.0));
        o.advance(config::SCROLL_VELOCITY);
        assert!(o.has_passed(230.0));
        assert!(!o.has_passed(230.0));
        assert!(!o.has_passed(500.0));
        assert!(o.passed);
    }

    #[test]
    fn agent_inside_the_opening_does_not_collide() {
        let sprites = Sprites::default();
        let o = Obstacle::new(config::AGENT_START_X - 10.0, 300.0, config::OBSTACLE_GAP);
        let agent = Agent::new(vec2(config::AGENT_START_X, 350.0));
        assert!(!o.collides_with(&agent, &sprites));
    }

    #[test]
    fn agent_clipping_either_barrier_collides() {
        let sprites = Sprites::default();
        let o = Obstacle::new(config::AGENT_START_X, 300.0, config::OBSTACLE_GAP);

        let into_top = Agent::new(vec2(config::AGENT_START_X, 290.0));
        assert!(o.collides_with(&into_top, &sprites));

        let into_bottom = Agent::new(vec2(config::AGENT_START_X, 470.0));
        assert!(o.collides_with(&into_bottom, &sprites));
    }

    #[test]
    fn transparent_corner_grazing_the_barrier_edge_is_not_a_hit() {
        let sprites = Sprites::default();
        // Top barrier covers the agent box's first two rows; only the last two
        // columns are shared, and the ellipse is transparent there.
        let agent = Agent::new(vec2(config::AGENT_START_X, 398.0));
        let grazing = Obstacle::new(
            config::AGENT_START_X + config::AGENT_WIDTH as f32 - 2.0,
            400.0,
            config::OBSTACLE_GAP,
        );
        assert!(!grazing.collides_with(&agent, &sprites));

        let overhead = Obstacle::new(config::AGENT_START_X, 400.0, config::OBSTACLE_GAP);
        assert!(overhead.collides_with(&agent, &sprites));
    }

    #[test]
    fn obstacle_is_behind_once_trailing_edge_clears_agent() {
        let sprites = Sprites::default();
        let w = sprites.barrier_width();
        let o = Obstacle::new(100.0, 200.0, config::OBSTACLE_GAP);
        assert!(!o.is_behind(100.0 + w, &sprites));
        assert!(o.is_behind(100.0 + w + 1.0, &sprites));
    }

    #[test]
    fn sentinel_sits_mid_range_at_spawn() {
        let config = EpisodeConfig::default();
        let s = Obstacle::sentinel(&config);
        assert_eq!(s.x, config.spawn_x);
        assert_eq!(s.gap_top, 250.0);
    }
}
