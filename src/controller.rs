use ::rand::Rng;
use serde::Serialize;

/// What a controller sees each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Observation {
    /// Agent's vertical position.
    pub height: f32,
    /// |height - gap top| of the nearest obstacle still ahead.
    pub to_top: f32,
    /// |height - gap bottom| of the same obstacle.
    pub to_bottom: f32,
}

impl Observation {
    pub fn as_array(&self) -> [f32; 3] {
        [self.height, self.to_top, self.to_bottom]
    }
}

/// Maps an observation to an action; values above the episode's decision
/// threshold mean "jump".
pub trait Controller {
    fn decide(&mut self, obs: &Observation) -> f32;
}

impl<F> Controller for F
where
    F: FnMut(&Observation) -> f32,
{
    fn decide(&mut self, obs: &Observation) -> f32 {
        self(obs)
    }
}

/// Single tanh unit over the three inputs, shaped like a freshly initialised
/// feed-forward genome without hidden nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearController {
    pub weights: [f32; 3],
    pub bias: f32,
}

impl LinearController {
    pub fn new(weights: [f32; 3], bias: f32) -> Self {
        Self { weights, bias }
    }

    /// Weights and bias uniform in [-1, 1].
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            weights: [
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ],
            bias: rng.gen_range(-1.0..=1.0),
        }
    }
}

impl Controller for LinearController {
    fn decide(&mut self, obs: &Observation) -> f32 {
        let sum: f32 = self
            .weights
            .iter()
            .zip(obs.as_array())
            .map(|(w, x)| w * x)
            .sum();
        (sum + self.bias).tanh()
    }
}
