//! Headless side-scroller used as a fitness environment for a population of
//! controllers. One [`Episode`] owns the agents, obstacles and ground for a
//! single evaluation and credits fitness into a ledger the harness reads back.

pub mod agent;
pub mod config;
pub mod controller;
pub mod episode;
pub mod ground;
pub mod mask;
pub mod obstacle;
pub mod population;
pub mod render;
pub mod reporting;
pub mod world;

pub use agent::Agent;
pub use config::{ConfigError, EpisodeConfig};
pub use controller::{Controller, LinearController, Observation};
pub use episode::{Episode, EpisodeReport, EpisodeState, TerminationReason};
pub use ground::Ground;
pub use mask::{Mask, Sprites};
pub use obstacle::{Obstacle, ObstacleGenerator};
pub use population::{AgentId, Member, Population};
pub use render::{Frame, NullRenderer, Renderer, TraceRenderer};
pub use reporting::{FitnessSummary, GenerationHistory, GenerationRecord};
pub use world::World;
