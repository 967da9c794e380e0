use crate::config;

/// Fixed screen-space bounds of one episode. Y grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new(config::WORLD_WIDTH, config::WORLD_HEIGHT, config::GROUND_Y)
    }
}

impl World {
    pub fn new(width: f32, height: f32, ground_y: f32) -> Self {
        Self {
            width,
            height,
            ground_y,
        }
    }

    /// A body whose top edge is at `top` and spans `body_height` pixels is out of
    /// bounds once it touches the ground line or rises above the top edge.
    pub fn is_out_of_bounds(&self, top: f32, body_height: f32) -> bool {
        top + body_height >= self.ground_y || top < 0.0
    }

    /// True once a span starting at `x` with `width` has fully left the screen.
    pub fn is_off_left(&self, x: f32, width: f32) -> bool {
        x + width < 0.0
    }
}
