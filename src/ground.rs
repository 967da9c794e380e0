use crate::config;

/// Two identical tiles scrolling left; whichever leaves the screen is moved to
/// trail the other, so the strip never ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Ground {
    pub y: f32,
    pub tile_width: f32,
    pub x1: f32,
    pub x2: f32,
}

impl Default for Ground {
    fn default() -> Self {
        Self::new(config::GROUND_Y, config::GROUND_TILE_WIDTH)
    }
}

impl Ground {
    pub fn new(y: f32, tile_width: f32) -> Self {
        Self {
            y,
            tile_width,
            x1: 0.0,
            x2: tile_width,
        }
    }

    /// Scroll by `velocity`, the same per-tick speed obstacles move at.
    pub fn advance(&mut self, velocity: f32) {
        self.x1 -= velocity;
        self.x2 -= velocity;

        if self.x1 + self.tile_width < 0.0 {
            self.x1 = self.x2 + self.tile_width;
        }
        if self.x2 + self.tile_width < 0.0 {
            self.x2 = self.x1 + self.tile_width;
        }
    }

    pub fn tiles(&self) -> [f32; 2] {
        [self.x1, self.x2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_stay_one_width_apart_across_many_wraps() {
        let mut ground = Ground::default();
        for _ in 0..10_000 {
            ground.advance(config::SCROLL_VELOCITY);
            let gap = (ground.x1 - ground.x2).abs();
            assert_eq!(gap, ground.tile_width);
            assert!(ground.x1.min(ground.x2) >= -ground.tile_width);
        }
    }

    #[test]
    fn leading_tile_jumps_behind_the_other_once_off_screen() {
        let mut ground = Ground::new(730.0, 10.0);
        ground.advance(10.0);
        assert_eq!(ground.tiles(), [-10.0, 0.0]);
        ground.advance(1.0);
        assert_eq!(ground.tiles(), [9.0, -1.0]);
    }
}
