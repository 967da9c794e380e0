use crate::config;

/// Opacity bitmap used for pixel-exact collision. Rows are packed into `u64` words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// Fully transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, opaque: impl Fn(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// Ellipse inscribed in the `width` x `height` box, sampled at pixel centres.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = width as f32 * 0.5;
        let ry = height as f32 * 0.5;
        Self::from_fn(width, height, |x, y| {
            let nx = (x as f32 + 0.5 - rx) / rx;
            let ny = (y as f32 + 0.5 - ry) / ry;
            nx * nx + ny * ny <= 1.0
        })
    }

    pub fn flipped_vertical(&self) -> Self {
        let mut flipped = Self::new(self.width, self.height);
        for y in 0..self.height {
            let src = self.row_start(y);
            let dst = flipped.row_start(self.height - 1 - y);
            flipped.bits[dst..dst + self.words_per_row]
                .copy_from_slice(&self.bits[src..src + self.words_per_row]);
        }
        flipped
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.bits[self.row_start(y) + (x / 64) as usize];
        (word >> (x % 64)) & 1 == 1
    }

    pub fn set(&mut self, x: u32, y: u32, opaque: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.row_start(y) + (x / 64) as usize;
        let bit = 1u64 << (x % 64);
        if opaque {
            self.bits[idx] |= bit;
        } else {
            self.bits[idx] &= !bit;
        }
    }

    /// First opaque pixel shared with `other` when `other`'s top-left corner sits at
    /// `offset` in this mask's coordinates. Scans row-major; `None` means no contact.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> Option<(i32, i32)> {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i32).min(self.width as i32);
        let y1 = (dy + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - dx) as u32, (y - dy) as u32) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    fn row_start(&self, y: u32) -> usize {
        y as usize * self.words_per_row
    }
}

/// Silhouettes shared by every agent and obstacle in an episode.
#[derive(Clone, Debug)]
pub struct Sprites {
    pub agent: Mask,
    pub barrier_top: Mask,
    pub barrier_bottom: Mask,
}

impl Default for Sprites {
    fn default() -> Self {
        let barrier = Mask::filled(config::OBSTACLE_WIDTH, config::OBSTACLE_HEIGHT);
        Self {
            agent: Mask::ellipse(config::AGENT_WIDTH, config::AGENT_HEIGHT),
            barrier_top: barrier.flipped_vertical(),
            barrier_bottom: barrier,
        }
    }
}

impl Sprites {
    pub fn agent_height(&self) -> f32 {
        self.agent.height() as f32
    }

    pub fn barrier_width(&self) -> f32 {
        self.barrier_bottom.width() as f32
    }

    pub fn barrier_height(&self) -> f32 {
        self.barrier_top.height() as f32
    }
}
