//! Endless level generation
//!
//! Keeps at least one screen of platforms stacked above the player and
//! forgets platforms once they scroll out below the canvas.

use crate::config::{GameConfig, GeneratorConfig};
use crate::engine::Size;
use crate::simulation::{Platform, Player};
use rand::Rng;
use rand_pcg::Pcg32;

pub struct LevelGenerator {
    rng: Pcg32,
    settings: GeneratorConfig,
    canvas: Size,
    platform_size: Size,
    /// y of the highest platform ever placed, shifted along with scrolling
    highest: f32,
}

impl LevelGenerator {
    /// Start the watermark at the highest of the `existing` platforms
    pub fn new(rng: Pcg32, config: &GameConfig, existing: &[Platform]) -> Self {
        let highest = existing
            .iter()
            .map(Platform::top)
            .fold(config.canvas_height, f32::min);
        LevelGenerator {
            rng,
            settings: config.generator.clone(),
            canvas: Size {
                width: config.canvas_width,
                height: config.canvas_height,
            },
            platform_size: Size {
                width: config.platform_width,
                height: config.platform_height,
            },
            highest,
        }
    }

    pub fn highest(&self) -> f32 {
        self.highest
    }

    /// Follow a world scroll of `delta` pixels
    pub fn shift(&mut self, delta: f32) {
        self.highest += delta;
    }

    /// Drop platforms whose top is below the bottom of the canvas
    pub fn prune(&self, platforms: &mut Vec<Platform>) {
        let bottom = self.canvas.height;
        platforms.retain(|platform| platform.top() <= bottom);
    }

    /// Add rows until the watermark is a full screen above the player
    /// - returns how many platforms were added
    pub fn fill(&mut self, player: &Player, platforms: &mut Vec<Platform>) -> usize {
        let target = player.position.y - self.canvas.height;
        let before = platforms.len();

        while self.highest > target {
            let gap = self
                .rng
                .gen_range(self.settings.min_gap..=self.settings.max_gap);
            let y = self.highest - gap;

            if self.rng.gen_bool(self.settings.cluster_chance) {
                let span = self.platform_size.width * 2.0 + self.settings.cluster_spacing;
                let x = self.pick_x(player.position.x, span);
                platforms.push(self.platform_at(x, y));
                platforms.push(self.platform_at(
                    x + self.platform_size.width + self.settings.cluster_spacing,
                    y,
                ));
            } else {
                let x = self.pick_x(player.position.x, self.platform_size.width);
                platforms.push(self.platform_at(x, y));
            }
            self.highest = y;
        }

        platforms.len() - before
    }

    /// Left edge for something `span` wide
    ///
    /// Candidates must sit inside the middle half of the canvas and start
    /// within jump distance of `player_x`. When those ranges do not meet the
    /// middle band alone is used.
    fn pick_x(&mut self, player_x: f32, span: f32) -> f32 {
        let band_low = self.canvas.width * 0.25;
        let band_high = self.canvas.width * 0.75 - span;
        if band_high < band_low {
            return ((self.canvas.width - span) / 2.0).max(0.0);
        }

        let low = band_low.max(player_x - self.settings.max_jump_distance);
        let high = band_high.min(player_x + self.settings.max_jump_distance);
        let (low, high) = if low <= high {
            (low, high)
        } else {
            (band_low, band_high)
        };
        self.rng.gen_range(low..=high)
    }

    fn platform_at(&self, x: f32, y: f32) -> Platform {
        Platform::new(x, y, self.platform_size.width, self.platform_size.height)
    }
}
