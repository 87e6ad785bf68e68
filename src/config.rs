//! Tunable game constants
//!
//! Every field has a default, a `config.json` next to the page may override
//! any subset of them.

use crate::browser;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = "config.json";

/// Which of the three game variants to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Iteration {
    /// Fixed platforms, player drawn as a solid block
    Blocks,
    /// Fixed platforms, animated player sprite
    Sprites,
    /// Generated platforms, scrolling, fire background
    #[default]
    Endless,
}

impl Iteration {
    pub fn is_endless(&self) -> bool {
        matches!(self, Iteration::Endless)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub iteration: Iteration,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// added to vertical velocity every tick
    pub gravity: f32,
    /// upward velocity at take off
    pub jump_strength: f32,
    pub run_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub generator: GeneratorConfig,
    /// fixed seed for reproducible levels, entropy when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            iteration: Iteration::default(),
            canvas_width: 800.0,
            canvas_height: 600.0,
            gravity: 1.0,
            jump_strength: 20.0,
            run_speed: 5.0,
            player_width: 50.0,
            player_height: 60.0,
            platform_width: 100.0,
            platform_height: 20.0,
            generator: GeneratorConfig::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// probability of a two platform cluster instead of a single platform
    pub cluster_chance: f64,
    /// vertical distance between successive platform rows
    pub min_gap: f32,
    pub max_gap: f32,
    /// how far from the player's x a new platform may start
    pub max_jump_distance: f32,
    /// horizontal space between the two platforms of a cluster
    pub cluster_spacing: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            cluster_chance: 0.2,
            min_gap: 80.0,
            max_gap: 140.0,
            max_jump_distance: 200.0,
            cluster_spacing: 60.0,
        }
    }
}

impl GameConfig {
    /// Highest a jump from rest can lift the player's feet
    ///
    /// Position integrates after velocity, so the rise is the sum
    /// `(j - g) + (j - 2g) + ... + (j - ng)` over the `n` ticks the velocity
    /// stays negative, with `n = ceil(j / g) - 1`.
    pub fn jump_reach(&self) -> f32 {
        if self.gravity <= 0.0 {
            return f32::INFINITY;
        }
        let jump = f64::from(self.jump_strength);
        let gravity = f64::from(self.gravity);
        let ticks = ((jump / gravity).ceil() - 1.0).max(0.0);
        (ticks * jump - gravity * ticks * (ticks + 1.0) / 2.0) as f32
    }

    pub fn with_canvas_size(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.canvas_width > 0.0 && self.canvas_height > 0.0,
            "canvas must have a positive size, got {}x{}",
            self.canvas_width,
            self.canvas_height
        );
        ensure!(self.gravity > 0.0, "gravity must be positive, got {}", self.gravity);
        ensure!(
            self.jump_strength > self.gravity,
            "jump_strength {} must exceed gravity {}",
            self.jump_strength,
            self.gravity
        );
        ensure!(
            self.player_width > 0.0 && self.player_height > 0.0,
            "player must have a positive size"
        );
        ensure!(
            self.platform_width > 0.0 && self.platform_height > 0.0,
            "platforms must have a positive size"
        );

        let generator = &self.generator;
        ensure!(
            (0.0..=1.0).contains(&generator.cluster_chance),
            "cluster_chance must be within [0, 1], got {}",
            generator.cluster_chance
        );
        ensure!(
            generator.min_gap > 0.0 && generator.min_gap <= generator.max_gap,
            "gaps must satisfy 0 < min_gap <= max_gap, got {}..{}",
            generator.min_gap,
            generator.max_gap
        );
        ensure!(
            generator.max_gap <= self.jump_reach(),
            "max_gap {} is out of jump reach {}",
            generator.max_gap,
            self.jump_reach()
        );
        ensure!(
            generator.max_jump_distance >= 0.0 && generator.cluster_spacing >= 0.0,
            "distances must not be negative"
        );
        Ok(())
    }
}

/// Fetch `config.json`, falling back to defaults when it is missing
/// - a config that parses but fails validation is an error
pub async fn load() -> Result<GameConfig> {
    let config = match browser::fetch_json::<GameConfig>(CONFIG_PATH).await {
        Ok(config) => config,
        Err(err) => {
            log!("No usable {}, using defaults : {:#}", CONFIG_PATH, err);
            GameConfig::default()
        }
    };
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", CONFIG_PATH))?;
    Ok(config)
}
