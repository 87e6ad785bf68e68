use crate::browser;
use crate::config::{self, GameConfig, Iteration};
use crate::engine::input::KeyState;
#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{self, Game, Image, Point, Rect, Renderer, Size};
use crate::simulation::{Controls, Simulation};
use crate::sprite::hero::{FireSprite, HeroSprite};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::try_join;

const PLAYER_COLOR: &str = "blue";
const PLATFORM_COLOR: &str = "black";
const BACKGROUND_PATH: &str = "background.png";

/// ┌───────────────────────── Frame flow ──────────────────────────────┐
/// │                                                                   │
/// │  GameLoop (engine.rs)                                             │
/// │    ├─► process_input ──► KeyState                                 │
/// │    ├─► Platformer::update × n ──► Controls ──► Simulation::update │
/// │    └─► Platformer::draw ──► Renderer                              │
/// │                                                                   │
/// └───────────────────────────────────────────────────────────────────┘
pub enum Platformer {
    /// Config and images are still loading
    Loading,

    /// Running game
    Loaded(World),
}

impl Platformer {
    pub fn new() -> Self {
        Platformer::Loading
    }

    async fn load_config() -> Result<GameConfig> {
        let (width, height) = browser::canvas_size()?;
        let config = config::load().await?.with_canvas_size(width, height);
        config
            .validate()
            .context("Canvas size does not fit the configuration")?;
        Ok(config)
    }
}

impl Default for Platformer {
    fn default() -> Self {
        Platformer::new()
    }
}

#[async_trait(?Send)]
impl Game for Platformer {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Platformer::Loading => {
                let config = Self::load_config().await?;
                let art = Art::load(&config).await?;
                log!(
                    "Starting {:?} iteration on a {}x{} canvas",
                    config.iteration,
                    config.canvas_width,
                    config.canvas_height
                );
                Ok(Box::new(Platformer::Loaded(World {
                    simulation: Simulation::new(config),
                    art,
                })))
            }
            Platformer::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let Platformer::Loaded(world) = self {
            world.simulation.update(Controls::from_keys(keystate));
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let Platformer::Loaded(world) = self {
            world.draw(renderer);
        }
    }
}

pub struct World {
    simulation: Simulation,
    art: Art,
}

impl World {
    /// background -> fire -> platforms -> player
    fn draw(&self, renderer: &Renderer) {
        let config = self.simulation.config();
        renderer.clear(&Rect::new_from_x_y(
            0.0,
            0.0,
            config.canvas_width,
            config.canvas_height,
        ));

        if let Some(background) = &self.art.background {
            background.draw(renderer);
        }
        if let Some(fire) = &self.art.fire {
            fire.draw(renderer, self.simulation.fire());
        }

        for platform in self.simulation.platforms() {
            renderer.fill_rect(&platform.bounding_box, PLATFORM_COLOR);
        }

        let player = self.simulation.player();
        let bounding_box = player.bounding_box();
        match &self.art.hero {
            Some(hero) => hero.draw(renderer, &player.animator, &bounding_box),
            None => renderer.fill_rect(&bounding_box, PLAYER_COLOR),
        }

        #[cfg(debug_assertions)]
        bounding_box.draw_debug(renderer);
    }
}

/// Images each iteration needs, missing pieces are simply not drawn
#[derive(Default)]
struct Art {
    hero: Option<HeroSprite>,
    fire: Option<FireSprite>,
    background: Option<Image>,
}

impl Art {
    async fn load(config: &GameConfig) -> Result<Art> {
        let canvas = Size {
            width: config.canvas_width,
            height: config.canvas_height,
        };
        match config.iteration {
            Iteration::Blocks => Ok(Art::default()),
            Iteration::Sprites => Ok(Art {
                hero: Some(HeroSprite::load().await?),
                ..Art::default()
            }),
            Iteration::Endless => {
                // independent downloads, total time is the slowest one
                let (hero, fire, background) = try_join!(
                    HeroSprite::load(),
                    FireSprite::load(canvas),
                    Self::load_background(canvas),
                )?;
                Ok(Art {
                    hero: Some(hero),
                    fire: Some(fire),
                    background: Some(background),
                })
            }
        }
    }

    async fn load_background(canvas: Size) -> Result<Image> {
        let element = engine::load_image(BACKGROUND_PATH)
            .await
            .with_context(|| format!("Failed to load background from : {}", BACKGROUND_PATH))?;
        Ok(Image::new(element, Rect::new(Point::default(), canvas)))
    }
}
