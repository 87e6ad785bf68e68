//! All mutable game state, advanced one fixed tick at a time.
//!
//! Nothing in here touches the browser, so the whole tick runs in native
//! unit tests.

use crate::config::GameConfig;
use crate::engine::input::{KeyState, ARROW_LEFT, ARROW_RIGHT, ARROW_UP, SPACE};
use crate::engine::{Point, Rect, Size};
use crate::generator::LevelGenerator;
use crate::physics;
use crate::sprite::state::{Animator, FrameCounter};
use crate::sprite::{Fire, SpriteState};
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Something to stand on
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Platform {
    pub bounding_box: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Platform {
            bounding_box: Rect::new_from_x_y(x, y, width, height),
        }
    }

    pub fn top(&self) -> f32 {
        self.bounding_box.top()
    }

    pub fn shift_down(&mut self, delta: f32) {
        self.bounding_box.position.y += delta;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Player {
    pub position: Point,
    pub velocity: Point,
    pub size: Size,
    pub on_ground: bool,
    pub jump_requested: bool,
    pub animator: Animator,
}

impl Player {
    pub fn new(position: Point, size: Size) -> Self {
        Player {
            position,
            velocity: Point::default(),
            size,
            on_ground: false,
            jump_requested: false,
            animator: Animator::default(),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }
}

/// Input for one tick
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Controls {
    /// -1 left, 0 none, 1 right
    pub horizontal: i8,
    /// the jump key went down this tick
    pub jump: bool,
}

impl Controls {
    /// Left and right held together cancel out
    pub fn from_keys(keystate: &KeyState) -> Self {
        let mut horizontal = 0;
        if keystate.is_pressed(ARROW_LEFT) {
            horizontal -= 1;
        }
        if keystate.is_pressed(ARROW_RIGHT) {
            horizontal += 1;
        }
        Controls {
            horizontal,
            jump: keystate.was_just_pressed(SPACE) || keystate.was_just_pressed(ARROW_UP),
        }
    }
}

/// ┌──────────────────── One tick ────────────────────────┐
/// │  1. controls      → horizontal velocity              │
/// │  2. gravity       → fall, floor clamp                │
/// │  3. collisions    → land on platforms                │
/// │  4. jump          → pending request fires on landing │
/// │  5. move x        → clamp to canvas                  │
/// │  6. (Endless)     → scroll, prune, generate          │
/// │  7. animation     → state, facing, frame; fire loop  │
/// └──────────────────────────────────────────────────────┘
pub struct Simulation {
    config: GameConfig,
    player: Player,
    platforms: Vec<Platform>,
    generator: Option<LevelGenerator>,
    fire: FrameCounter,
    /// total distance the world has scrolled down
    climbed: f32,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, rng: Pcg32) -> Self {
        let player = Player::new(
            Point {
                x: 100.0,
                y: config.canvas_height - config.player_height - 100.0,
            },
            Size {
                width: config.player_width,
                height: config.player_height,
            },
        );

        let mut platforms = vec![Platform::new(
            0.0,
            config.canvas_height - config.platform_height,
            config.canvas_width,
            config.platform_height,
        )];

        let generator = if config.iteration.is_endless() {
            let mut generator = LevelGenerator::new(rng, &config, &platforms);
            let added = generator.fill(&player, &mut platforms);
            log!("Generated {} starting platforms", added);
            Some(generator)
        } else {
            platforms.extend(fixed_ledges(&config));
            None
        };

        Simulation {
            config,
            player,
            platforms,
            generator,
            fire: FrameCounter::default(),
            climbed: 0.0,
        }
    }

    pub fn update(&mut self, controls: Controls) {
        let config = &self.config;
        let player = &mut self.player;

        player.velocity.x = f32::from(controls.horizontal) * config.run_speed;

        physics::apply_gravity(player, config.gravity, config.canvas_height);
        physics::resolve_collisions(player, &self.platforms);

        // a request made in the air waits for the landing
        if controls.jump {
            player.jump_requested = true;
        }
        physics::try_jump(player, config.jump_strength);
        physics::move_horizontally(player, config.canvas_width);

        if let Some(generator) = self.generator.as_mut() {
            let delta = physics::scroll(player, &mut self.platforms, config.canvas_height / 2.0);
            generator.shift(delta);
            self.climbed += delta;
            generator.prune(&mut self.platforms);
            generator.fill(player, &mut self.platforms);
        }

        player.animator.update(player.velocity.x, player.on_ground);
        self.fire.advance(&Fire::metadata());
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn fire(&self) -> &FrameCounter {
        &self.fire
    }

    pub fn climbed(&self) -> f32 {
        self.climbed
    }

    /// Watermark of the endless generator, `None` for fixed levels
    pub fn highest_platform(&self) -> Option<f32> {
        self.generator.as_ref().map(LevelGenerator::highest)
    }
}

/// Two ledges for the fixed levels, laid out for an 800x600 canvas and
/// placed relative to the real one
fn fixed_ledges(config: &GameConfig) -> [Platform; 2] {
    let width = config.canvas_width;
    let height = config.canvas_height;
    [
        Platform::new(
            width * 0.375,
            height - 200.0,
            config.platform_width,
            config.platform_height,
        ),
        Platform::new(
            width * 0.625,
            height - 300.0,
            config.platform_width,
            config.platform_height,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Iteration;
    use crate::sprite::AnimationState;
    use approx::assert_relative_eq;

    const IDLE: Controls = Controls {
        horizontal: 0,
        jump: false,
    };
    const JUMP: Controls = Controls {
        horizontal: 0,
        jump: true,
    };

    fn simulation(iteration: Iteration) -> Simulation {
        let config = GameConfig {
            iteration,
            seed: Some(9),
            ..GameConfig::default()
        };
        Simulation::new(config)
    }

    fn settle(simulation: &mut Simulation) {
        for _ in 0..200 {
            simulation.update(IDLE);
        }
        assert!(simulation.player().on_ground);
    }

    #[test]
    fn fixed_level_has_floor_and_two_ledges() {
        let simulation = simulation(Iteration::Blocks);
        assert_eq!(simulation.platforms().len(), 3);
        assert!(simulation.highest_platform().is_none());
    }

    #[test]
    fn player_falls_then_rests_on_the_floor() {
        let mut simulation = simulation(Iteration::Sprites);
        settle(&mut simulation);

        let player = simulation.player();
        let floor = simulation.platforms()[0];
        assert_relative_eq!(player.bottom(), floor.top());
        assert_eq!(player.animator.state(), AnimationState::Idle);
    }

    #[test]
    fn jump_is_edge_triggered() {
        let mut simulation = simulation(Iteration::Blocks);
        settle(&mut simulation);

        simulation.update(JUMP);
        assert!(!simulation.player().on_ground);
        assert!(simulation.player().velocity.y < 0.0);
        assert!(!simulation.player().jump_requested);

        settle(&mut simulation);
        // nothing new pressed, nothing happens
        simulation.update(IDLE);
        assert!(simulation.player().on_ground);
    }

    #[test]
    fn request_made_in_the_air_fires_on_landing() {
        let mut simulation = simulation(Iteration::Blocks);
        settle(&mut simulation);
        simulation.update(JUMP);

        simulation.update(JUMP);
        assert!(simulation.player().jump_requested);

        let mut takeoffs = 0;
        let mut falling = false;
        for _ in 0..200 {
            simulation.update(IDLE);
            let velocity = simulation.player().velocity.y;
            if falling && velocity < 0.0 {
                takeoffs += 1;
            }
            falling = velocity > 0.0;
        }
        assert_eq!(takeoffs, 1);
        assert!(!simulation.player().jump_requested);
        assert!(simulation.player().on_ground);
    }

    #[test]
    fn press_on_the_landing_tick_jumps_right_away() {
        let mut simulation = simulation(Iteration::Blocks);
        settle(&mut simulation);
        let floor_top = simulation.platforms()[0].top();
        let gravity = simulation.config().gravity;
        simulation.update(JUMP);

        let mut pressed = false;
        for _ in 0..200 {
            let player = *simulation.player();
            let lands = player.velocity.y > 0.0
                && player.bottom() + player.velocity.y + gravity > floor_top;
            if lands {
                simulation.update(JUMP);
                pressed = true;
                break;
            }
            simulation.update(IDLE);
        }
        assert!(pressed);

        let player = simulation.player();
        assert!(!player.on_ground);
        assert_relative_eq!(player.velocity.y, -simulation.config().jump_strength);
        assert_relative_eq!(player.bottom(), floor_top);
    }

    #[test]
    fn ledges_follow_the_canvas_size() {
        let config = GameConfig {
            iteration: Iteration::Blocks,
            ..GameConfig::default()
        }
        .with_canvas_size(400.0, 400.0);
        let small = Simulation::new(config);

        let floor = small.platforms()[0];
        for ledge in &small.platforms()[1..] {
            assert!(ledge.bounding_box.bottom() < floor.top());
            assert!(ledge.top() > 0.0);
            assert!(ledge.bounding_box.right() <= 400.0);
        }

        let default = simulation(Iteration::Blocks);
        assert_relative_eq!(default.platforms()[1].top(), 400.0);
        assert_relative_eq!(default.platforms()[2].bounding_box.left(), 500.0);
    }

    #[test]
    fn running_turns_and_animates_the_player() {
        let mut simulation = simulation(Iteration::Sprites);
        settle(&mut simulation);
        let start_x = simulation.player().position.x;

        simulation.update(Controls {
            horizontal: -1,
            jump: false,
        });
        let player = simulation.player();
        assert_relative_eq!(player.position.x, start_x - simulation.config().run_speed);
        assert_eq!(player.animator.state(), AnimationState::Running);
        assert!(player.animator.facing().is_flipped());

        simulation.update(IDLE);
        assert!(simulation.player().animator.facing().is_flipped());
    }

    #[test]
    fn endless_level_starts_with_a_screen_of_platforms() {
        let simulation = simulation(Iteration::Endless);
        let player = simulation.player();
        let highest = simulation.highest_platform().unwrap();
        assert!(highest <= player.position.y - simulation.config().canvas_height);
    }

    #[test]
    fn endless_climb_keeps_every_invariant() {
        let mut simulation = simulation(Iteration::Endless);
        let height = simulation.config().canvas_height;
        let floor_top = height - simulation.config().platform_height;
        let midline = height / 2.0;
        let mut target_x: Option<f32> = None;

        for _ in 0..3_000 {
            // pick the nearest platform above while standing, steer under it,
            // then hop
            let player = *simulation.player();
            let center = player.position.x + player.size.width / 2.0;
            if player.on_ground {
                target_x = simulation
                    .platforms()
                    .iter()
                    .filter(|p| p.top() < player.bottom() - 1.0)
                    .max_by(|a, b| a.top().total_cmp(&b.top()))
                    .map(|p| p.bounding_box.left() + p.bounding_box.width() / 2.0);
            }
            let offset = target_x.map_or(0.0, |x| x - center);
            let horizontal = if offset > 5.0 {
                1
            } else if offset < -5.0 {
                -1
            } else {
                0
            };
            let on_floor = player.bottom() >= floor_top - 0.5;
            simulation.update(Controls {
                horizontal,
                jump: player.on_ground && (!on_floor || offset.abs() <= 20.0),
            });

            let player = simulation.player();
            assert!(player.position.y >= midline);
            assert!(player.bottom() <= height);
            assert!(simulation.highest_platform().unwrap() <= player.position.y - height);
            assert!(simulation.platforms().iter().all(|p| p.top() <= height));
        }

        assert!(simulation.climbed() > 0.0);
        // the starting ground scrolled out and was pruned
        let canvas_width = simulation.config().canvas_width;
        assert!(simulation
            .platforms()
            .iter()
            .all(|p| p.bounding_box.width() < canvas_width));
    }

    #[test]
    fn controls_read_held_and_fresh_keys() {
        let mut keystate = KeyState::new();
        keystate.set_pressed(ARROW_RIGHT, false);
        keystate.set_pressed(SPACE, false);
        assert_eq!(
            Controls::from_keys(&keystate),
            Controls {
                horizontal: 1,
                jump: true
            }
        );

        keystate.end_tick();
        keystate.set_pressed(ARROW_LEFT, false);
        keystate.end_tick();
        assert_eq!(Controls::from_keys(&keystate), IDLE);
    }

    #[test]
    fn fire_loops_whatever_the_player_does() {
        let mut simulation = simulation(Iteration::Endless);
        let speed = Fire::metadata().animation_speed;
        for _ in 0..speed {
            simulation.update(IDLE);
        }
        assert_eq!(simulation.fire().frame(), 1);
    }
}
