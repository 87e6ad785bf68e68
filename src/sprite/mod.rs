// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Sprite module layout                                │
// ├────────────────┬──────────────────────┬──────────────────────────────────┤
// │   Code File    │   Code Component     │         Role                     │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │                │ SpriteState trait    │ per animation sheet settings     │
// │   mod.rs       │ Idle/Running/Jumping │ one marker per player sheet      │
// │                │ Fire                 │ decorative background loop       │
// │                │ AnimationState       │ runtime tag over the markers     │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │   state.rs     │ Animator, Facing     │ frame counters + state selection │
// ├────────────────┼──────────────────────┼──────────────────────────────────┤
// │   hero.rs      │ HeroSprite           │ player sheets + mirrored draw    │
// │                │ FireSprite           │ flame row along the bottom       │
// └────────────────┴──────────────────────┴──────────────────────────────────┘
pub mod hero;
pub mod state;

use crate::engine::{Point, Rect, Size};

/// Static description of one sprite sheet
/// - sheets are horizontal strips of equally sized frames
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteMetadata {
    pub image_path: &'static str,
    pub frame_count: u8,
    /// ticks each frame stays on screen
    pub animation_speed: u8,
    pub frame_size: Size,
}

pub trait SpriteState {
    fn name() -> &'static str;
    fn metadata() -> SpriteMetadata;

    fn total_frames() -> u8 {
        Self::metadata().frame_count
    }

    /// Source rectangle of `frame` inside the sheet
    fn frame_rect(frame: u8) -> Rect {
        let metadata = Self::metadata();
        let frame = frame % metadata.frame_count.max(1);
        Rect::new(
            Point {
                x: frame as f32 * metadata.frame_size.width,
                y: 0.0,
            },
            metadata.frame_size,
        )
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Idle;

#[derive(Debug, Copy, Clone)]
pub struct Running;

#[derive(Debug, Copy, Clone)]
pub struct Jumping;

#[derive(Debug, Copy, Clone)]
pub struct Fire;

impl SpriteState for Idle {
    fn name() -> &'static str {
        "Idle"
    }

    fn metadata() -> SpriteMetadata {
        SpriteMetadata {
            image_path: "idle.png",
            frame_count: 4,
            animation_speed: 10,
            frame_size: Size {
                width: 50.0,
                height: 60.0,
            },
        }
    }
}

impl SpriteState for Running {
    fn name() -> &'static str {
        "Running"
    }

    fn metadata() -> SpriteMetadata {
        SpriteMetadata {
            image_path: "run.png",
            frame_count: 8,
            animation_speed: 4,
            frame_size: Size {
                width: 50.0,
                height: 60.0,
            },
        }
    }
}

impl SpriteState for Jumping {
    fn name() -> &'static str {
        "Jumping"
    }

    fn metadata() -> SpriteMetadata {
        SpriteMetadata {
            image_path: "jump.png",
            frame_count: 2,
            animation_speed: 8,
            frame_size: Size {
                width: 50.0,
                height: 60.0,
            },
        }
    }
}

impl SpriteState for Fire {
    fn name() -> &'static str {
        "Fire"
    }

    fn metadata() -> SpriteMetadata {
        SpriteMetadata {
            image_path: "fire.png",
            frame_count: 6,
            animation_speed: 5,
            frame_size: Size {
                width: 64.0,
                height: 64.0,
            },
        }
    }
}

/// Logical state of the player animation
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    Jumping,
}

impl AnimationState {
    /// Pick the state from physics, airborne wins over running
    pub fn select(horizontal_velocity: f32, on_ground: bool) -> Self {
        if !on_ground {
            AnimationState::Jumping
        } else if horizontal_velocity != 0.0 {
            AnimationState::Running
        } else {
            AnimationState::Idle
        }
    }

    pub fn metadata(&self) -> SpriteMetadata {
        match self {
            AnimationState::Idle => Idle::metadata(),
            AnimationState::Running => Running::metadata(),
            AnimationState::Jumping => Jumping::metadata(),
        }
    }

    pub fn frame_rect(&self, frame: u8) -> Rect {
        match self {
            AnimationState::Idle => Idle::frame_rect(frame),
            AnimationState::Running => Running::frame_rect(frame),
            AnimationState::Jumping => Jumping::frame_rect(frame),
        }
    }
}
