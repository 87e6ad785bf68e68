use crate::engine::{self, Point, Rect, Renderer, Size};
use crate::sprite::state::{Animator, FrameCounter};
use crate::sprite::{AnimationState, Fire, Idle, Jumping, Running, SpriteState};
use anyhow::{Context, Result};
use futures::try_join;
use web_sys::HtmlImageElement;

async fn load_sheet<S: SpriteState>() -> Result<HtmlImageElement> {
    let path = S::metadata().image_path;
    engine::load_image(path)
        .await
        .with_context(|| format!("Failed to load {} sprite sheet from : {}", S::name(), path))
}

/// One sheet per animation state
/// ┌──────────── State → Sheet ─────────────┐
/// │  Idle     →  idle.png  (4 frames)      │
/// │  Running  →  run.png   (8 frames)      │
/// │  Jumping  →  jump.png  (2 frames)      │
/// └────────────────────────────────────────┘
pub struct HeroSprite {
    idle: HtmlImageElement,
    running: HtmlImageElement,
    jumping: HtmlImageElement,
}

impl HeroSprite {
    /// All three sheets load in parallel, the slowest one sets the pace
    pub async fn load() -> Result<Self> {
        let (idle, running, jumping) = try_join!(
            load_sheet::<Idle>(),
            load_sheet::<Running>(),
            load_sheet::<Jumping>(),
        )?;
        Ok(HeroSprite {
            idle,
            running,
            jumping,
        })
    }

    fn sheet(&self, state: AnimationState) -> &HtmlImageElement {
        match state {
            AnimationState::Idle => &self.idle,
            AnimationState::Running => &self.running,
            AnimationState::Jumping => &self.jumping,
        }
    }

    /// Draw the current frame stretched over the player's bounding box
    pub fn draw(&self, renderer: &Renderer, animator: &Animator, bounding_box: &Rect) {
        renderer.draw_sprite(
            self.sheet(animator.state()),
            &animator.source_rect(),
            bounding_box,
            animator.facing().is_flipped(),
        );
    }
}

/// Row of looping flames along the bottom of the canvas
pub struct FireSprite {
    image: HtmlImageElement,
    destinations: Vec<Rect>,
}

impl FireSprite {
    pub async fn load(canvas: Size) -> Result<Self> {
        let image = load_sheet::<Fire>().await?;
        Ok(FireSprite {
            image,
            destinations: Self::layout(canvas),
        })
    }

    /// Tile flames edge to edge, the last one may hang off the right side
    fn layout(canvas: Size) -> Vec<Rect> {
        let size = Fire::metadata().frame_size;
        let count = (canvas.width / size.width).ceil() as usize;
        (0..count)
            .map(|i| {
                Rect::new(
                    Point {
                        x: i as f32 * size.width,
                        y: canvas.height - size.height,
                    },
                    size,
                )
            })
            .collect()
    }

    pub fn draw(&self, renderer: &Renderer, counter: &FrameCounter) {
        let frame = Fire::frame_rect(counter.frame());
        for destination in &self.destinations {
            renderer.draw_sprite(&self.image, &frame, destination, false);
        }
    }
}
