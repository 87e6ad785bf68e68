use crate::engine::Rect;
use crate::sprite::{AnimationState, SpriteMetadata};

/// Direction the sprite looks at, `Left` is drawn mirrored
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Follow the sign of `horizontal_velocity`, keep the last direction at rest
    pub fn turn_towards(self, horizontal_velocity: f32) -> Self {
        if horizontal_velocity < 0.0 {
            Facing::Left
        } else if horizontal_velocity > 0.0 {
            Facing::Right
        } else {
            self
        }
    }

    pub fn is_flipped(&self) -> bool {
        matches!(self, Facing::Left)
    }
}

/// Frame index plus the ticks spent on it
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameCounter {
    frame: u8,
    ticks: u8,
}

impl FrameCounter {
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// One tick, move to the next frame every `animation_speed` ticks and loop
    pub fn advance(&mut self, metadata: &SpriteMetadata) {
        self.ticks += 1;
        if self.ticks >= metadata.animation_speed {
            self.ticks = 0;
            self.frame = (self.frame + 1) % metadata.frame_count.max(1);
        }
    }

    /// Each sheet has its own frame count, so a new sheet starts at frame 0
    pub fn reset(&mut self) {
        self.frame = 0;
        self.ticks = 0;
    }
}

/// Animation part of the player: which sheet, which frame, which way
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Animator {
    state: AnimationState,
    facing: Facing,
    counter: FrameCounter,
}

impl Animator {
    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn frame(&self) -> u8 {
        self.counter.frame()
    }

    /// Source rectangle in the current state's sheet
    pub fn source_rect(&self) -> Rect {
        self.state.frame_rect(self.counter.frame())
    }

    pub fn update(&mut self, horizontal_velocity: f32, on_ground: bool) {
        self.facing = self.facing.turn_towards(horizontal_velocity);

        let next = AnimationState::select(horizontal_velocity, on_ground);
        if next != self.state {
            self.state = next;
            self.counter.reset();
        } else {
            self.counter.advance(&self.state.metadata());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{Fire, Running, SpriteState};

    #[test]
    fn facing_is_kept_at_rest() {
        let facing = Facing::Right.turn_towards(-5.0);
        assert_eq!(facing, Facing::Left);
        assert_eq!(facing.turn_towards(0.0), Facing::Left);
        assert_eq!(facing.turn_towards(0.0).turn_towards(0.0), Facing::Left);
        assert!(facing.is_flipped());
        assert_eq!(facing.turn_towards(5.0), Facing::Right);
    }

    #[test]
    fn counter_advances_at_sheet_speed_and_loops() {
        let metadata = Fire::metadata();
        let mut counter = FrameCounter::default();

        for _ in 0..metadata.animation_speed - 1 {
            counter.advance(&metadata);
        }
        assert_eq!(counter.frame(), 0);
        counter.advance(&metadata);
        assert_eq!(counter.frame(), 1);

        let full_loop = metadata.animation_speed as u32 * metadata.frame_count as u32;
        for _ in 0..full_loop {
            counter.advance(&metadata);
        }
        assert_eq!(counter.frame(), 1);
    }

    #[test]
    fn state_change_resets_frame() {
        let mut animator = Animator::default();
        let speed = Running::metadata().animation_speed;

        for _ in 0..=speed * 2 {
            animator.update(5.0, true);
        }
        assert_eq!(animator.state(), AnimationState::Running);
        assert!(animator.frame() > 0);

        animator.update(5.0, false);
        assert_eq!(animator.state(), AnimationState::Jumping);
        assert_eq!(animator.frame(), 0);
    }

    #[test]
    fn idle_after_running_left_still_faces_left() {
        let mut animator = Animator::default();
        animator.update(-5.0, true);
        animator.update(0.0, true);
        assert_eq!(animator.state(), AnimationState::Idle);
        assert_eq!(animator.facing(), Facing::Left);
    }
}
