//! Gravity, floor clamp, platform landing and the midline scroll.
//!
//! Canvas coordinates: origin top left, y grows downward, so "up" is a
//! negative velocity.

use crate::simulation::{Platform, Player};

/// Integrate one tick of gravity and clamp the player onto the floor
/// - leaves the ground flag cleared when airborne, landing on a platform
///   is decided afterwards by [`resolve_collisions`]
pub fn apply_gravity(player: &mut Player, gravity: f32, floor: f32) {
    player.velocity.y += gravity;
    player.position.y += player.velocity.y;

    if player.bottom() > floor {
        player.position.y = floor - player.size.height;
        player.velocity.y = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }
}

/// Land the player on any platform it fell onto this tick
///
/// Only downward movement is resolved, and only when the feet were at or
/// above the platform top before the move. Sideways and head-on overlaps
/// pass through.
pub fn resolve_collisions(player: &mut Player, platforms: &[Platform]) {
    for platform in platforms {
        if !player.bounding_box().intersects(&platform.bounding_box) {
            continue;
        }
        let previous_bottom = player.bottom() - player.velocity.y;
        if player.velocity.y > 0.0 && previous_bottom <= platform.top() {
            player.position.y = platform.top() - player.size.height;
            player.velocity.y = 0.0;
            player.on_ground = true;
        }
    }
}

/// Consume a pending jump request if the player stands on something
pub fn try_jump(player: &mut Player, jump_strength: f32) -> bool {
    if player.jump_requested && player.on_ground {
        player.velocity.y = -jump_strength;
        player.on_ground = false;
        player.jump_requested = false;
        true
    } else {
        false
    }
}

/// Apply horizontal velocity, keeping the player inside the canvas
pub fn move_horizontally(player: &mut Player, canvas_width: f32) {
    let max_x = (canvas_width - player.size.width).max(0.0);
    player.position.x = (player.position.x + player.velocity.x).clamp(0.0, max_x);
}

/// Pin the player to `midline` once above it and move the world down instead
/// - returns how far everything was shifted, 0 when no scroll happened
pub fn scroll(player: &mut Player, platforms: &mut [Platform], midline: f32) -> f32 {
    if player.position.y >= midline {
        return 0.0;
    }
    let delta = midline - player.position.y;
    player.position.y = midline;
    for platform in platforms.iter_mut() {
        platform.shift_down(delta);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Point, Size};
    use approx::assert_relative_eq;

    const FLOOR: f32 = 600.0;
    const GRAVITY: f32 = 1.0;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(
            Point { x, y },
            Size {
                width: 50.0,
                height: 60.0,
            },
        )
    }

    #[test]
    fn velocity_strictly_increases_until_ground_contact() {
        let mut player = player_at(100.0, 0.0);
        let mut last_velocity = player.velocity.y;

        loop {
            apply_gravity(&mut player, GRAVITY, FLOOR);
            if player.on_ground {
                break;
            }
            assert!(player.velocity.y > last_velocity);
            last_velocity = player.velocity.y;
        }

        assert_relative_eq!(player.bottom(), FLOOR);
        assert_relative_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn standing_on_the_floor_stays_grounded() {
        let mut player = player_at(100.0, FLOOR - 60.0);
        for _ in 0..10 {
            apply_gravity(&mut player, GRAVITY, FLOOR);
            assert!(player.on_ground);
            assert_relative_eq!(player.bottom(), FLOOR);
        }
    }

    #[test]
    fn falling_player_lands_on_platform_top() {
        let platform = Platform::new(80.0, 300.0, 100.0, 20.0);
        // feet 5px above the platform, falling fast enough to sink into it
        let mut player = player_at(100.0, 235.0);
        player.velocity.y = 11.0;

        apply_gravity(&mut player, GRAVITY, FLOOR);
        assert!(player.bottom() > platform.top());
        resolve_collisions(&mut player, &[platform]);

        assert!(player.on_ground);
        assert!(player.bottom() <= platform.top());
        assert_relative_eq!(player.bottom(), platform.top());
        assert_relative_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn rising_player_passes_through_platform() {
        let platform = Platform::new(80.0, 300.0, 100.0, 20.0);
        let mut player = player_at(100.0, 320.0);
        player.velocity.y = -10.0;

        apply_gravity(&mut player, GRAVITY, FLOOR);
        resolve_collisions(&mut player, &[platform]);

        assert!(!player.on_ground);
        assert!(player.velocity.y < 0.0);
    }

    #[test]
    fn side_overlap_is_not_resolved() {
        // feet already below the platform top before the move
        let platform = Platform::new(80.0, 300.0, 100.0, 20.0);
        let mut player = player_at(40.0, 260.0);
        player.velocity.y = 2.0;

        resolve_collisions(&mut player, &[platform]);

        assert!(player.bounding_box().intersects(&platform.bounding_box));
        assert!(!player.on_ground);
    }

    #[test]
    fn jump_needs_ground_and_request() {
        let mut player = player_at(100.0, 0.0);
        player.jump_requested = true;
        assert!(!try_jump(&mut player, 20.0));
        assert!(player.jump_requested);

        player.on_ground = true;
        assert!(try_jump(&mut player, 20.0));
        assert_relative_eq!(player.velocity.y, -20.0);
        assert!(!player.on_ground);
        assert!(!player.jump_requested);
    }

    #[test]
    fn horizontal_movement_is_clamped_to_canvas() {
        let mut player = player_at(5.0, 0.0);
        player.velocity.x = -10.0;
        move_horizontally(&mut player, 800.0);
        assert_relative_eq!(player.position.x, 0.0);

        player.position.x = 745.0;
        player.velocity.x = 10.0;
        move_horizontally(&mut player, 800.0);
        assert_relative_eq!(player.position.x, 750.0);
    }

    #[test]
    fn scroll_pins_player_and_keeps_relative_distances() {
        let mut player = player_at(100.0, 250.0);
        let mut platforms = vec![
            Platform::new(0.0, 580.0, 800.0, 20.0),
            Platform::new(300.0, 120.0, 100.0, 20.0),
        ];
        let gaps_before: Vec<f32> = platforms
            .iter()
            .map(|p| p.top() - player.position.y)
            .collect();

        let delta = scroll(&mut player, &mut platforms, 300.0);

        assert_relative_eq!(delta, 50.0);
        assert_relative_eq!(player.position.y, 300.0);
        for (platform, gap) in platforms.iter().zip(gaps_before) {
            assert_relative_eq!(platform.top() - player.position.y, gap);
        }
    }

    #[test]
    fn no_scroll_below_midline() {
        let mut player = player_at(100.0, 400.0);
        let mut platforms = vec![Platform::new(300.0, 120.0, 100.0, 20.0)];

        assert_eq!(scroll(&mut player, &mut platforms, 300.0), 0.0);
        assert_relative_eq!(platforms[0].top(), 120.0);
    }
}
