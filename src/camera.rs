//! First-person camera.
//!
//! Position and orientation live in continuous map coordinates (1 unit =
//! 1 cell). Orientation is the classic raycaster pair of a facing vector
//! and a camera-plane vector perpendicular to it whose magnitude encodes
//! the field of view; both are always rotated together by the same angle so
//! they stay perpendicular. `pitch` is a vertical screen-pixel offset used
//! for looking up/down and the walk bob, not a true 3D rotation.

use crate::map::GridMap;
use crate::math::vec2::Vec2;
use crate::window::InputState;

/// Movement speed in cells per second.
pub const MOVE_SPEED: f32 = 3.7;

// Walk bob: pitch oscillates at 10 rad/s of accumulated walk time.
const BOB_FREQUENCY: f32 = 10.0;
const BOB_AMPLITUDE: f32 = 3.5;

// Mouse sensitivity for horizontal rotation and vertical look.
const YAW_RATE: f32 = 60.0;
const LOOK_RATE: f32 = 12000.0;

/// Hard cap on the vertical look offset in screen pixels.
const MAX_PITCH: f32 = 230.0;

/// Default camera-plane magnitude, roughly a 66 degree field of view.
pub const DEFAULT_FOV: f32 = 0.66;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec2,
    pub direction: Vec2,
    pub plane: Vec2,
    /// Vertical view offset in screen pixels, positive looks up.
    pub pitch: f32,
    walk_time: f32,
}

impl Camera {
    /// Creates a camera at `position` facing +x.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: Vec2::new(1.0, 0.0),
            plane: Vec2::new(0.0, DEFAULT_FOV),
            pitch: 0.0,
            walk_time: 0.0,
        }
    }

    fn can_move(&self, map: &GridMap, target: Vec2) -> bool {
        map.get_cell(target.x, target.y) == 0 && map.can_pass_through_all_doors()
    }

    // Each axis is accepted independently so the player slides along walls
    // instead of sticking to them.
    fn try_move(&mut self, map: &GridMap, delta: Vec2) {
        let target = self.position + delta;
        if self.can_move(map, Vec2::new(target.x, self.position.y)) {
            self.position.x = target.x;
        }
        if self.can_move(map, Vec2::new(self.position.x, target.y)) {
            self.position.y = target.y;
        }
    }

    /// Applies held movement keys for this frame's delta time, collision
    /// checked against the map. Any accepted movement advances the walk bob.
    pub fn update_movement(&mut self, map: &GridMap, input: &InputState, delta_time: f32) {
        let speed = MOVE_SPEED * delta_time;
        let mut moved = false;

        if input.strafe_right {
            self.try_move(map, self.plane * speed);
            moved = true;
        }
        if input.strafe_left {
            self.try_move(map, -self.plane * speed);
            moved = true;
        }
        if input.forward {
            self.try_move(map, self.direction * speed);
            moved = true;
        }
        if input.backward {
            self.try_move(map, -self.direction * speed);
            moved = true;
        }

        if moved {
            self.walk_time += delta_time;
            self.pitch += (BOB_FREQUENCY * self.walk_time).cos() * BOB_AMPLITUDE;
        }
    }

    /// Rotates from a mouse delta. Horizontal motion turns direction and
    /// plane together; vertical motion feeds the pitch offset.
    pub fn rotate(
        &mut self,
        mouse_dx: f32,
        mouse_dy: f32,
        delta_time: f32,
        screen_width: u32,
        screen_height: u32,
    ) {
        let yaw = (mouse_dx / screen_width as f32) * YAW_RATE * delta_time;
        let look = -(mouse_dy / screen_height as f32) * LOOK_RATE * delta_time;

        self.direction = self.direction.rotate(yaw);
        self.plane = self.plane.rotate(yaw);
        self.pitch += look;
    }

    /// Clamps pitch so the horizon can never leave the screen entirely.
    pub fn clip_pitch(&mut self, screen_height: u32) {
        let limit = MAX_PITCH.min(screen_height as f32 / 2.0);
        self.pitch = self.pitch.clamp(-limit, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corridor_map() -> GridMap {
        // 5x5 with a single empty row at y=2.
        let mut cells = vec![1u8; 25];
        for x in 1..4 {
            cells[2 * 5 + x] = 0;
        }
        GridMap::from_cells(5, 5, cells).unwrap()
    }

    fn forward_input() -> InputState {
        InputState {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn direction_and_plane_stay_perpendicular_under_rotation() {
        let mut camera = Camera::new(Vec2::new(1.5, 1.5));
        for _ in 0..32 {
            camera.rotate(37.0, 11.0, 0.016, 640, 360);
            assert_relative_eq!(camera.direction.dot(camera.plane), 0.0, epsilon = 1e-4);
        }
        // Magnitudes are preserved too.
        assert_relative_eq!(camera.direction.length(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(camera.plane.length(), DEFAULT_FOV, epsilon = 1e-4);
    }

    #[test]
    fn blocked_axis_has_zero_displacement() {
        let map = corridor_map();
        // Close to the corridor's north wall, facing diagonally into it.
        let mut camera = Camera::new(Vec2::new(1.5, 2.1));
        camera.direction = Vec2::new(0.8, -0.6);
        camera.plane = Vec2::new(0.6 * DEFAULT_FOV, 0.8 * DEFAULT_FOV);

        camera.update_movement(&map, &forward_input(), 0.1);

        // Slides along x, y pinned by the wall.
        assert!(camera.position.x > 1.5);
        assert_relative_eq!(camera.position.y, 2.1);
    }

    #[test]
    fn free_movement_advances_both_axes() {
        let size = 9;
        let mut cells = vec![0u8; size * size];
        for i in 0..size {
            cells[i] = 1;
            cells[(size - 1) * size + i] = 1;
            cells[i * size] = 1;
            cells[i * size + size - 1] = 1;
        }
        let map = GridMap::from_cells(size, size, cells).unwrap();

        let mut camera = Camera::new(Vec2::new(4.5, 4.5));
        camera.direction = Vec2::new(std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
        camera.update_movement(&map, &forward_input(), 0.1);

        assert!(camera.position.x > 4.5);
        assert!(camera.position.y > 4.5);
    }

    #[test]
    fn walking_drives_the_view_bob() {
        let map = corridor_map();
        let mut camera = Camera::new(Vec2::new(1.5, 2.5));
        let before = camera.pitch;
        camera.update_movement(&map, &forward_input(), 0.016);
        assert!(camera.pitch != before);

        // Standing still leaves pitch alone.
        let held = camera.pitch;
        camera.update_movement(&map, &InputState::default(), 0.016);
        assert_relative_eq!(camera.pitch, held);
    }

    #[test]
    fn pitch_is_clipped_to_screen_and_cap() {
        let mut camera = Camera::new(Vec2::new(1.5, 1.5));
        camera.pitch = 10_000.0;
        camera.clip_pitch(900);
        assert_relative_eq!(camera.pitch, 230.0);

        camera.pitch = -10_000.0;
        camera.clip_pitch(200);
        assert_relative_eq!(camera.pitch, -100.0);
    }
}
