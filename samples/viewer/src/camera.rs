use nalgebra::{Matrix4, Point3, Vector3};

/// Directions a [Camera] can be moved in, relative to where it's looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Maps OpenGL-style clip space depth (`-1..1`) to wgpu's (`0..1`).
#[rustfmt::skip]
const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// A free-flying camera steered by yaw and pitch, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: f32,
    pitch: f32,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    world_up: Vector3<f32>,
    /// Units per second
    pub movement_speed: f32,
    /// Degrees per unit of mouse movement
    pub mouse_sensitivity: f32,
    /// Vertical field of view, in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}

impl Camera {
    pub const YAW: f32 = -90.0;
    pub const PITCH: f32 = 0.0;
    pub const MAX_PITCH: f32 = 89.0;
    pub const SPEED: f32 = 2.5;
    pub const SENSITIVITY: f32 = 0.1;
    pub const FOV: f32 = 70.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    /// A camera at `position`, looking down -Z.
    pub fn new(position: Point3<f32>) -> Self {
        let mut res = Self {
            position,
            yaw: Self::YAW,
            pitch: Self::PITCH,
            front: -Vector3::z(),
            right: Vector3::x(),
            up: Vector3::y(),
            world_up: Vector3::y(),
            movement_speed: Self::SPEED,
            mouse_sensitivity: Self::SENSITIVITY,
            fov: Self::FOV,
            near: Self::NEAR,
            far: Self::FAR,
        };
        res.update_vectors();
        res
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn the camera; positive `dx` turns right, positive `dy` looks up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch + dy * self.mouse_sensitivity)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }

    /// Right-handed world-to-view transform.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &(self.position + self.front), &self.up)
    }

    /// Perspective projection into wgpu clip space.
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU * Matrix4::new_perspective(aspect, self.fov.to_radians(), self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn looks_down_negative_z() {
        let cam = Camera::new(Point3::new(0.0, 1.0, 3.0));
        assert!(close(cam.front(), -Vector3::z()));
        assert!(close(cam.right(), Vector3::x()));
        assert!(close(cam.up(), Vector3::y()));
    }

    #[test]
    fn movement() {
        let mut cam = Camera::default();
        cam.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(close(cam.position.coords, Vector3::new(0.0, 0.0, -2.5)));
        cam.process_keyboard(CameraMovement::Right, 0.5);
        assert!(close(cam.position.coords, Vector3::new(1.25, 0.0, -2.5)));
        cam.process_keyboard(CameraMovement::Left, 0.5);
        cam.process_keyboard(CameraMovement::Backward, 1.0);
        assert!(close(cam.position.coords, Vector3::zeros()));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(cam.pitch(), Camera::MAX_PITCH);
        assert!(cam.front().y > 0.99);
        cam.process_mouse_movement(0.0, -20_000.0);
        assert_eq!(cam.pitch(), -Camera::MAX_PITCH);
        // still well-defined when looking almost straight down
        assert!(cam.right().norm() > 0.99);
    }

    #[quickcheck_macros::quickcheck]
    fn basis_stays_orthonormal(moves: Vec<(i16, i16)>) -> bool {
        let mut cam = Camera::default();
        for (dx, dy) in moves {
            cam.process_mouse_movement(dx as f32, dy as f32);
        }
        cam.pitch().abs() <= Camera::MAX_PITCH
            && (cam.front().norm() - 1.0).abs() < 1e-4
            && cam.front().dot(&cam.right()).abs() < 1e-4
            && cam.right().dot(&cam.up()).abs() < 1e-4
            && cam.right().y.abs() < 1e-4
    }

    #[test]
    fn turning_right() {
        let mut cam = Camera::default();
        // 900 * 0.1 = 90 degrees to the right
        cam.process_mouse_movement(900.0, 0.0);
        assert_eq!(cam.yaw(), 0.0);
        assert!(close(cam.front(), Vector3::x()));
    }

    #[test]
    fn view_moves_target_in_front() {
        let cam = Camera::new(Point3::new(0.0, 1.0, 3.0));
        let target = cam.view_matrix() * Vector4::new(0.0, 1.0, 0.0, 1.0);
        // right-handed view space looks down -Z
        assert!((target.xyz() - Vector3::new(0.0, 0.0, -3.0)).norm() < 1e-5);
    }

    #[test]
    fn projection_depth_range() {
        let cam = Camera::default();
        let proj = cam.projection_matrix(4.0 / 3.0);
        let depth = |z: f32| {
            let clip = proj * Vector4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert!(depth(-cam.near).abs() < 1e-5);
        assert!((depth(-cam.far) - 1.0).abs() < 1e-4);
    }
}
