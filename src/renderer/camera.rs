use glam::{Mat4, Vec2, Vec3};

/// Half-line from `origin` along the unit vector `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Distance along the ray to the closest approach to `point`, and the
    /// perpendicular distance there. `None` when the point is behind the origin.
    pub fn closest_approach(&self, point: Vec3) -> Option<(f32, f32)> {
        let t = (point - self.origin).dot(self.direction);
        if t < 0.0 {
            return None;
        }
        let closest = self.origin + self.direction * t;
        Some((t, closest.distance(point)))
    }
}

/// Orbit camera circling `target`.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub target: Vec3,
    pub orbital_distance: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub mouse_sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 70.0, 120.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let orbital_distance = offset.length().max(1.0);
        let dir = offset / orbital_distance;

        Self {
            position,
            yaw: dir.z.atan2(dir.x),
            pitch: dir.y.clamp(-1.0, 1.0).asin(),

            target,
            orbital_distance,

            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 10000.0,

            mouse_sensitivity: 0.005,
            zoom_speed: 8.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.mouse_sensitivity;
        self.pitch += delta.y * self.mouse_sensitivity;

        let max_pitch = 89.0_f32.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

        self.update_orbital_position();
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.orbital_distance =
            (self.orbital_distance - delta * self.zoom_speed).clamp(5.0, self.far / 2.0);
        self.update_orbital_position();
    }

    fn update_orbital_position(&mut self) {
        self.position = self.target
            + Vec3::new(
                self.orbital_distance * self.yaw.cos() * self.pitch.cos(),
                self.orbital_distance * self.pitch.sin(),
                self.orbital_distance * self.yaw.sin() * self.pitch.cos(),
            );
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Ray from the camera through pixel `px` of a `viewport`-sized surface.
    pub fn ray_through(&self, px: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec3::new(
            (px.x / viewport.x) * 2.0 - 1.0,
            -(px.y / viewport.y) * 2.0 + 1.0,
            0.5,
        );
        let world = self.view_projection_matrix().inverse().project_point3(ndc);

        Ray {
            origin: self.position,
            direction: (world - self.position).normalize_or(-Vec3::Z),
        }
    }

    /// Pixel position of `world`, `None` when it lies behind the camera.
    pub fn project_to_screen(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) / 2.0 * viewport.x,
            (1.0 - ndc.y) / 2.0 * viewport.y,
        ))
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}
