use crate::types::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleBounds {
    pub start_x: i32,
    pub end_x: i32,
    pub start_y: i32,
    pub end_y: i32,
}

impl VisibleBounds {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.start_x && x < self.end_x && y >= self.start_y && y < self.end_y
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_cols: i32,
    pub view_rows: i32,
}

impl Camera {
    pub fn new(view_cols: i32, view_rows: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            view_cols: view_cols.max(1),
            view_rows: view_rows.max(1),
        }
    }

    /// Centers the view on the target, clamped so it never leaves the world.
    pub fn follow(&mut self, target_x: i32, target_y: i32, world_cols: i32, world_rows: i32) {
        self.x = clamp_origin(target_x, self.view_cols, world_cols);
        self.y = clamp_origin(target_y, self.view_rows, world_rows);
    }

    pub fn visible_bounds(&self) -> VisibleBounds {
        VisibleBounds {
            start_x: self.x,
            end_x: self.x + self.view_cols,
            start_y: self.y,
            end_y: self.y + self.view_rows,
        }
    }

    pub fn world_to_view(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x - self.x, y - self.y)
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.visible_bounds().contains(x, y)
    }
}

fn clamp_origin(target: i32, view: i32, world: i32) -> i32 {
    let origin = (target as f64 - view as f64 / 2.0).floor() as i32;
    origin.min(world - view).max(0)
}

#[cfg(test)]
mod tests {
    use super::Camera;
    use crate::types::Vec2;

    #[test]
    fn follow_centers_on_target() {
        let mut camera = Camera::new(60, 24);
        camera.follow(60, 30, 120, 60);
        assert_eq!((camera.x, camera.y), (30, 18));
        assert!(camera.is_visible(60, 30));
        assert_eq!(camera.world_to_view(60, 30), Vec2::new(30, 12));
    }

    #[test]
    fn follow_clamps_to_world_edges() {
        let mut camera = Camera::new(60, 24);
        camera.follow(2, 2, 120, 60);
        assert_eq!((camera.x, camera.y), (0, 0));
        camera.follow(118, 58, 120, 60);
        assert_eq!((camera.x, camera.y), (60, 36));
    }

    #[test]
    fn view_larger_than_world_pins_origin_at_zero() {
        let mut camera = Camera::new(60, 24);
        camera.follow(10, 5, 20, 10);
        assert_eq!((camera.x, camera.y), (0, 0));
        let bounds = camera.visible_bounds();
        assert_eq!((bounds.end_x, bounds.end_y), (60, 24));
    }

    #[test]
    fn odd_view_sizes_floor_the_origin() {
        let mut camera = Camera::new(5, 5);
        camera.follow(10, 10, 40, 40);
        assert_eq!((camera.x, camera.y), (7, 7));
        assert!(camera.is_visible(7, 7));
        assert!(!camera.is_visible(12, 10));
    }
}
