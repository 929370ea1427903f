//! Annular track and range scanner.
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Position and heading of the vehicle in the track frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Horizontal position in meters.
    pub x: f32,

    /// Vertical position in meters.
    pub y: f32,

    /// Heading in radians.
    pub heading: f32,
}

/// Track bounded by two concentric circles centered at the origin.
///
/// Vehicles drive counterclockwise.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Track {
    /// Radius of the inner wall in meters.
    pub inner_radius: f32,

    /// Radius of the outer wall in meters.
    pub outer_radius: f32,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            inner_radius: 3.0,
            outer_radius: 6.0,
        }
    }
}

impl Track {
    /// Radius of the center line.
    pub fn center_radius(&self) -> f32 {
        0.5 * (self.inner_radius + self.outer_radius)
    }

    /// Pose on the center line at polar angle `theta`, heading along the
    /// track.
    pub fn pose_at(&self, theta: f32) -> Pose {
        let r = self.center_radius();
        Pose {
            x: r * theta.cos(),
            y: r * theta.sin(),
            heading: wrap_angle(theta + 0.5 * PI),
        }
    }

    /// Returns `true` if a disc of radius `margin` at `(x, y)` touches a wall.
    pub fn collides(&self, x: f32, y: f32, margin: f32) -> bool {
        let r = x.hypot(y);
        r <= self.inner_radius + margin || r >= self.outer_radius - margin
    }

    /// Distance from `(x, y)` along the direction `angle` to the nearest
    /// wall, at most `max_range`.
    pub fn cast(&self, x: f32, y: f32, angle: f32, max_range: f32) -> f32 {
        let (dx, dy) = (angle.cos(), angle.sin());
        let b = x * dx + y * dy;
        let p2 = x * x + y * y;
        let mut range = max_range;

        // the outer wall always surrounds the vehicle
        let c = p2 - self.outer_radius * self.outer_radius;
        let disc = b * b - c;
        if disc >= 0.0 {
            let t = -b + disc.sqrt();
            if t > 0.0 {
                range = range.min(t);
            }
        }

        let c = p2 - self.inner_radius * self.inner_radius;
        let disc = b * b - c;
        if disc >= 0.0 {
            let t = -b - disc.sqrt();
            if t > 0.0 {
                range = range.min(t);
            }
        }

        range
    }

    /// Polar angle swept counterclockwise from `from` to `to`, in
    /// `(-PI, PI]`.
    pub fn progress(&self, from: &Pose, to: &Pose) -> f32 {
        let a0 = from.y.atan2(from.x);
        let a1 = to.y.atan2(to.x);
        wrap_angle(a1 - a0)
    }
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(a: f32) -> f32 {
    let mut a = a % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Planar range scanner.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Scanner {
    /// Number of rays of a scan.
    pub num_rays: usize,

    /// Angle between the first and the last ray in radians.
    pub field_of_view: f32,

    /// Maximum measurable distance in meters.
    pub max_range: f32,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            num_rays: 1080,
            field_of_view: 1.5 * PI,
            max_range: 10.0,
        }
    }
}

impl Scanner {
    /// Angle of the `i`-th ray relative to the heading, from right to left.
    pub fn ray_angle(&self, i: usize) -> f32 {
        if self.num_rays < 2 {
            return 0.0;
        }
        -0.5 * self.field_of_view + self.field_of_view * i as f32 / (self.num_rays - 1) as f32
    }

    /// Ranges measured from `pose`.
    pub fn scan(&self, track: &Track, pose: &Pose) -> Vec<f32> {
        (0..self.num_rays)
            .map(|i| {
                let angle = pose.heading + self.ray_angle(i);
                track.cast(pose.x, pose.y, angle, self.max_range)
            })
            .collect()
    }
}
