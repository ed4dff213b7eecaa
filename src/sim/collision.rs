//! Axis-aligned collision primitives
//!
//! Every hit test in the game reduces to rectangle overlap: bodies, attack
//! boxes, projectiles, platforms and pickups are all AABBs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, position at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Standard AABB overlap test (strict: touching edges do not overlap)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Rectangle grown by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            pos: self.pos - Vec2::splat(margin),
            size: self.size + Vec2::splat(2.0 * margin),
        }
    }
}

/// Build a melee attack box extending `reach` from a body in its facing
/// direction, inset 10px vertically so swings don't clip heads or feet.
pub fn attack_box(body: &Rect, facing: i8, reach: f32) -> Rect {
    let x = if facing >= 0 {
        body.right()
    } else {
        body.left() - reach
    };
    Rect::new(x, body.top() + 10.0, reach, body.size.y - 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_miss() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_attack_box_follows_facing() {
        let body = Rect::new(100.0, 50.0, 40.0, 60.0);
        let right = attack_box(&body, 1, 50.0);
        assert_eq!(right.left(), body.right());
        assert_eq!(right.size.x, 50.0);

        let left = attack_box(&body, -1, 50.0);
        assert_eq!(left.right(), body.left());
        // Vertical inset keeps attacks from clipping heads/feet
        assert_eq!(left.top(), body.top() + 10.0);
        assert_eq!(left.size.y, body.size.y - 20.0);
    }

    #[test]
    fn test_inflate() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0);
        assert_eq!(r.left(), 5.0);
        assert_eq!(r.right(), 35.0);
        assert_eq!(r.size.y, 30.0);
    }
}
