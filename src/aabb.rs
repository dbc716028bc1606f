//! Axis-aligned bounding box algebra
//!
//! Boxes are closed `[low, high]` ranges. A box is valid only when
//! `low < high` on every axis; empty, flat and NaN boxes are invalid and are
//! filtered wherever they can arise. Infinite coordinates are allowed and
//! mark the bounds of unbounded shapes.
//!
//! # Operations
//!
//! - [`Aabb::intersect`] / [`Aabb::hull`]: componentwise min/max
//! - [`Aabb::split`]: cut into up to 8 pieces at a pivot
//! - [`Aabb::clip`]: remove the part covered by another box
//! - [`Aabb::face_merge`]: fuse two boxes sharing a complete face
//! - [`SubtreeAabb::merge_all`]: bound a set of tagged boxes, joining
//!   distinct subtrees with a union

use crate::types::CsgTree;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub low: Vec3,
    /// Maximum corner
    pub high: Vec3,
}

impl Aabb {
    /// The empty box; invalid, and the identity for [`Aabb::hull`]
    pub const EMPTY: Aabb = Aabb {
        low: Vec3::INFINITY,
        high: Vec3::NEG_INFINITY,
    };

    /// Box containing all of space
    pub const INFINITE: Aabb = Aabb {
        low: Vec3::NEG_INFINITY,
        high: Vec3::INFINITY,
    };

    /// Create a box from its corners
    #[inline]
    pub fn new(low: Vec3, high: Vec3) -> Self {
        Aabb { low, high }
    }

    /// Box centered at origin with the given half-size
    #[inline]
    pub fn symmetric(half_size: Vec3) -> Self {
        Aabb::new(-half_size, half_size)
    }

    /// True when `low < high` on every axis
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.low.cmplt(self.high).all()
    }

    /// True when every coordinate is finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }

    /// Edge lengths, zero for invalid boxes
    #[inline]
    pub fn extent(&self) -> Vec3 {
        if self.is_valid() {
            self.high - self.low
        } else {
            Vec3::ZERO
        }
    }

    /// Box center, origin for invalid boxes
    #[inline]
    pub fn center(&self) -> Vec3 {
        if self.is_valid() {
            (self.low + self.high) * 0.5
        } else {
            Vec3::ZERO
        }
    }

    /// Volume, zero for invalid boxes
    #[inline]
    pub fn volume(&self) -> f32 {
        let extent = self.extent();
        extent.x * extent.y * extent.z
    }

    /// Closed point containment
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.low.cmple(point).all() && point.cmple(self.high).all()
    }

    /// True when `other` lies entirely inside this box
    #[inline]
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.low.cmple(other.low).all() && other.high.cmple(self.high).all()
    }

    /// Componentwise intersection; may be invalid
    #[inline]
    pub fn intersect(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.low.max(other.low), self.high.min(other.high))
    }

    /// True when the two boxes share interior volume
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.intersect(other).is_valid()
    }

    /// Smallest box containing both
    #[inline]
    pub fn hull(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.low.min(other.low), self.high.max(other.high))
    }

    /// Grow by `margin` on every side
    #[inline]
    pub fn pad(&self, margin: f32) -> Aabb {
        Aabb::new(self.low - Vec3::splat(margin), self.high + Vec3::splat(margin))
    }

    /// Move by an offset
    #[inline]
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(self.low + offset, self.high + offset)
    }

    /// Scale about the origin by a positive factor
    #[inline]
    pub fn scale(&self, factor: f32) -> Aabb {
        Aabb::new(self.low * factor, self.high * factor)
    }

    /// Bound of this box rotated about the origin
    ///
    /// All 8 corners are rotated and the componentwise min/max kept. A box
    /// with infinite extent rotates to the infinite box.
    pub fn rotate(&self, rotation: Quat) -> Aabb {
        if !self.is_finite() {
            return Aabb::INFINITE;
        }
        self.corners()
            .iter()
            .map(|&corner| rotation * corner)
            .fold(Aabb::EMPTY, |acc, p| Aabb::new(acc.low.min(p), acc.high.max(p)))
    }

    /// The 8 vertices, `low` first and `high` last
    pub fn corners(&self) -> [Vec3; 8] {
        let (l, h) = (self.low, self.high);
        [
            Vec3::new(l.x, l.y, l.z),
            Vec3::new(h.x, l.y, l.z),
            Vec3::new(l.x, h.y, l.z),
            Vec3::new(h.x, h.y, l.z),
            Vec3::new(l.x, l.y, h.z),
            Vec3::new(h.x, l.y, h.z),
            Vec3::new(l.x, h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
        ]
    }

    /// Cut into up to 8 pieces at `pivot`
    ///
    /// An axis is only cut where the pivot lies strictly inside the box, so a
    /// pivot on a corner (or outside) returns the box unchanged. Degenerate
    /// pieces are dropped.
    pub fn split(&self, pivot: Vec3) -> Vec<Aabb> {
        let ranges = |axis: usize| -> Vec<(f32, f32)> {
            let (low, high, cut) = (self.low[axis], self.high[axis], pivot[axis]);
            if low < cut && cut < high {
                vec![(low, cut), (cut, high)]
            } else {
                vec![(low, high)]
            }
        };

        let (xs, ys, zs) = (ranges(0), ranges(1), ranges(2));
        let mut pieces = Vec::with_capacity(xs.len() * ys.len() * zs.len());
        for &(z0, z1) in &zs {
            for &(y0, y1) in &ys {
                for &(x0, x1) in &xs {
                    let piece = Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1));
                    if piece.is_valid() {
                        pieces.push(piece);
                    }
                }
            }
        }
        pieces
    }

    /// Split on every one of `pivots` in turn
    pub fn split_all(&self, pivots: &[Vec3]) -> Vec<Aabb> {
        pivots.iter().fold(vec![*self], |pieces, &pivot| {
            pieces.iter().flat_map(|piece| piece.split(pivot)).collect()
        })
    }

    /// Remove the region covered by `clip`
    ///
    /// The box is split on every corner of `clip` and the pieces inside
    /// `clip` are discarded. With `mutual` set, `clip` is first split on this
    /// box's corners and this box is split on the corners of every resulting
    /// piece, so both sides share vertices. When nothing remains, a single
    /// [`Aabb::EMPTY`] placeholder is returned for the caller to filter.
    pub fn clip(&self, clip: &Aabb, mutual: bool) -> Vec<Aabb> {
        if !self.overlaps(clip) {
            return vec![*self];
        }

        let pivots: Vec<Vec3> = if mutual {
            clip.split_all(&self.corners())
                .iter()
                .flat_map(|piece| piece.corners())
                .collect()
        } else {
            clip.corners().to_vec()
        };

        let kept: Vec<Aabb> = self
            .split_all(&pivots)
            .into_iter()
            .filter(|piece| !clip.contains_box(piece))
            .collect();

        if kept.is_empty() {
            vec![Aabb::EMPTY]
        } else {
            kept
        }
    }

    /// Fuse two boxes that share a complete face
    ///
    /// Returns `None` unless the boxes touch along one axis and have
    /// identical ranges on the other two.
    pub fn face_merge(&self, other: &Aabb) -> Option<Aabb> {
        for axis in 0..3 {
            let others_match = (0..3)
                .filter(|&a| a != axis)
                .all(|a| self.low[a] == other.low[a] && self.high[a] == other.high[a]);
            if !others_match {
                continue;
            }
            if self.high[axis] == other.low[axis] || other.high[axis] == self.low[axis] {
                return Some(self.hull(other));
            }
        }
        None
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

/// A box tagged with the subtree that evaluates correctly inside it
#[derive(Clone, Debug, PartialEq)]
pub struct SubtreeAabb {
    /// Region
    pub aabb: Aabb,
    /// Local distance function over the region
    pub subtree: CsgTree,
}

impl SubtreeAabb {
    /// Tag a box
    pub fn new(aabb: Aabb, subtree: CsgTree) -> Self {
        SubtreeAabb { aabb, subtree }
    }

    /// Bound a set of tagged boxes
    ///
    /// The result covers every input box. Boxes sharing a subtree contribute
    /// it once; distinct subtrees are joined with unions in first-appearance
    /// order. Returns `None` for an empty input.
    pub fn merge_all<'a, I>(boxes: I) -> Option<SubtreeAabb>
    where
        I: IntoIterator<Item = &'a SubtreeAabb>,
    {
        let mut aabb = Aabb::EMPTY;
        let mut distinct: Vec<&CsgTree> = Vec::new();
        for item in boxes {
            aabb = aabb.hull(&item.aabb);
            if !distinct.iter().any(|seen| *seen == &item.subtree) {
                distinct.push(&item.subtree);
            }
        }

        let mut subtrees = distinct.into_iter();
        let first = subtrees.next()?.clone();
        let subtree = subtrees.fold(first, |acc, next| acc.union(next.clone()));
        Some(SubtreeAabb { aabb, subtree })
    }
}

/// Closed-form bounds of primitive shapes in their local space
pub mod primitives {
    use super::*;
    use crate::types::{Brush, Unbound};

    /// Bound of a brush
    pub fn brush_aabb(brush: &Brush) -> Aabb {
        match *brush {
            Brush::Sphere { radius } => Aabb::symmetric(Vec3::splat(radius)),
            Brush::Ellipsoid { radii } => Aabb::symmetric(radii),
            Brush::Box { extents } => Aabb::symmetric(extents),
            Brush::Torus {
                major_radius,
                minor_radius,
            } => {
                let r = major_radius + minor_radius;
                Aabb::symmetric(Vec3::new(r, r, minor_radius))
            }
            Brush::Cylinder { radius, extent } => {
                Aabb::symmetric(Vec3::new(radius, radius, extent))
            }
            Brush::Cone { radius, height } => {
                Aabb::symmetric(Vec3::new(radius, radius, height * 0.5))
            }
            Brush::Coninder {
                radius_low,
                radius_high,
                height,
            } => {
                let r = radius_low.max(radius_high);
                Aabb::symmetric(Vec3::new(r, r, height * 0.5))
            }
        }
    }

    /// Bound of an unbounded shape
    ///
    /// A plane whose normal is one of the six axis directions bounds a
    /// half-infinite box; any other orientation is unbounded everywhere.
    pub fn unbound_aabb(shape: &Unbound) -> Aabb {
        match *shape {
            Unbound::Plane { normal, distance } => {
                let mut bound = Aabb::INFINITE;
                for axis in 0..3 {
                    let others_zero = (0..3).filter(|&a| a != axis).all(|a| normal[a] == 0.0);
                    if !others_zero {
                        continue;
                    }
                    // solid where normal[axis] * p[axis] <= distance
                    if normal[axis] > 0.0 {
                        bound.high[axis] = distance / normal[axis];
                    } else if normal[axis] < 0.0 {
                        bound.low[axis] = distance / normal[axis];
                    }
                }
                bound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Brush, Unbound};

    fn unit() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_validity() {
        assert!(unit().is_valid());
        assert!(!Aabb::EMPTY.is_valid());
        assert!(!Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).is_valid());
        assert!(!Aabb::new(Vec3::ZERO, Vec3::new(1.0, f32::NAN, 1.0)).is_valid());
        assert!(Aabb::INFINITE.is_valid());
        assert!(!Aabb::INFINITE.is_finite());
    }

    #[test]
    fn test_intersect_and_hull() {
        let a = unit();
        let b = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(a.intersect(&b), Aabb::new(Vec3::ZERO, Vec3::ONE));
        assert_eq!(a.hull(&b), Aabb::new(Vec3::splat(-1.0), Vec3::splat(2.0)));

        let far = Aabb::new(Vec3::splat(5.0), Vec3::splat(6.0));
        assert!(!a.intersect(&far).is_valid());
        assert_eq!(Aabb::EMPTY.hull(&a), a);
    }

    #[test]
    fn test_split_on_corner_is_identity() {
        assert_eq!(unit().split(Vec3::splat(1.0)), vec![unit()]);
        assert_eq!(unit().split(Vec3::splat(-1.0)), vec![unit()]);
        assert_eq!(unit().split(Vec3::splat(7.0)), vec![unit()]);
    }

    #[test]
    fn test_split_center_gives_octants() {
        let pieces = unit().split(Vec3::ZERO);
        assert_eq!(pieces.len(), 8);
        let total: f32 = pieces.iter().map(Aabb::volume).sum();
        assert!((total - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_split_on_face_plane() {
        // Pivot inside on x only
        let pieces = unit().split(Vec3::new(0.5, 1.0, -1.0));
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_clip_removes_overlap() {
        let a = unit();
        let b = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let pieces = a.clip(&b, false);
        let total: f32 = pieces.iter().map(Aabb::volume).sum();
        assert!((total - 7.0).abs() < 1e-5);
        for piece in &pieces {
            assert!(!piece.overlaps(&b));
            assert!(a.contains_box(piece));
        }
    }

    #[test]
    fn test_clip_mutual_same_region() {
        let a = unit();
        let b = Aabb::new(Vec3::new(-0.5, -0.25, 0.0), Vec3::new(0.5, 3.0, 3.0));
        let plain: f32 = a.clip(&b, false).iter().map(Aabb::volume).sum();
        let mutual = a.clip(&b, true);
        let total: f32 = mutual.iter().map(Aabb::volume).sum();
        assert!((plain - total).abs() < 1e-5);
        assert!(mutual.iter().all(|p| !p.overlaps(&b)));
    }

    #[test]
    fn test_clip_fully_covered_gives_placeholder() {
        let pieces = unit().clip(&unit().pad(1.0), false);
        assert_eq!(pieces.len(), 1);
        assert!(!pieces[0].is_valid());
    }

    #[test]
    fn test_rotate_corners() {
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let r = b.rotate(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert!((r.low - Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-5);
        assert!((r.high - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);

        let half = Aabb::new(Vec3::NEG_INFINITY, Vec3::ONE);
        assert_eq!(half.rotate(Quat::from_rotation_x(0.1)), Aabb::INFINITE);
    }

    #[test]
    fn test_face_merge() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = a.translate(Vec3::X);
        assert_eq!(
            a.face_merge(&b),
            Some(Aabb::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0)))
        );
        assert_eq!(b.face_merge(&a), a.face_merge(&b));

        let c = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(a.face_merge(&c), None);
    }

    #[test]
    fn test_merge_all_dedupes_subtrees() {
        let s = CsgTree::sphere(1.0).unwrap();
        let c = CsgTree::cuboid(1.0, 1.0, 1.0).unwrap();
        let boxes = vec![
            SubtreeAabb::new(unit(), s.clone()),
            SubtreeAabb::new(unit().translate(Vec3::X), s.clone()),
            SubtreeAabb::new(unit().translate(Vec3::Y), c.clone()),
        ];
        let merged = SubtreeAabb::merge_all(&boxes).unwrap();
        assert_eq!(merged.subtree, s.union(c));
        assert_eq!(merged.aabb, Aabb::new(Vec3::splat(-1.0), Vec3::new(2.0, 2.0, 1.0)));
        assert!(SubtreeAabb::merge_all(Vec::<SubtreeAabb>::new().iter()).is_none());
    }

    #[test]
    fn test_scale_about_origin() {
        let moved = unit().translate(Vec3::new(2.0, 0.0, 0.0)).scale(0.5);
        assert_eq!(moved, Aabb::new(Vec3::new(0.5, -0.5, -0.5), Vec3::new(1.5, 0.5, 0.5)));
        assert_eq!(Aabb::INFINITE.scale(3.0), Aabb::INFINITE);
    }

    #[test]
    fn test_primitive_bounds() {
        let torus = primitives::brush_aabb(&Brush::Torus {
            major_radius: 2.0,
            minor_radius: 0.5,
        });
        assert_eq!(torus.high, Vec3::new(2.5, 2.5, 0.5));

        let cylinder = primitives::brush_aabb(&Brush::Cylinder {
            radius: 1.0,
            extent: 3.0,
        });
        assert_eq!(cylinder.low, Vec3::new(-1.0, -1.0, -3.0));

        let cone = primitives::brush_aabb(&Brush::Cone {
            radius: 0.5,
            height: 2.0,
        });
        assert_eq!(cone.high, Vec3::new(0.5, 0.5, 1.0));

        let coninder = primitives::brush_aabb(&Brush::Coninder {
            radius_low: 0.25,
            radius_high: 0.75,
            height: 3.0,
        });
        assert_eq!(coninder.low, Vec3::new(-0.75, -0.75, -1.5));

        let plane = primitives::unbound_aabb(&Unbound::Plane {
            normal: Vec3::X,
            distance: 0.5,
        });
        assert_eq!(plane.high.x, 0.5);
        assert_eq!(plane.low.x, f32::NEG_INFINITY);
        assert_eq!(plane.high.y, f32::INFINITY);

        let tilted = primitives::unbound_aabb(&Unbound::Plane {
            normal: Vec3::new(1.0, 1.0, 0.0).normalize(),
            distance: 0.0,
        });
        assert_eq!(tilted, Aabb::INFINITE);
    }
}
