// Copyright 2025 the Image Text Composer Authors
// SPDX-License-Identifier: Apache-2.0

//! Transform math for reading object geometry back out of the scene.
//!
//! A group member's transform is stored relative to the group. When a
//! group drag/rotate/scale ends, each member's absolute transform is
//! recovered by scaling its local offset by the group scale, rotating it
//! by the group rotation, and adding the group translation. Rotations add
//! and scales multiply. Scale is then folded into width/height so it never
//! accumulates on a layer.

use kurbo::{Affine, Point, Size, Vec2};

/// Translation, rotation (clockwise degrees) and scale of one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub position: Point,
    pub rotation: f64,
    pub scale: Vec2,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ObjectTransform {
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        rotation: 0.0,
        scale: Vec2::new(1.0, 1.0),
    };

    /// Unscaled transform at `position`
    pub fn new(position: Point, rotation: f64) -> Self {
        Self {
            position,
            rotation,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    pub fn with_scale(self, scale: Vec2) -> Self {
        Self { scale, ..self }
    }

    /// Whether either axis carries scale that should be folded into size
    pub fn is_scaled(&self) -> bool {
        self.scale.x != 1.0 || self.scale.y != 1.0
    }

    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            position: self.position + delta,
            ..self
        }
    }
}

/// Wrap degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Absolute transform of a group member
pub fn compose(group: &ObjectTransform, local: &ObjectTransform) -> ObjectTransform {
    let scaled = Point::new(
        local.position.x * group.scale.x,
        local.position.y * group.scale.y,
    );
    let rotated = Affine::rotate(group.rotation.to_radians()) * scaled;
    ObjectTransform {
        position: group.position + rotated.to_vec2(),
        rotation: normalize_degrees(local.rotation + group.rotation),
        scale: Vec2::new(
            local.scale.x * group.scale.x,
            local.scale.y * group.scale.y,
        ),
    }
}

/// Inverse of [`compose`]: the local transform that places an object at
/// `absolute` inside `group`
pub fn to_local(group: &ObjectTransform, absolute: &ObjectTransform) -> ObjectTransform {
    let offset = absolute.position - group.position;
    let unrotated = Affine::rotate(-group.rotation.to_radians()) * offset.to_point();
    let inverse = |value: f64, scale: f64| if scale == 0.0 { value } else { value / scale };
    ObjectTransform {
        position: Point::new(
            inverse(unrotated.x, group.scale.x),
            inverse(unrotated.y, group.scale.y),
        ),
        rotation: normalize_degrees(absolute.rotation - group.rotation),
        scale: Vec2::new(
            inverse(absolute.scale.x, group.scale.x),
            inverse(absolute.scale.y, group.scale.y),
        ),
    }
}

/// Fold a scale factor into a size
pub fn fold_scale(size: Size, scale: Vec2) -> Size {
    Size::new(size.width * scale.x, size.height * scale.y)
}

/// A settled object: absolute transform with unit scale, and its size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub transform: ObjectTransform,
    pub size: Size,
}

/// Resolve an object's transform into unit-scale geometry
pub fn resolve(transform: ObjectTransform, size: Size) -> Resolved {
    let size = if transform.is_scaled() {
        fold_scale(size, transform.scale)
    } else {
        size
    };
    Resolved {
        transform: ObjectTransform {
            scale: Vec2::new(1.0, 1.0),
            ..transform
        },
        size,
    }
}

/// Resolve one group member into absolute unit-scale geometry
pub fn resolve_member(group: &ObjectTransform, local: &ObjectTransform, size: Size) -> Resolved {
    resolve(compose(group, local), size)
}
