//! Transform algebra: vectors, quaternions (x, y, z, w) and SRT transforms.
//!
//! All helpers are pure. Quaternion helpers never renormalize unless the name
//! says so; callers decide when drift matters.

use serde::{Deserialize, Serialize};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Joint transform applied scale first, then rotation, then translation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);
    pub const ZERO: Quat = Quat::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around a unit `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// All-zero transform; the starting point of a weighted sum.
    pub const ZERO: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::ZERO,
        scale: Vec3::ZERO,
    };

    #[inline]
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
            scale: Vec3::ONE,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn vec3_add(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

#[inline]
pub fn vec3_sub(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

/// Component-wise product.
#[inline]
pub fn vec3_mul(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x * b.x, a.y * b.y, a.z * b.z)
}

/// Component-wise quotient.
#[inline]
pub fn vec3_div(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.x / b.x, a.y / b.y, a.z / b.z)
}

#[inline]
pub fn vec3_scale(a: Vec3, s: f32) -> Vec3 {
    Vec3::new(a.x * s, a.y * s, a.z * s)
}

#[inline]
pub fn vec3_neg(a: Vec3) -> Vec3 {
    Vec3::new(-a.x, -a.y, -a.z)
}

#[inline]
pub fn vec3_recip(a: Vec3) -> Vec3 {
    Vec3::new(1.0 / a.x, 1.0 / a.y, 1.0 / a.z)
}

/// `a + b * s`
#[inline]
pub fn vec3_madd(a: Vec3, b: Vec3, s: f32) -> Vec3 {
    Vec3::new(a.x + b.x * s, a.y + b.y * s, a.z + b.z * s)
}

#[inline]
pub fn vec3_lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(lerp_f32(a.x, b.x, t), lerp_f32(a.y, b.y, t), lerp_f32(a.z, b.z, t))
}

#[inline]
pub fn quat_dot(a: Quat, b: Quat) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w
}

#[inline]
pub fn quat_conjugate(q: Quat) -> Quat {
    Quat::new(-q.x, -q.y, -q.z, q.w)
}

#[inline]
pub fn quat_neg(q: Quat) -> Quat {
    Quat::new(-q.x, -q.y, -q.z, -q.w)
}

/// Hamilton product `a * b` (apply `b`, then `a`).
#[inline]
pub fn quat_mul(a: Quat, b: Quat) -> Quat {
    Quat::new(
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
    )
}

/// Rotate `v` by `q` as `q * v * conj(q)`.
#[inline]
pub fn quat_rotate_vec3(q: Quat, v: Vec3) -> Vec3 {
    let p = Quat::new(v.x, v.y, v.z, 0.0);
    let r = quat_mul(quat_mul(q, p), quat_conjugate(q));
    Vec3::new(r.x, r.y, r.z)
}

/// Unit-length copy of `q`; a zero quaternion stays zero.
#[inline]
pub fn quat_normalize(q: Quat) -> Quat {
    let len2 = quat_dot(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        Quat::new(q.x * inv_len, q.y * inv_len, q.z * inv_len, q.w * inv_len)
    } else {
        Quat::ZERO
    }
}

/// Component lerp followed by renormalization. No shortest-arc correction.
#[inline]
pub fn quat_lerp(a: Quat, b: Quat, t: f32) -> Quat {
    quat_normalize(Quat::new(
        lerp_f32(a.x, b.x, t),
        lerp_f32(a.y, b.y, t),
        lerp_f32(a.z, b.z, t),
        lerp_f32(a.w, b.w, t),
    ))
}

/// Weighted accumulate `acc + q * w` with hemisphere correction: when `q`
/// points away from the running sum, the sum is flipped first.
#[inline]
pub fn quat_madd_hemisphere(acc: Quat, q: Quat, w: f32) -> Quat {
    let acc = if quat_dot(q, acc) < 0.0 {
        quat_neg(acc)
    } else {
        acc
    };
    Quat::new(
        acc.x + q.x * w,
        acc.y + q.y * w,
        acc.z + q.z * w,
        acc.w + q.w * w,
    )
}

/// Compose `b` as a child of `a`.
#[inline]
pub fn mul_transform(a: &Transform, b: &Transform) -> Transform {
    Transform {
        position: vec3_add(
            a.position,
            quat_rotate_vec3(a.rotation, vec3_mul(a.scale, b.position)),
        ),
        rotation: quat_mul(a.rotation, b.rotation),
        scale: vec3_mul(a.scale, b.scale),
    }
}

#[inline]
pub fn invert_transform(t: &Transform) -> Transform {
    let scale = vec3_recip(t.scale);
    let rotation = quat_conjugate(t.rotation);
    Transform {
        position: quat_rotate_vec3(rotation, vec3_mul(scale, vec3_neg(t.position))),
        rotation,
        scale,
    }
}
