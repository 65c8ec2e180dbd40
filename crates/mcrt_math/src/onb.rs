use crate::Vec3;

/// Orthonormal basis built around a single axis `w`.
///
/// Used to map directions sampled around +Z into world space around a normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis is `n` (normalized).
    pub fn build_from_w(n: Vec3) -> Self {
        let w = n.normalize();
        // Any axis not nearly parallel to w works as the helper
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.v
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Transform local coordinates `(a.x, a.y, a.z)` into world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(onb: &Onb) {
        for axis in [onb.u(), onb.v(), onb.w()] {
            assert!((axis.length() - 1.0).abs() < 1e-5);
        }
        assert!(onb.u().dot(onb.v()).abs() < 1e-5);
        assert!(onb.v().dot(onb.w()).abs() < 1e-5);
        assert!(onb.w().dot(onb.u()).abs() < 1e-5);
    }

    #[test]
    fn test_onb_is_orthonormal() {
        for n in [
            Vec3::X,
            Vec3::Y,
            -Vec3::Z,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-0.95, 0.1, 0.0),
        ] {
            let onb = Onb::build_from_w(n);
            assert_orthonormal(&onb);
            assert!((onb.w() - n.normalize()).length() < 1e-5);
        }
    }

    #[test]
    fn test_onb_local_maps_z_to_w() {
        let n = Vec3::new(0.0, 1.0, 1.0);
        let onb = Onb::build_from_w(n);
        assert!((onb.local(Vec3::Z) - n.normalize()).length() < 1e-5);
    }
}
