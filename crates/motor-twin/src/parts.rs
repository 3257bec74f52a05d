//! Which model parts spin, and where the model copies are placed.

use glam::Vec3;

use crate::config::DEFAULT_ROTATING_PARTS;

/// Case-insensitive set of mesh node names that rotate with the rotor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartAllowList {
    names: Vec<String>,
}

impl Default for PartAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATING_PARTS)
    }
}

impl PartAllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether a node with this name should spin.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.iter().any(|n| *n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Placement of one copy of the motor model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    /// Rotation about the vertical axis, in radians.
    pub yaw: f32,
    pub scale: f32,
}

/// Uniform scale applied to the imported model.
pub const MODEL_SCALE: f32 = 5.0;

/// The two mirrored copies shown side by side, facing each other.
pub fn mirrored_pair() -> [Placement; 2] {
    use std::f32::consts::FRAC_PI_2;

    [
        Placement {
            translation: Vec3::new(-2.5, -1.0, 0.0),
            yaw: FRAC_PI_2,
            scale: MODEL_SCALE,
        },
        Placement {
            translation: Vec3::new(2.5, -1.0, 0.0),
            yaw: -FRAC_PI_2,
            scale: MODEL_SCALE,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let list = PartAllowList::default();
        assert!(list.matches("shaft_mat_0"));
        assert!(list.matches("Shaft_Mat_0"));
        assert!(list.matches("VENT_MAT2_0"));
        assert!(!list.matches("housing_mat_0"));
        assert!(!list.matches("shaft_mat_0.001"));
    }

    #[test]
    fn test_custom_allow_list() {
        let list = PartAllowList::new(["Rotor"]);
        assert!(list.matches("rotor"));
        assert_eq!(list.names(), ["rotor"]);
    }

    #[test]
    fn test_mirrored_pair() {
        let [left, right] = mirrored_pair();
        assert_eq!(left.translation.x, -right.translation.x);
        assert_eq!(left.translation.y, right.translation.y);
        assert_eq!(left.yaw, -right.yaw);
        assert_eq!(left.scale, right.scale);
    }
}
