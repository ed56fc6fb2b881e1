//! Surface properties of a collision shape.

use serde::{Deserialize, Serialize};

const DEFAULT_FRICTION: f32 = 0.5;
const DEFAULT_RESTITUTION: f32 = 0.5;
const FUZZY_EPSILON: f32 = 1e-5;

/// Friction and bounciness of a collision surface.
///
/// Setters clamp their input, ignore NaN, and return whether the stored value
/// changed. Deserialized values go through the same setters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MaterialParams")]
pub struct PhysicsMaterial {
    static_friction: f32,
    dynamic_friction: f32,
    restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            static_friction: DEFAULT_FRICTION,
            dynamic_friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

/// Unvalidated material values as written in a config file.
#[derive(Deserialize)]
#[serde(default)]
struct MaterialParams {
    static_friction: f32,
    dynamic_friction: f32,
    restitution: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            static_friction: DEFAULT_FRICTION,
            dynamic_friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl From<MaterialParams> for PhysicsMaterial {
    fn from(p: MaterialParams) -> Self {
        Self::new(p.static_friction, p.dynamic_friction, p.restitution)
    }
}

impl PhysicsMaterial {
    #[must_use]
    pub fn new(static_friction: f32, dynamic_friction: f32, restitution: f32) -> Self {
        let mut material = Self::default();
        material.set_static_friction(static_friction);
        material.set_dynamic_friction(dynamic_friction);
        material.set_restitution(restitution);
        material
    }

    #[inline]
    #[must_use]
    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    /// Friction coefficient while at rest, clamped to `[0, f32::MAX]`.
    pub fn set_static_friction(&mut self, value: f32) -> bool {
        update(&mut self.static_friction, value.clamp(0.0, f32::MAX))
    }

    #[inline]
    #[must_use]
    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    /// Friction coefficient while sliding, clamped to `[0, f32::MAX]`.
    pub fn set_dynamic_friction(&mut self, value: f32) -> bool {
        update(&mut self.dynamic_friction, value.clamp(0.0, f32::MAX))
    }

    #[inline]
    #[must_use]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Coefficient of restitution, clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, value: f32) -> bool {
        update(&mut self.restitution, value.clamp(0.0, 1.0))
    }
}

fn update(slot: &mut f32, value: f32) -> bool {
    if value.is_nan() {
        return false;
    }
    if (*slot - value).abs() <= FUZZY_EPSILON * slot.abs().max(value.abs()).max(1.0) {
        return false;
    }
    *slot = value;
    true
}
