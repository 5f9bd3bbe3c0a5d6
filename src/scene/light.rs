use glam::Vec3;

use crate::options::LightingOptions;

/// A scene light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from all directions.
    Ambient {
        /// Linear RGB color.
        color: Vec3,
        /// Intensity multiplier.
        intensity: f32,
    },
    /// Parallel light shining from `position` toward the origin.
    Directional {
        /// Linear RGB color.
        color: Vec3,
        /// Intensity multiplier.
        intensity: f32,
        /// Light position.
        position: Vec3,
    },
}

impl Light {
    /// Lights described by `options`, ambient first.
    #[must_use]
    pub fn from_options(options: &LightingOptions) -> Vec<Self> {
        vec![
            Self::Ambient {
                color: Vec3::from_array(options.ambient.color),
                intensity: options.ambient.intensity,
            },
            Self::Directional {
                color: Vec3::from_array(options.directional.color),
                intensity: options.directional.intensity,
                position: Vec3::from_array(options.directional.position),
            },
        ]
    }

    /// Unit vector pointing from the surface toward the light, for
    /// directional lights.
    #[must_use]
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            Self::Ambient { .. } => None,
            Self::Directional { position, .. } => Some(position.normalize_or(Vec3::Y)),
        }
    }

    /// Color scaled by intensity.
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        match self {
            Self::Ambient { color, intensity }
            | Self::Directional {
                color, intensity, ..
            } => *color * *intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lighting_is_ambient_plus_key() {
        let lights = Light::from_options(&LightingOptions::default());
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[0].radiance(), Vec3::ONE);
        assert_eq!(lights[0].direction(), None);
        assert_eq!(lights[1].radiance(), Vec3::splat(2.0));
        assert_eq!(lights[1].direction(), Some(Vec3::NEG_X));
    }
}
