//! Per-frame field update
//!
//! Recomputes every vertex's depth from two noise layers and its color blend
//! from a third. Runs once per displayed frame over the whole field, in
//! place.

use super::field::ParticleField;
use super::noise::NoiseChannels;
use super::params::NoiseParams;

/// Parameters of the three noise layers for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseLayers {
    pub a: NoiseParams,
    pub b: NoiseParams,
    pub color: NoiseParams,
}

/// Remap a noise sample from `[-1, 1]` to `[0, 1]`, then square it so most
/// vertices sit near one of the two colors.
#[inline]
pub fn color_ratio(raw: f32) -> f32 {
    (0.5 * raw + 0.5).clamp(0.0, 1.0).powi(2)
}

/// Depth of a vertex at `(x, y)` after `secs` seconds
#[inline]
pub fn depth_at(channels: &NoiseChannels, layers: &NoiseLayers, x: f32, y: f32, secs: f32) -> f32 {
    let NoiseLayers { a, b, .. } = layers;
    let depth_a = a.level * channels.a.sample3d(x * a.scale, y * a.scale, a.speed * secs);
    let depth_b = b.level * channels.b.sample3d(x * b.scale, y * b.scale, b.speed * secs);
    depth_a + depth_b
}

/// Color ratio of a vertex at `(x, y)` after `secs` seconds
#[inline]
pub fn color_ratio_at(
    channels: &NoiseChannels,
    layers: &NoiseLayers,
    x: f32,
    y: f32,
    secs: f32,
) -> f32 {
    let c = &layers.color;
    let raw = c.level * channels.color.sample3d(x * c.scale, y * c.scale, c.speed * secs);
    color_ratio(raw)
}

/// Rewrite `z` and color ratio for every vertex.
///
/// Returns `false` without touching anything when the field is disposed.
pub fn update_field(
    field: &mut ParticleField,
    channels: &NoiseChannels,
    layers: &NoiseLayers,
    secs: f32,
) -> bool {
    let Some((positions, ratios)) = field.buffers_mut() else {
        log::debug!("Skipped update of disposed field");
        return false;
    };

    for (xyz, ratio) in positions.chunks_exact_mut(3).zip(ratios.iter_mut()) {
        let (x, y) = (xyz[0], xyz[1]);
        xyz[2] = depth_at(channels, layers, x, y, secs);
        *ratio = color_ratio_at(channels, layers, x, y, secs);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> NoiseLayers {
        let p = NoiseParams {
            level: 1.5,
            scale: 0.3,
            speed: 0.7,
        };
        NoiseLayers {
            a: p,
            b: NoiseParams { level: 0.5, ..p },
            color: NoiseParams { level: 1.0, ..p },
        }
    }

    #[test]
    fn test_color_ratio_remap() {
        assert_eq!(color_ratio(1.0), 1.0);
        assert_eq!(color_ratio(-1.0), 0.0);
        assert_eq!(color_ratio(0.0), 0.25);
        // Clamped before squaring
        assert_eq!(color_ratio(3.0), 1.0);
        assert_eq!(color_ratio(-3.0), 0.0);
    }

    #[test]
    fn test_update_keeps_xy_and_writes_z_and_ratio() {
        let channels = NoiseChannels::from_seed(7);
        let layers = layers();
        let (a, b, c) = (layers.a, layers.b, layers.color);
        let t = 2.5;
        let mut field = ParticleField::generate(6.0, 4.0, 0.5, 0);
        let before: Vec<f32> = field.positions().to_vec();

        assert!(update_field(&mut field, &channels, &layers, t));

        for i in 0..field.len() {
            let v = field.vertex(i).unwrap();
            let (x, y) = (before[i * 3], before[i * 3 + 1]);
            assert_eq!((v.x, v.y), (x, y));

            let z = a.level * channels.a.sample3d(x * a.scale, y * a.scale, a.speed * t)
                + b.level * channels.b.sample3d(x * b.scale, y * b.scale, b.speed * t);
            assert_eq!(v.z, z);

            let raw = c.level * channels.color.sample3d(x * c.scale, y * c.scale, c.speed * t);
            assert_eq!(v.color_ratio, (0.5 * raw + 0.5).clamp(0.0, 1.0).powi(2));
        }
    }

    #[test]
    fn test_layers_sample_their_own_channel() {
        let channels = NoiseChannels::from_seed(21);
        let p = NoiseParams {
            level: 1.0,
            scale: 0.37,
            speed: 0.0,
        };
        let off = NoiseParams { level: 0.0, ..p };
        let mut field = ParticleField::generate(8.0, 8.0, 0.5, 0);

        // Only layer B contributes: depth must come from channel B, not A
        let only_b = NoiseLayers { a: off, b: p, color: p };
        update_field(&mut field, &channels, &only_b, 0.0);
        let mut differs_from_a = false;
        for i in 0..field.len() {
            let v = field.vertex(i).unwrap();
            let (x, y) = (v.x * p.scale, v.y * p.scale);
            assert_eq!(v.z, channels.b.sample3d(x, y, 0.0));
            differs_from_a |= v.z != channels.a.sample3d(x, y, 0.0);
            assert_eq!(v.color_ratio, color_ratio(channels.color.sample3d(x, y, 0.0)));
        }
        assert!(differs_from_a);
    }

    #[test]
    fn test_update_is_a_function_of_time() {
        let channels = NoiseChannels::from_seed(9);
        let layers = layers();
        let mut field = ParticleField::generate(5.0, 5.0, 1.0, 0);

        update_field(&mut field, &channels, &layers, 4.0);
        let at_four: Vec<f32> = field.positions().to_vec();
        update_field(&mut field, &channels, &layers, 1.0);
        update_field(&mut field, &channels, &layers, 4.0);
        assert_eq!(field.positions(), at_four.as_slice());
    }

    #[test]
    fn test_zero_level_flattens_field() {
        let channels = NoiseChannels::from_seed(1);
        let mut layers = layers();
        layers.a.level = 0.0;
        layers.b.level = 0.0;
        let mut field = ParticleField::generate(5.0, 5.0, 1.0, 0);
        update_field(&mut field, &channels, &layers, 3.0);
        assert!(field.positions().chunks_exact(3).all(|p| p[2] == 0.0));
    }

    #[test]
    fn test_disposed_field_is_noop() {
        let channels = NoiseChannels::from_seed(2);
        let mut field = ParticleField::generate(5.0, 5.0, 1.0, 0);
        field.dispose();
        assert!(!update_field(&mut field, &channels, &layers(), 1.0));
        assert!(field.is_empty());
    }
}
