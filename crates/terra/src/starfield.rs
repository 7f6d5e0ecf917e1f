//! Background star field: a static point cloud on a spherical shell.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Per-star data uploaded to the GPU instance buffer.
/// Must match the instance inputs of the star field shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarSample {
    pub position: [f32; 3],
    /// Linear RGB.
    pub color: [f32; 3],
}

impl StarSample {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarFieldParams {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// HSL hue in [0, 1).
    pub hue: f32,
    pub saturation: f32,
}

impl Default for StarFieldParams {
    fn default() -> Self {
        Self {
            count: 4500,
            inner_radius: 25.0,
            outer_radius: 50.0,
            hue: 0.6,
            saturation: 0.2,
        }
    }
}

/// World-space sprite size of a star.
pub const STAR_SIZE: f32 = 0.2;
pub const STAR_OPACITY: f32 = 0.8;

pub struct StarFieldGenerator {
    params: StarFieldParams,
}

impl StarFieldGenerator {
    pub fn new(params: StarFieldParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &StarFieldParams {
        &self.params
    }

    /// Draws `count` independent stars.
    ///
    /// Directions use the inverse-CDF construction (`polar = acos(2v - 1)`),
    /// which is uniform over the sphere; drawing the polar angle itself
    /// uniformly would bunch stars at the poles.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<StarSample> {
        let p = &self.params;
        let band = p.outer_radius - p.inner_radius;

        (0..p.count)
            .map(|_| {
                let radius = p.inner_radius + rng.gen::<f32>() * band;
                let azimuth = TAU * rng.gen::<f32>();
                let polar = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

                let position = spherical_to_cartesian(radius, azimuth, polar);
                let lightness = rng.gen::<f32>();
                let color = hsl_to_linear_rgb(p.hue, p.saturation, lightness);

                StarSample {
                    position: position.to_array(),
                    color,
                }
            })
            .collect()
    }
}

/// `(r sinφ cosθ, r sinφ sinθ, r cosφ)`.
#[inline]
pub fn spherical_to_cartesian(radius: f32, azimuth: f32, polar: f32) -> Vec3 {
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(
        radius * sin_p * cos_a,
        radius * sin_p * sin_a,
        radius * cos_p,
    )
}

/// HSL (sRGB) to linear RGB.
pub fn hsl_to_linear_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let rgb = if s == 0.0 {
        [l, l, l]
    } else {
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        [
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        ]
    };

    rgb.map(srgb_to_linear)
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Screen size of a star sprite with perspective attenuation: `size` is in
/// world units, `view_depth` is the (positive) distance along the view axis.
#[inline]
pub fn attenuated_size_px(size: f32, viewport_height: f32, view_depth: f32) -> f32 {
    size * (viewport_height * 0.5) / view_depth.max(f32::EPSILON)
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(count: usize) -> StarFieldGenerator {
        StarFieldGenerator::new(StarFieldParams {
            count,
            ..Default::default()
        })
    }

    #[test]
    fn returns_exactly_count_samples() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [0, 1, 17, 4500] {
            assert_eq!(generator(count).generate(&mut rng).len(), count);
        }
    }

    #[test]
    fn samples_lie_in_radius_band_without_nans() {
        let mut rng = StdRng::seed_from_u64(11);
        for star in generator(10_000).generate(&mut rng) {
            let p = star.position();
            assert!(p.is_finite());
            let r = p.length();
            // f32 rounding of sin/cos can nudge the radius by a few ulps.
            assert!((25.0 - 1e-3..=50.0 + 1e-3).contains(&r), "radius {r}");
            assert!(star.color.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn directions_are_uniform_in_cos_polar() {
        const N: usize = 40_000;
        const BINS: usize = 10;

        let mut rng = StdRng::seed_from_u64(42);
        let mut hist = [0usize; BINS];
        for star in generator(N).generate(&mut rng) {
            let p = star.position();
            let cos_polar = p.z / p.length();
            let bin = (((cos_polar + 1.0) * 0.5) * BINS as f32) as usize;
            hist[bin.min(BINS - 1)] += 1;
        }

        let expected = N as f32 / BINS as f32;
        for (i, n) in hist.iter().enumerate() {
            let dev = (*n as f32 - expected).abs() / expected;
            assert!(dev < 0.08, "bin {i} has {n}, expected ~{expected}");
        }
    }

    #[test]
    fn polar_angle_itself_is_not_uniform() {
        // Equal-width polar bins near the poles cover less area, so they must
        // hold fewer stars than the equatorial bins.
        let mut rng = StdRng::seed_from_u64(3);
        let mut pole = 0usize;
        let mut equator = 0usize;
        for star in generator(20_000).generate(&mut rng) {
            let p = star.position();
            let polar = (p.z / p.length()).clamp(-1.0, 1.0).acos();
            if polar < 0.3 {
                pole += 1;
            } else if (polar - std::f32::consts::FRAC_PI_2).abs() < 0.15 {
                equator += 1;
            }
        }
        assert!(pole * 2 < equator, "pole={pole} equator={equator}");
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generator(64).generate(&mut StdRng::seed_from_u64(9));
        let b = generator(64).generate(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn hsl_extremes() {
        assert_eq!(hsl_to_linear_rgb(0.6, 0.2, 0.0), [0.0, 0.0, 0.0]);
        let white = hsl_to_linear_rgb(0.6, 0.2, 1.0);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-5));

        // Hue 0.6 is blue-ish: blue dominates at mid lightness.
        let mid = hsl_to_linear_rgb(0.6, 0.2, 0.5);
        assert!(mid[2] > mid[0]);
    }

    #[test]
    fn sprites_shrink_with_distance() {
        let near = attenuated_size_px(STAR_SIZE, 720.0, 25.0);
        let far = attenuated_size_px(STAR_SIZE, 720.0, 50.0);
        assert!((near - 2.88).abs() < 1e-4);
        assert!((near - 2.0 * far).abs() < 1e-4);
    }
}
