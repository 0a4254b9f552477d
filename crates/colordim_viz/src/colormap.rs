//! Colormaps for the histogram image and the per-class curves.

use plotters::style::RGBColor;

/// Viridis approximation (purple → teal → yellow) for `t` in `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let r = (0.267 + t * (0.329 - 0.267 + t * (0.984 - 0.329))) * 255.0;
    let g = (0.005 + t * (0.569 - 0.005 + t * (0.906 - 0.569))) * 255.0;
    let b = (0.329 + t * (0.758 - 0.329 - t * (0.758 - 0.121))) * 255.0;
    RGBColor(channel(r), channel(g), channel(b))
}

/// Rainbow colormap (violet → red) for `t` in `[0, 1]`.
pub fn rainbow(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let r = (2.0 * t - 0.5).abs().min(1.0);
    let g = (std::f64::consts::PI * t).sin();
    let b = (std::f64::consts::FRAC_PI_2 * t).cos();
    RGBColor(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}

/// Gray with the given lightness in `[0, 1]`.
pub fn gray(lightness: f64) -> RGBColor {
    let v = channel(lightness.clamp(0.0, 1.0) * 255.0);
    RGBColor(v, v, v)
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainbow_ends() {
        assert_eq!(rainbow(0.0), RGBColor(128, 0, 255));
        let RGBColor(r, g, b) = rainbow(1.0);
        assert_eq!((r, b), (255, 0));
        assert!(g < 2);
        assert_eq!(rainbow(0.5).1, 255);
    }

    #[test]
    fn test_viridis_clamps() {
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        let RGBColor(r, g, _) = viridis(1.0);
        assert!(r > 200 && g > 200);
    }

    #[test]
    fn test_gray() {
        assert_eq!(gray(0.0), RGBColor(0, 0, 0));
        assert_eq!(gray(0.5), RGBColor(128, 128, 128));
    }
}
