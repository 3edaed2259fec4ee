//! Spherical reprojection used to sidestep polar pixel distortion.
//!
//! Boundary extraction and fill rendering are unreliable near the poles of
//! an equirectangular raster, where a single physical region smears across
//! many columns. Rotating the sphere by 90° about the x-axis moves the pole
//! neighborhoods to the equator of the working frame, where sampling density
//! is uniform; after processing, the inverse rotation maps results back.
//!
//! Both directions are pull-back resamplers: for every output pixel at
//! (θ, φ) the rotated source coordinates are
//!
//! ```text
//! θ' = arccos(±sin θ · sin φ)
//! φ' = atan2(∓cos θ, sin θ · cos φ)      (+2π when negative)
//! ```
//!
//! (upper signs forward, lower signs inverse), and the nearest source pixel
//! is looked up with indices clamped to the raster bounds. Nearest-neighbor
//! sampling is lossy near the sampling singularities: several output pixels
//! can collapse onto one input pixel around the poles, so
//! `inverse(forward(x))` reproduces `x` exactly only for content in regions
//! the rotation maps rigidly onto the pixel grid, and approximately
//! elsewhere away from the poles.

use image::{GrayImage, ImageBuffer, Pixel, RgbImage};

use crate::grid::SphericalGrid;

/// Rotate a grayscale raster so pole neighborhoods land on the equator.
pub fn polar_forward(img: &GrayImage) -> GrayImage {
    remap(img, false)
}

/// Inverse rotation: map a processed grayscale raster back to the original
/// longitude/latitude frame.
pub fn polar_inverse(img: &GrayImage) -> GrayImage {
    remap(img, true)
}

/// Forward rotation for RGB rasters.
pub fn polar_forward_rgb(img: &RgbImage) -> RgbImage {
    remap(img, false)
}

/// Inverse rotation for RGB rasters (e.g. a color-filled render produced in
/// the rotated frame).
pub fn polar_inverse_rgb(img: &RgbImage) -> RgbImage {
    remap(img, true)
}

/// Nearest-neighbor pull-back through the ±90° rotation about the x-axis.
fn remap<P>(img: &ImageBuffer<P, Vec<u8>>, inverse: bool) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = img.dimensions();
    let mut out = ImageBuffer::new(width, height);
    if width < 2 || height < 2 {
        return out;
    }

    let grid = SphericalGrid::new(height, width);
    let dt = grid.delta_theta();
    let dp = grid.delta_phi();
    let sign = if inverse { -1.0 } else { 1.0 };

    for row in 0..height {
        let theta = grid.theta(row as f64);
        let (sin_t, cos_t) = theta.sin_cos();
        for col in 0..width {
            let phi = grid.longitude(col as f64);

            let theta_rot = (sign * sin_t * phi.sin()).clamp(-1.0, 1.0).acos();
            let mut phi_rot = (-sign * cos_t).atan2(sin_t * phi.cos());
            if phi_rot < 0.0 {
                phi_rot += std::f64::consts::TAU;
            }

            let src_row = (((std::f64::consts::PI - theta_rot) / dt).round() as i64)
                .clamp(0, height as i64 - 1) as u32;
            let src_col = ((phi_rot / dp).round() as i64).clamp(0, width as i64 - 1) as u32;

            out.put_pixel(col, row, *img.get_pixel(src_col, src_row));
        }
    }

    out
}
