mod serde;

use image::{GrayImage, RgbImage};
use rand::Rng;

use crate::{error::DatasetError, utils::Gaussian, Float};

// Vol is the tensor every dataset hands out.
// It is a flat buffer of numbers together with an ordered shape,
// stored row-major (last axis varies fastest). Image samples use a
// channel-major [channels, height, width] layout.
#[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
pub struct Vol {
    shape: Vec<usize>,

    pub w: Vec<Float>,
}

pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

impl Vol {
    pub fn from_shape_vec(shape: &[usize], w: Vec<Float>) -> Result<Self, DatasetError> {
        let expected = num_elements(shape);
        if expected != w.len() {
            return Err(DatasetError::ShapeMismatch {
                expected,
                actual: w.len(),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            w,
        })
    }

    /// A one-dimensional volume over `w`.
    pub fn vector(w: Vec<Float>) -> Self {
        Self {
            shape: vec![w.len()],
            w,
        }
    }

    /// Fills a volume of the given shape with independent draws.
    pub fn gaussian<R: Rng + ?Sized>(shape: &[usize], gaussian: &Gaussian, rng: &mut R) -> Self {
        Self {
            shape: shape.to_vec(),
            w: gaussian.vec(rng, num_elements(shape)),
        }
    }

    pub fn add_scalar(&mut self, value: Float) {
        for w in self.w.iter_mut() {
            *w += value;
        }
    }

    /// Reinterprets the buffer under a new shape with the same element count.
    pub fn reshape(self, shape: &[usize]) -> Result<Self, DatasetError> {
        Self::from_shape_vec(shape, self.w)
    }

    /// Converts an RGB image to `[3, height, width]` with values in [-1, 1].
    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let npix = (width as usize) * (height as usize);

        // [H, W, C] interleaved to [C, H, W] planar
        let mut w = vec![0.0; 3 * npix];
        for (i, pixel) in img.pixels().enumerate() {
            for (c, &channel) in pixel.0.iter().enumerate() {
                w[c * npix + i] = to_signed_unit(channel);
            }
        }

        Self {
            shape: vec![3, height as usize, width as usize],
            w,
        }
    }

    /// Converts a luma image to `[1, height, width]` with values in [-1, 1].
    pub fn from_grayscale_image(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            shape: vec![1, height as usize, width as usize],
            w: img.as_raw().iter().copied().map(to_signed_unit).collect(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn len(&self) -> usize {
        self.w.len()
    }
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }
}

// [0, 255] -> [0, 1] -> [-1, 1]
fn to_signed_unit(pixel: u8) -> Float {
    2.0 * (pixel as Float / 255.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{Luma, Rgb};
    use rstest::rstest;

    #[rstest]
    #[case(&[6], &[2, 3])]
    #[case(&[2, 3], &[3, 1, 2])]
    #[case(&[3, 4, 2], &[24])]
    fn reshape_preserves_buffer(#[case] from: &[usize], #[case] to: &[usize]) {
        let values: Vec<Float> = (0..num_elements(from)).map(|i| i as Float).collect();
        let vol = Vol::from_shape_vec(from, values.clone()).expect("matching length");

        let reshaped = vol.reshape(to).expect("same element count");
        assert_eq!(reshaped.shape(), to);
        assert_eq!(reshaped.w, values);
    }

    #[test]
    fn reshape_rejects_different_element_count() {
        let vol = Vol::from_shape_vec(&[2, 3], vec![0.0; 6]).expect("matching length");
        let err = vol.reshape(&[4, 2]).expect_err("6 != 8");
        assert!(matches!(
            err,
            DatasetError::ShapeMismatch {
                expected: 8,
                actual: 6
            }
        ));
    }

    #[test]
    fn rgb_image_is_planar_and_signed() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 255, 0]));
        img.put_pixel(1, 0, Rgb([255, 0, 255]));

        let vol = Vol::from_rgb_image(&img);
        assert_eq!(vol.shape(), &[3, 1, 2]);
        assert_eq!(vol.w, vec![-1.0, 1.0, 1.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn grayscale_image_has_single_channel() {
        let img = GrayImage::from_pixel(3, 2, Luma([255]));
        let vol = Vol::from_grayscale_image(&img);
        assert_eq!(vol.shape(), &[1, 2, 3]);
        assert!(vol.w.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn serde_round_trip_checks_length() {
        let vol = Vol::from_shape_vec(&[1, 2], vec![0.5, -0.5]).expect("matching length");
        let json = serde_json::to_string(&vol).expect("serializes");
        assert_eq!(json, r#"{"shape":[1,2],"w":[0.5,-0.5]}"#);

        let back: Vol = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, vol);

        let err = serde_json::from_str::<Vol>(r#"{"shape":[3],"w":[1.0]}"#)
            .expect_err("length mismatch must be rejected");
        assert!(err.to_string().contains("3 elements"));
    }
}
