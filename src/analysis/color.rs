use palette::{FromColor, Hsv, Lab, Srgb};
use serde::{Deserialize, Serialize};

/// Hue, saturation and value, each normalised to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitHsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl UnitHsv {
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let hsv: Hsv = Hsv::from_color(to_srgb(rgb));
        let hue = hsv.hue.into_positive_degrees() / 360.0;
        Self {
            // 360 degrees folds back to red
            hue: if hue >= 1.0 { 0.0 } else { hue },
            saturation: hsv.saturation.clamp(0.0, 1.0),
            value: hsv.value.clamp(0.0, 1.0),
        }
    }

    /// Saturation on the 0-255 scale used by the white-pixel thresholds.
    pub fn saturation_u8(&self) -> u8 {
        (self.saturation * 255.0).round() as u8
    }

    pub fn value_u8(&self) -> u8 {
        (self.value * 255.0).round() as u8
    }
}

fn to_srgb(rgb: [u8; 3]) -> Srgb<f32> {
    Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>()
}

/// sRGB to 8-bit Lab: `L` scaled to `0..=255`, `a`/`b` offset by 128.
pub fn rgb_to_lab8(rgb: [u8; 3]) -> [u8; 3] {
    let lab: Lab = Lab::from_color(to_srgb(rgb));
    [
        to_u8(lab.l * 255.0 / 100.0),
        to_u8(lab.a + 128.0),
        to_u8(lab.b + 128.0),
    ]
}

pub fn lab8_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let lab: Lab = Lab::new(
        lab[0] as f32 * 100.0 / 255.0,
        lab[1] as f32 - 128.0,
        lab[2] as f32 - 128.0,
    );
    let srgb: Srgb<f32> = Srgb::from_color(lab);
    [
        to_u8(srgb.red * 255.0),
        to_u8(srgb.green * 255.0),
        to_u8(srgb.blue * 255.0),
    ]
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grey_has_no_saturation() {
        let hsv = UnitHsv::from_rgb([220, 220, 220]);
        assert_eq!(hsv.saturation_u8(), 0);
        assert_eq!(hsv.value_u8(), 220);
    }

    #[test]
    fn brown_hue_sits_in_orange_band() {
        let hsv = UnitHsv::from_rgb([150, 100, 50]);
        assert!((hsv.hue - 30.0 / 360.0).abs() < 1e-3);
        assert!((hsv.saturation - 100.0 / 150.0).abs() < 1e-3);
        assert!((hsv.value - 150.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn lab_neutral_axis() {
        let lab = rgb_to_lab8([255, 255, 255]);
        assert_eq!(lab[0], 255);
        assert!((lab[1] as i32 - 128).abs() <= 1);
        assert!((lab[2] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn lab_conversion_is_close_to_lossless() {
        for rgb in [[12u8, 80, 200], [200, 150, 40], [90, 90, 90]] {
            let back = lab8_to_rgb(rgb_to_lab8(rgb));
            for c in 0..3 {
                assert!((back[c] as i32 - rgb[c] as i32).abs() <= 3, "{rgb:?} -> {back:?}");
            }
        }
    }
}
