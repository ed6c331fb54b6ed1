//! Shared-exponent RGBE pixel codec.
//!
//! Each pixel is stored as three 8-bit mantissas and one exponent byte biased
//! by 128. The largest channel is split into a fraction in [0.5, 1) and a
//! power of two; all three channels are then scaled by that power of two.

/// Channels whose maximum falls below this are stored as black.
pub const RGBE_ZERO_THRESHOLD: f32 = 1.0e-32;

const EXPONENT_BIAS: i32 = 128;
const MANTISSA_BITS: i32 = 8;

/// One encoded pixel: `[R, G, B, E]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbe(pub [u8; 4]);

impl Rgbe {
    pub const ZERO: Rgbe = Rgbe([0, 0, 0, 0]);

    pub fn from_linear(r: f32, g: f32, b: f32) -> Self {
        let (r, g, b) = (sanitize(r), sanitize(g), sanitize(b));
        let max = r.max(g).max(b);
        if max < RGBE_ZERO_THRESHOLD {
            return Rgbe::ZERO;
        }

        // values beyond the format's range saturate the exponent byte
        let (_, exponent) = frexp(max);
        let exponent = exponent.min(u8::MAX as i32 - EXPONENT_BIAS);
        let scale = 2f64.powi(MANTISSA_BITS - exponent);

        Rgbe([
            mantissa(r, scale),
            mantissa(g, scale),
            mantissa(b, scale),
            (exponent + EXPONENT_BIAS) as u8,
        ])
    }

    pub fn to_linear(self) -> [f32; 3] {
        let [r, g, b, e] = self.0;
        if e == 0 {
            return [0.0; 3];
        }
        let scale = 2f64.powi(e as i32 - (EXPONENT_BIAS + MANTISSA_BITS));
        [
            (r as f64 * scale) as f32,
            (g as f64 * scale) as f32,
            (b as f64 * scale) as f32,
        ]
    }

    pub fn bytes(self) -> [u8; 4] {
        self.0
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_nan() || v <= 0.0 {
        0.0
    } else {
        v.min(f32::MAX)
    }
}

fn mantissa(channel: f32, scale: f64) -> u8 {
    (channel as f64 * scale).round().clamp(0.0, 255.0) as u8
}

/// Splits a positive, normal, finite `value` into `(fraction, exponent)` with
/// `value == fraction * 2^exponent` and `fraction` in [0.5, 1).
fn frexp(value: f32) -> (f32, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 23) & 0xff) as i32;
    let fraction = f32::from_bits((bits & 0x807f_ffff) | (126 << 23));
    (fraction, biased - 126)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(rgb: [f32; 3]) {
        let decoded = Rgbe::from_linear(rgb[0], rgb[1], rgb[2]).to_linear();
        let max = rgb[0].max(rgb[1]).max(rgb[2]);
        for (d, o) in decoded.iter().zip(rgb.iter()) {
            assert!(
                (d - o).abs() <= max / 256.0,
                "{:?} decoded as {:?}",
                rgb,
                decoded
            );
        }
    }

    #[test]
    fn test_frexp() {
        assert_eq!(frexp(1.0), (0.5, 1));
        assert_eq!(frexp(0.75), (0.75, 0));
        assert_eq!(frexp(3.0), (0.75, 2));
        assert_eq!(frexp(0.125), (0.5, -2));
    }

    #[test]
    fn test_unit_red() {
        let rgbe = Rgbe::from_linear(1.0, 0.0, 0.0);
        assert_eq!(rgbe, Rgbe([128, 0, 0, 129]));
        assert_eq!(rgbe.to_linear(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_below_threshold_is_zero() {
        assert_eq!(Rgbe::from_linear(0.0, 0.0, 0.0), Rgbe::ZERO);
        assert_eq!(Rgbe::from_linear(1e-33, 5e-33, 0.0), Rgbe::ZERO);
        assert_eq!(Rgbe::from_linear(-1.0, f32::NAN, 0.0), Rgbe::ZERO);
        assert_eq!(Rgbe::ZERO.to_linear(), [0.0; 3]);
    }

    #[test]
    fn test_round_trip_within_one_step() {
        assert_round_trip([0.3, 0.2, 0.1]);
        assert_round_trip([1.0, 0.5, 0.25]);
        assert_round_trip([7.5, 0.01, 3.3]);
        assert_round_trip([1234.5, 1000.0, 17.0]);
        assert_round_trip([0.0, 0.0, 1e-20]);
        assert_round_trip([2.0e-30, 1.0e-30, 1.5e-30]);
    }

    #[test]
    fn test_fraction_near_one_clamps_mantissa() {
        assert_eq!(Rgbe::from_linear(1.0 - f32::EPSILON, 0.0, 0.0), Rgbe([255, 0, 0, 128]));
        assert_eq!(Rgbe::from_linear(0.999, 0.0, 0.0), Rgbe([255, 0, 0, 128]));
        assert_round_trip([1.0 - f32::EPSILON, 0.0, 0.0]);
        assert_round_trip([0.999, 0.998, 0.5]);
    }

    #[test]
    fn test_round_trip_across_exponents() {
        let fractions = [0.5, 0.5 + f32::EPSILON, 0.75, 0.999, 0.998_05, 1.0 - f32::EPSILON];
        for k in -106..=99 {
            let power = 2f32.powi(k);
            for &fraction in &fractions {
                let max = fraction * power;
                if max < RGBE_ZERO_THRESHOLD {
                    continue;
                }
                assert_round_trip([max, max * 0.37, max * 0.0042]);
                assert_round_trip([max * 0.61, max * 0.001, max]);
            }
        }
    }

    #[test]
    fn test_round_trip_decimal_sweep() {
        for exponent in -31..=30 {
            let decade = 10f32.powi(exponent);
            for step in 1..=9 {
                let max = decade * step as f32;
                assert_round_trip([max, max / 3.0, max / 7.0]);
            }
        }
    }

    #[test]
    fn test_hdr_values_above_one_survive() {
        let [r, g, b] = Rgbe::from_linear(16.0, 4.0, 1.0).to_linear();
        assert_eq!([r, g, b], [16.0, 4.0, 1.0]);
    }

    #[test]
    fn test_huge_values_saturate() {
        let rgbe = Rgbe::from_linear(f32::MAX, 0.0, f32::INFINITY);
        assert_eq!(rgbe.bytes()[3], 255);
        assert_eq!(rgbe.bytes()[0], 255);
        assert_eq!(rgbe.bytes()[2], 255);
    }
}
