use crate::image_pipeline::common::error::{ConversionError, Result};

pub const DEFAULT_GAMMA: f32 = 2.2;

/// Display-encoded to scene-linear mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferFunction {
    /// Samples are passed through untouched
    Identity,
    /// `linear = encoded ^ gamma`
    Gamma(f32),
}

impl TransferFunction {
    pub fn from_config(to_linear: bool, gamma: f32) -> Result<Self> {
        if !to_linear {
            return Ok(TransferFunction::Identity);
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(ConversionError::InvalidConfig(format!(
                "gamma must be a positive finite number, got {}",
                gamma
            )));
        }
        Ok(TransferFunction::Gamma(gamma))
    }

    #[inline]
    pub fn apply(self, encoded: f32) -> f32 {
        match self {
            TransferFunction::Identity => encoded,
            TransferFunction::Gamma(gamma) => encoded.powf(gamma),
        }
    }

    pub fn apply_in_place(self, values: &mut [f32]) {
        if let TransferFunction::Gamma(_) = self {
            for v in values.iter_mut() {
                *v = self.apply(*v);
            }
        }
    }
}

impl Default for TransferFunction {
    fn default() -> Self {
        TransferFunction::Gamma(DEFAULT_GAMMA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_leaves_values_unchanged() {
        let original = vec![0.0, 0.25, 0.5, 1.0];
        let mut values = original.clone();
        TransferFunction::from_config(false, 2.2)
            .unwrap()
            .apply_in_place(&mut values);
        assert_eq!(values, original);
    }

    #[test]
    fn test_gamma_endpoints() {
        let tf = TransferFunction::default();
        assert_eq!(tf.apply(0.0), 0.0);
        assert_eq!(tf.apply(1.0), 1.0);
        assert_relative_eq!(tf.apply(0.5), 0.5f32.powf(2.2), epsilon = 1e-7);
    }

    #[test]
    fn test_gamma_is_monotonic() {
        let tf = TransferFunction::Gamma(2.2);
        let mut previous = tf.apply(0.0);
        for i in 1..=1000 {
            let current = tf.apply(i as f32 / 1000.0);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_rejects_bad_gamma() {
        assert!(TransferFunction::from_config(true, 0.0).is_err());
        assert!(TransferFunction::from_config(true, -1.0).is_err());
        assert!(TransferFunction::from_config(true, f32::NAN).is_err());
        // ignored when the transform is disabled
        assert_eq!(
            TransferFunction::from_config(false, -1.0).unwrap(),
            TransferFunction::Identity
        );
    }
}
