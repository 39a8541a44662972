use std::f64::consts::PI;

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::utils::broadcast_shapes;

/// Sequence constants of a WASABITI acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WasabitiConfig {
    /// Duration of the block saturation pulse [s]
    pub rf_duration: f64,
    /// Nominal B1 amplitude of the saturation pulse [µT]
    pub b1_nominal: f64,
    /// Gyromagnetic ratio [MHz/T]
    pub gamma: f64,
}

impl Default for WasabitiConfig {
    fn default() -> Self {
        Self {
            rf_duration: 0.005,
            b1_nominal: 3.75,
            gamma: 42.5764,
        }
    }
}

/// WASABI signal model extended by a T1 recovery term (WASABITI).
///
/// Maps `(b0_shift [Hz], relative_b1, t1 [s])` to the signal acquired at each
/// frequency offset after the given recovery time. Offsets and recovery times
/// share the shape `(contrast, ...)`; the parameters have shape `(*other)` and
/// the signal `(contrast, *other)` after broadcasting.
#[derive(Clone, Debug, PartialEq)]
pub struct Wasabiti {
    offsets: ArrayD<f64>,
    recovery_time: ArrayD<f64>,
    config: WasabitiConfig,
}

impl Wasabiti {
    pub fn new(offsets: ArrayD<f64>, recovery_time: ArrayD<f64>) -> Result<Self, ModelError> {
        Self::with_config(offsets, recovery_time, WasabitiConfig::default())
    }

    pub fn with_config(
        offsets: ArrayD<f64>,
        recovery_time: ArrayD<f64>,
        config: WasabitiConfig,
    ) -> Result<Self, ModelError> {
        if offsets.shape() != recovery_time.shape() {
            return Err(ModelError::ShapeMismatch {
                offsets: offsets.shape().to_vec(),
                recovery_time: recovery_time.shape().to_vec(),
            });
        }
        Ok(Self {
            offsets,
            recovery_time,
            config,
        })
    }

    pub fn offsets(&self) -> &ArrayD<f64> {
        &self.offsets
    }

    pub fn recovery_time(&self) -> &ArrayD<f64> {
        &self.recovery_time
    }

    pub fn config(&self) -> &WasabitiConfig {
        &self.config
    }

    /// Evaluate the signal for the given parameter maps.
    pub fn forward(
        &self,
        b0_shift: &ArrayD<f64>,
        relative_b1: &ArrayD<f64>,
        t1: &ArrayD<f64>,
    ) -> Result<ArrayD<f64>, ModelError> {
        let parameters = [b0_shift.shape(), relative_b1.shape(), t1.shape()];
        let parameter_shape = broadcast_shapes(parameters).ok_or_else(|| {
            ModelError::NotBroadcastable {
                offsets: self.offsets.shape().to_vec(),
                parameters: parameters.concat(),
            }
        })?;

        // offsets (contrast, ...) get trailing singleton axes for parameter dimensions they lack
        let offsets = pad_right(self.offsets.view(), parameter_shape.len());
        let recovery_time = pad_right(self.recovery_time.view(), parameter_shape.len());

        let not_broadcastable = || ModelError::NotBroadcastable {
            offsets: offsets.shape().to_vec(),
            parameters: parameter_shape.clone(),
        };
        let shape = broadcast_shapes([offsets.shape(), &parameter_shape[..]])
            .ok_or_else(not_broadcastable)?;
        let expand = |a: ArrayViewD<'_, f64>| a.broadcast(IxDyn(&shape)).map(|v| v.to_owned());
        let [offsets, recovery_time, b0_shift, relative_b1, t1] = [
            offsets.view(),
            recovery_time.view(),
            b0_shift.view(),
            relative_b1.view(),
            t1.view(),
        ]
        .map(expand);
        let (
            Some(offsets),
            Some(recovery_time),
            Some(b0_shift),
            Some(relative_b1),
            Some(t1),
        ) = (offsets, recovery_time, b0_shift, relative_b1, t1)
        else {
            return Err(not_broadcastable());
        };

        let mut signal = ArrayD::zeros(IxDyn(&shape));
        Zip::from(&mut signal)
            .and(&offsets)
            .and(&recovery_time)
            .and(&b0_shift)
            .and(&relative_b1)
            .and(&t1)
            .for_each(|s, &offset, &recovery_time, &b0_shift, &relative_b1, &t1| {
                *s = self.signal(offset, recovery_time, b0_shift, relative_b1, t1);
            });
        Ok(signal)
    }

    fn signal(&self, offset: f64, recovery_time: f64, b0_shift: f64, relative_b1: f64, t1: f64) -> f64 {
        let WasabitiConfig {
            rf_duration,
            b1_nominal,
            gamma,
        } = self.config;

        // B1 amplitude in Hz
        let b1 = b1_nominal * relative_b1 * gamma;
        let da = offset - b0_shift;
        let mzi = 1.0 - (-recovery_time / t1).exp();

        let saturation = 2.0
            * (PI * b1 * rf_duration).powi(2)
            * sinc(rf_duration * (b1.powi(2) + da.powi(2)).sqrt()).powi(2);
        mzi * (1.0 - saturation)
    }
}

/// Normalized sinc, `sin(πx) / (πx)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn pad_right(array: ArrayViewD<'_, f64>, parameter_ndim: usize) -> ArrayViewD<'_, f64> {
    let missing = (parameter_ndim + 1).saturating_sub(array.ndim());
    (0..missing).fold(array, |a, _| {
        let last = a.ndim();
        a.insert_axis(Axis(last))
    })
}
