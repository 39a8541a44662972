//! Binary persistence of trajectories: MessagePack compressed with zstd.
//!
//! Decoding rebuilds the trajectory through its constructor, so a blob that
//! violates the trajectory invariants fails to decode instead of producing an
//! invalid instance.

use serde::{Serialize, de::DeserializeOwned};

use crate::{CodecError, KTrajectory};

pub fn to_bytes(traj: &KTrajectory) -> Result<Vec<u8>, CodecError> {
    encode(traj)
}

pub fn from_bytes(raw: &[u8]) -> Result<KTrajectory, CodecError> {
    decode(raw)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let raw = rmp_serde::to_vec_named(value).map_err(CodecError::SerializationError)?;
    Ok(compress(&raw))
}

pub(crate) fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, CodecError> {
    let decompressed = decompress(raw)?;
    rmp_serde::from_slice(&decompressed).map_err(CodecError::DeserializationError)
}

fn decompress(raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    use ruzstd::io::Read;
    let mut decoder = ruzstd::decoding::StreamingDecoder::new(raw)
        .map_err(|e| CodecError::DecompressionError(std::io::Error::other(e)))?;
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(CodecError::DecompressionError)?;
    Ok(decompressed)
}

fn compress(raw: &[u8]) -> Vec<u8> {
    ruzstd::encoding::compress_to_vec(raw, ruzstd::encoding::CompressionLevel::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Device, KArray, TrajectoryError};
    use ndarray::{ArrayD, IxDyn};

    fn radial() -> KTrajectory {
        let angle = |idx: &IxDyn| idx[2] as f64 * std::f64::consts::PI / 8.0;
        let radius = |idx: &IxDyn| idx[3] as f64 - 16.0;
        let kx = ArrayD::from_shape_fn(IxDyn(&[1, 1, 8, 32]), |idx| {
            radius(&idx) * angle(&idx).cos()
        });
        let ky = ArrayD::from_shape_fn(IxDyn(&[1, 1, 8, 32]), |idx| {
            radius(&idx) * angle(&idx).sin()
        });
        let kz = KArray::full(&[1, 1, 1, 1], 0.0);
        KTrajectory::new(kz, ky, kx).unwrap()
    }

    #[test]
    fn trajectory_survives_encoding() {
        let traj = radial().cuda(0);
        let bytes = to_bytes(&traj).unwrap();
        let decoded = from_bytes(&bytes).unwrap();
        assert_eq!(decoded, traj);
        assert_eq!(decoded.device(), Device::Cuda(0));
    }

    #[test]
    fn invalid_record_is_rejected() {
        #[derive(serde::Serialize)]
        struct Record {
            kz: KArray,
            ky: KArray,
            kx: KArray,
            grid_detection_tolerance: f64,
            repeat_detection_tolerance: Option<f64>,
        }
        let k = |n: usize| KArray::from_shape_vec(&[1, 1, 1, n], (0..n).map(|v| v as f64).collect()).unwrap();
        let bytes = encode(&Record {
            kz: k(3),
            ky: k(4),
            kx: k(3),
            grid_detection_tolerance: 1e-3,
            repeat_detection_tolerance: None,
        })
        .unwrap();

        match from_bytes(&bytes) {
            Err(CodecError::DeserializationError(err)) => {
                let expected = TrajectoryError::from(crate::ShapeError::NotBroadcastable {
                    shapes: vec![vec![1, 1, 1, 3], vec![1, 1, 1, 4], vec![1, 1, 1, 3]],
                });
                assert!(err.to_string().contains(&expected.to_string()), "{err}");
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_not_decompressed() {
        assert!(matches!(
            from_bytes(b"not a zstd frame"),
            Err(CodecError::DecompressionError(_))
        ));
    }
}
