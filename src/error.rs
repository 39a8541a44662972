use thiserror::Error;

use crate::data::Device;

/// The coordinate arrays of a trajectory do not form a valid shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("the k-space trajectory dimensions must be broadcastable (shapes: {shapes:?})")]
    NotBroadcastable { shapes: Vec<Vec<usize>> },
    #[error(
        "the k-space trajectory tensors should each have at least 4 dimensions (found {rank})"
    )]
    InsufficientRank { rank: usize },
}

/// Invalid arguments for converting a stacked tensor into a trajectory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stack dimension must have length 3 (found {found})")]
    StackLength { found: usize },
    #[error("stack dimension {dim} out of range for tensor with {ndim} dimensions")]
    StackDimOutOfRange { dim: isize, ndim: usize },
    #[error("axes order must be a permutation of 'zyx' (found {0:?})")]
    AxesOrder(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("invalid shape: {0}")]
    Shape(#[from] ShapeError),
    #[error("invalid argument: {0}")]
    Validation(#[from] ValidationError),
    #[error("kz, ky and kx must be on the same device (found {0:?})")]
    DeviceMismatch([Device; 3]),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    SerializationError(rmp_serde::encode::Error),
    #[error("deserialization failed: {0}")]
    DeserializationError(rmp_serde::decode::Error),
    #[error("decompression failed: {0}")]
    DecompressionError(std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Shape of recovery_time ({recovery_time:?}) and offsets ({offsets:?}) must match")]
    ShapeMismatch {
        offsets: Vec<usize>,
        recovery_time: Vec<usize>,
    },
    #[error("parameters with shape {parameters:?} cannot be broadcast against offsets of shape {offsets:?}")]
    NotBroadcastable {
        offsets: Vec<usize>,
        parameters: Vec<usize>,
    },
}
