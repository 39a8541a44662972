use serde::{Deserialize, Serialize};

/// A value for each of the three spatial directions.
///
/// Used e.g. for the encoding matrix a trajectory is rescaled to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialDimension<T> {
    pub z: T,
    pub y: T,
    pub x: T,
}

impl<T> SpatialDimension<T> {
    pub fn new(z: T, y: T, x: T) -> Self {
        Self { z, y, x }
    }

    pub fn zyx(self) -> [T; 3] {
        [self.z, self.y, self.x]
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SpatialDimension<U> {
        SpatialDimension {
            z: f(self.z),
            y: f(self.y),
            x: f(self.x),
        }
    }
}

impl<T> From<[T; 3]> for SpatialDimension<T> {
    fn from([z, y, x]: [T; 3]) -> Self {
        Self { z, y, x }
    }
}
