use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Special properties of a trajectory along an axis.
    ///
    /// An empty set means arbitrary k-space positions. A singleton axis is
    /// always reported as on-grid as well.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TrajType: u8 {
        /// All positions lie on integer grid points (within tolerance).
        const ONGRID      = 1 << 0;
        /// The axis has length 1.
        const SINGLEVALUE = 1 << 1;
    }
}

impl TrajType {
    pub const ARBITRARY: Self = Self::empty();

    /// Intersection of all flags, i.e. the properties every item shares.
    ///
    /// The empty iterator yields [`TrajType::all`].
    pub fn common(types: impl IntoIterator<Item = TrajType>) -> Self {
        types.into_iter().fold(Self::all(), |acc, t| acc & t)
    }

    pub fn is_on_grid(&self) -> bool {
        self.contains(Self::ONGRID)
    }

    pub fn is_single_value(&self) -> bool {
        self.contains(Self::SINGLEVALUE)
    }
}

impl Default for TrajType {
    fn default() -> Self {
        Self::ARBITRARY
    }
}
