//! Newtype indices for planning units and features.
//!
//! Both are 1-based, matching the way planning units are numbered in
//! grid cell order and in long-format representation tables. Internal
//! matrix storage works with 0-based offsets; use [`PlanningUnitId::offset`]
//! and [`PlanningUnitId::from_offset`] to cross between the two.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! one_based_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn new(id: usize) -> Self {
                Self(id)
            }

            #[inline]
            pub fn from_offset(offset: usize) -> Self {
                Self(offset + 1)
            }

            /// The 1-based value.
            #[inline]
            pub fn get(&self) -> usize {
                self.0
            }

            /// The 0-based offset, or `None` for the invalid id 0.
            #[inline]
            pub fn offset(&self) -> Option<usize> {
                self.0.checked_sub(1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<usize> for $name {
            fn from(id: usize) -> Self {
                Self(id)
            }
        }
    };
}

one_based_id!(
    /// A 1-based planning-unit index.
    PlanningUnitId
);

one_based_id!(
    /// A 1-based feature index (a row of the representation matrix).
    FeatureId
);
