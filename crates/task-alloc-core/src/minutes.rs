// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

/// A span of working time in whole minutes.
///
/// Task durations and agent availabilities are both expressed in `Minutes`;
/// the capacity dimension of the routing model accumulates them.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Minutes(i64);

impl Minutes {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Minutes(value)
    }

    #[inline]
    pub const fn zero() -> Self {
        Minutes(0)
    }

    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn checked_add(self, other: Minutes) -> Option<Self> {
        self.0.checked_add(other.0).map(Minutes)
    }

    #[inline]
    pub fn saturating_sub(self, other: Minutes) -> Self {
        Minutes(self.0.saturating_sub(other.0))
    }
}

impl Display for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}min", self.0)
    }
}

impl From<i64> for Minutes {
    #[inline]
    fn from(value: i64) -> Self {
        Minutes(value)
    }
}

impl Add for Minutes {
    type Output = Minutes;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Minutes(
            self.0
                .checked_add(rhs.0)
                .expect("overflow in Minutes + Minutes"),
        )
    }
}

impl AddAssign for Minutes {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Minutes {
    type Output = Minutes;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Minutes(
            self.0
                .checked_sub(rhs.0)
                .expect("underflow in Minutes - Minutes"),
        )
    }
}

impl Sum for Minutes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Minutes::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Minutes> for Minutes {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Minutes::zero(), |a, b| a + *b)
    }
}
