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

use num_traits::{CheckedAdd, CheckedSub, Zero};
use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

/// A value on the objective axis of the routing model.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Cost<T = i64>(T);

impl<T: Copy> Cost<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Cost(value)
    }

    #[inline]
    pub const fn value(self) -> T {
        self.0
    }
}

impl Cost<i64> {
    /// Rounds a non-negative real quantity (kilometres) half away from zero.
    #[inline]
    pub fn from_rounded(value: f64) -> Self {
        Cost(value.round() as i64)
    }
}

impl<T: Display> Display for Cost<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cost({})", self.0)
    }
}

impl<T> Add for Cost<T>
where
    T: Copy + CheckedAdd<Output = T>,
{
    type Output = Cost<T>;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Cost(self.0.checked_add(&rhs.0).expect("overflow in Cost + Cost"))
    }
}

impl<T> Sub for Cost<T>
where
    T: Copy + CheckedSub<Output = T>,
{
    type Output = Cost<T>;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Cost(
            self.0
                .checked_sub(&rhs.0)
                .expect("underflow in Cost - Cost"),
        )
    }
}

impl<T> Sum for Cost<T>
where
    T: Copy + CheckedAdd<Output = T> + Zero,
{
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cost(T::zero()), |a, b| a + b)
    }
}
