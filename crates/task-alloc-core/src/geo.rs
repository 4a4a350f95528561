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

use std::fmt::Display;

/// Mean Earth radius used by the haversine kernel, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
///
/// With the `serde` feature it (de)serializes as `[latitude, longitude]`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "[f64; 2]", from = "[f64; 2]")
)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPointOutOfRangeError {
    latitude: f64,
    longitude: f64,
}

impl GeoPointOutOfRangeError {
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Display for GeoPointOutOfRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "coordinates [{}, {}] are not a valid [latitude, longitude] pair",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for GeoPointOutOfRangeError {}

impl GeoPoint {
    /// Builds a point without range checks.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Builds a point, rejecting non-finite values and values outside
    /// `[-90, 90] x [-180, 180]`.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, GeoPointOutOfRangeError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if lat_ok && lon_ok {
            Ok(GeoPoint::new(latitude, longitude))
        } else {
            Err(GeoPointOutOfRangeError {
                latitude,
                longitude,
            })
        }
    }

    #[inline]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance to `other` in kilometres.
    #[inline]
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.latitude, self.longitude)
    }
}

impl From<[f64; 2]> for GeoPoint {
    #[inline]
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        GeoPoint::new(latitude, longitude)
    }
}

impl From<GeoPoint> for [f64; 2] {
    #[inline]
    fn from(p: GeoPoint) -> Self {
        [p.latitude, p.longitude]
    }
}

/// Great-circle distance between `a` and `b` on a sphere of radius
/// [`EARTH_RADIUS_KM`].
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> GeoPoint {
        GeoPoint::new(52.5200, 13.4050)
    }

    fn paris() -> GeoPoint {
        GeoPoint::new(48.8566, 2.3522)
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(berlin(), berlin()), 0.0);
    }

    #[test]
    fn test_haversine_berlin_paris() {
        let d = berlin().haversine_km(&paris());
        assert!((d - 877.5).abs() < 2.0, "unexpected distance {d}");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = GeoPoint::new(12.9716, 77.5946);
        let b = GeoPoint::new(13.0827, 80.2707);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(91.0, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, -180.5).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::try_new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_array_conversions() {
        let p: GeoPoint = [1.5, -2.5].into();
        assert_eq!(p.latitude(), 1.5);
        assert_eq!(p.longitude(), -2.5);
        let arr: [f64; 2] = p.into();
        assert_eq!(arr, [1.5, -2.5]);
        assert_eq!(p.to_string(), "[1.5, -2.5]");
    }
}
