//! Spherical metric for equirectangular rasters.
//!
//! Conventions:
//! - UV space is `[0, 1)²`, `u` eastwards, `v` southwards; a pixel maps to its
//!   centre.
//! - Longitude spans `[-π, π)` with `u = 0.5` on the prime meridian; latitude
//!   spans `[-π/2, π/2]` with row 0 at the north pole.
//! - Unit vectors are `z`-up: `(cos φ cos λ, cos φ sin λ, sin φ)`.
//!
//! All distances are angles on the unit sphere (radians).

use core::f64::consts::{PI, TAU};

use crate::topology::grid::GridTopology;

/// Cartesian point on the unit sphere.
pub type UnitVector = [f64; 3];

/// Geographic coordinate in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoCoord {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lon: f64,
}

impl GeoCoord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat: lat_deg.to_radians(),
            lon: lon_deg.to_radians(),
        }
    }

    pub fn to_unit(self) -> UnitVector {
        let (sl, cl) = self.lat.sin_cos();
        let (so, co) = self.lon.sin_cos();
        [cl * co, cl * so, sl]
    }

    pub fn from_unit(v: UnitVector) -> Self {
        Self {
            lat: v[2].clamp(-1.0, 1.0).asin(),
            lon: v[1].atan2(v[0]),
        }
    }

    pub fn to_uv(self) -> (f64, f64) {
        let u = (self.lon / TAU + 0.5).rem_euclid(1.0);
        let v = (0.5 - self.lat / PI).clamp(0.0, 1.0);
        (u, v)
    }

    pub fn from_uv(u: f64, v: f64) -> Self {
        Self {
            lat: (0.5 - v) * PI,
            lon: (u - 0.5) * TAU,
        }
    }
}

/// Centre of pixel `(x, y)` in UV space.
#[inline]
pub fn pixel_to_uv(topology: &GridTopology, x: u32, y: u32) -> (f64, f64) {
    (
        (f64::from(x) + 0.5) / f64::from(topology.width()),
        (f64::from(y) + 0.5) / f64::from(topology.height()),
    )
}

/// Pixel containing a UV point; `u` wraps, `v` clamps to the pole rows.
pub fn uv_to_pixel(topology: &GridTopology, u: f64, v: f64) -> (u32, u32) {
    let w = topology.width();
    let h = topology.height();
    let x = (u.rem_euclid(1.0) * f64::from(w)).floor() as u32;
    let y = (v * f64::from(h)).floor().clamp(0.0, f64::from(h - 1)) as u32;
    (x.min(w - 1), y)
}

#[inline]
pub fn pixel_to_geo(topology: &GridTopology, x: u32, y: u32) -> GeoCoord {
    let (u, v) = pixel_to_uv(topology, x, y);
    GeoCoord::from_uv(u, v)
}

#[inline]
pub fn pixel_to_unit(topology: &GridTopology, flat: usize) -> UnitVector {
    let (x, y) = topology.coords(flat);
    pixel_to_geo(topology, x, y).to_unit()
}

pub fn geo_to_pixel(topology: &GridTopology, geo: GeoCoord) -> (u32, u32) {
    let (u, v) = geo.to_uv();
    uv_to_pixel(topology, u, v)
}

/// Great-circle distance via the haversine formula.
pub fn great_circle_distance(a: GeoCoord, b: GeoCoord) -> f64 {
    let dlat = b.lat - a.lat;
    let dlon = b.lon - a.lon;
    let h = (dlat * 0.5).sin().powi(2) + a.lat.cos() * b.lat.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Angle between two unit vectors; stable for both tiny and near-antipodal angles.
#[inline]
pub fn angular_distance(a: &UnitVector, b: &UnitVector) -> f64 {
    let cross = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let sin = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    let cos = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    sin.atan2(cos)
}

/// Normalised mean direction; `None` if the vectors cancel out.
pub fn spherical_centroid<'a, I>(vectors: I) -> Option<UnitVector>
where
    I: IntoIterator<Item = &'a UnitVector>,
{
    let mut sum = [0.0f64; 3];
    for v in vectors {
        sum[0] += v[0];
        sum[1] += v[1];
        sum[2] += v[2];
    }
    let norm = (sum[0] * sum[0] + sum[1] * sum[1] + sum[2] * sum[2]).sqrt();
    if norm < 1e-12 {
        return None;
    }
    Some([sum[0] / norm, sum[1] / norm, sum[2] / norm])
}
