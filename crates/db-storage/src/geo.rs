// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Coarse geo bucketing and great-circle distance
//!
//! Events store a pair of bucket keys derived from their coordinates. A bucket
//! key divides a coordinate axis into 0.1 degree stripes, which lets the store
//! pre-filter proximity candidates with a plain integer index before the exact
//! haversine distance is computed.

/// Earth radius in miles
const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Scale factor mapping degrees to bucket keys (0.1 degree per bucket)
const BUCKET_SCALE: f64 = 10.0;

/// Maps a coordinate to its bucket key.
///
/// Multiplies by [`BUCKET_SCALE`] and truncates toward zero. Deterministic and
/// total; adjacent points straddling a bucket boundary land in different
/// buckets, which is why queries match against [`bucket_neighborhood`] instead
/// of a single key.
pub fn bucket(coordinate: f64) -> i32 {
    (coordinate * BUCKET_SCALE).trunc() as i32
}

/// The bucket of `coordinate` and its immediate neighbors.
///
/// Used by the candidate queries to avoid false negatives at bucket
/// boundaries.
pub fn bucket_neighborhood(coordinate: f64) -> [i32; 3] {
    let b = bucket(coordinate);
    [b - 1, b, b + 1]
}

/// Great-circle distance between two coordinates in miles (haversine).
pub fn distance(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_long = (long2 - long1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_long / 2.0).sin().powi(2);

    // floating error can push `a` marginally outside [0, 1], which would make
    // asin return NaN for antipodal points
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}
