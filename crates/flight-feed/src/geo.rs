// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Distance helpers for nearest-first flight ordering.

/// Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const FEET_TO_KM: f64 = 0.0003048;

/// Convert polar coordinates to cartesian, with `radius_km` measured from
/// the Earth's centre.
fn polar_to_cartesian(lat_deg: f64, lon_deg: f64, radius_km: f64) -> [f64; 3] {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    [
        radius_km * lat.cos() * lon.sin(),
        radius_km * lat.sin(),
        radius_km * lat.cos() * lon.cos(),
    ]
}

/// Straight-line (slant) distance in kilometres from an observer on the
/// surface to an aircraft at `altitude_ft` above the reference sphere.
///
/// Unlike a great-circle distance this accounts for altitude, which
/// matters when ranking aircraft that are nearly overhead.
#[must_use]
pub fn slant_range_km(
    aircraft_lat: f64,
    aircraft_lon: f64,
    altitude_ft: i32,
    observer_lat: f64,
    observer_lon: f64,
) -> f64 {
    let aircraft_radius = EARTH_RADIUS_KM + f64::from(altitude_ft) * FEET_TO_KM;
    let a = polar_to_cartesian(aircraft_lat, aircraft_lon, aircraft_radius);
    let o = polar_to_cartesian(observer_lat, observer_lon, EARTH_RADIUS_KM);

    ((a[0] - o[0]).powi(2) + (a[1] - o[1]).powi(2) + (a[2] - o[2]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_aircraft_distance_is_its_altitude() {
        // 35,000 ft directly overhead is about 10.7 km away
        let d = slant_range_km(51.5, -0.12, 35_000, 51.5, -0.12);
        assert!((d - 35_000.0 * FEET_TO_KM).abs() < 0.01);
    }

    #[test]
    fn test_same_point_on_surface_is_zero() {
        let d = slant_range_km(55.8617, -4.2583, 0, 55.8617, -4.2583);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_closer_aircraft_ranks_first() {
        // Glasgow observer: a flight over Edinburgh beats one over London
        let near = slant_range_km(55.95, -3.19, 30_000, 55.8617, -4.2583);
        let far = slant_range_km(51.51, -0.13, 30_000, 55.8617, -4.2583);
        assert!(near < far);
    }
}
