// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean diameter of Earth, in meters.
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn earth_distance(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    let lat1 = (lat1 as f64).to_radians();
    let lon1 = (lon1 as f64).to_radians();
    let lat2 = (lat2 as f64).to_radians();
    let lon2 = (lon2 as f64).to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    (EARTH_DIAMETER * h.sqrt().asin()) as f32
}

#[cfg(test)]
mod tests {
    use super::earth_distance;

    #[test]
    fn one_degree_of_latitude() {
        let d = earth_distance(45.0, 9.0, 46.0, 9.0);
        assert!((d - 111_195.0).abs() < 10.0, "{d}");
    }

    #[test]
    fn same_point() {
        assert_eq!(earth_distance(45.18, 9.15, 45.18, 9.15), 0.0);
    }
}
