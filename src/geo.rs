/*!
 * Geographic calculations.
 *
 * Hotspot clustering deliberately treats latitude and longitude as plain Cartesian coordinates,
 * which is fine for regional hazard reporting at sub-degree to low single degree thresholds. It
 * breaks down near the poles and across large longitude spans. A great circle distance is also
 * provided for reporting the physical size of a cluster.
 */
use serde::Serialize;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coord {
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lon: f64,
}

impl Coord {
    /// Build a coordinate from a GeoJSON style `[longitude, latitude]` pair.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Coord { lat, lon }
    }

    /// Euclidean distance treating degrees of latitude and longitude as planar units.
    pub fn planar_distance(self, other: Coord) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;

        f64::sqrt(dlat * dlat + dlon * dlon)
    }

    /// Great circle distance to another coordinate in kilometers.
    pub fn great_circle_distance(self, other: Coord) -> f64 {
        great_circle_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Latitude in [-90, 90], longitude in [-180, 180], and both finite.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Determine if these coordinates are close to each other.
    pub fn is_close(self, other: Coord, eps: f64) -> bool {
        (self.lat - other.lat).abs() <= eps && (self.lon - other.lon).abs() <= eps
    }
}

/// A latitude-longitude aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The lower left corner.
    pub ll: Coord,
    /// The upper right corner.
    pub ur: Coord,
}

impl BoundingBox {
    /// A box covering the whole globe.
    pub const WORLD: BoundingBox = BoundingBox {
        ll: Coord {
            lat: -90.0,
            lon: -180.0,
        },
        ur: Coord {
            lat: 90.0,
            lon: 180.0,
        },
    };

    /// Check if a coordinate lies inside the box, edges included.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lat >= self.ll.lat
            && coord.lat <= self.ur.lat
            && coord.lon >= self.ll.lon
            && coord.lon <= self.ur.lon
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{},{},{},{}",
            self.ll.lat, self.ll.lon, self.ur.lat, self.ur.lon
        )
    }
}

/// Parse a bounding box as bottom_lat,left_lon,top_lat,right_lon
impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(bbox_str: &str) -> Result<Self, Self::Err> {
        let corners: Vec<_> = bbox_str.split(',').map(str::trim).collect();

        if corners.len() != 4 {
            return Err(format!("Invalid number of coords: {}", bbox_str));
        }

        let mut vals = [0.0f64; 4];
        for (val, corner) in vals.iter_mut().zip(&corners) {
            *val = corner
                .parse()
                .map_err(|err| format!("Invalid coordinate '{}': {}", corner, err))?;
        }
        let [min_lat, min_lon, max_lat, max_lon] = vals;

        if min_lat >= max_lat || min_lon >= max_lon {
            return Err(format!(
                concat!(
                    "Minimum Lat/Lon must be less than Maximum Lat/Lon:",
                    " min_lat={} max_lat={} min_lon={} max_lon={}"
                ),
                min_lat, max_lat, min_lon, max_lon
            ));
        }

        if min_lat < -90.0 || max_lat > 90.0 || min_lon < -180.0 || max_lon > 180.0 {
            return Err(format!(
                concat!(
                    "Lat/Lon are out of range (-90.0 to 90.0 and -180.0 to 180.0):",
                    " min_lat={} max_lat={} min_lon={} max_lon={}"
                ),
                min_lat, max_lat, min_lon, max_lon
            ));
        }

        Ok(BoundingBox {
            ll: Coord {
                lat: min_lat,
                lon: min_lon,
            },
            ur: Coord {
                lat: max_lat,
                lon: max_lon,
            },
        })
    }
}

/// Anything with a location on the map.
pub trait Geo {
    /// The representative point of the object.
    fn centroid(&self) -> Coord;
}

impl Geo for Coord {
    fn centroid(&self) -> Coord {
        *self
    }
}

/**
 * the simple great circle distance calculation.
 *
 * #Arguments
 * * lat1 - the latitude of the first point in degrees.
 * * lon1 - the longitude of the first point in degrees.
 * * lat2 - the latitude of the second point in degrees.
 * * lon2 - the longitude of the second point in degrees.
 *
 * #Returns
 * The distance between the points in kilometers.
 */
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const DEG2RAD: f64 = 2.0 * std::f64::consts::PI / 360.0;
    const EARTH_RADIUS_KM: f64 = 6371.0090;

    let lat1_r = lat1 * DEG2RAD;
    let lon1_r = lon1 * DEG2RAD;
    let lat2_r = lat2 * DEG2RAD;
    let lon2_r = lon2 * DEG2RAD;

    let dlat2 = (lat2_r - lat1_r) / 2.0;
    let dlon2 = (lon2_r - lon1_r) / 2.0;

    let sin2_dlat = f64::powf(f64::sin(dlat2), 2.0);
    let sin2_dlon = f64::powf(f64::sin(dlon2), 2.0);

    let arc = 2.0
        * f64::asin(f64::sqrt(
            sin2_dlat + sin2_dlon * f64::cos(lat1_r) * f64::cos(lat2_r),
        ));

    arc * EARTH_RADIUS_KM
}
