//! WGS84 <-> UTM conversion (Transverse Mercator, Krüger series).
//!
//! The series is carried to 4th order in the third flattening `n`, which
//! keeps forward/inverse round trips well under a millimeter inside the
//! zone and its one-zone margin.

use crate::config::{CorridorConfig, Hemisphere};
use crate::error::ProjectionDomainError;
use crate::models::{GeoPoint, ProjectedPoint};

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const MIN_LAT: f64 = -80.0;
const MAX_LAT: f64 = 84.0;
/// Longitude reach either side of the central meridian (zone half-width plus one zone).
const MAX_LNG_FROM_CM: f64 = 6.0;

/// Projects between geodetic degrees and planar meters in one UTM zone.
#[derive(Debug, Clone, PartialEq)]
pub struct UtmProjector {
    zone: u8,
    central_meridian: f64,
    false_northing: f64,
    /// Rectifying radius scaled by k0.
    k0_a: f64,
    e: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

impl UtmProjector {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        let rectifying = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
            49561.0 * n4 / 161_280.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
            4397.0 * n4 / 161_280.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0,
            56.0 * n3 / 15.0 - 136.0 * n4 / 35.0,
            4279.0 * n4 / 630.0,
        ];

        Self {
            zone,
            central_meridian: f64::from(zone) * 6.0 - 183.0,
            false_northing: match hemisphere {
                Hemisphere::North => 0.0,
                Hemisphere::South => FALSE_NORTHING_SOUTH,
            },
            k0_a: K0 * rectifying,
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha,
            beta,
            delta,
        }
    }

    pub fn from_config(config: &CorridorConfig) -> Self {
        Self::new(config.utm_zone, config.hemisphere)
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    fn in_domain(&self, lat: f64, lng: f64) -> bool {
        lat.is_finite()
            && lng.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&lat)
            && (lng - self.central_meridian).abs() <= MAX_LNG_FROM_CM
    }

    /// Geodetic degrees to planar meters.
    pub fn forward(&self, lng: f64, lat: f64) -> Result<ProjectedPoint, ProjectionDomainError> {
        if !self.in_domain(lat, lng) {
            return Err(ProjectionDomainError::Geodetic {
                lat,
                lng,
                zone: self.zone,
            });
        }

        let phi = lat.to_radians();
        let dlam = (lng - self.central_meridian).to_radians();
        let sin_phi = phi.sin();

        // Conformal latitude via tan(chi) = sinh(atanh(sin phi) - e atanh(e sin phi))
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlam.cos());
        let eta_p = (dlam.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        Ok(ProjectedPoint::new(
            FALSE_EASTING + self.k0_a * eta,
            self.false_northing + self.k0_a * xi,
        ))
    }

    pub fn forward_point(&self, point: &GeoPoint) -> Result<ProjectedPoint, ProjectionDomainError> {
        self.forward(point.lng, point.lat)
    }

    /// Planar meters to geodetic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionDomainError> {
        let out_of_domain = || ProjectionDomainError::Planar {
            x,
            y,
            zone: self.zone,
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(out_of_domain());
        }

        let xi = (y - self.false_northing) / self.k0_a;
        let eta = (x - FALSE_EASTING) / self.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).clamp(-1.0, 1.0).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += d * (k * chi).sin();
        }
        let lam = eta_p.sinh().atan2(xi_p.cos());

        let lat = phi.to_degrees();
        let lng = self.central_meridian + lam.to_degrees();
        if !self.in_domain(lat, lng) {
            return Err(out_of_domain());
        }
        Ok(GeoPoint::new(lat, lng))
    }

    pub fn inverse_point(&self, point: &ProjectedPoint) -> Result<GeoPoint, ProjectionDomainError> {
        self.inverse(point.x, point.y)
    }
}

impl Default for UtmProjector {
    fn default() -> Self {
        Self::new(37, Hemisphere::North)
    }
}
