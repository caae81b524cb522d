//! Albers equal-area conic projection on the GRS80 ellipsoid
//!
//! All internal computation runs in one fixed equal-area planar system; the
//! geographic system appears only at the interchange edges (source features
//! arrive in lon/lat, the tessellation artifact leaves in lon/lat). The
//! parameter set matches the continental-US Albers the source data was
//! designed around. Formulas follow Snyder, "Map Projections: A Working
//! Manual", eqs. 14-1 through 14-21 and 3-16.

use geo::{Coord, coord};

/// GRS80 semi-major axis in meters
const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
/// GRS80 inverse flattening
const INVERSE_FLATTENING: f64 = 298.257_222_101;

/// First standard parallel of the CONUS parameter set, degrees
const CONUS_PARALLEL_1_DEG: f64 = 29.5;
/// Second standard parallel, degrees
const CONUS_PARALLEL_2_DEG: f64 = 45.5;
/// Latitude of origin, degrees
const CONUS_ORIGIN_LAT_DEG: f64 = 23.0;
/// Central meridian, degrees
const CONUS_ORIGIN_LON_DEG: f64 = -96.0;

/// Convergence threshold for the inverse latitude iteration, radians
const LATITUDE_TOLERANCE: f64 = 1e-12;
/// Iteration cap for the inverse latitude solve
const MAX_LATITUDE_ITERATIONS: usize = 16;

/// Albers equal-area conic projection between lon/lat degrees and meters
///
/// Instances are cheap to construct and immutable; the pipeline builds one
/// per run and threads it through the components that need it.
#[derive(Debug, Clone, Copy)]
pub struct AlbersEqualArea {
    /// Cone constant
    n: f64,
    /// Snyder's C
    c: f64,
    /// Radius at the projection origin
    rho0: f64,
    /// Central meridian in radians
    lon0: f64,
    /// First eccentricity
    e: f64,
    /// First eccentricity squared
    e_sq: f64,
}

impl AlbersEqualArea {
    /// Projection with the continental-US parameter set
    pub fn conus() -> Self {
        Self::new(
            CONUS_PARALLEL_1_DEG,
            CONUS_PARALLEL_2_DEG,
            CONUS_ORIGIN_LAT_DEG,
            CONUS_ORIGIN_LON_DEG,
        )
    }

    /// Projection with explicit standard parallels and origin, in degrees
    pub fn new(parallel_1_deg: f64, parallel_2_deg: f64, lat0_deg: f64, lon0_deg: f64) -> Self {
        let flattening = 1.0 / INVERSE_FLATTENING;
        let e_sq = flattening * (2.0 - flattening);
        let e = e_sq.sqrt();

        let phi1 = parallel_1_deg.to_radians();
        let phi2 = parallel_2_deg.to_radians();
        let phi0 = lat0_deg.to_radians();

        let m1 = meridional_factor(phi1, e_sq);
        let m2 = meridional_factor(phi2, e_sq);
        let q0 = authalic_q(phi0, e, e_sq);
        let q1 = authalic_q(phi1, e, e_sq);
        let q2 = authalic_q(phi2, e, e_sq);

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = n.mul_add(q1, m1 * m1);
        let rho0 = SEMI_MAJOR_AXIS_M * (c - n * q0).sqrt() / n;

        Self {
            n,
            c,
            rho0,
            lon0: lon0_deg.to_radians(),
            e,
            e_sq,
        }
    }

    /// Project a geographic coordinate (lon/lat degrees) to planar meters
    pub fn forward(&self, geographic: Coord<f64>) -> Coord<f64> {
        let lon = geographic.x.to_radians();
        let lat = geographic.y.to_radians();

        let q = authalic_q(lat, self.e, self.e_sq);
        let rho = SEMI_MAJOR_AXIS_M * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * (lon - self.lon0);

        coord! {
            x: rho * theta.sin(),
            y: rho.mul_add(-theta.cos(), self.rho0),
        }
    }

    /// Unproject planar meters back to a geographic coordinate (lon/lat degrees)
    pub fn inverse(&self, planar: Coord<f64>) -> Coord<f64> {
        let dy = self.rho0 - planar.y;
        let rho = planar.x.hypot(dy);
        // The CONUS cone constant is positive; atan2 keeps the quadrant right
        // for westward points.
        let theta = planar.x.atan2(dy);

        let rho_n_over_a = rho * self.n / SEMI_MAJOR_AXIS_M;
        let q = (self.c - rho_n_over_a * rho_n_over_a) / self.n;

        let lat = inverse_authalic_latitude(q, self.e, self.e_sq);
        let lon = self.lon0 + theta / self.n;

        coord! { x: lon.to_degrees(), y: lat.to_degrees() }
    }
}

/// Snyder's m: cos(phi) / sqrt(1 - e^2 sin^2 phi)
fn meridional_factor(phi: f64, e_sq: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / e_sq.mul_add(-(sin_phi * sin_phi), 1.0).sqrt()
}

/// Snyder's q, proportional to the authalic latitude sine
fn authalic_q(phi: f64, e: f64, e_sq: f64) -> f64 {
    let sin_phi = phi.sin();
    let denom = e_sq.mul_add(-(sin_phi * sin_phi), 1.0);
    let log_term = ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln();
    (1.0 - e_sq) * (sin_phi / denom - log_term / (2.0 * e))
}

/// Solve q for latitude with Snyder's fixed-point iteration (eq. 3-16)
fn inverse_authalic_latitude(q: f64, e: f64, e_sq: f64) -> f64 {
    let q_pole = authalic_q(std::f64::consts::FRAC_PI_2, e, e_sq);
    if q.abs() >= q_pole {
        return std::f64::consts::FRAC_PI_2.copysign(q);
    }

    let mut phi = (q / 2.0).asin();
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let sin_phi = phi.sin();
        let denom = e_sq.mul_add(-(sin_phi * sin_phi), 1.0);
        let log_term = ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln();

        let correction = denom * denom / (2.0 * phi.cos())
            * (q / (1.0 - e_sq) - sin_phi / denom + log_term / (2.0 * e));

        phi += correction;
        if correction.abs() < LATITUDE_TOLERANCE {
            break;
        }
    }

    phi
}
