//! Great-circle distance and local day boundaries.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};

use burgerank_core::GeoPoint;
use burgerank_core::constants::EARTH_RADIUS_KM;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// The UTC instant of the most recent local midnight at or before `now` for
/// a submitter whose clock runs at `offset`.
pub fn local_day_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = now.with_timezone(&offset).date_naive().and_time(NaiveTime::MIN);
    (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}
