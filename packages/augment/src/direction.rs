//! Compass bucketing of incident coordinates around the town center.

use incident_log_models::{Coordinate, SideOfTown};

/// Initial great-circle bearing from `from` to `to`, in degrees `[0, 360)`.
#[must_use]
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let from_lat = from.latitude.to_radians();
    let to_lat = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = delta_lon.sin() * to_lat.cos();
    // Unfused so coincident points give exactly 0.0 and bucket as north.
    #[allow(clippy::suboptimal_flops)]
    let y = from_lat.cos() * to_lat.sin() - from_lat.sin() * to_lat.cos() * delta_lon.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Buckets a bearing into one of eight 45° sectors, with north covering
/// `[337.5, 22.5)`.
#[must_use]
pub fn sector(bearing: f64) -> SideOfTown {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((bearing + 22.5) / 45.0).floor() as usize % SideOfTown::SECTORS.len();
    SideOfTown::SECTORS[index]
}

/// Side of town of `coordinate` relative to `reference`, or
/// [`SideOfTown::Unknown`] when there is no coordinate.
#[must_use]
pub fn side_of_town(reference: Coordinate, coordinate: Option<Coordinate>) -> SideOfTown {
    coordinate.map_or(SideOfTown::Unknown, |to| sector(bearing(reference, to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Coordinate = Coordinate::new(35.220_833, -97.443_611);

    #[test]
    fn classen_blvd_is_southeast() {
        let target = Coordinate::new(35.204_581_362_318_84, -97.432_269_086_956_52);
        assert!((bearing(CENTER, target) - 150.305).abs() < 0.01);
        assert_eq!(side_of_town(CENTER, Some(target)), SideOfTown::SE);
    }

    #[test]
    fn cardinal_directions() {
        let north = Coordinate::new(35.3, -97.443_611);
        let east = Coordinate::new(35.220_833, -97.3);
        let south = Coordinate::new(35.1, -97.443_611);
        let west = Coordinate::new(35.220_833, -97.6);

        assert_eq!(side_of_town(CENTER, Some(north)), SideOfTown::N);
        assert_eq!(side_of_town(CENTER, Some(east)), SideOfTown::E);
        assert_eq!(side_of_town(CENTER, Some(south)), SideOfTown::S);
        assert_eq!(side_of_town(CENTER, Some(west)), SideOfTown::W);
    }

    #[test]
    fn sector_boundaries() {
        assert_eq!(sector(0.0), SideOfTown::N);
        assert_eq!(sector(22.4), SideOfTown::N);
        assert_eq!(sector(22.5), SideOfTown::NE);
        assert_eq!(sector(337.4), SideOfTown::NW);
        assert_eq!(sector(337.5), SideOfTown::N);
        assert_eq!(sector(359.9), SideOfTown::N);
    }

    #[test]
    fn reference_point_itself_is_north() {
        assert!(bearing(CENTER, CENTER).abs() < f64::EPSILON);
        assert_eq!(side_of_town(CENTER, Some(CENTER)), SideOfTown::N);
    }

    #[test]
    fn missing_coordinate_is_unknown() {
        assert_eq!(side_of_town(CENTER, None), SideOfTown::Unknown);
    }
}
