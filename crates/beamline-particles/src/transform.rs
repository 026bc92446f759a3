//! Transforms between the transverse-time and spatial frames.
//!
//! Both directions share the reference normalisation: momenta are in
//! units of the reference momentum `βγ·mc`, and the longitudinal slot of
//! the transverse-time frame is a time lag `c·Δt` in metres.

use beamline_core::{Direction, Frame, FrameError, Particle, RefParticle, TransformError};

use crate::tile::ParticleTile;

/// Reference quantities every per-particle transform needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceScale {
    /// Reference `βγ`.
    pub bg: f64,
    /// Reference `γ`.
    pub gamma: f64,
}

impl ReferenceScale {
    /// Extract the scale from a moving reference particle.
    pub fn of(refpart: &RefParticle) -> Result<Self, TransformError> {
        if !refpart.is_valid() {
            return Err(TransformError::InvalidReference);
        }
        Ok(Self {
            bg: refpart.beta_gamma(),
            gamma: refpart.gamma(),
        })
    }
}

/// `(x, y, t, px, py, pt)` to `(x, y, z, px, py, pz)`.
pub fn to_spatial(p: &Particle, r: ReferenceScale) -> Result<Particle, TransformError> {
    let (t, pt) = (p.z, p.pz);
    let px = p.px * r.bg;
    let py = p.py * r.bg;
    let gamma = r.gamma - pt * r.bg;
    let arg = gamma * gamma - 1.0 - px * px - py * py;
    // `!(arg > 0)` also catches NaN.
    if !(arg > 0.0) {
        return Err(TransformError::Unphysical {
            particle_id: p.id,
            reason: format!("imaginary longitudinal momentum (pz² = {arg})"),
        });
    }
    let pz = arg.sqrt();
    Ok(Particle {
        x: p.x - px * t / gamma,
        y: p.y - py * t / gamma,
        z: -pz * t / gamma,
        px: px / r.bg,
        py: py / r.bg,
        pz: (pz - r.bg) / r.bg,
        ..*p
    })
}

/// `(x, y, z, px, py, pz)` to `(x, y, t, px, py, pt)`.
pub fn to_time(p: &Particle, r: ReferenceScale) -> Result<Particle, TransformError> {
    let px = p.px * r.bg;
    let py = p.py * r.bg;
    let pz = p.pz * r.bg + r.bg;
    if !(pz > 0.0) {
        return Err(TransformError::Unphysical {
            particle_id: p.id,
            reason: format!("non-forward longitudinal momentum (pz = {pz})"),
        });
    }
    let gamma = (1.0 + px * px + py * py + pz * pz).sqrt();
    let t = -p.z * gamma / pz;
    Ok(Particle {
        x: p.x + px * t / gamma,
        y: p.y + py * t / gamma,
        z: t,
        px: px / r.bg,
        py: py / r.bg,
        pz: (r.gamma - gamma) / r.bg,
        ..*p
    })
}

/// Transform one particle in `direction`.
pub fn apply(
    p: &Particle,
    direction: Direction,
    r: ReferenceScale,
) -> Result<Particle, TransformError> {
    match direction {
        Direction::TimeToSpatial => to_spatial(p, r),
        Direction::SpatialToTime => to_time(p, r),
    }
}

/// Transform every tile, all or nothing.
///
/// New coordinates are staged first; the tiles are only overwritten once
/// every particle has transformed cleanly.
pub fn transform_tiles(
    tiles: &mut [ParticleTile],
    direction: Direction,
    refpart: &RefParticle,
) -> Result<(), TransformError> {
    let scale = ReferenceScale::of(refpart)?;
    let staged = tiles
        .iter()
        .map(|tile| {
            tile.particles
                .iter()
                .map(|p| apply(p, direction, scale))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    for (tile, particles) in tiles.iter_mut().zip(staged) {
        tile.particles = particles;
    }
    Ok(())
}

/// Frame precondition for a transform, as a [`TransformError`].
pub fn check_source(direction: Direction, found: Frame) -> Result<(), TransformError> {
    FrameError::check(
        match direction {
            Direction::TimeToSpatial => "transform t->z",
            Direction::SpatialToTime => "transform z->t",
        },
        direction.source(),
        found,
    )
    .map_err(TransformError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn electron_scale() -> ReferenceScale {
        ReferenceScale::of(
            &RefParticle::default()
                .set_mass_mev(beamline_core::particle::ELECTRON_MASS_MEV)
                .set_kin_energy_mev(2.0),
        )
        .unwrap()
    }

    #[test]
    fn reference_orbit_is_fixed_point() {
        let r = electron_scale();
        let p = Particle::at_origin(1);
        let s = to_spatial(&p, r).unwrap();
        assert!(s.pz.abs() < 1e-12);
        assert_eq!(s.z, 0.0);
        let t = to_time(&s, r).unwrap();
        assert!(t.pz.abs() < 1e-12);
    }

    #[test]
    fn time_lag_maps_to_negative_offset() {
        let r = electron_scale();
        let p = Particle {
            z: 1e-3,
            ..Particle::at_origin(1)
        };
        let s = to_spatial(&p, r).unwrap();
        // On-momentum: z = -β·t.
        let beta = r.bg / r.gamma;
        assert!((s.z + beta * 1e-3).abs() < 1e-15);
    }

    #[test]
    fn imaginary_momentum_rejected() {
        let r = electron_scale();
        let p = Particle {
            px: 100.0,
            ..Particle::at_origin(7)
        };
        match to_spatial(&p, r) {
            Err(TransformError::Unphysical { particle_id: 7, .. }) => {}
            other => panic!("expected Unphysical, got {other:?}"),
        }
    }

    #[test]
    fn backward_motion_rejected() {
        let r = electron_scale();
        let p = Particle {
            pz: -2.0,
            ..Particle::at_origin(3)
        };
        assert!(matches!(
            to_time(&p, r),
            Err(TransformError::Unphysical { particle_id: 3, .. })
        ));
    }

    #[test]
    fn failed_transform_leaves_tiles_untouched() {
        let good = Particle {
            x: 1e-3,
            z: 1e-4,
            ..Particle::at_origin(1)
        };
        let bad = Particle {
            px: 1e3,
            ..Particle::at_origin(2)
        };
        let mut tiles = vec![
            ParticleTile::unassigned(vec![good]),
            ParticleTile::unassigned(vec![bad]),
        ];
        let before = tiles.clone();
        let result = transform_tiles(&mut tiles, Direction::TimeToSpatial, &RefParticle::default());
        assert!(result.is_err());
        assert_eq!(tiles, before);
    }

    #[test]
    fn frame_precondition() {
        assert!(check_source(Direction::TimeToSpatial, Frame::TransverseTime).is_ok());
        assert!(matches!(
            check_source(Direction::SpatialToTime, Frame::TransverseTime),
            Err(TransformError::Frame(_))
        ));
    }

    proptest! {
        #[test]
        fn round_trip_reproduces_coordinates(
            x in -1e-2f64..1e-2, y in -1e-2f64..1e-2, t in -1e-2f64..1e-2,
            px in -1e-2f64..1e-2, py in -1e-2f64..1e-2, pt in -1e-2f64..1e-2,
        ) {
            let r = ReferenceScale::of(&RefParticle::default()).unwrap();
            let p = Particle { id: 9, x, y, z: t, px, py, pz: pt, weight: 2.5 };
            let back = to_time(&to_spatial(&p, r).unwrap(), r).unwrap();
            for (a, b) in [(p.x, back.x), (p.y, back.y), (p.z, back.z),
                           (p.px, back.px), (p.py, back.py), (p.pz, back.pz)] {
                prop_assert!((a - b).abs() < 1e-12, "{a} vs {b}");
            }
            prop_assert_eq!(back.weight, 2.5);
            prop_assert_eq!(back.id, 9);
        }
    }
}
