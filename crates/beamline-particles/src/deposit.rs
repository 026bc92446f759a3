//! B-spline charge deposition onto the mesh hierarchy.

use beamline_core::{MeshError, Particle, ParticleShape};
use beamline_mesh::{ChargeDensity, Geometry, LevelData};

use crate::tile::ParticleTile;

/// Deposit every tile onto every level of `rho`.
///
/// `rho` is cleared first. Each macro-particle deposits
/// `weight · charge / cell_volume` spread over the shape stencil, so the
/// integrated density on every level equals the total beam charge.
///
/// # Errors
///
/// - [`MeshError::StaleLayout`] if any tile was built against another
///   layout generation than `rho`.
/// - [`MeshError::RefinementMismatch`] if `ratios` does not fit `rho`.
/// - [`MeshError::ParticleOutsideDomain`] if a stencil leaves the guarded
///   node range.
pub fn deposit_tiles(
    tiles: &[ParticleTile],
    shape: ParticleShape,
    charge_c: f64,
    rho: &mut ChargeDensity,
    ratios: &[u32],
) -> Result<(), MeshError> {
    let live = rho.generation();
    if let Some(stale) = tiles.iter().find(|t| t.generation != live) {
        return Err(MeshError::StaleLayout {
            box_id: stale.box_id,
            tile_generation: stale.generation,
            live_generation: live,
        });
    }
    let geometries = (0..rho.num_levels())
        .map(|level| rho.level_geometry(level, ratios))
        .collect::<Result<Vec<_>, _>>()?;

    rho.clear();
    for (level, geom) in geometries.iter().enumerate() {
        let Some(data) = rho.level_mut(level) else {
            continue;
        };
        let scale = charge_c / geom.cell_volume();
        for p in tiles.iter().flat_map(|t| t.particles.iter()) {
            deposit_one(p, shape, geom, p.weight * scale, data)?;
        }
    }
    Ok(())
}

fn deposit_one(
    p: &Particle,
    shape: ParticleShape,
    geom: &Geometry,
    q: f64,
    data: &mut LevelData,
) -> Result<(), MeshError> {
    let pos = p.position();
    let n = shape.support_width() as usize;
    let (ix, wx) = shape.weights(geom.cell_coord(pos[0], 0));
    let (iy, wy) = shape.weights(geom.cell_coord(pos[1], 1));
    let (iz, wz) = shape.weights(geom.cell_coord(pos[2], 2));
    for (c, &w_z) in wz[..n].iter().enumerate() {
        for (b, &w_y) in wy[..n].iter().enumerate() {
            for (a, &w_x) in wx[..n].iter().enumerate() {
                let node = [ix + a as i64, iy + b as i64, iz + c as i64];
                if !data.add(node, q * w_x * w_y * w_z) {
                    return Err(MeshError::ParticleOutsideDomain { particle_id: p.id });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_core::{BoxId, Extent, LayoutGeneration, RankId};

    fn rho(generation: u32, ratios: &[u32], guard: u32) -> ChargeDensity {
        let geom = Geometry::new(
            &Extent {
                lo: [0.0; 3],
                hi: [1.0; 3],
            },
            [4, 4, 4],
        );
        ChargeDensity::allocate(geom, ratios, guard, LayoutGeneration(generation))
    }

    fn tile(generation: u32, particles: Vec<Particle>) -> ParticleTile {
        ParticleTile {
            box_id: BoxId(0),
            rank: RankId(0),
            generation: LayoutGeneration(generation),
            particles,
        }
    }

    fn at(id: u64, x: f64, y: f64, z: f64, weight: f64) -> Particle {
        Particle {
            x,
            y,
            z,
            weight,
            ..Particle::at_origin(id)
        }
    }

    #[test]
    fn charge_is_conserved_on_every_level() {
        let tiles = [tile(
            1,
            vec![at(1, 0.3, 0.6, 0.5, 2.0), at(2, 0.71, 0.12, 0.9, 3.0)],
        )];
        for shape in [
            ParticleShape::Linear,
            ParticleShape::Quadratic,
            ParticleShape::Cubic,
        ] {
            let mut rho = rho(1, &[2], shape.guard_cells());
            deposit_tiles(&tiles, shape, 1.0, &mut rho, &[2]).unwrap();
            for level in 0..2 {
                let q = rho.total_charge(level, &[2]).unwrap();
                assert!((q - 5.0).abs() < 1e-12, "{shape} level {level}: {q}");
            }
        }
    }

    #[test]
    fn stale_tile_rejected() {
        let tiles = [tile(1, vec![at(1, 0.5, 0.5, 0.5, 1.0)])];
        let mut rho = rho(2, &[], 2);
        match deposit_tiles(&tiles, ParticleShape::Linear, 1.0, &mut rho, &[]) {
            Err(MeshError::StaleLayout {
                tile_generation,
                live_generation,
                ..
            }) => {
                assert_eq!(tile_generation, LayoutGeneration(1));
                assert_eq!(live_generation, LayoutGeneration(2));
            }
            other => panic!("expected StaleLayout, got {other:?}"),
        }
    }

    #[test]
    fn particle_far_outside_rejected() {
        let tiles = [tile(1, vec![at(4, 5.0, 0.5, 0.5, 1.0)])];
        let mut rho = rho(1, &[], 2);
        assert!(matches!(
            deposit_tiles(&tiles, ParticleShape::Cubic, 1.0, &mut rho, &[]),
            Err(MeshError::ParticleOutsideDomain { particle_id: 4 })
        ));
    }

    #[test]
    fn wrong_ratio_count_rejected() {
        let tiles = [tile(1, vec![at(1, 0.5, 0.5, 0.5, 1.0)])];
        let mut rho = rho(1, &[2], 2);
        assert!(matches!(
            deposit_tiles(&tiles, ParticleShape::Linear, 1.0, &mut rho, &[]),
            Err(MeshError::RefinementMismatch { .. })
        ));
    }

    #[test]
    fn linear_on_node_hits_one_node() {
        let tiles = [tile(1, vec![at(1, 0.25, 0.5, 0.75, 1.0)])];
        let mut rho = rho(1, &[], 2);
        deposit_tiles(&tiles, ParticleShape::Linear, 1.0, &mut rho, &[]).unwrap();
        let level = &rho.levels()[0];
        let cell_volume = 0.25f64.powi(3);
        assert!((level.get([1, 2, 3]).unwrap() - 1.0 / cell_volume).abs() < 1e-9);
    }
}
