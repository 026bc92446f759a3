//! The reference particle container.

use beamline_core::{
    Direction, Extent, Frame, FrameError, LayoutGeneration, MeshError, Particle, ParticleShape,
    PushError, RankId, RefParticle, TransformError,
};
use beamline_lattice::LatticeElement;
use beamline_mesh::{ChargeDensity, DomainLayout};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::deposit::deposit_tiles;
use crate::distribution::{Distribution, DistributionError};
use crate::storage::ParticleStorage;
use crate::tile::ParticleTile;
use crate::transform::{check_source, transform_tiles};

/// Tiled macro-particle ensemble.
///
/// Particles added before the first redistribution sit in unassigned
/// tiles (generation 0), which deposition always rejects as stale.
#[derive(Clone, Debug)]
pub struct ParticleContainer {
    tiles: Vec<ParticleTile>,
    frame: Frame,
    shape: Option<ParticleShape>,
    refpart: RefParticle,
    local_rank: RankId,
    next_id: u64,
}

impl Default for ParticleContainer {
    fn default() -> Self {
        Self::new(RefParticle::default())
    }
}

impl ParticleContainer {
    /// An empty ensemble in the transverse-time frame.
    pub fn new(refpart: RefParticle) -> Self {
        Self {
            tiles: Vec::new(),
            frame: Frame::TransverseTime,
            shape: None,
            refpart,
            local_rank: RankId(0),
            next_id: 1,
        }
    }

    /// Set the rank this process owns, for `total_particle_count(true)`.
    pub fn with_local_rank(mut self, rank: RankId) -> Self {
        self.local_rank = rank;
        self
    }

    /// Mutable reference particle, for configuring charge, mass, energy.
    pub fn ref_particle_mut(&mut self) -> &mut RefParticle {
        &mut self.refpart
    }

    /// Tiles in box order.
    pub fn tiles(&self) -> &[ParticleTile] {
        &self.tiles
    }

    /// Append particles to the unassigned tile, renumbering their ids.
    ///
    /// Coordinates are taken as transverse-time.
    pub fn insert<I>(&mut self, particles: I) -> Result<(), DistributionError>
    where
        I: IntoIterator<Item = Particle>,
    {
        if self.frame != Frame::TransverseTime {
            return Err(DistributionError::WrongFrame);
        }
        let idx = match self
            .tiles
            .iter()
            .position(|t| t.generation == LayoutGeneration::default())
        {
            Some(i) => i,
            None => {
                self.tiles.push(ParticleTile::unassigned(Vec::new()));
                self.tiles.len() - 1
            }
        };
        let tile = &mut self.tiles[idx];
        for mut p in particles {
            p.id = self.next_id;
            self.next_id += 1;
            tile.particles.push(p);
        }
        Ok(())
    }

    /// Sample `npart` macro-particles from `distribution`.
    ///
    /// Each macro-particle represents `bunch_charge_c / (q · npart)`
    /// physical particles, where `q` is the reference particle charge.
    /// The same `seed` always produces the same beam.
    pub fn add_particles(
        &mut self,
        bunch_charge_c: f64,
        distribution: &Distribution,
        npart: usize,
        seed: u64,
    ) -> Result<(), DistributionError> {
        distribution.validate()?;
        let q = self.refpart.charge_c();
        let weight = bunch_charge_c / q / npart as f64;
        if npart > 0 && !(weight.is_finite() && weight >= 0.0) {
            return Err(DistributionError::InvalidCharge {
                bunch_charge_c,
                particle_charge_c: q,
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let particles = (0..npart).map(|_| {
            let [x, y, t, px, py, pt] = distribution.sample(&mut rng);
            Particle {
                id: 0,
                x,
                y,
                z: t,
                px,
                py,
                pz: pt,
                weight,
            }
        });
        let particles: Vec<Particle> = particles.collect();
        self.insert(particles)?;
        log::debug!(
            "added {npart} {:?} macro-particles, weight {weight:e}",
            distribution.kind()
        );
        Ok(())
    }
}

impl ParticleStorage for ParticleContainer {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_particle_shape(&mut self, shape: ParticleShape) {
        self.shape = Some(shape);
    }

    fn particle_shape(&self) -> Option<ParticleShape> {
        self.shape
    }

    fn total_particle_count(&self, local_only: bool) -> u64 {
        self.tiles
            .iter()
            .filter(|t| !local_only || t.rank == self.local_rank)
            .map(|t| t.len() as u64)
            .sum()
    }

    fn extent(&self) -> Option<Extent> {
        Extent::from_points(
            self.tiles
                .iter()
                .flat_map(|t| t.particles.iter())
                .map(Particle::position),
        )
    }

    fn transform(&mut self, direction: Direction) -> Result<(), TransformError> {
        check_source(direction, self.frame)?;
        transform_tiles(&mut self.tiles, direction, &self.refpart)?;
        self.frame = direction.target();
        Ok(())
    }

    fn redistribute(&mut self, layout: &DomainLayout) -> Result<(), MeshError> {
        let generation = layout.generation();
        let mut tiles: Vec<ParticleTile> = layout
            .boxes()
            .iter()
            .map(|b| ParticleTile::new(b.id, b.rank, generation))
            .collect();
        for p in self.tiles.iter().flat_map(|t| t.particles.iter()) {
            let slot = layout
                .locate(p.position())
                .and_then(|id| tiles.get_mut(id.0 as usize))
                .ok_or(MeshError::ParticleOutsideDomain { particle_id: p.id })?;
            slot.particles.push(*p);
        }
        log::trace!(
            "redistributed {} particles into {} tiles (generation {generation})",
            self.total_particle_count(false),
            tiles.len()
        );
        self.tiles = tiles;
        Ok(())
    }

    fn deposit_charge(&self, rho: &mut ChargeDensity, ratios: &[u32]) -> Result<(), MeshError> {
        let shape = self.shape.ok_or(MeshError::ShapeUnset)?;
        deposit_tiles(&self.tiles, shape, self.refpart.charge_c(), rho, ratios)
    }

    fn push(&mut self, element: &LatticeElement) -> Result<(), PushError> {
        FrameError::check("push", Frame::TransverseTime, self.frame)?;
        let nslice = element.nslice().max(1) as usize;
        let slice = element.slice(nslice);
        let refpart = &self.refpart;
        for p in self.tiles.iter_mut().flat_map(|t| t.particles.iter_mut()) {
            for _ in 0..nslice {
                slice.push_particle(p, refpart);
            }
            if !p.is_finite() {
                return Err(PushError::NonFinite {
                    element: element.kind().to_string(),
                    particle_id: p.id,
                });
            }
        }
        for _ in 0..nslice {
            slice.push_reference(&mut self.refpart);
        }
        Ok(())
    }

    fn ref_particle(&self) -> &RefParticle {
        &self.refpart
    }

    fn for_each_particle(&self, f: &mut dyn FnMut(&Particle)) {
        for p in self.tiles.iter().flat_map(|t| t.particles.iter()) {
            f(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_core::BoxId;
    use beamline_lattice::{Drift, Quad};
    use beamline_mesh::{MeshConfig, MeshHierarchy, MeshProvider};

    fn beam(n: usize) -> ParticleContainer {
        let mut pc = ParticleContainer::default();
        pc.add_particles(1e-9, &Distribution::waterbag(), n, 5).unwrap();
        pc
    }

    fn mesh(n_ranks: u32) -> MeshHierarchy {
        let mut mesh = MeshHierarchy::new(MeshConfig {
            n_ranks,
            ..MeshConfig::default()
        })
        .unwrap();
        mesh.init_from_scratch(ParticleShape::Quadratic.guard_cells())
            .unwrap();
        mesh
    }

    #[test]
    fn ids_are_unique_and_weights_sum_to_bunch() {
        let pc = beam(100);
        let mut ids = Vec::new();
        let mut total = 0.0;
        pc.for_each_particle(&mut |p| {
            ids.push(p.id);
            total += p.weight;
        });
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
        let expected = 1e-9 / pc.ref_particle().charge_c();
        assert!((total / expected - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_charge_reference_rejected() {
        let mut pc = ParticleContainer::new(RefParticle::default().set_charge_qe(0.0));
        assert!(matches!(
            pc.add_particles(1e-9, &Distribution::gaussian(), 10, 1),
            Err(DistributionError::InvalidCharge { .. })
        ));
        assert_eq!(pc.total_particle_count(false), 0);
    }

    #[test]
    fn transform_flips_frame_and_checks_source() {
        let mut pc = beam(10);
        pc.transform(Direction::TimeToSpatial).unwrap();
        assert_eq!(pc.frame(), Frame::Spatial);
        match pc.transform(Direction::TimeToSpatial) {
            Err(TransformError::Frame(e)) => assert_eq!(e.found, Frame::Spatial),
            other => panic!("expected Frame error, got {other:?}"),
        }
        assert_eq!(pc.frame(), Frame::Spatial);
        pc.transform(Direction::SpatialToTime).unwrap();
        assert_eq!(pc.frame(), Frame::TransverseTime);
        assert_eq!(pc.total_particle_count(false), 10);
    }

    #[test]
    fn push_requires_transverse_time() {
        let mut pc = beam(4);
        pc.transform(Direction::TimeToSpatial).unwrap();
        assert!(matches!(
            pc.push(&Drift::new(1.0).into()),
            Err(PushError::Frame(_))
        ));
    }

    #[test]
    fn push_advances_reference() {
        let mut pc = beam(4);
        pc.push(&Drift::new(1.5).into()).unwrap();
        pc.push(&Quad::new(0.5, 1.0).into()).unwrap();
        assert!((pc.ref_particle().s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn element_slices_compose_to_one_push() {
        let mut whole = beam(8);
        let mut sliced = whole.clone();
        whole.push(&Quad::new(0.8, 1.3).into()).unwrap();
        let quad = Quad {
            nslice: 5,
            ..Quad::new(0.8, 1.3)
        };
        sliced.push(&quad.into()).unwrap();

        assert!((whole.ref_particle().s - sliced.ref_particle().s).abs() < 1e-12);
        let (mut a, mut b) = (Vec::new(), Vec::new());
        whole.for_each_particle(&mut |p| a.push(*p));
        sliced.for_each_particle(&mut |p| b.push(*p));
        for (p, q) in a.iter().zip(&b) {
            assert_eq!(p.id, q.id);
            assert!((p.x - q.x).abs() < 1e-12 && (p.px - q.px).abs() < 1e-12);
            assert!((p.y - q.y).abs() < 1e-12 && (p.py - q.py).abs() < 1e-12);
            assert!((p.z - q.z).abs() < 1e-12 && (p.pz - q.pz).abs() < 1e-12);
        }
    }

    #[test]
    fn non_finite_push_leaves_reference_in_place() {
        let mut pc = beam(4);
        pc.insert([Particle {
            x: 0.01,
            ..Particle::at_origin(0)
        }])
        .unwrap();
        let lens = beamline_lattice::NonlinearLens::new(1e-3, 0.01);
        match pc.push(&lens.into()) {
            Err(PushError::NonFinite { element, particle_id }) => {
                assert_eq!(element, "nonlinear_lens");
                assert_eq!(particle_id, 5);
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
        assert_eq!(pc.ref_particle(), &RefParticle::default());
    }

    #[test]
    fn deposit_before_redistribute_is_stale() {
        let mut pc = beam(50);
        pc.set_particle_shape(ParticleShape::Quadratic);
        pc.transform(Direction::TimeToSpatial).unwrap();
        let mut mesh = mesh(1);
        let ratios = mesh.refinement_ratios();
        match pc.deposit_charge(mesh.rho_mut().unwrap(), &ratios) {
            Err(MeshError::StaleLayout {
                box_id,
                tile_generation,
                ..
            }) => {
                assert_eq!(box_id, BoxId(0));
                assert_eq!(tile_generation, LayoutGeneration(0));
            }
            other => panic!("expected StaleLayout, got {other:?}"),
        }
    }

    #[test]
    fn deposit_without_shape_fails() {
        let pc = beam(5);
        let mut mesh = mesh(1);
        let ratios = mesh.refinement_ratios();
        assert!(matches!(
            pc.deposit_charge(mesh.rho_mut().unwrap(), &ratios),
            Err(MeshError::ShapeUnset)
        ));
    }

    #[test]
    fn redistribute_then_deposit_conserves_charge() {
        let mut pc = beam(500);
        pc.set_particle_shape(ParticleShape::Quadratic);
        pc.transform(Direction::TimeToSpatial).unwrap();
        let mut mesh = mesh(4);
        let extent = pc.extent().unwrap();
        mesh.resize_mesh(&extent).unwrap();
        pc.redistribute(mesh.layout().unwrap()).unwrap();
        assert_eq!(pc.tiles().len(), 4);
        assert_eq!(pc.total_particle_count(false), 500);
        assert!(pc.total_particle_count(true) < 500);

        let ratios = mesh.refinement_ratios();
        pc.deposit_charge(mesh.rho_mut().unwrap(), &ratios).unwrap();
        let q = mesh.rho().unwrap().total_charge(0, &ratios).unwrap();
        assert!((q / 1e-9 - 1.0).abs() < 1e-9, "{q}");
    }

    #[test]
    fn redistribute_outside_domain_is_atomic() {
        let mut pc = beam(20);
        let mesh = mesh(2);
        pc.insert([Particle {
            x: 50.0,
            ..Particle::at_origin(0)
        }])
        .unwrap();
        let before = pc.tiles().to_vec();
        assert!(matches!(
            pc.redistribute(mesh.layout().unwrap()),
            Err(MeshError::ParticleOutsideDomain { .. })
        ));
        assert_eq!(pc.tiles(), &before[..]);
    }
}
