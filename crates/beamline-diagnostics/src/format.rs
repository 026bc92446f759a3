//! Text table writers.
//!
//! Each table is a header line of column names followed by one
//! whitespace-separated row per record. Floats use Rust's shortest
//! round-trip exponent form. Generic over `W: Write` so tests can write
//! into a `Vec<u8>`.

use std::io::{self, Write};

use beamline_core::{Frame, RefParticle};
use beamline_particles::ParticleStorage;

use crate::invariants::LensInvariantParams;

/// Column header of the beam table for a frame.
pub fn beam_header(frame: Frame) -> &'static str {
    match frame {
        Frame::TransverseTime => "id x y t px py pt",
        Frame::Spatial => "id x y z px py pz",
    }
}

/// Column header of the reference particle table.
pub const REF_HEADER: &str = "s beta_gamma x y z t px py pz pt";

/// Column header of the lens invariant table.
pub const INVARIANT_HEADER: &str = "id H I";

/// One row per macro-particle, in the ensemble's current frame.
pub fn write_beam<W: Write>(w: &mut W, ensemble: &dyn ParticleStorage) -> io::Result<()> {
    writeln!(w, "{}", beam_header(ensemble.frame()))?;
    let mut result = Ok(());
    ensemble.for_each_particle(&mut |p| {
        if result.is_ok() {
            result = writeln!(
                w,
                "{} {:e} {:e} {:e} {:e} {:e} {:e}",
                p.id, p.x, p.y, p.z, p.px, p.py, p.pz
            );
        }
    });
    result
}

/// A single row for the reference particle.
pub fn write_ref<W: Write>(w: &mut W, r: &RefParticle) -> io::Result<()> {
    writeln!(w, "{REF_HEADER}")?;
    writeln!(
        w,
        "{:e} {:e} {:e} {:e} {:e} {:e} {:e} {:e} {:e} {:e}",
        r.s,
        r.beta_gamma(),
        r.x,
        r.y,
        r.z,
        r.t,
        r.px,
        r.py,
        r.pz,
        r.pt
    )
}

/// One row of `(H, I)` per macro-particle.
pub fn write_invariants<W: Write>(
    w: &mut W,
    ensemble: &dyn ParticleStorage,
    params: &LensInvariantParams,
) -> io::Result<()> {
    writeln!(w, "{INVARIANT_HEADER}")?;
    let mut result = Ok(());
    ensemble.for_each_particle(&mut |p| {
        if result.is_ok() {
            let (h, i) = params.invariants(p.x, p.y, p.px, p.py);
            result = writeln!(w, "{} {h:e} {i:e}", p.id);
        }
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_core::Particle;
    use beamline_particles::ParticleContainer;

    fn ensemble() -> ParticleContainer {
        let mut pc = ParticleContainer::default();
        pc.insert([
            Particle {
                x: 1e-3,
                px: -2e-4,
                ..Particle::at_origin(0)
            },
            Particle::at_origin(0),
        ])
        .unwrap();
        pc
    }

    #[test]
    fn beam_table_has_header_and_one_row_per_particle() {
        let mut buf = Vec::new();
        write_beam(&mut buf, &ensemble()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id x y t px py pt");
        assert_eq!(lines.len(), 3);
        let cols: Vec<f64> = lines[1]
            .split_whitespace()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(cols, [1.0, 1e-3, 0.0, 0.0, -2e-4, 0.0, 0.0]);
    }

    #[test]
    fn ref_table_round_trips_values() {
        let r = RefParticle::default();
        let mut buf = Vec::new();
        write_ref(&mut buf, &r).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(REF_HEADER));
        let cols: Vec<f64> = lines
            .next()
            .unwrap()
            .split_whitespace()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(cols.len(), 10);
        assert_eq!(cols[1], r.beta_gamma());
        assert_eq!(cols[9], r.pt);
    }

    #[test]
    fn invariant_table_rows() {
        let mut buf = Vec::new();
        write_invariants(&mut buf, &ensemble(), &LensInvariantParams::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("id H I\n"));
        assert!(text.lines().nth(2).unwrap().starts_with("2 0e0 0e0"));
    }
}
