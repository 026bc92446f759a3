//! Diagnostic sinks.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use beamline_core::DiagnosticError;
use beamline_particles::ParticleStorage;

use crate::checkpoint::{OutputType, DIAGS_DIR};
use crate::format::{write_beam, write_invariants, write_ref};
use crate::invariants::LensInvariantParams;

/// Write-only observer of the ensemble at checkpoints.
///
/// A sink owns its output location; nothing outside the instance decides
/// where records land. `record` must not mutate the ensemble, which the
/// shared borrow enforces.
pub trait DiagnosticSink: Send {
    /// Remove previous output and make the sink ready to record.
    fn prepare(&mut self) -> Result<(), DiagnosticError>;

    /// Write one record of `output` for `ensemble` to `destination`.
    fn record(
        &mut self,
        ensemble: &dyn ParticleStorage,
        output: OutputType,
        destination: &str,
    ) -> Result<(), DiagnosticError>;
}

/// Text-table sink rooted at a directory.
#[derive(Clone, Debug)]
pub struct FileDiagnostics {
    root: PathBuf,
    lens: LensInvariantParams,
    records_written: u64,
}

impl FileDiagnostics {
    /// Sink writing under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lens: LensInvariantParams::default(),
            records_written: 0,
        }
    }

    /// Use `lens` for the nonlinear lens invariant tables.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticError::InvalidLensParameter`] if `lens` fails
    /// [`LensInvariantParams::validate`].
    pub fn with_lens_params(
        mut self,
        lens: LensInvariantParams,
    ) -> Result<Self, DiagnosticError> {
        lens.validate()?;
        self.lens = lens;
        Ok(self)
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `diags` directory under the root.
    pub fn diags_dir(&self) -> PathBuf {
        self.root.join(DIAGS_DIR)
    }

    /// Records successfully written since construction.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Resolve `destination` under the root, rejecting anything that is
    /// empty, absolute, or climbs out with `..`.
    fn resolve(&self, destination: &str) -> Result<PathBuf, DiagnosticError> {
        let rel = Path::new(destination);
        let ok = !destination.is_empty()
            && !destination.ends_with('/')
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && rel.file_name().is_some();
        if !ok {
            return Err(DiagnosticError::InvalidDestination {
                destination: destination.to_string(),
            });
        }
        Ok(self.root.join(rel))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DiagnosticError + '_ {
    move |source| DiagnosticError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl DiagnosticSink for FileDiagnostics {
    fn prepare(&mut self) -> Result<(), DiagnosticError> {
        let dir = self.diags_dir();
        match fs::remove_dir_all(&dir) {
            Ok(()) => log::debug!("removed previous diagnostics in {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&dir)(e)),
        }
        fs::create_dir_all(&dir).map_err(io_error(&dir))
    }

    fn record(
        &mut self,
        ensemble: &dyn ParticleStorage,
        output: OutputType,
        destination: &str,
    ) -> Result<(), DiagnosticError> {
        let path = self.resolve(destination)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let file = File::create(&path).map_err(io_error(&path))?;
        let mut w = BufWriter::new(file);
        let written = match output {
            OutputType::PrintParticles => write_beam(&mut w, ensemble),
            OutputType::PrintRefParticle => write_ref(&mut w, ensemble.ref_particle()),
            OutputType::PrintNonlinearLensInvariants => {
                write_invariants(&mut w, ensemble, &self.lens)
            }
        };
        written
            .and_then(|()| w.flush())
            .map_err(io_error(&path))?;
        self.records_written += 1;
        Ok(())
    }
}

/// Sink that accepts and discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn prepare(&mut self) -> Result<(), DiagnosticError> {
        Ok(())
    }

    fn record(
        &mut self,
        _ensemble: &dyn ParticleStorage,
        _output: OutputType,
        _destination: &str,
    ) -> Result<(), DiagnosticError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{checkpoint, Stage};
    use beamline_core::Particle;
    use beamline_particles::ParticleContainer;
    use tempfile::TempDir;

    fn ensemble() -> ParticleContainer {
        let mut pc = ParticleContainer::default();
        pc.insert((0..3).map(Particle::at_origin)).unwrap();
        pc
    }

    #[test]
    fn prepare_is_safe_when_absent_and_clears_old_output() {
        let tmp = TempDir::new().unwrap();
        let mut sink = FileDiagnostics::new(tmp.path());
        sink.prepare().unwrap();
        assert!(sink.diags_dir().is_dir());

        let stale = sink.diags_dir().join("stale.txt");
        fs::write(&stale, "old").unwrap();
        sink.prepare().unwrap();
        assert!(!stale.exists());
        assert!(sink.diags_dir().is_dir());
    }

    #[test]
    fn records_all_three_output_types() {
        let tmp = TempDir::new().unwrap();
        let mut sink = FileDiagnostics::new(tmp.path());
        sink.prepare().unwrap();
        let pc = ensemble();
        for output in OutputType::ALL {
            sink.record(&pc, output, &checkpoint(Stage::Initial, output))
                .unwrap();
        }
        assert_eq!(sink.records_written(), 3);
        let beam = fs::read_to_string(tmp.path().join("diags/initial_beam.txt")).unwrap();
        assert_eq!(beam.lines().count(), 4);
        let inv = fs::read_to_string(
            tmp.path()
                .join("diags/initial_nonlinear_lens_invariants.txt"),
        )
        .unwrap();
        assert!(inv.starts_with("id H I"));
        assert!(tmp.path().join("diags/initial_ref_particle.txt").is_file());
    }

    #[test]
    fn escaping_destinations_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut sink = FileDiagnostics::new(tmp.path());
        let pc = ensemble();
        for bad in ["", "../evil.txt", "/etc/passwd", "diags/../../x.txt", "diags/"] {
            match sink.record(&pc, OutputType::PrintParticles, bad) {
                Err(DiagnosticError::InvalidDestination { destination }) => {
                    assert_eq!(destination, bad)
                }
                other => panic!("expected InvalidDestination for {bad:?}, got {other:?}"),
            }
        }
        assert_eq!(sink.records_written(), 0);
    }

    #[test]
    fn sinks_are_scoped_to_their_root() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let mut sink_a = FileDiagnostics::new(a.path());
        let mut sink_b = FileDiagnostics::new(b.path());
        sink_a.prepare().unwrap();
        sink_b.prepare().unwrap();
        sink_a
            .record(&ensemble(), OutputType::PrintParticles, "diags/x.txt")
            .unwrap();
        sink_b.prepare().unwrap();
        assert!(a.path().join("diags/x.txt").is_file());
    }

    #[test]
    fn write_into_missing_root_reports_io() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();
        let mut sink = FileDiagnostics::new(&file);
        assert!(matches!(
            sink.record(&ensemble(), OutputType::PrintRefParticle, "diags/r.txt"),
            Err(DiagnosticError::Io { .. })
        ));
    }

    #[test]
    fn zero_lens_scale_rejected() {
        let tmp = TempDir::new().unwrap();
        let lens = LensInvariantParams {
            cn: 0.0,
            ..LensInvariantParams::default()
        };
        match FileDiagnostics::new(tmp.path()).with_lens_params(lens) {
            Err(DiagnosticError::InvalidLensParameter { name: "cn", value }) => {
                assert_eq!(value, 0.0);
            }
            other => panic!("expected InvalidLensParameter, got {other:?}"),
        }
    }

    #[test]
    fn custom_lens_params_reach_invariant_table() {
        let tmp = TempDir::new().unwrap();
        let lens = LensInvariantParams {
            beta: 2.0,
            ..LensInvariantParams::default()
        };
        let mut sink = FileDiagnostics::new(tmp.path())
            .with_lens_params(lens)
            .unwrap();
        sink.prepare().unwrap();
        sink.record(
            &ensemble(),
            OutputType::PrintNonlinearLensInvariants,
            "diags/inv.txt",
        )
        .unwrap();
        assert!(tmp.path().join("diags/inv.txt").is_file());
    }
}
