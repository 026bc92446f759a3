//! Output kinds and checkpoint destination names.

use std::fmt;

/// Directory, relative to a sink's root, that holds every checkpoint.
pub const DIAGS_DIR: &str = "diags";

/// What a diagnostic record contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Every macro-particle's coordinates.
    PrintParticles,
    /// The reference particle.
    PrintRefParticle,
    /// Danilov–Nagaitsev invariants `H` and `I` per particle.
    PrintNonlinearLensInvariants,
}

impl OutputType {
    /// The three output types in checkpoint order.
    pub const ALL: [OutputType; 3] = [
        OutputType::PrintParticles,
        OutputType::PrintRefParticle,
        OutputType::PrintNonlinearLensInvariants,
    ];

    /// File stem suffix for this output type.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::PrintParticles => "beam",
            Self::PrintRefParticle => "ref_particle",
            Self::PrintNonlinearLensInvariants => "nonlinear_lens_invariants",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// When in a run a checkpoint is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before the first element.
    Initial,
    /// After the last element.
    Output,
}

impl Stage {
    fn prefix(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Output => "output",
        }
    }
}

/// Destination name for a checkpoint, relative to the sink root.
pub fn checkpoint(stage: Stage, output: OutputType) -> String {
    format!("{DIAGS_DIR}/{}_{}.txt", stage.prefix(), output.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_distinct_destinations() {
        let mut names: Vec<String> = [Stage::Initial, Stage::Output]
            .iter()
            .flat_map(|&s| OutputType::ALL.iter().map(move |&o| checkpoint(s, o)))
            .collect();
        assert_eq!(names[0], "diags/initial_beam.txt");
        assert_eq!(names[1], "diags/initial_ref_particle.txt");
        assert_eq!(names[5], "diags/output_nonlinear_lens_invariants.txt");
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
