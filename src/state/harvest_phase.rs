/// Phase definitions for a single harvest run
///
/// A run moves forward through seed resolution, discovery and hydration.
/// `Fatal` absorbs every failure that ends the run early.
use std::fmt;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarvestPhase {
    // ===== Active Phases =====
    /// Resolving entity/category identifiers from the seed page
    SeedResolution,

    /// Walking listing pages and collecting unique links
    Discovery,

    /// Fetching detail pages and thumbnails chunk by chunk
    Hydration,

    // ===== Terminal Phases =====
    /// Every chunk has been yielded
    Done,

    /// The run was aborted by an unrecoverable error
    Fatal,
}

impl HarvestPhase {
    /// Returns true if no further batches can be produced
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Fatal)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Seed resolution is skipped for listing-type modes, so a run may start
    /// directly in discovery. Discovery may also finish with nothing to do and
    /// hydration can end the run.
    pub fn can_transition_to(&self, next: HarvestPhase) -> bool {
        use HarvestPhase::*;

        match (self, next) {
            (Done | Fatal, _) => false,
            (_, Fatal) => true,
            (SeedResolution, Discovery) => true,
            (Discovery, Hydration) => true,
            (Hydration, Done) => true,
            _ => false,
        }
    }

    /// Returns a short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeedResolution => "seed_resolution",
            Self::Discovery => "discovery",
            Self::Hydration => "hydration",
            Self::Done => "done",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for HarvestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
