//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! All randomness flows through StageRng instances derived
//! from the single seed in PipelineConfig.
//!
//! Each randomised stage gets its own stream, seeded from
//! (seed XOR slot-mix). This means:
//!   - Adding a new randomised stage never changes existing streams.
//!   - The split for a given seed is reproducible in isolation,
//!     whether or not the permutation test ran first.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single pipeline stage.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stage RNG from the run seed and a stable slot index.
    /// Slot 0 uses the run seed unchanged.
    pub fn new(seed: u64, slot_index: u64) -> Self {
        let derived_seed = seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn for_slot(seed: u64, slot: RngSlot) -> Self {
        Self::new(seed, slot as u64).with_name(slot.name())
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Fisher–Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stage's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Split = 0,
    Permutation = 1,
    // Add new randomised stages here — append only.
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Split       => "split",
            Self::Permutation => "permutation",
        }
    }
}
