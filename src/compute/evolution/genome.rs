//! Layout manipulation utilities for evolutionary search.
//!
//! Provides random initialization, whole-layout discrete recombination and
//! uncorrelated self-adaptive mutation with one step size per encoded
//! dimension.

use rand::prelude::*;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::schema::{Fixture, Layout, MAX_SELECTOR, RoomConfig};

/// Encoded dimensions of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gene {
    X,
    Y,
    Selector,
    Power,
}

impl Gene {
    /// All genes in processing order.
    pub const ALL: [Gene; 4] = [Gene::X, Gene::Y, Gene::Selector, Gene::Power];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Mutation step sizes, one per [`Gene`].
///
/// A single vector is shared by every fixture and every child mutated within a
/// segment, so a child's effective mutation strength depends on the mutations
/// that ran before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSizes([f64; 4]);

impl StepSizes {
    /// All dimensions set to `initial`.
    pub fn new(initial: f64) -> Self {
        Self([initial; 4])
    }

    /// Set every dimension back to `initial`.
    pub fn reset(&mut self, initial: f64) {
        self.0 = [initial; 4];
    }

    #[inline]
    pub fn get(&self, gene: Gene) -> f64 {
        self.0[gene.index()]
    }

    #[inline]
    fn set(&mut self, gene: Gene, value: f64) {
        self.0[gene.index()] = value;
    }

    /// Values in (x, y, selector, power) order.
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }
}

/// Log-normal learning rates for `n` encoded genes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRates {
    /// τ' = 1 / sqrt(2n), scales the draw shared by all dimensions.
    pub overall: f64,
    /// τ = 1 / sqrt(2 sqrt(n)), scales the per-dimension draw.
    pub coordinate: f64,
}

impl LearningRates {
    pub fn for_genes(n: usize) -> Self {
        let n = n as f64;
        Self {
            overall: 1.0 / (2.0 * n).sqrt(),
            coordinate: 1.0 / (2.0 * n.sqrt()).sqrt(),
        }
    }
}

/// Closed bounds for every gene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub selector: (f64, f64),
    pub power: (f64, f64),
}

impl GeneBounds {
    pub fn for_room(room: &RoomConfig) -> Self {
        Self {
            x: (0.0, f64::from(room.width)),
            y: (0.0, f64::from(room.length)),
            selector: (0.0, f64::from(MAX_SELECTOR)),
            power: (0.0, 1.0),
        }
    }

    #[inline]
    pub fn get(&self, gene: Gene) -> (f64, f64) {
        match gene {
            Gene::X => self.x,
            Gene::Y => self.y,
            Gene::Selector => self.selector,
            Gene::Power => self.power,
        }
    }
}

/// Fixed parameters of the self-adaptive mutation.
#[derive(Debug, Clone)]
pub struct MutationOperator {
    pub bounds: GeneBounds,
    pub rates: LearningRates,
    /// Rejected proposals allowed per dimension before clamping.
    pub max_retries: usize,
}

impl MutationOperator {
    pub fn new(room: &RoomConfig, fixture_count: usize, max_retries: usize) -> Self {
        Self {
            bounds: GeneBounds::for_room(room),
            rates: LearningRates::for_genes(fixture_count * 4),
            max_retries,
        }
    }
}

/// A mutated layout.
#[derive(Debug, Clone)]
pub struct Mutated {
    pub layout: Layout,
    /// Dimensions that exhausted their retries and were clamped.
    pub clamped: usize,
}

/// Random number generator wrapper for layout operations.
pub struct LayoutRng {
    rng: StdRng,
}

impl LayoutRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniformly random fixture inside the room.
    pub fn random_fixture(&mut self, room: &RoomConfig) -> Fixture {
        Fixture::new(
            self.rng.gen_range(0..=room.width),
            self.rng.gen_range(0..=room.length),
            self.rng.gen_range(0..=MAX_SELECTOR),
            self.rng.r#gen(),
        )
    }

    /// Layout of `fixture_count` uniformly random fixtures.
    pub fn random_layout(&mut self, room: &RoomConfig, fixture_count: usize) -> Layout {
        Layout::new(
            (0..fixture_count)
                .map(|_| self.random_fixture(room))
                .collect(),
        )
    }

    /// Uniform index in `0..len`.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Discrete whole-layout recombination: one parent, chosen by coin flip.
    pub fn recombine<'a>(&mut self, first: &'a Layout, second: &'a Layout) -> &'a Layout {
        if self.rng.gen_bool(0.5) {
            first
        } else {
            second
        }
    }

    /// Re-sample every fixture of `layout`, adapting `steps` along the way.
    pub fn mutate(
        &mut self,
        layout: &Layout,
        steps: &mut StepSizes,
        operator: &MutationOperator,
    ) -> Mutated {
        let mut clamped = 0;
        let mut fixtures = Vec::with_capacity(layout.len());

        for fixture in layout {
            let mut values = [
                f64::from(fixture.x()),
                f64::from(fixture.y()),
                f64::from(fixture.selector()),
                if fixture.is_on() { 1.0 } else { 0.0 },
            ];
            for gene in Gene::ALL {
                let (value, was_clamped) =
                    self.mutate_gene(values[gene.index()], gene, steps, operator);
                values[gene.index()] = value;
                clamped += usize::from(was_clamped);
            }

            let [x, y, selector, power] = values.map(f64::round);
            fixtures.push(Fixture::new(
                x as u32,
                y as u32,
                selector as u8,
                power == 1.0,
            ));
        }

        Mutated {
            layout: Layout::new(fixtures),
            clamped,
        }
    }

    /// Mutate a single gene, retrying out-of-bounds proposals.
    ///
    /// The step size is only committed for an accepted proposal. Once the
    /// retries run out the last proposal is clamped and the step size is left
    /// untouched. Returns the new value and whether it was clamped.
    fn mutate_gene(
        &mut self,
        value: f64,
        gene: Gene,
        steps: &mut StepSizes,
        operator: &MutationOperator,
    ) -> (f64, bool) {
        let (min, max) = operator.bounds.get(gene);
        let sigma = steps.get(gene);
        let rates = operator.rates;
        let mut proposal = value;

        for _ in 0..operator.max_retries {
            let z_i: f64 = self.rng.sample(StandardNormal);
            let z_global: f64 = self.rng.sample(StandardNormal);
            let adapted = sigma * (rates.overall * z_global + rates.coordinate * z_i).exp();
            proposal = value + adapted * z_i;

            if (min..=max).contains(&proposal) {
                steps.set(gene, adapted);
                return (proposal, false);
            }
        }

        let fallback = if proposal.is_nan() { value } else { proposal };
        (fallback.clamp(min, max), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn room(width: u32, length: u32) -> RoomConfig {
        RoomConfig { width, length }
    }

    fn in_bounds(layout: &Layout, room: &RoomConfig) -> bool {
        layout.iter().all(|f| {
            f.x() <= room.width && f.y() <= room.length && f.selector() <= MAX_SELECTOR
        })
    }

    #[test]
    fn test_learning_rates() {
        let rates = LearningRates::for_genes(8);
        assert!((rates.overall - 0.25).abs() < 1e-12);
        assert!((rates.coordinate - 1.0 / (2.0 * 8f64.sqrt()).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_random_layout() {
        let mut rng = LayoutRng::new(42);
        let room = room(96, 72);
        let layout = rng.random_layout(&room, 14);

        assert_eq!(layout.len(), 14);
        assert!(in_bounds(&layout, &room));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let room = room(96, 96);
        let a = LayoutRng::new(7).random_layout(&room, 10);
        let b = LayoutRng::new(7).random_layout(&room, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutation_adapts_step_sizes() {
        let mut rng = LayoutRng::new(42);
        let room = room(96, 96);
        let operator = MutationOperator::new(&room, 4, 1000);
        let layout = rng.random_layout(&room, 4);
        let mut steps = StepSizes::new(2.0);

        let mutated = rng.mutate(&layout, &mut steps, &operator);

        assert_eq!(mutated.layout.len(), layout.len());
        assert_eq!(mutated.clamped, 0);
        assert_ne!(steps, StepSizes::new(2.0));
        assert!(steps.as_array().iter().all(|s| *s > 0.0));
    }

    #[test]
    fn test_zero_retries_clamps_without_adapting() {
        let mut rng = LayoutRng::new(1);
        let room = room(96, 96);
        let operator = MutationOperator::new(&room, 3, 0);
        let layout = rng.random_layout(&room, 3);
        let mut steps = StepSizes::new(2.0);

        let mutated = rng.mutate(&layout, &mut steps, &operator);

        assert_eq!(mutated.layout, layout);
        assert_eq!(mutated.clamped, 12);
        assert_eq!(steps, StepSizes::new(2.0));
    }

    #[test]
    fn test_degenerate_room_terminates() {
        // A zero-width room leaves x a single admissible value; the retry cap
        // must still end the mutation.
        let mut rng = LayoutRng::new(3);
        let room = room(0, 48);
        let operator = MutationOperator::new(&room, 2, 50);
        let layout = Layout::new(vec![Fixture::new(0, 10, 2, true); 2]);
        let mut steps = StepSizes::new(2.0);

        let mutated = rng.mutate(&layout, &mut steps, &operator);

        assert!(mutated.layout.iter().all(|f| f.x() == 0));
        assert!(mutated.clamped >= 2);
        assert_eq!(steps.get(Gene::X), 2.0);
    }

    #[test]
    fn test_recombine_returns_a_parent() {
        let mut rng = LayoutRng::new(42);
        let room = room(96, 96);
        let a = rng.random_layout(&room, 3);
        let b = rng.random_layout(&room, 3);

        let mut picked_first = false;
        let mut picked_second = false;
        for _ in 0..64 {
            let child = rng.recombine(&a, &b);
            picked_first |= std::ptr::eq(child, &a);
            picked_second |= std::ptr::eq(child, &b);
        }
        assert!(picked_first && picked_second);
    }

    proptest! {
        #[test]
        fn prop_mutation_respects_bounds(
            seed in any::<u64>(),
            width in 1u32..200,
            length in 1u32..200,
            fixtures in 1usize..6,
            sigma in 0.01f64..50.0,
        ) {
            let room = room(width, length);
            let mut rng = LayoutRng::new(seed);
            let operator = MutationOperator::new(&room, fixtures, 1000);
            let mut steps = StepSizes::new(sigma);
            let mut layout = rng.random_layout(&room, fixtures);

            for _ in 0..5 {
                layout = rng.mutate(&layout, &mut steps, &operator).layout;
                prop_assert_eq!(layout.len(), fixtures);
                prop_assert!(in_bounds(&layout, &room));
            }
        }

        #[test]
        fn prop_recombination_is_reference_identical(seed in any::<u64>()) {
            let room = room(48, 48);
            let mut rng = LayoutRng::new(seed);
            let a = rng.random_layout(&room, 2);
            let b = rng.random_layout(&room, 2);

            let child = rng.recombine(&a, &b);
            prop_assert!(std::ptr::eq(child, &a) || std::ptr::eq(child, &b));
        }
    }
}
