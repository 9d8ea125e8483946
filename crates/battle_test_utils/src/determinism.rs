//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battle resolution produces
//! identical records given identical inputs.
//!
//! # Testing Strategy
//!
//! Every client resolves the same battle and must show its players the same
//! record. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`battle_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Battles only iterate `Vec` and `BTreeMap`.
//!
//! - **System randomness**: Torpedo accuracy uses an accumulator, never a
//!   random roll.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual phases (targeting, movement, fire)
//! 2. **Property tests**: Random fleets must still produce deterministic records
//! 3. **Integration tests**: Full battles are reproducible
//! 4. **Parallel tests**: Running N battles in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use battle_core::engine::BattleOutcome;
use battle_core::error::Result;
use battle_core::record::BattleRecord;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical records.
    pub is_deterministic: bool,
    /// Record hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Resolve a battle several times in sequence and compare record hashes.
///
/// # Example
///
/// ```ignore
/// use battle_test_utils::determinism::verify_determinism;
/// use battle_test_utils::fixtures::{resolve, skirmish};
///
/// let result = verify_determinism(5, || resolve(&skirmish()));
/// result.assert_deterministic();
/// ```
///
/// # Panics
///
/// Panics if a run fails to resolve.
pub fn verify_determinism<F>(runs: usize, resolve: F) -> DeterminismResult
where
    F: Fn() -> Result<BattleOutcome>,
{
    let hashes = (0..runs)
        .map(|_| match resolve() {
            Ok(outcome) => outcome.record.record_hash(),
            Err(e) => panic!("Battle failed to resolve: {e}"),
        })
        .collect();
    DeterminismResult::from_hashes(hashes)
}

/// Resolve N battles on scoped threads and compare record hashes.
///
/// # Panics
///
/// Panics if a run fails to resolve or a thread panics.
pub fn run_parallel_battles_scoped<F>(resolve: F, num_battles: usize) -> DeterminismResult
where
    F: Fn() -> Result<BattleOutcome> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| s.spawn(|| resolve().map(|outcome| outcome.record.record_hash())))
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(Ok(hash)) => hash,
                Ok(Err(e)) => panic!("Battle failed to resolve: {e}"),
                Err(_) => panic!("Battle thread panicked"),
            })
            .collect()
    });
    DeterminismResult::from_hashes(hashes)
}

/// Compare two records round by round, finding the first divergence.
///
/// Round 0 compares the starting layout. Returns `None` when the records
/// agree.
#[must_use]
pub fn find_first_divergence(a: &BattleRecord, b: &BattleRecord) -> Option<u32> {
    if a.tokens != b.tokens {
        return Some(0);
    }
    let last = a.stats.rounds_fought.max(b.stats.rounds_fought);
    for round in 1..=last {
        let players = a.players.keys().chain(b.players.keys());
        for &player in players {
            let left = a.player(player).map(|r| r.actions(round));
            let right = b.player(player).map(|r| r.actions(round));
            if left != right {
                return Some(round);
            }
        }
    }
    (a != b).then_some(last + 1)
}

/// Verify that a bincode round trip preserves the record exactly.
#[must_use]
pub fn verify_serialization_determinism(record: &BattleRecord) -> bool {
    let Ok(bytes) = record.serialize() else {
        return false;
    };
    BattleRecord::deserialize(&bytes)
        .is_ok_and(|restored| restored.record_hash() == record.record_hash())
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible battles for
/// property-based testing.
pub mod strategies {
    use battle_core::design::{DesignCatalog, ShipDesign, WeaponComponent};
    use battle_core::doctrine::{AttackWho, Doctrine, Tactic, TargetClass};
    use battle_core::fleet::Fleet;
    use proptest::prelude::*;

    /// Generate a beam or torpedo component.
    pub fn arb_weapon() -> impl Strategy<Value = WeaponComponent> {
        let beam = (0u32..4, 1u32..60, 0u32..12, 1u32..4, any::<bool>()).prop_map(
            |(range, power, initiative, quantity, hits_all)| {
                let weapon = WeaponComponent::beam("Beam", range, power, initiative)
                    .with_quantity(quantity);
                if hits_all {
                    weapon.hitting_all()
                } else {
                    weapon
                }
            },
        );
        let torpedo = (2u32..6, 1u32..80, 0u32..4, 1u32..4, 10u32..=100, any::<bool>())
            .prop_map(|(range, power, initiative, quantity, accuracy, csm)| {
                let weapon = WeaponComponent::torpedo("Torpedo", range, power, initiative, accuracy)
                    .with_quantity(quantity);
                if csm {
                    weapon.capital_ship_missile()
                } else {
                    weapon
                }
            });
        prop_oneof![beam, torpedo]
    }

    /// Generate a design with the given id.
    pub fn arb_design(id: u32) -> impl Strategy<Value = ShipDesign> {
        (
            1u32..500,
            0u32..200,
            1u32..400,
            0u32..10,
            0u32..=10,
            prop::collection::vec(arb_weapon(), 0..3),
            any::<bool>(),
        )
            .prop_map(
                move |(armor, shields, mass, initiative, movement, weapons, cargo)| ShipDesign {
                    id,
                    name: format!("Design {id}"),
                    armor,
                    shields,
                    mass,
                    initiative,
                    movement,
                    starbase: false,
                    cargo_capacity: if cargo { 100 } else { 0 },
                    bomber: false,
                    fuel_transport: false,
                    weapons,
                },
            )
    }

    /// Generate a catalog with designs `1..=count`.
    pub fn arb_catalog(count: u32) -> impl Strategy<Value = DesignCatalog> {
        (1..=count)
            .map(arb_design)
            .collect::<Vec<_>>()
            .prop_map(|designs| designs.into_iter().collect())
    }

    /// Generate a target class.
    pub fn arb_target_class() -> impl Strategy<Value = TargetClass> {
        prop_oneof![
            Just(TargetClass::None),
            Just(TargetClass::Any),
            Just(TargetClass::Starbase),
            Just(TargetClass::ArmedShips),
            Just(TargetClass::BombersFreighters),
            Just(TargetClass::UnarmedShips),
            Just(TargetClass::FuelTransports),
            Just(TargetClass::Freighters),
        ]
    }

    /// Generate a doctrine.
    pub fn arb_doctrine() -> impl Strategy<Value = Doctrine> {
        let tactic = prop_oneof![
            Just(Tactic::Disengage),
            Just(Tactic::DisengageIfChallenged),
            Just(Tactic::MinimizeDamageToSelf),
            Just(Tactic::MaximizeNetDamage),
            Just(Tactic::MaximizeDamageRatio),
            Just(Tactic::MaximizeDamage),
        ];
        let attack_who = prop_oneof![
            Just(AttackWho::Nobody),
            Just(AttackWho::Enemies),
            Just(AttackWho::EnemiesAndNeutrals),
            Just(AttackWho::Everyone),
        ];
        (tactic, arb_target_class(), arb_target_class(), attack_who).prop_map(
            |(tactic, primary_target, secondary_target, attack_who)| Doctrine {
                tactic,
                primary_target,
                secondary_target,
                attack_who,
            },
        )
    }

    /// Generate up to `max_fleets` fleets of up to three players, using
    /// designs `1..=designs`.
    pub fn arb_fleets(max_fleets: usize, designs: u32) -> impl Strategy<Value = Vec<Fleet>> {
        let stack = (1..=designs, 0u32..12);
        let fleet = (
            1u32..=3,
            arb_doctrine(),
            prop::collection::vec(stack, 1..4),
        );
        prop::collection::vec(fleet, 0..=max_fleets).prop_map(|fleets| {
            fleets
                .into_iter()
                .enumerate()
                .map(|(index, (player, doctrine, stacks))| {
                    let id = index as u64 + 1;
                    stacks.into_iter().fold(
                        Fleet::new(id, player, format!("Fleet {id}")).with_doctrine(doctrine),
                        |fleet, (design, quantity)| fleet.with_stack(design, quantity),
                    )
                })
                .collect()
        })
    }

    /// Generate a catalog and fleets that only use its designs.
    pub fn arb_battle(max_fleets: usize) -> impl Strategy<Value = (DesignCatalog, Vec<Fleet>)> {
        const DESIGNS: u32 = 4;
        (arb_catalog(DESIGNS), arb_fleets(max_fleets, DESIGNS))
    }
}
