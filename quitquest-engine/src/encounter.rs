//! Encounter engine: per-milestone trigger checks, template selection,
//! and resolution into the session's outcome logs.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;
use std::collections::HashMap;

use crate::catalog::{EncounterCatalog, EncounterTemplate, MilestoneId};
use crate::constants::ENCOUNTER_CHANCE_DEFAULT;
#[cfg(debug_assertions)]
use crate::constants::DEBUG_ENV_VAR;
use crate::session::{EncounterOutcome, JourneyState, ProductSet, Resolution};

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// The user's binary choice when facing an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterChoice {
    Resist,
    Concede,
}

impl EncounterChoice {
    #[must_use]
    pub const fn resolution(self) -> Resolution {
        match self {
            Self::Resist => Resolution::Resisted,
            Self::Concede => Resolution::Conceded,
        }
    }
}

/// Per-milestone encounter lifecycle. A milestone absent from the phase
/// map is unchecked; the first visibility event moves it here and the
/// transition never re-fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterPhase {
    /// Checked, the roll came up empty.
    CheckedClear,
    /// Checked, an encounter is waiting for the user's choice.
    Pending { template_name: String },
    /// The encounter was resolved; terminal.
    Resolved,
}

/// Counters exposed for host-side debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterStats {
    pub defeated: u32,
    pub chance: f32,
    pub total_templates: usize,
}

/// Roll the trigger draw: uniform `r in [0,1)` against the configured
/// chance. A failed draw means "no encounter this time", not an error.
pub fn roll_trigger<R: Rng>(chance: f32, rng: &mut R) -> bool {
    rng.gen_range(0.0..1.0_f32) < chance
}

/// Select a template uniformly at random. Templates linked to a selected
/// product are preferred; when none match (no products selected, or no
/// relevant template), the whole catalog is the pool. An empty catalog
/// yields no template.
pub fn pick_template<'a, R: Rng>(
    catalog: &'a EncounterCatalog,
    products: &ProductSet,
    rng: &mut R,
) -> Option<&'a EncounterTemplate> {
    if catalog.is_empty() {
        return None;
    }
    let mut pool: Vec<&EncounterTemplate> =
        catalog.iter().filter(|t| t.matches(products)).collect();
    if pool.is_empty() {
        pool = catalog.iter().collect();
    }
    let idx = rng.gen_range(0..pool.len());
    pool.get(idx).copied()
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Deterministic pair of RNG streams segregated by draw domain: one for
/// the trigger roll, one for template selection, so one draw never shifts
/// the other stream.
#[derive(Debug, Clone)]
pub struct EncounterRng {
    trigger: SmallRng,
    selection: SmallRng,
}

impl EncounterRng {
    /// Construct the streams from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            trigger: SmallRng::seed_from_u64(derive_stream_seed(seed, b"trigger")),
            selection: SmallRng::seed_from_u64(derive_stream_seed(seed, b"selection")),
        }
    }
}

/// Observes milestone-visibility transitions and spawns, tracks, and
/// resolves encounters against the shared session state.
#[derive(Debug, Clone)]
pub struct EncounterEngine {
    catalog: EncounterCatalog,
    chance: f32,
    seed: u64,
    rng: EncounterRng,
    phases: HashMap<MilestoneId, EncounterPhase>,
    defeated: u32,
}

impl EncounterEngine {
    #[must_use]
    pub fn new(catalog: EncounterCatalog, seed: u64) -> Self {
        Self {
            catalog,
            chance: ENCOUNTER_CHANCE_DEFAULT,
            seed,
            rng: EncounterRng::from_user_seed(seed),
            phases: HashMap::new(),
            defeated: 0,
        }
    }

    /// Override the encounter probability; clamped to `[0,1]`.
    #[must_use]
    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &EncounterCatalog {
        &self.catalog
    }

    /// Current lifecycle phase for a milestone; `None` means unchecked.
    #[must_use]
    pub fn phase(&self, id: &MilestoneId) -> Option<&EncounterPhase> {
        self.phases.get(id)
    }

    /// Handle a milestone's visibility-intersection event. The first call
    /// per milestone rolls the trigger and, on success, selects a
    /// template; every later call is a no-op.
    pub fn check_milestone(
        &mut self,
        state: &JourneyState,
        id: &MilestoneId,
    ) -> Option<EncounterTemplate> {
        if self.phases.contains_key(id) {
            return None;
        }

        if !roll_trigger(self.chance, &mut self.rng.trigger) {
            self.phases.insert(id.clone(), EncounterPhase::CheckedClear);
            return None;
        }

        let Some(template) =
            pick_template(&self.catalog, &state.products, &mut self.rng.selection)
        else {
            // Empty catalog; record the check so it never re-rolls.
            self.phases.insert(id.clone(), EncounterPhase::CheckedClear);
            return None;
        };

        if debug_log_enabled() {
            println!(
                "Encounter spawn | milestone:{} template:{}",
                id.as_str(),
                template.name
            );
        }

        self.phases.insert(
            id.clone(),
            EncounterPhase::Pending {
                template_name: template.name.clone(),
            },
        );
        Some(template.clone())
    }

    /// Resolve the pending encounter for the named template, appending the
    /// outcome to the session's logs. Resolving a template with no pending
    /// encounter is a local no-op.
    pub fn resolve(
        &mut self,
        state: &mut JourneyState,
        template_name: &str,
        choice: EncounterChoice,
        now: DateTime<Utc>,
    ) -> Option<EncounterOutcome> {
        let milestone = self.phases.iter().find_map(|(id, phase)| match phase {
            EncounterPhase::Pending { template_name: name } if name == template_name => {
                Some(id.clone())
            }
            _ => None,
        })?;

        let outcome = EncounterOutcome {
            template_name: template_name.to_string(),
            resolution: choice.resolution(),
            timestamp: now,
        };
        state.record_outcome(outcome.clone());
        if choice == EncounterChoice::Resist {
            self.defeated += 1;
        }
        self.phases.insert(milestone, EncounterPhase::Resolved);
        Some(outcome)
    }

    #[must_use]
    pub fn stats(&self) -> EncounterStats {
        EncounterStats {
            defeated: self.defeated,
            chance: self.chance,
            total_templates: self.catalog.len(),
        }
    }

    /// Clear every per-milestone check and reseed the draw streams so a
    /// fresh session replays deterministically.
    pub fn reset(&mut self) {
        self.phases.clear();
        self.defeated = 0;
        self.rng = EncounterRng::from_user_seed(self.seed);
    }

    /// Deterministically reseed the draw streams.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = EncounterRng::from_user_seed(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductId;
    use chrono::TimeZone;
    use rand_chacha::ChaCha20Rng;

    fn mk_template(name: &str, linked: &[&str]) -> EncounterTemplate {
        EncounterTemplate {
            name: name.to_string(),
            glyph: "M".to_string(),
            flavor: format!("{name} appears..."),
            taunt: "Just this once...".to_string(),
            linked_products: linked.iter().map(|p| ProductId::new(p)).collect(),
        }
    }

    fn sample_catalog() -> EncounterCatalog {
        EncounterCatalog::from_templates(vec![
            mk_template("Cigarette Demon", &["cigarettes"]),
            mk_template("Vape Wraith", &["vapes"]),
            mk_template("Craving Beast", &["cigarettes", "vapes", "marijuana"]),
        ])
        .unwrap()
    }

    fn products(ids: &[&str]) -> ProductSet {
        ids.iter().map(|p| ProductId::new(p)).collect()
    }

    #[test]
    fn milestone_is_checked_at_most_once() {
        let mut engine = EncounterEngine::new(sample_catalog(), 0xC0FFEE).with_chance(1.0);
        let state = JourneyState::default();
        let id = MilestoneId::new("m1");

        let first = engine.check_milestone(&state, &id);
        assert!(first.is_some());

        let mut transitions = 0;
        for _ in 0..1_000 {
            if engine.check_milestone(&state, &id).is_some() {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 0);
        assert!(matches!(
            engine.phase(&id),
            Some(EncounterPhase::Pending { .. })
        ));
    }

    #[test]
    fn zero_chance_never_spawns() {
        let mut engine = EncounterEngine::new(sample_catalog(), 7).with_chance(0.0);
        let state = JourneyState::default();
        for i in 0..100 {
            let id = MilestoneId::new(&format!("m{i}"));
            assert!(engine.check_milestone(&state, &id).is_none());
            assert_eq!(engine.phase(&id), Some(&EncounterPhase::CheckedClear));
        }
    }

    #[test]
    fn empty_catalog_yields_no_template() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let catalog = EncounterCatalog::empty();
        assert!(pick_template(&catalog, &products(&["cigarettes"]), &mut rng).is_none());

        let mut engine = EncounterEngine::new(catalog, 1).with_chance(1.0);
        let state = JourneyState::default();
        let id = MilestoneId::new("m1");
        assert!(engine.check_milestone(&state, &id).is_none());
        assert_eq!(engine.phase(&id), Some(&EncounterPhase::CheckedClear));
    }

    #[test]
    fn selection_only_draws_matching_templates() {
        let catalog = sample_catalog();
        let selection = products(&["cigarettes"]);
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        for _ in 0..10_000 {
            let template = pick_template(&catalog, &selection, &mut rng).unwrap();
            assert!(
                template
                    .linked_products
                    .contains(&ProductId::new("cigarettes")),
                "drew non-matching template {}",
                template.name
            );
        }
    }

    #[test]
    fn selection_falls_back_to_full_catalog() {
        let catalog = sample_catalog();
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let mut seen = std::collections::HashSet::new();
        // No products selected: every template is fair game.
        for _ in 0..10_000 {
            let template = pick_template(&catalog, &ProductSet::new(), &mut rng).unwrap();
            seen.insert(template.name.clone());
        }
        assert_eq!(seen.len(), catalog.len());

        // A selection matching nothing also falls back.
        let odd = products(&["nicotine-pouches"]);
        assert!(pick_template(&catalog, &odd, &mut rng).is_some());
    }

    #[test]
    fn resolution_routes_outcome_and_is_terminal() {
        let mut engine = EncounterEngine::new(sample_catalog(), 0xBEEF).with_chance(1.0);
        let mut state = JourneyState::default();
        state.products.toggle(ProductId::new("cigarettes"));
        let id = MilestoneId::new("m1");
        let when = Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap();

        let template = engine.check_milestone(&state, &id).unwrap();
        let outcome = engine
            .resolve(&mut state, &template.name, EncounterChoice::Resist, when)
            .unwrap();
        assert_eq!(outcome.resolution, Resolution::Resisted);
        assert_eq!(state.defeated_count(), 1);
        assert_eq!(engine.stats().defeated, 1);
        assert_eq!(engine.phase(&id), Some(&EncounterPhase::Resolved));

        // Terminal: a second resolution of the same template is a no-op.
        assert!(
            engine
                .resolve(&mut state, &template.name, EncounterChoice::Concede, when)
                .is_none()
        );
        assert_eq!(state.conceded_count(), 0);
    }

    #[test]
    fn concede_logs_separately_without_defeat_credit() {
        let mut engine = EncounterEngine::new(sample_catalog(), 0xBEEF).with_chance(1.0);
        let mut state = JourneyState::default();
        let id = MilestoneId::new("m1");
        let when = Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap();

        let template = engine.check_milestone(&state, &id).unwrap();
        engine
            .resolve(&mut state, &template.name, EncounterChoice::Concede, when)
            .unwrap();
        assert_eq!(state.defeated_count(), 0);
        assert_eq!(state.conceded_count(), 1);
        assert_eq!(engine.stats().defeated, 0);
    }

    #[test]
    fn resolving_without_pending_encounter_is_noop() {
        let mut engine = EncounterEngine::new(sample_catalog(), 5);
        let mut state = JourneyState::default();
        let when = Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap();
        assert!(
            engine
                .resolve(&mut state, "Cigarette Demon", EncounterChoice::Resist, when)
                .is_none()
        );
        assert!(state.defeated_encounters.is_empty());
    }

    #[test]
    fn reset_replays_the_same_draw_sequence() {
        let mut engine = EncounterEngine::new(sample_catalog(), 0x5EED).with_chance(0.5);
        let state = JourneyState::default();

        let first_run: Vec<bool> = (0..20)
            .map(|i| {
                engine
                    .check_milestone(&state, &MilestoneId::new(&format!("m{i}")))
                    .is_some()
            })
            .collect();

        engine.reset();
        let second_run: Vec<bool> = (0..20)
            .map(|i| {
                engine
                    .check_milestone(&state, &MilestoneId::new(&format!("m{i}")))
                    .is_some()
            })
            .collect();

        assert_eq!(first_run, second_run);
        assert_eq!(engine.stats().defeated, 0);
    }

    #[test]
    fn stream_seeds_are_domain_separated() {
        assert_ne!(
            derive_stream_seed(42, b"trigger"),
            derive_stream_seed(42, b"selection")
        );
        assert_ne!(
            derive_stream_seed(42, b"trigger"),
            derive_stream_seed(43, b"trigger")
        );
    }
}
