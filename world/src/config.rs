//! Tunable rules of a match.

use grid_conquest_core::{Board, Faction, Specialization, UnitType};
use grid_conquest_system_map_generation::MapConfig;
use serde::{Deserialize, Serialize};

/// Resources each faction holds when a match starts, before opening income.
pub const DEFAULT_STARTING_RESOURCES: u32 = 3;
/// Consecutive post-opponent evaluations a majority must hold to win.
pub const DEFAULT_MAJORITY_TURNS: u32 = 10;

/// Income and levy balance table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTable {
    /// Resources every held base pays at the start of its owner's phase.
    pub base_income: u32,
    /// Extra income paid by a barracks.
    pub barracks_bonus: u32,
    /// Extra income paid by a forge.
    pub forge_bonus: u32,
    /// Extra income paid by a sanctuary.
    pub sanctuary_bonus: u32,
    /// Specialized bases levy a free battalion every this many turns; zero disables levies.
    pub levy_interval: u32,
}

impl Default for EconomyTable {
    fn default() -> Self {
        Self {
            base_income: 1,
            barracks_bonus: 2,
            forge_bonus: 1,
            sanctuary_bonus: 1,
            levy_interval: 4,
        }
    }
}

impl EconomyTable {
    /// Income paid by a single base with the provided specialization.
    #[must_use]
    pub const fn base_yield(&self, specialization: Option<Specialization>) -> u32 {
        let bonus = match specialization {
            None => 0,
            Some(Specialization::Barracks) => self.barracks_bonus,
            Some(Specialization::Forge) => self.forge_bonus,
            Some(Specialization::Sanctuary) => self.sanctuary_bonus,
        };
        self.base_income.saturating_add(bonus)
    }

    /// Total income `faction` collects from the bases it holds on `board`.
    #[must_use]
    pub fn income(&self, board: &Board, faction: Faction) -> u32 {
        board
            .cells_owned_by(faction)
            .filter(|cell| cell.is_base())
            .map(|cell| self.base_yield(cell.specialization()))
            .fold(0, u32::saturating_add)
    }

    /// Reports whether specialized bases levy battalions on `turn`.
    #[must_use]
    pub const fn is_levy_turn(&self, turn: u32) -> bool {
        self.levy_interval > 0 && turn % self.levy_interval == 0
    }

    /// Unit type a base with `specialization` levies, if any.
    #[must_use]
    pub const fn levy(specialization: Option<Specialization>) -> Option<UnitType> {
        match specialization {
            Some(Specialization::Forge) => Some(UnitType::Artillery),
            Some(Specialization::Sanctuary) => Some(UnitType::Guardian),
            Some(Specialization::Barracks) | None => None,
        }
    }
}

/// Every tunable of a match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Board generation parameters; `map.size` is the default board size.
    pub map: MapConfig,
    /// Income and levy table.
    pub economy: EconomyTable,
    /// Resources each faction starts with.
    pub starting_resources: u32,
    /// Streak length that wins by majority.
    pub majority_turns: u32,
}

impl RulesConfig {
    /// Default rules played on a board of the provided size.
    #[must_use]
    pub fn with_size(size: u32) -> Self {
        Self {
            map: MapConfig::with_size(size),
            ..Self::default()
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            economy: EconomyTable::default(),
            starting_resources: DEFAULT_STARTING_RESOURCES,
            majority_turns: DEFAULT_MAJORITY_TURNS,
        }
    }
}
