//! Static catalog of trainable unit types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Specialization;

/// Trainable battalion types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Line infantry available to every faction.
    Infantry,
    /// Hard-hitting assault troops unlocked by a barracks.
    Vanguard,
    /// Sturdy defenders unlocked by a sanctuary.
    Guardian,
    /// Slow siege batteries unlocked by a forge.
    Artillery,
}

impl UnitType {
    /// Every unit type in catalog order.
    pub const ALL: [UnitType; 4] = [
        UnitType::Infantry,
        UnitType::Vanguard,
        UnitType::Guardian,
        UnitType::Artillery,
    ];

    /// Catalog entry describing the unit type.
    #[must_use]
    pub fn blueprint(self) -> &'static UnitBlueprint {
        blueprint(self)
    }
}

/// Immutable template every battalion of a type is trained from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitBlueprint {
    /// Unit type described by the entry.
    pub unit: UnitType,
    /// Human readable name.
    pub name: &'static str,
    /// Resources required to train one battalion.
    pub cost: u32,
    /// Soldiers in a freshly trained battalion.
    pub soldiers: u32,
    /// Attack rating per soldier.
    pub attack: u32,
    /// Defense rating per soldier.
    pub defense: u32,
    /// Movement allowance per turn.
    pub movement: u32,
    /// Specialization a faction must hold to train the type.
    pub unlocked_by: Option<Specialization>,
}

impl UnitBlueprint {
    /// Reports whether the blueprint can be trained with the held specializations.
    #[must_use]
    pub fn is_unlocked(&self, owned: &BTreeSet<Specialization>) -> bool {
        self.unlocked_by
            .map_or(true, |specialization| owned.contains(&specialization))
    }
}

const CATALOG: [UnitBlueprint; 4] = [
    UnitBlueprint {
        unit: UnitType::Infantry,
        name: "Infantry battalion",
        cost: 1,
        soldiers: 10,
        attack: 8,
        defense: 7,
        movement: 3,
        unlocked_by: None,
    },
    UnitBlueprint {
        unit: UnitType::Vanguard,
        name: "Assault vanguard",
        cost: 2,
        soldiers: 12,
        attack: 12,
        defense: 8,
        movement: 3,
        unlocked_by: Some(Specialization::Barracks),
    },
    UnitBlueprint {
        unit: UnitType::Guardian,
        name: "Sanctuary guardians",
        cost: 2,
        soldiers: 10,
        attack: 7,
        defense: 12,
        movement: 2,
        unlocked_by: Some(Specialization::Sanctuary),
    },
    UnitBlueprint {
        unit: UnitType::Artillery,
        name: "Artillery battery",
        cost: 3,
        soldiers: 8,
        attack: 15,
        defense: 6,
        movement: 2,
        unlocked_by: Some(Specialization::Forge),
    },
];

/// Every catalog entry in catalog order.
#[must_use]
pub fn catalog() -> &'static [UnitBlueprint] {
    &CATALOG
}

/// Catalog entry for `unit`.
#[must_use]
pub fn blueprint(unit: UnitType) -> &'static UnitBlueprint {
    match unit {
        UnitType::Infantry => &CATALOG[0],
        UnitType::Vanguard => &CATALOG[1],
        UnitType::Guardian => &CATALOG[2],
        UnitType::Artillery => &CATALOG[3],
    }
}

/// Blueprints trainable with the held specializations, unlock-free types included.
#[must_use]
pub fn available_blueprints(owned: &BTreeSet<Specialization>) -> Vec<&'static UnitBlueprint> {
    CATALOG
        .iter()
        .filter(|blueprint| blueprint.is_unlocked(owned))
        .collect()
}

/// Unlocked blueprints whose cost fits within `budget`.
#[must_use]
pub fn affordable_blueprints(
    owned: &BTreeSet<Specialization>,
    budget: u32,
) -> Vec<&'static UnitBlueprint> {
    available_blueprints(owned)
        .into_iter()
        .filter(|blueprint| blueprint.cost <= budget)
        .collect()
}

/// Cheapest blueprint that needs no specialization.
#[must_use]
pub fn cheapest_unlock_free() -> &'static UnitBlueprint {
    CATALOG
        .iter()
        .filter(|blueprint| blueprint.unlocked_by.is_none())
        .min_by_key(|blueprint| blueprint.cost)
        .unwrap_or(&CATALOG[0])
}
