use serde::{Deserialize, Serialize};

use crate::{Element, ElementResistances};

/// Unique identifier assigned to a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy archetypes that waves can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Slow fodder with no elemental affinity.
    Slime,
    /// Fast, fragile harasser.
    Bat,
    /// Sturdy melee walker, brittle against earth.
    Skeleton,
    /// Heavy tank that shrugs off earth and lightning.
    Golem,
    /// Fire elemental, immune-ish to fire and weak to frost.
    FireImp,
    /// Frost elemental, resistant to frost and weak to fire.
    FrostWraith,
    /// First boss.
    MagmaColossus,
    /// Final boss.
    StormTyrant,
}

impl EnemyKind {
    /// Reports whether the archetype is a boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::MagmaColossus | Self::StormTyrant)
    }

    /// Health an enemy of this archetype spawns with.
    #[must_use]
    pub const fn base_health(self) -> f32 {
        match self {
            Self::Slime => 20.0,
            Self::Bat => 8.0,
            Self::Skeleton => 35.0,
            Self::Golem => 90.0,
            Self::FireImp => 30.0,
            Self::FrostWraith => 30.0,
            Self::MagmaColossus => 1_500.0,
            Self::StormTyrant => 3_000.0,
        }
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub const fn move_speed(self) -> f32 {
        match self {
            Self::Slime => 40.0,
            Self::Bat => 110.0,
            Self::Skeleton => 55.0,
            Self::Golem => 30.0,
            Self::FireImp => 70.0,
            Self::FrostWraith => 65.0,
            Self::MagmaColossus => 45.0,
            Self::StormTyrant => 60.0,
        }
    }

    /// Damage dealt to the player per second of contact.
    #[must_use]
    pub const fn contact_damage(self) -> f32 {
        match self {
            Self::Slime => 5.0,
            Self::Bat => 3.0,
            Self::Skeleton => 8.0,
            Self::Golem => 14.0,
            Self::FireImp => 9.0,
            Self::FrostWraith => 9.0,
            Self::MagmaColossus => 30.0,
            Self::StormTyrant => 40.0,
        }
    }

    /// Experience granted when an enemy of this archetype dies.
    #[must_use]
    pub const fn experience(self) -> u32 {
        match self {
            Self::Slime => 1,
            Self::Bat => 1,
            Self::Skeleton => 2,
            Self::Golem => 5,
            Self::FireImp => 3,
            Self::FrostWraith => 3,
            Self::MagmaColossus => 100,
            Self::StormTyrant => 250,
        }
    }

    /// Default resistance table shared by every enemy of this archetype.
    #[must_use]
    pub fn resistances(self) -> ElementResistances {
        let table = ElementResistances::neutral();
        match self {
            Self::Slime | Self::Bat => table,
            Self::Skeleton => table.with(Element::Earth, 1.5).with(Element::Frost, 0.8),
            Self::Golem => table
                .with(Element::Earth, 0.3)
                .with(Element::Lightning, 0.6)
                .with(Element::Frost, 1.3),
            Self::FireImp => table
                .with(Element::Fire, 0.2)
                .with(Element::Lava, 0.5)
                .with(Element::Frost, 1.8),
            Self::FrostWraith => table
                .with(Element::Frost, 0.2)
                .with(Element::Permafrost, 0.5)
                .with(Element::Fire, 1.8),
            Self::MagmaColossus => table
                .with(Element::Fire, 0.5)
                .with(Element::Lava, 0.3)
                .with(Element::Frost, 1.5)
                .with(Element::Steam, 1.2),
            Self::StormTyrant => table
                .with(Element::Lightning, 0.5)
                .with(Element::Blizzard, 0.5)
                .with(Element::Earth, 1.4)
                .with(Element::Magnetism, 1.2),
        }
    }
}
