//! Routing domain types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tahsil_shared::types::{BankAccountId, CampusId, UnitId};
use uuid::Uuid;

/// Level in the unit hierarchy a bank account is attached to.
///
/// Ordered from nearest (campus) to farthest (region); the resolver walks
/// in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitLevel {
    /// The campus itself.
    Campus,
    /// Zone grouping campuses inside a city.
    Zone,
    /// City.
    City,
    /// Subregion grouping cities.
    SubRegion,
    /// Region, the top of the hierarchy.
    Region,
}

/// Organization-level routing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingMode {
    /// Climb the ancestor chain to the nearest primary account.
    #[default]
    NearestParentPrimary,
    /// Only the campus's own account is eligible; absence is a hard failure.
    CampusPrimary,
}

/// One step of a campus's ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Hierarchy level of this ancestor.
    pub level: UnitLevel,
    /// The ancestor's unit ID (campus ID at the campus level).
    pub unit_id: Uuid,
}

impl ChainLink {
    /// Campus-level link.
    #[must_use]
    pub fn campus(id: CampusId) -> Self {
        Self {
            level: UnitLevel::Campus,
            unit_id: id.into_inner(),
        }
    }

    /// Link for a non-campus unit.
    #[must_use]
    pub fn unit(level: UnitLevel, id: UnitId) -> Self {
        Self {
            level,
            unit_id: id.into_inner(),
        }
    }
}

/// A campus plus its ordered ancestor chain, nearest first.
///
/// The chain always starts with the campus link; optional levels (zone,
/// subregion, region) are simply absent when the campus has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusChain {
    /// The campus being resolved.
    pub campus_id: CampusId,
    /// Ordered (level, unit) links, campus first.
    pub links: Vec<ChainLink>,
}

/// A successfully routed bank account, tagged with where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedAccount {
    /// The resolved account.
    pub bank_account_id: BankAccountId,
    /// Hierarchy level the account was found at.
    pub source_level: UnitLevel,
}

/// Index of active primary bank accounts keyed by (level, unit).
///
/// Built once per batch so resolution is an in-memory walk, never one query
/// per campus.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    primaries: HashMap<(UnitLevel, Uuid), BankAccountId>,
}

impl AccountIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active primary account for a unit.
    pub fn insert(&mut self, level: UnitLevel, unit_id: Uuid, account_id: BankAccountId) {
        self.primaries.insert((level, unit_id), account_id);
    }

    /// Looks up the active primary account for a unit.
    #[must_use]
    pub fn get(&self, level: UnitLevel, unit_id: Uuid) -> Option<BankAccountId> {
        self.primaries.get(&(level, unit_id)).copied()
    }

    /// Number of indexed accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primaries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty()
    }
}
