//! In-memory routing resolution.

use std::collections::{HashMap, HashSet};

use tahsil_shared::types::{BankAccountId, CampusId};

use super::error::RoutingError;
use super::types::{AccountIndex, CampusChain, RoutedAccount, RoutingMode, UnitLevel};

/// Resolves bank accounts for campuses against a prebuilt account index.
///
/// The repository builds the index and the set of active accounts in two
/// queries; from then on every resolution is an in-memory chain walk, so a
/// batch of N campuses costs O(N) lookups regardless of hierarchy depth.
#[derive(Debug, Clone)]
pub struct RoutingResolver {
    index: AccountIndex,
    active_accounts: HashSet<BankAccountId>,
    mode: RoutingMode,
}

impl RoutingResolver {
    /// Creates a resolver.
    ///
    /// `active_accounts` holds every active account of the organization
    /// (primary or not) and backs manual-override validation.
    #[must_use]
    pub fn new(
        index: AccountIndex,
        active_accounts: HashSet<BankAccountId>,
        mode: RoutingMode,
    ) -> Self {
        Self {
            index,
            active_accounts,
            mode,
        }
    }

    /// Resolves one campus, honoring an optional manual override.
    ///
    /// The override always wins when supplied, but must name an active
    /// account of the organization.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::OverrideNotFound`] for an invalid override,
    /// [`RoutingError::NoCampusAccount`] in campus-only mode when the campus
    /// has no primary account, and [`RoutingError::NoEligibleAccount`] when
    /// the whole permitted chain is exhausted.
    pub fn resolve(
        &self,
        chain: &CampusChain,
        override_account: Option<BankAccountId>,
    ) -> Result<RoutedAccount, RoutingError> {
        if let Some(account_id) = override_account {
            if !self.active_accounts.contains(&account_id) {
                return Err(RoutingError::OverrideNotFound(account_id.into_inner()));
            }
            return Ok(RoutedAccount {
                bank_account_id: account_id,
                source_level: UnitLevel::Campus,
            });
        }

        self.walk(chain)
    }

    /// Resolves a batch of campuses in one in-memory pass.
    ///
    /// Per-campus failures are returned alongside successes so one campus
    /// without an account does not abort the batch.
    #[must_use]
    pub fn resolve_batch(
        &self,
        chains: &[CampusChain],
    ) -> HashMap<CampusId, Result<RoutedAccount, RoutingError>> {
        chains
            .iter()
            .map(|chain| (chain.campus_id, self.walk(chain)))
            .collect()
    }

    fn walk(&self, chain: &CampusChain) -> Result<RoutedAccount, RoutingError> {
        let campus_uuid = chain.campus_id.into_inner();

        for link in &chain.links {
            if self.mode == RoutingMode::CampusPrimary && link.level != UnitLevel::Campus {
                return Err(RoutingError::NoCampusAccount(campus_uuid));
            }
            if let Some(bank_account_id) = self.index.get(link.level, link.unit_id) {
                return Ok(RoutedAccount {
                    bank_account_id,
                    source_level: link.level,
                });
            }
        }

        match self.mode {
            RoutingMode::CampusPrimary => Err(RoutingError::NoCampusAccount(campus_uuid)),
            RoutingMode::NearestParentPrimary => {
                Err(RoutingError::NoEligibleAccount(campus_uuid))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::types::ChainLink;
    use tahsil_shared::types::UnitId;

    struct Fixture {
        campus_id: CampusId,
        city_id: UnitId,
        region_id: UnitId,
        chain: CampusChain,
    }

    fn fixture() -> Fixture {
        let campus_id = CampusId::new();
        let city_id = UnitId::new();
        let region_id = UnitId::new();
        let chain = CampusChain {
            campus_id,
            links: vec![
                ChainLink::campus(campus_id),
                ChainLink::unit(UnitLevel::City, city_id),
                ChainLink::unit(UnitLevel::Region, region_id),
            ],
        };
        Fixture {
            campus_id,
            city_id,
            region_id,
            chain,
        }
    }

    #[test]
    fn test_campus_account_wins_when_present() {
        let f = fixture();
        let campus_account = BankAccountId::new();
        let city_account = BankAccountId::new();

        let mut index = AccountIndex::new();
        index.insert(UnitLevel::Campus, f.campus_id.into_inner(), campus_account);
        index.insert(UnitLevel::City, f.city_id.into_inner(), city_account);

        let resolver = RoutingResolver::new(
            index,
            HashSet::from([campus_account, city_account]),
            RoutingMode::NearestParentPrimary,
        );

        let routed = resolver.resolve(&f.chain, None).unwrap();
        assert_eq!(routed.bank_account_id, campus_account);
        assert_eq!(routed.source_level, UnitLevel::Campus);
    }

    #[test]
    fn test_falls_back_to_city_account() {
        let f = fixture();
        let city_account = BankAccountId::new();

        let mut index = AccountIndex::new();
        index.insert(UnitLevel::City, f.city_id.into_inner(), city_account);

        let resolver = RoutingResolver::new(
            index,
            HashSet::from([city_account]),
            RoutingMode::NearestParentPrimary,
        );

        let routed = resolver.resolve(&f.chain, None).unwrap();
        assert_eq!(routed.bank_account_id, city_account);
        assert_eq!(routed.source_level, UnitLevel::City);
    }

    #[test]
    fn test_campus_only_mode_refuses_to_climb() {
        let f = fixture();
        let city_account = BankAccountId::new();

        let mut index = AccountIndex::new();
        index.insert(UnitLevel::City, f.city_id.into_inner(), city_account);

        let resolver = RoutingResolver::new(
            index,
            HashSet::from([city_account]),
            RoutingMode::CampusPrimary,
        );

        let err = resolver.resolve(&f.chain, None).unwrap_err();
        assert_eq!(err, RoutingError::NoCampusAccount(f.campus_id.into_inner()));
    }

    #[test]
    fn test_exhausted_chain_is_explicit_error() {
        let f = fixture();
        let resolver = RoutingResolver::new(
            AccountIndex::new(),
            HashSet::new(),
            RoutingMode::NearestParentPrimary,
        );

        let err = resolver.resolve(&f.chain, None).unwrap_err();
        assert_eq!(
            err,
            RoutingError::NoEligibleAccount(f.campus_id.into_inner())
        );
    }

    #[test]
    fn test_override_wins_but_must_be_active() {
        let f = fixture();
        let region_account = BankAccountId::new();
        let override_account = BankAccountId::new();

        let mut index = AccountIndex::new();
        index.insert(UnitLevel::Region, f.region_id.into_inner(), region_account);

        let resolver = RoutingResolver::new(
            index,
            HashSet::from([region_account, override_account]),
            RoutingMode::NearestParentPrimary,
        );

        let routed = resolver.resolve(&f.chain, Some(override_account)).unwrap();
        assert_eq!(routed.bank_account_id, override_account);

        let unknown = BankAccountId::new();
        let err = resolver.resolve(&f.chain, Some(unknown)).unwrap_err();
        assert_eq!(err, RoutingError::OverrideNotFound(unknown.into_inner()));
    }

    #[test]
    fn test_batch_mixes_successes_and_failures() {
        let f = fixture();
        let city_account = BankAccountId::new();

        let orphan_campus = CampusId::new();
        let orphan_chain = CampusChain {
            campus_id: orphan_campus,
            links: vec![ChainLink::campus(orphan_campus)],
        };

        let mut index = AccountIndex::new();
        index.insert(UnitLevel::City, f.city_id.into_inner(), city_account);

        let resolver = RoutingResolver::new(
            index,
            HashSet::from([city_account]),
            RoutingMode::NearestParentPrimary,
        );

        let results = resolver.resolve_batch(&[f.chain, orphan_chain]);
        assert_eq!(results.len(), 2);
        assert!(results[&f.campus_id].is_ok());
        assert!(results[&orphan_campus].is_err());
    }
}
