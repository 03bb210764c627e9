//! Routing repository: loads the account index and campus chains, then
//! delegates resolution to the in-memory resolver.

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tahsil_core::routing::{
    AccountIndex, CampusChain, ChainLink, RoutedAccount, RoutingError, RoutingResolver,
    UnitLevel,
};
use tahsil_shared::scope::FinanceScope;
use tahsil_shared::types::{BankAccountId, CampusId, UnitId};

use crate::entities::{bank_accounts, campuses, cities, organizations, sea_orm_active_enums};

fn db_err(err: DbErr) -> RoutingError {
    RoutingError::Database(err.to_string())
}

/// Repository for bank account routing.
#[derive(Debug, Clone)]
pub struct RoutingRepository {
    db: DatabaseConnection,
}

impl RoutingRepository {
    /// Creates a new routing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds a resolver for the organization.
    ///
    /// One query loads every active bank account; primaries feed the chain
    /// index and the full set backs manual-override validation.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Database`] when the organization row or its
    /// accounts cannot be loaded.
    pub async fn resolver(&self, scope: &FinanceScope) -> Result<RoutingResolver, RoutingError> {
        let org_uuid = scope.organization_id.into_inner();

        let organization = organizations::Entity::find_by_id(org_uuid)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                RoutingError::Database(format!("organization {org_uuid} not found"))
            })?;
        let mode = organization.routing_mode.into();

        let accounts = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::OrganizationId.eq(org_uuid))
            .filter(
                bank_accounts::Column::Status.eq(sea_orm_active_enums::BankAccountStatus::Active),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut index = AccountIndex::new();
        let mut active: HashSet<BankAccountId> = HashSet::with_capacity(accounts.len());
        for account in accounts {
            let account_id = BankAccountId::from_uuid(account.id);
            active.insert(account_id);
            if account.is_primary {
                index.insert(account.level.into(), account.unit_id, account_id);
            }
        }

        Ok(RoutingResolver::new(index, active, mode))
    }

    /// Loads ancestor chains for the organization's campuses, nearest level
    /// first. Optional levels are absent from a chain when the campus has no
    /// unit at them.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Database`] when the hierarchy rows cannot be
    /// loaded.
    pub async fn chains(
        &self,
        scope: &FinanceScope,
        campus_id: Option<CampusId>,
    ) -> Result<Vec<CampusChain>, RoutingError> {
        let org_uuid = scope.organization_id.into_inner();

        let mut campus_query =
            campuses::Entity::find().filter(campuses::Column::OrganizationId.eq(org_uuid));
        if let Some(campus) = campus_id.or(scope.campus_id) {
            campus_query = campus_query.filter(campuses::Column::Id.eq(campus.into_inner()));
        }
        let campus_rows = campus_query.all(&self.db).await.map_err(db_err)?;

        let city_rows = cities::Entity::find()
            .filter(cities::Column::OrganizationId.eq(org_uuid))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let cities_by_id: HashMap<uuid::Uuid, cities::Model> =
            city_rows.into_iter().map(|city| (city.id, city)).collect();

        let chains = campus_rows
            .into_iter()
            .map(|campus| {
                let campus_id = CampusId::from_uuid(campus.id);
                let mut links = vec![ChainLink::campus(campus_id)];
                if let Some(zone) = campus.zone_id {
                    links.push(ChainLink::unit(UnitLevel::Zone, UnitId::from_uuid(zone)));
                }
                links.push(ChainLink::unit(
                    UnitLevel::City,
                    UnitId::from_uuid(campus.city_id),
                ));
                if let Some(city) = cities_by_id.get(&campus.city_id) {
                    if let Some(sub_region) = city.sub_region_id {
                        links.push(ChainLink::unit(
                            UnitLevel::SubRegion,
                            UnitId::from_uuid(sub_region),
                        ));
                    }
                    if let Some(region) = city.region_id {
                        links.push(ChainLink::unit(
                            UnitLevel::Region,
                            UnitId::from_uuid(region),
                        ));
                    }
                }
                CampusChain { campus_id, links }
            })
            .collect();

        Ok(chains)
    }

    /// Resolves the receiving account for one campus, honoring an optional
    /// manual override.
    ///
    /// # Errors
    ///
    /// Returns the resolver's routing errors, or [`RoutingError::Database`]
    /// when the chain cannot be loaded.
    pub async fn resolve_for_campus(
        &self,
        scope: &FinanceScope,
        campus_id: CampusId,
        override_account: Option<BankAccountId>,
    ) -> Result<RoutedAccount, RoutingError> {
        let resolver = self.resolver(scope).await?;
        let chains = self.chains(scope, Some(campus_id)).await?;
        let chain = chains
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoEligibleAccount(campus_id.into_inner()))?;
        resolver.resolve(&chain, override_account)
    }

    /// Resolves every campus in scope in one pass.
    ///
    /// Per-campus routing failures are carried in the map so a campus without
    /// an account never aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Database`] when the index or chains cannot be
    /// loaded.
    pub async fn resolve_all(
        &self,
        scope: &FinanceScope,
    ) -> Result<HashMap<CampusId, Result<RoutedAccount, RoutingError>>, RoutingError> {
        let resolver = self.resolver(scope).await?;
        let chains = self.chains(scope, None).await?;
        Ok(resolver.resolve_batch(&chains))
    }
}
