//! Hierarchical bank account routing.
//!
//! Resolves which bank account a campus's invoices are attributed to by
//! climbing the unit hierarchy (campus, zone, city, subregion, region) to the
//! nearest active primary account.

pub mod error;
pub mod resolver;
pub mod types;

pub use error::RoutingError;
pub use resolver::RoutingResolver;
pub use types::{
    AccountIndex, CampusChain, ChainLink, RoutedAccount, RoutingMode, UnitLevel,
};
