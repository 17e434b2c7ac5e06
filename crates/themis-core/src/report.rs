//! Read-only aggregates for the dashboard and custody reports.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  puc::{CustodyStatus, Puc},
  store::FacilityStore,
};

pub const RECENT_RELEASES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
  pub admin:   u64,
  pub officer: u64,
  pub visitor: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
  pub pending:  u64,
  pub approved: u64,
  pub rejected: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
  pub pucs:              u64,
  pub visitors:          u64,
  pub users:             UserCounts,
  pub visit_requests:    RequestCounts,
  /// Approved requests whose visit date is `date`.
  pub visits_today:      u64,
  pub blacklist_entries: u64,
  pub date:              NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
  pub status: CustodyStatus,
  pub count:  u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
  pub category_id: Uuid,
  pub name:        String,
  pub count:       u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyReport {
  /// One row per status, zero counts included.
  pub by_status:       Vec<StatusCount>,
  /// One row per category, ordered by name.
  pub by_category:     Vec<CategoryCount>,
  /// Most recently released PUCs, newest release first.
  pub recent_releases: Vec<Puc>,
}

pub struct Reports<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> Reports<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn dashboard(&self, actor: &Actor) -> Result<DashboardStats> {
    actor.require(Action::ViewReports)?;
    self
      .store
      .dashboard_stats(Utc::now().date_naive())
      .await
      .map_err(Error::from_store)
  }

  pub async fn custody(&self, actor: &Actor) -> Result<CustodyReport> {
    actor.require(Action::ViewReports)?;
    self.store.custody_report().await.map_err(Error::from_store)
  }
}
