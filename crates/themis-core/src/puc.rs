//! Custody records for persons under police custody (PUCs).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  audit::{self, AuditContext, AuditEvent, record_best_effort},
  store::FacilityStore,
  visitor::{normalize, required_name},
};

pub const MAX_AGE: u16 = 150;

/// Informational custody status. Never derived from visit activity.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustodyStatus {
  #[default]
  InCustody,
  Released,
  Transferred,
}

impl CustodyStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puc {
  pub puc_id:       Uuid,
  pub first_name:   String,
  pub last_name:    String,
  pub gender:       Option<String>,
  pub age:          Option<u16>,
  pub arrest_date:  Option<NaiveDate>,
  pub release_date: Option<NaiveDate>,
  pub status:       CustodyStatus,
  pub category_id:  Uuid,
  pub crime_id:     Uuid,
  pub created_at:   DateTime<Utc>,
}

impl Puc {
  pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPuc {
  pub first_name:   String,
  pub last_name:    String,
  pub gender:       Option<String>,
  pub age:          Option<u16>,
  pub arrest_date:  Option<NaiveDate>,
  pub release_date: Option<NaiveDate>,
  #[serde(default)]
  pub status:       CustodyStatus,
  pub category_id:  Uuid,
  pub crime_id:     Uuid,
}

impl NewPuc {
  /// Field-level checks. References are checked by [`PucRegistry`].
  pub fn validated(self) -> Result<Self> {
    if let Some(age) = self.age
      && age > MAX_AGE
    {
      return Err(Error::Validation(format!("age must be at most {MAX_AGE}")));
    }
    if let (Some(arrest), Some(release)) = (self.arrest_date, self.release_date)
      && release < arrest
    {
      return Err(Error::validation("release_date precedes arrest_date"));
    }
    Ok(Self {
      first_name: required_name("first_name", &self.first_name)?,
      last_name: required_name("last_name", &self.last_name)?,
      gender: normalize(self.gender),
      ..self
    })
  }
}

/// Field-level update. `None` keeps the prior value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PucUpdate {
  pub first_name:   Option<String>,
  pub last_name:    Option<String>,
  pub gender:       Option<String>,
  pub age:          Option<u16>,
  pub arrest_date:  Option<NaiveDate>,
  pub release_date: Option<NaiveDate>,
  pub status:       Option<CustodyStatus>,
  pub category_id:  Option<Uuid>,
  pub crime_id:     Option<Uuid>,
}

impl Puc {
  /// Merge `update` over `self` and re-check field rules.
  pub fn apply(&self, update: PucUpdate) -> Result<Puc> {
    let merged = NewPuc {
      first_name:   update.first_name.unwrap_or_else(|| self.first_name.clone()),
      last_name:    update.last_name.unwrap_or_else(|| self.last_name.clone()),
      gender:       update.gender.or_else(|| self.gender.clone()),
      age:          update.age.or(self.age),
      arrest_date:  update.arrest_date.or(self.arrest_date),
      release_date: update.release_date.or(self.release_date),
      status:       update.status.unwrap_or(self.status),
      category_id:  update.category_id.unwrap_or(self.category_id),
      crime_id:     update.crime_id.unwrap_or(self.crime_id),
    }
    .validated()?;

    Ok(Puc {
      puc_id: self.puc_id,
      first_name: merged.first_name,
      last_name: merged.last_name,
      gender: merged.gender,
      age: merged.age,
      arrest_date: merged.arrest_date,
      release_date: merged.release_date,
      status: merged.status,
      category_id: merged.category_id,
      crime_id: merged.crime_id,
      created_at: self.created_at,
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PucQuery {
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub status:      Option<CustodyStatus>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub category_id: Option<Uuid>,
  /// Case-insensitive substring over first, last, and full name.
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub text:        Option<String>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct PucRegistry<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> PucRegistry<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// The crime must exist and belong to the named category.
  async fn check_classification(&self, category_id: Uuid, crime_id: Uuid) -> Result<()> {
    if self
      .store
      .get_category(category_id)
      .await
      .map_err(Error::from_store)?
      .is_none()
    {
      return Err(Error::Validation(format!("unknown crime category {category_id}")));
    }
    let crime = self
      .store
      .get_crime_type(crime_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::Validation(format!("unknown crime type {crime_id}")))?;
    if crime.category_id != category_id {
      return Err(Error::Validation(format!(
        "crime type {crime_id} does not belong to category {category_id}"
      )));
    }
    Ok(())
  }

  pub async fn create(&self, actor: &Actor, input: NewPuc, ctx: &AuditContext) -> Result<Puc> {
    audit::require(self.store, actor, Action::ManagePucs, ctx).await?;
    let input = input.validated()?;
    self.check_classification(input.category_id, input.crime_id).await?;

    let puc = self.store.insert_puc(input).await.map_err(Error::from_store)?;
    tracing::info!(puc_id = %puc.puc_id, by = %actor.user_id, "puc registered");
    record_best_effort(
      self.store,
      ctx,
      AuditEvent::PucCreated,
      format!("registered puc {} ({})", puc.full_name(), puc.puc_id),
    )
    .await;
    Ok(puc)
  }

  pub async fn get(&self, actor: &Actor, puc_id: Uuid) -> Result<Puc> {
    actor.require(Action::ViewPucs)?;
    self
      .store
      .get_puc(puc_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("puc {puc_id}")))
  }

  pub async fn list(&self, actor: &Actor, query: &PucQuery) -> Result<Vec<Puc>> {
    actor.require(Action::ViewPucs)?;
    self.store.list_pucs(query).await.map_err(Error::from_store)
  }

  pub async fn update(
    &self,
    actor: &Actor,
    puc_id: Uuid,
    update: PucUpdate,
    ctx: &AuditContext,
  ) -> Result<Puc> {
    audit::require(self.store, actor, Action::ManagePucs, ctx).await?;
    let current = self
      .store
      .get_puc(puc_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("puc {puc_id}")))?;

    let updated = current.apply(update)?;
    if (updated.category_id, updated.crime_id) != (current.category_id, current.crime_id) {
      self.check_classification(updated.category_id, updated.crime_id).await?;
    }
    self.store.replace_puc(&updated).await.map_err(Error::from_store)?;

    tracing::info!(puc_id = %puc_id, status = %updated.status, "puc updated");
    record_best_effort(
      self.store,
      ctx,
      AuditEvent::PucUpdated,
      format!("updated puc {puc_id} (status {})", updated.status),
    )
    .await;
    Ok(updated)
  }
}
