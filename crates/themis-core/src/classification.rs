//! Crime categories and crime types referenced by PUC records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  store::FacilityStore,
  visitor::{normalize, required_name},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeCategory {
  pub category_id: Uuid,
  pub name:        String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeType {
  pub crime_id:      Uuid,
  pub category_id:   Uuid,
  pub name:          String,
  /// Statute or code section, e.g. "RPC Art. 308".
  pub law_reference: String,
  pub description:   Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrimeCategory {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrimeType {
  pub category_id:   Uuid,
  pub name:          String,
  pub law_reference: String,
  pub description:   Option<String>,
}

pub struct Classifications<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> Classifications<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn create_category(
    &self,
    actor: &Actor,
    input: NewCrimeCategory,
  ) -> Result<CrimeCategory> {
    actor.require(Action::ManageClassifications)?;
    let name = required_name("name", &input.name)?;
    self
      .store
      .insert_category(NewCrimeCategory { name })
      .await
      .map_err(Error::from_store)
  }

  pub async fn create_crime_type(
    &self,
    actor: &Actor,
    input: NewCrimeType,
  ) -> Result<CrimeType> {
    actor.require(Action::ManageClassifications)?;
    let name = required_name("name", &input.name)?;
    let law_reference = input.law_reference.trim().to_owned();
    if law_reference.is_empty() {
      return Err(Error::validation("law_reference must not be empty"));
    }
    if self
      .store
      .get_category(input.category_id)
      .await
      .map_err(Error::from_store)?
      .is_none()
    {
      return Err(Error::Validation(format!(
        "unknown crime category {}",
        input.category_id
      )));
    }
    self
      .store
      .insert_crime_type(NewCrimeType {
        category_id: input.category_id,
        name,
        law_reference,
        description: normalize(input.description),
      })
      .await
      .map_err(Error::from_store)
  }

  pub async fn categories(&self) -> Result<Vec<CrimeCategory>> {
    self.store.list_categories().await.map_err(Error::from_store)
  }

  pub async fn crime_types(&self, category_id: Option<Uuid>) -> Result<Vec<CrimeType>> {
    self
      .store
      .list_crime_types(category_id)
      .await
      .map_err(Error::from_store)
  }
}
