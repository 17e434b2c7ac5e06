//! The visit-request lifecycle: submit, approve, reject, list.
//!
//! Every state change is a single store call that runs the blacklist check,
//! the compare-and-set on `approval_status`, credential provisioning, and the
//! audit append as one atomic unit. When two reviewers race on the same
//! request, exactly one commits; the other sees the terminal state and gets
//! [`Error::InvalidStateTransition`].

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  audit::{self, AuditContext, AuditEvent},
  credentials::{self, IssuedCredentials},
  store::FacilityStore,
  user::ProvisionPlan,
  visit::{Decision, NewVisitRequest, VisitDecision, VisitQuery, VisitRequest, transition},
};

/// Result of a successful approval.
#[derive(Debug, Clone, Serialize)]
pub struct Approval {
  pub request:     VisitRequest,
  /// Present only when this approval provisioned the visitor's login. Never
  /// shown again.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub credentials: Option<IssuedCredentials>,
}

pub struct VisitLifecycle<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> VisitLifecycle<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  fn today() -> NaiveDate { Utc::now().date_naive() }

  /// Create a pending request.
  ///
  /// A visitor submits for their own identity. Staff may submit on behalf of
  /// a registered visitor who has no login yet; approving that request is
  /// what provisions the login. Once a visitor has a login, only they submit.
  pub async fn submit(
    &self,
    actor: &Actor,
    input: NewVisitRequest,
    ctx: &AuditContext,
  ) -> Result<VisitRequest> {
    self.submit_on(actor, input, ctx, Self::today()).await
  }

  /// [`submit`](Self::submit) with an explicit notion of "today".
  pub async fn submit_on(
    &self,
    actor: &Actor,
    mut input: NewVisitRequest,
    ctx: &AuditContext,
    today: NaiveDate,
  ) -> Result<VisitRequest> {
    let on_behalf = !actor.can(Action::SubmitVisitRequest);
    let action = if on_behalf {
      Action::SubmitOnBehalf
    } else {
      Action::SubmitVisitRequest
    };
    audit::require(self.store, actor, action, ctx).await?;
    if !on_behalf && actor.visitor_id != Some(input.visitor_id) {
      return Err(self.refuse_submission(actor, input.visitor_id, ctx).await);
    }
    input.validate(today)?;

    if self
      .store
      .get_puc(input.puc_id)
      .await
      .map_err(Error::from_store)?
      .is_none()
    {
      return Err(Error::Validation(format!("unknown puc {}", input.puc_id)));
    }
    let visitor = self
      .store
      .get_visitor(input.visitor_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::Validation(format!("unknown visitor {}", input.visitor_id)))?;
    if on_behalf && visitor.linked_user_id.is_some() {
      return Err(self.refuse_submission(actor, input.visitor_id, ctx).await);
    }

    let audit_entry = ctx.entry(
      AuditEvent::VisitRequestSubmitted,
      format!(
        "{} requested a visit for visitor {} to puc {} on {} at {}",
        actor.username, input.visitor_id, input.puc_id, input.visit_date, input.visit_time
      ),
    );
    let request = self
      .store
      .insert_visit_request(input, audit_entry)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(
      request_id = %request.request_id,
      visitor_id = %request.visitor_id,
      puc_id = %request.puc_id,
      on_behalf,
      "visit request submitted"
    );
    Ok(request)
  }

  async fn refuse_submission(
    &self,
    actor: &Actor,
    visitor_id: Uuid,
    ctx: &AuditContext,
  ) -> Error {
    tracing::warn!(
      user_id = %actor.user_id,
      visitor_id = %visitor_id,
      "visit request for another visitor refused"
    );
    audit::record_best_effort(
      self.store,
      ctx,
      AuditEvent::AuthorizationDenied,
      format!("{} ({}) may not submit for visitor {visitor_id}", actor.username, actor.role),
    )
    .await;
    Error::Forbidden
  }

  /// Approve a pending request, provisioning a visitor login if the visitor
  /// has none yet.
  pub async fn approve(
    &self,
    actor: &Actor,
    request_id: Uuid,
    ctx: &AuditContext,
  ) -> Result<Approval> {
    audit::require(self.store, actor, Action::DecideVisitRequest, ctx).await?;
    let current = self.load(request_id).await?;
    transition(request_id, current.approval_status, Decision::Approve)?;

    let visitor = self
      .store
      .get_visitor(current.visitor_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("visitor {}", current.visitor_id)))?;

    // Hashing happens here, outside the store transaction. The store applies
    // the plan only if the visitor is still unlinked at commit time.
    let (provision, password) = match visitor.linked_user_id {
      Some(_) => (None, None),
      None => {
        let password = credentials::generate_password();
        let plan = ProvisionPlan {
          base_username: credentials::base_username(&visitor.first_name, &visitor.last_name),
          password_hash: credentials::hash_password(&password)?,
          email:         visitor.email.clone(),
          full_name:     Some(visitor.full_name()),
        };
        (Some(plan), Some(password))
      }
    };

    let audit_entry = ctx.entry(
      AuditEvent::VisitApproved,
      format!(
        "approved visit request {request_id} (visitor {}, puc {})",
        current.visitor_id, current.puc_id
      ),
    );
    let record = self
      .store
      .decide_visit_request(
        VisitDecision {
          request_id,
          decision: Decision::Approve,
          decided_by: actor.user_id,
          provision,
        },
        audit_entry,
      )
      .await
      .map_err(Error::from_store)?;

    let credentials = match (record.provisioned, password) {
      (Some(user), Some(password)) => {
        tracing::info!(
          user_id = %user.user_id,
          visitor_id = %visitor.visitor_id,
          "visitor login provisioned"
        );
        Some(IssuedCredentials { username: user.username, password })
      }
      _ => None,
    };

    tracing::info!(request_id = %request_id, by = %actor.user_id, "visit request approved");
    Ok(Approval { request: record.request, credentials })
  }

  pub async fn reject(
    &self,
    actor: &Actor,
    request_id: Uuid,
    ctx: &AuditContext,
  ) -> Result<VisitRequest> {
    audit::require(self.store, actor, Action::DecideVisitRequest, ctx).await?;
    let current = self.load(request_id).await?;
    transition(request_id, current.approval_status, Decision::Reject)?;

    let audit_entry = ctx.entry(
      AuditEvent::VisitRejected,
      format!(
        "rejected visit request {request_id} (visitor {}, puc {})",
        current.visitor_id, current.puc_id
      ),
    );
    let record = self
      .store
      .decide_visit_request(
        VisitDecision {
          request_id,
          decision: Decision::Reject,
          decided_by: actor.user_id,
          provision: None,
        },
        audit_entry,
      )
      .await
      .map_err(Error::from_store)?;

    tracing::info!(request_id = %request_id, by = %actor.user_id, "visit request rejected");
    Ok(record.request)
  }

  /// Staff see every request. A visitor sees only their own and may not name
  /// another visitor in the filter.
  pub async fn list(&self, actor: &Actor, mut query: VisitQuery) -> Result<Vec<VisitRequest>> {
    if !actor.can(Action::ViewAllVisitRequests) {
      let own = actor.visitor_id.ok_or(Error::Forbidden)?;
      match query.visitor_id {
        Some(other) if other != own => return Err(Error::Forbidden),
        _ => query.visitor_id = Some(own),
      }
    }
    self
      .store
      .list_visit_requests(&query)
      .await
      .map_err(Error::from_store)
  }

  /// Staff may read any request. For a visitor, a missing request and
  /// someone else's request are both [`Error::Forbidden`].
  pub async fn get(&self, actor: &Actor, request_id: Uuid) -> Result<VisitRequest> {
    if actor.can(Action::ViewAllVisitRequests) {
      return self.load(request_id).await;
    }
    let request = self
      .store
      .get_visit_request(request_id)
      .await
      .map_err(Error::from_store)?;
    match request {
      Some(r) if actor.visitor_id == Some(r.visitor_id) => Ok(r),
      _ => Err(Error::Forbidden),
    }
  }

  async fn load(&self, request_id: Uuid) -> Result<VisitRequest> {
    self
      .store
      .get_visit_request(request_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("visit request {request_id}")))
  }
}
