//! Validated, persisted status changes

use crate::error::PersistenceError;
use crate::services::EntityService;
use crate::types::{BoardItem, RoleId, Status, StatusId};
use crate::workflow::StatusTransitionValidator;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Reason given when the workflow forbids a move
pub const ILLEGAL_TRANSITION: &str = "illegal transition";
/// Reason given when the stored entity changed or vanished underneath us
pub const CONFLICT_RELOAD: &str = "conflict — reload required";

/// Result of [`StatusUpdateCoordinator::attempt_transition`]
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome<T> {
    /// Saved. `entity` is the stored copy; the caller moves the card now.
    Applied {
        entity: T,
        from: Option<StatusId>,
        to: Status,
    },
    /// Target equals the current status; nothing was saved
    Unchanged,
    /// Not allowed by the workflow or refused by the store's business rules
    Rejected { reason: String },
    /// Someone else modified the entity; reload it
    Conflict { reason: String },
    /// The entity no longer exists; drop it from the board
    Missing { reason: String },
    /// Configuration problem or unexpected store failure
    Failed { reason: String },
}

impl<T> TransitionOutcome<T> {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Applied { .. } | Self::Unchanged => None,
            Self::Rejected { reason }
            | Self::Conflict { reason }
            | Self::Missing { reason }
            | Self::Failed { reason } => Some(reason),
        }
    }

    /// Whether the caller must refresh the entity from its source
    pub fn needs_reload(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Missing { .. })
    }
}

/// The transaction boundary for status changes.
///
/// Validates against the workflow, applies the status to a copy, saves the
/// copy. The caller's entity is never modified, so a failed save leaves
/// nothing to roll back.
pub struct StatusUpdateCoordinator<T: BoardItem> {
    validator: StatusTransitionValidator,
    service: Arc<dyn EntityService<T>>,
    role: Option<RoleId>,
    clock: fn() -> NaiveDate,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl<T: BoardItem> StatusUpdateCoordinator<T> {
    pub fn new(validator: StatusTransitionValidator, service: Arc<dyn EntityService<T>>) -> Self {
        Self {
            validator,
            service,
            role: None,
            clock: today,
        }
    }

    /// Enforce role restrictions on workflow edges for this role
    pub fn with_role(mut self, role: Option<RoleId>) -> Self {
        self.role = role;
        self
    }

    /// Replace the source of "today" used for completion dates
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn validator(&self) -> &StatusTransitionValidator {
        &self.validator
    }

    pub async fn attempt_transition(&self, entity: &T, target: &StatusId) -> TransitionOutcome<T> {
        if entity.status() == Some(target) {
            return TransitionOutcome::Unchanged;
        }

        let valid = match self
            .validator
            .valid_next_statuses_for_role(entity, self.role.as_ref())
        {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(entity = %entity.id(), error = %e, "cannot evaluate transition");
                return TransitionOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        let Some(status) = valid.into_iter().find(|s| &s.id == target) else {
            tracing::warn!(
                entity = %entity.id(),
                from = ?entity.status(),
                to = %target,
                "transition rejected by workflow"
            );
            return TransitionOutcome::Rejected {
                reason: ILLEGAL_TRANSITION.to_string(),
            };
        };

        let mut candidate = entity.clone();
        candidate.apply_status(&status, (self.clock)());
        let from = entity.status().cloned();

        match self.service.save(candidate).await {
            Ok(saved) => {
                tracing::info!(entity = %saved.id(), from = ?from, to = %status.id, "transition applied");
                TransitionOutcome::Applied {
                    entity: saved,
                    from,
                    to: status,
                }
            }
            Err(PersistenceError::Validation { message }) => {
                tracing::warn!(entity = %entity.id(), %message, "transition refused by store");
                TransitionOutcome::Rejected { reason: message }
            }
            Err(PersistenceError::Concurrency { .. }) => {
                tracing::warn!(entity = %entity.id(), "concurrent modification");
                TransitionOutcome::Conflict {
                    reason: CONFLICT_RELOAD.to_string(),
                }
            }
            Err(PersistenceError::NotFound { .. }) => {
                tracing::warn!(entity = %entity.id(), "entity vanished during transition");
                TransitionOutcome::Missing {
                    reason: CONFLICT_RELOAD.to_string(),
                }
            }
            Err(PersistenceError::Other { message }) => {
                tracing::error!(entity = %entity.id(), %message, "save failed");
                TransitionOutcome::Failed { reason: message }
            }
        }
    }
}
