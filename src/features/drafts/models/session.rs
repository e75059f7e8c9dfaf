use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ReportDraft;
use crate::core::config::MapSettings;
use crate::core::error::{AppError, Result};
use crate::shared::validation::FieldError;

/// The four ordered wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Details,
    Location,
    Media,
    Review,
}

impl WizardStep {
    /// 1-based position shown to the user
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Details => 1,
            WizardStep::Location => 2,
            WizardStep::Media => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => Some(WizardStep::Location),
            WizardStep::Location => Some(WizardStep::Media),
            WizardStep::Media => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => None,
            WizardStep::Location => Some(WizardStep::Details),
            WizardStep::Media => Some(WizardStep::Location),
            WizardStep::Review => Some(WizardStep::Media),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WizardStep::Details => "details",
            WizardStep::Location => "location",
            WizardStep::Media => "media",
            WizardStep::Review => "review",
        };
        write!(f, "{}", s)
    }
}

/// Map component state; loaded once, the first time the location step is shown
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MapState {
    #[default]
    NotLoaded,
    Loaded(MapSettings),
}

impl MapState {
    /// Returns true only on the call that performed the load
    pub fn ensure_loaded(&mut self, settings: &MapSettings) -> bool {
        match self {
            MapState::Loaded(_) => false,
            MapState::NotLoaded => {
                *self = MapState::Loaded(settings.clone());
                true
            }
        }
    }

    pub fn settings(&self) -> Option<&MapSettings> {
        match self {
            MapState::Loaded(settings) => Some(settings),
            MapState::NotLoaded => None,
        }
    }
}

/// One wizard instance and the draft it exclusively owns
#[derive(Debug)]
pub struct WizardSession {
    pub id: Uuid,
    pub draft: ReportDraft,
    step: WizardStep,
    map: MapState,
    submitting: bool,
    created_at: DateTime<Utc>,
    last_touched: Instant,
}

impl WizardSession {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            draft: ReportDraft::default(),
            step: WizardStep::Details,
            map: MapState::NotLoaded,
            submitting: false,
            created_at: Utc::now(),
            last_touched: Instant::now(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn map(&self) -> &MapState {
        &self.map
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_touched = now;
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    /// Draft mutations are refused while a submission is in flight
    pub fn ensure_editable(&self) -> Result<()> {
        if self.submitting {
            return Err(AppError::Conflict(
                "The report is being submitted; please wait".to_string(),
            ));
        }
        Ok(())
    }

    /// Move forward one step if the current step's fields are valid
    pub fn advance(&mut self, map_settings: &MapSettings) -> Result<WizardStep> {
        self.ensure_editable()?;

        let gate = match self.step {
            WizardStep::Details => self.draft.validate_details(),
            WizardStep::Location => self.draft.validate_location(),
            WizardStep::Media | WizardStep::Review => Ok(()),
        };
        if let Err(errors) = gate {
            return Err(AppError::InvalidFields(FieldError::from_validation_errors(
                &errors,
            )));
        }

        let next = self.step.next().ok_or_else(|| {
            AppError::Validation("Already at the review step; submit the report".to_string())
        })?;
        self.step = next;
        if next == WizardStep::Location {
            self.map.ensure_loaded(map_settings);
        }
        Ok(next)
    }

    /// Move back one step; draft contents are kept
    pub fn retreat(&mut self) -> Result<WizardStep> {
        self.ensure_editable()?;
        let prev = self
            .step
            .prev()
            .ok_or_else(|| AppError::Validation("Already at the first step".to_string()))?;
        self.step = prev;
        Ok(prev)
    }

    /// Mark the draft as submitting once it is on the review step and complete
    pub fn begin_submission(&mut self) -> Result<()> {
        if self.submitting {
            return Err(AppError::Conflict(
                "This report is already being submitted".to_string(),
            ));
        }
        if self.step != WizardStep::Review {
            return Err(AppError::Validation(
                "Reports can only be submitted from the review step".to_string(),
            ));
        }
        self.draft
            .validate_for_submit()
            .map_err(AppError::InvalidFields)?;
        self.submitting = true;
        Ok(())
    }

    /// Leave the submitting state. On success the session starts over with an
    /// empty draft; returns how many previews were released.
    pub fn finish_submission(&mut self, succeeded: bool) -> usize {
        self.submitting = false;
        if succeeded {
            self.reset()
        } else {
            0
        }
    }

    /// Fresh draft at step 1. The map stays loaded.
    pub fn reset(&mut self) -> usize {
        let released = self.draft.media.teardown();
        self.draft = ReportDraft::default();
        self.step = WizardStep::Details;
        released
    }

    /// Release every outstanding preview before the session is dropped
    pub fn teardown(&mut self) -> usize {
        self.draft.media.teardown()
    }
}
