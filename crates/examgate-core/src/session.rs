//! Session and attempt lifecycle.
//!
//! Drives the student-facing flow: authentication, one-attempt gating,
//! answer capture, anti-cheat monitoring, and the hand-off to the grading
//! orchestrator. The session is an explicit state value threaded through the
//! controller's calls; phases only move forward, and the grading latch is
//! the mutual-exclusion mechanism that makes grading fire at most once.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{SessionError, StoreError};
use crate::grader::GradingOrchestrator;
use crate::model::{Submission, Test};
use crate::traits::{AuthenticatedUser, Authenticator, DocumentStore};

/// Visibility-loss events tolerated before the attempt is auto-submitted.
pub const MAX_TAB_SWITCHES: u32 = 3;

/// Where a session is in its lifecycle. Forward-only; `Submitted` and
/// `Blocked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    Authenticating,
    AttemptCheck,
    InProgress,
    Grading,
    Submitted,
    Blocked,
}

/// Whether the student is signing in to an existing account or creating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Everything a start-test request carries.
#[derive(Debug, Clone)]
pub struct StartTestRequest {
    pub test_id: String,
    pub email: String,
    pub password: String,
    /// Shown on reports; falls back to the email when absent (login mode
    /// typically omits it).
    pub display_name: Option<String>,
    pub mode: AuthMode,
}

/// Ephemeral, process-local state for one client session. Created at auth
/// start, destroyed at a terminal phase or on client close.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    phase: Phase,
    user: Option<AuthenticatedUser>,
    display_name: Option<String>,
    /// Loaded exactly once when the attempt check passes; never populated on
    /// the Blocked path.
    test: Option<Test>,
    answers: BTreeMap<u32, String>,
    tab_switches: u32,
    /// Checked-and-set before any grading attempt; released only if
    /// persisting the submission fails.
    grading_triggered: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Unauthenticated,
            user: None,
            display_name: None,
            test: None,
            answers: BTreeMap::new(),
            tab_switches: 0,
            grading_triggered: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The immutable test snapshot, available only once `InProgress`.
    pub fn test(&self) -> Option<&Test> {
        self.test.as_ref()
    }

    pub fn answers(&self) -> &BTreeMap<u32, String> {
        &self.answers
    }

    pub fn tab_switches(&self) -> u32 {
        self.tab_switches
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates session lifecycle against the store, the identity provider,
/// and the grading orchestrator.
///
/// Single-threaded per session: the caller drives one session from one task,
/// so no two phase transitions execute concurrently for it.
pub struct SessionController {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn Authenticator>,
    orchestrator: GradingOrchestrator,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn Authenticator>,
        orchestrator: GradingOrchestrator,
    ) -> Self {
        Self {
            store,
            auth,
            orchestrator,
        }
    }

    /// Start a test session: verify the test exists and is open, then the
    /// credentials, then the one-attempt rule.
    ///
    /// Test availability is checked first so a dead test id never costs an
    /// auth call. Returns the resulting phase: `InProgress` with the
    /// snapshot loaded, or `Blocked` ("already attempted") with no test
    /// content revealed. On error the session is left mid-flight and should
    /// be discarded.
    pub async fn start(
        &self,
        session: &mut Session,
        request: StartTestRequest,
    ) -> Result<Phase, SessionError> {
        if session.phase != Phase::Unauthenticated {
            return Err(SessionError::NotInProgress(session.phase));
        }

        let test = self
            .store
            .get_test_metadata(&request.test_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => SessionError::InvalidTestId(id),
                StoreError::TestClosed(id) => SessionError::TestClosed(id),
                other => SessionError::Store(other),
            })?;

        session.phase = Phase::Authenticating;
        let user = match request.mode {
            AuthMode::Login => self.auth.login(&request.email, &request.password).await,
            AuthMode::Register => self.auth.register(&request.email, &request.password).await,
        }
        .map_err(SessionError::AuthFailed)?;

        session.phase = Phase::AttemptCheck;
        session.user = Some(user);
        session.display_name = request.display_name;

        let attempted = self
            .store
            .has_already_attempted(&request.email, &request.test_id)
            .await
            .map_err(SessionError::Store)?;

        if attempted {
            tracing::info!(test_id = %request.test_id, "attempt conflict, blocking session");
            session.phase = Phase::Blocked;
        } else {
            session.test = Some(test);
            session.phase = Phase::InProgress;
        }
        Ok(session.phase)
    }

    /// Capture an answer, replacing any prior answer for that question
    /// number. Navigation between questions does not transition phase.
    pub fn record_answer(
        &self,
        session: &mut Session,
        question_number: u32,
        answer: String,
    ) -> Result<(), SessionError> {
        if session.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress(session.phase));
        }
        session.answers.insert(question_number, answer);
        Ok(())
    }

    /// Register one visibility-loss event. Crossing the threshold while
    /// still `InProgress` force-submits the attempt exactly once; later
    /// events are counted but trigger nothing.
    pub async fn visibility_lost(
        &self,
        session: &mut Session,
    ) -> Result<Option<Submission>, SessionError> {
        if session.phase != Phase::InProgress {
            return Ok(None);
        }
        session.tab_switches += 1;

        if session.tab_switches >= MAX_TAB_SWITCHES && !session.grading_triggered {
            tracing::warn!(
                session = %session.id,
                count = session.tab_switches,
                "tab-switch limit reached, forcing submission"
            );
            return self.do_submit(session).await.map(Some);
        }
        Ok(None)
    }

    /// Manual submission from the final question. Guarded by the same latch
    /// as the auto-submit path.
    pub async fn submit(&self, session: &mut Session) -> Result<Submission, SessionError> {
        if session.phase != Phase::InProgress || session.grading_triggered {
            return Err(SessionError::NotInProgress(session.phase));
        }
        self.do_submit(session).await
    }

    async fn do_submit(&self, session: &mut Session) -> Result<Submission, SessionError> {
        let (Some(test), Some(user)) = (session.test.clone(), session.user.clone()) else {
            return Err(SessionError::NotInProgress(session.phase));
        };

        session.grading_triggered = true;
        session.phase = Phase::Grading;

        let graded = self
            .orchestrator
            .grade(&test.questions, &session.answers)
            .await;

        let submission = Submission {
            id: Uuid::new_v4(),
            test_id: test.id.clone(),
            user_id: user.user_id.clone(),
            name: session
                .display_name
                .clone()
                .unwrap_or_else(|| user.email.clone()),
            email: user.email.clone(),
            responses: session.answers.clone(),
            calculated_score: Some(graded.calculated_score),
            detailed_analysis: Some(graded.detailed_analysis),
            submitted_at: Utc::now(),
        };

        match self.store.save_submission(&submission).await {
            Ok(()) => {
                session.phase = Phase::Submitted;
                Ok(submission)
            }
            Err(e) => {
                // Release the latch so the student can retry; recomputing on
                // retry is safe (the orchestrator is pure in its inputs).
                tracing::error!(session = %session.id, "failed to persist submission: {e}");
                session.grading_triggered = false;
                session.phase = Phase::InProgress;
                Err(SessionError::Persistence(e))
            }
        }
    }
}
