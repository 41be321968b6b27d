use url::Url;

/// Signup form state
///
/// A failed form can be submitted again, a succeeded one stays put.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Outcome of a submission as seen by the client
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The server answered, with this status code
    Responded(reqwest::StatusCode),
    /// The request never got an answer
    Unreachable(reqwest::Error),
}

/// Invalid state transition
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("A submission is already in flight")]
    AlreadySubmitting,
    #[error("The form has already been submitted successfully")]
    AlreadySubmitted,
    #[error("There is no submission in flight")]
    NotSubmitting,
}

/// Signup form
#[derive(Debug, Default)]
pub struct SignupForm {
    state: FormState,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &FormState {
        &self.state
    }

    /// Whether the "thank you" message should be shown
    pub const fn is_submitted(&self) -> bool {
        matches!(self.state, FormState::Succeeded)
    }

    /// Start a submission
    pub fn begin_submit(&mut self) -> Result<(), TransitionError> {
        match self.state {
            FormState::Idle | FormState::Failed(_) => {
                self.state = FormState::Submitting;
                Ok(())
            }
            FormState::Submitting => Err(TransitionError::AlreadySubmitting),
            FormState::Succeeded => Err(TransitionError::AlreadySubmitted),
        }
    }

    /// Settle the submission in flight
    pub fn complete(&mut self, outcome: &SubmitOutcome) -> Result<(), TransitionError> {
        if self.state != FormState::Submitting {
            return Err(TransitionError::NotSubmitting);
        }
        self.state = match outcome {
            SubmitOutcome::Responded(status) if status.is_success() => FormState::Succeeded,
            SubmitOutcome::Responded(status) => {
                FormState::Failed(format!("The server answered with {status}"))
            }
            SubmitOutcome::Unreachable(e) => FormState::Failed(e.to_string()),
        };
        Ok(())
    }

    /// Submit an email to the intake endpoint and settle the form
    #[tracing::instrument(name = "Submitting the signup form", skip(self, client))]
    pub async fn submit(
        &mut self,
        client: &reqwest::Client,
        base_url: &Url,
        email: &str,
    ) -> Result<&FormState, TransitionError> {
        self.begin_submit()?;

        let outcome = match base_url.join("subscribe") {
            Ok(url) => {
                match client
                    .post(url)
                    .json(&serde_json::json!({ "email": email }))
                    .send()
                    .await
                {
                    Ok(response) => SubmitOutcome::Responded(response.status()),
                    Err(e) => SubmitOutcome::Unreachable(e),
                }
            }
            Err(e) => {
                self.state = FormState::Failed(format!("Invalid base URL: {e}"));
                return Ok(&self.state);
            }
        };

        self.complete(&outcome)?;
        Ok(&self.state)
    }
}
