//! Session shell
//!
//! Owns the authenticated user and switches between the login view and the
//! form. Schema loads are tagged with a [`RequestToken`]; a response whose
//! token is no longer current (a newer load started, or the user logged out)
//! is dropped instead of overwriting newer state.

use crate::api::FormApi;
use crate::error::{DynaformError, Result};
use crate::form::{FormAction, FormEvent, FormState};
use crate::schema::{FormResponse, User};

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both roll number and name";
pub const ACCOUNT_CREATED_MESSAGE: &str = "Account created successfully! You can now login.";
pub const SIGNUP_FAILED_MESSAGE: &str = "Sign up failed. Please try again.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load form data. Please Signup and try again.";

/// Tone of a login-view message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// Inline message shown on the login view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
    Failed(String),
}

impl Registration {
    pub fn notice(&self) -> Notice {
        match self {
            Registration::Created => Notice::new(NoticeKind::Success, ACCOUNT_CREATED_MESSAGE),
            Registration::AlreadyExists => {
                Notice::new(NoticeKind::Info, crate::api::USER_EXISTS_MESSAGE)
            }
            Registration::Failed(message) => Notice::new(NoticeKind::Error, message.clone()),
        }
    }
}

/// Raw login form inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub roll_number: String,
    pub name: String,
}

impl Credentials {
    pub fn new(roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            name: name.into(),
        }
    }

    /// Both inputs must be non-blank
    pub fn to_user(&self) -> std::result::Result<User, Notice> {
        let roll_number = self.roll_number.trim();
        let name = self.name.trim();
        if roll_number.is_empty() || name.is_empty() {
            return Err(Notice::new(NoticeKind::Error, MISSING_CREDENTIALS_MESSAGE));
        }
        Ok(User::new(roll_number, name))
    }
}

/// Identifies one schema load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// What the shell is showing
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Login { notice: Option<Notice> },
    Loading { token: RequestToken },
    Form(FormState),
    LoadFailed { message: String },
}

/// Session shell state
#[derive(Debug)]
pub struct Session {
    user: Option<User>,
    view: View,
    last_token: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            user: None,
            view: View::Login { notice: None },
            last_token: 0,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn form(&self) -> Option<&FormState> {
        match &self.view {
            View::Form(state) => Some(state),
            _ => None,
        }
    }

    /// Register an account. Never changes who is logged in.
    pub async fn register(&mut self, api: &dyn FormApi, credentials: &Credentials) -> Notice {
        let user = match credentials.to_user() {
            Ok(user) => user,
            Err(notice) => return self.show_notice(notice),
        };

        let outcome = match api.create_user(&user).await {
            Ok(()) => Registration::Created,
            Err(e) if e.is_conflict() => Registration::AlreadyExists,
            Err(DynaformError::Server { message, .. }) => Registration::Failed(message),
            Err(e) => {
                tracing::warn!("Registration of {} failed: {}", user.roll_number, e);
                Registration::Failed(SIGNUP_FAILED_MESSAGE.into())
            }
        };
        tracing::info!("Registration of {}: {:?}", user.roll_number, outcome);
        self.show_notice(outcome.notice())
    }

    /// Accept the identity locally; no server round-trip
    pub fn login(&mut self, credentials: &Credentials) -> std::result::Result<&User, Notice> {
        let user = match credentials.to_user() {
            Ok(user) => user,
            Err(notice) => {
                self.show_notice(notice.clone());
                return Err(notice);
            }
        };
        tracing::info!("Logged in as {}", user.roll_number);
        Ok(&*self.user.insert(user))
    }

    /// Drop the user and everything fetched for them
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("Logged out {}", user.roll_number);
        }
        self.view = View::Login { notice: None };
    }

    /// Enter the loading view and hand out the token its response must carry
    pub fn begin_load(&mut self) -> Option<RequestToken> {
        self.user.as_ref()?;
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.view = View::Loading { token };
        Some(token)
    }

    /// Apply a schema response. Returns false if the response was stale.
    pub fn finish_load(&mut self, token: RequestToken, result: Result<FormResponse>) -> bool {
        match self.view {
            View::Loading { token: current } if current == token => {}
            _ => {
                tracing::warn!("Discarding stale form response {:?}", token);
                return false;
            }
        }

        self.view = match result.and_then(|r| FormState::new(r.form)) {
            Ok(state) => View::Form(state),
            Err(e) => {
                tracing::error!("Failed to load form: {}", e);
                View::LoadFailed {
                    message: LOAD_FAILED_MESSAGE.into(),
                }
            }
        };
        true
    }

    /// Fetch the logged-in user's form. Also serves as the retry path.
    pub async fn load_form(&mut self, api: &dyn FormApi) -> bool {
        let Some(token) = self.begin_load() else {
            return false;
        };
        let roll_number = match &self.user {
            Some(user) => user.roll_number.clone(),
            None => return false,
        };
        let result = api.get_form(&roll_number).await;
        self.finish_load(token, result)
    }

    /// Forward an action to the form, if one is showing
    pub fn dispatch(&mut self, action: FormAction) -> Option<FormEvent> {
        let view = std::mem::replace(&mut self.view, View::Login { notice: None });
        match view {
            View::Form(state) => {
                let (state, event) = state.dispatch(action);
                self.view = View::Form(state);
                event
            }
            other => {
                tracing::warn!("No form to apply {:?} to", action);
                self.view = other;
                None
            }
        }
    }

    fn show_notice(&mut self, notice: Notice) -> Notice {
        if matches!(self.view, View::Login { .. }) {
            self.view = View::Login {
                notice: Some(notice.clone()),
            };
        }
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubApi;
    use crate::schema::fixtures::two_step;
    use crate::values::FieldValue;

    #[test]
    fn test_blank_credentials_blocked() {
        let api = StubApi::new(200, None);
        let mut session = Session::new();

        let notice = tokio_test::block_on(session.register(&api, &Credentials::new(" ", "Al")));
        assert_eq!(notice.message, MISSING_CREDENTIALS_MESSAGE);
        assert!(api.created.lock().unwrap().is_empty());

        let err = session.login(&Credentials::new("R1", "")).unwrap_err();
        assert_eq!(err.kind, NoticeKind::Error);
        assert!(!session.is_authenticated());
        assert_eq!(session.view(), &View::Login { notice: Some(err) });
    }

    #[test]
    fn test_registration_outcomes() {
        let creds = Credentials::new("R1", "Al");
        let mut session = Session::new();

        let created = tokio_test::block_on(session.register(&StubApi::new(201, None), &creds));
        assert_eq!(created.kind, NoticeKind::Success);
        assert_eq!(created.message, ACCOUNT_CREATED_MESSAGE);

        let exists = tokio_test::block_on(session.register(&StubApi::new(409, None), &creds));
        assert_eq!(exists.kind, NoticeKind::Info);
        assert_eq!(exists.message, crate::api::USER_EXISTS_MESSAGE);

        let failed = tokio_test::block_on(session.register(&StubApi::new(500, None), &creds));
        assert_eq!(failed.kind, NoticeKind::Error);
        assert_ne!(failed.message, exists.message);

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_and_load() {
        let api = StubApi::new(200, Some(two_step()));
        let mut session = Session::new();
        let user = session.login(&Credentials::new(" R1 ", "Al")).unwrap().clone();
        assert_eq!(user, User::new("R1", "Al"));

        assert!(session.load_form(&api).await);
        let form = session.form().unwrap();
        assert_eq!(form.values().get("name"), Some(&FieldValue::Text(String::new())));

        let event = session.dispatch(FormAction::Next);
        assert!(matches!(event, Some(FormEvent::Blocked { .. })));
    }

    #[tokio::test]
    async fn test_load_failure_and_retry() {
        let mut session = Session::new();
        session.login(&Credentials::new("R1", "Al")).unwrap();

        assert!(session.load_form(&StubApi::new(200, None)).await);
        assert_eq!(
            session.view(),
            &View::LoadFailed { message: LOAD_FAILED_MESSAGE.into() }
        );

        assert!(session.load_form(&StubApi::new(200, Some(two_step()))).await);
        assert!(session.form().is_some());
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut session = Session::new();
        assert_eq!(session.begin_load(), None);

        session.login(&Credentials::new("R1", "Al")).unwrap();
        let first = session.begin_load().unwrap();
        let second = session.begin_load().unwrap();
        assert!(second > first);

        let response = || {
            Ok(FormResponse {
                message: "ok".into(),
                form: two_step(),
            })
        };
        assert!(!session.finish_load(first, response()));
        assert_eq!(session.view(), &View::Loading { token: second });

        session.logout();
        assert!(!session.finish_load(second, response()));
        assert_eq!(session.view(), &View::Login { notice: None });
        assert!(session.user().is_none());
    }
}
