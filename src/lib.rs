//! dynaform - Dynamic Multi-Step Form Client
//!
//! Fetches a per-user form schema from the form service and walks the user
//! through it one section at a time, validating each section before moving
//! on and handing the merged values to a submission callback.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                           DYNAFORM                            │
//! │                                                               │
//! │  ┌──────────────┐      ┌──────────────┐     ┌──────────────┐  │
//! │  │   Console    │─────▶│   Session    │────▶│  ApiClient   │  │
//! │  │ (terminal)   │      │ (login/load) │     │ (/create-user│  │
//! │  └──────────────┘      └──────┬───────┘     │  /get-form)  │  │
//! │                               │             └──────────────┘  │
//! │                        ┌──────▼───────┐                       │
//! │                        │  FormState   │                       │
//! │                        │ (reducer)    │                       │
//! │                        └──────┬───────┘                       │
//! │         ┌─────────────────────┼─────────────────────┐         │
//! │  ┌──────▼───────┐      ┌──────▼───────┐     ┌───────▼──────┐  │
//! │  │ SectionView  │      │  Validation  │     │    Render    │  │
//! │  │ (progress)   │      │ (FieldError) │     │ (controls)   │  │
//! │  └──────────────┘      └──────────────┘     └──────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod output;
pub mod render;
pub mod schema;
pub mod section;
pub mod session;
pub mod validation;
pub mod values;

pub use api::{ApiClient, FormApi, DEFAULT_API_URL};
pub use config::Config;
pub use console::Console;
pub use error::{DynaformError, Result};
pub use form::{FormAction, FormEvent, FormState};
pub use output::{OutputFormat, Submission};
pub use schema::{FieldType, FormField, FormSchema, FormSection, User};
pub use session::{Credentials, Notice, Session, View};
pub use validation::{validate_field, validate_section, ErrorMap, FieldError};
pub use values::{set_option, toggle_option, FieldValue, FieldValues};
