//! Claims intake wizard engine
//!
//! Drives the multi-step driver and third-party claim forms: per-step
//! validation, guarded navigation, and a single gated submission of the
//! whole record to the claims API.

pub mod attachments;
pub mod claims;
pub mod config;
pub mod error;
pub mod messaging;
pub mod record;
pub mod submit;
pub mod wizard;

pub use claims::{ClaimKind, DriverClaim, ThirdPartyClaim};
pub use config::Config;
pub use error::{AppResult, AttachmentError, ConfigError, DefinitionError, SubmitError};
pub use messaging::{EventBus, Notification, NotificationSink, WizardEvent};
pub use record::{DynamicRecord, FieldValue, FormRecord};
pub use submit::{Created, HttpSubmitEndpoint, SubmitEndpoint};
pub use wizard::{NavigationResult, StepDefinition, SubmitOutcome, WizardEngine};
