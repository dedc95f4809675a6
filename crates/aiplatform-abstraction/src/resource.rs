//! Resource names and the connection context forwarded to remote clients.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Location used when neither the name nor the context carries one.
pub const DEFAULT_LOCATION: &str = "us-central1";

const MODEL_NAME_TEMPLATE: &str = "projects/{project}/locations/{location}/models/{model}";
const EVALUATION_NAME_TEMPLATE: &str =
    "projects/{project}/locations/{location}/models/{model}/evaluations/{evaluation}";

static MODEL_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^projects/(?P<project>[^/]+)/locations/(?P<location>[^/]+)",
        r"/models/(?P<model>[^/]+)$",
    ))
    .expect("model name regex should be valid")
});

static EVALUATION_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^projects/(?P<project>[^/]+)/locations/(?P<location>[^/]+)",
        r"/models/(?P<model>[^/]+)/evaluations/(?P<evaluation>[^/]+)$",
    ))
    .expect("evaluation name regex should be valid")
});

static RESOURCE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("resource id regex should be valid"));

/// Failure to turn user input into a fully-qualified resource name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceNameError {
    /// Input looked like a path but did not match the expected shape.
    #[error("invalid resource name '{name}': expected {expected}")]
    Malformed {
        /// The rejected input.
        name: String,
        /// The expected path template.
        expected: &'static str,
    },

    /// A bare id containing characters the service never issues.
    #[error("invalid resource id '{0}': ids may only contain letters, digits, '-' and '_'")]
    InvalidId(String),

    /// A bare id was given without the parent needed to qualify it.
    #[error("{0} must be provided when passing a bare resource id")]
    MissingParent(&'static str),
}

fn validate_id(id: &str) -> Result<(), ResourceNameError> {
    if RESOURCE_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(ResourceNameError::InvalidId(id.to_string()))
    }
}

/// Bearer credentials forwarded verbatim to the service.
///
/// Token acquisition and refresh happen outside this workspace.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// Project, location and credentials used for remote calls.
///
/// Opaque to the resolver: it only qualifies bare ids with it and forwards
/// it to the clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionContext {
    pub project: Option<String>,
    pub location: Option<String>,
    pub credentials: Option<Credentials>,
}

impl ConnectionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The configured location, or [`DEFAULT_LOCATION`].
    #[must_use]
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    /// Copy of this context re-scoped to the project and location of `model`.
    #[must_use]
    pub fn scoped_to(&self, model: &ModelName) -> Self {
        Self {
            project: Some(model.project.clone()),
            location: Some(model.location.clone()),
            credentials: self.credentials.clone(),
        }
    }
}

/// `projects/{project}/locations/{location}/models/{model}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelName {
    pub project: String,
    pub location: String,
    pub model: String,
}

impl ModelName {
    pub fn parse(name: &str) -> Result<Self, ResourceNameError> {
        let caps = MODEL_NAME_REGEX
            .captures(name)
            .ok_or_else(|| ResourceNameError::Malformed {
                name: name.to_string(),
                expected: MODEL_NAME_TEMPLATE,
            })?;
        Ok(Self {
            project: caps["project"].to_string(),
            location: caps["location"].to_string(),
            model: caps["model"].to_string(),
        })
    }

    /// Qualify a model id (bare or fully-qualified) against `context`.
    pub fn resolve(model_id: &str, context: &ConnectionContext) -> Result<Self, ResourceNameError> {
        if model_id.contains('/') {
            return Self::parse(model_id);
        }
        validate_id(model_id)?;
        let project = context
            .project
            .clone()
            .ok_or(ResourceNameError::MissingParent("project"))?;
        Ok(Self {
            project,
            location: context.location_or_default().to_string(),
            model: model_id.to_string(),
        })
    }

    /// Collection path for the evaluations of this model.
    #[must_use]
    pub fn evaluations_path(&self) -> String {
        format!("{self}/evaluations")
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/models/{}",
            self.project, self.location, self.model
        )
    }
}

impl FromStr for ModelName {
    type Err = ResourceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `projects/{project}/locations/{location}/models/{model}/evaluations/{evaluation}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationName {
    pub model: ModelName,
    pub evaluation: String,
}

impl EvaluationName {
    pub fn parse(name: &str) -> Result<Self, ResourceNameError> {
        let caps = EVALUATION_NAME_REGEX
            .captures(name)
            .ok_or_else(|| ResourceNameError::Malformed {
                name: name.to_string(),
                expected: EVALUATION_NAME_TEMPLATE,
            })?;
        Ok(Self {
            model: ModelName {
                project: caps["project"].to_string(),
                location: caps["location"].to_string(),
                model: caps["model"].to_string(),
            },
            evaluation: caps["evaluation"].to_string(),
        })
    }

    /// Whether `name` is a path rather than a bare evaluation id.
    #[must_use]
    pub fn is_fully_qualified(name: &str) -> bool {
        name.contains('/')
    }

    /// Qualify an evaluation name.
    ///
    /// A fully-qualified name is used as is and `model_id` is ignored. A bare
    /// id needs `model_id`, and a bare `model_id` in turn needs a project in
    /// `context`.
    pub fn resolve(
        evaluation_name: &str,
        model_id: Option<&str>,
        context: &ConnectionContext,
    ) -> Result<Self, ResourceNameError> {
        if Self::is_fully_qualified(evaluation_name) {
            return Self::parse(evaluation_name);
        }
        validate_id(evaluation_name)?;
        let model_id = model_id.ok_or(ResourceNameError::MissingParent("model_id"))?;
        Ok(Self {
            model: ModelName::resolve(model_id, context)?,
            evaluation: evaluation_name.to_string(),
        })
    }
}

impl fmt::Display for EvaluationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/evaluations/{}", self.model, self.evaluation)
    }
}

impl FromStr for EvaluationName {
    type Err = ResourceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
