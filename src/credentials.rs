//! API key resolution from an ordered list of named sources.
//!
//! The first source yielding a non-empty value wins. Build-time sources are
//! captured by the compiler (`option_env!`), runtime sources are read from the
//! process environment on every call, so a key exported after startup is
//! picked up by the next request.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::ServiceError;
use crate::util::secret_preview;

/// When a source's value is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceOrigin {
  BuildTime,
  Runtime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialSource {
  pub name: &'static str,
  pub origin: SourceOrigin,
}

impl CredentialSource {
  pub const fn build_time(name: &'static str) -> Self {
    Self { name, origin: SourceOrigin::BuildTime }
  }

  pub const fn runtime(name: &'static str) -> Self {
    Self { name, origin: SourceOrigin::Runtime }
  }

  pub fn label(&self) -> String {
    match self.origin {
      SourceOrigin::BuildTime => format!("build:{}", self.name),
      SourceOrigin::Runtime => format!("env:{}", self.name),
    }
  }
}

/// Precedence list, highest first.
pub const DEFAULT_SOURCES: [CredentialSource; 4] = [
  CredentialSource::build_time("GEMINI_API_KEY"),
  CredentialSource::build_time("GOOGLE_API_KEY"),
  CredentialSource::runtime("API_KEY"),
  CredentialSource::runtime("GEMINI_API_KEY"),
];

/// A resolved API key. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
  value: String,
  source: CredentialSource,
}

impl Credential {
  pub fn expose(&self) -> &str {
    &self.value
  }

  pub fn source(&self) -> CredentialSource {
    self.source
  }
}

impl std::fmt::Debug for Credential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credential")
      .field("value", &"[REDACTED]")
      .field("source", &self.source.label())
      .finish()
  }
}

pub type Lookup = Arc<dyn Fn(&CredentialSource) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct CredentialResolver {
  sources: Vec<CredentialSource>,
  lookup: Lookup,
}

impl CredentialResolver {
  pub fn new(sources: Vec<CredentialSource>, lookup: Lookup) -> Self {
    Self { sources, lookup }
  }

  /// Default precedence backed by the compiled-in and process environments.
  pub fn from_env() -> Self {
    Self::new(DEFAULT_SOURCES.to_vec(), Arc::new(env_lookup))
  }

  /// Walk the sources in order; first non-empty value wins.
  pub fn resolve(&self) -> Result<Credential, ServiceError> {
    for source in &self.sources {
      let Some(raw) = (self.lookup)(source) else { continue };
      let value = raw.trim();
      if value.is_empty() {
        continue;
      }
      info!(target: "gerund_master", source = %source.label(), key_preview = %secret_preview(value), "API key resolved");
      return Ok(Credential { value: value.to_string(), source: *source });
    }

    let checked: Vec<String> = self.sources.iter().map(|s| s.label()).collect();
    error!(target: "gerund_master", checked = ?checked, "No API key found");
    Err(ServiceError::CredentialMissing { checked })
  }

  /// Labels of the sources that currently hold a non-empty value.
  pub fn status(&self) -> Vec<String> {
    self.sources
      .iter()
      .filter(|s| (self.lookup)(*s).map(|v| !v.trim().is_empty()).unwrap_or(false))
      .map(|s| s.label())
      .collect()
  }
}

impl std::fmt::Debug for CredentialResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CredentialResolver").field("sources", &self.sources).finish()
  }
}

fn env_lookup(source: &CredentialSource) -> Option<String> {
  match source.origin {
    SourceOrigin::BuildTime => build_time_value(source.name).map(str::to_string),
    SourceOrigin::Runtime => std::env::var(source.name).ok(),
  }
}

// option_env! only takes literals.
fn build_time_value(name: &str) -> Option<&'static str> {
  match name {
    "GEMINI_API_KEY" => option_env!("GEMINI_API_KEY"),
    "GOOGLE_API_KEY" => option_env!("GOOGLE_API_KEY"),
    _ => None,
  }
}
