use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use zeroize::Zeroizing;

use crate::adapter::{self, UnsealRequest, UnsealResponse};
use crate::cli::{OutputFormat, TokenAction};
use crate::coordinator::{Coordinator, KeySlot};
use crate::domain::SealConfig;
use crate::error::UnsealError;
use crate::session::SessionStore;

/// Builds a sealed coordinator from a seal configuration file
///
/// The returned slot receives the master key once unsealed.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded
pub fn open_coordinator(config_path: &Path) -> Result<(Coordinator, Arc<KeySlot>)> {
    let config = SealConfig::load(config_path)?;
    let slot = Arc::new(KeySlot::new());
    Ok((Coordinator::new(config, Arc::clone(&slot)), slot))
}

/// Renders a response in the requested format
///
/// # Errors
/// Returns an error if JSON serialization fails
pub fn render(response: &UnsealResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(response.status.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(response).context("Failed to serialize seal status")
        }
    }
}

/// Seal parameters as recorded in the configuration file
///
/// Unseal progress lives only inside a running coordinator, so a standalone
/// invocation can report the configuration and nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SealSummary {
    pub share_count: u8,
    pub threshold: u8,
    pub key_length: u16,
}

impl From<&SealConfig> for SealSummary {
    fn from(config: &SealConfig) -> Self {
        Self {
            share_count: *config.share_count(),
            threshold: *config.threshold(),
            key_length: *config.key_length(),
        }
    }
}

impl std::fmt::Display for SealSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Key Shares: {}", self.share_count)?;
        writeln!(f, "Key Threshold: {}", self.threshold)?;
        write!(f, "Key Length: {}", self.key_length)
    }
}

/// Loads and validates a seal configuration and renders its parameters
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or serialized
pub fn describe(config_path: &Path, format: OutputFormat) -> Result<String> {
    let summary = SealSummary::from(&SealConfig::load(config_path)?);
    match format {
        OutputFormat::Text => Ok(summary.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&summary).context("Failed to serialize seal configuration")
        }
    }
}

/// Runs an unseal session against `coordinator`
///
/// Applies `reset` first. Shares given in `keys` are submitted in order and
/// any error aborts. Without `keys`, shares are pulled from `next_share`
/// until unsealed or an empty entry; errors are reported through `emit` and
/// entry continues, so a failed reconstruction can be retried in place.
///
/// Every resulting status is passed to `emit`. Returns the final response.
///
/// # Errors
/// Returns an error if a share given in `keys` is rejected, or if reading the
/// next share fails
pub fn unseal_session<F, E>(
    coordinator: &Coordinator,
    reset: bool,
    keys: &[Zeroizing<String>],
    mut next_share: F,
    mut emit: E,
) -> Result<UnsealResponse>
where
    F: FnMut() -> Result<Option<Zeroizing<String>>>,
    E: FnMut(&SessionEvent<'_>),
{
    let mut last = adapter::handle(coordinator, &UnsealRequest::default())?;

    if reset {
        last = adapter::handle(coordinator, &UnsealRequest::reset())?;
        emit(&SessionEvent::Status(&last));
    }

    if !keys.is_empty() {
        for key in keys {
            let request = UnsealRequest {
                key: Some(key.clone()),
                ..UnsealRequest::default()
            };
            last = adapter::handle(coordinator, &request).context("Error attempting unseal")?;
            emit(&SessionEvent::Status(&last));
        }
        return Ok(last);
    }

    while last.status.sealed {
        let Some(key) = next_share()? else {
            break;
        };
        if key.trim().is_empty() {
            break;
        }
        let request = UnsealRequest {
            key: Some(key),
            ..UnsealRequest::default()
        };
        match adapter::handle(coordinator, &request) {
            Ok(response) => {
                last = response;
                emit(&SessionEvent::Status(&last));
            }
            Err(err) => {
                emit(&SessionEvent::Rejected(&err));
                last.status = coordinator.status();
            }
        }
    }

    Ok(last)
}

/// Something an unseal session reports back to the operator
#[derive(Debug)]
pub enum SessionEvent<'a> {
    Status(&'a UnsealResponse),
    Rejected(&'a UnsealError),
}

/// Runs a token cache action
///
/// `store` reads the token from `input`. Returns what should be printed.
///
/// # Errors
/// Returns an error if the cache cannot be accessed or `store` gets no token
pub fn token(
    store: &SessionStore,
    session: &str,
    action: TokenAction,
    input: &mut impl BufRead,
) -> Result<Option<Zeroizing<String>>> {
    let cache = store.cache(session)?;
    match action {
        TokenAction::Get => cache.get(),
        TokenAction::Store => {
            let mut token = Zeroizing::new(String::new());
            input
                .read_line(&mut token)
                .context("Failed to read token from stdin")?;
            if token.trim().is_empty() {
                bail!("No token provided on stdin");
            }
            cache.store(token.trim())?;
            Ok(None)
        }
        TokenAction::Erase => {
            cache.erase()?;
            Ok(None)
        }
    }
}
