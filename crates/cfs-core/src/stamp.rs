//! Parameter stamps: deterministic identifiers used as cache keys and file names.

use crate::config::Configuration;
use crate::errors::{CfsError, ErrorInfo};
use crate::hash::short_hash_string;

/// Derives the stamp of a configuration.
///
/// Implementations must be pure: configurations with equal
/// [`Configuration::relevant_fields`] yield equal stamps.
pub trait StampDeriver {
    /// Returns the stamp for `config`.
    fn derive(&self, config: &Configuration) -> Result<String, CfsError>;
}

impl<F> StampDeriver for F
where
    F: Fn(&Configuration) -> Result<String, CfsError>,
{
    fn derive(&self, config: &Configuration) -> Result<String, CfsError> {
        self(config)
    }
}

/// Default deriver: `<protocol>--<methods>--<digest>`.
///
/// The readable prefix makes cached artifacts recognisable on disk; the
/// digest over the relevant fields keeps pass-through options apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamStamp {
    digest_bytes: usize,
}

impl ParamStamp {
    /// Digest length used by [`ParamStamp::default`].
    pub const DEFAULT_DIGEST_BYTES: usize = 6;

    /// Deriver keeping `digest_bytes` bytes of the SHA-256 digest.
    pub fn new(digest_bytes: usize) -> Self {
        Self {
            digest_bytes: digest_bytes.max(1),
        }
    }
}

impl Default for ParamStamp {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIGEST_BYTES)
    }
}

impl StampDeriver for ParamStamp {
    fn derive(&self, config: &Configuration) -> Result<String, CfsError> {
        let digest = short_hash_string(&config.relevant_fields(), self.digest_bytes)
            .map_err(|err| {
                CfsError::Stamp(
                    ErrorInfo::new("stamp-digest", "failed to hash relevant fields")
                        .with_hint(err.to_string()),
                )
            })?;
        let stamp = format!(
            "{}--{}--{}",
            sanitize(&config.protocol_label()),
            sanitize(&config.method_tag()),
            digest
        );
        validate_stamp(&stamp)?;
        Ok(stamp)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Rejects stamps that cannot be used as a file name component.
pub fn validate_stamp(stamp: &str) -> Result<(), CfsError> {
    if stamp.is_empty() {
        return Err(CfsError::Stamp(ErrorInfo::new(
            "stamp-empty",
            "parameter stamp is empty",
        )));
    }
    if stamp == "." || stamp == ".." || stamp.contains(['/', '\\', '\0']) {
        return Err(CfsError::Stamp(
            ErrorInfo::new("stamp-unsafe", "parameter stamp is not a valid file name")
                .with_context("stamp", stamp),
        ));
    }
    Ok(())
}
