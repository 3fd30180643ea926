// Stockbot - Stock data models
//
// SECURITY: a credential's payload is never included in Debug output or log
// messages. Read it through `Credential::payload()` at the point of delivery.

use std::fmt;

use zeroize::Zeroizing;

use super::StoreError;

/// Separator between the two halves of an account payload.
pub const PAYLOAD_DELIMITER: char = ':';

/// Separator between accounts in a bulk-add argument.
pub const BATCH_DELIMITER: char = ',';

/// A lower-cased service label such as `netflix`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    /// Normalize a raw service name. Surrounding whitespace is dropped and
    /// the result is lower-cased so that lookups are case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(StoreError::EmptyService);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form with the first letter upper-cased (`netflix` -> `Netflix`).
    pub fn display_name(&self) -> String {
        capitalize(&self.0)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-case the first character of `s`, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A validated, not yet stored account payload.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountPayload(String);

impl AccountPayload {
    /// Validate a single `email:password` entry. Both sides of the first
    /// delimiter must be non-empty; the entry is otherwise kept verbatim.
    pub fn parse(entry: &str) -> Option<Self> {
        let (left, right) = entry.split_once(PAYLOAD_DELIMITER)?;
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some(Self(entry.to_string()))
    }

    /// Parse a comma-separated batch. Any malformed entry rejects the whole
    /// batch so nothing is inserted.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, StoreError> {
        let mut payloads = Vec::new();
        for (i, entry) in raw.split(BATCH_DELIMITER).enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match Self::parse(entry) {
                Some(p) => payloads.push(p),
                None => {
                    return Err(StoreError::MalformedInput {
                        index: i + 1,
                        entry: entry.to_string(),
                    })
                }
            }
        }

        if payloads.is_empty() {
            return Err(StoreError::EmptyBatch);
        }
        Ok(payloads)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountPayload([REDACTED])")
    }
}

/// A credential that has been claimed and removed from stock.
pub struct Credential {
    pub id: i64,
    pub service: ServiceName,
    payload: Zeroizing<String>,
}

impl Credential {
    pub fn new(id: i64, service: ServiceName, payload: String) -> Self {
        Self {
            id,
            service,
            payload: Zeroizing::new(payload),
        }
    }

    /// The raw account payload, exactly as it was added.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("payload", &"[REDACTED]")
            .finish()
    }
}

/// Result of a bulk add: how many rows went in and the stock level after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restock {
    pub added: usize,
    pub total: u64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
