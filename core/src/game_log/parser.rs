use regex::Regex;
use std::sync::LazyLock;

use nabber_types::{AppConfig, DEFAULT_NOISE_PATTERNS};

use super::line::ParsedLine;
use super::registry::{Registry, RegistryError};

/// `[<timestamp>][<frame>]<module>: <body>`
static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]*)\]\[.*?\]([a-zA-Z0-9]+): (.*)$").expect("envelope pattern is valid")
});

/// Why a raw line never reached classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not in the `[timestamp][frame]Module: body` form.
    Malformed,
    /// Structurally valid, but the body matched a noise pattern.
    Noise,
}

/// Turns raw log lines into classified [`ParsedLine`]s.
///
/// Stateless after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct LineParser {
    registry: Registry,
    noise: Vec<Regex>,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}

impl LineParser {
    pub fn new(registry: Registry) -> Self {
        let noise = DEFAULT_NOISE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("default noise pattern is valid"))
            .collect();
        Self { registry, noise }
    }

    pub fn with_noise_patterns<S: AsRef<str>>(
        registry: Registry,
        patterns: &[S],
    ) -> Result<Self, RegistryError> {
        let noise = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| RegistryError::InvalidNoisePattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { registry, noise })
    }

    /// Parser with the configured pattern overrides and noise list.
    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        let registry = Registry::with_overrides(&config.patterns)?;
        Self::with_noise_patterns(registry, config.noise_patterns.as_slice())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse one raw line. `None` means the line was rejected (malformed or
    /// noise); unrecognised or undecodable lines are still returned.
    pub fn parse(&self, line_number: u64, line: &str) -> Option<ParsedLine> {
        self.inspect(line_number, line).ok()
    }

    /// Like [`parse`](Self::parse) but reports why a line was rejected.
    pub fn inspect(&self, line_number: u64, line: &str) -> Result<ParsedLine, Rejection> {
        let line = line.trim_end_matches(['\r', '\n']);
        let caps = ENVELOPE.captures(line).ok_or(Rejection::Malformed)?;

        let body = caps.get(3).map_or("", |m| m.as_str());
        if self.is_noise(body) {
            return Err(Rejection::Noise);
        }

        let classification = self.registry.classify(body);
        if let Some(err) = &classification.error {
            tracing::debug!(
                line = line_number,
                kind = %classification.kind,
                error = %err,
                "Failed to decode log line"
            );
        }

        Ok(ParsedLine {
            line_number,
            timestamp: caps.get(1).map_or("", |m| m.as_str()).to_string(),
            module: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            body: body.to_string(),
            kind: classification.kind,
            payload: classification.payload,
            error: classification.error,
        })
    }

    fn is_noise(&self, body: &str) -> bool {
        self.noise.iter().any(|re| re.is_match(body))
    }
}
