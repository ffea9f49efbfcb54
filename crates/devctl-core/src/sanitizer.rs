//! Mode-aware validation of custom command invocations.
//!
//! A custom command is checked in three fixed stages before anything is
//! handed to a shell:
//!
//! 1. **Template**: the raw command template from configuration.
//! 2. **Arguments**: every caller-supplied argument, independently.
//! 3. **Expanded**: the template after placeholder substitution.
//!
//! The active [`SanitizeMode`] decides which stages run and whether a
//! finding blocks. Warn mode logs every finding and lets the command run
//! anyway, so a dangerous command can still execute under Warn.

use crate::error::{DevctlError, Result};
use crate::expand::expand;
use crate::patterns::{self, Finding, PatternCategory};
use serde::Serialize;

pub const SANITIZE_MODE_VAR: &str = "DEVCTL_SANITIZE_MODE";

pub const BYPASS_HINT: &str = "To bypass sanitization entirely, rerun with \
     DEVCTL_SANITIZE_MODE=disabled (WARNING: this turns off ALL command injection checks)";

// ---------------------------------------------------------------------------
// SanitizeMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeMode {
    Disabled,
    Warn,
    #[default]
    Strict,
    /// Templates are administrator-authored and may use shell control
    /// structures; arguments and expansions are still enforced.
    Script,
}

/// Result of parsing a raw mode value. `unrecognized` carries the raw
/// value when it fell back to Strict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelection {
    pub mode: SanitizeMode,
    pub unrecognized: Option<String>,
}

impl SanitizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SanitizeMode::Disabled => "disabled",
            SanitizeMode::Warn => "warn",
            SanitizeMode::Strict => "strict",
            SanitizeMode::Script => "script",
        }
    }

    pub fn parse(raw: &str) -> ModeSelection {
        let mode = match raw.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" => SanitizeMode::Disabled,
            "warn" => SanitizeMode::Warn,
            "" | "strict" => SanitizeMode::Strict,
            "script" => SanitizeMode::Script,
            _ => {
                return ModeSelection {
                    mode: SanitizeMode::Strict,
                    unrecognized: Some(raw.to_string()),
                }
            }
        };
        ModeSelection {
            mode,
            unrecognized: None,
        }
    }

    /// Read the mode from `DEVCTL_SANITIZE_MODE`; unset means Strict.
    pub fn from_env() -> ModeSelection {
        let raw = std::env::var(SANITIZE_MODE_VAR).unwrap_or_default();
        Self::parse(&raw)
    }
}

impl std::fmt::Display for SanitizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Template,
    Arguments,
    Expanded,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::Template => "template",
            ValidationStage::Arguments => "arguments",
            ValidationStage::Expanded => "expanded",
        }
    }
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SanitizerConfig
// ---------------------------------------------------------------------------

/// `allow_pipes` and `allow_redirects` exempt their category at the
/// template and expanded stages only. Arguments always face the full catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SanitizerConfig {
    pub mode: SanitizeMode,
    pub allow_pipes: bool,
    pub allow_redirects: bool,
}

impl SanitizerConfig {
    pub fn new(mode: SanitizeMode) -> Self {
        Self {
            mode,
            allow_pipes: false,
            allow_redirects: false,
        }
    }

    pub fn with_allow_pipes(mut self, allow: bool) -> Self {
        self.allow_pipes = allow;
        self
    }

    pub fn with_allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of a stage that did not block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    /// The stage does not run in the current mode.
    Skipped,
    /// Warn mode found dangerous constructs and let them through.
    Warned(Vec<Finding>),
}

impl Verdict {
    pub fn findings(&self) -> &[Finding] {
        match self {
            Verdict::Warned(findings) => findings,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Sanitizer
// ---------------------------------------------------------------------------

/// Immutable for its lifetime; build one per process run and pass it
/// down to whatever dispatches commands.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        if config.mode == SanitizeMode::Disabled {
            tracing::warn!(
                "command sanitization is DISABLED ({SANITIZE_MODE_VAR}=disabled); \
                 custom commands run without injection checks"
            );
        }
        Self { config }
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    pub fn mode(&self) -> SanitizeMode {
        self.config.mode
    }

    /// Validate one stage of invoking `template` with `args`.
    ///
    /// The Expanded stage substitutes `args` into `template` itself so the
    /// Script-mode comparison against the template applies, which keeps a
    /// Template, Arguments, Expanded sequence in agreement with [`prepare`].
    ///
    /// [`prepare`]: Sanitizer::prepare
    pub fn validate(
        &self,
        stage: ValidationStage,
        template: &str,
        args: &[String],
    ) -> Result<Verdict> {
        match stage {
            ValidationStage::Template => self.validate_template(template),
            ValidationStage::Arguments => self.validate_arguments(args),
            ValidationStage::Expanded => {
                if self.config.mode == SanitizeMode::Disabled {
                    return Ok(Verdict::Skipped);
                }
                let expanded = expand(template, args)?;
                self.validate_expanded(template, &expanded)
            }
        }
    }

    pub fn validate_template(&self, template: &str) -> Result<Verdict> {
        if matches!(self.config.mode, SanitizeMode::Disabled | SanitizeMode::Script) {
            return Ok(Verdict::Skipped);
        }
        self.check(ValidationStage::Template, template, self.restricted(template))
    }

    pub fn validate_arguments(&self, args: &[String]) -> Result<Verdict> {
        if self.config.mode == SanitizeMode::Disabled {
            return Ok(Verdict::Skipped);
        }
        let mut warned = Vec::new();
        for arg in args {
            if let Verdict::Warned(findings) =
                self.check(ValidationStage::Arguments, arg, patterns::scan(arg))?
            {
                warned.extend(findings);
            }
        }
        if warned.is_empty() {
            Ok(Verdict::Clean)
        } else {
            Ok(Verdict::Warned(warned))
        }
    }

    /// In Script mode only constructs the template did not already
    /// contain count against the expansion.
    pub fn validate_expanded(&self, template: &str, expanded: &str) -> Result<Verdict> {
        if self.config.mode == SanitizeMode::Disabled {
            return Ok(Verdict::Skipped);
        }
        let mut findings = self.restricted(expanded);
        if self.config.mode == SanitizeMode::Script {
            findings = emergent(self.restricted(template), findings);
        }
        self.check(ValidationStage::Expanded, expanded, findings)
    }

    /// Run all three stages in order and return the final command string.
    pub fn prepare(&self, template: &str, args: &[String]) -> Result<String> {
        if self.config.mode == SanitizeMode::Disabled {
            return expand(template, args);
        }
        self.validate_template(template)?;
        self.validate_arguments(args)?;
        let expanded = expand(template, args)?;
        self.validate_expanded(template, &expanded)?;
        Ok(expanded)
    }

    /// Catalog findings minus the categories this config exempts.
    fn restricted(&self, input: &str) -> Vec<Finding> {
        patterns::scan(input)
            .into_iter()
            .filter(|f| match f.category {
                PatternCategory::PipeOperator => !self.config.allow_pipes,
                PatternCategory::Redirection => !self.config.allow_redirects,
                _ => true,
            })
            .collect()
    }

    fn check(&self, stage: ValidationStage, input: &str, findings: Vec<Finding>) -> Result<Verdict> {
        if findings.is_empty() {
            return Ok(Verdict::Clean);
        }
        match self.config.mode {
            SanitizeMode::Disabled => Ok(Verdict::Skipped),
            SanitizeMode::Warn => {
                for f in &findings {
                    tracing::warn!(
                        stage = %stage,
                        category = %f.category,
                        fragment = %f.fragment.escape_debug(),
                        "dangerous shell construct allowed by warn mode"
                    );
                }
                Ok(Verdict::Warned(findings))
            }
            SanitizeMode::Strict | SanitizeMode::Script => {
                let first = &findings[0];
                Err(DevctlError::Validation {
                    stage,
                    category: first.category,
                    fragment: first.fragment.escape_debug().to_string(),
                    input: input.escape_debug().to_string(),
                })
            }
        }
    }
}

/// Drop one finding per occurrence the template already accounts for.
fn emergent(template_findings: Vec<Finding>, expanded: Vec<Finding>) -> Vec<Finding> {
    let mut budget = std::collections::BTreeMap::new();
    for f in template_findings {
        *budget.entry(f.category).or_insert(0usize) += 1;
    }
    expanded
        .into_iter()
        .filter(|f| match budget.get_mut(&f.category) {
            Some(n) if *n > 0 => {
                *n -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
