use rowan::TextRange;

/// Diagnostic kinds reported by entry-point resolution.
///
/// Resolution stops at the first failing check, so at most one is reported per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    NoMainClass,
    MainNotAClass,
    MainClassIsGeneric,
    NoMainMethod,
    InvalidMainSignature,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::NoMainClass => "no `Main` class found",
            Self::MainNotAClass => "`Main` must be a class",
            Self::MainClassIsGeneric => "`Main` cannot have type parameters",
            Self::NoMainMethod => "`Main` has no `main` method",
            Self::InvalidMainSignature => "invalid signature for `main`",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::MainNotAClass => "`Main` must be a class, found {}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Location underlined in output; `None` for program-wide diagnostics.
    pub(crate) range: Option<TextRange>,
    pub(crate) message: String,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: Option<TextRange>) -> Self {
        Self {
            kind,
            range,
            message: kind.fallback_message().to_string(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.range {
            Some(range) => write!(
                f,
                "{} at {}..{}: {}",
                self.severity(),
                u32::from(range.start()),
                u32::from(range.end()),
                self.message
            ),
            None => write!(f, "{}: {}", self.severity(), self.message),
        }
    }
}
