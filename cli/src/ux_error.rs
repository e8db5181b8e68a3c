use colored::Colorize;
use errors::ConfigError;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn invalid_settings(reason: &str) -> UxError {
    UxError::new("Invalid repository settings")
        .why(reason.to_string())
        .fix("Pass --file <path> or --settings <path>")
        .fix("Or set HOTCONF_FILE, or HOTCONF_S3_BUCKET and HOTCONF_S3_KEY")
        .suggest("hotconf dump --file config.json")
}

pub fn alias_not_found(alias: &str) -> UxError {
    UxError::new(format!("No entry for alias '{}'", alias))
        .why("The alias is not present in the current snapshot")
        .fix("Aliases are dotted and lower-cased, e.g. some.configuration.value")
        .suggest("hotconf dump")
}

pub fn invalid_payload(path: &str, reason: &str) -> UxError {
    UxError::new(format!("Invalid payload: {}", path))
        .why(reason.to_string())
        .fix("The payload must be a list of entries with 'alias' and 'defaultValue'")
        .suggest(format!("hotconf validate {}", path))
}

/// Translate a library error into a user-facing one.
pub fn from_config_error(error: &ConfigError) -> UxError {
    match error {
        ConfigError::InvalidSettings { reason } => invalid_settings(reason),
        ConfigError::SourceUnavailable { source_name, reason } => {
            UxError::new(format!("Cannot read {}", source_name))
                .why(reason.clone())
                .fix("Check that the file or object exists and is readable")
                .fix("For S3 sources, check credentials, region and endpoint")
        }
        ConfigError::Parse { source_name, reason } => invalid_payload(source_name, reason),
        ConfigError::Decrypt { source_name, reason } => {
            UxError::new(format!("Cannot decrypt {}", source_name))
                .why(reason.clone())
                .fix("Check the KMS key id and the ciphertext encoding")
        }
        other => UxError::new(other.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_fixes() {
        let err = UxError::new("what")
            .why("because")
            .fix("one")
            .fix("two")
            .suggest("hotconf dump");
        assert_eq!(err.to_string(), "what");
        assert_eq!(err.why.as_deref(), Some("because"));
        assert_eq!(err.how_to_fix.len(), 2);
        assert_eq!(err.suggested_command.as_deref(), Some("hotconf dump"));
        err.display();
    }

    #[test]
    fn test_alias_not_found_names_alias() {
        let err = alias_not_found("a.b.c");
        assert!(err.what.contains("a.b.c"));
    }

    #[test]
    fn test_from_config_error() {
        let err = from_config_error(&ConfigError::parse("config.json", "expected value"));
        assert_eq!(err.what, "Invalid payload: config.json");
        assert_eq!(err.why.as_deref(), Some("expected value"));

        let err = from_config_error(&ConfigError::source_unavailable("s3://b/k", "NoSuchKey"));
        assert_eq!(err.what, "Cannot read s3://b/k");
    }
}
