use colored::Colorize;
use hc_core::SnapshotVersion;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "info:".blue().bold(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// `#3 3f2a9c01d4e7 @ 2026-01-01T00:00:00Z`
pub fn version_line(version: &SnapshotVersion) -> String {
    format!(
        "#{} {} @ {}",
        version.sequence,
        version.short_hash(),
        version.loaded_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let version = SnapshotVersion::initial("0123456789abcdef0123");
        let line = version_line(&version);
        assert!(line.starts_with("#1 0123456789ab @ "));
        assert!(line.ends_with('Z'));
    }

    #[test]
    fn test_printers_do_not_panic() {
        header("Header");
        info("info");
        warn("warning");
        error("error");
        success("success");
    }
}
