//! Style linting delegated to an external tool.
//!
//! [`StyleLint`] owns no linting logic. It builds a [`StyleLintRequest`]
//! from the root group's rules, hands it to a [`StyleLintExecutor`] and
//! translates every finding into one violation.
//!
//! [`CommandStyleLint`] is the bundled executor: it runs a command such as
//! `checkstyle` over the matched source files and reads its plain output:
//!
//! ```text
//! [ERROR] /work/qs/src/Hello.java:12:5: Missing a Javadoc comment. [JavadocMethod]
//! [WARN] /work/qs/src/Hello.java:3: Line has trailing spaces. [RegexpSingleline]
//! ```

use once_cell::sync::Lazy;
use pom_lint_core::{
    CheckError, CheckScope, Checker, Location, ProjectContext, ProjectFindings, Severity,
    Violation,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Checker code for style-lint.
pub const CODE: &str = "PL005";

/// Checker name for style-lint.
pub const NAME: &str = "style-lint";

/// Note recorded when the root group ignores this checker.
pub const IGNORED_NOTE: &str = "This checker is ignored for this groupId in config file.";

/// Note recorded when no executor is configured.
pub const UNCONFIGURED_NOTE: &str = "No style-lint command configured; checker skipped.";

/// Default source file patterns.
pub const DEFAULT_INCLUDES: &[&str] = &["**/*.java"];

/// Encoding handed to the style linter.
pub const ENCODING: &str = "UTF-8";

/// Errors raised by a style-lint delegate.
#[derive(Debug, thiserror::Error)]
pub enum StyleLintError {
    /// The command could not be started.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// Program name.
        command: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The command failed without reporting findings.
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        /// Program name.
        command: String,
        /// Exit status.
        status: std::process::ExitStatus,
        /// Captured standard error.
        stderr: String,
    },

    /// An include or exclude pattern is invalid.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },
}

/// What to lint and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleLintRequest {
    /// Directory holding the sources.
    pub source_dir: PathBuf,
    /// Style configuration file for the tool.
    pub config_location: Option<String>,
    /// License header file.
    pub header_location: Option<String>,
    /// Glob patterns of files to lint, relative to `source_dir`.
    pub includes: Vec<String>,
    /// Glob patterns of files to skip, relative to `source_dir`.
    pub excludes: Vec<String>,
    /// Source encoding.
    pub encoding: String,
}

/// One finding reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFinding {
    /// Line (1-indexed).
    pub line: usize,
    /// Severity reported by the tool.
    pub severity: Severity,
    /// Message.
    pub message: String,
    /// Name of the tool's check, when reported.
    pub check: Option<String>,
}

/// Runs a style linter.
pub trait StyleLintExecutor: Send + Sync {
    /// Lints the requested files and returns findings keyed by file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be run.
    fn execute(
        &self,
        request: &StyleLintRequest,
    ) -> Result<BTreeMap<PathBuf, Vec<StyleFinding>>, StyleLintError>;
}

/// Delegates style checks to an executor.
pub struct StyleLint {
    executor: Option<Arc<dyn StyleLintExecutor>>,
    config_location: Option<String>,
    includes: Vec<String>,
}

impl StyleLint {
    /// Creates a checker backed by `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn StyleLintExecutor>) -> Self {
        Self {
            executor: Some(executor),
            ..Self::unconfigured()
        }
    }

    /// Creates a checker that only records that it has nothing to run.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            executor: None,
            config_location: None,
            includes: DEFAULT_INCLUDES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Sets the tool's configuration file.
    #[must_use]
    pub fn config_location(mut self, location: impl Into<String>) -> Self {
        self.config_location = Some(location.into());
        self
    }

    /// Replaces the include patterns.
    #[must_use]
    pub fn includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the request for a walk.
    #[must_use]
    pub fn request(&self, ctx: &ProjectContext<'_>) -> StyleLintRequest {
        let rules = ctx.root_rules;
        let mut excludes = rules.excludes.clone();
        excludes.extend(rules.checker_specific_excludes(NAME).iter().cloned());

        StyleLintRequest {
            source_dir: ctx.pass.root.to_path_buf(),
            config_location: self.config_location.clone(),
            header_location: rules.header_location.clone(),
            includes: self.includes.clone(),
            excludes,
            encoding: ENCODING.to_string(),
        }
    }
}

impl Checker for StyleLint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Runs the configured style linter over the source tree"
    }

    fn scope(&self) -> CheckScope {
        CheckScope::Project
    }

    fn check_project(&self, ctx: &ProjectContext<'_>) -> Result<ProjectFindings, CheckError> {
        if ctx.root_rules.is_checker_ignored(NAME) {
            return Ok(ProjectFindings::note(IGNORED_NOTE));
        }
        let Some(executor) = &self.executor else {
            return Ok(ProjectFindings::note(UNCONFIGURED_NOTE));
        };

        let request = self.request(ctx);
        debug!("Style lint request: {:?}", request);
        let files = executor
            .execute(&request)
            .map_err(|e| CheckError::Delegate(Box::new(e)))?;

        let mut violations = Vec::new();
        for (file, findings) in files {
            let file = file
                .strip_prefix(ctx.pass.root)
                .map_or_else(|_| file.clone(), Path::to_path_buf);
            for finding in findings {
                let message = match &finding.check {
                    Some(check) => format!("{} [{check}]", finding.message),
                    None => finding.message,
                };
                violations.push(Violation::new(
                    CODE,
                    NAME,
                    finding.severity,
                    Location::new(file.clone(), finding.line),
                    message,
                ));
            }
        }
        info!("Style lint reported {} finding(s)", violations.len());
        Ok(ProjectFindings::violations(violations))
    }
}

#[allow(clippy::expect_used)]
static PLAIN_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\[(ERROR|WARN|WARNING|INFO)\]\s+(.+?):(\d+)(?::(\d+))?:",
        r"\s+(.*?)(?:\s+\[(\w+)\])?\s*$",
    ))
    .expect("plain output pattern is valid")
});

/// Parses Checkstyle plain output; lines that are not findings are skipped.
#[must_use]
pub fn parse_plain_output(output: &str) -> BTreeMap<PathBuf, Vec<StyleFinding>> {
    let mut files: BTreeMap<PathBuf, Vec<StyleFinding>> = BTreeMap::new();
    for caps in output.lines().filter_map(|l| PLAIN_LINE.captures(l)) {
        let severity = match &caps[1] {
            "ERROR" => Severity::Error,
            "INFO" => Severity::Info,
            _ => Severity::Warning,
        };
        let Ok(line) = caps[3].parse() else {
            continue;
        };
        files
            .entry(PathBuf::from(&caps[2]))
            .or_default()
            .push(StyleFinding {
                line,
                severity,
                message: caps[5].to_string(),
                check: caps.get(6).map(|m| m.as_str().to_string()),
            });
    }
    files
}

/// Runs an external command over the matched files.
///
/// The command line is `program args... [-c config] files...`. Header
/// location and encoding are passed as `STYLE_LINT_HEADER` and
/// `STYLE_LINT_ENCODING` in the environment.
#[derive(Debug, Clone)]
pub struct CommandStyleLint {
    program: String,
    args: Vec<String>,
}

impl CommandStyleLint {
    /// Creates an executor for `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds leading arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Files under the source directory matching the request, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid.
    pub fn collect_files(request: &StyleLintRequest) -> Result<Vec<PathBuf>, StyleLintError> {
        let excludes = request
            .excludes
            .iter()
            .map(|p| compile(p.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut files = Vec::new();
        for include in &request.includes {
            let pattern = request.source_dir.join(include);
            let pattern = pattern.to_string_lossy();
            let entries = glob::glob(&pattern).map_err(|source| StyleLintError::Pattern {
                pattern: include.clone(),
                source,
            })?;
            for path in entries.flatten() {
                let relative = path.strip_prefix(&request.source_dir).unwrap_or(&path);
                if excludes.iter().any(|p| p.matches_path(relative)) {
                    debug!("Excluding from style lint: {}", path.display());
                    continue;
                }
                files.push(path);
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn compile(pattern: &str) -> Result<glob::Pattern, StyleLintError> {
    glob::Pattern::new(pattern).map_err(|source| StyleLintError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl StyleLintExecutor for CommandStyleLint {
    fn execute(
        &self,
        request: &StyleLintRequest,
    ) -> Result<BTreeMap<PathBuf, Vec<StyleFinding>>, StyleLintError> {
        let files = Self::collect_files(request)?;
        if files.is_empty() {
            debug!("No files to style lint under {}", request.source_dir.display());
            return Ok(BTreeMap::new());
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(config) = &request.config_location {
            command.arg("-c").arg(config);
        }
        command.args(&files);
        command.env("STYLE_LINT_ENCODING", &request.encoding);
        if let Some(header) = &request.header_location {
            command.env("STYLE_LINT_HEADER", header);
        }

        debug!("Running {} on {} file(s)", self.program, files.len());
        let output = command.output().map_err(|source| StyleLintError::Spawn {
            command: self.program.clone(),
            source,
        })?;

        let findings = parse_plain_output(&String::from_utf8_lossy(&output.stdout));
        let stderr = String::from_utf8_lossy(&output.stderr);
        // The tool exits non-zero when it reports errors; that alone is not a failure.
        if !output.status.success() && findings.is_empty() && !stderr.trim().is_empty() {
            return Err(StyleLintError::Failed {
                command: self.program.clone(),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use std::sync::Mutex;

    /// Records the request and returns canned findings.
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<StyleLintRequest>>,
        findings: BTreeMap<PathBuf, Vec<StyleFinding>>,
    }

    impl StyleLintExecutor for Recording {
        fn execute(
            &self,
            request: &StyleLintRequest,
        ) -> Result<BTreeMap<PathBuf, Vec<StyleFinding>>, StyleLintError> {
            self.requests
                .lock()
                .expect("lock")
                .push(request.clone());
            Ok(self.findings.clone())
        }
    }

    const ROOT_POM: &str = "<project><groupId>org.example</groupId></project>";

    #[test]
    fn test_parse_plain_output() {
        let output = "\
Starting audit...
[ERROR] /work/src/Hello.java:12:5: Missing a Javadoc comment. [JavadocMethod]
[WARN] /work/src/Hello.java:3: Line has trailing spaces. [RegexpSingleline]
[INFO] /work/src/Other.java:1: Note
Audit done.
Checkstyle ends with 1 errors.
";
        let files = parse_plain_output(output);
        assert_eq!(files.len(), 2);
        let hello = &files[Path::new("/work/src/Hello.java")];
        assert_eq!(
            hello[0],
            StyleFinding {
                line: 12,
                severity: Severity::Error,
                message: "Missing a Javadoc comment.".to_string(),
                check: Some("JavadocMethod".to_string()),
            }
        );
        assert_eq!(hello[1].line, 3);
        assert_eq!(hello[1].severity, Severity::Warning);
        let other = &files[Path::new("/work/src/Other.java")];
        assert_eq!(other[0].check, None);
        assert_eq!(other[0].message, "Note");
    }

    #[test]
    fn test_findings_become_violations() {
        let mut findings = BTreeMap::new();
        findings.insert(
            PathBuf::from("/ws/src/Hello.java"),
            vec![StyleFinding {
                line: 7,
                severity: Severity::Warning,
                message: "Line is longer than 120 characters".to_string(),
                check: Some("LineLength".to_string()),
            }],
        );
        let executor = Arc::new(Recording {
            findings,
            ..Recording::default()
        });
        let checker = StyleLint::new(executor.clone());
        let result = Fixture::single(ROOT_POM)
            .config(
                r#"
[groups."org.example"]
excludes = ["**/target/**"]
header_location = "header.txt"

[groups."org.example".checker_excludes]
style-lint = ["**/generated/**"]
"#,
            )
            .check_project(&checker);

        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.code, CODE);
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.location, Location::new("src/Hello.java", 7));
        assert_eq!(v.message, "Line is longer than 120 characters [LineLength]");

        let requests = executor.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].excludes, vec!["**/target/**", "**/generated/**"]);
        assert_eq!(requests[0].header_location.as_deref(), Some("header.txt"));
        assert_eq!(requests[0].encoding, "UTF-8");
        assert_eq!(requests[0].source_dir, PathBuf::from("/ws"));
    }

    #[test]
    fn test_request_uses_walk_root_and_root_descriptor_rules() {
        let executor = Arc::new(Recording::default());
        let checker = StyleLint::new(executor.clone());
        // Discovery order: modules sort before the root descriptor.
        Fixture::new(&[
            (
                "helloworld/pom.xml",
                "<project><groupId>org.module</groupId></project>",
            ),
            ("pom.xml", "<project><groupId>org.root</groupId></project>"),
        ])
        .config(
            r#"
[groups."org.root"]
header_location = "root-header.txt"
"#,
        )
        .check_project(&checker);

        let requests = executor.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_dir, PathBuf::from("/ws"));
        assert_eq!(requests[0].header_location.as_deref(), Some("root-header.txt"));
    }

    #[test]
    fn test_ignored_group_records_note_without_running() {
        let executor = Arc::new(Recording::default());
        let checker = StyleLint::new(executor.clone());
        let result = Fixture::single(ROOT_POM)
            .config(
                r#"
[groups."org.example"]
ignored_checkers = ["style-lint"]
"#,
            )
            .check_project(&checker);

        assert!(result.violations.is_empty());
        assert_eq!(result.note.as_deref(), Some(IGNORED_NOTE));
        assert!(executor.requests.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_unconfigured_records_note() {
        let result = Fixture::single(ROOT_POM).check_project(&StyleLint::unconfigured());
        assert_eq!(result.note.as_deref(), Some(UNCONFIGURED_NOTE));
    }

    #[test]
    fn test_collect_files_applies_excludes() {
        let dir = tempfile::tempdir().expect("tempdir");
        for file in ["src/A.java", "src/B.java", "target/C.java", "src/notes.txt"] {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            std::fs::write(&path, "class X {}").expect("write");
        }
        let request = StyleLintRequest {
            source_dir: dir.path().to_path_buf(),
            config_location: None,
            header_location: None,
            includes: vec!["**/*.java".to_string()],
            excludes: vec!["target/**".to_string()],
            encoding: ENCODING.to_string(),
        };
        let files = CommandStyleLint::collect_files(&request).expect("collect");
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["src/A.java", "src/B.java"]);
    }
}
