//! Rendering of [`OvenError`] through miette.
//!
//! Every failure is flattened into one or more [`Report`]s. Parse errors
//! yield one report per diagnostic; resolve errors point at the
//! declaration whose type failed; I/O and configuration errors have no
//! snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity, SourceSpan};

use oven::{OvenError, resolve::ResolveError};
use oven_parser::{Span, error::Diagnostic};

/// A single renderable problem.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    severity: Severity,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    src: Option<&'a str>,
}

impl<'a> Report<'a> {
    /// A report without a source snippet.
    pub fn plain(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            code: Some(code.to_string()),
            help: None,
            labels: Vec::new(),
            src: None,
        }
    }

    pub fn from_diagnostic(diag: &Diagnostic, src: &'a str) -> Self {
        let severity = if diag.severity().is_error() {
            Severity::Error
        } else {
            Severity::Warning
        };
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let message = Some(label.message().to_string());
                let span = to_source_span(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            severity,
            code: diag.code().map(|code| code.to_string()),
            help: diag.help().map(str::to_string),
            labels,
            src: Some(src),
        }
    }

    pub fn from_resolve(err: &ResolveError, src: &'a str) -> Self {
        let label =
            LabeledSpan::new_primary_with_span(Some(err.label()), to_source_span(err.span()));
        Self {
            message: err.to_string(),
            severity: Severity::Error,
            code: Some("oven::resolve".to_string()),
            help: Some(err.help().to_string()),
            labels: vec![label],
            src: Some(src),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report<'_> {}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Flatten an [`OvenError`] into the reports to print, in source order.
pub fn to_reports(err: &OvenError) -> Vec<Report<'_>> {
    match err {
        OvenError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        OvenError::Resolve { err, src } => vec![Report::from_resolve(err, src)],
        OvenError::Io(_) => vec![Report::plain(err.to_string(), "oven::io")],
        OvenError::Config(_) => vec![Report::plain(err.to_string(), "oven::config")],
    }
}

#[cfg(test)]
mod tests {
    use miette::{GraphicalReportHandler, GraphicalTheme};
    use oven::{SkeletonBuilder, artifact::OutputKind};
    use oven_parser::error::{ErrorCode, ParseError};

    use super::*;

    fn render(report: &Report<'_>) -> String {
        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(200)
            .render_report(&mut out, report)
            .unwrap();
        out
    }

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("syntax error at '}' on line 3")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(0..1), "unexpected token");
        let err = OvenError::new_parse_error(ParseError::from(diag), "}");

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "syntax error at '}' on line 3");
        assert_eq!(
            reports[0].code().map(|c| c.to_string()).as_deref(),
            Some("E100")
        );
    }

    #[test]
    fn test_lexical_diagnostics_keep_severity() {
        let diags = vec![
            Diagnostic::warning("illegal character '$' on line 1")
                .with_label(Span::new(0..1), "illegal character"),
            Diagnostic::error("integer out of range on line 2")
                .with_label(Span::new(10..15), "out of range")
                .with_help("use a value that fits in 64 bits"),
        ];
        let err = OvenError::new_parse_error(ParseError::Lexical(diags), "$ source code here...");

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].severity(), Some(Severity::Warning));
        assert_eq!(reports[1].severity(), Some(Severity::Error));
        assert_eq!(reports[1].to_string(), "integer out of range on line 2");
        assert!(reports[1].help().is_some());
    }

    #[test]
    fn test_unresolved_type_renders_snippet() {
        let source = "interface Foo { void configure(Mystery settings); };";
        let err = SkeletonBuilder::default()
            .build_context(source, "Foo", OutputKind::Both)
            .expect_err("Should fail to resolve");

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].code().map(|c| c.to_string()).as_deref(),
            Some("oven::resolve")
        );

        let labels: Vec<_> = reports[0].labels().expect("labels").collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(
            &source[labels[0].offset()..labels[0].offset() + labels[0].len()],
            "Mystery settings"
        );

        let rendered = render(&reports[0]);
        assert!(rendered.contains(source), "rendered:\n{rendered}");
        assert!(
            rendered.contains("`Mystery` is not declared"),
            "rendered:\n{rendered}"
        );
    }

    #[test]
    fn test_config_error_has_no_snippet() {
        let err = OvenError::Config("unknown key `hosts`".to_string());

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].to_string(),
            "Configuration error: unknown key `hosts`"
        );
        assert!(reports[0].source_code().is_none());
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");

        let report = Report::from_diagnostic(&diag, "some source code");

        let labels: Vec<_> = report.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}
