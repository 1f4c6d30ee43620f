//! Error rendering using ariadne
//!
//! Decode errors carry a span into the rule text, so they are rendered as a
//! report with the offending snippet underlined.

use crate::DecodeError;
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Character set for rendering error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    /// Use Unicode characters for rich visual output.
    #[default]
    Unicode,
    /// Use ASCII-only characters for compatibility.
    Ascii,
}

/// Configuration for error rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig<'a> {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The filename to display in error messages.
    /// Defaults to "<unknown>" if not provided.
    pub filename: Option<&'a str>,
    pub charset: CharSet,
}

impl Default for RenderConfig<'_> {
    fn default() -> Self {
        RenderConfig::default()
    }
}

impl RenderConfig<'_> {
    const fn default() -> Self {
        Self {
            color: true,
            filename: None,
            charset: CharSet::Unicode,
        }
    }
}

/// Render a decode error to stderr using the default config.
///
/// # Example
/// ```no_run
/// use gon::{decode, default_codex, render_error};
///
/// let source = r#"if(gte(person.age 18)"#;
/// if let Err(err) = decode(source, &default_codex()) {
///     render_error(&err, source);
/// }
/// ```
pub fn render_error(error: &DecodeError, source: &str) {
    render_error_to(error, source, &mut std::io::stderr(), &RenderConfig::default()).ok();
}

/// Render a decode error to a writer with the given configuration.
pub fn render_error_to(
    error: &DecodeError,
    source: &str,
    writer: &mut dyn Write,
    config: &RenderConfig,
) -> std::io::Result<()> {
    let filename = config.filename.unwrap_or("<unknown>");
    let span = error.span().0.clone();

    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let charset = match config.charset {
        CharSet::Unicode => ariadne::CharSet::Unicode,
        CharSet::Ascii => ariadne::CharSet::Ascii,
    };
    let ariadne_config = ariadne::Config::default()
        .with_color(config.color)
        .with_char_set(charset);

    let mut report = Report::build(ReportKind::Error, (filename, span.clone()))
        .with_code(error.code())
        .with_message(error.to_string())
        .with_config(ariadne_config)
        .with_label(
            Label::new((filename, span))
                .with_message(error.label())
                .with_color(colors.next()),
        );

    if let DecodeError::UnknownNode { .. } = error {
        report = report.with_help("register the node on a codex before decoding");
    }

    report
        .finish()
        .write((filename, Source::from(source)), &mut *writer)
}
