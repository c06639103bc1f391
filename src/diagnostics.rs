//! Diagnostic printing for Moa errors.

use std::io;

use ariadne::{Color, ColorGenerator, Fmt, Label, Report, ReportKind, Source};

use crate::error::{MoaError, TypeError};

/// Print a Moa error with colored diagnostics to stderr.
pub fn print_error(filename: &str, source: &str, error: &MoaError) -> io::Result<()> {
    let span = error.span();

    // Mismatches name both operands, each in its own color
    if let MoaError::Type(TypeError::TypeMismatch { left, right, .. }) = error {
        let mut colors = ColorGenerator::new();
        let left_color = colors.next();
        let right_color = colors.next();

        let msg = format!(
            "Type mismatch: '{}' against '{}'",
            left.as_str().fg(left_color),
            right.as_str().fg(right_color)
        );

        let mut report = Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(&msg)
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&msg)
                    .with_color(Color::Red),
            );

        report.add_note(format!(
            "Cannot unify {} with {}",
            left.as_str().fg(left_color),
            right.as_str().fg(right_color)
        ));

        eprintln!();
        report
            .finish()
            .eprint((filename, Source::from(source)))?;
        eprintln!();
        return Ok(());
    }

    let message = match error {
        MoaError::Lex(e) => e.to_string(),
        MoaError::Parse(e) => e.to_string(),
        MoaError::Type(e) => e.to_string(),
    };

    let help = match error {
        MoaError::Type(TypeError::ImmutableAssignment { name, .. }) => Some(format!(
            "declare it with 'var {} ...' to make it assignable",
            name
        )),
        MoaError::Type(TypeError::UnknownProperty { ty, .. }) => {
            Some(format!("type {} declares no such field", ty))
        }
        _ => None,
    };

    let mut report = Report::build(ReportKind::Error, (filename, span.start..span.end))
        .with_message(&message)
        .with_label(
            Label::new((filename, span.start..span.end))
                .with_message(&message)
                .with_color(Color::Red),
        );

    if let Some(help) = help {
        report.add_help(help);
    }

    report
        .finish()
        .eprint((filename, Source::from(source)))
}
