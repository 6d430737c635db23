//! Diagnostic rendering

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use splice_core::SyntaxError;

/// Render the syntax error of a source as an annotated snippet
pub fn syntax_error(path: &str, source: &str, error: &SyntaxError) -> String {
    let mut offset = error.offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let end = source[offset..]
        .chars()
        .next()
        .map_or(offset, |c| offset + c.len_utf8());
    let id = path.to_string();
    let span = offset..end;

    let report = Report::build(ReportKind::Error, (id.clone(), span.clone()))
        .with_config(
            Config::default()
                .with_color(false)
                .with_index_type(IndexType::Byte),
        )
        .with_message("syntax error")
        .with_label(Label::new((id.clone(), span)).with_message(format!(
            "the parser gave up here (line {}, column {})",
            error.line + 1,
            error.column + 1
        )))
        .finish();

    let mut out = Vec::new();
    match report.write((id, Source::from(source)), &mut out) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!(
            "{path}:{}:{}: syntax error\n",
            error.line + 1,
            error.column + 1
        ),
    }
}
