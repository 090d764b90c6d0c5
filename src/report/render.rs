//! HTML rendering of the aggregation matrix.
//!
//! One heading and one table per section in table order. Rendering is a pure
//! function of the matrix; the final page is produced separately by
//! substituting the table markup into a static template at a single
//! placeholder.

use chrono::Utc;
use tracing::debug;

use super::matrix::{AggregationMatrix, Status};
use super::sections::SectionTable;

/// Placeholder in the page template replaced by the rendered tables.
pub const TEMPLATE_PLACEHOLDER: &str = "%%%REPORTS%%%";

fn glyph(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Failure => "❌",
        // Other statuses display their wire name verbatim.
        other => other.as_str(),
    }
}

/// Minimal escaping for text interpolated into markup. Test titles and
/// implementation names are not trusted to be markup-free.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the conformance tables: per section in `sections` order, rows in
/// first-seen order, one column per implementation in first-seen order.
/// Sections with no rows still get a heading and an empty table so the page
/// structure is stable across runs.
pub fn render_tables(matrix: &AggregationMatrix, sections: &SectionTable) -> String {
    let implementations = matrix.implementations();
    let mut out = String::new();

    for entry in sections.iter() {
        out.push_str(&format!("\n<h2>{}</h2>\n\n", escape(&entry.name)));
        out.push_str("<table class=\"simple\">\n  <thead>\n    <th width=\"80%\">Test</th>\n");
        for implementation in implementations {
            out.push_str(&format!("    <th>{}</th>\n", escape(implementation)));
        }
        out.push_str("  </thead>\n  <tbody>\n");

        if let Some(results) = matrix.section(&entry.id) {
            for (short_title, row) in results.iter() {
                out.push_str(&format!("    <tr>\n      <td>{}</td>\n", escape(short_title)));
                for implementation in implementations {
                    let status = row.status(implementation);
                    out.push_str(&format!(
                        "      <td class=\"{status}\" aria-label=\"{status}\">{}</td>\n",
                        glyph(status),
                        status = status.as_str(),
                    ));
                }
                out.push_str("    </tr>\n");
            }
        }

        out.push_str("  </tbody>\n</table>\n");
    }

    debug!(
        implementations = implementations.len(),
        bytes = out.len(),
        "rendered conformance tables"
    );
    out
}

/// Substitute the rendered tables into the page template. The template must
/// contain [`TEMPLATE_PLACEHOLDER`] exactly once; a generated-at timestamp
/// replaces the optional `%%%DATE%%%` marker when present.
pub fn render_page(template: &str, tables: &str) -> String {
    let page = template.replacen(TEMPLATE_PLACEHOLDER, tables, 1);
    page.replacen("%%%DATE%%%", &Utc::now().format("%Y-%m-%d").to_string(), 1)
}

/// Fallback page used when no template file is supplied.
pub fn default_template() -> &'static str {
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
     <title>Verifiable Credentials Implementation Report</title>\n</head>\n<body>\n\
     <h1>Verifiable Credentials Implementation Report</h1>\n\
     <p>Generated %%%DATE%%%</p>\n%%%REPORTS%%%\n</body>\n</html>\n"
}
