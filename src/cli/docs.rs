//! Rendering of service field documentation

use std::fmt::Write;

use super::parser::DocFormat;
use crate::format::FieldDescriptor;
use crate::services::Service;

const KEY_WIDTH: usize = 14;
const KIND_WIDTH: usize = 8;

const MARKDOWN_PROPS_INTRO: &str = "Props can be either supplied using the params argument, or through the URL using\n`?key=value&key=value` etc.";
const MARKDOWN_NO_PROPS: &str = "*The service does not support any query/param props*";

/// Documentation block for one service in the requested format
pub fn render(format: DocFormat, scheme: &str, service: &dyn Service) -> String {
    let fields = service.config_fields();
    let enums = service.config_enums();
    match format {
        DocFormat::Console => render_service_docs(scheme, &fields, &enums),
        DocFormat::Markdown => render_service_markdown(scheme, &fields, &enums),
    }
}

fn enum_values(field: &FieldDescriptor, enums: &[&FieldDescriptor]) -> Option<&'static [&'static str]> {
    enums
        .iter()
        .find(|e| e.key == field.key)
        .map(|e| e.enum_values)
}

fn notes(field: &FieldDescriptor) -> Vec<String> {
    let mut notes = Vec::new();
    if field.required {
        notes.push("required".to_string());
    }
    if let Some(default) = field.default {
        notes.push(format!("default: {}", default));
    }
    if !field.aliases.is_empty() {
        notes.push(format!("aliases: {}", field.aliases.join(", ")));
    }
    if !field.exportable {
        notes.push("write-only".to_string());
    }
    notes
}

/// One block per service: a heading line, then one line per field with
/// enum values on a continuation line.
pub fn render_service_docs(
    scheme: &str,
    fields: &[&FieldDescriptor],
    enums: &[&FieldDescriptor],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", scheme);

    if fields.is_empty() {
        let _ = writeln!(out, "  (no query fields)");
        return out;
    }

    for field in fields {
        let _ = write!(
            out,
            "  {:<key$} {:<kind$} {}",
            field.key,
            field.kind.as_str(),
            field.description,
            key = KEY_WIDTH,
            kind = KIND_WIDTH
        );

        let notes = notes(field);
        if !notes.is_empty() {
            let _ = write!(out, " ({})", notes.join(", "));
        }
        let _ = writeln!(out);

        if let Some(values) = enum_values(field, enums) {
            let _ = writeln!(
                out,
                "  {:<pad$} values: {}",
                "",
                values.join(", "),
                pad = KEY_WIDTH + KIND_WIDTH + 1
            );
        }
    }
    out
}

/// Markdown section for a service, suitable for a docs site
pub fn render_service_markdown(
    scheme: &str,
    fields: &[&FieldDescriptor],
    enums: &[&FieldDescriptor],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", scheme);
    let _ = writeln!(out, "### Query/Param Props\n");

    if fields.is_empty() {
        let _ = writeln!(out, "{}", MARKDOWN_NO_PROPS);
        return out;
    }

    let _ = writeln!(out, "{}\n", MARKDOWN_PROPS_INTRO);
    for field in fields {
        let _ = write!(out, "* __`{}`__ - {}", field.key, field.description);
        if let Some(default) = field.default {
            let _ = write!(out, " Default: *{}*", default);
        }
        if field.required {
            let _ = write!(out, " **Required**");
        }
        let _ = writeln!(out);

        if !field.aliases.is_empty() {
            let aliases: Vec<_> = field.aliases.iter().map(|a| format!("`{}`", a)).collect();
            let _ = writeln!(out, "  Aliases: {}", aliases.join(", "));
        }
        if let Some(values) = enum_values(field, enums) {
            let values: Vec<_> = values.iter().map(|v| format!("`{}`", v)).collect();
            let _ = writeln!(out, "  Possible values: {}", values.join(", "));
        }
    }
    out
}
