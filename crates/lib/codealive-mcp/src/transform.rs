//! Rendering of API payloads into the XML shapes returned to MCP callers.
//!
//! XML keeps the token footprint well below raw JSON and groups matches by
//! file, which is the unit a caller actually opens. Grouping preserves the
//! service's ranking order; nothing is re-sorted across files.

use std::collections::HashMap;
use std::fmt::Write as _;

use codealive_client::{RepositoryOverview, SearchMatch};

/// Renders ranked search results.
///
/// Matches are grouped by file path in first-seen order. `Folder` entries
/// carry no actionable location and are skipped, as are matches with no
/// resolvable path.
pub fn search_results_to_xml(results: &[SearchMatch], include_content: bool) -> String {
    let groups = group_by_path(results);
    if groups.is_empty() {
        return "<results></results>".to_string();
    }
    if include_content {
        render_with_content(&groups)
    } else {
        render_without_content(&groups)
    }
}

/// Renders repository overview documents as markdown wrapped in XML.
pub fn overviews_to_xml(overviews: &[RepositoryOverview]) -> String {
    let mut xml = String::from("<repository_overviews>");
    for repo in overviews {
        let name = repo.name.as_deref().unwrap_or("unknown");
        let text = repo.overview.as_deref().unwrap_or("");
        let _ = write!(
            xml,
            "<repository name=\"{}\"><overview>{}</overview></repository>",
            escape(name),
            escape(text)
        );
    }
    xml.push_str("</repository_overviews>");
    xml
}

fn group_by_path<'a>(results: &'a [SearchMatch]) -> Vec<(&'a str, Vec<&'a SearchMatch>)> {
    let mut groups: Vec<(&str, Vec<&SearchMatch>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for hit in results {
        if hit.kind == "Folder" {
            continue;
        }
        let Some(path) = hit.path() else { continue };
        match index.get(path) {
            Some(&slot) => groups[slot].1.push(hit),
            None => {
                index.insert(path, groups.len());
                groups.push((path, vec![hit]));
            }
        }
    }
    groups
}

fn render_without_content(groups: &[(&str, Vec<&SearchMatch>)]) -> String {
    let mut lines = vec!["<results>".to_string()];
    for (path, hits) in groups {
        for hit in hits {
            let mut attrs = format!("path=\"{}\"", escape(path));
            if let Some(line) = hit.start_line() {
                let _ = write!(attrs, " startLine=\"{line}\"");
            }
            if let Some(line) = hit.end_line() {
                let _ = write!(attrs, " endLine=\"{line}\"");
            }
            if !hit.kind.is_empty() {
                let _ = write!(attrs, " kind=\"{}\"", escape(&hit.kind));
            }
            lines.push(format!("  <search_result {attrs} />"));
        }
    }
    lines.push("</results>".to_string());
    lines.join("\n")
}

fn render_with_content(groups: &[(&str, Vec<&SearchMatch>)]) -> String {
    let mut lines = vec!["<results>".to_string()];
    for (path, hits) in groups {
        let mut ordered: Vec<&SearchMatch> = hits.clone();
        ordered.sort_by_key(|hit| hit.start_line().unwrap_or(0));

        let mut content_parts: Vec<&str> = Vec::new();
        let mut line_numbers: Vec<u32> = Vec::new();
        for hit in &ordered {
            if let Some(content) = non_empty(hit.content.as_deref().or(hit.snippet.as_deref())) {
                content_parts.push(content);
            }
            if let Some(line) = hit.start_line() {
                line_numbers.push(line);
            }
            if let Some(line) = hit.end_line() {
                line_numbers.push(line);
            }
        }
        if content_parts.is_empty() {
            continue;
        }

        let mut attrs = format!("path=\"{}\"", escape(path));
        let start = line_numbers.iter().min().copied();
        if let (Some(start), Some(end)) = (start, line_numbers.iter().max()) {
            let _ = write!(attrs, " startLine=\"{start}\" endLine=\"{end}\"");
        }
        lines.push(format!("  <search_result {attrs}>"));
        lines.push(number_content(&content_parts.join("\n"), start));
        lines.push("  </search_result>".to_string());
    }
    lines.push("</results>".to_string());
    lines.join("\n")
}

fn number_content(content: &str, start_line: Option<u32>) -> String {
    let escaped = escape(content);
    match start_line {
        Some(start) if content.contains('\n') => escaped
            .split('\n')
            .enumerate()
            .map(|(offset, line)| format!("   {}|{line}", start + offset as u32))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => escaped
            .split('\n')
            .map(|line| format!("   {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
