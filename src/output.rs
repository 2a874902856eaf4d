//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (section,
//! item, page) leads with its positional index and title; its logical path and
//! other details are shown as indented context lines. This makes the output
//! readable as a content inventory while still letting users trace entries
//! back to bundles.
//!
//! # Output Format
//!
//! ```text
//! Home
//!     Bundle Site
//!     A site built from textbundles
//!
//! Sections
//! 001 posts (2 items)
//!     Posts
//!     001 Year in Review
//!         Path: posts/2024/recap
//!     002 Hello, World
//!         Path: posts/hello-world
//!         Tags: rust, web
//! 002 projects (0 items)
//!
//! Pages
//! 001 About
//!     Path: about
//!
//! Built 2 sections, 2 items, 1 page
//! ```
//!
//! # Architecture
//!
//! A `format_*` function returns `Vec<String>` for testability and a `print_*`
//! wrapper writes it to stdout. Format functions do no I/O.

use crate::types::{Content, SiteModel};
use std::fmt;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional item count.
///
/// ```text
/// 001 posts (2 items)
/// 001 About
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "item")),
        None => format!("{} {}", format_index(index), title),
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Description, or a plain-text excerpt of the body when there is none.
fn summary(content: &Content) -> String {
    let text = if content.description.is_empty() {
        strip_html_tags(&content.body)
    } else {
        content.description.clone()
    };
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty());
    truncate_desc(first_line.unwrap_or_default(), 60)
}

// ============================================================================
// Build
// ============================================================================

/// Format the built model as a content inventory.
///
/// `dry_run` only changes the verb of the closing summary line.
pub fn format_build_output<Id, M>(model: &SiteModel<Id, M>, dry_run: bool) -> Vec<String>
where
    Id: Ord + fmt::Display,
{
    let mut lines = Vec::new();

    lines.push("Home".to_string());
    lines.push(format!("{}{}", indent(1), model.index.content.title));
    let home_summary = summary(&model.index.content);
    if !home_summary.is_empty() {
        lines.push(format!("{}{}", indent(1), home_summary));
    }

    if !model.sections.is_empty() {
        lines.push(String::new());
        lines.push("Sections".to_string());
    }
    for (i, section) in model.sections.values().enumerate() {
        lines.push(entity_header(
            i + 1,
            &section.id.to_string(),
            Some(section.items.len()),
        ));
        if let Some(content) = &section.content {
            lines.push(format!("{}{}", indent(1), content.title));
        }
        for (j, item) in section.items.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &item.content.title, None)
            ));
            lines.push(format!(
                "{}Path: {}",
                indent(2),
                section.path.append(item.path.as_str())
            ));
            if !item.tags.is_empty() {
                let tags: Vec<&str> = item.tags.iter().map(|t| t.as_str()).collect();
                lines.push(format!("{}Tags: {}", indent(2), tags.join(", ")));
            }
        }
    }

    if !model.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in model.pages.iter().enumerate() {
            lines.push(entity_header(i + 1, &page.content.title, None));
            lines.push(format!("{}Path: {}", indent(1), page.path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} {}, {}, {}",
        if dry_run { "Checked" } else { "Built" },
        plural(model.sections.len(), "section"),
        plural(model.item_count(), "item"),
        plural(model.pages.len(), "page"),
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output<Id, M>(model: &SiteModel<Id, M>, dry_run: bool)
where
    Id: Ord + fmt::Display,
{
    for line in format_build_output(model, dry_run) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
