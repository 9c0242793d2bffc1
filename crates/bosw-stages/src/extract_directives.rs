//! Directive comment extraction.
//!
//! Comments whose content starts with `@name` or `@name(value)` become
//! [`Directive`]s and the physical lines they occupied are removed from the
//! source. Other comments stay where they are.

use bosw_core::{CommentScanner, Directive, ExtractOutput, ScanError};
use once_cell::sync::Lazy;
use regex::Regex;

pub const STAGE_ID: &str = "extract.directives";

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(\w+)(\(.*\))?").expect("directive pattern is valid"));

pub fn extract_config_comments(
    code: &str,
    scanner: &dyn CommentScanner,
) -> Result<ExtractOutput, ScanError> {
    let comments = scanner.scan(code)?;
    let mut lines: Vec<&str> = code.split('\n').collect();
    let mut configs = Vec::new();

    for comment in comments.values() {
        let Some(captures) = DIRECTIVE.captures(comment.content.trim_start()) else {
            continue;
        };

        for line in comment.begin..=comment.end {
            if let Some(slot) = line.checked_sub(1).and_then(|i| lines.get_mut(i)) {
                *slot = "";
            }
        }

        configs.push(Directive {
            name: captures[1].to_string(),
            value: captures.get(2).map(|m| {
                let wrapped = m.as_str();
                wrapped[1..wrapped.len() - 1].to_string()
            }),
            begin_line: comment.begin,
            end_line: comment.end,
        });
    }

    let code = lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ExtractOutput {
        code,
        logs: Vec::new(),
        configs,
    })
}
