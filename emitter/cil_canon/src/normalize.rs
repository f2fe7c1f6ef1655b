//! Canonical reordering of listing text.

/// Lines that change on every emission and carry no semantic content.
const VOLATILE_PREFIXES: &[&str] = &["// MVID:", "// Image base:", "// Time-date stamp:"];

/// Drop volatile lines before comparison.
pub fn strip_volatile(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_start();
        if VOLATILE_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Canonicalize reorderable regions.
///
/// Within each `.property` block, `.get` comes before `.set`; within each
/// `.event` block, `.addon` before `.removeon`. Contiguous runs of
/// `.custom` lines and of `.field` lines sort lexicographically. Everything
/// else is untouched.
pub fn normalize(text: &str) -> String {
    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    swap_accessor_order(&mut lines, ".property", ".get", ".set");
    swap_accessor_order(&mut lines, ".event", ".addon", ".removeon");
    sort_runs(&mut lines, ".custom");
    sort_runs(&mut lines, ".field");
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn starts_with_word(line: &str, prefix: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

/// Find the close brace matching the open brace expected right after
/// `header`. Returns `None` for malformed blocks, which are then skipped.
fn block_extent(lines: &[String], header: usize) -> Option<(usize, usize)> {
    let open = header + 1;
    if lines.get(open).map(|l| l.trim()) != Some("{") {
        return None;
    }
    let mut depth = 0usize;
    for (offset, line) in lines.iter().enumerate().skip(open) {
        match line.trim() {
            "{" => depth += 1,
            "}" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some((open + 1, offset));
                }
            }
            _ => {}
        }
    }
    None
}

fn swap_accessor_order(lines: &mut [String], block: &str, first: &str, second: &str) {
    let mut i = 0;
    while i < lines.len() {
        if !starts_with_word(&lines[i], block) {
            i += 1;
            continue;
        }
        let Some((body_start, body_end)) = block_extent(lines, i) else {
            // Malformed block: leave it for the diff to expose.
            i += 1;
            continue;
        };
        let find = |needle: &str| {
            (body_start..body_end).find(|&j| starts_with_word(&lines[j], needle))
        };
        if let (Some(first_at), Some(second_at)) = (find(first), find(second)) {
            if second_at < first_at {
                lines.swap(first_at, second_at);
            }
        }
        i = body_end + 1;
    }
}

fn sort_runs(lines: &mut Vec<String>, prefix: &str) {
    let mut i = 0;
    while i < lines.len() {
        if !starts_with_word(&lines[i], prefix) {
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < lines.len() && starts_with_word(&lines[end], prefix) {
            end += 1;
        }
        lines[i..end].sort();
        i = end;
    }
}
