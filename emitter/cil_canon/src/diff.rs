//! Line diff and report writing.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Classification of one diff line.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiffTag {
    Unchanged,
    Inserted,
    Deleted,
}

/// One line of the diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

/// The full diff of two listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub lines: Vec<DiffLine>,
    pub inserts: usize,
    pub deletes: usize,
}

impl DiffReport {
    /// True when the two inputs were line-identical.
    pub fn is_match(&self) -> bool {
        self.inserts == 0 && self.deletes == 0
    }

    /// Render only the changed lines, `+ `/`- ` prefixed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let prefix = match line.tag {
                DiffTag::Unchanged => continue,
                DiffTag::Inserted => "+ ",
                DiffTag::Deleted => "- ",
            };
            out.push_str(prefix);
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}

/// Longest-common-subsequence line diff of `old` against `new`.
pub fn diff_lines(old: &str, new: &str) -> DiffReport {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let rows = old_lines.len();
    let cols = new_lines.len();

    // Classic LCS table; listings are small enough for the quadratic table.
    let mut table = vec![0usize; (rows + 1) * (cols + 1)];
    let at = |r: usize, c: usize| r * (cols + 1) + c;
    for r in (0..rows).rev() {
        for c in (0..cols).rev() {
            table[at(r, c)] = if old_lines[r] == new_lines[c] {
                table[at(r + 1, c + 1)] + 1
            } else {
                table[at(r + 1, c)].max(table[at(r, c + 1)])
            };
        }
    }

    let mut report = DiffReport::default();
    let (mut r, mut c) = (0, 0);
    while r < rows && c < cols {
        if old_lines[r] == new_lines[c] {
            report.lines.push(DiffLine {
                tag: DiffTag::Unchanged,
                text: old_lines[r].to_string(),
            });
            r += 1;
            c += 1;
        } else if table[at(r + 1, c)] >= table[at(r, c + 1)] {
            report.lines.push(DiffLine {
                tag: DiffTag::Deleted,
                text: old_lines[r].to_string(),
            });
            report.deletes += 1;
            r += 1;
        } else {
            report.lines.push(DiffLine {
                tag: DiffTag::Inserted,
                text: new_lines[c].to_string(),
            });
            report.inserts += 1;
            c += 1;
        }
    }
    for line in &old_lines[r..] {
        report.lines.push(DiffLine {
            tag: DiffTag::Deleted,
            text: (*line).to_string(),
        });
        report.deletes += 1;
    }
    for line in &new_lines[c..] {
        report.lines.push(DiffLine {
            tag: DiffTag::Inserted,
            text: (*line).to_string(),
        });
        report.inserts += 1;
    }
    report
}

/// Diff two listings and write the changed-lines report to `path`.
pub fn write_diff(old: &str, new: &str, path: &Path) -> io::Result<DiffReport> {
    let report = diff_lines(old, new);
    let mut file = File::create(path)?;
    file.write_all(report.render().as_bytes())?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_inputs_match() {
        let report = diff_lines("a\nb\n", "a\nb\n");
        assert!(report.is_match());
        assert_eq!(report.render(), "");
    }

    #[test]
    fn test_insert_and_delete_counts() {
        let report = diff_lines("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(report.deletes, 1);
        assert_eq!(report.inserts, 1);
        assert_eq!(report.render(), "- b\n+ x\n");
    }

    #[test]
    fn test_pure_insertion() {
        let report = diff_lines("a\n", "a\nb\n");
        assert_eq!(report.inserts, 1);
        assert_eq!(report.deletes, 0);
    }

    #[test]
    fn test_write_diff_creates_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.diff");
        let report = write_diff("a\n", "b\n", &path).unwrap();
        assert!(!report.is_match());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "- a\n+ b\n");
    }
}
