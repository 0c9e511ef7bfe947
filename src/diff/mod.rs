// mod.rs - diff distance: zero-context unified diff, hunk parsing, distance metrics

use std::process::Command;

/// How two byte buffers are diffed before the hunk-header metric is
/// computed. `Builtin` is a pure-Rust line differ so distance computation
/// never needs a subprocess when no external tool is required; the other
/// two shell out, matching the original's `difflib`/`diff`/`git diff`
/// tool choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTool {
    Builtin,
    ExternalDiff,
    ExternalGitDiff,
}

impl DiffTool {
    /// Picks `diff` or `git` if present on `PATH`, else falls back to the
    /// always-available builtin differ.
    pub fn autodetect() -> Self {
        if which("diff") {
            DiffTool::ExternalDiff
        } else if which("git") {
            DiffTool::ExternalGitDiff
        } else {
            DiffTool::Builtin
        }
    }
}

fn which(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// One `@@ -a,b +c,d @@` hunk's additions/deletions counts, defaulting the
/// omitted-length form (`@@ -a +c @@`) to 1 line.
#[derive(Debug, Clone, Copy)]
struct Hunk {
    deletions: u64,
    additions: u64,
}

const PER_FILE_OVERHEAD: i64 = 2;

/// Primary "minimize differences" metric for one `(reference, candidate)`
/// pair, from a zero-context unified diff.
pub fn metric_for_mindiff(tool: DiffTool, reference: &[u8], candidate: &[u8]) -> i64 {
    let hunks = unified_diff_hunks(tool, reference, candidate);
    let additions: u64 = hunks.iter().map(|h| h.additions).sum();
    let deletions: u64 = hunks.iter().map(|h| h.deletions).sum();
    let hunkdiffs: u64 = hunks.iter().map(|h| h.additions.abs_diff(h.deletions)).sum();

    let mut metric = PER_FILE_OVERHEAD + additions as i64 + deletions as i64 + hunkdiffs as i64;

    let num_changes = additions + deletions;
    let reference_lines = count_lines(reference) as u64;
    if num_changes >= reference_lines {
        let candidate_lines = reference_lines as i64 + additions as i64 - deletions as i64;
        metric += (reference_lines as i64 - candidate_lines).unsigned_abs() as i64;
    }

    metric
}

/// Secondary tie-breaker: absolute difference of average line length
/// (bytes/line), scaled by 10 000 and rounded.
pub fn avg_linelength_diff(reference: &[u8], candidate: &[u8]) -> i64 {
    let avg = |data: &[u8]| -> f64 {
        let lines = count_lines(data).max(1);
        data.len() as f64 / lines as f64
    };
    ((avg(reference) - avg(candidate)).abs() * 10_000.0).round() as i64
}

/// `maximize-difference` mode: negated primary metric.
pub fn metric_maximize_difference(tool: DiffTool, reference: &[u8], candidate: &[u8]) -> i64 {
    -metric_for_mindiff(tool, reference, candidate)
}

/// `minimize content` mode: byte length + line count of the candidate
/// alone, independent of the reference.
pub fn metric_minimize_content(candidate: &[u8]) -> i64 {
    candidate.len() as i64 + count_lines(candidate) as i64
}

/// `maximize content` mode: negated minimize-content.
pub fn metric_maximize_content(candidate: &[u8]) -> i64 {
    -metric_minimize_content(candidate)
}

fn count_lines(data: &[u8]) -> usize {
    if data.is_empty() {
        return 0;
    }
    let mut n = data.iter().filter(|&&b| b == b'\n').count();
    if *data.last().unwrap() != b'\n' {
        n += 1;
    }
    n
}

fn unified_diff_hunks(tool: DiffTool, reference: &[u8], candidate: &[u8]) -> Vec<Hunk> {
    match tool {
        DiffTool::Builtin => builtin_diff_hunks(reference, candidate),
        DiffTool::ExternalDiff | DiffTool::ExternalGitDiff => {
            match external_diff_output(tool, reference, candidate) {
                Some(output) => parse_hunk_headers(&output),
                None => builtin_diff_hunks(reference, candidate),
            }
        }
    }
}

fn external_diff_output(tool: DiffTool, reference: &[u8], candidate: &[u8]) -> Option<String> {
    let scope = crate::tempfiles::TempScope::scoped().ok()?;
    let ref_path = scope.write("reference", "txt", reference).ok()?;
    let cand_path = scope.write("candidate", "txt", candidate).ok()?;

    let output = match tool {
        DiffTool::ExternalDiff => Command::new("diff").arg("-U0").arg(&ref_path).arg(&cand_path).output().ok()?,
        DiffTool::ExternalGitDiff => Command::new("git")
            .arg("diff")
            .arg("--no-index")
            .arg("--unified=0")
            .arg(&ref_path)
            .arg(&cand_path)
            .output()
            .ok()?,
        DiffTool::Builtin => unreachable!(),
    };
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_hunk_headers(diff_text: &str) -> Vec<Hunk> {
    diff_text
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("@@ -")?;
            let (old, rest) = rest.split_once(" +")?;
            let (new, _) = rest.split_once(" @@")?;
            Some(Hunk { deletions: parse_range_len(old), additions: parse_range_len(new) })
        })
        .collect()
}

fn parse_range_len(range: &str) -> u64 {
    match range.split_once(',') {
        Some((_, len)) => len.parse().unwrap_or(1),
        None => 1,
    }
}

/// Pure-Rust zero-context diff via a longest-common-subsequence line
/// match, producing the same `(deletions, additions)` hunk shape a
/// `diff -U0` would, without shelling out.
fn builtin_diff_hunks(reference: &[u8], candidate: &[u8]) -> Vec<Hunk> {
    let ref_lines = split_lines(reference);
    let cand_lines = split_lines(candidate);
    let ops = lcs_diff_ops(&ref_lines, &cand_lines);

    let mut hunks = Vec::new();
    let mut i = 0;
    while i < ops.len() {
        match ops[i] {
            Op::Equal => i += 1,
            Op::Delete | Op::Insert => {
                let mut deletions = 0u64;
                let mut additions = 0u64;
                while i < ops.len() && ops[i] != Op::Equal {
                    match ops[i] {
                        Op::Delete => deletions += 1,
                        Op::Insert => additions += 1,
                        Op::Equal => unreachable!(),
                    }
                    i += 1;
                }
                hunks.push(Hunk { deletions: deletions.max(1), additions: additions.max(1) });
            }
        }
    }
    hunks
}

fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    data.split(|&b| b == b'\n').collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

fn lcs_diff_ops(a: &[&[u8]], b: &[&[u8]]) -> Vec<Op> {
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] =
                if a[i] == b[j] { table[i + 1][j + 1] + 1 } else { table[i + 1][j].max(table[i][j + 1]) };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op::Equal);
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op::Delete);
            i += 1;
        } else {
            ops.push(Op::Insert);
            j += 1;
        }
    }
    while i < n {
        ops.push(Op::Delete);
        i += 1;
    }
    while j < m {
        ops.push(Op::Insert);
        j += 1;
    }
    ops
}

/// Startup self-validation: diff a small reference program against two
/// known modifications and assert the expected ordering. A non-conforming
/// tool is rejected before the search begins.
pub fn validate_diff_tool(tool: DiffTool) -> Result<(), String> {
    let reference = b"line one\nline two\nline three\n";
    let small_change = b"line one\nline TWO\nline three\n";
    let big_change = b"totally different\n";

    let small = metric_for_mindiff(tool, reference, small_change);
    let big = metric_for_mindiff(tool, reference, big_change);
    let identical = metric_for_mindiff(tool, reference, reference);

    if identical != 0 {
        return Err(format!("diff tool {:?} reported nonzero distance for identical input: {}", tool, identical));
    }
    if !(small < big) {
        return Err(format!("diff tool {:?} did not order a small change below a large one ({} vs {})", tool, small, big));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_have_zero_distance() {
        let text = b"abc\ndef\n";
        assert_eq!(metric_for_mindiff(DiffTool::Builtin, text, text), 0);
    }

    #[test]
    fn distance_against_empty_is_large() {
        let reference: Vec<u8> = (0..200).map(|_| b'x').flat_map(|b| vec![b, b'\n']).collect();
        let line_count = count_lines(&reference) as i64;
        let metric = metric_for_mindiff(DiffTool::Builtin, &reference, b"");
        assert!(metric >= 2 + line_count);
    }

    #[test]
    fn pathological_near_empty_outputs_are_disfavored() {
        let reference: Vec<u8> = (0..200).flat_map(|_| b"    indented\n".to_vec()).collect();
        let two_space: Vec<u8> = (0..200).flat_map(|_| b"  indented\n".to_vec()).collect();
        let empty = b"".to_vec();
        let single_newline = b"\n".to_vec();

        let dist_two_space = metric_for_mindiff(DiffTool::Builtin, &reference, &two_space);
        let dist_empty = metric_for_mindiff(DiffTool::Builtin, &reference, &empty);
        let dist_newline = metric_for_mindiff(DiffTool::Builtin, &reference, &single_newline);

        assert!(dist_two_space < dist_empty);
        assert!(dist_two_space < dist_newline);
    }

    #[test]
    fn builtin_tool_passes_self_validation() {
        assert!(validate_diff_tool(DiffTool::Builtin).is_ok());
    }

    #[test]
    fn hunk_header_parsing_defaults_omitted_length_to_one() {
        let text = "@@ -5 +5 @@\n-old\n+new\n";
        let hunks = parse_hunk_headers(text);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].deletions, 1);
        assert_eq!(hunks[0].additions, 1);
    }
}
