//! Line classifier for compiled configuration text.
//!
//! Splits a YAML-ish document into lines tagged with the block they belong
//! to: a procedural lambda body, the retained GUI tree, or anything else.
//! Block extent follows indentation, so no YAML parser is needed and
//! malformed documents still scan.

use std::sync::LazyLock;

use regex::Regex;

static LAMBDA_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:-\s*)?lambda:\s*\|-").expect("BUG: invalid LAMBDA_OPENER regex literal")
});

static RETAINED_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*lvgl:").expect("BUG: invalid RETAINED_OPENER regex literal"));

static TOP_LEVEL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+:").expect("BUG: invalid TOP_LEVEL_KEY regex literal"));

/// Which block a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Outside any recognized block, including block opener lines.
    Normal,
    /// Inside a `lambda: |-` body.
    Procedural,
    /// Inside the `lvgl:` tree.
    RetainedGui,
}

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    /// Block membership.
    pub kind: BlockKind,
    /// One-based line number in the input.
    pub line_no: usize,
    /// Line text with tabs expanded to four spaces.
    pub text: String,
}

struct OpenBlock {
    kind: BlockKind,
    opener_indent: usize,
    indent: Option<usize>,
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn opener(line: &str) -> Option<BlockKind> {
    if LAMBDA_OPENER.is_match(line) {
        Some(BlockKind::Procedural)
    } else if RETAINED_OPENER.is_match(line) {
        Some(BlockKind::RetainedGui)
    } else {
        None
    }
}

/// Classify every line of `text`.
///
/// The output has exactly one entry per input line.
#[must_use]
pub fn scan(text: &str) -> Vec<BlockLine> {
    let mut lines = Vec::new();
    let mut block: Option<OpenBlock> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.replace('\t', "    ");
        let indent = indent_of(&line);
        let blank = line.trim().is_empty();

        if let Some(open) = &mut block {
            let stays = if blank {
                true
            } else if indent == 0 && TOP_LEVEL_KEY.is_match(&line) {
                false
            } else {
                match open.indent {
                    Some(fixed) => indent >= fixed,
                    None => {
                        if indent > open.opener_indent || indent == 0 {
                            if indent > 0 {
                                open.indent = Some(indent);
                            }
                            true
                        } else {
                            false
                        }
                    }
                }
            };
            if stays {
                lines.push(BlockLine {
                    kind: open.kind,
                    line_no: index + 1,
                    text: line,
                });
                continue;
            }
            block = None;
        }

        if let Some(kind) = opener(&line) {
            block = Some(OpenBlock {
                kind,
                opener_indent: indent,
                indent: None,
            });
        }
        lines.push(BlockLine {
            kind: BlockKind::Normal,
            line_no: index + 1,
            text: line,
        });
    }
    lines
}
