use std::ops::Range;

use codepal_types::PendingAction;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::escape::{escape_attr, unescape_attr};

/// Every action marker starts with this. A fenced block already followed by
/// it is considered annotated.
pub const MARKER_PREFIX: &str = "\n\n<div class=\"action-button\"";

static INSERT_CODE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<insert-code>(.*?)</insert-code>").unwrap());

static CREATE_FILE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<create-file path="(.*?)">(.*?)</create-file>"#).unwrap());

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[a-z]*\n([\s\S]*?)\n```").unwrap());

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<div class="action-button" data-action="(?:insertCode" data-code="([^"]*)"|createFile" data-path="([^"]*)" data-content="([^"]*)")>"#,
    )
    .unwrap()
});

/// Rewrites directives in a model reply into action markers and reads them back.
pub trait DirectiveParser: Send + Sync {
    fn annotate(&self, raw: &str) -> String;

    fn extract_actions(&self, annotated: &str) -> Vec<PendingAction>;
}

/// Parser for `<insert-code>`, `<create-file path="...">` and fenced code blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupDirectiveParser;

impl DirectiveParser for MarkupDirectiveParser {
    fn annotate(&self, raw: &str) -> String {
        annotate(raw)
    }

    fn extract_actions(&self, annotated: &str) -> Vec<PendingAction> {
        extract_actions(annotated)
    }
}

fn insert_code_marker(code: &str) -> String {
    format!(
        "<div class=\"action-button\" data-action=\"insertCode\" data-code=\"{}\">📋 Insert this code</div>",
        escape_attr(code)
    )
}

fn create_file_marker(path: &str, content: &str) -> String {
    let path = escape_attr(path);
    format!(
        "<div class=\"action-button\" data-action=\"createFile\" data-path=\"{}\" data-content=\"{}\">📁 Create file {}</div>",
        path,
        escape_attr(content),
        path
    )
}

/// Replaces directive tags with markers and appends an insert marker after
/// every fenced block that does not already carry one.
///
/// Text that only half-matches a directive is left as is. Running this on its
/// own output changes nothing.
pub fn annotate(raw: &str) -> String {
    let text = INSERT_CODE_TAG.replace_all(raw, |caps: &Captures| {
        format!("\n\n{}\n\n", insert_code_marker(&caps[1]))
    });

    let text = CREATE_FILE_TAG.replace_all(&text, |caps: &Captures| {
        format!("\n\n{}\n\n", create_file_marker(&caps[1], &caps[2]))
    });

    annotate_fenced_blocks(&text)
}

/// Fences that start inside a marker belong to its attribute values and are
/// skipped, resuming the search after that marker.
fn annotate_fenced_blocks(text: &str) -> String {
    let markers: Vec<(usize, usize)> = MARKER
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = FENCED_BLOCK.captures_at(text, pos) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let start = whole.start();
        if let Some(&(_, marker_end)) = markers
            .iter()
            .find(|(s, e)| *s <= start && start < *e)
        {
            pos = marker_end;
            continue;
        }
        pos = whole.end();
        out.push_str(&text[last..whole.end()]);
        last = whole.end();

        if text[whole.end()..].starts_with(MARKER_PREFIX) {
            continue;
        }
        out.push_str("\n\n");
        out.push_str(&insert_code_marker(body.as_str()));
        out.push('\n');
    }

    out.push_str(&text[last..]);
    out
}

/// An action marker found in annotated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAction {
    /// Byte range of the whole `<div ...>label</div>` element.
    pub span: Range<usize>,
    pub action: PendingAction,
}

fn action_from(caps: &Captures) -> Option<PendingAction> {
    if let Some(code) = caps.get(1) {
        return Some(PendingAction::InsertCode {
            code: unescape_attr(code.as_str()),
        });
    }
    match (caps.get(2), caps.get(3)) {
        (Some(path), Some(content)) => Some(PendingAction::CreateFile {
            path: unescape_attr(path.as_str()),
            content: unescape_attr(content.as_str()),
        }),
        _ => None,
    }
}

/// Markers in `annotated` with their positions, in document order.
pub fn locate_actions(annotated: &str) -> Vec<LocatedAction> {
    const CLOSE: &str = "</div>";
    MARKER
        .captures_iter(annotated)
        .filter_map(|caps| {
            let open = caps.get(0)?;
            let action = action_from(&caps)?;
            let end = annotated[open.end()..]
                .find(CLOSE)
                .map_or(open.end(), |i| open.end() + i + CLOSE.len());
            Some(LocatedAction {
                span: open.start()..end,
                action,
            })
        })
        .collect()
}

/// Pending actions carried by the markers in `annotated`, in document order.
pub fn extract_actions(annotated: &str) -> Vec<PendingAction> {
    locate_actions(annotated)
        .into_iter()
        .map(|located| located.action)
        .collect()
}
