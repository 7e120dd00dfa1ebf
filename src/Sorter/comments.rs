//! Comments attached to sorted reactions.
//!
//! Every sort criterion contributes a column (label and value) to the comment of a
//! reaction. Columns of the leading header criteria go to a header comment written on
//! the first reaction of each group, the rest form the inline comment:
//! `! pes.subpes.channel  3.1.1`.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentColumn {
    pub label: String,
    pub value: String,
}

impl CommentColumn {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InlineComment {
    pub cmts_inline: String,
    /// header written above the reaction when it opens a new group
    pub cmts_top: Option<String>,
    /// comment the reaction carried in the mechanism file
    pub original: Option<String>,
}

/// `! labels  values`, both joined by `.`; empty when there are no columns.
pub fn format_comment(columns: &[CommentColumn]) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    let values: Vec<&str> = columns.iter().map(|c| c.value.as_str()).collect();
    format!("! {}  {}", labels.join("."), values.join("."))
}

/// Scientific notation with two decimals and a signed two-digit exponent: `2.73e+149`.
pub fn format_sci(x: f64) -> String {
    let raw = format!("{:.2e}", x);
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => format!("{}e{}{:02}", mantissa, if e < 0 { '-' } else { '+' }, e.abs()),
            Err(_) => raw,
        },
        None => raw.to_lowercase(),
    }
}

/// Splits the columns of each reaction into header and inline parts and builds the
/// comments in output order. A header is written whenever its values differ from
/// those of the previous reaction.
pub(crate) fn build_comments(
    rows: &[(Vec<CommentColumn>, Vec<CommentColumn>)],
    originals: &[Option<String>],
) -> Vec<InlineComment> {
    let mut out = Vec::with_capacity(rows.len());
    let mut previous: Option<&Vec<CommentColumn>> = None;
    for (i, (header, inline)) in rows.iter().enumerate() {
        let cmts_top = if header.is_empty() || previous == Some(header) {
            None
        } else {
            Some(format_comment(header))
        };
        previous = Some(header);
        out.push(InlineComment {
            cmts_inline: format_comment(inline),
            cmts_top,
            original: originals.get(i).cloned().flatten(),
        });
    }
    out
}
