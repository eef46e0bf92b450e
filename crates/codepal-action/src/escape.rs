use once_cell::sync::Lazy;
use regex::Regex;

static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(amp|lt|gt|quot|#039);").unwrap());

/// Escapes `& < > " '` so the text can sit inside a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`escape_attr`]. Single pass, so `&amp;lt;` decodes to `&lt;`.
pub fn unescape_attr(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            _ => "'",
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_five() {
        assert_eq!(
            escape_attr(r#"a & b < c > d " e ' f"#),
            "a &amp; b &lt; c &gt; d &quot; e &#039; f"
        );
    }

    #[test]
    fn test_round_trip() {
        for s in [
            r#"if (a < b && c > d) { print("it's"); }"#,
            "&lt; already looks escaped &amp;",
            "&&<<>>\"\"''",
            "",
            "plain",
        ] {
            assert_eq!(unescape_attr(&escape_attr(s)), s);
        }
    }

    #[test]
    fn test_unescape_leaves_unknown_entities() {
        assert_eq!(unescape_attr("&nbsp;&lt;"), "&nbsp;<");
    }
}
