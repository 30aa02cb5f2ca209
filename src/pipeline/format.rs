//! Body Formatter — generated plain text to mail-client HTML.

/// Inline style carried by every paragraph block.
const PARAGRAPH_STYLE: &str = "margin: 0 0 1em 0; text-align: left;";

/// Format generated text as left-aligned HTML paragraphs.
///
/// Paragraphs are blank-line separated; internal newlines collapse to
/// single spaces so each paragraph renders as one flowing line.
/// Paragraphs that are empty after trimming are dropped.
pub fn format_email_body(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(|para| {
            let flowed = para.replace('\n', " ");
            format!("<p style=\"{PARAGRAPH_STYLE}\">{flowed}</p>")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_paragraphs_become_two_blocks() {
        let html = format_email_body("Para one.\n\nPara two line1\nline2");
        let blocks: Vec<&str> = html.lines().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Para one."));
        assert!(blocks[1].contains("Para two line1 line2"));
    }

    #[test]
    fn every_block_carries_style() {
        let html = format_email_body("One.\n\nTwo.");
        for line in html.lines() {
            assert!(line.starts_with("<p style=\"margin: 0 0 1em 0; text-align: left;\">"));
            assert!(line.ends_with("</p>"));
        }
    }

    #[test]
    fn single_paragraph_single_block() {
        let html = format_email_body("Just one paragraph.");
        assert_eq!(html.lines().count(), 1);
    }

    #[test]
    fn empty_input_produces_no_blocks() {
        assert_eq!(format_email_body(""), "");
    }

    #[test]
    fn blank_lines_only_produce_no_blocks() {
        assert_eq!(format_email_body("\n\n\n"), "");
        assert_eq!(format_email_body("\n\n  \n\n"), "");
    }

    #[test]
    fn empty_interior_paragraphs_dropped() {
        let html = format_email_body("One.\n\n\n\nTwo.");
        assert_eq!(html.lines().count(), 2);
    }

    #[test]
    fn output_is_deterministic() {
        let text = "Thank you.\n\nRegards.";
        assert_eq!(format_email_body(text), format_email_body(text));
    }
}
