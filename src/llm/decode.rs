//! Line splitting for streaming HTTP bodies.
//!
//! Network reads can end anywhere, including inside a multi-byte UTF-8
//! sequence. Lines are therefore assembled from raw bytes and decoded only
//! once complete; decoding per read would turn a split character into
//! replacement characters in the delivered answer.

/// Append nothing; drain every complete `\n`-terminated line from `buf`,
/// decoded and trimmed. A partial trailing line stays in the buffer for
/// the next read.
pub(crate) fn drain_complete_lines(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buf.drain(..=pos).collect();
        lines.push(String::from_utf8_lossy(&raw).trim().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_partial_line_until_newline_arrives() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"{\"content\":\"hello");
        assert!(drain_complete_lines(&mut buf).is_empty());

        buf.extend_from_slice(b"\"}\n");
        assert_eq!(drain_complete_lines(&mut buf), vec!["{\"content\":\"hello\"}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn multibyte_character_split_across_reads_stays_intact() {
        // "conteúdo" with the 'ú' (0xC3 0xBA) split at a read boundary.
        let mut buf = Vec::new();
        buf.extend_from_slice(b"conte\xC3");
        assert!(drain_complete_lines(&mut buf).is_empty());

        buf.extend_from_slice(b"\xBAdo\n");
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines, vec!["conteúdo"]);
        assert!(!lines[0].contains('\u{FFFD}'));
    }

    #[test]
    fn drains_multiple_lines_from_one_read() {
        let mut buf = b"first\nsecond\nthird".to_vec();
        assert_eq!(drain_complete_lines(&mut buf), vec!["first", "second"]);
        assert_eq!(buf, b"third".to_vec());
    }
}
