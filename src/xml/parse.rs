//! Minimal XML parser for vasprun-class documents.
//!
//! Supports the subset VASP actually emits: one document element,
//! nested elements with attributes, character data, comments, processing
//! instructions, a DOCTYPE line, and the five predefined entities. No
//! namespaces, no CDATA.

use super::dom::{Document, Element};

/// Errors that can occur while parsing the source document.
#[derive(Debug, thiserror::Error)]
pub enum XmlParseError {
    #[error("unexpected end of input at byte offset {0}")]
    UnexpectedEof(usize),
    #[error("malformed markup at byte offset {0}")]
    MalformedMarkup(usize),
    #[error("mismatched closing tag </{found}> for <{expected}> at byte offset {offset}")]
    MismatchedTag {
        expected: String,
        found: String,
        offset: usize,
    },
    #[error("expected a single document element")]
    NoRootElement,
}

/// Parse an XML text string into a [`Document`].
pub fn parse(input: &str) -> Result<Document, XmlParseError> {
    Parser::new(input).parse_document()
}

// ---------------------------------------------------------------------------
// Internal cursor-based parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn parse_document(&mut self) -> Result<Document, XmlParseError> {
        self.skip_misc()?;
        if self.pos >= self.bytes.len() {
            return Err(XmlParseError::NoRootElement);
        }
        let root = self.parse_element()?;
        self.skip_misc()?;
        if self.pos < self.bytes.len() {
            return Err(XmlParseError::MalformedMarkup(self.pos));
        }
        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    /// between markup.
    fn skip_misc(&mut self) -> Result<(), XmlParseError> {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.rest().starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
            } else if self.rest().starts_with("<!DOCTYPE") {
                self.skip_until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), XmlParseError> {
        match self.rest().find(terminator) {
            Some(idx) => {
                self.pos += idx + terminator.len();
                Ok(())
            }
            None => Err(XmlParseError::UnexpectedEof(self.pos)),
        }
    }

    /// Parse one element. The cursor must sit on its opening `<`.
    fn parse_element(&mut self) -> Result<Element, XmlParseError> {
        if self.bytes.get(self.pos) != Some(&b'<') {
            return Err(XmlParseError::MalformedMarkup(self.pos));
        }
        self.pos += 1;
        let tag = self.scan_name()?;
        let attrs = self.scan_attributes()?;

        // Self-closing form.
        if self.rest().starts_with("/>") {
            self.pos += 2;
            return Ok(Element {
                tag,
                attrs,
                children: Vec::new(),
                text: String::new(),
            });
        }
        if self.bytes.get(self.pos) != Some(&b'>') {
            return Err(XmlParseError::MalformedMarkup(self.pos));
        }
        self.pos += 1;

        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            if self.pos >= self.bytes.len() {
                return Err(XmlParseError::UnexpectedEof(self.pos));
            }
            if self.bytes[self.pos] == b'<' {
                if self.rest().starts_with("</") {
                    let offset = self.pos;
                    self.pos += 2;
                    let closing = self.scan_name()?;
                    if closing != tag {
                        return Err(XmlParseError::MismatchedTag {
                            expected: tag,
                            found: closing,
                            offset,
                        });
                    }
                    self.skip_whitespace();
                    if self.bytes.get(self.pos) != Some(&b'>') {
                        return Err(XmlParseError::MalformedMarkup(self.pos));
                    }
                    self.pos += 1;
                    return Ok(Element {
                        tag,
                        attrs,
                        children,
                        text,
                    });
                } else if self.rest().starts_with("<!--") {
                    self.skip_until("-->")?;
                } else if self.rest().starts_with("<?") {
                    self.skip_until("?>")?;
                } else {
                    children.push(self.parse_element()?);
                }
            } else {
                let start = self.pos;
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'<' {
                    self.pos += 1;
                }
                unescape_into(&self.input[start..self.pos], &mut text);
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn scan_name(&mut self) -> Result<String, XmlParseError> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || b == b'>' || b == b'/' || b == b'=' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(XmlParseError::MalformedMarkup(start));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn scan_attributes(&mut self) -> Result<Vec<(String, String)>, XmlParseError> {
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => return Err(XmlParseError::UnexpectedEof(self.pos)),
                Some(b'>') | Some(b'/') => return Ok(attrs),
                Some(_) => {
                    let name = self.scan_name()?;
                    self.skip_whitespace();
                    if self.bytes.get(self.pos) != Some(&b'=') {
                        return Err(XmlParseError::MalformedMarkup(self.pos));
                    }
                    self.pos += 1;
                    self.skip_whitespace();
                    let quote = match self.bytes.get(self.pos).copied() {
                        Some(q @ (b'"' | b'\'')) => q,
                        _ => return Err(XmlParseError::MalformedMarkup(self.pos)),
                    };
                    self.pos += 1;
                    let start = self.pos;
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
                        self.pos += 1;
                    }
                    if self.pos >= self.bytes.len() {
                        return Err(XmlParseError::UnexpectedEof(start));
                    }
                    let mut value = String::new();
                    unescape_into(&self.input[start..self.pos], &mut value);
                    self.pos += 1;
                    attrs.push((name, value));
                }
            }
        }
    }
}

/// Expand the five predefined entities; unknown entities pass through as-is.
fn unescape_into(raw: &str, out: &mut String) {
    if !raw.contains('&') {
        out.push_str(raw);
        return;
    }
    let mut rest = raw;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let expanded = [
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&amp;", '&'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(ent, _)| rest.starts_with(ent));
        match expanded {
            Some((ent, ch)) => {
                out.push(*ch);
                rest = &rest[ent.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element() {
        let doc = parse("<v> 0.5 0.5 0.5 </v>").unwrap();
        assert_eq!(doc.root.tag, "v");
        assert_eq!(doc.root.text.trim(), "0.5 0.5 0.5");
    }

    #[test]
    fn nested_elements_and_attributes() {
        let doc = parse(r#"<varray name="kpointlist"><v>a</v><v>b</v></varray>"#).unwrap();
        assert_eq!(doc.root.attr("name"), Some("kpointlist"));
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[1].text, "b");
    }

    #[test]
    fn declaration_comments_and_doctype_are_skipped() {
        let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE modeling>\n<!-- header -->\n<modeling><x>1</x></modeling>";
        let doc = parse(input).unwrap();
        assert_eq!(doc.root.tag, "modeling");
        assert_eq!(doc.root.children.len(), 1);
    }

    #[test]
    fn inline_comments_are_skipped() {
        let doc = parse("<a><b>1</b><!-- note --><b>2</b></a>").unwrap();
        assert_eq!(doc.root.children.len(), 2);
    }

    #[test]
    fn self_closing_element() {
        let doc = parse(r#"<a><i name="empty"/><b>x</b></a>"#).unwrap();
        assert_eq!(doc.root.children[0].tag, "i");
        assert!(doc.root.children[0].children.is_empty());
        assert_eq!(doc.root.children[1].text, "x");
    }

    #[test]
    fn entities_in_text_and_attributes() {
        let doc = parse(r#"<a name="x&lt;y">1 &amp; 2</a>"#).unwrap();
        assert_eq!(doc.root.attr("name"), Some("x<y"));
        assert_eq!(doc.root.text, "1 & 2");
    }

    #[test]
    fn mismatched_closing_tag() {
        let err = parse("<a><b>1</c></a>").unwrap_err();
        assert!(matches!(err, XmlParseError::MismatchedTag { .. }));
    }

    #[test]
    fn truncated_document() {
        let err = parse("<a><b>1</b>").unwrap_err();
        assert!(matches!(err, XmlParseError::UnexpectedEof(_)));
    }

    #[test]
    fn trailing_garbage_rejected() {
        let err = parse("<a/>junk").unwrap_err();
        assert!(matches!(err, XmlParseError::MalformedMarkup(_)));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(parse("  "), Err(XmlParseError::NoRootElement)));
    }

    #[test]
    fn realistic_vasprun_snippet() {
        let input = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<modeling>
 <kpoints>
  <varray name="kpointlist">
   <v>      -1.00000000      -1.00000000      -1.00000000 </v>
   <v>      -1.00000000      -1.00000000      -0.75000000 </v>
  </varray>
  <varray name="weights">
   <v>       1.00000000 </v>
   <v>       1.00000000 </v>
  </varray>
 </kpoints>
</modeling>"#;
        let doc = parse(input).unwrap();
        let varray = doc.find("kpoints/varray").unwrap();
        assert_eq!(varray.attr("name"), Some("kpointlist"));
        assert_eq!(varray.children.len(), 2);
        let first: Vec<f64> = varray.children[0]
            .text
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(first, vec![-1.0, -1.0, -1.0]);
    }
}
