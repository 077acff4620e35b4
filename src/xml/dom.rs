//! Element tree with path queries.
//!
//! Paths are slash-separated tag names relative to the element they are
//! queried on, e.g. `"kpoints/varray"` or
//! `"calculation/eigenvalues/array/set/set/set"`. A path step matches child
//! elements by tag only; attributes are preserved but never consulted by the
//! query API (the data layer selects records positionally).

/// A parsed XML document. `root` is the single document element.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
}

/// One element node: tag, attributes in document order, child elements and
/// the concatenated character data directly inside this element.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Document {
    /// First element matching `path`, starting below the root element.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.root.find(path)
    }

    /// All elements matching `path` in document order, below the root.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        self.root.find_all(path)
    }
}

impl Element {
    /// Attribute value by name, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements with the given tag.
    pub fn children_tagged<'s, 't>(
        &'s self,
        tag: &'t str,
    ) -> impl Iterator<Item = &'s Element> + 't
    where
        's: 't,
    {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First descendant matching the slash-separated `path`, in document
    /// order. Each step descends one level by tag name.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let mut steps = path.split('/');
        let first = steps.next()?;
        let rest: Vec<&str> = steps.collect();
        self.find_first(first, &rest)
    }

    fn find_first<'a>(&'a self, step: &str, rest: &[&str]) -> Option<&'a Element> {
        for child in self.children_tagged(step) {
            if rest.is_empty() {
                return Some(child);
            }
            if let Some(found) = child.find_first(rest[0], &rest[1..]) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching the slash-separated `path`, in document
    /// order. Every combination of matching steps contributes.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let steps: Vec<&str> = path.split('/').collect();
        let mut out = Vec::new();
        if !steps.is_empty() {
            self.collect_all(steps[0], &steps[1..], &mut out);
        }
        out
    }

    fn collect_all<'a>(&'a self, step: &str, rest: &[&str], out: &mut Vec<&'a Element>) {
        // lifetime 'a ties collected references to `self`, independent of `step`.
        for child in self.children_tagged(step) {
            if rest.is_empty() {
                out.push(child);
            } else {
                child.collect_all(rest[0], &rest[1..], out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;

    const DOC: &str = r#"
        <root>
          <a name="first"><b><c>one</c><c>two</c></b></a>
          <a name="second"><b><c>three</c></b></a>
          <d>leaf</d>
        </root>
    "#;

    #[test]
    fn find_returns_first_in_document_order() {
        let doc = parse(DOC).unwrap();
        let c = doc.find("a/b/c").unwrap();
        assert_eq!(c.text.trim(), "one");
    }

    #[test]
    fn find_all_collects_every_combination() {
        let doc = parse(DOC).unwrap();
        let texts: Vec<&str> = doc
            .find_all("a/b/c")
            .iter()
            .map(|e| e.text.trim())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn find_missing_path_is_none() {
        let doc = parse(DOC).unwrap();
        assert!(doc.find("a/x").is_none());
        assert!(doc.find_all("z").is_empty());
    }

    #[test]
    fn attributes_are_queryable() {
        let doc = parse(DOC).unwrap();
        let a = doc.find("a").unwrap();
        assert_eq!(a.attr("name"), Some("first"));
        assert_eq!(a.attr("missing"), None);
    }

    #[test]
    fn children_tagged_filters_by_tag() {
        let doc = parse(DOC).unwrap();
        assert_eq!(doc.root.children_tagged("a").count(), 2);
        assert_eq!(doc.root.children_tagged("d").count(), 1);
    }
}
