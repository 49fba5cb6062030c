//! Dynamic XML Reader
//!
//! Entry point that owns the root element of a loaded document and forwards
//! member access and iteration to it. Every load parses the whole input and
//! replaces the previous tree; a failed load leaves the previous tree in
//! place.

use crate::dom::{self, ParseOptions};
use crate::error::{Error, Result};
use crate::item::{Element, Entries, Item, Segment, Value};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Default)]
pub struct Reader {
    root: Option<Element>,
    options: ParseOptions,
}

impl Reader {
    /// Create a reader with no document loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unloaded reader using the given parser options
    pub fn with_options(options: ParseOptions) -> Self {
        Reader { root: None, options }
    }

    /// Create a reader and load the XML read from `reader`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut this = Self::new();
        this.load_reader(reader)?;
        Ok(this)
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Change the parser options used by subsequent loads
    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    /// Parse `data` and make it the current document
    pub fn load(&mut self, data: &str) -> Result<()> {
        let node = dom::parse(data, self.options).inspect_err(|e| {
            debug!("failed to load XML document: {}", e);
        })?;

        debug!(
            "loaded XML document <{}> with {} top-level elements ({:?})",
            node.name(),
            node.children().len(),
            self.options
        );
        self.root = Some(Element::new(node));
        Ok(())
    }

    /// Read all of `reader` and load it
    pub fn load_reader<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut data = String::new();
        reader.read_to_string(&mut data)?;
        self.load(&data)
    }

    /// Open, read and load the file at `path`
    ///
    /// The file is closed before this returns, whatever the outcome.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("loading XML file {}", path.display());
        let file = File::open(path)?;
        self.load_reader(file)
    }

    /// The root element of the loaded document
    pub fn root(&self) -> Result<&Element> {
        self.root.as_ref().ok_or(Error::InvalidState)
    }

    /// Look up a member of the root element
    pub fn member(&self, name: &str) -> Result<Option<&Value>> {
        self.root()?.member(name)
    }

    /// Iterate over the root element's `(name, value)` entries
    pub fn entries(&self) -> Result<Entries<'_>> {
        self.root()?.entries()
    }

    /// Follow `segments` from the root element
    ///
    /// The first step must name a member of the root; an empty path or a
    /// leading index resolves to `None`.
    pub fn path(&self, segments: &[Segment]) -> Result<Option<&Value>> {
        let root = self.root()?;
        let Some((first, rest)) = segments.split_first() else {
            return Ok(None);
        };

        let start = match first {
            Segment::Name(name) => root.member(name)?,
            Segment::Index(_) => None,
        };

        match start {
            Some(value) => value.path(rest),
            None => Ok(None),
        }
    }
}

impl FromStr for Reader {
    type Err = Error;

    fn from_str(data: &str) -> Result<Self> {
        let mut reader = Self::new();
        reader.load(data)?;
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Converted, Shape};
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xml>
    <errors>
        <error>This is error 1</error>
        <data>
            <str>username</str>
            <str>password</str>
        </data>
    </errors>
    <errors>
        <error>This is error 2</error>
        <error>This is error 3</error>
    </errors>
    <message>This is message</message>
</xml>"#;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_unloaded_reader_is_invalid_state() {
        let reader = Reader::new();
        assert!(!reader.is_loaded());
        assert!(matches!(reader.member("x"), Err(Error::InvalidState)));
        assert!(matches!(reader.entries(), Err(Error::InvalidState)));
        assert!(matches!(reader.root(), Err(Error::InvalidState)));
        assert!(matches!(reader.path(&[Segment::from("x")]), Err(Error::InvalidState)));
    }

    #[test]
    fn test_repeated_groups() {
        init_logging();
        let reader: Reader = "<xml><errors><error>E1</error></errors><errors><error>E2</error><error>E3</error></errors></xml>"
            .parse()
            .unwrap();

        let errors = reader.member("errors").unwrap().and_then(Value::as_array).unwrap();
        assert_eq!(errors.len(), 2);

        let first = errors.get(0).unwrap().unwrap();
        assert_eq!(first.member("error").unwrap().and_then(Value::as_str), Some("E1"));

        let second = errors.get(1).unwrap().unwrap();
        let nested = second.member("error").unwrap().and_then(Value::as_array).unwrap();
        assert_eq!(nested.as_string_list().unwrap(), ["E2", "E3"]);
    }

    #[test]
    fn test_entity_decoded_string_list() {
        let reader: Reader = "<xml><item>a</item><item>b&#45;c</item></xml>".parse().unwrap();
        let item = reader.member("item").unwrap().and_then(Value::as_array).unwrap();

        let Converted::StringList(strings) = item.convert(Shape::StringList).unwrap() else {
            panic!("Expected StringList");
        };
        assert_eq!(strings, ["a", "b-c"]);
    }

    #[test]
    fn test_empty_root() {
        let reader: Reader = "<xml/>".parse().unwrap();
        assert!(reader.member("anything").unwrap().is_none());
        assert_eq!(reader.entries().unwrap().count(), 0);
    }

    #[test]
    fn test_sample_document_walk() {
        let reader: Reader = SAMPLE.parse().unwrap();

        let names: Vec<_> = reader.entries().unwrap().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["errors", "message"]);
        assert_eq!(reader.member("message").unwrap().map(Value::to_string).as_deref(), Some("This is message"));

        let path: Vec<Segment> = vec!["errors".into(), Segment::Index(0), "data".into(), "str".into()];
        let strs = reader.path(&path).unwrap().and_then(Value::as_array).unwrap();
        assert_eq!(strs.as_string_list().unwrap(), ["username", "password"]);

        let missing: Vec<Segment> = vec!["errors".into(), Segment::Index(1), "data".into()];
        assert!(reader.path(&missing).unwrap().is_none());
        assert!(reader.path(&[]).unwrap().is_none());
        assert!(reader.path(&[Segment::Index(0)]).unwrap().is_none());
    }

    #[test]
    fn test_members_are_cached() {
        let reader: Reader = SAMPLE.parse().unwrap();
        let first = reader.member("errors").unwrap().unwrap() as *const Value;
        let second = reader.member("errors").unwrap().unwrap() as *const Value;
        assert_eq!(first, second);
    }

    #[test]
    fn test_reload_replaces_tree() {
        let mut reader: Reader = "<a><x>1</x></a>".parse().unwrap();
        reader.load("<b><y>2</y></b>").unwrap();
        assert!(reader.member("x").unwrap().is_none());
        assert_eq!(reader.member("y").unwrap().and_then(Value::as_str), Some("2"));
    }

    #[test]
    fn test_malformed_keeps_previous_tree() {
        let mut reader: Reader = "<a><x>1</x></a>".parse().unwrap();
        let result = reader.load("<a><x>1</a>");
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
        assert_eq!(reader.member("x").unwrap().and_then(Value::as_str), Some("1"));
    }

    #[test]
    fn test_malformed_from_str() {
        assert!(matches!("not xml".parse::<Reader>(), Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_from_reader() {
        let reader = Reader::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(reader.member("errors").unwrap().is_some());
    }

    #[test]
    fn test_load_reader_invalid_utf8() {
        let mut reader = Reader::new();
        let result = reader.load_reader(&b"<\xff\xfe>"[..]);
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!reader.is_loaded());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut reader = Reader::new();
        reader.load_file(file.path()).unwrap();
        assert!(reader.is_loaded());
        assert_eq!(reader.member("message").unwrap().and_then(Value::as_str), Some("This is message"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = Reader::new();
        let result = reader.load_file(dir.path().join("missing.xml"));
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!reader.is_loaded());
    }

    #[test]
    fn test_doctype_document_loads_by_default() {
        let reader: Reader = "<!DOCTYPE xml><xml><a>1</a></xml>".parse().unwrap();
        assert_eq!(reader.member("a").unwrap().and_then(Value::as_str), Some("1"));
    }

    #[test]
    fn test_options_apply_to_later_loads() {
        let doctype = "<!DOCTYPE a><a><b>1</b></a>";
        let mut reader = Reader::new();
        reader.load(doctype).unwrap();

        reader.set_options(ParseOptions {
            allow_dtd: false,
            ..ParseOptions::default()
        });
        assert!(matches!(reader.load("<!DOCTYPE c><c/>"), Err(Error::MalformedDocument(_))));
        assert_eq!(reader.member("b").unwrap().and_then(Value::as_str), Some("1"));
    }

    #[test]
    fn test_deeply_nested_document_is_an_error() {
        let depth = 3000;
        let deep = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));

        let mut reader: Reader = "<a><x>1</x></a>".parse().unwrap();
        assert!(matches!(reader.load(&deep), Err(Error::DepthLimitExceeded(_))));
        assert_eq!(reader.member("x").unwrap().and_then(Value::as_str), Some("1"));

        let mut shallow = Reader::with_options(ParseOptions {
            max_depth: 3,
            ..ParseOptions::default()
        });
        assert!(matches!(shallow.load("<a><b><c><d/></c></b></a>"), Err(Error::DepthLimitExceeded(3))));
        shallow.load("<a><b><c/></b></a>").unwrap();
    }
}
