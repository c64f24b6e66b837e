//! Page-document (PDF) decoder.
//!
//! Each page becomes one string: the page's text fragments, in the order its content stream
//! emits them, joined by single spaces. Shown strings are decoded through the encoding of the
//! font selected with `Tf` (including `ToUnicode` maps), and text drawn inside form XObjects is
//! followed. A page whose extraction fails is skipped with a warning and the remaining pages are
//! still decoded.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::content::{Content, Operation};
use lopdf::{decode_text_string, Dictionary, Document, Encoding, Object, ObjectId, Stream};
use thiserror::Error;

use crate::error::{DecodeResult, ParseError};
use crate::types::DatasetType;

use super::observability::IngestionWarning;

/// Deepest chain of nested form XObjects that is followed.
const MAX_FORM_DEPTH: usize = 8;

/// A page-oriented document that can hand out text fragments page by page.
pub trait PageSource {
    /// Error raised when a single page cannot be extracted.
    type Error: fmt::Display;

    /// Page numbers (1-based) in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Text fragments of one page, in emission order.
    fn page_fragments(&self, page: u32) -> Result<Vec<String>, Self::Error>;
}

/// Failure to extract one page of a [`LopdfSource`].
#[derive(Debug, Error)]
pub enum PageExtractError {
    #[error("page {0} does not exist")]
    Missing(u32),
    #[error(transparent)]
    Pdf(#[from] lopdf::Error),
}

/// [`PageSource`] backed by an in-memory `lopdf` document.
pub struct LopdfSource {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Open a document from raw bytes.
    pub fn load(bytes: &[u8]) -> DecodeResult<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            ParseError::new(DatasetType::Pdf, format!("cannot open document: {e}"))
        })?;
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }
}

impl fmt::Debug for LopdfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LopdfSource")
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl PageSource for LopdfSource {
    type Error = PageExtractError;

    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<String>, Self::Error> {
        let page_id = *self.pages.get(&page).ok_or(PageExtractError::Missing(page))?;
        let resources = page_resources(&self.doc, page_id)?;
        let content = Content::decode(&self.doc.get_page_content(page_id)?)?;

        let mut collector = TextCollector::new(&self.doc);
        collector.walk(&content.operations, &resources)?;
        Ok(collector.fragments)
    }
}

/// Fonts and form XObjects visible to one content stream, keyed by resource name.
#[derive(Clone, Default)]
struct Resources<'a> {
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    forms: BTreeMap<Vec<u8>, (ObjectId, &'a Stream)>,
}

fn page_resources(doc: &Document, page_id: ObjectId) -> lopdf::Result<Resources<'_>> {
    let fonts = doc.get_page_fonts(page_id)?;
    let (own, inherited) = doc.get_page_resources(page_id)?;

    // The page's own entries shadow the ones inherited from the page tree.
    let mut forms = BTreeMap::new();
    let dicts = own
        .into_iter()
        .chain(inherited.iter().filter_map(|id| doc.get_dictionary(*id).ok()));
    for resources in dicts {
        for (name, form) in form_xobjects(doc, resources) {
            forms.entry(name).or_insert(form);
        }
    }
    Ok(Resources { fonts, forms })
}

/// Resources of a form XObject: its own dictionary layered over the caller's.
fn form_resources<'a>(doc: &'a Document, form: &'a Stream, outer: &Resources<'a>) -> Resources<'a> {
    let mut resources = outer.clone();
    if let Ok(own) = doc.get_dict_in_dict(&form.dict, b"Resources") {
        resources.fonts.extend(font_dicts(doc, own));
        resources.forms.extend(form_xobjects(doc, own));
    }
    resources
}

fn font_dicts<'a>(doc: &'a Document, resources: &'a Dictionary) -> Vec<(Vec<u8>, &'a Dictionary)> {
    let Ok(fonts) = doc.get_dict_in_dict(resources, b"Font") else {
        return Vec::new();
    };
    fonts
        .iter()
        .filter_map(|(name, value)| {
            let font = match value {
                Object::Reference(id) => doc.get_dictionary(*id).ok()?,
                Object::Dictionary(dict) => dict,
                _ => return None,
            };
            Some((name.clone(), font))
        })
        .collect()
}

fn form_xobjects<'a>(doc: &'a Document, resources: &'a Dictionary) -> Vec<(Vec<u8>, (ObjectId, &'a Stream))> {
    let Ok(xobjects) = doc.get_dict_in_dict(resources, b"XObject") else {
        return Vec::new();
    };
    xobjects
        .iter()
        .filter_map(|(name, value)| {
            let id = value.as_reference().ok()?;
            let stream = doc.get_object(id).and_then(Object::as_stream).ok()?;
            let is_form = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|subtype| subtype == b"Form");
            is_form.then(|| (name.clone(), (id, stream)))
        })
        .collect()
}

/// Walks content operations and collects decoded text fragments.
struct TextCollector<'a> {
    doc: &'a Document,
    fragments: Vec<String>,
    form_stack: Vec<ObjectId>,
}

impl<'a> TextCollector<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fragments: Vec::new(),
            form_stack: Vec::new(),
        }
    }

    /// Text-showing operands (`Tj`, `'`, `"`, `TJ`) in order. A `TJ` array is one fragment.
    fn walk(&mut self, operations: &[Operation], resources: &Resources<'a>) -> lopdf::Result<()> {
        let mut encoding: Option<Encoding<'a>> = None;
        for op in operations {
            match op.operator.as_str() {
                "Tf" => {
                    let font = op
                        .operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| resources.fonts.get(name).copied());
                    encoding = match font {
                        Some(font) => Some(font.get_font_encoding(self.doc)?),
                        None => None,
                    };
                }
                "Tj" | "'" | "\"" => {
                    if let Some(operand) = op.operands.last() {
                        let text = shown_text(encoding.as_ref(), operand)?;
                        self.push(text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let mut text = String::new();
                        for item in items {
                            text.push_str(&shown_text(encoding.as_ref(), item)?);
                        }
                        self.push(text);
                    }
                }
                "Do" => {
                    let form = op
                        .operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| resources.forms.get(name));
                    if let Some(&(id, form)) = form {
                        self.walk_form(id, form, resources)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_form(&mut self, id: ObjectId, form: &'a Stream, outer: &Resources<'a>) -> lopdf::Result<()> {
        if self.form_stack.len() >= MAX_FORM_DEPTH || self.form_stack.contains(&id) {
            tracing::debug!(form = ?id, "not following nested form");
            return Ok(());
        }
        let content = Content::decode(&form.get_plain_content()?)?;
        let resources = form_resources(self.doc, form, outer);

        self.form_stack.push(id);
        let result = self.walk(&content.operations, &resources);
        self.form_stack.pop();
        result
    }

    fn push(&mut self, text: String) {
        if !text.is_empty() {
            self.fragments.push(text);
        }
    }
}

/// Decode one string operand. Non-string operands (kerning offsets in `TJ`) yield nothing.
///
/// Without a selected font the bytes are read as a PDF text string (UTF-16BE with a byte-order
/// mark, otherwise PDFDocEncoding).
fn shown_text(encoding: Option<&Encoding<'_>>, operand: &Object) -> lopdf::Result<String> {
    match (operand, encoding) {
        (Object::String(bytes, _), Some(encoding)) => Document::decode_text(encoding, bytes),
        (Object::String(..), None) => decode_text_string(operand),
        _ => Ok(String::new()),
    }
}

/// Decode a PDF into one text string per page.
pub fn decode_pdf(bytes: &[u8], warnings: &mut Vec<IngestionWarning>) -> DecodeResult<Vec<String>> {
    let source = LopdfSource::load(bytes)?;
    decode_pages(&source, warnings)
}

/// Extract every page of `source`, skipping (and reporting) pages that fail.
///
/// Fails with "no text content found" when no page could be extracted.
pub fn decode_pages<S: PageSource>(
    source: &S,
    warnings: &mut Vec<IngestionWarning>,
) -> DecodeResult<Vec<String>> {
    let mut pages = Vec::new();
    for page in source.page_numbers() {
        match source.page_fragments(page) {
            Ok(fragments) => pages.push(fragments.join(" ")),
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping page that failed text extraction");
                warnings.push(IngestionWarning::PageSkipped {
                    page,
                    message: e.to_string(),
                });
            }
        }
    }

    if pages.is_empty() {
        return Err(ParseError::new(DatasetType::Pdf, "no text content found"));
    }
    Ok(pages)
}
