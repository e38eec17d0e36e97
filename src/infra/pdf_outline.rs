// ============================================================
// Layer 6 — PDF Outline Reader
// ============================================================
// Reads the bookmark tree of a PDF with lopdf and resolves each
// bookmark's destination to a 1-based page number.
//
// Outline structure in the file:
//   Catalog /Outlines → { /First, /Last }
//     item → { /Title, /Dest | /A | /SE, /First (children), /Next }
//
// A destination can take several shapes, resolved recursively:
//   - reference to a page dictionary          → that page
//   - reference to anything else              → resolve the target
//   - dictionary with /D (also GoTo actions)  → resolve /D
//   - array [page_ref /XYZ ...]               → first reference
//   - name or string (named destination)      → catalog /Dests or
//                                               the /Names /Dests tree
//
// Priority per item: /Dest, then /A, then /SE (whose /Pg names the page).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::data::toc::OutlineEntry;
use crate::domain::error::{LabError, LabResult};

// Bounds recursion on malformed or cyclic files
const MAX_DEPTH: usize = 32;

pub struct PdfOutline {
    pub entries:     Vec<OutlineEntry>,
    pub total_pages: u32,
}

pub struct OutlineReader {
    doc:        Document,
    page_by_id: HashMap<ObjectId, u32>,
}

impl OutlineReader {
    pub fn open(path: &Path) -> LabResult<Self> {
        let doc = Document::load(path).map_err(|e| LabError::Pdf {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let page_by_id = doc.get_pages().into_iter().map(|(num, id)| (id, num)).collect();
        Self { doc, page_by_id }
    }

    pub fn total_pages(&self) -> u32 {
        self.page_by_id.len() as u32
    }

    /// Flatten the outline in reading order. A PDF without an
    /// outline yields no entries rather than an error.
    pub fn read(&self) -> PdfOutline {
        let mut entries = Vec::new();

        let first = self
            .catalog()
            .and_then(|c| c.get(b"Outlines").ok())
            .and_then(|o| self.deref_dict(o))
            .and_then(|o| o.get(b"First").ok());

        match first {
            Some(first) => {
                let mut visited = HashSet::new();
                self.walk(first, 1, &mut visited, &mut entries);
            }
            None => tracing::info!("PDF has no outline"),
        }

        PdfOutline { entries, total_pages: self.total_pages() }
    }

    fn catalog(&self) -> Option<&Dictionary> {
        self.doc.catalog().ok()
    }

    /// Visit `item` and its following siblings, children first.
    fn walk<'a>(
        &'a self,
        item:    &'a Object,
        level:   usize,
        visited: &mut HashSet<ObjectId>,
        out:     &mut Vec<OutlineEntry>,
    ) {
        let mut current = Some(item);
        while let Some(obj) = current {
            if let Object::Reference(id) = obj {
                if !visited.insert(*id) {
                    tracing::warn!("Outline cycle at object {:?}; stopping", id);
                    return;
                }
            }
            let Some(dict) = self.deref_dict(obj) else { return };

            let title = dict.get(b"Title").ok().and_then(|t| self.deref(t)).map(decode_text).unwrap_or_default();
            let page = self.item_page(dict);
            if page.is_none() {
                tracing::debug!("Bookmark '{}' has no resolvable destination", title);
            }
            out.push(OutlineEntry { level, title, page });

            if level < MAX_DEPTH {
                if let Ok(child) = dict.get(b"First") {
                    self.walk(child, level + 1, visited, out);
                }
            }
            current = dict.get(b"Next").ok();
        }
    }

    fn item_page(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve(dest, 0);
        }
        if let Ok(action) = item.get(b"A") {
            return self.resolve(action, 0);
        }
        if let Ok(se) = item.get(b"SE") {
            let pg = self.deref_dict(se)?.get(b"Pg").ok()?;
            return self.resolve(pg, 0);
        }
        None
    }

    fn resolve(&self, obj: &Object, depth: usize) -> Option<u32> {
        if depth > MAX_DEPTH {
            return None;
        }
        match obj {
            Object::Reference(id) => {
                let target = self.doc.get_object(*id).ok()?;
                if is_page(target) {
                    self.page_by_id.get(id).copied()
                } else {
                    self.resolve(target, depth + 1)
                }
            }
            Object::Dictionary(dict) => self.resolve(dict.get(b"D").ok()?, depth + 1),
            Object::Array(items) => {
                let first_ref = items.iter().find(|o| matches!(o, Object::Reference(_)))?;
                self.resolve(first_ref, depth + 1)
            }
            Object::Name(name) | Object::String(name, _) => {
                let dest = self.named_destination(name)?;
                self.resolve(dest, depth + 1)
            }
            _ => None,
        }
    }

    /// Look a named destination up in /Dests, then in the /Names tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.catalog()?;

        if let Some(dests) = catalog.get(b"Dests").ok().and_then(|d| self.deref_dict(d)) {
            if let Ok(dest) = dests.get(name) {
                return Some(dest);
            }
        }

        let tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| self.deref_dict(n))?
            .get(b"Dests")
            .ok()
            .and_then(|d| self.deref_dict(d))?;
        self.search_name_tree(tree, name, 0)
    }

    fn search_name_tree<'a>(&'a self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_DEPTH {
            return None;
        }
        if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| self.deref(n)) {
            for pair in pairs.chunks(2) {
                if let [key, value] = pair {
                    if let Some(Object::String(k, _)) = self.deref(key) {
                        if k.as_slice() == name {
                            return Some(value);
                        }
                    }
                }
            }
        }
        if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| self.deref(k)) {
            for kid in kids {
                if let Some(found) = self.deref_dict(kid).and_then(|d| self.search_name_tree(d, name, depth + 1)) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Follow references until a direct object.
    fn deref<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_DEPTH {
            match current {
                Object::Reference(id) => current = self.doc.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        None
    }

    fn deref_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.deref(obj)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }
}

fn is_page(obj: &Object) -> bool {
    let dict = match obj {
        Object::Dictionary(d) => d,
        _ => return false,
    };
    matches!(dict.get(b"Type"), Ok(Object::Name(n)) if n.as_slice() == b"Page")
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8 with BOM,
/// otherwise bytes taken as Latin-1 (close enough to PDFDocEncoding
/// for titles).
fn decode_text(obj: &Object) -> String {
    let bytes: &[u8] = match obj {
        Object::String(b, _) | Object::Name(b) => b,
        _ => return String::new(),
    };
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, StringFormat};

    /// A 4-page document with a two-level outline:
    ///   "1 Intro"       → page 1 (direct page reference)
    ///     "1.1 Scope"   → page 2 (GoTo action)
    ///   "2 Body"        → page 3 (named destination)
    pub(crate) fn sample_doc() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let page_ids: Vec<ObjectId> = (0..4)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => 4,
            }),
        );

        let outlines_id = doc.new_object_id();
        let intro_id = doc.new_object_id();
        let scope_id = doc.new_object_id();
        let body_id = doc.new_object_id();

        doc.objects.insert(
            scope_id,
            Object::Dictionary(dictionary! {
                "Title" => Object::String(b"1.1 Scope".to_vec(), StringFormat::Literal),
                "Parent" => intro_id,
                "A" => dictionary! {
                    "S" => "GoTo",
                    "D" => vec![Object::Reference(page_ids[1]), "Fit".into()],
                },
            }),
        );
        doc.objects.insert(
            intro_id,
            Object::Dictionary(dictionary! {
                "Title" => Object::String(b"1 Intro".to_vec(), StringFormat::Literal),
                "Parent" => outlines_id,
                "Dest" => vec![Object::Reference(page_ids[0]), "XYZ".into(), Object::Null, Object::Null, Object::Null],
                "First" => scope_id,
                "Last" => scope_id,
                "Next" => body_id,
            }),
        );
        // UTF-16BE title with BOM
        let mut body_title = vec![0xFE, 0xFF];
        for u in "2 Body".encode_utf16() {
            body_title.extend_from_slice(&u.to_be_bytes());
        }
        doc.objects.insert(
            body_id,
            Object::Dictionary(dictionary! {
                "Title" => Object::String(body_title, StringFormat::Hexadecimal),
                "Parent" => outlines_id,
                "Dest" => Object::Name(b"body".to_vec()),
            }),
        );
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => intro_id,
                "Last" => body_id,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "Outlines" => outlines_id,
            "Dests" => dictionary! {
                "body" => vec![Object::Reference(page_ids[2]), "Fit".into()],
            },
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_reads_outline_with_all_destination_kinds() {
        let reader = OutlineReader::from_document(sample_doc());
        let outline = reader.read();
        assert_eq!(outline.total_pages, 4);
        assert_eq!(
            outline.entries,
            vec![
                OutlineEntry { level: 1, title: "1 Intro".into(), page: Some(1) },
                OutlineEntry { level: 2, title: "1.1 Scope".into(), page: Some(2) },
                OutlineEntry { level: 1, title: "2 Body".into(), page: Some(3) },
            ]
        );
    }

    #[test]
    fn test_document_without_outline() {
        let mut doc = sample_doc();
        let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root) {
            catalog.remove(b"Outlines");
        }
        let outline = OutlineReader::from_document(doc).read();
        assert!(outline.entries.is_empty());
        assert_eq!(outline.total_pages, 4);
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("book.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        assert!(matches!(OutlineReader::open(&path), Err(LabError::Pdf { .. })));
    }

    #[test]
    fn test_decode_latin1_title() {
        let t = decode_text(&Object::String(vec![b'C', 0xE9, b't', b'e'], StringFormat::Literal));
        assert_eq!(t, "Céte");
    }
}
