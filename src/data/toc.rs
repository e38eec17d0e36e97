// ============================================================
// Layer 4 — Table of Contents Builder
// ============================================================
// Turns a flat PDF outline (level, title, page) into the nested
// page-range map the RAG pipeline uses to cut a book into
// sections:
//
//   {
//     "Introduction": { "page_start": 1, "page_end": 9, "subsections": {} },
//     "Methods": {
//       "page_start": 10, "page_end": 30,
//       "subsections": {
//         "Sampling": { "page_start": 10, "page_end": 19, "subsections": {} },
//         ...
//
// Rules, in order:
//   1. drop entries whose destination did not resolve to a page
//   2. keep level-1 entries unless their cleaned title is front or
//      back matter (Contents, Index, ...)
//   3. keep deeper entries only when they are numbered ("2.1 Foo")
//   4. an entry ends one page before the next entry at the same or
//      a shallower level starts; the last ones end on the last page
//   5. numbering prefixes are stripped from the keys

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)*\s").expect("static regex")
});

const FRONT_BACK_MATTER: [&str; 9] = [
    "Contents",
    "Preface",
    "References",
    "Index",
    "Blank Page",
    "Glossary",
    "Appendix",
    "Acknowledgments",
    "About the Author",
];

/// One bookmark as read from the PDF, levels starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub level: usize,
    pub title: String,
    pub page:  Option<u32>,
}

/// A kept bookmark with its page range.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub level:      usize,
    pub title:      String,
    pub start_page: u32,
    pub end_page:   u32,
}

pub fn is_numbered(title: &str) -> bool {
    NUMBERED.is_match(title.trim())
}

/// Strip a leading "1.2.3 " numbering prefix.
pub fn clean_title(title: &str) -> String {
    let trimmed = title.trim();
    match NUMBERED.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Apply the keep rules and compute end pages.
pub fn select_entries(outline: &[OutlineEntry], total_pages: u32) -> Vec<TocEntry> {
    let mut entries: Vec<TocEntry> = outline
        .iter()
        .filter_map(|e| {
            let page = e.page?;
            let keep = if e.level <= 1 {
                !FRONT_BACK_MATTER.contains(&clean_title(&e.title).as_str())
            } else {
                is_numbered(&e.title)
            };
            keep.then(|| TocEntry {
                level:      e.level.max(1),
                title:      e.title.clone(),
                start_page: page,
                end_page:   total_pages,
            })
        })
        .collect();

    // Stack of open entries; a new entry closes every open entry at
    // its level or deeper. Whatever is still open runs to the end.
    let mut open: Vec<usize> = Vec::new();
    for i in 0..entries.len() {
        while let Some(&top) = open.last() {
            if entries[top].level < entries[i].level {
                break;
            }
            open.pop();
            // Siblings starting on the same page would otherwise end
            // before they begin
            entries[top].end_page = entries[i].start_page.saturating_sub(1).max(entries[top].start_page);
        }
        open.push(i);
    }
    for top in open {
        entries[top].end_page = total_pages.max(entries[top].start_page);
    }

    entries
}

/// Nest entries under the closest preceding shallower entry.
fn nest(entries: &[TocEntry], pos: &mut usize, parent_level: usize) -> Map<String, Value> {
    let mut map = Map::new();
    while *pos < entries.len() && entries[*pos].level > parent_level {
        let entry = &entries[*pos];
        *pos += 1;
        let subsections = nest(entries, pos, entry.level);
        map.insert(
            clean_title(&entry.title),
            json!({
                "page_start":  entry.start_page,
                "page_end":    entry.end_page,
                "subsections": Value::Object(subsections),
            }),
        );
    }
    map
}

/// Full pipeline: outline → nested JSON object (empty when nothing is kept).
pub fn build_toc(outline: &[OutlineEntry], total_pages: u32) -> (Value, usize) {
    let entries = select_entries(outline, total_pages);
    let mut pos = 0;
    let root = nest(&entries, &mut pos, 0);
    (Value::Object(root), entries.len())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn e(level: usize, title: &str, page: Option<u32>) -> OutlineEntry {
        OutlineEntry { level, title: title.to_string(), page }
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  2.1.3 Sampling  "), "Sampling");
        assert_eq!(clean_title("Introduction"), "Introduction");
        // No whitespace after the number → not a numbering prefix
        assert_eq!(clean_title("2020s"), "2020s");
    }

    #[test]
    fn test_filters() {
        let outline = vec![
            e(1, "Contents", Some(2)),
            e(1, "Introduction", Some(3)),
            e(2, "Motivation", Some(3)),      // unnumbered sub-entry
            e(2, "1.1 Background", Some(4)),
            e(1, "Lost", None),               // unresolved destination
            e(1, "Index", Some(50)),
        ];
        let entries = select_entries(&outline, 60);
        let titles: Vec<&str> = entries.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "1.1 Background"]);
    }

    #[test]
    fn test_end_pages_follow_levels() {
        let outline = vec![
            e(1, "1 One", Some(1)),
            e(2, "1.1 A", Some(1)),
            e(2, "1.2 B", Some(5)),
            e(3, "1.2.1 Deep", Some(6)),
            e(1, "2 Two", Some(10)),
        ];
        let entries = select_entries(&outline, 20);
        let ranges: Vec<(u32, u32)> = entries.iter().map(|t| (t.start_page, t.end_page)).collect();
        assert_eq!(ranges, vec![(1, 9), (1, 4), (5, 9), (6, 9), (10, 20)]);
    }

    #[test]
    fn test_same_page_siblings_do_not_invert() {
        let outline = vec![e(1, "Intro", Some(3)), e(1, "Setup", Some(3))];
        let entries = select_entries(&outline, 8);
        assert_eq!((entries[0].start_page, entries[0].end_page), (3, 3));
        assert_eq!((entries[1].start_page, entries[1].end_page), (3, 8));
    }

    #[test]
    fn test_nested_json() {
        let outline = vec![
            e(1, "1 One", Some(1)),
            e(2, "1.1 A", Some(2)),
            e(1, "2 Two", Some(4)),
        ];
        let (toc, kept) = build_toc(&outline, 5);
        assert_eq!(kept, 3);
        assert_eq!(
            toc,
            json!({
                "One": {
                    "page_start": 1, "page_end": 3,
                    "subsections": {
                        "A": { "page_start": 2, "page_end": 3, "subsections": {} }
                    }
                },
                "Two": { "page_start": 4, "page_end": 5, "subsections": {} }
            })
        );
        // Outline order is preserved in the keys
        let keys: Vec<&String> = toc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["One", "Two"]);
    }

    #[test]
    fn test_empty_outline_gives_empty_object() {
        let (toc, kept) = build_toc(&[], 10);
        assert_eq!(kept, 0);
        assert_eq!(toc, json!({}));
    }
}
