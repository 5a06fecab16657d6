// src/extractors/blocks.rs

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::record::BRANCH_NAME_RE;

// --- CSS Selectors (Lazy Static) ---
// Most specific first: a row captured by `table tr` is never re-added by a wrapping `div`.
static BLOCK_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["table tr", "ul li", "ol li", "div"]
        .iter()
        .map(|css| Selector::parse(css).expect("Failed to compile block selector"))
        .collect()
});

/// Collects candidate branch blocks from a rendered page.
#[derive(Debug, Clone, Default)]
pub struct BlockCollector {
    /// Skip blocks with more lines than this (page-wide wrapper containers).
    pub max_lines: Option<usize>,
}

impl BlockCollector {
    pub fn new(max_lines: Option<usize>) -> Self {
        Self { max_lines }
    }

    /// Returns unique text blocks mentioning a branch keyword, in selector then document order.
    pub fn collect(&self, document: &Html) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut blocks = Vec::new();

        for selector in BLOCK_SELECTORS.iter() {
            for element in document.select(selector) {
                let block = element_block_text(element);
                if block.is_empty() || !BRANCH_NAME_RE.is_match(&block) {
                    continue;
                }
                if let Some(max) = self.max_lines {
                    let line_count = block.lines().count();
                    if line_count > max {
                        tracing::trace!("Skipping {}-line block (max {})", line_count, max);
                        continue;
                    }
                }
                if seen.insert(block.clone()) {
                    blocks.push(block);
                }
            }
        }

        tracing::debug!("Collected {} candidate branch blocks", blocks.len());
        blocks
    }

    /// Parses raw HTML and collects its blocks.
    pub fn collect_from_html(&self, html: &str) -> Vec<String> {
        self.collect(&Html::parse_document(html))
    }
}

/// Text of an element as trimmed, non-empty lines joined by `\n`.
/// Each text node (table cell, `<br>`-separated run) contributes its own lines.
fn element_block_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::lines)
        .map(|line| line.replace('\u{a0}', " "))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH_PAGE: &str = r#"
        <html><body>
          <div id="wrap">
            <table>
              <tr><th>지점명</th><th>주소</th><th>전화</th></tr>
              <tr><td>강원농협 춘천지점</td><td>강원 춘천시 중앙로 1</td><td>Tel: 033-123-4567</td></tr>
              <tr><td>강원농협 원주지점</td><td>강원 원주시 단구로 2</td><td>Tel: 033-765-4321</td></tr>
            </table>
            <ul>
              <li>홍천출장소<br>홍천군 홍천읍 희망로 3</li>
              <li>공지사항</li>
            </ul>
            <div class="card">속초센터
               속초시 중앙로 4</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn table_cells_become_lines() {
        let blocks = BlockCollector::default().collect_from_html(BRANCH_PAGE);
        assert_eq!(blocks[1], "강원농협 춘천지점\n강원 춘천시 중앙로 1\nTel: 033-123-4567");
    }

    #[test]
    fn earlier_selectors_win_and_order_is_kept() {
        let blocks = BlockCollector::default().collect_from_html(BRANCH_PAGE);
        assert_eq!(blocks[0], "지점명\n주소\n전화");
        assert!(blocks[2].starts_with("강원농협 원주지점"));
        assert_eq!(blocks[3], "홍천출장소\n홍천군 홍천읍 희망로 3");
        // The wrapping div comes first in document order and differs from every earlier block.
        assert!(blocks[4].contains("공지사항"));
        assert_eq!(blocks[5], "속초센터\n속초시 중앙로 4");
        assert_eq!(blocks.len(), 6);
    }

    #[test]
    fn blocks_without_branch_keywords_are_dropped() {
        let blocks = BlockCollector::default().collect_from_html(BRANCH_PAGE);
        assert!(blocks.iter().all(|b| b != "공지사항"));
    }

    #[test]
    fn identical_text_is_collected_once() {
        let html = "<ul><li>춘천지점</li></ul><div>춘천지점</div><div>춘천지점</div>";
        let blocks = BlockCollector::default().collect_from_html(html);
        assert_eq!(blocks, vec!["춘천지점".to_string()]);
    }

    #[test]
    fn max_lines_skips_wrappers() {
        let blocks = BlockCollector::new(Some(3)).collect_from_html(BRANCH_PAGE);
        assert_eq!(blocks.len(), 5);
        assert!(blocks.iter().all(|b| !b.contains("공지사항")));
    }

    #[test]
    fn page_without_branches_yields_nothing() {
        let blocks = BlockCollector::default().collect_from_html("<div><p>환영합니다</p></div>");
        assert!(blocks.is_empty());
    }
}
