use crate::data::models::{Chapter, PageRange};

/// In-memory view of a book's reading progress.
///
/// Ranges are kept in the order they were recorded. They are never merged,
/// and overlapping or gapped ranges are accepted as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub current_page: i32,
    pub current_chapter: Option<String>,
    pub pages_processed: Vec<PageRange>,
    pub chapters_completed: Vec<String>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current_page: 1,
            current_chapter: None,
            pages_processed: Vec::new(),
            chapters_completed: Vec::new(),
        }
    }
}

impl ProgressState {
    /// One past the highest processed page, or `current_page` when nothing
    /// has been processed yet. Once any range exists a manually set
    /// `current_page` no longer counts.
    pub fn next_unprocessed_page(&self) -> i32 {
        self.pages_processed
            .iter()
            .map(|range| range.end)
            .max()
            .map_or(self.current_page, |end| end + 1)
    }

    /// Whether every page of the chapter lies in at least one processed range.
    pub fn is_chapter_covered(&self, chapter: &Chapter) -> bool {
        (chapter.start_page..=chapter.end_page)
            .all(|page| self.pages_processed.iter().any(|range| range.contains(page)))
    }

    /// Appends `range`, refreshes the completed chapters and returns the next
    /// unprocessed page. Recording a range that is already present is a no-op.
    pub fn record_range(&mut self, range: PageRange, chapters: &[Chapter]) -> i32 {
        if !self.pages_processed.contains(&range) {
            self.pages_processed.push(range);
        }

        for chapter in chapters {
            if !self.chapters_completed.contains(&chapter.name) && self.is_chapter_covered(chapter)
            {
                self.chapters_completed.push(chapter.name.clone());
            }
        }

        let next = self.next_unprocessed_page();
        self.current_page = next;
        self.current_chapter = chapters
            .iter()
            .find(|chapter| chapter.start_page <= next && next <= chapter.end_page)
            .map(|chapter| chapter.name.clone())
            .or_else(|| self.current_chapter.take());
        next
    }
}
