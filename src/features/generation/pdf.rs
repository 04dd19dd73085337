use lopdf::Document;

pub fn page_count(bytes: &[u8]) -> Result<i32, lopdf::Error> {
    let document = Document::load_mem(bytes)?;
    Ok(document.get_pages().len() as i32)
}

/// Copies pages `start..=end` (1-indexed) into a new document. The range is
/// clamped to the pages that exist.
pub fn extract_pages(bytes: &[u8], start: i32, end: i32) -> Result<Vec<u8>, lopdf::Error> {
    let mut document = Document::load_mem(bytes)?;
    let total = document.get_pages().len() as u32;
    let first = start.max(1) as u32;
    let last = (end.max(0) as u32).min(total);

    let dropped: Vec<u32> = (1..=total)
        .filter(|page| *page < first || *page > last)
        .collect();
    if !dropped.is_empty() {
        document.delete_pages(&dropped);
        document.prune_objects();
    }

    let mut out = Vec::new();
    document.save_to(&mut out)?;
    Ok(out)
}
