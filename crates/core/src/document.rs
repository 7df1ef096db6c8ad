use std::path::Path;

const HEADER_OPEN: &str = "\n\n----- ";
const HEADER_CLOSE: &str = " -----";

/// Header written in front of each file's content.
pub fn render_block_header(path: &Path) -> String {
    format!("{HEADER_OPEN}{}{HEADER_CLOSE}\n\n", path.display())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub path: &'a str,
    pub content: &'a str,
}

/// Recovers the blocks of an output document.
///
/// Best effort: content that itself contains a well-formed header line is
/// split at that line, since the format has no escaping.
pub fn split_blocks(document: &str) -> Vec<Block<'_>> {
    let mut headers: Vec<(usize, usize, &str)> = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = document[cursor..].find(HEADER_OPEN) {
        let start = cursor + offset;
        let path_start = start + HEADER_OPEN.len();
        let line_end = document[path_start..]
            .find('\n')
            .map(|index| path_start + index)
            .unwrap_or(document.len());

        match document[path_start..line_end].strip_suffix(HEADER_CLOSE) {
            Some(path) if document[line_end..].starts_with("\n\n") => {
                headers.push((start, line_end + 2, path));
                cursor = line_end + 2;
            }
            _ => cursor = start + 1,
        }
    }

    headers
        .iter()
        .enumerate()
        .map(|(index, &(_, content_start, path))| {
            let content_end = headers
                .get(index + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(document.len());
            Block {
                path,
                content: &document[content_start..content_end],
            }
        })
        .collect()
}
