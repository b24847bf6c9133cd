//! 章节提取
//!
//! 按文档顺序定位所有 `section` 元素（包含嵌套的 section），
//! 返回指定索引处的节点标记。文本节点会被反转义，标签原样保留。

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ChapterRange, ChapterText, ExtractError, SectionSummary};

const SECTION: &[u8] = b"section";
const TITLE: &[u8] = b"title";

fn malformed(position: u64, err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Malformed {
        position,
        message: err.to_string(),
    }
}

fn encoding(err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Encoding(err.to_string())
}

/// 正在收集的 section
struct Capture {
    index: usize,
    /// 该 section 内部的 section 嵌套深度
    depth: usize,
    markup: String,
}

fn append(captures: &mut [Capture], text: &str) {
    for capture in captures.iter_mut() {
        capture.markup.push_str(text);
    }
}

/// 提取第 `index` 个 section（从 0 开始）
///
/// 索引超出 section 数量时返回 `ChapterText::OutOfRange`
pub fn extract_chapter(content: &[u8], index: usize) -> Result<ChapterText, ExtractError> {
    let chapters = extract_chapters(content, ChapterRange::single(index))?;
    Ok(chapters
        .into_iter()
        .next()
        .unwrap_or(ChapterText::OutOfRange {
            index,
            available: 0,
        }))
}

/// 一次遍历提取 `range` 内的所有 section
///
/// 结果按索引顺序排列，第 i 项对应 `range.first() + i`。
/// 遇到第一个越界索引时追加 `ChapterText::OutOfRange` 并结束。
pub fn extract_chapters(
    content: &[u8],
    range: ChapterRange,
) -> Result<Vec<ChapterText>, ExtractError> {
    if range.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();

    let mut seen = 0usize;
    // 外层在前，内层在后
    let mut captures: Vec<Capture> = Vec::new();
    let mut done: BTreeMap<usize, String> = BTreeMap::new();

    loop {
        buf.clear();
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(malformed(reader.buffer_position() as u64, e)),
        };
        let decoder = reader.decoder();

        match event {
            Event::Start(e) => {
                let is_section = e.local_name().as_ref() == SECTION;
                if is_section {
                    if range.contains(seen) {
                        captures.push(Capture {
                            index: seen,
                            depth: 0,
                            markup: String::new(),
                        });
                    }
                    seen += 1;
                }
                if captures.is_empty() {
                    continue;
                }
                let tag = decoder.decode(&e).map_err(encoding)?;
                append(&mut captures, &format!("<{}>", tag));
                if is_section {
                    for capture in captures.iter_mut() {
                        capture.depth += 1;
                    }
                }
            }
            Event::Empty(e) => {
                let is_section = e.local_name().as_ref() == SECTION;
                let mut opened = false;
                if is_section {
                    if range.contains(seen) {
                        captures.push(Capture {
                            index: seen,
                            depth: 0,
                            markup: String::new(),
                        });
                        opened = true;
                    }
                    seen += 1;
                }
                if captures.is_empty() {
                    continue;
                }
                let tag = decoder.decode(&e).map_err(encoding)?;
                append(&mut captures, &format!("<{}/>", tag));
                // 空的目标 section 直接结束
                if opened {
                    if let Some(capture) = captures.pop() {
                        done.insert(capture.index, capture.markup);
                    }
                }
            }
            Event::End(e) => {
                if captures.is_empty() {
                    continue;
                }
                let tag = decoder.decode(&e).map_err(encoding)?;
                append(&mut captures, &format!("</{}>", tag));
                if e.local_name().as_ref() == SECTION {
                    for capture in captures.iter_mut() {
                        capture.depth = capture.depth.saturating_sub(1);
                    }
                    while captures.last().is_some_and(|capture| capture.depth == 0) {
                        if let Some(capture) = captures.pop() {
                            done.insert(capture.index, capture.markup);
                        }
                    }
                }
            }
            Event::Text(e) if !captures.is_empty() => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(reader.buffer_position() as u64, err))?;
                append(&mut captures, &text);
            }
            Event::CData(e) if !captures.is_empty() => {
                let text = decoder.decode(&e).map_err(encoding)?;
                append(&mut captures, &text);
            }
            Event::Eof => break,
            _ => {}
        }

        if captures.is_empty() && done.len() == range.len() {
            break;
        }
    }

    // 文档在 section 闭合前结束时保留已收集的部分
    for capture in captures {
        done.insert(capture.index, capture.markup);
    }

    let mut chapters = Vec::with_capacity(done.len() + 1);
    for index in range.iter() {
        match done.remove(&index) {
            Some(markup) => chapters.push(ChapterText::Found(markup)),
            None => {
                chapters.push(ChapterText::OutOfRange {
                    index,
                    available: seen,
                });
                break;
            }
        }
    }

    Ok(chapters)
}

/// 列出所有 section 及其标题
///
/// 标题取 section 内第一个 `title` 元素的文本，空白已规整
pub fn list_sections(content: &[u8]) -> Result<Vec<SectionSummary>, ExtractError> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();

    let mut sections: Vec<SectionSummary> = Vec::new();
    // 当前打开的 section 索引栈
    let mut open: Vec<usize> = Vec::new();
    // 正在收集的标题：(section 索引, title 嵌套深度, 文本)
    let mut title: Option<(usize, usize, String)> = None;

    loop {
        buf.clear();
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(malformed(reader.buffer_position() as u64, e)),
        };

        match event {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == SECTION {
                    open.push(sections.len());
                    sections.push(SectionSummary {
                        index: sections.len(),
                        title: None,
                    });
                } else if name.as_ref() == TITLE {
                    if let Some((_, depth, _)) = title.as_mut() {
                        *depth += 1;
                    } else if let Some(&current) = open.last() {
                        if sections[current].title.is_none() {
                            title = Some((current, 1, String::new()));
                        }
                    }
                } else if let Some((_, _, text)) = title.as_mut() {
                    // 标题内部的段落之间用空格分隔
                    text.push(' ');
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == SECTION {
                    sections.push(SectionSummary {
                        index: sections.len(),
                        title: None,
                    });
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == SECTION {
                    open.pop();
                } else if name.as_ref() == TITLE {
                    match title.take() {
                        Some((section, 1, text)) => {
                            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
                            sections[section].title = Some(normalized);
                        }
                        Some((section, depth, text)) => title = Some((section, depth - 1, text)),
                        None => {}
                    }
                } else if let Some((_, _, text)) = title.as_mut() {
                    text.push(' ');
                }
            }
            Event::Text(e) => {
                if let Some((_, _, text)) = title.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| malformed(reader.buffer_position() as u64, err))?;
                    text.push_str(&unescaped);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0">
<body>
<section><title><p>Глава 1</p></title><p>Первый &amp; единственный.</p></section>
<section id="c2"><title><p>Глава 2</p></title><section><title><p>Часть 2.1</p></title><p>Вложенный.</p></section></section>
<section/>
</body>
</FictionBook>"#;

    #[test]
    fn test_extract_first_section() {
        let result = extract_chapter(BOOK.as_bytes(), 0).unwrap();
        assert_eq!(
            result,
            ChapterText::Found(
                "<section><title><p>Глава 1</p></title><p>Первый & единственный.</p></section>"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_extract_section_with_nested_section() {
        let markup = extract_chapter(BOOK.as_bytes(), 1)
            .unwrap()
            .into_markup()
            .unwrap();
        assert!(markup.starts_with("<section id=\"c2\">"));
        assert!(markup.contains("Часть 2.1"));
        assert!(markup.ends_with("</section></section>"));
    }

    #[test]
    fn test_nested_section_has_own_index() {
        let markup = extract_chapter(BOOK.as_bytes(), 2)
            .unwrap()
            .into_markup()
            .unwrap();
        assert_eq!(
            markup,
            "<section><title><p>Часть 2.1</p></title><p>Вложенный.</p></section>"
        );
    }

    #[test]
    fn test_empty_section() {
        let result = extract_chapter(BOOK.as_bytes(), 3).unwrap();
        assert_eq!(result, ChapterText::Found("<section/>".to_string()));
    }

    #[test]
    fn test_out_of_range_is_a_value() {
        let result = extract_chapter(BOOK.as_bytes(), 4).unwrap();
        assert_eq!(
            result,
            ChapterText::OutOfRange {
                index: 4,
                available: 4
            }
        );
        assert!(extract_chapter(BOOK.as_bytes(), usize::MAX)
            .unwrap()
            .is_out_of_range());
    }

    #[test]
    fn test_document_without_sections() {
        let result = extract_chapter(b"<root><p>text</p></root>", 0).unwrap();
        assert_eq!(
            result,
            ChapterText::OutOfRange {
                index: 0,
                available: 0
            }
        );
    }

    #[test]
    fn test_malformed_xml_propagates() {
        let result = extract_chapter(b"<root><section><p>text</section></root>", 0);
        assert!(matches!(result, Err(ExtractError::Malformed { .. })));
    }

    #[test]
    fn test_extract_range_in_one_pass() {
        let chapters = extract_chapters(BOOK.as_bytes(), ChapterRange::new(1, 3)).unwrap();
        assert_eq!(chapters.len(), 3);
        let outer = chapters[0].clone().into_markup().unwrap();
        let inner = chapters[1].clone().into_markup().unwrap();
        assert!(outer.starts_with("<section id=\"c2\">"));
        assert!(outer.contains(&inner));
        assert_eq!(
            inner,
            "<section><title><p>Часть 2.1</p></title><p>Вложенный.</p></section>"
        );
        assert_eq!(chapters[2], ChapterText::Found("<section/>".to_string()));
    }

    #[test]
    fn test_extract_range_matches_single_extraction() {
        let chapters = extract_chapters(BOOK.as_bytes(), ChapterRange::new(0, 3)).unwrap();
        for (index, chapter) in chapters.into_iter().enumerate() {
            assert_eq!(chapter, extract_chapter(BOOK.as_bytes(), index).unwrap());
        }
    }

    #[test]
    fn test_extract_range_stops_at_first_out_of_range() {
        let chapters = extract_chapters(BOOK.as_bytes(), ChapterRange::new(3, 9)).unwrap();
        assert_eq!(
            chapters,
            vec![
                ChapterText::Found("<section/>".to_string()),
                ChapterText::OutOfRange {
                    index: 4,
                    available: 4
                },
            ]
        );
    }

    #[test]
    fn test_extract_unbounded_range() {
        let chapters = extract_chapters(BOOK.as_bytes(), ChapterRange::new(0, usize::MAX)).unwrap();
        assert_eq!(chapters.len(), 5);
        assert!(chapters[4].is_out_of_range());
    }

    #[test]
    fn test_extract_reversed_range() {
        let chapters = extract_chapters(BOOK.as_bytes(), ChapterRange::new(2, 1)).unwrap();
        assert!(chapters.is_empty());
    }

    /// windows-1251 编码的 FB2，标题为 "Глава"
    fn cp1251_book() -> Vec<u8> {
        let mut doc =
            b"<?xml version=\"1.0\" encoding=\"windows-1251\"?>\n<FictionBook><body><section><title><p>"
                .to_vec();
        doc.extend_from_slice(&[0xC3, 0xEB, 0xE0, 0xE2, 0xE0]);
        doc.extend_from_slice(b"</p></title><p>x</p></section></body></FictionBook>");
        doc
    }

    #[test]
    fn test_extract_windows_1251() {
        let result = extract_chapter(&cp1251_book(), 0).unwrap();
        assert_eq!(
            result,
            ChapterText::Found("<section><title><p>Глава</p></title><p>x</p></section>".to_string())
        );
    }

    #[test]
    fn test_list_sections_windows_1251() {
        let sections = list_sections(&cp1251_book()).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Глава"));
    }

    #[test]
    fn test_list_sections() {
        let sections = list_sections(BOOK.as_bytes()).unwrap();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].title.as_deref(), Some("Глава 1"));
        assert_eq!(sections[1].title.as_deref(), Some("Глава 2"));
        assert_eq!(sections[2].title.as_deref(), Some("Часть 2.1"));
        assert_eq!(sections[3].title, None);
        assert_eq!(sections[3].index, 3);
    }

    #[test]
    fn test_list_sections_multi_paragraph_title() {
        let xml = "<b><section><title><p>Часть</p><p>первая</p></title></section></b>";
        let sections = list_sections(xml.as_bytes()).unwrap();
        assert_eq!(sections[0].title.as_deref(), Some("Часть первая"));
    }
}
