//! Chapter Context - Value Objects

use serde::{Deserialize, Serialize};

/// 章节范围（闭区间，从 0 开始）
///
/// `last < first` 时为空范围，不做其它校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    first: usize,
    last: usize,
}

impl ChapterRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// 单章
    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first).saturating_add(1)
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.first <= index && index <= self.last
    }

    /// 按顺序遍历章节索引
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.first..=self.last
    }
}

impl std::fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// 章节提取结果
///
/// 索引越界是一个值，不是错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterText {
    /// 序列化后的 section 节点
    Found(String),
    /// 索引超出 section 数量
    OutOfRange { index: usize, available: usize },
}

impl ChapterText {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ChapterText::OutOfRange { .. })
    }

    pub fn into_markup(self) -> Option<String> {
        match self {
            ChapterText::Found(markup) => Some(markup),
            ChapterText::OutOfRange { .. } => None,
        }
    }
}

/// section 概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub index: usize,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_iter() {
        let range = ChapterRange::new(2, 4);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(range.len(), 3);
        assert_eq!(range.to_string(), "2-4");
        assert!(range.contains(2) && range.contains(4));
        assert!(!range.contains(1) && !range.contains(5));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = ChapterRange::new(5, 3);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);
        assert!(!range.contains(4));
    }

    #[test]
    fn test_single() {
        let range = ChapterRange::single(7);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![7]);
    }
}
