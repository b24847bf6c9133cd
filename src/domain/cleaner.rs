//! 文本清洗
//!
//! 有序的字符串替换表，把章节标记转换为纯文本。
//! 替换按表中顺序依次执行，前面的替换会影响后面的规则能否匹配。

/// 单条替换规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

/// 有序替换表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTable {
    rules: Vec<RewriteRule>,
}

impl RewriteTable {
    /// 空表
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 追加一条规则（在已有规则之后执行）
    pub fn with_rule(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.rules.push(RewriteRule {
            pattern: pattern.into(),
            replacement: replacement.into(),
        });
        self
    }

    /// 默认表 + FictionBook 行内标记
    pub fn fiction_book() -> Self {
        Self::default()
            .with_rule("<empty-line/>", " ")
            .with_rule("<p/>", " ")
            .with_rule("<emphasis>", "")
            .with_rule("</emphasis>", "")
            .with_rule("<strong>", "")
            .with_rule("</strong>", "")
            .with_rule("<subtitle>", "")
            .with_rule("</subtitle>", " ")
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RewriteTable {
    /// 固定替换表，顺序不可调整
    fn default() -> Self {
        Self::empty()
            .with_rule("Â ", " ")
            .with_rule("***", " ")
            .with_rule("<p>", "")
            .with_rule("</p>", " ")
            .with_rule("<section>", "")
            .with_rule("</section>", "")
            .with_rule("<title>", "")
            .with_rule("</title>", "")
            .with_rule("\n", "")
    }
}

/// 按表顺序执行全部替换
pub fn clean_text(raw: &str, table: &RewriteTable) -> String {
    table
        .rules
        .iter()
        .filter(|rule| !rule.pattern.is_empty())
        .fold(raw.to_string(), |text, rule| {
            text.replace(&rule.pattern, &rule.replacement)
        })
}
