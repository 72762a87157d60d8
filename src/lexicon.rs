//! Operator lexicon and literal formatting shared by the query handlers,
//! the insert session and the shell.
//!
//! Everything here is pure: words of the query language map to SQL
//! operators, and raw tokens are turned into SQL literals.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref FIELD_SEPARATORS: Regex = Regex::new(r"[,，、\s]+").unwrap();
}

// ------------- Operators -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    Greater,
    Less,
    #[default]
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
}

impl Operator {
    pub fn from_word(word: &str) -> Option<Operator> {
        match word {
            "大于" => Some(Operator::Greater),
            "小于" => Some(Operator::Less),
            "等于" => Some(Operator::Equal),
            "不等于" => Some(Operator::NotEqual),
            "大于等于" => Some(Operator::GreaterOrEqual),
            "小于等于" => Some(Operator::LessOrEqual),
            _ => None,
        }
    }
    /// Like [`Operator::from_word`], but an unknown word means equality.
    pub fn from_word_or_equal(word: &str) -> Operator {
        Operator::from_word(word).unwrap_or_else(|| {
            debug!(word, "unknown comparison word, falling back to equality");
            Operator::default()
        })
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub fn operator_to_symbol(word: &str) -> &'static str {
    Operator::from_word_or_equal(word).symbol()
}

/// Operators allowed in a string condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOperator {
    Contains,
    Equal,
    NotEqual,
}

impl StringOperator {
    pub fn from_word(word: &str) -> Option<StringOperator> {
        match word {
            "包含" => Some(StringOperator::Contains),
            "等于" => Some(StringOperator::Equal),
            "不等于" => Some(StringOperator::NotEqual),
            _ => None,
        }
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            StringOperator::Contains => "LIKE",
            StringOperator::Equal => "=",
            StringOperator::NotEqual => "!=",
        }
    }
}

// ------------- Connectives -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn from_word(word: &str) -> Option<Connective> {
        match word.to_lowercase().as_str() {
            "并且" | "而且" | "且" | "and" => Some(Connective::And),
            "或者" | "或" | "or" => Some(Connective::Or),
            _ => None,
        }
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

// ------------- Aggregates -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Max,
    Min,
    Avg,
    Sum,
}

impl Aggregate {
    pub fn from_word(word: &str) -> Option<Aggregate> {
        match word {
            "最大值" | "最大" | "最高" => Some(Aggregate::Max),
            "最小值" | "最小" | "最低" => Some(Aggregate::Min),
            "平均值" | "平均" => Some(Aggregate::Avg),
            "总和" | "合计" | "总数" => Some(Aggregate::Sum),
            _ => None,
        }
    }
    pub fn function(&self) -> &'static str {
        match self {
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Avg => "AVG",
            Aggregate::Sum => "SUM",
        }
    }
}

// ------------- Literals -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Numeric(String),
    Text(String),
}

impl Literal {
    pub fn classify(token: &str) -> Literal {
        if is_numeric(token) {
            Literal::Numeric(token.to_string())
        } else {
            Literal::Text(token.to_string())
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Numeric(n) => f.write_str(n),
            Literal::Text(t) if is_quoted(t) => f.write_str(t),
            Literal::Text(t) => write!(f, "'{}'", t.replace('\'', "''")),
        }
    }
}

/// An optionally signed run of ASCII digits.
pub fn is_numeric(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_quoted(token: &str) -> bool {
    token.starts_with('\'')
}

pub fn format_literal(token: &str) -> String {
    Literal::classify(token).to_string()
}

/// Literal for a `LIKE` condition: the value is wrapped in `%` on both
/// sides unless it already carries a wildcard at either end.
pub fn format_like_literal(token: &str) -> String {
    let inner = if is_quoted(token) {
        let unquoted = &token[1..];
        unquoted.strip_suffix('\'').unwrap_or(unquoted).to_string()
    } else {
        token.replace('\'', "''")
    };
    if inner.starts_with('%') || inner.ends_with('%') {
        format!("'{}'", inner)
    } else {
        format!("'%{}%'", inner)
    }
}

/// Collapses any mixture of `,` `，` `、` and whitespace into one
/// comma-joined list.
pub fn normalize_fields(fields: &str) -> String {
    FIELD_SEPARATORS
        .split(fields)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_words_map_to_symbols() {
        assert_eq!(operator_to_symbol("大于"), ">");
        assert_eq!(operator_to_symbol("小于等于"), "<=");
        assert_eq!(operator_to_symbol("不等于"), "!=");
        assert_eq!(operator_to_symbol("约等于"), "=");
    }

    #[test]
    fn numeric_detection_allows_sign() {
        assert!(is_numeric("18"));
        assert!(is_numeric("-7"));
        assert!(is_numeric("+42"));
        assert!(!is_numeric("-"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("1.5"));
        assert!(!is_numeric("１８"));
    }

    #[test]
    fn literals_are_quoted_once() {
        assert_eq!(format_literal("18"), "18");
        assert_eq!(format_literal("admin"), "'admin'");
        assert_eq!(format_literal("'紧急'"), "'紧急'");
        let once = format_literal("o'brien");
        assert_eq!(once, "'o''brien'");
        assert_eq!(format_literal(&once), once);
    }

    #[test]
    fn like_literals_are_not_double_wrapped() {
        assert_eq!(format_like_literal("admin"), "'%admin%'");
        assert_eq!(format_like_literal("'admin'"), "'%admin%'");
        assert_eq!(format_like_literal("'%admin%'"), "'%admin%'");
        assert_eq!(format_like_literal("adm%"), "'adm%'");
        assert_eq!(format_like_literal("123"), "'%123%'");
        assert_eq!(format_like_literal("admin'"), "'%admin''%'");
        assert_eq!(format_like_literal("o'brien%"), "'o''brien%'");
    }

    #[test]
    fn field_lists_are_normalized() {
        assert_eq!(normalize_fields("username，phone、 email  age"), "username,phone,email,age");
        assert_eq!(normalize_fields("username,phone"), "username,phone");
        assert_eq!(normalize_fields(" ,id,, "), "id");
    }

    #[test]
    fn connectives_and_aggregates() {
        assert_eq!(Connective::from_word("AND"), Some(Connective::And));
        assert_eq!(Connective::from_word("或者"), Some(Connective::Or));
        assert_eq!(Connective::from_word("但是"), None);
        assert_eq!(Aggregate::from_word("最高").map(|a| a.function()), Some("MAX"));
        assert_eq!(Aggregate::from_word("合计").map(|a| a.function()), Some("SUM"));
    }
}
