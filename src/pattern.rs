//! The pattern registry: an ordered list of surface rules for the query
//! language.
//!
//! Every [`Rule`] owns one anchored regular expression and turns a successful
//! match into a typed [`MatchContext`]. Rules are tried in the order of
//! [`Rule::ORDER`] and the first one that matches wins. The order matters:
//! the projection rule would otherwise happily read a comparison as a list
//! of field names, so the more specific rules come first.
//!
//! ```
//! use yuju::pattern::{Registry, Rule};
//! let registry = Registry::default();
//! let translation = registry.translate("查询表user_info中age大于18的数据").unwrap();
//! assert_eq!(translation.rule, Rule::Comparison);
//! assert_eq!(translation.sql, "SELECT * FROM user_info WHERE age > 18");
//! ```

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::info;

use crate::lexicon::{Aggregate, Connective, Operator, StringOperator};

lazy_static! {
    static ref COMPARISON: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中([a-zA-Z_]+)(大于|小于|等于|不等于|大于等于|小于等于)(-?[0-9]+|'[^']*')的数据"
    ).unwrap();
    static ref STRING_CONDITION: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中([a-zA-Z_]+)(包含|等于|不等于)('?[^']*'?)的数据"
    ).unwrap();
    static ref PROJECTION: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中([a-zA-Z_，,、\s]+)的数据"
    ).unwrap();
    static ref SELECT_ALL: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中所有数据"
    ).unwrap();
    static ref DUAL_CONDITION: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中(([a-zA-Z_]+)(大于|小于|等于|不等于|大于等于|小于等于)(-?[0-9]+|'[^']*'))(并且|而且|且|and|或者|或|or)(([a-zA-Z_]+)(大于|小于|等于|不等于|大于等于|小于等于)(-?[0-9]+|'[^']*'))的数据"
    ).unwrap();
    static ref RANGE: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中([a-zA-Z_]+)(在|介于)(-?[0-9]+|'[^']*')和(-?[0-9]+|'[^']*')之间的数据"
    ).unwrap();
    static ref AGGREGATE: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)中([a-zA-Z_]+)的(最大值|最大|最高|最小值|最小|最低|平均值|平均|总和|合计|总数)"
    ).unwrap();
    static ref RECORD_COUNT: Regex = Regex::new(
        r"^查询表([a-zA-Z_]+)的记录数"
    ).unwrap();
}

/// One comparison `field OP literal`; the literal is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub literal: String,
}

/// The captured parts of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchContext {
    Comparison { table: String, condition: Condition },
    StringCondition { table: String, field: String, operator: StringOperator, literal: String },
    Projection { table: String, fields: String },
    SelectAll { table: String },
    DualCondition { table: String, left: Condition, connective: Connective, right: Condition },
    Range { table: String, field: String, low: String, high: String },
    Aggregate { table: String, field: String, function: Aggregate },
    RecordCount { table: String },
}

impl MatchContext {
    pub fn table(&self) -> &str {
        match self {
            MatchContext::Comparison { table, .. }
            | MatchContext::StringCondition { table, .. }
            | MatchContext::Projection { table, .. }
            | MatchContext::SelectAll { table }
            | MatchContext::DualCondition { table, .. }
            | MatchContext::Range { table, .. }
            | MatchContext::Aggregate { table, .. }
            | MatchContext::RecordCount { table } => table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Comparison,
    StringCondition,
    Projection,
    SelectAll,
    DualCondition,
    Range,
    Aggregate,
    RecordCount,
}

fn group(captures: &Captures, i: usize) -> Option<String> {
    captures.get(i).map(|m| m.as_str().to_string())
}

fn condition(captures: &Captures, field: usize, operator: usize, literal: usize) -> Option<Condition> {
    Some(Condition {
        field: group(captures, field)?,
        operator: Operator::from_word_or_equal(captures.get(operator)?.as_str()),
        literal: group(captures, literal)?,
    })
}

impl Rule {
    /// Registration order; earlier rules shadow later ones.
    pub const ORDER: [Rule; 8] = [
        Rule::Comparison,
        Rule::StringCondition,
        Rule::Projection,
        Rule::SelectAll,
        Rule::DualCondition,
        Rule::Range,
        Rule::Aggregate,
        Rule::RecordCount,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            Rule::Comparison => &COMPARISON,
            Rule::StringCondition => &STRING_CONDITION,
            Rule::Projection => &PROJECTION,
            Rule::SelectAll => &SELECT_ALL,
            Rule::DualCondition => &DUAL_CONDITION,
            Rule::Range => &RANGE,
            Rule::Aggregate => &AGGREGATE,
            Rule::RecordCount => &RECORD_COUNT,
        }
    }

    /// Structural match of this rule alone. Declines with `None` whenever a
    /// required part is missing.
    pub fn matches(&self, input: &str) -> Option<MatchContext> {
        let c = self.regex().captures(input)?;
        let table = group(&c, 1)?;
        let context = match self {
            Rule::Comparison => MatchContext::Comparison {
                table,
                condition: condition(&c, 2, 3, 4)?,
            },
            Rule::StringCondition => MatchContext::StringCondition {
                table,
                field: group(&c, 2)?,
                operator: StringOperator::from_word(c.get(3)?.as_str())?,
                literal: group(&c, 4)?,
            },
            Rule::Projection => MatchContext::Projection {
                table,
                fields: group(&c, 2)?,
            },
            Rule::SelectAll => MatchContext::SelectAll { table },
            Rule::DualCondition => MatchContext::DualCondition {
                table,
                left: condition(&c, 3, 4, 5)?,
                connective: Connective::from_word(c.get(6)?.as_str())?,
                right: condition(&c, 8, 9, 10)?,
            },
            Rule::Range => MatchContext::Range {
                table,
                field: group(&c, 2)?,
                low: group(&c, 4)?,
                high: group(&c, 5)?,
            },
            Rule::Aggregate => MatchContext::Aggregate {
                table,
                field: group(&c, 2)?,
                function: Aggregate::from_word(c.get(3)?.as_str())?,
            },
            Rule::RecordCount => MatchContext::RecordCount { table },
        };
        Some(context)
    }
}

/// A successful translation: which rule fired and the statement it built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub rule: Rule,
    pub context: MatchContext,
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { rules: Rule::ORDER.to_vec() }
    }
}

impl Registry {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching rule and context, without building any SQL.
    pub fn find(&self, input: &str) -> Option<(Rule, MatchContext)> {
        let input = input.trim();
        self.rules
            .iter()
            .find_map(|rule| rule.matches(input).map(|context| (*rule, context)))
    }

    pub fn translate(&self, input: &str) -> Option<Translation> {
        let (rule, context) = self.find(input)?;
        let sql = context.to_sql();
        info!(?rule, %sql, "translated query");
        Some(Translation { rule, context, sql })
    }
}
