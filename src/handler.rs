//! Query handlers: one statement shape per rule family.

use crate::lexicon::{format_like_literal, format_literal, normalize_fields, StringOperator};
use crate::pattern::{Condition, MatchContext};

impl Condition {
    pub fn to_sql(&self) -> String {
        format!("{} {} {}", self.field, self.operator.symbol(), format_literal(&self.literal))
    }
}

impl MatchContext {
    pub fn to_sql(&self) -> String {
        match self {
            MatchContext::Comparison { table, condition } => {
                format!("SELECT * FROM {} WHERE {}", table, condition.to_sql())
            }
            MatchContext::StringCondition { table, field, operator, literal } => {
                let value = match operator {
                    StringOperator::Contains => format_like_literal(literal),
                    _ => format_literal(literal),
                };
                format!("SELECT * FROM {} WHERE {} {} {}", table, field, operator.symbol(), value)
            }
            MatchContext::Projection { table, fields } => {
                format!("SELECT {} FROM {}", normalize_fields(fields), table)
            }
            MatchContext::SelectAll { table } => format!("SELECT * FROM {}", table),
            MatchContext::DualCondition { table, left, connective, right } => format!(
                "SELECT * FROM {} WHERE {} {} {}",
                table,
                left.to_sql(),
                connective.keyword(),
                right.to_sql()
            ),
            MatchContext::Range { table, field, low, high } => format!(
                "SELECT * FROM {} WHERE {} BETWEEN {} AND {}",
                table,
                field,
                format_literal(low),
                format_literal(high)
            ),
            MatchContext::Aggregate { table, field, function } => {
                format!("SELECT {}({}) FROM {}", function.function(), field, table)
            }
            MatchContext::RecordCount { table } => format!("SELECT COUNT(*) FROM {}", table),
        }
    }
}
