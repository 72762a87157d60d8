//! Yuju – an interactive shell over SQLite that understands a small query
//! language of fixed Chinese phrases.
//!
//! The interesting part is the translation layer between free text and the
//! engine:
//! * [`pattern`] – the ordered rule registry. Each rule is an anchored
//!   surface pattern that yields a typed [`pattern::MatchContext`]; the first
//!   rule that matches wins.
//! * [`handler`] – turns a match context into a SQL statement.
//! * [`lexicon`] – the shared vocabulary: comparison, logic and aggregate
//!   words, literal quoting and field-list normalization.
//! * [`insert`] – the multi-line insert session, closed by a terminator and
//!   submitted as one batched statement.
//! * [`diagnose`] – classifies engine errors (missing table, syntax, duplicate
//!   key) into messages the user can act on.
//!
//! Around it sit the [`engine`] boundary (a trait plus its rusqlite
//! implementation), the line dispatcher in [`shell`], layered [`settings`]
//! and the [`demo`] schema.
//!
//! ## Quick Start
//! ```
//! use yuju::engine::{Engine, Outcome, SqliteEngine};
//! use yuju::translate;
//! let engine = SqliteEngine::open_in_memory().unwrap();
//! engine.execute("CREATE TABLE user_info (username TEXT, age INTEGER)").unwrap();
//! engine.execute("INSERT INTO user_info VALUES ('admin', 30), ('guest', 12)").unwrap();
//! let sql = translate("查询表user_info中age大于18的数据").unwrap();
//! assert_eq!(sql, "SELECT * FROM user_info WHERE age > 18");
//! match engine.execute(&sql).unwrap() {
//!     Outcome::Rows(result) => assert_eq!(result.rows, vec![vec!["admin", "30"]]),
//!     Outcome::Affected(_) => unreachable!(),
//! }
//! ```
//!
//! ## Query language
//! | phrase | statement |
//! |---|---|
//! | `查询表T中F大于18的数据` | `SELECT * FROM T WHERE F > 18` |
//! | `查询表T中F包含abc的数据` | `SELECT * FROM T WHERE F LIKE '%abc%'` |
//! | `查询表T中a，b、c的数据` | `SELECT a,b,c FROM T` |
//! | `查询表T中所有数据` | `SELECT * FROM T` |
//! | `查询表T中a大于1并且b小于2的数据` | `SELECT * FROM T WHERE a > 1 AND b < 2` |
//! | `查询表T中F在1和9之间的数据` | `SELECT * FROM T WHERE F BETWEEN 1 AND 9` |
//! | `查询表T中F的最大值` | `SELECT MAX(F) FROM T` |
//! | `查询表T的记录数` | `SELECT COUNT(*) FROM T` |

pub mod demo;
pub mod diagnose;
pub mod engine;
pub mod error;
pub mod handler;
pub mod insert;
pub mod lexicon;
pub mod pattern;
pub mod settings;
pub mod shell;

pub use error::{Result, ShellError};

/// Translates one line with the default registry.
pub fn translate(text: &str) -> Option<String> {
    pattern::Registry::default().translate(text).map(|t| t.sql)
}
