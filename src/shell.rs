//! Line dispatcher for the interactive shell.
//!
//! [`Shell::handle_line`] takes one input line, runs it and writes what the
//! user should see to any `Write`. The REPL in `main.rs` only reads lines
//! and keeps the prompt in sync; everything else happens here, which keeps
//! the dispatcher testable without a terminal.

use std::io::Write;

use comfy_table::{presets, Table};
use tracing::{debug, info};

use crate::demo;
use crate::diagnose::{classify_error, ErrorContext};
use crate::engine::{quote_identifier, ColumnInfo, Engine, Outcome, ResultRows};
use crate::error::Result;
use crate::insert::{BeginOutcome, FeedOutcome, InsertSession};
use crate::pattern::Registry;
use crate::settings::ShellSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
可用命令:
  list_tables                         列出所有表
  desc_table <表名>                   查看表结构
  show_table_data <表名>              显示表中所有数据
  select_data <SQL>                   执行查询语句
  create_table <表名> (<列定义>)      创建表
  delete_table <表名>                 删除表
  rename_table <旧表名> <新表名>      重命名表
  rename_column <表名> <旧列名> <新列名>
  truncate_table <表名>               清空表数据
  change_data <表名> SET ... WHERE ...
  delete_data <表名> WHERE ...
  insert_into <表名>                  逐行插入数据，输入 ';' 结束
  seed_demo                           创建示例表并写入示例数据
  init_db                             删除所有表
  cls | help | quit
自然语言查询示例:
  查询表user_info中所有数据
  查询表user_info中age大于18的数据
  查询表user_info中username包含admin的数据
  查询表user_info中username，phone的数据
  查询表security_event中event_level等于'紧急'并且location等于'南门'的数据
  查询表user_info中user_id在1和3之间的数据
  查询表user_info中user_id的最大值
  查询表user_info的记录数";

pub struct Shell<E: Engine> {
    engine: E,
    registry: Registry,
    session: InsertSession,
    settings: ShellSettings,
}

fn write_rows<W: Write>(out: &mut W, result: &ResultRows) -> Result<()> {
    if result.rows.is_empty() {
        writeln!(out, "结果为空")?;
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL);
    table.set_header(result.columns.clone());
    for row in &result.rows {
        table.add_row(row.clone());
    }
    writeln!(out, "{table}")?;
    Ok(())
}

fn write_columns<W: Write>(out: &mut W, table_name: &str, columns: &[ColumnInfo]) -> Result<()> {
    writeln!(out, "{}表结构为:", table_name)?;
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL);
    table.set_header(vec!["列名", "类型", "非空", "默认值", "主键"]);
    for column in columns {
        table.add_row(vec![
            column.name.clone(),
            column.column_type.clone(),
            if column.not_null { "是" } else { "" }.to_string(),
            column.default_value.clone().unwrap_or_default(),
            if column.primary_key { "是" } else { "" }.to_string(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

impl<E: Engine> Shell<E> {
    pub fn new(engine: E, settings: ShellSettings) -> Self {
        Self { engine, registry: Registry::default(), session: InsertSession::Idle, settings }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn session(&self) -> &InsertSession {
        &self.session
    }

    /// `table> ` while an insert is collecting, the configured prompt otherwise.
    pub fn prompt(&self) -> String {
        match self.session.table() {
            Some(table) => format!("{}> ", table),
            None => self.settings.prompt.clone(),
        }
    }

    /// Table overview printed when the shell starts.
    pub fn greet<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "欢迎使用命令行工具！输入 help 查看可用命令。")?;
        self.list_tables(out)
    }

    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let line = line.trim();
        if self.session.is_collecting() {
            if matches!(line, "quit" | "exit") {
                return self.quit(out);
            }
            return self.feed_insert(line, out).map(|_| Flow::Continue);
        }
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        debug!(command, "dispatching");
        match command {
            "quit" | "exit" => return self.quit(out),
            "help" => writeln!(out, "{}", HELP)?,
            "cls" => write!(out, "\x1B[2J\x1B[1;1H")?,
            "list_tables" => self.list_tables(out)?,
            "desc_table" => self.desc_table(arg, out)?,
            "show_table_data" => self.show_table_data(arg, out)?,
            "select_data" => self.select_data(arg, out)?,
            "create_table" => self.create_table(arg, out)?,
            "delete_table" => self.delete_table(arg, out)?,
            "rename_table" => self.rename_table(arg, out)?,
            "rename_column" => self.rename_column(arg, out)?,
            "truncate_table" => self.truncate_table(arg, out)?,
            "change_data" => self.change_data(arg, out)?,
            "delete_data" => self.delete_data(arg, out)?,
            "insert_into" => self.begin_insert(arg, out)?,
            "seed_demo" => self.seed_demo(out)?,
            "init_db" => self.init_db(out)?,
            _ => self.natural_language(line, out)?,
        }
        Ok(Flow::Continue)
    }

    fn quit<W: Write>(&mut self, out: &mut W) -> Result<Flow> {
        if let Some(table) = self.session.table() {
            writeln!(out, "已放弃表 {} 的未提交插入。", table)?;
        }
        self.session = InsertSession::Idle;
        writeln!(out, "正在退出命令行工具")?;
        Ok(Flow::Quit)
    }

    /// Runs `sql` and reports the result, routing failures through the
    /// diagnostic translator. Returns the outcome when it succeeded.
    fn run<W: Write>(&self, sql: &str, table: Option<&str>, out: &mut W) -> Result<Option<Outcome>> {
        info!(%sql, "executing statement");
        match self.engine.execute(sql) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                let mut context = ErrorContext::statement(sql);
                if let Some(table) = table {
                    context = context.with_table(table);
                }
                let diagnosis = classify_error(&e, &context, &self.engine);
                writeln!(out, "{}", diagnosis)?;
                Ok(None)
            }
        }
    }

    fn run_and_show<W: Write>(&self, sql: &str, table: Option<&str>, out: &mut W) -> Result<()> {
        match self.run(sql, table, out)? {
            Some(Outcome::Rows(rows)) => write_rows(out, &rows),
            Some(Outcome::Affected(_)) => {
                writeln!(out, "SQL 语句执行成功")?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn natural_language<W: Write>(&self, line: &str, out: &mut W) -> Result<()> {
        match self.registry.translate(line) {
            Some(translation) => {
                if self.settings.echo_sql {
                    writeln!(out, "生成的SQL：{}", translation.sql)?;
                }
                self.run_and_show(&translation.sql, Some(translation.context.table()), out)
            }
            None => {
                writeln!(out, "*** 未识别的命令: {}", line)?;
                Ok(())
            }
        }
    }

    fn list_tables<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.engine.list_tables() {
            Ok(tables) => {
                writeln!(out, "数据库中共有 {} 个表，表名如下:", tables.len())?;
                for table in tables {
                    writeln!(out, "- {}", table)?;
                }
            }
            Err(e) => {
                let diagnosis = classify_error(&e, &ErrorContext::default(), &self.engine);
                writeln!(out, "获取表信息时出错: {}", diagnosis)?;
            }
        }
        Ok(())
    }

    fn require<W: Write>(&self, arg: &str, usage: &str, out: &mut W) -> Result<bool> {
        if arg.is_empty() {
            writeln!(out, "参数错误，用法: {}", usage)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Canonical table name, or `None` after telling the user it is missing.
    fn existing_table<W: Write>(&self, table: &str, out: &mut W) -> Result<Option<String>> {
        match self.engine.resolve_table(table) {
            Ok(Some(name)) => Ok(Some(name)),
            Ok(None) => {
                writeln!(out, "表 {} 不存在，请先创建该表", table)?;
                Ok(None)
            }
            Err(e) => {
                let context = ErrorContext::default().with_table(table);
                writeln!(out, "{}", classify_error(&e, &context, &self.engine))?;
                Ok(None)
            }
        }
    }

    fn desc_table<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "desc_table <表名>", out)? {
            return Ok(());
        }
        let Some(table) = self.existing_table(arg, out)? else {
            return Ok(());
        };
        match self.engine.describe_table(&table) {
            Ok(columns) => write_columns(out, &table, &columns),
            Err(e) => {
                let context = ErrorContext::default().with_table(&table);
                writeln!(out, "{}", classify_error(&e, &context, &self.engine))?;
                Ok(())
            }
        }
    }

    fn show_table_data<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "show_table_data <表名>", out)? {
            return Ok(());
        }
        self.run_and_show(&format!("SELECT * FROM {}", arg), Some(arg), out)
    }

    fn select_data<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if arg.is_empty() {
            writeln!(out, "请提供SQL查询语句或自然语言查询")?;
            return Ok(());
        }
        if let Some(translation) = self.registry.translate(arg) {
            if self.settings.echo_sql {
                writeln!(out, "生成的SQL：{}", translation.sql)?;
            }
            return self.run_and_show(&translation.sql, Some(translation.context.table()), out);
        }
        self.run_and_show(arg, None, out)
    }

    fn create_table<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        const USAGE: &str = "create_table my_table (id INTEGER, name TEXT)";
        let Some((table, columns)) = arg.split_once(char::is_whitespace) else {
            writeln!(out, "参数格式错误，格式如: {}", USAGE)?;
            return Ok(());
        };
        let columns = columns.trim();
        let Some(definition) = columns.strip_prefix('(').and_then(|c| c.strip_suffix(')')) else {
            writeln!(out, "列定义必须用括号包围，格式如: {}", USAGE)?;
            return Ok(());
        };
        if definition.trim().is_empty() {
            writeln!(out, "列定义不能为空")?;
            return Ok(());
        }
        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", table, definition.trim());
        if self.run(&sql, Some(table), out)?.is_some() {
            writeln!(out, "表 {} 创建成功", table)?;
        }
        Ok(())
    }

    fn delete_table<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "delete_table <表名>", out)? {
            return Ok(());
        }
        if arg == "sqlite_sequence" {
            writeln!(out, "不能删除 sqlite_sequence 表，请选择其他表进行删除操作。")?;
            return Ok(());
        }
        if self.run(&format!("DROP TABLE IF EXISTS {}", arg), Some(arg), out)?.is_some() {
            writeln!(out, "表 {} 删除成功", arg)?;
        }
        Ok(())
    }

    fn rename_table<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        let parts: Vec<&str> = arg.split_whitespace().collect();
        let [old, new] = parts[..] else {
            writeln!(out, "参数错误，用法: rename_table <旧表名> <新表名>")?;
            return Ok(());
        };
        let sql = format!("ALTER TABLE {} RENAME TO {}", old, new);
        if self.run(&sql, Some(old), out)?.is_some() {
            writeln!(out, "表 {} 已重命名为 {}", old, new)?;
        }
        Ok(())
    }

    fn rename_column<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        let parts: Vec<&str> = arg.split_whitespace().collect();
        let [table, old, new] = parts[..] else {
            writeln!(out, "参数错误，用法: rename_column <表名> <旧列名> <新列名>")?;
            return Ok(());
        };
        let Some(table) = self.existing_table(table, out)? else {
            return Ok(());
        };
        let known = match self.engine.describe_table(&table) {
            Ok(columns) => columns.iter().any(|c| c.name == old),
            Err(e) => {
                let context = ErrorContext::default().with_table(&table);
                writeln!(out, "{}", classify_error(&e, &context, &self.engine))?;
                return Ok(());
            }
        };
        if !known {
            writeln!(out, "列 {} 不存在于表 {} 中", old, table)?;
            return Ok(());
        }
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            quote_identifier(&table),
            quote_identifier(old),
            quote_identifier(new)
        );
        if self.run(&sql, Some(&table), out)?.is_some() {
            writeln!(out, "列 {} 已成功重命名为 {}", old, new)?;
        }
        Ok(())
    }

    fn truncate_table<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "truncate_table <表名>", out)? {
            return Ok(());
        }
        if self.run(&format!("DELETE FROM {}", arg), Some(arg), out)?.is_some() {
            writeln!(out, "表 {} 数据已清空", arg)?;
        }
        Ok(())
    }

    fn change_data<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "change_data <表名> SET ... WHERE ...", out)? {
            return Ok(());
        }
        let table = arg.split_whitespace().next();
        match self.run(&format!("UPDATE {}", arg), table, out)? {
            Some(Outcome::Affected(0)) => writeln!(out, "没有找到符合条件的数据，无法进行更新操作。")?,
            Some(Outcome::Affected(n)) => writeln!(out, "成功更新 {} 条记录", n)?,
            _ => (),
        }
        Ok(())
    }

    fn delete_data<W: Write>(&self, arg: &str, out: &mut W) -> Result<()> {
        if !self.require(arg, "delete_data <表名> WHERE ...", out)? {
            return Ok(());
        }
        let table = arg.split_whitespace().next();
        match self.run(&format!("DELETE FROM {}", arg), table, out)? {
            Some(Outcome::Affected(0)) => writeln!(out, "没有找到符合条件的数据，无法进行删除操作。")?,
            Some(Outcome::Affected(n)) => writeln!(out, "成功删除 {} 条记录", n)?,
            _ => (),
        }
        Ok(())
    }

    fn begin_insert<W: Write>(&mut self, arg: &str, out: &mut W) -> Result<()> {
        let session = std::mem::take(&mut self.session);
        let (session, outcome) = session.begin(&self.engine, arg);
        self.session = session;
        match outcome {
            BeginOutcome::Started { table, columns } => {
                write_columns(out, &table, &columns)?;
                writeln!(
                    out,
                    "接下来请逐行输入要插入的数据值，每行输入对应一条完整记录，输入 '{}' 结束插入。",
                    self.settings.terminator
                )?;
            }
            BeginOutcome::MissingTableName => writeln!(out, "请指定表名，格式为: insert_into <表名>")?,
            BeginOutcome::TableNotFound(table) => writeln!(out, "表 {} 不存在，请先创建该表", table)?,
            BeginOutcome::AlreadyCollecting(table) => writeln!(out, "表 {} 的插入尚未结束", table)?,
            BeginOutcome::Failed(diagnosis) => writeln!(out, "检查表是否存在时出错: {}", diagnosis)?,
        }
        Ok(())
    }

    fn feed_insert<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        let session = std::mem::take(&mut self.session);
        let (session, outcome) = session.feed(&self.engine, line, &self.settings.terminator);
        self.session = session;
        match outcome {
            FeedOutcome::Accepted(row) => writeln!(out, "已添加值: {}", row)?,
            FeedOutcome::RejectedFormat => writeln!(out, "输入的值格式错误，请确保值之间用逗号分隔")?,
            FeedOutcome::Committed(n) => writeln!(out, "插入操作成功，共 {} 条记录", n)?,
            FeedOutcome::CommittedWithError(diagnosis) => writeln!(out, "{}", diagnosis)?,
            FeedOutcome::EmptyBatch => writeln!(out, "没有有效的插入数据，请重新开始。")?,
            FeedOutcome::NotCollecting => (),
        }
        Ok(())
    }

    fn seed_demo<W: Write>(&self, out: &mut W) -> Result<()> {
        match demo::seed(&self.engine) {
            Ok(inserted) => {
                for (table, count) in inserted {
                    writeln!(out, "已为 {} 表插入 {} 条数据", table, count)?;
                }
                writeln!(out, "所有表数据初始化完成")?;
            }
            Err(e) => {
                let diagnosis = classify_error(&e, &ErrorContext::statement("seed_demo"), &self.engine);
                writeln!(out, "初始化数据时出错: {}", diagnosis)?;
            }
        }
        Ok(())
    }

    fn init_db<W: Write>(&self, out: &mut W) -> Result<()> {
        match demo::drop_all(&self.engine) {
            Ok(dropped) => writeln!(out, "已删除 {} 个表，初始化完成。", dropped.len())?,
            Err(e) => {
                let diagnosis = classify_error(&e, &ErrorContext::statement("init_db"), &self.engine);
                writeln!(out, "手动初始化时出错: {}", diagnosis)?;
            }
        }
        Ok(())
    }
}
