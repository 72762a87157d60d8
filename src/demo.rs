//! The demo schema: users, security events, feedback and an audit trail,
//! with a handful of rows each so every query shape has something to hit.

use tracing::info;

use crate::engine::{quote_identifier, Engine, EngineError, Outcome};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS user_info (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        phone TEXT UNIQUE,
        email TEXT UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS security_event (
        event_id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL,
        event_level TEXT NOT NULL,
        event_desc TEXT,
        location TEXT NOT NULL,
        occur_time DATETIME NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_feedback (
        feedback_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        feedback_type TEXT NOT NULL,
        content TEXT NOT NULL,
        contact_info TEXT
    )",
    "CREATE TABLE IF NOT EXISTS system_record (
        record_id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_type TEXT NOT NULL,
        content TEXT,
        operator_id INTEGER,
        operate_time DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
];

const ROWS: [(&str, &str); 4] = [
    (
        "user_info",
        "INSERT INTO user_info (username, phone, email) VALUES
            ('admin', '13800000001', 'admin@example.com'),
            ('user1', '13800000002', 'user1@example.com'),
            ('user2', '13800000003', 'user2@example.com'),
            ('user3', '13800000004', 'user3@example.com'),
            ('user4', '13800000005', 'user4@example.com')",
    ),
    (
        "security_event",
        "INSERT INTO security_event (event_type, event_level, event_desc, location, occur_time) VALUES
            ('入侵报警', '紧急', '发现不明人员翻越围墙', '南门', '2025-05-20 08:30:00'),
            ('火灾报警', '紧急', '烟雾传感器触发', '办公楼3层', '2025-05-21 14:15:00'),
            ('设备故障', '一般', '摄像头信号丢失', '停车场A区', '2025-05-21 16:40:00'),
            ('异常行为', '中等', '人员长时间徘徊', '金库附近', '2025-05-22 09:20:00'),
            ('系统告警', '一般', '服务器负载过高', '监控中心', '2025-05-22 11:05:00')",
    ),
    (
        "user_feedback",
        "INSERT INTO user_feedback (user_id, feedback_type, content, contact_info) VALUES
            (1, '建议', '希望增加移动端查看功能', '13800000001'),
            (2, '投诉', '监控画面有时卡顿', '13800000002'),
            (3, '咨询', '如何申请查看历史记录', '13800000003'),
            (4, '建议', '报警推送能否增加声音提醒', '13800000004'),
            (5, '投诉', '部分区域摄像头存在死角', '13800000005')",
    ),
    (
        "system_record",
        "INSERT INTO system_record (record_type, content, operator_id, operate_time) VALUES
            ('登录', '管理员登录系统', 1, '2025-05-22 08:00:00'),
            ('操作', '修改了报警阈值设置', 1, '2025-05-22 08:15:00'),
            ('添加', '添加了新摄像头设备', 1, '2025-05-22 09:30:00'),
            ('处理', '处理了南门入侵报警事件', 2, '2025-05-22 10:45:00'),
            ('导出', '导出了本周报警记录', 1, '2025-05-22 11:30:00')",
    ),
];

fn seed_all<E: Engine + ?Sized>(engine: &E) -> Result<Vec<(String, usize)>, EngineError> {
    for ddl in SCHEMA {
        engine.execute(ddl)?;
    }
    let mut inserted = Vec::with_capacity(ROWS.len());
    for (table, sql) in ROWS {
        let count = match engine.execute(sql)? {
            Outcome::Affected(n) => n,
            Outcome::Rows(_) => 0,
        };
        inserted.push((table.to_string(), count));
    }
    Ok(inserted)
}

/// Creates the demo tables and fills them inside one transaction. Returns
/// the number of rows inserted per table.
pub fn seed<E: Engine + ?Sized>(engine: &E) -> Result<Vec<(String, usize)>, EngineError> {
    engine.execute("BEGIN")?;
    match seed_all(engine) {
        Ok(inserted) => {
            engine.execute("COMMIT")?;
            info!(tables = inserted.len(), "demo schema seeded");
            Ok(inserted)
        }
        Err(e) => {
            // report the seeding error, not the rollback's
            let _ = engine.execute("ROLLBACK");
            Err(e)
        }
    }
}

/// Drops every user table, leaving SQLite's own bookkeeping alone.
pub fn drop_all<E: Engine + ?Sized>(engine: &E) -> Result<Vec<String>, EngineError> {
    let mut dropped = Vec::new();
    for table in engine.list_tables()? {
        if table.starts_with("sqlite_") {
            continue;
        }
        engine.execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(&table)))?;
        dropped.push(table);
    }
    Ok(dropped)
}
