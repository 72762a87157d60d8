use yuju::engine::{Engine, Outcome, SqliteEngine};
use yuju::settings::ShellSettings;
use yuju::shell::{Flow, Shell};

fn setup() -> Shell<SqliteEngine> {
    let engine = SqliteEngine::open_in_memory().expect("db");
    Shell::new(engine, ShellSettings::default())
}

fn run(shell: &mut Shell<SqliteEngine>, line: &str) -> String {
    let mut out = Vec::new();
    let flow = shell.handle_line(line, &mut out).expect("line handled");
    assert_eq!(flow, Flow::Continue, "{line} should not quit");
    String::from_utf8(out).expect("utf8")
}

fn scalar(shell: &Shell<SqliteEngine>, sql: &str) -> String {
    match shell.engine().execute(sql).expect("query") {
        Outcome::Rows(result) => result.rows[0][0].clone(),
        Outcome::Affected(_) => panic!("expected rows"),
    }
}

#[test]
fn seeded_demo_answers_natural_language() {
    let mut shell = setup();
    let output = run(&mut shell, "seed_demo");
    assert!(output.contains("已为 user_info 表插入 5 条数据"), "{output}");

    let output = run(&mut shell, "查询表security_event中event_level等于'紧急'并且location等于'南门'的数据");
    assert!(output.contains("生成的SQL：SELECT * FROM security_event WHERE event_level = '紧急' AND location = '南门'"));
    assert!(output.contains("发现不明人员翻越围墙"), "{output}");
    assert!(!output.contains("烟雾传感器触发"), "{output}");

    let output = run(&mut shell, "查询表user_info中username包含admin的数据");
    assert!(output.contains("admin@example.com"), "{output}");
    assert!(!output.contains("user1@example.com"), "{output}");

    let output = run(&mut shell, "查询表user_info的记录数");
    assert!(output.contains("COUNT(*)"), "{output}");
    assert!(output.contains('5'), "{output}");
}

#[test]
fn insert_session_drives_the_prompt() {
    let mut shell = setup();
    run(&mut shell, "create_table user_info (name TEXT, phone TEXT, email TEXT)");
    assert_eq!(shell.prompt(), "> ");

    let output = run(&mut shell, "insert_into USER_INFO");
    assert!(output.contains("user_info表结构为"), "{output}");
    assert_eq!(shell.prompt(), "user_info> ");

    let output = run(&mut shell, "no separator here");
    assert!(output.contains("格式错误"), "{output}");
    run(&mut shell, "'a','b','c'");
    run(&mut shell, "'d','e','f'");
    // commands are data while collecting
    let output = run(&mut shell, "list_tables");
    assert!(output.contains("格式错误"), "{output}");

    let output = run(&mut shell, ";");
    assert!(output.contains("插入操作成功"), "{output}");
    assert_eq!(shell.prompt(), "> ");
    assert_eq!(scalar(&shell, "SELECT COUNT(*) FROM user_info"), "2");
}

#[test]
fn engine_errors_are_translated() {
    let mut shell = setup();
    let output = run(&mut shell, "查询表missing中所有数据");
    assert!(output.contains("表 missing 不存在"), "{output}");

    let output = run(&mut shell, "select_data SELEC * FROM x");
    assert!(output.contains("附近存在语法错误"), "{output}");

    let output = run(&mut shell, "insert_into missing");
    assert!(output.contains("表 missing 不存在"), "{output}");
    assert!(!shell.session().is_collecting());
}

#[test]
fn unknown_input_is_reported() {
    let mut shell = setup();
    let output = run(&mut shell, "make me a sandwich");
    assert!(output.contains("未识别的命令"), "{output}");
}

#[test]
fn administration_commands() {
    let mut shell = setup();
    let output = run(&mut shell, "create_table pets id INTEGER");
    assert!(output.contains("括号"), "{output}");
    let output = run(&mut shell, "create_table pets ()");
    assert!(output.contains("列定义不能为空"), "{output}");

    run(&mut shell, "create_table pets (id INTEGER PRIMARY KEY, name TEXT)");
    let output = run(&mut shell, "list_tables");
    assert!(output.contains("- pets"), "{output}");

    run(&mut shell, "select_data INSERT INTO pets (name) VALUES ('rex'), ('tom')");
    let output = run(&mut shell, "change_data pets SET name = 'max' WHERE name = 'rex'");
    assert!(output.contains("成功更新 1 条记录"), "{output}");
    let output = run(&mut shell, "change_data pets SET name = 'max' WHERE name = 'nobody'");
    assert!(output.contains("没有找到符合条件的数据"), "{output}");

    let output = run(&mut shell, "rename_column pets name nickname");
    assert!(output.contains("已成功重命名为 nickname"), "{output}");
    let output = run(&mut shell, "rename_column pets name other");
    assert!(output.contains("列 name 不存在"), "{output}");

    let output = run(&mut shell, "rename_table pets animals");
    assert!(output.contains("已重命名为 animals"), "{output}");
    let output = run(&mut shell, "desc_table animals");
    assert!(output.contains("nickname"), "{output}");

    let output = run(&mut shell, "delete_data animals WHERE nickname = 'tom'");
    assert!(output.contains("成功删除 1 条记录"), "{output}");
    let output = run(&mut shell, "truncate_table animals");
    assert!(output.contains("数据已清空"), "{output}");
    let output = run(&mut shell, "show_table_data animals");
    assert!(output.contains("结果为空"), "{output}");

    let output = run(&mut shell, "delete_table animals");
    assert!(output.contains("删除成功"), "{output}");
    let output = run(&mut shell, "list_tables");
    assert!(output.contains("共有 0 个表"), "{output}");
}

#[test]
fn init_db_drops_user_tables() {
    let mut shell = setup();
    run(&mut shell, "seed_demo");
    let output = run(&mut shell, "init_db");
    assert!(output.contains("已删除 4 个表"), "{output}");
    assert!(shell.engine().list_tables().expect("tables").iter().all(|t| t.starts_with("sqlite_")));
}

#[test]
fn seeding_twice_rolls_back() {
    let mut shell = setup();
    run(&mut shell, "seed_demo");
    let output = run(&mut shell, "seed_demo");
    assert!(output.contains("初始化数据时出错"), "{output}");
    assert_eq!(scalar(&shell, "SELECT COUNT(*) FROM user_info"), "5");
}

#[test]
fn quit_releases_an_open_session() {
    let mut shell = setup();
    run(&mut shell, "create_table t (a TEXT, b TEXT)");
    run(&mut shell, "insert_into t");
    run(&mut shell, "'x','y'");
    let mut out = Vec::new();
    assert_eq!(shell.handle_line("quit", &mut out).expect("quit"), Flow::Quit);
    assert!(!shell.session().is_collecting());
    assert_eq!(scalar(&shell, "SELECT COUNT(*) FROM t"), "0");
}
