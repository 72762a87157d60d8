use yuju::settings::Settings;

#[test]
fn defaults_apply_without_a_file() {
    let settings = Settings::load_from("no_such_yuju_settings").expect("settings");
    assert_eq!(settings.database.path, "yuju.db");
    assert!(!settings.database.in_memory);
    assert_eq!(settings.shell.prompt, "> ");
    assert_eq!(settings.shell.terminator, ";");
    assert!(settings.shell.echo_sql);
    assert_eq!(settings.shell.history_file, None);
}

#[test]
fn file_overrides_defaults() {
    let path = "test_yuju_settings.toml";
    std::fs::write(
        path,
        "[database]\nin_memory = true\n\n[shell]\nterminator = \"end\"\nhistory_file = \"/tmp/yuju_history\"\n",
    )
    .expect("write settings");
    let settings = Settings::load_from("test_yuju_settings");
    // Clean up before asserting so a failure leaves nothing behind
    let _ = std::fs::remove_file(path);
    let settings = settings.expect("settings");
    assert!(settings.database.in_memory);
    assert_eq!(settings.database.path, "yuju.db");
    assert_eq!(settings.shell.terminator, "end");
    assert_eq!(settings.shell.prompt, "> ");
    assert_eq!(settings.shell.history_file.as_deref(), Some("/tmp/yuju_history"));
}
