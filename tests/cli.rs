use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    _temp: TempDir,
    conf: PathBuf,
    memos: PathBuf,
}

fn setup() -> Env {
    let temp = TempDir::new().unwrap();
    let conf = temp.path().join("conf");
    let memos = temp.path().join("memos");
    fs::create_dir_all(&conf).unwrap();
    fs::create_dir_all(&memos).unwrap();
    Env { _temp: temp, conf, memos }
}

fn cmd(env: &Env) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("memo").unwrap();
    c.env("MEMO_CONFIG_DIR", &env.conf)
        .env("MEMODIR", &env.memos)
        .env("NO_COLOR", "1")
        .env("EDITOR", "true")
        .env_remove("RUST_LOG");
    c
}

fn only_memo(dir: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one memo, found {entries:?}");
    entries.into_iter().next().unwrap()
}

#[test]
fn new_with_title_appends_piped_stdin() {
    let env = setup();
    cmd(&env)
        .args(["new", "Hello World"])
        .write_stdin("piped body\n")
        .assert()
        .success();

    let path = only_memo(&env.memos);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("-Hello-World.md"), "{name}");
    assert_eq!(fs::read_to_string(&path).unwrap(), "# Hello World\npiped body\n");
}

#[test]
fn new_prompts_for_title_and_escapes_it() {
    let env = setup();
    cmd(&env)
        .arg("n")
        .write_stdin("My: Note/Idea\nfirst line\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: "));

    let path = only_memo(&env.memos);
    assert!(path.to_string_lossy().ends_with("-My-Note-Idea.md"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "# My: Note/Idea\nfirst line\n");
}

#[test]
fn new_on_existing_memo_only_appends() {
    let env = setup();
    cmd(&env).args(["new", "again"]).write_stdin("one\n").assert().success();
    cmd(&env).args(["new", "again"]).write_stdin("two\n").assert().success();

    let path = only_memo(&env.memos);
    assert_eq!(fs::read_to_string(&path).unwrap(), "# again\none\ntwo\n");
}

#[test]
fn new_canceled_at_prompt() {
    let env = setup();
    cmd(&env)
        .arg("new")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("memo: canceled"));
    assert_eq!(fs::read_dir(&env.memos).unwrap().count(), 0);
}

#[test]
fn new_uses_configured_template() {
    let env = setup();
    // the first run writes config.toml; the template is picked up from then on
    cmd(&env).arg("list").assert().success();
    let template = env.conf.join("template.txt");
    fs::write(&template, "---\ntitle: {{_title_}}\n---\n# {{.Title}}\n").unwrap();
    cmd(&env).args(["new", "templated"]).assert().success();

    let body = fs::read_to_string(only_memo(&env.memos)).unwrap();
    assert_eq!(body, "---\ntitle: templated\n---\n# templated\n");
}

#[test]
fn list_plain_fullpath_and_format() {
    let env = setup();
    fs::write(env.memos.join("2024-01-01-a.md"), "# Alpha\n").unwrap();
    fs::write(env.memos.join("2024-01-02-b.md"), "# Beta\n").unwrap();
    fs::write(env.memos.join("notes.txt"), "ignored").unwrap();

    cmd(&env)
        .arg("list")
        .assert()
        .success()
        .stdout("2024-01-02-b.md\n2024-01-01-a.md\n");

    let full = env.memos.join("2024-01-01-a.md");
    cmd(&env)
        .args(["l", "--fullpath", "01-a"])
        .assert()
        .success()
        .stdout(format!("{}\n", full.display()));

    cmd(&env)
        .args(["list", "--format", "{{.File}}|{{.Title}}"])
        .assert()
        .success()
        .stdout("2024-01-02-b.md|Beta\n2024-01-01-a.md|Alpha\n");
}

#[test]
fn cat_named_memo() {
    let env = setup();
    fs::write(env.memos.join("2024-01-01-a.md"), "# Alpha\nbody\n").unwrap();
    cmd(&env)
        .args(["cat", "2024-01-01-a.md"])
        .assert()
        .success()
        .stdout("# Alpha\nbody\n");
}

#[test]
fn delete_requires_two_confirmations() {
    let env = setup();
    let target = env.memos.join("2024-01-01-gone.md");
    let keep = env.memos.join("2024-01-01-keep.md");
    fs::write(&target, "x").unwrap();
    fs::write(&keep, "x").unwrap();

    cmd(&env).args(["delete", "gone"]).write_stdin("y\nn\n").assert().success();
    assert!(target.exists());

    cmd(&env)
        .args(["d", "gone"])
        .write_stdin("y\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted:"));
    assert!(!target.exists());
    assert!(keep.exists());

    cmd(&env)
        .args(["delete", "nothing-here"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matched entry"));
}

#[test]
fn delete_without_pattern_fails() {
    let env = setup();
    cmd(&env)
        .arg("delete")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern required"));
}

#[test]
fn config_cat_prints_written_defaults() {
    let env = setup();
    cmd(&env)
        .args(["config", "--cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("memodir = "))
        .stdout(predicate::str::contains("selectcmd = \"peco\""));
    assert!(env.conf.join("config.toml").exists());
    assert!(env.conf.join("plugins").is_dir());
}

#[test]
fn broken_config_is_reported() {
    let env = setup();
    fs::write(env.conf.join("config.toml"), "memodir = [").unwrap();
    cmd(&env).arg("list").assert().failure().stderr(predicate::str::starts_with("memo: "));
}

#[test]
fn unknown_command_fails() {
    let env = setup();
    cmd(&env)
        .arg("nosuch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nosuch' is not a memo command"));
}

#[cfg(unix)]
mod shell {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_config(env: &Env, editor: &str) {
        let body = format!(
            "memodir = \"{}\"\neditor = \"{editor}\"\nselectcmd = \"head -n 1\"\n\
             grepcmd = \"grep -nH ${{PATTERN}} ${{FILES}}\"\n",
            env.memos.display()
        );
        fs::write(env.conf.join("config.toml"), body).unwrap();
    }

    fn write_plugin(env: &Env, name: &str, script: &str) {
        let dir = env.conf.join("plugins");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn cat_without_file_uses_selector() {
        let env = setup();
        write_config(&env, "true");
        fs::write(env.memos.join("2024-01-01-a.md"), "older\n").unwrap();
        fs::write(env.memos.join("2024-01-02-b.md"), "newer\n").unwrap();
        cmd(&env).arg("cat").assert().success().stdout("newer\n");
    }

    #[test]
    fn grep_runs_configured_command() {
        let env = setup();
        write_config(&env, "true");
        fs::write(env.memos.join("2024-01-01-a.md"), "apple\nneedle here\n").unwrap();
        fs::write(env.memos.join("2024-01-02-b.md"), "nothing\n").unwrap();
        cmd(&env)
            .args(["grep", "needle"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2024-01-01-a.md:2:needle here"));
    }

    #[test]
    fn plugin_runs_with_memodir_and_shows_in_help() {
        let env = setup();
        write_config(&env, "true");
        write_plugin(
            &env,
            "hello",
            "#!/bin/sh\nif [ \"$1\" = \"-usage\" ]; then echo \"say hello\"; exit 0; fi\n\
             echo \"dir=$MEMODIR args=$*\"\n",
        );

        cmd(&env)
            .args(["hello", "x", "y"])
            .assert()
            .success()
            .stdout(format!("dir={} args=x y\n", env.memos.display()));

        cmd(&env)
            .assert()
            .success()
            .stdout(predicate::str::contains("SUB COMMANDS:"))
            .stdout(predicate::str::contains("     hello\n       say hello"));
    }

    #[test]
    fn failing_editor_is_an_error() {
        let env = setup();
        write_config(&env, "false");
        fs::write(env.memos.join("2024-01-01-a.md"), "x\n").unwrap();
        cmd(&env).args(["edit", "2024-01-01-a.md"]).assert().failure();
    }
}
