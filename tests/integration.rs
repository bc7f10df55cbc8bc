use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_yaml-docs")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Runs in an empty working directory so no stray template, header or
/// ignore file is picked up.
fn dry_run(dir: &TempDir, args: &[&str]) -> String {
    let assert = cmd()
        .current_dir(dir.path())
        .arg("-d")
        .args(args)
        .assert()
        .success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

// -- rendering --

#[test]
fn search_root_renders_sections() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);

    assert!(out.contains("## Contents"));
    assert!(out.contains("- [Deployment](#deployment)"));
    assert!(out.contains("### Deployment"));
    assert!(out.contains("| replicaCount | int | false | `1` | Number of replicas |"));
    assert!(out.contains("### Networking"));
    assert!(out.contains("How the workload is exposed"));
    assert!(out.contains("| service.port | int | false | `80` | Port the service listens on |"));
    assert!(out.contains("### Other Values"));
    assert!(out.contains("yaml-docs v"));
}

#[test]
fn header_flags_and_auto_descriptions() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);

    assert!(out.contains(
        "| image.repository | string | **true** | `nginx` | Container image repository |"
    ));
    assert!(out.contains(
        "| image.tag | string | false | chart appVersion | Image tag, defaults to the chart appVersion |"
    ));
    assert!(out.contains("title='Deprecated'>⚠️</span> internal.mode |"));
}

#[test]
fn ignored_values_are_not_rendered() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);
    assert!(!out.contains("internal.token"));
    assert!(!out.contains("hunter2"));
}

#[test]
fn ignored_first_list_item_keeps_the_list() {
    let dir = TempDir::new().unwrap();
    let values = write(
        dir.path(),
        "values.yaml",
        "list:\n  # @ignore\n  - secret\n  - shown\nother: 1\n",
    );
    let out = dry_run(&dir, &["-f", &values]);
    assert!(out.contains("| list[0] | string | false | `shown` |"));
    assert!(out.contains("| other |"));
    assert!(!out.contains("secret"));
}

#[test]
fn list_item_comment_documents_the_item() {
    let dir = TempDir::new().unwrap();
    let values = write(
        dir.path(),
        "values.yaml",
        "list:\n  - name: a\n  # -- second item\n  - name: b\n",
    );
    let out = dry_run(&dir, &["-f", &values]);
    assert!(out.contains("| list[1] | object |"));
    assert!(out.contains("second item"));
    assert!(out.contains("| list[0].name |"));
}

#[test]
fn search_root_merges_every_yaml_file() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);
    assert!(out.contains("| extraEnv |"));
    assert!(out.contains("Extra environment variables"));
}

#[test]
fn raw_description_and_example_block() {
    let dir = TempDir::new().unwrap();
    let values = write(
        dir.path(),
        "in/values.yaml",
        concat!(
            "# k -- top line\n",
            "# @raw\n",
            "# line two\n",
            "# line three\n",
            "k: v\n",
            "# svc -- a service\n",
            "# @example Enable -- enable service\n",
            "# svc:\n",
            "#   enabled: true\n",
            "svc:\n",
            "  enabled: false\n",
        ),
    );
    let out = dry_run(&dir, &["-f", &values]);
    assert!(out.contains("top line\nline two\nline three"));
    assert!(out.contains("### Enable"));
    assert!(out.contains("enable service"));
    assert!(out.contains("```yaml\nsvc:\n  enabled: true\n```"));
}

#[test]
fn section_inheritance_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let values = write(
        dir.path(),
        "in/values.yaml",
        "# a -- first\n# @section -- Core\na: 1\n# b -- second\nb: 2\n# c -- third\n# @section -- @default\nc: 3\n",
    );

    let inherited = dry_run(&dir, &["-f", &values]);
    let b = inherited.find("| b |").unwrap();
    assert!(b < inherited.find("### Other Values").unwrap());

    let plain = dry_run(&dir, &["-f", &values, "--disable-section-inheritance"]);
    let b = plain.find("| b |").unwrap();
    assert!(b > plain.find("### Other Values").unwrap());
}

#[test]
fn sort_by_file_order() {
    let dir = TempDir::new().unwrap();
    let values = write(dir.path(), "in/values.yaml", "zeta: 1\nalpha: 2\n");

    let alphanum = dry_run(&dir, &["-f", &values]);
    assert!(alphanum.find("| alpha |").unwrap() < alphanum.find("| zeta |").unwrap());

    let file = dry_run(&dir, &["-f", &values, "-s", "file"]);
    assert!(file.find("| zeta |").unwrap() < file.find("| alpha |").unwrap());
}

#[test]
fn ignore_non_descriptions_drops_rows() {
    let dir = TempDir::new().unwrap();
    let values = write(dir.path(), "in/values.yaml", "# kept -- documented\nkept: 1\nplain: 2\n");

    assert!(dry_run(&dir, &["-f", &values]).contains("| plain |"));
    let out = dry_run(&dir, &["-f", &values, "--ignore-non-descriptions"]);
    assert!(out.contains("| kept |"));
    assert!(!out.contains("| plain |"));
}

#[test]
fn skip_footer_toc_and_page_breaks() {
    let dir = TempDir::new().unwrap();
    let chart = fixture_path("chart");

    let out = dry_run(
        &dir,
        &["-c", &chart, "--skip-version-footer", "--skip-toc", "--no-section-page-breaks"],
    );
    assert!(!out.contains("yaml-docs v"));
    assert!(!out.contains("## Contents"));
    assert!(!out.contains("page-break-after"));
    assert!(dry_run(&dir, &["-c", &chart]).contains("page-break-after"));
}

#[test]
fn flags_read_from_environment() {
    let dir = TempDir::new().unwrap();
    let assert = cmd()
        .current_dir(dir.path())
        .env("YAML_DOCS_SKIP_VERSION_FOOTER", "true")
        .env("YAML_DOCS_DRY_RUN", "true")
        .env("YAML_DOCS_CONFIG_SEARCH_ROOT", fixture_path("chart"))
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.contains("### Deployment"));
    assert!(!out.contains("yaml-docs v"));
}

#[test]
fn custom_template_replaces_default() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(
        &dir,
        &["-c", &fixture_path("chart"), "-t", &fixture_path("templates/keys.md.tera")],
    );
    assert!(out.starts_with("# Keys for "));
    assert!(out.contains("- replicaCount (int)"));
    assert!(!out.contains("| Key |"));
}

#[test]
fn header_file_is_prepended() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".document-header.md", "# My Chart\n\nIntro text.\n");
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);
    assert!(out.starts_with("# My Chart\n\nIntro text."));
}

#[test]
fn ignore_file_excludes_inputs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "root/values.yaml", "# kept -- yes\nkept: 1\n");
    write(dir.path(), "root/skip/values.yaml", "# dropped -- no\ndropped: 1\n");
    write(dir.path(), "root/.yamldocsignore", "skip/\n");

    let root = dir.path().join("root");
    let out = dry_run(&dir, &["-c", root.to_str().unwrap()]);
    assert!(out.contains("| kept |"));
    assert!(!out.contains("dropped"));
}

#[test]
fn rendered_markdown_has_no_blank_runs() {
    let dir = TempDir::new().unwrap();
    let out = dry_run(&dir, &["-c", &fixture_path("chart")]);
    assert!(!out.contains("\n\n\n"));
    assert!(!out.contains(" \n"));
}

// -- outputs --

#[test]
fn writes_single_output_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "# a -- from a\na: 1\n");
    write(dir.path(), "b.yaml", "# b -- from b\nb: 2\n");

    cmd()
        .current_dir(dir.path())
        .args(["-f", "a.yaml,b.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generating README Documentation for"));

    let out = fs::read_to_string(dir.path().join("README.md")).unwrap();
    assert!(out.contains("| a | int |"));
    assert!(out.contains("| b | int |"));
    assert_eq!(out.matches("yaml-docs v").count(), 1);
}

#[test]
fn writes_one_file_per_input() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "# a -- from a\na: 1\n");
    write(dir.path(), "b.yaml", "# b -- from b\nb: 2\n");

    cmd()
        .current_dir(dir.path())
        .args(["-f", "a.yaml", "-f", "b.yaml", "--multiple-output-files"])
        .assert()
        .success();

    let a = fs::read_to_string(dir.path().join("README-a.yaml.md")).unwrap();
    let b = fs::read_to_string(dir.path().join("README-b.yaml.md")).unwrap();
    assert!(a.contains("| a | int |") && !a.contains("| b |"));
    assert!(b.contains("| b | int |") && !b.contains("| a |"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn output_file_and_prefix_flags() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "a: 1\n");

    cmd()
        .current_dir(dir.path())
        .args(["-f", "a.yaml", "-o", "DOCS.md"])
        .assert()
        .success();
    assert!(dir.path().join("DOCS.md").exists());

    cmd()
        .current_dir(dir.path())
        .args(["-f", "a.yaml", "--multiple-output-files", "-p", "docs-%s.md"])
        .assert()
        .success();
    assert!(dir.path().join("docs-a.yaml.md").exists());
}

#[test]
fn dry_run_writes_no_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.yaml", "a: 1\n");
    cmd()
        .current_dir(dir.path())
        .args(["-f", "a.yaml", "-d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| a | int |"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn empty_root_warns_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("empty")).unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["-c", "empty"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No YAML files were found"));
    assert!(!dir.path().join("README.md").exists());
}

// -- strict mode --

#[test]
fn strict_mode_lists_undocumented_values() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["-c", &fixture_path("chart"), "-x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("values without documentation"))
        .stderr(predicate::str::contains("internal"))
        .stderr(predicate::str::contains("service.type").not());
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn strict_mode_passes_when_documented() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "values.yaml",
        "# image -- image settings\nimage:\n  repository: nginx\n  tag: latest\n# port -- port\nport: 80\n",
    );
    cmd()
        .current_dir(dir.path())
        .args(["-f", "values.yaml", "-x", "-d"])
        .assert()
        .success();
}

#[test]
fn strict_mode_allow_list_flags() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "values.yaml", "# a -- a\na:\n  b: 1\n  c: 2\n");
    cmd()
        .current_dir(dir.path())
        .args(["-f", "values.yaml", "-x", "-d", "-y", "a.b", "-z", r"^a\.c$"])
        .assert()
        .success();
    cmd()
        .current_dir(dir.path())
        .args(["-f", "values.yaml", "-x", "-d", "-y", "a.b"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("a.c"));
}

#[test]
fn invalid_regex_is_fatal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "values.yaml", "a: 1\n");
    cmd()
        .current_dir(dir.path())
        .args(["-f", "values.yaml", "-x", "-z", "("])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid regex"));
}

// -- argument errors --

#[test]
fn conflicting_inputs_fail() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "values.yaml", "a: 1\n");
    cmd()
        .current_dir(dir.path())
        .args(["-c", ".", "-f", "values.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot be used together"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is required"));
}

#[test]
fn nonexistent_config_file_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["-f", "nope.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}
