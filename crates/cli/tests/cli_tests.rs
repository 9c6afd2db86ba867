//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("stitchpress").unwrap()
}

/// Lays out a minimal built site: manifest plus two assignment pages.
fn fake_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("assets/json")).unwrap();

    let manifest = serde_json::json!([
        {"slug": "zomer", "path": "./zomer.html", "featured_image": "zomer-poster"},
        {"slug": "winter", "path": "./winter.html", "featured_image": null},
    ]);
    std::fs::write(
        dir.path().join("assets/json/assignments.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();

    for slug in ["zomer", "winter"] {
        std::fs::write(
            dir.path().join(format!("{}.html", slug)),
            format!("<html><body><main id=\"main\"><p>Opdracht {}</p></main></body></html>", slug),
        )
        .unwrap();
    }

    dir
}

#[test]
fn test_help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("print"));
}

#[test]
fn test_build_without_api_url_fails() {
    cmd()
        .arg("build")
        .env_remove("WP_API_URL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("WP_API_URL"));
}

#[test]
fn test_print_all_writes_document() {
    let site = fake_site();
    let output = site.path().join("print.html");

    cmd()
        .args(["print", "--all", "--site"])
        .arg(site.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("Opdracht zomer"));
    assert!(html.contains("Opdracht winter"));
    // Manifest order is preserved.
    assert!(html.find("zomer").unwrap() < html.find("winter").unwrap());
    // The isolated document only links the site styles.
    assert!(html.contains("print.css"));
}

#[test]
fn test_print_single_slug() {
    let site = fake_site();
    let output = site.path().join("print.html");

    cmd()
        .args(["print", "winter", "--site"])
        .arg(site.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("Opdracht winter"));
    assert!(!html.contains("Opdracht zomer"));
}

#[test]
fn test_print_without_selection_fails() {
    let site = fake_site();

    cmd()
        .args(["print", "--site"])
        .arg(site.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing selected"));
}

#[test]
fn test_print_unknown_slug_fails() {
    let site = fake_site();

    cmd()
        .args(["print", "does-not-exist", "--site"])
        .arg(site.path())
        .assert()
        .failure();
}
