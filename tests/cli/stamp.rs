//! Tests for the stamp command.

use crate::support::*;

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_renders_to_stdout() {
    let t = Test::logged_in().await;
    serve_secrets(&t.vault, DB_SECRETS).await;

    let output = t
        .stamp("user={{secret \"db/user\"}}\npass={{secret \"db/pass\"}}\n")
        .await;

    assert_success(&output);
    assert_eq!(stdout(&output), "user=alice\npass=s3cr3t\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_reads_repeated_path_once() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "db/user", "alice", 1).await;

    let output = t
        .stamp("{{secret \"db/user\"}} {{secret \"db/user\"}} {{secret \"db/user\"}}")
        .await;

    assert_success(&output);
    assert_eq!(stdout(&output), "alice alice alice");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_reads_only_the_taken_branch() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "dev/key", "D", 1).await;
    serve_secret(&t.vault, "prod/key", "P", 0).await;
    let data = t.file("data.json", r#"{"prod": false}"#);

    let template = t.file(
        "config.tmpl",
        "{{#if prod}}{{secret \"prod/key\"}}{{else}}{{secret \"dev/key\"}}{{/if}}",
    );
    let output = t
        .run(&[
            "stamp",
            template.to_str().unwrap(),
            "--data",
            data.to_str().unwrap(),
        ])
        .await;

    assert_success(&output);
    assert_eq!(stdout(&output), "D");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_missing_secret_prints_nothing() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "db/user", "alice", 1).await;
    missing_secret(&t.vault, "db/missing").await;

    let output = t
        .stamp("{{secret \"db/user\"}}:{{secret \"db/missing\"}}")
        .await;

    assert_failure(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "failed to read secret 'db/missing'");
    assert!(!stderr(&output).contains("'db/user'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_reports_every_failed_path() {
    let t = Test::logged_in().await;
    missing_secret(&t.vault, "b").await;
    missing_secret(&t.vault, "a").await;

    let output = t.stamp("{{secret \"b\"}}{{secret \"a\"}}").await;

    assert_failure(&output);
    let err = stderr(&output);
    let a = err.find("'a'").expect("a reported");
    let b = err.find("'b'").expect("b reported");
    assert!(a < b, "failures should be sorted by path: {}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_without_session_fails_before_reading() {
    let t = Test::new().await;
    forbid_secret_reads(&t.vault).await;

    let output = t.stamp("{{secret \"db/user\"}}").await;

    assert_failure(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "not authenticated");
    assert_stderr_contains(&output, "vaultage login");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_rejected_token_falls_back_to_login() {
    let t = Test::new().await;
    t.persist_token("s.expired");
    reject_tokens(&t.vault).await;
    forbid_secret_reads(&t.vault).await;

    let output = t.stamp("{{secret \"db/user\"}}").await;

    assert_failure(&output);
    assert_stderr_contains(&output, "persisted token was rejected");
    assert_stderr_contains(&output, "not authenticated");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_parse_error_reads_nothing() {
    let t = Test::logged_in().await;
    forbid_secret_reads(&t.vault).await;

    let output = t.stamp("{{#if x}}{{secret \"db/user\"}}").await;

    assert_failure(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "template error");
    assert_stderr_contains(&output, "Handlebars");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_output_file_is_owner_only() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "db/pass", "s3cr3t", 1).await;
    let template = t.file("config.tmpl", "pass={{secret \"db/pass\"}}");
    let out = t.dir.path().join("config.env");

    let output = t
        .run(&[
            "stamp",
            template.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .await;

    assert_success(&output);
    assert_stdout_empty(&output);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "pass=s3cr3t");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_failure_leaves_output_untouched() {
    let t = Test::logged_in().await;
    missing_secret(&t.vault, "db/missing").await;
    let template = t.file("config.tmpl", "{{secret \"db/missing\"}}");
    let out = t.file("config.env", "previous");

    let output = t
        .run(&[
            "stamp",
            template.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .await;

    assert_failure(&output);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_reads_template_from_stdin() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "db/user", "alice", 1).await;

    let output = t
        .run_with_stdin(&["stamp", "-"], "user={{secret \"db/user\"}}")
        .await;

    assert_success(&output);
    assert_eq!(stdout(&output), "user=alice");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_does_not_escape_values() {
    let t = Test::logged_in().await;
    serve_secret(&t.vault, "db/url", "a<b>&c=\"d\"", 1).await;

    let output = t.stamp("{{secret \"db/url\"}}").await;

    assert_success(&output);
    assert_eq!(stdout(&output), "a<b>&c=\"d\"");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_missing_template_file_fails() {
    let t = Test::logged_in().await;

    let output = t.run(&["stamp", "does-not-exist.tmpl"]).await;

    assert_failure(&output);
    assert_stderr_contains(&output, "io error");
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_interrupt_during_fetch_exits_at_once() {
    use std::process::Stdio;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let t = Test::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "value": "late" } }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&t.vault)
        .await;
    let template = t.file("config.tmpl", "{{secret \"slow\"}}");

    let mut cmd = t.std_cmd();
    cmd.args(["stamp", template.to_str().unwrap()])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let (output, elapsed) = commands::blocking(move || {
        let child = cmd.spawn().expect("failed to spawn vaultage");
        std::thread::sleep(Duration::from_millis(1500));

        let sent = Instant::now();
        let status = std::process::Command::new("kill")
            .args(["-INT", &child.id().to_string()])
            .status()
            .expect("failed to run kill");
        assert!(status.success());

        let output = child.wait_with_output().expect("failed to wait");
        (output, sent.elapsed())
    })
    .await;

    assert_eq!(output.status.code(), Some(130));
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
    assert_stdout_empty(&output);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stamp_with_expired_token_suggests_login() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let t = Test::new().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/db/user"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&t.vault)
        .await;
    let template = t.file("config.tmpl", "{{secret \"db/user\"}}");

    let output = t
        .run(&[
            "--token",
            "s.expired",
            "stamp",
            template.to_str().unwrap(),
        ])
        .await;

    assert_failure(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "failed to read secret 'db/user'");
    assert_stderr_contains(&output, "run: vaultage login");
}
