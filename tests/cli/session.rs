//! Tests for login and logout.

use crate::support::*;

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_removes_token() {
    let t = Test::logged_in().await;
    assert!(t.token_path().exists());

    let output = t.run(&["logout"]).await;

    assert_success(&output);
    assert!(!t.token_path().exists());
    assert_stderr_contains(&output, "removed");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_without_token_warns() {
    let t = Test::new().await;

    let output = t.run(&["logout"]).await;

    assert_success(&output);
    assert_stderr_contains(&output, "no persisted token");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_without_terminal_fails() {
    let t = Test::new().await;

    let output = t.run(&["login"]).await;

    assert_failure(&output);
    assert_stderr_contains(&output, "prompt failed");
    assert!(!t.token_path().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_password_requires_session() {
    let t = Test::new().await;

    let output = t.run(&["set-password"]).await;

    assert_failure(&output);
    assert_stderr_contains(&output, "not authenticated");
}
