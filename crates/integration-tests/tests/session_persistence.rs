//! Session restore across client instances, standing in for a page
//! reload.

use std::path::PathBuf;

use ratehub_integration_tests::{MockApi, PASSWORD};

fn temp_session_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "ratehub-it-session-{name}-{}.json",
        std::process::id()
    ))
}

#[tokio::test]
async fn test_session_survives_client_restart() {
    let api = MockApi::start().await;
    let path = temp_session_path("restart");
    let _ = std::fs::remove_file(&path);

    let client = api.client_with_session_file(path.clone());
    assert!(!client.session().is_authenticated());
    client
        .auth()
        .login("alice@example.com", PASSWORD)
        .await
        .expect("login");
    drop(client);

    // A fresh client picks the token up from disk.
    let revived = api.client_with_session_file(path.clone());
    assert!(revived.session().is_authenticated());
    let user = revived
        .auth()
        .current_user()
        .await
        .expect("whoami")
        .expect("restored session");
    assert_eq!(user.email, "alice@example.com");

    // Logout removes the persisted session.
    revived.logout().await;
    assert!(!path.exists());
}

#[tokio::test]
async fn test_corrupt_session_file_means_logged_out() {
    let api = MockApi::start().await;
    let path = temp_session_path("corrupt");
    std::fs::write(&path, b"{not json").expect("write corrupt file");

    let client = api.client_with_session_file(path.clone());
    assert!(!client.session().is_authenticated());
    assert!(
        client
            .auth()
            .current_user()
            .await
            .expect("whoami")
            .is_none()
    );

    let _ = std::fs::remove_file(&path);
}
