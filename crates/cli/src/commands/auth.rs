//! Session commands: login, register, logout, whoami, password change.

use ratehub_client::RatehubClient;
use ratehub_client::forms::PasswordForm;
use ratehub_client::http::RegisterInput;

use crate::commands::{print_json, print_user};

pub async fn login(
    client: &RatehubClient,
    email: &str,
    password: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = client.auth().login(email, password).await?;
    tracing::info!("logged in as {} ({})", user.email, user.role);
    if json {
        print_json(&user)?;
    } else {
        print_user(&user);
    }
    Ok(())
}

pub async fn register(
    client: &RatehubClient,
    name: &str,
    email: &str,
    password: &str,
    address: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = client
        .auth()
        .register(RegisterInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            address,
        })
        .await?;
    tracing::info!("registered {}", user.email);
    if json {
        print_json(&user)?;
    } else {
        print_user(&user);
    }
    Ok(())
}

pub async fn logout(client: &RatehubClient) {
    client.logout().await;
}

pub async fn whoami(
    client: &RatehubClient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match client.auth().current_user().await? {
        Some(user) => {
            if json {
                print_json(&*user)?;
            } else {
                print_user(&user);
            }
        }
        None => println!("not logged in"),
    }
    Ok(())
}

pub async fn change_password(
    client: &RatehubClient,
    current: &str,
    new: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = PasswordForm::new();
    form.current = current.to_string();
    form.new = new.to_string();
    form.confirm = new.to_string();
    form.submit(client).await?;
    tracing::info!("password changed");
    Ok(())
}
