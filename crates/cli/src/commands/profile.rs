//! Self-service profile update, driven through the profile form so only
//! changed fields are sent.

use ratehub_client::RatehubClient;
use ratehub_client::forms::ProfileForm;

use crate::commands::{print_json, print_user};

pub async fn update(
    client: &RatehubClient,
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = ProfileForm::open(client).await?;
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }
    if let Some(address) = address {
        form.address = address;
    }

    let user = form.submit(client).await?;
    tracing::info!("profile updated");
    if json {
        print_json(&user)?;
    } else {
        print_user(&user);
    }
    Ok(())
}
