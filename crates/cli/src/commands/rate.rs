//! Rating commands, driven through [`RatingForm`] so `set` transparently
//! creates or updates depending on whether a rating already exists.

use ratehub_client::RatehubClient;
use ratehub_client::forms::RatingForm;

use crate::commands::print_json;

pub async fn set(
    client: &RatehubClient,
    store_id: i64,
    value: u8,
    comment: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = RatingForm::open(client, store_id).await?;
    let editing = form.is_edit();

    form.set_value(value);
    if let Some(comment) = comment {
        form.set_comment(comment);
    }

    let rating = form.submit(client).await?;
    if editing {
        tracing::info!("updated rating of store {store_id} to {}", rating.value);
    } else {
        tracing::info!("rated store {store_id} with {}", rating.value);
    }
    if json {
        print_json(&rating)?;
    }
    Ok(())
}

pub async fn delete(
    client: &RatehubClient,
    store_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = RatingForm::open(client, store_id).await?;
    form.delete(client).await?;
    tracing::info!("deleted rating of store {store_id}");
    Ok(())
}
