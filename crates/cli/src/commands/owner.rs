//! Store-owner commands.

use ratehub_client::RatehubClient;
use ratehub_core::OwnerRatingFilter;

use crate::commands::print_json;

pub async fn dashboard(
    client: &RatehubClient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dash = client.owner().dashboard().await?;
    if json {
        print_json(&*dash)?;
    } else {
        println!(
            "{} (#{}) - {:.1} average over {} ratings",
            dash.store_name, dash.store_id, dash.average_rating, dash.total_ratings
        );
        for rater in &dash.recent_raters {
            println!("  {} rated {}", rater.name, rater.value);
        }
    }
    Ok(())
}

pub async fn ratings(
    client: &RatehubClient,
    filter: &OwnerRatingFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = client.owner().ratings(filter).await?;
    if json {
        print_json(&*page)?;
    } else {
        for rating in &page.items {
            let name = rating.user_name.as_deref().unwrap_or("someone");
            let comment = rating.comment.as_deref().unwrap_or("");
            println!("{:<5} {name:<30} {comment}", rating.value);
        }
        println!(
            "page {}/{} ({} ratings)",
            page.meta.page, page.meta.total_pages, page.meta.total
        );
    }
    Ok(())
}
