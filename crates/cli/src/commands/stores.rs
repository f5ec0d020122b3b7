//! Public store browsing, including the interactive debounced search.

use std::time::Duration;

use ratehub_client::{Debouncer, RatehubClient};
use ratehub_core::StoreSearch;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{print_json, print_store, print_store_page};

/// Matches the original UI's 500ms search debounce.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub async fn list(
    client: &RatehubClient,
    search: &StoreSearch,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = client.stores().list(search).await?;
    if json {
        print_json(&*page)?;
    } else {
        print_store_page(&page);
    }
    Ok(())
}

pub async fn show(
    client: &RatehubClient,
    id: i64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = client.stores().detail(id).await?;
    if json {
        print_json(&*store)?;
    } else {
        print_store(&store);
        if let Some(email) = &store.email {
            println!("  email: {email}");
        }
        if let Some(rating) = &store.user_rating {
            let comment = rating.comment.as_deref().unwrap_or("");
            println!("  your rating: {} {comment}", rating.value);
        }
    }
    Ok(())
}

/// Read search terms line by line, debounce them, and re-query once the
/// input settles. Each keystroke burst produces exactly one request.
pub async fn interactive_search(
    client: &RatehubClient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE, String::new());
    let mut settled = debouncer.settled();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("type a search term, results follow once input settles (ctrl-d to quit)");
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.update(line.trim().to_string()),
                None => break,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let term = settled.borrow_and_update().clone();
                let search = StoreSearch {
                    search: term,
                    ..StoreSearch::default()
                };
                match client.stores().list(&search).await {
                    Ok(page) => {
                        if json {
                            print_json(&*page)?;
                        } else {
                            print_store_page(&page);
                        }
                    }
                    Err(e) => tracing::error!("search failed: {e}"),
                }
            }
        }
    }
    Ok(())
}
