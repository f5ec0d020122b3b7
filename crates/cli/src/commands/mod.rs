//! Command implementations.

pub mod admin;
pub mod auth;
pub mod owner;
pub mod profile;
pub mod rate;
pub mod stores;

use ratehub_core::{Paginated, Store, User};

/// Dump any DTO as pretty JSON (`--json` mode).
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_user(user: &User) {
    let address = user.address.as_deref().unwrap_or("-");
    println!(
        "#{:<5} {:<40} {:<30} {:<6} {}",
        user.id, user.name, user.email, user.role, address
    );
}

pub fn print_user_page(page: &Paginated<User>) {
    for user in &page.items {
        print_user(user);
    }
    println!(
        "page {}/{} ({} users)",
        page.meta.page, page.meta.total_pages, page.meta.total
    );
}

pub fn print_store(store: &Store) {
    let yours = store
        .user_rating
        .as_ref()
        .map(|r| format!("  yours: {}", r.value))
        .unwrap_or_default();
    println!(
        "#{:<5} {:<40} {:<30} {:.1} ({} ratings){yours}",
        store.id, store.name, store.address, store.average_rating, store.rating_count
    );
}

pub fn print_store_page(page: &Paginated<Store>) {
    for store in &page.items {
        print_store(store);
    }
    println!(
        "page {}/{} ({} stores)",
        page.meta.page, page.meta.total_pages, page.meta.total
    );
}
