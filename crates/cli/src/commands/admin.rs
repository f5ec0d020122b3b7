//! Administrator commands: user/store management and the dashboard.
//!
//! Create and update go through the form controllers, so the CLI gets the
//! same local validation and changed-fields-only updates as a dialog
//! would.

use ratehub_client::RatehubClient;
use ratehub_client::forms::{StoreForm, StoreFormOutcome, UserForm, UserFormOutcome};
use ratehub_core::{Role, StoreFilter, UserFilter};

use crate::commands::{print_json, print_store, print_store_page, print_user, print_user_page};

pub async fn dashboard(
    client: &RatehubClient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dash = client.admin().dashboard().await?;
    if json {
        print_json(&*dash)?;
    } else {
        println!("users:   {}", dash.total_users);
        println!("stores:  {}", dash.total_stores);
        println!("ratings: {}", dash.total_ratings);
    }
    Ok(())
}

pub async fn users_list(
    client: &RatehubClient,
    filter: &UserFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = client.admin().users(filter).await?;
    if json {
        print_json(&*page)?;
    } else {
        print_user_page(&page);
    }
    Ok(())
}

pub async fn user_show(
    client: &RatehubClient,
    id: i64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = client.admin().user(id).await?;
    if json {
        print_json(&*user)?;
    } else {
        print_user(&user);
        if let Some(rating) = user.store_rating {
            println!("  store rating: {rating:.1}");
        }
    }
    Ok(())
}

pub async fn user_create(
    client: &RatehubClient,
    name: &str,
    email: &str,
    password: &str,
    address: Option<String>,
    role: Role,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = UserForm::create();
    form.name = name.to_string();
    form.email = email.to_string();
    form.password = password.to_string();
    form.address = address.unwrap_or_default();
    form.role = role;

    match form.submit(client).await? {
        UserFormOutcome::Created(user) | UserFormOutcome::Updated(user) => {
            tracing::info!("created user {}", user.email);
            if json {
                print_json(&user)?;
            } else {
                print_user(&user);
            }
        }
        UserFormOutcome::Unchanged => {}
    }
    Ok(())
}

pub async fn user_update(
    client: &RatehubClient,
    id: i64,
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    role: Option<Role>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = UserForm::edit(client, id).await?;
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }
    if let Some(address) = address {
        form.address = address;
    }
    if let Some(role) = role {
        form.role = role;
    }

    match form.submit(client).await? {
        UserFormOutcome::Created(user) | UserFormOutcome::Updated(user) => {
            tracing::info!("updated user {id}");
            if json {
                print_json(&user)?;
            } else {
                print_user(&user);
            }
        }
        UserFormOutcome::Unchanged => tracing::info!("nothing to update"),
    }
    Ok(())
}

pub async fn user_delete(
    client: &RatehubClient,
    id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    client.admin().delete_user(id).await?;
    tracing::info!("deleted user {id}");
    Ok(())
}

pub async fn stores_list(
    client: &RatehubClient,
    filter: &StoreFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = client.admin().stores(filter).await?;
    if json {
        print_json(&*page)?;
    } else {
        print_store_page(&page);
    }
    Ok(())
}

pub async fn store_create(
    client: &RatehubClient,
    name: &str,
    email: Option<String>,
    address: &str,
    owner: Option<i64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = StoreForm::create();
    form.name = name.to_string();
    form.email = email.unwrap_or_default();
    form.address = address.to_string();
    form.owner_id = owner;

    match form.submit(client).await? {
        StoreFormOutcome::Created(store) | StoreFormOutcome::Updated(store) => {
            tracing::info!("created store {}", store.name);
            if json {
                print_json(&store)?;
            } else {
                print_store(&store);
            }
        }
        StoreFormOutcome::Unchanged => {}
    }
    Ok(())
}

pub async fn store_update(
    client: &RatehubClient,
    id: i64,
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    owner: Option<i64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = StoreForm::edit(client, id).await?;
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }
    if let Some(address) = address {
        form.address = address;
    }
    if let Some(owner) = owner {
        form.owner_id = Some(owner);
    }

    match form.submit(client).await? {
        StoreFormOutcome::Created(store) | StoreFormOutcome::Updated(store) => {
            tracing::info!("updated store {id}");
            if json {
                print_json(&store)?;
            } else {
                print_store(&store);
            }
        }
        StoreFormOutcome::Unchanged => tracing::info!("nothing to update"),
    }
    Ok(())
}

pub async fn store_delete(
    client: &RatehubClient,
    id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    client.admin().delete_store(id).await?;
    tracing::info!("deleted store {id}");
    Ok(())
}
