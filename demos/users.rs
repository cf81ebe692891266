use json_docstore::Driver;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Address {
    country: String,
    state: String,
    city: String,
    pincode: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct User {
    name: String,
    age: String,
    contact: String,
    company: String,
    address: Address,
}

fn user(name: &str, age: &str, city: &str) -> User {
    User {
        name: name.into(),
        age: age.into(),
        contact: "555-0100".into(),
        company: "Acme".into(),
        address: Address {
            country: "NZ".into(),
            state: "Wellington".into(),
            city: city.into(),
            pincode: "6011".into(),
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let root = std::env::temp_dir().join("json_docstore_demo_users");
    // failing to open the store is the one fatal error
    let db = match Driver::open(&root) {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(%err, "cannot open store");
            std::process::exit(1);
        }
    };

    for u in [user("Ann", "31", "Wellington"), user("Bob", "40", "Lower Hutt")] {
        match db.write("user", &u.name, &u) {
            Ok(()) => tracing::info!(name = %u.name, "record created"),
            Err(err) => tracing::error!(%err, name = %u.name, "write failed"),
        }
    }

    match db.read::<User>("user", "Ann") {
        Ok(ann) => println!("{ann:#?}"),
        Err(err) => tracing::error!(%err, "read failed"),
    }

    match db.read_all("user") {
        Ok(docs) => docs.iter().for_each(|d| print!("{d}")),
        Err(err) => tracing::error!(%err, "read_all failed"),
    }

    if let Err(err) = db.delete("user", "") {
        tracing::error!(%err, "delete failed");
    }
    let _ = std::fs::remove_dir_all(&root);
}
