use std::error::Error;

use database::{DatabaseConnectionInfo, PgDatabase};
use flightlog::{client::Client, not_found_to_none};
use model::{location::Location, ExampleData};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // database
    let database_connection_info =
        DatabaseConnectionInfo::from_env().ok_or("expected database connection info in env.")?;
    let database = PgDatabase::connect(database_connection_info).await?;
    let client = Client::new("playground", database);

    let created = client.create_location(Location::example_data()).await?;
    println!("created: {}", serde_json::to_string_pretty(&created)?);

    let prefix: String = created.content.name.chars().take(4).collect();
    let found = client.location_search_by_name(&prefix).await?;
    println!("search {:?}: {}", prefix, serde_json::to_string_pretty(&found)?);

    client.delete_location(created.id).await?;
    let after = not_found_to_none(client.get_location(created.id).await)?;
    log::info!("location {} after delete: {:?}", created.id, after);
    println!(
        "deleted at: {:?}",
        client.location_deleted_at(created.id).await?
    );

    Ok(())
}
