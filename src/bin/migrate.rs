use axum_restaurant_api::db::{create_orm_conn, run_migrations};

// Reads DATABASE_URL directly; migrations have no use for the rest of
// the app config and should not require JWT_SECRET to be set.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
