use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_restaurant_api::db::create_pool;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let manager_id = ensure_account(&pool, "manager", "manager123", "Mario", "Rossi", "manager").await?;
    ensure_account(&pool, "crew1", "crew123", "Luigi", "Bianchi", "delivery_crew").await?;
    ensure_account(&pool, "customer1", "customer123", "Anna", "Verdi", "customer").await?;

    seed_menu(&pool).await?;

    println!("Seed completed. Manager ID: {manager_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .execute(pool)
    .await?;

    let (user_id,): (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, assigned_at = now()
        "#,
    )
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn ensure_category(pool: &sqlx::PgPool, slug: &str, title: &str) -> anyhow::Result<Uuid> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, slug, title)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(slug)
    .bind(title)
    .execute(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let appetizers = ensure_category(pool, "appetizers", "Appetizers").await?;
    let mains = ensure_category(pool, "mains", "Mains").await?;
    let desserts = ensure_category(pool, "desserts", "Desserts").await?;

    let items = vec![
        ("Bruschetta", Decimal::new(750, 2), false, appetizers),
        ("Greek Salad", Decimal::new(1200, 2), true, appetizers),
        ("Grilled Salmon", Decimal::new(2300, 2), true, mains),
        ("Pasta Primavera", Decimal::new(1650, 2), false, mains),
        ("Lemon Tart", Decimal::new(675, 2), false, desserts),
    ];

    for (title, price, featured, category_id) in items {
        // Titles are not unique in the schema, so check before inserting.
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM menu_items WHERE title = $1")
                .bind(title)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO menu_items (id, title, price, featured, category_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(price)
        .bind(featured)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
