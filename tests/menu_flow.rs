use axum_restaurant_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::menu_items::{CreateMenuItemRequest, UpdateMenuItemRequest},
    entity::{
        categories::ActiveModel as CategoryActive, menu_items::ActiveModel as MenuItemActive,
        user_roles::ActiveModel as UserRoleActive, users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    roles::Role,
    routes::params::{MenuItemQuery, MenuItemSortBy, SortOrder},
    services::menu_service,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Menu browsing and administration: filters, search across item and
// category titles, sorting, and the manager-only mutations.
#[tokio::test]
async fn menu_browse_and_admin_flow() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    let customer_id = create_account(&state, "diner", "customer").await?;
    let manager_id = create_account(&state, "boss", "manager").await?;
    let customer = AuthUser {
        user_id: customer_id,
        role: Some(Role::Customer),
    };
    let manager = AuthUser {
        user_id: manager_id,
        role: Some(Role::Manager),
    };

    let (mains_id, desserts_id) = seed_menu(&state).await?;

    // Everything is visible without filters.
    let all = menu_service::list_menu_items(&state, &customer, query_with(|_| {})).await?;
    assert_eq!(all.meta.and_then(|m| m.total), Some(3));

    // Category and featured filters narrow the listing.
    let desserts =
        menu_service::list_menu_items(&state, &customer, query_with(|q| q.category = Some(desserts_id)))
            .await?;
    assert_eq!(desserts.data.expect("items").items.len(), 2);

    let featured =
        menu_service::list_menu_items(&state, &customer, query_with(|q| q.featured = Some(true)))
            .await?;
    let featured = featured.data.expect("items").items;
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].title, "Greek Salad");

    // Search matches the item title or its category title.
    let by_title =
        menu_service::list_menu_items(&state, &customer, query_with(|q| q.search = Some("lemon".into())))
            .await?;
    assert_eq!(by_title.data.expect("items").items.len(), 1);

    let by_category = menu_service::list_menu_items(
        &state,
        &customer,
        query_with(|q| q.search = Some("dessert".into())),
    )
    .await?;
    let by_category = by_category.data.expect("items").items;
    assert_eq!(by_category.len(), 2);
    assert!(by_category.iter().any(|item| item.title == "Baklava"));

    // Price sort, cheapest first.
    let cheapest_first = menu_service::list_menu_items(
        &state,
        &customer,
        query_with(|q| {
            q.sort_by = Some(MenuItemSortBy::Price);
            q.sort_order = Some(SortOrder::Asc);
        }),
    )
    .await?;
    let cheapest_first = cheapest_first.data.expect("items").items;
    assert_eq!(cheapest_first[0].title, "Lemon Tart");

    // Pagination reports the full count.
    let page = menu_service::list_menu_items(&state, &customer, query_with(|q| q.per_page = Some(2)))
        .await?;
    assert_eq!(page.data.expect("items").items.len(), 2);
    assert_eq!(page.meta.and_then(|m| m.total), Some(3));

    // Manager mutations.
    let created = menu_service::create_menu_item(
        &state,
        &manager,
        CreateMenuItemRequest {
            title: "Moussaka".into(),
            price: Decimal::new(1850, 2),
            featured: false,
            category_id: mains_id,
        },
    )
    .await?
    .data
    .expect("created");
    assert_eq!(created.price, Decimal::new(1850, 2));

    let zero_price = menu_service::create_menu_item(
        &state,
        &manager,
        CreateMenuItemRequest {
            title: "Free Lunch".into(),
            price: Decimal::ZERO,
            featured: false,
            category_id: mains_id,
        },
    )
    .await;
    match zero_price {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "price must be greater than 0."),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    let orphan = menu_service::create_menu_item(
        &state,
        &manager,
        CreateMenuItemRequest {
            title: "Mystery Dish".into(),
            price: Decimal::new(500, 2),
            featured: false,
            category_id: Uuid::new_v4(),
        },
    )
    .await;
    match orphan {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Category not found."),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    let repriced = menu_service::update_menu_item(
        &state,
        &manager,
        created.id,
        UpdateMenuItemRequest {
            title: None,
            price: Some(Decimal::new(1950, 2)),
            featured: None,
            category_id: None,
        },
    )
    .await?
    .data
    .expect("updated");
    assert_eq!(repriced.price, Decimal::new(1950, 2));
    assert_eq!(repriced.title, "Moussaka");

    let replaced = menu_service::replace_menu_item(
        &state,
        &manager,
        created.id,
        CreateMenuItemRequest {
            title: "Moussaka Special".into(),
            price: Decimal::new(2100, 2),
            featured: true,
            category_id: mains_id,
        },
    )
    .await?
    .data
    .expect("replaced");
    assert_eq!(replaced.title, "Moussaka Special");
    assert!(replaced.featured);

    menu_service::delete_menu_item(&state, &manager, created.id).await?;
    let missing = menu_service::delete_menu_item(&state, &manager, created.id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Mutations stay closed to non-managers.
    let denied = menu_service::delete_menu_item(&state, &customer, Uuid::new_v4()).await;
    match denied {
        Err(AppError::Forbidden(msg)) => {
            assert_eq!(msg, "Only managers are allowed to do this action.")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }

    Ok(())
}

fn query_with(build: impl FnOnce(&mut MenuItemQuery)) -> MenuItemQuery {
    let mut query = MenuItemQuery {
        page: None,
        per_page: None,
        category: None,
        featured: None,
        search: None,
        sort_by: None,
        sort_order: None,
    };
    build(&mut query);
    query
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, user_roles, audit_logs, menu_items, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            token_ttl_seconds: 3600,
            max_concurrency: 100,
            anon_max_concurrency: 10,
        },
    })
}

async fn create_account(state: &AppState, username: &str, role: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set("dummy".into()),
        first_name: Set(username.to_string()),
        last_name: Set("Test".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    UserRoleActive {
        user_id: Set(user.id),
        role: Set(role.to_string()),
        assigned_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn seed_menu(state: &AppState) -> anyhow::Result<(Uuid, Uuid)> {
    let mains = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("mains".into()),
        title: Set("Main Dishes".into()),
    }
    .insert(&state.orm)
    .await?;

    let desserts = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("desserts".into()),
        title: Set("Desserts".into()),
    }
    .insert(&state.orm)
    .await?;

    for (title, cents, featured, category_id) in [
        ("Greek Salad", 1200, true, mains.id),
        ("Lemon Tart", 750, false, desserts.id),
        ("Baklava", 900, false, desserts.id),
    ] {
        MenuItemActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.into()),
            price: Set(Decimal::new(cents, 2)),
            featured: Set(featured),
            category_id: Set(category_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    Ok((mains.id, desserts.id))
}
