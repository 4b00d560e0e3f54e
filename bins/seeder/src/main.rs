//! Database seeder for Callsheet development and testing.
//!
//! Seeds a test user, a test project with the user as producer, and a
//! small active budget for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use callsheet_db::entities::{
    budget_lines, budgets, project_members, projects, sea_orm_active_enums::ProjectRole, users,
};
use callsheet_shared::{JwtConfig, JwtService};

/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test project ID (consistent for all seeds)
const TEST_PROJECT_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Test budget ID (consistent for all seeds)
const TEST_BUDGET_ID: &str = "00000000-0000-0000-0000-000000000003";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = callsheet_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test user...");
    seed_test_user(&db).await;

    println!("Seeding test project...");
    seed_test_project(&db).await;

    println!("Seeding test budget...");
    seed_test_budget(&db).await;

    print_dev_token();

    println!("Seeding complete!");
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

fn test_project_id() -> Uuid {
    Uuid::parse_str(TEST_PROJECT_ID).unwrap()
}

fn test_budget_id() -> Uuid {
    Uuid::parse_str(TEST_BUDGET_ID).unwrap()
}

/// Seeds a test user for development.
async fn seed_test_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test user already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(test_user_id()),
        email: Set("test@callsheet.dev".to_string()),
        full_name: Set("Test Producer".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed test user");
}

/// Seeds a test project with the test user as its producer.
async fn seed_test_project(db: &DatabaseConnection) {
    if projects::Entity::find_by_id(test_project_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test project already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let project = projects::ActiveModel {
        id: Set(test_project_id()),
        name: Set("Sunset Over Prague".to_string()),
        currency: Set("CZK".to_string()),
        company_name: Set(Some("Test Production s.r.o.".to_string())),
        ico: Set(Some("12345678".to_string())),
        description: Set(Some("Seeded development project".to_string())),
        created_by: Set(test_user_id()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    project
        .insert(db)
        .await
        .expect("Failed to seed test project");

    let membership = project_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(test_project_id()),
        user_id: Set(test_user_id()),
        role: Set(ProjectRole::Producer),
        created_at: Set(now),
    };
    membership
        .insert(db)
        .await
        .expect("Failed to seed project membership");
}

/// Seeds a small active budget with a handful of lines.
async fn seed_test_budget(db: &DatabaseConnection) {
    if budgets::Entity::find_by_id(test_budget_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test budget already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let budget = budgets::ActiveModel {
        id: Set(test_budget_id()),
        project_id: Set(test_project_id()),
        version_name: Set("seed-v1".to_string()),
        source_content: Set("(seeded)".to_string()),
        is_active: Set(true),
        uploaded_by: Set(test_user_id()),
        created_at: Set(now),
    };
    budget.insert(db).await.expect("Failed to seed test budget");

    let lines = [
        ("1101", "Director fee", "11", "Above the line", 500_000),
        ("2201", "Camera rental", "22", "Camera", 250_000),
        ("2305", "Location catering", "23", "Production", 120_000),
    ];
    for (account, account_desc, category, category_desc, amount) in lines {
        let line = budget_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            budget_id: Set(test_budget_id()),
            account_number: Set(account.to_string()),
            account_description: Set(account_desc.to_string()),
            category_number: Set(category.to_string()),
            category_description: Set(category_desc.to_string()),
            original_amount: Set(Decimal::from(amount)),
            created_at: Set(now),
        };
        line.insert(db).await.expect("Failed to seed budget line");
    }
}

/// Prints a development access token for the seeded user.
fn print_dev_token() {
    let Ok(secret) = std::env::var("CALLSHEET__JWT__SECRET") else {
        println!("  CALLSHEET__JWT__SECRET not set, skipping dev token...");
        return;
    };

    let service = JwtService::new(JwtConfig {
        secret,
        access_token_expires_minutes: 60 * 24,
    });
    match service.generate_access_token(test_user_id()) {
        Ok(token) => println!("Dev token (24h): {token}"),
        Err(e) => println!("  Failed to mint dev token: {e}"),
    }
}
