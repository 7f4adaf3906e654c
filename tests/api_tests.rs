//! API integration tests
//!
//! Run against a live server with a seeded database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5000/api";

/// Register a fresh admin and return its bearer token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test Admin",
            "role": "admin",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    let body: Value = response.json().await.expect("Failed to parse register response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Find the seeded "Computer Systems" class at the given level
async fn find_class(client: &Client, level: &str) -> Value {
    let response = client
        .get(format!("{}/classes/level/{}", BASE_URL, level))
        .send()
        .await
        .expect("Failed to list classes");

    let classes: Vec<Value> = response.json().await.expect("Failed to parse classes");
    classes
        .into_iter()
        .find(|c| c["name"] == "Computer Systems")
        .expect("Seeded Computer Systems class missing")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_student_with_defaults() {
    let client = Client::new();
    let class = find_class(&client, "NC").await;

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Jane Doe",
            "role": "student",
            "classLevels": [{ "class": class["id"], "level": "NC" }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let email = body["email"].as_str().unwrap();
    assert!(email.starts_with("jane.doe."));
    assert!(email.ends_with("@mtrepoly.edu"));
    assert_eq!(body["temporaryPassword"], "mtrpoly");
    assert_eq!(body["role"], "student");
    assert!(body["token"].is_string());

    // The issued token authenticates and carries the student role
    let profile: Value = client
        .get(format!("{}/auth/profile", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", body["token"].as_str().unwrap()),
        )
        .send()
        .await
        .expect("Failed to fetch profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(profile["role"], "student");
    assert_eq!(profile["classLevels"][0]["class"]["name"], "Computer Systems");
}

#[tokio::test]
#[ignore]
async fn test_register_admin_requires_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "No Password Admin", "role": "admin" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_register_student_requires_class_level() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "Lost Student", "role": "student" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials_are_indistinguishable() {
    let client = Client::new();

    // Provision a known account
    let registered: Value = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Login Admin",
            "role": "admin",
            "password": "correct-password"
        }))
        .send()
        .await
        .expect("Failed to register")
        .json()
        .await
        .expect("Failed to parse");
    let email = registered["email"].as_str().unwrap();

    let wrong_password = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(wrong_password.status(), 401);
    let wrong_password_body: Value = wrong_password.json().await.unwrap();

    let unknown_user = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "nobody.0000@mtrepoly.edu", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(unknown_user.status(), 401);
    let unknown_user_body: Value = unknown_user.json().await.unwrap();

    // Identical generic message in both cases
    assert_eq!(wrong_password_body["error"], unknown_user_body["error"]);

    // And the correct password still works
    let ok = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "correct-password" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(ok.status(), 200);
    let ok_body: Value = ok.json().await.unwrap();
    assert_eq!(ok_body["role"], "admin");
    assert!(ok_body["token"].is_string());
    assert!(ok_body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_class_name_level_rejected() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let payload = json!({
        "name": "Duplicate Test Class",
        "level": "ND",
        "modules": ["Module A"]
    });

    let first = client
        .post(format!("{}/classes", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/classes", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 400);

    // Cleanup
    let created: Value = first.json().await.unwrap();
    client
        .delete(format!("{}/classes/{}", BASE_URL, created["id"].as_str().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to clean up class");
}

#[tokio::test]
#[ignore]
async fn test_class_modules_include_level_common_modules() {
    let client = Client::new();
    let class = find_class(&client, "HND").await;

    let modules: Vec<String> = class["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap().to_string())
        .collect();

    assert!(modules.contains(&"Cloud Computing".to_string()));
    assert!(modules.contains(&"Research Methods".to_string()));
}

#[tokio::test]
#[ignore]
async fn test_book_creation_validates_module_membership() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    // Valid class/level/module combination
    let valid = reqwest::multipart::Form::new()
        .text("title", "Designing Data-Intensive Applications")
        .text("author", "Martin Kleppmann")
        .text("class", "Computer Systems")
        .text("level", "HND")
        .text("module", "Cloud Computing");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(valid)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let book: Value = response.json().await.unwrap();
    assert_eq!(book["available"], true);
    assert!(book["addedBy"]["name"].is_string());
    assert!(book["addedBy"]["email"].is_string());

    // Nonexistent module for the same class/level
    let invalid = reqwest::multipart::Form::new()
        .text("title", "Ghost Module Book")
        .text("author", "Nobody")
        .text("class", "Computer Systems")
        .text("level", "HND")
        .text("module", "Nonexistent Module");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(invalid)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Cleanup
    client
        .delete(format!("{}/books/{}", BASE_URL, book["id"].as_str().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to clean up book");
}

#[tokio::test]
#[ignore]
async fn test_uploaded_file_is_served_at_its_public_url() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let pdf_bytes: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF";
    let form = reqwest::multipart::Form::new()
        .text("title", "Attached Manual")
        .text("author", "A. Writer")
        .text("class", "Computer Systems")
        .text("level", "ND")
        .text("module", "Cyber Security")
        .part(
            "file",
            reqwest::multipart::Part::bytes(pdf_bytes.to_vec())
                .file_name("manual.pdf")
                .mime_str("application/pdf")
                .expect("Invalid mime"),
        );

    let created: Value = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");

    let file_url = created["fileUrl"].as_str().expect("No fileUrl on book");

    // The public URL resolves to the stored bytes
    let fetched = client
        .get(file_url)
        .send()
        .await
        .expect("Failed to fetch stored file");
    assert!(fetched.status().is_success());
    assert_eq!(fetched.bytes().await.unwrap().as_ref(), pdf_bytes);

    // Cleanup
    client
        .delete(format!("{}/books/{}", BASE_URL, created["id"].as_str().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to clean up book");
}

#[tokio::test]
#[ignore]
async fn test_students_only_see_available_books() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    // An unavailable book
    let form = reqwest::multipart::Form::new()
        .text("title", "Hidden Book")
        .text("author", "A. Writer")
        .text("class", "Computer Systems")
        .text("level", "NC")
        .text("module", "Networking Basics")
        .text("available", "false");

    let created: Value = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");

    // A student asking explicitly for unavailable books still gets none
    let class = find_class(&client, "NC").await;
    let student: Value = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Availability Student",
            "role": "student",
            "classLevels": [{ "class": class["id"], "level": "NC" }]
        }))
        .send()
        .await
        .expect("Failed to register student")
        .json()
        .await
        .expect("Failed to parse student");

    let books: Vec<Value> = client
        .get(format!("{}/books?available=false", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", student["token"].as_str().unwrap()),
        )
        .send()
        .await
        .expect("Failed to list books")
        .json()
        .await
        .expect("Failed to parse books");

    assert!(books.iter().all(|b| b["available"] == true));

    // The admin sees it with the same filter
    let admin_books: Vec<Value> = client
        .get(format!("{}/books?available=false", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to list books")
        .json()
        .await
        .expect("Failed to parse books");
    assert!(admin_books
        .iter()
        .any(|b| b["id"] == created["id"]));

    // Cleanup
    client
        .delete(format!("{}/books/{}", BASE_URL, created["id"].as_str().unwrap()))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to clean up book");
}

#[tokio::test]
#[ignore]
async fn test_deleted_book_returns_404() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Ephemeral Book")
        .text("author", "A. Writer")
        .text("class", "Computer Systems")
        .text("level", "ND")
        .text("module", "Cyber Security");

    let created: Value = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");
    let id = created["id"].as_str().unwrap();

    let deleted = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to delete book");
    assert!(deleted.status().is_success());

    let missing = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book");
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_routes_require_admin() {
    let client = Client::new();
    let class = find_class(&client, "NC").await;

    let student: Value = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Unprivileged Student",
            "role": "student",
            "classLevels": [{ "class": class["id"], "level": "NC" }]
        }))
        .send()
        .await
        .expect("Failed to register student")
        .json()
        .await
        .expect("Failed to parse student");

    let form = reqwest::multipart::Form::new()
        .text("title", "Forbidden Book")
        .text("author", "A. Writer")
        .text("class", "Computer Systems")
        .text("level", "NC")
        .text("module", "Networking Basics");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", student["token"].as_str().unwrap()),
        )
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_books_require_authentication() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_filters_cascade() {
    let client = Client::new();

    // No selection: everything
    let all: Value = client
        .get(format!("{}/classes/filters", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch filters")
        .json()
        .await
        .expect("Failed to parse filters");
    assert!(all["classes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "Computer Systems"));
    assert_eq!(all["levels"].as_array().unwrap().len(), 3);

    // Class + level pins the module list
    let pinned: Value = client
        .get(format!(
            "{}/classes/filters?class=Computer Systems&level=HND",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to fetch filters")
        .json()
        .await
        .expect("Failed to parse filters");
    assert_eq!(pinned["levels"], json!(["HND"]));
    assert!(pinned["modules"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "Cloud Computing"));
    assert!(!pinned["modules"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "Networking Basics"));
}

#[tokio::test]
#[ignore]
async fn test_bulk_create_students_is_best_effort() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let class = find_class(&client, "ND").await;

    let response = client
        .post(format!("{}/auth/bulk-create-students", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "students": [
                {
                    "name": "Valid Student",
                    "classLevels": [{ "class": class["id"], "level": "ND" }]
                },
                {
                    "name": "Broken Student",
                    // Level mismatch: the class is ND
                    "classLevels": [{ "class": class["id"], "level": "HND" }]
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Successfully created 1 students");
    assert_eq!(body["students"].as_array().unwrap().len(), 1);
    assert_eq!(body["students"][0]["temporaryPassword"], "mtrpoly");
}

#[tokio::test]
#[ignore]
async fn test_invalid_level_path_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/classes/level/Bachelor", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
