use assert_matches::assert_matches;
use axum::http::Method;

use recipe_tui::api::{
    ApiError, Difficulty, HttpRecipeClient, RecipeApi, RecipeFields, SaveRequest,
};
use recipe_tui::query::{total_pages, QueryKey, PAGE_SIZE};

mod common;
use common::*;

type TestResult<T = ()> = anyhow::Result<T>;

#[test]
fn tags_come_from_first_fifty_recipes() -> TestResult {
    let server = FixtureServer::start(vec![
        recipe(1, "One", &["a", "b"]),
        recipe(2, "Two", &["b", "c"]),
        recipe(3, "Three", &["a"]),
    ]);
    let client = HttpRecipeClient::new(&server.options())?;

    assert_eq!(client.get_tags()?, vec!["a", "b", "c"]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/recipes");
    assert_eq!(requests[0].query.as_deref(), Some("limit=50&skip=0"));
    Ok(())
}

#[test]
fn hundred_recipes_span_nine_pages() -> TestResult {
    let server = FixtureServer::start(collection(100));
    let client = HttpRecipeClient::new(&server.options())?;

    let first = QueryKey::new("", None, 1).request().run(&client)?;
    assert_eq!(first.total, 100);
    assert_eq!(first.recipes.len(), PAGE_SIZE as usize);
    assert_eq!(total_pages(first.total), 9);

    let last = QueryKey::new("", None, 9).request().run(&client)?;
    assert_eq!(last.recipes.len(), 4);
    assert_eq!(last.recipes[0].id, 97);
    assert_eq!(
        server.requests()[1].query.as_deref(),
        Some("limit=12&skip=96")
    );
    Ok(())
}

#[test]
fn search_and_tag_requests_are_encoded() -> TestResult {
    let server = FixtureServer::start(vec![
        recipe(1, "Pasta Bake", &["Main Course"]),
        recipe(2, "Salad", &["Side"]),
    ]);
    let client = HttpRecipeClient::new(&server.options())?;

    let hits = client.search_recipes("pasta bake")?;
    assert_eq!(hits.recipes.len(), 1);
    assert_eq!(hits.recipes[0].name, "Pasta Bake");

    let tagged = client.get_recipes_by_tag("Main Course")?;
    assert_eq!(tagged.total, 1);

    let requests = server.requests();
    assert_eq!(requests[0].path, "/recipes/search");
    assert_eq!(requests[0].query.as_deref(), Some("q=pasta+bake"));
    assert_eq!(requests[1].path, "/recipes/tag/Main%20Course");
    Ok(())
}

#[test]
fn recipe_decodes_camel_case_fields() -> TestResult {
    let server = FixtureServer::start(collection(3));
    let client = HttpRecipeClient::new(&server.options())?;

    let recipe = client.get_recipe(2)?;
    assert_eq!(recipe.name, "Recipe 2");
    assert_eq!(recipe.total_minutes(), 30);
    assert_eq!(recipe.calories_per_serving, 300);
    assert_eq!(recipe.meal_type, vec!["Dinner"]);
    assert_eq!(recipe.difficulty, Difficulty::Easy);
    Ok(())
}

#[test]
fn missing_recipe_is_not_found() -> TestResult {
    let server = FixtureServer::start(collection(3));
    let client = HttpRecipeClient::new(&server.options())?;
    assert_matches!(client.get_recipe(42), Err(ApiError::NotFound(42)));
    Ok(())
}

#[test]
fn create_posts_body_without_id() -> TestResult {
    let server = FixtureServer::start(collection(5));
    let client = HttpRecipeClient::new(&server.options())?;
    let fields = RecipeFields {
        name: "Shakshuka".into(),
        cuisine: "Middle Eastern".into(),
        tags: vec!["Breakfast".into()],
        ..RecipeFields::default()
    };

    let created = client.save(&SaveRequest::Create(fields))?;
    assert_eq!(created.id, 6);
    assert_eq!(created.name, "Shakshuka");

    let requests = server.requests();
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/recipes/add");
    let body = request.body.as_ref().expect("json body");
    assert!(body.get("id").is_none());
    assert_eq!(body["name"], "Shakshuka");
    assert_eq!(body["prepTimeMinutes"], 0);
    assert_eq!(body["servings"], 1);
    Ok(())
}

#[test]
fn update_puts_to_recipe_id() -> TestResult {
    let server = FixtureServer::start(collection(10));
    let client = HttpRecipeClient::new(&server.options())?;
    let fields = RecipeFields {
        name: "Recipe 7 (revised)".into(),
        cuisine: "Italian".into(),
        servings: 4,
        ..RecipeFields::default()
    };

    let updated = client.save(&SaveRequest::Update { id: 7, fields })?;
    assert_eq!(updated.id, 7);
    assert_eq!(updated.name, "Recipe 7 (revised)");
    assert_eq!(updated.servings, 4);

    let requests = server.requests();
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(requests[0].path, "/recipes/7");
    Ok(())
}

#[test]
fn non_success_status_is_reported() -> TestResult {
    let server = FixtureServer::start(Vec::new());
    let client = HttpRecipeClient::new(&server.options_for("/down"))?;

    let err = client.get_recipes(12, 0).expect_err("service is down");
    assert_matches!(err, ApiError::Status { status: 503, .. });
    assert_matches!(client.get_tags(), Err(ApiError::Status { status: 503, .. }));
    Ok(())
}

#[test]
fn unreachable_host_is_a_transport_error() -> TestResult {
    let server = FixtureServer::start(Vec::new());
    let options = server.options();
    drop(server);
    let client = HttpRecipeClient::new(&options)?;
    assert_matches!(client.get_recipes(12, 0), Err(ApiError::Transport(_)));
    Ok(())
}
