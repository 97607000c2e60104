use anyhow::Result;
use axum::http::StatusCode;

mod common;

use common::{create_professor, request, token};

async fn names_for_query(app: &axum::Router, query: Option<&str>) -> Result<Vec<String>> {
    let student = token(1, Some("STUDENT"));
    let uri = match query {
        Some(query) => format!("/professors/?query={query}"),
        None => "/professors/".to_string(),
    };

    let (status, body) = request(app, "GET", &uri, Some(&student), None).await?;
    anyhow::ensure!(status == StatusCode::OK, "list failed: {body}");

    Ok(body
        .as_array()
        .unwrap()
        .iter()
        .map(|professor| professor["name"].as_str().unwrap().to_string())
        .collect())
}

#[tokio::test]
async fn substring_filter_matches_name_or_department() -> Result<()> {
    let (_dir, _pool, app) = common::setup().await?;
    create_professor(&app, "Alice Smith", "CS").await?;
    create_professor(&app, "Bob Jones", "Mathematics").await?;

    assert_eq!(names_for_query(&app, Some("Ali")).await?, vec!["Alice Smith"]);
    assert_eq!(names_for_query(&app, Some("Math")).await?, vec!["Bob Jones"]);
    assert!(names_for_query(&app, Some("PHYSICS")).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn filter_is_case_insensitive() -> Result<()> {
    let (_dir, _pool, app) = common::setup().await?;
    create_professor(&app, "Alice Smith", "CS").await?;
    create_professor(&app, "Bob Jones", "Mathematics").await?;

    assert_eq!(names_for_query(&app, Some("alice")).await?, vec!["Alice Smith"]);
    assert_eq!(names_for_query(&app, Some("mathematics")).await?, vec!["Bob Jones"]);

    Ok(())
}

#[tokio::test]
async fn absent_or_empty_query_returns_the_full_directory() -> Result<()> {
    let (_dir, _pool, app) = common::setup().await?;
    create_professor(&app, "Alice Smith", "CS").await?;
    create_professor(&app, "Bob Jones", "Mathematics").await?;

    let all = names_for_query(&app, None).await?;
    assert_eq!(all, vec!["Alice Smith", "Bob Jones"]);

    let all = names_for_query(&app, Some("")).await?;
    assert_eq!(all, vec!["Alice Smith", "Bob Jones"]);

    Ok(())
}
