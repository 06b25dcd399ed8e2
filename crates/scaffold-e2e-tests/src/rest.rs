use anyhow::{Result, anyhow};
use reqwest::Url;
use serde_json::{Value, json};
use tracing::info;

pub const START_DATE: &str = "2020-05-14T10:00:00.000Z";
pub const END_DATE: &str = "2020-06-14T10:00:00.000Z";

pub fn project_payload(name: &str, team_size: i64) -> Value {
    json!({
        "name": name,
        "description": "This is my new project",
        "startDate": START_DATE,
        "endDate": END_DATE,
        "email": "project@project.com",
        "teamSize": team_size
    })
}

pub fn movie_payload(name: &str, time: i64) -> Value {
    json!({
        "name": name,
        "description": "A movie",
        "time": time,
        "views": 1000.5,
        "isPublished": true
    })
}

pub fn resource_url(base_url: &Url, route: &str, id: Option<i64>) -> Url {
    let path = match id {
        Some(id) => format!("api/{route}/{id}"),
        None => format!("api/{route}"),
    };
    base_url.join(&path).unwrap()
}

/// Creates resource, returns `data` member of response document
pub async fn create_resource(
    client: &reqwest::Client,
    base_url: &Url,
    route: &str,
    payload: &Value,
) -> Result<Value> {
    let response = client
        .post(resource_url(base_url, route, None))
        .json(payload)
        .send()
        .await?;
    info!("Create response: {:#?}", response);
    if response.status().as_u16() != 201 {
        return Err(anyhow!("Unexpected status {}", response.status()));
    }
    let mut document: Value = response.json().await?;
    Ok(document["data"].take())
}

pub fn resource_id(data: &Value) -> i64 {
    data["id"].as_i64().expect("resource id")
}

/// Values of one attribute across listed resources
pub fn attribute_values(data: &Value, attribute: &str) -> Vec<Value> {
    data.as_array()
        .expect("list of resources")
        .iter()
        .map(|r| r["attributes"][attribute].clone())
        .collect()
}
