use scaffold_e2e_tests::{
    launch_env, prepare_env_with_args,
    rest::{
        END_DATE, START_DATE, attribute_values, create_resource, project_payload, resource_id,
        resource_url,
    },
    spawn_server,
};
use serde_json::{Value, json};
use tracing::info;
use tracing_test::traced_test;

const ROUTE: &str = "ProjectRoute";

#[tokio::test]
#[traced_test]
async fn test_project_crud() {
    let (base_url, _config_guard) = launch_env("test_project_crud").await.unwrap();
    let client = reqwest::Client::new();

    let payload = json!({
        "name": "NewProject",
        "description": "This is my new project",
        "startDate": START_DATE,
        "endDate": END_DATE,
        "email": "project@project.com",
        "teamSize": 100
    });
    let response = client
        .post(resource_url(&base_url, ROUTE, None))
        .json(&payload)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(201, response.status().as_u16());
    let document: Value = response.json().await.unwrap();
    assert_eq!(
        resource_url(&base_url, ROUTE, None).as_str(),
        document["links"]["self"]
    );
    assert_eq!("project", document["data"]["type"]);
    assert_eq!(payload, document["data"]["attributes"]);
    let id = resource_id(&document["data"]);

    let item_url = resource_url(&base_url, ROUTE, Some(id));
    let response = client.get(item_url.clone()).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let document: Value = response.json().await.unwrap();
    assert_eq!(item_url.as_str(), document["links"]["self"]);
    assert_eq!(id, resource_id(&document["data"]));
    assert_eq!(payload, document["data"]["attributes"]);

    // partial update
    let response = client
        .patch(item_url.clone())
        .json(&json!({"name": "Renamed", "unknownField": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let document: Value = response.json().await.unwrap();
    let attributes = &document["data"]["attributes"];
    assert_eq!("Renamed", attributes["name"]);
    assert_eq!(100, attributes["teamSize"]);
    assert_eq!(START_DATE, attributes["startDate"]);
    assert!(attributes.get("unknownField").is_none());

    // null overrides stored value and fails validation
    let response = client
        .patch(item_url.clone())
        .json(&json!({"teamSize": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let errors: Vec<Value> = response.json().await.unwrap();
    assert_eq!(1, errors.len());
    assert_eq!("Invalid Attributes: teamSize = null", errors[0]["title"]);
    // and nothing was changed
    let document: Value = client
        .get(item_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(100, document["data"]["attributes"]["teamSize"]);
    assert_eq!("Renamed", document["data"]["attributes"]["name"]);

    let response = client.delete(item_url.clone()).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let document: Value = response.json().await.unwrap();
    assert_eq!(id, resource_id(&document["data"]));
    assert_eq!("Renamed", document["data"]["attributes"]["name"]);

    let response = client.get(item_url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!(
        json!({
            "status": 404,
            "title": "Entity Not Found",
            "detail": format!("Could not find item with id: {id}")
        }),
        error
    );
}

#[tokio::test]
#[traced_test]
async fn test_project_validation() {
    let (base_url, _config_guard) = launch_env("test_project_validation").await.unwrap();
    let client = reqwest::Client::new();
    let api_url = resource_url(&base_url, ROUTE, None);

    let response = client.post(api_url.clone()).json(&json!({})).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
    let errors: Vec<Value> = response.json().await.unwrap();
    let details = errors
        .iter()
        .map(|e| e["detail"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            "name: must be a string",
            "name: should not be empty",
            "name: must be longer than or equal to 2 characters",
            "description: must be a string",
            "startDate: must be a valid ISO 8601 date string",
            "startDate: should not be empty",
            "endDate: must be a valid ISO 8601 date string",
            "endDate: should not be empty",
            "email: must be an email",
            "email: should not be empty",
            "teamSize: must be a positive number",
        ],
        details
    );
    assert_eq!("Invalid Attributes: name = null", errors[0]["title"]);
    assert_eq!("Invalid Attributes: teamSize = null", errors[10]["title"]);
    assert!(errors.iter().all(|e| e["status"] == 400));

    let mut payload = project_payload("N", 0);
    payload["email"] = json!("not-an-email");
    payload["startDate"] = json!("yesterday");
    let response = client.post(api_url.clone()).json(&payload).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
    let errors: Vec<Value> = response.json().await.unwrap();
    assert_eq!(4, errors.len());
    assert_eq!("Invalid Attributes: name = \"N\"", errors[0]["title"]);
    assert!(errors[0]["detail"].as_str().unwrap().starts_with("name: "));

    // empty strings
    let mut payload = project_payload("", 5);
    payload["email"] = json!("");
    payload["startDate"] = json!("2020-05-14");
    let response = client.post(api_url.clone()).json(&payload).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
    let errors: Vec<Value> = response.json().await.unwrap();
    let details = errors
        .iter()
        .map(|e| e["detail"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            "name: should not be empty",
            "name: must be longer than or equal to 2 characters",
            "email: must be an email",
            "email: should not be empty",
        ],
        details
    );

    // wrong type is reported for its attribute
    let response = client
        .post(api_url.clone())
        .json(&json!({"name": 123}))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
    let errors: Vec<Value> = response.json().await.unwrap();
    assert_eq!(9, errors.len());
    assert_eq!(
        json!({
            "status": 400,
            "title": "Invalid Attributes: name = 123",
            "detail": "name: must be a string"
        }),
        errors[0]
    );
    assert_eq!("description: must be a string", errors[1]["detail"]);

    // body is not an object
    let response = client.post(api_url.clone()).json(&json!([1, 2])).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());

    // nothing was stored
    let document: Value = client.get(api_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(json!([]), document["data"]);
}

#[tokio::test]
#[traced_test]
async fn test_project_not_found() {
    let (base_url, _config_guard) = launch_env("test_project_not_found").await.unwrap();
    let client = reqwest::Client::new();

    let url = resource_url(&base_url, ROUTE, Some(999));
    let response = client
        .patch(url.clone())
        .json(&json!({"name": "Whatever"}))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!("Entity Not Found", error["title"]);
    assert_eq!("Could not find item with id: 999", error["detail"]);

    let response = client.delete(url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!("Could not find item with id: 999", error["detail"]);

    let url = base_url.join("api/ProjectRoute/abc").unwrap();
    let response = client.get(url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    assert_eq!("Could not find item with id: abc", error["detail"]);
}

#[tokio::test]
#[traced_test]
async fn test_project_listing() {
    let (base_url, _config_guard) = launch_env("test_project_listing").await.unwrap();
    let client = reqwest::Client::new();

    for (name, team_size) in [("Alpha", 3), ("Beta", 1), ("Gamma", 3), ("Delta", 2)] {
        create_resource(&client, &base_url, ROUTE, &project_payload(name, team_size))
            .await
            .unwrap();
    }

    let list = async |query: &str| {
        let mut url = resource_url(&base_url, ROUTE, None);
        url.set_query((!query.is_empty()).then_some(query));
        let response = client.get(url.clone()).send().await.unwrap();
        info!("Response: {:#?}", response);
        let status = response.status().as_u16();
        let document: Value = response.json().await.unwrap();
        if status == 200 {
            assert_eq!(url.as_str(), document["links"]["self"]);
        }
        (status, document)
    };

    let (status, document) = list("").await;
    assert_eq!(200, status);
    assert_eq!(
        vec!["Alpha", "Beta", "Gamma", "Delta"],
        attribute_values(&document["data"], "name")
    );

    let (_, document) = list("sort=teamSize").await;
    assert_eq!(
        vec!["Beta", "Delta", "Alpha", "Gamma"],
        attribute_values(&document["data"], "name")
    );

    let (_, document) = list("sort=-teamSize,-name").await;
    assert_eq!(
        vec!["Gamma", "Alpha", "Delta", "Beta"],
        attribute_values(&document["data"], "name")
    );

    let (_, document) = list("page=1&pageSize=2").await;
    assert_eq!(
        vec!["Gamma", "Delta"],
        attribute_values(&document["data"], "name")
    );

    let (_, document) = list("page=0&pageSize=3&sort=name").await;
    assert_eq!(
        vec!["Alpha", "Beta", "Delta"],
        attribute_values(&document["data"], "name")
    );

    // incomplete or invalid window gives everything
    for query in ["page=1", "pageSize=2", "page=-1&pageSize=2", "page=x&pageSize=2"] {
        let (_, document) = list(query).await;
        assert_eq!(4, document["data"].as_array().unwrap().len(), "query {query}");
    }

    let (status, error) = list("sort=myUnknownField").await;
    assert_eq!(500, status);
    assert_eq!("Invalid Order Field", error["title"]);
    assert_eq!(
        "myUnknownField column was not found in the Project entity.",
        error["detail"]
    );
}

#[tokio::test]
#[traced_test]
async fn test_max_request_items() {
    let (args, _config_guard) =
        prepare_env_with_args("test_max_request_items", &["--max-request-items", "2"])
            .await
            .unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    for n in 0..4 {
        create_resource(
            &client,
            &base_url,
            ROUTE,
            &project_payload(&format!("Project {n}"), n + 1),
        )
        .await
        .unwrap();
    }

    let url = resource_url(&base_url, ROUTE, None);
    let document: Value = client.get(url.clone()).send().await.unwrap().json().await.unwrap();
    assert_eq!(2, document["data"].as_array().unwrap().len());

    let mut url = url;
    url.set_query(Some("page=0&pageSize=10"));
    let document: Value = client.get(url.clone()).send().await.unwrap().json().await.unwrap();
    assert_eq!(2, document["data"].as_array().unwrap().len());

    // offset follows requested page size
    url.set_query(Some("page=1&pageSize=3"));
    let document: Value = client.get(url).send().await.unwrap().json().await.unwrap();
    assert_eq!(
        vec!["Project 3"],
        attribute_values(&document["data"], "name")
    );
}
