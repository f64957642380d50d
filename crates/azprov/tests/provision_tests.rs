//! End-to-end runs of the binary against a mock Resource Manager

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUB: &str = "00000000-0000-0000-0000-0000000000aa";
const RG_PATH: &str = "/subscriptions/00000000-0000-0000-0000-0000000000aa/resourcegroups/rg-demo";
const SA_PATH: &str = "/subscriptions/00000000-0000-0000-0000-0000000000aa/resourceGroups/rg-demo/providers/Microsoft.Storage/storageAccounts/stdemo12345";

fn azprov(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("azprov").unwrap();
    for var in [
        "AZPROV_RESOURCE_GROUP",
        "AZPROV_STORAGE_ACCOUNT",
        "AZPROV_REGION",
        "AZURE_SUBSCRIPTION_ID",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env(
        "AZPROV_CONFIG_FILE",
        "/tmp/azprov-test-nonexistent/config.toml",
    )
    .env("AZPROV_ACCESS_TOKEN", "e2e-token")
    .env("AZPROV_ARM_ENDPOINT", server.uri())
    .args([
        "provision",
        "--resource-group",
        "rg-demo",
        "--storage-account",
        "stdemo12345",
        "--region",
        "eastus",
    ]);
    cmd
}

/// Run the binary off the async runtime that drives the mock server
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

async fn mount_subscription(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(header("authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{
                "id": format!("/subscriptions/{SUB}"),
                "subscriptionId": SUB,
                "displayName": "Demo",
                "state": "Enabled"
            }]
        })))
        .mount(server)
        .await;
}

fn resource_group_body() -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/{SUB}/resourceGroups/rg-demo"),
        "name": "rg-demo",
        "location": "eastus",
        "properties": { "provisioningState": "Succeeded" }
    })
}

fn storage_account_body() -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/{SUB}/resourceGroups/rg-demo/providers/Microsoft.Storage/storageAccounts/stdemo12345"),
        "name": "stdemo12345",
        "location": "eastus",
        "sku": { "name": "Standard_LRS" },
        "kind": "StorageV2",
        "properties": { "provisioningState": "Succeeded", "accessTier": "Hot" }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn first_run_creates_resource_group() {
    let server = MockServer::start().await;
    mount_subscription(&server).await;

    Mock::given(method("HEAD"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(resource_group_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(storage_account_body()))
        .expect(1)
        .mount(&server)
        .await;

    run(azprov(&server))
        .await
        .success()
        .stdout(predicate::str::contains(
            "Creating Resource Group: rg-demo in eastus...",
        ))
        .stdout(predicate::str::contains(
            "Storage Account 'stdemo12345' created in resource group 'rg-demo'!",
        ))
        .stdout(predicate::str::contains("Storage account created successfully!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn second_run_reuses_resource_group() {
    let server = MockServer::start().await;
    mount_subscription(&server).await;

    Mock::given(method("HEAD"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource_group_body()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource_group_body()))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(storage_account_body()))
        .mount(&server)
        .await;

    run(azprov(&server))
        .await
        .success()
        .stdout(predicate::str::contains("Resource Group rg-demo already exists."))
        .stdout(predicate::str::contains("Creating Resource Group").not())
        .stdout(predicate::str::contains("Storage account created successfully!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn taken_name_fails_without_success_line() {
    let server = MockServer::start().await;
    mount_subscription(&server).await;

    Mock::given(method("HEAD"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource_group_body()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SA_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "StorageAccountAlreadyTaken",
                "message": "The storage account named stdemo12345 is already taken."
            }
        })))
        .mount(&server)
        .await;

    run(azprov(&server))
        .await
        .failure()
        .code(1)
        .stdout(predicate::str::contains("created successfully").not())
        .stderr(predicate::str::contains("StorageAccountAlreadyTaken"))
        .stderr(predicate::str::contains("choose another name"));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_output_reports_outcome() {
    let server = MockServer::start().await;
    mount_subscription(&server).await;

    Mock::given(method("HEAD"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(resource_group_body()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(storage_account_body()))
        .mount(&server)
        .await;

    let mut cmd = azprov(&server);
    cmd.args(["-o", "json"]);
    let assert = run(cmd).await.success();

    let stdout = assert.get_output().stdout.clone();
    let outcome: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(outcome["subscription"]["subscriptionId"], SUB);
    assert_eq!(outcome["resource_group_created"], true);
    assert_eq!(outcome["storage_account"]["name"], "stdemo12345");
    assert_eq!(outcome["storage_account"]["kind"], "StorageV2");
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_resource_group_stops_before_storage() {
    let server = MockServer::start().await;
    mount_subscription(&server).await;

    Mock::given(method("HEAD"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": "AuthorizationFailed", "message": "not allowed" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(storage_account_body()))
        .expect(0)
        .mount(&server)
        .await;

    run(azprov(&server))
        .await
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Resource group 'rg-demo' failed"))
        .stderr(predicate::str::contains("Contributor"));
}
