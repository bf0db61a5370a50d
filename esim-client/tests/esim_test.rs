mod common;

use common::{catalogue, mount_token_endpoint, test_client};
use esim_client::PurchaseRequest;
use provider_core::ApiError;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn packages_are_flattened_with_bearer_from_data_envelope() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .and(header("authorization", "Bearer airalo_tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalogue()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let packages = client.list_packages(None).await.unwrap();

    assert_eq!(packages.len(), 3);
    assert_eq!(packages[0].country, "United States");
    assert_eq!(packages[0].description, "Data only");
    assert_eq!(packages[1].price, Decimal::new(11, 0));
    assert_eq!(packages[2].country_code, "FR");
    assert_eq!(packages[2].operator, "Bonjour Talk");
}

#[tokio::test]
async fn country_filter_is_sent_as_query() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .and(query_param("filter[country]", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let packages = client.list_packages(Some("us")).await.unwrap();

    assert!(packages.is_empty());
}

#[tokio::test]
async fn non_array_catalogue_is_empty() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.list_packages(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn package_details_by_id_or_slug() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalogue()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let pkg = client.package_details("bonjour-talk-7days-1gb").await.unwrap();
    assert_eq!(pkg.country, "France");
    assert_eq!(pkg.price, Decimal::new(450, 2));

    let err = client.package_details("does-not-exist").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn purchase_returns_first_sim_activation() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/orders"))
        .and(body_json(json!({"package_id": "change-7days-1gb", "quantity": 1, "description": "1 x change-7days-1gb"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 9666,
                "code": "20230322-000042",
                "package_id": "change-7days-1gb",
                "quantity": "1",
                "sims": [
                    {
                        "id": 11001,
                        "iccid": "894000000000011001",
                        "lpa": "lpa.airalo.com",
                        "matching_id": "AB-CD-EF",
                        "qrcode_url": "https://sandbox.airalo.com/qr?id=11001",
                        "confirmation_code": "4321"
                    }
                ]
            },
            "meta": {"message": "success"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let request = PurchaseRequest::new("change-7days-1gb", 1).with_description("1 x change-7days-1gb");
    let activation = client.purchase(&request).await.unwrap();

    assert_eq!(activation.iccid, "894000000000011001");
    assert_eq!(activation.qrcode_url, "https://sandbox.airalo.com/qr?id=11001");
    assert_eq!(activation.confirmation_code.as_deref(), Some("4321"));
}

#[tokio::test]
async fn purchase_maps_activation_details() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 9667,
                "code": "20230322-000043",
                "quantity": 1,
                "sims": [
                    {
                        "iccid": "894000000000011002",
                        "lpa": "lpa.airalo.com",
                        "matching_id": "GH-IJ-KL",
                        "qrcode_url": "https://sandbox.airalo.com/qr?id=11002"
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let activation = client
        .purchase(&PurchaseRequest::new("change-7days-1gb", 1))
        .await
        .unwrap();

    assert_eq!(activation.iccid, "894000000000011002");
    assert_eq!(activation.activation_code, "LPA:1$lpa.airalo.com$GH-IJ-KL");
    assert_eq!(activation.order_code.as_deref(), Some("20230322-000043"));
}

#[tokio::test]
async fn purchase_rejects_quantity_before_calling() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .purchase(&PurchaseRequest::new("change-7days-1gb", 51))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn provider_failure_is_provisioning_error_with_meta_message() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "data": {"package_id": "The selected package is invalid."},
            "meta": {"message": "the parameter is invalid"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .purchase(&PurchaseRequest::new("unknown", 1))
        .await
        .unwrap_err();

    match err {
        ApiError::Provisioning { status, message } => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(message, "the parameter is invalid");
        }
        other => panic!("expected provisioning error, got {:?}", other),
    }
}

#[tokio::test]
async fn sim_usage_is_read_from_data() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/sims/894000000000011002/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "remaining": 812,
                "total": 1024,
                "expired_at": "2024-07-01 12:00:00",
                "is_unlimited": false,
                "status": "ACTIVE"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let usage = client.sim_usage("894000000000011002").await.unwrap();

    assert_eq!(usage.status.as_deref(), Some("ACTIVE"));
    assert_eq!(usage.remaining, Some(812));
    assert_eq!(usage.total, Some(1024));
    assert!(!usage.is_unlimited);
}

#[tokio::test]
async fn orders_without_data_array_are_empty() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"message": "success"}})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn orders_are_mapped() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 9666, "code": "20230322-000042", "package_id": "change-7days-1gb", "quantity": 1, "price": 4.5, "currency": "USD", "created_at": "2023-03-22 10:00:00"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let orders = client.list_orders().await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, "9666");
    assert_eq!(orders[0].price, Some(Decimal::new(45, 1)));
}
