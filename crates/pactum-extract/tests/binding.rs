//! Binding tests across every request shape.

use std::collections::HashMap;
use std::time::Duration;

use http::{Method, StatusCode};
use pactum_core::{
    shape_of, BindingSource, ContractError, FileUpload, RawRequest, RequestShape,
};
use pactum_extract::{
    bind, decode_request, Binder, CodecRegistry, ExtractionContext, MultipartConfig,
};
use pactum_macros::Contract;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Contract)]
pub struct GetItem {
    #[contract(path = "id")]
    pub id: String,

    #[contract(query = "page", default = "1")]
    pub page: i64,

    #[contract(query = "verbose")]
    pub verbose: bool,

    #[contract(header = "X-Timeout", default = "5s")]
    pub timeout: Duration,

    #[contract(cookie = "session")]
    pub session: Option<String>,

    #[contract(raw)]
    pub raw: RawRequest,
}

#[derive(Debug, Default, Serialize, Deserialize, Contract)]
pub struct InspectRequest {
    pub request: RawRequest,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Contract)]
pub struct ItemBody {
    #[contract(min_length = 3)]
    pub name: String,
    pub price: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Contract)]
pub struct UpdateItem {
    #[contract(path = "id")]
    pub id: i64,
    pub body: ItemBody,
}

#[derive(Debug, Default, Serialize, Deserialize, Contract)]
pub struct Upload {
    #[contract(form = "title")]
    pub title: String,

    #[contract(form = "count", default = "9")]
    pub count: i32,

    #[contract(form = "cover")]
    pub cover: Option<FileUpload>,

    #[contract(form = "pages")]
    pub pages: Vec<FileUpload>,
}

#[derive(Debug, Default, Serialize, Deserialize, Contract)]
pub struct BadParam {
    #[contract(query = "filter")]
    pub filter: HashMap<String, String>,
}

const BOUNDARY: &str = "pactum-test-boundary";

fn multipart(parts: &[(&str, Option<&str>, &str)]) -> ExtractionContext {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    ExtractionContext::builder()
        .method(Method::POST)
        .uri("/uploads")
        .header(
            "content-type",
            &format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .build()
}

#[tokio::test]
async fn test_path_and_default_query() {
    let ctx = ExtractionContext::builder()
        .uri("/items/42")
        .path_param("id", "42")
        .build();

    let req: GetItem = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.id, "42");
    assert_eq!(req.page, 1);
    assert!(!req.verbose);
    assert_eq!(req.timeout, Duration::from_secs(5));
    assert_eq!(req.session, None);
    assert_eq!(req.raw.path_param("id"), Some("42"));
    assert_eq!(req.raw.method(), Some(&Method::GET));
}

#[tokio::test]
async fn test_raw_request_field_binds_without_annotation() {
    assert_eq!(shape_of::<InspectRequest>(), RequestShape::ParamsOnly);

    let ctx = ExtractionContext::builder()
        .uri("/inspect?x=1")
        .header("x-trace", "t-9")
        .build();

    let req: InspectRequest = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert!(req.request.is_attached());
    assert_eq!(req.request.method(), Some(&Method::GET));
    assert_eq!(req.request.header("x-trace"), Some("t-9"));
}

#[tokio::test]
async fn test_every_parameter_source() {
    let ctx = ExtractionContext::builder()
        .uri("/items/7?page=3&verbose=T")
        .path_param("id", "7")
        .header("x-timeout", "1m30s")
        .header("cookie", "session=s-1; other=x")
        .build();

    let req: GetItem = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.page, 3);
    assert!(req.verbose);
    assert_eq!(req.timeout, Duration::from_secs(90));
    assert_eq!(req.session.as_deref(), Some("s-1"));
}

#[tokio::test]
async fn test_empty_query_value_uses_default() {
    let ctx = ExtractionContext::builder().uri("/items/1?page=").build();
    let req: GetItem = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.page, 1);
}

#[tokio::test]
async fn test_invalid_parameter_is_first_error() {
    let ctx = ExtractionContext::builder()
        .uri("/items/1?page=two")
        .header("x-timeout", "-5s")
        .build();

    let err = bind::<GetItem>(&ctx, &CodecRegistry::default())
        .await
        .unwrap_err();
    assert_eq!(err.binding_source(), BindingSource::Query);
    assert_eq!(err.field(), Some("page"));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_field_type_is_configuration_error() {
    let ctx = ExtractionContext::builder().uri("/?filter=x").build();
    let err = bind::<BadParam>(&ctx, &CodecRegistry::default())
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_problem().detail.is_empty());
}

#[tokio::test]
async fn test_params_plus_body_tolerates_empty_body() {
    let ctx = ExtractionContext::builder()
        .method(Method::PUT)
        .uri("/items/5")
        .path_param("id", "5")
        .build();

    let req: UpdateItem = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.id, 5);
    assert_eq!(req.body, ItemBody::default());
}

#[tokio::test]
async fn test_params_plus_body_decodes_into_body_member() {
    let ctx = ExtractionContext::builder()
        .method(Method::PUT)
        .uri("/items/5")
        .path_param("id", "5")
        .header("content-type", "application/json")
        .body(r#"{"name":"lamp","price":12.5}"#)
        .build();

    let req: UpdateItem = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.body.name, "lamp");
    assert!((req.body.price - 12.5).abs() < f64::EPSILON);
    assert!(req.body.tags.is_empty());
}

#[tokio::test]
async fn test_whole_body() {
    let codecs = CodecRegistry::default();

    let empty = ExtractionContext::builder().method(Method::POST).build();
    let req: ItemBody = bind(&empty, &codecs).await.unwrap();
    assert_eq!(req, ItemBody::default());

    let ctx = ExtractionContext::builder()
        .method(Method::POST)
        .body(r#"{"name":"desk","price":100,"tags":["oak"]}"#)
        .build();
    let req: ItemBody = bind(&ctx, &codecs).await.unwrap();
    assert_eq!(req.tags, vec!["oak".to_string()]);

    let malformed = ExtractionContext::builder()
        .method(Method::POST)
        .body("{not json")
        .build();
    let err = bind::<ItemBody>(&malformed, &codecs).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_xml_body() {
    let ctx = ExtractionContext::builder()
        .method(Method::PUT)
        .path_param("id", "5")
        .header("content-type", "application/xml; charset=utf-8")
        .body("<ItemBody><name>desk</name><price>99.5</price><tags>oak</tags><tags>ash</tags></ItemBody>")
        .build();

    let req: UpdateItem = bind(&ctx, &CodecRegistry::standard()).await.unwrap();
    assert_eq!(req.id, 5);
    assert_eq!(
        req.body,
        ItemBody {
            name: "desk".to_string(),
            price: 99.5,
            tags: vec!["oak".to_string(), "ash".to_string()],
        }
    );

    let err = bind::<UpdateItem>(&ctx, &CodecRegistry::default()).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_null_body_leaves_zero_value() {
    let codecs = CodecRegistry::default();

    let whole = ExtractionContext::builder()
        .method(Method::POST)
        .header("content-type", "application/json")
        .body("null")
        .build();
    let req: ItemBody = bind(&whole, &codecs).await.unwrap();
    assert_eq!(req, ItemBody::default());

    let nested = ExtractionContext::builder()
        .method(Method::PUT)
        .path_param("id", "3")
        .body(" null ")
        .build();
    let req: UpdateItem = bind(&nested, &codecs).await.unwrap();
    assert_eq!(req.id, 3);
    assert_eq!(req.body, ItemBody::default());
}

#[tokio::test]
async fn test_form_encoded_body() {
    let ctx = ExtractionContext::builder()
        .method(Method::POST)
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=chair&price=20&tags=a&tags=b")
        .build();

    let req: ItemBody = bind(&ctx, &CodecRegistry::standard()).await.unwrap();
    assert_eq!(req.name, "chair");
    assert_eq!(req.tags, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let ctx = ExtractionContext::builder()
        .method(Method::POST)
        .header("content-type", "application/xml")
        .body("<item/>")
        .build();

    let err = bind::<ItemBody>(&ctx, &CodecRegistry::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_multipart_values_and_files() {
    let ctx = multipart(&[
        ("title", None, "Annual report"),
        ("count", None, ""),
        ("cover", Some("cover.pdf"), "%PDF-cover"),
        ("pages", Some("p1.pdf"), "%PDF-1"),
        ("pages", Some("p2.pdf"), "%PDF-2"),
    ]);

    let req: Upload = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert_eq!(req.title, "Annual report");
    assert_eq!(req.count, 0, "empty form values leave the default");

    let cover = req.cover.unwrap();
    assert_eq!(cover.file_name(), Some("cover.pdf"));
    assert_eq!(cover.content_type(), Some("application/pdf"));
    assert_eq!(req.pages.len(), 2);
    assert_eq!(req.pages[1].text().unwrap(), "%PDF-2");
}

#[tokio::test]
async fn test_multipart_missing_files_are_tolerated() {
    let ctx = multipart(&[("title", None, "Only text")]);
    let req: Upload = bind(&ctx, &CodecRegistry::default()).await.unwrap();
    assert!(req.cover.is_none());
    assert!(req.pages.is_empty());
}

#[tokio::test]
async fn test_multipart_errors() {
    let not_multipart = ExtractionContext::builder()
        .method(Method::POST)
        .header("content-type", "application/json")
        .body("{}")
        .build();
    let err = bind::<Upload>(&not_multipart, &CodecRegistry::default())
        .await
        .unwrap_err();
    assert_eq!(err.binding_source(), BindingSource::Form);

    let bad_scalar = multipart(&[("count", None, "many")]);
    let err = bind::<Upload>(&bad_scalar, &CodecRegistry::default())
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("count"));

    let codecs = CodecRegistry::default();
    let config = MultipartConfig::new().max_body_size(16);
    let err = Binder::new(&codecs)
        .with_multipart_config(&config)
        .bind::<Upload>(&multipart(&[("title", None, "a long enough title")]))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_decode_request_validates() {
    let ctx = ExtractionContext::builder()
        .method(Method::PUT)
        .path_param("id", "5")
        .body(r#"{"name":"ab"}"#)
        .build();

    let err = decode_request::<UpdateItem>(&ctx, &CodecRegistry::default())
        .await
        .unwrap_err();
    match err {
        ContractError::Validation(err) => {
            assert_eq!(err.len(), 1);
            assert_eq!(err.violations()[0].field, "body.name");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
