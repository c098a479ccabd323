//! Binding a realistic request through configuration, materialization and
//! per-field resolvers.

use desmos::bind::selector::{descend, slot};
use desmos::prelude::*;
use once_cell::sync::Lazy;

#[derive(Debug, Default, PartialEq)]
struct Paging {
    limit: u32,
    cursor: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
struct ListOrders {
    tenant: u64,
    statuses: Vec<String>,
    trace: String,
    session: String,
    paging: Option<Box<Paging>>,
}

static FIELDS: Lazy<FieldTable<ListOrders>> = Lazy::new(|| {
    FieldTable::<ListOrders>::new()
        .field("tenant", |t, _| slot(&mut t.tenant))
        .field("statuses", |t, _| slot(&mut t.statuses))
        .field("trace", |t, _| slot(&mut t.trace))
        .field("session", |t, _| slot(&mut t.session))
        .field("paging.limit", |t, init| {
            descend(&mut t.paging, init).and_then(|p| slot(&mut p.limit))
        })
        .field("paging.cursor", |t, init| {
            descend(&mut t.paging, init).and_then(|p| slot(&mut p.cursor))
        })
});

impl Bindable for ListOrders {
    fn field_table() -> &'static FieldTable<Self> {
        &FIELDS
    }
}

fn resolvers() -> Vec<FieldResolver> {
    vec![
        FieldResolver::new("tenant", "Tenant")
            .with_rule(BindingRule::path("tenant").required(true).build()),
        FieldResolver::new("statuses", "Statuses")
            .with_rule(BindingRule::query("status").build()),
        FieldResolver::new("trace", "Trace")
            .with_rule(BindingRule::header("X-Trace-Id").required(true).build()),
        FieldResolver::new("session", "Session")
            .with_rule(BindingRule::cookie("sid").build()),
        FieldResolver::new("paging.limit", "Limit")
            .with_rule(BindingRule::query("limit").build())
            .with_rule(BindingRule::json("limit").name_path("paging.limit").build()),
        FieldResolver::new("paging.cursor", "Cursor")
            .with_rule(
                BindingRule::json("cursor")
                    .name_path("paging.cursor")
                    .required(true)
                    .build(),
            ),
    ]
}

fn bind_all(
    target: &mut ListOrders,
    sources: &RequestSources,
    check_opt: bool,
) -> Result<(), BindError> {
    for resolver in resolvers() {
        for rule in resolver.rules() {
            resolver.bind(rule, target, sources, check_opt)?;
        }
    }
    Ok(())
}

fn sources(
    request: http::Request<()>,
    body: &'static [u8],
    options: &BindOptions,
) -> anyhow::Result<RequestSources> {
    let (parts, ()) = request.into_parts();
    let path: PathParams = [("tenant", "7")].into_iter().collect();
    Ok(RequestSources::from_parts(&parts, Bytes::from_static(body), path, options)?)
}

#[test]
fn binds_every_source_of_a_request() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_string("[binding]\nmax_body_bytes = 1024", "toml")?
        .load()?;
    let options = config.bind_options();

    let request = http::Request::post("/tenants/7/orders?status=open&status=held&limit=25")
        .header("content-type", "application/json")
        .header("x-trace-id", "abc")
        .header("cookie", "sid=s1")
        .body(())?;
    let sources = sources(request, br#"{"paging":{"cursor":"c1"}}"#, &options)?;

    // JSON fields come from the full-document decode; binding only verifies them.
    let mut target = ListOrders {
        paging: Some(Box::new(Paging {
            limit: 0,
            cursor: Some("c1".to_string()),
        })),
        ..ListOrders::default()
    };
    bind_all(&mut target, &sources, options.check_optional_json)?;

    assert_eq!(target.tenant, 7);
    assert_eq!(target.statuses, vec!["open", "held"]);
    assert_eq!(target.trace, "abc");
    assert_eq!(target.session, "s1");
    assert_eq!(
        target.paging,
        Some(Box::new(Paging {
            limit: 25,
            cursor: Some("c1".to_string()),
        }))
    );
    Ok(())
}

#[test]
fn missing_required_header_is_reported_first_class() -> anyhow::Result<()> {
    let options = BindOptions::default();
    let request = http::Request::get("/tenants/7/orders").body(())?;
    let sources = sources(request, b"", &options)?;

    let err = bind_all(&mut ListOrders::default(), &sources, false).unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
    assert_eq!(err.param_source(), ParamSource::Header);
    assert_eq!(err.to_string(), "binding: expr_path=X-Trace-Id, cause=missing required parameter");
    assert_eq!(DesmosError::from(err).status_code(), http::StatusCode::BAD_REQUEST);
    Ok(())
}

#[test]
fn oversized_body_is_rejected_before_binding() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_string(r#"{"binding": {"max_body_bytes": 8}}"#, "json")?
        .load()?;
    let request = http::Request::post("/tenants/7/orders")
        .header("content-type", "application/json")
        .body(())?;

    let err = sources(request, br#"{"paging":{}}"#, &config.bind_options()).unwrap_err();
    let err = err.downcast::<RequestError>()?;

    assert!(matches!(err, RequestError::PayloadTooLarge { max: 8, .. }));
    Ok(())
}

#[test]
fn default_content_type_enables_body_rules() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_string(r#"{"binding": {"default_content_type": "application/json"}}"#, "json")?
        .load()?;
    let request = http::Request::post("/tenants/7/orders")
        .header("x-trace-id", "t")
        .body(())?;
    let sources = sources(request, br#"{"paging":{"cursor":"z"}}"#, &config.bind_options())?;

    assert_eq!(sources.codec(), BodyCodec::Json);

    let mut target = ListOrders {
        paging: Some(Box::default()),
        ..ListOrders::default()
    };
    bind_all(&mut target, &sources, false)?;
    assert_eq!(target.trace, "t");
    Ok(())
}
