//! End-to-end binding tests.
//!
//! Each test materializes a real `http` request into [`RequestSources`] and
//! binds one field through [`FieldResolver::bind`], the way a request handler
//! drives the engine.

use bytes::Bytes;
use desmos_bind::coerce::{coerce, Coercion, FieldKind, ScalarKind};
use desmos_bind::selector::{descend, slot, Bindable, FieldTable};
use desmos_bind::{
    BindErrorKind, BindOptions, BindingRule, FieldResolver, MultiMap, PathParams, RequestSources,
};
use http::Request;
use once_cell::sync::Lazy;
use proptest::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    age: u32,
    nick: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Params {
    id: i64,
    flag: bool,
    note: String,
    sessions: Vec<String>,
    scores: Vec<i64>,
    tenant: u16,
    user: Option<Box<User>>,
}

static FIELDS: Lazy<FieldTable<Params>> = Lazy::new(|| {
    FieldTable::<Params>::new()
        .field("id", |p, _| slot(&mut p.id))
        .field("flag", |p, _| slot(&mut p.flag))
        .field("note", |p, _| slot(&mut p.note))
        .field("sessions", |p, _| slot(&mut p.sessions))
        .field("scores", |p, _| slot(&mut p.scores))
        .field("tenant", |p, _| slot(&mut p.tenant))
        .field("user.age", |p, init| {
            descend(&mut p.user, init).and_then(|u| slot(&mut u.age))
        })
        .field("user.nick", |p, init| {
            descend(&mut p.user, init).and_then(|u| slot(&mut u.nick))
        })
});

impl Bindable for Params {
    fn field_table() -> &'static FieldTable<Self> {
        &FIELDS
    }
}

fn sources(
    builder: http::request::Builder,
    body: &'static [u8],
    path: PathParams,
) -> RequestSources {
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    RequestSources::from_parts(&parts, Bytes::from_static(body), path, &BindOptions::default())
        .unwrap()
}

fn get(uri: &str) -> RequestSources {
    sources(Request::get(uri), b"", PathParams::new())
}

#[test]
fn required_query_integer_is_bound() {
    let rule = BindingRule::query("id").required(true).build();
    let resolver = FieldResolver::new("id", "ID").with_rule(rule.clone());
    let mut params = Params::default();

    let bound = resolver.bind(&rule, &mut params, &get("/?id=42"), false);

    assert!(bound.unwrap());
    assert_eq!(params.id, 42);
}

#[test]
fn required_query_missing_fails() {
    let rule = BindingRule::query("id").required(true).build();
    let resolver = FieldResolver::new("id", "ID").with_rule(rule.clone());
    let mut params = Params::default();

    let err = resolver.bind(&rule, &mut params, &get("/"), false).unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
    assert_eq!(err.field(), "id");
    assert!(err.same_as(rule.required_error()));
    assert_eq!(params, Params::default());
}

#[test]
fn malformed_optional_header_bool_is_skipped() {
    let rule = BindingRule::header("X-Flag").build();
    let resolver = FieldResolver::new("flag", "Flag").with_rule(rule.clone());
    let sources = sources(
        Request::get("/").header("X-Flag", "not-a-bool"),
        b"",
        PathParams::new(),
    );
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert!(!params.flag);
}

#[test]
fn header_lookup_ignores_case() {
    let rule = BindingRule::header("X-Tenant").build();
    let resolver = FieldResolver::new("tenant", "Tenant").with_rule(rule.clone());
    let sources = sources(Request::get("/").header("x-TENANT", "12"), b"", PathParams::new());
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.tenant, 12);
}

#[test]
fn required_header_with_utf8_value_is_bound() {
    let rule = BindingRule::header("X-Name").required(true).build();
    let resolver = FieldResolver::new("note", "Note").with_rule(rule.clone());
    let value = http::HeaderValue::from_bytes("José".as_bytes()).unwrap();
    let sources = sources(Request::get("/").header("X-Name", value), b"", PathParams::new());
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.note, "José");
}

#[test]
fn required_json_path_missing_fails() {
    let rule = BindingRule::json("age").name_path("user.age").required(true).build();
    let resolver = FieldResolver::new("user.age", "Age").with_rule(rule.clone());
    let sources = sources(
        Request::post("/").header("content-type", "application/json"),
        br#"{"user":{}}"#,
        PathParams::new(),
    );
    let mut params = Params {
        user: Some(Box::default()),
        ..Params::default()
    };

    let err = resolver.bind(&rule, &mut params, &sources, false).unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
    assert_eq!(
        err.to_string(),
        "binding: expr_path=user.age, cause=missing required parameter"
    );
}

#[test]
fn raw_body_binds_to_string() {
    let rule = BindingRule::raw_body("note").build();
    let resolver = FieldResolver::new("note", "Note").with_rule(rule.clone());
    let sources = sources(
        Request::post("/").header("content-type", "text/plain"),
        b"hello",
        PathParams::new(),
    );
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.note, "hello");
}

#[test]
fn repeated_cookies_bind_to_slice() {
    let rule = BindingRule::cookie("session").build();
    let resolver = FieldResolver::new("sessions", "Sessions").with_rule(rule.clone());
    let sources = sources(
        Request::get("/")
            .header("cookie", "session=a; theme=dark")
            .header("cookie", "session=b"),
        b"",
        PathParams::new(),
    );
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.sessions, vec!["a", "b"]);
}

#[test]
fn path_parameter_is_bound() {
    let rule = BindingRule::path("id").required(true).build();
    let resolver = FieldResolver::new("id", "ID").with_rule(rule.clone());
    let path: PathParams = [("id", "-9")].into_iter().collect();
    let sources = sources(Request::get("/items/-9"), b"", path);
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.id, -9);
}

#[test]
fn form_body_binds_nested_field() {
    let rule = BindingRule::form("age").build();
    let resolver = FieldResolver::new("user.age", "Age").with_rule(rule.clone());
    let sources = sources(
        Request::post("/").header("content-type", "application/x-www-form-urlencoded"),
        b"age=33&other=1",
        PathParams::new(),
    );
    let mut params = Params::default();

    assert!(resolver.bind(&rule, &mut params, &sources, false).unwrap());
    assert_eq!(params.user.map(|u| u.age), Some(33));
}

#[test]
fn body_rule_with_unsupported_codec_fails() {
    let rule = BindingRule::json("age").name_path("user.age").build();
    let resolver = FieldResolver::new("user.age", "Age").with_rule(rule.clone());
    let sources = sources(
        Request::post("/").header("content-type", "text/xml"),
        b"<user/>",
        PathParams::new(),
    );

    let err = resolver
        .bind(&rule, &mut Params::default(), &sources, false)
        .unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::UnsupportedContentType);
    assert_eq!(err.status_code(), http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[test]
fn optional_json_checked_only_on_request() {
    let rule = BindingRule::json("nick").name_path("user.nick").build();
    let resolver = FieldResolver::new("user.nick", "Nick").with_rule(rule.clone());
    let sources = sources(
        Request::post("/").header("content-type", "application/json"),
        br#"{"user":{"age":1}}"#,
        PathParams::new(),
    );

    assert!(resolver.bind(&rule, &mut Params::default(), &sources, false).is_ok());

    let err = resolver
        .bind(&rule, &mut Params::default(), &sources, true)
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
}

#[test]
fn every_rule_of_a_field_can_be_tried_in_order() {
    let resolver = FieldResolver::new("id", "ID")
        .with_rule(BindingRule::header("X-Id").build())
        .with_rule(BindingRule::query("id").required(true).build());
    let sources = get("/?id=5");
    let mut params = Params::default();

    let outcomes: Vec<bool> = resolver
        .rules()
        .iter()
        .map(|rule| resolver.bind(rule, &mut params, &sources, false).unwrap())
        .collect();

    assert_eq!(outcomes, vec![false, true]);
    assert_eq!(params.id, 5);
}

#[test]
fn binding_twice_yields_the_same_target() {
    let rule = BindingRule::query("score").required(true).build();
    let resolver = FieldResolver::new("scores", "Scores").with_rule(rule.clone());
    let sources = get("/?score=1&score=-2&score=3");

    let mut first = Params::default();
    let mut second = Params::default();
    resolver.bind(&rule, &mut first, &sources, false).unwrap();
    resolver.bind(&rule, &mut second, &sources, false).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.scores, vec![1, -2, 3]);
}

#[test]
fn integer_boundaries() {
    let kind = FieldKind::Scalar(ScalarKind::I8);
    assert!(matches!(coerce(kind, &["127"]), Coercion::Set(_)));
    assert!(matches!(coerce(kind, &["-128"]), Coercion::Set(_)));
    assert_eq!(coerce(kind, &["128"]), Coercion::SkippedLeniently);

    let kind = FieldKind::Slice(ScalarKind::U8);
    assert!(matches!(coerce(kind, &["255"]), Coercion::Set(_)));
    assert_eq!(coerce(kind, &["256"]), Coercion::Failed);
}

// Scalars skip bad input while slices reject it; both behaviors are relied on.
#[test]
fn scalar_and_slice_leniency_differ() {
    let scalar = FieldResolver::new("tenant", "Tenant");
    let slice = FieldResolver::new("scores", "Scores");
    let scalar_rule = BindingRule::query("v").build();
    let slice_rule = BindingRule::query("v").build();
    let query: MultiMap = [("v", "x")].into_iter().collect();

    assert!(scalar
        .bind_query(&scalar_rule, &mut Params::default(), &query)
        .unwrap());
    assert_eq!(
        slice
            .bind_query(&slice_rule, &mut Params::default(), &query)
            .unwrap_err()
            .kind(),
        BindErrorKind::TypeMismatch
    );
}

proptest! {
    #[test]
    fn integer_slices_round_trip(values in proptest::collection::vec(any::<i64>(), 1..16)) {
        let rule = BindingRule::query("score").build();
        let resolver = FieldResolver::new("scores", "Scores");
        let query: MultiMap = values.iter().map(|v| ("score", v.to_string())).collect();
        let mut params = Params::default();

        prop_assert!(resolver.bind_query(&rule, &mut params, &query).unwrap());
        prop_assert_eq!(params.scores, values);
    }

    #[test]
    fn required_miss_leaves_target_untouched(id in any::<i64>(), name in "[a-z]{1,8}") {
        let rule = BindingRule::query(name).required(true).build();
        let resolver = FieldResolver::new("id", "ID");
        let mut params = Params { id, ..Params::default() };

        let err = resolver.bind_query(&rule, &mut params, &MultiMap::new()).unwrap_err();
        prop_assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
        prop_assert_eq!(params.id, id);
    }
}
