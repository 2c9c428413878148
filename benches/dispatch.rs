use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fnwire::{Gateway, HttpMethod, InboundRequest, IntoReply, Procedure, Signature};
use serde_json::json;

fn bench_gateway() -> Gateway {
    let mut gateway = Gateway::new();

    let sig = Signature::builder()
        .param("a")
        .param_with_default("b", json!(2))
        .build()
        .unwrap();
    gateway.register(Procedure::new("add", sig, |args| {
        let a = args[0].as_i64().unwrap_or(0);
        let b = args[1].as_i64().unwrap_or(0);
        (a + b).into_reply()
    }));

    // Pad the table so lookups run against a realistic route count.
    for i in 0..50 {
        gateway.register_at(
            Procedure::new(format!("op{i}"), Signature::empty(), |_| ().into_reply()),
            &format!("ops/op{i}"),
            HttpMethod::Post,
        );
    }

    gateway
}

fn bench_route_lookup(c: &mut Criterion) {
    let gateway = bench_gateway();
    let router = gateway.router();

    c.bench_function("route_lookup", |b| {
        b.iter(|| {
            let hit = router.lookup(black_box(HttpMethod::Post), black_box("/add"));
            black_box(hit.is_some())
        })
    });
}

fn bench_dispatch_success(c: &mut Criterion) {
    let dispatcher = bench_gateway().into_dispatcher();
    let body = serde_json::to_vec(&json!({"a": 1})).unwrap();

    c.bench_function("dispatch_success", |b| {
        b.iter(|| {
            let request = InboundRequest {
                method: "POST".to_string(),
                path: "/add".to_string(),
                query: None,
                content_type: Some("application/json".to_string()),
                body: body.clone(),
            };
            black_box(dispatcher.dispatch(request))
        })
    });
}

fn bench_dispatch_unknown_route(c: &mut Criterion) {
    let dispatcher = bench_gateway().into_dispatcher();

    c.bench_function("dispatch_unknown_route", |b| {
        b.iter(|| {
            let request = InboundRequest::json("POST", "/missing", &json!({}));
            black_box(dispatcher.dispatch(request))
        })
    });
}

criterion_group!(
    benches,
    bench_route_lookup,
    bench_dispatch_success,
    bench_dispatch_unknown_route
);
criterion_main!(benches);
