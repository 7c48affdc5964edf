//! Full CRUD lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `BeerClient`
//! build/parse pair over real HTTP using ureq. Validates that request
//! building and response parsing work end-to-end with the actual server.

use cellar_core::{ApiError, Beer, BeerClient, HttpMethod, HttpRequest, HttpResponse};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn draft(user: &str, name: &str) -> Beer {
    Beer {
        id: 0,
        user: user.to_string(),
        brewery: "Brew Co".to_string(),
        name: name.to_string(),
        style: "Pilsner".to_string(),
        abv: 4.6,
        volume: 33.0,
        picture_url: "defaultUrl".to_string(),
        how_many: 1,
    }
}

#[test]
fn crud_lifecycle() {
    let addr = start_server();
    let client = BeerClient::new(&format!("http://{addr}/api"));

    // Step 1: list — should be empty.
    let beers = client.parse_list_all(execute(client.build_list_all())).unwrap();
    assert!(beers.is_empty(), "expected empty list");

    // Step 2: create two beers for different owners.
    let req = client.build_create(&draft("a@x.com", "Pils")).unwrap();
    let created = client.parse_create(execute(req)).unwrap();
    assert!(created.is_saved());
    assert_eq!(Beer { id: 0, ..created.clone() }, draft("a@x.com", "Pils"));
    let id = created.id;

    let req = client.build_create(&draft("b@x.com", "Bock")).unwrap();
    client.parse_create(execute(req)).unwrap();

    // Step 3: get the created beer.
    let fetched = client.parse_get(execute(client.build_get(id))).unwrap();
    assert_eq!(fetched, created);

    // Step 4: list by user only returns that owner's beers.
    let mine = client
        .parse_list_by_user(execute(client.build_list_by_user("a@x.com")))
        .unwrap();
    assert_eq!(mine, vec![created.clone()]);

    // Step 5: update.
    let edited = Beer {
        name: "Pils Extra".to_string(),
        how_many: 6,
        ..created.clone()
    };
    let req = client.build_update(id, &edited).unwrap();
    let updated = client.parse_update(execute(req)).unwrap();
    assert_eq!(updated, edited);

    // Step 6: update a missing id — protocol failure with status text.
    let req = client.build_update(999, &edited).unwrap();
    let err = client.parse_update(execute(req)).unwrap_err();
    assert_eq!(err.to_string(), "404 Not Found");

    // Step 7: delete echoes the removed beer.
    let removed = client.parse_delete(execute(client.build_delete(id))).unwrap();
    assert_eq!(removed, Some(updated));

    // Step 8: get after delete — should be 404.
    let err = client.parse_get(execute(client.build_get(id))).unwrap_err();
    assert!(err.is_not_found());

    // Step 9: delete again — should be 404.
    let err = client.parse_delete(execute(client.build_delete(id))).unwrap_err();
    assert!(matches!(err, ApiError::Protocol { status: 404, .. }));

    // Step 10: list — only the other owner's beer is left.
    let beers = client.parse_list_all(execute(client.build_list_all())).unwrap();
    assert_eq!(beers.len(), 1);
    assert_eq!(beers[0].user, "b@x.com");
}
