use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};

use tavern_server::database::MemoryStore;
use tavern_server::{api, context, cors, handlers, logger};

async fn handler(req: Request<Body>, store: Arc<MemoryStore>) -> Result<Response<Body>, hyper::Error> {
    use std::time::SystemTime;
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = SystemTime::now();
    if context::debug() && method == hyper::Method::OPTIONS {
        return Ok(cors::preflight_requests(req));
    }
    let mut response = handlers::router(req, &*store)
        .await
        .unwrap_or_else(|e| api::error_response(&e));
    if context::debug() {
        response = cors::allow_origin(response);
    }
    let elapsed = SystemTime::now().duration_since(start).unwrap();
    log::debug!("{} {} {}ms", method, uri, elapsed.as_millis());
    Ok(response)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logger::setup_logger(context::debug()).expect("failed to set up the logger");
    // touch the secret early so a missing one fails at start, not at the
    // first login
    context::secret();

    let store = Arc::new(MemoryStore::new());
    let addr = SocketAddr::from(([127, 0, 0, 1], context::port()));

    let make_svc = make_service_fn::<_, AddrStream, _>(move |_| {
        let store = store.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                let store = store.clone();
                handler(req, store)
            }))
        }
    });

    log::info!("the campaign server is listening on {}", addr);
    let server = Server::bind(&addr).serve(make_svc);

    if let Err(e) = server.await {
        eprintln!("server error: {}", e);
    }
}
