use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{error, info};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::scheduler;
use crate::simulate;
use crate::state::SharedDashboard;
use crate::thingspeak::{Gateway, Reading};
use crate::views;

static SERVED_REQUESTS: AtomicUsize = AtomicUsize::new(0);

/// Everything a request handler needs: the gateway, the shared dashboard
/// state, and how many feed entries a refresh asks for.
pub struct Context {
    pub gateway: Arc<Gateway>,
    pub state: SharedDashboard,
    pub results: usize,
}

fn serve_404(request: Request) -> io::Result<()> {
    request.respond(Response::from_string("404").with_status_code(StatusCode(404)))
}

fn serve_500(request: Request) -> io::Result<()> {
    request.respond(Response::from_string("500").with_status_code(StatusCode(500)))
}

fn serve_json(request: Request, bytes: &[u8]) -> io::Result<()> {
    let content_type_json = "application/json; charset=utf-8";
    let content_type_header = Header::from_bytes("Content-Type", content_type_json)
        .expect("That we didn't put any garbage in the headers");
    request.respond(Response::from_data(bytes).with_header(content_type_header))
}

fn serve_view(request: Request, rendered: Result<String, Box<dyn std::error::Error>>) -> io::Result<()> {
    match rendered {
        Ok(payload) => serve_json(request, payload.as_bytes()),
        Err(err) => {
            error!("could not render view: {err}");
            serve_500(request)
        }
    }
}

fn serve_api_stats(context: &Context, request: Request) -> io::Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Stats {
        served_requests: usize,
        readings: usize,
        loading: bool,
        last_updated: Option<String>,
    }

    let snapshot = context.state.lock().unwrap().snapshot();
    let stats = Stats {
        served_requests: SERVED_REQUESTS.load(Ordering::Relaxed),
        readings: snapshot.readings.len(),
        loading: snapshot.loading,
        last_updated: snapshot.last_updated.map(|t| t.to_rfc3339()),
    };

    let json = match serde_json::to_string(&stats) {
        Ok(json) => json,
        Err(err) => {
            error!("could not convert stats to JSON: {err}");
            return serve_500(request);
        }
    };
    serve_json(request, json.as_bytes())
}

fn serve_api_refresh(context: &Context, request: Request) -> io::Result<()> {
    scheduler::spawn_refresh(context.gateway.clone(), context.state.clone(), context.results);
    serve_json(request, b"{\"refresh\":\"started\"}")
}

fn serve_api_send(context: &Context, request: Request) -> io::Result<()> {
    let reading = reading_from_query(request.url());
    match context.gateway.send_reading(&reading) {
        Ok(outcome) => {
            if outcome.ok {
                // Give the service time to surface the write, then refetch.
                scheduler::spawn_post_submit_refresh(
                    context.gateway.clone(),
                    context.state.clone(),
                    context.results,
                );
            }
            let json = match serde_json::to_string(&outcome) {
                Ok(json) => json,
                Err(err) => {
                    error!("could not convert write outcome to JSON: {err}");
                    return serve_500(request);
                }
            };
            serve_json(request, json.as_bytes())
        }
        Err(err) => {
            error!("send failed: {err}");
            serve_500(request)
        }
    }
}

/// Build the reading to submit from the request's query string. `random=1`
/// draws a fresh random reading; otherwise explicit fields override the form
/// defaults and anything unparseable is ignored.
fn reading_from_query(raw_url: &str) -> Reading {
    let parsed = match reqwest::Url::parse(&format!("http://localhost{raw_url}")) {
        Ok(parsed) => parsed,
        Err(_) => return simulate::default_reading(),
    };

    let mut reading = simulate::default_reading();
    let mut random = false;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "random" => random = value == "1" || value == "true",
            "co2" => override_field(&mut reading.co2, &value),
            "noise" => override_field(&mut reading.noise, &value),
            "luminosity" => override_field(&mut reading.luminosity, &value),
            "pressure" => override_field(&mut reading.pressure, &value),
            "wind_speed" => override_field(&mut reading.wind_speed, &value),
            _ => {}
        }
    }

    if random {
        simulate::random_reading()
    } else {
        reading
    }
}

fn override_field(field: &mut f64, value: &str) {
    if let Ok(parsed) = value.parse::<f64>() {
        *field = parsed;
    }
}

fn serve_request(context: &Context, request: Request) -> io::Result<()> {
    SERVED_REQUESTS.fetch_add(1, Ordering::Relaxed);
    info!("received request! method: {:?}, url: {:?}", request.method(), request.url());

    let path = request.url().split('?').next().unwrap_or("").to_string();
    let snapshot = || context.state.lock().unwrap().snapshot();

    match (request.method(), path.as_str()) {
        (Method::Get, "/api/status") => serve_view(request, views::render_status(&snapshot())),
        (Method::Get, "/api/charts") => serve_view(request, views::render_charts(&snapshot())),
        (Method::Get, "/api/table") => serve_view(request, views::render_table(&snapshot())),
        (Method::Get, "/api/json") => match views::render_json(&snapshot()) {
            Ok(payload) => serve_json(request, payload.as_bytes()),
            Err(err) => {
                error!("could not render readings JSON: {err}");
                serve_500(request)
            }
        },
        (Method::Get, "/api/refresh") => serve_api_refresh(context, request),
        (Method::Get, "/api/send") => serve_api_send(context, request),
        (Method::Get, "/admin/stats") => serve_api_stats(context, request),
        _ => serve_404(request),
    }
}

pub fn start(address: &str, context: Context) -> Result<(), ()> {
    let server = Server::http(address).map_err(|err| {
        error!("could not start HTTP server at {address}: {err}");
    })?;

    info!("listening at http://{address}/");

    for request in server.incoming_requests() {
        serve_request(&context, request)
            .map_err(|err| {
                error!("could not serve the response: {err}");
            })
            .ok(); // <- don't stop on errors, keep serving
    }

    error!("the server socket has shutdown");
    Err(())
}
