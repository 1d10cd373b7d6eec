//! In-process HTTP stub for the integration tests
//!
//! Serves canned responses chosen by substring match on the request target.
//! Bodies may contain `{{base}}`, replaced with the stub's own address so a
//! response can link back to another route.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One canned response
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    status: u16,
    body: String,
    delay: Duration,
}

impl Route {
    pub fn ok(pattern: &str, body: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(pattern: &str, status: u16) -> Self {
        Self {
            pattern: pattern.to_string(),
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Binds to an ephemeral port and starts serving `routes`
    ///
    /// Routes are tried in order; unmatched requests get a 404.
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = format!("http://{}", addr);
        let routes: Arc<Vec<Route>> = Arc::new(
            routes
                .into_iter()
                .map(|mut route| {
                    route.body = route.body.replace("{{base}}", &base);
                    route
                })
                .collect(),
        );
        let hits = Arc::new(Mutex::new(Vec::new()));

        let served_hits = Arc::clone(&hits);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&served_hits);
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &hits).await;
                });
            }
        });

        Self { addr, hits, handle }
    }

    /// Absolute URL of `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request targets received so far
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Number of requests whose target contains `pattern`
    pub fn hit_count(&self, pattern: &str) -> usize {
        self.hits().iter().filter(|t| t.contains(pattern)).count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &[Route],
    hits: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let text = String::from_utf8_lossy(&request);
    let target = text
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    hits.lock().unwrap().push(target.clone());

    let (status, body, delay) = match routes.iter().find(|r| target.contains(&r.pattern)) {
        Some(route) => (route.status, route.body.clone(), route.delay),
        None => (404, String::new(), Duration::ZERO),
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// USGS response with one temperature series
pub fn site_body(code: &str, name: &str, lat: f64, lon: f64, samples: &[(&str, &str)]) -> String {
    let values: Vec<String> = samples
        .iter()
        .map(|(date_time, value)| {
            format!(r#"{{"value": "{}", "qualifiers": ["P"], "dateTime": "{}"}}"#, value, date_time)
        })
        .collect();
    format!(
        r#"{{"value": {{"timeSeries": [{{
            "sourceInfo": {{
                "siteName": "{name}",
                "siteCode": [{{"value": "{code}", "agencyCode": "USGS"}}],
                "geoLocation": {{"geogLocation": {{"latitude": {lat}, "longitude": {lon}}}}}
            }},
            "variable": {{"noDataValue": -999999.0}},
            "values": [{{"value": [{values}]}}]
        }}]}}}}"#,
        name = name,
        code = code,
        lat = lat,
        lon = lon,
        values = values.join(",")
    )
}

/// USGS response with one E. coli series per entry
pub fn ecoli_body(series: &[(&str, &str, &[(&str, &str)])]) -> String {
    let series: Vec<String> = series
        .iter()
        .map(|(code, name, samples)| {
            let values: Vec<String> = samples
                .iter()
                .map(|(date_time, value)| {
                    format!(r#"{{"value": "{}", "dateTime": "{}"}}"#, value, date_time)
                })
                .collect();
            format!(
                r#"{{"sourceInfo": {{"siteName": "{}", "siteCode": [{{"value": "{}"}}]}},
                    "values": [{{"value": [{}]}}]}}"#,
                name,
                code,
                values.join(",")
            )
        })
        .collect();
    format!(r#"{{"value": {{"timeSeries": [{}]}}}}"#, series.join(","))
}

/// NWS points response linking to the stub's forecast route
pub fn points_body() -> String {
    r#"{"properties": {"gridId": "FFC", "forecast": "{{base}}/gridpoints/FFC/51,95/forecast"}}"#
        .to_string()
}

/// NWS forecast response with `count` periods
pub fn forecast_body(count: usize) -> String {
    let periods: Vec<String> = (1..=count)
        .map(|n| {
            format!(
                r#"{{"number": {n}, "name": "Period {n}", "temperature": {t},
                    "temperatureUnit": "F", "windSpeed": "5 mph", "windDirection": "S",
                    "shortForecast": "Mostly Sunny"}}"#,
                n = n,
                t = 60 + n
            )
        })
        .collect();
    format!(r#"{{"properties": {{"periods": [{}]}}}}"#, periods.join(","))
}
