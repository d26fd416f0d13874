//! A wiremock responder that serves a fixed body and honors `Range` headers.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves `body` for HEAD and ranged GET requests.
///
/// `bytes=s-e` and `bytes=s-` get a `206` with the matching slice; a start at
/// or past the end gets `416`. A GET whose range starts at `fail_start`
/// gets a `500`. With `ignore_ranges` every GET gets the full body and `200`.
#[derive(Debug, Clone, Default)]
pub struct RangeResponder {
    pub body: Vec<u8>,
    pub fail_start: Option<u64>,
    pub ignore_ranges: bool,
}

impl RangeResponder {
    pub fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            ..Self::default()
        }
    }

    /// Mounts this responder for HEAD and GET on `route`.
    pub async fn mount(self, server: &MockServer, route: &str) {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Accept-Ranges", "bytes")
                    .set_body_bytes(self.body.clone()),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(self)
            .mount(server)
            .await;
    }
}

fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start = start.parse().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse().ok()?)
    };
    Some((start, end))
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let len = self.body.len() as u64;
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_range);

        let Some((start, end)) = range else {
            return ResponseTemplate::new(200).set_body_bytes(self.body.clone());
        };
        if self.fail_start == Some(start) {
            return ResponseTemplate::new(500);
        }
        if self.ignore_ranges {
            return ResponseTemplate::new(200).set_body_bytes(self.body.clone());
        }
        if start >= len {
            return ResponseTemplate::new(416)
                .insert_header("Content-Range", format!("bytes */{len}").as_str());
        }

        let last = end.map_or(len - 1, |end| end.min(len - 1));
        let slice = self.body[start as usize..=last as usize].to_vec();
        ResponseTemplate::new(206)
            .insert_header(
                "Content-Range",
                format!("bytes {start}-{last}/{len}").as_str(),
            )
            .set_body_bytes(slice)
    }
}
