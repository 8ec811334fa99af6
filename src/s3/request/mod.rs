use anyhow::Result;
use bytes::Bytes;
use reqwest::{
    Client, Method, Response,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;

// one connection pool for every request of the process
fn client() -> Result<&'static Client> {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = Client::builder().build()?;
    Ok(CLIENT.get_or_init(|| client))
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    headers
        .iter()
        .map(|(k, v)| Ok((k.parse::<HeaderName>()?, v.parse::<HeaderValue>()?)))
        .collect::<Result<HeaderMap>>()
}

/// Sends a signed request, `body` is sent as is
///
/// # Errors
///
/// Will return `Err` if can not make the request
pub async fn request(
    url: Url,
    method: Method,
    headers: &BTreeMap<String, String>,
    body: Option<Bytes>,
) -> Result<Response> {
    let headers = header_map(headers)?;

    log::debug!("{method} {url}");

    let request = client()?.request(method, url).headers(headers);
    let request = match body {
        Some(body) => request.body(body),
        None => request,
    };

    Ok(request.send().await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let mut headers = BTreeMap::new();
        headers.insert("content-md5".to_string(), "XrY7u+Ae7tCTyyK7j1rNww==".to_string());
        headers.insert("x-amz-date".to_string(), "20240101T000000Z".to_string());
        let map = header_map(&headers).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Content-MD5").unwrap(), "XrY7u+Ae7tCTyyK7j1rNww==");
    }

    #[test]
    fn test_header_map_invalid() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "value".to_string());
        assert!(header_map(&headers).is_err());
    }

    #[tokio::test]
    async fn test_request_sends_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/bucket/key")
            .match_header("x-test", "1")
            .match_body("payload")
            .with_status(200)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/bucket/key", server.url())).unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("x-test".to_string(), "1".to_string());
        let response = request(url, Method::PUT, &headers, Some(Bytes::from_static(b"payload")))
            .await
            .unwrap();
        assert!(response.status().is_success());
        mock.assert_async().await;
    }
}
