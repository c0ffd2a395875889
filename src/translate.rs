//! Translation client for the batched and legacy remote endpoints.
//!
//! The public methods of [`Translator`] never fail. Transport errors,
//! non-success HTTP statuses, and malformed responses are rendered into
//! the returned text as diagnostic strings, because a chapter with an
//! inline error message is preferable to no chapter at all. Callers built
//! against this pipeline rely on `translate`-family calls always
//! resolving; see [`TranslationFailure`] for the diagnostic wording.

use crate::config::{EndpointConfig, TranslationConfig};
use crate::error::TranslationFailure;
use crate::rebuild::{rebuild, zip_with_default};
use crate::segment::{TextUnit, UnitTag, make_chunks, segment};
use regex::Regex;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;

/// Reserved separator delimiting unit texts within one batched payload.
/// An emoji flanked by spaces is all but guaranteed to survive machine
/// translation unchanged and to never occur in scraped prose.
pub const SEPARATOR: &str = " \u{1F600} ";

/// Inputs shorter than this many characters skip the remote call.
const MIN_TRANSLATABLE_CHARS: usize = 2;

/// Literal envelope around the batched response payload: `[["` prefix and
/// `"],["<lang>"]]` suffix. The body is not reliably valid JSON, so the
/// envelope is stripped by pattern rather than parsed; when a pattern is
/// absent the replacement is a no-op and the raw text passes through.
static ENVELOPE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\[\[""#).unwrap());
static ENVELOPE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\],\s*\[".*"\]\]$"#).unwrap());

/// Client for the remote translation service.
///
/// Holds no mutable state; one instance may be shared across concurrent
/// chapter fetches.
pub struct Translator {
    client: Client,
    endpoints: EndpointConfig,
    config: TranslationConfig,
    heading_pattern: Regex,
}

impl Translator {
    /// Creates a new Translator.
    ///
    /// An invalid `heading_pattern` in the config disables heading
    /// promotion rather than failing construction.
    pub fn new(endpoints: EndpointConfig, config: TranslationConfig) -> Self {
        let heading_pattern = Regex::new(&config.heading_pattern)
            .unwrap_or_else(|_| Regex::new(r"^\b$").unwrap());

        let client = Client::builder()
            .user_agent(endpoints.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_sec))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoints,
            config,
            heading_pattern,
        }
    }

    /// Creates a Translator with default endpoints and behavior
    /// (target language Russian, source auto-detected).
    pub fn with_defaults() -> Self {
        Self::new(EndpointConfig::default(), TranslationConfig::default())
    }

    /// Translates an HTML fragment end to end: segment, one batched
    /// remote call, reassemble.
    ///
    /// Inputs under 2 characters are returned unmodified without any
    /// network traffic.
    pub async fn translate_html(&self, html: &str) -> String {
        if html.chars().count() < MIN_TRANSLATABLE_CHARS {
            return html.to_string();
        }

        let units = segment(html);
        if units.is_empty() {
            return String::new();
        }

        let translations = self.translate_units(&units).await;
        rebuild(&units, &translations, &self.heading_pattern)
    }

    /// Translates a sequence of units in one batched request.
    ///
    /// Always returns exactly `units.len()` strings. When the service
    /// returns fewer separator-delimited fields than units (or the call
    /// fails outright), the missing positions are empty strings and the
    /// diagnostic text occupies the first field.
    pub async fn translate_units(&self, units: &[TextUnit]) -> Vec<String> {
        if units.is_empty() {
            return Vec::new();
        }

        let payload = join_units(units);

        let raw = match self.request_batch(&payload).await {
            Ok(body) => strip_envelope(&body),
            Err(failure) => failure.to_string(),
        };

        let fields: Vec<String> = raw.split(SEPARATOR).map(str::to_string).collect();
        zip_with_default(units, &fields)
            .map(|(_, line)| line.to_string())
            .collect()
    }

    /// Legacy path: translates HTML by splitting it into size-bounded
    /// plain-text chunks and issuing one GET per chunk, serialized with a
    /// fixed inter-request delay. Each translated chunk is wrapped in its
    /// own `<p>`.
    pub async fn translate_text(&self, text: &str) -> String {
        if text.chars().count() < MIN_TRANSLATABLE_CHARS {
            return text.to_string();
        }

        let chunks = make_chunks(text, self.config.max_chunk_size);
        let mut translations = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && self.config.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            }

            let translated = match self.request_chunk(chunk).await {
                Ok(t) => t,
                Err(failure) => failure.to_string(),
            };
            translations.push(translated);
        }

        translations
            .iter()
            .map(|p| format!("<p>{}</p>", p))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One POST to the batched `translateHtml` endpoint.
    async fn request_batch(&self, payload: &str) -> Result<String, TranslationFailure> {
        let body = json!([
            [[payload], self.config.source_lang, self.config.target_lang],
            self.config.library_tag
        ]);

        let response = self
            .client
            .post(&self.endpoints.batch_url)
            .header("X-Goog-API-Key", &self.endpoints.api_key)
            .header("Content-Type", "application/json+protobuf")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| TranslationFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationFailure::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| TranslationFailure::Transport(e.to_string()))
    }

    /// One GET to the legacy per-chunk endpoint. The translated text sits
    /// at `response[0][*][0]`, joined.
    async fn request_chunk(&self, chunk: &str) -> Result<String, TranslationFailure> {
        let response = self
            .client
            .get(&self.endpoints.legacy_url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_lang.as_str()),
                ("tl", self.config.target_lang.as_str()),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| TranslationFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationFailure::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| TranslationFailure::Malformed(e.to_string()))?;

        let translated: String = data
            .get(0)
            .and_then(Value::as_array)
            .map(|segments| {
                segments
                    .iter()
                    .filter_map(|s| s.get(0).and_then(Value::as_str))
                    .collect()
            })
            .ok_or_else(|| TranslationFailure::Malformed("missing translation array".to_string()))?;

        Ok(translated)
    }
}

/// Flattens unit texts into one separator-delimited payload. Break units
/// contribute an empty field so that positions survive the round trip.
fn join_units(units: &[TextUnit]) -> String {
    units
        .iter()
        .map(|u| match u.tag {
            UnitTag::Break => "",
            _ => u.text.as_str(),
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Strips the literal `[["` / `"],["<lang>"]]` envelope from a batched
/// response. Absent patterns leave the input untouched.
fn strip_envelope(raw: &str) -> String {
    let stripped = ENVELOPE_PREFIX_RE.replace(raw, "");
    ENVELOPE_SUFFIX_RE.replace(&stripped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn translator_for(server: &MockServer) -> Translator {
        let endpoints = EndpointConfig {
            batch_url: server.url("/v1/translateHtml"),
            legacy_url: server.url("/translate_a/single"),
            ..EndpointConfig::default()
        };
        let mut config = TranslationConfig::default();
        config.request_delay_ms = 0;
        Translator::new(endpoints, config)
    }

    fn batch_body(payload: &str) -> String {
        format!("[[\"{}\"],[\"zh-CN\"]]", payload)
    }

    #[test]
    fn test_join_units_substitutes_empty_for_breaks() {
        let units = segment("<h1>第一章</h1><p>正文</p>");
        assert_eq!(join_units(&units), format!("第一章{SEPARATOR}{SEPARATOR}正文"));
    }

    #[test]
    fn test_separator_round_trip() {
        let texts = ["第一章", "正文在这里", "结尾"];
        let joined = texts.join(SEPARATOR);
        let split: Vec<&str> = joined.split(SEPARATOR).collect();
        assert_eq!(split, texts);
    }

    #[test]
    fn test_strip_envelope() {
        let raw = format!("[[\"привет{SEPARATOR}мир\"],[\"zh-CN\"]]");
        assert_eq!(strip_envelope(&raw), format!("привет{SEPARATOR}мир"));
    }

    #[test]
    fn test_strip_envelope_passthrough_when_absent() {
        // A diagnostic or reformatted body is passed through untouched.
        let raw = "HTTP error 500: Internal Server Error";
        assert_eq!(strip_envelope(raw), raw);
    }

    #[tokio::test]
    async fn test_translate_html_batched() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/translateHtml")
                .header("Content-Type", "application/json+protobuf")
                .body_contains("te_lib");
            then.status(200)
                .body(batch_body(&format!("привет{SEPARATOR}мир")));
        });

        let translator = translator_for(&server);
        let html = translator.translate_html("<p>你好</p><p>世界</p>").await;

        mock.assert();
        assert_eq!(html, "<p>привет</p><p>мир</p>");
    }

    #[tokio::test]
    async fn test_translate_html_heading_and_break() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/translateHtml");
            then.status(200)
                .body(batch_body(&format!("Глава 1{SEPARATOR}{SEPARATOR}текст")));
        });

        let translator = translator_for(&server);
        let html = translator
            .translate_html("<h1>第一章</h1><br><p>正文</p>")
            .await;

        assert_eq!(html, "<h1>Глава 1</h1><br><p>текст</p>");
    }

    #[tokio::test]
    async fn test_translate_units_http_error_is_in_band() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/translateHtml");
            then.status(403).body("forbidden");
        });

        let translator = translator_for(&server);
        let units = segment("<p>一</p><p>二</p>");
        let translations = translator.translate_units(&units).await;

        assert_eq!(translations.len(), units.len());
        assert!(translations[0].contains("HTTP error 403"));
        assert!(translations[0].contains("Error body:forbidden"));
        assert_eq!(translations[1], "");
    }

    #[tokio::test]
    async fn test_translate_units_transport_error_is_in_band() {
        // Nothing listens on this port; the connection is refused.
        let endpoints = EndpointConfig {
            batch_url: "http://127.0.0.1:9/v1/translateHtml".to_string(),
            ..EndpointConfig::default()
        };
        let translator = Translator::new(endpoints, TranslationConfig::default());

        let units = segment("<p>一</p>");
        let translations = translator.translate_units(&units).await;

        assert!(translations[0].starts_with("Fetch failed:"));
    }

    #[tokio::test]
    async fn test_translate_units_count_mismatch_pads_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/translateHtml");
            then.status(200).body(batch_body("только одно поле"));
        });

        let translator = translator_for(&server);
        let units = segment("<p>一</p><p>二</p><p>三</p>");
        let translations = translator.translate_units(&units).await;

        assert_eq!(
            translations,
            vec!["только одно поле".to_string(), String::new(), String::new()]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(500);
        });

        let translator = translator_for(&server);
        assert_eq!(translator.translate_html("").await, "");
        assert_eq!(translator.translate_html("你").await, "你");
        assert_eq!(translator.translate_text("").await, "");
        assert_eq!(translator.translate_text("x").await, "x");

        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn test_translate_text_legacy_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/translate_a/single")
                .query_param("client", "gtx")
                .query_param("tl", "ru");
            then.status(200)
                .body(r#"[[["перевод","原文",null],["текста","文字",null]]]"#);
        });

        let translator = translator_for(&server);
        let html = translator.translate_text("<p>原文文字</p>").await;

        mock.assert();
        assert_eq!(html, "<p>переводтекста</p>");
    }

    #[tokio::test]
    async fn test_translate_text_one_request_per_chunk() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/translate_a/single");
            then.status(200).body(r#"[[["ok",null,null]]]"#);
        });

        let endpoints = EndpointConfig {
            legacy_url: server.url("/translate_a/single"),
            ..EndpointConfig::default()
        };
        let mut config = TranslationConfig::default();
        config.request_delay_ms = 0;
        config.max_chunk_size = 10;
        let translator = Translator::new(endpoints, config);

        // Three paragraphs, each its own chunk under the tiny cap.
        let html = translator
            .translate_text("<p>一二三四五六。</p><p>七八九十一二。</p><p>三四五六七八。</p>")
            .await;

        assert_eq!(mock.hits(), 3);
        assert_eq!(html, "<p>ok</p>\n<p>ok</p>\n<p>ok</p>");
    }

    #[tokio::test]
    async fn test_translate_text_malformed_response_is_in_band() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/translate_a/single");
            then.status(200).body("not json at all");
        });

        let translator = translator_for(&server);
        let html = translator.translate_text("<p>原文文字</p>").await;

        assert!(html.starts_with("<p>Unexpected response:"));
    }

    #[tokio::test]
    async fn test_translate_html_empty_segmentation() {
        // Markers but no text: nothing to send, nothing rendered.
        let translator = Translator::with_defaults();
        assert_eq!(translator.translate_html("<p></p><p> </p>").await, "");
    }
}
