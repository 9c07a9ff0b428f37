//! Video transcript client.
//!
//! Fetches the timed-text track for a video and flattens it into a single
//! transcript string.

use async_trait::async_trait;
use mcpgate_config::YoutubeConfig;
use mcpgate_core::client::parse_parameters;
use mcpgate_core::{CapabilityClient, ClientError, McpResponse, Parameters};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, send_text};

pub struct YoutubeTranscriptClient {
    base_url: String,
    default_lang: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GetTranscript {
    url: String,
    #[serde(default)]
    lang: Option<String>,
}

impl YoutubeTranscriptClient {
    pub fn new(config: &YoutubeConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_lang: config.default_lang.clone(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    async fn get_transcript(&self, params: GetTranscript) -> Result<McpResponse, ClientError> {
        let video_id = video_id(&params.url).ok_or_else(|| {
            ClientError::InvalidParameters(format!(
                "get_transcript: cannot find a video id in '{}'",
                params.url
            ))
        })?;
        let lang = params
            .lang
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.default_lang.clone());

        debug!(video_id = %video_id, lang = %lang, "Fetching transcript");
        let request = self
            .client
            .get(format!("{}/api/timedtext", self.base_url))
            .query(&[("v", video_id.as_str()), ("lang", lang.as_str())]);
        let body = send_text("get_transcript", request, self.timeout).await?;

        let transcript = parse_timedtext(&body);
        if transcript.is_empty() {
            return Err(ClientError::Backend {
                status_code: 404,
                message: format!("no '{lang}' transcript available for video {video_id}"),
            });
        }

        Ok(McpResponse::new()
            .with("transcript", transcript)
            .with("language", lang)
            .with("video_id", video_id))
    }
}

#[async_trait]
impl CapabilityClient for YoutubeTranscriptClient {
    fn service(&self) -> &str {
        "youtube"
    }

    fn operations(&self) -> &[&'static str] {
        &["get_transcript"]
    }

    async fn invoke(
        &self,
        action: &str,
        parameters: &Parameters,
    ) -> Result<McpResponse, ClientError> {
        match action {
            "get_transcript" => self.get_transcript(parse_parameters(action, parameters)?).await,
            _ => Err(self.unsupported(action)),
        }
    }
}

/// Extract the 11-character video id from a watch URL, short link, embed
/// URL, or a bare id.
pub fn video_id(input: &str) -> Option<String> {
    let input = input.trim();
    let candidate = if let Some((_, rest)) = input.split_once("youtu.be/") {
        rest
    } else if let Some((_, rest)) = input.split_once("v=") {
        rest
    } else if let Some((_, rest)) = input
        .split_once("/embed/")
        .or_else(|| input.split_once("/shorts/"))
    {
        rest
    } else {
        input
    };

    let id: String = candidate
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    (id.len() == 11).then_some(id)
}

/// Join the `<text>` nodes of a timed-text XML document.
fn parse_timedtext(xml: &str) -> String {
    let mut lines = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<text") {
        let after_tag = &rest[start..];
        let Some(open_end) = after_tag.find('>') else {
            break;
        };
        let content = &after_tag[open_end + 1..];
        let Some(close) = content.find("</text>") else {
            break;
        };
        let line = decode_entities(content[..close].trim());
        if !line.is_empty() {
            lines.push(line);
        }
        rest = &content[close + "</text>".len()..];
    }
    lines.join(" ")
}

/// Decode the named XML entities plus decimal and hex character references
/// in one pass. Unknown or malformed references are kept as written.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out.replace('\n', " ")
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
