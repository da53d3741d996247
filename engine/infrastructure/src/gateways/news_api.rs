use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_application::{NewsClient, ProviderError};
use engine_domain::{Provider, RawArticle};
use reqwest::Client;
use serde::Deserialize;
use shaku::Component;
use tracing::debug;

use super::http::get_text;

pub const NEWS_API_BASE_URL: &str = "https://newsapi.org/v2/everything";
pub const NEWS_PAGE_SIZE: &str = "20";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleDto {
    source: Option<SourceDto>,
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceDto {
    name: Option<String>,
}

#[derive(Component)]
#[shaku(interface = NewsClient)]
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    #[shaku(default = NEWS_API_BASE_URL.to_string())]
    base_url: String,
}

impl NewsApiClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: NEWS_API_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl NewsClient for NewsApiClient {
    fn provider(&self) -> Provider {
        Provider::NewsApi
    }

    async fn search(&self, query: &str) -> Result<Vec<RawArticle>, ProviderError> {
        let params = [
            ("q", query),
            ("language", "en"),
            ("sortBy", "publishedAt"),
            ("pageSize", NEWS_PAGE_SIZE),
            ("apiKey", self.api_key.as_str()),
        ];
        let body = get_text(
            &self.client,
            Provider::NewsApi,
            &self.base_url,
            &params,
            &self.api_key,
        )
        .await?;

        let articles = parse_articles(&body)?;
        debug!(count = articles.len(), "Fetched news articles");
        Ok(articles)
    }
}

pub(crate) fn parse_articles(body: &str) -> Result<Vec<RawArticle>, ProviderError> {
    let response: EverythingResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::empty(
            Provider::NewsApi,
            format!("Failed to parse articles: {}", e),
        )
    })?;

    if response.status.as_deref() == Some("error") {
        let message = match (response.code, response.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code,
            (None, Some(message)) => message,
            (None, None) => "unknown error".to_string(),
        };
        return Err(ProviderError::http(Provider::NewsApi, 400, message));
    }

    Ok(response.articles.into_iter().map(into_raw_article).collect())
}

fn into_raw_article(dto: ArticleDto) -> RawArticle {
    RawArticle {
        title: dto.title,
        description: dto.description,
        source: dto.source.and_then(|s| s.name),
        published_at: dto
            .published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc)),
    }
}
