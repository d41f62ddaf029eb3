use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;

const OMDB_ENDPOINT: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    pub year: String,
    pub reference: String,
}

impl TitleMatch {
    pub fn label(&self) -> String {
        if self.year.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.year)
        }
    }
}

pub trait TitleLookup {
    fn search(&self, title: &str) -> Result<Vec<TitleMatch>, AppError>;
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbHit>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbHit {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
}

pub struct OmdbLookup {
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl OmdbLookup {
    pub fn new(api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .build();
        Self { api_key, agent }
    }
}

impl TitleLookup for OmdbLookup {
    fn search(&self, title: &str) -> Result<Vec<TitleMatch>, AppError> {
        let Some(api_key) = self.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
            return Err(AppError::Lookup(
                "no OMDb API key configured (set OMDB_API_KEY or omdb_api_key)".to_string(),
            ));
        };
        let query = title.trim();
        if query.is_empty() {
            return Err(AppError::Lookup("nothing to search for".to_string()));
        }

        info!(query, "searching OMDb");
        let response = self
            .agent
            .get(OMDB_ENDPOINT)
            .query("s", query)
            .query("type", "movie")
            .query("apikey", api_key)
            .call();

        let body = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| AppError::Lookup(format!("reading response: {e}")))?,
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                warn!(code, "OMDb returned an error status");
                return Err(AppError::Lookup(format!("OMDb {code}: {text}")));
            }
            Err(err) => return Err(AppError::Lookup(format!("could not reach OMDb: {err}"))),
        };

        parse_search_response(&body)
    }
}

pub fn parse_search_response(body: &str) -> Result<Vec<TitleMatch>, AppError> {
    let parsed: OmdbSearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Lookup(format!("OMDb returned invalid JSON: {e}")))?;

    if !parsed.response.eq_ignore_ascii_case("true") {
        let reason = parsed.error.unwrap_or_else(|| "no results".to_string());
        return Err(AppError::Lookup(reason));
    }

    Ok(parsed
        .search
        .into_iter()
        .map(|hit| TitleMatch {
            title: hit.title.trim().to_string(),
            year: leading_year(&hit.year),
            reference: hit.imdb_id,
        })
        .collect())
}

/// "1999–2003" and "2019–" become "1999" and "2019".
pub fn leading_year(raw: &str) -> String {
    let digits: String = raw.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits
    } else {
        String::new()
    }
}
