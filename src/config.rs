pub const DEFAULT_MAIN_URL: &str = "https://vibemax.to";
pub const DEFAULT_EMBED_URL: &str = "https://www.zxcstream.xyz";

pub const UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0 Safari/537.36";

/// Catalog sections listed on the main page, as `(path, name)`.
pub const SECTIONS: [(&str, &str); 3] = [
    ("/movies", "Movies"),
    ("/tv-shows", "TV Shows"),
    ("/anime", "Anime"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub main_url: String,
    pub embed_url: String,
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_urls(DEFAULT_MAIN_URL, DEFAULT_EMBED_URL)
    }
}

impl Config {
    /// Reads `VIBEMAX_BASE`, `VIBEMAX_EMBED_BASE` and `VIBEMAX_HTTP_PROXY`.
    pub fn from_env() -> Self {
        let main_url = std::env::var("VIBEMAX_BASE").unwrap_or_else(|_| DEFAULT_MAIN_URL.to_string());
        let embed_url = std::env::var("VIBEMAX_EMBED_BASE").unwrap_or_else(|_| DEFAULT_EMBED_URL.to_string());
        let mut config = Self::with_urls(&main_url, &embed_url);
        config.proxy = std::env::var("VIBEMAX_HTTP_PROXY").ok().filter(|s| !s.trim().is_empty());
        config
    }

    pub fn with_urls(main_url: &str, embed_url: &str) -> Self {
        Self {
            main_url: main_url.trim().trim_end_matches('/').to_string(),
            embed_url: embed_url.trim().trim_end_matches('/').to_string(),
            proxy: None,
            user_agent: UA.to_string(),
        }
    }

    /// Absolute URL for a site path; absolute inputs pass through.
    pub fn resolve(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}/{}", self.main_url, href.trim_start_matches('/'))
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.main_url, urlencoding::encode(query))
    }
}
