use vibemax::{Config, ContentRef, MediaType, StreamLink, Vibemax};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn push_script(payload: &str) -> String {
    let escaped = payload.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"<script>self.__next_f.push([1,"{}"])</script>"#, escaped)
}

fn html_page(title: &str, body: &str) -> String {
    format!("<html><head><title>{}</title></head><body>{}</body></html>", title, body)
}

fn movie_obj(id: u32) -> String {
    format!(
        r#"{{"id":{},"title":"Movie {}","media_type":"movie","poster_path":"/p{}.jpg","release_date":"2019-05-01","vote_average":7.1}}"#,
        id, id, id
    )
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn provider(server: &MockServer) -> Vibemax {
    Vibemax::new(Config::with_urls(&server.uri(), &server.uri())).unwrap()
}

#[tokio::test]
async fn catalog_section_reads_payload_and_caps() {
    let server = MockServer::start().await;
    let payload: String = (1..=25).map(movie_obj).chain([movie_obj(1)]).collect();
    serve(&server, "/movies", html_page("Movies - Vibemax", &push_script(&payload))).await;

    let items = provider(&server).list_catalog_section("/movies").await.unwrap();
    assert_eq!(items.len(), 20);
    assert_eq!(items[0].external_id, "1");
    assert_eq!(items[0].title, "Movie 1");
    assert_eq!(items[0].year, Some(2019));
    assert_eq!(items[0].rating, Some(7.1));
}

#[tokio::test]
async fn search_falls_back_to_cards_and_is_uncapped() {
    let server = MockServer::start().await;
    let cards: String = (1..=25)
        .map(|i| {
            format!(
                r#"<div role="button" aria-label="Show {i}"><a href="/tv/{i}"><img data-nimg="1" src="https://image.tmdb.org/t/p/w500/s{i}.jpg"></a><span>2021</span></div>"#
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "star trek"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Search", &cards)))
        .mount(&server)
        .await;

    let items = provider(&server).search("star trek").await.unwrap();
    assert_eq!(items.len(), 25);
    assert!(items.iter().all(|i| i.media_type == MediaType::Series));
    assert_eq!(items[4].title, "Show 5");
    assert_eq!(items[4].year, Some(2021));
}

#[tokio::test]
async fn empty_page_is_an_empty_listing() {
    let server = MockServer::start().await;
    serve(&server, "/anime", html_page("Anime", "<p>nothing here</p>")).await;
    let items = provider(&server).list_catalog_section("/anime").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn error_status_listing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(503).set_body_string(html_page("Unavailable", "")))
        .mount(&server)
        .await;

    let vm = provider(&server);
    assert!(vm.list_catalog_section("/movies").await.unwrap().is_empty());
    assert!(vm.search("x").await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_host_is_an_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);
    let vm = Vibemax::new(Config::with_urls(&base, &base)).unwrap();
    assert!(vm.list_catalog_section("/movies").await.is_err());
    assert!(vm.load_detail(&ContentRef::parse("603|movie").unwrap()).await.is_err());
}

#[tokio::test]
async fn main_page_skips_empty_sections() {
    let server = MockServer::start().await;
    serve(&server, "/movies", html_page("Movies", &push_script(&movie_obj(3)))).await;
    let sections = provider(&server).main_page().await;
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].0, "Movies");
}

#[tokio::test]
async fn movie_detail_has_no_episodes() {
    let server = MockServer::start().await;
    let payload = r#"{"id":603,"title":"The Matrix","overview":"Neo.","backdrop_path":"/bg.jpg","release_date":"1999-03-30","vote_average":8.2,"number_of_seasons":3}"#;
    serve(&server, "/watch/movie/603", html_page("The Matrix - Vibemax", &push_script(payload))).await;

    let detail = provider(&server).load_detail(&ContentRef::parse("603|movie").unwrap()).await.unwrap();
    assert_eq!(detail.item.title, "The Matrix");
    assert_eq!(detail.item.year, Some(1999));
    assert_eq!(detail.item.backdrop_url().as_deref(), Some("https://image.tmdb.org/t/p/original/bg.jpg"));
    assert_eq!(detail.url, format!("{}/watch/movie/603", server.uri()));
    assert!(detail.episodes.is_empty());
}

#[tokio::test]
async fn series_detail_builds_clamped_grid_and_is_stable() {
    let server = MockServer::start().await;
    let payload = r#"{"id":1396,"name":"Breaking Bad","first_air_date":"2008-01-20","number_of_seasons":5,"number_of_episodes":500}"#;
    serve(&server, "/watch/tv/1396", html_page("Breaking Bad - Vibemax", &push_script(payload))).await;

    let vm = provider(&server);
    let content = ContentRef::parse("1396|tv").unwrap();
    let first = vm.load_detail(&content).await.unwrap();
    assert_eq!(first.item.title, "Breaking Bad");
    assert_eq!(first.item.year, Some(2008));
    assert_eq!(first.episodes.len(), 150);
    assert!(first.episodes.iter().all(|e| e.episode <= 30 && e.season <= 5));
    assert_eq!(first.episodes[31].data, "1396|tv|2|2");

    let second = vm.load_detail(&content).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn series_without_counts_gets_one_season_of_ten() {
    let server = MockServer::start().await;
    serve(&server, "/watch/tv/42", html_page("Mystery Show - Vibemax", "")).await;

    let detail = provider(&server).load_detail(&ContentRef::new("42", MediaType::Series)).await.unwrap();
    assert_eq!(detail.item.title, "Mystery Show");
    assert_eq!(detail.episodes.len(), 10);
    assert!(detail.episodes.iter().all(|e| e.season == 1));
}

#[tokio::test]
async fn not_found_detail_still_loads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let vm = provider(&server);
    let detail = vm.load_detail(&ContentRef::parse("603|movie").unwrap()).await.unwrap();
    assert_eq!(detail.item.title, "Unknown");
    assert_eq!(detail.item.external_id, "603");
    assert!(detail.episodes.is_empty());

    let series = vm.load_detail(&ContentRef::parse("1396|tv").unwrap()).await.unwrap();
    assert_eq!(series.item.title, "Unknown");
    assert_eq!(series.episodes.len(), 10);
}

#[tokio::test]
async fn error_page_title_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch/movie/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string(html_page("Lost Film - Vibemax", "")))
        .mount(&server)
        .await;

    let detail = provider(&server).load_detail(&ContentRef::new("9", MediaType::Movie)).await.unwrap();
    assert_eq!(detail.item.title, "Lost Film");
}

async fn collect_links(vm: &Vibemax, content: &ContentRef) -> (bool, Vec<StreamLink>) {
    let mut links = Vec::new();
    let ok = vm.resolve_links(content, |l| links.push(l)).await;
    (ok, links)
}

#[tokio::test]
async fn links_always_include_three_direct_embeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let vm = provider(&server);
    let (ok, links) = collect_links(&vm, &ContentRef::parse("603|movie").unwrap()).await;
    assert!(ok);
    assert_eq!(links.len(), 3);
    for (i, link) in links.iter().enumerate() {
        assert_eq!(link.url, format!("{}/player/movie/603?autoplay=true&server={}", server.uri(), i));
        assert_eq!(link.source_label, format!("Vibemax - Server {}", i + 1));
        assert_eq!(link.referer, server.uri());
    }
}

#[tokio::test]
async fn links_scan_embed_pages_and_isolate_failures() {
    let server = MockServer::start().await;
    let embed = r#"<script>player.setup({"file":"https:\/\/cdn.test\/hls\/1080p\/master.m3u8"}); var dl = "https://cdn.test/files/b.mp4";</script>"#;
    Mock::given(method("GET"))
        .and(path("/player/tv/1396/2/3"))
        .and(query_param("server", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(embed))
        .mount(&server)
        .await;

    let vm = provider(&server);
    let content = ContentRef::parse("1396|tv|2|3").unwrap();
    let (ok, links) = collect_links(&vm, &content).await;
    assert!(ok);

    let direct: Vec<_> = links.iter().filter(|l| l.url.contains("autoplay=true")).collect();
    assert_eq!(direct.len(), 3);
    assert!(links[0].url.ends_with("server=0"));
    assert!(links[1].url.ends_with("server=1"));
    assert!(links.last().unwrap().url.ends_with("server=2"));

    let scanned: Vec<_> = links.iter().filter(|l| !l.url.contains("autoplay=true")).collect();
    assert!(scanned.iter().all(|l| l.source_label.starts_with("Vibemax - Server 2")));
    assert!(scanned.iter().all(|l| !l.url.contains('\\')));
    assert!(scanned
        .iter()
        .any(|l| l.url == "https://cdn.test/hls/1080p/master.m3u8" && l.is_segmented_stream));
    assert!(scanned
        .iter()
        .any(|l| l.url == "https://cdn.test/files/b.mp4" && !l.is_segmented_stream));
}

#[tokio::test]
async fn stream_yields_direct_link_before_probing() {
    use futures::StreamExt;

    let server = MockServer::start().await;
    let vm = provider(&server);
    let content = ContentRef::new("7", MediaType::Movie);
    let stream = vm.stream_links(&content);
    futures::pin_mut!(stream);
    let first = stream.next().await.unwrap();
    assert!(first.url.ends_with("/player/movie/7?autoplay=true&server=0"));
    assert_eq!(stream.count().await, 2);
}
