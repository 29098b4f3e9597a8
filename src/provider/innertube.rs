//! Catalog backed by the YouTube Music InnerTube api.
//!
//! The api answers with deeply nested renderer trees. Everything below
//! walks them with json pointers and keeps only what the radio needs.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{
    blocking::Client,
    header::{ORIGIN, REFERER},
};
use serde_json::{Value, json};

use crate::{
    config::CatalogConfig,
    domain::video_id::VideoId,
    provider::{
        catalog::{Catalog, CatalogEntry, Lyrics, ResultType, WatchContext},
        error::ProviderError,
    },
};

const MUSIC_ORIGIN: &str = "https://music.youtube.com";
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20241023.01.00";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// search params selecting the "songs" filter
const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

const ARTIST_PAGE_TYPES: &[&str] = &["MUSIC_PAGE_TYPE_ARTIST", "MUSIC_PAGE_TYPE_USER_CHANNEL"];

const WATCH_ENDPOINT_VIDEO_TYPE: &str =
    "/watchEndpointMusicSupportedConfigs/watchEndpointMusicConfig/musicVideoType";

pub struct InnertubeClient {
    http: Client,
    base_url: String,
    language: String,
    search_limit: usize,
}

impl InnertubeClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            search_limit: config.search_limit,
        })
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "hl": self.language,
            },
            "user": {},
        })
    }

    fn post(
        &self,
        endpoint: &str,
        mut body: Value,
        query: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("context".to_string(), self.context());
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .query(&[("alt", "json"), ("prettyPrint", "false")])
            .query(query)
            .header(ORIGIN, MUSIC_ORIGIN)
            .header(REFERER, format!("{MUSIC_ORIGIN}/"))
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        Ok(response.json()?)
    }
}

impl Catalog for InnertubeClient {
    fn search_songs(&self, query: &str) -> Result<Vec<CatalogEntry>, ProviderError> {
        let body = json!({ "query": query, "params": SONGS_FILTER_PARAMS });
        // the songs filter decides the type, whatever the items say
        collect_search_results(self.search_limit, Some(ResultType::Song), |token| match token {
            None => self.post("search", body.clone(), &[]),
            Some(token) => self.post(
                "search",
                body.clone(),
                &[("ctoken", token), ("continuation", token), ("type", "next")],
            ),
        })
    }

    fn suggestions(&self, query: &str) -> Result<Vec<String>, ProviderError> {
        let response = self.post("music/get_search_suggestions", json!({ "input": query }), &[])?;
        Ok(parse_suggestions(&response))
    }

    fn watch_context(&self, video_id: &VideoId) -> Result<WatchContext, ProviderError> {
        let body = json!({
            "videoId": video_id.as_str(),
            "playlistId": format!("RDAMVM{video_id}"),
            "isAudioOnly": true,
            "enablePersistentPlaylistPanel": true,
            "tunerSettingValue": "AUTOMIX_SETTING_NORMAL",
            "watchEndpointMusicSupportedConfigs": {
                "watchEndpointMusicConfig": {
                    "hasPersistentPlaylistPanel": true,
                    "musicVideoType": "MUSIC_VIDEO_TYPE_ATV",
                }
            },
        });
        let response = self.post("next", body, &[])?;
        parse_watch_context(&response)
    }

    fn lyrics(&self, browse_id: &str) -> Result<Option<Lyrics>, ProviderError> {
        let response = self.post("browse", json!({ "browseId": browse_id }), &[])?;
        Ok(parse_lyrics(&response))
    }
}

/// Gathers search results across continuation pages until `limit` is reached.
///
/// `fetch` is called with `None` for the first page and with the continuation
/// token for every page after it. An empty continuation page ends the search.
fn collect_search_results<F>(
    limit: usize,
    shelf_type: Option<ResultType>,
    mut fetch: F,
) -> Result<Vec<CatalogEntry>, ProviderError>
where
    F: FnMut(Option<&str>) -> Result<Value, ProviderError>,
{
    let mut page = parse_search_page(&fetch(None)?, shelf_type)?;
    let mut results = std::mem::take(&mut page.entries);

    while results.len() < limit {
        let Some(token) = page.continuation.take() else {
            break;
        };
        page = parse_search_continuation(&fetch(Some(token.as_str()))?, shelf_type);
        if page.entries.is_empty() {
            break;
        }
        results.append(&mut page.entries);
    }

    results.truncate(limit);
    Ok(results)
}

#[derive(Debug, Default)]
struct SearchPage {
    entries: Vec<CatalogEntry>,
    continuation: Option<String>,
}

fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

/// `shelf_type`, when given, types every item of the shelf; otherwise each
/// item's music video type marker does.
fn parse_search_page(
    response: &Value,
    shelf_type: Option<ResultType>,
) -> Result<SearchPage, ProviderError> {
    let sections = response
        .pointer("/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents")
        .or_else(|| response.pointer("/contents/sectionListRenderer/contents"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::UnexpectedResponse("search response has no result sections".into())
        })?;

    let mut page = SearchPage::default();
    for shelf in sections.iter().filter_map(|s| s.get("musicShelfRenderer")) {
        page.entries.extend(parse_shelf_items(shelf, shelf_type));
        if page.continuation.is_none() {
            page.continuation = shelf_continuation(shelf);
        }
    }

    Ok(page)
}

fn parse_search_continuation(response: &Value, shelf_type: Option<ResultType>) -> SearchPage {
    match response.pointer("/continuationContents/musicShelfContinuation") {
        Some(shelf) => SearchPage {
            entries: parse_shelf_items(shelf, shelf_type),
            continuation: shelf_continuation(shelf),
        },
        None => SearchPage::default(),
    }
}

fn shelf_continuation(shelf: &Value) -> Option<String> {
    text_at(shelf, "/continuations/0/nextContinuationData/continuation").map(str::to_string)
}

fn parse_shelf_items(shelf: &Value, shelf_type: Option<ResultType>) -> Vec<CatalogEntry> {
    shelf
        .get("contents")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
                .filter_map(|item| parse_list_item(item, shelf_type))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_list_item(item: &Value, shelf_type: Option<ResultType>) -> Option<CatalogEntry> {
    let title_run =
        item.pointer("/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0")?;
    let title = text_at(title_run, "/text")?.to_string();

    let play_endpoint = item.pointer(
        "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint",
    );
    let title_endpoint = title_run.pointer("/navigationEndpoint/watchEndpoint");

    let raw_id = text_at(item, "/playlistItemData/videoId")
        .or_else(|| title_endpoint.and_then(|e| text_at(e, "/videoId")))
        .or_else(|| play_endpoint.and_then(|e| text_at(e, "/videoId")))?;

    let video_id = match VideoId::parse(raw_id) {
        Ok(id) => id,
        Err(e) => {
            warn!("Skipping search result: {e}");
            return None;
        }
    };

    let result_type = shelf_type.unwrap_or_else(|| {
        let video_type = title_endpoint
            .and_then(|e| text_at(e, WATCH_ENDPOINT_VIDEO_TYPE))
            .or_else(|| play_endpoint.and_then(|e| text_at(e, WATCH_ENDPOINT_VIDEO_TYPE)));
        ResultType::from_music_video_type(video_type)
    });

    let artists = item
        .pointer("/flexColumns/1/musicResponsiveListItemFlexColumnRenderer/text/runs")
        .map(artists_from_runs)
        .unwrap_or_default();

    Some(CatalogEntry {
        result_type,
        video_id,
        title,
        artists,
    })
}

/// Picks artist names out of a byline.
///
/// Runs linking to an artist page win; bylines without links fall back to the first run.
fn artists_from_runs(runs: &Value) -> Vec<String> {
    let Some(runs) = runs.as_array() else {
        return Vec::new();
    };

    let linked = runs
        .iter()
        .filter(|run| {
            text_at(
                run,
                "/navigationEndpoint/browseEndpoint/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType",
            )
            .is_some_and(|page_type| ARTIST_PAGE_TYPES.contains(&page_type))
        })
        .filter_map(|run| text_at(run, "/text"))
        .map(str::to_string)
        .collect::<Vec<_>>();

    if !linked.is_empty() {
        return linked;
    }

    runs.first()
        .and_then(|run| text_at(run, "/text"))
        .map(|text| vec![text.to_string()])
        .unwrap_or_default()
}

fn parse_suggestions(response: &Value) -> Vec<String> {
    response
        .pointer("/contents/0/searchSuggestionsSectionRenderer/contents")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.pointer("/searchSuggestionRenderer/suggestion/runs"))
                .filter_map(Value::as_array)
                .map(|runs| {
                    runs.iter()
                        .filter_map(|run| text_at(run, "/text"))
                        .collect::<String>()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_watch_context(response: &Value) -> Result<WatchContext, ProviderError> {
    let tabs = response
        .pointer("/contents/singleColumnMusicWatchNextResultsRenderer/tabbedRenderer/watchNextTabbedResultsRenderer/tabs")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::UnexpectedResponse("watch response has no tabs".into())
        })?;

    let tracks = tabs
        .first()
        .and_then(|tab| {
            tab.pointer("/tabRenderer/content/musicQueueRenderer/content/playlistPanelRenderer/contents")
        })
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_queue_item).collect())
        .unwrap_or_default();

    let lyrics_browse_id = tabs
        .get(1)
        .and_then(|tab| tab.get("tabRenderer"))
        .filter(|tab| tab.get("unselectable").is_none())
        .and_then(|tab| text_at(tab, "/endpoint/browseEndpoint/browseId"))
        .map(str::to_string);

    Ok(WatchContext {
        tracks,
        lyrics_browse_id,
    })
}

fn parse_queue_item(item: &Value) -> Option<CatalogEntry> {
    let renderer = item
        .get("playlistPanelVideoRenderer")
        .or_else(|| item.pointer("/playlistPanelVideoWrapperRenderer/primaryRenderer/playlistPanelVideoRenderer"))?;

    let video_id = VideoId::parse(text_at(renderer, "/videoId")?).ok()?;
    let title = text_at(renderer, "/title/runs/0/text")?.to_string();
    let artists = renderer
        .pointer("/longBylineText/runs")
        .map(artists_from_runs)
        .unwrap_or_default();
    let video_type = renderer
        .pointer("/navigationEndpoint/watchEndpoint")
        .and_then(|e| text_at(e, WATCH_ENDPOINT_VIDEO_TYPE));

    Some(CatalogEntry {
        result_type: ResultType::from_music_video_type(video_type),
        video_id,
        title,
        artists,
    })
}

fn parse_lyrics(response: &Value) -> Option<Lyrics> {
    let text = response
        .pointer("/contents/sectionListRenderer/contents/0/musicDescriptionShelfRenderer")?
        .pointer("/description/runs")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|run| text_at(run, "/text"))
        .collect::<String>();

    if text.is_empty() {
        return None;
    }

    Some(Lyrics { text })
}
