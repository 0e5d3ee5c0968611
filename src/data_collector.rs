use anyhow::Context;
use futures::{stream, StreamExt};
use log::{error, info, warn};
use scraper::Html;

use crate::{
    api::ListingClient,
    config::{PagingConfig, ScrapeConfig},
    parser,
    schema::Record,
};

/// Offsets of every listing page, in ranking order.
pub fn page_offsets(paging: &PagingConfig) -> Vec<u32> {
    (0..paging.total)
        .step_by(paging.page_size.max(1) as usize)
        .collect()
}

/// Fetches every page and returns all records in page order, then item order.
pub async fn collect(client: &ListingClient, config: &ScrapeConfig) -> anyhow::Result<Vec<Record>> {
    let offsets = page_offsets(&config.paging);
    info!(
        "Fetching {} pages ({} in flight at most)",
        offsets.len(),
        config.paging.concurrency.max(1)
    );

    // `buffered` yields in input order regardless of completion order.
    let mut pages = stream::iter(offsets)
        .map(|offset| async move { (offset, client.fetch(client.page_url(offset)).await) })
        .buffered(config.paging.concurrency.max(1));

    let mut records = vec![];
    let mut missing = vec![];
    while let Some((offset, body)) = pages.next().await {
        if body.is_empty() {
            missing.push(offset);
        }
        records.extend(records_from_page(offset, &body, config.skip_malformed)?);
    }
    if !missing.is_empty() {
        error!("{} pages could not be fetched (offsets {missing:?})", missing.len());
    }
    info!("Collected {} records", records.len());
    Ok(records)
}

pub fn records_from_page(
    offset: u32,
    body: &str,
    skip_malformed: bool,
) -> anyhow::Result<Vec<Record>> {
    if body.is_empty() {
        warn!("Page at offset {offset} could not be fetched; skipping it.");
        return Ok(vec![]);
    }
    let html = Html::parse_document(body);
    let records = if skip_malformed {
        let (records, errors) = parser::parse_lenient(&html);
        for e in errors {
            warn!("Skipped a malformed entry on page at offset {offset}: {e:#}");
        }
        records
    } else {
        parser::parse(&html).with_context(|| format!("While parsing page at offset {offset}"))?
    };
    if records.is_empty() {
        warn!("No entries found on page at offset {offset}");
    } else {
        info!("Page at offset {offset}: {} entries", records.len());
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use itertools::Itertools;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        time::sleep,
    };

    use super::{collect, page_offsets, records_from_page};
    use crate::{
        api::ListingClient,
        config::{FetchConfig, PagingConfig, ScrapeConfig},
    };

    const PAGE: &str = r#"<html><body><ol>
<li><div class="item">
    <a href="https://x/1"><img src="https://y/1.jpg"></a>
    <span class="title">A</span>
    <p class="">导演: X</p>
    <span class="rating_num">9.0</span><span>10人评价</span>
</div></li>
<li><div class="item">
    <a href="https://x/2"><img src="https://y/2.jpg"></a>
    <p class="">导演: Y</p>
    <span class="rating_num">8.0</span><span>20人评价</span>
</div></li>
</ol></body></html>"#;

    #[test]
    fn test_page_offsets() {
        let paging = PagingConfig::default();
        let offsets = page_offsets(&paging);
        assert_eq!(offsets.len(), 10);
        assert_eq!(offsets[..3], [0, 25, 50]);
        assert_eq!(offsets.last(), Some(&225));

        let paging = PagingConfig {
            page_size: 50,
            total: 120,
            ..Default::default()
        };
        assert_eq!(page_offsets(&paging), [0, 50, 100]);
    }

    #[test]
    fn test_empty_body_is_skipped() {
        assert!(records_from_page(0, "", false).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_entry_handling() {
        // The second entry has no title.
        let error = records_from_page(25, PAGE, false).unwrap_err();
        assert!(format!("{error:#}").contains("offset 25"));

        let records = records_from_page(25, PAGE, true).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].detail_link(), "https://x/1");
    }

    fn listing_page(offset: u32) -> String {
        (0..2)
            .map(|i| {
                format!(
                    r#"<li><div class="item">
    <a href="https://x/{offset}-{i}"><img src="https://y/{offset}-{i}.jpg"></a>
    <span class="title">T{offset}-{i}</span>
    <p class="">导演: X</p>
    <span class="rating_num">9.0</span><span>10人评价</span>
</div></li>"#
                )
            })
            .join("")
    }

    /// Serves listing pages keyed by `start`.  Earlier pages answer later, and
    /// the page at `failing_offset` answers with a server error.
    async fn serve_listing(failing_offset: Option<u32>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/top250", listener.local_addr().unwrap());
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buffer = [0u8; 1024];
                    while !request.ends_with(b"\r\n\r\n") {
                        let n = socket.read(&mut buffer).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buffer[..n]);
                    }
                    let request = String::from_utf8(request).unwrap();
                    let offset: u32 = regex!(r"start=(\d+)").captures(&request).unwrap()[1]
                        .parse()
                        .unwrap();
                    sleep(Duration::from_millis(u64::from(100 - offset))).await;
                    let (status_line, body) = if Some(offset) == failing_offset {
                        ("HTTP/1.1 500 Internal Server Error", String::new())
                    } else {
                        ("HTTP/1.1 200 OK", listing_page(offset))
                    };
                    let response = format!(
                        "{status_line}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.unwrap();
                });
            }
        });
        url
    }

    fn scrape_config(url: &str, concurrency: usize) -> ScrapeConfig {
        ScrapeConfig {
            fetch: FetchConfig {
                base_url: url.parse().unwrap(),
                ..Default::default()
            },
            paging: PagingConfig {
                page_size: 25,
                total: 75,
                concurrency,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_collect_keeps_page_then_item_order() {
        let url = serve_listing(None).await;
        let expected = ["0-0", "0-1", "25-0", "25-1", "50-0", "50-1"]
            .map(|key| format!("https://x/{key}"));
        for concurrency in [1, 3] {
            let config = scrape_config(&url, concurrency);
            let client = ListingClient::new(&config.fetch).unwrap();
            let records = collect(&client, &config).await.unwrap();
            let links = records.iter().map(|r| r.detail_link().as_str()).collect_vec();
            assert_eq!(links, expected, "concurrency = {concurrency}");
        }
    }

    #[tokio::test]
    async fn test_collect_skips_failed_page() {
        let url = serve_listing(Some(25)).await;
        for concurrency in [1, 3] {
            let config = scrape_config(&url, concurrency);
            let client = ListingClient::new(&config.fetch).unwrap();
            let records = collect(&client, &config).await.unwrap();
            let links = records.iter().map(|r| r.detail_link().as_str()).collect_vec();
            assert_eq!(
                links,
                ["https://x/0-0", "https://x/0-1", "https://x/50-0", "https://x/50-1"],
                "concurrency = {concurrency}"
            );
        }
    }
}
