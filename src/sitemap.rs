use std::fmt::Display;
use std::io::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{error, info};
use url::Url;

use crate::error::{PortfolioError, Result};
use crate::model::{ListOptions, PortfolioItem};
use crate::notion::ContentSource;
use crate::portfolio::{parse_timestamp, Portfolio};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

struct Route {
    loc: String,
    lastmod: String,
    changefreq: &'static str,
    priority: &'static str,
}

/// Fetch the listing and render sitemap.xml. A failed listing still yields
/// the static pages.
pub async fn generate<S: ContentSource>(portfolio: &Portfolio<S>, base_url: &str) -> Result<String> {
    let items = match portfolio.list_all(&ListOptions::default()).await {
        Ok(items) => items,
        Err(e) => {
            error!("Sitemap listing failed, writing static routes only: {}", e);
            Vec::new()
        }
    };
    info!("Sitemap: {} portfolio entries", items.len());
    build(base_url, &items, Utc::now())
}

pub fn build(base_url: &str, items: &[PortfolioItem], now: DateTime<Utc>) -> Result<String> {
    let base = Url::parse(base_url)?;
    let now_str = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut routes = vec![
        Route { loc: page_url(&base, &[])?, lastmod: now_str.clone(), changefreq: "daily", priority: "1.0" },
        Route { loc: page_url(&base, &["portfolio"])?, lastmod: now_str.clone(), changefreq: "daily", priority: "0.8" },
        Route { loc: page_url(&base, &["about"])?, lastmod: now_str.clone(), changefreq: "monthly", priority: "0.5" },
    ];

    for item in items {
        routes.push(Route {
            loc: page_url(&base, &["portfolio", item.id.as_str()])?,
            lastmod: item_lastmod(item).unwrap_or_else(|| now_str.clone()),
            changefreq: "monthly",
            priority: "0.7",
        });
    }

    write_urlset(&routes)
}

fn page_url(base: &Url, segments: &[&str]) -> Result<String> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| PortfolioError::Sitemap(format!("base url cannot hold paths: {}", base)))?;
        path.pop_if_empty();
        for seg in segments {
            path.push(seg);
        }
    }
    let s = url.to_string();
    // Root keeps no trailing slash so it matches the configured site url.
    Ok(if segments.is_empty() { s.trim_end_matches('/').to_string() } else { s })
}

fn item_lastmod(item: &PortfolioItem) -> Option<String> {
    let completed = item.completed_at.as_deref()?;
    if let Ok(d) = NaiveDate::parse_from_str(completed.trim(), "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    let ms = parse_timestamp(completed)?;
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn xml_err(e: impl Display) -> PortfolioError {
    PortfolioError::Sitemap(e.to_string())
}

fn write_urlset(routes: &[Route]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None))).map_err(xml_err)?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset)).map_err(xml_err)?;

    for route in routes {
        writer.write_event(Event::Start(BytesStart::new("url"))).map_err(xml_err)?;
        write_text(&mut writer, "loc", &route.loc)?;
        write_text(&mut writer, "lastmod", &route.lastmod)?;
        write_text(&mut writer, "changefreq", route.changefreq)?;
        write_text(&mut writer, "priority", route.priority)?;
        writer.write_event(Event::End(BytesEnd::new("url"))).map_err(xml_err)?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset"))).map_err(xml_err)?;
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write_text<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_err)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_err)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)?;
    Ok(())
}
