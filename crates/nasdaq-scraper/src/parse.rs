use prodigal_core::{CompanyPage, NewsItem, ProdigalError};
use scraper::{ElementRef, Html, Selector};

/// Length of the " Common Stock Quote & Summary Data" boilerplate that the
/// page header appends to every company name.
pub const HEADER_SUFFIX_LEN: usize = 34;

const HEADER_SELECTOR: &str = "div#qwidget_pageheader h1";
const NEWS_SELECTOR: &str = "div#CompanyNewsCommentary";
const DESCRIPTION_SELECTOR: &str = "div#company-description";

fn selector(css: &str) -> Result<Selector, ProdigalError> {
    Selector::parse(css)
        .map_err(|e| ProdigalError::InvalidData(format!("bad selector {css:?}: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Extract name, news and description from a listing page.
///
/// Returns `Ok(None)` when the page header is missing, which is how the site
/// answers for tickers it does not list. A page without a news section yields
/// no news; a page without a description section yields `description: None`.
pub fn parse_company_page(html: &str) -> Result<Option<CompanyPage>, ProdigalError> {
    let document = Html::parse_document(html);

    let Some(header) = document.select(&selector(HEADER_SELECTOR)?).next() else {
        return Ok(None);
    };
    let company_name = strip_header_suffix(&element_text(header));

    let li = selector("li")?;
    let a = selector("a")?;
    let news = match document.select(&selector(NEWS_SELECTOR)?).next() {
        Some(container) => container
            .select(&li)
            .filter_map(|item| {
                let anchor = item.select(&a).next()?;
                let link = anchor.value().attr("href")?;
                Some(NewsItem {
                    headline: element_text(anchor).trim().to_string(),
                    link: link.to_string(),
                })
            })
            .collect(),
        None => Vec::new(),
    };

    let p = selector("p")?;
    let description = document
        .select(&selector(DESCRIPTION_SELECTOR)?)
        .next()
        .map(|container| {
            container
                .select(&p)
                .map(|para| element_text(para).trim().to_string())
                .collect::<Vec<_>>()
        });

    Ok(Some(CompanyPage {
        company_name,
        news,
        description,
    }))
}

fn strip_header_suffix(raw: &str) -> String {
    let keep = raw.chars().count().saturating_sub(HEADER_SUFFIX_LEN);
    raw.chars().take(keep).collect::<String>().trim().to_string()
}
