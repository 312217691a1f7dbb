//! A [`ProductSource`] backed by one of the vendor's cart pages.
//!
//! Each product on the page is a `div.package` block:
//!
//! ```html
//! <div class="package">
//!   <h3 class="package-name">SLICE 1024</h3>
//!   <div class="price">$3.50 USD/mo</div>
//!   <div class="package-qty">3 Available</div>
//!   <div class="package-content"><ul><li>1 GB RAM</li><li>20 GB SSD</li></ul></div>
//!   <a class="btn btn-lg btn-primary" href="cart.php?a=add&pid=1422">Order Now</a>
//! </div>
//! ```
use log::*;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use stock_engine::{
    helpers::parse_quantity,
    stock_types::ProductRecord,
    traits::{ProductSource, SourceError},
};
use tokio::time::sleep;

use crate::{config::SourceConfig, errors::MonitorError};

pub const UNKNOWN_PRODUCT: &str = "Unknown product";
pub const UNKNOWN_PRICE: &str = "Price not provided";
pub const UNKNOWN_AVAILABILITY: &str = "Stock unknown";

#[derive(Debug, Clone)]
pub struct PageSelectors {
    title: Selector,
    package: Selector,
    name: Selector,
    price: Selector,
    quantity: Selector,
    link: Selector,
    feature_items: Selector,
    feature_paragraphs: Selector,
}

impl PageSelectors {
    pub fn new() -> Result<Self, MonitorError> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| MonitorError::InvalidSelector(format!("{s}: {e}")));
        Ok(Self {
            title: parse("title")?,
            package: parse("div.package")?,
            name: parse("h3.package-name")?,
            price: parse("div.price")?,
            quantity: parse("div.package-qty")?,
            link: parse("a.btn.btn-lg.btn-primary[href]")?,
            feature_items: parse("div.package-content li")?,
            feature_paragraphs: parse("div.package-content p")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VendorPageSource {
    url: String,
    config: SourceConfig,
    selectors: PageSelectors,
    client: Client,
}

impl VendorPageSource {
    pub fn new(url: &str, config: SourceConfig, client: Client) -> Result<Self, MonitorError> {
        let selectors = PageSelectors::new()?;
        Ok(Self { url: url.to_string(), config, selectors, client })
    }

    /// A client suitable for every page source, honouring the configured per-request timeout.
    pub fn http_client(config: &SourceConfig) -> Result<Client, MonitorError> {
        Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MonitorError::HttpClientInitialization(e.to_string()))
    }

    async fn fetch_page(&self) -> Result<String, SourceError> {
        let max_retries = self.config.max_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_fetch().await {
                Ok(html) => return Ok(html),
                Err(SourceError::Unreachable(e)) if attempt < max_retries => {
                    warn!("🌐️ [{}] Request failed ({attempt}/{max_retries}). Retrying. {e}", self.url);
                    sleep(self.config.retry_delay).await;
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self) -> Result<String, SourceError> {
        let response =
            self.client.get(&self.url).send().await.map_err(|e| SourceError::Unreachable(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(SourceError::UnexpectedStatus(response.status().as_u16()));
        }
        response.text().await.map_err(|e| SourceError::Unreachable(e.to_string()))
    }
}

impl ProductSource for VendorPageSource {
    fn source_id(&self) -> String {
        self.url.clone()
    }

    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, SourceError> {
        let html = self.fetch_page().await?;
        let products = parse_page(&html, &self.selectors, &self.config)?;
        info!("🌐️ [{}] Found {} products", self.url, products.len());
        Ok(products)
    }
}

/// Extract the product records from a vendor page, in page order.
pub fn parse_page(
    html: &str,
    selectors: &PageSelectors,
    config: &SourceConfig,
) -> Result<Vec<ProductRecord>, SourceError> {
    let document = Html::parse_document(html);
    if let Some(title) = document.select(&selectors.title).next().map(|t| element_text(&t)) {
        if !title.contains(config.title_marker.as_str()) {
            return Err(SourceError::IdentityMismatch(title));
        }
    }
    let products = document
        .select(&selectors.package)
        .filter_map(|package| parse_package(&package, selectors, config))
        .collect();
    Ok(products)
}

fn parse_package(package: &ElementRef, selectors: &PageSelectors, config: &SourceConfig) -> Option<ProductRecord> {
    let name = first_text(package, &selectors.name).unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
    let Some(href) = package.select(&selectors.link).next().and_then(|a| a.value().attr("href")) else {
        warn!("🌐️ {name} has no purchase link. Skipping it.");
        return None;
    };
    let price = first_text(package, &selectors.price).unwrap_or_else(|| UNKNOWN_PRICE.to_string());
    let availability = first_text(package, &selectors.quantity).unwrap_or_else(|| UNKNOWN_AVAILABILITY.to_string());
    let mut features = all_texts(package, &selectors.feature_items);
    if features.is_empty() {
        features = all_texts(package, &selectors.feature_paragraphs);
    }
    let quantity = parse_quantity(&availability);
    trace!("🌐️ {name}: {availability} ({quantity})");
    Some(ProductRecord {
        name,
        price,
        features: features.join("\n"),
        availability,
        quantity,
        link: config.purchase_link(href),
    })
}

// Text fragments are trimmed individually and joined without a separator.
fn element_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect::<String>()
}

fn first_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(|e| element_text(&e))
}

fn all_texts(element: &ElementRef, selector: &Selector) -> Vec<String> {
    element.select(selector).map(|e| element_text(&e)).filter(|s| !s.is_empty()).collect()
}
