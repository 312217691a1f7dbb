//! Renders a product into the body of a notification (Telegram HTML).
//!
//! ```text
//! <b>{name}</b> - <b>{price}</b>
//!
//! <blockquote>{features}
//! {price}</blockquote>
//! {remark}
//!
//! {availability line}
//! {link label}{link}
//! ```
//!
//! Vendor-supplied text is escaped. The operator's remark is inserted verbatim so that it may carry its own markup.
use crate::{helpers::is_availability_known, stock_types::ProductRecord};

/// The labels used in a rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub restocked: String,
    pub sold_out: String,
    pub unknown: String,
    pub link: String,
}

impl Locale {
    pub fn zh() -> Self {
        Self {
            restocked: "✅ 已补货：".to_string(),
            sold_out: "❌ 已售罄：".to_string(),
            unknown: "库存未知：".to_string(),
            link: "链接: ".to_string(),
        }
    }

    pub fn en() -> Self {
        Self {
            restocked: "✅ Back in stock: ".to_string(),
            sold_out: "❌ Sold out: ".to_string(),
            unknown: "Stock unknown: ".to_string(),
            link: "Link: ".to_string(),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Some(Self::zh()),
            "en" | "en-us" | "en-gb" => Some(Self::en()),
            _ => None,
        }
    }
}

/// Substitutions applied, in order, to product names, prices and features for the Chinese locale.
pub fn default_translations() -> Vec<(String, String)> {
    [
        ("LV", "拉斯维加斯"),
        ("NY", "纽约"),
        ("MIA", "迈阿密"),
        ("LU", "卢森堡"),
        ("Unmetered BW", "不限流量"),
        ("mo", "月"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone)]
pub struct MessageFormatter {
    locale: Locale,
    translations: Vec<(String, String)>,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(Locale::zh(), default_translations())
    }
}

impl MessageFormatter {
    pub fn new(locale: Locale, translations: Vec<(String, String)>) -> Self {
        Self { locale, translations }
    }

    /// English labels and no translation of vendor text.
    pub fn english() -> Self {
        Self::new(Locale::en(), Vec::new())
    }

    /// The formatter for a locale code such as "zh" or "en". Unknown codes get `None`.
    pub fn for_locale(code: &str) -> Option<Self> {
        match Locale::from_code(code)? {
            locale if locale == Locale::zh() => Some(Self::default()),
            locale => Some(Self::new(locale, Vec::new())),
        }
    }

    pub fn translate(&self, text: &str) -> String {
        self.translations.iter().fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    }

    pub fn render(&self, record: &ProductRecord, remark: &str) -> String {
        let name = escape_html(&self.translate(&record.name));
        let price = escape_html(&self.translate(&record.price));
        let features = escape_html(&self.translate(&record.features));
        let availability = escape_html(&record.availability);
        let link = escape_html(&record.link);
        let (availability, link) = match (is_availability_known(&record.availability), record.quantity) {
            (true, 0) => (format!("{}{availability}", self.locale.sold_out), format!("<s>{link}</s>")),
            (true, _) => (format!("{}{availability}", self.locale.restocked), link),
            (false, _) => (format!("{}{availability}", self.locale.unknown), link),
        };
        format!(
            "<b>{name}</b> - <b>{price}</b>\n\n<blockquote>{features}\n{price}</blockquote>\n{remark}\n\n{availability}\n{}{link}",
            self.locale.link
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            c => escaped.push(c),
        }
    }
    escaped
}
