//! HTML scraper for the public company register. Plain HTTP plus CSS
//! selectors, no browser.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use lf_domain::config::RegistryConfig;
use lf_domain::{Error, Result};

use crate::types::{CompanyRegistry, Officer, OfficerLookup};

pub struct CompaniesHouseScraper {
    base_url: String,
    client: reqwest::Client,
}

impl CompaniesHouseScraper {
    pub fn new(cfg: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch(&self, url: &str) -> Result<(u16, String)> {
        tracing::debug!(url, "fetching registry page");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        Ok((status, body))
    }

    async fn officers_by_number(&self, number: &str) -> Result<OfficerLookup> {
        let url = format!("{}/company/{number}/officers", self.base_url);
        let (status, body) = self.fetch(&url).await?;
        if status == 404 {
            return Ok(OfficerLookup::NotFound(format!(
                "Company number {number} not found or information is not available."
            )));
        }
        if !(200..300).contains(&status) {
            return Err(Error::from_status(status, body));
        }
        parse_officers_page(&body, &format!("company number {number}"))
    }

    async fn officers_by_name(&self, name: &str) -> Result<OfficerLookup> {
        let url = format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(name.trim())
        );
        let (status, body) = self.fetch(&url).await?;
        if !(200..300).contains(&status) {
            return Err(Error::from_status(status, body));
        }

        let results = parse_search_results(&body)?;
        let Some((result_name, number)) = results.first() else {
            return Ok(OfficerLookup::NotFound(format!(
                "No search results found for company name \"{name}\"."
            )));
        };

        let wanted = normalize_company_name(name);
        let got = normalize_company_name(result_name);
        if got != wanted && !got.starts_with(&wanted) {
            return Ok(OfficerLookup::NotFound(format!(
                "No exact match found for company name \"{name}\". First result was \"{result_name}\"."
            )));
        }

        tracing::info!(name, matched = %result_name, number, "registry search matched");
        self.officers_by_number(number).await
    }
}

#[async_trait::async_trait]
impl CompanyRegistry for CompaniesHouseScraper {
    async fn officers(&self, query: &str) -> Result<OfficerLookup> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation(
                "company number or name is required".into(),
            ));
        }
        if looks_like_company_number(query) {
            self.officers_by_number(query).await
        } else {
            self.officers_by_name(query).await
        }
    }
}

fn looks_like_company_number(input: &str) -> bool {
    let all_digits = regex::Regex::new(r"^[0-9]{6,8}$");
    let prefixed = regex::Regex::new(r"^[A-Za-z]{2}[0-9]{6}$");
    all_digits.map(|re| re.is_match(input)).unwrap_or(false)
        || prefixed.map(|re| re.is_match(input)).unwrap_or(false)
}

/// Lowercase, drop a trailing LTD/LIMITED/PLC/LLP suffix, strip
/// punctuation, collapse whitespace.
pub fn normalize_company_name(name: &str) -> String {
    let mut out = name.trim().to_lowercase();
    for suffix in ["ltd", "limited", "plc", "llp"] {
        if let Ok(re) = regex::Regex::new(&format!(r"\s*{suffix}\.?$")) {
            out = re.replace(&out, "").into_owned();
        }
    }
    out = out
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sel(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Other(format!("selector {css}: {e}")))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_search_results(html: &str) -> Result<Vec<(String, String)>> {
    let doc = Html::parse_document(html);
    let link_sel = sel("#results li h3 a")?;
    let number_re =
        regex::Regex::new(r"/company/([A-Za-z0-9]+)").map_err(|e| Error::Other(e.to_string()))?;

    let mut results = Vec::new();
    for link in doc.select(&link_sel) {
        let name = text_of(link);
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(caps) = number_re.captures(href) {
            results.push((name, caps[1].to_string()));
        }
    }
    Ok(results)
}

/// Parse an officers page into structured records. The register's
/// "no current officers" copy and a missing appointments list both
/// come back as `NotFound` with a relayable message.
pub fn parse_officers_page(html: &str, identifier: &str) -> Result<OfficerLookup> {
    if html.contains("Company number not found")
        || html.contains("company information is not available")
    {
        return Ok(OfficerLookup::NotFound(format!(
            "{identifier} not found or information is not available."
        )));
    }
    if html.contains("There are no current officers for this company")
        || html.contains("no current appointments")
    {
        return Ok(OfficerLookup::NotFound(format!(
            "There are no current officers listed for {identifier}."
        )));
    }

    let doc = Html::parse_document(html);
    let list_sel = sel("div.appointments-list")?;
    if doc.select(&list_sel).next().is_none() {
        return Ok(OfficerLookup::NotFound(format!(
            "No officers found for {identifier}, or the page structure is unexpected on the officers page."
        )));
    }

    let card_sel = sel(r#"div.appointments-list div[class*="appointment-"]"#)?;
    let name_link_sel = sel("h2 a")?;
    let name_span_sel = sel("h2 span")?;
    let address_sel = sel(r#"[id^="officer-address-value"]"#)?;
    let dt_sel = sel("dt")?;

    let mut officers = Vec::new();
    for card in doc.select(&card_sel) {
        let name = card
            .select(&name_link_sel)
            .next()
            .or_else(|| card.select(&name_span_sel).next())
            .map(text_of)
            .filter(|s| !s.is_empty());
        let correspondence_address = card
            .select(&address_sel)
            .next()
            .map(text_of)
            .filter(|s| !s.is_empty());

        let mut officer = Officer {
            name,
            correspondence_address,
            ..Default::default()
        };
        for dt in card.select(&dt_sel) {
            let label = text_of(dt).to_lowercase();
            let Some(value) = following_dd(dt) else {
                continue;
            };
            match label.as_str() {
                "role" => officer.role.get_or_insert(value),
                "status" => officer.status.get_or_insert(value),
                "date of birth" => officer.date_of_birth.get_or_insert(value),
                "appointed on" => officer.appointed_on.get_or_insert(value),
                "nationality" => officer.nationality.get_or_insert(value),
                "country of residence" => officer.country_of_residence.get_or_insert(value),
                "occupation" => officer.occupation.get_or_insert(value),
                _ => continue,
            };
        }
        officers.push(officer);
    }

    if officers.is_empty() {
        return Ok(OfficerLookup::NotFound(format!(
            "No officers parsed from appointments list for {identifier}, though the list container was found."
        )));
    }
    Ok(OfficerLookup::Found(officers))
}

/// The `dd` element that follows a `dt`, skipping text nodes.
fn following_dd(dt: ElementRef<'_>) -> Option<String> {
    let mut node = dt.next_sibling();
    while let Some(n) = node {
        if let Some(el) = ElementRef::wrap(n) {
            if el.value().name() == "dd" {
                let value = text_of(el);
                return (!value.is_empty()).then_some(value);
            }
            return None;
        }
        node = n.next_sibling();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICERS_PAGE: &str = r#"
<html><body><div id="content-container"><div class="govuk-tabs"><div>
<div class="appointments-list">
  <div class="appointment-1">
    <h2 class="heading-medium"><span id="officer-name-1"><a href="/officers/abc">SMITH, John</a></span></h2>
    <dl><dt>Correspondence address</dt><dd id="officer-address-value-1">1 High Street, Grimsby, DN31 1AA</dd></dl>
    <div class="grid-row">
      <dl><dt>Role</dt><dd id="officer-role-1">Director</dd></dl>
      <dl><dt>Date of birth</dt><dd>January 1980</dd></dl>
      <dl><dt>Appointed on</dt><dd>1 June 2015</dd></dl>
    </div>
    <div class="grid-row">
      <dl><dt>Nationality</dt><dd>British</dd></dl>
      <dl><dt>Country of residence</dt><dd>England</dd></dl>
      <dl><dt>Occupation</dt><dd>Consultant</dd></dl>
    </div>
  </div>
  <div class="appointment-2">
    <h2 class="heading-medium"><span id="officer-name-2">JONES, Mary</span></h2>
    <div class="grid-row">
      <dl><dt>Role</dt><dd>Secretary</dd></dl>
    </div>
  </div>
</div>
</div></div></div></body></html>"#;

    #[test]
    fn officers_page_parses_appointment_cards() {
        let lookup = parse_officers_page(OFFICERS_PAGE, "company number 01234567").unwrap();
        let OfficerLookup::Found(officers) = lookup else {
            panic!("expected officers");
        };
        assert_eq!(officers.len(), 2);
        assert_eq!(officers[0].name.as_deref(), Some("SMITH, John"));
        assert_eq!(officers[0].role.as_deref(), Some("Director"));
        assert_eq!(officers[0].appointed_on.as_deref(), Some("1 June 2015"));
        assert_eq!(officers[0].nationality.as_deref(), Some("British"));
        assert_eq!(
            officers[0].correspondence_address.as_deref(),
            Some("1 High Street, Grimsby, DN31 1AA")
        );
        assert_eq!(officers[1].name.as_deref(), Some("JONES, Mary"));
        assert_eq!(officers[1].role.as_deref(), Some("Secretary"));
        assert!(officers[1].nationality.is_none());
    }

    #[test]
    fn no_current_officers_copy_is_not_found() {
        let html = "<html><body><p>There are no current officers for this company</p></body></html>";
        let lookup = parse_officers_page(html, "company number 99999999").unwrap();
        let OfficerLookup::NotFound(msg) = lookup else {
            panic!("expected not-found");
        };
        assert!(msg.contains("no current officers"));
    }

    #[test]
    fn missing_list_container_is_not_found() {
        let lookup = parse_officers_page("<html><body></body></html>", "company number 1").unwrap();
        assert!(matches!(lookup, OfficerLookup::NotFound(_)));
    }

    #[test]
    fn normalize_strips_suffix_and_punctuation() {
        assert_eq!(normalize_company_name("Acme Widgets Ltd."), "acme widgets");
        assert_eq!(normalize_company_name("ACME WIDGETS LIMITED"), "acme widgets");
        assert_eq!(normalize_company_name("O'Brien & Sons PLC"), "obrien sons");
        assert_eq!(normalize_company_name("  Spaced   Out  LLP "), "spaced out");
        assert_eq!(normalize_company_name("Acme Widgets Ltd\n"), "acme widgets");
    }

    #[test]
    fn search_results_extract_name_and_number() {
        let html = r#"<ul id="results">
            <li><h3><a href="/company/01234567">ACME WIDGETS LTD</a></h3></li>
            <li><h3><a href="/company/SC123456">ACME WIDGETS SCOTLAND LTD</a></h3></li>
        </ul>"#;
        let results = parse_search_results(html).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ("ACME WIDGETS LTD".into(), "01234567".into()));
        assert_eq!(results[1].1, "SC123456");
    }

    #[test]
    fn company_number_shapes_are_recognized() {
        assert!(looks_like_company_number("01234567"));
        assert!(looks_like_company_number("123456"));
        assert!(looks_like_company_number("SC123456"));
        assert!(!looks_like_company_number("Acme Widgets"));
        assert!(!looks_like_company_number("12345"));
    }
}
