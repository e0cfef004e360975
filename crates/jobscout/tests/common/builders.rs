//! Builders for portal pages and config files.
//!
//! Result pages carry only the job cards. Descriptions and apply controls
//! live on each listing's detail page, registered with [`with_details`].

#![allow(dead_code)]

use jobscout::portal::{Portal, PortalKind};
use jobscout::search::paginator::next_page_url;
use jobscout::search::SearchQuery;

use super::StaticSite;

/// Search keywords the LinkedIn filter form carries over.
pub const KEYWORDS: &str = "rust";

pub const LOGIN_SUBMIT_URL: &str = "https://www.linkedin.com/checkpoint/lg/login-submit";
pub const CSRF_TOKEN: &str = "ajax:8842";

/// How a listing offers to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    Easy,
    External,
    /// No apply control, as after applying.
    Applied,
}

/// One job as a portal renders it.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: usize,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: Option<String>,
    pub apply: Apply,
}

impl Card {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: Some(format!("Description for job {id}")),
            apply: Apply::Easy,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn company(mut self, company: &str) -> Self {
        self.company = company.to_string();
        self
    }

    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    pub fn apply(mut self, apply: Apply) -> Self {
        self.apply = apply;
        self
    }
}

pub fn cards(ids: std::ops::Range<usize>) -> Vec<Card> {
    ids.map(Card::new).collect()
}

/// Where the card's title link points.
pub fn detail_url(portal: &Portal, card: &Card) -> String {
    match portal.kind {
        PortalKind::LinkedIn => format!("https://www.linkedin.com/jobs/view/{}/?trk=search", card.id),
        PortalKind::Indeed => format!("https://www.indeed.com/viewjob?jk={}", card.id),
    }
}

/// Registers the detail page of every card.
pub fn with_details(site: StaticSite, portal: &Portal, cards: &[Card]) -> StaticSite {
    cards.iter().fold(site, |site, card| {
        let page = match portal.kind {
            PortalKind::LinkedIn => linkedin_detail(card),
            PortalKind::Indeed => indeed_detail(card),
        };
        site.page(&detail_url(portal, card), page)
    })
}

fn indeed_apply(apply: Apply) -> &'static str {
    match apply {
        Apply::Easy => r#"<span data-testid="indeedApply">Easily apply</span>"#,
        Apply::External => r#"<button aria-label="Apply now (opens in a new tab)">Apply</button>"#,
        Apply::Applied => "<span>Applied</span>",
    }
}

fn linkedin_apply(apply: Apply) -> &'static str {
    match apply {
        Apply::Easy => r#"<button class="jobs-apply-button" aria-label="Easy Apply to this job">Easy Apply</button>"#,
        Apply::External => r#"<button class="jobs-apply-button" aria-label="Apply on company website">Apply</button>"#,
        Apply::Applied => r#"<span class="artdeco-inline-feedback">Applied</span>"#,
    }
}

fn indeed_card(card: &Card) -> String {
    format!(
        r#"<li>
             <h2 class="jobTitle"><a href="/viewjob?jk={id}">{title}</a></h2>
             <span data-testid="company-name">{company}</span>
             <div data-testid="text-location">{location}</div>
           </li>"#,
        id = card.id,
        title = card.title,
        company = card.company,
        location = card.location,
    )
}

fn indeed_detail(card: &Card) -> String {
    let description = card
        .description
        .as_deref()
        .map(|d| format!(r#"<div class="jobsearch-JobComponent-description">{d}</div>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
             <h1>{title}</h1>
             {apply}
             {description}
           </body></html>"#,
        title = card.title,
        apply = indeed_apply(card.apply),
    )
}

/// An Indeed results page; `total` goes into the result-count line.
pub fn indeed_page(cards: &[Card], total: Option<&str>) -> String {
    let count = total
        .map(|t| format!(r#"<div class="jobsearch-JobCountAndSortPane-jobCount"><span>{t}</span></div>"#))
        .unwrap_or_default();
    let items: String = cards.iter().map(indeed_card).collect();

    format!(
        r#"<html><body>
             {count}
             <div id="mosaic-provider-jobcards"><ul>{items}</ul></div>
           </body></html>"#
    )
}

fn linkedin_card(card: &Card) -> String {
    format!(
        r#"<li class="occludable-update">
             <a class="job-card-list__title" href="/jobs/view/{id}/?trk=search">{title}</a>
             <div class="job-card-container__company-name">{company}</div>
             <div class="job-card-container__primary-description">{location}</div>
           </li>"#,
        id = card.id,
        title = card.title,
        company = card.company,
        location = card.location,
    )
}

fn linkedin_detail(card: &Card) -> String {
    let description = card
        .description
        .as_deref()
        .map(|d| format!(r#"<div id="job-details">{d}</div>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
             <h1>{title}</h1>
             {apply}
             {description}
           </body></html>"#,
        title = card.title,
        apply = linkedin_apply(card.apply),
    )
}

/// A LinkedIn results page.
///
/// Like the live site it has the date-posted filter form, and beside the
/// list a preview pane showing the first card's description and apply
/// control.
pub fn linkedin_page(cards: &[Card], total: Option<&str>) -> String {
    let count = total
        .map(|t| format!(r#"<div class="jobs-search-results-list__subtitle"><span>{t}</span></div>"#))
        .unwrap_or_default();
    let items: String = cards.iter().map(linkedin_card).collect();
    let preview = cards
        .first()
        .map(|card| {
            let description = card.description.as_deref().unwrap_or_default();
            format!(
                r#"<section class="jobs-search__job-details">
                     {apply}
                     <div id="job-details">{description}</div>
                   </section>"#,
                apply = linkedin_apply(card.apply),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><body>
             <form class="search-reusables__filters" action="/jobs/search/">
               <input type="hidden" name="keywords" value="{KEYWORDS}">
               <button type="button" aria-label="Date posted filter. Clicking this button displays all Date posted filter options.">Date posted</button>
               <input type="radio" id="timePostedRange-r86400" name="f_TPR" value="r86400">
               <label for="timePostedRange-r86400">Past 24 hours</label>
               <input type="radio" id="timePostedRange-r604800" name="f_TPR" value="r604800">
               <label for="timePostedRange-r604800">Past week</label>
               <button type="submit" aria-label="Apply current filter to show results">Show results</button>
             </form>
             {count}
             <ul>{items}</ul>
             {preview}
           </body></html>"#
    )
}

/// LinkedIn's sign-in form: a POST with a CSRF token beside the credentials.
pub fn login_page() -> String {
    format!(
        r#"<html><body>
             <form method="post" action="/checkpoint/lg/login-submit">
               <input type="hidden" name="loginCsrfParam" value="{CSRF_TOKEN}">
               <input id="username" name="session_key" type="text">
               <input id="password" name="session_password" type="password">
               <button data-litms-control-urn="login-submit" type="submit">Sign in</button>
             </form>
           </body></html>"#
    )
}

pub fn feed_page() -> String {
    "<html><body><main class=\"feed\">Welcome back</main></body></html>".to_string()
}

/// The search address and every following page address, `pages` in all.
pub fn result_urls(portal: &Portal, query: &SearchQuery, pages: usize) -> Vec<String> {
    let mut urls = vec![query.build_url(portal).unwrap().to_string()];
    while urls.len() < pages {
        let last = urls.last().unwrap();
        urls.push(next_page_url(last, portal.offset_param, portal.page_size).unwrap());
    }
    urls
}

/// A minimal valid config file body.
pub fn config_json(portal: &str, matching: &str) -> String {
    format!(
        r#"{{
             "version": "1.0",
             "portal": "{portal}",
             "search": {{ "keywords": "rust", "location": "Berlin" }},
             "matching": {matching}
           }}"#
    )
}
