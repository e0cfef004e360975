//! A [`PageDriver`] for server-rendered portal pages.
//!
//! Pages come from a [`Transport`] and are queried with `scraper`. Nothing
//! runs script, so interactions follow plain HTML: links navigate, labels
//! and radio/checkbox inputs select a value, submit buttons send their form.
//! `wait_for` checks presence once and reports a timeout straight away.
//!
//! While a listing is focused, reads see only that listing's card and, when
//! a detail link is configured, the detail page `activate` fetched for it.
//! Page-level elements are read with no listing focused; `find_all` and
//! every page load clear the focus.

use std::collections::HashMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::transport::{FetchedPage, HttpTransport, Transport};
use super::{DriverError, ListingHandle, Locator, PageDriver};
use crate::sanitize::redact_url;

struct LoadedPage {
    url: Url,
    document: Html,
}

impl From<FetchedPage> for LoadedPage {
    fn from(fetched: FetchedPage) -> Self {
        Self {
            url: fetched.url,
            document: Html::parse_document(&fetched.body),
        }
    }
}

struct Focus {
    index: usize,
    detail: Option<LoadedPage>,
}

/// Values set on the current page, by field name.
#[derive(Default)]
struct FormState {
    values: HashMap<String, String>,
    selected: HashMap<String, String>,
}

enum ClickAction {
    Follow(Url),
    Select { name: String, value: String },
    Submit(Submission),
    Nothing,
}

struct Submission {
    post: bool,
    action: Url,
    fields: Vec<(String, String)>,
}

pub struct HtmlDriver<T: Transport = HttpTransport> {
    transport: T,
    page: Option<LoadedPage>,
    /// Locator passed to the last `find_all`; handles index into its matches.
    listings: Option<Locator>,
    focus: Option<Focus>,
    detail_link: Option<Locator>,
    form: FormState,
}

impl HtmlDriver<HttpTransport> {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, DriverError> {
        Ok(Self::with_transport(HttpTransport::new(timeout, user_agent)?))
    }
}

impl<T: Transport> HtmlDriver<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            page: None,
            listings: None,
            focus: None,
            detail_link: None,
            form: FormState::default(),
        }
    }

    /// Makes `activate` open the page linked by `link` inside the listing.
    pub fn with_detail_link(mut self, link: Locator) -> Self {
        self.detail_link = Some(link);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replaces the current page with `html` as if it had been fetched from `url`.
    pub fn load_document(&mut self, url: &str, html: &str) -> Result<(), DriverError> {
        let url = parse_url(url)?;
        self.show(FetchedPage {
            url,
            body: html.to_string(),
        });
        Ok(())
    }

    fn show(&mut self, fetched: FetchedPage) {
        self.page = Some(fetched.into());
        self.listings = None;
        self.focus = None;
        self.form = FormState::default();
    }

    fn page(&self) -> Result<&LoadedPage, DriverError> {
        self.page.as_ref().ok_or(DriverError::NoPage)
    }

    fn card<'a>(&self, page: &'a LoadedPage, index: usize) -> Result<Option<ElementRef<'a>>, DriverError> {
        let Some(listings) = &self.listings else {
            return Ok(None);
        };
        let selector = parse_selector(listings)?;
        Ok(page.document.select(&selector).nth(index))
    }

    /// First match for `locator` and the page holding it.
    fn locate(&self, locator: &Locator) -> Result<Option<(&LoadedPage, ElementRef<'_>)>, DriverError> {
        let page = self.page()?;
        let selector = parse_selector(locator)?;

        let Some(focus) = &self.focus else {
            return Ok(page.document.select(&selector).next().map(|el| (page, el)));
        };
        if let Some(element) = self
            .card(page, focus.index)?
            .and_then(|card| card.select(&selector).next())
        {
            return Ok(Some((page, element)));
        }
        Ok(focus.detail.as_ref().and_then(|detail| {
            detail
                .document
                .select(&selector)
                .next()
                .map(|el| (detail, el))
        }))
    }

    fn find_first(&self, locator: &Locator) -> Result<Option<ElementRef<'_>>, DriverError> {
        Ok(self.locate(locator)?.map(|(_, element)| element))
    }

    fn require(&self, locator: &Locator) -> Result<(&LoadedPage, ElementRef<'_>), DriverError> {
        self.locate(locator)?.ok_or_else(|| DriverError::Timeout {
            locator: locator.clone(),
        })
    }

    fn click_action(&self, page: &LoadedPage, element: ElementRef<'_>, locator: &Locator) -> Result<ClickAction, DriverError> {
        let el = element.value();
        match el.name() {
            "a" => match el.attr("href") {
                Some(href) => Ok(ClickAction::Follow(join(&page.url, href)?)),
                None => Ok(ClickAction::Nothing),
            },
            "label" => {
                let control = match el.attr("for") {
                    Some(id) => page
                        .document
                        .select(&parse_selector(&Locator::from("input"))?)
                        .find(|input| input.value().id() == Some(id)),
                    None => element.select(&parse_selector(&Locator::from("input"))?).next(),
                };
                Ok(control.map(select_action).unwrap_or(ClickAction::Nothing))
            }
            "input" => match input_type(element).as_str() {
                "radio" | "checkbox" => Ok(select_action(element)),
                "submit" | "image" => self.submission(page, element),
                _ => Ok(ClickAction::Nothing),
            },
            "button" => match el.attr("type").map(str::to_ascii_lowercase).as_deref() {
                None | Some("submit") => self.submission(page, element),
                _ => {
                    debug!(locator = %locator, "Button does nothing without script");
                    Ok(ClickAction::Nothing)
                }
            },
            other => Err(DriverError::Unsupported(format!(
                "clicking <{other}> '{locator}' needs script"
            ))),
        }
    }

    /// The request a browser would send for `button`'s form.
    fn submission(&self, page: &LoadedPage, button: ElementRef<'_>) -> Result<ClickAction, DriverError> {
        let Some(form) = button
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "form")
        else {
            return Ok(ClickAction::Nothing);
        };

        let action = match form.value().attr("action").filter(|a| !a.trim().is_empty()) {
            Some(action) => join(&page.url, action)?,
            None => page.url.clone(),
        };
        let post = form
            .value()
            .attr("method")
            .is_some_and(|m| m.eq_ignore_ascii_case("post"));

        let mut fields = Vec::new();
        let controls = parse_selector(&Locator::from("input, select, textarea"))?;
        for control in form.select(&controls) {
            let el = control.value();
            let Some(name) = el.attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if el.attr("disabled").is_some() {
                continue;
            }

            let value = match el.name() {
                "input" => match input_type(control).as_str() {
                    "submit" | "image" | "button" | "reset" | "file" => None,
                    "radio" | "checkbox" => {
                        let value = el.attr("value").unwrap_or("on");
                        let checked = match self.form.selected.get(name) {
                            Some(chosen) => chosen == value,
                            None => el.attr("checked").is_some(),
                        };
                        checked.then(|| value.to_string())
                    }
                    _ => Some(self.filled_or(name, || el.attr("value").unwrap_or_default().to_string())),
                },
                "textarea" => Some(self.filled_or(name, || control.text().collect())),
                _ => Some(self.filled_or(name, || selected_option(control))),
            };
            if let Some(value) = value {
                fields.push((name.to_string(), value));
            }
        }

        if let Some(name) = button.value().attr("name").filter(|n| !n.is_empty()) {
            let value = button.value().attr("value").unwrap_or_default();
            fields.push((name.to_string(), value.to_string()));
        }

        Ok(ClickAction::Submit(Submission { post, action, fields }))
    }

    fn filled_or(&self, name: &str, default: impl FnOnce() -> String) -> String {
        self.form.values.get(name).cloned().unwrap_or_else(default)
    }

    fn submit(&mut self, submission: Submission) -> Result<(), DriverError> {
        let Submission { post, mut action, fields } = submission;
        debug!(
            url = %redact_url(action.as_str()),
            post,
            fields = fields.len(),
            "Submitting form"
        );

        let fetched = if post {
            self.transport.post_form(&action, &fields)?
        } else {
            action.set_query(None);
            if !fields.is_empty() {
                action
                    .query_pairs_mut()
                    .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            self.transport.get(&action)?
        };
        self.show(fetched);
        Ok(())
    }
}

fn parse_url(url: &str) -> Result<Url, DriverError> {
    Url::parse(url).map_err(|e| DriverError::Navigation {
        url: redact_url(url),
        reason: e.to_string(),
    })
}

fn join(base: &Url, href: &str) -> Result<Url, DriverError> {
    base.join(href).map_err(|e| DriverError::Navigation {
        url: href.to_string(),
        reason: e.to_string(),
    })
}

fn parse_selector(locator: &Locator) -> Result<Selector, DriverError> {
    Selector::parse(locator.as_str()).map_err(|e| DriverError::InvalidLocator {
        locator: locator.clone(),
        reason: e.to_string(),
    })
}

fn input_type(input: ElementRef<'_>) -> String {
    input
        .value()
        .attr("type")
        .unwrap_or("text")
        .to_ascii_lowercase()
}

fn select_action(control: ElementRef<'_>) -> ClickAction {
    match control.value().attr("name") {
        Some(name) => ClickAction::Select {
            name: name.to_string(),
            value: control.value().attr("value").unwrap_or("on").to_string(),
        },
        None => ClickAction::Nothing,
    }
}

/// Value of the selected `<option>`, else the first one.
fn selected_option(select: ElementRef<'_>) -> String {
    let Ok(options) = Selector::parse("option") else {
        return String::new();
    };
    let mut all = select.select(&options);
    let first = all.next();
    let chosen = std::iter::once(first)
        .flatten()
        .chain(all)
        .find(|o| o.value().attr("selected").is_some())
        .or(first);

    chosen
        .map(|o| {
            o.value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| clean_text(&o.text().collect::<String>()))
        })
        .unwrap_or_default()
}

/// Collapses runs of whitespace, including the newlines `scraper` keeps
/// between text nodes.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl<T: Transport> PageDriver for HtmlDriver<T> {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        let target = parse_url(url)?;
        debug!(url = %redact_url(url), "Fetching page");
        let fetched = self.transport.get(&target)?;
        self.show(fetched);
        Ok(())
    }

    fn current_url(&self) -> Result<String, DriverError> {
        Ok(self
            .page
            .as_ref()
            .map(|p| p.url.to_string())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    fn text_of(&self, locator: &Locator) -> Result<Option<String>, DriverError> {
        Ok(self
            .find_first(locator)?
            .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
            .filter(|text| !text.is_empty()))
    }

    fn attribute_of(&self, locator: &Locator, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self
            .find_first(locator)?
            .and_then(|el| el.value().attr(name))
            .map(str::to_string))
    }

    fn wait_for(&self, locator: &Locator) -> Result<(), DriverError> {
        self.require(locator).map(|_| ())
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ListingHandle>, DriverError> {
        let page = self.page()?;
        let selector = parse_selector(locator)?;
        let count = page.document.select(&selector).count();

        self.listings = Some(locator.clone());
        self.focus = None;
        Ok((0..count).map(ListingHandle::new).collect())
    }

    fn activate(&mut self, handle: ListingHandle) -> Result<(), DriverError> {
        let detail_url = {
            let page = self.page()?;
            if self.listings.is_none() {
                return Err(DriverError::StaleHandle(handle));
            }
            let card = self
                .card(page, handle.id())?
                .ok_or(DriverError::StaleHandle(handle))?;

            let href = match &self.detail_link {
                Some(link) => card
                    .select(&parse_selector(link)?)
                    .next()
                    .and_then(|a| a.value().attr("href")),
                None => None,
            };
            href.map(|href| join(&page.url, href)).transpose()?
        };

        self.focus = None;
        let detail = match detail_url {
            Some(url) => {
                debug!(url = %redact_url(url.as_str()), "Opening listing");
                Some(LoadedPage::from(self.transport.get(&url)?))
            }
            None => None,
        };
        self.focus = Some(Focus {
            index: handle.id(),
            detail,
        });
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let action = {
            let (page, element) = self.require(locator)?;
            self.click_action(page, element, locator)?
        };

        match action {
            ClickAction::Follow(url) => self.navigate(url.as_str()),
            ClickAction::Select { name, value } => {
                self.form.selected.insert(name, value);
                Ok(())
            }
            ClickAction::Submit(submission) => self.submit(submission),
            ClickAction::Nothing => Ok(()),
        }
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        let name = {
            let (_, element) = self.require(locator)?;
            if !matches!(element.value().name(), "input" | "textarea" | "select") {
                return Err(DriverError::Unsupported(format!(
                    "'{locator}' is not a form field"
                )));
            }
            element
                .value()
                .attr("name")
                .map(str::to_string)
                .ok_or_else(|| DriverError::Unsupported(format!("'{locator}' has no name")))?
        };

        self.form.values.insert(name, value.to_string());
        Ok(())
    }
}
