//! Scripted browser used by unit tests

use super::{
    BrowserError, BrowserLauncher, BrowserPage, BrowserSession, CardSelectors, LaunchOptions,
    RawCard, WaitPolicy,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted page does when navigated to
#[derive(Debug, Clone)]
pub(crate) enum FakeResponse {
    /// Navigation succeeds and the card container holds these cards
    Cards(Vec<RawCard>),
    /// Navigation itself fails
    NavigationFails,
    /// Navigation succeeds but the card container never appears
    SelectorTimesOut,
}

/// Everything the fake observed, shared across clones
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub launches: usize,
    pub closes: usize,
    pub navigations: Vec<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeLauncher {
    responses: HashMap<String, FakeResponse>,
    fail_launch: bool,
    fail_new_page: bool,
    pub log: Arc<Mutex<FakeLog>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for a navigation to `url`; unscripted URLs time out
    pub fn respond(mut self, url: &str, response: FakeResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_new_page(mut self) -> Self {
        self.fail_new_page = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.log.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.lock().unwrap().navigations.clone()
    }

    pub fn user_agent(&self) -> Option<String> {
        self.log.lock().unwrap().user_agent.clone()
    }

    /// A page detached from any session, for driving the query runner directly
    pub fn page(&self) -> FakePage {
        FakePage {
            responses: self.responses.clone(),
            current: None,
            log: Arc::clone(&self.log),
        }
    }
}

impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _options: &LaunchOptions) -> Result<FakeSession, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no browser binary found".to_string()));
        }
        self.log.lock().unwrap().launches += 1;
        Ok(FakeSession {
            launcher: self.clone(),
        })
    }
}

pub(crate) struct FakeSession {
    launcher: FakeLauncher,
}

impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&mut self) -> Result<FakePage, BrowserError> {
        if self.launcher.fail_new_page {
            return Err(BrowserError::Page("target crashed".to_string()));
        }
        Ok(self.launcher.page())
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.launcher.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub(crate) struct FakePage {
    responses: HashMap<String, FakeResponse>,
    current: Option<FakeResponse>,
    log: Arc<Mutex<FakeLog>>,
}

impl BrowserPage for FakePage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        self.log.lock().unwrap().user_agent = Some(user_agent.to_string());
        Ok(())
    }

    async fn navigate(
        &mut self,
        url: &str,
        _wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        let response = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or(FakeResponse::SelectorTimesOut);

        if let FakeResponse::NavigationFails = response {
            self.current = None;
            return Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            });
        }

        self.current = Some(response);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        match &self.current {
            Some(FakeResponse::Cards(_)) => Ok(()),
            Some(_) => Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
            None => Err(BrowserError::NoDocument),
        }
    }

    async fn evaluate_over_cards(
        &mut self,
        _selectors: &CardSelectors,
    ) -> Result<Vec<RawCard>, BrowserError> {
        match &self.current {
            Some(FakeResponse::Cards(cards)) => Ok(cards.clone()),
            _ => Err(BrowserError::NoDocument),
        }
    }
}

/// A card that passes the default acceptance rules, linking to `href`
pub(crate) fn qualifying_card(title: &str, href: &str) -> RawCard {
    RawCard {
        title: Some(title.to_string()),
        current_price: Some("1.299,90 TL".to_string()),
        original_price: Some("2.363,45 TL".to_string()),
        link: Some(href.to_string()),
        image: Some("https://cdn.example.com/img.jpg".to_string()),
        discount: Some("%45".to_string()),
    }
}
