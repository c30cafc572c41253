// Tab handling
// Content script injection on shopping sites, and the toolbar icon

use anyhow::Result;

use crate::config::{Config, MatchMode, PagesConfig, SitesConfig};
use crate::services::TabHost;

/// The parts of a `tabs.onUpdated` event the watcher looks at
#[derive(Clone, Debug)]
pub struct TabUpdate {
    pub tab_id: i32,
    /// `changeInfo.status`
    pub status: Option<String>,
    /// `tab.url`, only set once the URL is known and permitted
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Still loading, no URL, or not a shopping site
    Ignored,
    Injected,
    InjectionFailed,
}

/// Whether a tab URL belongs to one of the configured shopping sites
pub fn is_shopping_url(sites: &SitesConfig, url: &str) -> bool {
    match sites.match_mode {
        MatchMode::Substring => sites.domains.iter().any(|domain| url.contains(domain.as_str())),
        MatchMode::Suffix => {
            let Ok(parsed) = url::Url::parse(url) else {
                return false;
            };
            let Some(host) = parsed.host_str() else {
                return false;
            };
            sites.domains.iter().any(|domain| {
                host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
        }
    }
}

/// Handle `tabs.onUpdated`: (re)inject the content script once a shopping
/// page has finished loading. Failures are logged, never retried.
pub async fn handle_tab_updated(
    tabs: &impl TabHost,
    config: &Config,
    update: &TabUpdate,
) -> InjectionOutcome {
    if update.status.as_deref() != Some("complete") {
        return InjectionOutcome::Ignored;
    }
    let Some(url) = update.url.as_deref() else {
        return InjectionOutcome::Ignored;
    };
    if !is_shopping_url(&config.sites, url) {
        return InjectionOutcome::Ignored;
    }

    log::info!("Detected shopping site on tab {}: {}", update.tab_id, url);

    match tabs
        .inject_script(update.tab_id, &config.content_script.files)
        .await
    {
        Ok(()) => {
            log::info!("Content script injected into tab {}", update.tab_id);
            InjectionOutcome::Injected
        }
        Err(e) => {
            log::error!("Error injecting content script: {:#}", e);
            InjectionOutcome::InjectionFailed
        }
    }
}

/// Handle `action.onClicked`: open the main page in a new tab
pub async fn open_main_page(tabs: &impl TabHost, pages: &PagesConfig) -> Result<String> {
    log::info!("Extension icon clicked");

    let url = tabs.extension_url(&pages.main);
    tabs.open_tab(&url).await?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryPlatform;

    fn complete(tab_id: i32, url: &str) -> TabUpdate {
        TabUpdate {
            tab_id,
            status: Some("complete".to_string()),
            url: Some(url.to_string()),
        }
    }

    fn suffix_sites() -> SitesConfig {
        SitesConfig {
            match_mode: MatchMode::Suffix,
            ..SitesConfig::default()
        }
    }

    #[test]
    fn test_substring_matching() {
        let sites = SitesConfig::default();

        assert!(is_shopping_url(&sites, "https://www.amazon.com/gp/cart"));
        assert!(is_shopping_url(&sites, "https://www.amazon.co.uk/dp/B000"));
        assert!(is_shopping_url(&sites, "https://www.flipkart.com/viewcart"));
        assert!(is_shopping_url(&sites, "https://www.etsy.com/listing/1"));
        assert!(!is_shopping_url(&sites, "https://www.example.com"));
        // Substring mode is spoofable
        assert!(is_shopping_url(&sites, "https://notamazon.com.evil.com/"));
        assert!(is_shopping_url(&sites, "https://example.com/?r=ebay.com"));
    }

    #[test]
    fn test_suffix_matching() {
        let sites = suffix_sites();

        assert!(is_shopping_url(&sites, "https://www.amazon.com/gp/cart"));
        assert!(is_shopping_url(&sites, "https://amazon.in/"));
        assert!(is_shopping_url(&sites, "https://smile.amazon.co.uk/x"));
        assert!(!is_shopping_url(&sites, "https://notamazon.com.evil.com/"));
        assert!(!is_shopping_url(&sites, "https://notamazon.com/"));
        assert!(!is_shopping_url(&sites, "https://example.com/?r=ebay.com"));
        assert!(!is_shopping_url(&sites, "not a url"));
    }

    #[tokio::test]
    async fn test_completed_shopping_tab_gets_content_script() {
        let platform = MemoryPlatform::new();

        let outcome = handle_tab_updated(
            &platform,
            &Config::default(),
            &complete(42, "https://www.amazon.com/gp/cart"),
        )
        .await;

        assert_eq!(outcome, InjectionOutcome::Injected);
        assert_eq!(platform.injections(), vec![(42, vec!["content.js".to_string()])]);
    }

    #[tokio::test]
    async fn test_other_sites_are_ignored() {
        let platform = MemoryPlatform::new();

        let outcome = handle_tab_updated(
            &platform,
            &Config::default(),
            &complete(42, "https://www.example.com"),
        )
        .await;

        assert_eq!(outcome, InjectionOutcome::Ignored);
        assert!(platform.injections().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_or_urlless_updates_are_ignored() {
        let platform = MemoryPlatform::new();
        let config = Config::default();

        let loading = TabUpdate {
            status: Some("loading".to_string()),
            ..complete(7, "https://www.walmart.com/cart")
        };
        let no_url = TabUpdate {
            url: None,
            ..complete(7, "")
        };
        let title_change = TabUpdate {
            status: None,
            ..complete(7, "https://www.walmart.com/cart")
        };

        for update in [loading, no_url, title_change] {
            assert_eq!(
                handle_tab_updated(&platform, &config, &update).await,
                InjectionOutcome::Ignored
            );
        }
        assert!(platform.injections().is_empty());
    }

    #[tokio::test]
    async fn test_injection_failure_is_reported_not_raised() {
        let platform = MemoryPlatform::new();
        platform.fail_injections(true);

        let outcome = handle_tab_updated(
            &platform,
            &Config::default(),
            &complete(3, "https://www.ebay.com/itm/1"),
        )
        .await;

        assert_eq!(outcome, InjectionOutcome::InjectionFailed);
    }

    #[tokio::test]
    async fn test_icon_click_opens_main_page() {
        let platform = MemoryPlatform::new();

        let url = open_main_page(&platform, &PagesConfig::default())
            .await
            .unwrap();

        assert_eq!(url, "chrome-extension://spindle/popup.html");
        assert_eq!(platform.opened_tabs(), vec![url]);
    }
}
