//! The application's localization entry point.
//!
//! A [`LocalizationStore`] owns the active locale: an immutable
//! [`ActiveLocale`] made of one catalog layer per configured resource prefix.
//! Switching locales builds a complete new `ActiveLocale` off to the side and
//! swaps the shared pointer, so readers observe either the old or the new
//! locale in full.
//!
//! Layers are searched most-recently-installed first, the same order stacked
//! translators are consulted in.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::catalog::{Catalog, EntryStatus, Lookup};
use crate::config::I18nConfig;
use crate::error::I18nError;
use crate::locale::{LanguageTag, locate_resource, resource_candidates};
use crate::ts;

/// Immutable snapshot of the active locale.
#[derive(Debug, Clone)]
pub struct ActiveLocale {
    locale: LanguageTag,
    layers: Vec<Arc<Catalog>>,
}

impl ActiveLocale {
    /// A locale with no catalogs: every lookup shows the source text.
    #[must_use]
    pub fn source(locale: LanguageTag) -> Self {
        Self {
            locale,
            layers: Vec::new(),
        }
    }

    /// Locale backed by `layers`, oldest first.
    #[must_use]
    pub fn new(locale: LanguageTag, layers: Vec<Arc<Catalog>>) -> Self {
        Self { locale, layers }
    }

    /// Locale these layers translate into.
    #[must_use]
    pub fn locale(&self) -> &LanguageTag {
        &self.locale
    }

    /// Catalog layers in installation order.
    #[must_use]
    pub fn layers(&self) -> &[Arc<Catalog>] {
        &self.layers
    }

    /// Whether strings are shown untranslated.
    #[must_use]
    pub fn is_source_language(&self) -> bool {
        self.layers.is_empty()
    }

    /// First translation found, searching the newest layer first.
    #[must_use]
    pub fn lookup<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
    ) -> Lookup<'a> {
        self.layers
            .iter()
            .rev()
            .map(|catalog| catalog.lookup(context, source, disambiguator))
            .find(|result| result.is_translated())
            .unwrap_or(Lookup::Fallback(source))
    }

    /// Plural counterpart of [`lookup`](Self::lookup); `n` picks the form.
    #[must_use]
    pub fn lookup_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
        n: u64,
    ) -> Lookup<'a> {
        self.layers
            .iter()
            .rev()
            .map(|catalog| catalog.lookup_plural(context, source, disambiguator, n))
            .find(|result| result.is_translated())
            .unwrap_or(Lookup::Fallback(source))
    }

    /// Status reported by the newest layer that knows the entry.
    #[must_use]
    pub fn status_of(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> EntryStatus {
        self.layers
            .iter()
            .rev()
            .map(|catalog| catalog.status_of(context, source, disambiguator))
            .find(|status| *status != EntryStatus::Missing)
            .unwrap_or(EntryStatus::Missing)
    }
}

/// Shared, swappable localization state.
///
/// # Example
///
/// ```
/// use viv_i18n::{Catalog, I18nConfig, LocalizationStore, Message};
/// use viv_i18n::locale::LanguageTag;
///
/// let store = LocalizationStore::new(I18nConfig::default());
/// assert_eq!(store.translate("MainWindow", "Zoom In", None), "Zoom In");
///
/// let mut builder = Catalog::builder(LanguageTag::parse("cs_CZ").unwrap());
/// builder.push("MainWindow", Message::new("Zoom In", "Zvětšit"));
/// store.install(builder.build());
/// assert_eq!(store.translate("MainWindow", "Zoom In", None), "Zvětšit");
/// ```
#[derive(Debug)]
pub struct LocalizationStore {
    config: I18nConfig,
    active: RwLock<Arc<ActiveLocale>>,
}

impl LocalizationStore {
    /// A store showing source-language strings until a locale is selected.
    #[must_use]
    pub fn new(config: I18nConfig) -> Self {
        let source = ActiveLocale::source(config.source_language_tag());
        Self {
            config,
            active: RwLock::new(Arc::new(source)),
        }
    }

    /// A store switched to the locale the configuration asks for.
    ///
    /// Failures are logged and leave the store in the source language.
    #[must_use]
    pub fn from_config(config: I18nConfig) -> Self {
        let store = Self::new(config);
        match store.config.requested_locale() {
            Some(locale) => {
                if let Err(err) = store.switch_locale(&locale) {
                    warn!(%locale, %err, "falling back to source-language strings");
                }
            }
            None => warn!("no usable locale configured, using source-language strings"),
        }
        store
    }

    /// Configuration the store was created with.
    #[must_use]
    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// Current locale snapshot; cheap to clone and safe to hold across switches.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ActiveLocale> {
        Arc::clone(&self.active.read())
    }

    /// Locale currently active.
    #[must_use]
    pub fn locale(&self) -> LanguageTag {
        self.snapshot().locale().clone()
    }

    /// Load the catalogs for `locale` and make them active.
    ///
    /// Each configured prefix contributes one layer. A prefix without a
    /// resource is skipped; a resource that fails to load is skipped and its
    /// error returned after the switch. When no layer could be found at all,
    /// the `NotFound` error is returned and the store shows source-language
    /// strings. A locale in the source language loads nothing.
    ///
    /// Returns the number of layers installed.
    pub fn switch_locale(&self, locale: &LanguageTag) -> Result<usize, I18nError> {
        if locale.same_language(&self.config.source_language_tag()) {
            self.replace(ActiveLocale::source(locale.clone()));
            info!(%locale, "switched to source language");
            return Ok(0);
        }

        let dir = &self.config.resource_dir;
        let mut layers = Vec::with_capacity(self.config.file_prefixes.len());
        let mut load_error = None;
        let mut not_found = None;

        for prefix in &self.config.file_prefixes {
            let Some(path) = locate_resource(dir, prefix, locale) else {
                warn!(%locale, prefix = %prefix, dir = %dir.display(), "no translation resource");
                let path = resource_candidates(dir, prefix, locale)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| dir.join(prefix));
                not_found.get_or_insert(I18nError::NotFound { path });
                continue;
            };
            match ts::load(&path) {
                Ok(catalog) => layers.push(Arc::new(catalog)),
                Err(err) => {
                    warn!(%locale, path = %path.display(), %err, "skipping translation layer");
                    load_error.get_or_insert(err);
                }
            }
        }

        let loaded = layers.len();
        self.replace(ActiveLocale::new(locale.clone(), layers));
        info!(%locale, layers = loaded, "switched locale");

        match (load_error, not_found) {
            (Some(err), _) => Err(err),
            (None, Some(err)) if loaded == 0 => Err(err),
            _ => Ok(loaded),
        }
    }

    /// Make a prebuilt catalog the only active layer.
    pub fn install(&self, catalog: Catalog) {
        let locale = catalog.language().clone();
        info!(%locale, messages = catalog.message_count(), "installing catalog");
        self.replace(ActiveLocale::new(locale, vec![Arc::new(catalog)]));
    }

    /// Return to source-language strings.
    pub fn reset(&self) {
        self.replace(ActiveLocale::source(self.config.source_language_tag()));
    }

    /// Displayable text for `source` in `context`.
    #[must_use]
    pub fn translate(&self, context: &str, source: &str, disambiguator: Option<&str>) -> String {
        self.snapshot()
            .lookup(context, source, disambiguator)
            .text()
            .to_string()
    }

    /// Displayable numerus text for count `n`; `%n` is left in place.
    #[must_use]
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
        n: u64,
    ) -> String {
        self.snapshot()
            .lookup_plural(context, source, disambiguator, n)
            .text()
            .to_string()
    }

    /// Status of an entry in the active locale.
    #[must_use]
    pub fn status_of(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> EntryStatus {
        self.snapshot().status_of(context, source, disambiguator)
    }

    fn replace(&self, next: ActiveLocale) {
        let previous = std::mem::replace(&mut *self.active.write(), Arc::new(next));
        drop(previous);
    }
}
