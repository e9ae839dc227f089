//! Translation catalog for one locale.
//!
//! # Invariants
//!
//! 1. **Contexts are unique by name**: a name seen twice while building is
//!    merged into the first context, with messages appended in the order
//!    encountered.
//!
//! 2. **Messages are unique by `(source, comment)`** within a context: a
//!    duplicate merges its locations into the first occurrence.
//!
//! 3. **Lookup never fails**: a missing, unfinished, empty, or vanished entry
//!    degrades to [`Lookup::Fallback`] carrying the caller's source text.
//!
//! 4. **Ambiguity is deterministic**: without a disambiguator, the first live
//!    message in document order wins on every call.
//!
//! 5. **Thread safety**: `Catalog` is `Send + Sync` and immutable after
//!    [`CatalogBuilder::build`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing context/message | Not in resource | `Fallback(source)` / `Missing` |
//! | Unfinished entry | Draft translation | `Fallback(source)` |
//! | Vanished entry | Source text no longer used | Excluded from lookup, reported by `status_of` |
//! | Ambiguous source | Same source, different comments | First live match, warning logged |
//! | Missing numerus form | Fewer forms than the rule needs | `Fallback(source)` |

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, warn};

use crate::locale::LanguageTag;
use crate::plural::PluralRule;

/// Format revision written by current Qt Linguist tooling.
pub const DEFAULT_FORMAT_VERSION: &str = "2.1";

/// Translation state marker carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TranslationStatus {
    /// Reviewed translation (no marker in the resource).
    #[default]
    Finished,
    /// Empty or draft translation.
    Unfinished,
    /// Historical entry whose source text is no longer referenced.
    Vanished,
}

impl TranslationStatus {
    /// Parse a `type` attribute value. `None` means no marker.
    ///
    /// `obsolete` is the older spelling of `vanished`.
    #[must_use]
    pub fn from_marker(marker: Option<&str>) -> Option<Self> {
        match marker {
            None | Some("") => Some(Self::Finished),
            Some("unfinished") => Some(Self::Unfinished),
            Some("vanished" | "obsolete") => Some(Self::Vanished),
            Some(_) => None,
        }
    }

    /// Marker value as written in a resource.
    #[must_use]
    pub const fn as_marker(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Whether entries with this status take part in lookup.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Vanished)
    }
}

/// Result of [`Catalog::status_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Translated and approved.
    Finished,
    /// Present but awaiting review.
    Unfinished,
    /// Kept only for reference; no longer in the sources.
    Vanished,
    /// No such message exists.
    Missing,
}

impl From<TranslationStatus> for EntryStatus {
    fn from(status: TranslationStatus) -> Self {
        match status {
            TranslationStatus::Finished => Self::Finished,
            TranslationStatus::Unfinished => Self::Unfinished,
            TranslationStatus::Vanished => Self::Vanished,
        }
    }
}

/// A source location that referenced a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Originating file, relative to the resource.
    pub file: Option<String>,
    /// Line number, when known.
    pub line: Option<u32>,
}

impl Location {
    /// Location with both file and line known.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Plain translation.
    Text(String),
    /// Numerus forms, in rule order.
    Plural(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Translation {
    /// The plain text, or the first numerus form.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Plural(forms) => forms.first().map_or("", String::as_str),
        }
    }

    /// Numerus form `index`; plain text answers every index.
    #[must_use]
    pub fn form(&self, index: usize) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Plural(forms) => forms.get(index).map(String::as_str),
        }
    }

    /// Whether there is no usable text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Plural(forms) => forms.iter().all(String::is_empty),
        }
    }
}

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) source: String,
    pub(crate) comment: Option<String>,
    pub(crate) extra_comment: Option<String>,
    pub(crate) translator_comment: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) translation: Translation,
    pub(crate) status: TranslationStatus,
    pub(crate) locations: Vec<Location>,
}

impl Message {
    /// A finished message with a plain translation.
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            comment: None,
            extra_comment: None,
            translator_comment: None,
            id: None,
            translation: Translation::Text(translation.into()),
            status: TranslationStatus::Finished,
            locations: Vec::new(),
        }
    }

    /// A finished numerus message.
    #[must_use]
    pub fn plural(source: impl Into<String>, forms: Vec<String>) -> Self {
        Self {
            translation: Translation::Plural(forms),
            ..Self::new(source, "")
        }
    }

    /// Replace the status marker.
    #[must_use]
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the disambiguating comment. An empty comment means none.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = non_empty(comment.into());
        self
    }

    /// Attach a note for translators.
    #[must_use]
    pub fn with_extra_comment(mut self, note: impl Into<String>) -> Self {
        self.extra_comment = non_empty(note.into());
        self
    }

    /// Attach the translator's own remark (`<translatorcomment>`).
    #[must_use]
    pub fn with_translator_comment(mut self, note: impl Into<String>) -> Self {
        self.translator_comment = non_empty(note.into());
        self
    }

    /// Set the stable message id. An empty id means none.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = non_empty(id.into());
        self
    }

    /// Append a source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Source text, the lookup key.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Disambiguating comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Note for translators (`<extracomment>`).
    #[must_use]
    pub fn extra_comment(&self) -> Option<&str> {
        self.extra_comment.as_deref()
    }

    /// Remark left by the translator.
    #[must_use]
    pub fn translator_comment(&self) -> Option<&str> {
        self.translator_comment.as_deref()
    }

    /// Stable message id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Singular text or plural forms.
    #[must_use]
    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    /// Status marker as read.
    #[must_use]
    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    /// Where the string occurs in the sources.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// True for plural (`numerus`) messages.
    #[must_use]
    pub fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Plural(_))
    }

    fn matches(&self, source: &str, comment: Option<&str>) -> bool {
        self.source == source && self.comment.as_deref() == comment
    }

    /// Usable text for numerus form `index`, if this entry is finished.
    fn finished_form(&self, index: usize) -> Option<&str> {
        if self.status != TranslationStatus::Finished {
            return None;
        }
        self.translation.form(index).filter(|s| !s.is_empty())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn normalize_comment(comment: Option<&str>) -> Option<&str> {
    comment.filter(|c| !c.is_empty())
}

/// Named group of messages, typically one UI surface.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    messages: Vec<Message>,
    /// Indices into `messages` by source text, in document order.
    by_source: HashMap<String, Vec<usize>>,
}

impl Context {
    fn new(name: String) -> Self {
        Self {
            name,
            messages: Vec::new(),
            by_source: HashMap::new(),
        }
    }

    /// Context name, usually the owning class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages in document order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, vanished included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the context holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Exact `(source, comment)` match, vanished entries included.
    #[must_use]
    pub fn get(&self, source: &str, comment: Option<&str>) -> Option<&Message> {
        let comment = normalize_comment(comment);
        self.candidates(source)
            .find(|message| message.comment.as_deref() == comment)
    }

    fn candidates<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a Message> + use<'a> {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .map(|&index| &self.messages[index])
    }

    fn live_candidates<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a Message> + use<'a> {
        self.candidates(source)
            .filter(|message| message.status.is_live())
    }

    /// Live message for a lookup, applying the disambiguation rules.
    fn resolve(&self, source: &str, disambiguator: Option<&str>) -> Option<&Message> {
        match normalize_comment(disambiguator) {
            Some(comment) => self
                .live_candidates(source)
                .find(|message| message.comment.as_deref() == Some(comment)),
            None => {
                let mut live = self.live_candidates(source);
                let first = live.next()?;
                if live.next().is_some() {
                    debug!(
                        context = %self.name,
                        source,
                        "ambiguous lookup without disambiguator, using first match"
                    );
                }
                Some(first)
            }
        }
    }

    fn push(&mut self, message: Message) {
        let existing = self
            .by_source
            .get(&message.source)
            .into_iter()
            .flatten()
            .copied()
            .find(|&index| {
                self.messages[index].matches(&message.source, message.comment.as_deref())
            });

        match existing {
            Some(index) => self.merge_into(index, message),
            None => {
                let index = self.messages.len();
                self.by_source
                    .entry(message.source.clone())
                    .or_default()
                    .push(index);
                self.messages.push(message);
            }
        }
    }

    fn merge_into(&mut self, index: usize, incoming: Message) {
        let name = &self.name;
        let target = &mut self.messages[index];
        target.locations.extend(incoming.locations);

        if !target.status.is_live() && incoming.status.is_live() {
            target.translation = incoming.translation;
            target.status = incoming.status;
        } else if incoming.status.is_live() && incoming.translation != target.translation {
            warn!(
                context = %name,
                source = %target.source,
                "duplicate message with a different translation, keeping the first"
            );
        }

        if target.extra_comment.is_none() {
            target.extra_comment = incoming.extra_comment;
        }
        if target.translator_comment.is_none() {
            target.translator_comment = incoming.translator_comment;
        }
        if target.id.is_none() {
            target.id = incoming.id;
        }
    }

    fn ambiguous_sources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for message in &self.messages {
            let source = message.source.as_str();
            if seen.contains(&source) || !message.status.is_live() {
                continue;
            }
            if self.live_candidates(source).nth(1).is_some() {
                seen.push(source);
            }
        }
        seen
    }

    fn coverage(&self) -> ContextCoverage {
        let mut counts = StatusCounts::default();
        for message in &self.messages {
            counts.add(message.status);
        }
        ContextCoverage {
            name: self.name.clone(),
            finished: counts.finished,
            unfinished: counts.unfinished,
            vanished: counts.vanished,
            completion_percent: counts.completion_percent(),
        }
    }
}

/// Outcome of a lookup. Text is returned raw; `%1`-style placeholders are
/// left for the caller to substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Finished, non-empty translation.
    Translated(&'a str),
    /// The caller's source text, shown untranslated.
    Fallback(&'a str),
}

impl<'a> Lookup<'a> {
    /// Displayable text, translated or not.
    #[must_use]
    pub fn text(self) -> &'a str {
        match self {
            Self::Translated(s) | Self::Fallback(s) => s,
        }
    }

    /// True when a non-empty translation was found.
    #[must_use]
    pub fn is_translated(self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

/// All translations for one locale.
///
/// # Example
///
/// ```
/// use viv_i18n::{Catalog, Lookup, Message, TranslationStatus};
/// use viv_i18n::locale::LanguageTag;
///
/// let mut builder = Catalog::builder(LanguageTag::parse("cs").unwrap());
/// builder.push("MainWindow", Message::new("Zoom In", "Zvětšit"));
/// builder.push(
///     "MainWindow",
///     Message::new("%1x%2", "").with_status(TranslationStatus::Unfinished),
/// );
/// let catalog = builder.build();
///
/// assert_eq!(
///     catalog.lookup("MainWindow", "Zoom In", None),
///     Lookup::Translated("Zvětšit")
/// );
/// assert_eq!(
///     catalog.lookup("MainWindow", "%1x%2", None),
///     Lookup::Fallback("%1x%2")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    language: LanguageTag,
    source_language: Option<LanguageTag>,
    plural_rule: PluralRule,
    contexts: Vec<Context>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Start building a catalog for `language`.
    #[must_use]
    pub fn builder(language: LanguageTag) -> CatalogBuilder {
        CatalogBuilder::new(language)
    }

    /// A catalog with no entries: every lookup falls back to the source text.
    #[must_use]
    pub fn empty(language: LanguageTag) -> Self {
        CatalogBuilder::new(language).build()
    }

    /// Format revision of the resource (e.g. `"2.1"`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target language.
    #[must_use]
    pub fn language(&self) -> &LanguageTag {
        &self.language
    }

    /// Language of the source strings, when declared.
    #[must_use]
    pub fn source_language(&self) -> Option<&LanguageTag> {
        self.source_language.as_ref()
    }

    /// Plural rule derived from the target language.
    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Contexts in document order.
    #[must_use]
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.by_name.get(name).map(|&index| &self.contexts[index])
    }

    /// Total number of messages, vanished included.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(Context::len).sum()
    }

    /// True when no context holds a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }

    /// Best available text for `source` in `context`.
    ///
    /// With a disambiguator, only the exact `(source, disambiguator)` entry
    /// matches. Without one, the first live entry with that source text in
    /// document order matches. Numerus messages answer with their first form.
    #[must_use]
    pub fn lookup<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
    ) -> Lookup<'a> {
        self.lookup_form(context, source, disambiguator, |_| 0)
    }

    /// Like [`lookup`](Self::lookup), selecting the numerus form for `n`
    /// with the catalog language's plural rule.
    #[must_use]
    pub fn lookup_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
        n: u64,
    ) -> Lookup<'a> {
        let rule = self.plural_rule;
        self.lookup_form(context, source, disambiguator, |_| rule.form_index(n))
    }

    fn lookup_form<'a, F>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
        pick: F,
    ) -> Lookup<'a>
    where
        F: FnOnce(&Message) -> usize,
    {
        self.context(context)
            .and_then(|ctx| ctx.resolve(source, disambiguator))
            .and_then(|message| message.finished_form(pick(message)))
            .map_or(Lookup::Fallback(source), Lookup::Translated)
    }

    /// Translation state of the exact `(source, disambiguator)` entry.
    ///
    /// Unlike lookup, vanished entries are reported.
    #[must_use]
    pub fn status_of(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> EntryStatus {
        self.context(context)
            .and_then(|ctx| ctx.get(source, disambiguator))
            .map_or(EntryStatus::Missing, |message| message.status.into())
    }

    /// `(context, source)` pairs with more than one live entry.
    #[must_use]
    pub fn ambiguities(&self) -> Vec<(&str, &str)> {
        self.contexts
            .iter()
            .flat_map(|ctx| {
                ctx.ambiguous_sources()
                    .into_iter()
                    .map(move |source| (ctx.name(), source))
            })
            .collect()
    }

    /// Per-status counts for the whole catalog and each context.
    #[must_use]
    pub fn coverage(&self) -> CoverageReport {
        let contexts: Vec<ContextCoverage> = self.contexts.iter().map(Context::coverage).collect();
        let mut counts = StatusCounts::default();
        for ctx in &contexts {
            counts.finished += ctx.finished;
            counts.unfinished += ctx.unfinished;
            counts.vanished += ctx.vanished;
        }
        CoverageReport {
            language: self.language.name(),
            total: counts.finished + counts.unfinished + counts.vanished,
            finished: counts.finished,
            unfinished: counts.unfinished,
            vanished: counts.vanished,
            completion_percent: counts.completion_percent(),
            contexts,
        }
    }
}

/// Incremental catalog construction with merge-on-duplicate rules.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    version: String,
    language: LanguageTag,
    source_language: Option<LanguageTag>,
    contexts: Vec<Context>,
    by_name: HashMap<String, usize>,
}

impl CatalogBuilder {
    /// Empty builder for `language` at the default format version.
    #[must_use]
    pub fn new(language: LanguageTag) -> Self {
        Self {
            version: DEFAULT_FORMAT_VERSION.to_string(),
            language,
            source_language: None,
            contexts: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Override the format revision.
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// Declare the language of the source strings.
    pub fn source_language(&mut self, language: Option<LanguageTag>) -> &mut Self {
        self.source_language = language;
        self
    }

    /// Make sure a context exists, even if it ends up with no messages.
    pub fn context(&mut self, name: &str) -> &mut Self {
        self.context_index(name);
        self
    }

    /// Append `message` to `context`, merging duplicates.
    pub fn push(&mut self, context: &str, message: Message) -> &mut Self {
        let index = self.context_index(context);
        self.contexts[index].push(message);
        self
    }

    fn context_index(&mut self, name: &str) -> usize {
        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let index = self.contexts.len();
                self.contexts.push(Context::new(entry.key().clone()));
                entry.insert(index);
                index
            }
        }
    }

    /// Freeze into an immutable catalog, reporting ambiguous entries.
    #[must_use]
    pub fn build(self) -> Catalog {
        let catalog = Catalog {
            plural_rule: PluralRule::for_language(&self.language),
            version: self.version,
            language: self.language,
            source_language: self.source_language,
            contexts: self.contexts,
            by_name: self.by_name,
        };
        for (context, source) in catalog.ambiguities() {
            warn!(
                context,
                source,
                "source text has several translations and needs a disambiguator"
            );
        }
        catalog
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct StatusCounts {
    finished: usize,
    unfinished: usize,
    vanished: usize,
}

impl StatusCounts {
    fn add(&mut self, status: TranslationStatus) {
        match status {
            TranslationStatus::Finished => self.finished += 1,
            TranslationStatus::Unfinished => self.unfinished += 1,
            TranslationStatus::Vanished => self.vanished += 1,
        }
    }

    fn completion_percent(self) -> f32 {
        let live = self.finished + self.unfinished;
        if live == 0 {
            100.0
        } else {
            (self.finished as f32 / live as f32) * 100.0
        }
    }
}

/// Translation progress of a catalog.
///
/// Completion counts live entries only; vanished entries are history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageReport {
    /// Locale name (e.g. `"cs_CZ"`).
    pub language: String,
    /// Number of messages, vanished included.
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    /// Finished share of live entries (0.0–100.0).
    pub completion_percent: f32,
    /// Per-context breakdown, in document order.
    pub contexts: Vec<ContextCoverage>,
}

/// Translation progress of one context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextCoverage {
    pub name: String,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub completion_percent: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn cs() -> LanguageTag {
        LanguageTag::parse("cs").unwrap()
    }

    fn main_window_catalog() -> Catalog {
        let mut b = Catalog::builder(cs());
        b.push("MainWindow", Message::new("Zoom In", "Zvětšit"))
            .push(
                "MainWindow",
                Message::new("%1x%2", "").with_status(TranslationStatus::Unfinished),
            )
            .push(
                "MainWindow",
                Message::new("Rotate", "Otočit (staré)").with_status(TranslationStatus::Vanished),
            )
            .push("MainWindow", Message::new("Empty", ""))
            .push(
                "MainWindow",
                Message::new("Zoom: %1%", "Zvětšení: %1 %")
                    .with_extra_comment("Used in the statusbar"),
            );
        b.build()
    }

    #[test]
    fn finished_entry_is_translated() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup("MainWindow", "Zoom In", None),
            Lookup::Translated("Zvětšit")
        );
    }

    #[test]
    fn placeholders_are_returned_raw() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup("MainWindow", "Zoom: %1%", None).text(),
            "Zvětšení: %1 %"
        );
    }

    #[test]
    fn unfinished_and_empty_fall_back() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup("MainWindow", "%1x%2", None),
            Lookup::Fallback("%1x%2")
        );
        assert_eq!(
            catalog.lookup("MainWindow", "Empty", None),
            Lookup::Fallback("Empty")
        );
    }

    #[test]
    fn missing_context_or_source_falls_back() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup("NoSuchDialog", "Zoom In", None),
            Lookup::Fallback("Zoom In")
        );
        assert_eq!(
            catalog.lookup("MainWindow", "Zoom Out", None),
            Lookup::Fallback("Zoom Out")
        );
    }

    #[test]
    fn vanished_excluded_from_lookup_but_reported() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup("MainWindow", "Rotate", None),
            Lookup::Fallback("Rotate")
        );
        assert_eq!(
            catalog.status_of("MainWindow", "Rotate", None),
            EntryStatus::Vanished
        );
    }

    #[test]
    fn status_of_each_state() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.status_of("MainWindow", "Zoom In", None),
            EntryStatus::Finished
        );
        assert_eq!(
            catalog.status_of("MainWindow", "%1x%2", None),
            EntryStatus::Unfinished
        );
        assert_eq!(
            catalog.status_of("MainWindow", "Zoom In", Some("toolbar")),
            EntryStatus::Missing
        );
        assert_eq!(
            catalog.status_of("Other", "Zoom In", None),
            EntryStatus::Missing
        );
    }

    #[test]
    fn disambiguator_selects_exact_entry() {
        let mut b = Catalog::builder(cs());
        b.push("Units", Message::new("B", "B").with_comment("File size"))
            .push("Units", Message::new("B", "Modrá").with_comment("Color channel"));
        let catalog = b.build();

        assert_eq!(
            catalog.lookup("Units", "B", Some("Color channel")),
            Lookup::Translated("Modrá")
        );
        assert_eq!(
            catalog.lookup("Units", "B", Some("Unknown")),
            Lookup::Fallback("B")
        );
    }

    #[test]
    fn empty_disambiguator_equals_none() {
        let mut b = Catalog::builder(cs());
        b.push("Ctx", Message::new("Open", "Otevřít").with_comment(""));
        let catalog = b.build();
        assert_eq!(
            catalog.lookup("Ctx", "Open", Some("")),
            Lookup::Translated("Otevřít")
        );
        assert_eq!(catalog.status_of("Ctx", "Open", Some("")), EntryStatus::Finished);
    }

    #[traced_test]
    #[test]
    fn ambiguous_lookup_returns_first_and_warns() {
        let mut b = Catalog::builder(cs());
        b.push("Units", Message::new("B", "bajt").with_comment("File size"))
            .push("Units", Message::new("B", "Modrá").with_comment("Color channel"));
        let catalog = b.build();

        assert!(logs_contain("needs a disambiguator"));
        for _ in 0..3 {
            assert_eq!(
                catalog.lookup("Units", "B", None),
                Lookup::Translated("bajt")
            );
        }
        assert!(logs_contain("ambiguous lookup"));
        assert_eq!(catalog.ambiguities(), vec![("Units", "B")]);
    }

    #[test]
    fn vanished_entries_do_not_count_as_ambiguous() {
        let mut b = Catalog::builder(cs());
        b.push(
            "Ctx",
            Message::new("Open", "Staré")
                .with_comment("old")
                .with_status(TranslationStatus::Vanished),
        )
        .push("Ctx", Message::new("Open", "Otevřít"));
        let catalog = b.build();
        assert!(catalog.ambiguities().is_empty());
        assert_eq!(
            catalog.lookup("Ctx", "Open", None),
            Lookup::Translated("Otevřít")
        );
    }

    #[test]
    fn duplicate_contexts_merge_in_order() {
        let mut b = Catalog::builder(cs());
        b.push("A", Message::new("one", "jedna"))
            .push("B", Message::new("x", "x"))
            .push("A", Message::new("two", "dva"));
        let catalog = b.build();

        assert_eq!(catalog.contexts().len(), 2);
        let sources: Vec<&str> = catalog
            .context("A")
            .unwrap()
            .messages()
            .iter()
            .map(Message::source)
            .collect();
        assert_eq!(sources, vec!["one", "two"]);
    }

    #[traced_test]
    #[test]
    fn duplicate_messages_merge_locations() {
        let mut b = Catalog::builder(cs());
        b.push(
            "Ctx",
            Message::new("Quit", "Ukončit").with_location(Location::new("main.cpp", 10)),
        )
        .push(
            "Ctx",
            Message::new("Quit", "Konec").with_location(Location::new("menu.ui", 4)),
        );
        let catalog = b.build();

        let ctx = catalog.context("Ctx").unwrap();
        assert_eq!(ctx.len(), 1);
        let message = &ctx.messages()[0];
        assert_eq!(
            message.locations(),
            &[Location::new("main.cpp", 10), Location::new("menu.ui", 4)]
        );
        assert_eq!(message.translation().text(), "Ukončit");
        assert!(logs_contain("keeping the first"));
    }

    #[test]
    fn live_duplicate_supersedes_vanished() {
        let mut b = Catalog::builder(cs());
        b.push(
            "Ctx",
            Message::new("Quit", "Staré").with_status(TranslationStatus::Vanished),
        )
        .push("Ctx", Message::new("Quit", "Ukončit"));
        let catalog = b.build();
        assert_eq!(catalog.lookup("Ctx", "Quit", None), Lookup::Translated("Ukončit"));
        assert_eq!(catalog.message_count(), 1);
    }

    #[test]
    fn plural_lookup_uses_czech_rule() {
        let mut b = Catalog::builder(cs());
        b.push(
            "StatusBar",
            Message::plural(
                "%n file(s)",
                vec!["%n soubor".into(), "%n soubory".into(), "%n souborů".into()],
            ),
        );
        let catalog = b.build();

        assert_eq!(
            catalog.lookup_plural("StatusBar", "%n file(s)", None, 1).text(),
            "%n soubor"
        );
        assert_eq!(
            catalog.lookup_plural("StatusBar", "%n file(s)", None, 3).text(),
            "%n soubory"
        );
        assert_eq!(
            catalog.lookup_plural("StatusBar", "%n file(s)", None, 7).text(),
            "%n souborů"
        );
        assert_eq!(
            catalog.lookup("StatusBar", "%n file(s)", None).text(),
            "%n soubor"
        );
    }

    #[test]
    fn missing_numerus_form_falls_back() {
        let mut b = Catalog::builder(cs());
        b.push(
            "StatusBar",
            Message::plural("%n file(s)", vec!["%n soubor".into(), String::new()]),
        );
        let catalog = b.build();
        assert_eq!(
            catalog.lookup_plural("StatusBar", "%n file(s)", None, 2),
            Lookup::Fallback("%n file(s)")
        );
        assert_eq!(
            catalog.lookup_plural("StatusBar", "%n file(s)", None, 9),
            Lookup::Fallback("%n file(s)")
        );
    }

    #[test]
    fn plain_translation_answers_any_count() {
        let catalog = main_window_catalog();
        assert_eq!(
            catalog.lookup_plural("MainWindow", "Zoom In", None, 5),
            Lookup::Translated("Zvětšit")
        );
    }

    #[test]
    fn empty_catalog_always_falls_back() {
        let catalog = Catalog::empty(cs());
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.lookup("MainWindow", "Zoom In", None),
            Lookup::Fallback("Zoom In")
        );
        assert_eq!(catalog.version(), DEFAULT_FORMAT_VERSION);
        let report = catalog.coverage();
        assert_eq!(report.total, 0);
        assert!((report.completion_percent - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn coverage_counts_live_entries() {
        let catalog = main_window_catalog();
        let report = catalog.coverage();
        assert_eq!(report.language, "cs");
        assert_eq!(report.total, 5);
        assert_eq!(report.finished, 3);
        assert_eq!(report.unfinished, 1);
        assert_eq!(report.vanished, 1);
        assert!((report.completion_percent - 75.0).abs() < 0.01);
        assert_eq!(report.contexts.len(), 1);
        assert_eq!(report.contexts[0].name, "MainWindow");
    }

    #[test]
    fn builder_context_registers_empty_context() {
        let mut b = Catalog::builder(cs());
        b.context("Empty");
        let catalog = b.build();
        assert!(catalog.context("Empty").unwrap().is_empty());
    }

    #[test]
    fn status_markers() {
        assert_eq!(
            TranslationStatus::from_marker(Some("obsolete")),
            Some(TranslationStatus::Vanished)
        );
        assert_eq!(
            TranslationStatus::from_marker(None),
            Some(TranslationStatus::Finished)
        );
        assert_eq!(TranslationStatus::from_marker(Some("done")), None);
        assert_eq!(TranslationStatus::Unfinished.as_marker(), Some("unfinished"));
    }

    #[test]
    fn catalog_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
