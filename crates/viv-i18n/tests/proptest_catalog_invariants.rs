//! Property-based invariant tests for catalog loading and lookup.
//!
//! 1. Self lookup: every loaded message answers its own key with its
//!    translation when finished and non-empty, with the source text otherwise
//! 2. Context merge keeps the ordered union of messages and concatenates
//!    provenance of coinciding entries
//! 3. Vanished entries never translate but report `Vanished`
//! 4. Ambiguous lookups are deterministic
//! 5. Relative location lines accumulate per file
//! 6. Numerus form indices stay within the rule's form count

use std::collections::BTreeMap;

use proptest::prelude::*;
use viv_i18n::{
    EntryStatus, LanguageTag, Location, Lookup, PluralRule, TranslationStatus, parse_str,
};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    comment: Option<&'static str>,
    translation: String,
    marker: Option<&'static str>,
}

fn entry() -> impl Strategy<Value = Entry> {
    (
        prop::option::of(prop::sample::select(vec!["menu", "button"])),
        "[a-z ]{0,8}",
        prop::option::of(prop::sample::select(vec!["unfinished", "vanished", "obsolete"])),
    )
        .prop_map(|(comment, translation, marker)| Entry {
            comment,
            translation,
            marker,
        })
}

/// Keyed by (context index, source index) so every source is unique per context.
fn entries() -> impl Strategy<Value = BTreeMap<(u8, u8), Entry>> {
    prop::collection::btree_map((0u8..3, 0u8..6), entry(), 0..12)
}

fn message_xml(source: &str, entry: &Entry) -> String {
    let comment = entry
        .comment
        .map(|c| format!("<comment>{c}</comment>"))
        .unwrap_or_default();
    let marker = entry
        .marker
        .map(|m| format!(r#" type="{m}""#))
        .unwrap_or_default();
    format!(
        "<message><source>{source}</source>{comment}<translation{marker}>{}</translation></message>",
        entry.translation
    )
}

fn document(contexts: &[(String, Vec<String>)]) -> String {
    let body: String = contexts
        .iter()
        .map(|(name, messages)| {
            format!("<context><name>{name}</name>{}</context>", messages.concat())
        })
        .collect();
    format!(r#"<?xml version="1.0"?><!DOCTYPE TS><TS version="2.1" language="cs">{body}</TS>"#)
}

fn entries_document(entries: &BTreeMap<(u8, u8), Entry>) -> String {
    let contexts: Vec<(String, Vec<String>)> = entries
        .iter()
        .map(|(&(ctx, src), entry)| {
            let message = message_xml(&format!("Source {src}"), entry);
            (format!("Ctx{ctx}"), vec![message])
        })
        .collect();
    document(&contexts)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn self_lookup_matches_status(entries in entries()) {
        let catalog = parse_str(&entries_document(&entries)).unwrap();
        prop_assert_eq!(catalog.message_count(), entries.len());

        for (&(ctx, src), entry) in &entries {
            let context = format!("Ctx{ctx}");
            let source = format!("Source {src}");
            let lookup = catalog.lookup(&context, &source, entry.comment);
            let finished = entry.marker.is_none() && !entry.translation.is_empty();
            if finished {
                prop_assert_eq!(lookup, Lookup::Translated(entry.translation.as_str()));
            } else {
                prop_assert_eq!(lookup, Lookup::Fallback(source.as_str()));
            }
        }
    }

    #[test]
    fn vanished_entries_report_status_only(entries in entries()) {
        let catalog = parse_str(&entries_document(&entries)).unwrap();
        for (&(ctx, src), entry) in &entries {
            let context = format!("Ctx{ctx}");
            let source = format!("Source {src}");
            let expected = match entry.marker {
                None => EntryStatus::Finished,
                Some("unfinished") => EntryStatus::Unfinished,
                Some(_) => EntryStatus::Vanished,
            };
            prop_assert_eq!(catalog.status_of(&context, &source, entry.comment), expected);
            if expected == EntryStatus::Vanished {
                prop_assert!(!catalog.lookup(&context, &source, entry.comment).is_translated());
            }
        }
    }

    #[test]
    fn context_merge_keeps_ordered_union(
        first in prop::collection::vec(0u8..5, 0..8),
        second in prop::collection::vec(0u8..5, 0..8),
    ) {
        let part = |sources: &[u8], file: &str| -> Vec<String> {
            sources
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    format!(
                        r#"<message><location filename="{file}" line="{}"/><source>S{s}</source><translation>T{s}</translation></message>"#,
                        i + 1
                    )
                })
                .collect()
        };
        let doc = document(&[
            ("Merged".to_string(), part(&first, "a.cpp")),
            ("Other".to_string(), Vec::new()),
            ("Merged".to_string(), part(&second, "b.cpp")),
        ]);
        let catalog = parse_str(&doc).unwrap();

        let mut expected: Vec<u8> = Vec::new();
        for s in first.iter().chain(&second) {
            if !expected.contains(s) {
                expected.push(*s);
            }
        }
        let names: Vec<&str> = catalog.contexts().iter().map(|c| c.name()).collect();
        prop_assert_eq!(names, vec!["Merged", "Other"]);

        let merged = catalog.context("Merged").unwrap();
        let sources: Vec<String> = merged
            .messages()
            .iter()
            .map(|m| m.source().to_string())
            .collect();
        let expected_sources: Vec<String> = expected.iter().map(|s| format!("S{s}")).collect();
        prop_assert_eq!(sources, expected_sources);

        for message in merged.messages() {
            let occurrences = first
                .iter()
                .chain(&second)
                .filter(|s| format!("S{s}") == message.source())
                .count();
            prop_assert_eq!(message.locations().len(), occurrences);
        }
    }

    #[test]
    fn ambiguous_lookup_is_deterministic(
        translations in prop::collection::vec("[a-z]{1,6}", 2..5),
    ) {
        let messages: Vec<String> = translations
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "<message><source>Open</source><comment>c{i}</comment>\
                     <translation>{t}</translation></message>"
                )
            })
            .collect();
        let catalog = parse_str(&document(&[("MainWindow".to_string(), messages)])).unwrap();

        let first = catalog.lookup("MainWindow", "Open", None);
        prop_assert_eq!(first, Lookup::Translated(translations[0].as_str()));
        for _ in 0..3 {
            prop_assert_eq!(catalog.lookup("MainWindow", "Open", None), first);
        }
        prop_assert_eq!(catalog.ambiguities(), vec![("MainWindow", "Open")]);
    }

    #[test]
    fn relative_lines_accumulate(
        base in 1u32..1000,
        deltas in prop::collection::vec(0u32..50, 1..6),
    ) {
        let mut locations = format!(r#"<location filename="main.cpp" line="{base}"/>"#);
        for delta in &deltas {
            locations.push_str(&format!(r#"<location line="+{delta}"/>"#));
        }
        let message = format!(
            "<message>{locations}<source>Quit</source><translation>Konec</translation></message>"
        );
        let catalog = parse_str(&document(&[("C".to_string(), vec![message])])).unwrap();

        let mut line = base;
        let mut expected = vec![Location::new("main.cpp", line)];
        for delta in &deltas {
            line += delta;
            expected.push(Location::new("main.cpp", line));
        }
        let message = catalog.context("C").unwrap().get("Quit", None).unwrap();
        prop_assert_eq!(message.locations(), expected.as_slice());
        prop_assert_eq!(message.status(), TranslationStatus::Finished);
    }

    #[test]
    fn numerus_index_within_form_count(
        n in any::<u64>(),
        language in prop::sample::select(vec!["cs", "en", "fr", "pt_BR", "ru", "pl", "ja"]),
    ) {
        let rule = PluralRule::for_language(&LanguageTag::parse(language).unwrap());
        prop_assert!(rule.form_index(n) < rule.form_count());
    }
}
