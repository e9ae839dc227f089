//! Reader for Qt Linguist translation sources (`<TS>` documents).
//!
//! The document is consumed as an event stream so that every structural
//! error can name the line and column where it was detected.
//!
//! ```text
//! <TS version="2.1" language="cs">
//!   <context>
//!     <name>MainWindow</name>
//!     <message>
//!       <location filename="../../ui/MainWindow.cpp" line="478"/>
//!       <source>Zoom: %1%</source>
//!       <extracomment>Used in the statusbar</extracomment>
//!       <translation type="unfinished"></translation>
//!     </message>
//!   </context>
//! </TS>
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, info, instrument};
use xml::attribute::OwnedAttribute;
use xml::common::Position;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::catalog::{Catalog, CatalogBuilder, Location, Message, Translation, TranslationStatus};
use crate::error::{I18nError, ParseError};
use crate::locale::LanguageTag;

/// Load a catalog from a resource file.
///
/// A missing file fails with [`I18nError::NotFound`]; malformed content fails
/// with [`I18nError::Parse`] carrying the file path and position.
pub fn load(path: impl AsRef<Path>) -> Result<Catalog, I18nError> {
    load_path(path.as_ref())
}

#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
fn load_path(path: &Path) -> Result<Catalog, I18nError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            I18nError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            I18nError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let catalog = from_reader(BufReader::new(file)).map_err(|err| err.with_path(path))?;
    info!(
        path = %path.display(),
        language = %catalog.language(),
        contexts = catalog.contexts().len(),
        messages = catalog.message_count(),
        "loaded translation catalog"
    );
    Ok(catalog)
}

/// Parse a catalog from an in-memory document.
pub fn parse_str(document: &str) -> Result<Catalog, I18nError> {
    from_reader(document.as_bytes())
}

/// Parse a catalog from any byte stream.
pub fn from_reader<R: Read>(reader: R) -> Result<Catalog, I18nError> {
    TsReader::new(reader).read_catalog().map_err(I18nError::from)
}

struct TsReader<R: Read> {
    events: EventReader<R>,
    /// File of the most recent `<location>`, inherited when `filename` is absent.
    current_file: Option<String>,
    /// Last line seen per file, the base for `+N`/`-N` relative lines.
    last_line: HashMap<String, i64>,
}

impl<R: Read> TsReader<R> {
    fn new(reader: R) -> Self {
        let events = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .ignore_comments(true)
            .create_reader(reader);
        Self {
            events,
            current_file: None,
            last_line: HashMap::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let pos = self.events.position();
        ParseError::new(pos.row + 1, pos.column + 1, message)
    }

    fn next(&mut self) -> Result<XmlEvent, ParseError> {
        self.events.next().map_err(|err| {
            let pos = err.position();
            ParseError::new(pos.row + 1, pos.column + 1, err.msg())
        })
    }

    fn read_catalog(mut self) -> Result<Catalog, ParseError> {
        loop {
            match self.next()? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    if name.local_name != "TS" {
                        return Err(self.error(format!(
                            "expected <TS> root element, found <{}>",
                            name.local_name
                        )));
                    }
                    let catalog = self.read_ts(&attributes)?;
                    self.finish()?;
                    return Ok(catalog);
                }
                XmlEvent::EndDocument => return Err(self.error("document has no root element")),
                _ => {}
            }
        }
    }

    /// Consume the rest of the document so trailing garbage is reported.
    fn finish(&mut self) -> Result<(), ParseError> {
        loop {
            if let XmlEvent::EndDocument = self.next()? {
                return Ok(());
            }
        }
    }

    fn read_ts(&mut self, attributes: &[OwnedAttribute]) -> Result<Catalog, ParseError> {
        let version = attr(attributes, "version")
            .ok_or_else(|| self.error("<TS> is missing the version attribute"))?
            .to_string();
        let language = attr(attributes, "language")
            .ok_or_else(|| self.error("<TS> is missing the language attribute"))?;
        let language = LanguageTag::parse(language)
            .map_err(|_| self.error(format!("invalid language attribute {language:?}")))?;
        let source_language = match attr(attributes, "sourcelanguage") {
            None | Some("") => None,
            Some(raw) => Some(
                LanguageTag::parse(raw)
                    .map_err(|_| self.error(format!("invalid sourcelanguage attribute {raw:?}")))?,
            ),
        };

        let mut builder = Catalog::builder(language);
        builder.version(version).source_language(source_language);

        loop {
            match self.next()? {
                XmlEvent::StartElement { name, .. } if name.local_name == "context" => {
                    self.read_context(&mut builder)?;
                }
                XmlEvent::StartElement { name, .. } => self.skip(&name.local_name)?,
                XmlEvent::EndElement { .. } => break,
                XmlEvent::Characters(text) => self.expect_blank(&text, "TS")?,
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }

        Ok(builder.build())
    }

    fn read_context(&mut self, builder: &mut CatalogBuilder) -> Result<(), ParseError> {
        let mut name = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                XmlEvent::StartElement {
                    name: element,
                    attributes,
                    ..
                } => match element.local_name.as_str() {
                    "name" => name = Some(self.read_text()?),
                    "message" => messages.push(self.read_message(&attributes)?),
                    other => self.skip(other)?,
                },
                XmlEvent::EndElement { .. } => break,
                XmlEvent::Characters(text) => self.expect_blank(&text, "context")?,
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }

        let name = name.ok_or_else(|| self.error("<context> has no <name>"))?;
        builder.context(&name);
        for message in messages {
            builder.push(&name, message);
        }
        Ok(())
    }

    fn read_message(&mut self, attributes: &[OwnedAttribute]) -> Result<Message, ParseError> {
        let numerus = attr(attributes, "numerus") == Some("yes");
        let id = attr(attributes, "id").map(str::to_string);

        let mut source = None;
        let mut comment = None;
        let mut extra_comment = None;
        let mut translator_comment = None;
        let mut translation = None;
        let mut locations = Vec::new();

        loop {
            match self.next()? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => match name.local_name.as_str() {
                    "source" => source = Some(self.read_text()?),
                    "comment" => comment = Some(self.read_text()?),
                    "extracomment" => extra_comment = Some(self.read_text()?),
                    "translatorcomment" => translator_comment = Some(self.read_text()?),
                    "location" => {
                        locations.push(self.location(&attributes)?);
                        self.skip("location")?;
                    }
                    "translation" => {
                        translation = Some(self.read_translation(&attributes, numerus)?);
                    }
                    other => self.skip(other)?,
                },
                XmlEvent::EndElement { .. } => break,
                XmlEvent::Characters(text) => self.expect_blank(&text, "message")?,
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }

        let source = source.ok_or_else(|| self.error("<message> has no <source>"))?;
        let (translation, status) = translation.unwrap_or_else(|| {
            let empty = if numerus {
                Translation::Plural(Vec::new())
            } else {
                Translation::Text(String::new())
            };
            (empty, TranslationStatus::Unfinished)
        });

        let mut message = Message::new(source, "")
            .with_comment(comment.unwrap_or_default())
            .with_extra_comment(extra_comment.unwrap_or_default())
            .with_translator_comment(translator_comment.unwrap_or_default())
            .with_status(status);
        message.translation = translation;
        message.locations = locations;
        if let Some(id) = id {
            message = message.with_id(id);
        }
        Ok(message)
    }

    fn read_translation(
        &mut self,
        attributes: &[OwnedAttribute],
        numerus: bool,
    ) -> Result<(Translation, TranslationStatus), ParseError> {
        let marker = attr(attributes, "type");
        let status = TranslationStatus::from_marker(marker).ok_or_else(|| {
            self.error(format!(
                "unknown translation type {:?}",
                marker.unwrap_or_default()
            ))
        })?;

        if !numerus {
            return Ok((Translation::Text(self.read_text()?), status));
        }

        let mut forms = Vec::new();
        loop {
            match self.next()? {
                XmlEvent::StartElement { name, .. } if name.local_name == "numerusform" => {
                    forms.push(self.read_text()?);
                }
                XmlEvent::StartElement { name, .. } => self.skip(&name.local_name)?,
                XmlEvent::EndElement { .. } => break,
                XmlEvent::Characters(text) => self.expect_blank(&text, "translation")?,
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }
        Ok((Translation::Plural(forms), status))
    }

    /// Text content of the current element, up to its end tag.
    ///
    /// `<byte value="..."/>` children decode to characters; of several
    /// `<lengthvariant>` children only the first (longest) is kept.
    fn read_text(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        let mut took_variant = false;

        loop {
            match self.next()? {
                XmlEvent::Characters(s) | XmlEvent::Whitespace(s) | XmlEvent::CData(s) => {
                    text.push_str(&s);
                }
                XmlEvent::StartElement {
                    name, attributes, ..
                } => match name.local_name.as_str() {
                    "byte" => {
                        if let Some(ch) = self.byte(&attributes)? {
                            text.push(ch);
                        }
                        self.skip("byte")?;
                    }
                    "lengthvariant" => {
                        let variant = self.read_text()?;
                        if !took_variant {
                            text.push_str(&variant);
                            took_variant = true;
                        }
                    }
                    other => self.skip(other)?,
                },
                XmlEvent::EndElement { .. } => return Ok(text),
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }
    }

    fn byte(&self, attributes: &[OwnedAttribute]) -> Result<Option<char>, ParseError> {
        let raw = attr(attributes, "value")
            .ok_or_else(|| self.error("<byte> is missing the value attribute"))?;
        let (radix, digits) = if let Some(hex) = raw.strip_prefix("0x") {
            (16, hex)
        } else if let Some(hex) = raw.strip_prefix('x') {
            (16, hex)
        } else {
            (10, raw)
        };
        let invalid = || self.error(format!("invalid <byte> value {raw:?}"));
        let code = u32::from_str_radix(digits, radix).map_err(|_| invalid())?;
        if code == 0 {
            return Ok(None);
        }
        char::from_u32(code).map(Some).ok_or_else(invalid)
    }

    fn location(&mut self, attributes: &[OwnedAttribute]) -> Result<Location, ParseError> {
        let file = match attr(attributes, "filename") {
            Some(name) if !name.is_empty() => {
                self.current_file = Some(name.to_string());
                Some(name.to_string())
            }
            _ => self.current_file.clone(),
        };

        let line = match attr(attributes, "line") {
            None | Some("") => None,
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| self.error(format!("invalid location line {raw:?}")))?;
                let key = file.clone().unwrap_or_default();
                let line = if raw.starts_with(['+', '-']) {
                    self.last_line
                        .get(&key)
                        .copied()
                        .unwrap_or(0)
                        .checked_add(value)
                        .ok_or_else(|| self.error(format!("location line {raw:?} out of range")))?
                } else {
                    value
                };
                self.last_line.insert(key, line);
                Some(
                    u32::try_from(line)
                        .map_err(|_| self.error(format!("location line {line} out of range")))?,
                )
            }
        };

        Ok(Location { file, line })
    }

    /// Skip the rest of an element whose start tag was just read.
    fn skip(&mut self, element: &str) -> Result<(), ParseError> {
        if element != "location" && element != "byte" {
            debug!(element, "skipping element");
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                XmlEvent::StartElement { .. } => depth += 1,
                XmlEvent::EndElement { .. } => depth -= 1,
                XmlEvent::EndDocument => return Err(self.error("unexpected end of document")),
                _ => {}
            }
        }
        Ok(())
    }

    fn expect_blank(&self, text: &str, element: &str) -> Result<(), ParseError> {
        if text.trim().is_empty() {
            Ok(())
        } else {
            Err(self.error(format!("unexpected text inside <{element}>")))
        }
    }
}

fn attr<'a>(attributes: &'a [OwnedAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.prefix.is_none() && a.name.local_name == name)
        .map(|a| a.value.as_str())
}
