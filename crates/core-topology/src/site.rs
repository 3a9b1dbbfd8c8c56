//! Hadoop `*-site.xml` property parsing
//!
//! Site files are flat lists of `<property><name/><value/></property>`
//! blocks under a `<configuration>` root. The document is tokenized well
//! enough for what Hadoop writes and reads: attributes, whitespace inside
//! tags, self-closing elements, comments, processing instructions, CDATA
//! sections and the predefined entities. Text is only collected from the
//! `name` and `value` children of a top-level `property`.

use std::collections::HashMap;

/// Properties loaded from one site file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteProperties {
    values: HashMap<String, String>,
}

impl SiteProperties {
    /// Parse the text of a site file
    ///
    /// Later definitions of the same property override earlier ones.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut values = HashMap::new();
        let mut open: Vec<&str> = Vec::new();
        let mut seen_root = false;
        let mut name: Option<String> = None;
        let mut value: Option<String> = None;

        for token in tokenize(xml)? {
            match token {
                Token::Start(tag) => {
                    if open.is_empty() {
                        if seen_root || tag != "configuration" {
                            return Err("missing <configuration> root".to_string());
                        }
                        seen_root = true;
                    }
                    open.push(tag);
                }
                Token::End(tag) => {
                    match open.pop() {
                        Some(current) if current == tag => {}
                        _ => return Err(format!("unexpected </{}>", tag)),
                    }
                    if tag == "property" && open.len() == 1 {
                        if let Some(name) = name.take() {
                            let value = value.take().unwrap_or_default();
                            values.insert(name.trim().to_string(), value.trim().to_string());
                        }
                        value = None;
                    }
                }
                Token::Text(text) => {
                    if open.is_empty() {
                        if !text.trim().is_empty() {
                            return Err("text outside the document element".to_string());
                        }
                        continue;
                    }
                    if let [_, "property", field] = open.as_slice() {
                        let slot = match *field {
                            "name" => &mut name,
                            "value" => &mut value,
                            _ => continue,
                        };
                        slot.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
        }

        if let Some(tag) = open.last() {
            return Err(format!("unterminated <{}> element", tag));
        }
        if !seen_root {
            return Err("missing <configuration> root".to_string());
        }
        Ok(Self { values })
    }

    /// Look up a property value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of properties defined
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Start(&'a str),
    End(&'a str),
    Text(String),
}

fn tokenize(xml: &str) -> Result<Vec<Token<'_>>, String> {
    let mut tokens = Vec::new();
    let mut rest = xml;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after.find("-->").ok_or_else(|| unterminated("comment"))?;
            rest = &after[end + 3..];
        } else if let Some(after) = rest.strip_prefix("<![CDATA[") {
            let end = after.find("]]>").ok_or_else(|| unterminated("CDATA section"))?;
            tokens.push(Token::Text(after[..end].to_string()));
            rest = &after[end + 3..];
        } else if rest.starts_with("<?") || rest.starts_with("<!") {
            let end = rest.find('>').ok_or_else(|| unterminated("declaration"))?;
            rest = &rest[end + 1..];
        } else if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').ok_or_else(|| unterminated("tag"))?;
            tokens.push(Token::End(after[..end].trim()));
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix('<') {
            let end = tag_end(after)?;
            let (tag, empty) = match after[..end].strip_suffix('/') {
                Some(tag) => (tag, true),
                None => (&after[..end], false),
            };
            let name = tag.split_whitespace().next().unwrap_or("");
            if name.is_empty() {
                return Err("element without a name".to_string());
            }
            tokens.push(Token::Start(name));
            if empty {
                tokens.push(Token::End(name));
            }
            rest = &after[end + 1..];
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            tokens.push(Token::Text(unescape(&rest[..end])));
            rest = &rest[end..];
        }
    }

    Ok(tokens)
}

/// Offset of the `>` closing a start tag; quoted attribute values may hold one
fn tag_end(tag: &str) -> Result<usize, String> {
    let mut quote = None;
    for (index, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return Ok(index),
            _ => {}
        }
    }
    Err(unterminated("tag"))
}

fn unterminated(what: &str) -> String {
    format!("unterminated {}", what)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
