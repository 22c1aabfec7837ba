//! Content-Security-Policy directive list.
//!
//! Directive names are accepted as `scriptSrc` or `script-src` and stored in
//! kebab-case. Sources are emitted verbatim: keywords such as `'self'` must
//! already carry their quotes.

use std::fmt;

use serde::{
    de::{Error as _, MapAccess, Visitor},
    Deserialize, Deserializer,
};

pub const DEFAULT_SRC: &str = "default-src";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub sources: Vec<String>,
}

impl Directive {
    fn render(&self) -> String {
        if self.sources.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.sources.join(" "))
        }
    }
}

/// Ordered directives; document order is kept so the rendered header is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives(Vec<Directive>);

impl Default for Directives {
    fn default() -> Self {
        Directives(vec![Directive { name: DEFAULT_SRC.into(), sources: vec!["'self'".into()] }])
    }
}

impl Directives {
    pub fn empty() -> Self { Directives(Vec::new()) }

    /// Adds a directive, normalizing its name. Fails on malformed or repeated names.
    pub fn push<I, S>(&mut self, name: &str, sources: I) -> Result<(), String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = kebab_case(name)?;
        if self.get(&name).is_some() {
            return Err(format!("directive `{name}` is given more than once"));
        }
        self.0.push(Directive { name, sources: sources.into_iter().map(Into::into).collect() });
        Ok(())
    }

    pub fn with<I, S>(mut self, name: &str, sources: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(name, sources)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Directive> { self.0.iter().find(|d| d.name == name) }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> { self.0.iter() }

    /// Checks the list can be rendered into a header value browsers will parse as intended.
    pub fn validate(&self) -> Result<(), String> {
        if self.get(DEFAULT_SRC).is_none() {
            return Err("`default-src` is required as the fallback for unlisted directives".into());
        }
        for directive in &self.0 {
            for source in &directive.sources {
                if source.is_empty() {
                    return Err(format!("`{}` contains an empty source", directive.name));
                }
                if source.chars().any(|c| c == ';' || c == ',' || c.is_whitespace()) {
                    return Err(format!("`{}` source {source:?} must not contain `;`, `,` or whitespace", directive.name));
                }
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        self.0.iter().map(Directive::render).collect::<Vec<_>>().join("; ")
    }
}

fn kebab_case(name: &str) -> Result<String, String> {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            'a'..='z' | '-' => out.push(c),
            'A'..='Z' => {
                out.push('-');
                out.push(c.to_ascii_lowercase());
            }
            _ => return Err(format!("invalid directive name {name:?}")),
        }
    }
    if out.is_empty() || out.starts_with('-') || out.ends_with('-') || out.contains("--") {
        return Err(format!("invalid directive name {name:?}"));
    }
    Ok(out)
}

impl<'de> Deserialize<'de> for Directives {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectivesVisitor;

        impl<'de> Visitor<'de> for DirectivesVisitor {
            type Value = Directives;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of directive names to arrays of sources")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Directives, A::Error> {
                let mut directives = Directives::empty();
                while let Some(name) = map.next_key::<String>()? {
                    let sources: Vec<String> = map.next_value()?;
                    directives.push(&name, sources).map_err(A::Error::custom)?;
                }
                Ok(directives)
            }
        }

        deserializer.deserialize_map(DirectivesVisitor)
    }
}
