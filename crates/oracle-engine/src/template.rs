// template.rs — Typed pattern templates with `{name}` placeholders.
//
// A template is parsed once into literal text fragments and placeholder
// names. Resolving it against a goal's bindings never goes through a
// format-string engine, so a missing name is a typed error and captured text
// is escaped before it is spliced into a regex source.
//
// Syntax:
//   {name}   placeholder, name = [A-Za-z_][A-Za-z0-9_]*
//   {{ / }}  literal brace
//   anything else, including regex repetitions like `\d{2}`, is literal text

use crate::error::OracleError;
use crate::goal::Bindings;

/// How bound values are embedded when a template is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// Insert the captured text unchanged (literal substring tokens).
    Raw,
    /// Escape regex metacharacters before insertion (regex tokens).
    RegexEscaped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Text(String),
    Placeholder(String),
}

/// A parsed pattern template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    fragments: Vec<Fragment>,
}

impl Template {
    /// Parse a template source. Parsing never fails: malformed braces are
    /// treated as literal text.
    pub fn parse(source: &str) -> Self {
        let mut fragments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
            text.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                text.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                text.push('}');
                rest = &tail[2..];
            } else if let Some(name) = tail.strip_prefix('{').and_then(placeholder_name) {
                if !text.is_empty() {
                    fragments.push(Fragment::Text(std::mem::take(&mut text)));
                }
                fragments.push(Fragment::Placeholder(name.to_string()));
                rest = &tail[name.len() + 2..];
            } else {
                text.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
        text.push_str(rest);
        if !text.is_empty() {
            fragments.push(Fragment::Text(text));
        }

        Self {
            source: source.to_string(),
            fragments,
        }
    }

    /// The template exactly as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the template has no placeholders.
    pub fn is_concrete(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Placeholder(name) => Some(name.as_str()),
            Fragment::Text(_) => None,
        })
    }

    /// Substitute bindings into the template.
    ///
    /// Fails with `MissingBinding` on the first placeholder that has no value
    /// in `bindings`. A concrete template resolves to its text with `{{`/`}}`
    /// collapsed, regardless of `bindings`.
    pub fn resolve(&self, bindings: &Bindings, mode: Substitution) -> Result<String, OracleError> {
        let mut out = String::with_capacity(self.source.len());
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Placeholder(name) => {
                    let value = bindings.get(name).ok_or_else(|| OracleError::MissingBinding {
                        name: name.clone(),
                        template: self.source.clone(),
                    })?;
                    match mode {
                        Substitution::Raw => out.push_str(value),
                        Substitution::RegexEscaped => out.push_str(&regex::escape(value)),
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Return the placeholder name at the start of `s` (which follows a `{`), if
/// `s` begins with a valid identifier immediately closed by `}`.
fn placeholder_name(s: &str) -> Option<&str> {
    let end = s.find('}')?;
    let name = &s[..end];
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── Parsing ──────────────────────────────────────────────────

    #[test]
    fn plain_text_is_concrete() {
        let t = Template::parse("Session(");
        assert!(t.is_concrete());
        assert_eq!(t.resolve(&Bindings::new(), Substitution::Raw).unwrap(), "Session(");
    }

    #[test]
    fn finds_placeholders_in_order() {
        let t = Template::parse(r"^SessionInfo\(.+@ {tvar} and {other} {tvar}$");
        let names: Vec<&str> = t.placeholders().collect();
        assert_eq!(names, vec!["tvar", "other", "tvar"]);
        assert!(!t.is_concrete());
    }

    #[test]
    fn regex_repetition_is_not_a_placeholder() {
        let t = Template::parse(r"\d{2}x{1,3}");
        assert!(t.is_concrete());
        assert_eq!(
            t.resolve(&Bindings::new(), Substitution::Raw).unwrap(),
            r"\d{2}x{1,3}"
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let t = Template::parse("{{name}}");
        assert!(t.is_concrete());
        assert_eq!(t.resolve(&Bindings::new(), Substitution::Raw).unwrap(), "{name}");
    }

    #[test]
    fn unclosed_brace_is_literal() {
        let t = Template::parse("a{b");
        assert!(t.is_concrete());
        assert_eq!(t.resolve(&Bindings::new(), Substitution::Raw).unwrap(), "a{b");
    }

    #[test]
    fn source_is_preserved() {
        let raw = r"x {sk} \)";
        assert_eq!(Template::parse(raw).source(), raw);
    }

    // ── Resolution ───────────────────────────────────────────────

    #[test]
    fn raw_substitution_inserts_exact_text() {
        let t = Template::parse("{x}");
        let out = t.resolve(&bind(&[("x", "bar")]), Substitution::Raw).unwrap();
        assert_eq!(out, "bar");
    }

    #[test]
    fn regex_substitution_escapes_metacharacters() {
        let t = Template::parse(r"^PublicKeyRatchet.+@ {tvar}$");
        let out = t
            .resolve(&bind(&[("tvar", "#t.1")]), Substitution::RegexEscaped)
            .unwrap();
        let re = regex::Regex::new(&out).unwrap();
        assert!(re.is_match("PublicKeyRatchet( x ) @ #t.1"));
        assert!(!re.is_match("PublicKeyRatchet( x ) @ #tx1"));
    }

    #[test]
    fn raw_substitution_keeps_metacharacters() {
        let t = Template::parse("KU( {sk} )");
        let out = t.resolve(&bind(&[("sk", "f(x.1)")]), Substitution::Raw).unwrap();
        assert_eq!(out, "KU( f(x.1) )");
    }

    #[test]
    fn missing_binding_names_the_placeholder() {
        let t = Template::parse("@ {tvar}");
        let err = t
            .resolve(&bind(&[("other", "x")]), Substitution::Raw)
            .unwrap_err();
        match err {
            OracleError::MissingBinding { name, template } => {
                assert_eq!(name, "tvar");
                assert_eq!(template, "@ {tvar}");
            }
            other => panic!("expected MissingBinding, got {other:?}"),
        }
    }
}
