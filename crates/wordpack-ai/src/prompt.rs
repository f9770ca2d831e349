//! Prompt template rendering.
//!
//! Templates use `{{ name }}` placeholders and conditional blocks:
//!
//! ```text
//! {% if article_length == "custom" %}about {{ word_count }} words
//! {% elif article_length %}a {{ article_length }} piece
//! {% else %}300-500 words{% endif %}
//! ```
//!
//! A condition is either a bare name (true when the parameter is set and
//! non-empty) or `name == "literal"` / `name != "literal"`. Unset parameters
//! render as empty text. Malformed tags are emitted verbatim, so rendering
//! never fails.

use std::collections::BTreeMap;

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParams {
    values: BTreeMap<String, String>,
}

impl PromptParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Set `name` only when `value` is present.
    pub fn with_opt(mut self, name: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PromptParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Set(String),
    Equals(String, String),
    NotEquals(String, String),
}

impl Condition {
    fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        for (op, negate) in [("==", false), ("!=", true)] {
            if let Some((name, literal)) = expr.split_once(op) {
                let name = name.trim();
                let literal = unquote(literal.trim())?;
                if !is_identifier(name) {
                    return None;
                }
                return Some(if negate {
                    Condition::NotEquals(name.to_string(), literal.to_string())
                } else {
                    Condition::Equals(name.to_string(), literal.to_string())
                });
            }
        }
        is_identifier(expr).then(|| Condition::Set(expr.to_string()))
    }

    fn holds(&self, params: &PromptParams) -> bool {
        match self {
            Condition::Set(name) => params.get(name).is_some_and(|v| !v.is_empty()),
            Condition::Equals(name, literal) => params.get(name).unwrap_or("") == literal,
            Condition::NotEquals(name, literal) => params.get(name).unwrap_or("") != literal,
        }
    }
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq)]
enum Tag {
    If(Condition),
    Elif(Condition),
    Else,
    EndIf,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Var(String),
    Tag { tag: Tag, raw: String },
}

fn parse_tag(inner: &str) -> Option<Tag> {
    let inner = inner.trim();
    match inner {
        "else" => return Some(Tag::Else),
        "endif" => return Some(Tag::EndIf),
        _ => {}
    }
    if let Some(cond) = inner.strip_prefix("if ") {
        return Condition::parse(cond).map(Tag::If);
    }
    if let Some(cond) = inner.strip_prefix("elif ") {
        return Condition::parse(cond).map(Tag::Elif);
    }
    None
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = template;

    while !rest.is_empty() {
        let var = rest.find("{{");
        let tag = rest.find("{%");
        let (start, is_var) = match (var, tag) {
            (Some(v), Some(t)) if v < t => (v, true),
            (Some(v), None) => (v, true),
            (_, Some(t)) => (t, false),
            (None, None) => {
                text.push_str(rest);
                break;
            }
        };

        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let close = if is_var { "}}" } else { "%}" };

        let Some(end) = after.find(close) else {
            text.push_str(&rest[start..]);
            break;
        };
        let inner = &after[..end];
        let raw = &rest[start..start + 2 + end + 2];
        rest = &after[end + 2..];

        let token = if is_var {
            let name = inner.trim();
            is_identifier(name).then(|| Token::Var(name.to_string()))
        } else {
            parse_tag(inner).map(|tag| Token::Tag {
                tag,
                raw: raw.to_string(),
            })
        };

        match token {
            Some(token) => {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
            }
            None => text.push_str(raw),
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        branches: Vec<(Condition, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
}

/// Parse nodes until a branch terminator (only honoured when `nested`).
fn parse_nodes(
    tokens: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
    nested: bool,
) -> (Vec<Node>, Option<Tag>) {
    let mut nodes = Vec::new();

    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Var(name) => nodes.push(Node::Var(name)),
            Token::Tag {
                tag: Tag::If(cond), ..
            } => nodes.push(parse_if(tokens, cond)),
            Token::Tag { tag, raw } => {
                if nested {
                    return (nodes, Some(tag));
                }
                nodes.push(Node::Text(raw));
            }
        }
    }

    (nodes, None)
}

fn parse_if(
    tokens: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
    first: Condition,
) -> Node {
    let mut branches = Vec::new();
    let mut otherwise = Vec::new();
    let mut cond = first;

    loop {
        let (body, terminator) = parse_nodes(tokens, true);
        match terminator {
            Some(Tag::Elif(next)) => {
                branches.push((cond, body));
                cond = next;
            }
            Some(Tag::Else) => {
                branches.push((cond, body));
                // whatever closes the else body (endif or end of input) ends the block
                let (body, _) = parse_nodes(tokens, true);
                otherwise = body;
                break;
            }
            _ => {
                branches.push((cond, body));
                break;
            }
        }
    }

    Node::If {
        branches,
        otherwise,
    }
}

fn render_nodes(nodes: &[Node], params: &PromptParams, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => out.push_str(params.get(name).unwrap_or("")),
            Node::If {
                branches,
                otherwise,
            } => {
                let chosen = branches
                    .iter()
                    .find(|(cond, _)| cond.holds(params))
                    .map(|(_, body)| body)
                    .unwrap_or(otherwise);
                render_nodes(chosen, params, out);
            }
        }
    }
}

/// A template parsed once and rendered many times.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    nodes: Vec<Node>,
}

impl PromptTemplate {
    pub fn parse(template: &str) -> Self {
        let mut tokens = tokenize(template).into_iter().peekable();
        let (nodes, _) = parse_nodes(&mut tokens, false);
        Self { nodes }
    }

    pub fn render(&self, params: &PromptParams) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, params, &mut out);
        out
    }
}

/// Parse and render in one step.
pub fn render(template: &str, params: &PromptParams) -> String {
    PromptTemplate::parse(template).render(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let params = PromptParams::new()
            .with("words", "ocean,drift")
            .with("topic", "travel");
        assert_eq!(
            render("Words: {{words}} / Topic: {{ topic }}", &params),
            "Words: ocean,drift / Topic: travel"
        );
    }

    #[test]
    fn unset_placeholder_renders_empty() {
        assert_eq!(render("[{{ missing }}]", &PromptParams::new()), "[]");
    }

    #[test]
    fn conditional_word_count_phrase() {
        let template = "Length: {% if article_length == \"custom\" %}{{ word_count }} words\
{% elif article_length == \"short\" %}100-200 words{% else %}300-500 words{% endif %}.";

        let custom = PromptParams::new()
            .with("article_length", "custom")
            .with("word_count", "750");
        assert_eq!(render(template, &custom), "Length: 750 words.");

        let short = PromptParams::new().with("article_length", "short");
        assert_eq!(render(template, &short), "Length: 100-200 words.");

        assert_eq!(render(template, &PromptParams::new()), "Length: 300-500 words.");
    }

    #[test]
    fn truthy_and_negated_conditions() {
        let template = "{% if alert %}!{% endif %}{% if tone != 'casual' %}formal{% endif %}";
        assert_eq!(render(template, &PromptParams::new()), "formal");

        let params = PromptParams::new().with("alert", "x").with("tone", "casual");
        assert_eq!(render(template, &params), "!");

        let empty = PromptParams::new().with("alert", "");
        assert_eq!(render("{% if alert %}!{% endif %}", &empty), "");
    }

    #[test]
    fn nested_blocks() {
        let template = "{% if a %}A{% if b %}B{% else %}-{% endif %}{% endif %}";
        let both = PromptParams::new().with("a", "1").with("b", "1");
        assert_eq!(render(template, &both), "AB");
        let only_a = PromptParams::new().with("a", "1");
        assert_eq!(render(template, &only_a), "A-");
        assert_eq!(render(template, &PromptParams::new()), "");
    }

    #[test]
    fn malformed_tags_are_literal() {
        let params = PromptParams::new().with("x", "1");
        assert_eq!(render("{{ not valid! }}", &params), "{{ not valid! }}");
        assert_eq!(render("open {{ x", &params), "open {{ x");
        assert_eq!(render("{% endif %} tail", &params), "{% endif %} tail");
        assert_eq!(render("{% loop %}", &params), "{% loop %}");
    }

    #[test]
    fn unclosed_if_runs_to_end() {
        let params = PromptParams::new().with("x", "1");
        assert_eq!(render("a{% if x %}b", &params), "ab");
        assert_eq!(render("a{% if y %}b", &params), "a");
    }

    #[test]
    fn json_braces_pass_through() {
        let template = "Output:\n{\"article\": \"...\", \"topic\": \"{{topic}}\"}";
        let params = PromptParams::new().with("topic", "science");
        assert_eq!(
            render(template, &params),
            "Output:\n{\"article\": \"...\", \"topic\": \"science\"}"
        );
    }

    #[test]
    fn template_is_reusable_and_deterministic() {
        let template = PromptTemplate::parse("{{a}}-{{b}}");
        let params: PromptParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(template.render(&params), template.render(&params));
        assert_eq!(template.render(&params), "1-2");
    }

    #[test]
    fn with_opt_skips_none() {
        let params = PromptParams::new()
            .with_opt("word_count", None::<String>)
            .with_opt("topic", Some("general"));
        assert_eq!(params.get("word_count"), None);
        assert_eq!(params.get("topic"), Some("general"));
    }
}
