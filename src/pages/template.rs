//! Minimal mustache-style substitution.
//!
//! `{{name}}` inserts the HTML-escaped value (unknown names render empty).
//! `{{#name}}...{{/name}}` keeps its body only when `name` is non-empty.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct RenderContext {
    values: BTreeMap<&'static str, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn with_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    source: &'static str,
}

impl Template {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn render(&self, ctx: &RenderContext) -> String {
        let mut out = String::with_capacity(self.source.len());
        render_into(self.source, ctx, &mut out);
        out
    }
}

fn render_into(src: &str, ctx: &RenderContext, out: &mut String) {
    let mut rest = src;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return;
        };
        let tag = after[..end].trim();
        rest = &after[end + 2..];

        if let Some(name) = tag.strip_prefix('#') {
            let name = name.trim();
            let close = format!("{{{{/{name}}}}}");
            let (body, tail) = match rest.find(&close) {
                Some(i) => (&rest[..i], &rest[i + close.len()..]),
                None => (rest, ""),
            };
            if ctx.is_truthy(name) {
                render_into(body, ctx, out);
            }
            rest = tail;
        } else if tag.starts_with('/') {
            // unmatched close tag
        } else if let Some(value) = ctx.get(tag) {
            out.push_str(&escape_html(value));
        }
    }
    out.push_str(rest);
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_and_escapes() {
        let t = Template::new("<p>Hi {{ name }}!</p>");
        let ctx = RenderContext::new().with("name", "<b>Ada</b>");
        assert_eq!(t.render(&ctx), "<p>Hi &lt;b&gt;Ada&lt;/b&gt;!</p>");
    }

    #[test]
    fn unknown_names_render_empty() {
        let t = Template::new("[{{missing}}]");
        assert_eq!(t.render(&RenderContext::new()), "[]");
    }

    #[test]
    fn sections_follow_value_presence() {
        let t = Template::new("a{{#key}}<k>{{key}}</k>{{/key}}b");
        assert_eq!(t.render(&RenderContext::new()), "ab");
        assert_eq!(t.render(&RenderContext::new().with("key", "")), "ab");
        assert_eq!(t.render(&RenderContext::new().with("key", "v")), "a<k>v</k>b");
    }

    #[test]
    fn unterminated_tag_is_left_verbatim() {
        let t = Template::new("x {{oops");
        assert_eq!(t.render(&RenderContext::new()), "x {{oops");
    }

    #[test]
    fn with_opt_skips_none() {
        let ctx = RenderContext::new().with_opt("a", None).with_opt("b", Some("1"));
        assert_eq!(ctx.get("a"), None);
        assert_eq!(ctx.get("b"), Some("1"));
    }
}
