//! `{{name}}` placeholder templates for task command lines.

use crate::models::{CoreError, CoreErrorKind};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandTemplate<'a> {
    source: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> CommandTemplate<'a> {
    pub fn parse(source: &'a str) -> Result<Self, CoreError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(&rest[..start]));
            }
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(template_error(format!(
                    "unterminated placeholder in command template '{source}'"
                )));
            };

            let name = after_open[..end].trim();
            if !is_placeholder_name(name) {
                return Err(template_error(format!(
                    "invalid placeholder '{{{{{name}}}}}' in command template '{source}'"
                )));
            }
            segments.push(Segment::Placeholder(name));
            rest = &after_open[end + CLOSE.len()..];
        }

        if rest.contains(CLOSE) {
            return Err(template_error(format!(
                "unmatched '}}}}' in command template '{source}'"
            )));
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder with the value `lookup` returns for it.
    pub fn render<F>(&self, mut lookup: F) -> Result<String, CoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    let value = lookup(*name).ok_or_else(|| {
                        template_error(format!(
                            "placeholder '{name}' has no corresponding input slot"
                        ))
                        .input(*name)
                    })?;
                    rendered.push_str(&value);
                }
            }
        }
        Ok(rendered)
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn template_error(message: String) -> CoreError {
    CoreError::new(CoreErrorKind::Template, message)
}

#[cfg(test)]
mod tests {
    use super::{CommandTemplate, Segment};
    use crate::models::CoreErrorKind;

    #[test]
    fn parses_literals_and_placeholders_in_order() {
        let template = CommandTemplate::parse("sum-row --divisor {{divisor}} --output sum.mtx")
            .expect("template should parse");

        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("sum-row --divisor "),
                Segment::Placeholder("divisor"),
                Segment::Literal(" --output sum.mtx"),
            ]
        );
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["divisor"]);
    }

    #[test]
    fn placeholders_may_be_embedded_inside_flags() {
        let template = CommandTemplate::parse("--{{include_min}}-min -O{{output_type}}")
            .expect("template should parse");
        let rendered = template
            .render(|name| match name {
                "include_min" => Some("exclude".to_string()),
                "output_type" => Some("1".to_string()),
                _ => None,
            })
            .expect("render should succeed");

        assert_eq!(rendered, "--exclude-min -O1");
    }

    #[test]
    fn whitespace_inside_braces_is_ignored() {
        let template = CommandTemplate::parse("--north {{ north }}").expect("template should parse");
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["north"]);
    }

    #[test]
    fn rejects_unterminated_placeholder() {
        let error = CommandTemplate::parse("--north {{north").expect_err("should fail");
        assert_eq!(error.kind, CoreErrorKind::Template);
    }

    #[test]
    fn rejects_stray_closing_braces() {
        let error = CommandTemplate::parse("--north north}}").expect_err("should fail");
        assert_eq!(error.kind, CoreErrorKind::Template);
    }

    #[test]
    fn rejects_non_identifier_placeholder() {
        let error = CommandTemplate::parse("--x {{self.north}}").expect_err("should fail");
        assert_eq!(error.kind, CoreErrorKind::Template);
    }

    #[test]
    fn render_fails_for_unknown_placeholder() {
        let template = CommandTemplate::parse("--north {{north}}").expect("template should parse");
        let error = template.render(|_| None).expect_err("should fail");

        assert_eq!(error.kind, CoreErrorKind::Template);
        assert_eq!(error.input.as_deref(), Some("north"));
    }
}
