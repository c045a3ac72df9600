//! CSS Parser using lightningcss
//!
//! Parses style sheets and `style` attributes into our internal
//! representation, keeping only the properties that decide rendering.

use crate::properties::{Display, PropertyValue, Visibility};
use crate::{CssError, Declaration, Rule, Selector, Stylesheet};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::properties::Property;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;

/// CSS Parser
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    fn options<'o, 'i>() -> ParserOptions<'o, 'i> {
        ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        }
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let stylesheet = StyleSheet::parse(css, Self::options()).map_err(|e| CssError::ParseError {
            line: e.loc.as_ref().map(|l| l.line + 1).unwrap_or(0),
            message: e.kind.to_string(),
        })?;

        let mut result = Stylesheet::new();
        for rule in stylesheet.rules.0.iter() {
            if let Some(converted) = self.convert_rule(rule) {
                result.rules.push(converted);
            }
        }

        tracing::trace!(rules = result.len(), "parsed stylesheet");
        Ok(result)
    }

    /// Parse the contents of a `style` attribute
    pub fn parse_inline(&self, style: &str) -> Result<Vec<Declaration>, CssError> {
        let attr = StyleAttribute::parse(style, Self::options()).map_err(|e| CssError::ParseError {
            line: 0,
            message: e.kind.to_string(),
        })?;
        Ok(self.convert_declarations(&attr.declarations))
    }

    fn convert_rule(&self, rule: &CssRule) -> Option<Rule> {
        match rule {
            CssRule::Style(style_rule) => {
                let text = style_rule
                    .selectors
                    .to_css_string(PrinterOptions::default())
                    .ok()?;
                let Some(selectors) = Selector::parse_list(&text) else {
                    tracing::debug!(selector = %text, "skipping rule with unsupported selector");
                    return None;
                };
                let declarations = self.convert_declarations(&style_rule.declarations);
                if declarations.is_empty() {
                    return None;
                }
                Some(Rule {
                    selectors,
                    declarations,
                })
            }
            // Media queries, keyframes, font faces etc. never apply
            _ => None,
        }
    }

    fn convert_declarations(&self, block: &DeclarationBlock) -> Vec<Declaration> {
        let normal = block
            .declarations
            .iter()
            .filter_map(|d| self.convert_declaration(d, false));
        let important = block
            .important_declarations
            .iter()
            .filter_map(|d| self.convert_declaration(d, true));
        normal.chain(important).collect()
    }

    fn convert_declaration(&self, decl: &Property, important: bool) -> Option<Declaration> {
        let value = match decl {
            Property::Display(display) => PropertyValue::Display(self.convert_display(display)),
            Property::Visibility(visibility) => {
                PropertyValue::Visibility(match format!("{:?}", visibility).as_str() {
                    "Hidden" => Visibility::Hidden,
                    "Collapse" => Visibility::Collapse,
                    _ => Visibility::Visible,
                })
            }
            Property::Opacity(alpha) => PropertyValue::Opacity(alpha.0),
            _ => return None,
        };
        Some(Declaration { value, important })
    }

    fn convert_display(&self, display: &lightningcss::properties::display::Display) -> Display {
        use lightningcss::properties::display::{Display as Css, DisplayKeyword};

        match display {
            Css::Keyword(DisplayKeyword::None) => Display::None,
            Css::Keyword(DisplayKeyword::Contents) => Display::Contents,
            Css::Keyword(_) => Display::Other,
            Css::Pair(pair) => {
                let pair = format!("{:?}", pair).to_lowercase();
                if pair.contains("flex") || pair.contains("box") {
                    Display::Flex
                } else if pair.contains("grid") {
                    Display::Grid
                } else if pair.contains("table") || pair.contains("ruby") {
                    Display::Other
                } else if pair.contains("outside: inline") {
                    if pair.contains("flowroot") {
                        Display::InlineBlock
                    } else {
                        Display::Inline
                    }
                } else {
                    Display::Block
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(decls: &[Declaration]) -> Vec<PropertyValue> {
        decls.iter().map(|d| d.value).collect()
    }

    #[test]
    fn test_parse_simple_rule() {
        let sheet = CssParser::new().parse(".hidden { display: none; color: red }").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(
            values(&sheet.rules[0].declarations),
            vec![PropertyValue::Display(Display::None)]
        );
    }

    #[test]
    fn test_rules_without_relevant_properties_dropped() {
        let sheet = CssParser::new().parse("p { color: red; margin: 0 }").unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_media_rules_skipped() {
        let sheet = CssParser::new()
            .parse("@media print { div { display: none } }")
            .unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_inline_style() {
        let decls = CssParser::new()
            .parse_inline("visibility: hidden; opacity: 0.5 !important")
            .unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, PropertyValue::Visibility(Visibility::Hidden));
        assert!(!decls[0].important);
        assert_eq!(decls[1].value, PropertyValue::Opacity(0.5));
        assert!(decls[1].important);
    }

    #[test]
    fn test_display_values() {
        let parser = CssParser::new();
        let display = |css: &str| {
            let decls = parser.parse_inline(&format!("display: {}", css)).unwrap();
            decls[0].value
        };
        assert_eq!(display("block"), PropertyValue::Display(Display::Block));
        assert_eq!(display("inline"), PropertyValue::Display(Display::Inline));
        assert_eq!(display("flex"), PropertyValue::Display(Display::Flex));
        assert_eq!(display("grid"), PropertyValue::Display(Display::Grid));
        assert_eq!(display("contents"), PropertyValue::Display(Display::Contents));
    }
}
