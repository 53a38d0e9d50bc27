use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use tracing::debug;

use super::{CssRule, Declarations, RuleOrigin};

/// Renders rules as `selector {\n  name: value;\n}` blocks separated by a
/// blank line.
pub fn to_css_text(rules: &[CssRule]) -> String {
    let mut blocks = Vec::with_capacity(rules.len());
    for rule in rules {
        let mut block = String::new();
        block.push_str(&rule.selector);
        block.push_str(" {\n");
        for (name, value) in rule.properties.iter() {
            block.push_str("  ");
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str(";\n");
        }
        block.push('}');
        blocks.push(block);
    }
    blocks.join("\n\n")
}

/// Parses flat CSS into rules.
///
/// Tokenization follows CSS Syntax Level 3, so strings, `url()` and
/// attribute selectors may contain `;`, `}`, `:` or `@`. At-rules are
/// skipped along with their blocks. Declarations without a value are
/// dropped. Selectors and values keep their source text; origins are
/// inferred from each selector.
pub fn parse_css_text(css: &str) -> Vec<CssRule> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rules = StyleRules;
    StyleSheetParser::new(&mut parser, &mut rules)
        .filter_map(|item| match item {
            Ok(rule) => Some(rule),
            Err((err, fragment)) => {
                debug!(fragment, ?err, "css rule skipped");
                None
            }
        })
        .collect()
}

/// True when `name: value` renders and reparses as exactly that single
/// declaration, i.e. the value cannot close its rule or open another.
pub fn is_well_formed_declaration(name: &str, value: &str) -> bool {
    let candidate = CssRule::new("x").with_property(name, value);
    let reparsed = parse_css_text(&to_css_text(std::slice::from_ref(&candidate)));
    matches!(
        reparsed.as_slice(),
        [rule] if rule.selector == candidate.selector && rule.properties == candidate.properties
    )
}

/// Captures the raw text remaining in a delimited parser.
fn remaining_text<'i>(input: &mut Parser<'i, '_>) -> &'i str {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim()
}

/// Top-level style rules; every at-rule is rejected and skipped.
struct StyleRules;

impl<'i> QualifiedRuleParser<'i> for StyleRules {
    type Prelude = String;
    type QualifiedRule = CssRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selector = remaining_text(input);
        if selector.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(selector.to_string())
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let properties = parse_declarations(input);
        Ok(CssRule {
            origin: Some(RuleOrigin::infer(&selector)),
            selector,
            properties,
        })
    }
}

impl<'i> AtRuleParser<'i> for StyleRules {
    type Prelude = ();
    type AtRule = CssRule;
    type Error = ();
}

fn parse_declarations(block: &mut Parser<'_, '_>) -> Declarations {
    let mut body = RuleDeclarations;
    RuleBodyParser::new(block, &mut body)
        .filter_map(|item| match item {
            Ok(declaration) => Some(declaration),
            Err((_, fragment)) => {
                debug!(fragment, "css declaration skipped");
                None
            }
        })
        .collect()
}

/// Declarations inside a style rule as `(lowercased name, raw value)`.
struct RuleDeclarations;

impl<'i> DeclarationParser<'i> for RuleDeclarations {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let value = remaining_text(input);
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok((name.to_ascii_lowercase(), value.to_string()))
    }
}

impl<'i> AtRuleParser<'i> for RuleDeclarations {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for RuleDeclarations {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (String, String), ()> for RuleDeclarations {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}
