//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::model::Axis;
use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse form file source into an AST
pub fn parse(input: &str) -> Result<FormFile, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    form_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn form_parser<'a, I>() -> impl Parser<'a, I, FormFile, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Names may be quoted when they clash with keywords
    let name = select! {
        Token::Ident(s) => Identifier::new(s),
        Token::String(s) => Identifier::new(s),
    }
    .labelled("name")
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let key = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .labelled("attribute name")
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let value = select! {
        Token::Number(n) => Value::Number(n),
        Token::Ident(s) => Value::Word(s),
    }
    .labelled("attribute value")
    .map_with(|v, e| Spanned::new(v, span_range(&e.span())));

    let attribute = key
        .then_ignore(just(Token::Colon))
        .then(value)
        .map_with(|(key, value), e| Spanned::new(Attribute { key, value }, span_range(&e.span())));

    let attributes = attribute
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
        .or_not()
        .map(Option::unwrap_or_default);

    // Recursive interval parser
    let node = recursive(|node| {
        let body = node
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose));

        let sequential = just(Token::Sequential)
            .ignore_then(attributes.clone())
            .then(body.clone())
            .map(|(attributes, children)| Node::Sequential {
                attributes,
                children,
            });

        let parallel = just(Token::Parallel)
            .ignore_then(attributes.clone())
            .then(body)
            .map(|(attributes, children)| Node::Parallel {
                attributes,
                children,
            });

        let component = just(Token::Component)
            .ignore_then(name.clone())
            .then(attributes.clone())
            .map(|(name, attributes)| Node::Component { name, attributes });

        let gap = just(Token::Gap)
            .ignore_then(attributes.clone())
            .map(|attributes| Node::Gap { attributes });

        choice((sequential, parallel, component, gap))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    let axis = choice((
        just(Token::Horizontal).to(Axis::Horizontal),
        just(Token::Vertical).to(Axis::Vertical),
    ));

    let layout = axis
        .then(node)
        .map_with(|(axis, root), e| Spanned::new(AxisLayout { axis, root }, span_range(&e.span())));

    let container = just(Token::Container)
        .ignore_then(name)
        .then(attributes)
        .then(
            layout
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map_with(|((name, attributes), layouts), e| {
            Spanned::new(
                ContainerDecl {
                    name,
                    attributes,
                    layouts,
                },
                span_range(&e.span()),
            )
        });

    container
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|containers| FormFile { containers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let form = parse("// nothing here\n").expect("Should parse");
        assert!(form.containers.is_empty());
    }

    #[test]
    fn test_parse_container() {
        let form = parse(
            r#"
            container Form [width: 400, height: 300] {
                horizontal parallel {
                    sequential {
                        gap [pref: 10]
                        component jLabel1
                        gap [padding: unrelated]
                        component "gap" [max: unbounded]
                    }
                }
                vertical parallel [group_align: baseline] {
                    component jLabel1
                    component "gap"
                }
            }
            "#,
        )
        .expect("Should parse");
        assert_eq!(form.containers.len(), 1);
        let decl = &form.containers[0].node;
        assert_eq!(decl.name.node.as_str(), "Form");
        assert_eq!(decl.attributes.len(), 2);
        assert_eq!(decl.layouts.len(), 2);
        assert_eq!(decl.layouts[1].node.axis, Axis::Vertical);
        match &decl.layouts[0].node.root.node {
            Node::Parallel { children, .. } => match &children[0].node {
                Node::Sequential { children, .. } => {
                    assert_eq!(children.len(), 4);
                    assert!(matches!(
                        &children[3].node,
                        Node::Component { name, attributes }
                            if name.node.as_str() == "gap" && attributes.len() == 1
                    ));
                }
                other => panic!("Expected sequential, got {:?}", other),
            },
            other => panic!("Expected parallel, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_has_span() {
        let errors = parse("container Form { horizontal component }").unwrap_err();
        assert!(!errors.is_empty());
        let crate::ParseError::Syntax { span, .. } = &errors[0];
        assert_eq!(span.clone(), 38..39);
    }

    #[test]
    fn test_parse_invalid_token() {
        let errors = parse("container Form @").unwrap_err();
        assert!(errors[0].to_string().contains("invalid"));
    }
}
