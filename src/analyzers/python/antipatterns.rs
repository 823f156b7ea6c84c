use crate::core::{Antipattern, AntipatternRule, LineRange};
use tree_sitter::Node;

/// Loops nested deeper than this are reported
pub const MAX_LOOP_NESTING: usize = 3;

const DANGEROUS_CALLS: &[&str] = &["eval", "exec"];
const INPUT_CALLS: &[&str] = &["input", "raw_input"];
const REQUEST_ATTRIBUTES: &[&str] = &["form", "args", "json", "data"];

/// Every antipattern in the file, in source order
pub fn extract_antipatterns(root: Node, source: &str) -> Vec<Antipattern> {
    let mut detector = AntipatternDetector {
        source,
        loop_stack: Vec::new(),
        found: Vec::new(),
    };
    detector.visit(root);
    detector.found
}

struct AntipatternDetector<'a> {
    source: &'a str,
    loop_stack: Vec<&'static str>,
    found: Vec<Antipattern>,
}

impl<'a> AntipatternDetector<'a> {
    fn visit(&mut self, node: Node) {
        match node.kind() {
            "for_statement" | "while_statement" => {
                self.loop_stack.push(loop_kind(node));
                self.check_loop_nesting(node);
                self.visit_children(node);
                self.loop_stack.pop();
                return;
            }
            "call" => self.check_call(node),
            "except_clause" => self.check_except(node),
            "function_definition" => self.check_defaults(node),
            _ => {}
        }
        self.visit_children(node);
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn check_loop_nesting(&mut self, node: Node) {
        let depth = self.loop_stack.len();
        if depth > MAX_LOOP_NESTING {
            let loop_kinds = self.loop_stack.iter().map(|k| k.to_string()).collect();
            self.report(
                node,
                AntipatternRule::NestedLoops {
                    depth,
                    threshold: MAX_LOOP_NESTING,
                    loop_kinds,
                },
            );
        }
    }

    fn check_call(&mut self, node: Node) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        if function.kind() != "identifier" {
            return;
        }
        let Some(name) = self.text(function) else {
            return;
        };
        if DANGEROUS_CALLS.contains(&name) {
            let call = name.to_string();
            let user_input = node
                .child_by_field_name("arguments")
                .is_some_and(|args| self.reads_user_input(args));
            self.report(node, AntipatternRule::DangerousEval { call, user_input });
        }
    }

    fn reads_user_input(&self, node: Node) -> bool {
        let hit = match node.kind() {
            "call" => node
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .and_then(|f| self.text(f))
                .is_some_and(|name| INPUT_CALLS.contains(&name)),
            "attribute" => node
                .child_by_field_name("attribute")
                .and_then(|a| self.text(a))
                .is_some_and(|name| REQUEST_ATTRIBUTES.contains(&name)),
            _ => false,
        };
        if hit {
            return true;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        children.into_iter().any(|child| self.reads_user_input(child))
    }

    fn check_except(&mut self, node: Node) {
        if node.child_by_field_name("value").is_some() {
            return;
        }
        let mut cursor = node.walk();
        let Some(body) = node.named_children(&mut cursor).find(|c| c.kind() == "block") else {
            return;
        };
        let mut body_cursor = body.walk();
        let statements: Vec<Node> = body
            .named_children(&mut body_cursor)
            .filter(|s| s.kind() != "comment")
            .collect();
        let pass_only = statements.len() == 1 && statements[0].kind() == "pass_statement";
        self.report(
            node,
            AntipatternRule::BareExcept {
                pass_only,
                body_statements: statements.len(),
            },
        );
    }

    fn check_defaults(&mut self, node: Node) {
        let Some(function) = node
            .child_by_field_name("name")
            .and_then(|n| self.text(n))
            .map(str::to_string)
        else {
            return;
        };
        let Some(parameters) = node.child_by_field_name("parameters") else {
            return;
        };

        let mut cursor = parameters.walk();
        let defaults: Vec<Node> = parameters
            .named_children(&mut cursor)
            .filter(|p| matches!(p.kind(), "default_parameter" | "typed_default_parameter"))
            .collect();
        for param in defaults {
            let Some(value) = param.child_by_field_name("value") else {
                continue;
            };
            let default_kind = match value.kind() {
                "list" => "list",
                "dictionary" => "dict",
                "set" => "set",
                _ => continue,
            };
            let parameter = param
                .child_by_field_name("name")
                .and_then(|n| self.text(n))
                .unwrap_or("unknown")
                .to_string();
            self.report(
                value,
                AntipatternRule::MutableDefault {
                    function: function.clone(),
                    parameter,
                    default_kind: default_kind.to_string(),
                },
            );
        }
    }

    fn report(&mut self, node: Node, rule: AntipatternRule) {
        self.found.push(Antipattern {
            lines: LineRange::new(node.start_position().row + 1, node.end_position().row + 1),
            rule,
        });
    }

    fn text(&self, node: Node) -> Option<&'a str> {
        node.utf8_text(self.source.as_bytes()).ok()
    }
}

fn loop_kind(node: Node) -> &'static str {
    if node.kind() == "while_statement" {
        "while"
    } else {
        "for"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tree_sitter::Parser;

    fn antipatterns_of(source: &str) -> Vec<Antipattern> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        extract_antipatterns(tree.root_node(), source)
    }

    #[test]
    fn test_eval_and_exec_calls() {
        let source = indoc! {"
            def run(expr, request):
                eval(expr)
                exec(request.form['code'])
                ast.literal_eval(expr)
                value = eval(input())
        "};
        let rules: Vec<_> = antipatterns_of(source)
            .into_iter()
            .map(|a| (a.lines.start, a.rule))
            .collect();
        assert_eq!(
            rules,
            vec![
                (2, AntipatternRule::DangerousEval { call: "eval".into(), user_input: false }),
                (3, AntipatternRule::DangerousEval { call: "exec".into(), user_input: true }),
                (5, AntipatternRule::DangerousEval { call: "eval".into(), user_input: true }),
            ]
        );
    }

    #[test]
    fn test_bare_except_variants() {
        let source = indoc! {"
            try:
                work()
            except ValueError:
                pass

            try:
                work()
            except:
                # swallow
                pass

            try:
                work()
            except:
                log()
                raise
        "};
        let rules: Vec<_> = antipatterns_of(source).into_iter().map(|a| a.rule).collect();
        assert_eq!(
            rules,
            vec![
                AntipatternRule::BareExcept { pass_only: true, body_statements: 1 },
                AntipatternRule::BareExcept { pass_only: false, body_statements: 2 },
            ]
        );
    }

    #[test]
    fn test_only_loops_past_the_limit_are_reported() {
        let source = indoc! {"
            def scan(grid):
                for a in grid:
                    for b in a:
                        while b:
                            for c in b:
                                for d in c:
                                    b = d
                [x for x in grid]
        "};
        let found = antipatterns_of(source);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].lines.start, 5);
        assert_eq!(
            found[0].rule,
            AntipatternRule::NestedLoops {
                depth: 4,
                threshold: 3,
                loop_kinds: vec!["for".into(), "for".into(), "while".into(), "for".into()],
            }
        );
        assert!(matches!(found[1].rule, AntipatternRule::NestedLoops { depth: 5, .. }));
    }

    #[test]
    fn test_mutable_defaults() {
        let source = indoc! {"
            class Cache:
                def put(self, key, seen=[], opts: dict = {}, tags={'a'}, limit=10, name=None):
                    pass
        "};
        let rules: Vec<_> = antipatterns_of(source).into_iter().map(|a| a.rule).collect();
        let params: Vec<_> = rules
            .iter()
            .map(|r| match r {
                AntipatternRule::MutableDefault {
                    function,
                    parameter,
                    default_kind,
                } => (function.as_str(), parameter.as_str(), default_kind.as_str()),
                other => panic!("unexpected rule {other:?}"),
            })
            .collect();
        assert_eq!(
            params,
            vec![
                ("put", "seen", "list"),
                ("put", "opts", "dict"),
                ("put", "tags", "set"),
            ]
        );
    }

    #[test]
    fn test_clean_code_has_no_antipatterns() {
        let source = indoc! {"
            def add(items=None):
                items = items or []
                for item in items:
                    try:
                        yield int(item)
                    except (TypeError, ValueError):
                        continue
        "};
        assert!(antipatterns_of(source).is_empty());
    }
}
