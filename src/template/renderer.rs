//! Template renderer.
//!
//! Renders parsed template nodes with the given context.

use super::parser::Node;
use super::{escape_html, Result, TemplateContext, TemplateError, Value};

/// Template renderer.
///
/// Inside `#each` a renderer holds only the loop variables and falls back to
/// its parent for everything else.
pub struct Renderer<'a> {
    context: &'a TemplateContext,
    parent: Option<&'a Renderer<'a>>,
}

impl<'a> Renderer<'a> {
    /// Create a new renderer with the given context.
    pub fn new(context: &'a TemplateContext) -> Self {
        Self {
            context,
            parent: None,
        }
    }

    fn value(&self, name: &str) -> Option<&Value> {
        self.context
            .get(name)
            .or_else(|| self.parent.and_then(|parent| parent.value(name)))
    }

    /// Render a list of nodes to a string.
    pub fn render(&self, nodes: &[Node]) -> Result<String> {
        let mut output = String::new();

        for node in nodes {
            self.render_node(node, &mut output)?;
        }

        Ok(output)
    }

    fn render_node(&self, node: &Node, output: &mut String) -> Result<()> {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Variable(name) => output.push_str(&escape_html(&self.lookup(name))),
            Node::Raw(name) => output.push_str(&self.lookup(name)),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.is_truthy(condition) {
                    then_branch
                } else {
                    else_branch
                };
                output.push_str(&self.render(branch)?);
            }
            Node::Unless { condition, body } => {
                if !self.is_truthy(condition) {
                    output.push_str(&self.render(body)?);
                }
            }
            Node::Each {
                variable,
                item_name,
                body,
            } => output.push_str(&self.render_each(variable, item_name.as_deref(), body)?),
        }
        Ok(())
    }

    /// Missing variables render as the empty string.
    fn lookup(&self, name: &str) -> String {
        self.value(name)
            .map(|v| v.to_display_string())
            .unwrap_or_default()
    }

    fn is_truthy(&self, name: &str) -> bool {
        self.value(name).is_some_and(|v| v.is_truthy())
    }

    fn render_each(
        &self,
        variable: &str,
        item_name: Option<&str>,
        body: &[Node],
    ) -> Result<String> {
        let list = match self.value(variable) {
            Some(Value::List(items)) => items,
            Some(Value::Null) | None => return Ok(String::new()),
            Some(_) => {
                return Err(TemplateError::Render(format!("'{variable}' is not a list")));
            }
        };

        let mut output = String::new();
        let item_var_name = item_name.unwrap_or("this");

        for (index, item) in list.iter().enumerate() {
            let mut locals = TemplateContext::new();
            locals.set(item_var_name, item.clone());
            locals.set("@index", Value::from(index));
            locals.set("@first", Value::Bool(index == 0));
            locals.set("@last", Value::Bool(index == list.len() - 1));

            // Object fields are also exposed directly inside the loop body.
            if let Value::Object(obj) = item {
                for (key, value) in obj {
                    locals.set(key.clone(), value.clone());
                }
            }

            let scoped = Renderer {
                context: &locals,
                parent: Some(self),
            };
            output.push_str(&scoped.render(body)?);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Parser;

    fn render(template: &str, context: &TemplateContext) -> Result<String> {
        let nodes = Parser::new(template).parse()?;
        Renderer::new(context).render(&nodes)
    }

    #[test]
    fn test_render_escapes_variables() {
        let context = TemplateContext::new().with("error", "Given: <script>");
        assert_eq!(
            render("<p>{{error}}</p>", &context).unwrap(),
            "<p>Given: &lt;script&gt;</p>"
        );
    }

    #[test]
    fn test_render_raw_is_not_escaped() {
        let context = TemplateContext::new().with("html", "<b>bold</b>");
        assert_eq!(render("{{{html}}}", &context).unwrap(), "<b>bold</b>");
    }

    #[test]
    fn test_render_missing_variable() {
        let context = TemplateContext::new();
        assert_eq!(render("[{{missing}}]", &context).unwrap(), "[]");
    }

    #[test]
    fn test_render_if_else() {
        let yes = TemplateContext::new().with("granted", true);
        let no = TemplateContext::new().with("granted", false);
        let template = "{{#if granted}}ok{{else}}failed{{/if}}";

        assert_eq!(render(template, &yes).unwrap(), "ok");
        assert_eq!(render(template, &no).unwrap(), "failed");
        assert_eq!(render(template, &TemplateContext::new()).unwrap(), "failed");
    }

    #[test]
    fn test_render_unless() {
        let empty = TemplateContext::new().with("files", Value::List(vec![]));
        assert_eq!(
            render("{{#unless files}}No files{{/unless}}", &empty).unwrap(),
            "No files"
        );
    }

    #[test]
    fn test_render_each_objects() {
        let files = Value::List(vec![
            Value::object([("title", "a.txt"), ("owners", "Alice")]),
            Value::object([("title", "b & c"), ("owners", "Bob,Carol")]),
        ]);
        let context = TemplateContext::new().with("files", files);

        let result = render(
            "{{#each files}}{{@index}}:{{title}}({{owners}}){{#unless @last}} {{/unless}}{{/each}}",
            &context,
        )
        .unwrap();

        assert_eq!(result, "0:a.txt(Alice) 1:b &amp; c(Bob,Carol)");
    }

    #[test]
    fn test_render_each_named_item() {
        let context = TemplateContext::new().with("ids", vec!["x", "y"]);
        assert_eq!(
            render("{{#each ids as id}}<{{id}}>{{/each}}", &context).unwrap(),
            "<x><y>"
        );
    }

    #[test]
    fn test_render_each_sees_outer_variables() {
        let files = Value::List(vec![
            Value::object([("title", "a.txt")]),
            Value::object([("title", "b.txt"), ("new_owner", "shadow")]),
        ]);
        let context = TemplateContext::new()
            .with("new_owner", "new@rit.edu")
            .with("title", "Listing")
            .with("files", files);

        let result = render(
            "{{#each files}}[{{title}} {{new_owner}}]{{/each}} {{title}}",
            &context,
        )
        .unwrap();

        assert_eq!(result, "[a.txt new@rit.edu][b.txt shadow] Listing");
    }

    #[test]
    fn test_render_nested_each() {
        let context = TemplateContext::new()
            .with("rows", vec!["a", "b"])
            .with("cols", vec!["1", "2"]);

        let result = render(
            "{{#each rows as r}}{{#each cols as c}}{{r}}{{c}}@{{@index}} {{/each}}{{/each}}",
            &context,
        )
        .unwrap();

        assert_eq!(result, "a1@0 a2@1 b1@0 b2@1 ");
    }

    #[test]
    fn test_render_each_missing_is_empty() {
        let context = TemplateContext::new();
        assert_eq!(render("{{#each files}}x{{/each}}", &context).unwrap(), "");
    }

    #[test]
    fn test_render_each_not_a_list() {
        let context = TemplateContext::new().with("files", "nope");
        assert!(matches!(
            render("{{#each files}}x{{/each}}", &context),
            Err(TemplateError::Render(_))
        ));
    }
}
